//! A small owned XML element tree with namespaces stripped from every tag and
//! attribute name.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::errors::TrackError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    /// First child with the given local name.
    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Text of a leaf element. `None` for elements with child elements.
    pub fn leaf_text(&self) -> Option<&str> {
        self.children.is_empty().then(|| self.text.trim())
    }
}

/// Drop a `{uri}` or `prefix:` qualifier from an element or attribute name.
pub fn strip_namespace(name: &str) -> &str {
    let name = name.rsplit('}').next().unwrap_or(name);
    name.rsplit(':').next().unwrap_or(name)
}

/// Parse a document into its root element.
pub fn parse(bytes: &[u8]) -> Result<XmlElement, TrackError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            TrackError::Xml(format!("Error at position {}: {e}", reader.buffer_position()))
        })?;

        match event {
            Event::Eof => break,
            Event::Start(ref e) => stack.push(element_from_start(e)?),
            Event::Empty(ref e) => {
                let element = element_from_start(e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| TrackError::Xml("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(ref e) => {
                if let Some(top) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| TrackError::Xml(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            _ => {}
        }

        buf.clear();
    }

    if !stack.is_empty() {
        return Err(TrackError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| TrackError::Xml("document has no root element".to_string()))
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement, TrackError> {
    let raw_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| TrackError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| TrackError::Xml(e.to_string()))?;
        attributes.push((strip_namespace(&key).to_string(), value.into_owned()));
    }

    Ok(XmlElement {
        tag: strip_namespace(&raw_name).to_string(),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            root.get_or_insert(element);
        }
    }
}
