use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::errors::{NsdiffError, Result};
use crate::core::models::document::Document;
use crate::core::models::namespace_ref::NamespaceFormat;
use crate::core::traits::parser::DocumentParser;

/// Key under which an element's text is stored when it also has
/// attributes or child elements.
const TEXT_KEY: &str = "__text";

/// Prefix for attribute keys.
const ATTRIBUTE_PREFIX: &str = "_";

/// Parses `.xml` namespaces into a document.
///
/// Conventions:
/// - the root element is the single top-level key
/// - attributes become `_name` keys
/// - repeated sibling elements become a sequence (`item.0`, `item.1`)
/// - a text-only element is a leaf; text next to children or
///   attributes goes under `__text`
/// - an empty element is an empty leaf
pub struct XmlParser;

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: IndexMap<String, Vec<Document>>,
    text: String,
}

impl OpenElement {
    fn open(start: &BytesStart<'_>, origin: &str) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(origin, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| xml_error(origin, e))?
                .into_owned();
            attributes.push((format!("{ATTRIBUTE_PREFIX}{key}"), value));
        }
        Ok(Self {
            name,
            attributes,
            children: IndexMap::new(),
            text: String::new(),
        })
    }

    fn close(self) -> (String, Document) {
        let mut entries: IndexMap<String, Document> = self
            .attributes
            .into_iter()
            .map(|(k, v)| (k, Document::Leaf(v)))
            .collect();

        for (name, docs) in self.children {
            let doc = match <[Document; 1]>::try_from(docs) {
                Ok([single]) => single,
                Err(many) => Document::sequence(many),
            };
            entries.insert(name, doc);
        }

        if entries.is_empty() {
            return (self.name, Document::Leaf(self.text));
        }
        if !self.text.is_empty() {
            entries.insert(TEXT_KEY.to_string(), Document::Leaf(self.text));
        }
        (self.name, Document::Node(entries))
    }
}

fn xml_error(origin: &str, detail: impl std::fmt::Display) -> NsdiffError {
    NsdiffError::parse(origin, NamespaceFormat::Xml.label(), detail)
}

/// Hand a finished element to its parent, or make it the root.
fn attach(
    stack: &mut [OpenElement],
    root: &mut Option<(String, Document)>,
    element: OpenElement,
    origin: &str,
) -> Result<()> {
    let (name, doc) = element.close();
    match stack.last_mut() {
        Some(parent) => parent.children.entry(name).or_default().push(doc),
        None if root.is_some() => {
            return Err(xml_error(
                origin,
                format!("more than one root element (second is <{name}>)"),
            ));
        }
        None => *root = Some((name, doc)),
    }
    Ok(())
}

impl DocumentParser for XmlParser {
    fn parse(&self, content: &str, origin: &str) -> Result<Document> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<OpenElement> = Vec::new();
        let mut root: Option<(String, Document)> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(OpenElement::open(&start, origin)?),
                Ok(Event::Empty(start)) => {
                    let element = OpenElement::open(&start, origin)?;
                    attach(&mut stack, &mut root, element, origin)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| xml_error(origin, "unexpected closing tag"))?;
                    attach(&mut stack, &mut root, element, origin)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text.unescape().map_err(|e| xml_error(origin, e))?;
                    match stack.last_mut() {
                        Some(element) => element.text.push_str(&text),
                        None => return Err(xml_error(origin, "text outside the root element")),
                    }
                }
                Ok(Event::CData(data)) => match stack.last_mut() {
                    Some(element) => element.text.push_str(&String::from_utf8_lossy(&data)),
                    None => return Err(xml_error(origin, "CDATA outside the root element")),
                },
                Ok(Event::Eof) => break,
                // Declarations, comments, processing instructions, doctype
                Ok(_) => {}
                Err(e) => {
                    return Err(xml_error(
                        origin,
                        format!("at byte {}: {e}", reader.error_position()),
                    ));
                }
            }
        }

        if let Some(unclosed) = stack.last() {
            return Err(xml_error(
                origin,
                format!("element <{}> is never closed", unclosed.name),
            ));
        }

        let (name, doc) = root.ok_or_else(|| xml_error(origin, "no root element"))?;
        Ok([(name, doc)].into_iter().collect())
    }

    fn format(&self) -> NamespaceFormat {
        NamespaceFormat::Xml
    }
}
