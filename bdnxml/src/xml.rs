//! A small, order-preserving XML element tree built on `quick-xml`.
//!
//! BDN files are tiny, so we load the whole thing into memory, edit it, and
//! write it back out. Attribute order and sibling order are kept exactly as
//! they were read. Comments, processing instructions and doctypes are
//! discarded.

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use quick_xml::reader::Reader as XmlReader;
use quick_xml::writer::Writer as XmlWriter;

use crate::errors::{Error, Result};

/// A node inside an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data, already unescaped.
    Text(String),
}

/// An XML element with its attributes and children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// The tag name.
    pub name: String,
    /// Attributes, in document order.
    pub attributes: Vec<(String, String)>,
    /// Child nodes, in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new<S: Into<String>>(name: S) -> Element {
        Element {
            name: name.into(),
            attributes: vec![],
            children: vec![],
        }
    }

    /// Parse a complete document and return its root element.
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = XmlReader::from_str(xml);
        let mut stack: Vec<Element> = vec![];
        let mut root: Option<Element> = None;
        loop {
            match reader.read_event()? {
                XmlEvent::Start(start) => {
                    stack.push(Element::from_start(&reader, &start)?);
                }
                XmlEvent::Empty(start) => {
                    let elem = Element::from_start(&reader, &start)?;
                    attach(&mut stack, &mut root, elem)?;
                }
                XmlEvent::End(_) => {
                    // The reader checks that end tags match their start tags.
                    let elem = stack
                        .pop()
                        .ok_or_else(|| Error::malformed("unexpected end tag"))?;
                    attach(&mut stack, &mut root, elem)?;
                }
                XmlEvent::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(text.unescape()?);
                    }
                }
                XmlEvent::CData(cdata) => {
                    if let Some(parent) = stack.last_mut() {
                        let raw = cdata.into_inner();
                        parent.push_text(reader.decoder().decode(&raw)?);
                    }
                }
                XmlEvent::Eof => break,
                _ => {}
            }
        }
        if let Some(open) = stack.last() {
            return Err(Error::malformed(format!("<{}> is never closed", open.name)));
        }
        root.ok_or_else(|| Error::malformed("document has no root element"))
    }

    fn from_start(reader: &XmlReader<&[u8]>, start: &BytesStart) -> Result<Element> {
        let mut elem = Element::new(reader.decoder().decode(start.name().as_ref())?);
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = reader.decoder().decode(attr.key.as_ref())?.into_owned();
            let value = attr.unescape_value()?.into_owned();
            elem.attributes.push((key, value));
        }
        Ok(elem)
    }

    /// Append text, merging with a preceding text node if there is one.
    fn push_text(&mut self, text: Cow<str>) {
        if let Some(Node::Text(prev)) = self.children.last_mut() {
            prev.push_str(&text);
        } else {
            self.children.push(Node::Text(text.into_owned()));
        }
    }

    /// The first child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(elem) if elem.name == name => Some(elem),
            _ => None,
        })
    }

    /// The first child element named `name`, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(elem) if elem.name == name => Some(elem),
            _ => None,
        })
    }

    /// All child elements named `name`, in order.
    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(elem) if elem.name == name => Some(elem),
            _ => None,
        })
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute. Existing attributes keep their position; new ones
    /// are appended.
    pub fn set_attr<S: Into<String>>(&mut self, name: &str, value: S) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_owned(), value)),
        }
    }

    /// The concatenated text of our direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all direct text children with `text`, leaving child elements
    /// alone.
    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        self.children.retain(|node| !matches!(node, Node::Text(_)));
        self.children.insert(0, Node::Text(text.into()));
    }

    /// Serialize this element as a standalone UTF-8 document.
    pub fn to_xml_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = XmlWriter::new(Vec::new());
        writer.write_event(XmlEvent::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(XmlEvent::Text(BytesText::new("\n")))?;
        self.write_to(&mut writer)?;
        writer.write_event(XmlEvent::Text(BytesText::new("\n")))?;
        Ok(writer.into_inner())
    }

    fn write_to(&self, writer: &mut XmlWriter<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            writer.write_event(XmlEvent::Empty(start))?;
            return Ok(());
        }
        writer.write_event(XmlEvent::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(elem) => elem.write_to(writer)?,
                Node::Text(text) => {
                    writer.write_event(XmlEvent::Text(BytesText::new(text)))?
                }
            }
        }
        writer.write_event(XmlEvent::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// Hand a finished element to its parent, or make it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    elem: Element,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(elem));
    } else if root.is_none() {
        *root = Some(elem);
    } else {
        return Err(Error::malformed("document has more than one root element"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_attribute_and_child_order() {
        let root = Element::parse(
            r#"<?xml version="1.0"?><a z="1" y="2"><b/>x<c k="&amp;"/></a>"#,
        )
        .unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(
            root.attributes,
            vec![("z".to_owned(), "1".to_owned()), ("y".to_owned(), "2".to_owned())]
        );
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.text(), "x");
        assert_eq!(root.child("c").unwrap().attr("k"), Some("&"));
    }

    #[test]
    fn child_outlives_the_name_used_to_find_it() {
        let root = Element::parse("<a><b n=\"1\"/><b n=\"2\"/></a>").unwrap();
        let found = {
            let name = String::from("b");
            root.child(&name)
        };
        assert_eq!(found.and_then(|b| b.attr("n")), Some("1"));
        assert_eq!(root.children_named("b").count(), 2);
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut elem = Element::parse(r#"<g Width="1" Height="2" X="3"/>"#).unwrap();
        elem.set_attr("Height", "20");
        elem.set_attr("Y", "4");
        let names: Vec<_> = elem.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["Width", "Height", "X", "Y"]);
        assert_eq!(elem.attr("Height"), Some("20"));
    }

    #[test]
    fn comments_are_dropped_and_cdata_becomes_text() {
        let root = Element::parse("<a><!-- note --><![CDATA[1 < 2]]></a>").unwrap();
        assert_eq!(root.children, vec![Node::Text("1 < 2".to_owned())]);
    }

    #[test]
    fn unclosed_and_mismatched_tags_are_errors() {
        assert!(Element::parse("<a><b></b>").is_err());
        assert!(Element::parse("<a><b></a>").is_err());
        assert!(Element::parse("").is_err());
    }

    #[test]
    fn written_document_parses_back() {
        let src = "<BDN Version=\"0.93\">\n  <Events>\n    <Event InTC=\"00:00:01:00\">\
                   <Graphic Width=\"4\">a &amp; b.png</Graphic></Event>\n  </Events>\n</BDN>";
        let root = Element::parse(src).unwrap();
        let bytes = root.to_xml_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("a &amp; b.png"));
        assert_eq!(Element::parse(&text).unwrap(), root);
    }
}
