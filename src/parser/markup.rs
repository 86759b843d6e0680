use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};

/// One element of the report, flattened into document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Lowercased local name (`div`, `pre`, `p`, `meta`, ...).
    pub tag: String,
    attrs: Vec<(String, String)>,
    /// Character data between the start tag and the first child element.
    pub text: String,
}

impl Node {
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Attribute value, or `""` when the attribute is absent.
    pub fn attr(&self, name: &str) -> &str {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }
}

/// Parse well-formed markup into its element nodes, in document order.
///
/// Anything an XML parser would reject (mismatched or unclosed tags, unknown
/// entities, stray text or a second element after the root) is a
/// [`Error::MalformedDocument`].
pub fn parse_nodes(markup: &str) -> Result<Vec<Node>> {
    let mut reader = Reader::from_str(markup);
    let mut nodes: Vec<Node> = Vec::new();
    // (index into nodes, has a child element been seen yet)
    let mut open: Vec<(usize, bool)> = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                enter_element(&mut open, &mut saw_root)?;
                nodes.push(node_from(&e)?);
                open.push((nodes.len() - 1, false));
            }
            Event::Empty(e) => {
                enter_element(&mut open, &mut saw_root)?;
                nodes.push(node_from(&e)?);
            }
            Event::End(_) => {
                if open.pop().is_none() {
                    return Err(Error::MalformedDocument("unmatched end tag".into()));
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                push_text(&mut nodes, &open, &text)?;
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                push_text(&mut nodes, &open, &text)?;
            }
            Event::Eof => break,
            // Declarations, doctype, comments and processing instructions carry no fields.
            _ => {}
        }
    }

    if let Some(&(idx, _)) = open.last() {
        return Err(Error::MalformedDocument(format!(
            "unclosed element <{}>",
            nodes[idx].tag
        )));
    }
    if !saw_root {
        return Err(Error::MalformedDocument("no root element".into()));
    }
    Ok(nodes)
}

fn enter_element(open: &mut [(usize, bool)], saw_root: &mut bool) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.1 = true,
        None if *saw_root => {
            return Err(Error::MalformedDocument(
                "junk after document element".into(),
            ))
        }
        None => *saw_root = true,
    }
    Ok(())
}

fn push_text(nodes: &mut [Node], open: &[(usize, bool)], text: &str) -> Result<()> {
    match open.last() {
        Some(&(idx, false)) => nodes[idx].text.push_str(text),
        Some(_) => {} // tail text after a child element
        None if text.trim().is_empty() => {}
        None => {
            return Err(Error::MalformedDocument(
                "text outside the root element".into(),
            ))
        }
    }
    Ok(())
}

fn node_from(e: &BytesStart<'_>) -> Result<Node> {
    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(Node {
        tag,
        attrs,
        text: String::new(),
    })
}
