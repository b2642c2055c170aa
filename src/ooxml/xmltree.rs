//! Mutable, order-preserving XML element tree.
//!
//! The read-only parts of the package are scanned with streaming `quick-xml`
//! readers, but templating edits slide content destructively (rows removed,
//! fills replaced, runs rewritten). Slide parts are therefore parsed into this
//! small tree, edited in place, and serialized back into the part blob.
//!
//! Positions inside the tree are addressed with [`NodePath`]s: the child indices
//! leading from the root to an element. Paths are cheap to compute and are
//! always recomputed after a structural edit, never stored across one.
use crate::common::xml::{escape_xml, escape_xml_text, resolve_entity, unescape_xml};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;

/// Standard declaration written in front of every serialized part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Child-index path from a root element to one of its descendants.
pub type NodePath = SmallVec<[usize; 8]>;

/// A node in the tree: either an element or a run of character data.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its qualified name, ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element with a qualified name such as `a:tc`.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style child appender.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder-style text appender.
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    /// Qualified name, including the prefix.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local name, without the namespace prefix.
    #[inline]
    pub fn local_name(&self) -> &str {
        match self.name.rfind(':') {
            Some(pos) => &self.name[pos + 1..],
            None => &self.name,
        }
    }

    /// Check the local name.
    #[inline]
    pub fn is(&self, local_name: &str) -> bool {
        self.local_name() == local_name
    }

    /// Get an attribute by its qualified name (e.g. `r:embed`).
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its original position when it already exists.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((key.to_string(), value.to_string())),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(pos).1)
    }

    /// All attributes in document order.
    #[inline]
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// All child nodes, including text.
    #[inline]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Mutable access to the child node list.
    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<XmlNode> {
        &mut self.children
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Mutable child elements, skipping text.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.is(local_name))
    }

    /// First child element with the given local name, mutably.
    pub fn child_mut(&mut self, local_name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|el| el.is(local_name))
    }

    /// Child elements with the given local name.
    pub fn children_named<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |el| el.is(local_name))
    }

    /// Follow a chain of local names through first-matching children.
    pub fn find_child_chain(&self, chain: &[&str]) -> Option<&XmlElement> {
        let mut current = self;
        for name in chain {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// Mutable variant of [`find_child_chain`](Self::find_child_chain).
    pub fn find_child_chain_mut(&mut self, chain: &[&str]) -> Option<&mut XmlElement> {
        let mut current = self;
        for name in chain {
            current = current.child_mut(name)?;
        }
        Some(current)
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Insert a child element at a node index.
    pub fn insert_child(&mut self, index: usize, child: XmlElement) {
        let index = index.min(self.children.len());
        self.children.insert(index, XmlNode::Element(child));
    }

    /// Append character data, merging with a trailing text node.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(XmlNode::Text(existing)) => existing.push_str(text),
            _ => self.children.push(XmlNode::Text(text.to_string())),
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        self.push_text(text);
    }

    /// Concatenated character data of this element and all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Remove every child element matching the predicate; returns how many were removed.
    pub fn remove_children_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&XmlElement) -> bool,
    {
        let before = self.children.len();
        self.children.retain(|node| match node {
            XmlNode::Element(el) => !pred(el),
            XmlNode::Text(_) => true,
        });
        before - self.children.len()
    }

    /// Node index of the n-th child element with the given local name.
    pub fn child_index(&self, local_name: &str, nth: usize) -> Option<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, XmlNode::Element(el) if el.is(local_name)))
            .nth(nth)
            .map(|(i, _)| i)
    }

    /// Pre-order iterator over all descendant elements (not including `self`).
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Paths of all descendant elements matching the predicate, in document order.
    pub fn find_paths<F>(&self, pred: F) -> Vec<NodePath>
    where
        F: Fn(&XmlElement) -> bool,
    {
        let mut out = Vec::new();
        let mut path = NodePath::new();
        self.collect_paths(&pred, &mut path, &mut out);
        out
    }

    fn collect_paths<F>(&self, pred: &F, path: &mut NodePath, out: &mut Vec<NodePath>)
    where
        F: Fn(&XmlElement) -> bool,
    {
        for (i, node) in self.children.iter().enumerate() {
            if let XmlNode::Element(el) = node {
                path.push(i);
                if pred(el) {
                    out.push(path.clone());
                }
                el.collect_paths(pred, path, out);
                path.pop();
            }
        }
    }

    /// Resolve a path to an element.
    pub fn at_path(&self, path: &[usize]) -> Option<&XmlElement> {
        let mut current = self;
        for &i in path {
            current = match current.children.get(i)? {
                XmlNode::Element(el) => el,
                XmlNode::Text(_) => return None,
            };
        }
        Some(current)
    }

    /// Resolve a path to an element, mutably.
    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut XmlElement> {
        let mut current = self;
        for &i in path {
            current = match current.children.get_mut(i)? {
                XmlNode::Element(el) => el,
                XmlNode::Text(_) => return None,
            };
        }
        Some(current)
    }

    /// Detach the element at `path` from its parent.
    pub fn remove_at_path(&mut self, path: &[usize]) -> Option<XmlElement> {
        let (last, parent_path) = path.split_last()?;
        let parent = self.at_path_mut(parent_path)?;
        if !matches!(parent.children.get(*last), Some(XmlNode::Element(_))) {
            return None;
        }
        match parent.children.remove(*last) {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        }
    }

    /// Whether any proper ancestor of the element at `path` has the given local name.
    pub fn has_ancestor(&self, path: &[usize], local_name: &str) -> bool {
        let Some((_, parent_path)) = path.split_last() else {
            return false;
        };
        let mut current = self;
        for &i in parent_path {
            current = match current.children.get(i) {
                Some(XmlNode::Element(el)) => el,
                _ => return false,
            };
            if current.is(local_name) {
                return true;
            }
        }
        false
    }

    /// Serialize this element (without a declaration).
    pub fn to_xml_string(&self) -> String {
        let mut out = String::with_capacity(256);
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(&escape_xml_text(t)),
                XmlNode::Element(el) => el.write_xml(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Parse a standalone fragment or document and return its root element.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Ok(XmlDocument::parse(xml)?.root)
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let qname = start.name();
        let name = std::str::from_utf8(qname.as_ref())
            .map_err(|e| OoxmlError::Xml(format!("Invalid UTF-8 in tag name: {}", e)))?;
        let mut element = XmlElement::new(name);
        for attr in start.attributes() {
            let attr = attr.map_err(|e| OoxmlError::Xml(e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| OoxmlError::Xml(format!("Invalid UTF-8 in attribute key: {}", e)))?;
            let raw = std::str::from_utf8(&attr.value)
                .map_err(|e| OoxmlError::Xml(format!("Invalid UTF-8 in attribute value: {}", e)))?;
            element.attrs.push((key.to_string(), unescape_xml(raw)));
        }
        Ok(element)
    }
}

/// Pre-order iterator returned by [`XmlElement::descendants`].
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, XmlNode>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(XmlNode::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                },
                Some(XmlNode::Text(_)) => {},
                None => {
                    self.stack.pop();
                },
            }
        }
        None
    }
}

/// A parsed XML part: the root element plus serialization back to bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    /// Parse XML bytes into a tree.
    ///
    /// Comments, processing instructions and the declaration are dropped; a
    /// standard declaration is written back by [`to_bytes`](Self::to_bytes).
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => stack.push(XmlElement::from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = XmlElement::from_start(e)?;
                    Self::attach(&mut stack, &mut root, element)?;
                },
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| OoxmlError::Xml("Unbalanced end tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, element)?;
                },
                Ok(Event::Text(ref t)) => {
                    if let Some(current) = stack.last_mut() {
                        let raw = std::str::from_utf8(t)
                            .map_err(|e| OoxmlError::Xml(format!("Invalid UTF-8 in text: {}", e)))?;
                        current.push_text(&unescape_xml(raw));
                    }
                },
                Ok(Event::CData(c)) => {
                    if let Some(current) = stack.last_mut() {
                        let raw = std::str::from_utf8(&c)
                            .map_err(|e| OoxmlError::Xml(format!("Invalid UTF-8 in CDATA: {}", e)))?;
                        current.push_text(raw);
                    }
                },
                Ok(Event::GeneralRef(ref r)) => {
                    if let Some(current) = stack.last_mut() {
                        let name = std::str::from_utf8(r)
                            .map_err(|e| OoxmlError::Xml(format!("Invalid UTF-8 in entity: {}", e)))?;
                        match resolve_entity(name) {
                            Some(ch) => current.push_text(ch.encode_utf8(&mut [0u8; 4])),
                            None => current.push_text(&format!("&{};", name)),
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(format!("XML parse error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(OoxmlError::Xml("Unclosed element at end of input".to_string()));
        }
        root.map(|root| Self { root })
            .ok_or_else(|| OoxmlError::Xml("No root element found".to_string()))
    }

    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
    ) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.push_child(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(OoxmlError::Xml("Multiple root elements".to_string())),
        }
        Ok(())
    }

    /// Serialize with the standard declaration.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(4096);
        out.push_str(XML_DECLARATION);
        out.push_str("\r\n");
        self.root.write_xml(&mut out);
        out.into_bytes()
    }
}
