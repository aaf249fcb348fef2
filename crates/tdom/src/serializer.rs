//! HTML/XML serializer
//!
//! A `Visitor` that renders elements as markup:
//! - attributes in the element's stable (first-insertion) order
//! - empty elements self-closed (`<br />`) unless the tag is configured
//!   never to self-close (`<div></div>`)
//! - `&`, `<`, `>` escaped everywhere, `"` inside attribute values, and
//!   anything outside printable ASCII as a numeric character reference

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{Attribute, Node, Text};
use crate::visit::{ElementRef, Visitor};

/// Tags rendered as an explicit open/close pair even when empty
pub const DEFAULT_NEVER_SELF_CLOSE: &[&str] = &["div", "a", "script"];

/// Serializer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    pub never_self_close: Vec<String>,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            never_self_close: DEFAULT_NEVER_SELF_CLOSE
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SerializerConfig {
    /// Load from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// DOM Tree Serializer
pub struct DomSerializer {
    never_self_close: AHashSet<String>,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            never_self_close: config.never_self_close.into_iter().collect(),
        }
    }

    /// Render `node` into `out`. The sink is neither flushed nor closed.
    pub fn write_to<W: Write>(
        &self,
        dom: &DomArena,
        node: impl Into<Node>,
        out: &mut W,
    ) -> Result<()> {
        let mut visitor = HtmlVisitor::new(out, &self.never_self_close);
        node.into().accept(dom, &mut visitor)
    }

    /// Render `node` to a string
    pub fn serialize(&self, dom: &DomArena, node: impl Into<Node>) -> Result<String> {
        let mut buf = Vec::with_capacity(1024);
        self.write_to(dom, node, &mut buf)?;
        String::from_utf8(buf).map_err(|e| DomError::SerializationError(e.to_string()))
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// The markup-emitting visitor behind `DomSerializer`
pub struct HtmlVisitor<'a, W: Write> {
    out: &'a mut W,
    never_self_close: &'a AHashSet<String>,
}

impl<'a, W: Write> HtmlVisitor<'a, W> {
    pub fn new(out: &'a mut W, never_self_close: &'a AHashSet<String>) -> Self {
        Self {
            out,
            never_self_close,
        }
    }

    fn raw(&mut self, s: &str) -> Result<()> {
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    fn escaped(&mut self, s: &str, in_attribute: bool) -> Result<()> {
        let mut buf = String::with_capacity(s.len());
        escape_into(s, in_attribute, &mut buf);
        self.raw(&buf)
    }
}

impl<W: Write> Visitor for HtmlVisitor<'_, W> {
    fn visit_text(&mut self, text: &Text) -> Result<()> {
        self.escaped(text.as_str(), false)
    }

    fn visit_attr(&mut self, attr: &Attribute) -> Result<()> {
        self.raw(attr.name())?;
        if let Some(value) = attr.value() {
            self.raw("=\"")?;
            self.escaped(value, true)?;
            self.raw("\"")?;
        }
        Ok(())
    }

    fn visit_element(&mut self, element: ElementRef<'_>) -> Result<()> {
        let tag = element.tag();
        self.raw("<")?;
        self.raw(tag)?;
        for attr in element.attributes() {
            self.raw(" ")?;
            self.visit_attr(attr)?;
        }

        if !element.has_children() {
            if self.never_self_close.contains(tag) {
                self.raw("></")?;
                self.raw(tag)?;
                return self.raw(">");
            }
            return self.raw(" />");
        }

        self.raw(">")?;
        for child in element.children() {
            child?.accept(self)?;
        }
        self.raw("</")?;
        self.raw(tag)?;
        self.raw(">")
    }
}

/// Append `s` to `out` with markup escaping applied
pub fn escape_into(s: &str, in_attribute: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            c if (c as u32) < 127 => out.push(c),
            c => {
                out.push_str("&#");
                out.push_str(&(c as u32).to_string());
                out.push(';');
            }
        }
    }
}
