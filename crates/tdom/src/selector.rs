//! Selector engine
//!
//! A selector is one or more whitespace-separated simple selectors. Each
//! stage is evaluated against the full subtree (root included) of every
//! element matched by the previous stage.
//!
//! ```text
//! TAG                  exact tag name
//! .CLASS   TAG.CLASS   class attribute contains CLASS as a token
//! #ID      TAG#ID      id attribute contains ID as a token
//! [ATTR]   TAG[ATTR]   attribute present (with or without a value)
//! [ATTR='VALUE']       attribute value equals VALUE
//! [ATTR=~'VALUE']      attribute value contains VALUE as a token
//! ```
//!
//! Values may be quoted with `'` or `"` and may contain whitespace.
//! Attribute names are matched case-insensitively, tag names exactly.

use std::fmt;
use std::str::FromStr;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::node_set::NodeSet;
use crate::types::{ElementNode, NodeId};
use crate::utils;

/// Predicate attached to an optional tag name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Class(String),
    Id(String),
    HasAttr(String),
    AttrEquals { name: String, value: String },
    AttrContainsToken { name: String, value: String },
}

impl Filter {
    fn matches(&self, node: &ElementNode) -> bool {
        match self {
            Filter::Class(class) => utils::attr_has_token(node, "class", class),
            // Ids are token-matched exactly like class lists
            Filter::Id(id) => utils::attr_has_token(node, "id", id),
            Filter::HasAttr(name) => node.attr(name).is_some(),
            Filter::AttrEquals { name, value } => {
                node.attr(name).and_then(|a| a.value()) == Some(value.as_str())
            }
            Filter::AttrContainsToken { name, value } => {
                utils::attr_has_token(node, name, value)
            }
        }
    }
}

/// One whitespace-free clause of a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleSelector {
    pub tag: Option<String>,
    pub filter: Option<Filter>,
}

impl SimpleSelector {
    pub fn matches(&self, node: &ElementNode) -> bool {
        self.tag.as_deref().map_or(true, |tag| tag == node.tag())
            && self.filter.as_ref().map_or(true, |f| f.matches(node))
    }

    /// Add every element of the subtree at `root` (root included) that
    /// matches, in document order. Matching never stops descent.
    pub fn collect(&self, dom: &DomArena, root: NodeId, acc: &mut NodeSet) -> Result<()> {
        dom.traverse_df(root, |id, node| {
            if self.matches(node) {
                acc.push(id);
            }
            Ok(())
        })
    }
}

/// Parsed selector: a descendant chain of simple selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<SimpleSelector>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self> {
        let parts = split_parts(selector)?
            .into_iter()
            .map(|part| parse_simple(part, selector))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[SimpleSelector] {
        &self.parts
    }

    /// Evaluate against the subtree rooted at `root`
    pub fn select(&self, dom: &DomArena, root: NodeId) -> Result<NodeSet> {
        let mut current = NodeSet::single(root);

        for part in &self.parts {
            let mut next = NodeSet::new();
            for member in current.iter() {
                part.collect(dom, member, &mut next)?;
            }
            current = next;
        }

        tracing::trace!("Selector '{}' under {} matched {} nodes", self, root, current.len());
        Ok(current)
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        match &self.filter {
            None => Ok(()),
            Some(Filter::Class(c)) => write!(f, ".{c}"),
            Some(Filter::Id(id)) => write!(f, "#{id}"),
            Some(Filter::HasAttr(name)) => write!(f, "[{name}]"),
            Some(Filter::AttrEquals { name, value }) => {
                write!(f, "[{name}={}]", quote(value))
            }
            Some(Filter::AttrContainsToken { name, value }) => {
                write!(f, "[{name}=~{}]", quote(value))
            }
        }
    }
}

fn quote(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{value}\"")
    } else {
        format!("'{value}'")
    }
}

impl DomArena {
    /// Find all elements under (and including) `root` matching `selector`
    pub fn select(&self, root: NodeId, selector: &str) -> Result<NodeSet> {
        Selector::parse(selector)?.select(self, root)
    }

    pub fn select_parsed(&self, root: NodeId, selector: &Selector) -> Result<NodeSet> {
        selector.select(self, root)
    }
}

/// Split on whitespace that is outside brackets and quotes
fn split_parts(selector: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;
    let mut in_brackets = false;

    for (i, c) in selector.char_indices() {
        if quote.is_none() && !in_brackets && c.is_whitespace() {
            if let Some(s) = start.take() {
                parts.push(&selector[s..i]);
            }
            continue;
        }
        start.get_or_insert(i);

        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '[' => in_brackets = true,
                ']' => in_brackets = false,
                '\'' | '"' if in_brackets => quote = Some(c),
                _ => {}
            },
        }
    }
    if let Some(s) = start {
        parts.push(&selector[s..]);
    }

    if quote.is_some() {
        return Err(DomError::syntax(selector, "unterminated quote"));
    }
    if in_brackets {
        return Err(DomError::syntax(selector, "unclosed '['"));
    }
    if parts.is_empty() {
        return Err(DomError::syntax(selector, "empty selector"));
    }
    Ok(parts)
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '.' | '#' | '[' | ']' | '=' | '~' | '\'' | '"')
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }
}

fn parse_simple(part: &str, selector: &str) -> Result<SimpleSelector> {
    let mut cur = Cursor::new(part);

    let tag = match cur.name() {
        "" => None,
        name => Some(name.to_string()),
    };

    let filter = match cur.peek() {
        None => None,
        Some('.') => {
            cur.bump();
            Some(Filter::Class(required_name(&mut cur, selector, "class name after '.'")?))
        }
        Some('#') => {
            cur.bump();
            Some(Filter::Id(required_name(&mut cur, selector, "id after '#'")?))
        }
        Some('[') => {
            cur.bump();
            Some(parse_attr_filter(&mut cur, selector)?)
        }
        Some(c) => {
            return Err(DomError::syntax(selector, format!("unexpected '{c}'")));
        }
    };

    if let Some(c) = cur.peek() {
        return Err(DomError::syntax(selector, format!("unexpected '{c}' in '{part}'")));
    }
    debug_assert!(cur.at_end());

    Ok(SimpleSelector { tag, filter })
}

fn required_name(cur: &mut Cursor<'_>, selector: &str, what: &str) -> Result<String> {
    match cur.name() {
        "" => Err(DomError::syntax(selector, format!("expected {what}"))),
        name => Ok(name.to_string()),
    }
}

/// Parse the remainder of `[ATTR]`, `[ATTR='V']` or `[ATTR=~'V']` after `[`
fn parse_attr_filter(cur: &mut Cursor<'_>, selector: &str) -> Result<Filter> {
    let name = required_name(cur, selector, "attribute name after '['")?.to_lowercase();

    match cur.bump() {
        Some(']') => Ok(Filter::HasAttr(name)),
        Some('=') => {
            let contains = cur.eat('~');
            let value = quoted_value(cur, selector)?;
            if !cur.eat(']') {
                return Err(DomError::syntax(selector, "expected ']' after value"));
            }
            if contains {
                if value.is_empty() {
                    return Err(DomError::syntax(selector, "empty token after '=~'"));
                }
                Ok(Filter::AttrContainsToken { name, value })
            } else {
                Ok(Filter::AttrEquals { name, value })
            }
        }
        _ => Err(DomError::syntax(
            selector,
            "expected ']' or '=' after attribute name",
        )),
    }
}

fn quoted_value(cur: &mut Cursor<'_>, selector: &str) -> Result<String> {
    let quote = match cur.bump() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(DomError::syntax(selector, "expected quoted value")),
    };

    let mut value = String::new();
    loop {
        match cur.bump() {
            Some(c) if c == quote => return Ok(value),
            Some(c) => value.push(c),
            None => return Err(DomError::syntax(selector, "unterminated quote")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{attr, flag, text, Node};

    fn simple(tag: Option<&str>, filter: Option<Filter>) -> SimpleSelector {
        SimpleSelector {
            tag: tag.map(String::from),
            filter,
        }
    }

    #[test]
    fn test_parse_simple_forms() {
        let cases = [
            ("div", simple(Some("div"), None)),
            (".content", simple(None, Some(Filter::Class("content".into())))),
            ("p.note", simple(Some("p"), Some(Filter::Class("note".into())))),
            ("#main", simple(None, Some(Filter::Id("main".into())))),
            ("div#main", simple(Some("div"), Some(Filter::Id("main".into())))),
            ("a[HREF]", simple(Some("a"), Some(Filter::HasAttr("href".into())))),
            (
                "a[href='x']",
                simple(
                    Some("a"),
                    Some(Filter::AttrEquals {
                        name: "href".into(),
                        value: "x".into(),
                    }),
                ),
            ),
            (
                "[class=~'copyright']",
                simple(
                    None,
                    Some(Filter::AttrContainsToken {
                        name: "class".into(),
                        value: "copyright".into(),
                    }),
                ),
            ),
        ];

        for (input, expected) in cases {
            let parsed = Selector::parse(input).unwrap();
            assert_eq!(parsed.parts(), &[expected], "parsing {input}");
        }
    }

    #[test]
    fn test_parse_descendant_chain() {
        let parsed = Selector::parse("  body   div.tile  span ").unwrap();
        assert_eq!(parsed.parts().len(), 3);
        assert_eq!(parsed.to_string(), "body div.tile span");
    }

    #[test]
    fn test_quoted_value_keeps_whitespace() {
        let parsed = Selector::parse("img[alt=\"a 'quoted' b\"]").unwrap();
        assert_eq!(
            parsed.parts()[0].filter,
            Some(Filter::AttrEquals {
                name: "alt".into(),
                value: "a 'quoted' b".into()
            })
        );
        assert_eq!(parsed.to_string(), "img[alt=\"a 'quoted' b\"]");
    }

    #[test]
    fn test_syntax_errors_name_the_selector() {
        let bad = [
            "",
            "   ",
            ".",
            "#",
            "div.",
            "a[",
            "a[]",
            "a[href",
            "a[href=x]",
            "a[href='x'",
            "a[href='x]",
            "a[href=~'']",
            "a.b.c",
            "a#b.c",
            "a]",
        ];

        for input in bad {
            match Selector::parse(input) {
                Err(DomError::SelectorSyntax { selector, .. }) => assert_eq!(selector, input),
                other => panic!("expected syntax error for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_matching_continues_below_a_match() {
        let mut dom = DomArena::new();
        let inner = dom.element("div", [attr("class", "box")]).unwrap();
        let outer = dom
            .element("div", [Node::from(attr("class", "box")), inner.into()])
            .unwrap();
        let root = dom.element("body", [outer]).unwrap();

        let found = dom.select(root, ".box").unwrap();
        assert_eq!(found.entries(), &[outer, inner]);
    }

    #[test]
    fn test_root_itself_is_tested() {
        let mut dom = DomArena::new();
        let root = dom.element("section", [attr("class", "top")]).unwrap();

        assert_eq!(dom.select(root, "section").unwrap().entries(), &[root]);
        assert_eq!(dom.select(root, ".top").unwrap().entries(), &[root]);
    }

    #[test]
    fn test_descendant_stage_searches_full_subtree() {
        let mut dom = DomArena::new();
        let deep = dom.element("span", [text("x")]).unwrap();
        let em = dom.element("em", [deep]).unwrap();
        let div = dom.element("div", [em]).unwrap();
        let outside = dom.create("span");
        let root = dom.element("body", [div, outside]).unwrap();

        assert_eq!(dom.select(root, "div span").unwrap().entries(), &[deep]);
        assert_eq!(
            dom.select(root, "span").unwrap().entries(),
            &[deep, outside]
        );
    }

    #[test]
    fn test_descendant_union_is_deduplicated() {
        let mut dom = DomArena::new();
        let p = dom.create("p");
        let inner = dom.element("div", [p]).unwrap();
        let outer = dom.element("div", [inner]).unwrap();
        let root = dom.element("body", [outer]).unwrap();

        // p is reachable from both divs but recorded once
        assert_eq!(dom.select(root, "div p").unwrap().entries(), &[p]);
    }

    #[test]
    fn test_id_is_token_matched() {
        // Ids go through the same token routine as class lists, so an id
        // attribute holding several tokens matches each of them.
        let mut dom = DomArena::new();
        let el = dom.element("div", [attr("id", "main secondary")]).unwrap();

        assert_eq!(dom.select(el, "#main").unwrap().entries(), &[el]);
        assert_eq!(dom.select(el, "#secondary").unwrap().entries(), &[el]);
        assert!(dom.select(el, "#mai").unwrap().is_empty());
    }

    #[test]
    fn test_attribute_predicates() {
        let mut dom = DomArena::new();
        let a1 = dom.element("a", [attr("href", "x")]).unwrap();
        let a2 = dom.element("a", [attr("href", "y")]).unwrap();
        let a3 = dom.element("a", [attr("name", "top")]).unwrap();
        let a4 = dom.element("a", [flag("href")]).unwrap();
        let s1 = dom
            .element("span", [attr("class", "footer copyright small")])
            .unwrap();
        let s2 = dom.element("span", [attr("class", "copyrighted")]).unwrap();
        let root = dom
            .element(
                "div",
                [a1, a2, a3, a4, s1, s2].into_iter().map(Node::from),
            )
            .unwrap();

        assert_eq!(
            dom.select(root, "a[href]").unwrap().entries(),
            &[a1, a2, a4]
        );
        assert_eq!(dom.select(root, "a[href='x']").unwrap().entries(), &[a1]);
        assert_eq!(
            dom.select(root, "span[class=~'copyright']").unwrap().entries(),
            &[s1]
        );
        assert_eq!(dom.select(root, "[Name='top']").unwrap().entries(), &[a3]);
    }

    #[test]
    fn test_missing_class_yields_empty_set() {
        let mut dom = DomArena::new();
        let root = dom.element("div", [attr("class", "content")]).unwrap();

        assert!(dom.select(root, ".nothing").unwrap().is_empty());
        assert!(dom.select(root, "#nothing").unwrap().is_empty());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let mut dom = DomArena::new();
        let items: Vec<NodeId> = (0..5)
            .map(|i| dom.element("li", [text(i)]).unwrap())
            .collect();
        let root = dom.element("ul", items.clone()).unwrap();

        let first = dom.select(root, "li").unwrap();
        let second = dom.select(root, "li").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.entries(), items.as_slice());
    }
}
