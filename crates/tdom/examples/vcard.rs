//! Custom visitor example - render hCard markup as a vCard
//!
//! The same tree is rendered twice: once as HTML, once through a visitor
//! that only understands the hCard class names.

use std::fmt::Write as _;

use tdom::{
    attr, text, Attribute, ChildRef, DomArena, DomSerializer, ElementRef, Node, Text, TreeOps,
    Visitor,
};

/// Simple-minded vCard renderer, just for the demo
#[derive(Default)]
struct VCardRenderer {
    out: String,
}

impl VCardRenderer {
    fn visit_child_elements(&mut self, element: ElementRef<'_>) -> tdom::Result<()> {
        for child in element.children() {
            if let ChildRef::Element(e) = child? {
                self.visit_element(e)?;
            }
        }
        Ok(())
    }

    fn line(&mut self, s: &str) {
        self.out.push_str(s);
        self.out.push('\n');
    }
}

impl Visitor for VCardRenderer {
    fn visit_text(&mut self, text: &Text) -> tdom::Result<()> {
        self.out.push_str(text.as_str());
        Ok(())
    }

    fn visit_attr(&mut self, _attr: &Attribute) -> tdom::Result<()> {
        Ok(())
    }

    fn visit_element(&mut self, element: ElementRef<'_>) -> tdom::Result<()> {
        let Some(class) = element.attr("class").and_then(Attribute::value) else {
            return self.visit_child_elements(element);
        };

        match class {
            "vcard" => {
                self.line("BEGIN:VCARD");
                self.line("VERSION:4.0");
                self.visit_child_elements(element)?;
                self.line("END:VCARD");
            }
            "photo" => {
                let src = element.attr("src").and_then(Attribute::value).unwrap_or("");
                let _ = writeln!(self.out, "PHOTO:{src}");
            }
            "fn" | "title" | "org" => {
                let _ = write!(self.out, "{}:", class.to_uppercase());
                for child in element.children() {
                    if let ChildRef::Text(t) = child? {
                        self.visit_text(t)?;
                    }
                }
                self.out.push('\n');
            }
            _ => {}
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut dom = DomArena::new();

    let title = dom.element("title", [text("A title")])?;
    let head = dom.element("head", [title])?;
    let h1 = dom.element("h1", [text("This is the info for a user")])?;
    let body = dom.element("body", [h1])?;
    let html = dom.element("html", [head, body])?;

    let photo = dom.element(
        "img",
        [attr("class", "photo"), attr("src", "http://example.com/bob.jpg")],
    )?;
    let name = dom.element(
        "strong",
        [Node::from(attr("class", "fn")), text("Bob Smith").into()],
    )?;
    let role = dom.element(
        "span",
        [Node::from(attr("class", "title")), text("Senior editor").into()],
    )?;
    let org = dom.element(
        "span",
        [Node::from(attr("class", "org")), text("ACME Reviews").into()],
    )?;
    let card = dom.element(
        "div",
        [
            Node::from(attr("class", "vcard")),
            photo.into(),
            name.into(),
            text(" is the ").into(),
            role.into(),
            text(" at ").into(),
            org.into(),
        ],
    )?;

    html.append_matching(&mut dom, "body", card)?;
    let footer = dom.element("h3", [text("This is a footer")])?;
    html.append_matching(&mut dom, "body", footer)?;

    println!("{}", DomSerializer::new().serialize(&dom, html)?);

    let mut renderer = VCardRenderer::default();
    Node::from(html.select(&dom, ".vcard")?).accept(&dom, &mut renderer)?;
    print!("{}", renderer.out);

    Ok(())
}
