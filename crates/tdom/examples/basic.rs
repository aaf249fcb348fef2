//! Basic example - build a page, mutate it through selectors, render it

use tdom::{attr, text, DomArena, DomSerializer, Node, TreeOps};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut dom = DomArena::new();
    let serializer = DomSerializer::new();

    let title = dom.element("title", [text("A title")])?;
    let head = dom.element("head", [title])?;
    let content = dom.element(
        "div",
        [Node::from(attr("class", "content")), text("Hello, world.").into()],
    )?;
    let body = dom.element("body", [content])?;
    let html = dom.element("html", [head, body])?;

    // Insert a heading before the content div
    let heading = dom.element("h1", [text("The Title")])?;
    html.before_matching(&mut dom, ".content", heading)?;

    let selected = html.select(&dom, ".content")?;
    println!("{}", serializer.serialize(&dom, selected)?);

    let goodbye = dom.element(
        "div",
        [Node::from(attr("class", "content")), text("Goodbye, World").into()],
    )?;
    html.append_matching(&mut dom, "body", goodbye)?;

    let selected = html.select(&dom, ".content")?;
    println!("{}", serializer.serialize(&dom, selected)?);

    // One rule, two matches: the second div gets its own copy
    let hr = dom.element("hr", [attr("class", "space")])?;
    html.after_matching(&mut dom, ".content", hr)?;

    let stylesheet = dom.element(
        "link",
        [attr("rel", "stylesheet"), attr("href", "css/style.css")],
    )?;
    html.append_matching(&mut dom, "head", stylesheet)?;

    let mut stdout = std::io::stdout().lock();
    serializer.write_to(&dom, html, &mut stdout)?;
    println!();

    Ok(())
}
