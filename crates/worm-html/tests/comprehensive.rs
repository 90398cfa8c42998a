//! Comprehensive tests for worm-html
//!
//! Parsing edge cases and the layout the parser hands back.

use worm_dom::DOMRect;
use worm_html::{HtmlParser, parse, parse_with_url};

#[test]
fn test_parse_minimal_html() {
    let doc = parse("");
    assert!(doc.body().is_some(), "Even empty HTML gets a body");
}

#[test]
fn test_parse_text_only() {
    let doc = parse("Hello World");
    assert_eq!(doc.tree().text_content(doc.body().unwrap()), "Hello World");
}

#[test]
fn test_parse_void_elements() {
    let doc = parse(r#"<br><hr><img src="test.png"><input type="text">"#);
    let body = doc.body().unwrap();

    let tags: Vec<_> = doc
        .tree()
        .element_children(body)
        .filter_map(|c| doc.tree().tag_name(c))
        .collect();
    assert_eq!(tags, vec!["br", "hr", "img", "input"]);
}

#[test]
fn test_parse_nested_structure() {
    let html = r#"
        <html>
            <head>
                <title>Test Page</title>
                <meta charset="utf-8">
            </head>
            <body>
                <div id="container">
                    <h1>Welcome</h1>
                    <p class="intro">This is a test.</p>
                    <ul>
                        <li>Item 1</li>
                        <li>Item 2</li>
                    </ul>
                </div>
            </body>
        </html>
    "#;

    let doc = parse(html);
    let tree = doc.tree();
    assert_eq!(doc.title(), "Test Page");
    let container = doc.get_element_by_id("container").unwrap();
    assert_eq!(tree.query_selector_all(container, "li").unwrap().len(), 2);
    assert_eq!(
        tree.query_selector(tree.root(), "p.intro").unwrap().map(|p| tree.text_content(p)),
        Some("This is a test.".to_string())
    );
}

#[test]
fn test_parse_malformed_html() {
    let html = r#"
        <div>
            <p>Unclosed paragraph
            <span>Unclosed span
        </div>
        <p>After"#;

    let doc = parse(html);
    let paragraphs = doc.tree().query_selector_all(doc.tree().root(), "p").unwrap();
    assert_eq!(paragraphs.len(), 2);
}

#[test]
fn test_head_content_not_rendered() {
    let doc = parse("<head><style>p{}</style></head><body><script>x()</script><p>Hi</p></body>");
    let tree = doc.tree();

    let style = tree.query_selector(tree.root(), "style").unwrap().unwrap();
    let script = tree.query_selector(tree.root(), "script").unwrap().unwrap();
    let p = tree.query_selector(tree.root(), "p").unwrap().unwrap();
    assert!(!doc.has_client_rect(style));
    assert!(!doc.has_client_rect(script));
    assert_eq!(doc.bounding_client_rect(p), Some(DOMRect::from_xywh(0.0, 0.0, 1024.0, 20.0)));
}

#[test]
fn test_image_sized_from_attributes() {
    let doc = HtmlParser::new()
        .with_viewport(800.0, 600.0)
        .parse(r#"<p>Intro</p><img id="pic" src="/a.png" width="100" height="50">"#);

    let img = doc.get_element_by_id("pic").unwrap();
    assert_eq!(doc.bounding_client_rect(img), Some(DOMRect::from_xywh(0.0, 20.0, 100.0, 50.0)));
    assert_eq!(doc.viewport().width, 800.0);
}

#[test]
fn test_url_kept() {
    let doc = parse_with_url("<p>x</p>", "https://example.com/a?b=1#c");
    assert_eq!(doc.url(), "https://example.com/a?b=1#c");
}

#[test]
fn test_attribute_case_folded() {
    let doc = parse(r#"<DIV DATA-Kind="Note">x</DIV>"#);
    let div = doc.tree().query_selector(doc.tree().root(), "div").unwrap().unwrap();
    assert_eq!(doc.tree().get_attribute(div, "data-kind"), Some("Note"));
}
