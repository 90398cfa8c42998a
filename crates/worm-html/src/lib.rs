//! Worm HTML Parser
//!
//! HTML5 parsing built on html5ever; produces a laid-out
//! [`worm_dom::Document`].

mod parser;

pub use parser::HtmlParser;
use worm_dom::Document;

/// Parse an HTML string into a laid-out document at `about:blank`
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse an HTML string into a laid-out document at `url`
pub fn parse_with_url(html: &str, url: &str) -> Document {
    HtmlParser::new().parse_with_url(html, url)
}
