//! Selector builder
//!
//! Produces structural selectors such as
//! `div[role="main"]:nth-of-type(2) > p:nth-of-type(3)` or `#intro > p:nth-of-type(1)`.
//! Escaping follows `CSS.escape`.

use worm_dom::{DomTree, ElementData, NodeId};

use crate::{PAGE_SCOPE, SYSTEM_ATTR_PREFIX};

/// Stable attributes kept per path segment
const MAX_SEGMENT_ATTRS: usize = 2;

/// Escape a string for use as a CSS identifier (`CSS.escape`)
pub fn css_escape(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    for (i, &c) in chars.iter().enumerate() {
        let code = c as u32;
        match c {
            '\0' => out.push(char::REPLACEMENT_CHARACTER),
            '\u{1}'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\{code:x} ")),
            '0'..='9' if i == 0 || (i == 1 && chars[0] == '-') => {
                out.push_str(&format!("\\{code:x} "));
            }
            '-' if i == 0 && chars.len() == 1 => out.push_str("\\-"),
            _ if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() => out.push(c),
            _ => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

/// Quote a string for an attribute selector value
pub fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push(char::REPLACEMENT_CHARACTER),
            '\u{1}'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\{:x} ", c as u32)),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Id usable as a selector shortcut: `^[A-Za-z][A-Za-z0-9_\-:.]*$`
pub fn is_valid_id(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))
}

/// First two `data-*` / `aria-*` / `role` attributes, system ones excluded
pub fn stable_attrs(element: &ElementData) -> Vec<(&str, &str)> {
    element
        .attrs
        .iter()
        .filter(|a| {
            let name = a.name.as_str();
            !name.starts_with(SYSTEM_ATTR_PREFIX)
                && (name.starts_with("data-") || name.starts_with("aria-") || name == "role")
        })
        .take(MAX_SEGMENT_ATTRS)
        .map(|a| (a.name.as_str(), a.value.as_str()))
        .collect()
}

/// `tag[attr="v"]:nth-of-type(n)` for one element; owned siblings are not counted
pub fn path_segment(tree: &DomTree, element: NodeId) -> Option<String> {
    let data = tree.element(element)?;
    let mut segment = css_escape(&data.tag);
    for (name, value) in stable_attrs(data) {
        segment.push_str(&format!("[{}={}]", css_escape(name), css_string(value)));
    }
    let nth = tree.nth_of_type_excluding(element, PAGE_SCOPE);
    segment.push_str(&format!(":nth-of-type({nth})"));
    Some(segment)
}

/// Structural path from `element` up to, not including, `<body>`
///
/// Stops early at the first element (self or ancestor) with a valid id.
/// Returns `body` when `element` is the body itself.
pub fn build_selector(tree: &DomTree, element: NodeId) -> String {
    let mut parts = Vec::new();
    let mut current = Some(element);

    while let Some(node) = current {
        let Some(data) = tree.element(node) else {
            break;
        };
        if data.tag == "body" || data.tag == "html" {
            break;
        }
        if let Some(id) = data.id().filter(|id| is_valid_id(id)) {
            parts.push(format!("#{}", css_escape(id)));
            break;
        }
        if let Some(segment) = path_segment(tree, node) {
            parts.push(segment);
        }
        current = tree.parent_element(node);
    }

    if parts.is_empty() {
        return tree.tag_name(element).unwrap_or("body").to_string();
    }
    parts.reverse();
    parts.join(" > ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_escape() {
        assert_eq!(css_escape("simple-id_1"), "simple-id_1");
        assert_eq!(css_escape("1abc"), "\\31 abc");
        assert_eq!(css_escape("-1x"), "-\\31 x");
        assert_eq!(css_escape("-"), "\\-");
        assert_eq!(css_escape("a:b.c"), "a\\:b\\.c");
        assert_eq!(css_escape("a\u{7}b"), "a\\7 b");
        assert_eq!(css_escape("naïve"), "naïve");
        assert_eq!(css_escape("a b"), "a\\ b");
    }

    #[test]
    fn test_css_string() {
        assert_eq!(css_string(r#"say "hi"\"#), r#""say \"hi\"\\""#);
        assert_eq!(css_string("line\nbreak"), "\"line\\a break\"");
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("intro"));
        assert!(is_valid_id("a1:b.c-d_e"));
        assert!(!is_valid_id("1abc"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("has space"));
        assert!(!is_valid_id("ünï"));
    }

    #[test]
    fn test_stable_attrs_skip_system() {
        let mut el = ElementData::new("div");
        for (k, v) in [
            ("class", "x"),
            ("data-worm-id", "1"),
            ("role", "note"),
            ("aria-label", "L"),
            ("data-k", "v"),
        ] {
            el.attrs.push(worm_dom::Attribute {
                name: k.into(),
                value: v.into(),
            });
        }

        assert_eq!(stable_attrs(&el), vec![("role", "note"), ("aria-label", "L")]);
    }

    #[test]
    fn test_build_selector_paths() {
        let doc = worm_html::parse(
            r#"<body><div><p>a</p><p data-k="v">b</p></div><section id="s"><ul><li>x</li><li>y</li></ul></section></body>"#,
        );
        let tree = doc.tree();
        let ps = tree.query_selector_all(tree.root(), "p").unwrap();
        let lis = tree.query_selector_all(tree.root(), "li").unwrap();

        let sel = build_selector(tree, ps[1]);
        assert_eq!(sel, r#"div:nth-of-type(1) > p[data-k="v"]:nth-of-type(2)"#);
        assert_eq!(tree.query_selector(tree.root(), &sel).unwrap(), Some(ps[1]));

        let sel = build_selector(tree, lis[1]);
        assert_eq!(sel, "#s > ul:nth-of-type(1) > li:nth-of-type(2)");
        assert_eq!(tree.query_selector(tree.root(), &sel).unwrap(), Some(lis[1]));

        assert_eq!(build_selector(tree, doc.body().unwrap()), "body");
    }

    #[test]
    fn test_owned_siblings_not_counted() {
        let doc = worm_html::parse(
            r#"<body><div><p>a</p><div data-worm-owned="true"></div><div>b</div></div></body>"#,
        );
        let tree = doc.tree();
        let b = tree.query_selector_all(tree.root(), "div").unwrap()[2];

        let sel = build_selector(tree, b);
        assert_eq!(sel, "div:nth-of-type(1) > div:nth-of-type(1)");
        let found = tree.query_selector_excluding(tree.root(), &sel, PAGE_SCOPE).unwrap();
        assert_eq!(found, Some(b));
    }

    #[test]
    fn test_escaped_id_selector_round_trips() {
        let doc = worm_html::parse(r#"<body><div id="a.b"><span>t</span></div></body>"#);
        let tree = doc.tree();
        let span = tree.query_selector(tree.root(), "span").unwrap().unwrap();

        let sel = build_selector(tree, span);
        assert_eq!(sel, "#a\\.b > span:nth-of-type(1)");
        assert_eq!(tree.query_selector(tree.root(), &sel).unwrap(), Some(span));
    }
}
