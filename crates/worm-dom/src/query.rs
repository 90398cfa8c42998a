//! CSS selector queries
//!
//! Parses the selector subset used for anchoring (type, universal, id,
//! class, attribute, structural pseudo-classes, descendant and child
//! combinators, selector lists, CSS escapes) and matches it against the
//! tree right to left.

use crate::{DomTree, NodeId};

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected character {ch:?} at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected end of selector")]
    UnexpectedEnd,

    #[error("unsupported pseudo-class :{0}")]
    UnsupportedPseudo(String),

    #[error("invalid An+B expression {0:?}")]
    InvalidNth(String),
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase().replace(' ', "");
        match s.as_str() {
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }
        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::new(0, n));
        }

        let n_pos = s.find('n')?;
        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            a => a.parse().ok()?,
        };
        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() { 0 } else { rest.parse().ok()? };
        Some(Self::new(a, b))
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }
        let diff = n - self.b;
        if self.a > 0 {
            diff >= 0 && diff % self.a == 0
        } else {
            diff <= 0 && diff % self.a == 0
        }
    }
}

/// Structural pseudo-classes
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    FirstOfType,
    LastOfType,
    NthChild(NthExpression),
    NthOfType(NthExpression),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value]
    Exact(String),
    /// [attr~=value]
    Contains(String),
    /// [attr^=value]
    Prefix(String),
    /// [attr$=value]
    Suffix(String),
    /// [attr*=value]
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            return self.matcher.is_none() && value.is_some();
        };
        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(val);
        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
        }
    }
}

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (lowercase tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Pseudo-class :nth-of-type(), etc.
    PseudoClass(PseudoClass),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// `a > b c` as compounds plus the combinators between them
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    compounds: Vec<Vec<SelectorComponent>>,
    combinators: Vec<Combinator>,
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// Elements a query treats as absent
///
/// Excluded elements never match and are skipped when structural
/// pseudo-classes count siblings.
#[derive(Clone, Copy, Default)]
pub struct Exclude(Option<fn(&DomTree, NodeId) -> bool>);

impl Exclude {
    pub const NONE: Exclude = Exclude(None);

    pub const fn new(pred: fn(&DomTree, NodeId) -> bool) -> Self {
        Self(Some(pred))
    }

    #[inline]
    pub fn excludes(self, tree: &DomTree, node: NodeId) -> bool {
        self.0.is_some_and(|pred| pred(tree, node))
    }
}

impl std::fmt::Debug for Exclude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Exclude").field(&self.0.is_some()).finish()
    }
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse_list()
    }

    /// Whether `element` matches any selector in the list
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        self.matches_excluding(tree, element, Exclude::NONE)
    }

    /// Like [`matches`](Self::matches), with `exclude` elements treated as absent
    pub fn matches_excluding(&self, tree: &DomTree, element: NodeId, exclude: Exclude) -> bool {
        tree.is_element(element)
            && self
                .selectors
                .iter()
                .any(|s| s.match_at(tree, element, s.compounds.len() - 1, exclude))
    }
}

impl ComplexSelector {
    fn match_at(&self, tree: &DomTree, element: NodeId, index: usize, exclude: Exclude) -> bool {
        if exclude.excludes(tree, element)
            || !self.compounds[index]
                .iter()
                .all(|c| match_component(tree, element, c, exclude))
        {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent_element(element)
                .is_some_and(|p| self.match_at(tree, p, index - 1, exclude)),
            Combinator::Descendant => tree
                .ancestors(element)
                .filter(|&a| tree.is_element(a))
                .any(|a| self.match_at(tree, a, index - 1, exclude)),
        }
    }
}

fn match_component(
    tree: &DomTree,
    element: NodeId,
    component: &SelectorComponent,
    exclude: Exclude,
) -> bool {
    let Some(data) = tree.element(element) else {
        return false;
    };
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => data.tag == *tag,
        SelectorComponent::Id(id) => data.get_attr("id") == Some(id.as_str()),
        SelectorComponent::Class(class) => data.classes().any(|c| c == class),
        SelectorComponent::Attribute(attr) => attr.matches(data.get_attr(&attr.name)),
        SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(tree, element, pseudo, exclude),
    }
}

fn match_pseudo_class(tree: &DomTree, element: NodeId, pseudo: &PseudoClass, exclude: Exclude) -> bool {
    let (of_type, nth) = match pseudo {
        PseudoClass::FirstChild | PseudoClass::LastChild | PseudoClass::NthChild(_) => {
            (false, tree.sibling_index(element, false, exclude))
        }
        _ => (true, tree.sibling_index(element, true, exclude)),
    };
    match pseudo {
        PseudoClass::FirstChild | PseudoClass::FirstOfType => nth == 1,
        PseudoClass::LastChild | PseudoClass::LastOfType => {
            nth == tree.sibling_count(element, of_type, exclude)
        }
        PseudoClass::NthChild(expr) | PseudoClass::NthOfType(expr) => expr.matches(nth as i32),
    }
}

impl DomTree {
    /// Element siblings of `element` (self included), optionally of its tag only
    fn counted_siblings(
        &self,
        element: NodeId,
        of_type: bool,
        exclude: Exclude,
    ) -> impl Iterator<Item = NodeId> + '_ {
        let tag = self.tag_name(element);
        let parent = self.parent(element).unwrap_or(NodeId::NONE);
        self.element_children(parent)
            .filter(move |&c| !of_type || self.tag_name(c) == tag)
            .filter(move |&c| c == element || !exclude.excludes(self, c))
    }

    fn sibling_index(&self, element: NodeId, of_type: bool, exclude: Exclude) -> usize {
        if self.parent(element).is_none() {
            return 1;
        }
        self.counted_siblings(element, of_type, exclude)
            .position(|c| c == element)
            .map_or(1, |p| p + 1)
    }

    fn sibling_count(&self, element: NodeId, of_type: bool, exclude: Exclude) -> usize {
        if self.parent(element).is_none() {
            return 1;
        }
        self.counted_siblings(element, of_type, exclude).count()
    }

    /// 1-based index among element siblings with the same tag
    pub fn nth_of_type(&self, element: NodeId) -> usize {
        self.sibling_index(element, true, Exclude::NONE)
    }

    /// [`nth_of_type`](Self::nth_of_type) with `exclude` siblings left out
    pub fn nth_of_type_excluding(&self, element: NodeId, exclude: Exclude) -> usize {
        self.sibling_index(element, true, exclude)
    }

    /// 1-based index among element siblings
    pub fn nth_child(&self, element: NodeId) -> usize {
        self.sibling_index(element, false, Exclude::NONE)
    }

    /// `root.querySelector(selector)`: first matching descendant
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.descendants(root).find(|&n| list.matches(self, n)))
    }

    /// `querySelector` that treats `exclude` elements as absent
    pub fn query_selector_excluding(
        &self,
        root: NodeId,
        selector: &str,
        exclude: Exclude,
    ) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(root)
            .find(|&n| list.matches_excluding(self, n, exclude)))
    }

    /// `root.querySelectorAll(selector)` in document order
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.descendants(root).filter(|&n| list.matches(self, n)).collect())
    }

    /// `element.matches(selector)`
    pub fn matches_selector(&self, element: NodeId, selector: &str) -> Result<bool, SelectorError> {
        Ok(SelectorList::parse(selector)?.matches(self, element))
    }

    /// `element.closest(selector)`
    pub fn closest(&self, element: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.closest_where(element, |n| list.matches(self, n)))
    }
}

// --- Parser ---

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(ch) => SelectorError::UnexpectedChar { ch, pos: self.pos },
            None => SelectorError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Skip whitespace, reporting whether any was skipped
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        self.skip_ws();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut selectors = Vec::new();
        loop {
            self.skip_ws();
            selectors.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                None => break,
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Vec<SelectorComponent>, SelectorError> {
        let mut components = Vec::new();
        loop {
            match self.peek() {
                Some('*') if components.is_empty() => {
                    self.pos += 1;
                    components.push(SelectorComponent::Universal);
                }
                Some('#') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    self.pos += 1;
                    components.push(SelectorComponent::PseudoClass(self.parse_pseudo()?));
                }
                Some(_) if components.is_empty() && self.at_ident_start() => {
                    let tag = self.parse_ident()?;
                    components.push(SelectorComponent::Type(tag.to_ascii_lowercase()));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(self.unexpected());
        }
        Ok(components)
    }

    fn at_ident_start(&self) -> bool {
        let is_start = |c: char| c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() || c == '\\';
        match self.peek() {
            Some('-') => match self.peek_at(1) {
                Some('-') => true,
                Some(c) => is_start(c),
                None => false,
            },
            Some(c) => is_start(c),
            None => false,
        }
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        if !self.at_ident_start() {
            return Err(self.unexpected());
        }
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                ident.push(self.parse_escape()?);
            } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
                self.pos += 1;
                ident.push(c);
            } else {
                break;
            }
        }
        Ok(ident)
    }

    /// Escape body after the backslash
    fn parse_escape(&mut self) -> Result<char, SelectorError> {
        let Some(first) = self.peek() else {
            return Err(SelectorError::UnexpectedEnd);
        };
        if !first.is_ascii_hexdigit() {
            self.pos += 1;
            return Ok(first);
        }

        let mut hex = String::new();
        while hex.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            hex.extend(self.bump());
        }
        if self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        let code = u32::from_str_radix(&hex, 16).unwrap_or(0);
        Ok(match char::from_u32(code) {
            Some(c) if code != 0 => c,
            _ => char::REPLACEMENT_CHARACTER,
        })
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match (self.peek(), self.peek_at(1)) {
            (Some(']'), _) => {
                self.pos += 1;
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            (Some('='), _) => {
                self.pos += 1;
                '='
            }
            (Some(op @ ('~' | '^' | '$' | '*')), Some('=')) => {
                self.pos += 2;
                op
            }
            _ => return Err(self.unexpected()),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_string(quote)?
            }
            _ => self.parse_ident()?,
        };
        self.skip_ws();

        let case_insensitive = matches!(self.peek(), Some('i' | 'I'));
        if case_insensitive {
            self.pos += 1;
            self.skip_ws();
        }
        self.expect(']')?;

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => {
                    // Escaped newline is a line continuation.
                    if self.peek() == Some('\n') {
                        self.pos += 1;
                    } else {
                        value.push(self.parse_escape()?);
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        let name = self.parse_ident()?.to_ascii_lowercase();
        let argument = if self.peek() == Some('(') {
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(|c| c != ')') {
                self.pos += 1;
            }
            let arg: String = self.chars[start..self.pos].iter().collect();
            self.expect(')')?;
            Some(arg)
        } else {
            None
        };

        let nth = |arg: Option<String>| {
            let arg = arg.unwrap_or_default();
            NthExpression::parse(&arg).ok_or(SelectorError::InvalidNth(arg))
        };
        match (name.as_str(), argument.is_some()) {
            ("first-child", false) => Ok(PseudoClass::FirstChild),
            ("last-child", false) => Ok(PseudoClass::LastChild),
            ("first-of-type", false) => Ok(PseudoClass::FirstOfType),
            ("last-of-type", false) => Ok(PseudoClass::LastOfType),
            ("nth-child", true) => Ok(PseudoClass::NthChild(nth(argument)?)),
            ("nth-of-type", true) => Ok(PseudoClass::NthOfType(nth(argument)?)),
            _ => Err(SelectorError::UnsupportedPseudo(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (DomTree, NodeId, Vec<NodeId>) {
        // <main id="m" class="content"><p data-k="a"/><div/><p data-k="b" class="x y"/></main>
        let mut tree = DomTree::new();
        let main = tree.create_element("main");
        tree.set_attribute(main, "id", "m").unwrap();
        tree.set_attribute(main, "class", "content").unwrap();
        tree.append_child(tree.root(), main).unwrap();

        let p1 = tree.create_element("p");
        tree.set_attribute(p1, "data-k", "a").unwrap();
        let div = tree.create_element("div");
        let p2 = tree.create_element("p");
        tree.set_attribute(p2, "data-k", "b").unwrap();
        tree.set_attribute(p2, "class", "x y").unwrap();
        for n in [p1, div, p2] {
            tree.append_child(main, n).unwrap();
        }
        (tree, main, vec![p1, div, p2])
    }

    #[test]
    fn test_nth_expression() {
        let odd = NthExpression::parse("odd").unwrap();
        assert!(odd.matches(1) && odd.matches(3) && !odd.matches(2));
        assert_eq!(NthExpression::parse("-n+3"), Some(NthExpression::new(-1, 3)));
        assert_eq!(NthExpression::parse("2"), Some(NthExpression::new(0, 2)));
        assert_eq!(NthExpression::parse("x"), None);
    }

    #[test]
    fn test_nth_of_type_query() {
        let (tree, _, nodes) = fixture();

        assert_eq!(tree.nth_of_type(nodes[2]), 2);
        assert_eq!(tree.query_selector(tree.root(), "p:nth-of-type(2)").unwrap(), Some(nodes[2]));
        assert_eq!(tree.query_selector(tree.root(), "div:first-of-type").unwrap(), Some(nodes[1]));
        assert_eq!(tree.query_selector(tree.root(), "p:last-of-type").unwrap(), Some(nodes[2]));
    }

    #[test]
    fn test_excluded_siblings_not_counted() {
        let (tree, _, nodes) = fixture();
        let skip_a = Exclude::new(|tree, n| tree.get_attribute(n, "data-k") == Some("a"));

        assert_eq!(tree.nth_of_type(nodes[2]), 2);
        assert_eq!(tree.nth_of_type_excluding(nodes[2], skip_a), 1);
        let found = tree.query_selector_excluding(tree.root(), "p:nth-of-type(1)", skip_a).unwrap();
        assert_eq!(found, Some(nodes[2]));
        let found = tree.query_selector_excluding(tree.root(), "#m > :first-child", skip_a).unwrap();
        assert_eq!(found, Some(nodes[1]));
        assert_eq!(tree.query_selector_excluding(tree.root(), "[data-k=a]", skip_a).unwrap(), None);
        assert_eq!(
            tree.query_selector_excluding(tree.root(), "p:last-of-type", Exclude::NONE).unwrap(),
            Some(nodes[2])
        );
    }

    #[test]
    fn test_combinators_and_lists() {
        let (tree, main, nodes) = fixture();

        let all = tree.query_selector_all(tree.root(), "#m > p").unwrap();
        assert_eq!(all, vec![nodes[0], nodes[2]]);
        let all = tree.query_selector_all(tree.root(), "main div, p.x.y").unwrap();
        assert_eq!(all, vec![nodes[1], nodes[2]]);
        assert_eq!(tree.closest(nodes[1], ".content").unwrap(), Some(main));
        assert!(tree.matches_selector(nodes[0], "[data-k=\"a\"]").unwrap());
        assert!(tree.matches_selector(nodes[0], "p[data-k=a]:nth-of-type(1)").unwrap());
        assert!(!tree.matches_selector(nodes[2], "[data-k^=a]").unwrap());
    }

    #[test]
    fn test_escapes() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_attribute(div, "id", "1a:b").unwrap();
        tree.append_child(tree.root(), div).unwrap();

        assert_eq!(tree.query_selector(tree.root(), "#\\31 a\\:b").unwrap(), Some(div));
        assert_eq!(tree.query_selector(tree.root(), "[id='1a:b']").unwrap(), Some(div));
    }

    #[test]
    fn test_malformed_selectors() {
        let tree = DomTree::new();

        assert_eq!(tree.query_selector(tree.root(), ""), Err(SelectorError::Empty));
        assert!(tree.query_selector(tree.root(), "#1abc").is_err());
        assert!(tree.query_selector(tree.root(), "div >").is_err());
        assert!(tree.query_selector(tree.root(), "p:hover").is_err());
        assert!(tree.query_selector(tree.root(), "p:nth-of-type(x)").is_err());
        assert!(tree.query_selector(tree.root(), "[data-k=\"a]").is_err());
        assert!(tree.query_selector(tree.root(), "a,,b").is_err());
    }
}
