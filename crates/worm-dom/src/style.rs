//! Inline style declarations
//!
//! Only the `style` attribute participates in styling; there is no
//! stylesheet cascade.

/// Parsed `style` attribute, declarations kept in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse a `style` attribute value
    pub fn parse(style: &str) -> Self {
        let declarations = style
            .split(';')
            .filter_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                let name = name.trim();
                let value = value.trim();
                if name.is_empty() || value.is_empty() {
                    return None;
                }
                Some((name.to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        Self { declarations }
    }

    /// Value of a property (last declaration wins)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a property in place, appending when absent
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.declarations.iter().rposition(|(n, _)| *n == name) {
            Some(pos) => self.declarations[pos].1 = value.to_string(),
            None => self.declarations.push((name, value.to_string())),
        }
    }

    /// Serialize back to `name: value; name: value`
    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(n, v)| format!("{n}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// A CSS length in the units layout understands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    /// Parse `12px`, `12`, or `50%`
    pub fn parse(value: &str) -> Option<Length> {
        let value = value.trim();
        if let Some(pct) = value.strip_suffix('%') {
            return pct.trim().parse().ok().map(Length::Percent);
        }
        let number = value.strip_suffix("px").unwrap_or(value).trim();
        number.parse().ok().filter(|n: &f64| n.is_finite()).map(Length::Px)
    }

    /// Resolve against a reference size
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => reference * pct / 100.0,
        }
    }
}

/// Format a pixel value the way style writes expect (`12px`, `12.5px`)
pub fn format_px(value: f64) -> String {
    format!("{}px", round_css(value))
}

/// Format a fraction in [0,1] as a percentage (`50%`)
pub fn format_pct(fraction: f64) -> String {
    format!("{}%", round_css(fraction * 100.0))
}

fn round_css(value: f64) -> f64 {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}
