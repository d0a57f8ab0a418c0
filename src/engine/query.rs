//! Selector queries over the element tree.
//!
//! Supports the subset page scripts use:
//!
//! - selector lists: `.invoice-card, .stat-card`
//! - descendant combinator: `.navbar-links a`, `.header h1`
//! - type and universal selectors: `button`, `*`
//! - id and class selectors: `#theme-toggle`, `.auth-button`
//! - attribute selectors: `[href]`, `[type="password"]`, `a[href^="#"]`
//!
//! Results are always in document order.

use std::str::FromStr;

use tracing::debug;

use crate::error::{FxError, Result};

use super::arrays::core;
use super::element::document_order;

// =============================================================================
// Selector AST
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, index: usize) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && core::get_tag(index) != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if core::get_element_id(index) != *id {
                return false;
            }
        }
        if !self.classes.iter().all(|c| core::has_class(index, c)) {
            return false;
        }
        self.attrs.iter().all(|attr| {
            let value = core::get_attribute(index, &attr.name);
            match (&attr.op, value) {
                (_, None) => false,
                (AttrOp::Exists, Some(_)) => true,
                (AttrOp::Equals(expected), Some(v)) => v == *expected,
                (AttrOp::Prefix(prefix), Some(v)) => v.starts_with(prefix.as_str()),
            }
        })
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Each alternative is a chain of compounds joined by descendant combinators.
    alternatives: Vec<Vec<Compound>>,
}

impl Selector {
    /// Whether the element at `index` matches any alternative.
    pub fn matches(&self, index: usize) -> bool {
        self.alternatives
            .iter()
            .any(|chain| matches_chain(chain, index))
    }
}

/// Right-to-left match. The rightmost compound must match the element; each
/// earlier one must match some ancestor above the previous match.
fn matches_chain(chain: &[Compound], index: usize) -> bool {
    let Some((last, rest)) = chain.split_last() else {
        return false;
    };
    if !last.matches(index) {
        return false;
    }
    let mut ancestors = core::ancestors(index).into_iter();
    for compound in rest.iter().rev() {
        if !ancestors.any(|a| compound.matches(a)) {
            return false;
        }
    }
    true
}

// =============================================================================
// Parser
// =============================================================================

impl FromStr for Selector {
    type Err = FxError;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = |reason: &str| FxError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty selector in list"));
            }
            let mut chain = Vec::new();
            for token in part.split_whitespace() {
                let compound = parse_compound(token).map_err(|reason| invalid(&reason))?;
                chain.push(compound);
            }
            alternatives.push(chain);
        }
        Ok(Self { alternatives })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn parse_compound(token: &str) -> std::result::Result<Compound, String> {
    let mut compound = Compound::default();
    let mut chars = token.chars().peekable();

    if chars.peek() == Some(&'*') {
        chars.next();
        compound.tag = Some("*".into());
    } else if chars.peek().is_some_and(|&c| is_ident_char(c)) {
        compound.tag = Some(take_ident(&mut chars).to_ascii_lowercase());
    }

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                let id = take_ident(&mut chars);
                if id.is_empty() {
                    return Err("expected an id after `#`".into());
                }
                compound.id = Some(id);
            }
            '.' => {
                let class = take_ident(&mut chars);
                if class.is_empty() {
                    return Err("expected a class name after `.`".into());
                }
                compound.classes.push(class);
            }
            '[' => compound.attrs.push(parse_attr(&mut chars)?),
            other => return Err(format!("unexpected character `{other}`")),
        }
    }

    if compound.is_empty() {
        return Err("empty compound selector".into());
    }
    Ok(compound)
}

fn parse_attr(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> std::result::Result<AttrMatch, String> {
    let name = take_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err("expected an attribute name".into());
    }

    let op = match chars.next() {
        Some(']') => return Ok(AttrMatch { name, op: AttrOp::Exists }),
        Some('=') => "=",
        Some('^') if chars.next() == Some('=') => "^=",
        _ => return Err("expected `]`, `=` or `^=` in attribute selector".into()),
    };

    let value = match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some(c) if c == quote => break,
                    Some(c) => value.push(c),
                    None => return Err("unterminated attribute value".into()),
                }
            }
            value
        }
        _ => take_ident(chars),
    };

    if chars.next() != Some(']') {
        return Err("expected `]`".into());
    }

    let op = if op == "=" {
        AttrOp::Equals(value)
    } else {
        AttrOp::Prefix(value)
    };
    Ok(AttrMatch { name, op })
}

// =============================================================================
// Queries
// =============================================================================

/// All matching elements in document order (`querySelectorAll`).
pub fn query_selector_all(selector: &str) -> Result<Vec<usize>> {
    let selector: Selector = selector.parse()?;
    Ok(document_order()
        .into_iter()
        .filter(|&i| selector.matches(i))
        .collect())
}

/// First matching element (`querySelector`).
pub fn query_selector(selector: &str) -> Result<Option<usize>> {
    let selector: Selector = selector.parse()?;
    Ok(document_order().into_iter().find(|&i| selector.matches(i)))
}

/// First matching descendant of `root` (`element.querySelector`).
pub fn query_selector_within(root: usize, selector: &str) -> Result<Option<usize>> {
    let selector: Selector = selector.parse()?;
    let mut stack: Vec<usize> = core::get_children(root).into_iter().rev().collect();
    while let Some(index) = stack.pop() {
        if selector.matches(index) {
            return Ok(Some(index));
        }
        stack.extend(core::get_children(index).into_iter().rev());
    }
    Ok(None)
}

/// Null-safe `querySelectorAll` for effect setup: a malformed selector is
/// logged and treated as matching nothing.
pub fn select(selector: &str) -> Vec<usize> {
    query_selector_all(selector).unwrap_or_else(|err| {
        debug!(%err, "selector skipped");
        Vec::new()
    })
}
