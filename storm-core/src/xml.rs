//! Namespaced path lookups over a parsed KML tree.
//!
//! Paths are a small subset of the ElementTree/XPath syntax used to describe the feeds:
//! `/`-separated element names, an optional `[@attr='value']` predicate per step, and a leading
//! `.//` to search all descendants for the first step. Every element name is resolved in the
//! navigator's namespace.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use roxmltree::{Document, Node};

use crate::error::{Result, StormError};

/// Outcome of reading one leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Found(T),
    /// The element is absent or has no text.
    Missing,
    /// The element has text that could not be coerced; the raw text is kept for diagnostics.
    Malformed(String),
}

impl<T> Field<T> {
    pub fn or(self, default: T) -> T {
        match self {
            Field::Found(v) => v,
            Field::Missing | Field::Malformed(_) => default,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Field::Found(v) => Some(v),
            Field::Missing | Field::Malformed(_) => None,
        }
    }
}

impl<T: Default> Field<T> {
    pub fn or_default(self) -> T {
        self.or(T::default())
    }
}

/// Text coercion for leaf values.
pub trait FromText: Sized {
    fn from_text(text: &str) -> Option<Self>;
}

impl FromText for String {
    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

macro_rules! from_text_via_parse {
    ($($t:ty),*) => {
        $(
            impl FromText for $t {
                fn from_text(text: &str) -> Option<Self> {
                    text.parse().ok()
                }
            }
        )*
    };
}

from_text_via_parse!(i32, i64, u32, f64);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Step<'p> {
    name: &'p str,
    predicate: Option<(&'p str, &'p str)>,
}

impl<'p> Step<'p> {
    fn parse(raw: &'p str) -> Step<'p> {
        let Some((name, rest)) = raw.split_once('[') else {
            return Step {
                name: raw,
                predicate: None,
            };
        };

        let predicate = rest
            .strip_suffix(']')
            .and_then(|p| p.strip_prefix('@'))
            .and_then(|p| p.split_once('='))
            .map(|(attr, value)| (attr.trim(), value.trim().trim_matches(|c| c == '\'' || c == '"')));

        Step { name, predicate }
    }
}

/// Resolves paths relative to a node, inside one KML namespace.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'ns> {
    ns: &'ns str,
}

impl<'ns> Navigator<'ns> {
    pub fn new(ns: &'ns str) -> Self {
        Self { ns }
    }

    fn matches(&self, node: &Node, step: &Step) -> bool {
        if !node.is_element() {
            return false;
        }
        let tag = node.tag_name();
        if tag.name() != step.name || tag.namespace().unwrap_or("") != self.ns {
            return false;
        }
        match step.predicate {
            Some((attr, value)) => node.attribute(attr) == Some(value),
            None => true,
        }
    }

    /// All nodes matching `path`, in document order.
    pub fn find_all<'a, 'input>(&self, node: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
        let (descendant, path) = match path.strip_prefix(".//") {
            Some(rest) => (true, rest),
            None => (false, path),
        };

        let mut frontier = vec![node];
        for (idx, raw) in path.split('/').filter(|s| !s.is_empty()).enumerate() {
            let step = Step::parse(raw);
            let mut next = Vec::new();
            for parent in frontier {
                if idx == 0 && descendant {
                    next.extend(parent.descendants().skip(1).filter(|n| self.matches(n, &step)));
                } else {
                    next.extend(parent.children().filter(|n| self.matches(n, &step)));
                }
            }
            if next.is_empty() {
                return next;
            }
            frontier = next;
        }
        frontier
    }

    /// First node matching `path`.
    pub fn find<'a, 'input>(&self, node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
        self.find_all(node, path).into_iter().next()
    }

    /// Trimmed, non-empty text of the node at `path`.
    pub fn text<'a, 'input>(&self, node: Node<'a, 'input>, path: &str) -> Option<&'a str> {
        self.find(node, path)
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Reads and coerces the value at `path`.
    pub fn field<T: FromText>(&self, node: Node, path: &str) -> Field<T> {
        match self.text(node, path) {
            None => Field::Missing,
            Some(text) => match T::from_text(text) {
                Some(v) => Field::Found(v),
                None => Field::Malformed(text.to_string()),
            },
        }
    }

    /// Best-effort lookup: the coerced value, or `default` when absent or malformed.
    pub fn lookup<T: FromText>(&self, node: Node, path: &str, default: T) -> T {
        self.field(node, path).or(default)
    }

    /// Reads a timestamp with a `chrono` format string, interpreting it in the given offset.
    pub fn datetime(
        &self,
        node: Node,
        path: &str,
        format: &str,
        offset: FixedOffset,
    ) -> Field<DateTime<Utc>> {
        let Some(text) = self.text(node, path) else {
            return Field::Missing;
        };
        parse_naive(text, format)
            .and_then(|naive| offset.from_local_datetime(&naive).single())
            .map(|dt| Field::Found(dt.with_timezone(&Utc)))
            .unwrap_or_else(|| Field::Malformed(text.to_string()))
    }

    /// `<ExtendedData><Data name="..."><value>` lookup relative to a placemark or folder.
    pub fn data_field<T: FromText>(&self, node: Node, name: &str) -> Field<T> {
        self.field(node, &data_path(name))
    }

    pub fn data_text(&self, node: Node, name: &str) -> String {
        self.data_field(node, name).or_default()
    }
}

/// Parses a KML document, rejecting one whose root element is never closed.
///
/// The parser accepts input that simply stops, so a download cut short would otherwise come back
/// as a smaller but valid-looking document.
pub fn parse_document(text: &str) -> Result<Document<'_>> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();

    let mut tail = text.trim_end();
    while let Some(before) = tail
        .strip_suffix("-->")
        .and_then(|t| t.rfind("<!--").map(|idx| &t[..idx]))
    {
        tail = before.trim_end();
    }
    let last_tag = tail.rfind('<').map(|idx| &tail[idx..]).unwrap_or("");
    let closed = match last_tag.strip_prefix("</") {
        Some(close) => {
            let name = close.trim_end_matches('>').trim();
            last_tag.ends_with('>') && name.rsplit(':').next() == Some(root.tag_name().name())
        }
        None => last_tag.ends_with("/>") && !root.children().any(|n| n.is_element()),
    };

    if closed {
        Ok(doc)
    } else {
        Err(StormError::Xml(format!(
            "document ends before </{}>",
            root.tag_name().name()
        )))
    }
}

/// Trimmed attribute value, or `default`.
pub fn attribute(node: Option<Node>, name: &str, default: &str) -> String {
    node.and_then(|n| n.attribute(name))
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Like `NaiveDateTime::parse_from_str`, but formats without minutes (`%Y%m%d%H`) are accepted.
fn parse_naive(text: &str, fmt: &str) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, text, StrftimeItems::new(fmt)).ok()?;
    // No-op when the format already set a minute.
    let _ = parsed.set_minute(0);
    parsed.to_naive_datetime_with_offset(0).ok()
}

pub fn data_path(name: &str) -> String {
    format!("ExtendedData/Data[@name='{name}']/value")
}
