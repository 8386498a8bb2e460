//! Tolerant field extraction from JSON response bodies
//!
//! A [`JsonPath`] is a list of navigation steps applied left to right to a
//! parsed body. Each step either finds its target or yields nothing, so a
//! missing key, an empty list or a value of the wrong shape ends in `None`
//! rather than an error. Only a body that is not JSON at all fails.
//!
//! ```
//! use playlist_bridge::decode::{JsonPath, extract};
//!
//! let path = JsonPath::root().key("tracks").key("items").index(0).key("uri");
//! let body = br#"{"tracks":{"items":[{"uri":"spotify:track:X"}]}}"#;
//! assert_eq!(extract(body, &path).unwrap().as_deref(), Some("spotify:track:X"));
//!
//! let empty = br#"{"tracks":{"items":[]}}"#;
//! assert_eq!(extract(empty, &path).unwrap(), None);
//! ```

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One navigation step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Member of an object
    Key(String),
    /// Element of an array
    Index(usize),
    /// Every element of an array
    Each,
}

/// Path into a JSON document, e.g. `items[].snippet.title`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsonPath {
    steps: Vec<Step>,
}

impl JsonPath {
    /// Empty path, selecting the document itself
    pub fn root() -> Self {
        Self::default()
    }

    /// Descend into an object member
    #[must_use]
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.steps.push(Step::Key(name.into()));
        self
    }

    /// Descend into an array element
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.steps.push(Step::Index(index));
        self
    }

    /// Fan out over every array element
    #[must_use]
    pub fn each(mut self) -> Self {
        self.steps.push(Step::Each);
        self
    }

    /// The steps of this path
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// All values the path reaches, in document order
    pub fn select<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![document];

        for step in &self.steps {
            current = current
                .into_iter()
                .flat_map(|value| -> Vec<&'a Value> {
                    match (step, value) {
                        (Step::Key(name), Value::Object(map)) => map.get(name).into_iter().collect(),
                        (Step::Index(i), Value::Array(items)) => items.get(*i).into_iter().collect(),
                        (Step::Each, Value::Array(items)) => items.iter().collect(),
                        _ => Vec::new(),
                    }
                })
                .collect();

            if current.is_empty() {
                break;
            }
        }

        current
    }

    /// Every scalar the path reaches, rendered as text
    pub fn scalars(&self, document: &Value) -> Vec<String> {
        self.select(document).into_iter().filter_map(scalar).collect()
    }

    /// The first scalar the path reaches
    pub fn first_scalar(&self, document: &Value) -> Option<String> {
        self.select(document).into_iter().find_map(scalar)
    }
}

impl FromStr for JsonPath {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPath(format!("{:?}: {}", text, reason));

        if text.trim().is_empty() {
            return Err(invalid("empty path"));
        }

        let mut path = JsonPath::root();
        for segment in text.split('.') {
            let (name, mut rest) = match segment.find('[') {
                Some(pos) => segment.split_at(pos),
                None => (segment, ""),
            };

            if !name.is_empty() {
                path = path.key(name);
            } else if rest.is_empty() {
                return Err(invalid("empty segment"));
            }

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(|| invalid("unclosed '['"))?;
                let inner = &rest[1..close];
                path = if inner.is_empty() {
                    path.each()
                } else {
                    let index = inner
                        .parse::<usize>()
                        .map_err(|_| invalid("index must be a non-negative integer"))?;
                    path.index(index)
                };

                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(invalid("unexpected text after ']'"));
                }
            }
        }

        Ok(path)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.steps {
            match step {
                Step::Key(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Step::Index(i) => write!(f, "[{}]", i)?,
                Step::Each => f.write_str("[]")?,
            }
            first = false;
        }
        Ok(())
    }
}

/// Text form of a scalar; null, arrays and objects have none
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse a response body
///
/// # Errors
/// Returns [`Error::MalformedResponse`] if the body is not JSON
pub fn parse_body(body: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(body)?)
}

/// Extract the first scalar at `path`
pub fn extract(body: &[u8], path: &JsonPath) -> Result<Option<String>> {
    Ok(path.first_scalar(&parse_body(body)?))
}

/// Extract every scalar at `path`
pub fn extract_all(body: &[u8], path: &JsonPath) -> Result<Vec<String>> {
    Ok(path.scalars(&parse_body(body)?))
}
