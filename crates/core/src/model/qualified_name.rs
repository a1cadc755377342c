use crate::error::{Result, SemscopeError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

/// A plain identifier (`foo`, `Vector`, `to_text'`) or an operator identifier (`+`, `==`).
static SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z_][A-Za-z0-9_]*'*|[!$%&*+\-/<>?^~|:\\=]+)$")
        .unwrap_or_else(|e| panic!("invalid segment regex: {e}"))
});

fn invalid(name: &str, reason: impl Into<String>) -> SemscopeError {
    SemscopeError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn validate_segment(whole: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(invalid(whole, "empty segment"));
    }
    if !SEGMENT_RE.is_match(segment) {
        return Err(invalid(
            whole,
            format!("`{segment}` is neither an identifier nor an operator"),
        ));
    }
    Ok(())
}

/// A single segment of a qualified name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(SmolStr);

impl Identifier {
    pub fn parse(name: &str) -> Result<Self> {
        validate_segment(name, name)?;
        Ok(Self(SmolStr::new(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_operator(&self) -> bool {
        !self
            .0
            .starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
    }
}

/// A validated, dot-separated sequence of identifiers.
///
/// Stored joined; segments are recovered by splitting on `.`, which cannot
/// occur inside a valid segment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName(SmolStr);

impl QualifiedName {
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(invalid(name, "empty name"));
        }
        if name.starts_with('.') || name.ends_with('.') {
            return Err(invalid(name, "leading or trailing dot"));
        }
        for segment in name.split('.') {
            validate_segment(name, segment)?;
        }
        Ok(Self(SmolStr::new(name)))
    }

    /// Build from already validated segments. Returns `None` for an empty iterator.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut joined = String::new();
        for segment in segments {
            if !joined.is_empty() {
                joined.push('.');
            }
            joined.push_str(segment);
        }
        (!joined.is_empty()).then(|| Self(SmolStr::new(joined)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.split('.')
    }

    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }

    /// Number of segments; never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.segment_count()
    }

    pub fn first(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    pub fn last(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or_default()
    }

    pub fn last_identifier(&self) -> Identifier {
        Identifier(SmolStr::new(self.last()))
    }

    /// The name without its last segment; `None` for a single segment.
    pub fn parent(&self) -> Option<QualifiedName> {
        self.0
            .rfind('.')
            .map(|dot| Self(SmolStr::new(&self.0[..dot])))
    }

    /// Split into parent and last segment.
    pub fn split_last(&self) -> (Option<QualifiedName>, Identifier) {
        (self.parent(), self.last_identifier())
    }

    pub fn append(&self, segment: &Identifier) -> QualifiedName {
        Self(SmolStr::new(format!("{}.{}", self.0, segment.0)))
    }

    pub fn join(&self, other: &QualifiedName) -> QualifiedName {
        Self(SmolStr::new(format!("{}.{}", self.0, other.0)))
    }

    /// The first `n` segments, `None` if `n` is zero or exceeds the length.
    pub fn prefix(&self, n: usize) -> Option<QualifiedName> {
        if n == 0 || n > self.segment_count() {
            return None;
        }
        Self::from_segments(self.segments().take(n))
    }

    /// Everything after the first `n` segments, `None` if nothing remains.
    pub fn suffix(&self, n: usize) -> Option<QualifiedName> {
        Self::from_segments(self.segments().skip(n))
    }

    /// Split after the first `n` segments. Either side is `None` when empty.
    pub fn split_first(&self, n: usize) -> (Option<QualifiedName>, Option<QualifiedName>) {
        (self.prefix(n), self.suffix(n))
    }

    /// Segment-wise prefix test (`Standard.Base` is a prefix of `Standard.Base.Data`,
    /// but not of `Standard.Based`).
    pub fn starts_with(&self, prefix: &QualifiedName) -> bool {
        self.0 == prefix.0
            || (self.0.starts_with(prefix.as_str())
                && self.0.as_bytes().get(prefix.0.len()) == Some(&b'.'))
    }
}

impl From<Identifier> for QualifiedName {
    fn from(id: Identifier) -> Self {
        Self(id.0)
    }
}

macro_rules! string_conversions {
    ($ty:ident) => {
        impl FromStr for $ty {
            type Err = SemscopeError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = SemscopeError;

            fn try_from(s: String) -> Result<Self> {
                Self::parse(&s)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0.to_string()
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self.0)
            }
        }
    };
}

string_conversions!(Identifier);
string_conversions!(QualifiedName);
