//! Pathname patterns with named and catch-all segments.
//!
//! # Syntax
//! ```text
//! /news/[slug]            one segment, captured as `slug`
//! /docs/[...rest]         one or more trailing segments
//! /shop/[[...filters]]    zero or more trailing segments
//! ```
//!
//! # Design Decisions
//! - Compiled once at configuration time into a segment list
//! - Matching is a segment-by-segment walk, no regex
//! - Literal segments compare case-sensitively (paths are case-sensitive)
//! - Empty path segments are ignored, so `/about/` matches `/about`
//! - Literals are stored decoded and request segments are percent-decoded
//!   before comparison, so `%C3%BC` and `%c3%bc` both match `ü`
//! - Rendering re-encodes literals that are not plain visible ASCII

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Errors raised while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("pattern `{pattern}` contains an empty segment")]
    EmptySegment { pattern: String },

    #[error("pattern `{pattern}` contains a malformed segment `{segment}`")]
    MalformedSegment { pattern: String, segment: String },

    #[error("catch-all `{name}` must be the last segment of `{pattern}`")]
    CatchAllNotLast { pattern: String, name: String },

    #[error("parameter `{name}` appears more than once in `{pattern}`")]
    DuplicateParameter { pattern: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Named(String),
    CatchAll(String),
    OptionalCatchAll(String),
}

impl Segment {
    fn parse(pattern: &str, raw: &str) -> Result<Self, PatternError> {
        let malformed = || PatternError::MalformedSegment {
            pattern: pattern.to_string(),
            segment: raw.to_string(),
        };

        let (inner, optional) = match raw.strip_prefix("[[").and_then(|s| s.strip_suffix("]]")) {
            Some(inner) => (inner, true),
            None => match raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                Some(inner) => (inner, false),
                None => {
                    if raw.contains(['[', ']']) {
                        return Err(malformed());
                    }
                    return Ok(Segment::Literal(decode_segment(raw).into_owned()));
                }
            },
        };

        let (name, catch_all) = match inner.strip_prefix("...") {
            Some(name) => (name, true),
            None => (inner, false),
        };
        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_name || (optional && !catch_all) {
            return Err(malformed());
        }

        let name = name.to_string();
        Ok(match (catch_all, optional) {
            (true, true) => Segment::OptionalCatchAll(name),
            (true, false) => Segment::CatchAll(name),
            _ => Segment::Named(name),
        })
    }

    fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Named(n) | Segment::CatchAll(n) | Segment::OptionalCatchAll(n) => Some(n),
        }
    }

    fn param(&self) -> Option<(&str, ParamKind)> {
        match self {
            Segment::Literal(_) => None,
            Segment::Named(n) => Some((n, ParamKind::Single)),
            Segment::CatchAll(n) => Some((n, ParamKind::CatchAll)),
            Segment::OptionalCatchAll(n) => Some((n, ParamKind::OptionalCatchAll)),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 0,
            Segment::Named(_) => 1,
            Segment::CatchAll(_) => 2,
            Segment::OptionalCatchAll(_) => 3,
        }
    }
}

/// Percent-decoded segment; invalid UTF-8 is compared as written.
fn decode_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

fn encode_literal(literal: &str) -> Cow<'_, str> {
    let plain = literal
        .bytes()
        .all(|b| b.is_ascii_graphic() && !matches!(b, b'%' | b'?' | b'#'));
    if plain {
        Cow::Borrowed(literal)
    } else {
        urlencoding::encode(literal)
    }
}

/// Kind of a parameter segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParamKind {
    Single,
    CatchAll,
    OptionalCatchAll,
}

/// Values captured by a successful match, in pattern order.
///
/// Catch-all values hold the joined segments (`a/b/c`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A compiled pathname pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern such as `/news/[slug]`.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let body = source
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(source.to_string()))?;
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut segments: Vec<Segment> = Vec::new();
        if !body.is_empty() {
            for raw in body.split('/') {
                if raw.is_empty() {
                    return Err(PatternError::EmptySegment {
                        pattern: source.to_string(),
                    });
                }
                if let Some(Segment::CatchAll(name) | Segment::OptionalCatchAll(name)) =
                    segments.last()
                {
                    return Err(PatternError::CatchAllNotLast {
                        pattern: source.to_string(),
                        name: name.clone(),
                    });
                }
                let segment = Segment::parse(source, raw)?;
                if let Some(name) = segment.param_name() {
                    if segments.iter().any(|s| s.param_name() == Some(name)) {
                        return Err(PatternError::DuplicateParameter {
                            pattern: source.to_string(),
                            name: name.to_string(),
                        });
                    }
                }
                segments.push(segment);
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parameters with their kinds, sorted by name. Two patterns can stand
    /// for each other only if these are equal.
    pub fn params(&self) -> Vec<(&str, ParamKind)> {
        let mut params: Vec<_> = self.segments.iter().filter_map(Segment::param).collect();
        params.sort_unstable();
        params
    }

    /// Match a path, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let mut index = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => match parts.get(index) {
                    Some(part) if decode_segment(part) == literal.as_str() => index += 1,
                    _ => return None,
                },
                Segment::Named(name) => {
                    params.insert(name.as_str(), *parts.get(index)?);
                    index += 1;
                }
                Segment::CatchAll(name) => {
                    if index >= parts.len() {
                        return None;
                    }
                    params.insert(name.as_str(), parts[index..].join("/"));
                    index = parts.len();
                }
                Segment::OptionalCatchAll(name) => {
                    params.insert(name.as_str(), parts[index..].join("/"));
                    index = parts.len();
                }
            }
        }

        (index == parts.len()).then_some(params)
    }

    /// Render the pattern with captured values. `None` if a required
    /// parameter is missing or empty.
    pub fn render(&self, params: &Params) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    out.push('/');
                    out.push_str(&encode_literal(literal));
                }
                Segment::Named(name) | Segment::CatchAll(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty())?;
                    out.push('/');
                    out.push_str(value);
                }
                Segment::OptionalCatchAll(name) => {
                    if let Some(value) = params.get(name).filter(|v| !v.is_empty()) {
                        out.push('/');
                        out.push_str(value);
                    }
                }
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Some(out)
    }

    /// Orders patterns from most to least specific: literal segments beat
    /// named ones, which beat catch-alls.
    pub fn cmp_specificity(&self, other: &Self) -> Ordering {
        let lhs = self.segments.iter().map(Segment::rank);
        let rhs = other.segments.iter().map(Segment::rank);
        lhs.cmp(rhs)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
