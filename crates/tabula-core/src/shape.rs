//! Declarative shapes for runtime validation of JSON payloads.
//!
//! A [`Shape`] describes the structure a `serde_json::Value` must have.
//! Shapes are plain data built from a handful of combinators (strings,
//! numbers, booleans, string enums, arrays, objects, string-keyed records,
//! unions) and carry no transport concerns, so the same declaration checks
//! call arguments, vendor responses, and caller-supplied records.
//!
//! ```rust
//! use serde_json::json;
//! use tabula_core::shape::{Shape, StringRules};
//!
//! let user = Shape::object([
//!     ("name", Shape::string()),
//!     ("age", Shape::optional(Shape::number())),
//!     ("id", StringRules::new().starts_with("usr").into()),
//! ]);
//!
//! assert!(user.validate(&json!({ "name": "Ada", "id": "usr1" })).is_ok());
//!
//! let diagnostic = user.validate(&json!({ "name": 7, "id": "x" })).unwrap_err();
//! assert_eq!(diagnostic.issues().len(), 2);
//! ```

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde_json::Value;

use crate::error::ShapeError;

/// Constraints applied to a string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRules {
    min_len: Option<usize>,
    max_len: Option<usize>,
    prefix: Option<String>,
    url: bool,
}

impl StringRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Require an absolute URL.
    pub fn url(mut self) -> Self {
        self.url = true;
        self
    }

    fn check(&self, value: &str, path: &str, issues: &mut Vec<Issue>) {
        let len = value.chars().count();
        if let Some(min) = self.min_len {
            if len < min {
                issues.push(Issue::new(
                    path,
                    format!("string must contain at least {min} character(s), got {len}"),
                ));
            }
        }
        if let Some(max) = self.max_len {
            if len > max {
                issues.push(Issue::new(
                    path,
                    format!("string must contain at most {max} character(s), got {len}"),
                ));
            }
        }
        if let Some(prefix) = &self.prefix {
            if !value.starts_with(prefix.as_str()) {
                issues.push(Issue::new(path, format!("string must start with \"{prefix}\"")));
            }
        }
        if self.url && reqwest::Url::parse(value).is_err() {
            issues.push(Issue::new(path, "invalid url"));
        }
    }
}

impl From<StringRules> for Shape {
    fn from(rules: StringRules) -> Self {
        Self::String(rules)
    }
}

/// Structural description of an expected JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Any,
    String(StringRules),
    Number,
    /// Whole number within an inclusive range.
    Integer { min: i64, max: i64 },
    Boolean,
    /// String restricted to a fixed set of values.
    Enum(Vec<String>),
    Array(Box<Shape>),
    /// Object with declared keys. Undeclared keys pass through unchecked.
    Object(Vec<(String, Shape)>),
    /// Object used as a map from arbitrary string keys to one value shape.
    Record(Box<Shape>),
    Union(Vec<Shape>),
    /// May be absent as an object member. A present `null` is checked
    /// against the inner shape; wrap in [`Shape::Nullable`] to allow it.
    Optional(Box<Shape>),
    Nullable(Box<Shape>),
}

impl Shape {
    pub fn any() -> Self {
        Self::Any
    }

    pub fn string() -> Self {
        Self::String(StringRules::default())
    }

    pub fn number() -> Self {
        Self::Number
    }

    pub fn integer_in(min: i64, max: i64) -> Self {
        Self::Integer { min, max }
    }

    pub fn boolean() -> Self {
        Self::Boolean
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn array(element: Shape) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn object<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = (K, Shape)>,
        K: Into<String>,
    {
        Self::Object(
            keys.into_iter()
                .map(|(key, shape)| (key.into(), shape))
                .collect(),
        )
    }

    pub fn record(value: Shape) -> Self {
        Self::Record(Box::new(value))
    }

    pub fn union<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Shape>,
    {
        Self::Union(members.into_iter().collect())
    }

    pub fn optional(inner: Shape) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn nullable(inner: Shape) -> Self {
        Self::Nullable(Box::new(inner))
    }

    /// Returns a copy of an object shape with `key` replaced or appended.
    ///
    /// Non-object shapes are returned unchanged.
    pub fn extend(self, key: impl Into<String>, shape: Shape) -> Self {
        match self {
            Self::Object(mut keys) => {
                let key = key.into();
                match keys.iter_mut().find(|(existing, _)| *existing == key) {
                    Some(slot) => slot.1 = shape,
                    None => keys.push((key, shape)),
                }
                Self::Object(keys)
            }
            other => other,
        }
    }

    /// Checks `value` against this shape, collecting every issue found.
    pub fn validate(&self, value: &Value) -> Result<(), Diagnostic> {
        let mut issues = Vec::new();
        self.check(value, "", &mut issues);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Diagnostic { issues })
        }
    }

    /// Reports declarations that can never be satisfied or are ambiguous.
    pub fn verify(&self) -> Result<(), ShapeError> {
        self.verify_at("")
    }

    fn verify_at(&self, path: &str) -> Result<(), ShapeError> {
        match self {
            Self::Any | Self::Number | Self::Boolean => Ok(()),
            Self::Integer { min, max } if min > max => Err(ShapeError::RangeBounds {
                path: display_path(path),
                min: *min,
                max: *max,
            }),
            Self::Integer { .. } => Ok(()),
            Self::String(rules) => match (rules.min_len, rules.max_len) {
                (Some(min), Some(max)) if min > max => Err(ShapeError::LengthBounds {
                    path: display_path(path),
                    min,
                    max,
                }),
                _ => Ok(()),
            },
            Self::Enum(values) if values.is_empty() => Err(ShapeError::EmptyEnum {
                path: display_path(path),
            }),
            Self::Enum(_) => Ok(()),
            Self::Array(element) => element.verify_at(&index_path(path, None)),
            Self::Object(keys) => {
                let mut seen = HashSet::new();
                for (key, shape) in keys {
                    if !seen.insert(key.as_str()) {
                        return Err(ShapeError::DuplicateKey {
                            path: display_path(path),
                            key: key.clone(),
                        });
                    }
                    shape.verify_at(&key_path(path, key))?;
                }
                Ok(())
            }
            Self::Record(value) => value.verify_at(&key_path(path, "*")),
            Self::Union(members) if members.is_empty() => Err(ShapeError::EmptyUnion {
                path: display_path(path),
            }),
            Self::Union(members) => members.iter().try_for_each(|member| member.verify_at(path)),
            Self::Optional(inner) | Self::Nullable(inner) => inner.verify_at(path),
        }
    }

    fn check(&self, value: &Value, path: &str, issues: &mut Vec<Issue>) {
        match self {
            Self::Any => {}
            Self::String(rules) => match value {
                Value::String(text) => rules.check(text, path, issues),
                other => issues.push(type_mismatch(path, "string", other)),
            },
            Self::Number => {
                if !value.is_number() {
                    issues.push(type_mismatch(path, "number", value));
                }
            }
            Self::Integer { min, max } => match value.as_i64() {
                Some(number) if (*min..=*max).contains(&number) => {}
                Some(number) => issues.push(Issue::new(
                    path,
                    format!("number {number} outside {min}..={max}"),
                )),
                None => issues.push(type_mismatch(path, "integer", value)),
            },
            Self::Boolean => {
                if !value.is_boolean() {
                    issues.push(type_mismatch(path, "boolean", value));
                }
            }
            Self::Enum(allowed) => match value {
                Value::String(text) if allowed.iter().any(|candidate| candidate == text) => {}
                Value::String(text) => issues.push(Issue::new(
                    path,
                    format!("invalid enum value \"{text}\", expected one of {}", allowed.join(" | ")),
                )),
                other => issues.push(type_mismatch(path, "string", other)),
            },
            Self::Array(element) => match value {
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        element.check(item, &index_path(path, Some(index)), issues);
                    }
                }
                other => issues.push(type_mismatch(path, "array", other)),
            },
            Self::Object(keys) => match value {
                Value::Object(map) => {
                    for (key, shape) in keys {
                        let child = key_path(path, key);
                        match map.get(key) {
                            Some(member) => shape.check(member, &child, issues),
                            None if matches!(shape, Self::Optional(_)) => {}
                            None => issues.push(Issue::new(child, "required")),
                        }
                    }
                }
                other => issues.push(type_mismatch(path, "object", other)),
            },
            Self::Record(shape) => match value {
                Value::Object(map) => {
                    for (key, member) in map {
                        shape.check(member, &key_path(path, key), issues);
                    }
                }
                other => issues.push(type_mismatch(path, "object", other)),
            },
            Self::Union(members) => {
                let matched = members.iter().any(|member| {
                    let mut scratch = Vec::new();
                    member.check(value, path, &mut scratch);
                    scratch.is_empty()
                });
                if !matched {
                    issues.push(Issue::new(
                        path,
                        format!(
                            "{} matches none of {} alternatives",
                            type_name(value),
                            members.len()
                        ),
                    ));
                }
            }
            Self::Optional(inner) => inner.check(value, path, issues),
            Self::Nullable(inner) => {
                if !value.is_null() {
                    inner.check(value, path, issues);
                }
            }
        }
    }
}

/// One shape violation at a location inside the checked value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Structured result of a failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    issues: Vec<Issue>,
}

impl Diagnostic {
    pub fn single(issue: Issue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

fn type_mismatch(path: &str, expected: &str, value: &Value) -> Issue {
    Issue::new(
        path,
        format!("expected {expected}, received {}", type_name(value)),
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn key_path(parent: &str, key: &str) -> String {
    match (parent.is_empty(), key.is_empty()) {
        (true, _) => key.to_owned(),
        (false, true) => parent.to_owned(),
        (false, false) => format!("{parent}.{key}"),
    }
}

fn index_path(parent: &str, index: Option<usize>) -> String {
    match index {
        Some(index) => format!("{parent}[{index}]"),
        None => format!("{parent}[]"),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        String::from("<root>")
    } else {
        path.to_owned()
    }
}
