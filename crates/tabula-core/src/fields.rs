//! Cell values Airtable returns inside a record's `fields` mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::shape::{Shape, StringRules};

/// A user referenced by a collaborator field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    pub small: Thumbnail,
    pub large: Thumbnail,
    pub full: Thumbnail,
}

/// A file stored in an attachment field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub thumbnails: Thumbnails,
}

/// Any value a record cell can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Collaborator(Collaborator),
    Collaborators(Vec<Collaborator>),
    Texts(Vec<String>),
    Attachments(Vec<Attachment>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }
}

/// Untyped field mapping: field name (or id) to cell value.
pub type FieldSet = BTreeMap<String, FieldValue>;

pub fn collaborator_shape() -> Shape {
    Shape::object([
        ("id", Shape::string()),
        ("email", Shape::string()),
        ("name", Shape::string()),
    ])
}

pub fn thumbnail_shape() -> Shape {
    Shape::object([
        ("url", StringRules::new().url().into()),
        ("width", Shape::number()),
        ("height", Shape::number()),
    ])
}

pub fn attachment_shape() -> Shape {
    Shape::object([
        ("id", Shape::string()),
        ("url", StringRules::new().url().into()),
        ("filename", Shape::string()),
        ("size", Shape::number()),
        ("type", Shape::string()),
        (
            "thumbnails",
            Shape::object([
                ("small", thumbnail_shape()),
                ("large", thumbnail_shape()),
                ("full", thumbnail_shape()),
            ]),
        ),
    ])
}

/// Union of every cell value kind.
pub fn field_value_shape() -> Shape {
    Shape::union([
        Shape::string(),
        Shape::number(),
        Shape::boolean(),
        collaborator_shape(),
        Shape::array(collaborator_shape()),
        Shape::array(Shape::string()),
        Shape::array(attachment_shape()),
    ])
}

/// Shape of [`FieldSet`]: any field name mapped to any cell value.
pub fn field_set_shape() -> Shape {
    Shape::record(field_value_shape())
}
