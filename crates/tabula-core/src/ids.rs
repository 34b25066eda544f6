//! Airtable identifiers.
//!
//! Every workspace, base, table, view and field id is 12 to 20 characters
//! long and starts with a fixed three-letter prefix. The rules exist twice:
//! as newtypes for typed code, and as [`Shape`]s for payload validation.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::shape::{Shape, StringRules};
use crate::ValidationError;

pub const MIN_ID_LEN: usize = 12;
pub const MAX_ID_LEN: usize = 20;

/// Entity an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Workspace,
    Base,
    Table,
    View,
    Field,
}

impl IdKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Workspace => "wsp",
            Self::Base => "app",
            Self::Table => "tbl",
            Self::View => "viw",
            Self::Field => "fld",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Base => "base",
            Self::Table => "table",
            Self::View => "view",
            Self::Field => "field",
        }
    }

    pub fn shape(self) -> Shape {
        StringRules::new()
            .min_len(MIN_ID_LEN)
            .max_len(MAX_ID_LEN)
            .starts_with(self.prefix())
            .into()
    }

    pub fn check(self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyId {
                kind: self.as_str(),
            });
        }

        if !value.starts_with(self.prefix()) {
            return Err(ValidationError::IdPrefix {
                kind: self.as_str(),
                prefix: self.prefix(),
                value: value.to_owned(),
            });
        }

        let len = value.chars().count();
        if !(MIN_ID_LEN..=MAX_ID_LEN).contains(&len) {
            return Err(ValidationError::IdLength {
                kind: self.as_str(),
                len,
                min: MIN_ID_LEN,
                max: MAX_ID_LEN,
            });
        }

        Ok(())
    }
}

impl Display for IdKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! prefixed_id {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub const KIND: IdKind = $kind;

            pub fn parse(input: &str) -> Result<Self, ValidationError> {
                let trimmed = input.trim();
                Self::KIND.check(trimmed)?;
                Ok(Self(trimmed.to_owned()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::parse(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

prefixed_id!(
    /// Workspace id, `wsp…`.
    WorkspaceId,
    IdKind::Workspace
);
prefixed_id!(
    /// Base id, `app…`.
    BaseId,
    IdKind::Base
);
prefixed_id!(
    /// Table id, `tbl…`.
    TableId,
    IdKind::Table
);
prefixed_id!(
    /// View id, `viw…`.
    ViewId,
    IdKind::View
);
prefixed_id!(
    /// Field id, `fld…`.
    FieldId,
    IdKind::Field
);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_base_id() {
        let id = BaseId::parse(" appGjiqxJsDA2rAp4 ").expect("id should parse");
        assert_eq!(id.as_str(), "appGjiqxJsDA2rAp4");
    }

    #[test]
    fn rejects_base_id_with_wrong_prefix() {
        let err = BaseId::parse("tblGjiqxJsDA2rAp4").expect_err("must fail");
        assert!(matches!(err, ValidationError::IdPrefix { prefix: "app", .. }));
    }

    #[test]
    fn rejects_short_base_id() {
        let err = BaseId::parse("app12345678").expect_err("must fail");
        assert!(matches!(err, ValidationError::IdLength { len: 11, .. }));
    }

    #[test]
    fn rejects_long_field_id() {
        let err = FieldId::parse("fld123456789012345678").expect_err("must fail");
        assert!(matches!(err, ValidationError::IdLength { len: 21, .. }));
    }

    #[test]
    fn shape_and_newtype_agree() {
        for candidate in ["appGjiqxJsDA2rAp4", "app12345678", "xyzGjiqxJsDA2rAp4", ""] {
            let by_type = BaseId::parse(candidate).is_ok();
            let by_shape = IdKind::Base.shape().validate(&json!(candidate)).is_ok();
            assert_eq!(by_type, by_shape, "disagreement on '{candidate}'");
        }
    }

    #[test]
    fn deserializes_through_validation() {
        let parsed: Result<ViewId, _> = serde_json::from_value(json!("viwAbCdEfGhIjKl"));
        assert!(parsed.is_ok());

        let rejected: Result<ViewId, _> = serde_json::from_value(json!("grid"));
        assert!(rejected.is_err());
    }
}
