//! Base, table, field and webhook metadata as the meta API reports it.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{BaseId, FieldId, IdKind, TableId, ViewId, WorkspaceId};
use crate::shape::{Shape, StringRules};
use crate::timestamp::UtcDateTime;

macro_rules! wire_enum {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            pub fn shape() -> Shape {
                Shape::one_of(Self::ALL.iter().map(|value| value.as_str()))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Layout of a table view.
    ViewType {
        Grid => "grid",
        Form => "form",
        Calendar => "calendar",
        Gallery => "gallery",
        Kanban => "kanban",
        Timeline => "timeline",
        Block => "block",
    }
);

wire_enum!(
    /// Column type of a field definition.
    FieldType {
        SingleLineText => "singleLineText",
        Email => "email",
        Url => "url",
        MultilineText => "multilineText",
        Number => "number",
        Percent => "percent",
        Currency => "currency",
        SingleSelect => "singleSelect",
        MultipleSelects => "multipleSelects",
        SingleCollaborator => "singleCollaborator",
        MultipleCollaborators => "multipleCollaborators",
        MultipleRecordLinks => "multipleRecordLinks",
        Date => "date",
        DateTime => "dateTime",
        PhoneNumber => "phoneNumber",
        MultipleAttachments => "multipleAttachments",
        Checkbox => "checkbox",
        Formula => "formula",
        CreatedTime => "createdTime",
        Rollup => "rollup",
        Count => "count",
        Lookup => "lookup",
        MultipleLookupValues => "multipleLookupValues",
        AutoNumber => "autoNumber",
        Barcode => "barcode",
        Rating => "rating",
        RichText => "richText",
        Duration => "duration",
        LastModifiedTime => "lastModifiedTime",
        Button => "button",
        CreatedBy => "createdBy",
        LastModifiedBy => "lastModifiedBy",
        ExternalSyncSource => "externalSyncSource",
    }
);

wire_enum!(
    /// Access the credential has to a base.
    PermissionLevel {
        None => "none",
        Read => "read",
        Comment => "comment",
        Edit => "edit",
        Create => "create",
    }
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewMeta {
    pub id: ViewId,
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: ViewType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub id: FieldId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Type-specific settings, passed through untyped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMeta {
    pub id: TableId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub primary_field_id: FieldId,
    pub views: Vec<ViewMeta>,
    pub fields: Vec<FieldMeta>,
}

/// Tables of one base. `id` is present when the base was just created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BaseId>,
    pub tables: Vec<TableMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseSummary {
    pub id: BaseId,
    pub name: String,
    pub permission_level: PermissionLevel,
}

/// One page of bases. `offset` continues the listing when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseList {
    pub bases: Vec<BaseSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl CreateField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
            options: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<CreateField>,
}

impl CreateTable {
    pub fn new(name: impl Into<String>, fields: Vec<CreateField>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
        }
    }
}

/// Request body for creating a base inside a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBase {
    pub name: String,
    pub workspace_id: WorkspaceId,
    pub tables: Vec<CreateTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub are_notifications_enabled: bool,
    pub cursor_for_next_payload: u64,
    pub is_hook_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<UtcDateTime>,
    pub specification: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookList {
    pub webhooks: Vec<Webhook>,
}

pub fn view_meta_shape() -> Shape {
    Shape::object([
        ("id", IdKind::View.shape()),
        ("name", Shape::string()),
        ("type", ViewType::shape()),
    ])
}

pub fn field_meta_shape() -> Shape {
    Shape::object([
        ("id", IdKind::Field.shape()),
        ("name", Shape::string()),
        ("description", Shape::optional(Shape::string())),
        ("type", FieldType::shape()),
        ("options", Shape::optional(Shape::any())),
    ])
}

pub fn table_meta_shape() -> Shape {
    Shape::object([
        ("id", IdKind::Table.shape()),
        ("name", Shape::string()),
        ("description", Shape::optional(Shape::string())),
        ("primaryFieldId", IdKind::Field.shape()),
        ("views", Shape::array(view_meta_shape())),
        ("fields", Shape::array(field_meta_shape())),
    ])
}

pub fn base_schema_shape() -> Shape {
    Shape::object([
        ("id", Shape::optional(IdKind::Base.shape())),
        ("tables", Shape::array(table_meta_shape())),
    ])
}

pub fn base_list_shape() -> Shape {
    Shape::object([
        (
            "bases",
            Shape::array(Shape::object([
                ("id", IdKind::Base.shape()),
                ("name", Shape::string()),
                ("permissionLevel", PermissionLevel::shape()),
            ])),
        ),
        ("offset", Shape::optional(Shape::string())),
    ])
}

pub fn create_base_shape() -> Shape {
    let field = Shape::object([
        ("name", StringRules::new().min_len(1).into()),
        ("type", FieldType::shape()),
        ("description", Shape::optional(Shape::string())),
        ("options", Shape::optional(Shape::any())),
    ]);
    let table = Shape::object([
        ("name", StringRules::new().min_len(1).into()),
        ("description", Shape::optional(Shape::string())),
        ("fields", Shape::array(field)),
    ]);

    Shape::object([
        ("name", StringRules::new().min_len(1).into()),
        ("workspaceId", IdKind::Workspace.shape()),
        ("tables", Shape::array(table)),
    ])
}

pub fn webhook_list_shape() -> Shape {
    Shape::object([(
        "webhooks",
        Shape::array(Shape::object([
            ("id", Shape::string()),
            ("areNotificationsEnabled", Shape::boolean()),
            ("cursorForNextPayload", Shape::integer_in(0, i64::MAX)),
            ("isHookEnabled", Shape::boolean()),
            ("notificationUrl", Shape::optional(Shape::nullable(Shape::string()))),
            ("expirationTime", Shape::optional(Shape::string())),
            ("specification", Shape::any()),
        ])),
    )])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn field_types_round_trip_their_wire_names() {
        assert_eq!(FieldType::ALL.len(), 33);
        for field_type in FieldType::ALL {
            let encoded = serde_json::to_value(field_type).expect("serializable");
            assert_eq!(encoded, json!(field_type.as_str()));
        }
    }

    #[test]
    fn table_shape_rejects_unknown_view_type() {
        let table = json!({
            "id": "tblAAAAAAAAAAAAA1",
            "name": "Users",
            "primaryFieldId": "fldAAAAAAAAAAAAA1",
            "views": [{ "id": "viwAAAAAAAAAAAAA1", "name": "All", "type": "spreadsheet" }],
            "fields": []
        });

        let diagnostic = table_meta_shape().validate(&table).expect_err("must fail");
        assert_eq!(diagnostic.issues()[0].path, "views[0].type");
    }

    #[test]
    fn create_base_serializes_in_vendor_casing() {
        let request = CreateBase {
            name: String::from("Ops"),
            workspace_id: WorkspaceId::parse("wspAAAAAAAAAAAAA1").expect("valid id"),
            tables: vec![CreateTable::new(
                "Tasks",
                vec![CreateField::new("Name", FieldType::SingleLineText)],
            )],
        };

        let value = serde_json::to_value(&request).expect("serializable");
        assert_eq!(value["workspaceId"], "wspAAAAAAAAAAAAA1");
        assert_eq!(value["tables"][0]["fields"][0]["type"], "singleLineText");
        assert!(create_base_shape().validate(&value).is_ok());
    }
}
