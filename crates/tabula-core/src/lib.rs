//! # Tabula Core
//!
//! Schema-validated client for the Airtable REST API.
//!
//! ## Overview
//!
//! Every network-touching operation follows the same contract: the argument
//! is checked against a declared [`Shape`] before any request is made, the
//! request runs once, and the response is checked against a result shape
//! before it is turned into a typed value. Failures come back as
//! [`CallError`] values tagged either `Validation` or `Integration`.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`shape`] | Declarative validators and diagnostics |
//! | [`ids`] | Prefixed identifier newtypes and their shapes |
//! | [`fields`] | Record cell values (collaborators, attachments, ...) |
//! | [`query`] | Record list query parameters |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`call`] | The validated remote call |
//! | [`client`] | Configuration and the shared client handle |
//! | [`records`] | List, find and create records |
//! | [`base`] | Base, table, field and webhook metadata types |
//! | [`meta`] | Meta API operations |
//! | [`codegen`] | Name to id lookups rendered as enum text |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabula_core::{AirtableClient, BaseId, FieldSet, RecordSchema, SelectQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AirtableClient::from_env()?;
//!     let table = client.table::<FieldSet>(
//!         BaseId::parse("appGjiqxJsDA2rAp4")?,
//!         "Users",
//!         RecordSchema::any_fields(),
//!     );
//!
//!     for record in table.list_records(&SelectQuery::new().with_page_size(50)).await? {
//!         match record {
//!             Ok(record) => println!("{} {:?}", record.id, record.fields),
//!             Err(error) => eprintln!("skipped: {error}"),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod base;
pub mod call;
pub mod client;
pub mod codegen;
pub mod error;
pub mod fields;
pub mod http_client;
pub mod ids;
pub mod meta;
pub mod query;
pub mod records;
pub mod shape;
pub mod timestamp;

pub use base::{
    BaseList, BaseSchema, BaseSummary, CreateBase, CreateField, CreateTable, FieldMeta,
    FieldType, PermissionLevel, TableMeta, ViewMeta, ViewType, Webhook, WebhookList,
};
pub use call::{check_argument, settle_all, validate_value, validated_call};
pub use client::{AirtableClient, ClientConfig};
pub use codegen::{write_field_id_enum, write_tables_id_enum, NameIdMap, TableNameIds};
pub use error::{CallError, CallErrorKind, CallResult, ConfigError, ShapeError, ValidationError};
pub use fields::{Attachment, Collaborator, FieldSet, FieldValue, Thumbnail, Thumbnails};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use ids::{BaseId, FieldId, IdKind, TableId, ViewId, WorkspaceId};
pub use meta::Meta;
pub use query::{CellFormat, SelectQuery, Sort, SortDirection};
pub use records::{CreateOutcome, FailedValidation, Record, RecordSchema, Table, CREATE_BATCH_SIZE};
pub use shape::{Diagnostic, Issue, Shape, StringRules};
pub use timestamp::UtcDateTime;
