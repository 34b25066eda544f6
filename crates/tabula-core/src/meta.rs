//! Meta API operations: bases, base schema, webhooks, and the name to id
//! lookups derived from a schema.

use serde::Serialize;

use crate::base::{
    base_list_shape, base_schema_shape, create_base_shape, webhook_list_shape, BaseList,
    BaseSchema, BaseSummary, CreateBase, WebhookList,
};
use crate::call::check_argument;
use crate::client::AirtableClient;
use crate::codegen::{write_field_id_enum, write_tables_id_enum, NameIdMap, TableNameIds};
use crate::error::{CallError, CallResult};
use crate::http_client::HttpRequest;
use crate::ids::IdKind;
use crate::shape::{Diagnostic, Issue, Shape, StringRules};

#[derive(Debug, Serialize)]
struct ListBasesArgs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<&'a str>,
}

fn list_bases_args_shape() -> Shape {
    Shape::object([(
        "offset",
        Shape::optional(StringRules::new().min_len(1).into()),
    )])
}

/// Metadata operations bound to one client.
#[derive(Debug, Clone)]
pub struct Meta {
    client: AirtableClient,
}

impl Meta {
    pub(crate) fn new(client: AirtableClient) -> Self {
        Self { client }
    }

    /// One page of bases visible to the credential.
    pub async fn list_bases(&self, offset: Option<&str>) -> CallResult<BaseList> {
        let url = match offset {
            Some(offset) => self.client.url(&format!(
                "meta/bases?offset={}",
                urlencoding::encode(offset)
            )),
            None => self.client.url("meta/bases"),
        };

        self.client
            .call(
                "list bases",
                &ListBasesArgs { offset },
                &list_bases_args_shape(),
                || HttpRequest::get(url),
                &base_list_shape(),
            )
            .await
    }

    /// Follows offsets until the listing is exhausted.
    pub async fn list_all_bases(&self) -> CallResult<Vec<BaseSummary>> {
        let mut bases = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self.list_bases(offset.as_deref()).await?;
            bases.extend(page.bases);
            match page.offset {
                Some(next) if !next.is_empty() => offset = Some(next),
                _ => break,
            }
        }

        Ok(bases)
    }

    pub async fn create_base(&self, request: &CreateBase) -> CallResult<BaseSchema> {
        let body = serde_json::to_value(request).map_err(|error| {
            CallError::validation(
                "create base arguments",
                Diagnostic::single(Issue::new("", format!("not serializable: {error}"))),
            )
        })?;
        let url = self.client.url("meta/bases");

        self.client
            .call(
                "create base",
                &body,
                &create_base_shape(),
                || HttpRequest::post(url).with_json_body(body.to_string()),
                &base_schema_shape(),
            )
            .await
    }

    /// Tables, views and fields of `base_id`. Accepts anything string-like so
    /// unchecked ids are rejected here without a request.
    pub async fn get_base_schema(&self, base_id: impl AsRef<str>) -> CallResult<BaseSchema> {
        let base_id = base_id.as_ref();
        let url = self
            .client
            .url(&format!("meta/bases/{}/tables", urlencoding::encode(base_id)));

        self.client
            .call(
                "get base schema",
                base_id,
                &IdKind::Base.shape(),
                || HttpRequest::get(url),
                &base_schema_shape(),
            )
            .await
    }

    pub async fn list_webhooks(&self, base_id: impl AsRef<str>) -> CallResult<WebhookList> {
        let base_id = base_id.as_ref();
        let url = self
            .client
            .url(&format!("bases/{}/webhooks", urlencoding::encode(base_id)));

        self.client
            .call(
                "list webhooks",
                base_id,
                &IdKind::Base.shape(),
                || HttpRequest::get(url),
                &webhook_list_shape(),
            )
            .await
    }

    /// Folds the base schema into one name to id lookup per table.
    pub async fn name_id_objects(&self, base_id: impl AsRef<str>) -> CallResult<Vec<TableNameIds>> {
        let schema = self.get_base_schema(base_id).await?;
        Ok(schema.tables.iter().map(TableNameIds::from).collect())
    }

    /// Table name to table id for the whole base.
    pub async fn table_name_ids(&self, base_id: impl AsRef<str>) -> CallResult<NameIdMap> {
        let tables = self.name_id_objects(base_id).await?;
        Ok(tables
            .into_iter()
            .map(|table| (table.table_name, String::from(table.table_id)))
            .collect())
    }

    /// Field name to field id, one map per table.
    pub async fn field_name_ids(&self, base_id: impl AsRef<str>) -> CallResult<Vec<NameIdMap>> {
        let tables = self.name_id_objects(base_id).await?;
        Ok(tables.into_iter().map(|table| table.fields).collect())
    }

    /// One field enum per table, in schema order.
    pub async fn gen_field_id_enums(&self, base_id: impl AsRef<str>) -> CallResult<Vec<String>> {
        let tables = self.name_id_objects(base_id).await?;
        Ok(tables.iter().map(write_field_id_enum).collect())
    }

    /// A single enum of the base's tables, named `base_name`.
    pub async fn gen_table_id_enums(
        &self,
        base_name: &str,
        base_id: impl AsRef<str>,
    ) -> CallResult<String> {
        check_argument(
            "generate table enums",
            base_name,
            &Shape::from(StringRules::new().min_len(1)),
        )?;
        let tables = self.name_id_objects(base_id).await?;
        Ok(write_tables_id_enum(base_name, &tables))
    }
}
