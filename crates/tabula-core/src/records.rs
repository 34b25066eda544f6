//! Record operations on one table.
//!
//! | Operation | Requests | Failure scope |
//! |-----------|----------|---------------|
//! | [`Table::list_records`] | one per page, sequential | a page failure fails the call; records are validated one by one |
//! | [`Table::find_records`] | one per id, concurrent | per id |
//! | [`Table::create_records`] | one per batch of [`CREATE_BATCH_SIZE`], concurrent | invalid inputs are set aside; a failed batch fails the call; created records are validated one by one |

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::call::{settle_all, validate_value};
use crate::client::AirtableClient;
use crate::error::{CallResult, ShapeError};
use crate::fields::field_set_shape;
use crate::http_client::HttpRequest;
use crate::ids::BaseId;
use crate::query::{select_query_shape, SelectQuery};
use crate::shape::{Diagnostic, Issue, Shape, StringRules};
use crate::timestamp::UtcDateTime;

/// Most records the create endpoint accepts in one request.
pub const CREATE_BATCH_SIZE: usize = 10;

/// Caller-declared shape of a table's `fields` mapping, plus the derived
/// shape of a whole record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    fields: Shape,
    record: Shape,
}

impl RecordSchema {
    /// Fails when the declaration itself is malformed.
    pub fn new(fields: Shape) -> Result<Self, ShapeError> {
        fields.verify()?;
        Ok(Self {
            record: record_shape(fields.clone()),
            fields,
        })
    }

    /// Accepts any mapping of field names to cell values.
    pub fn any_fields() -> Self {
        let fields = field_set_shape();
        Self {
            record: record_shape(fields.clone()),
            fields,
        }
    }

    pub fn fields_shape(&self) -> &Shape {
        &self.fields
    }

    pub fn record_shape(&self) -> &Shape {
        &self.record
    }
}

/// `{ id, createdTime, fields }` with `fields` checked against `fields`.
pub fn record_shape(fields: Shape) -> Shape {
    Shape::object([
        ("id", StringRules::new().min_len(1).into()),
        ("createdTime", Shape::string()),
        ("fields", fields),
    ])
}

/// One fetched row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<F> {
    pub id: String,
    pub created_time: UtcDateTime,
    pub fields: F,
}

/// An input rejected before any request was made.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedValidation {
    /// Position in the caller's input slice.
    pub index: usize,
    pub value: Value,
    pub diagnostic: Diagnostic,
}

/// Result of [`Table::create_records`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome<F> {
    /// Created records, one entry per submitted batch, in submission order.
    /// An `Err` entry was written but its echo did not match the schema.
    pub batches: Vec<Vec<CallResult<Record<F>>>>,
    pub failed_validation: Vec<FailedValidation>,
}

impl<F> CreateOutcome<F> {
    /// Created records whose echo matched the schema.
    pub fn created(&self) -> impl Iterator<Item = &Record<F>> {
        self.batches.iter().flatten().filter_map(|record| record.as_ref().ok())
    }

    /// Every record the vendor reported as created, valid echo or not.
    pub fn created_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Deserialize)]
struct RecordPage {
    records: Vec<Value>,
    #[serde(default)]
    offset: Option<String>,
}

fn record_page_shape() -> Shape {
    Shape::object([
        ("records", Shape::array(Shape::any())),
        ("offset", Shape::optional(Shape::string())),
    ])
}

fn raw_record_shape() -> Shape {
    Shape::object([
        ("id", Shape::string()),
        ("fields", Shape::record(Shape::any())),
    ])
}

#[derive(Debug, Deserialize)]
struct CreatedBatch {
    records: Vec<Value>,
}

/// Renames keys of a field mapping. Keys without an entry are kept as is.
pub fn rename_fields(fields: Map<String, Value>, renames: &BTreeMap<String, String>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| match renames.get(&key) {
            Some(renamed) => (renamed.clone(), value),
            None => (key, value),
        })
        .collect()
}

/// Handle for one table of one base.
pub struct Table<F> {
    client: AirtableClient,
    base_id: BaseId,
    table: String,
    schema: RecordSchema,
    renames: Option<BTreeMap<String, String>>,
    _fields: PhantomData<fn() -> F>,
}

impl<F> Clone for Table<F> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_id: self.base_id.clone(),
            table: self.table.clone(),
            schema: self.schema.clone(),
            renames: self.renames.clone(),
            _fields: PhantomData,
        }
    }
}

impl<F> Debug for Table<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .field("renames", &self.renames)
            .finish_non_exhaustive()
    }
}

impl<F> Table<F>
where
    F: DeserializeOwned,
{
    pub(crate) fn new(client: AirtableClient, base_id: BaseId, table: String, schema: RecordSchema) -> Self {
        Self {
            client,
            base_id,
            table,
            schema,
            renames: None,
            _fields: PhantomData,
        }
    }

    /// Renames field keys of every fetched record before validation, e.g.
    /// field ids to names when the schema is keyed by name.
    pub fn with_field_rename<I, K, V>(mut self, renames: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.renames = Some(
            renames
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        );
        self
    }

    pub fn base_id(&self) -> &BaseId {
        &self.base_id
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Fetches every page matching `query`. The outer result fails when the
    /// query is invalid or any page request fails; each record is validated
    /// on its own.
    pub async fn list_records(&self, query: &SelectQuery) -> CallResult<Vec<CallResult<Record<F>>>> {
        let query_shape = select_query_shape();
        let mut results = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0_usize;

        loop {
            let url = self.list_url(query, offset.as_deref());
            let page: RecordPage = self
                .client
                .call(
                    "list records",
                    query,
                    &query_shape,
                    || HttpRequest::get(url),
                    &record_page_shape(),
                )
                .await?;
            pages += 1;

            results.extend(page.records.into_iter().map(|raw| self.decode_record(raw)));

            match page.offset {
                Some(next) if !next.is_empty() => offset = Some(next),
                _ => break,
            }
        }

        tracing::debug!(
            table = %self.table,
            pages,
            records = results.len(),
            "listed records"
        );
        Ok(results)
    }

    /// Looks up every id concurrently. One result per id, in input order.
    pub async fn find_records<S>(&self, record_ids: &[S]) -> Vec<CallResult<Record<F>>>
    where
        S: AsRef<str>,
    {
        settle_all(record_ids.iter().map(|id| self.find_record(id.as_ref()))).await
    }

    pub async fn find_record(&self, record_id: &str) -> CallResult<Record<F>> {
        let url = self.client.url(&format!(
            "{}/{}",
            self.table_path(),
            urlencoding::encode(record_id)
        ));
        let raw: Value = self
            .client
            .call(
                "find record",
                record_id,
                &Shape::from(StringRules::new().min_len(1)),
                || HttpRequest::get(url),
                &raw_record_shape(),
            )
            .await?;

        self.decode_record(raw)
    }

    /// Validates each input against the schema, then creates the valid ones
    /// in concurrent batches of [`CREATE_BATCH_SIZE`].
    ///
    /// Inputs failing validation are returned in `failed_validation` and
    /// never sent. All batches settle before the outcome is decided; the
    /// first failed batch in submission order fails the whole call. The
    /// vendor omits empty and false cells from its echo, so each created
    /// record is validated on its own and never fails its batch.
    pub async fn create_records<I>(&self, inputs: &[I]) -> CallResult<CreateOutcome<F>>
    where
        I: Serialize,
    {
        let mut valid = Vec::with_capacity(inputs.len());
        let mut failed_validation = Vec::new();

        for (index, input) in inputs.iter().enumerate() {
            let value = match serde_json::to_value(input) {
                Ok(value) => value,
                Err(error) => {
                    failed_validation.push(FailedValidation {
                        index,
                        value: Value::Null,
                        diagnostic: Diagnostic::single(Issue::new(
                            "",
                            format!("not serializable: {error}"),
                        )),
                    });
                    continue;
                }
            };

            match self.schema.fields_shape().validate(&value) {
                Ok(()) => valid.push(value),
                Err(diagnostic) => {
                    tracing::warn!(table = %self.table, index, %diagnostic, "record rejected before create");
                    failed_validation.push(FailedValidation {
                        index,
                        value,
                        diagnostic,
                    });
                }
            }
        }

        let batch_shape = Shape::object([
            (
                "records",
                Shape::array(Shape::object([("fields", self.schema.fields_shape().clone())])),
            ),
            ("typecast", Shape::boolean()),
        ]);
        let created_shape = Shape::object([("records", Shape::array(raw_record_shape()))]);
        let url = self.client.url(&self.table_path());

        let bodies = valid
            .chunks(CREATE_BATCH_SIZE)
            .map(|chunk| {
                let records = chunk
                    .iter()
                    .map(|fields| json!({ "fields": fields }))
                    .collect::<Vec<_>>();
                json!({ "records": records, "typecast": false })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            table = %self.table,
            valid = valid.len(),
            rejected = failed_validation.len(),
            batches = bodies.len(),
            "creating records"
        );

        let settled = settle_all(bodies.iter().map(|body| {
            self.client.call::<_, CreatedBatch, _>(
                "create records",
                body,
                &batch_shape,
                || HttpRequest::post(url.as_str()).with_json_body(body.to_string()),
                &created_shape,
            )
        }))
        .await;

        let batches = settled
            .into_iter()
            .map(|batch| {
                batch.map(|created| {
                    created
                        .records
                        .into_iter()
                        .map(|raw| self.decode_record(raw))
                        .collect::<Vec<_>>()
                })
            })
            .collect::<CallResult<Vec<_>>>()?;

        Ok(CreateOutcome {
            batches,
            failed_validation,
        })
    }

    fn table_path(&self) -> String {
        format!("{}/{}", self.base_id, urlencoding::encode(&self.table))
    }

    fn list_url(&self, query: &SelectQuery, offset: Option<&str>) -> String {
        let path = self.client.url(&self.table_path());
        let query_string = query.to_query_string(offset);
        if query_string.is_empty() {
            path
        } else {
            format!("{path}?{query_string}")
        }
    }

    /// Applies the rename table, then validates against the record shape.
    fn decode_record(&self, raw: Value) -> CallResult<Record<F>> {
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_owned();

        let raw = match (&self.renames, raw) {
            (Some(renames), Value::Object(mut record)) => {
                if let Some(Value::Object(fields)) = record.remove("fields") {
                    record.insert(
                        String::from("fields"),
                        Value::Object(rename_fields(fields, renames)),
                    );
                }
                Value::Object(record)
            }
            (_, raw) => raw,
        };

        validate_value(&format!("record {id}"), raw, self.schema.record_shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_keeps_unmapped_keys() {
        let fields = json!({ "fldName000000001": "Ada", "Notes": "x" });
        let Value::Object(fields) = fields else {
            panic!("object expected");
        };
        let renames = BTreeMap::from([(
            String::from("fldName000000001"),
            String::from("Name"),
        )]);

        let renamed = rename_fields(fields, &renames);
        assert_eq!(Value::Object(renamed), json!({ "Name": "Ada", "Notes": "x" }));
    }

    #[test]
    fn schema_constructor_rejects_malformed_declaration() {
        let err = RecordSchema::new(Shape::object([
            ("Name", Shape::string()),
            ("Name", Shape::number()),
        ]))
        .expect_err("must fail");
        assert!(matches!(err, ShapeError::DuplicateKey { .. }));
    }

    #[test]
    fn record_shape_requires_created_time() {
        let shape = record_shape(Shape::any());
        let diagnostic = shape
            .validate(&json!({ "id": "rec1", "fields": {} }))
            .expect_err("must fail");
        assert_eq!(diagnostic.issues()[0].path, "createdTime");
    }
}
