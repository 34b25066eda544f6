//! Behavior tests for base metadata, schema introspection and enum
//! generation.

mod support;

use std::sync::Arc;

use serde_json::{json, Value};
use tabula_core::{
    BaseId, CallErrorKind, CreateBase, CreateField, CreateTable, FieldType, HttpMethod,
    HttpResponse, PermissionLevel, ViewType, WorkspaceId,
};

use support::{client_over, url, ScriptedHttpClient, BASE_ID};

fn schema_json() -> Value {
    json!({
        "tables": [
            {
                "id": "tblUsersAAAAAAAA1",
                "name": "User",
                "primaryFieldId": "fldNameAAAAAAAA01",
                "views": [{ "id": "viwGridAAAAAAAA01", "name": "Grid view", "type": "grid" }],
                "fields": [
                    { "id": "fldNameAAAAAAAA01", "name": "name", "type": "singleLineText" },
                    {
                        "id": "fldAgeAAAAAAAAA01",
                        "name": "age",
                        "type": "number",
                        "options": { "precision": 0 }
                    }
                ]
            },
            {
                "id": "tblOrdersAAAAAAA1",
                "name": "Orders",
                "description": "Customer orders",
                "primaryFieldId": "fldRefAAAAAAAAA01",
                "views": [],
                "fields": [
                    { "id": "fldRefAAAAAAAAA01", "name": "ref", "type": "autoNumber" }
                ]
            }
        ]
    })
}

fn schema_client() -> Arc<ScriptedHttpClient> {
    Arc::new(ScriptedHttpClient::new().on(
        HttpMethod::Get,
        url(&format!("meta/bases/{BASE_ID}/tables")),
        HttpResponse::ok_json(schema_json().to_string()),
    ))
}

// =============================================================================
// Identifier validation
// =============================================================================

#[tokio::test]
async fn when_base_id_is_malformed_no_request_is_made() {
    // Given: Base ids with the wrong prefix or too short
    let http = schema_client();
    let meta = client_over(&http).meta();

    for bad in ["tblTestBase000001", "app12345678", "", "xappTestBase00001"] {
        // When: The schema is requested
        let error = meta
            .get_base_schema(bad)
            .await
            .expect_err("malformed base id should fail");

        // Then: A validation error is returned
        assert_eq!(error.kind(), CallErrorKind::Validation, "id '{bad}'");
        assert!(BaseId::parse(bad).is_err(), "newtype should agree on '{bad}'");
    }

    // And: The network was never touched
    assert_eq!(http.call_count(), 0);
}

// =============================================================================
// Schema
// =============================================================================

#[tokio::test]
async fn base_schema_is_parsed_into_typed_tables() {
    // Given: A base with two tables
    let http = schema_client();
    let base_id = BaseId::parse(BASE_ID).expect("valid base id");

    // When: The schema is fetched
    let schema = client_over(&http)
        .meta()
        .get_base_schema(&base_id)
        .await
        .expect("schema should parse");

    // Then: Tables, views and fields are typed
    assert_eq!(schema.tables.len(), 2);
    let users = &schema.tables[0];
    assert_eq!(users.id.as_str(), "tblUsersAAAAAAAA1");
    assert_eq!(users.views[0].view_type, ViewType::Grid);
    assert_eq!(users.fields[1].field_type, FieldType::Number);
    assert_eq!(users.fields[1].options, Some(json!({ "precision": 0 })));
    assert_eq!(schema.tables[1].description.as_deref(), Some("Customer orders"));
}

#[tokio::test]
async fn when_schema_has_unknown_field_type_a_validation_error_is_returned() {
    // Given: A field type outside the known set
    let mut schema = schema_json();
    schema["tables"][0]["fields"][0]["type"] = json!("hologram");
    let http = Arc::new(ScriptedHttpClient::new().on(
        HttpMethod::Get,
        url(&format!("meta/bases/{BASE_ID}/tables")),
        HttpResponse::ok_json(schema.to_string()),
    ));

    // When: The schema is fetched
    let error = client_over(&http)
        .meta()
        .get_base_schema(BASE_ID)
        .await
        .expect_err("unknown type should fail");

    // Then: The diagnostic locates the field
    assert!(error.is_validation());
    assert_eq!(
        error.diagnostic().map(|d| d.issues()[0].path.as_str()),
        Some("tables[0].fields[0].type")
    );
}

// =============================================================================
// Name/id lookups and enum generation
// =============================================================================

#[tokio::test]
async fn name_id_lookups_follow_schema_order() {
    // Given: A base with two tables
    let http = schema_client();
    let meta = client_over(&http).meta();

    // When: The lookups are derived
    let tables = meta.table_name_ids(BASE_ID).await.expect("lookup should succeed");
    let fields = meta.field_name_ids(BASE_ID).await.expect("lookup should succeed");

    // Then: Names map to ids in response order
    assert_eq!(
        tables.iter().collect::<Vec<_>>(),
        vec![("User", "tblUsersAAAAAAAA1"), ("Orders", "tblOrdersAAAAAAA1")]
    );
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].get("age"), Some("fldAgeAAAAAAAAA01"));
    assert_eq!(fields[1].get("ref"), Some("fldRefAAAAAAAAA01"));
}

#[tokio::test]
async fn field_enums_are_rendered_per_table() {
    // Given: A base with two tables
    let http = schema_client();

    // When: Field enums are generated
    let enums = client_over(&http)
        .meta()
        .gen_field_id_enums(BASE_ID)
        .await
        .expect("generation should succeed");

    // Then: One enum per table, with literal whitespace
    assert_eq!(
        enums,
        vec![
            String::from(
                "enum User {\n\tname = \"fldNameAAAAAAAA01\",\n\tage = \"fldAgeAAAAAAAAA01\"\n}"
            ),
            String::from("enum Orders {\n\tref = \"fldRefAAAAAAAAA01\"\n}"),
        ]
    );
    assert_eq!(http.call_count(), 1);
}

#[tokio::test]
async fn table_enum_is_named_after_the_base() {
    // Given: A base with two tables
    let http = schema_client();

    // When: The table enum is generated
    let text = client_over(&http)
        .meta()
        .gen_table_id_enums("Shop", BASE_ID)
        .await
        .expect("generation should succeed");

    // Then: Tables are listed in schema order
    assert_eq!(
        text,
        "enum Shop {\n\tUser = \"tblUsersAAAAAAAA1\",\n\tOrders = \"tblOrdersAAAAAAA1\"\n}"
    );
}

// =============================================================================
// Bases
// =============================================================================

#[tokio::test]
async fn listing_all_bases_follows_offsets() {
    // Given: Two pages of bases
    let http = Arc::new(
        ScriptedHttpClient::new()
            .on(
                HttpMethod::Get,
                url("meta/bases"),
                HttpResponse::ok_json(
                    json!({
                        "bases": [{
                            "id": "appFirstAAAAAAAA1",
                            "name": "First",
                            "permissionLevel": "create"
                        }],
                        "offset": "itrNext"
                    })
                    .to_string(),
                ),
            )
            .on(
                HttpMethod::Get,
                url("meta/bases?offset=itrNext"),
                HttpResponse::ok_json(
                    json!({
                        "bases": [{
                            "id": "appSecondAAAAAAA1",
                            "name": "Second",
                            "permissionLevel": "read"
                        }]
                    })
                    .to_string(),
                ),
            ),
    );

    // When: All bases are listed
    let bases = client_over(&http)
        .meta()
        .list_all_bases()
        .await
        .expect("listing should succeed");

    // Then: Both pages are concatenated
    assert_eq!(http.call_count(), 2);
    assert_eq!(bases.len(), 2);
    assert_eq!(bases[0].permission_level, PermissionLevel::Create);
    assert_eq!(bases[1].name, "Second");
}

#[tokio::test]
async fn when_offset_is_empty_list_bases_rejects_it_without_a_request() {
    // Given: An empty continuation token
    let http = Arc::new(ScriptedHttpClient::new());

    // When: A page is requested
    let error = client_over(&http)
        .meta()
        .list_bases(Some(""))
        .await
        .expect_err("empty offset should fail");

    // Then: Validation fails before the network
    assert!(error.is_validation());
    assert_eq!(http.call_count(), 0);
}

#[tokio::test]
async fn create_base_posts_the_request_and_returns_the_new_schema() {
    // Given: A vendor that accepts the new base
    let http = Arc::new(ScriptedHttpClient::new().on(
        HttpMethod::Post,
        url("meta/bases"),
        HttpResponse::ok_json({
            let mut created = schema_json();
            created["id"] = json!("appCreatedAAAAAA1");
            created.to_string()
        }),
    ));
    let request = CreateBase {
        name: String::from("Shop"),
        workspace_id: WorkspaceId::parse("wspTeamAAAAAAAA01").expect("valid workspace id"),
        tables: vec![CreateTable::new(
            "User",
            vec![
                CreateField::new("name", FieldType::SingleLineText),
                CreateField::new("age", FieldType::Number).with_options(json!({ "precision": 0 })),
            ],
        )],
    };

    // When: The base is created
    let schema = client_over(&http)
        .meta()
        .create_base(&request)
        .await
        .expect("creation should succeed");

    // Then: The returned schema carries the new base id
    assert_eq!(schema.id.as_ref().map(BaseId::as_str), Some("appCreatedAAAAAA1"));

    // And: The request body used the vendor casing
    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    let body: Value =
        serde_json::from_str(requests[0].body.as_deref().expect("body")).expect("json body");
    assert_eq!(body["workspaceId"], "wspTeamAAAAAAAA01");
    assert_eq!(body["tables"][0]["fields"][1]["type"], "number");
    assert_eq!(
        requests[0].headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
}

#[tokio::test]
async fn when_create_base_has_no_name_no_request_is_made() {
    // Given: A request with an empty base name
    let http = Arc::new(ScriptedHttpClient::new());
    let request = CreateBase {
        name: String::new(),
        workspace_id: WorkspaceId::parse("wspTeamAAAAAAAA01").expect("valid workspace id"),
        tables: Vec::new(),
    };

    // When: The base is created
    let error = client_over(&http)
        .meta()
        .create_base(&request)
        .await
        .expect_err("empty name should fail");

    // Then: Validation fails before the network
    assert_eq!(error.kind(), CallErrorKind::Validation);
    assert_eq!(http.call_count(), 0);
}

// =============================================================================
// Webhooks
// =============================================================================

#[tokio::test]
async fn webhooks_are_listed_for_a_base() {
    // Given: A base with one webhook
    let http = Arc::new(ScriptedHttpClient::new().on(
        HttpMethod::Get,
        url(&format!("bases/{BASE_ID}/webhooks")),
        HttpResponse::ok_json(
            json!({
                "webhooks": [{
                    "id": "achHookAAAAAAAA01",
                    "areNotificationsEnabled": true,
                    "cursorForNextPayload": 4,
                    "isHookEnabled": true,
                    "notificationUrl": "https://example.com/hook",
                    "expirationTime": "2024-02-01T00:00:00.000Z",
                    "specification": { "options": { "filters": { "dataTypes": ["tableData"] } } }
                }]
            })
            .to_string(),
        ),
    ));

    // When: Webhooks are listed
    let list = client_over(&http)
        .meta()
        .list_webhooks(BASE_ID)
        .await
        .expect("listing should succeed");

    // Then: The webhook is typed
    let hook = &list.webhooks[0];
    assert_eq!(hook.cursor_for_next_payload, 4);
    assert!(hook.is_hook_enabled);
    assert_eq!(hook.notification_url.as_deref(), Some("https://example.com/hook"));
    assert_eq!(
        hook.expiration_time.map(|time| time.format_rfc3339()),
        Some(String::from("2024-02-01T00:00:00Z"))
    );
}
