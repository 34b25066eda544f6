//! Validated remote call.
//!
//! Every network-touching operation in this crate runs through
//! [`validated_call`]:
//!
//! 1. the argument is serialized and checked against its shape; a mismatch
//!    returns a validation error and the network is never touched;
//! 2. the call runs exactly once; transport failures, non-2xx statuses and
//!    unparsable bodies become integration errors;
//! 3. the payload is checked against the result shape and only then
//!    deserialized into the typed result.
//!
//! Expected failures are values, never panics.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CallError, CallResult};
use crate::http_client::{HttpError, HttpResponse};
use crate::shape::{Diagnostic, Issue, Shape};

/// Runs one remote call between argument and result validation.
pub async fn validated_call<A, T, F, Fut>(
    operation: &str,
    arg: &A,
    arg_shape: &Shape,
    call: F,
    result_shape: &Shape,
) -> CallResult<T>
where
    A: Serialize + ?Sized,
    T: DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<HttpResponse, HttpError>>,
{
    check_argument(operation, arg, arg_shape)?;

    tracing::debug!(operation, "dispatching call");
    let response = call().await.map_err(|error| {
        tracing::warn!(operation, error = %error, "transport failure");
        CallError::integration(format!("{operation}: {error}"))
    })?;

    let payload = decode_response(operation, response)?;
    validate_value(operation, payload, result_shape)
}

/// Checks an argument against its shape without performing any I/O.
pub fn check_argument<A>(operation: &str, arg: &A, arg_shape: &Shape) -> CallResult<()>
where
    A: Serialize + ?Sized,
{
    let value = serde_json::to_value(arg).map_err(|error| {
        CallError::validation(
            format!("{operation} arguments"),
            Diagnostic::single(Issue::new("", format!("not serializable: {error}"))),
        )
    })?;

    arg_shape.validate(&value).map_err(|diagnostic| {
        tracing::warn!(operation, %diagnostic, "argument failed validation");
        CallError::validation(format!("{operation} arguments"), diagnostic)
    })
}

/// Turns a raw response into a JSON payload, mapping non-2xx statuses and
/// malformed bodies to integration errors.
pub fn decode_response(operation: &str, response: HttpResponse) -> CallResult<Value> {
    if !response.is_success() {
        let detail = upstream_error_detail(&response.body);
        tracing::warn!(operation, status = response.status, %detail, "upstream error");
        return Err(CallError::upstream_status(
            response.status,
            format!(
                "{operation}: upstream returned status {}: {detail}",
                response.status
            ),
        ));
    }

    tracing::debug!(operation, status = response.status, "call returned");
    serde_json::from_str(&response.body).map_err(|error| {
        CallError::integration(format!("{operation}: malformed response body: {error}"))
    })
}

/// Checks a payload against `shape` and deserializes it into `T`.
pub fn validate_value<T>(context: &str, value: Value, shape: &Shape) -> CallResult<T>
where
    T: DeserializeOwned,
{
    if let Err(diagnostic) = shape.validate(&value) {
        tracing::warn!(context, %diagnostic, "payload failed validation");
        return Err(CallError::validation(context, diagnostic));
    }

    serde_json::from_value(value).map_err(|error| {
        CallError::validation(
            context,
            Diagnostic::single(Issue::new("", error.to_string())),
        )
    })
}

/// Dispatches every future at once and waits until all of them settle.
/// Outputs keep the input order.
pub async fn settle_all<I>(futures: I) -> Vec<<I::Item as Future>::Output>
where
    I: IntoIterator,
    I::Item: Future,
{
    futures::future::join_all(futures).await
}

/// Airtable reports failures as `{"error": "NOT_FOUND"}` or
/// `{"error": {"type": "...", "message": "..."}}`.
fn upstream_error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return truncate(body.trim());
    };

    match value.get("error") {
        Some(Value::String(kind)) => kind.clone(),
        Some(Value::Object(error)) => {
            let kind = error.get("type").and_then(Value::as_str);
            let message = error.get("message").and_then(Value::as_str);
            match (kind, message) {
                (Some(kind), Some(message)) => format!("{kind}: {message}"),
                (Some(kind), None) => kind.to_owned(),
                (None, Some(message)) => message.to_owned(),
                (None, None) => truncate(body.trim()),
            }
        }
        _ => truncate(body.trim()),
    }
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.chars().count() <= LIMIT {
        body.to_owned()
    } else {
        let mut short = body.chars().take(LIMIT).collect::<String>();
        short.push('…');
        short
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::error::CallErrorKind;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        ok: bool,
    }

    #[test]
    fn upstream_detail_reads_typed_error() {
        let body = r#"{"error":{"type":"INVALID_PERMISSIONS","message":"Not allowed"}}"#;
        assert_eq!(upstream_error_detail(body), "INVALID_PERMISSIONS: Not allowed");
    }

    #[test]
    fn upstream_detail_reads_bare_error_string() {
        assert_eq!(upstream_error_detail(r#"{"error":"NOT_FOUND"}"#), "NOT_FOUND");
    }

    #[test]
    fn upstream_detail_falls_back_to_body_text() {
        assert_eq!(upstream_error_detail("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn decode_maps_non_success_status_to_integration_error() {
        let error = decode_response("get record", HttpResponse::new(404, r#"{"error":"NOT_FOUND"}"#))
            .expect_err("must fail");

        assert_eq!(error.kind(), CallErrorKind::Integration);
        assert_eq!(error.status(), Some(404));
        assert!(error.message().contains("NOT_FOUND"));
    }

    #[test]
    fn decode_maps_malformed_body_to_integration_error() {
        let error = decode_response("list bases", HttpResponse::ok_json("<html>"))
            .expect_err("must fail");
        assert_eq!(error.kind(), CallErrorKind::Integration);
        assert_eq!(error.status(), None);
    }

    #[test]
    fn validate_value_rejects_shape_mismatch_before_deserializing() {
        let shape = Shape::object([("ok", Shape::boolean())]);

        let pong: Pong = validate_value("ping", json!({ "ok": true }), &shape).expect("valid");
        assert_eq!(pong, Pong { ok: true });

        let error = validate_value::<Pong>("ping", json!({ "ok": "yes" }), &shape)
            .expect_err("must fail");
        assert_eq!(error.kind(), CallErrorKind::Validation);
        assert_eq!(error.diagnostic().map(|d| d.issues().len()), Some(1));
    }

    #[test]
    fn check_argument_reports_path_of_bad_member() {
        let shape = Shape::object([("offset", Shape::optional(Shape::string()))]);
        let error = check_argument("list bases", &json!({ "offset": 3 }), &shape)
            .expect_err("must fail");
        assert_eq!(error.diagnostic().map(|d| d.issues()[0].path.as_str()), Some("offset"));
    }
}
