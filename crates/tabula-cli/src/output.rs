use serde::Serialize;
use serde_json::Value;
use tabula_core::{CallError, UtcDateTime};
use uuid::Uuid;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Response envelope for every command's machine-readable output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub meta: EnvelopeMeta,
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
}

impl EnvelopeMeta {
    pub fn new(latency_ms: u64) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            generated_at: UtcDateTime::now(),
            latency_ms,
        }
    }
}

/// Failure of one item inside an otherwise successful command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl EnvelopeError {
    pub fn from_call(error: &CallError, item: Option<String>) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.message().to_owned(),
            item,
            status: error.status(),
        }
    }
}

pub fn render(envelope: &Envelope, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Text => print!("{}", render_text(envelope)?),
    }

    Ok(())
}

/// Enum text is written as-is so it can be pasted into source files; other
/// data is shown as indented JSON under a short header.
fn render_text(envelope: &Envelope) -> Result<String, CliError> {
    let mut out = String::new();

    match &envelope.data {
        Value::String(text) => {
            out.push_str(text);
            out.push('\n');
        }
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => {
            for item in items.iter().filter_map(Value::as_str) {
                out.push_str(item);
                out.push_str("\n\n");
            }
        }
        data => {
            out.push_str(&format!("request_id  : {}\n", envelope.meta.request_id));
            out.push_str(&format!("generated_at: {}\n", envelope.meta.generated_at));
            out.push_str(&format!("latency_ms  : {}\n", envelope.meta.latency_ms));
            out.push_str("data:\n");
            for line in serde_json::to_string_pretty(data)?.lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    if !envelope.errors.is_empty() {
        out.push_str("errors:\n");
        for error in &envelope.errors {
            match &error.item {
                Some(item) => out.push_str(&format!("  - {item}: {}: {}\n", error.code, error.message)),
                None => out.push_str(&format!("  - {}: {}\n", error.code, error.message)),
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn envelope(data: Value) -> Envelope {
        Envelope {
            meta: EnvelopeMeta::new(12),
            data,
            errors: Vec::new(),
        }
    }

    #[test]
    fn enum_text_is_printed_verbatim() {
        let text = render_text(&envelope(json!(["enum User {\n\tname = \"fld1\"\n}"])))
            .expect("renders");
        assert_eq!(text, "enum User {\n\tname = \"fld1\"\n}\n\n");
    }

    #[test]
    fn item_errors_are_listed_after_data() {
        let mut envelope = envelope(json!({ "records": [] }));
        envelope.errors.push(EnvelopeError::from_call(
            &CallError::upstream_status(404, "find record: upstream returned status 404: NOT_FOUND"),
            Some(String::from("rec2")),
        ));

        let text = render_text(&envelope).expect("renders");
        assert!(text.contains("  - rec2: call.integration: find record"));
    }

    #[test]
    fn json_envelope_omits_empty_errors() {
        let value = serde_json::to_value(envelope(json!([]))).expect("serializable");
        assert!(value.get("errors").is_none());
        assert_eq!(value["meta"]["latency_ms"], 12);
    }
}
