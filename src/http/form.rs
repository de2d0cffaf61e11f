//! Multipart form field extraction.
//!
//! Just enough multipart parsing to read named text fields for scoping
//! checks. File parts (sections that declare their own `Content-Type`)
//! are skipped. Anything malformed yields an empty map; callers treat a
//! missing field as a failed check, never as an error.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::http::event::{EventBody, GatewayEvent};

static BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i);\s*boundary=([^;]+)").expect("invalid boundary pattern"));

static DISPOSITION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^Content-Disposition:.*;\s*name=["']([^"']+)["']"#)
        .expect("invalid disposition pattern")
});

static PART_CONTENT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Content-Type:").expect("invalid content-type pattern"));

/// Extract text fields from an event's multipart body.
pub fn form_fields(event: &GatewayEvent) -> HashMap<String, String> {
    match (&event.body, event.content_type()) {
        (Some(body), Some(content_type)) => extract_fields(body, content_type),
        _ => HashMap::new(),
    }
}

/// Extract text fields from a (possibly base64) multipart body.
pub fn extract_fields(body: &EventBody, content_type: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    if body.is_empty() {
        return fields;
    }
    let Some(boundary) = boundary(content_type) else {
        return fields;
    };
    let bytes = match body.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "Undecodable multipart body");
            return fields;
        }
    };
    let text = String::from_utf8_lossy(&bytes);

    let delimiter = format!("--{}", boundary);
    for section in text.split(delimiter.as_str()) {
        if let Some((name, value)) = parse_section(section) {
            fields.entry(name).or_insert(value);
        }
    }
    fields
}

/// Boundary token from a `multipart/...; boundary=...` content type.
fn boundary(content_type: &str) -> Option<String> {
    let raw = BOUNDARY.captures(content_type)?.get(1)?.as_str().trim();
    let unquoted = raw.trim_matches('"');
    (!unquoted.is_empty()).then(|| unquoted.to_string())
}

fn parse_section(section: &str) -> Option<(String, String)> {
    let section = section.trim_start_matches(['\r', '\n']);
    let lines: Vec<&str> = section.split("\r\n").collect();

    if lines.get(1).is_some_and(|line| PART_CONTENT_TYPE.is_match(line)) {
        return None;
    }
    let name = DISPOSITION_NAME.captures(lines.first()?)?.get(1)?.as_str();
    let value = lines.get(2..).unwrap_or_default().join("\n");

    Some((name.to_string(), value.trim().to_string()))
}
