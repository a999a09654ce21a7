//! Reading and writing the portable export document: a JSON array of projects with their
//! canvases and blocks embedded.

use crate::errors::{AppError, AppResult};
use crate::migration;
use crate::models::{Project, Workspace};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

static EXPORT_DOCUMENT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "array",
        "minItems": 1,
        "items": {
            "type": "object",
            "required": ["id", "name", "canvases"],
            "properties": {
                "id": {"type": "string"},
                "name": {"type": "string"},
                "canvases": {"type": "array"}
            }
        }
    })
});

static EXPORT_DOCUMENT_VALIDATOR: Lazy<Result<JSONSchema, String>> =
    Lazy::new(|| JSONSchema::compile(&EXPORT_DOCUMENT_SCHEMA).map_err(|error| error.to_string()));

pub fn parse_export_document(raw: &str) -> AppResult<Vec<Project>> {
    let Some(mut value) = parse_json_value(raw) else {
        return Err(AppError::InvalidFormat(
            "import file is empty or not valid JSON".to_string(),
        ));
    };

    let errors = validate_export_document(&value)?;
    if !errors.is_empty() {
        return Err(AppError::InvalidFormat(format!(
            "does not look like an Atelier export: {}",
            errors.join("; ")
        )));
    }

    let report = migration::migrate(&mut value);
    if report.canvases_migrated > 0 {
        tracing::info!(
            canvases = report.canvases_migrated,
            "upgraded legacy canvases in import document"
        );
    }

    let entries = migration::entry_count(&value);
    let projects: Vec<Project> = serde_json::from_value(value)
        .map_err(|error| AppError::InvalidFormat(format!("unreadable project record: {}", error)))?;
    let skipped = entries.saturating_sub(Workspace::new(projects.clone()).entry_count());
    if skipped > 0 {
        tracing::warn!(skipped, "import document has unreadable entries, importing the rest");
    }
    if projects.is_empty() {
        return Err(AppError::InvalidFormat(
            "import file has no readable projects".to_string(),
        ));
    }
    Ok(projects)
}

pub fn render_export_document(projects: &[Project]) -> AppResult<String> {
    serde_json::to_string_pretty(projects).map_err(AppError::from)
}

fn parse_json_value(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

fn validate_export_document(value: &Value) -> AppResult<Vec<String>> {
    let compiled = EXPORT_DOCUMENT_VALIDATOR.as_ref().map_err(|error| {
        AppError::Internal(format!("failed to compile export document schema: {}", error))
    })?;

    let errors = compiled
        .validate(value)
        .err()
        .map(|errors| {
            errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    if path.is_empty() {
                        error.to_string()
                    } else {
                        format!("{}: {}", path, error)
                    }
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    Ok(errors)
}
