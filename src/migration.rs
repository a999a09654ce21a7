//! One-shot upgrade of stored documents written before canvases carried a `type` tag.
//!
//! Runs on the raw JSON so legacy shapes never reach the typed model. A canvas counts as
//! migrated once it has a `type`, which makes the pass idempotent.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub canvases_migrated: usize,
    pub projects_touched: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.canvases_migrated > 0
    }
}

pub fn needs_migration(document: &Value) -> bool {
    legacy_canvases(document).next().is_some()
}

pub fn migrate(document: &mut Value) -> MigrationReport {
    let mut report = MigrationReport::default();
    let Some(projects) = document.as_array_mut() else {
        return report;
    };

    for project in projects {
        let Some(canvases) = project.get_mut("canvases").and_then(Value::as_array_mut) else {
            continue;
        };
        let mut touched = false;
        for canvas in canvases.iter_mut().filter_map(Value::as_object_mut) {
            if has_type(canvas) {
                continue;
            }
            upgrade_canvas(canvas);
            report.canvases_migrated += 1;
            touched = true;
        }
        if touched {
            report.projects_touched += 1;
        }
    }

    report
}

/// Projects, canvases and note blocks present in a raw document, readable or not.
pub fn entry_count(document: &Value) -> usize {
    let Some(projects) = document.as_array() else {
        return 0;
    };
    projects
        .iter()
        .map(|project| {
            let canvases = project.get("canvases").and_then(Value::as_array);
            1 + canvases.map_or(0, |canvases| canvases.iter().map(canvas_entry_count).sum::<usize>())
        })
        .sum()
}

fn canvas_entry_count(canvas: &Value) -> usize {
    if canvas.get("type").and_then(Value::as_str) != Some("NOTE") {
        return 1;
    }
    1 + canvas.get("blocks").and_then(Value::as_array).map_or(0, Vec::len)
}

fn upgrade_canvas(canvas: &mut Map<String, Value>) {
    canvas.insert("type".to_string(), Value::String("NOTE".to_string()));
    if !canvas.get("blocks").is_some_and(Value::is_array) {
        canvas.insert("blocks".to_string(), Value::Array(Vec::new()));
    }
    if !canvas.get("playgroundContent").is_some_and(Value::is_object) {
        canvas.insert(
            "playgroundContent".to_string(),
            json!({"html": "", "css": "", "js": ""}),
        );
    }
}

fn has_type(canvas: &Map<String, Value>) -> bool {
    canvas.get("type").is_some_and(|kind| !kind.is_null())
}

fn legacy_canvases(document: &Value) -> impl Iterator<Item = &Map<String, Value>> {
    document
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|project| project.get("canvases").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_object)
        .filter(|canvas| !has_type(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_document() -> Value {
        json!([
            {
                "id": "p1",
                "name": "Old",
                "parentId": null,
                "canvases": [
                    {"id": "c1", "title": "No type", "createdAt": "2024-01-01T00:00:00Z"},
                    {"id": "c2", "title": "Has blocks", "createdAt": "2024-01-01T00:00:00Z",
                     "blocks": [{"id": "b1", "type": "TEXT", "content": "keep"}]},
                    {"id": "c3", "title": "Modern", "type": "PLAYGROUND", "createdAt": "2024-01-01T00:00:00Z",
                     "playgroundContent": {"html": "<b>x</b>", "css": "", "js": ""}}
                ]
            },
            {"id": "p2", "name": "Clean", "parentId": "p1", "canvases": []}
        ])
    }

    #[test]
    fn defaults_type_blocks_and_buffers() {
        let mut document = legacy_document();
        assert!(needs_migration(&document));

        let report = migrate(&mut document);
        assert_eq!(report.canvases_migrated, 2);
        assert_eq!(report.projects_touched, 1);
        assert!(!needs_migration(&document));

        let canvases = &document[0]["canvases"];
        assert_eq!(canvases[0]["type"], "NOTE");
        assert_eq!(canvases[0]["blocks"], json!([]));
        assert_eq!(canvases[0]["playgroundContent"], json!({"html": "", "css": "", "js": ""}));
        assert_eq!(canvases[1]["blocks"][0]["content"], "keep");
        assert_eq!(canvases[2]["playgroundContent"]["html"], "<b>x</b>");
    }

    #[test]
    fn running_twice_changes_nothing() {
        let mut once = legacy_document();
        migrate(&mut once);
        let mut twice = once.clone();
        let report = migrate(&mut twice);
        assert_eq!(twice, once);
        assert!(!report.changed());
    }

    #[test]
    fn ignores_documents_that_are_not_project_arrays() {
        let mut document = json!({"projects": []});
        assert_eq!(migrate(&mut document), MigrationReport::default());
        assert_eq!(document, json!({"projects": []}));
    }

    #[test]
    fn counts_projects_canvases_and_note_blocks() {
        let mut document = legacy_document();
        assert_eq!(entry_count(&document), 5);
        migrate(&mut document);
        assert_eq!(entry_count(&document), 6);
        assert_eq!(entry_count(&json!({"projects": []})), 0);
    }
}
