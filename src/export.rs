//! Event normalization and CSV output.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::client::{BraintrustClient, ObjectKind, ProjectSelector};
use crate::config::Config;
use crate::error::Result;

/// Summary of a completed export run.
#[derive(Debug, Default, serde::Serialize)]
pub struct ExportStats {
    pub project_id: String,
    pub experiments_processed: usize,
    pub experiments_empty: usize,
    pub datasets_processed: usize,
    pub datasets_empty: usize,
    pub files_written: usize,
    pub events_written: usize,
}

#[derive(Debug, Default)]
struct KindStats {
    processed: usize,
    empty: usize,
    files: usize,
    events: usize,
}

/// Resolve the project, then export every experiment and dataset under it.
/// Any fetch or write failure aborts the remainder of the run.
pub fn run_export(config: &Config, selector: &ProjectSelector) -> Result<ExportStats> {
    let client = BraintrustClient::new(config)?;
    let project_id = client.resolve_project(selector)?;
    info!("Exporting project {}", project_id);

    let mut stats = ExportStats {
        project_id,
        ..Default::default()
    };
    for kind in ObjectKind::ALL {
        let kind_stats = export_kind(&client, config, kind, &stats.project_id)?;
        match kind {
            ObjectKind::Experiment => {
                stats.experiments_processed = kind_stats.processed;
                stats.experiments_empty = kind_stats.empty;
            }
            ObjectKind::Dataset => {
                stats.datasets_processed = kind_stats.processed;
                stats.datasets_empty = kind_stats.empty;
            }
        }
        stats.files_written += kind_stats.files;
        stats.events_written += kind_stats.events;
    }
    Ok(stats)
}

fn export_kind(
    client: &BraintrustClient,
    config: &Config,
    kind: ObjectKind,
    project_id: &str,
) -> Result<KindStats> {
    let objects = client.list_objects(kind, project_id)?;
    info!("Found {} {}(s) in project {}", objects.len(), kind, project_id);

    let dir = Path::new(&config.output_dir).join(kind.as_str());
    let mut stats = KindStats::default();
    for obj in &objects {
        stats.processed += 1;
        let events = client.fetch_events(kind, &obj.id)?;
        if events.is_empty() {
            warn!("No events found for {}/{}", kind, obj.id);
            stats.empty += 1;
            continue;
        }

        let mut normalized = Vec::with_capacity(events.len());
        for event in events {
            normalized.push(normalize_event(event)?);
        }

        let stem = sanitize_file_name(obj.name.as_deref().unwrap_or(&obj.id));
        let path = dir.join(format!("{}.csv", stem));
        let written = write_events_csv(&normalized, &path)?;
        stats.events += written;
        stats.files += 1;
        info!("Wrote {} event(s) to {}", written, path.display());
    }
    Ok(stats)
}

/// Flatten an event into CSV-friendly cells.
///
/// When `input` is itself an object, its `input`/`output`/`expected`/
/// `metadata` members are hoisted to the top level, replacing any existing
/// values. Remaining object or array values become JSON strings so each
/// cell is scalar text.
pub fn normalize_event(mut event: Map<String, Value>) -> Result<Map<String, Value>> {
    if event.get("input").is_some_and(Value::is_object)
        && let Some(Value::Object(inner)) = event.remove("input")
    {
        for key in ["input", "output", "expected", "metadata"] {
            let value = inner.get(key).cloned().unwrap_or(Value::Null);
            event.insert(key.to_string(), value);
        }
    }

    for value in event.values_mut() {
        if value.is_object() || value.is_array() {
            *value = Value::String(serde_json::to_string(value)?);
        }
    }
    Ok(event)
}

/// Write one CSV file: a header row over the sorted union of field names,
/// then one row per event. Creates parent directories, overwrites an
/// existing file of the same name.
pub fn write_events_csv(events: &[Map<String, Value>], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut fields = BTreeSet::new();
    for event in events {
        fields.extend(event.keys().cloned());
    }
    let fields: Vec<String> = fields.into_iter().collect();

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&fields)?;
    for event in events {
        let row: Vec<String> = fields
            .iter()
            .map(|f| event.get(f).map(cell_text).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(events.len())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Object names become file names; path separators and other hostile
/// characters turn into underscores.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn normalize_hoists_nested_input_object() {
        let event = as_map(json!({
            "id": "ev-1",
            "input": {
                "input": "what is 2+2?",
                "output": "4",
                "expected": "4",
                "metadata": {"model": "gpt-4"}
            }
        }));
        let normalized = normalize_event(event).unwrap();
        assert_eq!(normalized["input"], json!("what is 2+2?"));
        assert_eq!(normalized["output"], json!("4"));
        assert_eq!(normalized["expected"], json!("4"));
        // Hoisted metadata was an object, so it gets JSON-encoded
        assert_eq!(normalized["metadata"], json!(r#"{"model":"gpt-4"}"#));
        assert_eq!(normalized["id"], json!("ev-1"));
    }

    #[test]
    fn normalize_hoist_overwrites_existing_siblings() {
        let event = as_map(json!({
            "input": {"input": "a", "output": "b"},
            "output": "stale",
            "expected": "stale"
        }));
        let normalized = normalize_event(event).unwrap();
        assert_eq!(normalized["output"], json!("b"));
        // Members absent from the nested object become null
        assert_eq!(normalized["expected"], Value::Null);
        assert_eq!(normalized["metadata"], Value::Null);
    }

    #[test]
    fn normalize_stringifies_compound_values() {
        let event = as_map(json!({
            "scores": {"accuracy": 0.9},
            "tags": ["a", "b"],
            "plain": "kept",
            "count": 3
        }));
        let normalized = normalize_event(event).unwrap();
        assert_eq!(normalized["scores"], json!(r#"{"accuracy":0.9}"#));
        assert_eq!(normalized["tags"], json!(r#"["a","b"]"#));
        assert_eq!(normalized["plain"], json!("kept"));
        assert_eq!(normalized["count"], json!(3));
    }

    #[test]
    fn normalize_leaves_scalar_input_alone() {
        let event = as_map(json!({"input": "just a string", "output": "y"}));
        let normalized = normalize_event(event).unwrap();
        assert_eq!(normalized["input"], json!("just a string"));
        assert_eq!(normalized["output"], json!("y"));
    }

    #[test]
    fn sanitize_replaces_hostile_characters() {
        assert_eq!(sanitize_file_name("eval/run:1"), "eval_run_1");
        assert_eq!(sanitize_file_name("  spaced  "), "spaced");
        assert_eq!(sanitize_file_name("///"), "___");
        assert_eq!(sanitize_file_name("   "), "unnamed");
        assert_eq!(sanitize_file_name("plain-name"), "plain-name");
    }
}
