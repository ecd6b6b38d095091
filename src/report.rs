//! JSON medical report export.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

use crate::data::{VitalsData, REFERENCE_RANGE};

/// Build the report document for a snapshot.
pub fn build_report(data: &VitalsData, source: &str) -> Value {
    let analysis = &data.analysis;
    let mut export = Map::new();

    export.insert(
        "generated_at".to_string(),
        json!(chrono::Utc::now().to_rfc3339()),
    );
    export.insert("source".to_string(), json!(source));

    let mut summary = Map::new();
    summary.insert("total_assessments".to_string(), json!(analysis.total_records));
    summary.insert("valid_readings".to_string(), json!(analysis.valid_readings));
    summary.insert("mean_heart_rate".to_string(), json!(analysis.mean_heart_rate));
    summary.insert(
        "reference_range_bpm".to_string(),
        json!([REFERENCE_RANGE.0, REFERENCE_RANGE.1]),
    );
    summary.insert("high_risk_count".to_string(), json!(analysis.high_risk_count));
    summary.insert("stability_score".to_string(), json!(analysis.stability.label()));
    export.insert("summary".to_string(), Value::Object(summary));

    let trend = &analysis.trend;
    export.insert(
        "trend".to_string(),
        json!({
            "status": trend.status.label(),
            "recent_avg": trend.recent_avg,
            "previous_avg": trend.previous_avg,
            "delta": trend.delta,
        }),
    );

    if let Some((from, to)) = data.period() {
        export.insert("period".to_string(), json!({ "from": from, "to": to }));
    }

    let records: Vec<Value> = data
        .rows
        .iter()
        .map(|row| {
            json!({
                "timestamp": row.date_time,
                "source": row.scan_label,
                "heart_rate": row.bpm,
                "risk_level": row.risk_text,
                "confidence": row.confidence,
                "ten_year_outlook": row.risk.map(|r| r.ten_year_outlook()),
            })
        })
        .collect();
    export.insert("records".to_string(), Value::Array(records));

    Value::Object(export)
}

/// Write the report for a snapshot to a file.
pub fn write_report(path: &Path, data: &VitalsData, source: &str) -> Result<()> {
    let report = build_report(data, source);
    let json = serde_json::to_string_pretty(&report)?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
