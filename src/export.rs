//! Result export: aggregate CSV, per-location CSV files, JSON report
//!
//! The aggregate file and every per-location file share one column order so
//! downstream spreadsheets can be concatenated blindly. Location hints are
//! sanitized before they become filenames; an empty hint falls back to the
//! UNKNOWN bucket, mirroring what the driver does before resolution.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use csv::Writer;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::resolver::{ResolutionMethod, ResolutionResult};

pub const MASTER_CSV_FILENAME: &str = "entity_websites.csv";
pub const JSON_REPORT_FILENAME: &str = "entity_websites.json";
pub const BY_LOCATION_DIR: &str = "by_location";

/// Bucket used when a result reaches export with no location hint at all.
const UNKNOWN_LOCATION: &str = "UNKNOWN";

/// Column order shared by the aggregate file and every per-location file.
const CSV_HEADER: &[&str] = &[
    "location_hint",
    "entity_name",
    "search_query",
    "best_domain",
    "best_url",
    "best_http_status",
    "method",
    "other_candidates",
];

static UNSAFE_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_-]+").expect("label pattern is a valid regex"));

/// Collapse every run of filename-hostile characters to a single underscore.
fn sanitize_location_label(hint: &str) -> String {
    let label = if hint.is_empty() { UNKNOWN_LOCATION } else { hint };
    UNSAFE_LABEL_RE.replace_all(label, "_").into_owned()
}

fn location_bucket(result: &ResolutionResult) -> &str {
    if result.location_hint.is_empty() {
        UNKNOWN_LOCATION
    } else {
        &result.location_hint
    }
}

/// Write the aggregate CSV plus one CSV per distinct location hint.
///
/// Produces `entity_websites.csv` in `out_dir` and
/// `by_location/results_location_{label}.csv` next to it. Directories are
/// created as needed.
pub fn export_csv(results: &[ResolutionResult], out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let master_path = out_dir.join(MASTER_CSV_FILENAME);
    write_result_csv(results.iter(), &master_path)?;
    info!(
        "Exported {} row(s) to {}",
        results.len(),
        master_path.display()
    );

    let mut by_location: BTreeMap<String, Vec<&ResolutionResult>> = BTreeMap::new();
    for result in results {
        by_location
            .entry(location_bucket(result).to_string())
            .or_default()
            .push(result);
    }

    let location_dir = out_dir.join(BY_LOCATION_DIR);
    fs::create_dir_all(&location_dir).with_context(|| {
        format!(
            "Failed to create per-location directory: {}",
            location_dir.display()
        )
    })?;

    for (location, rows) in &by_location {
        let filename = format!(
            "results_location_{}.csv",
            sanitize_location_label(location)
        );
        let path = location_dir.join(filename);
        write_result_csv(rows.iter().copied(), &path)?;
        debug!("Wrote {} row(s) for location {:?}", rows.len(), location);
    }

    info!(
        "Exported {} per-location file(s) under {}",
        by_location.len(),
        location_dir.display()
    );

    Ok(master_path)
}

fn write_result_csv<'a>(
    rows: impl Iterator<Item = &'a ResolutionResult>,
    path: &Path,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(CSV_HEADER)?;

    for result in rows {
        let audit = serde_json::to_string(&result.other_candidates)
            .context("Failed to serialize candidate audit")?;
        wtr.write_record(&[
            result.location_hint.as_str(),
            result.entity_name.as_str(),
            result.search_query.as_str(),
            result.best_domain.as_str(),
            result.best_url.as_str(),
            result.best_http_status.as_str(),
            result.method.as_str(),
            audit.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[derive(serde::Serialize)]
struct JsonExport {
    summary: ExportSummary,
    results: Vec<ResolutionResult>,
}

#[derive(serde::Serialize)]
struct ExportSummary {
    generated_at: String,
    tool_version: String,
    total_rows: usize,
    resolved_via_search: usize,
    resolved_via_guess: usize,
    unresolved: usize,
    distinct_locations: usize,
}

/// Write a single JSON report with a summary header and the full result set.
pub fn export_json(results: &[ResolutionResult], out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let distinct_locations = results
        .iter()
        .map(location_bucket)
        .collect::<std::collections::HashSet<_>>()
        .len();

    let export = JsonExport {
        summary: ExportSummary {
            generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            total_rows: results.len(),
            resolved_via_search: count_method(results, ResolutionMethod::Search),
            resolved_via_guess: count_method(results, ResolutionMethod::Guess),
            unresolved: count_method(results, ResolutionMethod::None),
            distinct_locations,
        },
        results: results.to_vec(),
    };

    let path = out_dir.join(JSON_REPORT_FILENAME);
    let json = serde_json::to_string_pretty(&export)?;
    let mut file = File::create(&path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    file.write_all(json.as_bytes())?;

    info!("Exported {} row(s) to {}", results.len(), path.display());
    Ok(path)
}

fn count_method(results: &[ResolutionResult], method: ResolutionMethod) -> usize {
    results.iter().filter(|r| r.method == method).count()
}

/// Print the end-of-run summary block.
pub fn print_run_summary(results: &[ResolutionResult], elapsed: Duration, interrupted: bool) {
    println!("\n=== Resolution Summary ===");
    println!("Entities processed:  {}", results.len());
    println!(
        "Resolved via search: {}",
        count_method(results, ResolutionMethod::Search)
    );
    println!(
        "Resolved via guess:  {}",
        count_method(results, ResolutionMethod::Guess)
    );
    println!(
        "Unresolved:          {}",
        count_method(results, ResolutionMethod::None)
    );
    println!("Elapsed:             {:.1}s", elapsed.as_secs_f64());
    if interrupted {
        println!("Run interrupted; the files cover only the entities completed so far.");
    }
    println!("==========================\n");
}
