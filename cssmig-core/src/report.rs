//! Output formatting - persisted audit artifacts, plaintext and JSON summaries.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use serde_json::json;

use crate::audit::AuditReport;
use crate::duplicates::{duplicates_document, group_index};
use crate::error::{CssmigError, CssmigResult, IoResultExt};
use crate::risk::RiskLevel;
use crate::tokens::TokenReport;

pub const AUDIT_JSON_FILE: &str = "css-audit-full.json";
pub const DUPLICATES_JSON_FILE: &str = "css-duplicates.json";
pub const AUDIT_CSV_FILE: &str = "css-audit.csv";

const CSV_HEADER: &str = "class,risk,usage_count,component,files,duplicate_group,merge_candidates";

/// Console summary format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{}' (expected plain or json)", other)),
        }
    }
}

/// Paths of the three audit artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOutputs {
    pub audit_json: PathBuf,
    pub duplicates_json: PathBuf,
    pub csv: PathBuf,
}

/// Serialize `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> CssmigResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    let text = serde_json::to_string_pretty(value).map_err(|e| CssmigError::Io {
        path: path.to_path_buf(),
        message: format!("JSON serialization failed: {}", e),
        source: None,
    })?;
    fs::write(path, text).with_path(path)
}

/// Write the audit JSON, duplicates JSON and CSV into `dir`.
pub fn write_audit_outputs(report: &AuditReport, dir: &Path) -> CssmigResult<AuditOutputs> {
    fs::create_dir_all(dir).with_path(dir)?;

    let outputs = AuditOutputs {
        audit_json: dir.join(AUDIT_JSON_FILE),
        duplicates_json: dir.join(DUPLICATES_JSON_FILE),
        csv: dir.join(AUDIT_CSV_FILE),
    };

    write_json(&outputs.audit_json, &report.model.to_audit_document())?;
    write_json(&outputs.duplicates_json, &duplicates_document(&report.duplicates))?;
    fs::write(&outputs.csv, audit_csv(report)).with_path(&outputs.csv)?;

    tracing::info!(dir = %dir.display(), "Audit outputs written");
    Ok(outputs)
}

/// CSV rendering of the audit, most used classes first.
pub fn audit_csv(report: &AuditReport) -> String {
    let groups = group_index(&report.duplicates);
    let mut records: Vec<_> = report.model.records().collect();
    records.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for record in records {
        let (group, candidates) = match groups.get(record.name.as_str()) {
            Some(group) => (
                group.short_hash().to_string(),
                group
                    .classes
                    .iter()
                    .filter(|c| **c != record.name)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            None => (String::new(), String::new()),
        };
        let files = record
            .source_files
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let fields = [
            csv_field(&record.name),
            record.risk.unwrap_or(RiskLevel::Low).as_str().to_string(),
            record.usage_count.to_string(),
            csv_field(record.component.as_deref().unwrap_or_default()),
            csv_field(&files),
            group,
            csv_field(&candidates),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Prints the audit summary in the chosen format.
pub fn print_audit_summary(report: &AuditReport, format: OutputFormat) {
    match format {
        OutputFormat::Plain => print!("{}", plain_audit_summary(report)),
        OutputFormat::Json => print_json(&audit_summary_json(report)),
    }
}

fn plain_audit_summary(report: &AuditReport) -> String {
    let breakdown = report.risk_breakdown();
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "CSS AUDIT COMPLETE");
    let _ = writeln!(
        out,
        "Found {} unique CSS classes across {} CSS files ({} source files scanned)",
        report.model.len(),
        report.css_file_count,
        report.source_file_count
    );
    let _ = writeln!(out, "Identified {} duplicate rule sets", report.duplicates.len());
    let _ = writeln!(out, "Risk breakdown:");
    let _ = writeln!(out, "  HIGH: {} classes", breakdown.high);
    let _ = writeln!(out, "  MEDIUM: {} classes", breakdown.medium);
    let _ = writeln!(out, "  LOW: {} classes", breakdown.low);

    let unused = report.unused_classes();
    if !unused.is_empty() {
        let _ = writeln!(out, "Unused classes: {}", unused.len());
    }
    if !report.undeclared.is_empty() {
        let _ = writeln!(
            out,
            "Referenced but undeclared ({}):",
            report.undeclared.len()
        );
        for (class, files) in &report.undeclared {
            let _ = writeln!(out, "- {} ({} files)", class, files);
        }
    }
    if !report.advisory_literals.is_empty() {
        let _ = writeln!(
            out,
            "Possible dynamic references, not counted ({}):",
            report.advisory_literals.len()
        );
        for (class, files) in &report.advisory_literals {
            let _ = writeln!(out, "- {} ({} files)", class, files);
        }
    }
    for skipped in &report.skipped {
        let _ = writeln!(out, "[SKIP] {}: {}", skipped.path.display(), skipped.error);
    }
    out
}

fn audit_summary_json(report: &AuditReport) -> serde_json::Value {
    let skipped: Vec<_> = report
        .skipped
        .iter()
        .map(|s| json!({ "path": s.path, "error": s.error.to_string() }))
        .collect();
    json!({
        "classes": report.model.len(),
        "css_files": report.css_file_count,
        "source_files": report.source_file_count,
        "duplicate_groups": report.duplicates.len(),
        "risk": report.risk_breakdown(),
        "unused": report.unused_classes(),
        "undeclared": report.undeclared,
        "advisory_literals": report.advisory_literals,
        "skipped": skipped,
    })
}

/// Prints a JSON value, falling back to a debug rendering if serialization fails.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{:?}", value);
        }
    }
}

#[cfg(feature = "rewrite")]
pub use rewrite_summary::print_rewrite_summary;

#[cfg(feature = "rewrite")]
mod rewrite_summary {
    use crate::rewrite::{FileStatus, RewriteSummary};

    /// Prints per-status file counts after a rename run.
    pub fn print_rewrite_summary(summary: &RewriteSummary) {
        let label = if summary.dry_run { "DRY-RUN" } else { "RENAME" };
        println!(
            "[{}] {} occurrences found, {} accepted",
            label,
            summary.total_occurrences(),
            summary.total_accepted()
        );
        for (status, name) in [
            (FileStatus::Rewritten, "rewritten"),
            (FileStatus::WouldChange, "would change"),
            (FileStatus::Unchanged, "unchanged"),
            (FileStatus::Skipped, "skipped"),
            (FileStatus::Aborted, "aborted"),
            (FileStatus::Refused, "refused (symlink)"),
            (FileStatus::Unreadable, "unreadable"),
        ] {
            let count = summary.files_with_status(status);
            if count > 0 {
                println!("  {}: {} files", name, count);
            }
        }
        if summary.quit {
            println!("Stopped early at operator request.");
        }
    }
}

/// Prints the token analysis summary.
pub fn print_token_summary(report: &TokenReport, defined: usize) {
    println!("Found {} defined tokens", defined);
    println!(
        "Found {} unique tokens across {} files",
        report.token_counts.len(),
        report.file_token_counts.len()
    );
    if !report.most_used_tokens.is_empty() {
        println!("Top 5 most used tokens:");
        for (i, entry) in report.most_used_tokens.iter().take(5).enumerate() {
            println!("  {}. {} - {} uses", i + 1, entry.token, entry.count);
        }
    }
    if !report.unused_mapped_tokens.is_empty() {
        println!(
            "{} mapped tokens are unused in the codebase",
            report.unused_mapped_tokens.len()
        );
    }
    if !report.orphaned_tokens.is_empty() {
        eprintln!(
            "[WARN] {} tokens used but never defined:",
            report.orphaned_tokens.len()
        );
        for token in &report.orphaned_tokens {
            eprintln!("  {}", token);
        }
    }
}
