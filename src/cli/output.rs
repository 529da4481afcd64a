//! Output formatting for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// One certificate of a validated CA bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    pub not_after: String,
    pub is_ca: bool,
}

/// Result of `validate-bundle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleReport {
    pub certificates: Vec<CertificateSummary>,
    pub system_roots: usize,
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Render a bundle report as a table
pub fn bundle_table(report: &BundleReport) -> String {
    let mut out = format!("{:<4} {:<5} {:<26} SUBJECT\n", "#", "CA", "NOT AFTER");
    for (index, cert) in report.certificates.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<5} {:<26} {}\n",
            index,
            if cert.is_ca { "yes" } else { "no" },
            cert.not_after,
            cert.subject
        ));
    }
    out.push_str(&format!(
        "\n{} certificate(s) accepted, {} system root(s) loaded\n",
        report.certificates.len(),
        report.system_roots
    ));
    out
}

/// Print a bundle report in the requested format
pub fn print_bundle_report(report: &BundleReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            print!("{}", bundle_table(report));
            Ok(())
        }
    }
}
