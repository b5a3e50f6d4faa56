//! CLI output formatting for build results.
//!
//! All user-facing printing happens here and in `main`; library modules
//! return data. One line per emitted file, then a warnings block for
//! assets that fell back to the default version token:
//!
//! ```text
//! css/pages/home.css → build/pages/home.js (1.4 KB)
//! css/module/a.css → build/module/a.js (312 B)
//! 2 files emitted
//!
//! Warning: 1 asset not found, versioned as ?v=0
//!   img/missing.png
//! ```

use crate::pipeline::BuildReport;

/// Lines describing a completed build, ready to print.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .outputs
        .iter()
        .map(|out| format!("{} → {} ({})", out.entry, out.dest, format_size(out.bytes)))
        .collect();
    let n = report.outputs.len();
    lines.push(format!("{n} file{} emitted", if n == 1 { "" } else { "s" }));

    if !report.missing_assets.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Warning: {} asset{} not found, versioned as ?v=0",
            report.missing_assets.len(),
            if report.missing_assets.len() == 1 { "" } else { "s" }
        ));
        for asset in &report.missing_assets {
            lines.push(format!("  {asset}"));
        }
    }
    lines
}

/// Human-readable byte size: `312 B`, `1.4 KB`, `2.1 MB`.
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
