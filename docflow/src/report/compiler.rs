//! Markdown rendering of accumulated tool records.

use std::fmt::Write as _;

use crate::state::ToolRecord;
use crate::utils::Timestamp;

const NO_INSTALL_STEPS: &str = "*No installation steps available*";
const NO_UPDATE_STEPS: &str = "*No update steps available*";

/// Renders accumulated records into the final report document.
///
/// Rendering is a pure function of its arguments: the same records and the
/// same `generated_at` produce byte-identical text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportCompiler;

impl ReportCompiler {
    /// Creates a new report compiler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders the full report for records in their given order.
    #[must_use]
    pub fn render(&self, results: &[(String, ToolRecord)], generated_at: Timestamp) -> String {
        let mut out = String::new();
        out.push_str("# Tool Installation and Update Guide\n\n");
        let _ = writeln!(
            out,
            "Generated on: {}\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        out.push_str("---\n\n");

        for (tool, record) in results {
            Self::render_section(&mut out, tool, record);
        }

        out
    }

    /// Renders one tool section, ending with a separating rule.
    fn render_section(out: &mut String, tool: &str, record: &ToolRecord) {
        let _ = writeln!(out, "## {tool}\n");
        let _ = writeln!(out, "**Version:** {}\n", record.version);

        if !record.requirements.is_empty() {
            out.push_str("**Requirements:**\n");
            for req in &record.requirements {
                let _ = writeln!(out, "- {req}");
            }
            out.push('\n');
        }

        out.push_str("### Installation\n\n");
        Self::render_steps(out, &record.install_steps, NO_INSTALL_STEPS);

        out.push_str("### Update\n\n");
        Self::render_steps(out, &record.update_steps, NO_UPDATE_STEPS);

        if !record.notes.is_empty() {
            let _ = writeln!(out, "**Notes:** {}\n", record.notes);
        }

        out.push_str("---\n\n");
    }

    fn render_steps(out: &mut String, steps: &[String], empty_marker: &str) {
        if steps.is_empty() {
            let _ = writeln!(out, "{empty_marker}\n");
        } else {
            for (i, step) in steps.iter().enumerate() {
                let _ = writeln!(out, "{}. {step}", i + 1);
            }
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn fixed_time() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap()
    }

    fn sample_record() -> ToolRecord {
        ToolRecord {
            install_steps: vec!["Download the binary".to_string(), "Run it".to_string()],
            update_steps: Vec::new(),
            version: "1.0".to_string(),
            requirements: vec!["linux x86_64".to_string()],
            notes: "Needs root.".to_string(),
        }
    }

    #[test]
    fn test_render_section_contents() {
        let compiler = ReportCompiler::new();
        let results = vec![("toolA".to_string(), sample_record())];

        let report = compiler.render(&results, fixed_time());

        assert!(report.starts_with("# Tool Installation and Update Guide\n"));
        assert!(report.contains("Generated on: 2026-08-06 12:00:00"));
        assert!(report.contains("## toolA"));
        assert!(report.contains("**Version:** 1.0"));
        assert!(report.contains("- linux x86_64"));
        assert!(report.contains("1. Download the binary"));
        assert!(report.contains("2. Run it"));
        assert!(report.contains("*No update steps available*"));
        assert!(report.contains("**Notes:** Needs root."));
    }

    #[test]
    fn test_render_empty_lists_use_markers() {
        let compiler = ReportCompiler::new();
        let results = vec![("bare".to_string(), ToolRecord::new())];

        let report = compiler.render(&results, fixed_time());

        assert!(report.contains("*No installation steps available*"));
        assert!(report.contains("*No update steps available*"));
        assert!(!report.contains("**Requirements:**"));
        assert!(!report.contains("**Notes:**"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let compiler = ReportCompiler::new();
        let results = vec![
            ("nodejs".to_string(), sample_record()),
            ("k9s".to_string(), ToolRecord::sentinel()),
        ];
        let at = fixed_time();

        assert_eq!(compiler.render(&results, at), compiler.render(&results, at));
    }

    #[test]
    fn test_render_preserves_order() {
        let compiler = ReportCompiler::new();
        let results = vec![
            ("nodejs".to_string(), ToolRecord::new()),
            ("k9s".to_string(), ToolRecord::new()),
        ];

        let report = compiler.render(&results, fixed_time());
        let nodejs_at = report.find("## nodejs").unwrap();
        let k9s_at = report.find("## k9s").unwrap();
        assert!(nodejs_at < k9s_at);
    }

    #[test]
    fn test_render_no_results_is_header_only() {
        let compiler = ReportCompiler::new();
        let report = compiler.render(&[], fixed_time());
        assert!(report.contains("# Tool Installation and Update Guide"));
        assert!(!report.contains("## "));
    }
}
