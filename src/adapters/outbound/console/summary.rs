use crate::application::dto::AnalysisReport;
use crate::compatibility::domain::{AnalysisResult, CompatibilityStatus};
use owo_colors::{OwoColorize, Style};
use std::fmt::Write;

/// Blockers listed by name before the list is truncated
const MAX_LISTED_BLOCKERS: usize = 10;

fn status_style(status: CompatibilityStatus) -> Style {
    match status {
        CompatibilityStatus::Compatible => Style::new().green(),
        CompatibilityStatus::Incompatible => Style::new().red().bold(),
        CompatibilityStatus::NeedsUpgrade => Style::new().yellow(),
        CompatibilityStatus::NeedsVerification | CompatibilityStatus::NeedsVersionVerification => {
            Style::new().cyan()
        }
        CompatibilityStatus::Unknown => Style::new().dimmed(),
    }
}

/// Human-readable run summary for stderr
///
/// `color` is false when stderr is not a terminal.
pub fn render_summary(report: &AnalysisReport, color: bool) -> String {
    let paint = |text: String, style: Style| -> String {
        if color {
            text.style(style).to_string()
        } else {
            text
        }
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n📊 {} component(s) analyzed for {} in {} ms",
        report.summary.total, report.target_architecture, report.summary.processing_time_ms
    );

    for status in CompatibilityStatus::ALL {
        let count = report.summary.count(status);
        if count == 0 {
            continue;
        }
        let label = format!("{:>26}", status.as_str());
        let _ = writeln!(out, "   {} {}", paint(label, status_style(status)), count);
    }

    let blockers: Vec<&AnalysisResult> = report
        .results
        .iter()
        .filter(|r| r.status == CompatibilityStatus::Incompatible)
        .collect();
    if !blockers.is_empty() {
        let heading = paint(
            "❌ Migration blockers:".to_string(),
            status_style(CompatibilityStatus::Incompatible),
        );
        let _ = writeln!(out, "\n{}", heading);
        for result in blockers.iter().take(MAX_LISTED_BLOCKERS) {
            let version = match result.component.version() {
                "" => String::new(),
                v => format!(" {}", v),
            };
            let _ = writeln!(
                out,
                "   - {}{} ({}): {}",
                result.component.name(),
                version,
                result.component.ecosystem(),
                result.notes
            );
        }
        if blockers.len() > MAX_LISTED_BLOCKERS {
            let _ = writeln!(out, "   ... and {} more", blockers.len() - MAX_LISTED_BLOCKERS);
        }
    }

    if !report.summary.errors.is_empty() {
        let _ = writeln!(
            out,
            "\n⚠️  {} component(s) degraded by lookup or sandbox errors",
            report.summary.errors.len()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::domain::{
        Component, ComponentKey, Ecosystem, ResultSource, TargetArchitecture,
    };
    use std::time::Duration;

    fn result(name: &str, status: CompatibilityStatus) -> AnalysisResult {
        let component = Component::new(name, "1.0.0", Ecosystem::Pypi);
        let key = ComponentKey::new(Ecosystem::Pypi, name, "1.0.0");
        AnalysisResult::new(key, component, status, 0.9, ResultSource::Static)
            .with_notes("no aarch64 wheels")
    }

    #[test]
    fn test_plain_summary_lists_blockers() {
        let report = AnalysisReport::new(
            TargetArchitecture::Arm64,
            vec![
                result("numpy", CompatibilityStatus::Compatible),
                result("mssql-driver", CompatibilityStatus::Incompatible),
            ],
            Vec::new(),
            Duration::from_millis(12),
        );
        let text = render_summary(&report, false);
        assert!(text.contains("2 component(s) analyzed"));
        assert!(text.contains("incompatible 1"));
        assert!(text.contains("mssql-driver 1.0.0 (pypi): no aarch64 wheels"));
        assert!(!text.contains("needs_upgrade"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_summary_has_escapes() {
        let report = AnalysisReport::new(
            TargetArchitecture::Arm64,
            vec![result("numpy", CompatibilityStatus::Compatible)],
            Vec::new(),
            Duration::ZERO,
        );
        assert!(render_summary(&report, true).contains('\u{1b}'));
    }
}
