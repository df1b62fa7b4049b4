//! Session-level reports.

use chrono::{DateTime, Utc};
use flo_core::{ComponentReport, ReportStatus};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 of the whitespace-normalised text of one DAT file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDigest {
    pub name: String,
    pub sha256: String,
}

impl FileDigest {
    pub fn of_text(name: impl Into<String>, text: &str) -> Self {
        let normalised = flo_dat::normalise_whitespace(text);
        Self {
            name: name.into(),
            sha256: format!("{:x}", Sha256::digest(normalised.as_bytes())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub operation: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub components: Vec<ComponentReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileDigest>,
}

impl SessionReport {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            started_at: Utc::now(),
            finished_at: None,
            components: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn push(&mut self, report: ComponentReport) {
        self.components.push(report);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Worst component status; skipped components do not count.
    pub fn status(&self) -> ReportStatus {
        self.components
            .iter()
            .map(|r| r.status)
            .filter(|s| *s != ReportStatus::Skipped)
            .max()
            .unwrap_or(ReportStatus::Ok)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentReport> {
        self.components.iter().find(|r| r.component == name)
    }

    pub fn warning_count(&self) -> usize {
        self.components
            .iter()
            .filter(|r| r.status == ReportStatus::Warn)
            .map(|r| r.messages.len())
            .sum()
    }

    pub fn summary_line(&self) -> String {
        let done = self
            .components
            .iter()
            .filter(|r| r.status != ReportStatus::Skipped)
            .count();
        format!(
            "{}: {} components, {} skipped, {} warnings, status {}",
            self.operation,
            done,
            self.components.len() - done,
            self.warning_count(),
            self.status().label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_ignores_blank_runs() {
        let a = FileDigest::of_text("ARF.DAT", "T   -42  \n\n");
        let b = FileDigest::of_text("ARF.DAT", "T -42\n");
        assert_eq!(a, b);
        assert_eq!(a.sha256.len(), 64);
    }

    #[test]
    fn status_is_worst_non_skipped() {
        let mut session = SessionReport::new("import-dat");
        session.push(ComponentReport::skipped("rain", "RAIN.DAT not found"));
        assert_eq!(session.status(), ReportStatus::Ok);
        let mut grid = ComponentReport::new("grid");
        grid.warn("grid replaced");
        session.push(grid);
        assert_eq!(session.status(), ReportStatus::Warn);
        assert!(session.summary_line().contains("1 skipped"));
    }
}
