//! Structured per-component outcome.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReportStatus {
    Ok,
    Warn,
    Fail,
    Skipped,
}

impl ReportStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Ok => "ok",
            ReportStatus::Warn => "warn",
            ReportStatus::Fail => "fail",
            ReportStatus::Skipped => "skipped",
        }
    }
}

/// Outcome of one import or export step.
///
/// Warnings never abort the step; they downgrade `Ok` to `Warn` and are
/// also logged through `tracing`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentReport {
    pub component: String,
    pub status: ReportStatus,
    pub messages: Vec<String>,
    pub counts: BTreeMap<String, usize>,
}

impl ComponentReport {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: ReportStatus::Ok,
            messages: Vec::new(),
            counts: BTreeMap::new(),
        }
    }

    pub fn skipped(component: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut report = Self::new(component);
        report.status = ReportStatus::Skipped;
        report.messages.push(reason.into());
        report
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(component = %self.component, "{}", message);
        if self.status == ReportStatus::Ok {
            self.status = ReportStatus::Warn;
        }
        self.messages.push(message);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(component = %self.component, "{}", message);
        self.status = ReportStatus::Fail;
        self.messages.push(message);
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Adds `n` to the named counter.
    pub fn count(&mut self, key: &str, n: usize) {
        *self.counts.entry(key.to_string()).or_insert(0) += n;
    }

    pub fn get_count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Folds warnings and counts of `other` into this report.
    pub fn absorb(&mut self, other: ComponentReport) {
        for (k, v) in other.counts {
            *self.counts.entry(k).or_insert(0) += v;
        }
        match other.status {
            ReportStatus::Fail => self.status = ReportStatus::Fail,
            ReportStatus::Warn if self.status == ReportStatus::Ok => {
                self.status = ReportStatus::Warn
            }
            _ => {}
        }
        self.messages.extend(other.messages);
    }

    pub fn has_warnings(&self) -> bool {
        matches!(self.status, ReportStatus::Warn | ReportStatus::Fail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_downgrades_ok_but_not_fail() {
        let mut report = ComponentReport::new("Channels");
        report.warn("missing right bank row");
        assert_eq!(report.status, ReportStatus::Warn);
        report.fail("bad");
        report.warn("again");
        assert_eq!(report.status, ReportStatus::Fail);
        assert_eq!(report.messages.len(), 3);
    }

    #[test]
    fn counts_accumulate() {
        let mut report = ComponentReport::new("Grid");
        report.count("cells", 3);
        report.count("cells", 1);
        assert_eq!(report.get_count("cells"), 4);
        assert_eq!(report.get_count("missing"), 0);
    }
}
