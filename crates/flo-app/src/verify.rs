//! DAT round-trip verification.

use std::collections::BTreeSet;
use std::path::Path;

use flo_core::ReportStatus;
use flo_model::Component;
use flo_store::ProjectStore;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::export_service::render_dat;
use crate::import_service::import_dat;
use crate::report::{FileDigest, SessionReport};
use crate::session::SessionOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCheck {
    pub name: String,
    /// Digest of the input file; `None` when only the export produced it.
    pub input: Option<String>,
    /// Digest of the exported file; `None` when the export dropped it.
    pub output: Option<String>,
}

impl FileCheck {
    pub fn matches(&self) -> bool {
        self.input.is_some() && self.input == self.output
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub import: SessionReport,
    pub export: SessionReport,
    pub files: Vec<FileCheck>,
}

impl VerifyReport {
    pub fn all_match(&self) -> bool {
        self.files.iter().all(FileCheck::matches)
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &FileCheck> {
        self.files.iter().filter(|f| !f.matches())
    }
}

/// Imports `dir` into an in-memory store, re-exports it and compares the
/// normalised digest of every file involved.
pub fn verify_dat(dir: &Path, options: &SessionOptions) -> AppResult<VerifyReport> {
    let mut store = ProjectStore::in_memory()?;
    let import = import_dat(&mut store, dir, options)?;
    let (files, export) = render_dat(&store, options, None)?;

    let mut names: BTreeSet<String> = files.iter().map(|f| f.name.clone()).collect();
    for report in &import.components {
        if report.status == ReportStatus::Skipped {
            continue;
        }
        let Some(component) = Component::import_order()
            .into_iter()
            .find(|c| c.to_string() == report.component)
        else {
            continue;
        };
        for name in component.files() {
            if flo_dat::find_file(dir, name).is_some() {
                names.insert(name.to_string());
            }
        }
    }

    let mut checks = Vec::new();
    for name in names {
        let input = match flo_dat::find_file(dir, &name) {
            Some(path) => {
                let text = std::fs::read_to_string(&path).map_err(AppError::Io)?;
                Some(FileDigest::of_text(name.as_str(), &text).sha256)
            }
            None => None,
        };
        let output = export
            .files
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.sha256.clone());
        checks.push(FileCheck {
            name,
            input,
            output,
        });
    }

    let report = VerifyReport {
        import,
        export,
        files: checks,
    };
    for miss in report.mismatches() {
        tracing::warn!(file = %miss.name, "round trip differs");
    }
    Ok(report)
}
