//! Project store to DAT and HDF5.

use std::path::Path;

use flo_core::ComponentReport;
use flo_dat::DatFile;
use flo_hdf5::H5Container;
use flo_model::{Component, ComponentData, Control};
use flo_store::ProjectStore;

use crate::error::{AppError, AppResult};
use crate::progress::Stage;
use crate::report::{FileDigest, SessionReport};
use crate::session::{ProgressCallback, SessionOptions, Tracker};

/// Components held by the store, read back with the control they are emitted under.
fn stored_components(
    store: &ProjectStore,
    options: &SessionOptions,
    session: &mut SessionReport,
) -> AppResult<(Control, Vec<ComponentData>)> {
    let control = store.read_control()?;
    if control.is_empty() {
        return Err(AppError::State(
            "the project store holds no control entries".to_string(),
        ));
    }
    let mut out = Vec::new();
    for component in store.present_components()? {
        if !options.config.selects(component) {
            session.push(ComponentReport::skipped(component.to_string(), "excluded by config"));
            continue;
        }
        match store.read_component(component)? {
            Some(data) => out.push(data),
            None => session.push(ComponentReport::skipped(component.to_string(), "no records")),
        }
    }
    Ok((control, out))
}

/// Renders the store as DAT files without touching the filesystem.
pub fn render_dat(
    store: &ProjectStore,
    options: &SessionOptions,
    progress: ProgressCallback<'_>,
) -> AppResult<(Vec<DatFile>, SessionReport)> {
    let mut tracker = Tracker::new(options, progress);
    let mut session = SessionReport::new("export-dat");
    let (control, components) = stored_components(store, options, &mut session)?;
    let spellings = store.read_spellings()?;

    let mut files = Vec::new();
    for data in components {
        tracker.check_cancel()?;
        let component = data.component();
        tracker.emit(Some(component), Stage::Emitting);
        let emitted = flo_dat::emit_component_with(&data, &control, &spellings)?;
        if emitted.is_empty() {
            session.push(ComponentReport::skipped(
                component.to_string(),
                "switched off in control",
            ));
            continue;
        }
        let mut report = ComponentReport::new(component.to_string());
        report.count("records", data.record_count());
        report.count("files", emitted.len());
        for file in &emitted {
            report.note(format!("{} ({} lines)", file.name, file.text.lines().count()));
        }
        session.push(report);
        files.extend(emitted);
    }

    session.files = files
        .iter()
        .map(|f| FileDigest::of_text(f.name.as_str(), &f.text))
        .collect();
    tracker.emit(None, Stage::Done);
    session.finish();
    Ok((files, session))
}

/// Writes the store as a DAT project directory, creating it when missing.
pub fn export_dat(
    store: &ProjectStore,
    dir: &Path,
    options: &SessionOptions,
    progress: ProgressCallback<'_>,
) -> AppResult<SessionReport> {
    let (files, session) = render_dat(store, options, progress)?;
    std::fs::create_dir_all(dir).map_err(|e| AppError::FileWrite {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for file in &files {
        let path = file.write_to(dir)?;
        tracing::debug!(path = %path.display(), "written");
    }
    tracing::info!(dir = %dir.display(), files = files.len(), "{}", session.summary_line());
    Ok(session)
}

/// Builds the HDF5 container for the store.
pub fn export_container(
    store: &ProjectStore,
    options: &SessionOptions,
    progress: ProgressCallback<'_>,
) -> AppResult<(H5Container, SessionReport)> {
    let mut tracker = Tracker::new(options, progress);
    let mut session = SessionReport::new("export-hdf5");
    let (control, components) = stored_components(store, options, &mut session)?;

    let mut container = H5Container::new();
    for data in components {
        tracker.check_cancel()?;
        let component = data.component();
        if component == Component::SwmmInp {
            session.push(ComponentReport::skipped(
                component.to_string(),
                "SWMM.INP has no HDF5 layout",
            ));
            continue;
        }
        tracker.emit(Some(component), Stage::Emitting);
        let groups = flo_hdf5::component_to_datasets(&data, &control)?;
        if groups.is_empty() {
            session.push(ComponentReport::skipped(
                component.to_string(),
                "switched off in control",
            ));
            continue;
        }
        let mut report = ComponentReport::new(component.to_string());
        report.count("records", data.record_count());
        report.count("groups", groups.len());
        container.write_groups(groups, options.config.hdf5.compression_level);
        session.push(report);
    }
    let spellings = store.read_spellings()?;
    if !spellings.is_empty() {
        container.write_groups(
            [flo_hdf5::write_spellings(&spellings)],
            options.config.hdf5.compression_level,
        );
    }

    tracker.emit(None, Stage::Done);
    session.finish();
    Ok((container, session))
}

/// Writes the store to an HDF5 file.
pub fn export_hdf5(
    store: &ProjectStore,
    path: &Path,
    options: &SessionOptions,
    progress: ProgressCallback<'_>,
) -> AppResult<SessionReport> {
    let (container, session) = export_container(store, options, progress)?;
    flo_hdf5::write_file(path, &container)?;
    tracing::info!(path = %path.display(), "{}", session.summary_line());
    Ok(session)
}
