//! DAT and HDF5 import into the project store.

use std::path::Path;

use flo_core::{ComponentReport, NumberSpellings};
use flo_hdf5::H5Container;
use flo_model::{Component, ComponentData, Control};
use flo_store::ProjectStore;

use crate::error::{AppError, AppResult};
use crate::progress::Stage;
use crate::report::SessionReport;
use crate::session::{ProgressCallback, SessionOptions, Tracker};

/// Imports every DAT file found in `dir`.
pub fn import_dat(
    store: &mut ProjectStore,
    dir: &Path,
    options: &SessionOptions,
) -> AppResult<SessionReport> {
    import_dat_with_progress(store, dir, options, None)
}

/// Imports a DAT project directory and streams progress events.
///
/// Control and Grid go first; CONT.DAT and TOPO.DAT are required when
/// selected. Every other component is skipped when its file is absent.
pub fn import_dat_with_progress(
    store: &mut ProjectStore,
    dir: &Path,
    options: &SessionOptions,
    progress: ProgressCallback<'_>,
) -> AppResult<SessionReport> {
    if !dir.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    let mut tracker = Tracker::new(options, progress);
    let mut session = SessionReport::new("import-dat");
    tracing::info!(dir = %dir.display(), "importing DAT project");

    for component in Component::import_order() {
        tracker.check_cancel()?;
        if !options.config.selects(component) {
            session.push(ComponentReport::skipped(component.to_string(), "excluded by config"));
            continue;
        }
        tracker.emit(Some(component), Stage::Parsing);
        let control = store.read_control()?;
        let report = match flo_dat::parse_component(dir, component, &control)? {
            Some(parsed) => write(
                store,
                options,
                &mut tracker,
                parsed.data,
                parsed.warnings,
                &parsed.spellings,
            )?,
            None => ComponentReport::skipped(
                component.to_string(),
                format!("{} not found", component.files()[0]),
            ),
        };
        session.push(report);
    }

    tracker.emit(None, Stage::Done);
    session.finish();
    tracing::info!("{}", session.summary_line());
    Ok(session)
}

/// Imports an HDF5 file from disk.
pub fn import_hdf5(
    store: &mut ProjectStore,
    path: &Path,
    options: &SessionOptions,
    progress: ProgressCallback<'_>,
) -> AppResult<SessionReport> {
    let container = flo_hdf5::read_file(path)?;
    tracing::info!(path = %path.display(), "importing HDF5 project");
    import_container(store, &container, options, progress)
}

/// Imports an in-memory HDF5 container.
pub fn import_container(
    store: &mut ProjectStore,
    container: &H5Container,
    options: &SessionOptions,
    progress: ProgressCallback<'_>,
) -> AppResult<SessionReport> {
    let mut tracker = Tracker::new(options, progress);
    let mut session = SessionReport::new("import-hdf5");

    let present = flo_hdf5::present_components(container)?;
    let spellings = flo_hdf5::read_spellings(container)?;
    for component in Component::import_order() {
        tracker.check_cancel()?;
        if !options.config.selects(component) {
            session.push(ComponentReport::skipped(component.to_string(), "excluded by config"));
            continue;
        }
        let required = matches!(component, Component::Control | Component::Grid);
        if !required && !present.contains(&component) {
            session.push(ComponentReport::skipped(component.to_string(), "no dataset"));
            continue;
        }
        tracker.emit(Some(component), Stage::Parsing);
        let control = match component {
            Component::Control => Control::new(),
            _ => store.read_control()?,
        };
        let report = match flo_hdf5::component_from_container(container, component, &control)? {
            Some(data) => write(store, options, &mut tracker, data, Vec::new(), &spellings)?,
            None => ComponentReport::skipped(component.to_string(), "no dataset"),
        };
        session.push(report);
    }

    tracker.emit(None, Stage::Done);
    session.finish();
    tracing::info!("{}", session.summary_line());
    Ok(session)
}

fn write(
    store: &mut ProjectStore,
    options: &SessionOptions,
    tracker: &mut Tracker<'_>,
    data: ComponentData,
    parse_warnings: Vec<String>,
    spellings: &NumberSpellings,
) -> AppResult<ComponentReport> {
    let component = data.component();
    if options.config.strict && !parse_warnings.is_empty() {
        return Err(AppError::Strict {
            component: component.to_string(),
            messages: parse_warnings,
        });
    }

    tracker.emit(Some(component), Stage::Clearing);
    tracker.emit(
        Some(component),
        Stage::Writing {
            rows: data.record_count(),
        },
    );
    let stored = store.write_component(
        &data,
        &options.config.write_options(options.cancel.as_ref()),
    )?;
    store.write_spellings(component, spellings)?;
    tracker.emit(Some(component), Stage::Committing);

    let mut report = ComponentReport::new(component.to_string());
    for w in parse_warnings {
        report.warn(w);
    }
    report.count("records", data.record_count());
    report.absorb(stored);

    if options.config.strict && report.has_warnings() {
        return Err(AppError::Strict {
            component: report.component,
            messages: report.messages,
        });
    }
    Ok(report)
}
