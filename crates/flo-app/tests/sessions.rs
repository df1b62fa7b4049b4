use std::path::PathBuf;

use flo_core::{CancelToken, ReportStatus};
use flo_dat::normalise_whitespace;
use flo_model::Component;
use flo_store::ProjectStore;

use flo_app::{
    AppError, CodecConfig, DumpFormat, ProgressEvent, SessionOptions, Stage, dump_component,
    export_container, export_dat, import_container, import_dat, import_dat_with_progress,
    render_dat, store_summary, verify_dat,
};

fn fixture(name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for (file, text) in files {
        std::fs::write(dir.join(file), text).unwrap();
    }
    dir
}

const PROJECT: &[(&str, &str)] = &[
    ("CONT.DAT", "24 0.5 0 0 1\n1 0 0 1 0\n1 0 0 0 0 0 0\n0 0 0\n0 0 0 0 0.9 0.2\n0 0\n1\n3 0.5\n"),
    ("TOLER.DAT", "0.004 0.25\nC 0.6 0.6\nT 0.1\n"),
    ("TOPO.DAT", "0   0   10\n100 0   11\n0   100 12\n100 100 13\n"),
    ("MANNINGS_N.DAT", "1 0.04\n2 0.04\n3 0.04\n4 0.04\n"),
    ("INFLOW.DAT", "0 0\nF 0 1\nH 0 0\nH 1 50\n"),
    ("OUTFLOW.DAT", "K 4\n"),
    ("RAIN.DAT", "0 0\n1.5 0.1 0\nR 0 0\nR 1 1\n"),
    ("CHAN.DAT", "0 0.9 1\nN 2 0.05 100 1\nN 3 0.05 100 2\n"),
    ("CHANBANK.DAT", "2 1\n3 4\n"),
    ("XSEC.DAT", "X 1 alpha\n0 20\n10 18\nX 2 beta\n0 21\n10 17\n"),
    ("ARF.DAT", "T -3\n"),
];

fn options() -> SessionOptions {
    SessionOptions::new(CodecConfig::default())
}

#[test]
fn dat_project_verifies() {
    let dir = fixture("flo_app_verify", PROJECT);
    let report = verify_dat(&dir, &options()).unwrap();
    let mismatches: Vec<_> = report.mismatches().map(|f| f.name.clone()).collect();
    assert!(report.all_match(), "differs: {mismatches:?}");
    assert_eq!(report.files.len(), PROJECT.len());
    assert_eq!(report.import.status(), ReportStatus::Ok);
}

#[test]
fn export_writes_files_with_digests() {
    let src = fixture("flo_app_export_src", PROJECT);
    let out = std::env::temp_dir().join("flo_app_export_out");
    let _ = std::fs::remove_dir_all(&out);

    let mut store = ProjectStore::in_memory().unwrap();
    import_dat(&mut store, &src, &options()).unwrap();
    let session = export_dat(&store, &out, &options(), None).unwrap();

    assert!(out.join("TOPO.DAT").is_file());
    assert!(out.join("ARF.DAT").is_file());
    let arf = std::fs::read_to_string(out.join("ARF.DAT")).unwrap();
    assert_eq!(arf.split_whitespace().collect::<Vec<_>>(), vec!["T", "-3"]);
    assert_eq!(session.files.len(), PROJECT.len());
    assert!(session.finished_at.is_some());
}

#[test]
fn dat_through_hdf5_matches_direct_export() {
    let src = fixture("flo_app_cross", PROJECT);
    let mut direct = ProjectStore::in_memory().unwrap();
    import_dat(&mut direct, &src, &options()).unwrap();
    let (_, expected) = render_dat(&direct, &options(), None).unwrap();

    let (container, _) = export_container(&direct, &options(), None).unwrap();
    let mut via_hdf5 = ProjectStore::in_memory().unwrap();
    import_container(&mut via_hdf5, &container, &options(), None).unwrap();
    let (_, actual) = render_dat(&via_hdf5, &options(), None).unwrap();

    assert_eq!(actual.files, expected.files);
}

#[test]
fn mannings_trailing_zero_verifies_text_exact() {
    let dir = fixture(
        "flo_app_verify_spelled",
        &[
            (PROJECT[0].0, PROJECT[0].1),
            ("TOPO.DAT", "0 0 10\n"),
            ("MANNINGS_N.DAT", "1 0.040\n"),
        ],
    );
    let report = verify_dat(&dir, &options()).unwrap();
    let mismatches: Vec<_> = report.mismatches().map(|f| f.name.clone()).collect();
    assert!(report.all_match(), "differs: {mismatches:?}");
}

#[test]
fn trailing_zeros_survive_dat_to_hdf5_to_dat() {
    let files: &[(&str, &str)] = &[
        (PROJECT[0].0, PROJECT[0].1),
        ("TOPO.DAT", "0 0 10.0\n100 0 11.50\n0 100 12\n100 100 13.0\n"),
        ("MANNINGS_N.DAT", "1 0.040\n2 0.040\n3 0.05\n4 0.040\n"),
        ("INFLOW.DAT", "0 0\nF 0 1\nH 0 0.0\nH 1 50.50\nR 3 500.0 2.5\n"),
    ];
    let src = fixture("flo_app_cross_spelled", files);
    let mut direct = ProjectStore::in_memory().unwrap();
    import_dat(&mut direct, &src, &options()).unwrap();
    let (container, _) = export_container(&direct, &options(), None).unwrap();

    let mut via_hdf5 = ProjectStore::in_memory().unwrap();
    import_container(&mut via_hdf5, &container, &options(), None).unwrap();
    let (rendered, _) = render_dat(&via_hdf5, &options(), None).unwrap();

    for (name, input) in &files[1..] {
        let out = rendered
            .iter()
            .find(|f| f.name == *name)
            .unwrap_or_else(|| panic!("{name} was not rendered"));
        assert_eq!(normalise_whitespace(&out.text), normalise_whitespace(input), "{name}");
    }
}

#[test]
fn missing_bank_row_warns_once() {
    let mut files = PROJECT[..4].to_vec();
    files.extend([
        PROJECT[7],
        ("CHANBANK.DAT", "2 1\n"),
        PROJECT[9],
    ]);
    let dir = fixture("flo_app_short_bank", &files);
    let mut store = ProjectStore::in_memory().unwrap();
    let session = import_dat(&mut store, &dir, &options()).unwrap();
    let channels = session.component("Channels").unwrap();
    assert_eq!(channels.status, ReportStatus::Warn);
    assert_eq!(channels.messages.len(), 1, "{:?}", channels.messages);
    assert!(channels.messages[0].contains("CHANBANK.DAT"));
}

#[test]
fn missing_topo_is_a_schema_error() {
    let dir = fixture("flo_app_no_topo", &PROJECT[..2]);
    let mut store = ProjectStore::in_memory().unwrap();
    let err = import_dat(&mut store, &dir, &options()).unwrap_err();
    assert_eq!(err.kind_label(), "SchemaError");
    assert!(err.to_string().contains("TOPO.DAT"));
}

#[test]
fn missing_optional_file_is_reported_as_skipped() {
    let dir = fixture("flo_app_skipped", &PROJECT[..4]);
    let mut store = ProjectStore::in_memory().unwrap();
    let session = import_dat(&mut store, &dir, &options()).unwrap();
    let rain = session.component("Rain").unwrap();
    assert_eq!(rain.status, ReportStatus::Skipped);
    assert!(rain.messages[0].contains("RAIN.DAT"));
}

#[test]
fn progress_runs_from_parsing_to_done() {
    let dir = fixture("flo_app_progress", &PROJECT[..4]);
    let mut store = ProjectStore::in_memory().unwrap();
    let mut events: Vec<ProgressEvent> = Vec::new();
    let mut record = |e: ProgressEvent| events.push(e);
    import_dat_with_progress(&mut store, &dir, &options(), Some(&mut record)).unwrap();

    assert_eq!(events.first().map(|e| e.stage.clone()), Some(Stage::Parsing));
    assert_eq!(events.last().map(|e| e.stage.clone()), Some(Stage::Done));
    assert!(events.iter().any(|e| {
        e.component == Some(Component::Grid) && e.stage == Stage::Writing { rows: 4 }
    }));
}

#[test]
fn cancelled_session_writes_nothing() {
    let dir = fixture("flo_app_cancel", PROJECT);
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut store = ProjectStore::in_memory().unwrap();
    let err = import_dat(&mut store, &dir, &options().with_cancel(cancel)).unwrap_err();
    assert!(matches!(err, AppError::Cancelled));
    assert!(store_summary(&store, false).unwrap().is_empty());
}

#[test]
fn export_without_control_is_a_state_error() {
    let store = ProjectStore::in_memory().unwrap();
    let err = render_dat(&store, &options(), None).unwrap_err();
    assert_eq!(err.kind_label(), "StateError");
}

#[test]
fn strict_mode_fails_on_warnings() {
    let mut files = PROJECT[..4].to_vec();
    files.push(("MULT.DAT", "0.1 1 1 1 0.04 0 0 0\n2 1 1 1 0.04\n"));
    files.push(("SIMPLE_MULT.DAT", "0.04\n2\n3\n"));
    let dir = fixture("flo_app_strict", &files);

    let mut lenient = ProjectStore::in_memory().unwrap();
    let session = import_dat(&mut lenient, &dir, &options()).unwrap();
    assert_eq!(session.status(), ReportStatus::Warn);

    let strict = SessionOptions::new(CodecConfig {
        strict: true,
        ..Default::default()
    });
    let mut store = ProjectStore::in_memory().unwrap();
    let err = import_dat(&mut store, &dir, &strict).unwrap_err();
    assert!(matches!(err, AppError::Strict { .. }), "{err}");
}

#[test]
fn excluded_components_are_not_imported() {
    let dir = fixture("flo_app_exclude", PROJECT);
    let config = CodecConfig {
        exclude: vec!["arf".to_string(), "channels".to_string()],
        ..Default::default()
    };
    let mut store = ProjectStore::in_memory().unwrap();
    import_dat(&mut store, &dir, &SessionOptions::new(config)).unwrap();
    let tables: Vec<String> = store_summary(&store, false)
        .unwrap()
        .into_iter()
        .map(|t| t.table)
        .collect();
    assert!(tables.contains(&"grid".to_string()));
    assert!(!tables.contains(&"blocked_cells_tot".to_string()));
    assert!(!tables.contains(&"chan".to_string()));
}

#[test]
fn components_dump_as_json_and_yaml() {
    let dir = fixture("flo_app_dump", &PROJECT[..4]);
    let mut store = ProjectStore::in_memory().unwrap();
    import_dat(&mut store, &dir, &options()).unwrap();

    let json = dump_component(&store, Component::Grid, DumpFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["component"], "Grid");
    assert_eq!(value["data"]["cells"].as_array().unwrap().len(), 4);

    let yaml = dump_component(&store, Component::Grid, DumpFormat::Yaml).unwrap();
    assert!(yaml.contains("cell_size: 100"));

    let err = dump_component(&store, Component::Rain, DumpFormat::Json).unwrap_err();
    assert!(matches!(err, AppError::ComponentNotFound(_)));
}
