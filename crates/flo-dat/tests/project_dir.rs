use std::collections::BTreeMap;
use std::path::PathBuf;

use flo_dat::{
    emit_component, emit_component_with, normalise_whitespace, parse_component,
    present_components,
};
use flo_model::{ChannelShape, Component, ComponentData};

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

#[test]
fn project_directory_round_trips_modulo_whitespace() {
    let src = fixture("flo_dat_round_trip", PROJECT);
    let control = match parse_component(&src, Component::Control, &Default::default())
        .unwrap()
        .unwrap()
        .data
    {
        ComponentData::Control(c) => c,
        other => panic!("unexpected {other:?}"),
    };

    let mut emitted = BTreeMap::new();
    for component in present_components(&src) {
        let parsed = parse_component(&src, component, &control).unwrap().unwrap();
        assert!(parsed.warnings.is_empty(), "{component}: {:?}", parsed.warnings);
        for file in emit_component(&parsed.data, &control).unwrap() {
            emitted.insert(file.name.clone(), file.text);
        }
    }

    for (name, input) in PROJECT {
        let out = emitted
            .get(*name)
            .unwrap_or_else(|| panic!("{name} was not emitted"));
        assert_eq!(normalise_whitespace(out), normalise_whitespace(input), "{name}");
    }
}

const SPELLED: &[(&str, &str)] = &[
    ("CONT.DAT", "24 0.5 0 0 1\n1 0 0 1 0\n1 0 0 0 0 0 0\n0 0 0\n0 0 0 0 0.9 0.2\n0 0\n1\n3 0.5\n"),
    ("TOPO.DAT", "0 0 10.0\n100 0 11.50\n0 100 12\n100 100 13.0\n"),
    ("MANNINGS_N.DAT", "1 0.040\n2 0.040\n3 0.05\n4 0.040\n"),
    ("INFLOW.DAT", "0 0\nF 0 1\nH 0 0.0\nH 1 50.50\nR 3 500.0 2.5\n"),
];

#[test]
fn trailing_zeros_survive_a_directory_round_trip() {
    let src = fixture("flo_dat_spelled", SPELLED);
    let control = match parse_component(&src, Component::Control, &Default::default())
        .unwrap()
        .unwrap()
        .data
    {
        ComponentData::Control(c) => c,
        other => panic!("unexpected {other:?}"),
    };

    let mut emitted = BTreeMap::new();
    let mut shortest = BTreeMap::new();
    for component in [Component::Grid, Component::Inflow] {
        let parsed = parse_component(&src, component, &control).unwrap().unwrap();
        assert!(!parsed.spellings.is_empty(), "{component}");
        for file in emit_component_with(&parsed.data, &control, &parsed.spellings).unwrap() {
            emitted.insert(file.name.clone(), file.text);
        }
        for file in emit_component(&parsed.data, &control).unwrap() {
            shortest.insert(file.name.clone(), file.text);
        }
    }

    for (name, input) in &SPELLED[1..] {
        let out = emitted
            .get(*name)
            .unwrap_or_else(|| panic!("{name} was not emitted"));
        assert_eq!(normalise_whitespace(out), normalise_whitespace(input), "{name}");
    }
    assert!(shortest["MANNINGS_N.DAT"].starts_with("1 0.04\n"));
    assert!(shortest["INFLOW.DAT"].contains("R 3 500 2.5"));
}

#[test]
fn channel_elements_pair_with_banks_and_sections() {
    let src = fixture(
        "flo_dat_channel_pairing",
        &[
            ("CHAN.DAT", "0 0.9 1\nN 10 0.05 100\nN 11 0.05 100\n"),
            ("CHANBANK.DAT", "10 110\n11 111\n"),
            ("XSEC.DAT", "X 1 alpha\n0 20\n10 18\nX 2 beta\n0 21\n10 17\n"),
        ],
    );
    let parsed = parse_component(&src, Component::Channels, &Default::default())
        .unwrap()
        .unwrap();
    let ComponentData::Channels(data) = parsed.data else {
        panic!("expected channels");
    };
    let elements = &data.segments[0].elements;
    assert_eq!(elements.len(), 2);
    for (e, (bank, sec)) in elements.iter().zip([(110, 1), (111, 2)]) {
        assert_eq!(e.rbankgrid, bank);
        assert_eq!(e.shape, ChannelShape::N { nxsecnum: sec });
    }
    let names: Vec<_> = data.xsections.iter().map(|x| x.name.as_str()).collect();
    assert_eq!(names, ["alpha", "beta"]);
    assert!(data.xsections.iter().all(|x| x.points.len() == 2));
}

#[test]
fn missing_topo_is_an_error_and_missing_optional_file_is_not() {
    let src = fixture("flo_dat_missing", &[]);
    let err = parse_component(&src, Component::Grid, &Default::default()).unwrap_err();
    assert!(err.to_string().contains("TOPO.DAT"));
    assert!(
        parse_component(&src, Component::Rain, &Default::default())
            .unwrap()
            .is_none()
    );
}

#[test]
fn grid_without_mannings_uses_default_n() {
    let src = fixture("flo_dat_topo_only", &[("topo.dat", "0 0 10\n50 0 11\n")]);
    let parsed = parse_component(&src, Component::Grid, &Default::default())
        .unwrap()
        .unwrap();
    let ComponentData::Grid(grid) = parsed.data else {
        panic!("expected grid");
    };
    assert_eq!(grid.cell_size, 50.0);
    assert!(grid.cells.iter().all(|c| c.n_value == 0.04));
}
