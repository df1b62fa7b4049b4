use std::path::PathBuf;

use flo_core::{CancelToken, CodecError, SchemaErrorKind};
use flo_dat::parse_component;
use flo_model::{
    ArfData, BlockedCell, ChannelShape, Component, ComponentData, Control, PartialBlock,
};
use flo_store::{ProjectStore, StoreError, WriteOptions};
use proptest::prelude::*;

fn fixture(name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for (file, text) in files {
        std::fs::write(dir.join(file), text).unwrap();
    }
    dir
}

/// `n` x `n` cells, 100 units apart, fids in row-major order.
fn topo(n: usize) -> String {
    let mut out = String::new();
    for j in 0..n {
        for i in 0..n {
            out.push_str(&format!("{} {} {}\n", i * 100, j * 100, 10 + i + j));
        }
    }
    out
}

fn parse(dir: &PathBuf, component: Component) -> ComponentData {
    parse_component(dir, component, &Control::new())
        .unwrap()
        .unwrap()
        .data
}

fn store_with_grid(name: &str, n: usize) -> ProjectStore {
    let dir = fixture(name, &[("TOPO.DAT", &topo(n))]);
    let mut store = ProjectStore::in_memory().unwrap();
    store
        .write_component(&parse(&dir, Component::Grid), &WriteOptions::default())
        .unwrap();
    store
}

#[test]
fn topo_and_mannings_fill_grid_and_control() {
    let dir = fixture(
        "flo_store_s1",
        &[
            ("TOPO.DAT", "0 0 10\n100 0 11\n0 100 12\n100 100 13\n"),
            ("MANNINGS_N.DAT", "1 0.040\n2 0.040\n3 0.040\n4 0.040\n"),
        ],
    );
    let mut store = ProjectStore::in_memory().unwrap();
    let report = store
        .write_component(&parse(&dir, Component::Grid), &WriteOptions::default())
        .unwrap();
    assert_eq!(report.get_count("cells"), 4);
    assert_eq!(store.grid_count().unwrap(), 4);

    let control = store.read_control().unwrap();
    assert_eq!(control.real("CELLSIZE"), Some(100.0));
    assert!(control.contains("MANNING"));

    let Some(ComponentData::Grid(grid)) = store.read_component(Component::Grid).unwrap() else {
        panic!("grid missing");
    };
    assert_eq!(grid.cell_size, 100.0);
    assert!(grid.cells.iter().all(|c| c.n_value == 0.04 && c.elevation > 0.0));
    assert_eq!(grid.neighbours.len(), 4);
}

#[test]
fn inflow_rows_are_named_and_triggers_restored() {
    let mut store = store_with_grid("flo_store_inflow_grid", 3);
    let dir = fixture(
        "flo_store_inflow",
        &[("INFLOW.DAT", "0 0\nF 0 2\nH 0 0\nH 1 50\nC 0 5\nH 0 1\n")],
    );
    store
        .write_component(&parse(&dir, Component::Inflow), &WriteOptions::default())
        .unwrap();

    let names: Vec<String> = store
        .connection()
        .prepare("SELECT name FROM inflow ORDER BY fid")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(names, vec!["Inflow 1".to_string(), "Inflow 2".to_string()]);
    assert!(store.triggers_enabled().unwrap());
}

#[test]
fn reservoir_extras_are_disambiguated() {
    let mut store = store_with_grid("flo_store_res_grid", 11);
    let dir = fixture(
        "flo_store_reservoirs",
        &[("INFLOW.DAT", "R 100 500.0 2.5\nR 101 500.0 0.03\n")],
    );
    store
        .write_component(&parse(&dir, Component::Inflow), &WriteOptions::default())
        .unwrap();
    let Some(ComponentData::Inflow(data)) = store.read_component(Component::Inflow).unwrap()
    else {
        panic!("inflow missing");
    };
    let tailings = &data.reservoirs[0];
    assert_eq!((tailings.wsel, tailings.tailings), (500.0, 2.5));
    assert_eq!(tailings.n_value, 0.25);
    assert!(!tailings.use_n_value);
    let with_n = &data.reservoirs[1];
    assert_eq!((with_n.n_value, with_n.tailings), (0.03, -1.0));
    assert!(with_n.use_n_value);
}

#[test]
fn single_channel_outlet_is_type_two() {
    let mut store = store_with_grid("flo_store_outflow_grid", 5);
    let dir = fixture("flo_store_outflow", &[("OUTFLOW.DAT", "K 17\n")]);
    store
        .write_component(&parse(&dir, Component::Outflow), &WriteOptions::default())
        .unwrap();
    let kind: i64 = store
        .connection()
        .query_row("SELECT type FROM outflow WHERE grid_fid = 17", [], |row| row.get(0))
        .unwrap();
    assert_eq!(kind, 2);
    let Some(ComponentData::Outflow(data)) = store.read_component(Component::Outflow).unwrap()
    else {
        panic!("outflow missing");
    };
    assert_eq!(data.cells[0].chan_out, 1);
}

#[test]
fn negative_arf_id_keeps_collapse_bit() {
    let mut store = store_with_grid("flo_store_arf_grid", 7);
    let dir = fixture("flo_store_arf", &[("ARF.DAT", "T -42\n")]);
    store
        .write_component(&parse(&dir, Component::ReductionFactors), &WriteOptions::default())
        .unwrap();
    let Some(ComponentData::ReductionFactors(arf)) =
        store.read_component(Component::ReductionFactors).unwrap()
    else {
        panic!("arf missing");
    };
    assert_eq!(arf.totally, vec![BlockedCell { grid: 42, collapse: true }]);
}

#[test]
fn channel_elements_keep_banks_and_sections() {
    let mut store = store_with_grid("flo_store_chan_grid", 4);
    let dir = fixture(
        "flo_store_chan",
        &[
            ("CHAN.DAT", "0 0.9 1\nN 10 0.05 100\nN 11 0.05 100\n"),
            ("CHANBANK.DAT", "10 14\n11 15\n"),
            ("XSEC.DAT", "X 1 alpha\n0 20\n10 18\nX 2 beta\n0 21\n10 17\n"),
        ],
    );
    let report = store
        .write_component(&parse(&dir, Component::Channels), &WriteOptions::default())
        .unwrap();
    assert_eq!(report.get_count("elements"), 2);

    let Some(ComponentData::Channels(data)) = store.read_component(Component::Channels).unwrap()
    else {
        panic!("channels missing");
    };
    let elements = &data.segments[0].elements;
    assert_eq!(
        elements.iter().map(|e| (e.grid, e.rbankgrid)).collect::<Vec<_>>(),
        vec![(10, 14), (11, 15)]
    );
    assert_eq!(elements[0].shape, ChannelShape::N { nxsecnum: 1 });
    assert_eq!(elements[1].shape, ChannelShape::N { nxsecnum: 2 });
    let names: Vec<&str> = data.xsections.iter().map(|x| x.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert!(data.xsections.iter().all(|x| x.points.len() == 2));

    let wkt: String = store
        .connection()
        .query_row("SELECT geom FROM chan WHERE fid = 1", [], |row| row.get(0))
        .unwrap();
    assert!(wkt.starts_with("LINESTRING"));
    let line = flo_core::geo::line_from_wkt(&wkt).unwrap();
    assert!(line.0.len() >= 2);
}

#[test]
fn structures_outside_grid_are_reported_not_stored() {
    let mut store = store_with_grid("flo_store_struct_grid", 3);
    let dir = fixture(
        "flo_store_struct",
        &[(
            "HYSTRUC.DAT",
            "S inside 0 1 1 2 0 0 0 0\nT 0 0 0\nS outside 0 1 1 99 0 0 0 0\nT 0 0 0\n",
        )],
    );
    let report = store
        .write_component(&parse(&dir, Component::HydraulicStructures), &WriteOptions::default())
        .unwrap();
    assert_eq!(report.get_count("rejected"), 1);
    assert_eq!(report.get_count("structures"), 1);
    assert!(report.has_warnings());

    let Some(ComponentData::HydraulicStructures(data)) =
        store.read_component(Component::HydraulicStructures).unwrap()
    else {
        panic!("structures missing");
    };
    assert_eq!(data.structures.len(), 1);
    assert_eq!(data.structures[0].name, "inside");
}

#[test]
fn unbound_rating_table_is_a_schema_error() {
    let mut store = store_with_grid("flo_store_rt_grid", 3);
    let dir = fixture(
        "flo_store_rt",
        &[
            ("SWMMFLO.DAT", "D 2 I1 1 10 0.5 0 0.5 0 0\n"),
            ("SWMMFLORT.DAT", "D 5 NOT_AN_INLET\nN 0 0\nN 1 2\n"),
        ],
    );
    store
        .write_component(&parse(&dir, Component::StormDrainInlets), &WriteOptions::default())
        .unwrap();
    let err = store
        .write_component(
            &parse(&dir, Component::StormDrainRatingTables),
            &WriteOptions::default(),
        )
        .unwrap_err();
    match err {
        StoreError::Codec(CodecError::Schema {
            kind: SchemaErrorKind::InvalidReference { what },
            ..
        }) => assert!(what.contains("NOT_AN_INLET")),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(store.table_count("swmmflort").unwrap(), 0);
}

#[test]
fn cancelled_write_leaves_store_unchanged() {
    let mut store = store_with_grid("flo_store_cancel_grid", 4);
    let first = ComponentData::ReductionFactors(ArfData {
        totally: vec![BlockedCell { grid: 3, collapse: false }],
        ..Default::default()
    });
    store.write_component(&first, &WriteOptions::default()).unwrap();

    let second = ComponentData::ReductionFactors(ArfData {
        partially: (1..=16)
            .map(|grid| PartialBlock {
                grid,
                collapse: false,
                arf: 0.5,
                wrf: [0.0; 8],
            })
            .collect(),
        ..Default::default()
    });
    let cancel = CancelToken::new();
    cancel.cancel();
    let options = WriteOptions::default()
        .with_chunk_size(Some(4))
        .with_cancel(cancel);
    let err = store.write_component(&second, &options).unwrap_err();
    assert!(matches!(err, StoreError::Cancelled));

    assert_eq!(
        store.read_component(Component::ReductionFactors).unwrap(),
        Some(first)
    );
    assert!(store.triggers_enabled().unwrap());
}

#[test]
fn grid_reimport_clears_dependent_tables() {
    let mut store = store_with_grid("flo_store_regrid", 4);
    let dir = fixture("flo_store_regrid_arf", &[("ARF.DAT", "T 3\n")]);
    store
        .write_component(&parse(&dir, Component::ReductionFactors), &WriteOptions::default())
        .unwrap();
    assert_eq!(store.table_count("blocked_cells_tot").unwrap(), 1);

    let grid = fixture("flo_store_regrid_topo", &[("TOPO.DAT", &topo(3))]);
    let report = store
        .write_component(&parse(&grid, Component::Grid), &WriteOptions::default())
        .unwrap();
    assert!(report.has_warnings());
    assert_eq!(store.table_count("blocked_cells_tot").unwrap(), 0);
    assert_eq!(store.grid_count().unwrap(), 9);
}

#[test]
fn control_import_keeps_component_owned_names() {
    let mut store = store_with_grid("flo_store_cont_grid", 2);
    let dir = fixture(
        "flo_store_cont",
        &[(
            "CONT.DAT",
            "24 0.5 0 0 1\n1 0 0 1 0\n1 0 0 0 0 0 0\n0 0 0\n0 0 0 0 0.9 0.2\n0 0\n1\n3 0.5\n",
        )],
    );
    store
        .write_component(&parse(&dir, Component::Control), &WriteOptions::default())
        .unwrap();
    let control = store.read_control().unwrap();
    assert_eq!(control.real("CELLSIZE"), Some(100.0));
    assert_eq!(control.get("SIMUL"), Some("24"));
    assert_eq!(
        store.present_components().unwrap()[..2],
        [Component::Control, Component::Grid]
    );
}

#[test]
fn summary_lists_every_table() {
    let store = store_with_grid("flo_store_summary", 2);
    let summary = store.summary().unwrap();
    assert!(summary.contains(&("grid", 4)));
    assert!(summary.contains(&("inflow", 0)));
    assert!(store.table_count("no_such_table").is_err());
}

#[test]
fn floodplain_sections_keep_declared_cell_count() {
    let mut store = store_with_grid("flo_store_fpxsec_grid", 5);
    let dir = fixture("flo_store_fpxsec", &[("FPXSEC.DAT", "P 2\nX 1 3 10 11 12\nX 3 3 20 21\n")]);
    store
        .write_component(&parse(&dir, Component::FloodplainXsec), &WriteOptions::default())
        .unwrap();
    let Some(ComponentData::FloodplainXsec(data)) =
        store.read_component(Component::FloodplainXsec).unwrap()
    else {
        panic!("floodplain sections missing");
    };
    let counts: Vec<(i64, usize)> = data
        .sections
        .iter()
        .map(|s| (s.nnxsec, s.cells.len()))
        .collect();
    assert_eq!(counts, vec![(3, 3), (3, 2)]);
}

fn arf_strategy() -> impl Strategy<Value = ArfData> {
    prop::collection::btree_map(1i64..=25, (any::<bool>(), 0.0f64..0.99), 0..25).prop_map(|cells| {
        ArfData {
            iarfblockmod: None,
            totally: Vec::new(),
            partially: cells
                .into_iter()
                .map(|(grid, (collapse, arf))| PartialBlock {
                    grid,
                    collapse,
                    arf,
                    wrf: [arf / 2.0; 8],
                })
                .collect(),
        }
    })
}

/// TOPO.DAT and MANNINGS_N.DAT for an `n` x `n` grid.
fn grid_files() -> impl Strategy<Value = (String, String)> {
    (2usize..5)
        .prop_flat_map(|n| {
            prop::collection::vec((0u32..500, 0usize..3), n * n).prop_map(move |v| (n, v))
        })
        .prop_map(|(n, cells)| {
            let mut topo = String::new();
            let mut mannings = String::new();
            for (k, (elev, rough)) in cells.iter().enumerate() {
                let (i, j) = (k % n, k / n);
                topo.push_str(&format!("{} {} {}\n", i * 100, j * 100, *elev as f64 / 10.0));
                mannings.push_str(&format!("{} {}\n", k + 1, [0.03, 0.04, 0.05][*rough]));
            }
            (topo, mannings)
        })
}

/// CHAN.DAT, CHANBANK.DAT and XSEC.DAT for one natural segment along the
/// first row of a 5 x 5 grid.
fn channel_files() -> impl Strategy<Value = (String, String, String)> {
    prop::collection::vec((2usize..5, 1u32..9), 1..5).prop_map(|elements| {
        let mut chan = String::from("0 0.9 1\n");
        let mut bank = String::new();
        let mut xsec = String::new();
        for (k, (points, fcn)) in elements.iter().enumerate() {
            let grid = k + 1;
            chan.push_str(&format!("N {} 0.0{} 100\n", grid, fcn));
            bank.push_str(&format!("{} {}\n", grid, grid + 5));
            xsec.push_str(&format!("X {} sec{}\n", k + 1, k + 1));
            for p in 0..*points {
                xsec.push_str(&format!("{} {}\n", p * 10, 20 + p + k));
            }
        }
        (chan, bank, xsec)
    })
}

fn inflow_file() -> impl Strategy<Value = String> {
    prop::collection::vec((any::<bool>(), 1usize..4, 0u32..500), 1..5).prop_map(|rows| {
        let mut text = String::from("0 0\n");
        for (k, (channel, steps, q)) in rows.iter().enumerate() {
            let tag = if *channel { "C" } else { "F" };
            text.push_str(&format!("{} 0 {}\n", tag, 1 + k * 2));
            for t in 0..*steps {
                text.push_str(&format!("H {} {}\n", t, q + t as u32));
            }
        }
        text
    })
}

fn outflow_file() -> impl Strategy<Value = String> {
    prop::collection::vec(0u8..4, 1..6).prop_map(|kinds| {
        let mut text = String::new();
        for (k, kind) in kinds.iter().enumerate() {
            let grid = 10 + k;
            match kind {
                0 => text.push_str(&format!("K {}\n", grid)),
                1 => text.push_str(&format!("O {}\n", grid)),
                2 => text.push_str(&format!("N {} 2\n", grid)),
                _ => text.push_str(&format!("N {} 1\nS 0 50\nS 1 51\n", grid)),
            }
        }
        text
    })
}

/// Writes `data` once per chunk size and reads it back each time. With
/// `grid` set, each store first receives an `n` x `n` grid.
fn stored_per_chunk(
    name: &str,
    data: &ComponentData,
    grid: Option<usize>,
) -> Vec<Option<ComponentData>> {
    let component = data.component();
    let mut stored = Vec::new();
    for chunk in [Some(1), Some(3), Some(100), None] {
        let mut store = match grid {
            Some(n) => store_with_grid(name, n),
            None => ProjectStore::in_memory().unwrap(),
        };
        store
            .write_component(data, &WriteOptions::default().with_chunk_size(chunk))
            .unwrap();
        stored.push(store.read_component(component).unwrap());
    }
    stored
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn chunk_size_does_not_change_contents(arf in arf_strategy()) {
        let data = ComponentData::ReductionFactors(arf);
        let stored = stored_per_chunk("flo_store_chunks", &data, Some(5));
        prop_assert!(stored[0].is_some());
        prop_assert!(stored.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn chunk_size_does_not_change_grid((topo, mannings) in grid_files()) {
        let dir = fixture(
            "flo_store_chunks_grid",
            &[("TOPO.DAT", &topo), ("MANNINGS_N.DAT", &mannings)],
        );
        let data = parse(&dir, Component::Grid);
        let stored = stored_per_chunk("flo_store_chunks_grid_base", &data, None);
        prop_assert!(stored[0].is_some());
        prop_assert!(stored.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn chunk_size_does_not_change_channels((chan, bank, xsec) in channel_files()) {
        let dir = fixture(
            "flo_store_chunks_chan",
            &[("CHAN.DAT", &chan), ("CHANBANK.DAT", &bank), ("XSEC.DAT", &xsec)],
        );
        let data = parse(&dir, Component::Channels);
        let stored = stored_per_chunk("flo_store_chunks_chan_grid", &data, Some(5));
        let Some(ComponentData::Channels(first)) = &stored[0] else {
            panic!("channels missing");
        };
        prop_assert_eq!(first.xsections.len(), first.segments[0].elements.len());
        prop_assert!(stored.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn chunk_size_does_not_change_boundaries(inflow in inflow_file(), outflow in outflow_file()) {
        let dir = fixture(
            "flo_store_chunks_bc",
            &[("INFLOW.DAT", &inflow), ("OUTFLOW.DAT", &outflow)],
        );
        for component in [Component::Inflow, Component::Outflow] {
            let data = parse(&dir, component);
            let stored = stored_per_chunk("flo_store_chunks_bc_grid", &data, Some(5));
            prop_assert!(stored[0].is_some());
            prop_assert!(stored.windows(2).all(|w| w[0] == w[1]));
        }
    }
}
