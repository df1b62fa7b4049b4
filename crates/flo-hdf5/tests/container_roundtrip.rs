use flo_hdf5::{
    DEFAULT_COMPRESSION, H5Container, H5Error, component_from_container, component_to_datasets,
    present_components,
};
use flo_model::*;

fn control() -> Control {
    Control::from_pairs([
        ("SIMUL", "24.0"),
        ("TOUT", "0.5"),
        ("ICHANNEL", "1"),
        ("IHYDRSTRUCT", "1"),
        ("IWRFS", "1"),
        ("LEVEE", "1"),
        ("SWMM", "1"),
        ("IRAIN", "0"),
        ("IEVAP", "1"),
        ("TOLGLOBAL", "0.004"),
    ])
}

fn grid() -> GridData {
    let cells = vec![
        GridCell::new(1, 0.0, 0.0, 10.0, 0.04),
        GridCell::new(2, 100.0, 0.0, 11.0, 0.05),
        GridCell::new(3, 0.0, 100.0, 12.0, 0.04),
        GridCell::new(4, 100.0, 100.0, 13.0, 0.04),
    ];
    GridData::from_cells(cells, None).unwrap()
}

fn stage(items: &[ComponentData], control: &Control) -> H5Container {
    let mut container = H5Container::new();
    for data in items {
        let groups = component_to_datasets(data, control).unwrap();
        container.write_groups(groups, DEFAULT_COMPRESSION);
    }
    container
}

fn read(container: &H5Container, component: Component, control: &Control) -> ComponentData {
    component_from_container(container, component, control)
        .unwrap()
        .unwrap_or_else(|| panic!("{component} missing"))
}

#[test]
fn control_values_survive_verbatim() {
    let control = control();
    let container = stage(&[ComponentData::Control(control.clone())], &control);
    match read(&container, Component::Control, &control) {
        ComponentData::Control(back) => {
            assert_eq!(back, control);
            assert_eq!(back.get("SIMUL"), Some("24.0"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn grid_round_trip_recomputes_neighbours() {
    let control = control();
    let g = grid();
    let container = stage(&[ComponentData::Grid(g.clone())], &control);
    let ComponentData::Grid(back) = read(&container, Component::Grid, &control) else {
        panic!("not a grid");
    };
    assert_eq!(back.cells, g.cells);
    assert_eq!(back.cell_size, 100.0);
    assert_eq!(back.neighbours.len(), 4);
    // cell 1 has cell 3 to the north and cell 2 to the east
    assert_eq!(back.neighbours[0][0], 3);
    assert_eq!(back.neighbours[0][1], 2);
    let ds = container.read("NEIGHBORS", Some("Neighbors"), None).unwrap();
    assert_eq!(ds.data.shape(), vec![4, 8]);
}

#[test]
fn missing_grid_is_an_error_but_missing_optional_component_is_none() {
    let control = control();
    let container = stage(&[ComponentData::Control(control.clone())], &control);
    let err = component_from_container(&container, Component::Grid, &control).unwrap_err();
    assert_eq!(err.kind_label(), "SchemaError");
    assert!(
        component_from_container(&container, Component::Outflow, &control)
            .unwrap()
            .is_none()
    );
}

#[test]
fn structured_components_round_trip() {
    let control = control();

    let mut outflow = OutflowData::default();
    let cell = outflow.cell_mut(4);
    cell.chan_out = 1;
    cell.qh_table = vec![[0.0, 0.0], [1.0, 25.0]];
    outflow.cell_mut(2).fp_out = 1;

    let mut seg = ChannelSegment::new(0.5, 0.8, 1.0, None);
    seg.elements.push(ChannelElement {
        grid: 1,
        rbankgrid: 2,
        fcn: 0.035,
        xlen: 100.0,
        shape: ChannelShape::R(RectShape {
            bankell: 10.0,
            bankelr: 10.5,
            fcw: 20.0,
            fcd: 3.0,
        }),
    });
    seg.elements.push(ChannelElement {
        grid: 3,
        rbankgrid: 0,
        fcn: 0.04,
        xlen: 90.0,
        shape: ChannelShape::N { nxsecnum: 1 },
    });
    seg.confluences.push(Confluence {
        tributary: 3,
        main: 1,
    });
    let channels = ChannelData {
        segments: vec![seg],
        xsections: vec![XSection {
            nxsecnum: 1,
            name: "P1".into(),
            points: vec![[0.0, 12.0], [5.0, 9.0], [10.0, 12.0]],
        }],
    };

    let mut bridge = Structure::new("BR1", 1, 2);
    bridge.icurvtable = 3;
    bridge.push_bridge_row(vec![1.0; 9]);
    bridge.push_bridge_row(vec![2.0; 15]);
    bridge.push_bridge_row(vec![3.0; 9]);
    bridge.bridge_xs.push(BridgeXsPoint {
        xup: 0.0,
        yup: 10.0,
        yb: 9.0,
    });
    let mut culvert = Structure::new("CU1", 3, 4);
    culvert.icurvtable = 2;
    culvert.culverts.push(CulvertEquation {
        typec: 1,
        typeen: 2,
        culvertn: 0.013,
        ke: 0.5,
        cubase: 1.2,
        multbarrels: 2,
    });
    let structures = StructureData {
        structures: vec![bridge, culvert],
    };

    let arf = ArfData {
        iarfblockmod: Some(1),
        totally: vec![BlockedCell {
            grid: 3,
            collapse: true,
        }],
        partially: vec![PartialBlock {
            grid: 4,
            collapse: false,
            arf: 0.5,
            wrf: [0.1, 0.2, 0.0, 0.0, 0.3, 0.0, 0.0, 0.0],
        }],
    };

    let rating = RatingTableData {
        blocks: vec![
            SdRatingBlock::Table(SdRatingTable {
                grid: 2,
                name: "I2".into(),
                rows: vec![[0.0, 0.0], [1.0, 2.5]],
            }),
            SdRatingBlock::Culvert(SdCulvert {
                grid: 3,
                name: "I3".into(),
                cdiameter: 1.5,
                typec: 1,
                typeen: 1,
                cubase: 0.0,
                multbarrels: 1,
            }),
        ],
    };

    let stack = CellArrayData {
        kind: CellArrayKind::TailingsStackDepth,
        rows: vec![
            CellValues {
                grid: 1,
                values: vec![2.0, 0.4],
            },
            CellValues {
                grid: 2,
                values: vec![1.5],
            },
        ],
    };

    let items = vec![
        ComponentData::Outflow(outflow),
        ComponentData::Channels(channels),
        ComponentData::HydraulicStructures(structures),
        ComponentData::ReductionFactors(arf),
        ComponentData::StormDrainRatingTables(rating),
        ComponentData::CellArray(stack),
    ];
    let container = stage(&items, &control);
    for original in &items {
        let back = read(&container, original.component(), &control);
        assert_eq!(&back, original, "{} differs", original.component());
    }

    let blocked = container
        .read("ARF_TOTALLY_BLOCKED", Some("Reduction Factors"), None)
        .unwrap();
    assert_eq!(
        blocked.data,
        flo_hdf5::DatasetData::Int {
            shape: vec![1],
            values: vec![-3]
        }
    );
}

#[test]
fn floodplain_sections_keep_declared_cell_count() {
    let control = control();
    let data = FpXsecData {
        nxprt: 2,
        sections: vec![
            FpXsec {
                iflo: 1,
                nnxsec: 3,
                cells: vec![1, 2, 3],
            },
            FpXsec {
                iflo: 3,
                nnxsec: 3,
                cells: vec![2, 4],
            },
        ],
    };
    let container = stage(&[ComponentData::FloodplainXsec(data.clone())], &control);
    let ComponentData::FloodplainXsec(back) = read(&container, Component::FloodplainXsec, &control)
    else {
        panic!("not floodplain sections");
    };
    assert_eq!(back, data);
    let ds = container.read("FPXSEC", Some("Floodplain"), None).unwrap();
    assert_eq!(ds.data.shape(), vec![2, 2]);
}

#[test]
fn disabled_and_empty_components_write_nothing() {
    let control = control();
    let rain = ComponentData::Rain(RainData {
        rtt: 3.0,
        ..Default::default()
    });
    assert!(component_to_datasets(&rain, &control).unwrap().is_empty());
    let empty = ComponentData::WaterSurface(WsurfData::default());
    assert!(component_to_datasets(&empty, &control).unwrap().is_empty());
}

#[test]
fn present_components_follow_import_order() {
    let control = control();
    let container = stage(
        &[
            ComponentData::Control(control.clone()),
            ComponentData::Grid(grid()),
            ComponentData::WaterSurface(WsurfData {
                cells: vec![CellValue::new(2, 11.5)],
            }),
        ],
        &control,
    );
    assert_eq!(
        present_components(&container).unwrap(),
        vec![Component::Control, Component::Grid, Component::WaterSurface]
    );
}

#[test]
fn dangling_parent_index_is_a_layout_error() {
    let control = control();
    let mut container = stage(
        &[ComponentData::Evaporation(EvapData {
            ievapmonth: 1,
            iday: 1,
            clocktime: 0.0,
            months: vec![EvapMonth {
                month: "january".into(),
                monthly_evap: 5.0,
                hourly: vec![0.1, 0.2],
            }],
        })],
        &control,
    );
    container.remove_datasets(&["EVAP_MONTHS"]);
    let err = component_from_container(&container, Component::Evaporation, &control).unwrap_err();
    assert!(matches!(err, H5Error::Layout { .. }));
}
