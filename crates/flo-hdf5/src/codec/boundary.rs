use flo_model::{
    Inflow, InflowData, InflowKind, OutflowCell, OutflowData, QhParam, Reservoir, SeriesRow,
    TimeValue,
};

use crate::H5Result;
use crate::container::{H5Container, H5Group};
use crate::table::{Reader, Rows, int, nan, nan_int, opt, opt_int, vector};

pub const GROUP: &str = "Boundary Conditions";

pub fn write_inflow(d: &InflowData) -> H5Group {
    let mut g = H5Group::new(GROUP);
    g.insert(vector(
        "INFLOW_GLOBAL",
        vec![nan_int(d.ihourdaily), nan_int(d.ideplt)],
    ));
    let mut inflows = Rows::new("INFLOW", 3);
    let mut series = Rows::new("INFLOW_TIME_SERIES", 4);
    for (i, inflow) in d.inflows.iter().enumerate() {
        inflows.push(&[
            inflow.kind.code() as f64,
            inflow.inoutfc as f64,
            inflow.grid as f64,
        ]);
        for row in &inflow.series {
            series.push(&[i as f64, row.time, row.value, nan(row.value2)]);
        }
    }
    inflows.finish_into(&mut g);
    series.finish_into(&mut g);

    let mut res = Rows::new("RESERVOIRS", 5);
    for r in &d.reservoirs {
        res.push(&[
            r.grid as f64,
            r.wsel,
            r.n_value,
            f64::from(u8::from(r.use_n_value)),
            r.tailings,
        ]);
    }
    res.finish_into(&mut g);
    g
}

pub fn read_inflow(c: &H5Container) -> H5Result<Option<InflowData>> {
    let r = Reader::new(c, GROUP);
    if !r.has_any(&["INFLOW", "RESERVOIRS"]) {
        return Ok(None);
    }
    let global = r.fixed::<2>("INFLOW_GLOBAL")?.unwrap_or([f64::NAN; 2]);
    let mut data = InflowData {
        ihourdaily: opt_int(global[0]),
        ideplt: opt_int(global[1]),
        ..Default::default()
    };
    for row in r.table("INFLOW", 3)?.rows() {
        data.inflows.push(Inflow {
            kind: InflowKind::from_code(int(row[0])),
            inoutfc: int(row[1]),
            grid: int(row[2]),
            series: Vec::new(),
        });
    }
    let series = r.table("INFLOW_TIME_SERIES", 4)?;
    for row in series.rows() {
        let i = series.index(row[0], data.inflows.len())?;
        data.inflows[i].series.push(SeriesRow {
            time: row[1],
            value: row[2],
            value2: opt(row[3]),
        });
    }
    for row in r.table("RESERVOIRS", 5)?.rows() {
        data.reservoirs.push(Reservoir {
            grid: int(row[0]),
            wsel: row[1],
            n_value: row[2],
            use_n_value: int(row[3]) != 0,
            tailings: row[4],
        });
    }
    Ok(Some(data))
}

pub fn write_outflow(d: &OutflowData) -> H5Group {
    let mut g = H5Group::new(GROUP);
    let mut cells = Rows::new("OUTFLOW", 4);
    let mut qh_params = Rows::new("QH_PARAMS", 4);
    let mut qh_table = Rows::new("QH_TABLE", 3);
    let mut chan = Rows::new("OUTFLOW_CHAN_TIME_SERIES", 3);
    let mut fp = Rows::new("OUTFLOW_FP_TIME_SERIES", 3);
    for (i, cell) in d.cells.iter().enumerate() {
        let idx = i as f64;
        cells.push(&[
            cell.grid as f64,
            cell.chan_out as f64,
            cell.fp_out as f64,
            cell.hydro_out as f64,
        ]);
        for p in &cell.qh_params {
            qh_params.push(&[idx, p.hmax, p.coef, p.exponent]);
        }
        for [depth, q] in &cell.qh_table {
            qh_table.push(&[idx, *depth, *q]);
        }
        for tv in &cell.chan_tser {
            chan.push(&[idx, tv.time, tv.value]);
        }
        for tv in &cell.fp_tser {
            fp.push(&[idx, tv.time, tv.value]);
        }
    }
    for rows in [cells, qh_params, qh_table, chan, fp] {
        rows.finish_into(&mut g);
    }
    g
}

pub fn read_outflow(c: &H5Container) -> H5Result<Option<OutflowData>> {
    let r = Reader::new(c, GROUP);
    if !r.has("OUTFLOW") {
        return Ok(None);
    }
    let mut cells: Vec<OutflowCell> = r
        .table("OUTFLOW", 4)?
        .rows()
        .map(|row| OutflowCell {
            chan_out: int(row[1]),
            fp_out: int(row[2]),
            hydro_out: int(row[3]),
            ..OutflowCell::new(int(row[0]))
        })
        .collect();
    let n = cells.len();

    let params = r.table("QH_PARAMS", 4)?;
    for row in params.rows() {
        cells[params.index(row[0], n)?].qh_params.push(QhParam {
            hmax: row[1],
            coef: row[2],
            exponent: row[3],
        });
    }
    let table = r.table("QH_TABLE", 3)?;
    for row in table.rows() {
        cells[table.index(row[0], n)?].qh_table.push([row[1], row[2]]);
    }
    let chan = r.table("OUTFLOW_CHAN_TIME_SERIES", 3)?;
    for row in chan.rows() {
        cells[chan.index(row[0], n)?]
            .chan_tser
            .push(TimeValue::new(row[1], row[2]));
    }
    let fp = r.table("OUTFLOW_FP_TIME_SERIES", 3)?;
    for row in fp.rows() {
        cells[fp.index(row[0], n)?]
            .fp_tser
            .push(TimeValue::new(row[1], row[2]));
    }
    Ok(Some(OutflowData { cells }))
}
