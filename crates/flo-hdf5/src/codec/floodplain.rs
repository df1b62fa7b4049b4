use flo_model::{
    CellArrayData, CellArrayKind, CellValue, CellValues, FpXsec, FpXsecData, GutterCell, GutterData,
    GutterGlobal, WstimeCell, WstimeData, WsurfData,
};

use crate::H5Result;
use crate::container::{H5Container, H5Group};
use crate::table::{Reader, Rows, int, vector};

pub const FP_GROUP: &str = "Floodplain";
pub const GUTTER_GROUP: &str = "Gutter";

pub fn write_fpxsec(d: &FpXsecData) -> H5Group {
    let mut g = H5Group::new(FP_GROUP);
    g.insert(vector("FPXSEC_GLOBAL", vec![d.nxprt as f64]));
    let mut heads = Rows::new("FPXSEC", 2);
    for s in &d.sections {
        heads.push(&[s.iflo as f64, s.nnxsec as f64]);
    }
    heads.finish_into(&mut g);
    let mut cells = Rows::new("FPXSEC_CELLS", 2);
    for (i, s) in d.sections.iter().enumerate() {
        for grid in &s.cells {
            cells.push(&[i as f64, *grid as f64]);
        }
    }
    cells.finish_into(&mut g);
    g
}

pub fn read_fpxsec(c: &H5Container) -> H5Result<Option<FpXsecData>> {
    let r = Reader::new(c, FP_GROUP);
    let Some([nxprt]) = r.fixed::<1>("FPXSEC_GLOBAL")? else {
        return Ok(None);
    };
    let mut sections: Vec<FpXsec> = r
        .table("FPXSEC", 1)?
        .rows()
        .map(|row| FpXsec {
            iflo: int(row[0]),
            nnxsec: row.get(1).copied().map_or(-1, int),
            cells: Vec::new(),
        })
        .collect();
    let cells = r.table("FPXSEC_CELLS", 2)?;
    for row in cells.rows() {
        let i = cells.index(row[0], sections.len())?;
        sections[i].cells.push(int(row[1]));
    }
    for s in sections.iter_mut().filter(|s| s.nnxsec < 0) {
        s.nnxsec = s.cells.len() as i64;
    }
    Ok(Some(FpXsecData {
        nxprt: int(nxprt),
        sections,
    }))
}

pub fn write_wsurf(d: &WsurfData) -> H5Group {
    let mut g = H5Group::new(FP_GROUP);
    let mut rows = Rows::new("WSURF", 2);
    for c in &d.cells {
        rows.push(&[c.grid as f64, c.value]);
    }
    rows.finish_into(&mut g);
    g
}

pub fn read_wsurf(c: &H5Container) -> H5Result<Option<WsurfData>> {
    let r = Reader::new(c, FP_GROUP);
    if !r.has("WSURF") {
        return Ok(None);
    }
    let cells = r
        .table("WSURF", 2)?
        .rows()
        .map(|row| CellValue::new(int(row[0]), row[1]))
        .collect();
    Ok(Some(WsurfData { cells }))
}

pub fn write_wstime(d: &WstimeData) -> H5Group {
    let mut g = H5Group::new(FP_GROUP);
    let mut rows = Rows::new("WSTIME", 3);
    for c in &d.cells {
        rows.push(&[c.grid as f64, c.wselev, c.time]);
    }
    rows.finish_into(&mut g);
    g
}

pub fn read_wstime(c: &H5Container) -> H5Result<Option<WstimeData>> {
    let r = Reader::new(c, FP_GROUP);
    if !r.has("WSTIME") {
        return Ok(None);
    }
    let cells = r
        .table("WSTIME", 3)?
        .rows()
        .map(|row| WstimeCell {
            grid: int(row[0]),
            wselev: row[1],
            time: row[2],
        })
        .collect();
    Ok(Some(WstimeData { cells }))
}

pub fn write_cell_array(d: &CellArrayData) -> H5Group {
    let spec = d.kind.spec();
    let width = 1 + d
        .rows
        .iter()
        .map(|r| r.values.len())
        .max()
        .unwrap_or(spec.columns.len());
    let mut g = H5Group::new(spec.h5_group);
    let mut rows = Rows::new(spec.h5_dataset, width);
    for cell in &d.rows {
        let mut row = vec![cell.grid as f64];
        row.extend_from_slice(&cell.values);
        rows.push(&row);
    }
    rows.finish_into(&mut g);
    g
}

pub fn read_cell_array(c: &H5Container, kind: CellArrayKind) -> H5Result<Option<CellArrayData>> {
    let spec = kind.spec();
    let r = Reader::new(c, spec.h5_group);
    if !r.has(spec.h5_dataset) {
        return Ok(None);
    }
    let rows = r
        .table(spec.h5_dataset, 1)?
        .rows()
        .map(|row| {
            let end = row
                .iter()
                .rposition(|v| !v.is_nan())
                .map_or(1, |i| i + 1)
                .max(1);
            CellValues {
                grid: int(row[0]),
                values: row[1..end].to_vec(),
            }
        })
        .collect();
    Ok(Some(CellArrayData { kind, rows }))
}

pub fn write_gutter(d: &GutterData) -> H5Group {
    let mut g = H5Group::new(GUTTER_GROUP);
    if let Some(gl) = &d.global {
        g.insert(vector("GUTTER_GLOBAL", vec![gl.width, gl.height, gl.n_value]));
    }
    let mut rows = Rows::new("GUTTER_CELLS", 5);
    for c in &d.cells {
        rows.push(&[
            c.grid as f64,
            c.width,
            c.height,
            c.n_value,
            c.direction as f64,
        ]);
    }
    rows.finish_into(&mut g);
    g
}

pub fn read_gutter(c: &H5Container) -> H5Result<Option<GutterData>> {
    let r = Reader::new(c, GUTTER_GROUP);
    if !r.has_any(&["GUTTER_GLOBAL", "GUTTER_CELLS"]) {
        return Ok(None);
    }
    let global = r.fixed::<3>("GUTTER_GLOBAL")?.map(|v| GutterGlobal {
        width: v[0],
        height: v[1],
        n_value: v[2],
    });
    let cells = r
        .table("GUTTER_CELLS", 5)?
        .rows()
        .map(|row| GutterCell {
            grid: int(row[0]),
            width: row[1],
            height: row[2],
            n_value: row[3],
            direction: int(row[4]),
        })
        .collect();
    Ok(Some(GutterData { global, cells }))
}
