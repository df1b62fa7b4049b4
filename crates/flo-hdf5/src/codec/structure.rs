use flo_model::{
    BridgeVariables, BridgeXsPoint, CulvertEquation, RatingCurve, RatingTableRow, Street,
    StreetData, StreetGlobal, StreetSegment, StreetWing, Structure, StructureData,
};

use crate::container::{H5Container, H5Group};
use crate::table::{Reader, Rows, Table, int, text, vector};
use crate::{H5Error, H5Result};

pub const STRUCT_GROUP: &str = "Hydraulic Structures";
pub const STREET_GROUP: &str = "Street";

fn curve_row(rows: &mut Rows, idx: f64, c: &RatingCurve) {
    rows.push(&[idx, c.depth, c.qcoef, c.qexp, c.acoef, c.aexp]);
}

fn curve(row: &[f64]) -> RatingCurve {
    RatingCurve {
        depth: row[1],
        qcoef: row[2],
        qexp: row[3],
        acoef: row[4],
        aexp: row[5],
    }
}

pub fn write_structures(d: &StructureData) -> H5Group {
    let mut g = H5Group::new(STRUCT_GROUP);
    let mut control = Rows::new("STR_CONTROL", 8);
    let mut curves = Rows::new("RATING_CURVE", 6);
    let mut repl = Rows::new("REPL_RATING_CURVE", 6);
    let mut table = Rows::new("RATING_TABLE", 4);
    let mut culverts = Rows::new("CULVERT_EQUATIONS", 7);
    let mut storm = Rows::new("STORM_DRAIN", 2);
    let mut bridges = Rows::new("BRIDGE_VARIABLES", 5);
    let mut bridge_xs = Rows::new("BRIDGE_XSEC", 4);

    for (i, s) in d.structures.iter().enumerate() {
        let idx = i as f64;
        control.push(&[
            s.ifporchan as f64,
            s.icurvtable as f64,
            s.inflonod as f64,
            s.outflonod as f64,
            s.inoutcont as f64,
            s.headrefel,
            s.clength,
            s.cdiameter,
        ]);
        for c in &s.rating_curves {
            curve_row(&mut curves, idx, c);
        }
        for c in &s.repl_rating_curves {
            curve_row(&mut repl, idx, c);
        }
        for t in &s.rating_table {
            table.push(&[idx, t.hdepth, t.qtable, t.atable]);
        }
        for c in &s.culverts {
            culverts.push(&[
                idx,
                c.typec as f64,
                c.typeen as f64,
                c.culvertn,
                c.ke,
                c.cubase,
                c.multbarrels as f64,
            ]);
        }
        if let Some(cap) = s.storm_drain_cap {
            storm.push(&[idx, cap]);
        }
        for (rec, b) in s.bridges.iter().enumerate() {
            let halves = std::iter::once((0.0, &b.first)).chain(b.second.iter().map(|v| (1.0, v)));
            for (half, values) in halves {
                for (pos, v) in values.iter().enumerate() {
                    bridges.push(&[idx, rec as f64, half, pos as f64, *v]);
                }
            }
        }
        for p in &s.bridge_xs {
            bridge_xs.push(&[idx, p.xup, p.yup, p.yb]);
        }
    }
    g.insert(text(
        "STR_NAME",
        d.structures.iter().map(|s| s.name.clone()).collect(),
    ));
    for rows in [control, curves, repl, table, culverts, storm, bridges, bridge_xs] {
        rows.finish_into(&mut g);
    }
    g
}

/// Rebuilds bridge records from the long `(struct, record, half, pos, value)` layout.
fn read_bridges(table: &Table, structures: &mut [Structure]) -> H5Result<()> {
    let n = structures.len();
    for row in table.rows() {
        let s = &mut structures[table.index(row[0], n)?];
        let rec = int(row[1]).max(0) as usize;
        let pos = int(row[3]).max(0) as usize;
        while s.bridges.len() <= rec {
            s.bridges.push(BridgeVariables {
                first: Vec::new(),
                second: None,
            });
        }
        let record = &mut s.bridges[rec];
        let values = if int(row[2]) == 0 {
            &mut record.first
        } else {
            record.second.get_or_insert_with(Vec::new)
        };
        if values.len() <= pos {
            values.resize(pos + 1, f64::NAN);
        }
        values[pos] = row[4];
    }
    Ok(())
}

pub fn read_structures(c: &H5Container) -> H5Result<Option<StructureData>> {
    let r = Reader::new(c, STRUCT_GROUP);
    if !r.has("STR_CONTROL") {
        return Ok(None);
    }
    let names = r.text("STR_NAME")?;
    let control = r.table("STR_CONTROL", 8)?;
    if names.len() != control.len() {
        return Err(H5Error::layout(
            "STR_NAME",
            format!("{} names for {} structures", names.len(), control.len()),
        ));
    }
    let mut structures: Vec<Structure> = names
        .into_iter()
        .zip(control.rows())
        .map(|(name, row)| Structure {
            ifporchan: int(row[0]),
            icurvtable: int(row[1]),
            inoutcont: int(row[4]),
            headrefel: row[5],
            clength: row[6],
            cdiameter: row[7],
            ..Structure::new(name, int(row[2]), int(row[3]))
        })
        .collect();
    let n = structures.len();

    let curves = r.table("RATING_CURVE", 6)?;
    for row in curves.rows() {
        structures[curves.index(row[0], n)?]
            .rating_curves
            .push(curve(row));
    }
    let repl = r.table("REPL_RATING_CURVE", 6)?;
    for row in repl.rows() {
        structures[repl.index(row[0], n)?]
            .repl_rating_curves
            .push(curve(row));
    }
    let table = r.table("RATING_TABLE", 4)?;
    for row in table.rows() {
        structures[table.index(row[0], n)?]
            .rating_table
            .push(RatingTableRow {
                hdepth: row[1],
                qtable: row[2],
                atable: row[3],
            });
    }
    let culverts = r.table("CULVERT_EQUATIONS", 7)?;
    for row in culverts.rows() {
        structures[culverts.index(row[0], n)?]
            .culverts
            .push(CulvertEquation {
                typec: int(row[1]),
                typeen: int(row[2]),
                culvertn: row[3],
                ke: row[4],
                cubase: row[5],
                multbarrels: int(row[6]),
            });
    }
    let storm = r.table("STORM_DRAIN", 2)?;
    for row in storm.rows() {
        structures[storm.index(row[0], n)?].storm_drain_cap = Some(row[1]);
    }
    read_bridges(&r.table("BRIDGE_VARIABLES", 5)?, &mut structures)?;
    let xs = r.table("BRIDGE_XSEC", 4)?;
    for row in xs.rows() {
        structures[xs.index(row[0], n)?].bridge_xs.push(BridgeXsPoint {
            xup: row[1],
            yup: row[2],
            yb: row[3],
        });
    }
    Ok(Some(StructureData { structures }))
}

pub fn write_streets(d: &StreetData) -> H5Group {
    let mut g = H5Group::new(STREET_GROUP);
    if let Some(s) = &d.global {
        g.insert(vector(
            "STREET_GLOBAL",
            vec![s.strman, s.istrflo as f64, s.strfno, s.depx, s.widst],
        ));
    }
    if !d.streets.is_empty() {
        g.insert(text(
            "STREET_NAMES",
            d.streets.iter().map(|s| s.name.clone()).collect(),
        ));
    }
    let mut segs = Rows::new("STREET_SEG", 5);
    let mut elems = Rows::new("STREET_ELEMS", 3);
    let mut seg_idx = 0_usize;
    for (i, street) in d.streets.iter().enumerate() {
        for seg in &street.segments {
            segs.push(&[i as f64, seg.grid as f64, seg.depex, seg.stman, seg.elstr]);
            for w in &seg.wings {
                elems.push(&[seg_idx as f64, w.istdir as f64, w.widr]);
            }
            seg_idx += 1;
        }
    }
    segs.finish_into(&mut g);
    elems.finish_into(&mut g);
    g
}

pub fn read_streets(c: &H5Container) -> H5Result<Option<StreetData>> {
    let r = Reader::new(c, STREET_GROUP);
    if !r.has_any(&["STREET_GLOBAL", "STREET_NAMES"]) {
        return Ok(None);
    }
    let global = r.fixed::<5>("STREET_GLOBAL")?.map(|v| StreetGlobal {
        strman: v[0],
        istrflo: int(v[1]),
        strfno: v[2],
        depx: v[3],
        widst: v[4],
    });
    let mut streets: Vec<Street> = r
        .text("STREET_NAMES")?
        .into_iter()
        .map(|name| Street {
            name,
            segments: Vec::new(),
        })
        .collect();

    let segs = r.table("STREET_SEG", 5)?;
    let mut owners = Vec::with_capacity(segs.len());
    for row in segs.rows() {
        let i = segs.index(row[0], streets.len())?;
        owners.push((i, streets[i].segments.len()));
        streets[i].segments.push(StreetSegment {
            grid: int(row[1]),
            depex: row[2],
            stman: row[3],
            elstr: row[4],
            wings: Vec::new(),
        });
    }
    let elems = r.table("STREET_ELEMS", 3)?;
    for row in elems.rows() {
        let (street, seg) = owners[elems.index(row[0], owners.len())?];
        streets[street].segments[seg].wings.push(StreetWing {
            istdir: int(row[1]),
            widr: row[2],
        });
    }
    Ok(Some(StreetData { global, streets }))
}
