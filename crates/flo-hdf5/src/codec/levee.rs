use flo_model::levee::BREACH_FIELDS;
use flo_model::{
    BreachData, BreachFragility, BreachLocal, CellFragility, Fragility, LeveeCell, LeveeData,
    LeveeDirection, LeveeFailureCell, LeveeWall,
};

use crate::container::{H5Container, H5Group};
use crate::table::{Reader, Rows, int, ints, text, vector};
use crate::{H5Error, H5Result};

pub const LEVEE_GROUP: &str = "Levee";
pub const BREACH_GROUP: &str = "Breach";

pub fn write_levee(d: &LeveeData) -> H5Group {
    let mut g = H5Group::new(LEVEE_GROUP);
    g.insert(vector("LEVEE_GLOBAL", vec![d.raiselev, d.ilevfail as f64]));

    if !d.cells.is_empty() {
        g.insert(ints("LEVEE_CELLS", d.cells.iter().map(|c| c.grid).collect()));
    }
    let mut data = Rows::new("LEVEE_DATA", 3);
    for (i, cell) in d.cells.iter().enumerate() {
        for dir in &cell.directions {
            data.push(&[i as f64, dir.dir as f64, dir.crest]);
        }
    }
    data.finish_into(&mut g);

    if !d.failures.is_empty() {
        g.insert(ints(
            "LEVEE_FAILURE_CELLS",
            d.failures.iter().map(|c| c.grid).collect(),
        ));
    }
    let mut walls = Rows::new("LEVEE_FAILURE", 8);
    for (i, f) in d.failures.iter().enumerate() {
        for w in &f.walls {
            walls.push(&[
                i as f64,
                w.dir as f64,
                w.failevel,
                w.failtime,
                w.levbase,
                w.failwidthmax,
                w.failrate,
                w.failwidrate,
            ]);
        }
    }
    walls.finish_into(&mut g);

    if let Some(f) = &d.global_fragility {
        g.insert(text("LEVEE_FRAGILITY_GLOBAL", vec![f.fragchar.clone()]));
        g.insert(vector("LEVEE_FRAGILITY_GLOBAL_PROB", vec![f.prob]));
    }
    if !d.fragility.is_empty() {
        g.insert(text(
            "LEVEE_FRAGILITY_CHAR",
            d.fragility.iter().map(|f| f.fragchar.clone()).collect(),
        ));
        let mut rows = Rows::new("LEVEE_FRAGILITY", 2);
        for f in &d.fragility {
            rows.push(&[f.grid as f64, f.prob]);
        }
        rows.finish_into(&mut g);
    }
    g
}

pub fn read_levee(c: &H5Container) -> H5Result<Option<LeveeData>> {
    let r = Reader::new(c, LEVEE_GROUP);
    let Some(global) = r.fixed::<2>("LEVEE_GLOBAL")? else {
        return Ok(None);
    };
    let mut cells: Vec<LeveeCell> = r
        .ints("LEVEE_CELLS")?
        .into_iter()
        .map(|grid| LeveeCell {
            grid,
            directions: Vec::new(),
        })
        .collect();
    let data = r.table("LEVEE_DATA", 3)?;
    for row in data.rows() {
        let i = data.index(row[0], cells.len())?;
        cells[i].directions.push(LeveeDirection {
            dir: int(row[1]),
            crest: row[2],
        });
    }

    let mut failures: Vec<LeveeFailureCell> = r
        .ints("LEVEE_FAILURE_CELLS")?
        .into_iter()
        .map(|grid| LeveeFailureCell {
            grid,
            walls: Vec::new(),
        })
        .collect();
    let walls = r.table("LEVEE_FAILURE", 8)?;
    for row in walls.rows() {
        let i = walls.index(row[0], failures.len())?;
        failures[i].walls.push(LeveeWall {
            dir: int(row[1]),
            failevel: row[2],
            failtime: row[3],
            levbase: row[4],
            failwidthmax: row[5],
            failrate: row[6],
            failwidrate: row[7],
        });
    }

    let global_fragility = match r.text("LEVEE_FRAGILITY_GLOBAL")?.into_iter().next() {
        Some(fragchar) => Some(Fragility {
            fragchar,
            prob: r
                .vector("LEVEE_FRAGILITY_GLOBAL_PROB")?
                .first()
                .copied()
                .unwrap_or(0.0),
        }),
        None => None,
    };
    let chars = r.text("LEVEE_FRAGILITY_CHAR")?;
    let probs = r.table("LEVEE_FRAGILITY", 2)?;
    if chars.len() != probs.len() {
        return Err(H5Error::layout(
            "LEVEE_FRAGILITY_CHAR",
            format!("{} ids for {} rows", chars.len(), probs.len()),
        ));
    }
    let fragility = chars
        .into_iter()
        .zip(probs.rows())
        .map(|(fragchar, row)| CellFragility {
            grid: int(row[0]),
            fragchar,
            prob: row[1],
        })
        .collect();

    Ok(Some(LeveeData {
        raiselev: global[0],
        ilevfail: int(global[1]),
        cells,
        failures,
        global_fragility,
        fragility,
    }))
}

/// Breach parameters without the NaN padding added on write.
fn trimmed(values: &[f64]) -> Vec<f64> {
    let end = values
        .iter()
        .rposition(|v| !v.is_nan())
        .map_or(0, |i| i + 1);
    values[..end].to_vec()
}

pub fn write_breach(d: &BreachData) -> H5Group {
    let width = BREACH_FIELDS.len();
    let mut g = H5Group::new(BREACH_GROUP);
    if let Some(global) = &d.global {
        let mut values = global.clone();
        values.resize(width.max(values.len()), f64::NAN);
        g.insert(vector("BREACH_GLOBAL", values));
    }
    let mut locals = Rows::new("BREACH_INDIVIDUAL", width + 1);
    for l in &d.locals {
        let mut row = vec![l.grid as f64];
        row.extend_from_slice(&l.params);
        locals.push(&row);
    }
    locals.finish_into(&mut g);
    if !d.fragility.is_empty() {
        g.insert(text(
            "BREACH_FRAGILITY_CHAR",
            d.fragility.iter().map(|f| f.fragchar.clone()).collect(),
        ));
        let mut rows = Rows::new("BREACH_FRAGILITY", 2);
        for f in &d.fragility {
            rows.push(&[f.prfail, f.prdepth]);
        }
        rows.finish_into(&mut g);
    }
    g
}

pub fn read_breach(c: &H5Container) -> H5Result<Option<BreachData>> {
    let r = Reader::new(c, BREACH_GROUP);
    if !r.has_any(&["BREACH_GLOBAL", "BREACH_INDIVIDUAL", "BREACH_FRAGILITY_CHAR"]) {
        return Ok(None);
    }
    let global = if r.has("BREACH_GLOBAL") {
        Some(trimmed(&r.vector("BREACH_GLOBAL")?))
    } else {
        None
    };
    let locals = r
        .table("BREACH_INDIVIDUAL", 2)?
        .rows()
        .map(|row| BreachLocal {
            grid: int(row[0]),
            params: trimmed(&row[1..]),
        })
        .collect();
    let chars = r.text("BREACH_FRAGILITY_CHAR")?;
    let rows = r.table("BREACH_FRAGILITY", 2)?;
    if chars.len() != rows.len() {
        return Err(H5Error::layout(
            "BREACH_FRAGILITY_CHAR",
            format!("{} ids for {} rows", chars.len(), rows.len()),
        ));
    }
    let fragility = chars
        .into_iter()
        .zip(rows.rows())
        .map(|(fragchar, row)| BreachFragility {
            fragchar,
            prfail: row[0],
            prdepth: row[1],
        })
        .collect();
    Ok(Some(BreachData {
        global,
        locals,
        fragility,
    }))
}
