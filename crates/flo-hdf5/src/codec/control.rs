use flo_core::geo::neighbours;
use flo_core::{CodecError, fmt_real};
use flo_model::control::{CONT_NAMES, TOLER_NAMES};
use flo_model::{Control, GridCell, GridData};

use crate::H5Result;
use crate::container::{H5Container, H5Group};
use crate::table::{Reader, Rows, int_table, ints, nan, nan_int, opt, opt_int, text, vector};

pub const CONTROL_GROUP: &str = "Control Parameters";
pub const TOLER_GROUP: &str = "Tolerance";
pub const QGIS_GROUP: &str = "QGIS";
pub const GRID_GROUP: &str = "Grid";
pub const NEIGHBOR_GROUP: &str = "Neighbors";
pub const DOMAIN_GROUP: &str = "Multiple Domains";

pub fn has_control(container: &H5Container) -> bool {
    Reader::new(container, CONTROL_GROUP).has("CONT")
        || Reader::new(container, QGIS_GROUP).has("CONTROL_NAMES")
}

pub fn has_grid(container: &H5Container) -> bool {
    Reader::new(container, GRID_GROUP).has("GRIDCODE")
}

pub fn write_control(control: &Control) -> Vec<H5Group> {
    let ordered = |names: &[&str]| names.iter().map(|n| nan(control.real(n))).collect();

    let mut cont = H5Group::new(CONTROL_GROUP);
    cont.insert(vector("CONT", ordered(CONT_NAMES)));

    let mut toler = H5Group::new(TOLER_GROUP);
    if TOLER_NAMES.iter().any(|n| control.contains(n)) {
        toler.insert(vector("TOLER", ordered(TOLER_NAMES)));
    }

    let mut qgis = H5Group::new(QGIS_GROUP);
    let (names, values): (Vec<String>, Vec<String>) = control
        .iter()
        .map(|(name, entry)| (name.to_string(), entry.value.clone()))
        .unzip();
    qgis.insert(text("CONTROL_NAMES", names));
    qgis.insert(text("CONTROL_VALUES", values));

    vec![cont, toler, qgis]
}

/// Control mapping. The verbatim name/value pairs win over the numeric
/// CONT and TOLER vectors when both are present.
pub fn control_from_container(container: &H5Container) -> H5Result<Control> {
    let qgis = Reader::new(container, QGIS_GROUP);
    let names = qgis.text("CONTROL_NAMES")?;
    if !names.is_empty() {
        let values = qgis.text("CONTROL_VALUES")?;
        if values.len() != names.len() {
            return Err(crate::H5Error::layout(
                "CONTROL_VALUES",
                format!("{} values for {} names", values.len(), names.len()),
            ));
        }
        let mut control = Control::new();
        for (name, value) in names.iter().zip(values) {
            control.set(name, value);
        }
        return Ok(control);
    }

    let cont = Reader::new(container, CONTROL_GROUP);
    if !cont.has("CONT") {
        return Err(CodecError::missing(format!("{}/CONT", CONTROL_GROUP)).into());
    }
    let mut control = Control::new();
    let mut fill = |names: &[&str], values: Vec<f64>| {
        for (name, v) in names.iter().zip(values) {
            if let Some(v) = opt(v) {
                control.set(name, fmt_real(v));
            }
        }
    };
    fill(CONT_NAMES, cont.vector("CONT")?);
    fill(TOLER_NAMES, Reader::new(container, TOLER_GROUP).vector("TOLER")?);
    Ok(control)
}

pub fn write_grid(grid: &GridData) -> H5Result<Vec<H5Group>> {
    let mut g = H5Group::new(GRID_GROUP);
    g.insert(ints("GRIDCODE", grid.cells.iter().map(|c| c.fid).collect()));
    g.insert(vector("X", grid.cells.iter().map(|c| c.x).collect()));
    g.insert(vector("Y", grid.cells.iter().map(|c| c.y).collect()));
    g.insert(vector("ELEVATION", grid.cells.iter().map(|c| c.elevation).collect()));
    g.insert(vector("MANNING", grid.cells.iter().map(|c| c.n_value).collect()));
    g.insert(vector("CELLSIZE", vec![grid.cell_size]));

    let table: Vec<[i64; 8]> = if grid.neighbours.len() == grid.cells.len() {
        grid.neighbours.clone()
    } else {
        compute_neighbours(&grid.cells, grid.cell_size)?
    };
    let mut n = H5Group::new(NEIGHBOR_GROUP);
    n.insert(int_table(
        "NEIGHBORS",
        8,
        table.iter().flat_map(|row| row.iter().copied()).collect(),
    ));

    let mut d = H5Group::new(DOMAIN_GROUP);
    let mut rows = Rows::new("DOMAIN_CELLS", 4);
    for cell in grid.cells.iter().filter(|c| c.domain_fid.is_some()) {
        rows.push(&[
            cell.fid as f64,
            nan_int(cell.domain_fid),
            nan_int(cell.domain_cell),
            nan_int(cell.connectivity_fid),
        ]);
    }
    rows.finish_into(&mut d);

    Ok(vec![g, n, d])
}

fn compute_neighbours(cells: &[GridCell], cell_size: f64) -> H5Result<Vec<[i64; 8]>> {
    let centroids: Vec<(i64, f64, f64)> = cells.iter().map(|c| (c.fid, c.x, c.y)).collect();
    Ok(neighbours(&centroids, cell_size)?
        .into_iter()
        .map(|(_, ids)| ids)
        .collect())
}

/// Grid cells with neighbours recomputed from the centroids.
pub fn grid_from_container(container: &H5Container, control: &Control) -> H5Result<GridData> {
    let r = Reader::new(container, GRID_GROUP);
    if !r.has("GRIDCODE") {
        return Err(CodecError::missing(format!("{}/GRIDCODE", GRID_GROUP)).into());
    }
    let fids = r.ints("GRIDCODE")?;
    let columns = [
        ("X", r.vector("X")?),
        ("Y", r.vector("Y")?),
        ("ELEVATION", r.vector("ELEVATION")?),
        ("MANNING", r.vector("MANNING")?),
    ];
    for (name, column) in &columns {
        if column.len() != fids.len() {
            return Err(crate::H5Error::layout(
                name,
                format!("{} values for {} grid elements", column.len(), fids.len()),
            ));
        }
    }
    let [(_, xs), (_, ys), (_, elev), (_, n)] = columns;
    let mut cells: Vec<GridCell> = (0..fids.len())
        .map(|i| GridCell::new(fids[i], xs[i], ys[i], elev[i], n[i]))
        .collect();

    let domains = Reader::new(container, DOMAIN_GROUP).table("DOMAIN_CELLS", 4)?;
    for row in domains.rows() {
        let fid = opt_int(row[0]);
        if let Some(cell) = cells.iter_mut().find(|c| Some(c.fid) == fid) {
            cell.domain_fid = opt_int(row[1]);
            cell.domain_cell = opt_int(row[2]);
            cell.connectivity_fid = opt_int(row[3]);
        }
    }

    let fallback = r
        .vector("CELLSIZE")?
        .first()
        .copied()
        .and_then(opt)
        .or(control.real("CELLSIZE"));
    let mut grid = GridData::from_cells(cells, fallback)?;
    if let Some(stored) = fallback {
        grid.cell_size = stored;
    }
    grid.neighbours = compute_neighbours(&grid.cells, grid.cell_size)?;
    Ok(grid)
}
