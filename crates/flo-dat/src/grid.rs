//! TOPO.DAT paired with MANNINGS_N.DAT.

use flo_core::DEFAULT_MANNING;
use flo_model::{GridCell, GridData};

use crate::{DatResult, DatWriter, Line, Row};

/// Builds the grid from `x y elevation [fid n]` rows; fids follow row order.
pub fn parse_grid(
    rows: impl Iterator<Item = flo_core::CodecResult<Row>>,
    fallback_cell_size: Option<f64>,
) -> DatResult<GridData> {
    let mut cells = Vec::new();
    for row in rows {
        let row = row?;
        row.require(3)?;
        let fid = cells.len() as i64 + 1;
        let n_value = if row.len() >= 5 {
            row.real(4)?
        } else {
            DEFAULT_MANNING
        };
        cells.push(GridCell::new(
            fid,
            row.real(0)?,
            row.real(1)?,
            row.real(2)?,
            n_value,
        ));
    }
    Ok(GridData::from_cells(cells, fallback_cell_size)?)
}

pub fn emit_grid(grid: &GridData) -> (DatWriter, DatWriter) {
    let mut topo = DatWriter::new("TOPO.DAT");
    let mut mannings = DatWriter::new("MANNINGS_N.DAT");
    for cell in &grid.cells {
        topo.push(Line::new().real(cell.x).real(cell.y).real(cell.elevation));
        mannings.push(Line::new().int(cell.fid).real(cell.n_value));
    }
    (topo, mannings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{DoubleParser, RowStream};
    use flo_core::NumberSpellings;

    #[test]
    fn topo_and_mannings_pair_up() {
        let topo = RowStream::from_text("TOPO.DAT", "0 0 10\n100 0 11\n0 100 12\n100 100 13\n");
        let mann = RowStream::from_text("MANNINGS_N.DAT", "1 0.040\n2 0.040\n3 0.040\n4 0.040\n");
        let grid = parse_grid(DoubleParser::new(topo, mann), None).unwrap();
        assert_eq!(grid.cells.len(), 4);
        assert_eq!(grid.cell_size, 100.0);
        assert!(grid.cells.iter().all(|c| c.n_value == 0.04));
        assert!(grid.cells.iter().all(|c| c.elevation > 0.0));
        assert_eq!(grid.cells[3].fid, 4);

        let mut spellings = NumberSpellings::new();
        spellings.scan_text("MANNINGS_N.DAT", "1 0.040\n2 0.040\n3 0.040\n4 0.040\n");
        let (topo, mann) = emit_grid(&grid);
        assert_eq!(mann.text(), "1 0.04\n2 0.04\n3 0.04\n4 0.04\n");
        assert_eq!(topo.finish().text, "0 0 10\n100 0 11\n0 100 12\n100 100 13\n");
        assert_eq!(
            mann.finish_with(&spellings).text,
            "1 0.040\n2 0.040\n3 0.040\n4 0.040\n"
        );
    }

    #[test]
    fn missing_mannings_defaults_n() {
        let topo = RowStream::from_text("TOPO.DAT", "0 0 -9999\n30 0 5\n");
        let grid = parse_grid(topo, None).unwrap();
        assert_eq!(grid.cells[0].n_value, DEFAULT_MANNING);
        assert_eq!(grid.cells[0].elevation, -9999.0);
        assert_eq!(grid.cell_size, 30.0);
    }
}
