//! ARF.DAT, MULT.DAT and SIMPLE_MULT.DAT.

use flo_model::{
    ArfData, BlockedCell, Control, MultCell, MultData, MultGlobal, PartialBlock, SimpleMult,
    decode_arf_grid, encode_arf_grid,
};

use crate::{DatResult, DatWriter, Line, RowStream};

/// Negative grid ids mark cells that collapse; the sign is kept as a flag.
pub fn parse_arf(rows: &mut RowStream) -> DatResult<ArfData> {
    let mut data = ArfData::default();
    while let Some(row) = rows.next_row()? {
        match row.tag() {
            "S" => data.iarfblockmod = Some(row.int(1)?),
            "T" => {
                let (grid, collapse) = decode_arf_grid(row.int(1)?);
                data.totally.push(BlockedCell { grid, collapse });
            }
            _ => {
                let (grid, collapse) = decode_arf_grid(row.int(0)?);
                data.partially.push(PartialBlock {
                    grid,
                    collapse,
                    arf: row.real(1)?,
                    wrf: row.fixed::<8>(2)?,
                });
            }
        }
    }
    Ok(data)
}

pub fn emit_arf(data: &ArfData, control: &Control) -> DatWriter {
    let mut w = DatWriter::new("ARF.DAT");
    if let Some(mode) = control.int("IARFBLOCKMOD").or(data.iarfblockmod) {
        w.push(Line::tag("S").int(mode));
    }
    for t in &data.totally {
        w.push(Line::tag("T").int(encode_arf_grid(t.grid, t.collapse)));
    }
    for p in &data.partially {
        w.push(
            Line::new()
                .int(encode_arf_grid(p.grid, p.collapse))
                .real(p.arf)
                .reals(&p.wrf),
        );
    }
    w
}

pub fn parse_mult(rows: &mut RowStream) -> DatResult<MultData> {
    let mut data = MultData::default();
    if let Some(head) = rows.next_row()? {
        let mut v = [0.0; 8];
        for (i, slot) in v.iter_mut().enumerate() {
            *slot = head.opt_real(i)?.unwrap_or(0.0);
        }
        data.global = Some(MultGlobal {
            wmc: v[0],
            wdrall: v[1],
            dmall: v[2],
            nodchnsall: v[3],
            xnmultall: v[4],
            sslopemin: v[5],
            sslopemax: v[6],
            avuld50: v[7],
        });
    }
    while let Some(row) = rows.next_row()? {
        data.cells.push(MultCell {
            grid: row.int(0)?,
            wdr: row.real(1)?,
            dm: row.real(2)?,
            nodchns: row.real(3)?,
            xnmult: row.real(4)?,
        });
    }
    Ok(data)
}

pub fn parse_simple_mult(rows: &mut RowStream) -> DatResult<Option<SimpleMult>> {
    let Some(head) = rows.next_row()? else {
        return Ok(None);
    };
    let mut simple = SimpleMult {
        simple_n: head.real(0)?,
        cells: Vec::new(),
    };
    while let Some(row) = rows.next_row()? {
        simple.cells.push(row.int(0)?);
    }
    Ok(Some(simple))
}

/// MULT.DAT and, when simplified cells exist, SIMPLE_MULT.DAT. Simplified
/// cells that are also full multi-channel cells are left out.
pub fn emit_mult(data: &MultData) -> Vec<DatWriter> {
    let mut out = Vec::new();
    if data.global.is_some() || !data.cells.is_empty() {
        let mut w = DatWriter::new("MULT.DAT");
        if let Some(g) = &data.global {
            w.push(Line::new().reals(&[
                g.wmc,
                g.wdrall,
                g.dmall,
                g.nodchnsall,
                g.xnmultall,
                g.sslopemin,
                g.sslopemax,
                g.avuld50,
            ]));
        }
        for c in &data.cells {
            w.push(
                Line::new()
                    .int(c.grid)
                    .reals(&[c.wdr, c.dm, c.nodchns, c.xnmult]),
            );
        }
        out.push(w);
    }

    if let Some(simple) = &data.simple {
        let (kept, dropped) = data.simple_cells_without_repeats();
        if !dropped.is_empty() {
            tracing::warn!(
                cells = ?dropped,
                "simple multiple-channel cells repeated in MULT.DAT were not exported"
            );
        }
        let mut w = DatWriter::new("SIMPLE_MULT.DAT");
        w.push(Line::new().real(simple.simple_n));
        for grid in kept {
            w.push(Line::new().int(grid));
        }
        out.push(w);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsing_cell_keeps_its_negative_id() {
        let data = parse_arf(&mut RowStream::from_text("ARF.DAT", "T -42\n")).unwrap();
        assert_eq!(
            data.totally,
            vec![BlockedCell {
                grid: 42,
                collapse: true
            }]
        );
        assert_eq!(emit_arf(&data, &Control::new()).text(), "T -42\n");
    }

    #[test]
    fn partial_blocks_and_mode_round_trip() {
        let text = "S 1\nT 7\n-9 0.5 0 0 1 0.5 0 0 0 0\n10 0.2 0.1 0.1 0 0 0 0 0 0\n";
        let data = parse_arf(&mut RowStream::from_text("ARF.DAT", text)).unwrap();
        assert_eq!(data.iarfblockmod, Some(1));
        assert!(data.partially[0].collapse);
        assert_eq!(data.partially[0].wrf[2], 1.0);
        assert_eq!(emit_arf(&data, &Control::new()).text(), text);
    }

    #[test]
    fn short_mult_header_pads_with_zero() {
        let mut rows = RowStream::from_text("MULT.DAT", "1 2 3\n5 1 1 2 0.05\n");
        let data = parse_mult(&mut rows).unwrap();
        let g = data.global.unwrap();
        assert_eq!((g.wmc, g.dmall, g.avuld50), (1.0, 3.0, 0.0));
        assert_eq!(data.cells[0].nodchns, 2.0);
    }

    #[test]
    fn simple_mult_skips_cells_already_in_mult() {
        let mut rows = RowStream::from_text("MULT.DAT", "0 0 0 0 0 0 0 0\n5 1 1 2 0.05\n");
        let mut data = parse_mult(&mut rows).unwrap();
        let mut simple = RowStream::from_text("SIMPLE_MULT.DAT", "0.1\n4\n5\n6\n");
        data.simple = parse_simple_mult(&mut simple).unwrap();
        let files = emit_mult(&data);
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].text(), "0.1\n4\n6\n");
    }
}
