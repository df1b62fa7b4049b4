//! CHAN.DAT with its companions CHANBANK.DAT and XSEC.DAT.
//!
//! Cross sections are read first so that `N` rows without an explicit
//! section number can take the next unclaimed one in file order.

use std::collections::{BTreeSet, VecDeque};

use flo_model::{
    ChannelData, ChannelElement, ChannelSegment, ChannelShape, ChannelWse, Confluence, RectShape,
    TrapShape, VarShape, XSection,
};

use crate::{DatResult, DatWriter, Line, Row, RowStream};

pub fn parse_xsec(rows: &mut RowStream) -> DatResult<Vec<XSection>> {
    let mut out: Vec<XSection> = Vec::new();
    while let Some(row) = rows.next_row()? {
        if row.tag() == "X" {
            out.push(XSection {
                nxsecnum: row.int(1)?,
                name: row.tokens.get(2).cloned().unwrap_or_default(),
                points: Vec::new(),
            });
        } else {
            let section = out.last_mut().ok_or_else(|| row.unknown_tag())?;
            section.points.push([row.real(0)?, row.real(1)?]);
        }
    }
    Ok(out)
}

fn parse_shape(
    row: &Row,
    next_xsec: &mut impl FnMut() -> Option<i64>,
) -> DatResult<(f64, f64, Option<ChannelShape>)> {
    let code = row.tag();
    let (fcn_at, xlen_at) =
        ChannelShape::fcn_xlen_positions(code).ok_or_else(|| row.unknown_tag())?;
    row.require(ChannelShape::row_len(code).unwrap_or(0))?;
    let fcn = row.real(fcn_at)?;
    let xlen = row.real(xlen_at)?;
    let shape = match code {
        "R" => Some(ChannelShape::R(RectShape {
            bankell: row.real(2)?,
            bankelr: row.real(3)?,
            fcw: row.real(5)?,
            fcd: row.real(6)?,
        })),
        "V" => Some(ChannelShape::V(VarShape {
            fcd: row.real(3)?,
            lower: row.fixed::<6>(5)?,
            excdep: row.real(11)?,
            upper: row.fixed::<6>(12)?,
            bankell: row.real(18)?,
            bankelr: row.real(19)?,
        })),
        "T" => Some(ChannelShape::T(TrapShape {
            bankell: row.real(2)?,
            bankelr: row.real(3)?,
            fcw: row.real(5)?,
            fcd: row.real(6)?,
            zl: row.real(8)?,
            zr: row.real(9)?,
        })),
        _ => row
            .opt_int(4)?
            .or_else(next_xsec)
            .map(|nxsecnum| ChannelShape::N { nxsecnum }),
    };
    Ok((fcn, xlen, shape))
}

/// Parses CHAN.DAT, pairing each shape row with the next CHANBANK.DAT row.
///
/// Recoverable mismatches (missing or surplus bank rows, `N` rows with no
/// section left to claim) are appended to `warnings`.
pub fn parse_channels(
    chan: &mut RowStream,
    bank: Option<&mut RowStream>,
    xsections: Vec<XSection>,
    warnings: &mut Vec<String>,
) -> DatResult<ChannelData> {
    let mut banks: VecDeque<i64> = VecDeque::new();
    if let Some(bank) = bank {
        while let Some(row) = bank.next_row()? {
            banks.push_back(row.int(1)?);
        }
    }

    let mut claimed = BTreeSet::new();
    let mut order = xsections.iter().map(|x| x.nxsecnum).collect::<VecDeque<_>>();
    let mut data = ChannelData {
        segments: Vec::new(),
        xsections,
    };
    let mut pending_wse: Option<(i64, f64)> = None;

    while let Some(row) = chan.next_row()? {
        let tag = row.tag().to_string();
        match tag.as_str() {
            "R" | "V" | "T" | "N" => {
                let mut next_xsec = || {
                    while let Some(n) = order.pop_front() {
                        if !claimed.contains(&n) {
                            return Some(n);
                        }
                    }
                    None
                };
                let (fcn, xlen, shape) = parse_shape(&row, &mut next_xsec)?;
                let grid = row.int(1)?;
                let shape = match shape {
                    Some(shape) => shape,
                    None => {
                        warnings.push(format!(
                            "CHAN.DAT line {}: N element {} has no cross section left to claim",
                            row.line, grid
                        ));
                        ChannelShape::N { nxsecnum: 0 }
                    }
                };
                if let ChannelShape::N { nxsecnum } = shape {
                    claimed.insert(nxsecnum);
                }
                let rbankgrid = banks.pop_front().unwrap_or_else(|| {
                    warnings.push(format!(
                        "CHAN.DAT line {}: no CHANBANK.DAT row for element {}",
                        row.line, grid
                    ));
                    0
                });
                let segment = data.segments.last_mut().ok_or_else(|| row.unknown_tag())?;
                segment.elements.push(ChannelElement {
                    grid,
                    rbankgrid,
                    fcn,
                    xlen,
                    shape,
                });
            }
            "C" => {
                let segment = data.segments.last_mut().ok_or_else(|| row.unknown_tag())?;
                segment.confluences.push(Confluence {
                    tributary: row.int(1)?,
                    main: row.int(2)?,
                });
            }
            "E" => {
                let segment = data.segments.last_mut().ok_or_else(|| row.unknown_tag())?;
                segment.no_exchange.push(row.int(1)?);
            }
            _ if row.len() > 2 => {
                data.segments.push(ChannelSegment::new(
                    row.real(0)?,
                    row.real(1)?,
                    row.real(2)?,
                    row.opt_int(3)?,
                ));
            }
            _ => {
                let half = (row.int(0)?, row.real(1)?);
                match pending_wse.take() {
                    None => pending_wse = Some(half),
                    Some((istart, wselstart)) => {
                        let segment =
                            data.segments.last_mut().ok_or_else(|| row.unknown_tag())?;
                        segment.wse.push(ChannelWse {
                            istart,
                            wselstart,
                            iend: half.0,
                            wselend: half.1,
                        });
                    }
                }
            }
        }
    }

    if let Some((istart, _)) = pending_wse {
        warnings.push(format!(
            "CHAN.DAT: water surface pair starting at {} has no end row",
            istart
        ));
    }
    if !banks.is_empty() {
        warnings.push(format!(
            "CHANBANK.DAT has {} rows more than CHAN.DAT shape rows",
            banks.len()
        ));
    }
    Ok(data)
}

fn shape_line(e: &ChannelElement) -> Line {
    match &e.shape {
        ChannelShape::R(r) => Line::tag("R")
            .int(e.grid)
            .reals(&[r.bankell, r.bankelr, e.fcn, r.fcw, r.fcd, e.xlen]),
        ChannelShape::V(v) => Line::tag("V")
            .int(e.grid)
            .reals(&[e.fcn, v.fcd, e.xlen])
            .reals(&v.lower)
            .real(v.excdep)
            .reals(&v.upper)
            .reals(&[v.bankell, v.bankelr]),
        ChannelShape::T(t) => Line::tag("T").int(e.grid).reals(&[
            t.bankell, t.bankelr, e.fcn, t.fcw, t.fcd, e.xlen, t.zl, t.zr,
        ]),
        ChannelShape::N { nxsecnum } => Line::tag("N")
            .int(e.grid)
            .reals(&[e.fcn, e.xlen])
            .int(*nxsecnum),
    }
}

/// Renders CHAN.DAT, CHANBANK.DAT and, when sections exist, XSEC.DAT.
pub fn emit_channels(data: &ChannelData) -> Vec<DatWriter> {
    let mut chan = DatWriter::new("CHAN.DAT");
    let mut bank = DatWriter::new("CHANBANK.DAT");
    for seg in &data.segments {
        chan.push(
            Line::new()
                .reals(&[seg.depinitial, seg.froudc, seg.roughadj])
                .opt_int(seg.isedn),
        );
        for e in &seg.elements {
            chan.push(shape_line(e));
            bank.push(Line::new().int(e.grid).int(e.rbankgrid));
        }
        for c in &seg.confluences {
            chan.push(Line::tag("C").int(c.tributary).int(c.main));
        }
        for g in &seg.no_exchange {
            chan.push(Line::tag("E").int(*g));
        }
        for w in &seg.wse {
            chan.push(Line::new().int(w.istart).real(w.wselstart));
            chan.push(Line::new().int(w.iend).real(w.wselend));
        }
    }

    let mut out = vec![chan, bank];
    if !data.xsections.is_empty() {
        let mut xsec = DatWriter::new("XSEC.DAT");
        for x in &data.xsections {
            xsec.push(Line::tag("X").int(x.nxsecnum).text(&x.name));
            for p in &x.points {
                xsec.push(Line::new().reals(p));
            }
        }
        out.push(xsec);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(chan: &str, bank: &str, xsec: &str) -> (ChannelData, Vec<String>) {
        let sections = parse_xsec(&mut RowStream::from_text("XSEC.DAT", xsec)).unwrap();
        let mut warnings = Vec::new();
        let mut bank = RowStream::from_text("CHANBANK.DAT", bank);
        let data = parse_channels(
            &mut RowStream::from_text("CHAN.DAT", chan),
            Some(&mut bank),
            sections,
            &mut warnings,
        )
        .unwrap();
        (data, warnings)
    }

    #[test]
    fn natural_elements_claim_sections_in_order() {
        let (data, warnings) = parse(
            "0 0.9 1\nN 10 0.05 100\nN 11 0.05 100\n",
            "10 110\n11 111\n",
            "X 1 alpha\n0 20\n10 18\nX 2 beta\n0 21\n10 17\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        let elements = &data.segments[0].elements;
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].rbankgrid, 110);
        assert_eq!(elements[1].rbankgrid, 111);
        assert_eq!(elements[0].shape, ChannelShape::N { nxsecnum: 1 });
        assert_eq!(elements[1].shape, ChannelShape::N { nxsecnum: 2 });
        assert_eq!(data.xsections[0].name, "alpha");
        assert_eq!(data.xsections[1].points, vec![[0.0, 21.0], [10.0, 17.0]]);
    }

    #[test]
    fn canonical_channel_file_round_trips() {
        let chan = "\
0.5 0.9 1.2 2
R 5 101 100.5 0.035 20 3 150
T 6 100 99.5 0.04 15 2.5 140 1.5 2
C 6 20
E 5
5 101.2
6 100.8
";
        let bank = "5 25\n6 26\n";
        let (data, warnings) = parse(chan, bank, "");
        assert!(warnings.is_empty());
        let files: Vec<_> = emit_channels(&data).into_iter().map(|w| w.finish()).collect();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].text, chan);
        assert_eq!(files[1].text, bank);
    }

    #[test]
    fn bank_row_mismatch_is_a_warning() {
        let (data, warnings) = parse("0 0.9 1\nR 5 1 1 0.03 10 2 100\n", "", "");
        assert_eq!(data.segments[0].elements[0].rbankgrid, 0);
        assert_eq!(warnings.len(), 1);

        let (_, warnings) = parse("0 0.9 1\nR 5 1 1 0.03 10 2 100\n", "5 6\n7 8\n", "");
        assert!(warnings[0].contains("more than"));
    }
}
