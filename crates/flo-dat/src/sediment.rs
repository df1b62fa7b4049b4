//! SED.DAT: mudflow and sediment transport.

use flo_model::{
    Control, MudArea, MudGlobal, SedData, SedGlobal, SedGroup, SedGroupCell, SedSupply,
};

use crate::{DatResult, DatWriter, Line, RowStream};

pub fn parse_sed(rows: &mut RowStream) -> DatResult<SedData> {
    let mut data = SedData::default();
    while let Some(row) = rows.next_row()? {
        match row.tag() {
            "M" => {
                let v = row.fixed::<6>(1)?;
                data.mud = Some(MudGlobal {
                    va: v[0],
                    vb: v[1],
                    ysa: v[2],
                    ysb: v[3],
                    sgsm: v[4],
                    xkx: v[5],
                });
            }
            "C" => {
                data.sed = Some(SedGlobal {
                    isedeqg: row.int(1)?,
                    isedsizefrac: row.int(2)?,
                    dfifty: row.real(3)?,
                    sgrad: row.real(4)?,
                    sgst: row.real(5)?,
                    dryspwt: row.real(6)?,
                    cvfg: row.real(7)?,
                    isedsupply: row.int(8)?,
                    isedisplay: row.int(9)?,
                    scourdep: row.real(10)?,
                });
            }
            "Z" => data.groups.push(SedGroup {
                isedeqi: row.int(1)?,
                bedthick: row.real(2)?,
                cvfi: row.real(3)?,
                fractions: Vec::new(),
            }),
            "P" => {
                let group = data.groups.last_mut().ok_or_else(|| row.unknown_tag())?;
                group.fractions.push([row.real(1)?, row.real(2)?]);
            }
            "D" => data.mud_areas.push(MudArea {
                grid: row.int(1)?,
                debrisv: None,
            }),
            "E" => {
                let area = data.mud_areas.last_mut().ok_or_else(|| row.unknown_tag())?;
                area.debrisv = Some(row.real(1)?);
            }
            "R" => data.rigid_cells.push(row.int(1)?),
            "S" => data.supply.push(SedSupply {
                grid: row.int(1)?,
                isedcfp: row.int(2)?,
                ased: row.real(3)?,
                bsed: row.real(4)?,
                fractions: Vec::new(),
            }),
            "N" => {
                let supply = data.supply.last_mut().ok_or_else(|| row.unknown_tag())?;
                supply.fractions.push([row.real(1)?, row.real(2)?]);
            }
            "G" => data.group_cells.push(SedGroupCell {
                grid: row.int(1)?,
                group: row.int(2)?,
            }),
            _ => return Err(row.unknown_tag().into()),
        }
    }
    Ok(data)
}

/// Mudflow rows follow `MUD`; sediment rows follow `ISED`.
pub fn emit_sed(data: &SedData, control: &Control) -> DatWriter {
    let mud = control.switch("MUD");
    let sed = control.switch("ISED");
    let mut w = DatWriter::new("SED.DAT");

    if mud {
        if let Some(m) = &data.mud {
            w.push(Line::tag("M").reals(&[m.va, m.vb, m.ysa, m.ysb, m.sgsm, m.xkx]));
        }
    }
    if sed {
        if let Some(c) = &data.sed {
            w.push(
                Line::tag("C")
                    .int(c.isedeqg)
                    .int(c.isedsizefrac)
                    .reals(&[c.dfifty, c.sgrad, c.sgst, c.dryspwt, c.cvfg])
                    .int(c.isedsupply)
                    .int(c.isedisplay)
                    .real(c.scourdep),
            );
        }
        for g in &data.groups {
            w.push(Line::tag("Z").int(g.isedeqi).real(g.bedthick).real(g.cvfi));
            for p in &g.fractions {
                w.push(Line::tag("P").reals(p));
            }
        }
    }
    if mud {
        for a in &data.mud_areas {
            w.push(Line::tag("D").int(a.grid));
            if let Some(v) = a.debrisv {
                w.push(Line::tag("E").real(v));
            }
        }
    }
    if sed {
        for r in &data.rigid_cells {
            w.push(Line::tag("R").int(*r));
        }
        for s in &data.supply {
            w.push(
                Line::tag("S")
                    .int(s.grid)
                    .int(s.isedcfp)
                    .real(s.ased)
                    .real(s.bsed),
            );
            for n in &s.fractions {
                w.push(Line::tag("N").reals(n));
            }
        }
        for g in &data.group_cells {
            w.push(Line::tag("G").int(g.grid).int(g.group));
        }
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    const SED: &str = "\
M 0.0538 6.0896 0.00136 21.1 2.65 4285
C 1 1 0.25 2.5 2.65 92 0.03 0 0 1.5
Z 2 1 0.02
P 0.074 0.2
P 1 1
D 301
E 0.5
R 44
S 12 1 0.5 1.2
N 0.5 1
G 13 1
";

    #[test]
    fn full_sed_file_round_trips_when_both_switches_are_on() {
        let data = parse_sed(&mut RowStream::from_text("SED.DAT", SED)).unwrap();
        assert_eq!(data.groups[0].fractions.len(), 2);
        assert_eq!(data.mud_areas[0].debrisv, Some(0.5));
        let control = Control::from_pairs([("MUD", "1"), ("ISED", "1")]);
        assert_eq!(emit_sed(&data, &control).text(), SED);
    }

    #[test]
    fn mud_switch_alone_keeps_only_mudflow_rows() {
        let data = parse_sed(&mut RowStream::from_text("SED.DAT", SED)).unwrap();
        let control = Control::from_pairs([("MUD", "1"), ("ISED", "0")]);
        let out = emit_sed(&data, &control);
        assert_eq!(out.text(), "M 0.0538 6.0896 0.00136 21.1 2.65 4285\nD 301\nE 0.5\n");
    }

    #[test]
    fn fraction_without_group_is_rejected() {
        assert!(parse_sed(&mut RowStream::from_text("SED.DAT", "P 1 1\n")).is_err());
    }
}
