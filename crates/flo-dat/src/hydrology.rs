//! RAIN.DAT, INFIL.DAT and EVAPOR.DAT.

use flo_model::{
    CellValue, EvapData, EvapMonth, GreenAmptCell, GreenAmptGlobal, HortonCell, HortonGlobal,
    InfilChannelSeg, InfilData, RainData, ScsGlobal, TimeValue,
};

use crate::{DatResult, DatWriter, Line, RowStream};

pub fn parse_rain(rows: &mut RowStream) -> DatResult<RainData> {
    let first = rows.expect_row(2)?;
    let second = rows.expect_row(3)?;
    let mut data = RainData {
        irainreal: first.int(0)?,
        irainbuilding: first.int(1)?,
        rtt: second.real(0)?,
        rainabs: second.real(1)?,
        irainarf: second.int(2)?,
        movingstorm: second.opt_int(3)?,
        ..Default::default()
    };

    let mut expect_storm = data.movingstorm == Some(1);
    while let Some(row) = rows.next_row()? {
        if row.tag() == "R" {
            data.series.push(TimeValue::new(row.real(1)?, row.real(2)?));
        } else if expect_storm {
            data.rainspeed = Some(row.real(0)?);
            data.iraindir = Some(row.int(1)?);
            expect_storm = false;
        } else if data.irainarf == 1 && row.is_numeric_at(0) {
            data.arf.push(CellValue::new(row.int(0)?, row.real(1)?));
        } else {
            return Err(row.unknown_tag().into());
        }
    }
    Ok(data)
}

pub fn emit_rain(data: &RainData) -> DatWriter {
    let mut w = DatWriter::new("RAIN.DAT");
    w.push(Line::new().int(data.irainreal).int(data.irainbuilding));
    w.push(
        Line::new()
            .real(data.rtt)
            .real(data.rainabs)
            .int(data.irainarf)
            .opt_int(data.movingstorm),
    );
    for p in &data.series {
        w.push(Line::tag("R").real(p.time).real(p.value));
    }
    if data.movingstorm == Some(1) {
        if let (Some(speed), Some(dir)) = (data.rainspeed, data.iraindir) {
            w.push(Line::new().real(speed).int(dir));
        }
    }
    if data.irainarf == 1 {
        for c in &data.arf {
            w.push(Line::new().int(c.grid).real(c.value));
        }
    }
    w
}

pub fn parse_infil(rows: &mut RowStream) -> DatResult<InfilData> {
    let head = rows.expect_row(1)?;
    let mut data = InfilData {
        method: head.int(0)?,
        ..Default::default()
    };

    if data.uses_green_ampt() {
        let a = rows.expect_row(6)?;
        let b = rows.expect_row(3)?;
        let infchan = a.int(5)?;
        let hydcxx = if infchan == 1 {
            Some(rows.expect_row(1)?.real(0)?)
        } else {
            None
        };
        data.green_ampt = Some(GreenAmptGlobal {
            abstr: a.real(0)?,
            sati: a.real(1)?,
            satf: a.real(2)?,
            poros: a.real(3)?,
            soild: a.real(4)?,
            infchan,
            hydcall: b.real(0)?,
            soilall: b.real(1)?,
            hydcadj: b.real(2)?,
            hydcxx,
        });
    }
    if data.uses_scs() {
        let row = rows.expect_row(2)?;
        data.scs = Some(ScsGlobal {
            scsnall: row.real(0)?,
            abstr1: row.real(1)?,
        });
    }
    if data.uses_horton() {
        let row = rows.expect_row(1)?;
        data.horton = Some(HortonGlobal {
            fhortonia: row.real(0)?,
            fhortoni: None,
            fhortonf: None,
            decaya: None,
        });
    }

    while let Some(row) = rows.next_row()? {
        match row.tag() {
            "I" => {
                let horton = data.horton.get_or_insert(HortonGlobal {
                    fhortonia: 0.0,
                    fhortoni: None,
                    fhortonf: None,
                    decaya: None,
                });
                horton.fhortoni = Some(row.real(1)?);
                horton.fhortonf = Some(row.real(2)?);
                horton.decaya = Some(row.real(3)?);
            }
            "R" => data.channel_segs.push(InfilChannelSeg {
                seg: row.int(1)?,
                hydcx: row.real(2)?,
                hydcxfinal: row.real(3)?,
                soildepthcx: row.real(4)?,
            }),
            "F" => data.green_ampt_cells.push(GreenAmptCell {
                grid: row.int(1)?,
                hydc: row.real(2)?,
                soils: row.real(3)?,
                dtheta: row.real(4)?,
                abstrinf: row.real(5)?,
                rtimpf: row.real(6)?,
                soil_depth: row.real(7)?,
            }),
            "S" => data
                .scs_cells
                .push(CellValue::new(row.int(1)?, row.real(2)?)),
            "C" => data
                .channel_cells
                .push(CellValue::new(row.int(1)?, row.real(2)?)),
            "H" => data.horton_cells.push(HortonCell {
                grid: row.int(1)?,
                fhorti: row.real(2)?,
                fhortf: row.real(3)?,
                deca: row.real(4)?,
            }),
            _ => return Err(row.unknown_tag().into()),
        }
    }
    Ok(data)
}

pub fn emit_infil(data: &InfilData) -> DatWriter {
    let mut w = DatWriter::new("INFIL.DAT");
    w.push(Line::new().int(data.method));
    if let Some(ga) = &data.green_ampt {
        w.push(
            Line::new()
                .reals(&[ga.abstr, ga.sati, ga.satf, ga.poros, ga.soild])
                .int(ga.infchan),
        );
        w.push(Line::new().reals(&[ga.hydcall, ga.soilall, ga.hydcadj]));
        if ga.infchan == 1 {
            w.push(Line::new().real(ga.hydcxx.unwrap_or(0.0)));
        }
    }
    if let Some(scs) = &data.scs {
        w.push(Line::new().real(scs.scsnall).real(scs.abstr1));
    }
    if let Some(h) = &data.horton {
        if data.uses_horton() {
            w.push(Line::new().real(h.fhortonia));
        }
        if let (Some(i), Some(f), Some(d)) = (h.fhortoni, h.fhortonf, h.decaya) {
            w.push(Line::tag("I").reals(&[i, f, d]));
        }
    }
    for r in &data.channel_segs {
        w.push(
            Line::tag("R")
                .int(r.seg)
                .reals(&[r.hydcx, r.hydcxfinal, r.soildepthcx]),
        );
    }
    for c in &data.green_ampt_cells {
        w.push(Line::tag("F").int(c.grid).reals(&[
            c.hydc,
            c.soils,
            c.dtheta,
            c.abstrinf,
            c.rtimpf,
            c.soil_depth,
        ]));
    }
    for c in &data.scs_cells {
        w.push(Line::tag("S").int(c.grid).real(c.value));
    }
    for c in &data.channel_cells {
        w.push(Line::tag("C").int(c.grid).real(c.value));
    }
    for c in &data.horton_cells {
        w.push(
            Line::tag("H")
                .int(c.grid)
                .reals(&[c.fhorti, c.fhortf, c.deca]),
        );
    }
    w
}

pub fn parse_evap(rows: &mut RowStream) -> DatResult<EvapData> {
    let head = rows.expect_row(3)?;
    let mut data = EvapData {
        ievapmonth: head.int(0)?,
        iday: head.int(1)?,
        clocktime: head.real(2)?,
        months: Vec::new(),
    };
    while let Some(row) = rows.next_row()? {
        if row.is_numeric_at(0) {
            let month = data.months.last_mut().ok_or_else(|| row.unknown_tag())?;
            month.hourly.extend(row.rest_reals(0)?);
        } else {
            data.months.push(EvapMonth {
                month: row.tag().to_string(),
                monthly_evap: row.real(1)?,
                hourly: Vec::new(),
            });
        }
    }
    Ok(data)
}

pub fn emit_evap(data: &EvapData) -> DatWriter {
    let mut w = DatWriter::new("EVAPOR.DAT");
    w.push(
        Line::new()
            .int(data.ievapmonth)
            .int(data.iday)
            .real(data.clocktime),
    );
    for m in &data.months {
        w.push(Line::new().text(&m.month).real(m.monthly_evap));
        for h in &m.hourly {
            w.push(Line::new().real(*h));
        }
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_with_moving_storm_and_arf() {
        let text = "0 0\n1.5 0.1 1 1\nR 0 0\nR 1 0.5\nR 2 1\n4.5 3\n1 0.9\n2 0.85\n";
        let data = parse_rain(&mut RowStream::from_text("RAIN.DAT", text)).unwrap();
        assert_eq!(data.series.len(), 3);
        assert_eq!(data.rainspeed, Some(4.5));
        assert_eq!(data.iraindir, Some(3));
        assert_eq!(data.arf.len(), 2);
        assert_eq!(emit_rain(&data).finish().text, text);
    }

    #[test]
    fn arf_rows_require_irainarf() {
        let text = "0 0\n1.5 0.1 0\nR 0 0\n1 0.9\n";
        let err = parse_rain(&mut RowStream::from_text("RAIN.DAT", text)).unwrap_err();
        assert!(err.to_string().contains("line 4"), "{err}");

        let gated = "0 0\n1.5 0.1 1\nR 0 0\n1 0.9\n";
        let mut data = parse_rain(&mut RowStream::from_text("RAIN.DAT", gated)).unwrap();
        assert_eq!(data.arf.len(), 1);
        data.irainarf = 0;
        assert_eq!(emit_rain(&data).text(), "0 0\n1.5 0.1 0\nR 0 0\n");
    }

    #[test]
    fn infil_green_ampt_with_channel_conductivity() {
        let text = "\
1
0.1 0.2 1 0.4 3 1
0.5 2.5 1
0.05
R 1 0.1 0.05 2
F 3 0.2 4.5 0.3 0.1 0 5
C 9 0.02
";
        let data = parse_infil(&mut RowStream::from_text("INFIL.DAT", text)).unwrap();
        let ga = data.green_ampt.unwrap();
        assert_eq!(ga.infchan, 1);
        assert_eq!(ga.hydcxx, Some(0.05));
        assert_eq!(data.green_ampt_cells[0].soil_depth, 5.0);
        assert_eq!(emit_infil(&data).finish().text, text);
    }

    #[test]
    fn infil_horton_keeps_both_header_names() {
        let text = "4\n2.5\nI 3 0.5 0.01\nH 4 3 0.4 0.02\n";
        let data = parse_infil(&mut RowStream::from_text("INFIL.DAT", text)).unwrap();
        let h = data.horton.unwrap();
        assert_eq!(h.fhortonia, 2.5);
        assert_eq!((h.fhortoni, h.fhortonf, h.decaya), (Some(3.0), Some(0.5), Some(0.01)));
        assert_eq!(emit_infil(&data).finish().text, text);
    }

    #[test]
    fn evaporation_months_collect_hourly_values() {
        let mut text = String::from("1 1 12\njanuary 3.5\n");
        for h in 0..24 {
            text.push_str(&format!("{}\n", h as f64 / 100.0));
        }
        let data = parse_evap(&mut RowStream::from_text("EVAPOR.DAT", &text)).unwrap();
        assert_eq!(data.months.len(), 1);
        assert_eq!(data.months[0].hourly.len(), 24);
        assert_eq!(emit_evap(&data).finish().text, text);
    }
}
