use flo_model::{
    CellValue, EvapData, EvapMonth, GreenAmptCell, GreenAmptGlobal, HortonCell, HortonGlobal,
    InfilChannelSeg, InfilData, RainData, ScsGlobal, TimeValue,
};
use rusqlite::{Connection, OptionalExtension, params};

use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{int, query, real};

pub(super) fn write_rain(batch: &mut Batch<'_>, data: &RainData) -> StoreResult<()> {
    let series_fid = if data.series.is_empty() {
        None
    } else {
        let fid = batch.insert("INSERT INTO rain_time_series (name) VALUES ('Rainfall')", [])?;
        for row in &data.series {
            batch.insert(
                "INSERT INTO rain_time_series_data (series_fid, time, value) VALUES (?1, ?2, ?3)",
                params![fid, row.time, row.value],
            )?;
        }
        Some(fid)
    };
    batch.insert(
        "INSERT INTO rain (irainreal, irainbuilding, time_series_fid, tot_rainfall, rainabs,
                           irainarf, movingstorm, rainspeed, iraindir)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            data.irainreal,
            data.irainbuilding,
            series_fid,
            data.rtt,
            data.rainabs,
            data.irainarf,
            data.movingstorm,
            data.rainspeed,
            data.iraindir,
        ],
    )?;
    for cell in &data.arf {
        batch.insert(
            "INSERT INTO rain_arf_cells (grid_fid, arf) VALUES (?1, ?2)",
            params![cell.grid, cell.value],
        )?;
    }
    Ok(())
}

pub(super) fn read_rain(conn: &Connection) -> StoreResult<Option<RainData>> {
    let head = conn
        .query_row(
            "SELECT irainreal, irainbuilding, time_series_fid, tot_rainfall, rainabs, irainarf,
                    movingstorm, rainspeed, iraindir
             FROM rain ORDER BY fid LIMIT 1",
            [],
            |row| {
                Ok((
                    RainData {
                        irainreal: int(row, 0)?,
                        irainbuilding: int(row, 1)?,
                        rtt: real(row, 3)?,
                        rainabs: real(row, 4)?,
                        irainarf: int(row, 5)?,
                        movingstorm: row.get(6)?,
                        series: Vec::new(),
                        rainspeed: row.get(7)?,
                        iraindir: row.get(8)?,
                        arf: Vec::new(),
                    },
                    row.get::<_, Option<i64>>(2)?,
                ))
            },
        )
        .optional()?;
    let Some((mut data, series_fid)) = head else {
        return Ok(None);
    };
    if let Some(fid) = series_fid {
        data.series = query(
            conn,
            "SELECT time, value FROM rain_time_series_data WHERE series_fid = ?1 ORDER BY fid",
            [fid],
            |row| Ok(TimeValue::new(real(row, 0)?, real(row, 1)?)),
        )?;
    }
    data.arf = query(
        conn,
        "SELECT grid_fid, arf FROM rain_arf_cells ORDER BY fid",
        [],
        |row| Ok(CellValue::new(row.get(0)?, real(row, 1)?)),
    )?;
    Ok(Some(data))
}

pub(super) fn write_infil(batch: &mut Batch<'_>, data: &InfilData) -> StoreResult<()> {
    let ga = data.green_ampt.as_ref();
    let scs = data.scs.as_ref();
    let horton = data.horton.as_ref();
    batch.insert(
        "INSERT INTO infil (infmethod, abstr, sati, satf, poros, soild, infchan,
                            hydcall, soilall, hydcadj, hydcxx, scsnall, abstr1,
                            fhortonia, fhortoni, fhortonf, decaya)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            data.method,
            ga.map(|g| g.abstr),
            ga.map(|g| g.sati),
            ga.map(|g| g.satf),
            ga.map(|g| g.poros),
            ga.map(|g| g.soild),
            ga.map(|g| g.infchan),
            ga.map(|g| g.hydcall),
            ga.map(|g| g.soilall),
            ga.map(|g| g.hydcadj),
            ga.and_then(|g| g.hydcxx),
            scs.map(|s| s.scsnall),
            scs.map(|s| s.abstr1),
            horton.map(|h| h.fhortonia),
            horton.and_then(|h| h.fhortoni),
            horton.and_then(|h| h.fhortonf),
            horton.and_then(|h| h.decaya),
        ],
    )?;
    for seg in &data.channel_segs {
        batch.insert(
            "INSERT INTO infil_chan_seg (chan_seg_fid, hydcx, hydcxfinal, soildepthcx)
             VALUES (?1, ?2, ?3, ?4)",
            params![seg.seg, seg.hydcx, seg.hydcxfinal, seg.soildepthcx],
        )?;
    }
    for c in &data.green_ampt_cells {
        batch.insert(
            "INSERT INTO infil_cells_green
                (grid_fid, hydc, soils, dtheta, abstrinf, rtimpf, soil_depth)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![c.grid, c.hydc, c.soils, c.dtheta, c.abstrinf, c.rtimpf, c.soil_depth],
        )?;
    }
    for c in &data.scs_cells {
        batch.insert(
            "INSERT INTO infil_cells_scs (grid_fid, scsn) VALUES (?1, ?2)",
            params![c.grid, c.value],
        )?;
    }
    for c in &data.channel_cells {
        batch.insert(
            "INSERT INTO infil_chan_elems (grid_fid, hydconch) VALUES (?1, ?2)",
            params![c.grid, c.value],
        )?;
    }
    for c in &data.horton_cells {
        batch.insert(
            "INSERT INTO infil_cells_horton (grid_fid, fhorti, fhortf, deca)
             VALUES (?1, ?2, ?3, ?4)",
            params![c.grid, c.fhorti, c.fhortf, c.deca],
        )?;
    }
    Ok(())
}

pub(super) fn read_infil(conn: &Connection) -> StoreResult<Option<InfilData>> {
    let head = conn
        .query_row(
            "SELECT infmethod, abstr, sati, satf, poros, soild, infchan, hydcall, soilall,
                    hydcadj, hydcxx, scsnall, abstr1, fhortonia, fhortoni, fhortonf, decaya
             FROM infil ORDER BY fid LIMIT 1",
            [],
            |row| {
                // NULL globals mark a method that was not configured.
                let green_ampt = match row.get::<_, Option<f64>>(1)? {
                    Some(abstr) => Some(GreenAmptGlobal {
                        abstr,
                        sati: real(row, 2)?,
                        satf: real(row, 3)?,
                        poros: real(row, 4)?,
                        soild: real(row, 5)?,
                        infchan: int(row, 6)?,
                        hydcall: real(row, 7)?,
                        soilall: real(row, 8)?,
                        hydcadj: real(row, 9)?,
                        hydcxx: row.get(10)?,
                    }),
                    None => None,
                };
                let scs = match row.get::<_, Option<f64>>(11)? {
                    Some(scsnall) => Some(ScsGlobal {
                        scsnall,
                        abstr1: real(row, 12)?,
                    }),
                    None => None,
                };
                let horton = match row.get::<_, Option<f64>>(13)? {
                    Some(fhortonia) => Some(HortonGlobal {
                        fhortonia,
                        fhortoni: row.get(14)?,
                        fhortonf: row.get(15)?,
                        decaya: row.get(16)?,
                    }),
                    None => None,
                };
                Ok(InfilData {
                    method: int(row, 0)?,
                    green_ampt,
                    scs,
                    horton,
                    ..Default::default()
                })
            },
        )
        .optional()?;
    let Some(mut data) = head else {
        return Ok(None);
    };
    data.channel_segs = query(
        conn,
        "SELECT chan_seg_fid, hydcx, hydcxfinal, soildepthcx FROM infil_chan_seg ORDER BY fid",
        [],
        |row| {
            Ok(InfilChannelSeg {
                seg: int(row, 0)?,
                hydcx: real(row, 1)?,
                hydcxfinal: real(row, 2)?,
                soildepthcx: real(row, 3)?,
            })
        },
    )?;
    data.green_ampt_cells = query(
        conn,
        "SELECT grid_fid, hydc, soils, dtheta, abstrinf, rtimpf, soil_depth
         FROM infil_cells_green ORDER BY fid",
        [],
        |row| {
            Ok(GreenAmptCell {
                grid: row.get(0)?,
                hydc: real(row, 1)?,
                soils: real(row, 2)?,
                dtheta: real(row, 3)?,
                abstrinf: real(row, 4)?,
                rtimpf: real(row, 5)?,
                soil_depth: real(row, 6)?,
            })
        },
    )?;
    data.scs_cells = query(
        conn,
        "SELECT grid_fid, scsn FROM infil_cells_scs ORDER BY fid",
        [],
        |row| Ok(CellValue::new(row.get(0)?, real(row, 1)?)),
    )?;
    data.channel_cells = query(
        conn,
        "SELECT grid_fid, hydconch FROM infil_chan_elems ORDER BY fid",
        [],
        |row| Ok(CellValue::new(row.get(0)?, real(row, 1)?)),
    )?;
    data.horton_cells = query(
        conn,
        "SELECT grid_fid, fhorti, fhortf, deca FROM infil_cells_horton ORDER BY fid",
        [],
        |row| {
            Ok(HortonCell {
                grid: row.get(0)?,
                fhorti: real(row, 1)?,
                fhortf: real(row, 2)?,
                deca: real(row, 3)?,
            })
        },
    )?;
    Ok(Some(data))
}

pub(super) fn write_evap(batch: &mut Batch<'_>, data: &EvapData) -> StoreResult<()> {
    batch.insert(
        "INSERT INTO evapor (ievapmonth, iday, clocktime) VALUES (?1, ?2, ?3)",
        params![data.ievapmonth, data.iday, data.clocktime],
    )?;
    for month in &data.months {
        let fid = batch.insert(
            "INSERT INTO evapor_monthly (month, monthly_evap) VALUES (?1, ?2)",
            params![month.month, month.monthly_evap],
        )?;
        for (hour, value) in month.hourly.iter().enumerate() {
            batch.insert(
                "INSERT INTO evapor_hourly (monthly_fid, hour, hourly_evap) VALUES (?1, ?2, ?3)",
                params![fid, hour as i64 + 1, value],
            )?;
        }
    }
    Ok(())
}

pub(super) fn read_evap(conn: &Connection) -> StoreResult<Option<EvapData>> {
    let head = conn
        .query_row(
            "SELECT ievapmonth, iday, clocktime FROM evapor ORDER BY fid LIMIT 1",
            [],
            |row| Ok((int(row, 0)?, int(row, 1)?, real(row, 2)?)),
        )
        .optional()?;
    let Some((ievapmonth, iday, clocktime)) = head else {
        return Ok(None);
    };
    let months = query(
        conn,
        "SELECT fid, month, monthly_evap FROM evapor_monthly ORDER BY fid",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                real(row, 2)?,
            ))
        },
    )?;
    let mut data = EvapData {
        ievapmonth,
        iday,
        clocktime,
        months: Vec::with_capacity(months.len()),
    };
    for (fid, month, monthly_evap) in months {
        let hourly = query(
            conn,
            "SELECT hourly_evap FROM evapor_hourly WHERE monthly_fid = ?1 ORDER BY hour",
            [fid],
            |row| real(row, 0),
        )?;
        data.months.push(EvapMonth {
            month: month.unwrap_or_default(),
            monthly_evap,
            hourly,
        });
    }
    Ok(Some(data))
}
