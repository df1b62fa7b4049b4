use flo_model::{
    CellValue, EvapData, EvapMonth, GreenAmptCell, GreenAmptGlobal, HortonCell, HortonGlobal,
    InfilChannelSeg, InfilData, RainData, ScsGlobal, TimeValue,
};

use crate::H5Result;
use crate::container::{H5Container, H5Group};
use crate::table::{Reader, Rows, int, nan, nan_int, opt, opt_int, text, vector};

pub const RAIN_GROUP: &str = "Rainfall";
pub const INFIL_GROUP: &str = "Infiltration";
pub const EVAP_GROUP: &str = "Evaporation";

fn cell_values(name: &str, cells: &[CellValue]) -> Rows {
    let mut rows = Rows::new(name, 2);
    for c in cells {
        rows.push(&[c.grid as f64, c.value]);
    }
    rows
}

fn read_cell_values(r: &Reader<'_>, name: &str) -> H5Result<Vec<CellValue>> {
    Ok(r.table(name, 2)?
        .rows()
        .map(|row| CellValue::new(int(row[0]), row[1]))
        .collect())
}

pub fn write_rain(d: &RainData) -> H5Group {
    let mut g = H5Group::new(RAIN_GROUP);
    g.insert(vector(
        "RAIN_GLOBAL",
        vec![
            d.irainreal as f64,
            d.irainbuilding as f64,
            d.rtt,
            d.rainabs,
            d.irainarf as f64,
            nan_int(d.movingstorm),
            nan(d.rainspeed),
            nan_int(d.iraindir),
        ],
    ));
    let mut series = Rows::new("RAIN_DATA", 2);
    for tv in &d.series {
        series.push(&[tv.time, tv.value]);
    }
    series.finish_into(&mut g);
    cell_values("RAIN_ARF", &d.arf).finish_into(&mut g);
    g
}

pub fn read_rain(c: &H5Container) -> H5Result<Option<RainData>> {
    let r = Reader::new(c, RAIN_GROUP);
    let Some(global) = r.fixed::<8>("RAIN_GLOBAL")? else {
        return Ok(None);
    };
    Ok(Some(RainData {
        irainreal: int(global[0]),
        irainbuilding: int(global[1]),
        rtt: global[2],
        rainabs: global[3],
        irainarf: int(global[4]),
        movingstorm: opt_int(global[5]),
        rainspeed: opt(global[6]),
        iraindir: opt_int(global[7]),
        series: r
            .table("RAIN_DATA", 2)?
            .rows()
            .map(|row| TimeValue::new(row[0], row[1]))
            .collect(),
        arf: read_cell_values(&r, "RAIN_ARF")?,
    }))
}

pub fn write_infil(d: &InfilData) -> H5Group {
    let mut g = H5Group::new(INFIL_GROUP);
    g.insert(vector("INFIL_METHOD", vec![d.method as f64]));
    if let Some(ga) = &d.green_ampt {
        g.insert(vector(
            "INFIL_GREEN_AMPT",
            vec![
                ga.abstr,
                ga.sati,
                ga.satf,
                ga.poros,
                ga.soild,
                ga.infchan as f64,
                ga.hydcall,
                ga.soilall,
                ga.hydcadj,
                nan(ga.hydcxx),
            ],
        ));
    }
    if let Some(scs) = &d.scs {
        g.insert(vector("INFIL_SCS", vec![scs.scsnall, scs.abstr1]));
    }
    if let Some(h) = &d.horton {
        g.insert(vector(
            "INFIL_HORTON",
            vec![h.fhortonia, nan(h.fhortoni), nan(h.fhortonf), nan(h.decaya)],
        ));
    }

    let mut segs = Rows::new("INFIL_CHAN_SEG", 4);
    for s in &d.channel_segs {
        segs.push(&[s.seg as f64, s.hydcx, s.hydcxfinal, s.soildepthcx]);
    }
    segs.finish_into(&mut g);

    let mut ga_cells = Rows::new("INFIL_GA_CELLS", 7);
    for c in &d.green_ampt_cells {
        ga_cells.push(&[
            c.grid as f64,
            c.hydc,
            c.soils,
            c.dtheta,
            c.abstrinf,
            c.rtimpf,
            c.soil_depth,
        ]);
    }
    ga_cells.finish_into(&mut g);
    cell_values("INFIL_SCS_CELLS", &d.scs_cells).finish_into(&mut g);
    cell_values("INFIL_CHAN_CELLS", &d.channel_cells).finish_into(&mut g);

    let mut horton = Rows::new("INFIL_HORTON_CELLS", 4);
    for c in &d.horton_cells {
        horton.push(&[c.grid as f64, c.fhorti, c.fhortf, c.deca]);
    }
    horton.finish_into(&mut g);
    g
}

pub fn read_infil(c: &H5Container) -> H5Result<Option<InfilData>> {
    let r = Reader::new(c, INFIL_GROUP);
    let Some([method]) = r.fixed::<1>("INFIL_METHOD")? else {
        return Ok(None);
    };
    let green_ampt = r.fixed::<10>("INFIL_GREEN_AMPT")?.map(|v| GreenAmptGlobal {
        abstr: v[0],
        sati: v[1],
        satf: v[2],
        poros: v[3],
        soild: v[4],
        infchan: int(v[5]),
        hydcall: v[6],
        soilall: v[7],
        hydcadj: v[8],
        hydcxx: opt(v[9]),
    });
    let scs = r.fixed::<2>("INFIL_SCS")?.map(|v| ScsGlobal {
        scsnall: v[0],
        abstr1: v[1],
    });
    let horton = r.fixed::<4>("INFIL_HORTON")?.map(|v| HortonGlobal {
        fhortonia: v[0],
        fhortoni: opt(v[1]),
        fhortonf: opt(v[2]),
        decaya: opt(v[3]),
    });
    Ok(Some(InfilData {
        method: int(method),
        green_ampt,
        scs,
        horton,
        channel_segs: r
            .table("INFIL_CHAN_SEG", 4)?
            .rows()
            .map(|row| InfilChannelSeg {
                seg: int(row[0]),
                hydcx: row[1],
                hydcxfinal: row[2],
                soildepthcx: row[3],
            })
            .collect(),
        green_ampt_cells: r
            .table("INFIL_GA_CELLS", 7)?
            .rows()
            .map(|row| GreenAmptCell {
                grid: int(row[0]),
                hydc: row[1],
                soils: row[2],
                dtheta: row[3],
                abstrinf: row[4],
                rtimpf: row[5],
                soil_depth: row[6],
            })
            .collect(),
        scs_cells: read_cell_values(&r, "INFIL_SCS_CELLS")?,
        channel_cells: read_cell_values(&r, "INFIL_CHAN_CELLS")?,
        horton_cells: r
            .table("INFIL_HORTON_CELLS", 4)?
            .rows()
            .map(|row| HortonCell {
                grid: int(row[0]),
                fhorti: row[1],
                fhortf: row[2],
                deca: row[3],
            })
            .collect(),
    }))
}

pub fn write_evap(d: &EvapData) -> H5Group {
    let mut g = H5Group::new(EVAP_GROUP);
    g.insert(vector(
        "EVAP_GLOBAL",
        vec![d.ievapmonth as f64, d.iday as f64, d.clocktime],
    ));
    if !d.months.is_empty() {
        g.insert(text(
            "EVAP_MONTHS",
            d.months.iter().map(|m| m.month.clone()).collect(),
        ));
        g.insert(vector(
            "EVAP_MONTHLY",
            d.months.iter().map(|m| m.monthly_evap).collect(),
        ));
    }
    let mut hourly = Rows::new("EVAP_HOURLY", 2);
    for (i, m) in d.months.iter().enumerate() {
        for v in &m.hourly {
            hourly.push(&[i as f64, *v]);
        }
    }
    hourly.finish_into(&mut g);
    g
}

pub fn read_evap(c: &H5Container) -> H5Result<Option<EvapData>> {
    let r = Reader::new(c, EVAP_GROUP);
    let Some(global) = r.fixed::<3>("EVAP_GLOBAL")? else {
        return Ok(None);
    };
    let names = r.text("EVAP_MONTHS")?;
    let monthly = r.vector("EVAP_MONTHLY")?;
    let mut months: Vec<EvapMonth> = names
        .into_iter()
        .enumerate()
        .map(|(i, month)| EvapMonth {
            month,
            monthly_evap: monthly.get(i).copied().unwrap_or(0.0),
            hourly: Vec::new(),
        })
        .collect();
    let hourly = r.table("EVAP_HOURLY", 2)?;
    for row in hourly.rows() {
        let i = hourly.index(row[0], months.len())?;
        months[i].hourly.push(row[1]);
    }
    Ok(Some(EvapData {
        ievapmonth: int(global[0]),
        iday: int(global[1]),
        clocktime: global[2],
        months,
    }))
}
