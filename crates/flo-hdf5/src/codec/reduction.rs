use flo_model::reduction::{decode_arf_grid, encode_arf_grid};
use flo_model::{
    ArfData, BlockedCell, MudArea, MudGlobal, MultCell, MultData, MultGlobal, PartialBlock,
    SedData, SedGlobal, SedGroup, SedGroupCell, SedSupply, SimpleMult,
};

use crate::H5Result;
use crate::container::{H5Container, H5Group};
use crate::table::{Reader, Rows, int, ints, nan, nan_int, opt, opt_int, vector};

pub const ARF_GROUP: &str = "Reduction Factors";
pub const MULT_GROUP: &str = "Multiple Channels";
pub const SED_GROUP: &str = "Mudflow and Sediment Transport";

pub fn write_arf(d: &ArfData) -> H5Group {
    let mut g = H5Group::new(ARF_GROUP);
    if d.iarfblockmod.is_some() {
        g.insert(vector("ARF_GLOBAL", vec![nan_int(d.iarfblockmod)]));
    }
    if !d.totally.is_empty() {
        g.insert(ints(
            "ARF_TOTALLY_BLOCKED",
            d.totally
                .iter()
                .map(|c| encode_arf_grid(c.grid, c.collapse))
                .collect(),
        ));
    }
    let mut partial = Rows::new("ARF_PARTIALLY_BLOCKED", 10);
    for p in &d.partially {
        let mut row = vec![encode_arf_grid(p.grid, p.collapse) as f64, p.arf];
        row.extend_from_slice(&p.wrf);
        partial.push(&row);
    }
    partial.finish_into(&mut g);
    g
}

pub fn read_arf(c: &H5Container) -> H5Result<Option<ArfData>> {
    let r = Reader::new(c, ARF_GROUP);
    if !r.has_any(&["ARF_GLOBAL", "ARF_TOTALLY_BLOCKED", "ARF_PARTIALLY_BLOCKED"]) {
        return Ok(None);
    }
    let iarfblockmod = r.fixed::<1>("ARF_GLOBAL")?.and_then(|[v]| opt_int(v));
    let totally = r
        .ints("ARF_TOTALLY_BLOCKED")?
        .into_iter()
        .map(|signed| {
            let (grid, collapse) = decode_arf_grid(signed);
            BlockedCell { grid, collapse }
        })
        .collect();
    let partially = r
        .table("ARF_PARTIALLY_BLOCKED", 10)?
        .rows()
        .map(|row| {
            let (grid, collapse) = decode_arf_grid(int(row[0]));
            let mut wrf = [0.0; 8];
            wrf.copy_from_slice(&row[2..10]);
            PartialBlock {
                grid,
                collapse,
                arf: row[1],
                wrf,
            }
        })
        .collect();
    Ok(Some(ArfData {
        iarfblockmod,
        totally,
        partially,
    }))
}

pub fn write_mult(d: &MultData) -> H5Group {
    let mut g = H5Group::new(MULT_GROUP);
    if let Some(m) = &d.global {
        g.insert(vector(
            "MULT_GLOBAL",
            vec![
                m.wmc,
                m.wdrall,
                m.dmall,
                m.nodchnsall,
                m.xnmultall,
                m.sslopemin,
                m.sslopemax,
                m.avuld50,
            ],
        ));
    }
    let mut cells = Rows::new("MULT", 5);
    for c in &d.cells {
        cells.push(&[c.grid as f64, c.wdr, c.dm, c.nodchns, c.xnmult]);
    }
    cells.finish_into(&mut g);
    if let Some(simple) = &d.simple {
        g.insert(vector("SIMPLE_MULT_GLOBAL", vec![simple.simple_n]));
        let (kept, dropped) = d.simple_cells_without_repeats();
        if !dropped.is_empty() {
            tracing::warn!(
                cells = ?dropped,
                "simplified multiple channel cells repeat full cells; dropped"
            );
        }
        g.insert(ints("SIMPLE_MULT_CELLS", kept));
    }
    g
}

pub fn read_mult(c: &H5Container) -> H5Result<Option<MultData>> {
    let r = Reader::new(c, MULT_GROUP);
    if !r.has_any(&["MULT_GLOBAL", "MULT", "SIMPLE_MULT_GLOBAL"]) {
        return Ok(None);
    }
    let global = r.fixed::<8>("MULT_GLOBAL")?.map(|v| MultGlobal {
        wmc: v[0],
        wdrall: v[1],
        dmall: v[2],
        nodchnsall: v[3],
        xnmultall: v[4],
        sslopemin: v[5],
        sslopemax: v[6],
        avuld50: v[7],
    });
    let cells = r
        .table("MULT", 5)?
        .rows()
        .map(|row| MultCell {
            grid: int(row[0]),
            wdr: row[1],
            dm: row[2],
            nodchns: row[3],
            xnmult: row[4],
        })
        .collect();
    let simple = match r.fixed::<1>("SIMPLE_MULT_GLOBAL")? {
        Some([simple_n]) => Some(SimpleMult {
            simple_n,
            cells: r.ints("SIMPLE_MULT_CELLS")?,
        }),
        None => None,
    };
    Ok(Some(MultData {
        global,
        cells,
        simple,
    }))
}

pub fn write_sed(d: &SedData) -> H5Group {
    let mut g = H5Group::new(SED_GROUP);
    if let Some(m) = &d.mud {
        g.insert(vector("MUD", vec![m.va, m.vb, m.ysa, m.ysb, m.sgsm, m.xkx]));
    }
    if let Some(s) = &d.sed {
        g.insert(vector(
            "SED",
            vec![
                s.isedeqg as f64,
                s.isedsizefrac as f64,
                s.dfifty,
                s.sgrad,
                s.sgst,
                s.dryspwt,
                s.cvfg,
                s.isedsupply as f64,
                s.isedisplay as f64,
                s.scourdep,
            ],
        ));
    }
    let mut groups = Rows::new("SED_GROUPS", 3);
    let mut group_frac = Rows::new("SED_GROUP_FRAC", 3);
    for (i, grp) in d.groups.iter().enumerate() {
        groups.push(&[grp.isedeqi as f64, grp.bedthick, grp.cvfi]);
        for [diam, pct] in &grp.fractions {
            group_frac.push(&[i as f64, *diam, *pct]);
        }
    }
    let mut areas = Rows::new("MUD_AREAS", 2);
    for a in &d.mud_areas {
        areas.push(&[a.grid as f64, nan(a.debrisv)]);
    }
    let mut supply = Rows::new("SED_SUPPLY", 4);
    let mut supply_frac = Rows::new("SED_SUPPLY_FRAC", 3);
    for (i, s) in d.supply.iter().enumerate() {
        supply.push(&[s.grid as f64, s.isedcfp as f64, s.ased, s.bsed]);
        for [diam, pct] in &s.fractions {
            supply_frac.push(&[i as f64, *diam, *pct]);
        }
    }
    let mut group_cells = Rows::new("SED_GROUP_CELLS", 2);
    for gc in &d.group_cells {
        group_cells.push(&[gc.grid as f64, gc.group as f64]);
    }
    for rows in [groups, group_frac, areas, supply, supply_frac, group_cells] {
        rows.finish_into(&mut g);
    }
    if !d.rigid_cells.is_empty() {
        g.insert(ints("SED_RIGID_CELLS", d.rigid_cells.clone()));
    }
    g
}

pub fn read_sed(c: &H5Container) -> H5Result<Option<SedData>> {
    let r = Reader::new(c, SED_GROUP);
    let names = [
        "MUD",
        "SED",
        "SED_GROUPS",
        "MUD_AREAS",
        "SED_RIGID_CELLS",
        "SED_SUPPLY",
        "SED_GROUP_CELLS",
    ];
    if !r.has_any(&names) {
        return Ok(None);
    }
    let mud = r.fixed::<6>("MUD")?.map(|v| MudGlobal {
        va: v[0],
        vb: v[1],
        ysa: v[2],
        ysb: v[3],
        sgsm: v[4],
        xkx: v[5],
    });
    let sed = r.fixed::<10>("SED")?.map(|v| SedGlobal {
        isedeqg: int(v[0]),
        isedsizefrac: int(v[1]),
        dfifty: v[2],
        sgrad: v[3],
        sgst: v[4],
        dryspwt: v[5],
        cvfg: v[6],
        isedsupply: int(v[7]),
        isedisplay: int(v[8]),
        scourdep: v[9],
    });
    let mut groups: Vec<SedGroup> = r
        .table("SED_GROUPS", 3)?
        .rows()
        .map(|row| SedGroup {
            isedeqi: int(row[0]),
            bedthick: row[1],
            cvfi: row[2],
            fractions: Vec::new(),
        })
        .collect();
    let frac = r.table("SED_GROUP_FRAC", 3)?;
    for row in frac.rows() {
        let i = frac.index(row[0], groups.len())?;
        groups[i].fractions.push([row[1], row[2]]);
    }
    let mut supply: Vec<SedSupply> = r
        .table("SED_SUPPLY", 4)?
        .rows()
        .map(|row| SedSupply {
            grid: int(row[0]),
            isedcfp: int(row[1]),
            ased: row[2],
            bsed: row[3],
            fractions: Vec::new(),
        })
        .collect();
    let sfrac = r.table("SED_SUPPLY_FRAC", 3)?;
    for row in sfrac.rows() {
        let i = sfrac.index(row[0], supply.len())?;
        supply[i].fractions.push([row[1], row[2]]);
    }
    Ok(Some(SedData {
        mud,
        sed,
        groups,
        mud_areas: r
            .table("MUD_AREAS", 2)?
            .rows()
            .map(|row| MudArea {
                grid: int(row[0]),
                debrisv: opt(row[1]),
            })
            .collect(),
        rigid_cells: r.ints("SED_RIGID_CELLS")?,
        supply,
        group_cells: r
            .table("SED_GROUP_CELLS", 2)?
            .rows()
            .map(|row| SedGroupCell {
                grid: int(row[0]),
                group: int(row[1]),
            })
            .collect(),
    }))
}
