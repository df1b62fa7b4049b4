use flo_model::{
    Inlet, InletData, Outfall, OutfallData, RatingTableData, SdCulvert, SdRatingBlock,
    SdRatingTable,
};

use crate::container::{H5Container, H5Group};
use crate::table::{Reader, Rows, int, text};
use crate::{H5Error, H5Result};

pub const GROUP: &str = "Storm Drain";

fn check_names(dataset: &str, names: usize, rows: usize) -> H5Result<()> {
    if names != rows {
        return Err(H5Error::layout(
            dataset,
            format!("{} names for {} rows", names, rows),
        ));
    }
    Ok(())
}

pub fn write_inlets(d: &InletData) -> H5Group {
    let mut g = H5Group::new(GROUP);
    let mut rows = Rows::new("SWMMFLO", 8);
    for i in &d.inlets {
        rows.push(&[
            i.grid as f64,
            i.intype as f64,
            i.length,
            i.width,
            i.height,
            i.coeff,
            i.feature as f64,
            i.curbheight,
        ]);
    }
    rows.finish_into(&mut g);
    g.insert(text(
        "SWMMFLO_NAME",
        d.inlets.iter().map(|i| i.name.clone()).collect(),
    ));
    g.insert(text(
        "SWMMFLO_TAG",
        d.inlets.iter().map(|i| i.tag.clone()).collect(),
    ));
    g
}

pub fn read_inlets(c: &H5Container) -> H5Result<Option<InletData>> {
    let r = Reader::new(c, GROUP);
    if !r.has("SWMMFLO") {
        return Ok(None);
    }
    let table = r.table("SWMMFLO", 8)?;
    let names = r.text("SWMMFLO_NAME")?;
    check_names("SWMMFLO_NAME", names.len(), table.len())?;
    let tags = r.text("SWMMFLO_TAG")?;
    let inlets = names
        .into_iter()
        .zip(table.rows())
        .enumerate()
        .map(|(i, (name, row))| Inlet {
            tag: tags.get(i).cloned().unwrap_or_else(|| "D".to_string()),
            grid: int(row[0]),
            name,
            intype: int(row[1]),
            length: row[2],
            width: row[3],
            height: row[4],
            coeff: row[5],
            feature: int(row[6]),
            curbheight: if row[7].is_nan() { 0.0 } else { row[7] },
        })
        .collect();
    Ok(Some(InletData { inlets }))
}

pub fn write_rating_tables(d: &RatingTableData) -> H5Group {
    let mut g = H5Group::new(GROUP);
    g.insert(text(
        "SD_RATING_NAMES",
        d.blocks.iter().map(|b| b.name().to_string()).collect(),
    ));
    let mut blocks = Rows::new("SD_RATING_BLOCKS", 7);
    let mut data = Rows::new("SD_RATING_DATA", 3);
    for (i, block) in d.blocks.iter().enumerate() {
        match block {
            SdRatingBlock::Table(t) => {
                blocks.push(&[0.0, t.grid as f64]);
                for [depth, q] in &t.rows {
                    data.push(&[i as f64, *depth, *q]);
                }
            }
            SdRatingBlock::Culvert(c) => blocks.push(&[
                1.0,
                c.grid as f64,
                c.cdiameter,
                c.typec as f64,
                c.typeen as f64,
                c.cubase,
                c.multbarrels as f64,
            ]),
        }
    }
    blocks.finish_into(&mut g);
    data.finish_into(&mut g);
    g
}

pub fn read_rating_tables(c: &H5Container) -> H5Result<Option<RatingTableData>> {
    let r = Reader::new(c, GROUP);
    if !r.has("SD_RATING_BLOCKS") {
        return Ok(None);
    }
    let table = r.table("SD_RATING_BLOCKS", 7)?;
    let names = r.text("SD_RATING_NAMES")?;
    check_names("SD_RATING_NAMES", names.len(), table.len())?;
    let mut blocks: Vec<SdRatingBlock> = names
        .into_iter()
        .zip(table.rows())
        .map(|(name, row)| {
            let grid = int(row[1]);
            if int(row[0]) == 1 {
                SdRatingBlock::Culvert(SdCulvert {
                    grid,
                    name,
                    cdiameter: row[2],
                    typec: int(row[3]),
                    typeen: int(row[4]),
                    cubase: row[5],
                    multbarrels: int(row[6]),
                })
            } else {
                SdRatingBlock::Table(SdRatingTable {
                    grid,
                    name,
                    rows: Vec::new(),
                })
            }
        })
        .collect();
    let data = r.table("SD_RATING_DATA", 3)?;
    for row in data.rows() {
        match &mut blocks[data.index(row[0], table.len())?] {
            SdRatingBlock::Table(t) => t.rows.push([row[1], row[2]]),
            SdRatingBlock::Culvert(c) => {
                return Err(H5Error::layout(
                    "SD_RATING_DATA",
                    format!("rows reference culvert block {}", c.name),
                ));
            }
        }
    }
    Ok(Some(RatingTableData { blocks }))
}

pub fn write_outfalls(d: &OutfallData) -> H5Group {
    let mut g = H5Group::new(GROUP);
    g.insert(text(
        "SWMMOUTF_NAME",
        d.outfalls.iter().map(|o| o.name.clone()).collect(),
    ));
    let mut rows = Rows::new("SWMMOUTF", 2);
    for o in &d.outfalls {
        rows.push(&[o.grid as f64, o.outf_flo as f64]);
    }
    rows.finish_into(&mut g);
    g
}

pub fn read_outfalls(c: &H5Container) -> H5Result<Option<OutfallData>> {
    let r = Reader::new(c, GROUP);
    if !r.has("SWMMOUTF") {
        return Ok(None);
    }
    let table = r.table("SWMMOUTF", 2)?;
    let names = r.text("SWMMOUTF_NAME")?;
    check_names("SWMMOUTF_NAME", names.len(), table.len())?;
    let outfalls = names
        .into_iter()
        .zip(table.rows())
        .map(|(name, row)| Outfall {
            name,
            grid: int(row[0]),
            outf_flo: int(row[1]),
        })
        .collect();
    Ok(Some(OutfallData { outfalls }))
}
