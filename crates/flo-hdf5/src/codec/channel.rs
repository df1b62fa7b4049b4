use flo_model::{
    ChannelData, ChannelElement, ChannelSegment, ChannelShape, ChannelWse, Confluence, RectShape,
    TrapShape, VarShape, XSection,
};

use crate::container::{H5Container, H5Group};
use crate::table::{Reader, Rows, int, nan_int, opt_int, text, vector};
use crate::{H5Error, H5Result};

pub const GROUP: &str = "Channels";

fn shape_code(shape: &ChannelShape) -> f64 {
    match shape {
        ChannelShape::R(_) => 0.0,
        ChannelShape::V(_) => 1.0,
        ChannelShape::T(_) => 2.0,
        ChannelShape::N { .. } => 3.0,
    }
}

pub fn write_channels(d: &ChannelData) -> H5Group {
    let mut g = H5Group::new(GROUP);
    let mut global = Rows::new("CHAN_GLOBAL", 4);
    let mut elements = Rows::new("CHAN_ELEMENTS", 6);
    let mut rect = Rows::new("CHAN_R", 5);
    let mut var = Rows::new("CHAN_V", 17);
    let mut trap = Rows::new("CHAN_T", 7);
    let mut natural = Rows::new("CHAN_N", 2);
    let mut confluences = Rows::new("CONFLUENCES", 3);
    let mut noexchange = Rows::new("NOEXCHANGE", 2);
    let mut wse = Rows::new("CHAN_WSE", 5);

    let mut element_idx = 0_usize;
    for (s, seg) in d.segments.iter().enumerate() {
        let si = s as f64;
        global.push(&[seg.depinitial, seg.froudc, seg.roughadj, nan_int(seg.isedn)]);
        for el in &seg.elements {
            let ei = element_idx as f64;
            element_idx += 1;
            elements.push(&[
                si,
                el.grid as f64,
                el.rbankgrid as f64,
                el.fcn,
                el.xlen,
                shape_code(&el.shape),
            ]);
            match &el.shape {
                ChannelShape::R(r) => rect.push(&[ei, r.bankell, r.bankelr, r.fcw, r.fcd]),
                ChannelShape::V(v) => {
                    let mut row = vec![ei, v.fcd];
                    row.extend_from_slice(&v.lower);
                    row.push(v.excdep);
                    row.extend_from_slice(&v.upper);
                    row.extend([v.bankell, v.bankelr]);
                    var.push(&row);
                }
                ChannelShape::T(t) => {
                    trap.push(&[ei, t.bankell, t.bankelr, t.fcw, t.fcd, t.zl, t.zr])
                }
                ChannelShape::N { nxsecnum } => natural.push(&[ei, *nxsecnum as f64]),
            }
        }
        for c in &seg.confluences {
            confluences.push(&[si, c.tributary as f64, c.main as f64]);
        }
        for grid in &seg.no_exchange {
            noexchange.push(&[si, *grid as f64]);
        }
        for w in &seg.wse {
            wse.push(&[si, w.istart as f64, w.wselstart, w.iend as f64, w.wselend]);
        }
    }
    for rows in [global, elements, rect, var, trap, natural, confluences, noexchange, wse] {
        rows.finish_into(&mut g);
    }

    if !d.xsections.is_empty() {
        g.insert(text(
            "XSEC_NAME",
            d.xsections.iter().map(|x| x.name.clone()).collect(),
        ));
        g.insert(vector(
            "XSEC_NUM",
            d.xsections.iter().map(|x| x.nxsecnum as f64).collect(),
        ));
        let mut points = Rows::new("XSEC_DATA", 3);
        for (i, x) in d.xsections.iter().enumerate() {
            for [station, elev] in &x.points {
                points.push(&[i as f64, *station, *elev]);
            }
        }
        points.finish_into(&mut g);
    }
    g
}

/// Per-element shape rows keyed by element index.
fn shape_rows(
    r: &Reader<'_>,
    name: &str,
    width: usize,
    n: usize,
) -> H5Result<Vec<Option<Vec<f64>>>> {
    let table = r.table(name, width)?;
    let mut out = vec![None; n];
    for row in table.rows() {
        let i = table.index(row[0], n)?;
        out[i] = Some(row[1..width].to_vec());
    }
    Ok(out)
}

pub fn read_channels(c: &H5Container) -> H5Result<Option<ChannelData>> {
    let r = Reader::new(c, GROUP);
    if !r.has_any(&["CHAN_GLOBAL", "XSEC_NAME"]) {
        return Ok(None);
    }
    let mut segments: Vec<ChannelSegment> = r
        .table("CHAN_GLOBAL", 4)?
        .rows()
        .map(|row| ChannelSegment::new(row[0], row[1], row[2], opt_int(row[3])))
        .collect();
    let n_seg = segments.len();

    let elements = r.table("CHAN_ELEMENTS", 6)?;
    let n_el = elements.len();
    let rect = shape_rows(&r, "CHAN_R", 5, n_el)?;
    let var = shape_rows(&r, "CHAN_V", 17, n_el)?;
    let trap = shape_rows(&r, "CHAN_T", 7, n_el)?;
    let natural = shape_rows(&r, "CHAN_N", 2, n_el)?;

    for (e, row) in elements.rows().enumerate() {
        let seg = elements.index(row[0], n_seg)?;
        let missing =
            || H5Error::layout("CHAN_ELEMENTS", format!("element {} has no shape row", e));
        let shape = match int(row[5]) {
            0 => {
                let v = rect[e].as_ref().ok_or_else(missing)?;
                ChannelShape::R(RectShape {
                    bankell: v[0],
                    bankelr: v[1],
                    fcw: v[2],
                    fcd: v[3],
                })
            }
            1 => {
                let v = var[e].as_ref().ok_or_else(missing)?;
                let mut lower = [0.0; 6];
                lower.copy_from_slice(&v[1..7]);
                let mut upper = [0.0; 6];
                upper.copy_from_slice(&v[8..14]);
                ChannelShape::V(VarShape {
                    fcd: v[0],
                    lower,
                    excdep: v[7],
                    upper,
                    bankell: v[14],
                    bankelr: v[15],
                })
            }
            2 => {
                let v = trap[e].as_ref().ok_or_else(missing)?;
                ChannelShape::T(TrapShape {
                    bankell: v[0],
                    bankelr: v[1],
                    fcw: v[2],
                    fcd: v[3],
                    zl: v[4],
                    zr: v[5],
                })
            }
            3 => {
                let v = natural[e].as_ref().ok_or_else(missing)?;
                ChannelShape::N { nxsecnum: int(v[0]) }
            }
            other => {
                return Err(H5Error::layout(
                    "CHAN_ELEMENTS",
                    format!("unknown shape code {}", other),
                ));
            }
        };
        segments[seg].elements.push(ChannelElement {
            grid: int(row[1]),
            rbankgrid: int(row[2]),
            fcn: row[3],
            xlen: row[4],
            shape,
        });
    }

    let confluences = r.table("CONFLUENCES", 3)?;
    for row in confluences.rows() {
        segments[confluences.index(row[0], n_seg)?]
            .confluences
            .push(Confluence {
                tributary: int(row[1]),
                main: int(row[2]),
            });
    }
    let noexchange = r.table("NOEXCHANGE", 2)?;
    for row in noexchange.rows() {
        segments[noexchange.index(row[0], n_seg)?]
            .no_exchange
            .push(int(row[1]));
    }
    let wse = r.table("CHAN_WSE", 5)?;
    for row in wse.rows() {
        segments[wse.index(row[0], n_seg)?].wse.push(ChannelWse {
            istart: int(row[1]),
            wselstart: row[2],
            iend: int(row[3]),
            wselend: row[4],
        });
    }

    let names = r.text("XSEC_NAME")?;
    let nums = r.vector("XSEC_NUM")?;
    let mut xsections: Vec<XSection> = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| XSection {
            nxsecnum: nums.get(i).map_or(i as i64 + 1, |v| int(*v)),
            name,
            points: Vec::new(),
        })
        .collect();
    let points = r.table("XSEC_DATA", 3)?;
    for row in points.rows() {
        let i = points.index(row[0], xsections.len())?;
        xsections[i].points.push([row[1], row[2]]);
    }

    Ok(Some(ChannelData {
        segments,
        xsections,
    }))
}
