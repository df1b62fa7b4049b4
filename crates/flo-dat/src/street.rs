//! STREET.DAT.

use flo_model::{Street, StreetData, StreetGlobal, StreetSegment, StreetWing};

use crate::{DatResult, DatWriter, Line, RowStream};

pub fn parse_street(rows: &mut RowStream) -> DatResult<StreetData> {
    let mut data = StreetData::default();
    while let Some(row) = rows.next_row()? {
        match row.tag() {
            "N" => data.streets.push(Street {
                name: row.tokens[1..].join(" "),
                segments: Vec::new(),
            }),
            "S" => {
                let street = data.streets.last_mut().ok_or_else(|| row.unknown_tag())?;
                street.segments.push(StreetSegment {
                    grid: row.int(1)?,
                    depex: row.real(2)?,
                    stman: row.real(3)?,
                    elstr: row.real(4)?,
                    wings: Vec::new(),
                });
            }
            "W" => {
                let segment = data
                    .streets
                    .last_mut()
                    .and_then(|s| s.segments.last_mut())
                    .ok_or_else(|| row.unknown_tag())?;
                segment.wings.push(StreetWing {
                    istdir: row.int(1)?,
                    widr: row.real(2)?,
                });
            }
            _ if data.global.is_none() && data.streets.is_empty() => {
                data.global = Some(StreetGlobal {
                    strman: row.real(0)?,
                    istrflo: row.int(1)?,
                    strfno: row.real(2)?,
                    depx: row.real(3)?,
                    widst: row.real(4)?,
                });
            }
            _ => return Err(row.unknown_tag().into()),
        }
    }
    Ok(data)
}

pub fn emit_street(data: &StreetData) -> DatWriter {
    let mut w = DatWriter::new("STREET.DAT");
    if let Some(g) = &data.global {
        w.push(
            Line::new()
                .real(g.strman)
                .int(g.istrflo)
                .reals(&[g.strfno, g.depx, g.widst]),
        );
    }
    for street in &data.streets {
        w.push(Line::tag("N").text(&street.name));
        for seg in &street.segments {
            w.push(
                Line::tag("S")
                    .int(seg.grid)
                    .reals(&[seg.depex, seg.stman, seg.elstr]),
            );
            for wing in &seg.wings {
                w.push(Line::tag("W").int(wing.istdir).real(wing.widr));
            }
        }
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streets_nest_segments_and_wings() {
        let text = "\
0.02 0 0.9 0.5 20
N Main Street
S 12 0.5 0.025 101.5
W 1 10
W 5 7.5
S 13 0.5 0.025 101.2
N Side
S 40 0.3 0.03 99
";
        let data = parse_street(&mut RowStream::from_text("STREET.DAT", text)).unwrap();
        assert_eq!(data.streets.len(), 2);
        assert_eq!(data.streets[0].name, "Main Street");
        assert_eq!(data.streets[0].segments[0].wings.len(), 2);
        assert_eq!(emit_street(&data).text(), text);
    }

    #[test]
    fn wing_before_segment_is_rejected() {
        let mut rows = RowStream::from_text("STREET.DAT", "0.02 0 0.9 0.5 20\nW 1 2\n");
        let err = parse_street(&mut rows).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
