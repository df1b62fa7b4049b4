//! CONT.DAT and TOLER.DAT.

use flo_core::is_numeric;
use flo_model::Control;
use flo_model::control::TOLER_NAMES;

use crate::{DatResult, DatWriter, Line, Row, RowStream};

const LINE1: [&str; 5] = ["SIMUL", "TOUT", "LGPLOT", "METRIC", "IBACKUP"];
const LINE2: [&str; 5] = ["ICHANNEL", "MSTREET", "LEVEE", "IWRFS", "IMULTC"];
const LINE3: [&str; 7] = ["IRAIN", "INFIL", "IEVAP", "MUD", "ISED", "IMODFLOW", "SWMM"];
const LINE4: [&str; 3] = ["IHYDRSTRUCT", "IFLOODWAY", "IDEBRV"];
const LINE5: [&str; 6] = ["AMANN", "DEPTHDUR", "XCONC", "XARF", "FROUDL", "SHALLOWN"];
const LINE6: [&str; 2] = ["NOPRTFP", "DEPRESSDEPTH"];

fn assign(control: &mut Control, row: &Row, names: &[&str]) -> DatResult<()> {
    row.require(names.len())?;
    for (name, token) in names.iter().zip(&row.tokens) {
        control.set(name, token.as_str());
    }
    Ok(())
}

/// `ITIMTEP` codes 11, 21, .., 51 announce an output window.
fn decode_itimtep(token: i64) -> Option<i64> {
    if (11..=51).contains(&token) && token % 10 == 1 {
        Some(token / 10)
    } else {
        None
    }
}

pub fn parse_cont(rows: &mut RowStream) -> DatResult<Control> {
    let mut control = Control::new();

    let row = rows.expect_row(LINE1.len())?;
    assign(&mut control, &row, &LINE1)?;
    if row.len() > LINE1.len() {
        control.set("build", row.tokens[LINE1.len()..].join(" "));
    }
    let lgplot = control.int("LGPLOT").unwrap_or(0);

    assign(&mut control, &rows.expect_row(LINE2.len())?, &LINE2)?;
    assign(&mut control, &rows.expect_row(LINE3.len())?, &LINE3)?;
    assign(&mut control, &rows.expect_row(LINE4.len())?, &LINE4)?;

    let row = rows.expect_row(LINE5.len())?;
    assign(&mut control, &row, &LINE5)?;
    if let Some(encroach) = row.tokens.get(LINE5.len()) {
        control.set("ENCROACH", encroach.as_str());
    }

    assign(&mut control, &rows.expect_row(LINE6.len())?, &LINE6)?;

    if control.switch("ICHANNEL") {
        let row = rows.expect_row(1)?;
        control.set("NOPRTC", row.text(0)?);
    }

    let row = rows.expect_row(2)?;
    let token = row.int(0)?;
    let coded = decode_itimtep(token);
    control.set(
        "ITIMTEP",
        match coded {
            Some(v) => v.to_string(),
            None => row.text(0)?.to_string(),
        },
    );
    control.set("TIMTEP", row.text(1)?);
    let simul = control.get("SIMUL").unwrap_or("0").to_string();
    match row.len() {
        n if n >= 4 => {
            control.set("STARTIMTEP", row.text(2)?);
            control.set("ENDTIMTEP", row.text(3)?);
        }
        3 => {
            control.set("STARTIMTEP", row.text(2)?);
            control.set("ENDTIMTEP", simul);
        }
        _ if coded.is_some() => {
            control.set("STARTIMTEP", "0");
            control.set("ENDTIMTEP", simul);
        }
        _ => {}
    }

    if lgplot == 2 {
        let row = rows.expect_row(1)?;
        control.set("GRAPTIM", row.text(0)?);
    }
    Ok(control)
}

/// Parses TOLER.DAT; `cont` supplies the channel and street switches.
pub fn parse_toler(rows: &mut RowStream, cont: &Control) -> DatResult<Control> {
    let mut control = Control::new();

    let row = rows.expect_row(2)?;
    control.set("TOLGLOBAL", row.text(0)?);
    control.set("DEPTOL", row.text(1)?);
    if let Some(wavemax) = row.tokens.get(2) {
        control.set("WAVEMAX", wavemax.as_str());
    }

    if let Some(row) = rows.next_row()? {
        let start = if is_numeric(row.tag()) {
            0
        } else {
            control.set("COURCHAR_C", row.tag());
            1
        };
        control.set("COURANTFP", row.text(start)?);
        let mut slots = Vec::new();
        if cont.switch("ICHANNEL") {
            slots.push("COURANTC");
        }
        if cont.switch("MSTREET") {
            slots.push("COURANTST");
        }
        for name in ["COURANTC", "COURANTST"] {
            if !slots.contains(&name) {
                slots.push(name);
            }
        }
        for (name, token) in slots.iter().zip(&row.tokens[start + 1..]) {
            control.set(name, token.as_str());
        }
    }

    if let Some(row) = rows.next_row()? {
        if is_numeric(row.tag()) {
            control.set("TIME_ACCEL", row.tag());
        } else {
            control.set("COURCHAR_T", row.tag());
            control.set("TIME_ACCEL", row.text(1)?);
        }
    }
    Ok(control)
}

fn value<'a>(control: &'a Control, name: &str) -> &'a str {
    control.get(name).unwrap_or("0")
}

fn line_of(control: &Control, names: &[&str]) -> Line {
    names
        .iter()
        .fold(Line::new(), |line, name| line.text(value(control, name)))
}

pub fn emit_cont(control: &Control) -> DatWriter {
    let mut w = DatWriter::new("CONT.DAT");
    let mut first = line_of(control, &LINE1);
    if let Some(build) = control.get("build") {
        first = first.text(build);
    }
    w.push(first);
    w.push(line_of(control, &LINE2));
    w.push(line_of(control, &LINE3));
    w.push(line_of(control, &LINE4));

    let mut fifth = line_of(control, &LINE5);
    if control.switch("IFLOODWAY") {
        fifth = fifth.text(value(control, "ENCROACH"));
    }
    w.push(fifth);
    w.push(line_of(control, &LINE6));

    if control.int("ICHANNEL") == Some(1) {
        w.push(Line::new().text(value(control, "NOPRTC")));
    }

    let itimtep = control.int("ITIMTEP").unwrap_or(0);
    let start = control.real("STARTIMTEP").unwrap_or(0.0);
    let end = control.real("ENDTIMTEP").unwrap_or(0.0);
    let timtep = value(control, "TIMTEP");
    if (1..=5).contains(&itimtep) && end != 0.0 {
        let mut eighth = Line::new().int(itimtep * 10 + 1).text(timtep);
        if start > 0.0 && end > 0.0 {
            eighth = eighth
                .text(value(control, "STARTIMTEP"))
                .text(value(control, "ENDTIMTEP"));
        }
        w.push(eighth);
    } else {
        w.push(Line::new().text(value(control, "ITIMTEP")).text(timtep));
    }

    if control.int("LGPLOT") == Some(2) {
        w.push(Line::new().text(value(control, "GRAPTIM")));
    }
    w
}

pub fn emit_toler(control: &Control) -> Option<DatWriter> {
    if !TOLER_NAMES.iter().any(|n| control.contains(n)) {
        return None;
    }
    let mut w = DatWriter::new("TOLER.DAT");
    let mut first = Line::new()
        .text(value(control, "TOLGLOBAL"))
        .text(value(control, "DEPTOL"));
    if let Some(wavemax) = control.get("WAVEMAX") {
        first = first.text(wavemax);
    }
    w.push(first);

    let mut second = Line::new()
        .text(control.get("COURCHAR_C").unwrap_or("C"))
        .text(value(control, "COURANTFP"));
    if control.switch("ICHANNEL") {
        second = second.text(value(control, "COURANTC"));
    }
    if control.switch("MSTREET") {
        second = second.text(value(control, "COURANTST"));
    }
    w.push(second);

    w.push(
        Line::new()
            .text(control.get("COURCHAR_T").unwrap_or("T"))
            .text(value(control, "TIME_ACCEL")),
    );
    Some(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONT: &str = "\
24 0.5 2 0 1 Pro
1 0 0 0 0
0 0 0 0 0 0 0
0 1 0
0 0 0 0 0.9 0.2 0.1
0 0
1
31 0.5 0.1 1.0
0.25
";

    #[test]
    fn cont_reads_gated_lines_and_window() {
        let mut rows = RowStream::from_text("CONT.DAT", CONT);
        let control = parse_cont(&mut rows).unwrap();
        assert_eq!(control.get("build"), Some("Pro"));
        assert_eq!(control.get("NOPRTC"), Some("1"));
        assert_eq!(control.get("ENCROACH"), Some("0.1"));
        assert_eq!(control.get("ITIMTEP"), Some("3"));
        assert_eq!(control.get("STARTIMTEP"), Some("0.1"));
        assert_eq!(control.get("ENDTIMTEP"), Some("1.0"));
        assert_eq!(control.get("GRAPTIM"), Some("0.25"));
    }

    #[test]
    fn cont_round_trips() {
        let mut rows = RowStream::from_text("CONT.DAT", CONT);
        let control = parse_cont(&mut rows).unwrap();
        assert_eq!(emit_cont(&control).finish().text, CONT);
    }

    #[test]
    fn itimtep_reencoding() {
        let mut control = Control::from_pairs([
            ("ITIMTEP", "3"),
            ("TIMTEP", "0.5"),
            ("STARTIMTEP", "0.1"),
            ("ENDTIMTEP", "1.0"),
        ]);
        let text = emit_cont(&control).finish().text;
        assert_eq!(text.lines().nth(6), Some("31 0.5 0.1 1.0"));

        control.set("ENDTIMTEP", "0");
        let text = emit_cont(&control).finish().text;
        assert_eq!(text.lines().nth(6), Some("3 0.5"));
    }

    #[test]
    fn coded_itimtep_without_window_spans_simulation() {
        let text = "10 0.5 0 0 0\n0 0 0 0 0\n0 0 0 0 0 0 0\n0 0 0\n0 0 0 0 0 0\n0 0\n21 0.1\n";
        let control = parse_cont(&mut RowStream::from_text("CONT.DAT", text)).unwrap();
        assert_eq!(control.get("ITIMTEP"), Some("2"));
        assert_eq!(control.get("STARTIMTEP"), Some("0"));
        assert_eq!(control.get("ENDTIMTEP"), Some("10"));
    }

    #[test]
    fn gated_fields_are_dropped() {
        let control = Control::from_pairs([
            ("IFLOODWAY", "0"),
            ("ENCROACH", "0.3"),
            ("ICHANNEL", "0"),
            ("NOPRTC", "2"),
            ("LGPLOT", "1"),
            ("GRAPTIM", "0.1"),
            ("COURANTFP", "0.6"),
            ("COURANTC", "0.6"),
            ("COURANTST", "0.6"),
            ("MSTREET", "0"),
        ]);
        let cont = emit_cont(&control).finish().text;
        assert_eq!(cont.lines().count(), 7);
        assert_eq!(cont.lines().nth(4), Some("0 0 0 0 0 0"));
        let toler = emit_toler(&control).unwrap().finish().text;
        assert_eq!(toler.lines().nth(1), Some("C 0.6"));
    }

    #[test]
    fn toler_assigns_courant_slots_by_switch() {
        let cont = Control::from_pairs([("ICHANNEL", "0"), ("MSTREET", "1")]);
        let text = "0.004 0.25\nC 0.6 0.4\nT 0.1\n";
        let toler = parse_toler(&mut RowStream::from_text("TOLER.DAT", text), &cont).unwrap();
        assert_eq!(toler.get("COURANTST"), Some("0.4"));
        assert!(!toler.contains("COURANTC"));
        let mut all = cont.clone();
        all.merge(&toler);
        assert_eq!(emit_toler(&all).unwrap().finish().text, text);
    }
}
