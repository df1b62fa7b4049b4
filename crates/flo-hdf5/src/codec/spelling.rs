use flo_core::{NumberSpellings, SpellingKey};

use crate::container::{H5Container, H5Group};
use crate::table::{Reader, int_table, text};
use crate::{H5Error, H5Result};

pub const GROUP: &str = "DAT Spellings";

pub fn write_spellings(spellings: &NumberSpellings) -> H5Group {
    let mut g = H5Group::new(GROUP);
    if spellings.is_empty() {
        return g;
    }
    let mut files = Vec::with_capacity(spellings.len());
    let mut tags = Vec::with_capacity(spellings.len());
    let mut texts = Vec::with_capacity(spellings.len());
    let mut keys = Vec::with_capacity(spellings.len() * 2);
    for (key, spelling) in spellings.iter() {
        files.push(key.file.clone());
        tags.push(key.tag.clone());
        texts.push(spelling.to_string());
        keys.push(key.pos as i64);
        keys.push(key.bits as i64);
    }
    g.insert(text("SPELLING_FILE", files));
    g.insert(text("SPELLING_TAG", tags));
    g.insert(text("SPELLING_TEXT", texts));
    g.insert(int_table("SPELLING_KEY", 2, keys));
    g
}

/// Spellings carried by the container; absent when it was not written by a DAT import.
pub fn read_spellings(c: &H5Container) -> H5Result<NumberSpellings> {
    let r = Reader::new(c, GROUP);
    let mut spellings = NumberSpellings::new();
    if !r.has("SPELLING_KEY") {
        return Ok(spellings);
    }
    let files = r.text("SPELLING_FILE")?;
    let tags = r.text("SPELLING_TAG")?;
    let texts = r.text("SPELLING_TEXT")?;
    let keys = r.ints("SPELLING_KEY")?;
    let n = files.len();
    if tags.len() != n || texts.len() != n || keys.len() != n * 2 {
        return Err(H5Error::layout(
            "SPELLING_KEY",
            format!(
                "{} files, {} tags, {} texts, {} key values",
                n,
                tags.len(),
                texts.len(),
                keys.len()
            ),
        ));
    }
    for (i, ((file, tag), spelling)) in files.into_iter().zip(tags).zip(texts).enumerate() {
        let key = SpellingKey {
            file,
            tag,
            pos: keys[2 * i].max(0) as usize,
            bits: keys[2 * i + 1] as u64,
        };
        spellings.insert(key, spelling);
    }
    Ok(spellings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_COMPRESSION;

    #[test]
    fn spellings_travel_through_the_container() {
        let mut spellings = NumberSpellings::new();
        spellings.scan_text("MANNINGS_N.DAT", "1 0.040\n");
        spellings.scan_text("INFLOW.DAT", "R 100 500.0 2.5\n");

        let mut c = H5Container::new();
        c.write_groups([write_spellings(&spellings)], DEFAULT_COMPRESSION);
        let back = read_spellings(&c).unwrap();
        assert_eq!(back, spellings);
        assert_eq!(back.spell("INFLOW.DAT", "R", 2, 500.0), Some("500.0"));
    }

    #[test]
    fn container_without_spellings_reads_empty() {
        assert!(read_spellings(&H5Container::new()).unwrap().is_empty());
    }
}
