//! Row-oriented builders and readers over the container's flat datasets.
//!
//! Tables are float matrices whose first column is usually an index into a
//! parent dataset. Unset optional values travel as NaN.

use crate::container::{Dataset, DatasetData, H5Container, H5Group};
use crate::{H5Error, H5Result};

/// Float matrix builder with a fixed row width.
#[derive(Debug, Clone)]
pub struct Rows {
    name: String,
    width: usize,
    values: Vec<f64>,
}

impl Rows {
    pub fn new(name: &str, width: usize) -> Self {
        Self {
            name: name.to_string(),
            width,
            values: Vec::new(),
        }
    }

    /// Appends a row; short rows are padded with NaN, long rows truncated.
    pub fn push(&mut self, row: &[f64]) {
        let take = row.len().min(self.width);
        self.values.extend_from_slice(&row[..take]);
        self.values
            .extend(std::iter::repeat_n(f64::NAN, self.width - take));
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn finish(self) -> Dataset {
        let rows = if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        };
        Dataset::new(
            self.name,
            DatasetData::Float {
                shape: vec![rows, self.width],
                values: self.values,
            },
        )
    }

    /// Adds the finished table to `group` unless no row was pushed.
    pub fn finish_into(self, group: &mut H5Group) {
        if !self.is_empty() {
            group.insert(self.finish());
        }
    }
}

pub fn vector(name: &str, values: Vec<f64>) -> Dataset {
    Dataset::new(
        name,
        DatasetData::Float {
            shape: vec![values.len()],
            values,
        },
    )
}

pub fn ints(name: &str, values: Vec<i64>) -> Dataset {
    Dataset::new(
        name,
        DatasetData::Int {
            shape: vec![values.len()],
            values,
        },
    )
}

pub fn int_table(name: &str, width: usize, values: Vec<i64>) -> Dataset {
    let rows = if width == 0 { 0 } else { values.len() / width };
    Dataset::new(
        name,
        DatasetData::Int {
            shape: vec![rows, width],
            values,
        },
    )
}

pub fn text(name: &str, values: Vec<String>) -> Dataset {
    Dataset::new(name, DatasetData::Text(values))
}

pub fn nan(v: Option<f64>) -> f64 {
    v.unwrap_or(f64::NAN)
}

pub fn nan_int(v: Option<i64>) -> f64 {
    v.map_or(f64::NAN, |i| i as f64)
}

pub fn opt(v: f64) -> Option<f64> {
    if v.is_nan() { None } else { Some(v) }
}

/// Nearest integer; NaN reads as 0.
pub fn int(v: f64) -> i64 {
    if v.is_finite() { v.round() as i64 } else { 0 }
}

pub fn opt_int(v: f64) -> Option<i64> {
    opt(v).map(int)
}

/// A float matrix read back from the container.
#[derive(Debug, Clone, Default)]
pub struct Table {
    name: String,
    width: usize,
    values: Vec<f64>,
}

impl Table {
    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.width.max(1))
    }

    /// Validates a zero-based parent index stored in a row.
    pub fn index(&self, v: f64, parent_len: usize) -> H5Result<usize> {
        let i = int(v);
        if v.is_nan() || i < 0 || i as usize >= parent_len {
            return Err(H5Error::layout(
                &self.name,
                format!("index {} outside 0..{}", v, parent_len),
            ));
        }
        Ok(i as usize)
    }
}

/// Typed access to the datasets of one group.
pub struct Reader<'a> {
    group: Option<&'a H5Group>,
}

impl<'a> Reader<'a> {
    pub fn new(container: &'a H5Container, group: &str) -> Self {
        Self {
            group: container.group(group),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.group.is_some_and(|g| g.get(name).is_some())
    }

    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has(n))
    }

    fn data(&self, name: &str) -> Option<&'a DatasetData> {
        self.group.and_then(|g| g.get(name)).map(|d| &d.data)
    }

    /// A float matrix; an absent dataset reads as an empty table.
    pub fn table(&self, name: &str, min_width: usize) -> H5Result<Table> {
        let Some(data) = self.data(name) else {
            return Ok(Table {
                name: name.to_string(),
                width: min_width,
                values: Vec::new(),
            });
        };
        let (shape, values): (Vec<usize>, Vec<f64>) = match data {
            DatasetData::Float { shape, values } => (shape.clone(), values.clone()),
            DatasetData::Int { shape, values } => {
                (shape.clone(), values.iter().map(|v| *v as f64).collect())
            }
            DatasetData::Text(_) => {
                return Err(H5Error::layout(name, "expected numeric data, found text"));
            }
        };
        let width = shape.iter().skip(1).product::<usize>().max(1);
        if width < min_width {
            return Err(H5Error::layout(
                name,
                format!("expected at least {} columns, found {}", min_width, width),
            ));
        }
        Ok(Table {
            name: name.to_string(),
            width,
            values,
        })
    }

    pub fn vector(&self, name: &str) -> H5Result<Vec<f64>> {
        Ok(self.table(name, 1)?.values)
    }

    /// Fixed-length vector; missing trailing entries read as NaN.
    pub fn fixed<const N: usize>(&self, name: &str) -> H5Result<Option<[f64; N]>> {
        if !self.has(name) {
            return Ok(None);
        }
        let values = self.vector(name)?;
        let mut out = [f64::NAN; N];
        for (slot, v) in out.iter_mut().zip(values) {
            *slot = v;
        }
        Ok(Some(out))
    }

    pub fn ints(&self, name: &str) -> H5Result<Vec<i64>> {
        match self.data(name) {
            None => Ok(Vec::new()),
            Some(DatasetData::Int { values, .. }) => Ok(values.clone()),
            Some(DatasetData::Float { values, .. }) => Ok(values.iter().map(|v| int(*v)).collect()),
            Some(DatasetData::Text(_)) => {
                Err(H5Error::layout(name, "expected integer data, found text"))
            }
        }
    }

    pub fn text(&self, name: &str) -> H5Result<Vec<String>> {
        match self.data(name) {
            None => Ok(Vec::new()),
            Some(DatasetData::Text(v)) => Ok(v.clone()),
            Some(_) => Err(H5Error::layout(name, "expected text data")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::H5Container;

    #[test]
    fn short_rows_are_nan_padded() {
        let mut rows = Rows::new("T", 3);
        rows.push(&[1.0]);
        rows.push(&[1.0, 2.0, 3.0, 4.0]);
        let mut g = H5Group::new("G");
        rows.finish_into(&mut g);
        let mut c = H5Container::new();
        c.insert_raw(g);
        let table = Reader::new(&c, "G").table("T", 3).unwrap();
        let collected: Vec<&[f64]> = table.rows().collect();
        assert_eq!(collected.len(), 2);
        assert!(collected[0][1].is_nan());
        assert_eq!(collected[1], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn narrow_table_is_a_layout_error() {
        let mut g = H5Group::new("G");
        g.insert(vector("V", vec![1.0, 2.0]));
        let mut c = H5Container::new();
        c.insert_raw(g);
        let reader = Reader::new(&c, "G");
        assert!(matches!(reader.table("V", 2), Err(H5Error::Layout { .. })));
        assert!(reader.table("ABSENT", 4).unwrap().is_empty());
    }

    #[test]
    fn index_out_of_range_is_reported() {
        let table = Table {
            name: "CHAN_ELEMENTS".into(),
            width: 1,
            values: vec![3.0],
        };
        assert_eq!(table.index(2.0, 3).unwrap(), 2);
        assert!(table.index(3.0, 3).is_err());
        assert!(table.index(f64::NAN, 3).is_err());
    }
}
