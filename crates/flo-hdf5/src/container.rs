//! In-memory model of the HDF5 container.
//!
//! Groups live under the `Input` root and hold named datasets. Every backend
//! (the on-disk file or a test fixture) goes through this model, so codec
//! logic never touches the HDF5 library directly.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::registry;

pub const ROOT: &str = "Input";
pub const DEFAULT_COMPRESSION: u8 = 4;

/// Raw dataset payload. Float datasets use NaN for unset values.
#[derive(Debug, Clone)]
pub enum DatasetData {
    Float { shape: Vec<usize>, values: Vec<f64> },
    Int { shape: Vec<usize>, values: Vec<i64> },
    Text(Vec<String>),
}

impl PartialEq for DatasetData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                DatasetData::Float { shape: a, values: va },
                DatasetData::Float { shape: b, values: vb },
            ) => {
                a == b
                    && va.len() == vb.len()
                    && va
                        .iter()
                        .zip(vb)
                        .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
            }
            (
                DatasetData::Int { shape: a, values: va },
                DatasetData::Int { shape: b, values: vb },
            ) => a == b && va == vb,
            (DatasetData::Text(a), DatasetData::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl DatasetData {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            DatasetData::Float { shape, .. } | DatasetData::Int { shape, .. } => shape.clone(),
            DatasetData::Text(v) => vec![v.len()],
        }
    }

    /// Number of entries along the first axis.
    pub fn rows(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    fn row_width(&self) -> usize {
        self.shape().iter().skip(1).product()
    }

    /// Keeps the rows in `range`, clamped to the dataset length.
    pub fn slice_rows(&self, range: Range<usize>) -> DatasetData {
        let n = self.rows();
        let start = range.start.min(n);
        let end = range.end.clamp(start, n);
        let width = self.row_width();
        let mut shape = self.shape();
        if let Some(first) = shape.first_mut() {
            *first = end - start;
        }
        match self {
            DatasetData::Float { values, .. } => DatasetData::Float {
                shape,
                values: values[start * width..end * width].to_vec(),
            },
            DatasetData::Int { values, .. } => DatasetData::Int {
                shape,
                values: values[start * width..end * width].to_vec(),
            },
            DatasetData::Text(v) => DatasetData::Text(v[start..end].to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub data: DatasetData,
    pub description: Option<String>,
    /// gzip level; `None` for uncompressed.
    pub compression: Option<u8>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, data: DatasetData) -> Self {
        Self {
            name: name.into(),
            data,
            description: None,
            compression: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct H5Group {
    pub name: String,
    pub datasets: BTreeMap<String, Dataset>,
}

impl H5Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datasets: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, dataset: Dataset) {
        self.datasets.insert(dataset.name.clone(), dataset);
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Full group path below the root, e.g. `Input/Grid`.
pub fn group_path(name: &str) -> String {
    if name.starts_with(ROOT) {
        name.to_string()
    } else {
        format!("{}/{}", ROOT, name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct H5Container {
    groups: BTreeMap<String, H5Group>,
}

impl H5Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(H5Group::is_empty)
    }

    pub fn groups(&self) -> impl Iterator<Item = &H5Group> {
        self.groups.values()
    }

    pub fn group(&self, name: &str) -> Option<&H5Group> {
        self.groups.get(&group_path(name))
    }

    /// Loads the named groups; absent groups are skipped.
    pub fn read_groups(&self, names: &[&str]) -> Vec<&H5Group> {
        names.iter().filter_map(|n| self.group(n)).collect()
    }

    /// One dataset, optionally restricted to a group and a row range.
    /// When `group` is `None` the first group holding the name wins.
    pub fn read(
        &self,
        dataset: &str,
        group: Option<&str>,
        slice: Option<Range<usize>>,
    ) -> Option<Dataset> {
        let found = match group {
            Some(g) => self.group(g)?.get(dataset),
            None => self.groups.values().find_map(|g| g.get(dataset)),
        }?;
        let mut out = found.clone();
        if let Some(range) = slice {
            out.data = found.data.slice_rows(range);
        }
        Some(out)
    }

    /// Merges groups into the container, stamping each dataset with its
    /// registered description and the given gzip level.
    pub fn write_groups(&mut self, groups: impl IntoIterator<Item = H5Group>, compression: u8) {
        for group in groups {
            let path = group_path(&group.name);
            let target = self
                .groups
                .entry(path.clone())
                .or_insert_with(|| H5Group::new(path.clone()));
            for (_, mut ds) in group.datasets {
                ds.description = registry::description(&ds.name).map(str::to_string);
                ds.compression = Some(compression);
                tracing::debug!(group = %path, dataset = %ds.name, "dataset staged");
                target.insert(ds);
            }
        }
    }

    /// Inserts a group exactly as given; used by file readers.
    pub fn insert_raw(&mut self, group: H5Group) {
        let path = group_path(&group.name);
        let mut group = group;
        group.name = path.clone();
        self.groups.insert(path, group);
    }

    /// Drops every dataset whose name appears in `names`.
    pub fn remove_datasets(&mut self, names: &[&str]) {
        for group in self.groups.values_mut() {
            group.datasets.retain(|k, _| !names.contains(&k.as_str()));
        }
        self.groups.retain(|_, g| !g.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_group() -> H5Group {
        let mut g = H5Group::new("Grid");
        g.insert(Dataset::new(
            "ELEVATION",
            DatasetData::Float {
                shape: vec![4],
                values: vec![10.0, 11.0, f64::NAN, 13.0],
            },
        ));
        g
    }

    #[test]
    fn write_groups_applies_registry_and_compression() {
        let mut c = H5Container::new();
        c.write_groups([grid_group()], DEFAULT_COMPRESSION);
        let ds = c.read("ELEVATION", Some("Grid"), None).unwrap();
        assert_eq!(ds.compression, Some(4));
        assert!(ds.description.unwrap().contains("elevation"));
        assert!(c.group("Input/Grid").is_some());
    }

    #[test]
    fn nan_values_compare_equal() {
        let mut a = H5Container::new();
        a.write_groups([grid_group()], 4);
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn read_with_slice_keeps_rows() {
        let mut c = H5Container::new();
        c.write_groups([grid_group()], 4);
        let ds = c.read("ELEVATION", None, Some(1..3)).unwrap();
        assert_eq!(ds.data.shape(), vec![2]);
        assert!(c.read("MISSING", None, None).is_none());
        assert_eq!(c.read_groups(&["Grid", "Channels"]).len(), 1);
    }
}
