//! On-disk HDF5 backend.
//!
//! Compiled only with the `hdf5` feature; without it both entry points
//! return [`H5Error::Unsupported`] so callers can still use the in-memory
//! container.

use std::path::Path;

use crate::container::H5Container;
#[cfg(not(feature = "hdf5"))]
use crate::H5Error;
use crate::H5Result;

#[cfg(feature = "hdf5")]
pub fn write_file(path: &Path, container: &H5Container) -> H5Result<()> {
    backend::write(path, container)
}

#[cfg(feature = "hdf5")]
pub fn read_file(path: &Path) -> H5Result<H5Container> {
    backend::read(path)
}

#[cfg(not(feature = "hdf5"))]
pub fn write_file(_path: &Path, _container: &H5Container) -> H5Result<()> {
    Err(H5Error::Unsupported)
}

#[cfg(not(feature = "hdf5"))]
pub fn read_file(_path: &Path) -> H5Result<H5Container> {
    Err(H5Error::Unsupported)
}

#[cfg(feature = "hdf5")]
mod backend {
    use std::path::Path;

    use hdf5::filters::Filter;
    use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};
    use hdf5::{File, Group};

    use crate::container::{Dataset, DatasetData, H5Container, H5Group, ROOT};
    use crate::{H5Error, H5Result};

    const DESCRIPTION: &str = "description";

    fn leaf(path: &str) -> &str {
        path.rsplit('/').next().unwrap_or(path)
    }

    fn unicode(dataset: &str, s: &str) -> H5Result<VarLenUnicode> {
        s.parse::<VarLenUnicode>()
            .map_err(|e| H5Error::layout(dataset, e.to_string()))
    }

    pub fn write(path: &Path, container: &H5Container) -> H5Result<()> {
        let file = File::create(path)?;
        let root = file.create_group(ROOT)?;
        for group in container.groups() {
            let g = root.create_group(leaf(&group.name))?;
            for ds in group.datasets.values() {
                write_dataset(&g, ds)?;
            }
            tracing::debug!(group = %group.name, datasets = group.datasets.len(), "group written");
        }
        file.flush()?;
        Ok(())
    }

    fn write_dataset(g: &Group, ds: &Dataset) -> H5Result<()> {
        let shape = ds.data.shape();
        let level = ds
            .compression
            .filter(|_| shape.iter().product::<usize>() > 0);
        let name = ds.name.as_str();
        let created = match &ds.data {
            DatasetData::Float { values, .. } => {
                let mut builder = g.new_dataset::<f64>().shape(shape.clone());
                if let Some(level) = level {
                    builder = builder.deflate(level);
                }
                let d = builder.create(name)?;
                d.write_raw(values.as_slice())?;
                d
            }
            DatasetData::Int { values, .. } => {
                let mut builder = g.new_dataset::<i64>().shape(shape.clone());
                if let Some(level) = level {
                    builder = builder.deflate(level);
                }
                let d = builder.create(name)?;
                d.write_raw(values.as_slice())?;
                d
            }
            DatasetData::Text(values) => {
                let encoded = values
                    .iter()
                    .map(|s| unicode(name, s))
                    .collect::<H5Result<Vec<_>>>()?;
                let mut builder = g.new_dataset::<VarLenUnicode>().shape(shape.clone());
                if let Some(level) = level {
                    builder = builder.deflate(level);
                }
                let d = builder.create(name)?;
                d.write_raw(encoded.as_slice())?;
                d
            }
        };
        if let Some(desc) = &ds.description {
            created
                .new_attr::<VarLenUnicode>()
                .create(DESCRIPTION)?
                .write_scalar(&unicode(name, desc)?)?;
        }
        Ok(())
    }

    pub fn read(path: &Path) -> H5Result<H5Container> {
        let file = File::open(path)?;
        let mut container = H5Container::new();
        if !file.link_exists(ROOT) {
            tracing::warn!(path = %path.display(), "file has no {} group", ROOT);
            return Ok(container);
        }
        for g in file.group(ROOT)?.groups()? {
            let mut group = H5Group::new(leaf(&g.name()));
            for d in g.datasets()? {
                let name = leaf(&d.name()).to_string();
                let shape = d.shape();
                let data = match d.dtype()?.to_descriptor()? {
                    TypeDescriptor::Float(_) => DatasetData::Float {
                        shape,
                        values: d.read_raw::<f64>()?,
                    },
                    TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => DatasetData::Int {
                        shape,
                        values: d.read_raw::<i64>()?,
                    },
                    TypeDescriptor::VarLenUnicode => DatasetData::Text(
                        d.read_raw::<VarLenUnicode>()?
                            .iter()
                            .map(|s| s.as_str().to_string())
                            .collect(),
                    ),
                    TypeDescriptor::VarLenAscii => DatasetData::Text(
                        d.read_raw::<VarLenAscii>()?
                            .iter()
                            .map(|s| s.as_str().to_string())
                            .collect(),
                    ),
                    TypeDescriptor::FixedAscii(n) => {
                        DatasetData::Text(read_fixed(&d, &name, n, false)?)
                    }
                    TypeDescriptor::FixedUnicode(n) => {
                        DatasetData::Text(read_fixed(&d, &name, n, true)?)
                    }
                    other => {
                        return Err(H5Error::layout(
                            &name,
                            format!("unsupported element type {:?}", other),
                        ));
                    }
                };
                let description = d
                    .attr(DESCRIPTION)
                    .ok()
                    .and_then(|a| a.read_scalar::<VarLenUnicode>().ok())
                    .map(|s| s.as_str().to_string());
                let compression = d.filters().iter().find_map(|f| match f {
                    Filter::Deflate(level) => Some(*level),
                    _ => None,
                });
                group.insert(Dataset {
                    name,
                    data,
                    description,
                    compression,
                });
            }
            container.insert_raw(group);
        }
        Ok(container)
    }

    /// Fixed-length strings are read through the smallest width that holds
    /// `n` bytes; HDF5 pads or truncates between string widths on read.
    fn read_fixed(d: &hdf5::Dataset, name: &str, n: usize, unicode: bool) -> H5Result<Vec<String>> {
        match (n, unicode) {
            (0..=16, false) => fixed_ascii::<16>(d),
            (0..=64, false) => fixed_ascii::<64>(d),
            (0..=256, false) => fixed_ascii::<256>(d),
            (0..=1024, false) => fixed_ascii::<1024>(d),
            (0..=16, true) => fixed_unicode::<16>(d),
            (0..=64, true) => fixed_unicode::<64>(d),
            (0..=256, true) => fixed_unicode::<256>(d),
            (0..=1024, true) => fixed_unicode::<1024>(d),
            _ => Err(H5Error::layout(name, format!("fixed string width {} too large", n))),
        }
    }

    fn fixed_ascii<const N: usize>(d: &hdf5::Dataset) -> H5Result<Vec<String>> {
        Ok(d.read_raw::<FixedAscii<N>>()?
            .iter()
            .map(|s| decode(s.as_bytes()))
            .collect())
    }

    fn fixed_unicode<const N: usize>(d: &hdf5::Dataset) -> H5Result<Vec<String>> {
        Ok(d.read_raw::<FixedUnicode<N>>()?
            .iter()
            .map(|s| decode(s.as_bytes()))
            .collect())
    }

    /// UTF-8 with trailing NUL padding removed.
    fn decode(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes)
            .trim_end_matches('\0')
            .to_string()
    }
}

#[cfg(all(test, not(feature = "hdf5")))]
mod tests {
    use super::*;

    #[test]
    fn file_access_needs_the_feature() {
        let err = read_file(Path::new("missing.hdf5")).unwrap_err();
        assert!(matches!(err, H5Error::Unsupported));
        assert_eq!(err.kind_label(), "IOError");
    }
}
