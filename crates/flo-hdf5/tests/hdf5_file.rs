#![cfg(feature = "hdf5")]

use std::path::PathBuf;

use flo_hdf5::{
    DEFAULT_COMPRESSION, Dataset, DatasetData, H5Container, H5Group, read_file, write_file,
};
use hdf5::types::{FixedAscii, FixedUnicode};

fn temp_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}_{}.hdf5", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn text(values: &[&str]) -> DatasetData {
    DatasetData::Text(values.iter().map(|s| s.to_string()).collect())
}

#[test]
fn text_datasets_are_compressed_like_numeric_ones() {
    let path = temp_file("flo_hdf5_text_deflate");
    let mut group = H5Group::new("Storm Drain");
    group.insert(Dataset::new("SWMMFLO_NAME", text(&["I1", "Inlet 2"])));
    group.insert(Dataset::new(
        "SWMMFLO_DATA",
        DatasetData::Int {
            shape: vec![2, 2],
            values: vec![1, 10, 2, 11],
        },
    ));
    let mut container = H5Container::new();
    container.write_groups([group], DEFAULT_COMPRESSION);
    write_file(&path, &container).unwrap();

    let back = read_file(&path).unwrap();
    let names = back.read("SWMMFLO_NAME", Some("Storm Drain"), None).unwrap();
    assert_eq!(names.data, text(&["I1", "Inlet 2"]));
    assert_eq!(names.compression, Some(DEFAULT_COMPRESSION));
    let data = back.read("SWMMFLO_DATA", Some("Storm Drain"), None).unwrap();
    assert_eq!(data.compression, Some(DEFAULT_COMPRESSION));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn fixed_length_strings_read_as_text() {
    let path = temp_file("flo_hdf5_fixed_strings");
    {
        let file = hdf5::File::create(&path).unwrap();
        let g = file.create_group("Input").unwrap().create_group("Structures").unwrap();
        let ascii = vec![
            FixedAscii::<8>::from_ascii("CULV_A").unwrap(),
            FixedAscii::<8>::from_ascii("W1").unwrap(),
        ];
        let d = g.new_dataset::<FixedAscii<8>>().shape(2).create("STRUCT_NAME").unwrap();
        d.write_raw(&ascii).unwrap();
        let utf8 = vec!["Brücke".parse::<FixedUnicode<12>>().unwrap()];
        let d = g.new_dataset::<FixedUnicode<12>>().shape(1).create("STRUCT_NOTE").unwrap();
        d.write_raw(&utf8).unwrap();
    }

    let back = read_file(&path).unwrap();
    let names = back.read("STRUCT_NAME", Some("Structures"), None).unwrap();
    assert_eq!(names.data, text(&["CULV_A", "W1"]));
    let notes = back.read("STRUCT_NOTE", Some("Structures"), None).unwrap();
    assert_eq!(notes.data, text(&["Brücke"]));
    let _ = std::fs::remove_file(&path);
}
