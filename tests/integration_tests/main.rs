// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests: drive the compiled binary against synthetic metafits
//! and subfiles.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use fitsio::{
    tables::{ColumnDataType, ColumnDescription},
    FitsFile,
};
use tempfile::tempdir;

const HDR_LEN: usize = 4096;

fn mwax_update_sub_header() -> Command {
    Command::cargo_bin("mwax_update_sub_header").unwrap()
}

/// Write a synthetic metafits carrying the given obsid as GPSTIME.
fn make_metafits(path: &Path, gpstime: i64) {
    let mut fptr = FitsFile::create(path).open().unwrap();
    let hdu = fptr.hdu(0).unwrap();
    hdu.write_key(&mut fptr, "GPSTIME", gpstime).unwrap();
    hdu.write_key(&mut fptr, "MODE", "MWAX_CORRELATOR").unwrap();
    hdu.write_key(&mut fptr, "DATESTRT", "2019-02-21T23:29:42")
        .unwrap();
    hdu.write_key(&mut fptr, "NINPUTS", 256i64).unwrap();
    hdu.write_key(&mut fptr, "FINECHAN", 10i64).unwrap();
    hdu.write_key(&mut fptr, "INTTIME", 0.5f64).unwrap();
    hdu.write_key(&mut fptr, "PROJECT", "G0060").unwrap();
    hdu.write_key(&mut fptr, "EXPOSURE", 592i64).unwrap();
    hdu.write_key(&mut fptr, "GOODTIME", 1550705405.0f64).unwrap();
    hdu.write_key(&mut fptr, "QUACKTIM", 4.0f64).unwrap();
    hdu.write_key(&mut fptr, "NAV_FREQ", 4i64).unwrap();
    hdu.write_key(&mut fptr, "BANDWDTH", 1.28f64).unwrap();
    hdu.write_key(&mut fptr, "CHANNELS", "109").unwrap();
    hdu.write_key(&mut fptr, "CHANSEL", "0").unwrap();

    let antenna = ColumnDescription::new("Antenna")
        .with_type(ColumnDataType::Int)
        .create()
        .unwrap();
    let tile_hdu = fptr.create_table("TILEDATA", &[antenna]).unwrap();
    tile_hdu
        .write_col(&mut fptr, "Antenna", &vec![0i32; 256])
        .unwrap();
}

/// Write a subfile: a zeroed placeholder header followed by a recognisable
/// payload byte pattern.
fn make_subfile(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut contents = vec![0u8; HDR_LEN];
    contents.extend(std::iter::repeat(0xAB).take(HDR_LEN));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn end_to_end_picks_preceding_metafits_and_updates_header() {
    let metafits_dir = tempdir().unwrap();
    // One candidate before the sub-observation, one after; the one before
    // must win.
    make_metafits(
        &metafits_dir.path().join("1234567800_metafits.fits"),
        1234567800,
    );
    make_metafits(
        &metafits_dir.path().join("1234567999_metafits.fits"),
        1234567999,
    );

    let subfile_dir = tempdir().unwrap();
    let subfile = make_subfile(subfile_dir.path(), "1234567890.sub");

    mwax_update_sub_header()
        .args([
            "--subfilename",
            subfile.to_str().unwrap(),
            "--chan",
            "1",
            "--metafits_directory",
            metafits_dir.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    let mut contents = vec![];
    std::fs::File::open(&subfile)
        .unwrap()
        .read_to_end(&mut contents)
        .unwrap();
    assert_eq!(contents.len(), 2 * HDR_LEN);

    let text_end = contents[..HDR_LEN]
        .iter()
        .position(|&b| b == 0)
        .expect("header should be NUL padded");
    let header = std::str::from_utf8(&contents[..text_end]).unwrap();
    let lines: Vec<&str> = header.lines().collect();
    assert!(lines.contains(&"OBS_ID 1234567800"));
    assert!(lines.contains(&"SUBOBS_ID 1234567890"));
    assert!(lines.contains(&"POPULATED 1"));
    assert!(lines.contains(&"UTC_START 2019-02-21-23:29:42"));
    assert!(lines.contains(&"OBS_OFFSET 90"));
    assert!(lines.contains(&"COARSE_CHANNEL 109"));
    assert!(lines.contains(&"NFINE_CHAN 128"));

    // The padding and the payload must be untouched.
    assert!(contents[text_end..HDR_LEN].iter().all(|&b| b == 0));
    assert!(contents[HDR_LEN..].iter().all(|&b| b == 0xAB));
}

#[test]
fn missing_subfile_exits_1() {
    let metafits_dir = tempdir().unwrap();

    mwax_update_sub_header()
        .args([
            "--subfilename",
            "/does/not/exist/1234567890.sub",
            "--chan",
            "1",
            "--metafits_directory",
            metafits_dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn out_of_range_channel_exits_2() {
    let subfile_dir = tempdir().unwrap();
    let subfile = make_subfile(subfile_dir.path(), "1234567890.sub");

    for chan in ["0", "25"] {
        // The metafits directory doesn't even exist; the channel check comes
        // before any file I/O.
        mwax_update_sub_header()
            .args([
                "--subfilename",
                subfile.to_str().unwrap(),
                "--chan",
                chan,
                "--metafits_directory",
                "/does/not/exist",
            ])
            .assert()
            .failure()
            .code(2);
    }
}

#[test]
fn no_usable_metafits_exits_3() {
    let metafits_dir = tempdir().unwrap();
    // Only a metafits from after the sub-observation.
    make_metafits(
        &metafits_dir.path().join("1234567999_metafits.fits"),
        1234567999,
    );

    let subfile_dir = tempdir().unwrap();
    let subfile = make_subfile(subfile_dir.path(), "1234567890.sub");

    mwax_update_sub_header()
        .args([
            "--subfilename",
            subfile.to_str().unwrap(),
            "--chan",
            "1",
            "--metafits_directory",
            metafits_dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn badly_named_subfile_exits_3() {
    let metafits_dir = tempdir().unwrap();
    make_metafits(
        &metafits_dir.path().join("1234567800_metafits.fits"),
        1234567800,
    );

    let subfile_dir = tempdir().unwrap();
    let subfile = make_subfile(subfile_dir.path(), "observation.sub");

    mwax_update_sub_header()
        .args([
            "--subfilename",
            subfile.to_str().unwrap(),
            "--chan",
            "1",
            "--metafits_directory",
            metafits_dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(3);
}
