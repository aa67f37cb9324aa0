// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse subfile and metafits filenames, and to find the metafits
//! file matching a sub-observation.
//!
//! An observation's metafits is written when the observation is scheduled, so
//! its obsid is at or before the obsid of any of its sub-observations. Given a
//! directory of metafits files, the right one for a sub-observation is the
//! exact obsid match if present, otherwise the nearest obsid before it.

use std::path::{Path, PathBuf};

use glob::glob;
use log::debug;
use regex::Regex;
use thiserror::Error;

lazy_static::lazy_static! {
    // e.g. "1247842824_metafits" (extension already stripped).
    static ref RE_METAFITS_STEM: Regex = Regex::new(r"^(?P<obsid>\d{10})_metafits$").unwrap();
}

/// Parse the sub-observation id from a subfile path. The base name must be
/// exactly ten ASCII digits, i.e. `<gpstime>.sub`.
pub fn parse_subobs_id(subfile: &Path) -> Result<u64, LocateError> {
    subfile
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| stem.len() == 10 && stem.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|stem| stem.parse().ok())
        .ok_or_else(|| LocateError::BadSubfileName(subfile.to_path_buf()))
}

/// Find the metafits file in `metafits_dir` for the sub-observation
/// `subobs_id`.
///
/// Candidates are scanned in ascending filename order. An exact obsid match is
/// taken immediately; otherwise the last candidate seen with an obsid smaller
/// than `subobs_id` wins, i.e. the largest obsid at or before the
/// sub-observation. `*.fits` files that aren't named like metafits files are
/// skipped, but a `*_metafits.fits` file whose obsid doesn't parse is an
/// error.
pub fn locate_metafits(subobs_id: u64, metafits_dir: &Path) -> Result<PathBuf, LocateError> {
    let pattern = metafits_dir.join("*.fits").display().to_string();
    let mut candidates = vec![];
    for entry in glob(&pattern)? {
        candidates.push(entry?);
    }
    candidates.sort();
    debug!("{} .fits files in {}", candidates.len(), metafits_dir.display());

    let mut contender = None;
    for candidate in candidates {
        let stem = match candidate.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => stem,
            None => continue,
        };
        if !stem.ends_with("_metafits") {
            debug!("{} is not named like a metafits file", candidate.display());
            continue;
        }
        let obsid: u64 = match RE_METAFITS_STEM.captures(stem) {
            Some(caps) => caps["obsid"]
                .parse()
                .map_err(|_| LocateError::BadMetafitsFilename(candidate.clone()))?,
            None => return Err(LocateError::BadMetafitsFilename(candidate)),
        };

        if obsid == subobs_id {
            debug!("Found exact match {}", candidate.display());
            return Ok(candidate);
        } else if obsid < subobs_id {
            debug!("Found contender {}", candidate.display());
            contender = Some(candidate);
        } else {
            debug!(
                "{} is for after sub-observation {subobs_id}",
                candidate.display()
            );
        }
    }

    contender.ok_or_else(|| LocateError::NoMetafitsFound {
        subobs_id,
        dir: metafits_dir.to_path_buf(),
    })
}

#[derive(Error, Debug)]
pub enum LocateError {
    /// The subfile's base name wasn't a 10-digit gpstime.
    #[error("Subfile name {0} is not of the form <10-digit gpstime>.sub")]
    BadSubfileName(PathBuf),

    /// A file ending in `_metafits.fits` whose leading obsid isn't a 10-digit
    /// gpstime.
    #[error("Metafits filename {0} is not of the form <10-digit gpstime>_metafits.fits")]
    BadMetafitsFilename(PathBuf),

    /// Nothing in the directory was usable for the sub-observation.
    #[error("Could not find a metafits file for sub-observation {subobs_id} in {dir}")]
    NoMetafitsFound { subobs_id: u64, dir: PathBuf },

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Glob(#[from] glob::GlobError),
}
