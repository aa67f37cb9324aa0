// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render subfile header parameters as a PSRDADA-style key-value block and
//! write it over the placeholder header at the start of a subfile.
//!
//! The key order and the 4096-byte length are a stable contract with every
//! downstream consumer of subfiles. The subfile is assumed to be exclusively
//! ours while we write: there is no locking and no staged write, so a process
//! killed mid-write leaves a partially-updated header. Readers are expected
//! to wait for `POPULATED 1` before trusting the contents.

use std::{
    fs::OpenOptions,
    io::{Seek, SeekFrom, Write},
    path::Path,
};

use log::{debug, info};
use thiserror::Error;

use crate::constants::HDR_LEN;
use crate::params::HeaderParams;

/// Render the header block: ASCII `KEY value\n` lines in fixed order, padded
/// with NULs to exactly [`HDR_LEN`] bytes. Identical inputs render
/// byte-identically.
pub fn render_header(params: &HeaderParams) -> Result<Vec<u8>, HeaderError> {
    let HeaderParams {
        obs_id,
        subobs_id,
        mode,
        utc_start,
        obs_offset,
        ntimesamples,
        ninputs,
        ninputs_xgpu,
        int_time_msec,
        fscrunch_factor,
        proj_id,
        exposure_secs,
        coarse_channel,
        corr_coarse_channel,
        unix_time,
        fine_chan_width_hz,
        nfine_chan,
        bandwidth_hz,
    } = params;

    let text = format!(
        "HDR_SIZE {HDR_LEN}\n\
         POPULATED 1\n\
         OBS_ID {obs_id}\n\
         SUBOBS_ID {subobs_id}\n\
         MODE {mode}\n\
         UTC_START {utc_start}\n\
         OBS_OFFSET {obs_offset}\n\
         NBIT 8\n\
         NPOL 2\n\
         NTIMESAMPLES {ntimesamples}\n\
         NINPUTS {ninputs}\n\
         NINPUTS_XGPU {ninputs_xgpu}\n\
         APPLY_PATH_WEIGHTS 0\n\
         APPLY_PATH_DELAYS 0\n\
         INT_TIME_MSEC {int_time_msec}\n\
         FSCRUNCH_FACTOR {fscrunch_factor}\n\
         APPLY_VIS_WEIGHTS 0\n\
         TRANSFER_SIZE 5269094400\n\
         PROJ_ID {proj_id}\n\
         EXPOSURE_SECS {exposure_secs}\n\
         COARSE_CHANNEL {coarse_channel}\n\
         CORR_COARSE_CHANNEL {corr_coarse_channel}\n\
         SECS_PER_SUBOBS 8\n\
         UNIXTIME {unix_time}\n\
         UNIXTIME_MSEC 0\n\
         FINE_CHAN_WIDTH_HZ {fine_chan_width_hz}\n\
         NFINE_CHAN {nfine_chan}\n\
         BANDWIDTH_HZ {bandwidth_hz}\n\
         SAMPLE_RATE 1280000\n\
         MC_IP 0.0.0.0\n\
         MC_PORT 0\n"
    );

    if text.len() > HDR_LEN {
        return Err(HeaderError::HeaderTooBig { len: text.len() });
    }
    debug!("New header ({} bytes before padding):\n{text}", text.len());

    let mut block = text.into_bytes();
    block.resize(HDR_LEN, 0);
    Ok(block)
}

/// Overwrite the first [`HDR_LEN`] bytes of `subfile` with the rendered
/// header. The subfile must already exist and be at least [`HDR_LEN`] bytes;
/// nothing at or beyond that offset is touched.
pub fn write_header(subfile: &Path, params: &HeaderParams) -> Result<(), HeaderError> {
    let block = render_header(params)?;

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(subfile)
        .map_err(|err| HeaderError::Open {
            subfile: subfile.to_path_buf().into_boxed_path(),
            err,
        })?;
    let len = file.metadata()?.len();
    if len < HDR_LEN as u64 {
        return Err(HeaderError::SubfileTooSmall {
            subfile: subfile.to_path_buf().into_boxed_path(),
            len,
        });
    }

    file.seek(SeekFrom::Start(0))?;
    file.write_all(&block)?;

    info!("Updated {} with new header", subfile.display());
    Ok(())
}

#[derive(Error, Debug)]
pub enum HeaderError {
    /// The rendered key-value lines alone exceed the fixed header region;
    /// real fields must never be silently truncated.
    #[error("Rendered header is {len} bytes; it doesn't fit the fixed 4096-byte header region")]
    HeaderTooBig { len: usize },

    #[error("Couldn't open subfile {subfile} for updating: {err}")]
    Open {
        subfile: Box<Path>,
        err: std::io::Error,
    },

    /// A subfile smaller than the header region was never written by the
    /// capture pipeline; refuse rather than grow it.
    #[error("Subfile {subfile} is {len} bytes, smaller than the 4096-byte header region")]
    SubfileTooSmall { subfile: Box<Path>, len: u64 },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use tempfile::tempdir;

    use crate::metafits::MetafitsObs;

    use super::*;

    fn test_params() -> HeaderParams {
        let obs = MetafitsObs {
            gpstime: 1234567800,
            mode: "MWAX_CORRELATOR".to_string(),
            datestrt: "2019-02-21T23:29:42".to_string(),
            ninputs: 256,
            finechan: 10.0,
            inttime: 0.5,
            project: "G0060".to_string(),
            exposure: 592,
            goodtime: 1550705405.0,
            quacktim: 4.0,
            nav_freq: 4,
            bandwidth: 1.28,
            receiver_channels: "109".to_string(),
            correlator_channels: "0".to_string(),
            num_rf_inputs: 256,
        };
        HeaderParams::derive(&obs, 1234567890, 1, 250).unwrap()
    }

    #[test]
    fn rendered_header_is_exactly_4096_bytes() {
        let block = render_header(&test_params()).unwrap();
        assert_eq!(block.len(), HDR_LEN);
    }

    #[test]
    fn rendering_is_idempotent() {
        let params = test_params();
        assert_eq!(render_header(&params).unwrap(), render_header(&params).unwrap());
    }

    #[test]
    fn rendered_lines_and_padding() {
        let block = render_header(&test_params()).unwrap();
        let text_end = block.iter().position(|&b| b == 0).unwrap();
        assert!(block[text_end..].iter().all(|&b| b == 0));

        let text = std::str::from_utf8(&block[..text_end]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "HDR_SIZE 4096");
        assert_eq!(lines[1], "POPULATED 1");
        assert_eq!(lines[2], "OBS_ID 1234567800");
        assert_eq!(lines[3], "SUBOBS_ID 1234567890");
        assert_eq!(lines[4], "MODE MWAX_CORRELATOR");
        assert_eq!(lines[5], "UTC_START 2019-02-21-23:29:42");
        assert_eq!(lines[6], "OBS_OFFSET 90");
        assert_eq!(lines.last().unwrap(), &"MC_PORT 0");
        assert_eq!(lines.len(), 31);
    }

    #[test]
    fn oversized_content_is_an_error() {
        let mut params = test_params();
        params.mode = "X".repeat(HDR_LEN);
        assert!(matches!(
            render_header(&params),
            Err(HeaderError::HeaderTooBig { .. })
        ));
    }

    #[test]
    fn write_leaves_payload_untouched() {
        let dir = tempdir().unwrap();
        let subfile = dir.path().join("1234567890.sub");
        std::fs::write(&subfile, vec![0xAB; 2 * HDR_LEN]).unwrap();

        write_header(&subfile, &test_params()).unwrap();

        let mut contents = vec![];
        std::fs::File::open(&subfile)
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        assert_eq!(contents.len(), 2 * HDR_LEN);
        assert!(contents[..HDR_LEN].starts_with(b"HDR_SIZE 4096\n"));
        assert!(contents[HDR_LEN..].iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn too_small_subfile_is_rejected() {
        let dir = tempdir().unwrap();
        let subfile = dir.path().join("1234567890.sub");
        std::fs::write(&subfile, vec![0u8; HDR_LEN - 1]).unwrap();

        let result = write_header(&subfile, &test_params());
        assert!(matches!(result, Err(HeaderError::SubfileTooSmall { .. })));
    }

    #[test]
    fn missing_subfile_is_rejected() {
        let dir = tempdir().unwrap();
        let subfile = dir.path().join("1234567890.sub");
        let result = write_header(&subfile, &test_params());
        assert!(matches!(result, Err(HeaderError::Open { .. })));
    }
}
