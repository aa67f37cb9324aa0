// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Derive subfile header parameters from the metafits values.
//!
//! Every division and float-to-int conversion here truncates toward zero;
//! that is the convention the downstream correlator and beamformer code
//! assume, so no rounding-to-nearest is used anywhere.

use chrono::NaiveDateTime;
use log::info;
use thiserror::Error;

use crate::constants::XGPU_INPUT_BLOCK;
use crate::metafits::MetafitsObs;

/// Everything that goes into a subfile header. Derived once per invocation
/// and only ever observable through the serialized header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderParams {
    /// The obsid, i.e. the metafits GPSTIME.
    pub obs_id: i64,
    pub subobs_id: u64,
    pub mode: String,
    /// `YYYY-MM-DD-hh:mm:ss`, reformatted from the metafits DATESTRT.
    pub utc_start: String,
    /// Seconds between the observation start and this sub-observation.
    pub obs_offset: i64,
    pub ntimesamples: u64,
    /// Tiles × polarisations, from the TILEDATA row count.
    pub ninputs: usize,
    /// `ninputs` rounded up to what xGPU will actually correlate.
    pub ninputs_xgpu: usize,
    pub int_time_msec: u64,
    pub fscrunch_factor: u32,
    pub proj_id: String,
    pub exposure_secs: i64,
    /// The receiver coarse-channel number handled by this correlator box.
    pub coarse_channel: String,
    /// The 1-based correlator coarse-channel number.
    pub corr_coarse_channel: u32,
    pub unix_time: i64,
    pub fine_chan_width_hz: u64,
    pub nfine_chan: u64,
    pub bandwidth_hz: u64,
}

impl HeaderParams {
    /// Derive the header fields for sub-observation `subobs_id`, handled by
    /// the 1-based correlator coarse channel `chan`.
    pub fn derive(
        obs: &MetafitsObs,
        subobs_id: u64,
        chan: u32,
        ultrafine_width_hz: u64,
    ) -> Result<HeaderParams, ParamsError> {
        // DATESTRT is ISO-ish ("2021-06-01T12:00:00"); the PSRDADA convention
        // separates date and time with another '-'.
        let utc_start = NaiveDateTime::parse_from_str(&obs.datestrt, "%Y-%m-%dT%H:%M:%S")
            .map_err(|_| ParamsError::BadTimestamp(obs.datestrt.clone()))?
            .format("%Y-%m-%d-%H:%M:%S")
            .to_string();

        // May be negative if the metafits and subfile disagree; passed
        // through as-is.
        let obs_offset = subobs_id as i64 - obs.gpstime;

        let ninputs = obs.num_rf_inputs;
        let ninputs_xgpu = round_up_to_xgpu_block(ninputs);
        if ninputs_xgpu != ninputs {
            info!("xGPU inputs will be rounded up to {ninputs_xgpu}");
        }

        let int_time_msec = (1000.0 * obs.inttime) as u64;
        let unix_time = (obs.goodtime - obs.quacktim) as i64;
        let fine_chan_width_hz = (obs.finechan * 1000.0) as u64;

        let receiver_channels: Vec<&str> = obs.receiver_channels.split(',').collect();
        let correlator_channels: Vec<&str> = obs.correlator_channels.split(',').collect();

        let bandwidth_hz =
            (obs.bandwidth * 1_000_000.0 / correlator_channels.len() as f64) as u64;
        let nfine_chan = bandwidth_hz / fine_chan_width_hz;
        let ntimesamples = bandwidth_hz / ultrafine_width_hz;

        let coarse_channel = match usize::try_from(chan) {
            Ok(i) if (1..=receiver_channels.len()).contains(&i) => {
                receiver_channels[i - 1].to_string()
            }
            _ => {
                return Err(ParamsError::BadChannelIndex {
                    chan,
                    num_receiver_channels: receiver_channels.len(),
                })
            }
        };

        Ok(HeaderParams {
            obs_id: obs.gpstime,
            subobs_id,
            mode: obs.mode.clone(),
            utc_start,
            obs_offset,
            ntimesamples,
            ninputs,
            ninputs_xgpu,
            int_time_msec,
            fscrunch_factor: obs.nav_freq,
            proj_id: obs.project.clone(),
            exposure_secs: obs.exposure,
            coarse_channel,
            corr_coarse_channel: chan,
            unix_time,
            fine_chan_width_hz,
            nfine_chan,
            bandwidth_hz,
        })
    }
}

/// xGPU correlates inputs in blocks of 16; anything else is padded up to the
/// next block.
fn round_up_to_xgpu_block(ninputs: usize) -> usize {
    match ninputs % XGPU_INPUT_BLOCK {
        0 => ninputs,
        r => ninputs + (XGPU_INPUT_BLOCK - r),
    }
}

#[derive(Error, Debug)]
pub enum ParamsError {
    /// DATESTRT didn't look like `YYYY-MM-DDThh:mm:ss`.
    #[error("Couldn't parse metafits DATESTRT {0:?} as YYYY-MM-DDThh:mm:ss")]
    BadTimestamp(String),

    /// The requested coarse channel doesn't exist for this observation.
    #[error("Channel number {chan} is out of range; the metafits lists {num_receiver_channels} receiver channels")]
    BadChannelIndex {
        chan: u32,
        num_receiver_channels: usize,
    },
}
