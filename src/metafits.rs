// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to handle reading from MWA metafits files.
//!
//! Only the keys needed for the subfile header are read; the metafits is
//! never written to.

use std::path::Path;

use log::debug;

use crate::fits::{
    fits_get_num_rows, fits_get_required_key, fits_get_required_key_long_string, fits_open,
    fits_open_hdu, FitsError,
};

/// The observation parameters pulled from a metafits file's primary HDU, plus
/// the row count of its TILEDATA table. Populated once, read-only thereafter.
#[derive(Debug, Clone)]
pub struct MetafitsObs {
    /// GPS time of the observation start \[s\]; this is the obsid.
    pub gpstime: i64,
    /// Observation mode, e.g. MWAX_CORRELATOR.
    pub mode: String,
    /// UTC date and time of the start of correlation, `YYYY-MM-DDThh:mm:ss`.
    pub datestrt: String,
    /// Number of inputs into the correlation products, as recorded in the
    /// primary HDU. The TILEDATA row count (`num_rf_inputs`) is what the
    /// subfile header reports.
    pub ninputs: u32,
    /// Fine-channel width \[kHz\].
    pub finechan: f64,
    /// Individual integration time \[s\].
    pub inttime: f64,
    /// Project id.
    pub project: String,
    /// Duration of the observation \[s\].
    pub exposure: i64,
    /// Obsid + quack time, as a Unix timestamp \[s\].
    pub goodtime: f64,
    /// Seconds of bad data after the observation starts.
    pub quacktim: f64,
    /// Assumed frequency-averaging factor.
    pub nav_freq: u32,
    /// Total bandwidth of the observation \[MHz\].
    pub bandwidth: f64,
    /// Comma-separated receiver coarse-channel numbers.
    pub receiver_channels: String,
    /// Comma-separated correlator coarse-channel numbers.
    pub correlator_channels: String,
    /// Row count of the TILEDATA table: tiles × polarisations.
    pub num_rf_inputs: usize,
}

impl MetafitsObs {
    /// Read the observation parameters out of a metafits file. Any missing
    /// key is an error naming that key.
    pub fn read(metafits: &Path) -> Result<MetafitsObs, FitsError> {
        let mut fptr = fits_open(metafits)?;
        let hdu = fits_open_hdu(&mut fptr, 0)?;

        let obs = MetafitsObs {
            gpstime: fits_get_required_key(&mut fptr, &hdu, "GPSTIME")?,
            mode: fits_get_required_key(&mut fptr, &hdu, "MODE")?,
            datestrt: fits_get_required_key(&mut fptr, &hdu, "DATESTRT")?,
            ninputs: fits_get_required_key(&mut fptr, &hdu, "NINPUTS")?,
            finechan: fits_get_required_key(&mut fptr, &hdu, "FINECHAN")?,
            inttime: fits_get_required_key(&mut fptr, &hdu, "INTTIME")?,
            project: fits_get_required_key(&mut fptr, &hdu, "PROJECT")?,
            exposure: fits_get_required_key(&mut fptr, &hdu, "EXPOSURE")?,
            goodtime: fits_get_required_key(&mut fptr, &hdu, "GOODTIME")?,
            quacktim: fits_get_required_key(&mut fptr, &hdu, "QUACKTIM")?,
            nav_freq: fits_get_required_key(&mut fptr, &hdu, "NAV_FREQ")?,
            bandwidth: fits_get_required_key(&mut fptr, &hdu, "BANDWDTH")?,
            // The channel lists can overflow a single card; read them as FITS
            // long strings.
            receiver_channels: fits_get_required_key_long_string(&mut fptr, &hdu, "CHANNELS")?,
            correlator_channels: fits_get_required_key_long_string(&mut fptr, &hdu, "CHANSEL")?,
            num_rf_inputs: {
                let tile_table = fits_open_hdu(&mut fptr, 1)?;
                fits_get_num_rows(&fptr, &tile_table)?
            },
        };
        debug!("Read from {}: {obs:?}", metafits.display());
        Ok(obs)
    }
}
