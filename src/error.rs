// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all mwax_update_sub_header-related errors. This should be
//! the *only* error enum that is publicly visible.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    constants::MAX_COARSE_CHAN, fits::FitsError, header::HeaderError, locate::LocateError,
    params::ParamsError,
};

#[derive(Error, Debug)]
pub enum SubHeaderError {
    /// The subfile named on the command line isn't there (or can't be read).
    /// Checked before anything else touches the filesystem.
    #[error("Subfile {0} does not exist or is not readable")]
    SubfileDoesNotExist(PathBuf),

    /// The correlator coarse-channel number is outside 1..=24.
    #[error("Channel number {chan} is not valid (should be 1-{MAX_COARSE_CHAN})")]
    BadChannelNumber { chan: u32 },

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Fits(#[from] FitsError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Header(#[from] HeaderError),
}
