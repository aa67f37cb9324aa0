// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Populate the PSRDADA header of an MWAX subfile.

MWAX data capture pre-allocates each 8-second subfile with a placeholder
4096-byte header ahead of the voltage payload. Once the observation's metafits
file is available, this crate fills in the real header: it locates the right
metafits for the sub-observation, derives the header parameters from it, and
overwrites the first 4096 bytes of the subfile in place. Downstream readers
wait for the `POPULATED` flag in the header before trusting the file, so the
subfile is assumed to be exclusively ours for the duration of the write.
 */

pub mod cli;
pub mod constants;
mod fits;
pub mod header;
pub mod locate;
pub mod metafits;
pub mod params;

mod error;

pub use error::SubHeaderError;
pub use fits::FitsError;

use std::path::Path;

use crate::{
    header::write_header,
    locate::{locate_metafits, parse_subobs_id},
    metafits::MetafitsObs,
    params::HeaderParams,
};

/// Run the whole pipeline for one subfile: locate the metafits, read it,
/// derive the header parameters and write them back into the subfile.
///
/// `chan` is the 1-based correlator coarse-channel number and must already
/// have been validated against [`constants::MAX_COARSE_CHAN`].
pub fn update_sub_header(
    subfile: &Path,
    chan: u32,
    metafits_dir: &Path,
    ultrafine_width_hz: u64,
) -> Result<(), SubHeaderError> {
    let subobs_id = parse_subobs_id(subfile)?;
    let metafits = locate_metafits(subobs_id, metafits_dir)?;
    let obs = MetafitsObs::read(&metafits)?;
    let params = HeaderParams::derive(&obs, subobs_id, chan, ultrafine_width_hz)?;
    write_header(subfile, &params)?;
    Ok(())
}
