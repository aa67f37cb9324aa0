// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed quantities of the MWAX correlator pipeline.

/// The number of correlator coarse channels (and hence MWAX server boxes).
pub const MAX_COARSE_CHAN: u32 = 24;

/// The width of an ultrafine channel \[Hz\]; the critically-sampled output of
/// the second-stage PFB.
pub const ULTRAFINE_WIDTH_HZ: u64 = 250;

/// The byte length of the header region at the start of every subfile. Fixed;
/// downstream consumers depend on it.
pub const HDR_LEN: usize = 4096;

/// xGPU processes correlation inputs in blocks of this size.
pub const XGPU_INPUT_BLOCK: usize = 16;
