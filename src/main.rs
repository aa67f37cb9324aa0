// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The mwax_update_sub_header binary.

use clap::Parser;

use mwax_update_sub_header::{cli::Args, SubHeaderError};

fn main() {
    // We don't return Result from main because it prints the debug
    // representation of the error. The code below prints the "display" or
    // human readable representation of the error instead, and picks the exit
    // code M&C watches for: 1 for a bad subfile path, 2 for a bad channel
    // number, 3 for everything else.
    if let Err(e) = Args::parse().run() {
        eprintln!("Error: {e}");
        let code = match e {
            SubHeaderError::SubfileDoesNotExist(_) => 1,
            SubHeaderError::BadChannelNumber { .. } => 2,
            _ => 3,
        };
        std::process::exit(code);
    }
}
