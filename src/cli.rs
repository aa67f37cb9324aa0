// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code.
//!
//! The flag names deliberately match the original M&C deployment
//! (`--subfilename`, `--chan`, `--metafits_directory`) so the binary is a
//! drop-in replacement for existing pipeline configuration.

use std::fs::OpenOptions;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::constants::{MAX_COARSE_CHAN, ULTRAFINE_WIDTH_HZ};
use crate::{update_sub_header, SubHeaderError};

#[derive(Parser, Debug)]
#[clap(name = "mwax_update_sub_header", version, about)]
pub struct Args {
    /// MWAX high time resolution subfile to update, named <gpstime>.sub.
    #[clap(long = "subfilename")]
    pub subfilename: PathBuf,

    /// Correlator coarse channel number (1-24).
    #[clap(long = "chan")]
    pub chan: u32,

    /// Directory containing metafits files (usually /vulcan/metafits/).
    #[clap(long = "metafits_directory")]
    pub metafits_directory: PathBuf,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    pub verbosity: u8,
}

impl Args {
    /// Validate the arguments and run the pipeline.
    pub fn run(self) -> Result<(), SubHeaderError> {
        setup_logging(self.verbosity).expect("Failed to initialise logging.");
        info!(
            "mwax_update_sub_header {} starting...",
            env!("CARGO_PKG_VERSION")
        );

        // Both checks happen before any metafits is touched. The channel
        // check needs no I/O at all.
        if self.chan < 1 || self.chan > MAX_COARSE_CHAN {
            return Err(SubHeaderError::BadChannelNumber { chan: self.chan });
        }
        if !subfile_is_readable(&self.subfilename) {
            return Err(SubHeaderError::SubfileDoesNotExist(self.subfilename));
        }

        update_sub_header(
            &self.subfilename,
            self.chan,
            &self.metafits_directory,
            ULTRAFINE_WIDTH_HZ,
        )?;

        info!("mwax_update_sub_header complete.");
        Ok(())
    }
}

fn subfile_is_readable(subfile: &std::path::Path) -> bool {
    subfile.exists() && OpenOptions::new().read(true).open(subfile).is_ok()
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.init();

    Ok(())
}
