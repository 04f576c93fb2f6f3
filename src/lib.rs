//! Projections of returns on land parcel investment scenarios.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod calculator;
pub mod cli;
pub mod finance;
pub mod format;
pub mod input;
pub mod log;
pub mod output;
pub mod parameters;
pub mod scenario;
pub mod settings;
pub mod simulator;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// Falls back to the current directory if the platform doesn't provide one.
pub fn get_parcelsim_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        return PathBuf::from(".");
    };
    dir.push("parcelsim");
    dir
}
