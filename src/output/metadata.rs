//! Code for writing metadata to file
use crate::parameters::CalculatorParameters;
use anyhow::Result;
use chrono::prelude::*;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Information about the program build via `built` crate
#[allow(clippy::doc_markdown)]
#[allow(clippy::needless_raw_string_hashes)]
mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Get information about program version from git
fn get_git_hash() -> String {
    let Some(hash) = built_info::GIT_COMMIT_HASH_SHORT else {
        return "unknown".into();
    };

    if built_info::GIT_DIRTY == Some(true) {
        format!("{hash}-dirty")
    } else {
        hash.into()
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    parameters: ParametersMetadata,
    program: ProgramMetadata<'a>,
    platform: PlatformMetadata,
}

/// Information about the batch run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the scenarios file which was evaluated
    scenarios_path: &'a Path,
    /// Path to the parameters file, if one was used
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters_path: Option<&'a Path>,
    /// The date and time on which the run started
    datetime: String,
}

impl<'a> RunMetadata<'a> {
    fn new(scenarios_path: &'a Path, parameters_path: Option<&'a Path>) -> Self {
        let dt = Local::now();
        Self {
            scenarios_path,
            parameters_path,
            datetime: dt.to_rfc2822(),
        }
    }
}

/// The scalar calculator parameters used for the run
#[derive(Serialize)]
struct ParametersMetadata {
    reference_conversion: f64,
    operator_share: f64,
    investor_share: f64,
    base_investment: f64,
    reference_parcel_count: u32,
    horizon_months: u32,
}

impl From<&CalculatorParameters> for ParametersMetadata {
    fn from(params: &CalculatorParameters) -> Self {
        Self {
            reference_conversion: params.reference_conversion.value(),
            operator_share: params.operator_share,
            investor_share: params.investor_share,
            base_investment: params.base_investment.value(),
            reference_parcel_count: params.reference_parcel_count,
            horizon_months: params.horizon_months,
        }
    }
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// The target architecture for the build (e.g. x86_64-unknown-linux-gnu)
    target: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
    /// The version of rustc used to compile parcelsim
    rustc_version: &'a str,
    /// When parcelsim was built
    build_time_utc: &'a str,
    /// The git commit hash for the version of parcelsim (if known)
    git_commit_hash: String,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: get_git_hash(),
        }
    }
}

/// Information about the platform on which parcelsim is running.
///
/// The fields correspond to different data available from the [`PlatformInfo`] struct.
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    nodename: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn new() -> Result<Self> {
        let info = PlatformInfo::new().map_err(|err| anyhow::anyhow!("{err}"))?;
        Ok(Self {
            sysname: info.sysname().to_string_lossy().into(),
            nodename: info.nodename().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            version: info.version().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        })
    }
}

/// Write metadata to the specified output path in TOML format
pub fn write_metadata(
    output_path: &Path,
    scenarios_path: &Path,
    parameters_path: Option<&Path>,
    params: &CalculatorParameters,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata::new(scenarios_path, parameters_path),
        parameters: params.into(),
        program: ProgramMetadata::default(),
        platform: PlatformMetadata::new()?,
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}
