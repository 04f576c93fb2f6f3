//! The module responsible for writing output data to disk.
use crate::calculator::{CalculatorInputs, CalculatorOutputs};
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which scenario-file-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "parcelsim_results";

/// The output file name for calculator results
const RESULTS_FILE_NAME: &str = "results.csv";

/// Get the default output directory for the specified scenarios file
pub fn get_output_dir(scenarios_path: &Path) -> Result<PathBuf> {
    let name = scenarios_path
        .file_stem()
        .context("Scenarios path has no file name")?
        .to_str()
        .context("Invalid chars in scenarios file name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, name].iter().collect())
}

/// Create a new output directory, optionally deleting an existing one.
///
/// # Returns
///
/// Whether an existing directory was overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the results CSV file.
///
/// This will be written along with the [`CalculatorInputs`] for the row.
#[derive(Serialize, Debug, PartialEq)]
struct ResultRow {
    monthly_gross_income: f64,
    monthly_operator_profit: f64,
    monthly_investor_profit: f64,
    monthly_net_flow: f64,
    adjusted_investment: f64,
    net_present_value_millions: f64,
    internal_rate_of_return_percent: f64,
    payback_months: Option<u32>,
}

impl From<&CalculatorOutputs> for ResultRow {
    fn from(outputs: &CalculatorOutputs) -> Self {
        Self {
            monthly_gross_income: outputs.monthly_gross_income.value(),
            monthly_operator_profit: outputs.monthly_operator_profit.value(),
            monthly_investor_profit: outputs.monthly_investor_profit.value(),
            monthly_net_flow: outputs.monthly_net_flow.value(),
            adjusted_investment: outputs.adjusted_investment.value(),
            net_present_value_millions: outputs.net_present_value_millions,
            internal_rate_of_return_percent: outputs.internal_rate_of_return_percent,
            payback_months: outputs.payback.months(),
        }
    }
}

/// An object for writing calculator results to file
pub struct ResultsWriter {
    writer: csv::Writer<File>,
}

impl ResultsWriter {
    /// Open the results CSV file for writing
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where the file will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let file_path = output_path.join(RESULTS_FILE_NAME);
        let writer = csv::Writer::from_path(&file_path)
            .with_context(|| format!("Could not create {}", file_path.display()))?;

        Ok(Self { writer })
    }

    /// Write the results for one scenario
    pub fn write(&mut self, inputs: &CalculatorInputs, outputs: &CalculatorOutputs) -> Result<()> {
        self.writer.serialize((inputs, ResultRow::from(outputs)))?;
        Ok(())
    }

    /// Flush the underlying stream
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
