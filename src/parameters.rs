//! Defines the `CalculatorParameters` struct, which holds the constants of the projection pipeline.
//!
//! These can be overridden by a TOML file in which every field is optional.
use crate::input::{deserialise_proportion_nonzero, input_err_msg, read_toml};
use crate::units::{Money, MoneyPerUnitValue, UnitValue};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;
use std::path::Path;

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_unit_param_default!(default_reference_conversion, MoneyPerUnitValue, 35_000.0);
define_unit_param_default!(default_base_investment, Money, 960_000_000.0);
define_unit_param_default!(default_irr_reference_unit_value, UnitValue, 0.01);
define_param_default!(default_operator_share, f64, 0.20);
define_param_default!(default_investor_share, f64, 0.10);
define_param_default!(default_reference_parcel_count, u32, 100);
define_param_default!(default_horizon_months, u32, 60);
define_param_default!(default_irr_base_rate, f64, 40.0);
define_param_default!(default_irr_unit_value_sensitivity, f64, 500.0);

fn default_irr_base_rates() -> Vec<IrrBaseRate> {
    [(100, 40.0), (200, 50.0), (300, 60.0), (400, 65.0)]
        .into_iter()
        .map(|(parcel_count, rate_percent)| IrrBaseRate {
            parcel_count,
            rate_percent,
        })
        .collect()
}

/// The displayed IRR for a preset number of parcels, before unit value adjustment
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct IrrBaseRate {
    /// Number of parcels this rate applies to
    pub parcel_count: u32,
    /// Annual rate in percent
    pub rate_percent: f64,
}

/// The raw contents of a parameters file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CalculatorParametersRaw {
    #[serde(default = "default_reference_conversion")]
    reference_conversion: MoneyPerUnitValue,
    #[serde(default = "default_operator_share")]
    #[serde(deserialize_with = "deserialise_proportion_nonzero")]
    operator_share: f64,
    #[serde(default = "default_investor_share")]
    #[serde(deserialize_with = "deserialise_proportion_nonzero")]
    investor_share: f64,
    #[serde(default = "default_base_investment")]
    base_investment: Money,
    #[serde(default = "default_reference_parcel_count")]
    reference_parcel_count: u32,
    #[serde(default = "default_horizon_months")]
    horizon_months: u32,
    #[serde(default = "default_irr_base_rates")]
    irr_base_rates: Vec<IrrBaseRate>,
    #[serde(default = "default_irr_base_rate")]
    default_irr_base_rate: f64,
    #[serde(default = "default_irr_reference_unit_value")]
    irr_reference_unit_value: UnitValue,
    #[serde(default = "default_irr_unit_value_sensitivity")]
    irr_unit_value_sensitivity: f64,
}

/// Constants used by the calculator.
///
/// The defaults are the figures used for the published scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorParameters {
    /// Base currency per reference unit (e.g. pesos per UF)
    pub reference_conversion: MoneyPerUnitValue,
    /// Share of gross income kept by the operator
    pub operator_share: f64,
    /// Share of the operator's profit paid out to investors
    pub investor_share: f64,
    /// Investment required at `reference_parcel_count` parcels
    pub base_investment: Money,
    /// Number of parcels which `base_investment` corresponds to
    pub reference_parcel_count: u32,
    /// Number of months of cash flow included in the NPV
    pub horizon_months: u32,
    /// Displayed IRR, keyed by parcel count.
    ///
    /// This is a presentation heuristic rather than a solution of the NPV equation.
    pub irr_base_rates: IndexMap<u32, f64>,
    /// Displayed IRR for parcel counts missing from `irr_base_rates`
    pub default_irr_base_rate: f64,
    /// Unit value at which the IRR receives no adjustment
    pub irr_reference_unit_value: UnitValue,
    /// Percentage points of IRR per reference unit above `irr_reference_unit_value`
    pub irr_unit_value_sensitivity: f64,
}

impl Default for CalculatorParameters {
    fn default() -> Self {
        Self {
            reference_conversion: default_reference_conversion(),
            operator_share: default_operator_share(),
            investor_share: default_investor_share(),
            base_investment: default_base_investment(),
            reference_parcel_count: default_reference_parcel_count(),
            horizon_months: default_horizon_months(),
            irr_base_rates: default_irr_base_rates()
                .into_iter()
                .map(|rate| (rate.parcel_count, rate.rate_percent))
                .collect(),
            default_irr_base_rate: default_irr_base_rate(),
            irr_reference_unit_value: default_irr_reference_unit_value(),
            irr_unit_value_sensitivity: default_irr_unit_value_sensitivity(),
        }
    }
}

/// Check that a monetary constant is usable
fn check_positive_money(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "{name} must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that each parcel count in the IRR table appears once
fn check_irr_base_rates(rates: &[IrrBaseRate]) -> Result<()> {
    if let Some(duplicate) = rates.iter().map(|rate| rate.parcel_count).duplicates().next() {
        bail!("Parcel count {duplicate} appears more than once in irr_base_rates");
    }

    for rate in rates {
        ensure!(
            rate.rate_percent.is_finite(),
            "IRR base rate for {} parcels must be finite",
            rate.parcel_count
        );
    }

    Ok(())
}

impl CalculatorParametersRaw {
    /// Validate the raw parameters and convert them
    fn into_parameters(self) -> Result<CalculatorParameters> {
        // operator_share and investor_share already validated with deserialise_proportion_nonzero
        check_positive_money("reference_conversion", self.reference_conversion.value())?;
        check_positive_money("base_investment", self.base_investment.value())?;
        ensure!(
            self.reference_parcel_count > 0,
            "reference_parcel_count cannot be zero"
        );
        ensure!(self.horizon_months > 0, "horizon_months cannot be zero");
        check_irr_base_rates(&self.irr_base_rates)?;
        ensure!(
            self.default_irr_base_rate.is_finite()
                && self.irr_reference_unit_value.is_finite()
                && self.irr_unit_value_sensitivity.is_finite(),
            "IRR adjustment parameters must be finite"
        );

        Ok(CalculatorParameters {
            reference_conversion: self.reference_conversion,
            operator_share: self.operator_share,
            investor_share: self.investor_share,
            base_investment: self.base_investment,
            reference_parcel_count: self.reference_parcel_count,
            horizon_months: self.horizon_months,
            irr_base_rates: self
                .irr_base_rates
                .into_iter()
                .map(|rate| (rate.parcel_count, rate.rate_percent))
                .collect(),
            default_irr_base_rate: self.default_irr_base_rate,
            irr_reference_unit_value: self.irr_reference_unit_value,
            irr_unit_value_sensitivity: self.irr_unit_value_sensitivity,
        })
    }
}

impl CalculatorParameters {
    /// Read calculator parameters from a TOML file.
    ///
    /// Fields missing from the file take their default values.
    pub fn from_path(file_path: &Path) -> Result<CalculatorParameters> {
        let raw: CalculatorParametersRaw = read_toml(file_path)?;
        raw.into_parameters()
            .with_context(|| input_err_msg(file_path))
    }

    /// Read parameters from `file_path` if provided, otherwise use the defaults
    pub fn load(file_path: Option<&Path>) -> Result<CalculatorParameters> {
        file_path.map_or_else(|| Ok(Self::default()), Self::from_path)
    }

    /// The displayed IRR before adjustment for a given number of parcels
    pub fn irr_base_rate(&self, parcel_count: u32) -> f64 {
        self.irr_base_rates
            .get(&parcel_count)
            .copied()
            .unwrap_or(self.default_irr_base_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn parse(contents: &str) -> Result<CalculatorParameters> {
        let raw: CalculatorParametersRaw = toml::from_str(contents)?;
        raw.into_parameters()
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), CalculatorParameters::default());
    }

    #[rstest]
    #[case(100, 40.0)]
    #[case(200, 50.0)]
    #[case(300, 60.0)]
    #[case(400, 65.0)]
    #[case(150, 40.0)] // Falls back to default
    #[case(1000, 40.0)]
    fn test_irr_base_rate(#[case] parcel_count: u32, #[case] expected: f64) {
        let params = CalculatorParameters::default();
        assert_eq!(params.irr_base_rate(parcel_count), expected);
    }

    #[test]
    fn test_override_irr_table() {
        let params = parse(
            "default_irr_base_rate = 30.0

[[irr_base_rates]]
parcel_count = 50
rate_percent = 35.0
",
        )
        .unwrap();
        assert_eq!(params.irr_base_rate(50), 35.0);
        assert_eq!(params.irr_base_rate(100), 30.0);
    }

    #[test]
    fn test_duplicate_irr_parcel_count() {
        assert_error!(
            parse(
                "[[irr_base_rates]]
parcel_count = 100
rate_percent = 40.0

[[irr_base_rates]]
parcel_count = 100
rate_percent = 45.0
"
            ),
            "Parcel count 100 appears more than once in irr_base_rates"
        );
    }

    #[rstest]
    #[case("reference_conversion = 0.0", "reference_conversion must be a finite number greater than zero")]
    #[case("base_investment = -1.0", "base_investment must be a finite number greater than zero")]
    #[case("reference_parcel_count = 0", "reference_parcel_count cannot be zero")]
    #[case("horizon_months = 0", "horizon_months cannot be zero")]
    fn test_invalid_parameters(#[case] contents: &str, #[case] msg: &str) {
        assert_error!(parse(contents), msg);
    }

    #[rstest]
    #[case("operator_share = 0.0")]
    #[case("investor_share = 1.5")]
    #[case("unknown_field = 1")]
    fn test_unparseable_parameters(#[case] contents: &str) {
        assert!(parse(contents).is_err());
    }

    #[test]
    fn test_from_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("parameters.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "horizon_months = 120").unwrap();
        }

        let params = CalculatorParameters::load(Some(&file_path)).unwrap();
        assert_eq!(params.horizon_months, 120);
        assert_eq!(params.base_investment, Money(960_000_000.0));
    }
}
