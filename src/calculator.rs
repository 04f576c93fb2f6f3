//! The financial projection calculator.
//!
//! [`compute`] maps a [`CalculatorInputs`] to a [`CalculatorOutputs`] through a fixed pipeline:
//!
//! 1. Monthly gross income from the leased area and unit value
//! 2. Operator/investor profit split
//! 3. NPV of the net monthly flow over a fixed horizon, less the scaled investment
//! 4. Displayed IRR, taken from a lookup table (see [`CalculatorParameters::irr_base_rates`])
//! 5. Payback period in months
//!
//! The function is pure: the same inputs and parameters always give the same outputs.
use crate::finance::{
    Payback, internal_rate_of_return, monthly_rate, payback_period, present_value_of_monthly_flow,
};
use crate::parameters::CalculatorParameters;
use crate::units::{Area, Dimensionless, Money, MoneyPerMonth, Month, UnitValue};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::iter;

/// Money per million, for expressing the NPV
const MILLION: f64 = 1_000_000.0;

/// Months per year, for annualising the solved IRR
const MONTHS_PER_YEAR: f64 = 12.0;

/// The investment scenario supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculatorInputs {
    /// Number of land parcels in the scenario
    pub parcel_count: u32,
    /// Reference units per square metre per month
    pub unit_value: UnitValue,
    /// Average surface area per parcel in square metres
    pub average_area: Area,
    /// Annual discount rate in percent (e.g. 15 means 15%)
    pub discount_rate_percent: f64,
}

impl Default for CalculatorInputs {
    fn default() -> Self {
        Self {
            parcel_count: 100,
            unit_value: UnitValue(0.01),
            average_area: Area(10_000.0),
            discount_rate_percent: 15.0,
        }
    }
}

/// A change to some subset of the inputs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[allow(missing_docs)]
pub struct InputsUpdate {
    pub parcel_count: Option<u32>,
    pub unit_value: Option<UnitValue>,
    pub average_area: Option<Area>,
    pub discount_rate_percent: Option<f64>,
}

/// Identifies one of the fields of [`CalculatorInputs`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs)]
pub enum InputField {
    ParcelCount,
    UnitValue,
    AverageArea,
    DiscountRatePercent,
}

/// Indicates that a calculator input was rejected
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display)]
#[display("Invalid value for {field}: {value} ({reason})")]
pub struct InvalidInput {
    /// The offending field
    pub field: InputField,
    /// The rejected value
    pub value: f64,
    /// Why the value was rejected
    pub reason: &'static str,
}

impl Error for InvalidInput {}

/// Check that a value is finite and greater than zero
fn check_positive(field: InputField, value: f64) -> Result<(), InvalidInput> {
    if !value.is_finite() {
        return Err(InvalidInput {
            field,
            value,
            reason: "must be finite",
        });
    }
    if value <= 0.0 {
        return Err(InvalidInput {
            field,
            value,
            reason: "must be greater than zero",
        });
    }

    Ok(())
}

impl CalculatorInputs {
    /// Check that the inputs describe a valid scenario.
    ///
    /// The discount rate may be zero but not negative.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.parcel_count == 0 {
            return Err(InvalidInput {
                field: InputField::ParcelCount,
                value: 0.0,
                reason: "must be greater than zero",
            });
        }
        check_positive(InputField::UnitValue, self.unit_value.value())?;
        check_positive(InputField::AverageArea, self.average_area.value())?;

        let rate = self.discount_rate_percent;
        if !rate.is_finite() || rate < 0.0 {
            return Err(InvalidInput {
                field: InputField::DiscountRatePercent,
                value: rate,
                reason: "must be a finite, non-negative percentage",
            });
        }

        Ok(())
    }

    /// Return a copy of these inputs with the fields present in `update` replaced
    pub fn with_update(&self, update: &InputsUpdate) -> Self {
        Self {
            parcel_count: update.parcel_count.unwrap_or(self.parcel_count),
            unit_value: update.unit_value.unwrap_or(self.unit_value),
            average_area: update.average_area.unwrap_or(self.average_area),
            discount_rate_percent: update
                .discount_rate_percent
                .unwrap_or(self.discount_rate_percent),
        }
    }

    /// Total leased area across all parcels
    pub fn total_area(&self) -> Area {
        Dimensionless(self.parcel_count as f64) * self.average_area
    }
}

/// The derived financial indicators for a scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculatorOutputs {
    /// Rent across the whole leased area
    pub monthly_gross_income: MoneyPerMonth,
    /// The operator's share of the gross income
    pub monthly_operator_profit: MoneyPerMonth,
    /// The investors' share of the operator's profit
    pub monthly_investor_profit: MoneyPerMonth,
    /// Operator profit after the investors' share
    pub monthly_net_flow: MoneyPerMonth,
    /// Base investment scaled by parcel count
    pub adjusted_investment: Money,
    /// NPV in millions, rounded to the nearest million
    pub net_present_value_millions: f64,
    /// Displayed annual IRR in percent.
    ///
    /// NB: This is a lookup heuristic and not the root of the NPV equation. See
    /// [`solved_irr_percent`] for the latter.
    pub internal_rate_of_return_percent: f64,
    /// Months until the adjusted investment is recovered from the net flow
    pub payback: Payback,
}

/// Investment scaled linearly from the reference parcel count
fn adjusted_investment(parcel_count: u32, params: &CalculatorParameters) -> Money {
    let scale = parcel_count as f64 / params.reference_parcel_count as f64;
    params.base_investment * Dimensionless(scale)
}

/// Round to the nearest integer, with exact halves going towards positive infinity
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Displayed IRR: base rate for the parcel count plus a rounded unit value adjustment
fn displayed_irr_percent(inputs: &CalculatorInputs, params: &CalculatorParameters) -> f64 {
    let adjustment = round_half_up(
        (inputs.unit_value - params.irr_reference_unit_value).value()
            * params.irr_unit_value_sensitivity,
    );
    params.irr_base_rate(inputs.parcel_count) + adjustment
}

/// Calculate the financial indicators for a scenario.
///
/// # Arguments
///
/// * `inputs` - The scenario
/// * `params` - Constants for the calculation
///
/// # Returns
///
/// The outputs, or an error identifying the first invalid input field. A scenario whose net
/// flow is not positive is valid and gives [`Payback::NotAchievable`].
pub fn compute(
    inputs: &CalculatorInputs,
    params: &CalculatorParameters,
) -> Result<CalculatorOutputs, InvalidInput> {
    inputs.validate()?;

    // Gross income and profit split
    let monthly_rate_per_area = inputs.unit_value * params.reference_conversion;
    let monthly_gross_income = monthly_rate_per_area * inputs.total_area();
    let monthly_operator_profit = monthly_gross_income * Dimensionless(params.operator_share);
    let monthly_investor_profit = monthly_operator_profit * Dimensionless(params.investor_share);
    let monthly_net_flow = monthly_operator_profit - monthly_investor_profit;

    // NPV
    let adjusted_investment = adjusted_investment(inputs.parcel_count, params);
    let discounted = present_value_of_monthly_flow(
        monthly_net_flow,
        monthly_rate(inputs.discount_rate_percent),
        params.horizon_months,
    );
    let net_present_value_millions =
        round_half_up((discounted - adjusted_investment).value() / MILLION);

    Ok(CalculatorOutputs {
        monthly_gross_income,
        monthly_operator_profit,
        monthly_investor_profit,
        monthly_net_flow,
        adjusted_investment,
        net_present_value_millions,
        internal_rate_of_return_percent: displayed_irr_percent(inputs, params),
        payback: payback_period(adjusted_investment, monthly_net_flow),
    })
}

/// Calculate the financial indicators for a scenario using the default parameters
pub fn compute_default(inputs: &CalculatorInputs) -> Result<CalculatorOutputs, InvalidInput> {
    compute(inputs, &CalculatorParameters::default())
}

/// Solve for the annual IRR of the scenario's actual cash flows.
///
/// The series is the adjusted investment followed by `horizon_months` months of net flow. The
/// monthly rate is annualised by simple multiplication, matching how the discount rate is
/// converted to a monthly rate.
///
/// # Returns
///
/// The IRR in percent, or `None` if the investment is not recovered within the horizon.
pub fn solved_irr_percent(
    inputs: &CalculatorInputs,
    params: &CalculatorParameters,
) -> Result<Option<f64>, InvalidInput> {
    let outputs = compute(inputs, params)?;
    let monthly_return = outputs.monthly_net_flow * Month(1.0);
    let cash_flows: Vec<_> = iter::once(Money(0.0) - outputs.adjusted_investment)
        .chain(iter::repeat_n(
            monthly_return,
            params.horizon_months as usize,
        ))
        .collect();

    Ok(internal_rate_of_return(&cash_flows)
        .map(|rate| rate.value() * MONTHS_PER_YEAR * 100.0))
}
