//! General functions related to finance.
use crate::units::{Dimensionless, Money, MoneyPerMonth, Month};
use serde::Serialize;
use std::fmt;

/// Number of months in a year
const MONTHS_PER_YEAR: f64 = 12.0;

/// Maximum number of bisection steps when solving for the internal rate of return
const IRR_MAX_ITERATIONS: u32 = 200;

/// Tolerance on the per-period rate at which the IRR bisection stops
const IRR_TOLERANCE: f64 = 1e-12;

/// The time taken for cumulative net cash flow to recover an investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Payback {
    /// The investment is recovered after this many whole months
    Months(u32),
    /// The net monthly flow is zero or negative, so the investment is never recovered
    NotAchievable,
}

impl Payback {
    /// The number of months to payback, if it is achievable
    pub fn months(self) -> Option<u32> {
        match self {
            Self::Months(months) => Some(months),
            Self::NotAchievable => None,
        }
    }
}

impl fmt::Display for Payback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Months(months) => write!(f, "{months} months"),
            Self::NotAchievable => write!(f, "not achievable"),
        }
    }
}

/// Converts an annual rate expressed as a percentage into a monthly rate
pub fn monthly_rate(annual_percent: f64) -> Dimensionless {
    Dimensionless(annual_percent / 100.0 / MONTHS_PER_YEAR)
}

/// Calculates the present value of a constant monthly cash flow.
///
/// Each of the `horizon_months` flows is received at the end of its month and discounted at
/// `monthly_rate`. The discounted flows are summed one by one rather than through the annuity
/// closed form.
pub fn present_value_of_monthly_flow(
    flow: MoneyPerMonth,
    monthly_rate: Dimensionless,
    horizon_months: u32,
) -> Money {
    let one_month = flow * Month(1.0);
    let growth = Dimensionless(1.0) + monthly_rate;

    let mut total = Money(0.0);
    for month in 1..=horizon_months {
        total += one_month / growth.powi(month as i32);
    }

    total
}

/// Calculates the number of whole months needed to recover `investment` from a constant flow.
///
/// Returns [`Payback::NotAchievable`] if the flow is not positive or the result is not finite.
pub fn payback_period(investment: Money, flow: MoneyPerMonth) -> Payback {
    if flow.value().is_nan() || flow <= MoneyPerMonth(0.0) {
        return Payback::NotAchievable;
    }

    let months = (investment / flow).value().ceil();
    if !months.is_finite() || months > f64::from(u32::MAX) {
        return Payback::NotAchievable;
    }

    Payback::Months(months.max(0.0) as u32)
}

/// Net present value of a series of per-period cash flows, the first of which is undiscounted
fn net_present_value(cash_flows: &[Money], rate: f64) -> f64 {
    cash_flows
        .iter()
        .zip(0..)
        .map(|(flow, period)| flow.value() / (1.0 + rate).powi(period))
        .sum()
}

/// Solves for the per-period internal rate of return of a conventional cash-flow series.
///
/// The first flow is the (negative) investment and the rest are returns. The rate is found by
/// bisection on `[0, 1]`, within which the NPV of such a series decreases monotonically.
///
/// # Returns
///
/// The rate at which NPV is zero, or `None` if the series never breaks even in that interval.
pub fn internal_rate_of_return(cash_flows: &[Money]) -> Option<Dimensionless> {
    let mut low = 0.0;
    let mut high = 1.0;

    let npv_low = net_present_value(cash_flows, low);
    if !npv_low.is_finite() || npv_low < 0.0 || net_present_value(cash_flows, high) > 0.0 {
        return None;
    }

    for _ in 0..IRR_MAX_ITERATIONS {
        let mid = 0.5 * (low + high);
        if net_present_value(cash_flows, mid) > 0.0 {
            low = mid;
        } else {
            high = mid;
        }

        if high - low < IRR_TOLERANCE {
            break;
        }
    }

    Some(Dimensionless(0.5 * (low + high)))
}
