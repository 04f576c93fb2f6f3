//! The curated scenario comparison table.
//!
//! These rows are maintained by hand for display and are not derived from the calculator.
use crate::calculator::CalculatorInputs;

/// A row in the scenario comparison table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioRow {
    /// Number of parcels in the scenario
    pub parcel_count: u32,
    /// Narrative NPV label
    pub npv_label: &'static str,
    /// Narrative IRR label
    pub irr_label: &'static str,
    /// Narrative payback label
    pub payback_label: &'static str,
}

/// The preset scenarios, in increasing order of size
pub static SCENARIOS: [ScenarioRow; 4] = [
    ScenarioRow {
        parcel_count: 100,
        npv_label: "MM$1.688",
        irr_label: "40%",
        payback_label: "16 meses",
    },
    ScenarioRow {
        parcel_count: 200,
        npv_label: "MM$3.376",
        irr_label: "50%",
        payback_label: "16 meses",
    },
    ScenarioRow {
        parcel_count: 300,
        npv_label: "MM$5.065",
        irr_label: "60%",
        payback_label: "16 meses",
    },
    ScenarioRow {
        parcel_count: 400,
        npv_label: "MM$6.753",
        irr_label: "65%",
        payback_label: "16 meses",
    },
];

/// Get the default inputs at each preset parcel count
pub fn preset_inputs() -> impl Iterator<Item = (&'static ScenarioRow, CalculatorInputs)> {
    SCENARIOS.iter().map(|row| {
        let inputs = CalculatorInputs {
            parcel_count: row.parcel_count,
            ..CalculatorInputs::default()
        };
        (row, inputs)
    })
}
