//! Fixtures for tests

use crate::calculator::CalculatorInputs;
use crate::parameters::CalculatorParameters;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// The reference scenario: 100 parcels of 10,000 m² at 0.01 per m², discounted at 15%
#[fixture]
pub fn inputs() -> CalculatorInputs {
    CalculatorInputs::default()
}

#[fixture]
pub fn params() -> CalculatorParameters {
    CalculatorParameters::default()
}
