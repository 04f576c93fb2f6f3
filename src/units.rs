//! This module defines the unit types used by the calculator and their conversions.
#![allow(missing_docs)]

use float_cmp::{ApproxEq, F64Margin};
use serde::{Deserialize, Serialize};

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Default,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
        )]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub const fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is neither infinite nor NaN
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl From<f64> for $name {
            fn from(val: f64) -> Self {
                Self(val)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ApproxEq for $name {
            type Margin = F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }
    };
}

macro_rules! impl_scale {
    ($name:ty) => {
        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                <$name>::new(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                <$name>::new(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                <$name>::new(self.0 / rhs.0)
            }
        }

        impl std::ops::Div for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

unit_struct!(Dimensionless);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    pub fn powi(self, rhs: i32) -> Self {
        Dimensionless(self.0.powi(rhs))
    }
}

// Base quantities
unit_struct!(Money);
unit_struct!(Area);
unit_struct!(Month);

// Reference units (e.g. UF) per square metre per month
unit_struct!(UnitValue);

// Derived quantities
unit_struct!(MoneyPerMonth);
unit_struct!(MoneyPerArea);
unit_struct!(MoneyPerUnitValue);

impl_scale!(Money);
impl_scale!(Area);
impl_scale!(Month);
impl_scale!(UnitValue);
impl_scale!(MoneyPerMonth);
impl_scale!(MoneyPerArea);
impl_scale!(MoneyPerUnitValue);

// Multiplication rules
impl_mul!(UnitValue, MoneyPerUnitValue, MoneyPerArea);
impl_mul!(MoneyPerArea, Area, MoneyPerMonth);
impl_mul!(MoneyPerMonth, Month, Money);

// Division rules
impl_div!(Money, MoneyPerMonth, Month);
impl_div!(Money, Month, MoneyPerMonth);

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_monthly_income_chain() {
        let rate = UnitValue(0.01) * MoneyPerUnitValue(35_000.0);
        assert_approx_eq!(MoneyPerArea, rate, MoneyPerArea(350.0));

        let income = rate * Area(1_000_000.0);
        assert_approx_eq!(MoneyPerMonth, income, MoneyPerMonth(350_000_000.0));
    }

    #[test]
    fn test_payback_division() {
        let months = Money(960_000_000.0) / MoneyPerMonth(63_000_000.0);
        assert_approx_eq!(Month, months, Month(960.0 / 63.0));
    }

    #[test]
    fn test_same_unit_ratio_is_dimensionless() {
        assert_eq!(Money(10.0) / Money(4.0), Dimensionless(2.5));
        assert_eq!(Dimensionless(2.0) * Area(3.0), Area(6.0));
    }

    #[test]
    fn test_is_finite() {
        assert!(Money(1.0).is_finite());
        assert!(!Money(f64::NAN).is_finite());
        assert!(!Area(f64::INFINITY).is_finite());
    }
}
