use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Amount in whole rupees. Cart and order totals live in this type; the one
/// place the gateway needs paise goes through [`Money::to_minor`] so the
/// unit conversion cannot be applied twice or forgotten.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = i64)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn rupees(amount: i64) -> Self {
        Money(amount)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Convert to the gateway's minor unit (paise).
    pub fn to_minor(self) -> MinorUnits {
        MinorUnits(self.0 * 100)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;
    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0)
    }
}

/// Paise. Terminal representation for the gateway order-creation call; no
/// arithmetic is defined on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = i64)]
pub struct MinorUnits(i64);

impl MinorUnits {
    pub fn value(self) -> i64 {
        self.0
    }
}
