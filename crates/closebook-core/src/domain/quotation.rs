use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Number of nano units in one whole unit.
pub const NANO_PER_UNIT: i64 = 1_000_000_000;

/// Broker-native fixed-point price: `units + nano / 1e9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quotation {
    pub units: i64,
    pub nano: i32,
}

impl Quotation {
    pub fn new(units: i64, nano: i32) -> Result<Self, ValidationError> {
        if i64::from(nano).abs() >= NANO_PER_UNIT {
            return Err(ValidationError::NanoOutOfRange { value: nano });
        }
        Ok(Self { units, nano })
    }

    pub fn to_f64(self) -> f64 {
        self.units as f64 + f64::from(self.nano) / NANO_PER_UNIT as f64
    }
}

/// Reconstructs the per-share close price from a lot-denominated quotation.
///
/// `lot` is the number of underlying units in one traded lot, so the result is
/// `lot * (units + nano / 1e9)`.
pub fn adjusted_close(close: Quotation, lot: u32) -> f64 {
    f64::from(lot) * close.to_f64()
}
