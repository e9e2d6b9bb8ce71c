//! Batch quantity parsing.

use std::num::NonZeroU32;

use thiserror::Error;

use super::CopyLabel;

/// Number of copies requested for a batch export.
///
/// Always in `1..=max_copies` for the cap it was parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchQuantity(NonZeroU32);

/// Why a raw `quantity` value was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// Missing, non-numeric, zero or negative.
    #[error("quantity must be a positive integer")]
    Invalid,

    /// Numeric and positive, but above the configured ceiling.
    #[error("quantity {requested} exceeds the maximum of {max}")]
    TooLarge { requested: u64, max: u32 },
}

impl BatchQuantity {
    /// Parses the raw query value.
    ///
    /// Surrounding whitespace is ignored; anything else that is not a plain
    /// base-10 integer is `Invalid`.
    pub fn parse(raw: Option<&str>, max_copies: u32) -> Result<Self, QuantityError> {
        let raw = raw.map(str::trim).ok_or(QuantityError::Invalid)?;
        if raw.is_empty() {
            return Err(QuantityError::Invalid);
        }

        let value: i64 = raw.parse().map_err(|_| {
            // digits-only input that overflowed i64 is still "a positive number"
            if raw.bytes().all(|b| b.is_ascii_digit()) {
                QuantityError::TooLarge {
                    requested: u64::MAX,
                    max: max_copies,
                }
            } else {
                QuantityError::Invalid
            }
        })?;

        if value <= 0 {
            return Err(QuantityError::Invalid);
        }
        let requested = value as u64;
        if requested > u64::from(max_copies) {
            return Err(QuantityError::TooLarge {
                requested,
                max: max_copies,
            });
        }

        NonZeroU32::new(requested as u32)
            .map(Self)
            .ok_or(QuantityError::Invalid)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Labels `1..=quantity`, ascending.
    pub fn labels(&self) -> impl Iterator<Item = CopyLabel> {
        (1..=self.0.get()).map(CopyLabel::from)
    }
}
