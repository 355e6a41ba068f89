//! Form-level checks run before anything is written to the store.

use crate::domain::Amount;

/// Highest price accepted for one class or as a student's list price.
pub const MAX_PRICE: Amount = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} must not exceed {max}")]
    TooLarge { field: &'static str, max: Amount },
    #[error("a paid class needs a payment method")]
    MissingPaymentMethod,
}

impl ValidationError {
    /// Form field the error should be shown next to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::NotPositive { field }
            | Self::TooLarge { field, .. } => field,
            Self::MissingPaymentMethod => "payment_method",
        }
    }
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

pub(crate) fn require_price(field: &'static str, value: Amount) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::NotPositive { field });
    }
    if value > MAX_PRICE {
        return Err(ValidationError::TooLarge {
            field,
            max: MAX_PRICE,
        });
    }
    Ok(())
}
