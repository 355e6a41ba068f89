use serde::Serialize;

use crate::domain::{Amount, PaymentMethod, PaymentStatus, Student};

/// Classes covered by one promo pack (pay nine, take ten).
pub const PACK_SIZE: u32 = 10;

/// Position of an ordinal inside its pack, 1 through `PACK_SIZE`.
pub const fn pack_position(ordinal: u32) -> u32 {
    (ordinal.saturating_sub(1) % PACK_SIZE) + 1
}

pub const fn pack_number(ordinal: u32) -> u32 {
    (ordinal.saturating_sub(1) / PACK_SIZE) + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromoSlot {
    pub pack: u32,
    pub position: u32,
}

impl PromoSlot {
    pub const fn for_ordinal(ordinal: u32) -> Self {
        Self {
            pack: pack_number(ordinal),
            position: pack_position(ordinal),
        }
    }
}

/// Pre-fill offered when a student is picked for a class. Editors may override it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingSuggestion {
    pub ordinal: u32,
    pub price: Amount,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo: Option<PromoSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromoPolicy {
    pub promo_price: Amount,
    pub pack_size: u32,
    /// Method pre-selected on promo classes so they satisfy "paid requires a method".
    pub promo_payment_method: PaymentMethod,
}

impl Default for PromoPolicy {
    fn default() -> Self {
        Self {
            promo_price: 9000,
            pack_size: PACK_SIZE,
            promo_payment_method: PaymentMethod::Cash,
        }
    }
}

impl PromoPolicy {
    pub fn allotment(&self, student: &Student) -> u32 {
        student.promo_allotment(self.pack_size)
    }

    /// Missing students never get promo treatment.
    pub fn is_promo(&self, student: Option<&Student>, ordinal: u32) -> bool {
        student.is_some_and(|student| ordinal >= 1 && ordinal <= self.allotment(student))
    }

    pub fn suggest(&self, student: &Student, ordinal: u32) -> PricingSuggestion {
        if self.is_promo(Some(student), ordinal) {
            PricingSuggestion {
                ordinal,
                price: self.promo_price,
                payment_status: PaymentStatus::Paid,
                payment_method: Some(self.promo_payment_method),
                promo: Some(PromoSlot::for_ordinal(ordinal)),
            }
        } else {
            Self::regular(student.price_per_class, ordinal)
        }
    }

    /// Suggestion at the given list price with no promo applied.
    pub fn regular(price: Amount, ordinal: u32) -> PricingSuggestion {
        PricingSuggestion {
            ordinal,
            price,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            promo: None,
        }
    }
}
