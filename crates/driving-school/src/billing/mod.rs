//! Pure billing and promo computations over a store snapshot.
//!
//! Nothing here is stored: ordinals, promo flags and aggregates are derived on
//! every read from whatever the snapshot currently holds.

mod ordinal;
mod period;
mod promo;
mod summary;
pub mod views;

pub use ordinal::{chronological, ordinal_of, upcoming_ordinal, OrdinalIndex};
pub use period::{available_months, Period, PeriodParseError, YearMonth};
pub use promo::{pack_number, pack_position, PricingSuggestion, PromoPolicy, PromoSlot, PACK_SIZE};
pub use summary::{BillingSummary, StudentAccount, StudentLedger, TimeBucket, Totals};
