use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::billing::{upcoming_ordinal, PricingSuggestion, PromoPolicy};
use crate::config::BillingConfig;
use crate::domain::time::hh_mm;
use crate::domain::{
    Amount, ClassDuration, ClassId, ClassStatus, ClassType, DrivingClass, NewClass,
    PaymentMethod, PaymentStatus, StudentId,
};
use crate::store::Snapshot;
use crate::validation::{require_price, ValidationError};

/// Hour the class form opens at when no slot was picked.
pub const DEFAULT_START: (u32, u32) = (9, 0);

/// Editable class form. Nothing is checked until [`ClassEditor::finalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDraft {
    #[serde(default)]
    pub student_id: Option<StudentId>,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(default, rename = "duration_minutes")]
    pub duration: ClassDuration,
    #[serde(default, rename = "type")]
    pub kind: ClassType,
    #[serde(default)]
    pub status: ClassStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub price: Amount,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl ClassDraft {
    /// Form state for editing an existing class.
    pub fn from_class(class: &DrivingClass) -> Self {
        Self {
            student_id: Some(class.student_id.clone()),
            date: class.date,
            start_time: class.start_time,
            duration: class.duration,
            kind: class.kind,
            status: class.status,
            payment_status: class.payment_status,
            price: class.price,
            payment_method: class.payment_method,
            notes: class.notes.clone(),
            location: class.location.clone(),
        }
    }
}

/// Partial edit submitted against an existing class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassChanges {
    pub student_id: Option<StudentId>,
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "optional_hh_mm::deserialize")]
    pub start_time: Option<NaiveTime>,
    #[serde(rename = "duration_minutes")]
    pub duration: Option<ClassDuration>,
    #[serde(rename = "type")]
    pub kind: Option<ClassType>,
    pub status: Option<ClassStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub price: Option<Amount>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    /// An empty string clears the location.
    pub location: Option<String>,
}

impl ClassChanges {
    pub fn apply_to(self, draft: &mut ClassDraft) {
        if let Some(student_id) = self.student_id {
            draft.student_id = Some(student_id);
        }
        if let Some(date) = self.date {
            draft.date = date;
        }
        if let Some(start_time) = self.start_time {
            draft.start_time = start_time;
        }
        if let Some(duration) = self.duration {
            draft.duration = duration;
        }
        if let Some(kind) = self.kind {
            draft.kind = kind;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(payment_status) = self.payment_status {
            draft.payment_status = payment_status;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(method) = self.payment_method {
            draft.payment_method = Some(method);
        }
        if let Some(notes) = self.notes {
            draft.notes = notes;
        }
        if let Some(location) = self.location {
            draft.location = Some(location).filter(|text| !text.trim().is_empty());
        }
    }
}

mod optional_hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| crate::domain::time::parse_time(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Builds, pre-fills and validates class forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassEditor {
    policy: PromoPolicy,
    default_price: Amount,
}

impl Default for ClassEditor {
    fn default() -> Self {
        Self::from_config(&BillingConfig::default())
    }
}

impl ClassEditor {
    pub const fn new(policy: PromoPolicy, default_price: Amount) -> Self {
        Self {
            policy,
            default_price,
        }
    }

    pub fn from_config(config: &BillingConfig) -> Self {
        Self::new(config.promo_policy(), config.default_price)
    }

    pub const fn policy(&self) -> &PromoPolicy {
        &self.policy
    }

    /// Empty form for a slot. Without a slot the form opens at 09:00.
    pub fn blank(&self, date: NaiveDate, start_time: Option<NaiveTime>) -> ClassDraft {
        let (hour, minute) = DEFAULT_START;
        ClassDraft {
            student_id: None,
            date,
            start_time: start_time
                .or_else(|| NaiveTime::from_hms_opt(hour, minute, 0))
                .unwrap_or_default(),
            duration: ClassDuration::default(),
            kind: ClassType::default(),
            status: ClassStatus::default(),
            payment_status: PaymentStatus::default(),
            price: self.default_price,
            payment_method: None,
            notes: String::new(),
            location: None,
        }
    }

    /// Pricing the form should offer for `student_id`. A student missing from the
    /// snapshot gets the default price and no promo.
    pub fn suggest(
        &self,
        snapshot: &Snapshot,
        student_id: &StudentId,
        editing: Option<&ClassId>,
    ) -> PricingSuggestion {
        let ordinal = upcoming_ordinal(&snapshot.classes, student_id, editing);
        match snapshot.student(student_id) {
            Some(student) => self.policy.suggest(student, ordinal),
            None => PromoPolicy::regular(self.default_price, ordinal),
        }
    }

    /// Picks a student and overwrites price and payment fields with the suggestion.
    pub fn select_student(
        &self,
        snapshot: &Snapshot,
        draft: &mut ClassDraft,
        student_id: StudentId,
        editing: Option<&ClassId>,
    ) -> PricingSuggestion {
        let suggestion = self.suggest(snapshot, &student_id, editing);
        draft.student_id = Some(student_id);
        draft.price = suggestion.price;
        draft.payment_status = suggestion.payment_status;
        draft.payment_method = suggestion.payment_method;
        suggestion
    }

    /// Checks the form and turns it into a savable class. The end time is derived
    /// and the payment method dropped unless the class is paid.
    pub fn finalize(&self, draft: ClassDraft) -> Result<NewClass, ValidationError> {
        let student_id = draft
            .student_id
            .filter(|id| !id.as_str().trim().is_empty())
            .ok_or(ValidationError::Required {
                field: "student_id",
            })?;
        require_price("price", draft.price)?;

        let payment_method = match draft.payment_status {
            PaymentStatus::Paid => Some(
                draft
                    .payment_method
                    .ok_or(ValidationError::MissingPaymentMethod)?,
            ),
            _ => None,
        };

        Ok(NewClass {
            student_id,
            date: draft.date,
            start_time: draft.start_time,
            duration: draft.duration,
            kind: draft.kind,
            status: draft.status,
            payment_status: draft.payment_status,
            price: draft.price,
            payment_method,
            notes: draft.notes.trim().to_string(),
            location: draft.location.filter(|text| !text.trim().is_empty()),
        })
    }
}
