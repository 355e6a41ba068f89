use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ClassId, StudentId};
use super::time::{add_minutes, hh_mm};
use super::Amount;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    #[default]
    #[serde(alias = "Práctica")]
    Practice,
    #[serde(alias = "Simulación Examen")]
    ExamSimulation,
    #[serde(alias = "Teórica")]
    Theory,
    #[serde(alias = "Maniobras / Repaso")]
    ManeuverReview,
}

impl ClassType {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Practice,
            Self::ExamSimulation,
            Self::Theory,
            Self::ManeuverReview,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Practice => "Practice",
            Self::ExamSimulation => "Exam simulation",
            Self::Theory => "Theory",
            Self::ManeuverReview => "Maneuvers / review",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    #[default]
    #[serde(alias = "Programada")]
    Scheduled,
    #[serde(alias = "Realizada")]
    Completed,
    #[serde(alias = "Cancelada")]
    Cancelled,
    #[serde(alias = "No presentado")]
    NoShow,
}

impl ClassStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Scheduled, Self::Completed, Self::Cancelled, Self::NoShow]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::NoShow => "No show",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    #[serde(alias = "Pendiente")]
    Pending,
    #[serde(alias = "Facturado")]
    Invoiced,
    #[serde(alias = "Pagado")]
    Paid,
}

impl PaymentStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Invoiced, Self::Paid]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Invoiced => "Invoiced",
            Self::Paid => "Paid",
        }
    }
}

/// How a paid class was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[serde(alias = "Efectivo")]
    Cash,
    #[serde(alias = "Transferencia")]
    Transfer,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Transfer => "Transfer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cash" | "efectivo" => Some(Self::Cash),
            "transfer" | "bank_transfer" | "transferencia" => Some(Self::Transfer),
            _ => None,
        }
    }
}

/// Lesson lengths offered by the school, stored as whole minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum ClassDuration {
    Thirty,
    FortyFive,
    #[default]
    Sixty,
    Ninety,
}

impl ClassDuration {
    pub const fn ordered() -> [Self; 4] {
        [Self::Thirty, Self::FortyFive, Self::Sixty, Self::Ninety]
    }

    pub const fn minutes(self) -> u16 {
        match self {
            Self::Thirty => 30,
            Self::FortyFive => 45,
            Self::Sixty => 60,
            Self::Ninety => 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedDuration(pub u16);

impl fmt::Display for UnsupportedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported class duration {} minutes (expected 30, 45, 60 or 90)",
            self.0
        )
    }
}

impl std::error::Error for UnsupportedDuration {}

impl TryFrom<u16> for ClassDuration {
    type Error = UnsupportedDuration;

    fn try_from(minutes: u16) -> Result<Self, Self::Error> {
        Self::ordered()
            .into_iter()
            .find(|duration| duration.minutes() == minutes)
            .ok_or(UnsupportedDuration(minutes))
    }
}

impl From<ClassDuration> for u16 {
    fn from(duration: ClassDuration) -> Self {
        duration.minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrivingClass {
    pub id: ClassId,
    /// Not enforced by the store; the student may no longer exist.
    pub student_id: StudentId,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    #[serde(rename = "duration_minutes")]
    pub duration: ClassDuration,
    #[serde(rename = "type")]
    pub kind: ClassType,
    pub status: ClassStatus,
    pub payment_status: PaymentStatus,
    pub price: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl DrivingClass {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    pub fn is_completed(&self) -> bool {
        self.status == ClassStatus::Completed
    }

    /// Completed but not yet paid. Scheduled classes never count as owed.
    pub fn is_outstanding(&self) -> bool {
        self.is_completed() && !self.is_paid()
    }

    /// Derived fields are recomputed: the end time from start and duration, and
    /// the payment method is dropped unless the class is paid.
    pub(crate) fn normalize(&mut self) {
        self.end_time = add_minutes(self.start_time, self.duration.minutes());
        if !self.is_paid() {
            self.payment_method = None;
        }
    }
}

/// Class fields as submitted for creation. The end time is derived at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClass {
    pub student_id: StudentId,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(rename = "duration_minutes")]
    pub duration: ClassDuration,
    #[serde(rename = "type")]
    pub kind: ClassType,
    pub status: ClassStatus,
    pub payment_status: PaymentStatus,
    pub price: Amount,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewClass {
    pub fn into_class(self, id: ClassId) -> DrivingClass {
        let mut class = DrivingClass {
            id,
            student_id: self.student_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.start_time,
            duration: self.duration,
            kind: self.kind,
            status: self.status,
            payment_status: self.payment_status,
            price: self.price,
            payment_method: self.payment_method,
            notes: self.notes,
            location: self.location,
        };
        class.normalize();
        class
    }
}

/// Partial update merged into an existing class.
///
/// `payment_method` and `location` use a nested option: `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassPatch {
    pub student_id: Option<StudentId>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub duration: Option<ClassDuration>,
    pub kind: Option<ClassType>,
    pub status: Option<ClassStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub price: Option<Amount>,
    pub payment_method: Option<Option<PaymentMethod>>,
    pub notes: Option<String>,
    pub location: Option<Option<String>>,
}

impl ClassPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, class: &mut DrivingClass) {
        if let Some(student_id) = self.student_id {
            class.student_id = student_id;
        }
        if let Some(date) = self.date {
            class.date = date;
        }
        if let Some(start_time) = self.start_time {
            class.start_time = start_time;
        }
        if let Some(duration) = self.duration {
            class.duration = duration;
        }
        if let Some(kind) = self.kind {
            class.kind = kind;
        }
        if let Some(status) = self.status {
            class.status = status;
        }
        if let Some(payment_status) = self.payment_status {
            class.payment_status = payment_status;
        }
        if let Some(price) = self.price {
            class.price = price;
        }
        if let Some(method) = self.payment_method {
            class.payment_method = method;
        }
        if let Some(notes) = self.notes {
            class.notes = notes;
        }
        if let Some(location) = self.location {
            class.location = location;
        }
        class.normalize();
    }
}

impl From<NewClass> for ClassPatch {
    /// Full replacement of every editable field, as issued by the edit form.
    fn from(class: NewClass) -> Self {
        Self {
            student_id: Some(class.student_id),
            date: Some(class.date),
            start_time: Some(class.start_time),
            duration: Some(class.duration),
            kind: Some(class.kind),
            status: Some(class.status),
            payment_status: Some(class.payment_status),
            price: Some(class.price),
            payment_method: Some(class.payment_method),
            notes: Some(class.notes),
            location: Some(class.location),
        }
    }
}
