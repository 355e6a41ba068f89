//! Value types shared by the store, the billing engine and the HTTP surface.

mod class;
mod ids;
mod payment;
mod student;
pub mod time;

/// Whole currency units. Prices carry no fractional part.
pub type Amount = u64;

pub use class::{
    ClassDuration, ClassPatch, ClassStatus, ClassType, DrivingClass, NewClass, PaymentMethod,
    PaymentStatus, UnsupportedDuration,
};
pub use ids::{ClassId, PaymentId, StudentId};
pub use payment::{LedgerMethod, NewPayment, Payment};
pub use student::{ExamReadiness, NewStudent, Student, StudentPatch, StudentStatus};
