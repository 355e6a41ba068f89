//! Class scheduling: the class form, the calendar grid and their HTTP routes.

pub mod calendar;
mod editor;
pub mod router;
mod service;

#[cfg(test)]
mod tests;

pub use calendar::{CalendarBoard, ClassCard, ClassFilter, MonthView, WeekView};
pub use editor::{ClassChanges, ClassDraft, ClassEditor};
pub use router::scheduling_router;
pub use service::{SchedulingError, SchedulingService};
