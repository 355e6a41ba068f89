//! Student roster: the student form, directory search and profile pages.

mod directory;
mod editor;
pub mod router;
mod service;


pub use directory::{matches_query, Directory, HistoryEntry, StudentProfile, StudentRow};
pub use editor::{split_lines, StudentChanges, StudentForm};
pub use router::students_router;
pub use service::{StudentService, StudentServiceError};
