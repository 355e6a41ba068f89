use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::StudentId;
use super::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    #[serde(alias = "Activo")]
    Active,
    #[serde(alias = "Pausado")]
    Paused,
    #[serde(alias = "Finalizado/Aprobado")]
    Finished,
}

impl StudentStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Active, Self::Paused, Self::Finished]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Finished => "Finished / Passed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamReadiness {
    #[serde(alias = "No")]
    No,
    #[serde(alias = "En proceso")]
    InProgress,
    #[serde(alias = "Casi listo")]
    AlmostReady,
    #[serde(alias = "Sí, preparado")]
    Ready,
}

impl ExamReadiness {
    pub const fn ordered() -> [Self; 4] {
        [Self::No, Self::InProgress, Self::AlmostReady, Self::Ready]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::No => "No",
            Self::InProgress => "In progress",
            Self::AlmostReady => "Almost ready",
            Self::Ready => "Ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    pub status: StudentStatus,
    pub exam_readiness: ExamReadiness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<NaiveDate>,
    pub price_per_class: Amount,
    /// Purchased 10-for-9 bundles.
    #[serde(default)]
    pub promo_packs: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// First name plus last-name initial, e.g. `Lucia G.`.
    pub fn short_name(&self) -> String {
        match self.last_name.chars().next() {
            Some(initial) => format!("{} {}.", self.first_name, initial),
            None => self.first_name.clone(),
        }
    }

    /// Number of class ordinals covered by purchased promo packs.
    pub fn promo_allotment(&self, pack_size: u32) -> u32 {
        self.promo_packs.saturating_mul(pack_size)
    }
}

/// Student fields as submitted for creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    pub status: StudentStatus,
    pub exam_readiness: ExamReadiness,
    #[serde(default)]
    pub registration_date: Option<NaiveDate>,
    pub price_per_class: Amount,
    #[serde(default)]
    pub promo_packs: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

impl NewStudent {
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            email: self.email,
            national_id: self.national_id,
            status: self.status,
            exam_readiness: self.exam_readiness,
            registration_date: self.registration_date,
            price_per_class: self.price_per_class,
            promo_packs: self.promo_packs,
            notes: self.notes,
            strengths: self.strengths,
            weaknesses: self.weaknesses,
        }
    }
}

/// Partial update merged into an existing student.
///
/// `email` and `national_id` use a nested option: `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub national_id: Option<Option<String>>,
    pub status: Option<StudentStatus>,
    pub exam_readiness: Option<ExamReadiness>,
    pub registration_date: Option<NaiveDate>,
    pub price_per_class: Option<Amount>,
    pub promo_packs: Option<u32>,
    pub notes: Option<String>,
    pub strengths: Option<Vec<String>>,
    pub weaknesses: Option<Vec<String>>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(self, student: &mut Student) {
        if let Some(first_name) = self.first_name {
            student.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            student.last_name = last_name;
        }
        if let Some(phone) = self.phone {
            student.phone = phone;
        }
        if let Some(email) = self.email {
            student.email = email;
        }
        if let Some(national_id) = self.national_id {
            student.national_id = national_id;
        }
        if let Some(status) = self.status {
            student.status = status;
        }
        if let Some(readiness) = self.exam_readiness {
            student.exam_readiness = readiness;
        }
        if let Some(date) = self.registration_date {
            student.registration_date = Some(date);
        }
        if let Some(price) = self.price_per_class {
            student.price_per_class = price;
        }
        if let Some(packs) = self.promo_packs {
            student.promo_packs = packs;
        }
        if let Some(notes) = self.notes {
            student.notes = notes;
        }
        if let Some(strengths) = self.strengths {
            student.strengths = strengths;
        }
        if let Some(weaknesses) = self.weaknesses {
            student.weaknesses = weaknesses;
        }
    }
}

impl From<NewStudent> for StudentPatch {
    /// Full replacement of every editable field, as issued by the edit form.
    fn from(student: NewStudent) -> Self {
        Self {
            first_name: Some(student.first_name),
            last_name: Some(student.last_name),
            phone: Some(student.phone),
            email: Some(student.email),
            national_id: Some(student.national_id),
            status: Some(student.status),
            exam_readiness: Some(student.exam_readiness),
            registration_date: student.registration_date,
            price_per_class: Some(student.price_per_class),
            promo_packs: Some(student.promo_packs),
            notes: Some(student.notes),
            strengths: Some(student.strengths),
            weaknesses: Some(student.weaknesses),
        }
    }
}
