use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, ExamReadiness, NewStudent, Student, StudentStatus};
use crate::validation::{require_price, require_text, ValidationError};

/// Student form as typed in. Strengths and weaknesses are edited as one entry
/// per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default = "default_status")]
    pub status: StudentStatus,
    #[serde(default = "default_readiness")]
    pub exam_readiness: ExamReadiness,
    #[serde(default)]
    pub registration_date: Option<NaiveDate>,
    #[serde(default)]
    pub price_per_class: Amount,
    #[serde(default)]
    pub promo_packs: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub strengths: String,
    #[serde(default)]
    pub weaknesses: String,
}

fn default_status() -> StudentStatus {
    StudentStatus::Active
}

fn default_readiness() -> ExamReadiness {
    ExamReadiness::No
}

impl StudentForm {
    pub fn blank(default_price: Amount) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            email: String::new(),
            national_id: String::new(),
            status: default_status(),
            exam_readiness: default_readiness(),
            registration_date: None,
            price_per_class: default_price,
            promo_packs: 0,
            notes: String::new(),
            strengths: String::new(),
            weaknesses: String::new(),
        }
    }

    pub fn from_student(student: &Student) -> Self {
        Self {
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            phone: student.phone.clone(),
            email: student.email.clone().unwrap_or_default(),
            national_id: student.national_id.clone().unwrap_or_default(),
            status: student.status,
            exam_readiness: student.exam_readiness,
            registration_date: student.registration_date,
            price_per_class: student.price_per_class,
            promo_packs: student.promo_packs,
            notes: student.notes.clone(),
            strengths: student.strengths.join("\n"),
            weaknesses: student.weaknesses.join("\n"),
        }
    }

    /// Validates the form. A missing registration date becomes `today`.
    pub fn finalize(self, today: NaiveDate) -> Result<NewStudent, ValidationError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("phone", &self.phone)?;
        require_price("price_per_class", self.price_per_class)?;

        Ok(NewStudent {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: non_blank(&self.email),
            national_id: non_blank(&self.national_id),
            status: self.status,
            exam_readiness: self.exam_readiness,
            registration_date: Some(self.registration_date.unwrap_or(today)),
            price_per_class: self.price_per_class,
            promo_packs: self.promo_packs,
            notes: self.notes.trim().to_string(),
            strengths: split_lines(&self.strengths),
            weaknesses: split_lines(&self.weaknesses),
        })
    }
}

/// Partial edit of a stored student, merged into its form before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StudentChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
    pub status: Option<StudentStatus>,
    pub exam_readiness: Option<ExamReadiness>,
    pub registration_date: Option<NaiveDate>,
    pub price_per_class: Option<Amount>,
    pub promo_packs: Option<u32>,
    pub notes: Option<String>,
    pub strengths: Option<String>,
    pub weaknesses: Option<String>,
}

impl StudentChanges {
    pub fn apply_to(self, form: &mut StudentForm) {
        let Self {
            first_name,
            last_name,
            phone,
            email,
            national_id,
            status,
            exam_readiness,
            registration_date,
            price_per_class,
            promo_packs,
            notes,
            strengths,
            weaknesses,
        } = self;

        replace(&mut form.first_name, first_name);
        replace(&mut form.last_name, last_name);
        replace(&mut form.phone, phone);
        replace(&mut form.email, email);
        replace(&mut form.national_id, national_id);
        replace(&mut form.status, status);
        replace(&mut form.exam_readiness, exam_readiness);
        replace(&mut form.price_per_class, price_per_class);
        replace(&mut form.promo_packs, promo_packs);
        replace(&mut form.notes, notes);
        replace(&mut form.strengths, strengths);
        replace(&mut form.weaknesses, weaknesses);
        if registration_date.is_some() {
            form.registration_date = registration_date;
        }
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// One entry per non-empty line, trimmed, in the order typed.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
