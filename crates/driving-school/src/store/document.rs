//! Boundary schema for the external document collections.
//!
//! Documents are schema-on-read: field names are camelCase, the key lives outside
//! the body, and optional fields may be absent. Decoding fills the gaps with
//! defaults so the rest of the crate only sees fully-populated domain values.
//!
//! The collections are shared with the office web app, which stores enum values
//! as their Spanish display strings and the national id as `dni`. Decoding accepts
//! those and the API's snake_case names; encoding always writes the web app's form.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::domain::time::hh_mm;
use crate::domain::{
    Amount, ClassDuration, ClassId, ClassStatus, ClassType, DrivingClass, ExamReadiness,
    LedgerMethod, Payment, PaymentId, PaymentMethod, PaymentStatus, Student, StudentId,
    StudentStatus,
};

pub const STUDENTS: &str = "students";
pub const CLASSES: &str = "classes";
pub const PAYMENTS: &str = "payments";

/// Value as written by the office web app.
trait StoredName {
    fn stored_name(&self) -> &'static str;
}

impl StoredName for ClassType {
    fn stored_name(&self) -> &'static str {
        match self {
            Self::Practice => "Práctica",
            Self::ExamSimulation => "Simulación Examen",
            Self::Theory => "Teórica",
            Self::ManeuverReview => "Maniobras / Repaso",
        }
    }
}

impl StoredName for ClassStatus {
    fn stored_name(&self) -> &'static str {
        match self {
            Self::Scheduled => "Programada",
            Self::Completed => "Realizada",
            Self::Cancelled => "Cancelada",
            Self::NoShow => "No presentado",
        }
    }
}

impl StoredName for PaymentStatus {
    fn stored_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Invoiced => "Facturado",
            Self::Paid => "Pagado",
        }
    }
}

impl StoredName for PaymentMethod {
    fn stored_name(&self) -> &'static str {
        match self {
            Self::Cash => "Efectivo",
            Self::Transfer => "Transferencia",
        }
    }
}

impl StoredName for LedgerMethod {
    fn stored_name(&self) -> &'static str {
        match self {
            Self::Cash => "Efectivo",
            Self::Card => "Tarjeta",
            Self::Transfer => "Transferencia",
        }
    }
}

impl StoredName for StudentStatus {
    fn stored_name(&self) -> &'static str {
        match self {
            Self::Active => "Activo",
            Self::Paused => "Pausado",
            Self::Finished => "Finalizado/Aprobado",
        }
    }
}

impl StoredName for ExamReadiness {
    fn stored_name(&self) -> &'static str {
        match self {
            Self::No => "No",
            Self::InProgress => "En proceso",
            Self::AlmostReady => "Casi listo",
            Self::Ready => "Sí, preparado",
        }
    }
}

fn stored<T: StoredName, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.stored_name())
}

fn stored_opt<T: StoredName, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_some(value.stored_name()),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("document {collection}/{id} could not be decoded: {source}")]
pub struct DecodeError {
    pub collection: &'static str,
    pub id: String,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentDocument {
    first_name: String,
    last_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(
        default,
        rename = "dni",
        alias = "nationalId",
        skip_serializing_if = "Option::is_none"
    )]
    national_id: Option<String>,
    #[serde(serialize_with = "stored")]
    status: StudentStatus,
    #[serde(serialize_with = "stored")]
    exam_readiness: ExamReadiness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registration_date: Option<NaiveDate>,
    price_per_class: Amount,
    #[serde(default)]
    promo_packs: u32,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassDocument {
    student_id: String,
    date: NaiveDate,
    #[serde(with = "hh_mm")]
    start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    end_time: NaiveTime,
    duration_minutes: ClassDuration,
    #[serde(rename = "type", serialize_with = "stored")]
    kind: ClassType,
    #[serde(serialize_with = "stored")]
    status: ClassStatus,
    #[serde(serialize_with = "stored")]
    payment_status: PaymentStatus,
    price: Amount,
    #[serde(
        default,
        serialize_with = "stored_opt",
        skip_serializing_if = "Option::is_none"
    )]
    payment_method: Option<PaymentMethod>,
    #[serde(default)]
    notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentDocument {
    student_id: String,
    amount: Amount,
    date: NaiveDate,
    #[serde(serialize_with = "stored")]
    method: LedgerMethod,
    #[serde(default)]
    concept: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn decode<T: for<'de> Deserialize<'de>>(
    collection: &'static str,
    id: &str,
    fields: Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(fields).map_err(|source| DecodeError {
        collection,
        id: id.to_string(),
        source,
    })
}

fn into_fields<T: Serialize>(document: &T) -> Map<String, Value> {
    match serde_json::to_value(document) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

pub fn decode_student(id: &str, fields: Value) -> Result<Student, DecodeError> {
    let doc: StudentDocument = decode(STUDENTS, id, fields)?;
    Ok(Student {
        id: StudentId::new(id),
        first_name: doc.first_name,
        last_name: doc.last_name,
        phone: doc.phone,
        email: non_empty(doc.email),
        national_id: non_empty(doc.national_id),
        status: doc.status,
        exam_readiness: doc.exam_readiness,
        registration_date: doc.registration_date,
        price_per_class: doc.price_per_class,
        promo_packs: doc.promo_packs,
        notes: doc.notes,
        strengths: doc.strengths,
        weaknesses: doc.weaknesses,
    })
}

pub fn encode_student(student: &Student) -> Map<String, Value> {
    into_fields(&StudentDocument {
        first_name: student.first_name.clone(),
        last_name: student.last_name.clone(),
        phone: student.phone.clone(),
        email: student.email.clone(),
        national_id: student.national_id.clone(),
        status: student.status,
        exam_readiness: student.exam_readiness,
        registration_date: student.registration_date,
        price_per_class: student.price_per_class,
        promo_packs: student.promo_packs,
        notes: student.notes.clone(),
        strengths: student.strengths.clone(),
        weaknesses: student.weaknesses.clone(),
    })
}

pub fn decode_class(id: &str, fields: Value) -> Result<DrivingClass, DecodeError> {
    let doc: ClassDocument = decode(CLASSES, id, fields)?;
    Ok(DrivingClass {
        id: ClassId::new(id),
        student_id: StudentId::new(doc.student_id),
        date: doc.date,
        start_time: doc.start_time,
        end_time: doc.end_time,
        duration: doc.duration_minutes,
        kind: doc.kind,
        status: doc.status,
        payment_status: doc.payment_status,
        price: doc.price,
        payment_method: doc.payment_method,
        notes: doc.notes,
        location: non_empty(doc.location),
    })
}

pub fn encode_class(class: &DrivingClass) -> Map<String, Value> {
    into_fields(&ClassDocument {
        student_id: class.student_id.to_string(),
        date: class.date,
        start_time: class.start_time,
        end_time: class.end_time,
        duration_minutes: class.duration,
        kind: class.kind,
        status: class.status,
        payment_status: class.payment_status,
        price: class.price,
        payment_method: class.payment_method,
        notes: class.notes.clone(),
        location: class.location.clone(),
    })
}

pub fn decode_payment(id: &str, fields: Value) -> Result<Payment, DecodeError> {
    let doc: PaymentDocument = decode(PAYMENTS, id, fields)?;
    Ok(Payment {
        id: PaymentId::new(id),
        student_id: StudentId::new(doc.student_id),
        amount: doc.amount,
        date: doc.date,
        method: doc.method,
        concept: doc.concept,
    })
}

pub fn encode_payment(payment: &Payment) -> Map<String, Value> {
    into_fields(&PaymentDocument {
        student_id: payment.student_id.to_string(),
        amount: payment.amount,
        date: payment.date,
        method: payment.method,
        concept: payment.concept.clone(),
    })
}

/// Every field a document of the collection may carry. Used as the update mask
/// so that fields missing from an encoded body are removed, not left behind.
pub fn field_paths(collection: &str) -> &'static [&'static str] {
    match collection {
        STUDENTS => &[
            "firstName",
            "lastName",
            "phone",
            "email",
            "dni",
            "status",
            "examReadiness",
            "registrationDate",
            "pricePerClass",
            "promoPacks",
            "notes",
            "strengths",
            "weaknesses",
        ],
        CLASSES => &[
            "studentId",
            "date",
            "startTime",
            "endTime",
            "durationMinutes",
            "type",
            "status",
            "paymentStatus",
            "price",
            "paymentMethod",
            "notes",
            "location",
        ],
        PAYMENTS => &["studentId", "amount", "date", "method", "concept"],
        _ => &[],
    }
}

/// Document carrying its key inline, as found in snapshot files.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyedDocument {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn student_optional_fields_default_when_absent() {
        let student = decode_student(
            "s1",
            json!({
                "firstName": "Ana",
                "lastName": "Fernandez",
                "status": "finished",
                "examReadiness": "ready",
                "pricePerClass": 15000,
                "email": ""
            }),
        )
        .expect("decodes");

        assert_eq!(student.id.as_str(), "s1");
        assert_eq!(student.promo_packs, 0);
        assert_eq!(student.email, None);
        assert!(student.strengths.is_empty());
        assert_eq!(student.phone, "");
    }

    #[test]
    fn class_without_payment_method_decodes() {
        let class = decode_class(
            "c1",
            json!({
                "studentId": "s1",
                "date": "2024-03-01",
                "startTime": "09:00",
                "endTime": "10:00",
                "durationMinutes": 60,
                "type": "practice",
                "status": "scheduled",
                "paymentStatus": "pending",
                "price": 15000
            }),
        )
        .expect("decodes");

        assert_eq!(class.payment_method, None);
        assert_eq!(class.notes, "");
        assert_eq!(class.student_id.as_str(), "s1");
    }

    #[test]
    fn decode_error_names_the_document() {
        let err = decode_class("c9", json!({ "studentId": "s1" })).expect_err("incomplete");
        assert_eq!(err.collection, CLASSES);
        assert!(err.to_string().contains("classes/c9"));
    }

    #[test]
    fn encoded_unpaid_class_has_no_payment_method_field() {
        let class = decode_class(
            "c1",
            json!({
                "studentId": "s1",
                "date": "2024-03-01",
                "startTime": "09:00",
                "endTime": "10:00",
                "durationMinutes": 60,
                "type": "theory",
                "status": "completed",
                "paymentStatus": "invoiced",
                "price": 15000
            }),
        )
        .expect("decodes");

        let fields = encode_class(&class);
        assert!(!fields.contains_key("paymentMethod"));
        assert_eq!(fields["startTime"], "09:00");
        assert!(field_paths(CLASSES).contains(&"paymentMethod"));
    }

    #[test]
    fn keyed_document_splits_id_from_fields() {
        let doc: KeyedDocument = serde_json::from_value(json!({
            "id": "p1",
            "studentId": "s1",
            "amount": 9000,
            "date": "2024-03-02",
            "method": "card"
        }))
        .expect("parses");

        let payment = decode_payment(&doc.id, Value::Object(doc.fields)).expect("decodes");
        assert_eq!(payment.method, LedgerMethod::Card);
        assert_eq!(payment.concept, "");
    }

    #[test]
    fn web_app_class_document_decodes() {
        let class = decode_class(
            "c1",
            json!({
                "studentId": "s1",
                "date": "2024-03-04",
                "startTime": "10:00",
                "endTime": "11:00",
                "durationMinutes": 60,
                "type": "Práctica",
                "status": "Realizada",
                "paymentStatus": "Pagado",
                "price": 15000,
                "notes": "Buen control del embrague",
                "location": "Plaza Central",
                "paymentMethod": "Efectivo"
            }),
        )
        .expect("decodes");

        assert_eq!(class.kind, ClassType::Practice);
        assert_eq!(class.status, ClassStatus::Completed);
        assert_eq!(class.payment_status, PaymentStatus::Paid);
        assert_eq!(class.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(class.location.as_deref(), Some("Plaza Central"));
    }

    #[test]
    fn web_app_student_document_decodes() {
        let student = decode_student(
            "s1",
            json!({
                "firstName": "Juan",
                "lastName": "Pérez",
                "dni": "12345678",
                "phone": "11 5555 1234",
                "email": "juan@example.com",
                "status": "Activo",
                "examReadiness": "En proceso",
                "registrationDate": "2023-09-01",
                "pricePerClass": 15000,
                "notes": "",
                "strengths": ["Estacionamiento"],
                "weaknesses": ["Rotondas"],
                "avatarUrl": "https://example.com/a.png",
                "promoPacks": 1
            }),
        )
        .expect("decodes");

        assert_eq!(student.national_id.as_deref(), Some("12345678"));
        assert_eq!(student.status, StudentStatus::Active);
        assert_eq!(student.exam_readiness, ExamReadiness::InProgress);
        assert_eq!(student.promo_packs, 1);

        for (raw, expected) in [
            ("Finalizado/Aprobado", StudentStatus::Finished),
            ("Pausado", StudentStatus::Paused),
        ] {
            let decoded = decode_student(
                "s2",
                json!({
                    "firstName": "Ana",
                    "lastName": "Ruiz",
                    "status": raw,
                    "examReadiness": "Sí, preparado",
                    "pricePerClass": 15000
                }),
            )
            .expect("decodes");
            assert_eq!(decoded.status, expected);
            assert_eq!(decoded.exam_readiness, ExamReadiness::Ready);
        }
    }

    #[test]
    fn web_app_payment_methods_decode() {
        for (raw, expected) in [
            ("Efectivo", LedgerMethod::Cash),
            ("Tarjeta", LedgerMethod::Card),
            ("Transferencia", LedgerMethod::Transfer),
        ] {
            let payment = decode_payment(
                "p1",
                json!({
                    "studentId": "s1",
                    "amount": 45000,
                    "date": "2024-03-01",
                    "method": raw,
                    "concept": "Pack 3 clases"
                }),
            )
            .expect("decodes");
            assert_eq!(payment.method, expected);
        }
    }

    #[test]
    fn encoding_writes_the_web_app_form() {
        let class = decode_class(
            "c1",
            json!({
                "studentId": "s1",
                "date": "2024-03-04",
                "startTime": "10:00",
                "endTime": "11:00",
                "durationMinutes": 60,
                "type": "exam_simulation",
                "status": "completed",
                "paymentStatus": "paid",
                "price": 15000,
                "paymentMethod": "transfer"
            }),
        )
        .expect("decodes");
        let fields = encode_class(&class);
        assert_eq!(fields["type"], "Simulación Examen");
        assert_eq!(fields["status"], "Realizada");
        assert_eq!(fields["paymentStatus"], "Pagado");
        assert_eq!(fields["paymentMethod"], "Transferencia");
        assert_eq!(decode_class("c1", Value::Object(fields)).expect("decodes"), class);

        let student = decode_student(
            "s1",
            json!({
                "firstName": "Ana",
                "lastName": "Ruiz",
                "nationalId": "30111222",
                "status": "paused",
                "examReadiness": "almost_ready",
                "pricePerClass": 15000
            }),
        )
        .expect("decodes");
        let fields = encode_student(&student);
        assert_eq!(fields["dni"], "30111222");
        assert!(!fields.contains_key("nationalId"));
        assert_eq!(fields["status"], "Pausado");
        assert_eq!(fields["examReadiness"], "Casi listo");
        assert!(field_paths(STUDENTS).contains(&"dni"));
    }
}
