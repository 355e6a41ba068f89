use super::common::*;
use crate::domain::{ClassId, PaymentMethod, PaymentStatus, StudentId};
use crate::scheduling::{ClassDraft, ClassEditor};
use crate::store::Snapshot;
use crate::validation::{ValidationError, MAX_PRICE};

fn snapshot() -> Snapshot {
    let (students, classes) = roster();
    Snapshot::new(students, classes, Vec::new())
}

fn draft() -> ClassDraft {
    ClassEditor::default().blank(date("2024-03-11"), None)
}

#[test]
fn blank_form_uses_school_defaults() {
    let draft = draft();
    assert_eq!(draft.start_time.to_string(), "09:00:00");
    assert_eq!(draft.duration.minutes(), 60);
    assert_eq!(draft.price, 15000);
    assert_eq!(draft.payment_status, PaymentStatus::Pending);
    assert!(draft.student_id.is_none());
}

#[test]
fn selecting_a_promo_student_prefills_paid_cash() {
    let editor = ClassEditor::default();
    let mut draft = draft();

    let suggestion = editor.select_student(&snapshot(), &mut draft, StudentId::from("lucia"), None);

    assert_eq!(suggestion.ordinal, 3);
    assert_eq!(suggestion.promo.map(|slot| slot.position), Some(3));
    assert_eq!(draft.price, 9000);
    assert_eq!(draft.payment_status, PaymentStatus::Paid);
    assert_eq!(draft.payment_method, Some(PaymentMethod::Cash));
    editor.finalize(draft).expect("prefilled form is valid");
}

#[test]
fn selecting_a_regular_student_prefills_list_price() {
    let editor = ClassEditor::default();
    let mut draft = draft();
    let mut snapshot = snapshot();
    let mut students = snapshot.students.to_vec();
    students[1].price_per_class = 18000;
    snapshot = Snapshot::new(students, snapshot.classes.to_vec(), Vec::new());

    editor.select_student(&snapshot, &mut draft, StudentId::from("marcos"), None);

    assert_eq!(draft.price, 18000);
    assert_eq!(draft.payment_status, PaymentStatus::Pending);
    assert_eq!(draft.payment_method, None);
}

#[test]
fn unknown_student_falls_back_to_default_price() {
    let suggestion =
        ClassEditor::default().suggest(&snapshot(), &StudentId::from("ghost"), None);
    assert_eq!(suggestion.price, 15000);
    assert_eq!(suggestion.ordinal, 1);
    assert!(suggestion.promo.is_none());
}

#[test]
fn editing_keeps_the_current_ordinal() {
    let suggestion = ClassEditor::default().suggest(
        &snapshot(),
        &StudentId::from("lucia"),
        Some(&ClassId::from("c-1")),
    );
    assert_eq!(suggestion.ordinal, 1);
}

#[test]
fn finalize_requires_a_student() {
    let err = ClassEditor::default().finalize(draft()).expect_err("no student");
    assert_eq!(err, ValidationError::Required { field: "student_id" });
}

#[test]
fn finalize_rejects_zero_price() {
    let mut draft = draft();
    draft.student_id = Some(StudentId::from("lucia"));
    draft.price = 0;
    let err = ClassEditor::default().finalize(draft).expect_err("zero price");
    assert_eq!(err.field(), "price");
}

#[test]
fn finalize_rejects_prices_above_the_cap() {
    let mut draft = draft();
    draft.student_id = Some(StudentId::from("lucia"));
    draft.price = MAX_PRICE + 1;
    let err = ClassEditor::default().finalize(draft).expect_err("too large");
    assert_eq!(
        err,
        ValidationError::TooLarge {
            field: "price",
            max: MAX_PRICE
        }
    );
}

#[test]
fn paid_without_method_is_rejected() {
    let mut draft = draft();
    draft.student_id = Some(StudentId::from("lucia"));
    draft.payment_status = PaymentStatus::Paid;
    let err = ClassEditor::default().finalize(draft).expect_err("method missing");
    assert_eq!(err, ValidationError::MissingPaymentMethod);
}

#[test]
fn finalize_drops_method_when_not_paid() {
    let mut draft = draft();
    draft.student_id = Some(StudentId::from("lucia"));
    draft.payment_status = PaymentStatus::Invoiced;
    draft.payment_method = Some(PaymentMethod::Transfer);
    draft.location = Some("  ".to_string());

    let class = ClassEditor::default().finalize(draft).expect("valid");
    assert_eq!(class.payment_method, None);
    assert_eq!(class.location, None);
}
