use super::common::*;
use crate::billing::{PromoPolicy, YearMonth};
use crate::domain::{ClassStatus, StudentId};
use crate::scheduling::calendar::{hour_rows, month_cells, week_start, FIRST_HOUR};
use crate::scheduling::{CalendarBoard, ClassFilter};
use crate::store::Snapshot;

#[test]
fn weeks_start_on_monday() {
    assert_eq!(week_start(date("2024-03-06")), date("2024-03-04"));
    assert_eq!(week_start(date("2024-03-10")), date("2024-03-04"));
    assert_eq!(week_start(date("2024-03-04")), date("2024-03-04"));
}

#[test]
fn month_grid_pads_to_the_first_weekday() {
    // March 2024 starts on a Friday.
    let cells = month_cells(YearMonth::new(2024, 3).expect("valid"));
    assert_eq!(cells.iter().take_while(|cell| cell.is_none()).count(), 4);
    assert_eq!(cells.len(), 4 + 31);
    assert_eq!(cells[4], Some(date("2024-03-01")));
}

#[test]
fn grid_covers_seven_to_twenty_one() {
    let hours: Vec<u32> = hour_rows().collect();
    assert_eq!(hours.first(), Some(&FIRST_HOUR));
    assert_eq!(hours.len(), 15);
}

#[test]
fn cards_carry_ordinal_and_promo_flags() {
    let (students, classes) = roster();
    let snapshot = Snapshot::new(students, classes, Vec::new());
    let board = CalendarBoard::new(&snapshot, PromoPolicy::default());

    let cards = board.cards_on(date("2024-03-04"), &ClassFilter::default());
    assert_eq!(cards.len(), 2);
    let lucia = &cards[0];
    assert_eq!(lucia.ordinal, 1);
    assert!(lucia.promo);
    assert_eq!(lucia.pack_position, Some(1));
    assert!(!lucia.paid);

    let marcos = &cards[1];
    assert!(marcos.paid);
    assert!(!marcos.promo);
    assert_eq!(marcos.student_name.as_deref(), Some("Marcos Alonso"));
}

#[test]
fn orphaned_classes_render_without_a_name() {
    let (_, mut classes) = roster();
    classes.push(class("c-9", "deleted", "2024-03-06", "08:00"));
    let snapshot = Snapshot::new(Vec::new(), classes, Vec::new());
    let board = CalendarBoard::new(&snapshot, PromoPolicy::default());

    let cards = board.cards_on(date("2024-03-06"), &ClassFilter::default());
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].student_name, None);
    assert!(!cards[0].promo);
}

#[test]
fn filters_hide_cards_but_keep_ordinals() {
    let (students, classes) = roster();
    let snapshot = Snapshot::new(students, classes, Vec::new());
    let board = CalendarBoard::new(&snapshot, PromoPolicy::default());
    let filter = ClassFilter {
        student: Some(StudentId::from("lucia")),
        status: Some(ClassStatus::Scheduled),
    };

    let week = board.week(date("2024-03-06"), &filter);
    let cards: Vec<_> = week
        .days
        .iter()
        .flat_map(|day| day.rows.iter().flat_map(|row| row.cards.iter()))
        .collect();
    assert_eq!(week.start, date("2024-03-04"));
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[1].ordinal, 2);
    assert_eq!(week.days[1].rows[16 - FIRST_HOUR as usize].cards.len(), 1);
}

#[test]
fn early_classes_land_off_grid() {
    let (students, mut classes) = roster();
    classes.push(class("c-early", "lucia", "2024-03-07", "06:30"));
    let snapshot = Snapshot::new(students, classes, Vec::new());
    let board = CalendarBoard::new(&snapshot, PromoPolicy::default());

    let week = board.week(date("2024-03-07"), &ClassFilter::default());
    assert_eq!(week.days[3].off_grid.len(), 1);
    assert_eq!(week.days[3].off_grid[0].ordinal, 1);
}
