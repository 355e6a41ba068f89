use chrono::{Datelike, Days, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::billing::{pack_position, OrdinalIndex, PromoPolicy, YearMonth};
use crate::domain::time::hh_mm;
use crate::domain::{
    ClassId, ClassStatus, ClassType, DrivingClass, PaymentStatus, StudentId,
};
use crate::store::Snapshot;

pub const FIRST_HOUR: u32 = 7;
pub const LAST_HOUR: u32 = 21;

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    week_start(date).iter_days().take(7).collect()
}

pub fn hour_rows() -> impl Iterator<Item = u32> {
    FIRST_HOUR..=LAST_HOUR
}

/// Month laid out on a Monday-first grid; `None` cells pad the first week.
pub fn month_cells(month: YearMonth) -> Vec<Option<NaiveDate>> {
    let first = month.first_day();
    let leading = first.weekday().num_days_from_monday() as usize;
    std::iter::repeat(None)
        .take(leading)
        .chain(first.iter_days().take(month.days() as usize).map(Some))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClassFilter {
    #[serde(default)]
    pub student: Option<StudentId>,
    #[serde(default)]
    pub status: Option<ClassStatus>,
}

impl ClassFilter {
    pub fn matches(&self, class: &DrivingClass) -> bool {
        self.student.as_ref().map_or(true, |id| &class.student_id == id)
            && self.status.map_or(true, |status| class.status == status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCard {
    pub class_id: ClassId,
    pub student_id: StudentId,
    /// Absent when the student no longer exists.
    pub student_name: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    #[serde(rename = "type")]
    pub kind: ClassType,
    pub status: ClassStatus,
    pub payment_status: PaymentStatus,
    pub paid: bool,
    pub ordinal: u32,
    pub promo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_position: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourRow {
    pub hour: u32,
    pub label: String,
    pub cards: Vec<ClassCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub rows: Vec<HourRow>,
    /// Classes starting outside the grid hours.
    pub off_grid: Vec<ClassCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekView {
    pub start: NaiveDate,
    pub days: Vec<DayColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthDay {
    pub date: NaiveDate,
    pub cards: Vec<ClassCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub month: YearMonth,
    pub cells: Vec<Option<MonthDay>>,
}

/// Renders class cards out of one snapshot. Ordinals always count every class
/// of the student, whatever the filter hides.
pub struct CalendarBoard<'a> {
    snapshot: &'a Snapshot,
    ordinals: OrdinalIndex,
    policy: PromoPolicy,
}

impl<'a> CalendarBoard<'a> {
    pub fn new(snapshot: &'a Snapshot, policy: PromoPolicy) -> Self {
        Self {
            snapshot,
            ordinals: OrdinalIndex::build(&snapshot.classes),
            policy,
        }
    }

    pub fn card(&self, class: &DrivingClass) -> ClassCard {
        let student = self.snapshot.student(&class.student_id);
        let ordinal = self.ordinals.get(&class.id).unwrap_or(1);
        let promo = self.policy.is_promo(student, ordinal);
        ClassCard {
            class_id: class.id.clone(),
            student_id: class.student_id.clone(),
            student_name: student.map(|student| student.full_name()),
            date: class.date,
            start_time: class.start_time,
            end_time: class.end_time,
            kind: class.kind,
            status: class.status,
            payment_status: class.payment_status,
            paid: class.is_paid(),
            ordinal,
            promo,
            pack_position: promo.then(|| pack_position(ordinal)),
        }
    }

    pub fn cards_on(&self, date: NaiveDate, filter: &ClassFilter) -> Vec<ClassCard> {
        let mut classes: Vec<&DrivingClass> = self
            .snapshot
            .classes
            .iter()
            .filter(|class| class.date == date && filter.matches(class))
            .collect();
        classes.sort_by(|a, b| (a.start_time, &a.id).cmp(&(b.start_time, &b.id)));
        classes.into_iter().map(|class| self.card(class)).collect()
    }

    pub fn week(&self, date: NaiveDate, filter: &ClassFilter) -> WeekView {
        let days = week_days(date)
            .into_iter()
            .map(|day| {
                let cards = self.cards_on(day, filter);
                let rows = hour_rows()
                    .map(|hour| HourRow {
                        hour,
                        label: format!("{hour:02}:00"),
                        cards: cards
                            .iter()
                            .filter(|card| card.start_time.hour() == hour)
                            .cloned()
                            .collect(),
                    })
                    .collect();
                let off_grid = cards
                    .into_iter()
                    .filter(|card| !hour_rows().any(|hour| hour == card.start_time.hour()))
                    .collect();
                DayColumn {
                    date: day,
                    rows,
                    off_grid,
                }
            })
            .collect();

        WeekView {
            start: week_start(date),
            days,
        }
    }

    pub fn month(&self, month: YearMonth, filter: &ClassFilter) -> MonthView {
        let cells = month_cells(month)
            .into_iter()
            .map(|cell| {
                cell.map(|date| MonthDay {
                    date,
                    cards: self.cards_on(date, filter),
                })
            })
            .collect();
        MonthView { month, cells }
    }
}
