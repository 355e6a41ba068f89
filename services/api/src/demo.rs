use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;
use driving_school::billing::{BillingSummary, Period, YearMonth};
use driving_school::config::BillingConfig;
use driving_school::domain::time::format_time;
use driving_school::domain::StudentId;
use driving_school::error::AppError;
use driving_school::report::{format_amount, FinancialReport, ReportFormat};
use driving_school::scheduling::{ClassEditor, ClassFilter, SchedulingService};
use driving_school::store::{MemoryStore, SnapshotSource};
use driving_school::students::StudentService;

use crate::infra::{load_snapshot_file, parse_format, parse_period, today};
use crate::seed::demo_snapshot;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON export with `students`, `classes` and `payments` arrays
    #[arg(long, conflicts_with = "seed", required_unless_present = "seed")]
    pub(crate) snapshot: Option<PathBuf>,
    /// Report over the built-in demo roster instead of a file
    #[arg(long)]
    pub(crate) seed: bool,
    /// `all` or a month as YYYY-MM
    #[arg(long, default_value = "all", value_parser = parse_period)]
    pub(crate) period: Period,
    /// text, html or csv
    #[arg(long, default_value = "text", value_parser = parse_format)]
    pub(crate) format: ReportFormat,
    /// Write to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the seeded classes (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        seed: _,
        period,
        format,
        output,
    } = args;

    let snapshot = match snapshot {
        Some(path) => load_snapshot_file(&path)?,
        None => demo_snapshot(today()),
    };
    let billing = BillingConfig::default();
    let summary = BillingSummary::compute(&snapshot, period, billing.top_students);
    let report = FinancialReport::build(&summary, Local::now().naive_local());
    let rendered = report.render(format)?;

    match output {
        Some(path) => {
            fs::write(&path, rendered)?;
            println!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(today);
    let billing = BillingConfig::default();
    let store = Arc::new(MemoryStore::from_snapshot(&demo_snapshot(today)));
    let scheduling = SchedulingService::new(Arc::clone(&store), ClassEditor::from_config(&billing));
    let students = StudentService::new(Arc::clone(&store), billing.promo_policy());

    println!("Driving school back office demo ({today})");
    println!("\nStudents");
    for row in students.list("") {
        println!(
            "- {} | {} | {} completed / {} booked | {} per class, {} promo pack(s)",
            row.student.full_name(),
            row.student.status.label(),
            row.completed_classes,
            row.engaged_classes,
            format_amount(row.student.price_per_class),
            row.student.promo_packs
        );
    }

    let lucia = StudentId::from("1");
    let mut draft = scheduling.blank(today, None);
    let suggestion =
        scheduling
            .editor()
            .select_student(&scheduling.snapshot(), &mut draft, lucia.clone(), None);
    println!(
        "\nBooking class #{} for Lucia: {} ({}){}",
        suggestion.ordinal,
        format_amount(suggestion.price),
        suggestion.payment_status.label(),
        suggestion
            .promo
            .map(|slot| format!(", promo {}/10 of pack {}", slot.position, slot.pack))
            .unwrap_or_default()
    );
    match scheduling.create(draft).await {
        Ok(id) => println!("- saved as {id}"),
        Err(err) => println!("- booking rejected: {err}"),
    }

    println!("\nThis week");
    let week = scheduling.week(today, &ClassFilter::default());
    for day in &week.days {
        let cards: Vec<_> = day
            .rows
            .iter()
            .flat_map(|row| row.cards.iter())
            .chain(day.off_grid.iter())
            .collect();
        if cards.is_empty() {
            continue;
        }
        println!("{}", day.date.format("%a %d %b"));
        for card in cards {
            println!(
                "  {}-{} {} #{}{} {}",
                format_time(card.start_time),
                format_time(card.end_time),
                card.student_name.as_deref().unwrap_or("(deleted student)"),
                card.ordinal,
                if card.promo { " promo" } else { "" },
                if card.paid { "paid" } else { "unpaid" }
            );
        }
    }

    let period = Period::Month(YearMonth::of(today));
    let summary = BillingSummary::compute(&store.snapshot(), period, billing.top_students);
    let report = FinancialReport::build(&summary, Local::now().naive_local());
    println!();
    print!("{}", report.render(ReportFormat::Text)?);
    Ok(())
}
