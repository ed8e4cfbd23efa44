//! # Metric Benchmarks
//!
//! Performance benchmarks for funnel-core report computation.
//!
//! Run with: `cargo bench -p funnel-core`

use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use funnel_core::{
    ConversionTable, DateRange, Event, EventLog, FunnelReport, InvitationId, Selection,
    read_event_log, standard_funnel,
};
use std::hint::black_box;

const PATH: [&str; 6] = [
    "Inbox",
    "Completed",
    "Passed MQ",
    "Talent Pool",
    "Acme Review",
    "Shortlisted",
];

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid date")
}

/// Create a log where each invitation walks the pipeline one folder per day.
fn create_pipeline_log(invitations: usize) -> EventLog {
    let mut events = Vec::with_capacity(invitations * (PATH.len() + 1));
    for i in 0..invitations {
        let id = InvitationId::new(format!("inv-{i}"));
        let invited = base() + Duration::days((i % 90) as i64);
        let source = if i % 3 == 0 { "Referral" } else { "Job Board" };
        let tier = ["B1", "B2", "C1"][i % 3];

        let mut from = None;
        for (step, &to) in PATH.iter().enumerate() {
            events.push(
                Event::new(id.clone(), from, Some(to))
                    .with_activity_at(invited + Duration::days(step as i64))
                    .with_invited_at(invited)
                    .with_campaign("Manila", "Voice")
                    .with_source_tier(source, tier),
            );
            from = Some(to);
        }
        if i % 4 == 0 {
            events.push(
                Event::new(id, Some("Shortlisted"), Some("Hired"))
                    .with_activity_at(invited + Duration::days(PATH.len() as i64))
                    .with_invited_at(invited)
                    .with_campaign("Manila", "Voice")
                    .with_source_tier(source, tier),
            );
        }
    }
    EventLog::new(events)
}

fn create_pipeline_csv(invitations: usize) -> String {
    let mut csv = String::from(
        "CAMPAIGNINVITATIONID,FOLDER_FROM_TITLE,FOLDER_TO_TITLE,ACTIVITY_CREATED_AT,\
         INVITATIONDT,CAMPAIGN_SITE,CAMPAIGNTITLE,SOURCE,TALKSCORE_CEFR\n",
    );
    for i in 0..invitations {
        let mut from = "";
        for (step, &to) in PATH.iter().enumerate() {
            csv.push_str(&format!(
                "{i},{from},{to},2024-01-{:02} 09:00:00,2024-01-01,Manila,Voice,Referral,B2\n",
                step + 1
            ));
            from = to;
        }
    }
    csv
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_funnel_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("funnel_report");
    let specs = standard_funnel();

    for size in [100, 1000, 10000].iter() {
        let log = create_pipeline_log(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &log, |b, log| {
            b.iter(|| black_box(FunnelReport::compute(log, &specs)));
        });
    }

    group.finish();
}

fn bench_conversion_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion_table");

    for size in [100, 1000, 10000].iter() {
        let log = create_pipeline_log(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &log, |b, log| {
            b.iter(|| black_box(ConversionTable::compute(log.events()).pivot()));
        });
    }

    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let log = create_pipeline_log(10000);
    let range = DateRange::default_for(&log, 30).expect("range");
    let selection = Selection::new(range).with_sites(["Manila"]);

    c.bench_function("selection_apply_10000", |b| {
        b.iter(|| black_box(selection.apply(&log)));
    });
}

fn bench_csv_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_decode");

    for size in [100, 1000].iter() {
        let csv = create_pipeline_csv(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &csv, |b, csv| {
            b.iter(|| black_box(read_event_log(csv.as_bytes())));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_funnel_report,
    bench_conversion_table,
    bench_selection,
    bench_csv_decode
);
criterion_main!(benches);
