use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use skirank_terminal::calendar::group_by_date;
use skirank_terminal::comparison::head_to_head;
use skirank_terminal::demo_backend::DemoBackend;
use skirank_terminal::models::{EventLocation, SharedRace, SideResult};
use skirank_terminal::router;
use skirank_terminal::supabase::{
    parse_athletes_json, parse_comparison_json, parse_event_results_json,
};

fn sample_races(count: u32) -> Vec<SharedRace> {
    let start = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();
    (0..count)
        .map(|i| {
            let side = |rank: u32| {
                Some(SideResult {
                    rank: (rank % 17 != 0).then_some(rank % 30 + 1),
                    status: (rank % 17 == 0).then(|| "DNF".to_string()),
                    ..SideResult::default()
                })
            };
            SharedRace {
                event_codex: format!("{i:04}"),
                event_date: start + chrono::Days::new(u64::from(i) * 3),
                location: EventLocation::parse("Adelboden (SUI)"),
                discipline: ["Slalom", "Giant Slalom", "Super G", "Downhill"][(i % 4) as usize]
                    .to_string(),
                category: "World Cup".to_string(),
                athlete1_result: side(i * 7 + 3),
                athlete2_result: side(i * 11 + 5),
            }
        })
        .collect()
}

fn bench_head_to_head(c: &mut Criterion) {
    let races = sample_races(400);
    c.bench_function("head_to_head_400", |b| {
        b.iter(|| {
            let stats = head_to_head(black_box(&races));
            black_box(stats.comparable_races);
        })
    });
}

fn bench_router_decode(c: &mut Criterion) {
    let fragments = [
        "#rank",
        "#athlete-6190001",
        "#event-0402-2026-01-17",
        "#event-0402-2026-13-17",
        "#preferiti",
    ];
    c.bench_function("router_decode", |b| {
        b.iter(|| {
            for fragment in fragments {
                black_box(router::decode(black_box(fragment)));
            }
        })
    });
}

fn bench_group_by_date(c: &mut Criterion) {
    let backend = DemoBackend::new();
    let events = backend.all_events();
    c.bench_function("calendar_group_by_date", |b| {
        b.iter(|| {
            let groups = group_by_date(black_box(events));
            black_box(groups.len());
        })
    });
}

fn bench_athletes_parse(c: &mut Criterion) {
    c.bench_function("athletes_parse", |b| {
        b.iter(|| {
            let rows = parse_athletes_json(black_box(ATHLETES_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_event_results_parse(c: &mut Criterion) {
    c.bench_function("event_results_parse", |b| {
        b.iter(|| {
            let rows = parse_event_results_json(black_box(EVENT_RESULTS_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_comparison_parse(c: &mut Criterion) {
    c.bench_function("comparison_parse", |b| {
        b.iter(|| {
            let payload = parse_comparison_json(black_box(COMPARISON_JSON)).unwrap();
            black_box(payload.races.len());
        })
    });
}

criterion_group!(
    perf,
    bench_head_to_head,
    bench_router_decode,
    bench_group_by_date,
    bench_athletes_parse,
    bench_event_results_parse,
    bench_comparison_parse
);
criterion_main!(perf);

static ATHLETES_JSON: &str = include_str!("../tests/fixtures/athletes_ranked.json");
static EVENT_RESULTS_JSON: &str = include_str!("../tests/fixtures/event_results.json");
static COMPARISON_JSON: &str = include_str!("../tests/fixtures/comparison.json");
