use criterion::{criterion_group, criterion_main, Criterion};
use eventscout::models::EventRecord;
use eventscout::services::profile::INTEREST_VOCABULARY;
use eventscout::services::recommend::{match_score, recommend, DEFAULT_TOP_N};
use std::collections::BTreeSet;
use std::hint::black_box;

/// Events with 1-5 tags drawn round-robin from the vocabulary.
fn make_events(count: usize) -> Vec<EventRecord> {
    (0..count)
        .map(|i| {
            let mut event = EventRecord::new(format!("event-{}", i), format!("Event {}", i));
            event.tags = (0..(i % 5) + 1)
                .map(|j| INTEREST_VOCABULARY[(i * 7 + j * 3) % INTEREST_VOCABULARY.len()].to_string())
                .collect();
            event.is_public = i % 4 != 0;
            event
        })
        .collect()
}

fn benchmark_recommend(c: &mut Criterion) {
    let interests: BTreeSet<String> = INTEREST_VOCABULARY
        .iter()
        .step_by(3)
        .map(|s| s.to_string())
        .collect();

    let mut group = c.benchmark_group("recommend");

    for count in [10, 50, 500] {
        let events = make_events(count);
        group.bench_function(format!("{}_events", count), |b| {
            b.iter(|| recommend(black_box(&interests), black_box(&events), DEFAULT_TOP_N))
        });
    }

    let tags = make_events(5).pop().map(|e| e.tags).unwrap_or_default();
    group.bench_function("match_score", |b| {
        b.iter(|| match_score(black_box(&interests), black_box(&tags)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_recommend);
criterion_main!(benches);
