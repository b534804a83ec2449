use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::hint::black_box;
use tourney_bracket::bracket::{Match, Occupant, validate};
use tourney_bracket::seeding::{
    Participant, ParticipantId, RankingSnapshot, rank_participants, seed_random,
};

/// Helper to create a roster of N teams
fn roster(n: i64) -> Vec<Participant> {
    (1..=n)
        .map(|id| Participant::team(id, format!("Team {id}")))
        .collect()
}

/// Helper to create snapshots with heavy point ties
fn snapshots(n: i64) -> HashMap<ParticipantId, RankingSnapshot> {
    (1..=n)
        .map(|id| {
            (
                id,
                RankingSnapshot {
                    participant_id: id,
                    total_points: (id % 8) * 125,
                    created_at: Utc.timestamp_opt(1_700_000_000 + id % 5, 0).unwrap(),
                },
            )
        })
        .collect()
}

/// Helper to create a full first round for N teams
fn first_round(n: i64) -> Vec<Match> {
    (0..n / 2)
        .map(|i| {
            let seat = |id: i64| Some(Occupant::new(id, format!("Team {id}")));
            Match::scheduled(i + 1, 1, 1, (i + 1) as u32, seat(2 * i + 1), seat(2 * i + 2))
        })
        .collect()
}

/// Benchmark ranked seeding across roster sizes
fn bench_ranked_seeding(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranked_seeding");

    for n in [8, 64, 512] {
        let participants = roster(n);
        let ranks = snapshots(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| rank_participants(black_box(participants.clone()), black_box(&ranks)));
        });
    }

    group.finish();
}

/// Benchmark random seeding across roster sizes
fn bench_random_seeding(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_seeding");

    for n in [8, 64, 512] {
        let participants = roster(n);
        let mut rng = StdRng::seed_from_u64(7);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| seed_random(black_box(participants.clone()), &mut rng));
        });
    }

    group.finish();
}

/// Benchmark bracket validation of a full first round
fn bench_validate(c: &mut Criterion) {
    let matches = first_round(256);

    c.bench_function("validate_256_teams", |b| {
        b.iter(|| validate(black_box(&matches)));
    });
}

criterion_group!(
    benches,
    bench_ranked_seeding,
    bench_random_seeding,
    bench_validate
);
criterion_main!(benches);
