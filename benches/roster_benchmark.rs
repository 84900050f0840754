// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rugby_roster::db::InMemoryStore;
use rugby_roster::services::ids::{player_id, slug};
use rugby_roster::services::AttendanceService;
use std::collections::BTreeMap;
use std::sync::Arc;

fn benchmark_ids(c: &mut Criterion) {
    let mut group = c.benchmark_group("ids");

    group.bench_function("slug_accented_name", |b| {
        b.iter(|| slug(black_box("Club Atlético San Martín de Tucumán")))
    });

    group.bench_function("player_id", |b| {
        b.iter(|| player_id(black_box("Maximiliano José"), black_box("Fernández Castro")))
    });

    group.finish();
}

fn benchmark_attendance_history(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to build runtime");
    let service = AttendanceService::new(Arc::new(InMemoryStore::new()));

    // A season of weekly sheets for a 30-player squad
    let squad: BTreeMap<String, Option<bool>> = (0..30)
        .map(|i| (format!("Jugador {:02}", i), Some(i % 3 != 0)))
        .collect();
    let start = NaiveDate::from_ymd_opt(2024, 1, 6).expect("valid date");
    runtime.block_on(async {
        for week in 0..40 {
            let day = start + chrono::Duration::weeks(week);
            service
                .record("los-pumas", "Senior", day, squad.clone())
                .await
                .expect("Failed to record attendance");
        }
    });

    c.bench_function("attendance_history_40_sheets", |b| {
        b.iter(|| runtime.block_on(service.history(black_box("los-pumas"), black_box("Senior"))))
    });
}

criterion_group!(benches, benchmark_ids, benchmark_attendance_history);
criterion_main!(benches);
