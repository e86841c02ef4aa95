use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use flow_core::{
    allocation::{begin_adjustment, project_impact, AllocationSnapshot, FlowCategory},
    storage::{AllocationStore, JsonStorage},
};
use tempfile::tempdir;

fn bench_drag_updates(c: &mut Criterion) {
    let start = AllocationSnapshot::new(50.0, 20.0).expect("valid split");

    c.bench_function("preview_drag_1k", |b| {
        b.iter_batched(
            || begin_adjustment(start),
            |mut state| {
                for step in 0..1_000 {
                    let raw = 20.0 + (step % 70) as f64;
                    let category = if step % 2 == 0 {
                        FlowCategory::Foundation
                    } else {
                        FlowCategory::Future
                    };
                    black_box(state.update_preview(category, raw).expect("update"));
                }
                state.commit().expect("commit")
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("impact_projection", |b| {
        b.iter(|| project_impact(black_box(&start), black_box(523_417)).expect("projection"))
    });
}

fn bench_storage(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    let store = JsonStorage::new(dir.path().to_path_buf(), Some(50)).expect("storage");
    let snapshot = AllocationSnapshot::new(60.0, 15.0).expect("valid split");

    c.bench_function("save_applied", |b| {
        b.iter(|| store.save_applied(black_box(&snapshot)).expect("save"))
    });

    c.bench_function("load_applied", |b| {
        b.iter(|| black_box(store.load_applied().expect("load")))
    });
}

criterion_group!(benches, bench_drag_updates, bench_storage);
criterion_main!(benches);
