use criterion::{criterion_group, criterion_main, Criterion, black_box};

use grassveil::core::types::{ActorId, Vec3};
use grassveil::grass::{GrassConfig, GrassField};
use grassveil::session::{FrameInput, Session, SessionConfig};

fn bench_bend_around_point(c: &mut Criterion) {
    let mut field = GrassField::new(GrassConfig::default(), 1);

    c.bench_function("bend_around_point_8000", |b| {
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let t = frame as f32 * 0.05;
            let point = Vec3::new(t.sin() * 15.0, 0.2, t.cos() * 15.0);
            black_box(field.bend_around_point(black_box(point), 1.8));
            // Keep the bent set from growing without bound
            if frame % 256 == 0 {
                field.reset();
            }
        });
    });
}

fn bench_restore_all(c: &mut Criterion) {
    c.bench_function("restore_all_after_walk", |b| {
        let mut field = GrassField::new(GrassConfig::default(), 2);
        for i in 0..200 {
            field.bend_around_point(Vec3::new(-15.0 + i as f32 * 0.15, 0.2, 0.0), 1.8);
        }
        b.iter(|| {
            black_box(field.restore_all());
        });
    });
}

fn bench_visibility_cone(c: &mut Criterion) {
    let mut field = GrassField::new(GrassConfig::default(), 3);

    c.bench_function("visibility_cone_8000", |b| {
        let mut facing = 0.0f32;
        b.iter(|| {
            facing += 0.01;
            field.update_visibility_cone(black_box(Vec3::new(0.0, 0.2, 0.0)), black_box(facing));
        });
    });
}

fn bench_session_frame(c: &mut Criterion) {
    let mut session = Session::new(SessionConfig::default(), ActorId::from("bench"));

    c.bench_function("session_frame", |b| {
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let t = frame as f32 * 0.0075;
            let report = session.frame(FrameInput {
                position: Vec3::new(t.cos() * 8.0, 0.2, t.sin() * 8.0),
                facing: t,
                elapsed_ms: 16.0,
            });
            session.drain_events();
            black_box(report);
        });
    });
}

criterion_group!(
    benches,
    bench_bend_around_point,
    bench_restore_all,
    bench_visibility_cone,
    bench_session_frame,
);
criterion_main!(benches);
