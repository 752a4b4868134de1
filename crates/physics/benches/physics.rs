use criterion::{criterion_group, criterion_main, Criterion};
use physics::{PhysicsSim, PhysicsWorld, Vec3};

fn cave(spheres: usize) -> PhysicsSim {
    let mut sim = PhysicsSim::new();
    sim.add_enclosure(Vec3::ZERO, Vec3::splat(12.5));
    for i in 0..spheres {
        let x = (i % 10) as f32 * 2.0 - 9.0;
        let z = (i / 10) as f32 * 2.0 - 9.0;
        sim.add_sphere(Vec3::new(x, 5.0, z), Vec3::ZERO, 0.5);
    }
    sim
}

fn bench_step(c: &mut Criterion) {
    let mut sim = cave(100);
    c.bench_function("step_100_spheres", |b| b.iter(|| sim.step(0.02)));
}

fn bench_raycast(c: &mut Criterion) {
    let sim = cave(100);
    c.bench_function("raycast_fan", |b| {
        b.iter(|| {
            (0..7)
                .filter_map(|i| {
                    let angle = i as f32;
                    sim.raycast(Vec3::ZERO, Vec3::new(angle.sin(), 0.2, angle.cos()), 10.0)
                })
                .count()
        })
    });
}

criterion_group!(benches, bench_step, bench_raycast);
criterion_main!(benches);
