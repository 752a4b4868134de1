use physics::{BodyState, Collider, ContactPhase, ForceMode, PhysicsSim, PhysicsWorld, Vec3};

#[test]
fn landing_raises_begin_then_stay() {
    let mut sim = PhysicsSim::new_single_sphere(0.6);
    let floor = sim.add_plane(Vec3::Y, 0.0);

    let mut phases = Vec::new();
    for _ in 0..30 {
        sim.step(0.02);
        phases.extend(sim.drain_contacts().into_iter().map(|e| (e.other, e.phase)));
    }

    assert_eq!(phases.first(), Some(&(Collider::Plane(floor), ContactPhase::Begin)));
    assert_eq!(
        phases.iter().filter(|(_, phase)| *phase == ContactPhase::Begin).count(),
        1
    );
    assert!(phases.iter().any(|(_, phase)| *phase == ContactPhase::Stay));
}

#[test]
fn teleport_forgets_tracked_contacts() {
    let mut sim = PhysicsSim::new_single_sphere(0.45);
    sim.add_plane(Vec3::Y, 0.0);
    sim.step(0.02);
    assert!(!sim.drain_contacts().is_empty());

    sim.set_body_state(
        0,
        BodyState {
            linear_velocity: Vec3::new(0.0, 20.0, 0.0),
            ..sim.body(0).unwrap()
        },
    )
    .unwrap();
    sim.step(0.02);
    let events = sim.drain_contacts();
    // teleport clears tracked contacts, so leaving cannot report an end
    assert!(events.iter().all(|e| e.phase != ContactPhase::Stay));
}

#[test]
fn contact_normal_points_away_from_floor() {
    let mut sim = PhysicsSim::new_single_sphere(0.45);
    sim.add_plane(Vec3::Y, 0.0);
    sim.step(0.02);
    let event = sim.drain_contacts().into_iter().next().unwrap();
    assert!((event.normal - Vec3::Y).length() < 1e-6);
    assert!(event.point.y.abs() < 1e-5);
}

#[test]
fn sphere_pair_reports_both_sides() {
    let mut sim = PhysicsSim::new();
    sim.params.gravity = Vec3::ZERO;
    sim.add_sphere(Vec3::ZERO, Vec3::X, 0.5);
    sim.add_sphere(Vec3::new(1.05, 0.0, 0.0), Vec3::ZERO, 0.5);
    sim.step(0.1);
    let events = sim.drain_contacts();
    assert!(events.iter().any(|e| e.body == 0 && e.other == Collider::Body(1)));
    assert!(events.iter().any(|e| e.body == 1 && e.other == Collider::Body(0)));
}

#[test]
fn drain_empties_the_queue() {
    let mut sim = PhysicsSim::new_single_sphere(0.45);
    sim.add_plane(Vec3::Y, 0.0);
    sim.step(0.02);
    assert!(!sim.drain_contacts().is_empty());
    assert!(sim.drain_contacts().is_empty());
}

#[test]
fn jumping_off_the_floor_raises_end() {
    let mut sim = PhysicsSim::new_single_sphere(0.45);
    let floor = sim.add_plane(Vec3::Y, 0.0);
    sim.step(0.02);
    sim.drain_contacts();

    sim.apply_force(0, Vec3::new(0.0, 20.0, 0.0), ForceMode::VelocityChange).unwrap();
    sim.step(0.02);
    let events = sim.drain_contacts();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].phase, ContactPhase::End);
    assert_eq!(events[0].other, Collider::Plane(floor));
}
