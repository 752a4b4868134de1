use physics::PhysicsSim;

#[test]
fn sphere_free_fall_matches_analytic() {
    // initial height 10 m, no initial velocity, no drag
    let mut sim = PhysicsSim::new_single_sphere(10.0);
    sim.bodies[0].linear_damping = 0.0;
    let dt = 0.01_f32;
    let steps = 100_usize; // simulate 1 s so the sphere stays above ground
    let final_state = sim.run(dt, steps).unwrap();

    // analytic: h = h0 - 1/2 g t^2 (g = 9.81); semi-implicit Euler overshoots by g*dt*t/2
    let t = dt * steps as f32;
    let expected = 10.0 - 0.5 * 9.81 * t.powi(2);
    let diff = (final_state.position.y - expected).abs();
    assert!(diff < 0.06, "diff={diff}");
}

#[test]
fn sphere_comes_to_rest_on_floor() {
    let mut sim = PhysicsSim::new_single_sphere(3.0);
    sim.add_plane(physics::Vec3::Y, 0.0);
    let state = sim.run(0.02, 300).unwrap();
    assert!(state.position.y > 0.4 && state.position.y < 0.6, "y={}", state.position.y);
    assert!(state.linear_velocity.length() < 0.5);
}
