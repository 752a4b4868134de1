pub use glam::{Quat, Vec3};

/// Index of a dynamic rigid body inside a world.
pub type BodyId = usize;

/// Index of a drive joint inside a world.
pub type JointId = usize;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
    pub density: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.2,
            density: 1.0,
        }
    }
}

/// Kinematic state of a rigid body.
///
/// The local frame follows the usual game-engine convention: `+Z` is
/// forward, `+Y` is up and `+X` is right.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl BodyState {
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Express a world-space point in this body's local frame.
    #[must_use]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    /// Express a local-space point in world space.
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    #[must_use]
    pub fn speed(&self) -> f32 {
        self.linear_velocity.length()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.linear_velocity.is_finite()
            && self.angular_velocity.is_finite()
    }
}

impl Default for BodyState {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// How a force or torque passed to the world is interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous force, divided by mass (or inertia).
    Force,
    /// Continuous acceleration, mass is ignored.
    Acceleration,
    /// Instant change of momentum.
    Impulse,
    /// Instant change of velocity, mass is ignored.
    VelocityChange,
}

/// A dynamic sphere body.
#[derive(Copy, Clone, Debug)]
pub struct RigidBody {
    pub state: BodyState,
    pub radius: f32,
    pub mass: f32,
    pub material: Material,
    pub use_gravity: bool,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub(crate) linear_accel: Vec3,
    pub(crate) angular_accel: Vec3,
}

impl RigidBody {
    #[must_use]
    pub fn new(state: BodyState, radius: f32, mass: f32, material: Material) -> Self {
        Self {
            state,
            radius,
            mass,
            material,
            use_gravity: true,
            linear_damping: 0.05,
            angular_damping: 0.5,
            linear_accel: Vec3::ZERO,
            angular_accel: Vec3::ZERO,
        }
    }

    /// Moment of inertia of a solid sphere.
    #[must_use]
    pub fn inertia(&self) -> f32 {
        0.4 * self.mass * self.radius * self.radius
    }
}

/// Infinite static plane `normal . p = d`; the side the normal points to is open space.
#[derive(Copy, Clone, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
    pub material: Material,
}

/// Static axis-aligned box used as terrain.
#[derive(Copy, Clone, Debug)]
pub struct StaticBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub material: Material,
}

impl StaticBox {
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        let local = (point - self.center).abs();
        local.x <= self.half_extents.x
            && local.y <= self.half_extents.y
            && local.z <= self.half_extents.z
    }
}

/// Anything a body can touch or a ray can hit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collider {
    Plane(usize),
    Box(usize),
    Body(BodyId),
}

impl Collider {
    /// Static level geometry, as opposed to another dynamic body.
    #[must_use]
    pub const fn is_terrain(self) -> bool {
        matches!(self, Self::Plane(_) | Self::Box(_))
    }
}

#[derive(Copy, Clone, Debug)]
pub struct PhysParams {
    pub gravity: Vec3,
    pub dt: f32,
}

impl Default for PhysParams {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            dt: 0.02,
        }
    }
}
