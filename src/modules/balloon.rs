use std::f32::consts::PI;

use rapier2d::prelude::*;

use crate::modules::palette::Swatch;
use crate::modules::physics::{PhysicsWorld, air_damping, joint_for, kick, with_material};
use crate::modules::variant::{MassSpec, Tuning};

/// A drawn mass setting for one part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Heft {
    Density(f32),
    Mass(f32),
}

impl Heft {
    fn draw(spec: MassSpec) -> Self {
        match spec {
            MassSpec::Density(span) => Heft::Density(span.sample()),
            MassSpec::Mass(mass) => Heft::Mass(mass),
        }
    }

    /// Total mass of a part covering `area`.
    pub fn mass(self, area: f32) -> f32 {
        match self {
            Heft::Density(density) => density * area,
            Heft::Mass(mass) => mass,
        }
    }

    fn apply(self, builder: ColliderBuilder) -> ColliderBuilder {
        match self {
            Heft::Density(density) => builder.density(density),
            Heft::Mass(mass) => builder.mass(mass),
        }
    }
}

/// The random draws behind one balloon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalloonParams {
    pub color: Swatch,
    pub balloon: Heft,
    pub knot: Heft,
    pub torque: f32,
    pub force_x: f32,
}

impl BalloonParams {
    pub fn draw(tuning: &Tuning, color: Swatch) -> Self {
        Self {
            color,
            balloon: Heft::draw(tuning.balloon.mass),
            knot: Heft::draw(tuning.knot.mass),
            torque: tuning.balloon.torque.sample(),
            force_x: tuning.balloon.force_x.sample(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Knot {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Balloon {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub knot: Knot,
    pub joints: Vec<ImpulseJointHandle>,
    pub params: BalloonParams,
}

impl Balloon {
    pub fn color(&self) -> Swatch {
        self.params.color
    }
}

/// Corners of a regular triangle with circumradius `radius`, one corner pointing along -X.
pub fn knot_vertices(radius: f32) -> [Point<Real>; 3] {
    let corner = |i: f32| {
        let theta = PI / 3.0 + i * 2.0 * PI / 3.0;
        point![radius * theta.cos(), radius * theta.sin()]
    };
    [corner(0.0), corner(1.0), corner(2.0)]
}

/// Builds a balloon, its knot and the links between them centered at `position`.
pub fn spawn_balloon(world: &mut PhysicsWorld, tuning: &Tuning, params: BalloonParams, position: Vector<Real>) -> Balloon {
    let radius = tuning.balloon.radius;
    let mass = params.balloon.mass(PI * radius * radius);
    let inertia = 0.5 * mass * radius * radius;

    let body = RigidBodyBuilder::dynamic()
        .translation(position)
        .linvel(vector![kick(params.force_x, mass), 0.0])
        .angvel(kick(params.torque, inertia))
        .linear_damping(air_damping(tuning.balloon.air_friction))
        .angular_damping(tuning.balloon.angular_damping)
        .build();
    let mut collider = params.balloon.apply(with_material(ColliderBuilder::ball(radius), tuning.balloon.material));
    if tuning.ground_bounce {
        collider = collider.active_events(ActiveEvents::COLLISION_EVENTS);
    }
    let (body, colliders) = world.insert_body(body, [collider.build()]);

    let [a, b, c] = knot_vertices(tuning.knot.radius);
    let knot_body = RigidBodyBuilder::dynamic()
        .translation(position + vector![0.0, tuning.knot.offset_y])
        .rotation(tuning.knot.angle)
        .linear_damping(air_damping(tuning.knot.air_friction))
        .build();
    let mut knot_collider = params.knot.apply(with_material(ColliderBuilder::triangle(a, b, c), tuning.knot.material));
    if tuning.ground_bounce {
        knot_collider = knot_collider.active_events(ActiveEvents::COLLISION_EVENTS);
    }
    let (knot_body, knot_colliders) = world.insert_body(knot_body, [knot_collider.build()]);

    let joints = tuning
        .constraints
        .iter()
        .map(|spec| world.insert_joint(body, knot_body, joint_for(spec, &tuning.knot)))
        .collect();

    tracing::trace!(color = params.color.name, x = position.x, y = position.y, "spawned balloon");

    Balloon {
        body,
        collider: colliders[0],
        knot: Knot { body: knot_body, collider: knot_colliders[0] },
        joints,
        params,
    }
}
