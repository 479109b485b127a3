//! Rapier world container and the conversions from page-style tuning
//! numbers to rapier units (pixels, seconds).

use rapier2d::crossbeam::channel::{Receiver, unbounded};
// Import Rapier2D physics engine - provides 2D rigid body physics simulation
use rapier2d::prelude::*;

use crate::modules::variant::{ConstraintKind, ConstraintSpec, KnotTuning, Material};

/// Physics runs at a fixed 60 Hz.
pub const STEP_HZ: f32 = 60.0;
pub const STEP_SECONDS: f32 = 1.0 / STEP_HZ;
const STEP_MS: f32 = 1000.0 / STEP_HZ;

/// Gravity scale 1.0 is 1000 px/s² downwards (+Y is down on screen).
pub fn gravity_px(scale: f32) -> Vector<Real> {
    vector![0.0, scale * 1000.0]
}

/// Per-step velocity loss `f` as a rapier damping coefficient.
pub fn air_damping(air_friction: f32) -> f32 {
    if air_friction <= 0.0 {
        return 0.0;
    }
    -(1.0 - air_friction.min(0.999)).ln() * STEP_HZ
}

/// 0..1 stiffness (fraction of error corrected per step) as an acceleration spring constant.
pub fn spring_stiffness(stiffness: f32) -> f32 {
    stiffness * STEP_HZ * STEP_HZ
}

pub fn spring_damping(damping: f32) -> f32 {
    damping * STEP_HZ
}

/// Velocity picked up from `force` acting on `mass` for a single step.
pub fn kick(force: f32, mass: f32) -> f32 {
    force / mass * STEP_MS * STEP_MS * STEP_HZ
}

/// A spring pulling `anchor2` (on the second body) towards `anchor1 + rest`,
/// with `rest` measured along the first body's axes.
///
/// Both linear axes get their own motor. rapier's coupled distance spring
/// indexes out of bounds in the solver when it links two dynamic bodies.
pub fn spring(anchor1: Point<Real>, anchor2: Point<Real>, rest: Vector<Real>, stiffness: f32, damping: f32) -> GenericJoint {
    GenericJointBuilder::new(JointAxesMask::empty())
        .local_anchor1(anchor1)
        .local_anchor2(anchor2)
        .motor_position(JointAxis::X, rest.x, stiffness, damping)
        .motor_model(JointAxis::X, MotorModel::AccelerationBased)
        .motor_position(JointAxis::Y, rest.y, stiffness, damping)
        .motor_model(JointAxis::Y, MotorModel::AccelerationBased)
        .build()
}

/// Knot anchors are written in screen orientation for a knot sitting at its
/// rest rotation. Turn them into the knot body's own frame.
pub fn knot_anchor(spec: &ConstraintSpec, knot_angle: f32) -> Point<Real> {
    Isometry::rotation(-knot_angle) * point![spec.anchor_b[0], spec.anchor_b[1]]
}

/// Offset from the balloon anchor to the knot anchor the link settles at,
/// in the balloon's frame. Its direction is the one the link has at spawn.
fn rest_offset(spec: &ConstraintSpec, knot: &KnotTuning) -> Vector<Real> {
    let length = spec.length.max(0.0);
    if length == 0.0 {
        return Vector::zeros();
    }
    let at_spawn = vector![
        spec.anchor_b[0] - spec.anchor_a[0],
        knot.offset_y + spec.anchor_b[1] - spec.anchor_a[1]
    ];
    match at_spawn.try_normalize(f32::EPSILON) {
        Some(direction) => direction * length,
        None => vector![0.0, length],
    }
}

/// Builds the joint for one balloon/knot link.
pub fn joint_for(spec: &ConstraintSpec, knot: &KnotTuning) -> GenericJoint {
    let a = point![spec.anchor_a[0], spec.anchor_a[1]];
    let b = knot_anchor(spec, knot.angle);
    let mut joint: GenericJoint = match spec.kind {
        ConstraintKind::Weld => FixedJointBuilder::new()
            .local_frame1(Isometry::new(a.coords, knot.angle))
            .local_frame2(Isometry::new(b.coords, 0.0))
            .build()
            .into(),
        // A full-strength zero-length spring is just a pin
        ConstraintKind::Spring if spec.stiffness >= 1.0 && spec.length <= 0.0 => RevoluteJointBuilder::new()
            .local_anchor1(a)
            .local_anchor2(b)
            .build()
            .into(),
        ConstraintKind::Spring => spring(
            a,
            b,
            rest_offset(spec, knot),
            spring_stiffness(spec.stiffness),
            spring_damping(spec.damping),
        ),
    };
    // balloon and knot overlap on purpose
    joint.set_contacts_enabled(false);
    joint
}

/// Surface settings shared by every collider in the pit.
pub fn with_material(builder: ColliderBuilder, material: Material) -> ColliderBuilder {
    builder
        .friction(material.friction)
        .restitution(material.restitution)
        .friction_combine_rule(CoefficientCombineRule::Min)
        .restitution_combine_rule(CoefficientCombineRule::Max)
}

/// Every rapier structure needed to step one scene.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    // PhysicsPipeline orchestrates all physics computations each frame
    pipeline: PhysicsPipeline,
    // IslandManager groups bodies that can interact for more efficient simulation
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    // Balloon/knot links and the drag spring
    pub joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    // Kept in sync by `step` so pointer queries see the latest positions
    query: QueryPipeline,
    events: ChannelEventCollector,
    collisions: Receiver<CollisionEvent>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vector<Real>) -> Self {
        let mut integration_params = IntegrationParameters::default();
        integration_params.dt = STEP_SECONDS;

        let (collision_send, collisions) = unbounded();
        let (force_send, _force_recv) = unbounded();

        Self {
            gravity,
            integration_params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query: QueryPipeline::new(),
            events: ChannelEventCollector::new(collision_send, force_send),
            collisions,
        }
    }

    /// Advance the simulation by one fixed step.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query),
            &(),
            &self.events,
        );
    }

    /// Collision events produced since the last call.
    pub fn drain_collisions(&self) -> Vec<CollisionEvent> {
        self.collisions.try_iter().collect()
    }

    pub fn insert_body(&mut self, body: RigidBody, colliders: impl IntoIterator<Item = Collider>) -> (RigidBodyHandle, Vec<ColliderHandle>) {
        let handle = self.bodies.insert(body);
        let attached = colliders
            .into_iter()
            .map(|collider| self.colliders.insert_with_parent(collider, handle, &mut self.bodies))
            .collect();
        (handle, attached)
    }

    pub fn insert_joint(&mut self, a: RigidBodyHandle, b: RigidBodyHandle, joint: impl Into<GenericJoint>) -> ImpulseJointHandle {
        self.joints.insert(a, b, joint, true)
    }

    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) -> bool {
        self.joints.remove(handle, true).is_some()
    }

    /// Removes the body together with its colliders and joints.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Topmost dynamic body whose collider contains `point`. Colliders are
    /// inserted in draw order, so the highest collider index is drawn last.
    pub fn dynamic_body_at(&mut self, point: Point<Real>) -> Option<RigidBodyHandle> {
        self.query.update(&self.bodies, &self.colliders);
        let mut hit: Option<ColliderHandle> = None;
        self.query.intersections_with_point(
            &self.bodies,
            &self.colliders,
            &point,
            QueryFilter::only_dynamic(),
            |collider| {
                if hit.is_none_or(|top| top.into_raw_parts().0 < collider.into_raw_parts().0) {
                    hit = Some(collider);
                }
                true
            },
        );
        self.colliders.get(hit?)?.parent()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversions() {
        assert_eq!(gravity_px(0.1), vector![0.0, 100.0]);
        assert_eq!(air_damping(0.0), 0.0);
        // one step at this damping loses exactly 1% of the velocity
        let d = air_damping(0.01);
        assert!(((-d / STEP_HZ).exp() - 0.99).abs() < 1e-5);
        assert_eq!(spring_stiffness(0.05), 0.05 * 3600.0);
        assert_eq!(spring_damping(0.1), 6.0);
        assert!(kick(1.5, 70.0) > 0.0);
        assert!(kick(-1.5, 70.0) < 0.0);
    }

    #[test]
    fn static_bodies_stay_and_dynamic_bodies_fall() {
        let mut world = PhysicsWorld::new(gravity_px(0.1));
        let (wall, _) = world.insert_body(
            RigidBodyBuilder::fixed().translation(vector![0.0, 500.0]).build(),
            [ColliderBuilder::cuboid(50.0, 10.0).build()],
        );
        let (ball, _) = world.insert_body(
            RigidBodyBuilder::dynamic().translation(vector![0.0, 0.0]).build(),
            [ColliderBuilder::ball(10.0).build()],
        );
        for _ in 0..30 {
            world.step();
        }
        assert_eq!(world.bodies[wall].translation().y, 500.0);
        assert!(world.bodies[ball].translation().y > 0.0);
    }

    #[test]
    fn point_query_ignores_static_bodies() {
        let mut world = PhysicsWorld::new(gravity_px(0.0));
        world.insert_body(
            RigidBodyBuilder::fixed().translation(vector![0.0, 0.0]).build(),
            [ColliderBuilder::cuboid(50.0, 50.0).build()],
        );
        let (ball, _) = world.insert_body(
            RigidBodyBuilder::dynamic().translation(vector![200.0, 0.0]).build(),
            [ColliderBuilder::ball(10.0).build()],
        );
        assert_eq!(world.dynamic_body_at(point![0.0, 0.0]), None);
        assert_eq!(world.dynamic_body_at(point![205.0, 0.0]), Some(ball));
        assert_eq!(world.dynamic_body_at(point![300.0, 0.0]), None);
    }

    #[test]
    fn removing_a_body_drops_its_colliders_and_joints() {
        let mut world = PhysicsWorld::new(gravity_px(0.1));
        let (a, _) = world.insert_body(RigidBodyBuilder::dynamic().build(), [ColliderBuilder::ball(5.0).build()]);
        let (b, _) = world.insert_body(RigidBodyBuilder::dynamic().build(), [ColliderBuilder::ball(5.0).build()]);
        world.insert_joint(a, b, RevoluteJointBuilder::new().build());
        assert_eq!((world.body_count(), world.collider_count(), world.joint_count()), (2, 2, 1));

        assert!(world.remove_body(a));
        assert_eq!((world.body_count(), world.collider_count(), world.joint_count()), (1, 1, 0));
        assert!(!world.remove_body(a));
    }

    #[test]
    fn overlapping_bodies_pick_the_last_one_added() {
        let mut world = PhysicsWorld::new(gravity_px(0.0));
        let (under, _) = world.insert_body(
            RigidBodyBuilder::dynamic().translation(vector![0.0, 0.0]).build(),
            [ColliderBuilder::ball(30.0).build()],
        );
        let (over, _) = world.insert_body(
            RigidBodyBuilder::dynamic().translation(vector![0.0, 25.0]).build(),
            [ColliderBuilder::ball(10.0).build()],
        );
        assert_eq!(world.dynamic_body_at(point![0.0, 20.0]), Some(over));
        assert_eq!(world.dynamic_body_at(point![0.0, -20.0]), Some(under));
    }

    #[test]
    fn knot_anchors_undo_the_knot_rest_rotation() {
        let spec = crate::modules::variant::Variant::Damped.tuning().constraints[0];
        let angle = 2.0;
        let local = knot_anchor(&spec, angle);
        let on_screen = Isometry::rotation(angle) * local;
        assert!((on_screen.x - spec.anchor_b[0]).abs() < 1e-4);
        assert!((on_screen.y - spec.anchor_b[1]).abs() < 1e-4);
    }

    #[test]
    fn spring_between_two_dynamic_bodies_reaches_its_rest_offset() {
        let mut world = PhysicsWorld::new(gravity_px(0.0));
        let (a, _) = world.insert_body(
            RigidBodyBuilder::dynamic().translation(vector![0.0, 0.0]).build(),
            [ColliderBuilder::ball(10.0).build()],
        );
        let (b, _) = world.insert_body(
            RigidBodyBuilder::dynamic().translation(vector![0.0, 40.0]).build(),
            [ColliderBuilder::ball(5.0).build()],
        );
        let joint = spring(Point::origin(), Point::origin(), vector![0.0, 20.0], spring_stiffness(0.1), spring_damping(0.1));
        world.insert_joint(a, b, joint);
        for _ in 0..240 {
            world.step();
        }
        let gap = world.bodies[b].translation() - world.bodies[a].translation();
        assert!(gap.x.abs() < 0.5, "{gap:?}");
        assert!((gap.y - 20.0).abs() < 0.5, "{gap:?}");
    }
}
