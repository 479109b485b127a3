use rapier2d::prelude::*;
use tracing::debug;

use crate::modules::physics::{PhysicsWorld, spring, spring_damping, spring_stiffness};

/// Keeps a held balloon from orbiting the pointer.
const DRAG_DAMPING: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grab {
    body: RigidBodyHandle,
    joint: ImpulseJointHandle,
}

/// Turns pointer presses into a spring between a kinematic cursor body and
/// whatever dynamic body sits under the pointer.
#[derive(Debug)]
pub struct DragController {
    stiffness: f32,
    cursor: Option<RigidBodyHandle>,
    grab: Option<Grab>,
}

impl DragController {
    pub fn new(stiffness: f32) -> Self {
        Self { stiffness, cursor: None, grab: None }
    }

    /// Grab the body under `point`. Returns the held body, if any.
    pub fn press(&mut self, world: &mut PhysicsWorld, point: Point<Real>) -> Option<RigidBodyHandle> {
        self.release(world);
        let body = world.dynamic_body_at(point)?;
        let local = world.bodies.get(body)?.position().inverse_transform_point(&point);
        let cursor = self.place_cursor(world, point);

        let joint = spring(
            Point::origin(),
            local,
            Vector::zeros(),
            spring_stiffness(self.stiffness),
            spring_damping(DRAG_DAMPING),
        );
        let joint = world.insert_joint(cursor, body, joint);
        self.grab = Some(Grab { body, joint });
        debug!(?body, x = point.x, y = point.y, "drag start");
        Some(body)
    }

    /// Move the pointer end of the drag spring.
    pub fn drag_to(&mut self, world: &mut PhysicsWorld, point: Point<Real>) {
        if self.grab.is_none() {
            return;
        }
        if let Some(cursor) = self.cursor.and_then(|handle| world.bodies.get_mut(handle)) {
            cursor.set_next_kinematic_translation(point.coords);
        }
    }

    /// Drop the held body. No-op when nothing is held.
    pub fn release(&mut self, world: &mut PhysicsWorld) -> Option<RigidBodyHandle> {
        let grab = self.grab.take()?;
        // the joint is already gone if the held body was removed
        world.remove_joint(grab.joint);
        debug!(body = ?grab.body, "drag end");
        Some(grab.body)
    }

    /// Release and remove the cursor body.
    pub fn clear(&mut self, world: &mut PhysicsWorld) {
        self.release(world);
        if let Some(cursor) = self.cursor.take() {
            world.remove_body(cursor);
        }
    }

    pub fn grabbed(&self) -> Option<RigidBodyHandle> {
        self.grab.map(|grab| grab.body)
    }

    fn place_cursor(&mut self, world: &mut PhysicsWorld, point: Point<Real>) -> RigidBodyHandle {
        if let Some(handle) = self.cursor {
            if let Some(body) = world.bodies.get_mut(handle) {
                body.set_translation(point.coords, true);
                body.set_next_kinematic_translation(point.coords);
                return handle;
            }
        }
        let body = RigidBodyBuilder::kinematic_position_based().translation(point.coords).build();
        let (handle, _) = world.insert_body(body, [] as [Collider; 0]);
        self.cursor = Some(handle);
        handle
    }
}
