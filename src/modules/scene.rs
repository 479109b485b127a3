use macroquad::rand;
use rapier2d::prelude::*;
use tracing::{debug, info};

use crate::modules::balloon::{Balloon, BalloonParams, spawn_balloon};
use crate::modules::drag::DragController;
use crate::modules::error::PitError;
use crate::modules::palette::ColorPicker;
use crate::modules::physics::{PhysicsWorld, air_damping, gravity_px, with_material};
use crate::modules::variant::{Material, SIDE_WALLS, Tuning, Variant};

const WALL_THICKNESS: f32 = 20.0;
/// Balloons this close to the bottom edge count as sitting on the floor.
const FLOOR_BAND: f32 = 35.0;
const BOUNCE_DAMPING: f32 = 0.98;
const BOUNCE_KICK: f32 = 1.5;
const BOUNCE_AIR_FRICTION: f32 = 0.5;

/// Size of the render surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Result<Self, PitError> {
        let usable = |v: f32| v.is_finite() && v > 0.0;
        if !usable(width) || !usable(height) {
            return Err(PitError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Ground,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub side: WallSide,
    pub body: RigidBodyHandle,
    pub center: Vector<Real>,
    pub half_extents: Vector<Real>,
}

/// One mounted balloon pit: the physics world, its walls, balloons and pointer state.
pub struct Scene {
    variant: Variant,
    tuning: Tuning,
    viewport: Viewport,
    world: PhysicsWorld,
    walls: Vec<Wall>,
    balloons: Vec<Balloon>,
    drag: DragController,
}

impl Scene {
    /// Builds the scene with the variant's own balloon count.
    pub fn new(variant: Variant, viewport: Viewport) -> Result<Self, PitError> {
        Self::with_count(variant, viewport, variant.tuning().balloon_count)
    }

    pub fn with_count(variant: Variant, viewport: Viewport, count: usize) -> Result<Self, PitError> {
        let viewport = Viewport::new(viewport.width, viewport.height)?;
        let tuning = variant.tuning();
        tuning.validate()?;

        let mut scene = Self {
            variant,
            tuning,
            viewport,
            world: PhysicsWorld::new(gravity_px(tuning.gravity)),
            walls: Vec::with_capacity(3),
            balloons: Vec::with_capacity(count),
            drag: DragController::new(tuning.drag_stiffness),
        };
        scene.build_walls();

        let mut picker = ColorPicker::new(tuning.palette, tuning.color_draw);
        for i in 0..count {
            let Some(color) = picker.pick(i) else {
                debug!(variant = tuning.name, skipped = count - i, "palette used up");
                break;
            };
            let position = vector![
                rand::gen_range(0.0, viewport.width),
                rand::gen_range(0.0, viewport.height / 2.0)
            ];
            let params = BalloonParams::draw(&tuning, color);
            let balloon = spawn_balloon(&mut scene.world, &tuning, params, position);
            scene.balloons.push(balloon);
        }

        info!(
            variant = tuning.name,
            balloons = scene.balloons.len(),
            width = viewport.width,
            height = viewport.height,
            "scene mounted"
        );
        Ok(scene)
    }

    fn build_walls(&mut self) {
        let Viewport { width: w, height: h } = self.viewport;
        let t = WALL_THICKNESS;
        let layout = [
            (WallSide::Ground, vector![w / 2.0, h], vector![w / 2.0, t / 2.0], self.tuning.ground),
            (WallSide::Left, vector![-t / 2.0, h / 2.0], vector![t / 2.0, h], SIDE_WALLS),
            (WallSide::Right, vector![w + t / 2.0, h / 2.0], vector![t / 2.0, h], SIDE_WALLS),
        ];
        for (side, center, half_extents, material) in layout {
            let body = RigidBodyBuilder::fixed().translation(center).build();
            let collider = wall_collider(half_extents, material);
            let (body, _) = self.world.insert_body(body, [collider]);
            self.walls.push(Wall { side, body, center, half_extents });
        }
    }

    /// One fixed physics step.
    pub fn step(&mut self) {
        if !self.tuning.ground_bounce {
            self.world.step();
            return;
        }
        // rapier resolves the floor contact inside the step, so judge the
        // height from where each pair was before it
        let heights: Vec<Option<f32>> = self
            .balloons
            .iter()
            .map(|balloon| pair_center_y(&self.world.bodies, balloon))
            .collect();
        self.world.step();
        let touched: Vec<ColliderHandle> = self
            .world
            .drain_collisions()
            .iter()
            .filter_map(|event| match event {
                CollisionEvent::Started(a, b, _) => Some([*a, *b]),
                CollisionEvent::Stopped(..) => None,
            })
            .flatten()
            .collect();
        self.bounce_off_ground(&touched, &heights);
    }

    /// Balloons that just touched something while resting on the floor get
    /// thrown back up and lose their spin. Height is measured at the
    /// balloon/knot center of mass.
    fn bounce_off_ground(&mut self, touched: &[ColliderHandle], heights: &[Option<f32>]) {
        let floor = self.viewport.height - FLOOR_BAND;
        let bodies = &mut self.world.bodies;
        for (balloon, height) in self.balloons.iter().zip(heights) {
            if !touched.contains(&balloon.collider) && !touched.contains(&balloon.knot.collider) {
                continue;
            }
            if !height.is_some_and(|y| y >= floor) {
                continue;
            }
            let Some(body) = bodies.get_mut(balloon.body) else {
                continue;
            };
            let v = *body.linvel();
            body.set_angvel(0.0, true);
            body.set_linvel(vector![v.x * BOUNCE_DAMPING, -v.y.abs() * BOUNCE_KICK], true);
            body.set_linear_damping(air_damping(BOUNCE_AIR_FRICTION));
            debug!(body = ?balloon.body, "ground bounce");
        }
    }

    pub fn pointer_down(&mut self, point: Point<Real>) -> Option<RigidBodyHandle> {
        self.drag.press(&mut self.world, point)
    }

    pub fn pointer_move(&mut self, point: Point<Real>) {
        self.drag.drag_to(&mut self.world, point);
    }

    pub fn pointer_up(&mut self) -> Option<RigidBodyHandle> {
        self.drag.release(&mut self.world)
    }

    pub fn grabbed(&self) -> Option<RigidBodyHandle> {
        self.drag.grabbed()
    }

    /// Removes every body and constraint. Calling it again does nothing.
    pub fn teardown(&mut self) {
        if self.balloons.is_empty() && self.walls.is_empty() {
            return;
        }
        self.drag.clear(&mut self.world);
        for balloon in self.balloons.drain(..) {
            self.world.remove_body(balloon.knot.body);
            self.world.remove_body(balloon.body);
        }
        for wall in self.walls.drain(..) {
            self.world.remove_body(wall.body);
        }
        info!(
            variant = self.tuning.name,
            bodies = self.world.body_count(),
            joints = self.world.joint_count(),
            "scene torn down"
        );
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }
}

fn pair_center_y(bodies: &RigidBodySet, balloon: &Balloon) -> Option<f32> {
    let top = bodies.get(balloon.body)?;
    let knot = bodies.get(balloon.knot.body)?;
    let total = top.mass() + knot.mass();
    if total <= 0.0 {
        return Some(top.translation().y);
    }
    Some((top.mass() * top.translation().y + knot.mass() * knot.translation().y) / total)
}

fn wall_collider(half_extents: Vector<Real>, material: Material) -> Collider {
    with_material(ColliderBuilder::cuboid(half_extents.x, half_extents.y), material).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0).unwrap()
    }

    #[test]
    fn unusable_viewport_is_rejected() {
        assert_eq!(Viewport::new(0.0, 600.0), Err(PitError::InvalidViewport { width: 0.0, height: 600.0 }));
        assert!(Viewport::new(800.0, f32::NAN).is_err());
        let bad = Viewport { width: -1.0, height: 10.0 };
        assert!(Scene::new(Variant::Pit, bad).is_err());
    }

    #[test]
    fn three_walls_plus_balloon_knot_pairs() {
        let scene = Scene::new(Variant::Pit, viewport()).unwrap();
        assert_eq!(scene.walls().len(), 3);
        assert_eq!(scene.balloons().len(), 100);
        let world = scene.world();
        assert_eq!(world.body_count(), 3 + 100 * 2);
        assert_eq!(world.collider_count(), 3 + 100 * 2);
        assert_eq!(world.joint_count(), 100 * 3);
        for wall in scene.walls() {
            assert!(world.bodies[wall.body].is_fixed());
        }
        for balloon in scene.balloons() {
            assert_ne!(balloon.body, balloon.knot.body);
            let pos = world.bodies[balloon.body].translation();
            assert!((0.0..=800.0).contains(&pos.x));
            assert!((0.0..=300.0).contains(&pos.y));
        }
    }

    #[test]
    fn wall_layout() {
        let scene = Scene::new(Variant::Bouncy, viewport()).unwrap();
        let sides: Vec<WallSide> = scene.walls().iter().map(|w| w.side).collect();
        assert_eq!(sides, vec![WallSide::Ground, WallSide::Left, WallSide::Right]);
        let ground = scene.walls()[0];
        assert_eq!(ground.center, vector![400.0, 600.0]);
        assert_eq!(ground.half_extents, vector![400.0, 10.0]);
        assert_eq!(scene.walls()[1].center, vector![-10.0, 300.0]);
        assert_eq!(scene.walls()[2].center, vector![810.0, 300.0]);
        assert_eq!(scene.walls()[2].half_extents, vector![10.0, 600.0]);
    }

    #[test]
    fn one_shot_palette_caps_the_balloon_count() {
        let scene = Scene::with_count(Variant::Bouncy, viewport(), 12).unwrap();
        assert_eq!(scene.balloons().len(), 7);
        let mut names: Vec<&str> = scene.balloons().iter().map(|b| b.color().name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn walls_stay_put_while_balloons_fall() {
        let mut scene = Scene::with_count(Variant::Damped, viewport(), 1).unwrap();
        let start: Vec<f32> = scene
            .balloons()
            .iter()
            .map(|b| scene.world().bodies[b.body].translation().y)
            .collect();
        for _ in 0..20 {
            scene.step();
        }
        for wall in scene.walls() {
            assert_eq!(*scene.world().bodies[wall.body].translation(), wall.center);
        }
        for (balloon, y0) in scene.balloons().iter().zip(start) {
            assert!(scene.world().bodies[balloon.body].translation().y > y0);
        }
    }

    #[test]
    fn teardown_leaves_nothing_behind() {
        for variant in Variant::ALL {
            let mut scene = Scene::new(variant, viewport()).unwrap();
            let first = scene.balloons()[0].body;
            let at = *scene.world().bodies[first].translation();
            scene.pointer_down(point![at.x, at.y]);
            for _ in 0..5 {
                scene.step();
            }
            scene.teardown();
            let world = scene.world();
            assert_eq!((world.body_count(), world.collider_count(), world.joint_count()), (0, 0, 0), "{variant:?}");
            assert!(scene.balloons().is_empty());
            assert!(scene.walls().is_empty());
            assert_eq!(scene.grabbed(), None);
            scene.teardown();
        }
    }

    #[test]
    fn pointer_grabs_and_releases_a_balloon() {
        let mut scene = Scene::with_count(Variant::Damped, viewport(), 1).unwrap();
        let balloon = scene.balloons()[0].body;
        let at = *scene.world().bodies[balloon].translation();
        let joints = scene.world().joint_count();

        assert_eq!(scene.pointer_down(point![at.x, at.y]), Some(balloon));
        assert_eq!(scene.world().joint_count(), joints + 1);
        scene.pointer_move(point![at.x, at.y - 100.0]);
        scene.step();
        assert_eq!(scene.pointer_up(), Some(balloon));
        assert_eq!(scene.world().joint_count(), joints);
        assert_eq!(scene.pointer_up(), None);
    }

    /// Puts the single compound balloon at `(x, y)` with its knot welded 31 px
    /// below, heading down and spinning.
    fn place_compound(scene: &mut Scene, x: f32, y: f32) -> RigidBodyHandle {
        let balloon = scene.balloons()[0].body;
        let knot = scene.balloons()[0].knot.body;
        for (handle, y) in [(balloon, y), (knot, y + 31.0)] {
            if let Some(body) = scene.world.bodies.get_mut(handle) {
                body.set_translation(vector![x, y], true);
                body.set_linvel(vector![10.0, 200.0], true);
                body.set_angvel(3.0, true);
            }
        }
        balloon
    }

    #[test]
    fn floor_contact_kicks_compound_balloons_up() {
        let mut scene = Scene::with_count(Variant::Compound, viewport(), 1).unwrap();
        // floor top is at 590, the knot tip already pokes into it
        let balloon = place_compound(&mut scene, 400.0, 560.0);
        scene.step();
        let body = &scene.world().bodies[balloon];
        assert_eq!(body.angvel(), 0.0);
        assert!(body.linvel().y < 0.0);
        assert_eq!(body.linear_damping(), air_damping(BOUNCE_AIR_FRICTION));
    }

    #[test]
    fn contacts_above_the_floor_band_do_not_bounce() {
        let mut scene = Scene::with_count(Variant::Compound, viewport(), 1).unwrap();
        // overlapping the left wall, far from the floor
        let balloon = place_compound(&mut scene, 25.0, 300.0);
        scene.step();
        assert_ne!(scene.world().bodies[balloon].angvel(), 0.0);
    }

    #[test]
    fn every_variant_keeps_stepping() {
        for variant in Variant::ALL {
            let mut scene = Scene::new(variant, viewport()).unwrap();
            for _ in 0..60 {
                scene.step();
            }
            for balloon in scene.balloons() {
                for body in [balloon.body, balloon.knot.body] {
                    let at = scene.world().bodies[body].translation();
                    assert!(at.x.is_finite() && at.y.is_finite(), "{variant:?}");
                }
            }
        }
    }

    #[test]
    fn pressing_the_knot_grabs_the_knot() {
        let mut scene = Scene::with_count(Variant::Damped, viewport(), 1).unwrap();
        let (balloon, knot) = (scene.balloons()[0].body, scene.balloons()[0].knot.body);
        let at = *scene.world().bodies[balloon].translation();
        // the knot's tip reaches up into the balloon and is drawn over it
        assert_eq!(scene.pointer_down(point![at.x, at.y + 29.0]), Some(knot));
        assert_eq!(scene.pointer_down(point![at.x, at.y]), Some(balloon));
    }
}
