use macroquad::prelude::*;
use rapier2d::prelude::{ColliderSet, Point, Real, RigidBodySet};

#[cfg(feature = "native")]
use rayon::prelude::*;

use crate::modules::balloon::Balloon;
use crate::modules::physics::knot_anchor;
use crate::modules::scene::Scene;
use crate::modules::theme::Theme;
use crate::modules::variant::{ConstraintKind, Tuning};

const WALL_COLOR: Color = Color::new(0.2, 0.2, 0.25, 1.0);
const LINK_THICKNESS: f32 = 1.5;

/// One draw call, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sprite {
    Circle { center: Vec2, radius: f32, color: Color },
    Triangle { corners: [Vec2; 3], color: Color },
    Rect { center: Vec2, half_extents: Vec2, color: Color },
    /// Drawn in the theme's text color.
    Link { from: Vec2, to: Vec2 },
}

fn to_vec2(p: Point<Real>) -> Vec2 {
    vec2(p.x, p.y)
}

/// Draw commands for the whole scene: walls first, then each balloon with its knot.
pub fn sprites(scene: &Scene) -> Vec<Sprite> {
    let mut out: Vec<Sprite> = scene
        .walls()
        .iter()
        .map(|wall| Sprite::Rect {
            center: vec2(wall.center.x, wall.center.y),
            half_extents: vec2(wall.half_extents.x, wall.half_extents.y),
            color: WALL_COLOR,
        })
        .collect();

    let world = scene.world();
    let (bodies, colliders, tuning) = (&world.bodies, &world.colliders, scene.tuning());

    #[cfg(feature = "native")]
    let balloons: Vec<Sprite> = scene
        .balloons()
        .par_iter()
        .flat_map_iter(|balloon| balloon_sprites(bodies, colliders, tuning, balloon))
        .collect();
    #[cfg(not(feature = "native"))]
    let balloons: Vec<Sprite> = scene
        .balloons()
        .iter()
        .flat_map(|balloon| balloon_sprites(bodies, colliders, tuning, balloon))
        .collect();

    out.extend(balloons);
    out
}

fn balloon_sprites(bodies: &RigidBodySet, colliders: &ColliderSet, tuning: &Tuning, balloon: &Balloon) -> Vec<Sprite> {
    let color = balloon.color().color;
    let mut out = Vec::with_capacity(2 + tuning.constraints.len());

    if let Some(collider) = colliders.get(balloon.collider) {
        if let Some(ball) = collider.shape().as_ball() {
            let center = collider.position().translation.vector;
            out.push(Sprite::Circle { center: vec2(center.x, center.y), radius: ball.radius, color });
        }
    }

    if let Some(collider) = colliders.get(balloon.knot.collider) {
        if let Some(tri) = collider.shape().as_triangle() {
            let pos = collider.position();
            let corners = [tri.a, tri.b, tri.c].map(|p| to_vec2(pos * p));
            out.push(Sprite::Triangle { corners, color });
        }
    }

    if tuning.show_constraints {
        if let (Some(top), Some(knot)) = (bodies.get(balloon.body), bodies.get(balloon.knot.body)) {
            for spec in tuning.constraints.iter().filter(|spec| spec.kind == ConstraintKind::Spring) {
                let from = top.position() * Point::new(spec.anchor_a[0], spec.anchor_a[1]);
                let to = knot.position() * knot_anchor(spec, tuning.knot.angle);
                out.push(Sprite::Link { from: to_vec2(from), to: to_vec2(to) });
            }
        }
    }
    out
}

/// Clear to the theme background and draw every sprite in order.
pub fn draw(sprites: &[Sprite], theme: Theme) {
    clear_background(theme.background());
    for sprite in sprites {
        match *sprite {
            Sprite::Circle { center, radius, color } => draw_circle(center.x, center.y, radius, color),
            Sprite::Triangle { corners: [a, b, c], color } => draw_triangle(a, b, c, color),
            Sprite::Rect { center, half_extents, color } => {
                let corner = center - half_extents;
                draw_rectangle(corner.x, corner.y, half_extents.x * 2.0, half_extents.y * 2.0, color);
            }
            Sprite::Link { from, to } => draw_line(from.x, from.y, to.x, to.y, LINK_THICKNESS, theme.text_color()),
        }
    }
}
