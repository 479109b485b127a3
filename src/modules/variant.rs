//! Tuning tables for the balloon pit pages.
//!
//! All numbers here are in the per-step units the pages were tuned in
//! (gravity scale, per-step air friction, 0..1 constraint stiffness).
//! `physics` converts them to rapier units when bodies are built.

use std::f32::consts::PI;

use clap::ValueEnum;
use macroquad::rand;

use crate::modules::error::PitError;
use crate::modules::palette::{BASIC, ColorDraw, Swatch, VIVID};

/// Uniform range between `min` and `max`. A fixed value has `min == max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const ZERO: Span = Span::fixed(0.0);

    pub const fn fixed(value: f32) -> Self {
        Self { min: value, max: value }
    }

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `scale * (u - 0.5)` for `u` uniform in `[0, 1)`.
    pub const fn centered(scale: f32) -> Self {
        Self { min: -scale * 0.5, max: scale * 0.5 }
    }

    pub fn sample(&self) -> f32 {
        if self.min == self.max {
            return self.min;
        }
        rand::gen_range(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        if self.min == self.max {
            return value == self.min;
        }
        value >= self.min && value <= self.max
    }

    fn check(&self, name: &'static str) -> Result<(), PitError> {
        if self.min > self.max {
            return Err(PitError::InvertedRange { name, min: self.min, max: self.max });
        }
        Ok(())
    }
}

/// How heavy a part is: from a density, or a fixed total mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MassSpec {
    Density(Span),
    Mass(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalloonTuning {
    pub radius: f32,
    pub mass: MassSpec,
    pub material: Material,
    pub air_friction: f32,
    pub angular_damping: f32,
    /// Initial torque kick.
    pub torque: Span,
    /// Initial horizontal force kick.
    pub force_x: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnotTuning {
    /// Circumradius of the triangle.
    pub radius: f32,
    /// Distance below the balloon center.
    pub offset_y: f32,
    pub angle: f32,
    pub mass: MassSpec,
    pub material: Material,
    pub air_friction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Spring (or rigid pin when stiffness reaches 1 at zero length).
    Spring,
    /// Rigid weld, the knot moves as part of the balloon.
    Weld,
}

/// A link between a balloon (body A) and its knot (body B). Anchors are offsets
/// from each body's center as seen on screen when the pair is spawned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintSpec {
    pub kind: ConstraintKind,
    pub anchor_a: [f32; 2],
    pub anchor_b: [f32; 2],
    pub length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl ConstraintSpec {
    const fn spring(anchor_a: [f32; 2], anchor_b: [f32; 2], length: f32, stiffness: f32, damping: f32) -> Self {
        Self { kind: ConstraintKind::Spring, anchor_a, anchor_b, length, stiffness, damping }
    }

    const fn weld(anchor_a: [f32; 2], anchor_b: [f32; 2]) -> Self {
        Self { kind: ConstraintKind::Weld, anchor_a, anchor_b, length: 0.0, stiffness: 1.0, damping: 0.0 }
    }
}

pub const BALLOON_RADIUS: f32 = 30.0;
pub const KNOT_ANGLE: f32 = PI + 0.523;
pub const SIDE_WALLS: Material = Material { friction: 0.1, restitution: 0.0 };
/// Engine default surface friction when a page does not set one.
const DEFAULT_FRICTION: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub name: &'static str,
    pub balloon_count: usize,
    pub gravity: f32,
    pub ground: Material,
    pub palette: &'static [Swatch],
    pub color_draw: ColorDraw,
    pub balloon: BalloonTuning,
    pub knot: KnotTuning,
    pub constraints: &'static [ConstraintSpec],
    pub drag_stiffness: f32,
    /// Kick balloons back up when they hit the floor.
    pub ground_bounce: bool,
    pub show_constraints: bool,
    pub theme_toggle: bool,
}

impl Tuning {
    pub fn validate(&self) -> Result<(), PitError> {
        if self.palette.is_empty() {
            return Err(PitError::EmptyPalette(self.name));
        }
        if !(1..=3).contains(&self.constraints.len()) {
            return Err(PitError::ConstraintCount(self.constraints.len()));
        }
        positive("balloon radius", self.balloon.radius)?;
        positive("knot radius", self.knot.radius)?;
        positive("drag stiffness", self.drag_stiffness)?;
        self.balloon.torque.check("torque")?;
        self.balloon.force_x.check("force")?;
        for (name, mass) in [("balloon density", self.balloon.mass), ("knot density", self.knot.mass)] {
            match mass {
                MassSpec::Density(span) => {
                    span.check(name)?;
                    positive(name, span.min)?;
                }
                MassSpec::Mass(m) => positive(name, m)?,
            }
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), PitError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PitError::NonPositive { name, value })
    }
}

const PIT_LINKS: [ConstraintSpec; 3] = [
    ConstraintSpec::spring([0.0, 33.0], [0.0, -4.0], 0.0, 0.1, 0.0),
    // left and right springs keep the knot straight
    ConstraintSpec::spring([-10.0, 33.0], [-10.0, -14.0], 10.0, 0.01, 0.0),
    ConstraintSpec::spring([10.0, 33.0], [10.0, -14.0], 10.0, 0.01, 0.0),
];
const COMPOUND_LINKS: [ConstraintSpec; 1] = [ConstraintSpec::weld([0.0, 31.0], [0.0, 0.0])];
const BOUNCY_LINKS: [ConstraintSpec; 1] = [ConstraintSpec::spring([0.0, 31.0], [0.0, -6.0], 0.0, 0.7, 0.0)];
const DAMPED_LINKS: [ConstraintSpec; 1] = [ConstraintSpec::spring([0.0, 33.0], [0.0, -4.0], 0.0, 1.0, 0.1)];
const TETHERED_LINKS: [ConstraintSpec; 1] = [ConstraintSpec::spring([0.0, 33.0], [0.0, -4.0], -2.0, 0.5, 0.0)];

const PIT: Tuning = Tuning {
    name: "pit",
    balloon_count: 100,
    gravity: 0.11,
    ground: Material { friction: 0.05, restitution: 0.95 },
    palette: &VIVID,
    color_draw: ColorDraw::WithReplacement,
    balloon: BalloonTuning {
        radius: BALLOON_RADIUS,
        mass: MassSpec::Density(Span::new(0.02, 0.03)),
        material: Material { friction: 0.12, restitution: 0.95 },
        air_friction: 0.01,
        angular_damping: 0.0,
        torque: Span::centered(30.0),
        force_x: Span::centered(3.0),
    },
    knot: KnotTuning {
        radius: 5.0,
        offset_y: 33.0,
        angle: KNOT_ANGLE,
        mass: MassSpec::Density(Span::new(0.02, 0.03)),
        material: Material { friction: 0.02, restitution: 0.95 },
        air_friction: 0.014,
    },
    constraints: &PIT_LINKS,
    drag_stiffness: 0.05,
    ground_bounce: false,
    show_constraints: false,
    theme_toggle: true,
};

const COMPOUND: Tuning = Tuning {
    name: "compound",
    balloon_count: 7,
    gravity: 0.1,
    ground: Material { friction: 0.05, restitution: 3.5 },
    palette: &BASIC,
    color_draw: ColorDraw::WithoutReplacement,
    balloon: BalloonTuning {
        radius: BALLOON_RADIUS,
        mass: MassSpec::Mass(0.001),
        material: Material { friction: 0.05, restitution: 3.5 },
        air_friction: 0.5,
        angular_damping: 0.05,
        torque: Span::centered(0.01),
        force_x: Span::ZERO,
    },
    knot: KnotTuning {
        radius: 6.0,
        offset_y: 31.0,
        angle: KNOT_ANGLE,
        mass: MassSpec::Mass(0.0005),
        material: Material { friction: 0.05, restitution: 3.5 },
        air_friction: 0.5,
    },
    constraints: &COMPOUND_LINKS,
    drag_stiffness: 0.05,
    ground_bounce: true,
    show_constraints: false,
    theme_toggle: false,
};

const BOUNCY: Tuning = Tuning {
    name: "bouncy",
    balloon_count: 7,
    gravity: 0.1,
    ground: Material { friction: 0.001, restitution: 1.0 },
    palette: &BASIC,
    color_draw: ColorDraw::WithoutReplacement,
    balloon: BalloonTuning {
        radius: BALLOON_RADIUS,
        mass: MassSpec::Density(Span::fixed(0.2)),
        material: Material { friction: DEFAULT_FRICTION, restitution: 1.0 },
        air_friction: 0.00001,
        angular_damping: 0.0,
        torque: Span::ZERO,
        force_x: Span::ZERO,
    },
    knot: KnotTuning {
        radius: 6.0,
        offset_y: 31.0,
        angle: KNOT_ANGLE,
        mass: MassSpec::Density(Span::fixed(0.2)),
        material: Material { friction: DEFAULT_FRICTION, restitution: 1.0 },
        air_friction: 0.001,
    },
    constraints: &BOUNCY_LINKS,
    drag_stiffness: 0.05,
    ground_bounce: false,
    show_constraints: true,
    theme_toggle: false,
};

const DAMPED: Tuning = Tuning {
    name: "damped",
    balloon_count: 7,
    gravity: 0.11,
    ground: Material { friction: 0.12, restitution: 0.88 },
    palette: &BASIC,
    color_draw: ColorDraw::WithoutReplacement,
    balloon: BalloonTuning {
        radius: BALLOON_RADIUS,
        mass: MassSpec::Density(Span::fixed(0.028)),
        material: Material { friction: 0.12, restitution: 0.88 },
        air_friction: 0.014,
        angular_damping: 0.0,
        torque: Span::ZERO,
        force_x: Span::ZERO,
    },
    knot: KnotTuning {
        radius: 5.0,
        offset_y: 33.0,
        angle: KNOT_ANGLE,
        mass: MassSpec::Density(Span::fixed(0.1)),
        material: Material { friction: DEFAULT_FRICTION, restitution: 0.88 },
        air_friction: 0.014,
    },
    constraints: &DAMPED_LINKS,
    drag_stiffness: 0.05,
    ground_bounce: false,
    show_constraints: true,
    theme_toggle: false,
};

const TETHERED: Tuning = Tuning {
    name: "tethered",
    balloon_count: 7,
    gravity: 0.11,
    ground: Material { friction: 0.12, restitution: 0.88 },
    palette: &BASIC,
    color_draw: ColorDraw::WithoutReplacement,
    balloon: BalloonTuning {
        radius: BALLOON_RADIUS,
        mass: MassSpec::Density(Span::fixed(0.028)),
        material: Material { friction: 0.12, restitution: 0.88 },
        air_friction: 0.014,
        angular_damping: 0.0,
        torque: Span::centered(30.0),
        force_x: Span::centered(3.0),
    },
    knot: KnotTuning {
        radius: 5.0,
        offset_y: 33.0,
        angle: KNOT_ANGLE,
        mass: MassSpec::Density(Span::fixed(0.1)),
        material: Material { friction: 0.02, restitution: 0.88 },
        air_friction: 0.014,
    },
    constraints: &TETHERED_LINKS,
    drag_stiffness: 0.05,
    ground_bounce: false,
    show_constraints: true,
    theme_toggle: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Variant {
    /// 100 balloons, three springs per knot, theme toggle
    #[default]
    Pit,
    /// Balloon and knot welded into one piece, floor kicks them back up
    Compound,
    /// Near-elastic balloons on a soft pin
    Bouncy,
    /// Rigid pin with damping
    Damped,
    /// Stiff short tether
    Tethered,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Pit,
        Variant::Compound,
        Variant::Bouncy,
        Variant::Damped,
        Variant::Tethered,
    ];

    pub fn tuning(self) -> Tuning {
        match self {
            Variant::Pit => PIT,
            Variant::Compound => COMPOUND,
            Variant::Bouncy => BOUNCY,
            Variant::Damped => DAMPED,
            Variant::Tethered => TETHERED,
        }
    }

    /// Variant bound to number key `n` (1-based).
    pub fn from_number(n: usize) -> Option<Variant> {
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}
