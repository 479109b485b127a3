/*
Balloon pit: a pile of balloons with knots on springs, falling into a
box you can rummage through with the mouse.

Keys: 1-5 switch pit, R refills, T toggles dark mode (first pit only), Esc quits.
*/

mod modules;

use crate::modules::render;
use crate::modules::runner::Runner;
use crate::modules::scene::{Scene, Viewport};
use crate::modules::settings::{Cli, init_logging};
use crate::modules::text_button::TextButton;
use crate::modules::theme::Theme;
use crate::modules::variant::Variant;
use clap::Parser;
use macroquad::miniquad::date;
use macroquad::prelude::*;
use rapier2d::prelude::{Point, Real};
use tracing::{debug, error, info};

const NUMBER_KEYS: [KeyCode; 5] = [KeyCode::Key1, KeyCode::Key2, KeyCode::Key3, KeyCode::Key4, KeyCode::Key5];

/// Set up window settings before the app runs
fn window_conf() -> Conf {
    let cli = Cli::parse();
    Conf {
        window_title: "Balloon Pit".to_string(),
        window_width: cli.width,
        window_height: cli.height,
        fullscreen: false,
        high_dpi: true,
        window_resizable: true,
        sample_count: 4, // MSAA
        ..Default::default()
    }
}

/// Screen pixels map one to one onto physics units.
fn world_point(mouse: Vec2) -> Point<Real> {
    Point::new(mouse.x, mouse.y)
}

/// Builds a scene filling the current window, logging instead of panicking.
fn mount(cli: &Cli, variant: Variant) -> Option<Scene> {
    let scene = Viewport::new(screen_width(), screen_height())
        .and_then(|viewport| Scene::with_count(variant, viewport, cli.balloon_count(variant)));
    match scene {
        Ok(scene) => Some(scene),
        Err(err) => {
            error!(%err, ?variant, "could not set up the balloon pit");
            None
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let seed = cli.seed.unwrap_or(date::now() as u64);
    rand::srand(seed);
    info!(seed, variant = ?cli.variant, "starting balloon pit");

    let Some(mut scene) = mount(&cli, cli.variant) else {
        return;
    };
    let mut runner = Runner::default();
    let mut theme = Theme::default();
    let mut theme_btn = TextButton::new(20.0, 20.0, 160.0, 44.0, theme.toggle_label(), DARKGRAY, GRAY, 24);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            scene.teardown();
            break;
        }

        // Remount: same pit on R, another pit on a number key
        let mut next = is_key_pressed(KeyCode::R).then_some(scene.variant());
        for (i, key) in NUMBER_KEYS.iter().enumerate() {
            if is_key_pressed(*key) {
                next = Variant::from_number(i + 1);
            }
        }
        if let Some(v) = next {
            scene.teardown();
            let Some(fresh) = mount(&cli, v) else {
                break;
            };
            info!(from = ?scene.variant(), to = ?v, "switched pit");
            scene = fresh;
            runner = Runner::default();
        }

        // ---- Pointer -> drag spring ----
        let mouse = Vec2::from(mouse_position());
        let pointer = world_point(mouse);
        let on_button = scene.tuning().theme_toggle && theme_btn.contains(mouse);
        if is_mouse_button_pressed(MouseButton::Left) && !on_button {
            scene.pointer_down(pointer);
        }
        if is_mouse_button_down(MouseButton::Left) && scene.grabbed().is_some() {
            scene.pointer_move(pointer);
        }
        if is_mouse_button_released(MouseButton::Left) {
            scene.pointer_up();
        }

        // ---- Physics at a fixed 60 Hz ----
        for _ in 0..runner.advance(get_frame_time()) {
            scene.step();
        }

        render::draw(&render::sprites(&scene), theme);

        if scene.tuning().theme_toggle && (theme_btn.click() || is_key_pressed(KeyCode::T)) {
            theme = theme.toggle();
            theme_btn.set_label(theme.toggle_label());
            debug!(?theme, "theme switched");
        }

        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_lands_on_the_balloon_under_it() {
        let viewport = Viewport::new(800.0, 600.0).unwrap();
        let mut scene = Scene::with_count(Variant::Damped, viewport, 1).unwrap();
        let balloon = scene.balloons()[0].body;
        let at = *scene.world().bodies[balloon].translation();
        assert_eq!(scene.pointer_down(world_point(vec2(at.x + 10.0, at.y))), Some(balloon));
    }
}
