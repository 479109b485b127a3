use macroquad::prelude::Color;

/// Page background, switched by the toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// `#e0f7fa`
pub const LIGHT_BACKGROUND: Color = Color::new(224.0 / 255.0, 247.0 / 255.0, 250.0 / 255.0, 1.0);
/// `#121212`
pub const DARK_BACKGROUND: Color = Color::new(18.0 / 255.0, 18.0 / 255.0, 18.0 / 255.0, 1.0);

impl Theme {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn background(self) -> Color {
        match self {
            Theme::Light => LIGHT_BACKGROUND,
            Theme::Dark => DARK_BACKGROUND,
        }
    }

    pub fn text_color(self) -> Color {
        match self {
            Theme::Light => Color::new(0.1, 0.1, 0.1, 1.0),
            Theme::Dark => Color::new(0.92, 0.92, 0.92, 1.0),
        }
    }

    /// Label for the button that switches away from this theme.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Dark mode",
            Theme::Dark => "Light mode",
        }
    }
}
