pub mod balloon;
pub mod drag;
pub mod error;
pub mod palette;
pub mod physics;
pub mod render;
pub mod runner;
pub mod scene;
pub mod settings;
pub mod text_button;
pub mod theme;
pub mod variant;
