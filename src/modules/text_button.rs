/*
Clickable rectangle with a centered label.

    let mut btn = TextButton::new(20.0, 20.0, 160.0, 44.0, "Dark mode", DARKGRAY, GRAY, 24);
    if btn.click() {
        btn.set_label("Light mode");
    }
*/

use macroquad::prelude::*;

pub struct TextButton {
    rect: Rect,
    label: String,
    color: Color,
    hover_color: Color,
    text_color: Color,
    font_size: u16,
}

impl TextButton {
    pub fn new(x: f32, y: f32, width: f32, height: f32, label: impl Into<String>, color: Color, hover_color: Color, font_size: u16) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            label: label.into(),
            color,
            hover_color,
            text_color: WHITE,
            font_size,
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.rect.contains(point)
    }

    /// Draws the button and reports a left click released over it.
    pub fn click(&self) -> bool {
        let mouse = Vec2::from(mouse_position());
        let hovered = self.contains(mouse);
        let fill = if hovered { self.hover_color } else { self.color };
        draw_rectangle(self.rect.x, self.rect.y, self.rect.w, self.rect.h, fill);

        let size = measure_text(&self.label, None, self.font_size, 1.0);
        let x = self.rect.x + (self.rect.w - size.width) / 2.0;
        let y = self.rect.y + (self.rect.h + size.offset_y) / 2.0;
        draw_text(&self.label, x, y, self.font_size as f32, self.text_color);

        hovered && is_mouse_button_released(MouseButton::Left)
    }
}
