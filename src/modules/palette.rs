use macroquad::prelude::Color;
use macroquad::rand;

/// A named fill color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    pub name: &'static str,
    pub color: Color,
}

const fn hex(name: &'static str, rgb: u32) -> Swatch {
    Swatch {
        name,
        color: Color::new(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
            1.0,
        ),
    }
}

/// Bright party colors used by the big pit.
pub const VIVID: [Swatch; 20] = [
    hex("deepskyblue", 0x00bfff),
    hex("dodgerblue", 0x1e90ff),
    hex("mediumspringgreen", 0x00fa9a),
    hex("limegreen", 0x32cd32),
    hex("chartreuse", 0x7fff00),
    hex("gold", 0xffd700),
    hex("orange", 0xffa500),
    hex("orangered", 0xff4500),
    hex("tomato", 0xff6347),
    hex("red", 0xff0000),
    hex("deeppink", 0xff1493),
    hex("hotpink", 0xff69b4),
    hex("mediumvioletred", 0xc71585),
    hex("blueviolet", 0x8a2be2),
    hex("mediumpurple", 0x9370db),
    hex("cyan", 0x00ffff),
    hex("aquamarine", 0x7fffd4),
    hex("yellow", 0xffff00),
    hex("springgreen", 0x00ff7f),
    hex("magenta", 0xff00ff),
];

/// The seven colors of the small pits. Each one is handed out once.
pub const BASIC: [Swatch; 7] = [
    hex("red", 0xff0000),
    hex("blue", 0x0000ff),
    hex("green", 0x008000),
    hex("yellow", 0xffff00),
    hex("purple", 0x800080),
    hex("orange", 0xffa500),
    hex("pink", 0xffc0cb),
];

/// How colors leave the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDraw {
    /// Uniform choice, colors repeat.
    WithReplacement,
    /// Spawn `i` takes entry `i % remaining` and removes it.
    WithoutReplacement,
}

#[derive(Debug, Clone)]
pub struct ColorPicker {
    remaining: Vec<Swatch>,
    draw: ColorDraw,
}

impl ColorPicker {
    pub fn new(palette: &[Swatch], draw: ColorDraw) -> Self {
        Self { remaining: palette.to_vec(), draw }
    }

    /// Color for the `index`-th balloon, or `None` once a one-shot palette is used up.
    pub fn pick(&mut self, index: usize) -> Option<Swatch> {
        if self.remaining.is_empty() {
            return None;
        }
        match self.draw {
            ColorDraw::WithReplacement => {
                let i = rand::gen_range(0, self.remaining.len());
                Some(self.remaining[i])
            }
            ColorDraw::WithoutReplacement => {
                let i = index % self.remaining.len();
                Some(self.remaining.remove(i))
            }
        }
    }
}
