//! Draw-call boundary
//!
//! The simulation describes what is on screen as a stream of flat shapes plus
//! HUD/overlay data. Pixel formats, fonts and layout belong to the surface.

use glam::Vec2;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color with every channel multiplied by `alpha` (clamped to 0..1)
    pub fn scaled(self, alpha: f32) -> Self {
        let a = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        let scale = |c: u8| (c as f32 * a) as u8;
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Shared palette
pub mod palette {
    use super::Color;

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 100, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const GOLD: Color = Color::rgb(255, 215, 0);
    pub const PINK: Color = Color::rgb(255, 192, 203);
    pub const BROWN: Color = Color::rgb(139, 69, 19);
    pub const DARK_GREEN: Color = Color::rgb(34, 139, 34);
    pub const LIGHT_BLUE: Color = Color::rgb(173, 216, 230);
    pub const NEON_CYAN: Color = Color::rgb(0, 255, 255);
    pub const NEON_PURPLE: Color = Color::rgb(255, 0, 255);
    pub const NEON_GREEN: Color = Color::rgb(0, 255, 100);
    pub const NEON_ORANGE: Color = Color::rgb(255, 150, 0);
}

/// A flat primitive in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect { min: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
}

/// Heads-up display values for the current frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub score: u64,
    pub level: u32,
    pub lives: Option<u32>,
    /// (current, max)
    pub health: Option<(i32, i32)>,
    pub time_left: Option<f32>,
    /// 0..1 distance to the goal
    pub progress: Option<f32>,
    pub target: Option<u64>,
}

/// Full-screen mode overlay
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay<'a> {
    Menu { title: &'static str },
    OptionSelect { options: &'a [u64], selected: usize },
    Paused,
    GameOver { score: u64, best: Option<u64> },
    Victory { score: u64, best: Option<u64> },
}

/// Receiver of draw calls
pub trait Surface {
    fn draw(&mut self, shape: Shape);

    fn hud(&mut self, _hud: &Hud) {}

    fn overlay(&mut self, _overlay: &Overlay<'_>) {}
}

/// Records shapes in draw order
impl Surface for Vec<Shape> {
    fn draw(&mut self, shape: Shape) {
        self.push(shape);
    }
}
