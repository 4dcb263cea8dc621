use crossterm::style::Color;
use rand::seq::SliceRandom;
use rand::Rng;

/// One piece of confetti, spark or flying evidence
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub char: char,
    pub color: Color,
    /// Seconds left before it fades
    pub lifetime: f32,
}

impl Particle {
    /// On screen and not yet faded
    pub fn is_visible(&self, width: u16, height: u16) -> bool {
        let on_screen = (0.0..width as f32).contains(&self.x) && (0.0..height as f32).contains(&self.y);
        on_screen && self.lifetime > 0.0
    }

    /// Advance one frame under gravity
    pub fn step(&mut self, gravity: f32) {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += gravity;
        self.lifetime -= 0.016;
    }
}

/// Celebration styles, picked at random per victory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectType {
    Confetti,
    Fireworks,
    /// Case-file symbols drifting down
    Evidence,
}

impl EffectType {
    const ALL: [EffectType; 3] = [
        EffectType::Confetti,
        EffectType::Fireworks,
        EffectType::Evidence,
    ];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&EffectType::Confetti)
    }
}

const BRIGHT: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

pub fn random_bright_color<R: Rng>(rng: &mut R) -> Color {
    *BRIGHT.choose(rng).unwrap_or(&Color::White)
}

/// Fully saturated colour for a hue in turns; wraps outside 0..1
pub fn hue_to_rgb(hue: f32) -> Color {
    let h = hue.rem_euclid(1.0) * 6.0;
    // Distance-based channel ramp of the HSV hexcone
    let channel = |offset: f32| {
        let k = (offset + h) % 6.0;
        let level = 1.0 - (k.min(4.0 - k).clamp(0.0, 1.0));
        (level * 255.0).round() as u8
    };

    Color::Rgb {
        r: channel(5.0),
        g: channel(3.0),
        b: channel(1.0),
    }
}

pub const CONFETTI_CHARS: &[char] = &['*', '✦', '✧', '◆', '◇', '○', '●', '■', '□', '▲'];

/// Magnifying glasses, pins and paper marks
pub const EVIDENCE_CHARS: &[char] = &['?', '!', '§', '¶', '#', '⌕', '⚲', '✎'];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility() {
        let mut p = Particle {
            x: 1.0,
            y: 1.0,
            vx: 0.0,
            vy: 0.0,
            char: '*',
            color: Color::White,
            lifetime: 0.02,
        };
        assert!(p.is_visible(10, 10));
        p.step(0.0);
        p.step(0.0);
        assert!(!p.is_visible(10, 10));

        p.lifetime = 1.0;
        p.x = 10.0;
        assert!(!p.is_visible(10, 10));
    }

    #[test]
    fn test_hue_primaries() {
        assert_eq!(hue_to_rgb(0.0), Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(hue_to_rgb(1.0 / 3.0), Color::Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(hue_to_rgb(2.0 / 3.0), Color::Rgb { r: 0, g: 0, b: 255 });
        assert_eq!(hue_to_rgb(0.0), hue_to_rgb(1.0));
    }
}
