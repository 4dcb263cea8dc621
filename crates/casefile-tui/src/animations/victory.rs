use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::particles::{
    random_bright_color, EffectType, Particle, CONFETTI_CHARS, EVIDENCE_CHARS,
};

const VICTORY_MESSAGES: [&str; 8] = [
    "CASE CLOSED!",
    "ELEMENTARY!",
    "THE CULPRIT IS CAUGHT!",
    "JUSTICE SERVED!",
    "BRILLIANT DEDUCTION!",
    "MYSTERY SOLVED!",
    "SHARP EYES, DETECTIVE!",
    "THE TRUTH COMES OUT!",
];

pub const BANNER: &str = r#"
  ___   _   ___ ___    ___ _    ___  ___ ___ ___
 / __| /_\ / __| __|  / __| |  / _ \/ __| __|   \
| (__ / _ \\__ \ _|  | (__| |_| (_) \__ \ _|| |) |
 \___/_/ \_\___/___|  \___|____\___/|___/___|___/
"#;

/// The animated victory screen
pub struct VictoryScreen {
    rng: StdRng,
    particles: Vec<Particle>,
    effect_type: EffectType,
    frame_count: u32,
    rainbow_offset: f32,
    message_index: usize,
    firework_cooldown: u32,
    pub width: u16,
    pub height: u16,
}

impl VictoryScreen {
    pub fn new() -> Self {
        let mut rng = StdRng::from_entropy();
        Self {
            effect_type: EffectType::random(&mut rng),
            message_index: rng.gen_range(0..VICTORY_MESSAGES.len()),
            rng,
            particles: Vec::new(),
            frame_count: 0,
            rainbow_offset: 0.0,
            firework_cooldown: 0,
            width: 80,
            height: 24,
        }
    }

    pub fn reset(&mut self) {
        self.particles.clear();
        self.frame_count = 0;
        self.rainbow_offset = 0.0;
        self.effect_type = EffectType::random(&mut self.rng);
        self.message_index = self.rng.gen_range(0..VICTORY_MESSAGES.len());
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width.max(30);
        self.height = height.max(12);
    }

    pub fn update(&mut self) {
        self.frame_count += 1;
        self.rainbow_offset = (self.rainbow_offset + 0.05) % 1.0;

        // Switch effects periodically
        if self.frame_count % 300 == 0 {
            self.effect_type = EffectType::random(&mut self.rng);
        }

        let floor = self.height as f32 + 5.0;
        self.particles.retain_mut(|p| {
            p.step(0.15);
            p.lifetime > 0.0 && p.y < floor
        });

        match self.effect_type {
            EffectType::Confetti => self.spawn_falling(CONFETTI_CHARS, 3),
            EffectType::Evidence => self.spawn_falling(EVIDENCE_CHARS, 2),
            EffectType::Fireworks => self.spawn_fireworks(),
        }
    }

    fn spawn_falling(&mut self, chars: &[char], count: usize) {
        for _ in 0..count {
            let char = chars.choose(&mut self.rng).copied().unwrap_or('*');
            let color = random_bright_color(&mut self.rng);
            self.particles.push(Particle {
                x: self.rng.gen_range(0.0..self.width as f32),
                y: -2.0,
                vx: self.rng.gen_range(-0.5..0.5),
                vy: self.rng.gen_range(0.3..1.0),
                char,
                color,
                lifetime: self.rng.gen_range(3.0..6.0),
            });
        }
    }

    fn spawn_fireworks(&mut self) {
        if self.firework_cooldown > 0 {
            self.firework_cooldown -= 1;
            return;
        }

        if self.rng.gen_bool(0.08) {
            let x = self.rng.gen_range(10.0..(self.width as f32 - 10.0));
            let y = self.rng.gen_range(5.0..(self.height as f32 / 2.0));
            let color = random_bright_color(&mut self.rng);

            for _ in 0..25 {
                let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
                let speed = self.rng.gen_range(0.5..2.0);
                self.particles.push(Particle {
                    x,
                    y,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                    char: '●',
                    color,
                    lifetime: self.rng.gen_range(1.0..2.5),
                });
            }
            self.firework_cooldown = 15;
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn current_message(&self) -> &str {
        VICTORY_MESSAGES[self.message_index]
    }

    pub fn rainbow_offset(&self) -> f32 {
        self.rainbow_offset
    }
}

impl Default for VictoryScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_spawns_and_expires() {
        let mut screen = VictoryScreen::new();
        screen.resize(80, 24);
        for _ in 0..200 {
            screen.update();
        }
        assert!(screen.particles().len() < 2000);
        assert!(VICTORY_MESSAGES.contains(&screen.current_message()));

        screen.reset();
        assert!(screen.particles().is_empty());
    }
}
