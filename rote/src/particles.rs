//! # Particles Module - Power-Mode Bursts
//!
//! A purely cosmetic simulation. Every correctly typed character in power-mode
//! spawns a small burst at the cursor; each tick applies gravity, moves the
//! particles and fades them until they disappear. Nothing here feeds back into
//! correctness, completion or metrics.
//!
//! ```rust
//! use rand::{SeedableRng, rngs::StdRng};
//! use rote::config::ParticlePhysics;
//! use rote::particles::{ParticleField, Point};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut field = ParticleField::new(ParticlePhysics::default());
//!
//! field.burst(Point::new(10.0, 4.0), 5, &mut rng);
//! assert_eq!(field.len(), 5);
//!
//! // Opacity drops by 0.02 per tick, so 50 ticks clear the field
//! field.advance(50);
//! assert!(field.is_empty());
//! ```

use rand::Rng;

use crate::config::ParticlePhysics;

/// A 2D position or velocity in abstract pixels
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A colour in HSL space. Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    /// Converts to 8-bit RGB
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);
        let h = self.hue.rem_euclid(360.0) / 60.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - chroma / 2.0;

        let (r, g, b) = match h as u8 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        let channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

/// A single particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: u64,
    pub position: Point,
    pub velocity: Point,
    /// 1.0 when spawned, removed at 0.0
    pub opacity: f64,
    pub size: f64,
    pub color: Hsl,
}

/// The set of live particles
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    next_id: u64,
    physics: ParticlePhysics,
}

impl ParticleField {
    pub const fn new(physics: ParticlePhysics) -> Self {
        Self {
            particles: Vec::new(),
            next_id: 0,
            physics,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Drops every live particle
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Spawns `count` particles at `origin` with randomized velocity, size and hue
    pub fn burst<R: Rng + ?Sized>(&mut self, origin: Point, count: usize, rng: &mut R) {
        let physics = self.physics;
        self.particles.reserve(count);

        for _ in 0..count {
            let velocity = Point::new(
                rng.gen_range(-physics.spread_x..physics.spread_x),
                rng.gen_range(physics.lift_min..physics.lift_max),
            );

            self.particles.push(Particle {
                id: self.next_id,
                position: origin,
                velocity,
                opacity: 1.0,
                size: rng.gen_range(physics.size_min..physics.size_max),
                color: Hsl {
                    hue: rng.gen_range(0.0..360.0),
                    saturation: physics.saturation,
                    lightness: physics.lightness,
                },
            });
            self.next_id += 1;
        }
    }

    /// Advances the simulation by a single tick
    pub fn step(&mut self) {
        let ParticlePhysics { gravity, decay, .. } = self.physics;

        for particle in &mut self.particles {
            particle.velocity.y += gravity;
            particle.position.x += particle.velocity.x;
            particle.position.y += particle.velocity.y;
            particle.opacity -= decay;
        }

        self.particles.retain(|particle| particle.opacity > 0.0);
    }

    /// Advances the simulation by `ticks` ticks, stopping early once empty
    pub fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            if self.particles.is_empty() {
                break;
            }
            self.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn field() -> (ParticleField, StdRng) {
        (
            ParticleField::new(ParticlePhysics::default()),
            StdRng::seed_from_u64(42),
        )
    }

    #[test]
    fn test_burst_ranges() {
        let (mut field, mut rng) = field();
        field.burst(Point::new(3.0, 5.0), 200, &mut rng);

        assert_eq!(field.len(), 200);
        for particle in field.particles() {
            assert_eq!(particle.position, Point::new(3.0, 5.0));
            assert_eq!(particle.opacity, 1.0);
            assert!((-2.0..2.0).contains(&particle.velocity.x));
            assert!((-4.2..1.8).contains(&particle.velocity.y));
            assert!((2.0..7.0).contains(&particle.size));
            assert!((0.0..360.0).contains(&particle.color.hue));
            assert_eq!(particle.color.saturation, 90.0);
            assert_eq!(particle.color.lightness, 65.0);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let (mut field, mut rng) = field();
        field.burst(Point::default(), 5, &mut rng);
        field.burst(Point::default(), 5, &mut rng);

        let mut ids: Vec<u64> = field.particles().iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_step_applies_gravity_before_moving() {
        let (mut field, mut rng) = field();
        field.burst(Point::default(), 1, &mut rng);
        let before = field.particles()[0].clone();

        field.step();
        let after = &field.particles()[0];

        let vy = before.velocity.y + 0.1;
        assert!((after.velocity.y - vy).abs() < 1e-12);
        assert!((after.position.x - before.velocity.x).abs() < 1e-12);
        assert!((after.position.y - vy).abs() < 1e-12);
        assert!((after.opacity - 0.98).abs() < 1e-12);
    }

    #[test]
    fn test_faded_particles_are_removed_same_tick() {
        let (mut field, mut rng) = field();
        field.burst(Point::default(), 5, &mut rng);

        field.advance(49);
        assert_eq!(field.len(), 5);

        field.step();
        assert!(field.is_empty());
    }

    #[test]
    fn test_hsl_to_rgb() {
        let red = Hsl {
            hue: 0.0,
            saturation: 100.0,
            lightness: 50.0,
        };
        assert_eq!(red.to_rgb(), (255, 0, 0));

        let blue = Hsl { hue: 240.0, ..red };
        assert_eq!(blue.to_rgb(), (0, 0, 255));

        let white = Hsl {
            lightness: 100.0,
            ..red
        };
        assert_eq!(white.to_rgb(), (255, 255, 255));
    }
}
