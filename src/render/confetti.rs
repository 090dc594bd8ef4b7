//! Confetti particle generator.

use rand::Rng;
use serde::Serialize;

/// Colours a particle can take.
pub const PALETTE: [&str; 7] = [
    "#FFD700", "#FF6B35", "#E63946", "#2ECC71", "#3498DB", "#9B59B6", "#F39C12",
];

/// Extra spin applied on top of a particle's own rotation while it falls.
pub const FALL_SPIN_DEG: f32 = 720.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleShape {
    Round,
    Square,
}

/// One falling piece of confetti.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub id: usize,
    /// Horizontal start position, percent of the surface width.
    pub x: f32,
    pub color: &'static str,
    /// Edge length in px.
    pub size: f32,
    /// Seconds before the particle starts falling.
    pub delay: f32,
    /// Seconds the fall takes.
    pub duration: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    pub shape: ParticleShape,
}

impl Particle {
    /// Rotation at the end of the fall.
    pub fn final_rotation(&self) -> f32 {
        self.rotation + FALL_SPIN_DEG
    }
}

/// A fresh burst of `count` particles.
pub fn generate(count: usize) -> Vec<Particle> {
    generate_with(&mut rand::thread_rng(), count)
}

/// Like [`generate`], drawing from `rng`.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Particle> {
    (0..count)
        .map(|id| Particle {
            id,
            x: rng.gen_range(0.0..100.0),
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
            size: rng.gen_range(4.0..12.0),
            delay: rng.gen_range(0.0..0.3),
            duration: rng.gen_range(1.5..3.0),
            rotation: rng.gen_range(0.0..360.0),
            shape: if rng.gen_bool(0.5) {
                ParticleShape::Round
            } else {
                ParticleShape::Square
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn particles_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let particles = generate_with(&mut rng, 500);
        assert_eq!(particles.len(), 500);
        for (i, p) in particles.iter().enumerate() {
            assert_eq!(p.id, i);
            assert!((0.0..100.0).contains(&p.x));
            assert!((4.0..12.0).contains(&p.size));
            assert!((0.0..0.3).contains(&p.delay));
            assert!((1.5..3.0).contains(&p.duration));
            assert!((0.0..360.0).contains(&p.rotation));
            assert!(PALETTE.contains(&p.color));
            assert_eq!(p.final_rotation(), p.rotation + 720.0);
        }
    }

    #[test]
    fn same_seed_same_burst() {
        let a = generate_with(&mut StdRng::seed_from_u64(42), 20);
        let b = generate_with(&mut StdRng::seed_from_u64(42), 20);
        assert_eq!(a, b);
    }

    #[test]
    fn each_call_is_independent() {
        let a = generate(50);
        let b = generate(50);
        assert_eq!(a.len(), 50);
        assert_ne!(a, b);
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(generate(0).is_empty());
    }
}
