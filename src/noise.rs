//! Seeded 2-D gradient noise.
//!
//! Values are continuous in both coordinates with a bounded first
//! derivative (quintic fade curve), and are remapped into `[0, 1]` so that
//! `sample - 0.5` is centred on zero.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const TABLE_SIZE: usize = 256;

/// Eight unit-ish gradient directions; the output of a lattice cell stays
/// within `[-1, 1]` before remapping.
const GRADIENTS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2),
    (-std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2),
    (std::f32::consts::FRAC_1_SQRT_2, -std::f32::consts::FRAC_1_SQRT_2),
    (-std::f32::consts::FRAC_1_SQRT_2, -std::f32::consts::FRAC_1_SQRT_2),
];

#[derive(Debug, Clone)]
pub struct PerlinNoise {
    permutation: [u8; TABLE_SIZE * 2],
}

impl PerlinNoise {
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..TABLE_SIZE).map(|i| i as u8).collect();
        table.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut permutation = [0u8; TABLE_SIZE * 2];
        for (i, slot) in permutation.iter_mut().enumerate() {
            *slot = table[i % TABLE_SIZE];
        }
        Self { permutation }
    }

    /// Samples the noise field, returning a value in `[0, 1]`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        if !x.is_finite() || !y.is_finite() {
            return 0.5;
        }
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let xi = (x0 as i64).rem_euclid(TABLE_SIZE as i64) as usize;
        let yi = (y0 as i64).rem_euclid(TABLE_SIZE as i64) as usize;

        let n00 = self.corner(xi, yi, fx, fy);
        let n10 = self.corner(xi + 1, yi, fx - 1.0, fy);
        let n01 = self.corner(xi, yi + 1, fx, fy - 1.0);
        let n11 = self.corner(xi + 1, yi + 1, fx - 1.0, fy - 1.0);

        let u = fade(fx);
        let v = fade(fy);
        let value = lerp(lerp(n00, n10, u), lerp(n01, n11, u), v);
        (value * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    fn corner(&self, xi: usize, yi: usize, dx: f32, dy: f32) -> f32 {
        let hash = self.permutation[self.permutation[xi] as usize + yi];
        let (gx, gy) = GRADIENTS[(hash & 7) as usize];
        gx * dx + gy * dy
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new(0)
    }
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_unit_range() {
        let noise = PerlinNoise::new(7);
        for i in 0..2000 {
            let t = i as f32 * 0.037 - 20.0;
            let value = noise.sample(10.0, t);
            assert!((0.0..=1.0).contains(&value), "{value} out of range at {t}");
        }
    }

    #[test]
    fn lattice_points_are_centred() {
        let noise = PerlinNoise::new(3);
        assert!((noise.sample(1.0, 4.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn small_steps_give_small_changes() {
        let noise = PerlinNoise::new(11);
        let step = 1e-3;
        let mut previous = noise.sample(100.0, 0.0);
        for i in 1..5000 {
            let current = noise.sample(100.0, i as f32 * step);
            assert!((current - previous).abs() < 0.01);
            previous = current;
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = PerlinNoise::new(42);
        let b = PerlinNoise::new(42);
        assert_eq!(a.sample(1.3, 2.7), b.sample(1.3, 2.7));
    }
}
