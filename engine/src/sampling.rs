use fastnoise_lite::{FastNoiseLite, NoiseType};
use noise::{NoiseFn, OpenSimplex, Perlin};
use serde::{Deserialize, Serialize};

use crate::api::NoiseSource;

/// Noise backend used by the island synthesizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseKind {
    Perlin,
    #[default]
    OpenSimplex,
    FastNoise,
}

impl NoiseKind {
    pub fn build(self, seed: u32) -> Box<dyn NoiseSource> {
        match self {
            NoiseKind::Perlin => Box::new(PerlinSource::new(seed)),
            NoiseKind::OpenSimplex => Box::new(SimplexSource::new(seed)),
            NoiseKind::FastNoise => Box::new(FnlSource::new(seed)),
        }
    }
}

pub struct PerlinSource {
    noise: Perlin,
}

impl PerlinSource {
    pub fn new(seed: u32) -> Self {
        Self { noise: Perlin::new(seed) }
    }
}

impl NoiseSource for PerlinSource {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        self.noise.get([x as f64, y as f64, z as f64]) as f32
    }
}

pub struct SimplexSource {
    noise: OpenSimplex,
}

impl SimplexSource {
    pub fn new(seed: u32) -> Self {
        Self { noise: OpenSimplex::new(seed) }
    }
}

impl NoiseSource for SimplexSource {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        self.noise.get([x as f64, y as f64, z as f64]) as f32
    }
}

/// FastNoiseLite OpenSimplex2 sampled at unit frequency, so callers control
/// the scale through their coordinates.
pub struct FnlSource {
    noise: FastNoiseLite,
}

impl FnlSource {
    pub fn new(seed: u32) -> Self {
        let mut f = FastNoiseLite::with_seed(seed as i32);
        f.set_noise_type(Some(NoiseType::OpenSimplex2));
        f.set_frequency(Some(1.0));
        Self { noise: f }
    }
}

impl NoiseSource for FnlSource {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        self.noise.get_noise_3d(x, y, z)
    }
}

/// Any closure as a noise field.
pub struct FnSource<F>(pub F);

impl<F: Fn(f32, f32, f32) -> f32> NoiseSource for FnSource<F> {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        (self.0)(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backends_are_deterministic_and_bounded() {
        for kind in [NoiseKind::Perlin, NoiseKind::OpenSimplex, NoiseKind::FastNoise] {
            let a = kind.build(7);
            let b = kind.build(7);
            for i in 0..64 {
                let (x, y, z) = (i as f32 * 0.37 + 40.0, 3.3, i as f32 * 0.11 + 40.0);
                let va = a.sample(x, y, z);
                assert_eq!(va, b.sample(x, y, z), "{kind:?}");
                assert!((-1.5..=1.5).contains(&va), "{kind:?}: {va}");
            }
        }
    }

    #[test]
    fn closure_source() {
        let f = FnSource(|x: f32, _y: f32, z: f32| x - z);
        assert_eq!(f.sample(3.0, 0.0, 1.0), 2.0);
    }
}
