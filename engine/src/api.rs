use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("No island found after {steps} diagonal steps")]
    SeedNotFound { steps: u32 },
    #[error("Island flood fill exceeded {cells} cells")]
    IslandTooLarge { cells: usize },
    #[error("Island outline is empty")]
    EmptyOutline,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;

/// Seed string hashed into the noise sampling origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed(pub String);

impl Seed {
    /// 32-bit FNV-1a over the UTF-8 bytes, reinterpreted as signed.
    pub fn hash(&self) -> i32 {
        let mut h: u32 = 0x811c_9dc5;
        for b in self.0.bytes() {
            h ^= b as u32;
            h = h.wrapping_mul(0x0100_0193);
        }
        h as i32
    }

    /// Offset along the noise y axis that selects one "slice" of islands.
    pub fn sampling_offset(&self) -> f32 {
        (self.hash() as f32 / 3.33) % 30.0
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self { Seed(s.to_string()) }
}

/// Opaque scalar field, deterministic for identical inputs, roughly in [-1, 1].
pub trait NoiseSource {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32;
}

impl<N: NoiseSource + ?Sized> NoiseSource for Box<N> {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 { (**self).sample(x, y, z) }
}

impl<N: NoiseSource + ?Sized> NoiseSource for &N {
    fn sample(&self, x: f32, y: f32, z: f32) -> f32 { (**self).sample(x, y, z) }
}
