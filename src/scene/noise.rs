//! Coherent 2D noise used by the starfield and by every procedural surface shader.

use std::fmt;

use ::noise::core::worley::ReturnType;
use ::noise::{NoiseFn, Simplex, Worley};
use serde::{Deserialize, Serialize};

/// Underlying noise algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Smooth gradient noise, used for continents, clouds and granulation.
    Simplex,
    /// Worley noise returning the distance to the closest feature point, used for mottled bands.
    Cellular,
}

enum Source {
    Simplex(Simplex),
    Cellular(Worley),
}

/// Long lived noise generator. Configuration is fixed at construction and sampling takes `&self`,
/// so a single instance is shared by all fragments of a frame.
pub struct NoiseGenerator {
    kind: NoiseKind,
    seed: u32,
    frequency: f64,
    source: Source,
}

impl NoiseGenerator {
    pub fn new(kind: NoiseKind, seed: u32, frequency: f32) -> Self {
        let source = match kind {
            NoiseKind::Simplex => Source::Simplex(Simplex::new(seed)),
            NoiseKind::Cellular => {
                Source::Cellular(Worley::new(seed).set_return_type(ReturnType::Distance))
            }
        };
        return Self {
            kind,
            seed,
            frequency: frequency as f64,
            source,
        };
    }

    /// Noise value in [-1.0, 1.0] at (x, y).
    /// Takes f64, since shaders push coordinates through offsets in the thousands, where f32
    /// already loses the sub-unit precision needed for continuity.
    pub fn get(&self, x: f64, y: f64) -> f32 {
        let point = [x * self.frequency, y * self.frequency];
        let value = match &self.source {
            Source::Simplex(simplex) => simplex.get(point),
            Source::Cellular(worley) => worley.get(point),
        };
        return (value as f32).clamp(-1.0, 1.0);
    }
}

impl fmt::Debug for NoiseGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseGenerator")
            .field("kind", &self.kind)
            .field("seed", &self.seed)
            .field("frequency", &self.frequency)
            .finish()
    }
}
