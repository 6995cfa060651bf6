// Deterministic, seedable 2-D noise sampling for terrain irregularity.
//
// Every piece of geometric irregularity in the hexterrace project — vertex
// jitter, per-cell elevation offsets — is driven by samples drawn from this
// crate. A sample is four independent smooth-noise channels evaluated at a
// world-space XZ point, each mapped into [0, 1]. Consumers decide what the
// channels mean (`hexterrace_map` uses channel 0 for X displacement, 1 for
// elevation offsets, and 2 for Z displacement).
//
// `NoiseField` layers Perlin octaves (fBm) per channel, with each channel
// seeded independently from one config seed. `FlatNoise` is the degenerate
// constant source used by tests and by hosts that want perfectly regular
// geometry.
//
// See also: `hexterrace_map::metrics` for the perturbation functions built
// on top of these samples.
//
// **Critical constraint: determinism.** Two sources built from the same
// config must return identical samples for identical inputs, and a single
// source must be safe to share across worker threads. Neighboring map chunks
// sample the same world positions along their shared seams; any divergence
// tears the terrain apart at chunk boundaries.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// One noise sample: four channels, each in `[0, 1]`.
pub type NoiseSample = [f32; 4];

/// A source of smooth 2-D noise.
///
/// `Sync` is a supertrait so a single source can back parallel chunk
/// rebuilds; implementations must be immutable after construction.
pub trait NoiseSource: Sync {
    /// Sample all four channels at an XZ point.
    fn sample(&self, x: f32, z: f32) -> NoiseSample;
}

/// Configuration for a `NoiseField`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Base seed. Each of the four channels derives its own seed from this.
    pub seed: u32,
    /// Spatial frequency of the lowest octave. Callers are expected to have
    /// already scaled their coordinates (the map crate samples at world
    /// position times its own noise scale), so 1.0 is the usual value.
    pub frequency: f64,
    /// Number of Perlin octaves layered per channel.
    pub octaves: usize,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            frequency: 1.0,
            octaves: 3,
        }
    }
}

/// Per-channel seed salts, so the four channels decorrelate even though they
/// share one config seed.
const CHANNEL_SALTS: [u32; 4] = [0x0000_0000, 0x9e37_79b9, 0x3c6e_f372, 0xdaa6_6d2b];

/// Four independently seeded fBm Perlin stacks.
pub struct NoiseField {
    channels: [Fbm<Perlin>; 4],
}

impl NoiseField {
    pub fn new(config: NoiseConfig) -> Self {
        let channel = |salt: u32| {
            Fbm::<Perlin>::new(config.seed ^ salt)
                .set_octaves(config.octaves)
                .set_frequency(config.frequency)
        };
        Self {
            channels: [
                channel(CHANNEL_SALTS[0]),
                channel(CHANNEL_SALTS[1]),
                channel(CHANNEL_SALTS[2]),
                channel(CHANNEL_SALTS[3]),
            ],
        }
    }

    /// Shorthand for a field with default frequency and octaves.
    pub fn seeded(seed: u32) -> Self {
        Self::new(NoiseConfig {
            seed,
            ..NoiseConfig::default()
        })
    }
}

impl NoiseSource for NoiseField {
    fn sample(&self, x: f32, z: f32) -> NoiseSample {
        let mut out = [0.0; 4];
        for (slot, channel) in out.iter_mut().zip(&self.channels) {
            // fBm sums can escape [-1, 1] slightly; clamp before remapping
            // so consumers can rely on the unit interval.
            let raw = channel.get([f64::from(x), f64::from(z)]) as f32;
            *slot = raw.clamp(-1.0, 1.0) * 0.5 + 0.5;
        }
        out
    }
}

/// A constant-valued source: every channel returns the same value everywhere.
///
/// `FlatNoise::CENTERED` returns 0.5, which downstream perturbation maps to
/// zero displacement — the choice for geometry tests and perfectly regular
/// maps.
#[derive(Clone, Copy, Debug)]
pub struct FlatNoise(pub f32);

impl FlatNoise {
    pub const CENTERED: FlatNoise = FlatNoise(0.5);
}

impl NoiseSource for FlatNoise {
    fn sample(&self, _x: f32, _z: f32) -> NoiseSample {
        [self.0; 4]
    }
}
