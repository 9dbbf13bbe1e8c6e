//! # Simplex Noise Implementation
//!
//! Deterministic 2D simplex noise plus the layered sum the terrain uses.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, this implementation will produce
//! **exactly** the same values on any platform, any time. The permutation
//! table is shuffled with `ChaCha8`, whose output stream is fixed by the
//! seed alone.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0x00C4_A7E2)
    }
}

/// One octave of terrain noise: `amplitude * noise(x * frequency, z * frequency)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayer {
    /// Spatial frequency in cycles per world unit.
    pub frequency: f64,
    /// Height contribution in world units.
    pub amplitude: f64,
}

impl NoiseLayer {
    /// Creates a layer.
    #[must_use]
    pub const fn new(frequency: f64, amplitude: f64) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }

    /// Broad rolling hills.
    pub const BASE: Self = Self::new(0.005, 15.0);
    /// Medium detail.
    pub const DETAIL: Self = Self::new(0.015, 3.0);
    /// Fine surface texture.
    pub const FINE: Self = Self::new(0.04, 1.0);
}

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
#[derive(Clone, Debug)]
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// Gradient directions for 2D simplex.
    ///
    /// The eight compass directions, then the four axes again so that
    /// `hash % 12` picks from twelve slots. Axes come up slightly more often
    /// than diagonals; the diagonals are left unnormalized and the final
    /// `70.0` scale absorbs the difference.
    const GRAD: [[i8; 2]; 12] = [
        [1, 0], [1, 1], [0, 1], [-1, 1],
        [-1, 0], [-1, -1], [0, -1], [1, -1],
        [1, 0], [0, 1], [-1, 0], [0, -1],
    ];

    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates
        let mut rng = ChaCha8Rng::seed_from_u64(seed.value());
        for i in (1..256).rev() {
            let j = rng.gen_range(0..=i);
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }

    #[inline]
    fn gradient(hash: u8) -> [i8; 2] {
        Self::GRAD[(hash % 12) as usize]
    }
}

/// 2D Simplex noise generator.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
///
/// # Performance
///
/// - O(1) per sample
/// - No allocations
///
/// # Example
///
/// ```rust,ignore
/// let noise = SimplexNoise::new(WorldSeed::new(42));
/// let value = noise.sample(100.5, 200.3);
/// assert!(value >= -1.0 && value <= 1.0);
///
/// let height = noise.layered(x, z, &[NoiseLayer::BASE, NoiseLayer::DETAIL]);
/// ```
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples 2D simplex noise at `(x, y)`, in [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        // Cell of the skewed lattice holding the point
        let skew = (x + y) * Self::F2;
        let cell_x = (x + skew).floor() as i32;
        let cell_y = (y + skew).floor() as i32;

        let unskew = f64::from(cell_x + cell_y) * Self::G2;
        let dx = x - (f64::from(cell_x) - unskew);
        let dy = y - (f64::from(cell_y) - unskew);

        // The middle corner depends on which half of the cell we are in
        let (mid_x, mid_y) = if dx > dy { (1_usize, 0_usize) } else { (0, 1) };
        let corners = [
            (0, 0, dx, dy),
            (
                mid_x,
                mid_y,
                dx - mid_x as f64 + Self::G2,
                dy - mid_y as f64 + Self::G2,
            ),
            (1, 1, dx - 1.0 + 2.0 * Self::G2, dy - 1.0 + 2.0 * Self::G2),
        ];

        let base_x = (cell_x & 255) as usize;
        let base_y = (cell_y & 255) as usize;
        let sum: f64 = corners
            .iter()
            .map(|&(step_x, step_y, off_x, off_y)| {
                let row = self.perm_table.get(base_y + step_y) as usize;
                let hash = self.perm_table.get(base_x + step_x + row);
                corner_falloff(off_x, off_y, hash)
            })
            .sum();

        // Three overlapping kernels peak near 1/70
        70.0 * sum
    }

    /// Sums the given layers at `(x, z)`.
    ///
    /// An empty layer list yields a flat world at elevation zero.
    #[must_use]
    pub fn layered(&self, x: f64, z: f64, layers: &[NoiseLayer]) -> f64 {
        layers
            .iter()
            .map(|layer| layer.amplitude * self.sample(x * layer.frequency, z * layer.frequency))
            .sum()
    }
}

/// Radial `(0.5 - r^2)^4` kernel times the corner gradient's dot product.
///
/// Zero once the sample is more than `sqrt(0.5)` from the corner.
#[inline]
fn corner_falloff(off_x: f64, off_y: f64, hash: u8) -> f64 {
    let reach = 0.5 - off_x * off_x - off_y * off_y;
    if reach <= 0.0 {
        return 0.0;
    }
    let [gx, gy] = PermutationTable::gradient(hash);
    let reach2 = reach * reach;
    reach2 * reach2 * (off_x * f64::from(gx) + off_y * f64::from(gy))
}
