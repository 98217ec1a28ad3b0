use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ShatterError, ShatterResult};
use crate::mesh::TriangleSoup;

/// Lower bound of the per-triangle random factor (inclusive)
pub const RANDOM_MIN: f32 = 1.5;
/// Upper bound of the per-triangle random factor (exclusive)
pub const RANDOM_MAX: f32 = 3.5;

/// Per-vertex attributes derived once from a triangle soup.
///
/// All three arrays have one entry per vertex. `centers` and `randoms` repeat
/// the same value across the three vertices of a triangle, `centroid` repeats
/// one value across the whole mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleAttributes {
    pub centers: Vec<Vec3>,
    pub randoms: Vec<f32>,
    pub centroid: Vec<Vec3>,
}

impl TriangleAttributes {
    /// Extract attributes using a generator seeded with `seed`
    pub fn extract(mesh: &TriangleSoup, seed: u64) -> ShatterResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::extract_with(mesh.positions(), &mut rng)
    }

    /// Extract attributes from raw soup positions, drawing from `rng`
    pub fn extract_with<R: Rng + ?Sized>(positions: &[Vec3], rng: &mut R) -> ShatterResult<Self> {
        let n = positions.len();
        if n == 0 {
            return Err(ShatterError::invalid_mesh("mesh has no vertices"));
        }
        if n % 3 != 0 {
            return Err(ShatterError::invalid_mesh(format!(
                "vertex count {} is not a multiple of 3",
                n
            )));
        }

        let sum: Vec3 = positions.iter().copied().sum();
        let centroid = sum / n as f32;

        let mut centers = Vec::with_capacity(n);
        let mut randoms = Vec::with_capacity(n);
        for tri in positions.chunks_exact(3) {
            let center = (tri[0] + tri[1] + tri[2]) / 3.0;
            let r = rng.gen_range(RANDOM_MIN..RANDOM_MAX);
            centers.extend_from_slice(&[center; 3]);
            randoms.extend_from_slice(&[r; 3]);
        }

        log::debug!(
            "extracted attributes for {} triangles, centroid ({:.3}, {:.3}, {:.3})",
            n / 3,
            centroid.x,
            centroid.y,
            centroid.z
        );

        Ok(Self {
            centers,
            randoms,
            centroid: vec![centroid; n],
        })
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// The single mesh centroid shared by every vertex
    pub fn mesh_centroid(&self) -> Vec3 {
        self.centroid.first().copied().unwrap_or(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_is_reproducible_for_a_seed() {
        let mesh = TriangleSoup::icosphere(1, 1.0).unwrap();
        let a = TriangleAttributes::extract(&mesh, 7).unwrap();
        let b = TriangleAttributes::extract(&mesh, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_change_randoms_only() {
        let mesh = TriangleSoup::icosphere(0, 1.0).unwrap();
        let a = TriangleAttributes::extract(&mesh, 1).unwrap();
        let b = TriangleAttributes::extract(&mesh, 2).unwrap();
        assert_eq!(a.centers, b.centers);
        assert_eq!(a.centroid, b.centroid);
        assert_ne!(a.randoms, b.randoms);
    }

    #[test]
    fn rejects_bad_vertex_counts() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(TriangleAttributes::extract_with(&[], &mut rng).is_err());
        assert!(TriangleAttributes::extract_with(&[Vec3::ZERO; 5], &mut rng).is_err());
    }
}
