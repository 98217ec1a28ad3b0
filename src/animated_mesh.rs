use glam::Vec3;
use rayon::prelude::*;

use crate::animation::transform;
use crate::attributes::TriangleAttributes;
use crate::error::{ShatterError, ShatterResult};
use crate::mesh::TriangleSoup;
use crate::params::AnimationParams;
use crate::types::{ShatterVertex, AABB};

/// A triangle soup paired with the attributes it animates with
#[derive(Debug, Clone)]
pub struct AnimatedMesh {
    mesh: TriangleSoup,
    attributes: TriangleAttributes,
}

impl AnimatedMesh {
    pub fn new(mesh: TriangleSoup, seed: u64) -> ShatterResult<Self> {
        let attributes = TriangleAttributes::extract(&mesh, seed)?;
        Ok(Self { mesh, attributes })
    }

    pub fn mesh(&self) -> &TriangleSoup {
        &self.mesh
    }

    pub fn attributes(&self) -> &TriangleAttributes {
        &self.attributes
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.mesh.positions())
    }

    /// Interleaved vertex data for upload
    pub fn vertices(&self) -> Vec<ShatterVertex> {
        let m = &self.mesh;
        let a = &self.attributes;
        (0..m.vertex_count())
            .map(|i| ShatterVertex {
                position: m.positions()[i].to_array(),
                normal: m.normals()[i].to_array(),
                uv: m.uvs()[i],
                center: a.centers[i].to_array(),
                random: a.randoms[i],
                centroid: a.centroid[i].to_array(),
            })
            .collect()
    }

    /// Evaluate every animated position into `out`, in parallel
    pub fn evaluate_into(&self, params: &AnimationParams, out: &mut [Vec3]) -> ShatterResult<()> {
        if out.len() != self.vertex_count() {
            return Err(ShatterError::invalid_mesh(format!(
                "output holds {} positions, mesh has {}",
                out.len(),
                self.vertex_count()
            )));
        }
        self.fill(params, out);
        Ok(())
    }

    pub fn evaluate(&self, params: &AnimationParams) -> Vec<Vec3> {
        let mut out = vec![Vec3::ZERO; self.vertex_count()];
        self.fill(params, &mut out);
        out
    }

    /// `out` must hold exactly one slot per vertex
    fn fill(&self, params: &AnimationParams, out: &mut [Vec3]) {
        let positions = self.mesh.positions();
        let a = &self.attributes;
        out.par_iter_mut().enumerate().for_each(|(i, slot)| {
            *slot = transform(positions[i], a.centers[i], a.randoms[i], a.centroid[i], params);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TriangleSoup {
        TriangleSoup::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(3.0, 2.0, 2.0),
            Vec3::new(2.0, 3.0, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn vertices_interleave_attributes() {
        let mesh = AnimatedMesh::new(pair(), 7).unwrap();
        let v = mesh.vertices();
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].center, v[2].center);
        assert_eq!(v[3].random, v[5].random);
        assert_eq!(v[0].centroid, v[5].centroid);
    }

    #[test]
    fn progress_zero_leaves_mesh_in_place() {
        let mesh = AnimatedMesh::new(pair(), 7).unwrap();
        let out = mesh.evaluate(&AnimationParams::default());
        for (got, want) in out.iter().zip(mesh.mesh().positions()) {
            assert!((*got - *want).length() < 1e-5);
        }
    }

    #[test]
    fn wrong_output_length_is_rejected() {
        let mesh = AnimatedMesh::new(pair(), 7).unwrap();
        let mut out = vec![Vec3::ZERO; 4];
        assert!(mesh.evaluate_into(&AnimationParams::default(), &mut out).is_err());
    }
}
