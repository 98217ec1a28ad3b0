use std::collections::HashMap;

use glam::Vec3;

use crate::error::{ShatterError, ShatterResult};

/// Non-indexed triangle mesh: every triangle owns its three vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleSoup {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<[f32; 2]>,
}

impl TriangleSoup {
    /// Build a soup from raw positions, with flat normals and zeroed UVs
    pub fn new(positions: Vec<Vec3>) -> ShatterResult<Self> {
        let uvs = vec![[0.0, 0.0]; positions.len()];
        Self::with_uvs(positions, uvs)
    }

    pub fn with_uvs(positions: Vec<Vec3>, uvs: Vec<[f32; 2]>) -> ShatterResult<Self> {
        validate_positions(&positions)?;
        if uvs.len() != positions.len() {
            return Err(ShatterError::invalid_mesh(format!(
                "{} uvs for {} vertices",
                uvs.len(),
                positions.len()
            )));
        }

        let normals = flat_normals(&positions);
        Ok(Self {
            positions,
            normals,
            uvs,
        })
    }

    /// Expand an indexed mesh into a soup.
    ///
    /// Normals are smoothed over the shared vertices before expansion, so the
    /// surface keeps its shading once the triangles come apart.
    pub fn from_indexed(
        positions: &[Vec3],
        uvs: Option<&[[f32; 2]]>,
        indices: &[u32],
    ) -> ShatterResult<Self> {
        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(ShatterError::invalid_mesh(format!(
                "index count {} is not a positive multiple of 3",
                indices.len()
            )));
        }
        if let Some(uvs) = uvs {
            if uvs.len() != positions.len() {
                return Err(ShatterError::invalid_mesh(format!(
                    "{} uvs for {} indexed vertices",
                    uvs.len(),
                    positions.len()
                )));
            }
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(ShatterError::invalid_mesh(format!(
                "index {} out of range for {} vertices",
                bad,
                positions.len()
            )));
        }

        let smooth = smooth_normals(positions, indices);

        let soup_positions: Vec<Vec3> = indices.iter().map(|&i| positions[i as usize]).collect();
        validate_positions(&soup_positions)?;

        Ok(Self {
            normals: indices.iter().map(|&i| smooth[i as usize]).collect(),
            uvs: indices
                .iter()
                .map(|&i| uvs.map_or([0.0, 0.0], |uvs| uvs[i as usize]))
                .collect(),
            positions: soup_positions,
        })
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Uniformly scale about the origin
    pub fn scale(&mut self, factor: f32) {
        for p in &mut self.positions {
            *p *= factor;
        }
        if factor < 0.0 {
            for n in &mut self.normals {
                *n = -*n;
            }
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Lateral surface of a vertical cylinder, base at y = 0.
    pub fn column(rings: u32, segments: u32, radius: f32, height: f32) -> ShatterResult<Self> {
        let rings = rings.max(1);
        let segments = segments.max(3);

        let mut positions = Vec::new();
        let mut uvs = Vec::new();
        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            for seg in 0..=segments {
                let u = seg as f32 / segments as f32;
                let theta = u * std::f32::consts::TAU;
                positions.push(Vec3::new(
                    radius * theta.cos(),
                    v * height,
                    radius * theta.sin(),
                ));
                uvs.push([u, v]);
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::new();
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self::from_indexed(&positions, Some(&uvs), &indices)
    }

    /// Square of side `size` in the XZ plane, centered on the origin, facing +Y
    pub fn plane(size: f32, segments: u32) -> ShatterResult<Self> {
        let segments = segments.max(1);
        let stride = segments + 1;

        let mut positions = Vec::with_capacity((stride * stride) as usize);
        let mut uvs = Vec::with_capacity(positions.capacity());
        for iz in 0..=segments {
            let v = iz as f32 / segments as f32;
            for ix in 0..=segments {
                let u = ix as f32 / segments as f32;
                positions.push(Vec3::new((u - 0.5) * size, 0.0, (v - 0.5) * size));
                uvs.push([u, v]);
            }
        }

        let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
        for iz in 0..segments {
            for ix in 0..segments {
                let a = iz * stride + ix;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self::from_indexed(&positions, Some(&uvs), &indices)
    }

    /// Subdivided icosahedron centered on the origin
    pub fn icosphere(subdivisions: u32, radius: f32) -> ShatterResult<Self> {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let mut positions: Vec<Vec3> = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
        .collect();

        #[rustfmt::skip]
        let mut faces: Vec<[u32; 3]> = vec![
            [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
            [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
            [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
            [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
                let key = (a.min(b), a.max(b));
                *midpoints.entry(key).or_insert_with(|| {
                    let m = ((positions[a as usize] + positions[b as usize]) * 0.5).normalize();
                    positions.push(m);
                    (positions.len() - 1) as u32
                })
            };

            let mut next = Vec::with_capacity(faces.len() * 4);
            for [a, b, c] in faces {
                let ab = midpoint(a, b, &mut positions);
                let bc = midpoint(b, c, &mut positions);
                let ca = midpoint(c, a, &mut positions);
                next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
            }
            faces = next;
        }

        let uvs: Vec<[f32; 2]> = positions
            .iter()
            .map(|p| {
                [
                    0.5 + p.z.atan2(p.x) / std::f32::consts::TAU,
                    0.5 - p.y.asin() / std::f32::consts::PI,
                ]
            })
            .collect();
        for p in &mut positions {
            *p *= radius;
        }

        let indices: Vec<u32> = faces.into_iter().flatten().collect();
        Self::from_indexed(&positions, Some(&uvs), &indices)
    }
}

fn validate_positions(positions: &[Vec3]) -> ShatterResult<()> {
    if positions.is_empty() {
        return Err(ShatterError::invalid_mesh("mesh has no vertices"));
    }
    if positions.len() % 3 != 0 {
        return Err(ShatterError::invalid_mesh(format!(
            "vertex count {} is not a multiple of 3",
            positions.len()
        )));
    }
    if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
        return Err(ShatterError::invalid_mesh(format!(
            "vertex {} has a non-finite position",
            i
        )));
    }
    Ok(())
}

fn flat_normals(positions: &[Vec3]) -> Vec<Vec3> {
    positions
        .chunks_exact(3)
        .flat_map(|tri| {
            let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
            [n, n, n]
        })
        .collect()
}

/// Area-weighted vertex normals over shared indices
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.iter().map(|n| n.normalize_or_zero()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_indexed() -> (Vec<Vec3>, Vec<u32>) {
        (
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn rejects_empty_mesh() {
        assert!(matches!(
            TriangleSoup::new(Vec::new()),
            Err(ShatterError::InvalidMesh(_))
        ));
    }

    #[test]
    fn rejects_partial_triangle() {
        let err = TriangleSoup::new(vec![Vec3::ZERO; 4]).unwrap_err();
        assert!(err.to_string().contains("not a multiple of 3"));
    }

    #[test]
    fn rejects_non_finite_position() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::new(f32::NAN, 0.0, 0.0)];
        assert!(TriangleSoup::new(positions).is_err());
    }

    #[test]
    fn flat_normals_follow_winding() {
        let soup = TriangleSoup::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).unwrap();
        for n in soup.normals() {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn indexed_expansion_duplicates_shared_vertices() {
        let (positions, indices) = quad_indexed();
        let soup = TriangleSoup::from_indexed(&positions, None, &indices).unwrap();

        assert_eq!(soup.vertex_count(), 6);
        assert_eq!(soup.triangle_count(), 2);
        assert_eq!(soup.positions()[3], positions[0]);
        assert_eq!(soup.positions()[4], positions[2]);
    }

    #[test]
    fn indexed_expansion_rejects_out_of_range_index() {
        let (positions, _) = quad_indexed();
        assert!(TriangleSoup::from_indexed(&positions, None, &[0, 1, 9]).is_err());
    }

    #[test]
    fn shared_vertices_get_the_same_smoothed_normal() {
        let (positions, indices) = quad_indexed();
        let soup = TriangleSoup::from_indexed(&positions, None, &indices).unwrap();
        assert_eq!(soup.normals()[0], soup.normals()[3]);
        assert!((soup.normals()[0] - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn icosphere_vertices_lie_on_sphere() {
        let soup = TriangleSoup::icosphere(1, 2.0).unwrap();
        assert_eq!(soup.triangle_count(), 80);
        for p in soup.positions() {
            assert!((p.length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn column_spans_requested_height() {
        let soup = TriangleSoup::column(4, 8, 1.0, 10.0).unwrap();
        assert_eq!(soup.triangle_count(), 4 * 8 * 2);
        let max_y = soup.positions().iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!((max_y - 10.0).abs() < 1e-5);
    }

    #[test]
    fn scale_moves_positions() {
        let mut soup = TriangleSoup::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).unwrap();
        soup.scale(0.5);
        assert_eq!(soup.positions()[1], Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn plane_faces_up_and_spans_size() {
        let soup = TriangleSoup::plane(1500.0, 4).unwrap();
        assert_eq!(soup.triangle_count(), 4 * 4 * 2);
        assert!(soup.normals().iter().all(|n| (*n - Vec3::Y).length() < 1e-6));
        let max_x = soup.positions().iter().map(|p| p.x).fold(f32::MIN, f32::max);
        assert!((max_x - 750.0).abs() < 1e-3);
    }
}
