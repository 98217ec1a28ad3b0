use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use std::path::Path;

use crate::error::ShatterError;
use crate::mesh::TriangleSoup;

/// Indexed geometry merged across primitives, in world space
#[derive(Debug, Default)]
pub struct MergedGeometry {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MergedGeometry {
    /// Add one primitive. Missing indices mean a plain triangle list.
    pub fn push_primitive(
        &mut self,
        positions: &[Vec3],
        uvs: Option<&[[f32; 2]]>,
        indices: Option<&[u32]>,
        transform: &Mat4,
    ) -> Result<()> {
        let base = u32::try_from(self.positions.len()).context("Merged mesh exceeds u32 indices")?;
        let count = u32::try_from(positions.len()).context("Primitive exceeds u32 indices")?;

        let listed = indices.map_or(positions.len(), <[u32]>::len);
        if listed % 3 != 0 {
            return Err(ShatterError::invalid_mesh(format!(
                "primitive lists {} vertices, not a multiple of 3",
                listed
            ))
            .into());
        }
        if let Some(bad) = indices.and_then(|idx| idx.iter().find(|&&i| i >= count)) {
            anyhow::bail!("Primitive index {} out of range for {} vertices", bad, count);
        }

        self.positions
            .extend(positions.iter().map(|p| transform.transform_point3(*p)));
        match uvs {
            Some(uvs) if uvs.len() == positions.len() => self.uvs.extend_from_slice(uvs),
            _ => self.uvs.extend(std::iter::repeat([0.0, 0.0]).take(positions.len())),
        }
        match indices {
            Some(indices) => self.indices.extend(indices.iter().map(|i| base + i)),
            None => self.indices.extend((0..count).map(|i| base + i)),
        }
        Ok(())
    }

    pub fn into_soup(self) -> Result<TriangleSoup> {
        TriangleSoup::from_indexed(&self.positions, Some(&self.uvs), &self.indices)
            .context("glTF geometry is not a usable triangle mesh")
    }
}

/// Loads every triangle primitive of a glTF file into one triangle soup
pub fn load_gltf_mesh(path: impl AsRef<Path>) -> Result<TriangleSoup> {
    let path = path.as_ref();
    log::info!("Loading glTF mesh: {:?}", path);

    let (gltf, buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to load glTF file: {:?}", path))?;

    log::debug!(
        "glTF loaded: {} scenes, {} nodes, {} meshes",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count()
    );

    let mut merged = MergedGeometry::default();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &Mat4::IDENTITY, &mut merged)?;
        }
    }

    let soup = merged.into_soup()?;
    log::info!("Extracted {} triangles from {:?}", soup.triangle_count(), path);
    Ok(soup)
}

/// Recursively walks glTF nodes, accumulating world transforms
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    merged: &mut MergedGeometry,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, merged)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, merged)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    merged: &mut MergedGeometry,
) -> Result<()> {
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(Vec3::from_array)
            .collect();
        let uvs: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0).map(|uv| uv.into_f32().collect());
        let indices: Option<Vec<u32>> = reader.read_indices().map(|i| i.into_u32().collect());

        merged.push_primitive(&positions, uvs.as_deref(), indices.as_deref(), transform)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn indexed_primitives_are_offset_and_transformed() {
        let mut merged = MergedGeometry::default();
        let idx = [0, 1, 2, 0, 2, 3];
        merged.push_primitive(&quad(), None, Some(&idx), &Mat4::IDENTITY).unwrap();
        let shift = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
        merged.push_primitive(&quad(), None, Some(&idx), &shift).unwrap();

        assert_eq!(merged.indices[6..], [4, 5, 6, 4, 6, 7]);
        assert_eq!(merged.positions[4].z, 5.0);

        let soup = merged.into_soup().unwrap();
        assert_eq!(soup.triangle_count(), 4);
    }

    #[test]
    fn out_of_range_index_fails() {
        let mut merged = MergedGeometry::default();
        assert!(merged
            .push_primitive(&quad(), None, Some(&[0, 1, 9]), &Mat4::IDENTITY)
            .is_err());
    }

    #[test]
    fn partial_triangle_list_fails() {
        let mut merged = MergedGeometry::default();
        let err = merged
            .push_primitive(&quad(), None, None, &Mat4::IDENTITY)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShatterError>(),
            Some(ShatterError::InvalidMesh(_))
        ));
        assert!(merged.positions.is_empty());
    }

    #[test]
    fn partial_index_list_fails() {
        let mut merged = MergedGeometry::default();
        assert!(merged
            .push_primitive(&quad(), None, Some(&[0, 1, 2, 0]), &Mat4::IDENTITY)
            .is_err());
        assert!(merged.indices.is_empty());
    }

    #[test]
    fn empty_geometry_is_not_a_mesh() {
        assert!(MergedGeometry::default().into_soup().is_err());
    }
}
