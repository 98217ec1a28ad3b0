use glam::Vec3;
use shatter::attributes::{TriangleAttributes, RANDOM_MAX, RANDOM_MIN};
use shatter::mesh::TriangleSoup;
use shatter::ShatterError;

fn two_triangles() -> TriangleSoup {
    TriangleSoup::new(vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(0.0, 3.0, 0.0),
        Vec3::new(10.0, 10.0, 10.0),
        Vec3::new(13.0, 10.0, 10.0),
        Vec3::new(10.0, 13.0, 10.0),
    ])
    .unwrap()
}

#[cfg(test)]
mod attributes_tests {
    use super::*;

    #[test]
    fn test_two_triangle_mesh_attribute_layout() {
        let attrs = TriangleAttributes::extract(&two_triangles(), 42).unwrap();

        assert_eq!(attrs.len(), 6);

        // 2 distinct centers, each repeated 3 times
        assert_eq!(attrs.centers[0..3], [Vec3::new(1.0, 1.0, 0.0); 3]);
        assert_eq!(attrs.centers[3..6], [Vec3::new(11.0, 11.0, 10.0); 3]);
        assert_ne!(attrs.centers[0], attrs.centers[3]);

        // 2 randoms, each repeated 3 times
        assert!(attrs.randoms[0..3].iter().all(|&r| r == attrs.randoms[0]));
        assert!(attrs.randoms[3..6].iter().all(|&r| r == attrs.randoms[3]));
        assert_ne!(attrs.randoms[0], attrs.randoms[3]);

        // 1 centroid, repeated 6 times
        let expected = Vec3::new(6.0, 6.0, 5.0);
        assert!(attrs.centroid.iter().all(|c| (*c - expected).length() < 1e-5));
        assert_eq!(attrs.mesh_centroid(), attrs.centroid[5]);
    }

    #[test]
    fn test_centers_are_triangle_means() {
        let mesh = TriangleSoup::icosphere(2, 5.0).unwrap();
        let attrs = TriangleAttributes::extract(&mesh, 1).unwrap();

        for (t, tri) in mesh.positions().chunks(3).enumerate() {
            let mean = (tri[0] + tri[1] + tri[2]) / 3.0;
            for k in 0..3 {
                assert!((attrs.centers[3 * t + k] - mean).length() < 1e-5);
            }
        }
    }

    #[test]
    fn test_randoms_stay_in_range() {
        let mesh = TriangleSoup::icosphere(3, 1.0).unwrap();
        let attrs = TriangleAttributes::extract(&mesh, 99).unwrap();

        assert!(attrs
            .randoms
            .iter()
            .all(|&r| (RANDOM_MIN..RANDOM_MAX).contains(&r)));
    }

    #[test]
    fn test_same_seed_same_randoms() {
        let mesh = TriangleSoup::column(4, 12, 2.0, 10.0).unwrap();
        let a = TriangleAttributes::extract(&mesh, 2024).unwrap();
        let b = TriangleAttributes::extract(&mesh, 2024).unwrap();
        assert_eq!(a.randoms, b.randoms);
    }

    #[test]
    fn test_centroid_is_vertex_mean() {
        let mesh = TriangleSoup::column(3, 8, 1.0, 6.0).unwrap();
        let attrs = TriangleAttributes::extract(&mesh, 5).unwrap();
        let mean = mesh.positions().iter().copied().sum::<Vec3>() / mesh.vertex_count() as f32;
        assert!((attrs.mesh_centroid() - mean).length() < 1e-4);
    }

    #[test]
    fn test_invalid_meshes_are_rejected() {
        assert!(matches!(
            TriangleSoup::new(vec![]),
            Err(ShatterError::InvalidMesh(_))
        ));
        assert!(matches!(
            TriangleSoup::new(vec![Vec3::ZERO; 4]),
            Err(ShatterError::InvalidMesh(_))
        ));
        assert!(matches!(
            TriangleSoup::new(vec![Vec3::ZERO, Vec3::X, Vec3::new(f32::NAN, 0.0, 0.0)]),
            Err(ShatterError::InvalidMesh(_))
        ));
    }
}
