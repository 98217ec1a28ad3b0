use glam::{Mat3, Vec3};
use shatter::animation::{local_progress, transform};
use shatter::mesh::TriangleSoup;
use shatter::params::AnimationParams;
use shatter::{AnimatedMesh, ShatterError};
use std::f32::consts::PI;

fn params(progress: f32, local_delay: f32) -> AnimationParams {
    AnimationParams {
        progress,
        local_delay,
        ..AnimationParams::default()
    }
}

fn close(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).length() < eps
}

/// Right-handed rotation about +Y by `-angle`
fn spin_y(v: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(v.x * c - v.z * s, v.y, v.x * s + v.z * c)
}

/// Transposed right-handed axis-angle matrix applied to `v`
fn transposed_rotation(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    Mat3::from_axis_angle(axis.normalize(), angle).transpose() * v
}

#[cfg(test)]
mod transform_tests {
    use super::*;

    #[test]
    fn test_zero_local_progress_is_identity() {
        let mut p = params(0.0, 0.8);
        p.self_twist = 7.0;
        p.global_twist = 1.5;
        p.scale = 0.2;

        let position = Vec3::new(2.0, 10.0, -3.0);
        assert_eq!(local_progress(position.y, &p), 0.0);

        let out = transform(position, Vec3::new(1.0, 9.0, -2.0), 2.5, Vec3::new(0.0, 5.0, 0.0), &p);
        assert!(close(out, position, 1e-4), "got {:?}", out);
    }

    #[test]
    fn test_full_progress_without_twist_returns_position() {
        let p = AnimationParams {
            progress: 1.0,
            local_delay: 0.0,
            scale: 1.0,
            ..AnimationParams::default()
        };
        let position = Vec3::new(4.0, 1.0, 2.0);
        assert_eq!(local_progress(position.y, &p), 1.0);

        let out = transform(position, Vec3::new(3.0, 1.0, 1.0), 2.0, Vec3::new(0.0, 1.0, 0.0), &p);
        assert!(close(out, position, 1e-4), "got {:?}", out);
    }

    #[test]
    fn test_full_progress_with_unit_scale_still_twists() {
        let p = AnimationParams {
            progress: 1.0,
            local_delay: 0.0,
            scale: 1.0,
            global_twist: 0.5,
            ..AnimationParams::default()
        };
        let position = Vec3::new(4.0, 1.0, 2.0);
        let center = Vec3::new(3.0, 1.0, 1.0);
        let random = 2.0;

        let out = transform(position, center, random, Vec3::new(0.0, 1.0, 0.0), &p);

        let angle = random * PI * 1.0_f32.sin() * 0.5;
        let expected = spin_y(position + center, angle) - center;
        assert!(close(out, expected, 1e-3), "got {:?}, expected {:?}", out, expected);
        assert!(!close(out, position, 1e-2));
    }

    #[test]
    fn test_shrink_and_self_spin_at_full_local_progress() {
        let p = AnimationParams {
            progress: 1.0,
            scale: 0.25,
            self_twist: 0.3,
            ..AnimationParams::default()
        };
        let position = Vec3::new(1.5, 0.0, 0.5);
        let center = Vec3::new(0.5, 0.0, 1.0);
        let random = 2.0;
        let centroid = Vec3::new(0.0, 5.0, 0.0);
        assert_eq!(local_progress(position.y, &p), 1.0);

        // offset (1, 0, 2), so the vertex sits at (0.5, 0, -1.5) in the offset frame
        let offset = center * random;
        let angle = random * PI * 1.0_f32.sin() * 0.3;
        let spun = transposed_rotation(position - offset, centroid, angle);
        // shrink factor 1 - 1 * (1 - 0.25) * sign(2) = 0.25
        let expected = spun * 0.25 + offset;

        let out = transform(position, center, random, centroid, &p);
        assert!(close(out, expected, 1e-5), "got {:?}, want {:?}", out, expected);

        // rotation about +Y keeps the offset-frame radius
        let radius = 0.25 * (0.5f32 * 0.5 + 1.5 * 1.5).sqrt();
        assert!(((expected - offset).length() - radius).abs() < 1e-5);
    }

    #[test]
    fn test_shrink_then_global_twist_about_up() {
        let p = AnimationParams {
            progress: 1.0,
            scale: 0.5,
            global_twist: -0.4,
            ..AnimationParams::default()
        };
        let position = Vec3::new(3.0, 2.0, -1.0);
        let center = Vec3::new(2.0, 2.0, -0.5);
        let random = 1.75;
        let centroid = Vec3::new(0.0, 10.0, 0.0);
        assert_eq!(local_progress(position.y, &p), 1.0);

        let offset = center * random;
        let shrunk = (position - offset) * 0.5 + offset;
        let angle = random * PI * 1.0_f32.sin() * -0.4;
        let expected = transposed_rotation(shrunk + center, Vec3::Y, angle) - center;

        let out = transform(position, center, random, centroid, &p);
        assert!(close(out, expected, 1e-4), "got {:?}, want {:?}", out, expected);
    }

    #[test]
    fn test_local_progress_is_monotone_in_progress() {
        for &y in &[-50.0, -12.5, 0.0, 7.0, 30.0, 50.0] {
            for &delay in &[0.0, 0.3, 0.8, 0.999] {
                let mut last = 0.0;
                for i in 0..=200 {
                    let lp = local_progress(y, &params(i as f32 / 200.0, delay));
                    assert!(lp >= last, "y {} delay {} step {}", y, delay, i);
                    assert!((0.0..=1.0).contains(&lp));
                    last = lp;
                }
            }
        }
    }

    #[test]
    fn test_origin_stays_at_origin_mid_animation() {
        let p = AnimationParams {
            progress: 0.5,
            polar: -1.0,
            size: 50.0,
            scale: 1.0,
            local_delay: 0.8,
            self_twist: 0.0,
            global_twist: 0.0,
        };
        let out = transform(Vec3::ZERO, Vec3::ZERO, 2.2, Vec3::new(1.0, 2.0, 3.0), &p);
        assert!(close(out, Vec3::ZERO, 1e-6), "got {:?}", out);
    }

    #[test]
    fn test_zero_centroid_axis_gives_finite_positions() {
        let p = AnimationParams {
            progress: 0.7,
            self_twist: 4.0,
            ..AnimationParams::default()
        };
        let out = transform(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 1.0, 1.0), 3.0, Vec3::ZERO, &p);
        assert!(out.is_finite());
    }

    #[test]
    fn test_degenerate_parameters_fail_validation() {
        let zero_size = AnimationParams {
            size: 0.0,
            ..AnimationParams::default()
        };
        assert!(matches!(
            zero_size.validate(),
            Err(ShatterError::InvalidParameter { name: "size", .. })
        ));

        let tiny_size = AnimationParams {
            size: 1e-6,
            ..AnimationParams::default()
        };
        assert!(tiny_size.validate().is_err());

        assert!(params(0.5, 1.0).validate().is_err());
        assert!(AnimationParams::default().validate().is_ok());
    }

    #[test]
    fn test_parallel_pass_matches_scalar_transform() {
        let mesh = AnimatedMesh::new(TriangleSoup::icosphere(3, 8.0).unwrap(), 11).unwrap();
        let p = AnimationParams {
            progress: 0.6,
            polar: 0.3,
            size: 12.0,
            scale: 0.4,
            local_delay: 0.5,
            self_twist: -3.0,
            global_twist: 1.2,
        };

        let out = mesh.evaluate(&p);
        let attrs = mesh.attributes();
        for (i, got) in out.iter().enumerate() {
            let want = transform(
                mesh.mesh().positions()[i],
                attrs.centers[i],
                attrs.randoms[i],
                attrs.centroid[i],
                &p,
            );
            assert_eq!(*got, want);
        }
    }
}
