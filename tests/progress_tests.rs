use shatter::params::AnimationParams;
use shatter::progress::{fold_azimuth, ProgressDriver};
use std::f32::consts::PI;

#[cfg(test)]
mod progress_tests {
    use super::*;

    #[test]
    fn test_fold_reference_angles() {
        assert_eq!(fold_azimuth(0.0), 1.0);
        assert!(fold_azimuth(PI / 2.0).abs() < 1e-6);
        assert!((fold_azimuth(PI) - 1.0).abs() < 1e-6);
        assert!(fold_azimuth(-PI / 2.0).abs() < 1e-6);
        assert!((fold_azimuth(PI / 4.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fold_is_symmetric() {
        for i in 0..=100 {
            let az = i as f32 / 100.0 * PI;
            assert!((fold_azimuth(az) - fold_azimuth(-az)).abs() < 1e-5, "azimuth {}", az);
        }
    }

    #[test]
    fn test_fold_agrees_with_abs_formula_on_principal_range() {
        for i in -99..=100 {
            let az = i as f32 / 100.0 * PI;
            let reference = ((az / PI).abs() - 0.5).abs() * 2.0;
            assert!((fold_azimuth(az) - reference).abs() < 1e-5, "azimuth {}", az);
        }
    }

    #[test]
    fn test_fold_wraps_past_full_turns() {
        for &az in &[0.3, 1.1, 2.9] {
            assert!((fold_azimuth(az) - fold_azimuth(az + 2.0 * PI)).abs() < 1e-4);
            assert!((fold_azimuth(az) - fold_azimuth(az - 4.0 * PI)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_driver_writes_progress() {
        let mut driver = ProgressDriver::new();
        let mut params = AnimationParams::default();

        let written = driver.apply(PI / 2.0, &mut params);

        assert_eq!(written, Some(params.progress));
        assert!(params.progress.abs() < 1e-6);
        assert_eq!(driver.last(), written);
    }

    #[test]
    fn test_disabled_driver_leaves_params_alone() {
        let mut driver = ProgressDriver::new();
        driver.enabled = false;
        let mut params = AnimationParams {
            progress: 0.42,
            ..AnimationParams::default()
        };

        assert_eq!(driver.apply(0.0, &mut params), None);
        assert_eq!(params.progress, 0.42);
    }

    #[test]
    fn test_non_finite_azimuth_is_ignored() {
        let mut driver = ProgressDriver::new();
        let mut params = AnimationParams::default();
        assert_eq!(driver.apply(f32::NAN, &mut params), None);
        assert_eq!(params, AnimationParams::default());
    }
}
