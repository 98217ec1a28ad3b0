use serde::{Deserialize, Serialize};

use crate::error::{ShatterError, ShatterResult};

/// Largest accepted local delay; 1.0 would divide by zero in the stagger.
pub const LOCAL_DELAY_MAX: f32 = 0.999;

/// Tunable animation parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Progress,
    Polar,
    Size,
    Scale,
    LocalDelay,
    SelfTwist,
    GlobalTwist,
}

/// Documented domain of one parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamSpec {
    const fn new(kind: ParamKind, name: &'static str, min: f32, max: f32, step: f32) -> Self {
        Self {
            kind,
            name,
            min,
            max,
            step,
        }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        let max = match self.kind {
            ParamKind::LocalDelay => self.max.min(LOCAL_DELAY_MAX),
            _ => self.max,
        };
        value.clamp(self.min, max)
    }

    pub fn contains(&self, value: f32) -> bool {
        match self.kind {
            ParamKind::LocalDelay => value >= self.min && value < 1.0,
            _ => value >= self.min && value <= self.max,
        }
    }
}

pub const PARAM_SPECS: [ParamSpec; 7] = [
    ParamSpec::new(ParamKind::Progress, "progress", 0.0, 1.0, 0.001),
    ParamSpec::new(ParamKind::Polar, "polar", -1.0, 1.0, 0.001),
    ParamSpec::new(ParamKind::Size, "size", 1.0, 50.0, 0.0),
    ParamSpec::new(ParamKind::Scale, "scale", 0.0, 1.0, 0.0),
    ParamSpec::new(ParamKind::LocalDelay, "local_delay", 0.0, 1.0, 0.0),
    ParamSpec::new(ParamKind::SelfTwist, "self_twist", -10.0, 10.0, 0.0),
    ParamSpec::new(ParamKind::GlobalTwist, "global_twist", -2.0, 2.0, 0.0),
];

pub fn spec(kind: ParamKind) -> &'static ParamSpec {
    // PARAM_SPECS lists every kind exactly once, in declaration order
    &PARAM_SPECS[kind as usize]
}

/// Parameter set read by the transform and wipe functions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationParams {
    pub progress: f32,
    pub polar: f32,
    pub size: f32,
    pub scale: f32,
    #[serde(alias = "locprog")]
    pub local_delay: f32,
    #[serde(alias = "twist_self")]
    pub self_twist: f32,
    #[serde(alias = "twist")]
    pub global_twist: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            progress: 0.0,
            polar: -1.0,
            size: 50.0,
            scale: 1.0,
            local_delay: 0.8,
            self_twist: 0.0,
            global_twist: 0.0,
        }
    }
}

impl AnimationParams {
    pub fn get(&self, kind: ParamKind) -> f32 {
        match kind {
            ParamKind::Progress => self.progress,
            ParamKind::Polar => self.polar,
            ParamKind::Size => self.size,
            ParamKind::Scale => self.scale,
            ParamKind::LocalDelay => self.local_delay,
            ParamKind::SelfTwist => self.self_twist,
            ParamKind::GlobalTwist => self.global_twist,
        }
    }

    pub fn get_mut(&mut self, kind: ParamKind) -> &mut f32 {
        match kind {
            ParamKind::Progress => &mut self.progress,
            ParamKind::Polar => &mut self.polar,
            ParamKind::Size => &mut self.size,
            ParamKind::Scale => &mut self.scale,
            ParamKind::LocalDelay => &mut self.local_delay,
            ParamKind::SelfTwist => &mut self.self_twist,
            ParamKind::GlobalTwist => &mut self.global_twist,
        }
    }

    /// Check every field against its documented domain
    pub fn validate(&self) -> ShatterResult<()> {
        for spec in &PARAM_SPECS {
            let value = self.get(spec.kind);
            if !value.is_finite() {
                return Err(ShatterError::invalid_parameter(spec.name, "must be finite"));
            }
            if !spec.contains(value) {
                let upper = if spec.kind == ParamKind::LocalDelay { ")" } else { "]" };
                return Err(ShatterError::invalid_parameter(
                    spec.name,
                    format!("{} outside [{}, {}{}", value, spec.min, spec.max, upper),
                ));
            }
        }
        Ok(())
    }

    /// Copy with every field forced into its domain.
    ///
    /// Non-finite values fall back to the default for that field.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let mut out = *self;
        for spec in &PARAM_SPECS {
            let value = out.get(spec.kind);
            *out.get_mut(spec.kind) = if value.is_finite() {
                spec.clamp(value)
            } else {
                defaults.get(spec.kind)
            };
        }
        out
    }

    /// Set one field, clamped to its domain
    pub fn set(&mut self, kind: ParamKind, value: f32) {
        let spec = spec(kind);
        *self.get_mut(kind) = if value.is_finite() {
            spec.clamp(value)
        } else {
            Self::default().get(kind)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AnimationParams::default().validate().is_ok());
    }

    #[test]
    fn spec_lookup_matches_kind() {
        for s in &PARAM_SPECS {
            assert_eq!(spec(s.kind).kind, s.kind);
        }
    }

    #[test]
    fn set_clamps_into_range() {
        let mut params = AnimationParams::default();
        params.set(ParamKind::GlobalTwist, 9.0);
        assert_eq!(params.global_twist, 2.0);
        params.set(ParamKind::LocalDelay, 1.0);
        assert_eq!(params.local_delay, LOCAL_DELAY_MAX);
        params.set(ParamKind::Size, f32::NAN);
        assert_eq!(params.size, 50.0);
    }

    #[test]
    fn deserializes_original_field_names() {
        let params: AnimationParams =
            serde_json::from_str(r#"{"locprog": 0.3, "twist_self": 2.0, "twist": -1.0}"#).unwrap();
        assert_eq!(params.local_delay, 0.3);
        assert_eq!(params.self_twist, 2.0);
        assert_eq!(params.global_twist, -1.0);
        assert_eq!(params.size, 50.0);
    }
}
