use std::cell::RefCell;
use std::fmt;

use glam::Vec3;

use crate::animation::lanes::{Lanes, NORMALIZE_EPSILON};

/// A WGSL expression: a literal, an input name or a `let` binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WgslExpr(String);

impl WgslExpr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WgslExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Records WGSL `let` statements instead of computing values.
///
/// Every operation binds its result to a fresh name, so the generated code
/// grows linearly with the number of operations.
pub struct WgslLanes {
    prefix: String,
    statements: RefCell<Vec<String>>,
}

impl WgslLanes {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            statements: RefCell::new(Vec::new()),
        }
    }

    /// Refer to a value already in scope in the shader (attribute, uniform field)
    pub fn input(&self, name: &str) -> WgslExpr {
        WgslExpr(name.to_string())
    }

    /// Bind an arbitrary WGSL expression to a fresh name
    pub fn bind(&self, expr: impl Into<String>) -> WgslExpr {
        let mut statements = self.statements.borrow_mut();
        let name = format!("{}{}", self.prefix, statements.len());
        statements.push(format!("let {} = {};", name, expr.into()));
        WgslExpr(name)
    }

    /// Recorded statements, in order
    pub fn finish(self) -> Vec<String> {
        self.statements.into_inner()
    }
}

pub fn float_literal(value: f32) -> String {
    let text = format!("{:?}", value);
    if value.is_sign_negative() {
        format!("({})", text)
    } else {
        text
    }
}

pub fn vec3_literal(value: Vec3) -> String {
    format!(
        "vec3<f32>({}, {}, {})",
        float_literal(value.x),
        float_literal(value.y),
        float_literal(value.z)
    )
}

impl Lanes for WgslLanes {
    type Scalar = WgslExpr;
    type Vector = WgslExpr;

    fn scalar(&self, value: f32) -> WgslExpr {
        WgslExpr(float_literal(value))
    }

    fn vector(&self, value: Vec3) -> WgslExpr {
        WgslExpr(vec3_literal(value))
    }

    fn add(&self, a: &WgslExpr, b: &WgslExpr) -> WgslExpr {
        self.bind(format!("{} + {}", a, b))
    }

    fn sub(&self, a: &WgslExpr, b: &WgslExpr) -> WgslExpr {
        self.bind(format!("{} - {}", a, b))
    }

    fn mul(&self, a: &WgslExpr, b: &WgslExpr) -> WgslExpr {
        self.bind(format!("{} * {}", a, b))
    }

    fn div(&self, a: &WgslExpr, b: &WgslExpr) -> WgslExpr {
        self.bind(format!("{} / {}", a, b))
    }

    fn clamp(&self, x: &WgslExpr, lo: &WgslExpr, hi: &WgslExpr) -> WgslExpr {
        // same max-then-min order as CpuLanes::clamp
        self.bind(format!("min(max({}, {}), {})", x, lo, hi))
    }

    fn sin(&self, x: &WgslExpr) -> WgslExpr {
        self.bind(format!("sin({})", x))
    }

    fn cos(&self, x: &WgslExpr) -> WgslExpr {
        self.bind(format!("cos({})", x))
    }

    fn sign(&self, x: &WgslExpr) -> WgslExpr {
        self.bind(format!("sign({})", x))
    }

    fn y(&self, v: &WgslExpr) -> WgslExpr {
        self.bind(format!("{}.y", v))
    }

    fn vadd(&self, a: &WgslExpr, b: &WgslExpr) -> WgslExpr {
        self.bind(format!("{} + {}", a, b))
    }

    fn vsub(&self, a: &WgslExpr, b: &WgslExpr) -> WgslExpr {
        self.bind(format!("{} - {}", a, b))
    }

    fn vscale(&self, v: &WgslExpr, s: &WgslExpr) -> WgslExpr {
        self.bind(format!("{} * {}", v, s))
    }

    fn cross(&self, a: &WgslExpr, b: &WgslExpr) -> WgslExpr {
        self.bind(format!("cross({}, {})", a, b))
    }

    fn normalize_or_zero(&self, v: &WgslExpr) -> WgslExpr {
        self.bind(format!(
            "{} * inverseSqrt(max(dot({}, {}), {:e}))",
            v, v, v, NORMALIZE_EPSILON
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_are_valid_wgsl_floats() {
        assert_eq!(float_literal(1.0), "1.0");
        assert_eq!(float_literal(0.5), "0.5");
        assert_eq!(float_literal(-2.0), "(-2.0)");
        assert_eq!(vec3_literal(Vec3::Y), "vec3<f32>(0.0, 1.0, 0.0)");
    }

    #[test]
    fn operations_bind_fresh_names() {
        let l = WgslLanes::new("t");
        let a = l.input("a");
        let b = l.scalar(2.0);
        let sum = l.add(&a, &b);
        let product = l.mul(&sum, &sum);
        assert_eq!(sum.as_str(), "t0");
        assert_eq!(product.as_str(), "t1");
        assert_eq!(
            l.finish(),
            vec!["let t0 = a + 2.0;".to_string(), "let t1 = t0 * t0;".to_string()]
        );
    }

    #[test]
    fn normalize_epsilon_is_a_float_literal() {
        let l = WgslLanes::new("n");
        l.normalize_or_zero(&l.input("v"));
        let statements = l.finish();
        assert!(statements[0].contains("1e-30"), "{}", statements[0]);
    }
}
