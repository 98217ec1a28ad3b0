use std::borrow::Cow;

use crate::error::{ShatterError, ShatterResult};

/// Named insertion point in a base shading program.
///
/// A base program marks each point with a line containing only
/// `//@hook <name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Module scope, before the vertex entry point
    VertexPrologue,
    /// Extra fields of the vertex input struct
    VertexAttributes,
    /// Inside the vertex entry point; may reassign `transformed`
    VertexPosition,
    /// Module scope, before the fragment entry point
    FragmentPrologue,
    /// Inside the fragment entry point; may reassign `diffuse`
    FragmentColor,
}

impl HookPoint {
    pub const ALL: [HookPoint; 5] = [
        HookPoint::VertexPrologue,
        HookPoint::VertexAttributes,
        HookPoint::VertexPosition,
        HookPoint::FragmentPrologue,
        HookPoint::FragmentColor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HookPoint::VertexPrologue => "vertex_prologue",
            HookPoint::VertexAttributes => "vertex_attributes",
            HookPoint::VertexPosition => "vertex_position",
            HookPoint::FragmentPrologue => "fragment_prologue",
            HookPoint::FragmentColor => "fragment_color",
        }
    }

    pub fn marker(&self) -> String {
        format!("//@hook {}", self.name())
    }

    fn from_marker(line: &str) -> Option<HookPoint> {
        let name = line.trim().strip_prefix("//@hook ")?;
        Self::ALL.into_iter().find(|p| p.name() == name.trim())
    }
}

/// Assembles a WGSL program from a base program and hook snippets
#[derive(Debug, Clone)]
pub struct ShaderBuilder {
    base: Cow<'static, str>,
    hooks: Vec<(HookPoint, String)>,
}

impl ShaderBuilder {
    pub fn new(base: impl Into<Cow<'static, str>>) -> Self {
        Self {
            base: base.into(),
            hooks: Vec::new(),
        }
    }

    pub fn hook(mut self, point: HookPoint, code: impl Into<String>) -> Self {
        self.hooks.push((point, code.into()));
        self
    }

    /// Substitute every marker; unused markers are dropped.
    pub fn build(&self) -> ShatterResult<String> {
        for (i, (point, _)) in self.hooks.iter().enumerate() {
            if self.hooks[..i].iter().any(|(p, _)| p == point) {
                return Err(ShatterError::shader(format!(
                    "hook `{}` supplied more than once",
                    point.name()
                )));
            }
        }

        for point in HookPoint::ALL {
            let count = self
                .base
                .lines()
                .filter(|line| HookPoint::from_marker(line) == Some(point))
                .count();
            let supplied = self.hooks.iter().any(|(p, _)| *p == point);
            if count > 1 {
                return Err(ShatterError::shader(format!(
                    "base program marks `{}` {} times",
                    point.name(),
                    count
                )));
            }
            if supplied && count == 0 {
                return Err(ShatterError::shader(format!(
                    "base program has no `{}` marker",
                    point.marker()
                )));
            }
        }

        let mut out = String::with_capacity(self.base.len());
        for line in self.base.lines() {
            match HookPoint::from_marker(line) {
                Some(point) => {
                    let indent = &line[..line.len() - line.trim_start().len()];
                    if let Some((_, code)) = self.hooks.iter().find(|(p, _)| *p == point) {
                        for code_line in code.lines() {
                            if code_line.trim().is_empty() {
                                out.push('\n');
                            } else {
                                out.push_str(indent);
                                out.push_str(code_line);
                                out.push('\n');
                            }
                        }
                    }
                }
                None => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        Ok(out)
    }
}
