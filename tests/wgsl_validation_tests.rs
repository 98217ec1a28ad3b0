use shatter::shading::{static_surface, Deform, ShatterMaterial};

/// Parse and validate a composed module the way wgpu does before pipeline creation
fn validate(source: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::default(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| format!("{:?}", e))?;
    Ok(())
}

fn materials() -> Vec<ShatterMaterial> {
    let mut out = Vec::new();
    for deform in [Deform::Gpu, Deform::Cpu] {
        for wipe in [true, false] {
            out.push(ShatterMaterial::new(deform, wipe));
        }
    }
    out
}

#[cfg(test)]
mod wgsl_validation_tests {
    use super::*;

    #[test]
    fn test_every_surface_variant_validates() {
        for material in materials() {
            let source = material.compose().unwrap();
            if let Err(e) = validate(&source) {
                panic!("{:?} failed validation:\n{}", material, e);
            }
        }
    }

    #[test]
    fn test_every_depth_variant_validates() {
        for material in materials() {
            let source = material.compose_depth().unwrap();
            if let Err(e) = validate(&source) {
                panic!("{:?} depth program failed validation:\n{}", material, e);
            }
        }
    }

    #[test]
    fn test_static_surface_validates() {
        let source = static_surface().unwrap();
        assert_eq!(validate(&source), Ok(()));
    }

    #[test]
    fn test_broken_hook_is_caught() {
        let source = ShatterMaterial::new(Deform::Gpu, false)
            .compose()
            .unwrap()
            .replace("transformed = shatter_v", "transformed = undefined_name + shatter_v");
        assert!(validate(&source).is_err());
    }
}
