use anyhow::{Context, Result};
use std::path::Path;

/// Decoded texture ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA8
}

impl TextureData {
    /// Single opaque white texel, bound when no wipe texture is loaded
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            data: vec![255; 4],
        }
    }
}

pub fn load_wipe_texture(path: impl AsRef<Path>) -> Result<TextureData> {
    let path = path.as_ref();
    let image = image::open(path)
        .with_context(|| format!("Failed to decode wipe texture: {:?}", path))?
        .into_rgba8();

    let (width, height) = image.dimensions();
    log::info!("Loaded wipe texture {:?}: {}x{}", path, width, height);

    Ok(TextureData {
        width,
        height,
        data: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_fallback_is_one_opaque_texel() {
        let t = TextureData::white();
        assert_eq!((t.width, t.height), (1, 1));
        assert_eq!(t.data, [255, 255, 255, 255]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_wipe_texture("does/not/exist.png").unwrap_err();
        assert!(format!("{:#}", err).contains("exist.png"));
    }
}
