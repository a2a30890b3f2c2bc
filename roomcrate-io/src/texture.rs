//! Texture loading for converted materials
//!
//! Images are loaded independently on the rayon pool. A texture that cannot be
//! read or decoded is replaced by a 1x1 white placeholder, embedded in its
//! place, and reported as a warning; it never fails the conversion.

use crate::error::IoError;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use log::debug;
use rayon::prelude::*;
use roomcrate_core::{TextureRef, WrapMode};
use std::io::Cursor;
use std::path::Path;

/// An image ready to be embedded, already encoded as PNG
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTexture {
    pub uri: String,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    /// True when the source image failed to load
    pub placeholder: bool,
}

/// Result of loading a batch of textures
#[derive(Debug, Default)]
pub struct TextureBatch {
    /// One entry per request, in request order
    pub textures: Vec<LoadedTexture>,
    pub warnings: Vec<String>,
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, IoError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|e| IoError::WriteError { message: format!("PNG encoding failed: {}", e) })?;
    Ok(bytes)
}

/// Load a single texture relative to `base_dir`
pub fn load_texture(base_dir: &Path, texture: &TextureRef) -> Result<LoadedTexture, IoError> {
    let path = base_dir.join(&texture.uri);
    if !path.is_file() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    // sniff the content; exported models often carry mislabelled image files
    let image = image::io::Reader::open(&path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| IoError::ParseError {
            message: format!("{}: {}", path.display(), e),
        })?;

    Ok(LoadedTexture {
        uri: texture.uri.clone(),
        png: encode_png(&image)?,
        width: image.width(),
        height: image.height(),
        wrap_s: texture.wrap_s,
        wrap_t: texture.wrap_t,
        placeholder: false,
    })
}

/// A blank 1x1 stand-in for a texture that could not be loaded
pub fn placeholder_texture(texture: &TextureRef) -> Result<LoadedTexture, IoError> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255])));
    Ok(LoadedTexture {
        uri: texture.uri.clone(),
        png: encode_png(&image)?,
        width: 1,
        height: 1,
        wrap_s: texture.wrap_s,
        wrap_t: texture.wrap_t,
        placeholder: true,
    })
}

/// Load every requested texture in parallel, substituting placeholders for failures.
///
/// Only a placeholder that cannot be built is an error.
pub fn load_textures(base_dir: &Path, requests: &[TextureRef]) -> Result<TextureBatch, IoError> {
    let results: Vec<(LoadedTexture, Option<String>)> = requests
        .par_iter()
        .map(|request| match load_texture(base_dir, request) {
            Ok(texture) => Ok((texture, None)),
            Err(e) => {
                let message = format!("Could not load {}, exporting without it", request.uri);
                debug!("{} ({})", message, e);
                Ok((placeholder_texture(request)?, Some(message)))
            }
        })
        .collect::<Result<_, IoError>>()?;

    let mut batch = TextureBatch::default();
    for (texture, warning) in results {
        batch.textures.push(texture);
        batch.warnings.extend(warning);
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_real_image_and_replaces_missing_one() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
        image.save(dir.path().join("wood.png")).unwrap();

        let requests = vec![TextureRef::new("wood.png"), TextureRef::new("missing.jpg")];
        let batch = load_textures(dir.path(), &requests).unwrap();

        assert_eq!(batch.textures.len(), 2);
        assert_eq!(batch.textures[0].uri, "wood.png");
        assert_eq!((batch.textures[0].width, batch.textures[0].height), (4, 2));
        assert!(!batch.textures[0].placeholder);

        assert!(batch.textures[1].placeholder);
        assert_eq!((batch.textures[1].width, batch.textures[1].height), (1, 1));
        assert!(batch.textures[1].png.starts_with(&[0x89, b'P', b'N', b'G']));

        assert_eq!(batch.warnings, vec!["Could not load missing.jpg, exporting without it".to_string()]);
    }

    #[test]
    fn test_undecodable_image_is_soft_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        let batch = load_textures(dir.path(), &[TextureRef::new("broken.png")]).unwrap();
        assert!(batch.textures[0].placeholder);
        assert_eq!(batch.warnings.len(), 1);
    }
}
