//! CPU side of the block texture atlas.
//!
//! The atlas is a vertical strip of `ATLAS_ROWS` textures. Face quads address a row through
//! their v coordinate, see `Block::texture_row`.

use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::engine_state::voxels::block::ATLAS_ROWS;

/// Errors raised while loading image assets.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("atlas of {width}x{height} pixels cannot hold {rows} rows")]
    Shape { width: u32, height: u32, rows: usize },
}

/// Decoded RGBA8 atlas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Base colours of the procedural atlas rows: grass side, grass top, dirt, stone.
const GRASS: [u8; 3] = [92, 160, 60];
const DIRT: [u8; 3] = [121, 85, 58];
const STONE: [u8; 3] = [125, 125, 125];

impl AtlasImage {
    /// Reads and decodes the atlas at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&bytes)
    }

    /// Decodes PNG or JPEG bytes into an atlas.
    pub fn decode(bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || height % ATLAS_ROWS as u32 != 0 {
            return Err(AssetError::Shape {
                width,
                height,
                rows: ATLAS_ROWS,
            });
        }
        Ok(Self {
            width,
            height,
            rgba: image.into_raw(),
        })
    }

    /// The atlas at `path`, or a procedural one if it cannot be loaded.
    pub fn load_or_procedural<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(atlas) => {
                info!(
                    "Loaded texture atlas {} ({}x{})",
                    path.display(),
                    atlas.width,
                    atlas.height
                );
                atlas
            }
            Err(err) => {
                warn!("Using the procedural texture atlas: {}", err);
                Self::procedural(16)
            }
        }
    }

    /// Generates a `tile x (tile * ATLAS_ROWS)` atlas of speckled solid colours.
    pub fn procedural(tile: u32) -> Self {
        let width = tile;
        let height = tile * ATLAS_ROWS as u32;
        let grass_edge = (tile / 4).max(1);
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);

        for y in 0..height {
            let (row, row_y) = (y / tile, y % tile);
            for x in 0..width {
                let base = match row {
                    0 if row_y < grass_edge => GRASS,
                    0 | 2 => DIRT,
                    1 => GRASS,
                    _ => STONE,
                };
                let speckle = (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)) % 24;
                rgba.extend(base.iter().map(|channel| channel.saturating_sub(speckle as u8)));
                rgba.push(u8::MAX);
            }
        }

        Self {
            width,
            height,
            rgba,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png encodes");
        bytes
    }

    #[test]
    fn procedural_atlas_has_one_square_tile_per_row() {
        let atlas = AtlasImage::procedural(16);
        assert_eq!(atlas.width, 16);
        assert_eq!(atlas.height, 16 * ATLAS_ROWS as u32);
        assert_eq!(atlas.rgba.len(), (16 * 64 * 4) as usize);
        assert!(atlas.rgba.chunks_exact(4).all(|pixel| pixel[3] == u8::MAX));
    }

    #[test]
    fn png_strip_decodes() {
        let atlas = AtlasImage::decode(&encode_png(8, 32)).expect("valid strip");
        assert_eq!((atlas.width, atlas.height), (8, 32));
        assert_eq!(&atlas.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn strip_must_divide_into_rows() {
        let err = AtlasImage::decode(&encode_png(8, 30)).unwrap_err();
        assert!(matches!(err, AssetError::Shape { height: 30, .. }));
    }

    #[test]
    fn missing_atlas_falls_back() {
        assert!(matches!(
            AtlasImage::load("assets/textures/does-not-exist.png"),
            Err(AssetError::Io { .. })
        ));
        let atlas = AtlasImage::load_or_procedural("assets/textures/does-not-exist.png");
        assert_eq!(atlas, AtlasImage::procedural(16));
    }
}
