//! Alpha-over layer compositing.
//!
//! All layer assets share one canvas size. The composite walks the fixed
//! layer order back to front, converting every asset to RGBA and overlaying
//! at the origin, then encodes the result as PNG. PNG encoding of identical
//! pixels is byte-stable, which keeps the rendered artifact inside the
//! determinism contract.

use std::{io::Cursor, path::PathBuf};

use bytes::Bytes;
use image::{imageops, ImageFormat, RgbaImage};

use crate::{
    generator::errors::GeneratorError,
    types::{Layer, SelectedTraits},
};

/// Renders selected traits into a PNG image from on-disk layer assets.
#[derive(Debug, Clone)]
pub struct LayerCompositor {
    layers_dir: PathBuf,
}

impl LayerCompositor {
    #[must_use]
    pub fn new(layers_dir: impl Into<PathBuf>) -> Self {
        Self { layers_dir: layers_dir.into() }
    }

    fn load_layer(&self, layer: Layer, file: &str) -> Result<RgbaImage, GeneratorError> {
        let path = self.layers_dir.join(layer.dir_name()).join(file);
        if !path.is_file() {
            return Err(GeneratorError::MissingAsset { path: path.display().to_string() });
        }

        let decoded = image::open(&path).map_err(|e| {
            GeneratorError::Image(format!("failed to decode {}: {e}", path.display()))
        })?;
        Ok(decoded.to_rgba8())
    }

    /// Composites the selected layers and returns encoded PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::EmptyComposite`] when nothing was
    /// selected, [`GeneratorError::MissingAsset`] when a selected file does
    /// not exist, or [`GeneratorError::Image`] on decode/encode failure.
    /// All of these indicate rarity-table integrity problems or broken
    /// assets and must surface, never be papered over.
    pub fn render(&self, traits: &SelectedTraits) -> Result<Bytes, GeneratorError> {
        let mut canvas: Option<RgbaImage> = None;

        for layer in Layer::ALL {
            let Some(option) = traits.get(layer) else { continue };
            if option.is_empty_sentinel() {
                continue;
            }

            let source = self.load_layer(layer, &option.file)?;
            match canvas.as_mut() {
                None => canvas = Some(source),
                Some(base) => imageops::overlay(base, &source, 0, 0),
            }
        }

        let Some(composite) = canvas else {
            return Err(GeneratorError::EmptyComposite);
        };

        let mut encoded = Vec::new();
        composite
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|e| GeneratorError::Image(format!("PNG encode failed: {e}")))?;

        Ok(Bytes::from(encoded))
    }
}
