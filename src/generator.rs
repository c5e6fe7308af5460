//! Resource generators
//!
//! A generator turns one resolved source file into one or more resource
//! objects. Generators are registered against a type tag in a
//! [`GeneratorRegistry`]; looking up an unknown tag is an error.

use image::{Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::{ColorMode, Platform};
use crate::definition::{ResourceDefinition, ResourceObject};
use crate::error::{ResourceError, ResourceResult};

/// Converts a source file into resource objects
pub trait ResourceGenerator: Send + Sync {
    /// Generate objects for `definition` from the file at `source`
    fn generate(
        &self,
        definition: &ResourceDefinition,
        source: &Path,
        platform: &Platform,
    ) -> ResourceResult<Vec<ResourceObject>>;
}

impl<F> ResourceGenerator for F
where
    F: Fn(&ResourceDefinition, &Path, &Platform) -> ResourceResult<Vec<ResourceObject>>
        + Send
        + Sync,
{
    fn generate(
        &self,
        definition: &ResourceDefinition,
        source: &Path,
        platform: &Platform,
    ) -> ResourceResult<Vec<ResourceObject>> {
        self(definition, source, platform)
    }
}

/// Explicit mapping from type tag to generator
pub struct GeneratorRegistry {
    generators: BTreeMap<String, Box<dyn ResourceGenerator>>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("types", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl GeneratorRegistry {
    /// Registry with no generators
    pub fn empty() -> Self {
        Self {
            generators: BTreeMap::new(),
        }
    }

    /// Registry with the builtin `raw`, `png`, `bitmap` and `png-trans` generators
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("raw", RawGenerator);
        registry.register("png", PngGenerator);
        registry.register("bitmap", BitmapGenerator);
        registry.register("png-trans", TransparentPngGenerator);
        registry
    }

    /// Register a generator, replacing any previous one for the tag
    pub fn register(
        &mut self,
        resource_type: impl Into<String>,
        generator: impl ResourceGenerator + 'static,
    ) {
        self.generators.insert(resource_type.into(), Box::new(generator));
    }

    /// Check whether a type tag has a generator
    pub fn supports(&self, resource_type: &str) -> bool {
        self.generators.contains_key(resource_type)
    }

    /// Registered type tags, sorted
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    /// Dispatch to the generator for `definition.resource_type`
    pub fn generate(
        &self,
        definition: &ResourceDefinition,
        source: &Path,
        platform: &Platform,
    ) -> ResourceResult<Vec<ResourceObject>> {
        let generator = self
            .generators
            .get(&definition.resource_type)
            .ok_or_else(|| ResourceError::UnsupportedResourceType {
                name: definition.name.clone(),
                resource_type: definition.resource_type.clone(),
            })?;
        generator.generate(definition, source, platform)
    }
}

fn read_source(definition: &ResourceDefinition, source: &Path) -> ResourceResult<Vec<u8>> {
    fs::read(source).map_err(|e| ResourceError::SourceRead {
        name: definition.name.clone(),
        path: source.to_path_buf(),
        reason: e.to_string(),
    })
}

fn load_rgba(definition: &ResourceDefinition, source: &Path) -> ResourceResult<RgbaImage> {
    let data = read_source(definition, source)?;
    image::load_from_memory(&data)
        .map(|img| img.to_rgba8())
        .map_err(|e| ResourceError::SourceRead {
            name: definition.name.clone(),
            path: source.to_path_buf(),
            reason: format!("Failed to decode image: {}", e),
        })
}

// ============================================================================
// Raw / PNG
// ============================================================================

/// Passes source bytes through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct RawGenerator;

impl ResourceGenerator for RawGenerator {
    fn generate(
        &self,
        definition: &ResourceDefinition,
        source: &Path,
        _platform: &Platform,
    ) -> ResourceResult<Vec<ResourceObject>> {
        let data = read_source(definition, source)?;
        Ok(vec![ResourceObject::new(definition.clone(), data)])
    }
}

/// Stores PNG files as-is after checking they decode
#[derive(Debug, Clone, Copy, Default)]
pub struct PngGenerator;

impl ResourceGenerator for PngGenerator {
    fn generate(
        &self,
        definition: &ResourceDefinition,
        source: &Path,
        _platform: &Platform,
    ) -> ResourceResult<Vec<ResourceObject>> {
        let data = read_source(definition, source)?;
        image::load_from_memory_with_format(&data, image::ImageFormat::Png).map_err(|e| {
            ResourceError::SourceRead {
                name: definition.name.clone(),
                path: source.to_path_buf(),
                reason: format!("Not a valid PNG: {}", e),
            }
        })?;
        Ok(vec![ResourceObject::new(definition.clone(), data)])
    }
}

// ============================================================================
// Packed Bitmaps
// ============================================================================

/// Bitmap header version stored in the top nibble of the info flags
const BITMAP_VERSION: u16 = 1;
/// Packed bitmap header size in bytes
pub const BITMAP_HEADER_SIZE: usize = 12;

const FORMAT_1BIT: u16 = 0;
const FORMAT_8BIT: u16 = 1;

/// Converts an image into the firmware's packed bitmap format
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapGenerator;

impl ResourceGenerator for BitmapGenerator {
    fn generate(
        &self,
        definition: &ResourceDefinition,
        source: &Path,
        platform: &Platform,
    ) -> ResourceResult<Vec<ResourceObject>> {
        let img = load_rgba(definition, source)?;
        let data = pack_bitmap(&img, platform.color_mode).map_err(|reason| {
            ResourceError::SourceRead {
                name: definition.name.clone(),
                path: source.to_path_buf(),
                reason,
            }
        })?;
        Ok(vec![ResourceObject::new(definition.clone(), data)])
    }
}

/// Emits `<NAME>_WHITE` and `<NAME>_BLACK` bitmaps for displays without alpha
///
/// The firmware draws the BLACK bitmap with an AND compositing op and the
/// WHITE bitmap with an OR op. Transparent pixels therefore become black in
/// the WHITE bitmap and white in the BLACK bitmap so neither touches the
/// background.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransparentPngGenerator;

/// Suffixes and transparent-pixel fills for each emitted bitmap
const TRANSPARENT_VARIANTS: [(&str, Rgba<u8>); 2] = [
    ("_WHITE", Rgba([0, 0, 0, 255])),
    ("_BLACK", Rgba([255, 255, 255, 255])),
];

impl ResourceGenerator for TransparentPngGenerator {
    fn generate(
        &self,
        definition: &ResourceDefinition,
        source: &Path,
        platform: &Platform,
    ) -> ResourceResult<Vec<ResourceObject>> {
        let img = load_rgba(definition, source)?;

        TRANSPARENT_VARIANTS
            .iter()
            .map(|(suffix, fill)| -> ResourceResult<ResourceObject> {
                let mut composited = img.clone();
                substitute_transparent(&mut composited, *fill);
                let data = pack_bitmap(&composited, platform.color_mode).map_err(|reason| {
                    ResourceError::SourceRead {
                        name: definition.name.clone(),
                        path: source.to_path_buf(),
                        reason,
                    }
                })?;
                Ok(ResourceObject::new(definition.derive(suffix, "bitmap"), data))
            })
            .collect()
    }
}

/// Replace every mostly-transparent pixel with `fill`
fn substitute_transparent(img: &mut RgbaImage, fill: Rgba<u8>) {
    for pixel in img.pixels_mut() {
        if pixel[3] < 128 {
            *pixel = fill;
        }
    }
}

/// Pack an image as `row_size u16, info_flags u16, x i16, y i16, w i16, h i16`
/// followed by pixel rows, all little-endian
pub fn pack_bitmap(img: &RgbaImage, mode: ColorMode) -> Result<Vec<u8>, String> {
    let (width, height) = img.dimensions();
    if width > i16::MAX as u32 || height > i16::MAX as u32 {
        return Err(format!("Image too large: {}x{}", width, height));
    }

    let (format, row_size) = match mode {
        ColorMode::Mono1Bit => (FORMAT_1BIT, width.div_ceil(32) * 4),
        ColorMode::Color8Bit => (FORMAT_8BIT, width),
    };
    if row_size > u16::MAX as u32 {
        return Err(format!("Row too wide: {} bytes", row_size));
    }

    let info_flags = (BITMAP_VERSION << 12) | (format << 1);
    let mut out = Vec::with_capacity(BITMAP_HEADER_SIZE + (row_size * height) as usize);
    out.extend_from_slice(&(row_size as u16).to_le_bytes());
    out.extend_from_slice(&info_flags.to_le_bytes());
    out.extend_from_slice(&0i16.to_le_bytes());
    out.extend_from_slice(&0i16.to_le_bytes());
    out.extend_from_slice(&(width as i16).to_le_bytes());
    out.extend_from_slice(&(height as i16).to_le_bytes());

    for y in 0..height {
        match mode {
            ColorMode::Mono1Bit => {
                let mut row = vec![0u8; row_size as usize];
                for x in 0..width {
                    if is_white(img.get_pixel(x, y)) {
                        row[(x / 8) as usize] |= 1 << (x % 8);
                    }
                }
                out.extend_from_slice(&row);
            }
            ColorMode::Color8Bit => {
                out.extend((0..width).map(|x| argb2222(img.get_pixel(x, y))));
            }
        }
    }

    Ok(out)
}

fn is_white(pixel: &Rgba<u8>) -> bool {
    let [r, g, b, a] = pixel.0;
    if a < 128 {
        return false;
    }
    let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
    luma >= 128
}

fn argb2222(pixel: &Rgba<u8>) -> u8 {
    let [r, g, b, a] = pixel.0;
    ((a >> 6) << 6) | ((r >> 6) << 4) | ((g >> 6) << 2) | (b >> 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_packing_lsb_first() {
        let mut img = RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(2, 0, Rgba([255, 255, 255, 255]));

        let data = pack_bitmap(&img, ColorMode::Mono1Bit).unwrap();
        assert_eq!(data.len(), BITMAP_HEADER_SIZE + 4);
        assert_eq!(&data[0..2], &4u16.to_le_bytes());
        assert_eq!(&data[2..4], &0x1000u16.to_le_bytes());
        assert_eq!(&data[8..10], &3i16.to_le_bytes());
        assert_eq!(&data[10..12], &1i16.to_le_bytes());
        assert_eq!(data[12], 0b0000_0101);
    }

    #[test]
    fn test_color_packing() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 85, 255]));
        let data = pack_bitmap(&img, ColorMode::Color8Bit).unwrap();
        assert_eq!(data.len(), BITMAP_HEADER_SIZE + 4);
        assert_eq!(&data[2..4], &0x1002u16.to_le_bytes());
        assert_eq!(data[12], 0b11_11_00_01);
    }

    #[test]
    fn test_substitute_transparent() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 0]));
        substitute_transparent(&mut img, Rgba([255, 255, 255, 255]));
        assert!(is_white(img.get_pixel(0, 0)));
    }

    #[test]
    fn test_unknown_type() {
        let registry = GeneratorRegistry::with_defaults();
        let def = ResourceDefinition::new("font", "FONT_X", "x.ttf");
        let platform = Platform::new("aplite", &["bw"]);
        let err = registry
            .generate(&def, Path::new("x.ttf"), &platform)
            .unwrap_err();
        assert!(matches!(err, ResourceError::UnsupportedResourceType { .. }));
    }
}
