//! Preset container image
//!
//! A .kpp file is a plain PNG image whose text metadata carries the preset
//! document. This module is the raster-container boundary: it decodes a
//! container into pixels plus text fields, lets callers get/set fields by
//! keyword, and re-encodes the whole thing. Pixel data is never
//! interpreted here.

use image::{ImageFormat, RgbaImage};
use indexmap::IndexMap;
use std::io::Cursor;

use crate::preset::error::KppError;

/// A PNG image plus its keyword-addressed text metadata.
#[derive(Debug, Clone)]
pub struct MetaImage {
    image: RgbaImage,
    text: IndexMap<String, String>,
}

impl MetaImage {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            text: IndexMap::new(),
        }
    }

    /// Decode a container from PNG bytes, collecting tEXt, zTXt and iTXt
    /// fields alike.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KppError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();

        let decoder = png::Decoder::new(Cursor::new(bytes));
        let mut reader = decoder.read_info()?;
        // text chunks may sit after the image data; the frame has to be
        // consumed before finish() can surface them
        let mut frame = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut frame)?;
        reader.finish()?;

        let info = reader.info();
        let mut text = IndexMap::new();
        for chunk in &info.uncompressed_latin1_text {
            text.insert(chunk.keyword.clone(), chunk.text.clone());
        }
        for chunk in &info.compressed_latin1_text {
            text.insert(chunk.keyword.clone(), chunk.get_text()?);
        }
        for chunk in &info.utf8_text {
            text.insert(chunk.keyword.clone(), chunk.get_text()?);
        }

        Ok(Self { image, text })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Text field stored under the given keyword.
    pub fn text(&self, keyword: &str) -> Option<&str> {
        self.text.get(keyword).map(String::as_str)
    }

    pub fn set_text(&mut self, keyword: impl Into<String>, value: impl Into<String>) {
        self.text.insert(keyword.into(), value.into());
    }

    /// Encode the container back to PNG bytes. Latin-1 values go out as
    /// tEXt chunks (what Qt emits for these fields), anything else as iTXt.
    pub fn to_bytes(&self) -> Result<Vec<u8>, KppError> {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, self.image.width(), self.image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        for (keyword, value) in &self.text {
            if value.chars().all(|c| (c as u32) <= 255) {
                encoder.add_text_chunk(keyword.clone(), value.clone())?;
            } else {
                encoder.add_itxt_chunk(keyword.clone(), value.clone())?;
            }
        }

        let mut writer = encoder.write_header()?;
        writer.write_image_data(self.image.as_raw())?;
        writer.finish()?;
        Ok(out)
    }
}
