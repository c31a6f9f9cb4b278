//! Image payload encoding.
//!
//! Every image snapshot, whether it came from the clipboard or from a
//! screenshot file, is stored as RGBA pixels re-encoded to PNG and wrapped
//! in a base64 data URI. Dedup compares these strings, so the same pixels
//! reached through either path produce the same payload.

use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

pub fn to_data_uri(image: &RgbaImage) -> Result<String> {
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;

    Ok(format!("{DATA_URI_PREFIX}{}", B64.encode(png.into_inner())))
}

/// Accepts any `data:<mime>;base64,` URI the image crate can decode.
pub fn from_data_uri(uri: &str) -> Result<RgbaImage> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| Error::InvalidSnapshot("image payload is not a base64 data uri".to_string()))?;

    let bytes = B64.decode(payload)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

pub fn decode_file(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// Approximate size of the encoded image behind a data URI.
pub fn encoded_len(uri: &str) -> usize {
    let payload = uri.split_once(";base64,").map_or(uri, |(_, p)| p);
    payload.len() / 4 * 3
}
