use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;
use sha2::{Digest, Sha256};

/// Base64 image plus the MIME type used when it is embedded as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub base64: String,
    pub mime: &'static str,
}

impl EncodedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

pub fn encode_image(bytes: &[u8]) -> EncodedImage {
    EncodedImage {
        base64: BASE64.encode(bytes),
        mime: guess_image_mime(bytes),
    }
}

// Uploads are limited to PNG and JPEG; anything unrecognized is sent as JPEG.
fn guess_image_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        _ => "image/jpeg",
    }
}

pub fn image_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
