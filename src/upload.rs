//! Wallpaper upload checks, run before an image reaches the wallpaper store.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not an image file")]
    NotAnImage,
    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
}

/// Encodes `bytes` as a `data:` URL after checking the size limit and
/// sniffing the image format from its magic bytes.
pub fn image_data_url(bytes: &[u8], limit: u64) -> Result<String, UploadError> {
    let size = bytes.len() as u64;
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }
    let format = image::guess_format(bytes).map_err(|_| UploadError::NotAnImage)?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        B64.encode(bytes)
    ))
}

pub fn load_wallpaper_file(path: &Path, limit: u64) -> Result<String, UploadError> {
    let read_err = |source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    };
    let size = std::fs::metadata(path).map_err(read_err)?.len();
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }
    let bytes = std::fs::read(path).map_err(read_err)?;
    image_data_url(&bytes, limit)
}
