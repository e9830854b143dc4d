//! Image collaborator for `send_image`.

use crate::error::{ClientError, ClientResult};

/// Width the full-size image is scaled to.
pub const FULL_IMAGE_WIDTH: u32 = 1000;

/// Width of the thumbnail.
pub const THUMBNAIL_WIDTH: u32 = 100;

/// An image prepared for sending: both renditions as JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    /// Width of the full-size rendition.
    pub width: u32,
    /// Height of the full-size rendition.
    pub height: u32,
    pub full: Vec<u8>,
    pub thumbnail: Vec<u8>,
}

impl ResizedImage {
    /// Fails on renditions the server would reject.
    pub fn check(&self) -> ClientResult<()> {
        if self.full.is_empty() || self.thumbnail.is_empty() {
            return Err(ClientError::Image("resizer produced an empty image".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ClientError::Image(format!(
                "invalid image dimensions {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Turns arbitrary image bytes into a full-size JPEG and a thumbnail,
/// scaled to [`FULL_IMAGE_WIDTH`] and [`THUMBNAIL_WIDTH`].
pub trait ImageResizer: Send + Sync {
    fn resize(&self, image: &[u8]) -> ClientResult<ResizedImage>;
}
