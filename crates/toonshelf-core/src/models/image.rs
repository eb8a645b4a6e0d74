//! Image kinds accepted as comic panels.

use serde::{Deserialize, Serialize};

/// Raster formats a panel may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageKind {
    /// Map a file extension (without the dot) to an image kind, case-insensitively.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::Webp),
            "gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    /// Infer the kind from the extension of a file name or archive path.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let segment = name.rsplit('/').next().unwrap_or(name);
        let (_, extension) = segment.rsplit_once('.')?;
        Self::from_extension(extension)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
            ImageKind::Gif => "image/gif",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(ImageKind::from_extension("jpg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("JPEG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("Png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_extension("webp"), Some(ImageKind::Webp));
        assert_eq!(ImageKind::from_extension("gif"), Some(ImageKind::Gif));
        assert_eq!(ImageKind::from_extension("bmp"), None);
        assert_eq!(ImageKind::from_extension(""), None);
    }

    #[test]
    fn test_from_file_name_uses_last_segment() {
        assert_eq!(
            ImageKind::from_file_name("vol.1/page01.PNG"),
            Some(ImageKind::Png)
        );
        assert_eq!(ImageKind::from_file_name("vol.png/readme"), None);
        assert_eq!(ImageKind::from_file_name("ComicInfo.xml"), None);
        assert_eq!(ImageKind::from_file_name("noextension"), None);
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(ImageKind::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageKind::Png.mime_type(), "image/png");
        assert_eq!(ImageKind::Webp.mime_type(), "image/webp");
        assert_eq!(ImageKind::Gif.mime_type(), "image/gif");
    }
}
