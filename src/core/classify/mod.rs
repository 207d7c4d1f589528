//! File classification by extension.
//!
//! Category membership is decided purely by the lowercase extension against
//! four fixed sets. Anything outside them is `Other` and gets deleted by the
//! pipeline without ever reaching the placement engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Media category assigned to every discovered file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    Image,
    Video,
    Archive,
    Other,
}

impl MediaCategory {
    /// Classify a path by its lowercase extension
    pub fn from_path(path: &Path) -> Self {
        match extension_lower(path).as_deref() {
            Some("jpg" | "jpeg" | "png" | "gif" | "tiff" | "bmp" | "heic" | "heif") => Self::Image,
            Some("mp4" | "avi" | "mov" | "wmv" | "mkv" | "flv" | "mpeg" | "mpg" | "m4v") => {
                Self::Video
            }
            Some("zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz") => Self::Archive,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaCategory::Image => write!(f, "image"),
            MediaCategory::Video => write!(f, "video"),
            MediaCategory::Archive => write!(f, "archive"),
            MediaCategory::Other => write!(f, "other"),
        }
    }
}

/// Lowercase extension without the dot, if any
pub fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Formats that commonly embed EXIF. PNG/GIF/BMP are skipped for speed.
pub fn has_exif_candidate_extension(path: &Path) -> bool {
    matches!(
        extension_lower(path).as_deref(),
        Some("jpg" | "jpeg" | "tiff" | "heic" | "heif")
    )
}

/// HEIC/HEIF images go through the converter instead of a plain move
pub fn is_heic(path: &Path) -> bool {
    matches!(extension_lower(path).as_deref(), Some("heic" | "heif"))
}

/// Subfolder name under `no_date/` for media without a resolvable year.
///
/// Buckets are keyed by extension name; a missing extension gets its own
/// bucket so nothing is guessed from file contents.
pub fn no_date_bucket(path: &Path) -> String {
    match extension_lower(path) {
        Some(ext) if !ext.is_empty() => ext,
        _ => "no_extension".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn classifies_images_case_insensitively() {
        assert_eq!(
            MediaCategory::from_path(Path::new("/p/IMG_1234.JPG")),
            MediaCategory::Image
        );
        assert_eq!(
            MediaCategory::from_path(Path::new("/p/photo.heic")),
            MediaCategory::Image
        );
    }

    #[test]
    fn classifies_videos() {
        assert_eq!(
            MediaCategory::from_path(Path::new("/p/clip.MOV")),
            MediaCategory::Video
        );
        assert_eq!(
            MediaCategory::from_path(Path::new("/p/clip.avi")),
            MediaCategory::Video
        );
    }

    #[test]
    fn classifies_archives() {
        assert_eq!(
            MediaCategory::from_path(Path::new("/p/backup.zip")),
            MediaCategory::Archive
        );
        assert_eq!(
            MediaCategory::from_path(Path::new("/p/backup.tar")),
            MediaCategory::Archive
        );
    }

    #[test]
    fn unknown_extension_is_other() {
        assert_eq!(
            MediaCategory::from_path(Path::new("/p/file.xyz")),
            MediaCategory::Other
        );
        assert_eq!(
            MediaCategory::from_path(Path::new("/p/noext")),
            MediaCategory::Other
        );
    }

    #[test]
    fn exif_candidates_exclude_png() {
        assert!(has_exif_candidate_extension(Path::new("/p/a.jpg")));
        assert!(has_exif_candidate_extension(Path::new("/p/a.HEIC")));
        assert!(!has_exif_candidate_extension(Path::new("/p/a.png")));
        assert!(!has_exif_candidate_extension(Path::new("/p/a.gif")));
    }

    #[test]
    fn bucket_uses_extension_name() {
        assert_eq!(no_date_bucket(Path::new("/p/a.JPG")), "jpg");
        assert_eq!(no_date_bucket(Path::new("/p/clip.mp4")), "mp4");
        assert_eq!(no_date_bucket(Path::new("/p/noext")), "no_extension");
    }
}
