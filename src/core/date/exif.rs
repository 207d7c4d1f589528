//! EXIF "date taken" extraction for still images.
//!
//! Only attempted for formats that commonly carry EXIF (JPEG, TIFF, HEIC);
//! PNG/GIF/BMP skip straight to "no date". Tag priority mirrors what camera
//! firmware actually writes: DateTimeOriginal is the moment of capture,
//! DateTimeDigitized the scan/import time, DateTime the last modification.

use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{plausible_year, DateOutcome};
use crate::core::classify::has_exif_candidate_extension;

/// Extract the capture year from a photo's EXIF block.
pub fn capture_year(path: &Path) -> DateOutcome {
    if !has_exif_candidate_extension(path) {
        return DateOutcome::NoDate;
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return DateOutcome::AccessError;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not open image for EXIF read");
            return DateOutcome::NoDate;
        }
    };

    let mut bufreader = BufReader::new(&file);
    let reader = match Reader::new().read_from_container(&mut bufreader) {
        Ok(r) => r,
        // Normal for images without an EXIF block
        Err(_) => return DateOutcome::NoDate,
    };

    let tags = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];
    for tag in &tags {
        if let Some(field) = reader.get_field(*tag, In::PRIMARY) {
            if let Some(value) = ascii_value(&field.value) {
                if let Some(year) = year_from_datetime_string(&value) {
                    return DateOutcome::Year(year);
                }
            }
        }
    }

    DateOutcome::NoDate
}

/// Raw ASCII bytes of an EXIF value, trimmed of trailing NULs.
fn ascii_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Pull a plausible year out of an EXIF datetime string.
///
/// The canonical form is `YYYY:MM:DD HH:MM:SS` (colons at offsets 4 and 7),
/// so the year is always the leading four characters. Values that don't
/// lead with four digits, or whose year falls outside the plausible window,
/// are rejected rather than guessed at.
fn year_from_datetime_string(s: &str) -> Option<i32> {
    let leading: i32 = s.get(0..4)?.parse().ok()?;
    plausible_year(leading).then_some(leading)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_exif_datetime_yields_year() {
        assert_eq!(year_from_datetime_string("2019:07:04 12:30:01"), Some(2019));
    }

    #[test]
    fn bare_year_prefix_is_accepted() {
        assert_eq!(year_from_datetime_string("2003-11-02"), Some(2003));
    }

    #[test]
    fn short_or_garbled_values_are_rejected() {
        assert_eq!(year_from_datetime_string("19"), None);
        assert_eq!(year_from_datetime_string("n/a"), None);
        assert_eq!(year_from_datetime_string("0000:00:00 00:00:00"), None);
    }

    #[test]
    fn implausible_years_are_rejected() {
        assert_eq!(year_from_datetime_string("1899:01:01 00:00:00"), None);
        assert_eq!(year_from_datetime_string("9999:01:01 00:00:00"), None);
    }

    #[test]
    fn missing_file_is_an_access_error() {
        assert_eq!(
            capture_year(Path::new("/nonexistent/photo.jpg")),
            DateOutcome::AccessError
        );
    }

    #[test]
    fn non_candidate_extension_skips_straight_to_no_date() {
        assert_eq!(
            capture_year(Path::new("/nonexistent/image.png")),
            DateOutcome::NoDate
        );
    }

    #[test]
    fn image_without_exif_has_no_date() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        assert_eq!(capture_year(&path), DateOutcome::NoDate);
    }
}
