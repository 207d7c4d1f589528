//! Creation-time extraction from ISO base media containers (MP4/MOV/M4V).
//!
//! The format is a tree of boxes, each headed by a 4-byte big-endian size
//! and a 4-byte type tag. A size of 1 means an 8-byte extended size follows
//! (16-byte header total); a size of 0 means the box extends to end of
//! file. The movie header (`mvhd`) inside `moov` carries creation and
//! modification times as seconds since 1904-01-01.
//!
//! Malformed structure (declared size past end of file, truncated reads)
//! aborts the walk and yields "no date" - corruption is never escalated to
//! a read error.

use chrono::Datelike;
use std::io;
use std::path::Path;

use super::cursor::FileCursor;
use super::{plausible_year, DateOutcome};

/// Seconds between 1904-01-01 and 1970-01-01
const MP4_EPOCH_OFFSET: u64 = 2_082_844_800;

/// Extract the creation year from an MP4-family container.
pub fn creation_year(path: &Path) -> DateOutcome {
    let mut cursor = match FileCursor::open(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return DateOutcome::AccessError,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not open video for metadata read");
            return DateOutcome::NoDate;
        }
    };

    if cursor.len() < 16 {
        return DateOutcome::NoDate;
    }

    match scan_top_level(&mut cursor) {
        Ok(Some(year)) if plausible_year(year) => DateOutcome::Year(year),
        _ => DateOutcome::NoDate,
    }
}

struct BoxHeader {
    kind: [u8; 4],
    payload_start: u64,
    box_end: u64,
}

/// Read one box header, validating the declared size against the region.
///
/// Returns `None` when there is no room for another header or the declared
/// size is nonsense; the caller treats both as end of walk.
fn read_box_header(cursor: &mut FileCursor, region_end: u64) -> io::Result<Option<BoxHeader>> {
    let start = cursor.position();
    if start + 8 > region_end {
        return Ok(None);
    }

    let size32 = cursor.read_u32_be()? as u64;
    let kind = cursor.read_array::<4>()?;

    let (size, header_len) = if size32 == 1 {
        if start + 16 > region_end {
            return Ok(None);
        }
        (cursor.read_u64_be()?, 16u64)
    } else if size32 == 0 {
        (region_end - start, 8u64)
    } else {
        (size32, 8u64)
    };

    if size < header_len || start.checked_add(size).map_or(true, |end| end > region_end) {
        return Ok(None);
    }

    Ok(Some(BoxHeader {
        kind,
        payload_start: start + header_len,
        box_end: start + size,
    }))
}

fn scan_top_level(cursor: &mut FileCursor) -> io::Result<Option<i32>> {
    let file_end = cursor.len();
    while let Some(header) = read_box_header(cursor, file_end)? {
        if &header.kind == b"moov" {
            return scan_moov(cursor, header.payload_start, header.box_end);
        }
        cursor.seek_to(header.box_end)?;
    }
    Ok(None)
}

fn scan_moov(cursor: &mut FileCursor, start: u64, end: u64) -> io::Result<Option<i32>> {
    cursor.seek_to(start)?;
    while let Some(header) = read_box_header(cursor, end)? {
        if &header.kind == b"mvhd" {
            cursor.seek_to(header.payload_start)?;
            return parse_mvhd(cursor);
        }
        cursor.seek_to(header.box_end)?;
    }
    Ok(None)
}

fn parse_mvhd(cursor: &mut FileCursor) -> io::Result<Option<i32>> {
    // 1-byte version packed with a 3-byte flags field
    let version_flags = cursor.read_array::<4>()?;
    let creation = if version_flags[0] == 1 {
        cursor.read_u64_be()?
    } else {
        cursor.read_u32_be()? as u64
    };

    // Zero or pre-1904 values signal corruption
    if creation == 0 || creation < MP4_EPOCH_OFFSET {
        return Ok(None);
    }

    let unix_secs = (creation - MP4_EPOCH_OFFSET) as i64;
    Ok(chrono::DateTime::from_timestamp(unix_secs, 0).map(|dt| dt.year()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    // 2029-01-01T00:00:00Z
    const SECS_2029: u32 = 1_861_920_000;

    fn write_fixture(bytes: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        (dir, path)
    }

    fn mvhd_v0(creation: u32) -> Vec<u8> {
        let mut payload = vec![0u8; 4]; // version 0 + flags
        payload.extend_from_slice(&creation.to_be_bytes());
        payload.extend_from_slice(&0u32.to_be_bytes()); // modification time
        boxed(b"mvhd", &payload)
    }

    fn mvhd_v1(creation: u64) -> Vec<u8> {
        let mut payload = vec![1, 0, 0, 0]; // version 1 + flags
        payload.extend_from_slice(&creation.to_be_bytes());
        payload.extend_from_slice(&0u64.to_be_bytes());
        boxed(b"mvhd", &payload)
    }

    fn boxed(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn version0_mvhd_decodes_exact_year() {
        let creation = SECS_2029 + MP4_EPOCH_OFFSET as u32;
        let mut bytes = boxed(b"ftyp", &[0u8; 8]);
        bytes.extend(boxed(b"moov", &mvhd_v0(creation)));

        let (_dir, path) = write_fixture(&bytes);
        assert_eq!(creation_year(&path), DateOutcome::Year(2029));
    }

    #[test]
    fn version1_mvhd_decodes_64bit_creation() {
        let creation = SECS_2029 as u64 + MP4_EPOCH_OFFSET;
        let mut bytes = boxed(b"ftyp", &[0u8; 8]);
        bytes.extend(boxed(b"moov", &mvhd_v1(creation)));

        let (_dir, path) = write_fixture(&bytes);
        assert_eq!(creation_year(&path), DateOutcome::Year(2029));
    }

    #[test]
    fn zero_creation_time_is_no_date() {
        let mut bytes = boxed(b"ftyp", &[0u8; 8]);
        bytes.extend(boxed(b"moov", &mvhd_v0(0)));

        let (_dir, path) = write_fixture(&bytes);
        assert_eq!(creation_year(&path), DateOutcome::NoDate);
    }

    #[test]
    fn pre_epoch_creation_time_is_no_date() {
        let mut bytes = boxed(b"ftyp", &[0u8; 8]);
        bytes.extend(boxed(b"moov", &mvhd_v0(1000)));

        let (_dir, path) = write_fixture(&bytes);
        assert_eq!(creation_year(&path), DateOutcome::NoDate);
    }

    #[test]
    fn oversized_declared_box_aborts_to_no_date() {
        // moov claims 4 GiB; file is a few dozen bytes
        let mut bytes = boxed(b"ftyp", &[0u8; 8]);
        bytes.extend_from_slice(&0xFFFF_FFF0u32.to_be_bytes());
        bytes.extend_from_slice(b"moov");
        bytes.extend_from_slice(&[0u8; 16]);

        let (_dir, path) = write_fixture(&bytes);
        assert_eq!(creation_year(&path), DateOutcome::NoDate);
    }

    #[test]
    fn file_without_moov_is_no_date() {
        let bytes = boxed(b"ftyp", &[0u8; 24]);
        let (_dir, path) = write_fixture(&bytes);
        assert_eq!(creation_year(&path), DateOutcome::NoDate);
    }

    #[test]
    fn missing_file_is_access_error() {
        assert_eq!(
            creation_year(Path::new("/nonexistent/clip.mp4")),
            DateOutcome::AccessError
        );
    }
}
