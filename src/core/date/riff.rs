//! Creation-date extraction from AVI (RIFF) containers.
//!
//! RIFF is a flat sequence of chunks: 4-byte id, 4-byte little-endian size,
//! then the payload. Odd-sized chunks are followed by one pad byte; every
//! skip must honor that rule or every subsequent read lands mid-chunk.
//! Creation metadata lives in an `INFO` LIST as `ICRD` (creation date) or
//! `IDIT` (digitization date) sub-chunks holding free-form text.

use chrono::Datelike;
use regex::Regex;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use super::cursor::FileCursor;
use super::DateOutcome;

/// Cap on how much of a tag value is read, whatever its declared size
const MAX_VALUE_READ: u64 = 512;

static YEAR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

/// Extract the creation year from an AVI file's INFO metadata.
pub fn creation_year(path: &Path) -> DateOutcome {
    let mut cursor = match FileCursor::open(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return DateOutcome::AccessError,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not open AVI for metadata read");
            return DateOutcome::NoDate;
        }
    };

    if cursor.len() < 12 {
        return DateOutcome::NoDate;
    }

    let header = match cursor.read_array::<12>() {
        Ok(h) => h,
        Err(_) => return DateOutcome::NoDate,
    };
    if &header[0..4] != b"RIFF" || &header[8..12] != b"AVI " {
        return DateOutcome::NoDate;
    }

    match scan_chunks(&mut cursor) {
        Ok(Some(year)) => DateOutcome::Year(year),
        _ => DateOutcome::NoDate,
    }
}

fn scan_chunks(cursor: &mut FileCursor) -> io::Result<Option<i32>> {
    let limit = cursor.len();
    loop {
        if cursor.remaining() < 8 {
            return Ok(None);
        }
        let id = cursor.read_array::<4>()?;
        let size = cursor.read_u32_le()? as u64;
        let data_end = cursor.position() + size;
        if data_end > limit {
            // declared size runs past end of file
            return Ok(None);
        }

        if &id == b"LIST" && size >= 4 {
            let list_type = cursor.read_array::<4>()?;
            if &list_type == b"INFO" {
                if let Some(year) = scan_info(cursor, data_end)? {
                    return Ok(Some(year));
                }
            }
        }

        cursor.seek_to(data_end)?;
        // RIFF word alignment: odd payloads carry one pad byte
        if size % 2 == 1 && cursor.skip(1).is_err() {
            return Ok(None);
        }
    }
}

fn scan_info(cursor: &mut FileCursor, list_end: u64) -> io::Result<Option<i32>> {
    loop {
        if cursor.position() + 8 > list_end {
            return Ok(None);
        }
        let tag = cursor.read_array::<4>()?;
        let size = cursor.read_u32_le()? as u64;
        let value_end = cursor.position() + size;
        if value_end > list_end {
            return Ok(None);
        }

        if &tag == b"ICRD" || &tag == b"IDIT" {
            let take = size.min(MAX_VALUE_READ) as usize;
            let value = cursor.read_bytes(take)?;
            if let Some(year) = year_from_info_value(&value) {
                return Ok(Some(year));
            }
        }

        cursor.seek_to(value_end)?;
        if size % 2 == 1 && cursor.skip(1).is_err() {
            return Ok(None);
        }
    }
}

/// First 4-digit run in `[1970, current + 1]`, scanning left to right.
///
/// Values are free-form text like `"Mon Jan 02 2006"` or `"2006-01-02"`,
/// so the scan slides one byte at a time rather than taking only
/// non-overlapping matches.
fn year_from_info_value(raw: &[u8]) -> Option<i32> {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_matches(|c: char| matches!(c, '\0' | '\r' | '\n' | ' '));
    let upper = chrono::Utc::now().year() + 1;

    let mut start = 0;
    while let Some(m) = YEAR_RUN.find_at(text, start) {
        if let Ok(year) = m.as_str().parse::<i32>() {
            if (1970..=upper).contains(&year) {
                return Some(year);
            }
        }
        start = m.start() + 1;
    }
    None
}
