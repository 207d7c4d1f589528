//! Bounds-checked file cursor shared by the MP4 and RIFF scanners.
//!
//! Both container formats are record-oriented: a header declares a payload
//! length that must be validated against the bytes actually remaining
//! before it is trusted. Centralizing the offset arithmetic here keeps the
//! two scanners from desynchronizing on malformed input.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

pub(super) struct FileCursor {
    file: File,
    len: u64,
    pos: u64,
}

impl FileCursor {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len, pos: 0 })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        Ok(())
    }

    /// Advance without reading. Fails if the skip would pass end of file.
    pub fn skip(&mut self, n: u64) -> io::Result<()> {
        let target = self
            .pos
            .checked_add(n)
            .filter(|&t| t <= self.len)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "skip past end of file"))?;
        self.seek_to(target)
    }

    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.file.read_exact(&mut buf)?;
        self.pos += N as u64;
        Ok(buf)
    }

    /// Read exactly `n` bytes; `n` must already be bounds-checked.
    pub fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.file.read_exact(&mut buf)?;
        self.pos += n as u64;
        Ok(buf)
    }

    pub fn read_u32_be(&mut self) -> io::Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64_be(&mut self) -> io::Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cursor_over(bytes: &[u8]) -> (tempfile::TempDir, FileCursor) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        let mut f = File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        drop(f);
        (dir, FileCursor::open(&path).unwrap())
    }

    #[test]
    fn reads_big_and_little_endian() {
        let (_dir, mut cur) = cursor_over(&[0x00, 0x00, 0x00, 0x2A, 0x2A, 0x00, 0x00, 0x00]);
        assert_eq!(cur.read_u32_be().unwrap(), 42);
        assert_eq!(cur.read_u32_le().unwrap(), 42);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn skip_past_end_is_rejected() {
        let (_dir, mut cur) = cursor_over(&[1, 2, 3, 4]);
        assert!(cur.skip(3).is_ok());
        assert!(cur.skip(2).is_err());
    }

    #[test]
    fn position_tracks_reads_and_seeks() {
        let (_dir, mut cur) = cursor_over(&[0; 16]);
        cur.read_array::<4>().unwrap();
        assert_eq!(cur.position(), 4);
        cur.seek_to(10).unwrap();
        assert_eq!(cur.position(), 10);
        assert_eq!(cur.remaining(), 6);
    }
}
