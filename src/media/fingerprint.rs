use std::fs::File;
use std::io::{self, ErrorKind};

use crate::domain::models::MediaFingerprint;
use crate::error::FingerprintError;

/// Size of the window read from each end of the file.
pub const CHUNK_SIZE: usize = 65536;

/// A source that knows its length and can be read at arbitrary offsets.
pub trait RandomAccess {
    fn size(&self) -> io::Result<u64>;

    /// Reads into `buf` starting at `offset`, returning the byte count read.
    /// Like `pread`, a short count is not an error by itself.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

impl RandomAccess for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }
}

/// Computes the OpenSubtitles hash: the wrapping sum of the little-endian
/// 64-bit words of the first and last 64 KiB, plus the file size.
///
/// The two windows overlap for files shorter than two chunks; that is part of
/// the scheme and must not be "fixed".
pub fn fingerprint<R: RandomAccess + ?Sized>(
    source: &R,
) -> Result<MediaFingerprint, FingerprintError> {
    let size = source.size()?;
    let chunk = CHUNK_SIZE as u64;
    if size < chunk {
        return Err(FingerprintError::TooSmall {
            size,
            minimum: chunk,
        });
    }

    let mut buf = vec![0u8; CHUNK_SIZE * 2];
    let (head, tail) = buf.split_at_mut(CHUNK_SIZE);
    read_chunk(source, 0, head)?;
    read_chunk(source, size - chunk, tail)?;

    let mut word = [0u8; 8];
    let sum = buf.chunks_exact(8).fold(0u64, |acc, bytes| {
        word.copy_from_slice(bytes);
        acc.wrapping_add(u64::from_le_bytes(word))
    });

    Ok(MediaFingerprint {
        size,
        hash: sum.wrapping_add(size),
    })
}

// Keeps reading until the window is full or the source runs dry.
fn read_chunk<R: RandomAccess + ?Sized>(
    source: &R,
    offset: u64,
    buf: &mut [u8],
) -> Result<(), FingerprintError> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read_at(&mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    if filled != buf.len() {
        return Err(FingerprintError::ShortRead {
            offset,
            expected: buf.len(),
            actual: filled,
        });
    }
    Ok(())
}
