//! Reading source image bytes.
//!
//! Uses OS-level memory mapping for large files to avoid the kernel copy.

use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// File bytes that may be either owned or memory-mapped
pub enum FileBytes {
    /// Standard heap-allocated bytes
    Vec(Vec<u8>),
    /// Memory-mapped bytes (zero-copy from disk)
    Mmap(Mmap),
}

impl AsRef<[u8]> for FileBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileBytes::Vec(v) => v,
            FileBytes::Mmap(m) => m,
        }
    }
}

impl std::ops::Deref for FileBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

/// Read a whole file, mapping it when it is at least 1MB
pub fn read_file_bytes(path: &Path) -> io::Result<FileBytes> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();

    if len >= MMAP_THRESHOLD {
        // SAFETY: the mapping is only read, and it lives no longer than the
        // decode of this one file. Concurrent truncation by another process
        // is outside what this tool guards against.
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(FileBytes::Mmap(mmap))
    } else {
        Ok(FileBytes::Vec(std::fs::read(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_files_are_read_into_memory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("small.bin");
        std::fs::write(&path, b"abc").unwrap();

        let bytes = read_file_bytes(&path).unwrap();
        assert!(matches!(bytes, FileBytes::Vec(_)));
        assert_eq!(&*bytes, b"abc");
    }

    #[test]
    fn large_files_are_mapped() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("large.bin");
        std::fs::write(&path, vec![7u8; MMAP_THRESHOLD as usize]).unwrap();

        let bytes = read_file_bytes(&path).unwrap();
        assert!(matches!(bytes, FileBytes::Mmap(_)));
        assert_eq!(bytes.len(), MMAP_THRESHOLD as usize);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = read_file_bytes(Path::new("/nonexistent/path/12345.jpg"));
        assert!(result.is_err());
    }
}
