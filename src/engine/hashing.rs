//! Content hashing for the dedup store.

use anyhow::Result;
use md5::Md5;
use memmap2::Mmap;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

use crate::types::HashAlgo;
use crate::utils::config::HashingConsts;

fn hash_with<D: Digest>(file: &File, size: u64) -> Result<String> {
    let mut hasher = D::new();
    if size > HashingConsts::HASH_MMAP_THRESHOLD {
        // Memory-mapped I/O for large files
        let mmap = unsafe { Mmap::map(file)? };
        hasher.update(&mmap);
    } else {
        use std::io::Read;
        let mut reader =
            std::io::BufReader::with_capacity(HashingConsts::HASH_READ_CHUNK_SIZE, file);
        let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }
    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Hash a file with the configured algorithm, returning the lowercase hex
/// digest. Uses memory-mapped I/O above the size threshold, chunked reading
/// otherwise.
pub fn hash_file(path: &Path, algo: HashAlgo) -> Result<String> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    match algo {
        HashAlgo::Md5 => hash_with::<Md5>(&file, size),
        HashAlgo::Sha1 => hash_with::<Sha1>(&file, size),
        HashAlgo::Sha256 => hash_with::<Sha256>(&file, size),
    }
}

/// Hex MD5 of a string; the search index bridge uses this for document ids.
pub fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}
