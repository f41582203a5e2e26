use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// SHA-256 of an in-memory byte slice. Scanned images are content-addressed
/// by this digest, which doubles as the duplicate-upload key.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex encoding of a raw digest (64 chars).
pub fn to_hex(hash: &[u8; 32]) -> String {
    hash.iter().fold(String::with_capacity(64), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

/// Storage path for a scanned image inside the attachments tree.
/// Layout: `<base>/<first_2_hex_chars>/<full_hex>.<ext>`
pub fn content_path(attachments_dir: &Path, hash_hex: &str, ext: &str) -> PathBuf {
    attachments_dir
        .join(&hash_hex[..2])
        .join(format!("{hash_hex}.{ext}"))
}
