use sha2::Digest;

/// Length of a cache key: a hex-encoded SHA-256 digest.
pub const KEY_LEN: usize = 64;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// True for strings shaped like a key produced by [`sha256_hex`].
pub fn is_cache_key(key: &str) -> bool {
    key.len() == KEY_LEN && key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
