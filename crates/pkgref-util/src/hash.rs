/// Compute the BLAKE3 hash of a byte slice, returning the hex-encoded digest.
#[must_use]
pub fn blake3_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Compute the BLAKE3 hash of document text.
///
/// Used as the content stamp for parsed documents: equal text always
/// produces an equal stamp.
#[must_use]
pub fn content_hash(text: &str) -> String {
    blake3_bytes(text.as_bytes())
}
