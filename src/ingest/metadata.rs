use sha2::{Sha256, Digest};

/// SHA256 hex digest of the given bytes
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Stable document id: SHA256 of the normalized document path
pub fn doc_id_for_path(doc_path: &str) -> String {
    sha256_hex(doc_path.replace('\\', "/").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_doc_id_ignores_separator_style() {
        assert_eq!(doc_id_for_path("data\\bilgi.txt"), doc_id_for_path("data/bilgi.txt"));
        assert_ne!(doc_id_for_path("a.txt"), doc_id_for_path("b.txt"));
    }
}
