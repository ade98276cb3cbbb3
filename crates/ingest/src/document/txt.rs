/// Decode plain-text bytes. Tries UTF-8 first and falls back to Latin-1,
/// where every byte maps to the code point of the same value, so decoding
/// never fails.
pub fn extract_txt(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("TXT is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}
