pub mod document;
pub mod fetch;
pub mod filter;
pub mod normalize;
pub mod sources;

pub use document::{CatalogEntry, Document};
pub use fetch::FileFetcher;
pub use filter::looks_maritime;
pub use normalize::Normalizer;
pub use sources::{LanguageDetector, PageTextExtractor, RawItem, Source, SourceFetcher, SourceKind};

use sha2::{Digest, Sha256};

const TITLE_PREFIX_CHARS: usize = 200;
const CONTENT_PREFIX_CHARS: usize = 1000;

/// Content-addressed document ID: SHA-256 over (title prefix, full url,
/// content prefix), tagged with the algorithm name.
///
/// Identical prefixes always yield the identical id, which is the dedup key
/// for the whole pipeline. Hashing is exact-prefix only: no whitespace or
/// unicode normalization, so a republication that differs by a single byte
/// inside the prefixes gets a fresh id.
pub fn compute_doc_id(title: &str, url: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix_chars(title, TITLE_PREFIX_CHARS).as_bytes());
    hasher.update(url.as_bytes());
    hasher.update(prefix_chars(content, CONTENT_PREFIX_CHARS).as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// First `n` characters (not bytes), so multi-byte input never splits a
/// codepoint.
pub(crate) fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_is_deterministic() {
        let a = compute_doc_id("Grounding off Singapore", "https://example.com/a", "body text");
        let b = compute_doc_id("Grounding off Singapore", "https://example.com/a", "body text");
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
    }

    #[test]
    fn doc_id_is_deterministic_for_non_ascii() {
        let title = "Škoda-chartered bulker aground — 多言語";
        let a = compute_doc_id(title, "https://example.com/ü", "Παράκτια ύδατα");
        let b = compute_doc_id(title, "https://example.com/ü", "Παράκτια ύδατα");
        assert_eq!(a, b);
    }

    #[test]
    fn doc_id_ignores_content_beyond_prefix() {
        let base = "x".repeat(1000);
        let a = compute_doc_id("t", "u", &base);
        let b = compute_doc_id("t", "u", &format!("{base}trailing difference"));
        assert_eq!(a, b);
    }

    #[test]
    fn doc_id_sees_content_inside_prefix() {
        let a = compute_doc_id("t", "u", "body one");
        let b = compute_doc_id("t", "u", "body two");
        assert_ne!(a, b);
    }

    #[test]
    fn prefix_chars_counts_codepoints() {
        assert_eq!(prefix_chars("héllo", 2), "hé");
        assert_eq!(prefix_chars("ab", 10), "ab");
    }
}
