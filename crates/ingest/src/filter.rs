use regex::Regex;
use std::sync::OnceLock;

/// Hint words that mark a text as maritime-adjacent. Word-bounded and
/// case-insensitive; one hit anywhere is enough.
const MARITIME_HINTS: &str = r"\b(vessel|ship|port|terminal|berth|IMO|container|grounding|piracy|hull|draft|anchorage)\b";

fn hints() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("(?i){MARITIME_HINTS}")).unwrap())
}

/// Cheap relevance pre-filter applied to title + body before a document is
/// ever created. Non-maritime items are dropped silently.
pub fn looks_maritime(text: &str) -> bool {
    hints().is_match(text)
}
