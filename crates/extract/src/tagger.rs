use regex::Regex;
use std::sync::OnceLock;

/// Natural-language entity tagging as an injected capability: geographic
/// entities and proper-noun runs are all the resolution cascades need from
/// it. The default is rule-based; a heavier NLP backend can implement the
/// same trait.
pub trait EntityTagger: Send + Sync {
    /// Geographic entities in document order, surface forms as written.
    fn places(&self, text: &str) -> Vec<String>;

    /// Contiguous runs of 2+ proper-noun tokens, in document order.
    fn proper_noun_runs(&self, text: &str) -> Vec<String>;
}

/// Capitalized words that are not proper nouns when they start a sentence.
pub(crate) const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "of", "in", "on", "at", "to", "for", "with", "from",
    "by", "near", "off", "after", "before", "during", "as", "is", "was", "are", "were", "has",
    "have", "had", "it", "its", "this", "that", "these", "those", "their", "his", "her", "our",
    "while", "when", "where", "which", "who", "said", "says",
];

const CALENDAR_WORDS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "monday", "tuesday", "wednesday", "thursday", "friday",
    "saturday", "sunday", "today", "yesterday", "tomorrow",
];

/// Well-known maritime geography, matched when no locative cue introduces
/// the name.
const GAZETTEER: &[&str] = &[
    "Singapore", "Rotterdam", "Shanghai", "Hamburg", "Antwerp", "Gibraltar", "Suez Canal",
    "Panama Canal", "Bosphorus", "Malacca Strait", "Strait of Hormuz", "Gulf of Aden",
    "Red Sea", "Black Sea", "Baltic Sea", "North Sea", "Persian Gulf", "Cape Town",
];

fn locative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(?:near|off|in|at|outside|around|toward|towards|into)\s+((?:[A-Z][\w'’\-]*)(?:\s+[A-Z][\w'’\-]*)*)",
        )
        .unwrap()
    })
}

/// Rule-based tagger: locative-cue phrases plus a small gazetteer for
/// places, capitalization runs for proper nouns. Pure function of its input.
pub struct RuleTagger;

impl RuleTagger {
    fn is_proper_noun(token: &str) -> bool {
        let Some(first) = token.chars().next() else {
            return false;
        };
        if !first.is_uppercase() {
            return false;
        }
        let lower = token.to_lowercase();
        !FUNCTION_WORDS.contains(&lower.as_str()) && !CALENDAR_WORDS.contains(&lower.as_str())
    }

    fn clean(token: &str) -> &str {
        token.trim_matches(|c: char| !c.is_alphanumeric())
    }
}

impl EntityTagger for RuleTagger {
    fn places(&self, text: &str) -> Vec<String> {
        let mut out: Vec<(usize, String)> = Vec::new();
        let mut push = |pos: usize, name: String| {
            if !out.iter().any(|(_, n)| *n == name) {
                out.push((pos, name));
            }
        };

        for caps in locative_re().captures_iter(text) {
            let m = caps.get(1).unwrap();
            let phrase = m.as_str().trim_end_matches(|c: char| !c.is_alphanumeric());
            // A phrase opening with a calendar word ("in March") is a date,
            // not a place.
            let first = phrase.split_whitespace().next().unwrap_or("");
            if CALENDAR_WORDS.contains(&first.to_lowercase().as_str()) {
                continue;
            }
            push(m.start(), phrase.to_string());
        }
        for name in GAZETTEER {
            if let Some(pos) = text.find(name) {
                push(pos, (*name).to_string());
            }
        }

        out.sort_by_key(|(pos, _)| *pos);
        out.into_iter().map(|(_, name)| name).collect()
    }

    fn proper_noun_runs(&self, text: &str) -> Vec<String> {
        let mut runs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for raw in text.split_whitespace() {
            let token = Self::clean(raw);
            if Self::is_proper_noun(token) {
                current.push(token);
                // Sentence punctuation ends the run even mid-capitalization.
                if raw.ends_with(['.', ',', ';', ':', '!', '?']) {
                    flush(&mut current, &mut runs);
                }
            } else {
                flush(&mut current, &mut runs);
            }
        }
        flush(&mut current, &mut runs);
        runs
    }
}

fn flush(current: &mut Vec<&str>, runs: &mut Vec<String>) {
    if current.len() >= 2 {
        runs.push(current.join(" "));
    }
    current.clear();
}
