use crate::tagger::EntityTagger;
use regex::Regex;
use std::sync::OnceLock;

const PORT_CUE_WORDS: &str = "port|harbor|harbour|terminal|anchorage|bay";

/// Tokens that disqualify a proper-noun run as a vessel name.
const NON_VESSEL_TERMS: &[&str] = &[
    "tug", "tugs", "pilot", "pilots", "harbor", "harbour", "port", "authority",
];

/// At most this many proper-noun runs are considered for the vessel
/// fallback.
const MAX_VESSEL_RUNS: usize = 6;

fn imo_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bIMO\s*([0-9]{7})\b").unwrap())
}

fn port_name_re() -> &'static Regex {
    // "Port" followed by a capitalized proper-noun phrase: Port Hedland,
    // Port Said. Lowercase continuations are prose, not part of the name.
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bPort\s+[A-Z][\w'’\-]*(?:\s+[A-Z][\w'’\-]*)*").unwrap())
}

fn designator_re() -> &'static Regex {
    // Vessel designator (MV, M/V, MS, M.S., SS, M/T, MT — any case)
    // followed by the capitalized name tokens.
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Name tokens stay on one line; sentence breaks end the name.
        Regex::new(r"\b((?i:MV|M/V|MS|M\.S\.|SS|M/T|MT))[ \t]+([A-Z0-9][\w\-]*(?:[ \t]+[A-Z0-9][\w\-]*)*)")
            .unwrap()
    })
}

/// First 7-digit sequence following the literal token "IMO" anywhere in the
/// body. No fallback.
pub fn detect_imo(body: &str) -> Option<String> {
    imo_re()
        .captures(body)
        .map(|caps| caps.get(1).unwrap().as_str().to_string())
}

/// Port cascade: explicit "Port X" in the title, then in the body, then
/// tagger places gated on port cues, then the first tagger place outright.
pub fn resolve_port(title: &str, body: &str, tagger: &dyn EntityTagger, tagged_text: &str) -> Option<String> {
    detect_port_phrase(title)
        .or_else(|| detect_port_phrase(body))
        .or_else(|| detect_port_from_places(title, body, tagger, tagged_text))
}

fn detect_port_phrase(text: &str) -> Option<String> {
    port_name_re().find(text).map(|m| m.as_str().to_string())
}

fn detect_port_from_places(
    title: &str,
    body: &str,
    tagger: &dyn EntityTagger,
    tagged_text: &str,
) -> Option<String> {
    let places = tagger.places(tagged_text);
    let title_mentions_port = title.to_lowercase().contains("port");
    for place in &places {
        if title_mentions_port || place_has_port_cue(place, body) {
            return Some(place.clone());
        }
    }
    places.into_iter().next()
}

/// A place counts as a port when a port cue word follows its mention in the
/// body.
fn place_has_port_cue(place: &str, body: &str) -> bool {
    let pattern = format!(
        r"(?is)\b{}\b.*\b(?:{})\b",
        regex::escape(place),
        PORT_CUE_WORDS
    );
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(body),
        Err(_) => false,
    }
}

/// Vessel cascade: designator pattern first (title + body), then the first
/// acceptable proper-noun run.
pub fn resolve_vessel(tagger: &dyn EntityTagger, scan_text: &str, tagged_text: &str) -> Option<String> {
    detect_vessel_designator(scan_text).or_else(|| detect_vessel_from_runs(tagger, tagged_text))
}

fn detect_vessel_designator(text: &str) -> Option<String> {
    let caps = designator_re().captures(text)?;
    let designator = caps.get(1).unwrap().as_str();

    // Capitalized sentence-starters ("... MV Example One The next day")
    // are prose, not part of the name.
    let mut tokens: Vec<&str> = caps.get(2).unwrap().as_str().split_whitespace().collect();
    while let Some(last) = tokens.last() {
        if crate::tagger::FUNCTION_WORDS.contains(&last.to_lowercase().as_str()) {
            tokens.pop();
        } else {
            break;
        }
    }
    let name = tokens.join(" ");
    if name.chars().count() < 3 {
        return None;
    }
    Some(format!("{} {}", designator.to_uppercase(), title_case(&name)))
}

fn detect_vessel_from_runs(tagger: &dyn EntityTagger, tagged_text: &str) -> Option<String> {
    tagger
        .proper_noun_runs(tagged_text)
        .into_iter()
        .take(MAX_VESSEL_RUNS)
        .find(|run| acceptable_vessel_candidate(run))
}

/// A run is a vessel candidate when it is non-empty, none of its tokens is a
/// known non-vessel term (case/punctuation-insensitive), and at least one
/// token starts uppercase.
fn acceptable_vessel_candidate(run: &str) -> bool {
    let tokens: Vec<&str> = run.split_whitespace().collect();
    if tokens.is_empty() {
        return false;
    }
    let disqualified = tokens.iter().any(|t| {
        let cleaned = t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
        NON_VESSEL_TERMS.contains(&cleaned.as_str())
    });
    if disqualified {
        return false;
    }
    tokens
        .iter()
        .any(|t| t.chars().next().is_some_and(|c| c.is_uppercase()))
}

/// Python-style title casing: uppercase after any non-letter, lowercase
/// otherwise. "EVER GIVEN" → "Ever Given", "Example One" stays put.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
