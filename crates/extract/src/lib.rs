pub mod dates;
pub mod detectors;
pub mod schema;
pub mod tagger;

pub use schema::{EntityFields, ExtractionResult};
pub use tagger::{EntityTagger, RuleTagger};

use chrono::NaiveDate;
use tracing::debug;

/// Body prefix handed to the entity tagger. Regex detectors (IMO, explicit
/// "Port X") still see the full body.
const TAGGER_BODY_CHARS: usize = 3000;

/// Resolves vessel, IMO, port, and date from incident text through ordered
/// detector cascades: first detector to succeed wins, a full miss leaves the
/// field absent. Stateless across documents.
pub struct Extractor {
    tagger: Box<dyn EntityTagger>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Box::new(RuleTagger))
    }
}

impl Extractor {
    pub fn new(tagger: Box<dyn EntityTagger>) -> Self {
        Self { tagger }
    }

    /// Resolve all fields. `reference` anchors past-biased date resolution;
    /// the published-timestamp fallback for a fully missed date belongs to
    /// the caller.
    pub fn extract(&self, title: &str, body: &str, reference: NaiveDate) -> EntityFields {
        // Title is never truncated; the body bound only caps tagger work.
        let tagged_text = format!("{title}\n{}", prefix_chars(body, TAGGER_BODY_CHARS));

        let designator_text = format!("{title}\n{body}");

        let imo = detectors::detect_imo(body);
        let port = detectors::resolve_port(title, body, self.tagger.as_ref(), &tagged_text);
        let vessel =
            detectors::resolve_vessel(self.tagger.as_ref(), &designator_text, &tagged_text);
        let date = dates::find_date(body, reference).or_else(|| dates::find_date(title, reference));

        debug!(
            vessel = vessel.as_deref().unwrap_or("-"),
            imo = imo.as_deref().unwrap_or("-"),
            port = port.as_deref().unwrap_or("-"),
            date_found = date.is_some(),
            "entities resolved"
        );
        EntityFields { vessel, imo, port, date }
    }
}

fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
