use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";
const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap())
}

fn dmy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({MONTHS})\.?(?:\s+(\d{{4}}))?\b"
        ))
        .unwrap()
    })
}

fn mdy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\b({MONTHS})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s+(\d{{4}}))?\b"
        ))
        .unwrap()
    })
}

fn relative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"(?i)\b(today|yesterday|{WEEKDAYS})\b")).unwrap())
}

/// Find the first date expression in `text` and resolve it to a calendar
/// date, biased toward the past: yearless and relative expressions resolve
/// to their most recent occurrence on or before `reference`.
///
/// Pure function of (text, reference); `None` when no expression resolves.
pub fn find_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let mut candidates: Vec<(usize, NaiveDate)> = Vec::new();

    for caps in iso_re().captures_iter(text) {
        let (y, m, d) = (num(&caps, 1), num(&caps, 2), num(&caps, 3));
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            candidates.push((caps.get(0).unwrap().start(), date));
        }
    }
    for caps in dmy_re().captures_iter(text) {
        let day = num(&caps, 1);
        let month = month_number(caps.get(2).unwrap().as_str());
        let year = caps.get(3).map(|y| y.as_str().parse::<i32>().unwrap_or(0));
        if let Some(date) = resolve_ymd(year, month, day, reference) {
            candidates.push((caps.get(0).unwrap().start(), date));
        }
    }
    for caps in mdy_re().captures_iter(text) {
        let month = month_number(caps.get(1).unwrap().as_str());
        let day = num(&caps, 2);
        let year = caps.get(3).map(|y| y.as_str().parse::<i32>().unwrap_or(0));
        if let Some(date) = resolve_ymd(year, month, day, reference) {
            candidates.push((caps.get(0).unwrap().start(), date));
        }
    }
    for caps in relative_re().captures_iter(text) {
        let word = caps.get(1).unwrap().as_str().to_lowercase();
        let date = match word.as_str() {
            "today" => reference,
            "yesterday" => reference - Duration::days(1),
            weekday => previous_weekday(weekday, reference),
        };
        candidates.push((caps.get(0).unwrap().start(), date));
    }

    candidates.sort_by_key(|(pos, _)| *pos);
    candidates.into_iter().map(|(_, date)| date).next()
}

fn num(caps: &regex::Captures, group: usize) -> u32 {
    caps.get(group).unwrap().as_str().parse().unwrap_or(0)
}

fn month_number(name: &str) -> u32 {
    match &name.to_lowercase()[..3] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => 0,
    }
}

/// Yearless dates resolve to the most recent occurrence on or before the
/// reference date.
fn resolve_ymd(year: Option<i32>, month: u32, day: u32, reference: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(y) if y > 0 => NaiveDate::from_ymd_opt(y, month, day),
        _ => [reference.year(), reference.year() - 1]
            .into_iter()
            .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
            .find(|d| *d <= reference),
    }
}

/// Most recent strictly-past occurrence of the named weekday.
fn previous_weekday(name: &str, reference: NaiveDate) -> NaiveDate {
    let target = match name {
        "monday" => 0,
        "tuesday" => 1,
        "wednesday" => 2,
        "thursday" => 3,
        "friday" => 4,
        "saturday" => 5,
        _ => 6,
    };
    let current = reference.weekday().num_days_from_monday() as i64;
    let days_back = (current - target + 6).rem_euclid(7) + 1;
    reference - Duration::days(days_back)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn finds_iso_dates() {
        let got = find_date("Incident logged 2024-03-12 at berth 7.", d(2024, 6, 1));
        assert_eq!(got, Some(d(2024, 3, 12)));
    }

    #[test]
    fn finds_day_month_year() {
        let got = find_date("The tanker grounded on 12 March 2024 off the coast.", d(2024, 6, 1));
        assert_eq!(got, Some(d(2024, 3, 12)));
        let got = find_date("refloated on 3rd Apr 2024", d(2024, 6, 1));
        assert_eq!(got, Some(d(2024, 4, 3)));
    }

    #[test]
    fn finds_month_day_year() {
        let got = find_date("On March 12, 2024 the port reopened.", d(2024, 6, 1));
        assert_eq!(got, Some(d(2024, 3, 12)));
    }

    #[test]
    fn yearless_dates_prefer_the_past() {
        // Reference in January: "March 12" must resolve to last year.
        let got = find_date("collision reported March 12 near the fairway", d(2024, 1, 10));
        assert_eq!(got, Some(d(2023, 3, 12)));
        // Reference after the date: same year.
        let got = find_date("collision reported March 12 near the fairway", d(2024, 6, 1));
        assert_eq!(got, Some(d(2024, 3, 12)));
    }

    #[test]
    fn relative_words_resolve_against_reference() {
        assert_eq!(find_date("the fire was reported yesterday", d(2024, 3, 2)), Some(d(2024, 3, 1)));
        assert_eq!(find_date("crews responded today", d(2024, 3, 2)), Some(d(2024, 3, 2)));
    }

    #[test]
    fn weekday_resolves_to_most_recent_past() {
        // 2024-03-06 is a Wednesday; "Monday" means 2024-03-04.
        assert_eq!(
            find_date("the spill was contained on Monday", d(2024, 3, 6)),
            Some(d(2024, 3, 4))
        );
        // Same weekday as the reference goes a full week back.
        assert_eq!(
            find_date("the spill was contained on Wednesday", d(2024, 3, 6)),
            Some(d(2024, 2, 28))
        );
    }

    #[test]
    fn first_expression_in_document_order_wins() {
        let got = find_date("Grounded on 5 March 2024, refloated 2024-03-09.", d(2024, 6, 1));
        assert_eq!(got, Some(d(2024, 3, 5)));
    }

    #[test]
    fn no_expression_means_none() {
        assert_eq!(find_date("no dates appear in this text", d(2024, 6, 1)), None);
        assert_eq!(find_date("", d(2024, 6, 1)), None);
    }

    #[test]
    fn invalid_calendar_dates_are_skipped() {
        assert_eq!(find_date("logged 2024-02-31 erroneously", d(2024, 6, 1)), None);
    }
}
