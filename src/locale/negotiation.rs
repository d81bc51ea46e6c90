//! `Accept-Language` parsing and weighted negotiation.
//!
//! # Algorithm
//! - Weights are parsed to thousandths (`q=0.9` → 900); entries with a
//!   malformed weight are dropped, `q=0` entries are never selected
//! - Preferences are tried by weight, ties keep declaration order
//! - Per preference: exact tag, then truncated tag (`en-GB` → `en`), then
//!   the first supported locale sharing the primary language subtag
//! - `*` selects nothing; the caller falls back to its default

use serde::Serialize;

use crate::locale::set::LocaleSet;

const MAX_WEIGHT: u16 = 1000;

/// One entry of an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguagePreference {
    pub tag: String,
    /// Quality in thousandths, 0..=1000.
    pub weight: u16,
}

impl LanguagePreference {
    pub fn new(tag: impl Into<String>, weight: u16) -> Self {
        Self {
            tag: tag.into(),
            weight: weight.min(MAX_WEIGHT),
        }
    }
}

/// Parse an `Accept-Language` header, keeping declaration order.
pub fn parse_accept_language(header: &str) -> Vec<LanguagePreference> {
    header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }

            let mut weight = MAX_WEIGHT;
            for param in parts {
                let Some((key, value)) = param.split_once('=') else {
                    continue;
                };
                if key.trim().eq_ignore_ascii_case("q") {
                    weight = parse_weight(value.trim())?;
                }
            }

            Some(LanguagePreference::new(tag.replace('_', "-"), weight))
        })
        .collect()
}

/// Parse a quality value. Digits beyond the third decimal are ignored.
fn parse_weight(value: &str) -> Option<u16> {
    let (int, frac) = value.split_once('.').unwrap_or((value, ""));
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut thousandths: u16 = 0;
    for (i, digit) in frac.chars().take(3).enumerate() {
        let digit = digit.to_digit(10)? as u16;
        thousandths += digit * 10u16.pow(2 - i as u32);
    }

    match int {
        "0" => Some(thousandths),
        "1" if thousandths == 0 => Some(MAX_WEIGHT),
        _ => None,
    }
}

/// Primary language subtag (`en` for `en-US`).
pub fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Pick the best supported locale for the given preferences.
pub fn negotiate<'a>(preferences: &[LanguagePreference], supported: &'a LocaleSet) -> Option<&'a str> {
    let mut ranked: Vec<&LanguagePreference> = preferences
        .iter()
        .filter(|p| p.weight > 0 && p.tag != "*")
        .collect();
    // Stable: equal weights keep declaration order.
    ranked.sort_by(|a, b| b.weight.cmp(&a.weight));

    ranked.into_iter().find_map(|pref| lookup(&pref.tag, supported))
}

fn lookup<'a>(tag: &str, supported: &'a LocaleSet) -> Option<&'a str> {
    let mut candidate = tag;
    loop {
        if let Some(found) = supported.find(candidate) {
            return Some(found);
        }
        match candidate.rfind('-') {
            Some(idx) => candidate = &candidate[..idx],
            None => break,
        }
    }

    let primary = primary_subtag(tag);
    supported
        .iter()
        .find(|locale| primary_subtag(locale).eq_ignore_ascii_case(primary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weights_and_order() {
        let prefs = parse_accept_language("de;q=0.9, en;q=0.5, fr");
        assert_eq!(
            prefs,
            vec![
                LanguagePreference::new("de", 900),
                LanguagePreference::new("en", 500),
                LanguagePreference::new("fr", 1000),
            ]
        );
    }

    #[test]
    fn test_parse_drops_malformed_entries() {
        let prefs = parse_accept_language("de;q=abc, ,en;q=1.5, fr;q=0.1234, it;q=1.000");
        assert_eq!(
            prefs,
            vec![
                LanguagePreference::new("fr", 123),
                LanguagePreference::new("it", 1000),
            ]
        );
    }

    #[test]
    fn test_highest_weight_wins() {
        let supported = LocaleSet::new(["en", "de"]);
        let prefs = parse_accept_language("en;q=0.5, de;q=0.9");
        assert_eq!(negotiate(&prefs, &supported), Some("de"));
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let supported = LocaleSet::new(["en", "de"]);
        let prefs = parse_accept_language("de;q=0.8, en;q=0.8");
        assert_eq!(negotiate(&prefs, &supported), Some("de"));
    }

    #[test]
    fn test_region_truncates_to_language() {
        let supported = LocaleSet::new(["en", "fr"]);
        let prefs = parse_accept_language("en-GB");
        assert_eq!(negotiate(&prefs, &supported), Some("en"));
    }

    #[test]
    fn test_language_matches_regional_locale() {
        let supported = LocaleSet::new(["fr-CA", "en-US", "en-GB"]);
        let prefs = parse_accept_language("en");
        assert_eq!(negotiate(&prefs, &supported), Some("en-US"));
    }

    #[test]
    fn test_exact_match_beats_language_match() {
        let supported = LocaleSet::new(["en-US", "en-GB"]);
        let prefs = parse_accept_language("en-GB");
        assert_eq!(negotiate(&prefs, &supported), Some("en-GB"));
    }

    #[test]
    fn test_unrelated_languages_do_not_match() {
        let supported = LocaleSet::new(["en", "de"]);
        let prefs = parse_accept_language("ja, *;q=0.1");
        assert_eq!(negotiate(&prefs, &supported), None);
    }

    #[test]
    fn test_zero_weight_is_not_acceptable() {
        let supported = LocaleSet::new(["en", "de"]);
        let prefs = parse_accept_language("de;q=0, en;q=0.2");
        assert_eq!(negotiate(&prefs, &supported), Some("en"));
    }

    #[test]
    fn test_falls_through_unsupported_preferences() {
        let supported = LocaleSet::new(["en", "de"]);
        let prefs = parse_accept_language("ja, zh;q=0.9, de;q=0.3");
        assert_eq!(negotiate(&prefs, &supported), Some("de"));
    }
}
