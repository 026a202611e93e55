//! Label-span segmentation.
//!
//! Offer pages read like "Appels illimités SMS illimités Itinérance 12 Go ...".
//! Instead of every extractor re-scanning the whole text with its own
//! proximity regex, we split the text once into spans: the text between a
//! recognized field label and the next recognized label (or end of text).
//! Scoped extractors then run cheap patterns over their own span.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Semantic field labels recognized on offer pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Calls,
    Sms,
    Roaming,
    Data,
    Speed,
    Tv,
    Countries,
    Contract,
}

// One alternation for all label surface forms. Longer phrases sit before
// their prefixes so the regex engine prefers them.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(pays inclus|destinations incluses|included countries|internet mobile|en voyage|itin[ée]rance|roaming|appels?|calls|sms|donn[ée]es|data|vitesse|d[ée]bit|speed|download|t[ée]l[ée]vision|television|tv|engagement|contract)\b",
    )
    .expect("Invalid label regex pattern")
});

/// Map a matched label token to its semantic label
fn label_for(token: &str) -> Option<Label> {
    let t = token.to_lowercase();
    let label = if t.starts_with("appel") || t == "calls" {
        Label::Calls
    } else if t == "sms" {
        Label::Sms
    } else if t.starts_with("itin") || t == "roaming" || t == "en voyage" {
        Label::Roaming
    } else if t.starts_with("donn") || t == "data" || t == "internet mobile" {
        Label::Data
    } else if t == "vitesse" || t.starts_with("d\u{e9}bit") || t.starts_with("debit") || t == "speed" || t == "download" {
        Label::Speed
    } else if t == "tv" || t.starts_with("t\u{e9}l\u{e9}vision") || t == "television" {
        Label::Tv
    } else if t.starts_with("pays inclus") || t.starts_with("destinations") || t.starts_with("included") {
        Label::Countries
    } else if t == "engagement" || t == "contract" {
        Label::Contract
    } else {
        return None;
    };
    Some(label)
}

/// The label -> span mapping for one page, built in a single pass
#[derive(Debug, Default)]
pub struct LabelSpans {
    spans: HashMap<Label, String>,
}

impl LabelSpans {
    /// Segment cleaned page text into labeled spans.
    /// First occurrence of each label wins; spans run to the next label.
    pub fn segment(text: &str) -> Self {
        let matches: Vec<(usize, usize, Label)> = LABEL_RE
            .find_iter(text)
            .filter_map(|m| label_for(m.as_str()).map(|l| (m.start(), m.end(), l)))
            .collect();

        let mut spans = HashMap::new();
        for (i, &(_, end, label)) in matches.iter().enumerate() {
            let next_start = matches
                .get(i + 1)
                .map(|&(start, _, _)| start)
                .unwrap_or(text.len());
            spans
                .entry(label)
                .or_insert_with(|| text[end..next_start].trim().to_string());
        }
        Self { spans }
    }

    pub fn get(&self, label: Label) -> Option<&str> {
        self.spans.get(&label).map(String::as_str)
    }
}
