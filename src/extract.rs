//! Field extractors.
//!
//! Each extractor pulls one semantic field out of a rendered offer page and
//! is independent of the others. Every field follows the same priority chain:
//! structural hint (if the crawler supplied one and it parses cleanly), then
//! a scoped pattern over the field's labeled span, then an unscoped pattern
//! over the full text, then the field's default. A miss is never an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::offer::{ExtractedFields, RawPageContent, UNLIMITED};
use crate::segment::{Label, LabelSpans};
use crate::text;

// --- price patterns ---

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:CHF|Fr\.|€)\s*(\d+(?:[.,]\d+)?)|(\d+(?:[.,]\d+)?)\s*(?:CHF|francs?|€|\.\-)")
        .expect("Invalid price regex pattern")
});

static PREVIOUS_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:au lieu de|instead of)\s*(?:CHF\s*|Fr\.\s*|€\s*)?(\d+(?:[.,]\d+)?)")
        .expect("Invalid previous price regex pattern")
});

// A bare percentage is not a discount: pages advertise coverage ("99% de la
// Suisse") and data-share figures too. Require a discount phrase or the
// "-NN%" promo form; otherwise the canonicalizer infers from the two prices.
static DISCOUNT_PERCENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:rabais|remise|discount|promo(?:tion)?|[ée]conomisez)\D{0,30}?(\d{1,3})\s*%|-\s*(\d{1,3})\s*%")
        .expect("Invalid discount percent regex pattern")
});

// --- speed patterns ---

static SPEED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*((?:g|m)(?:bit/?s|bps|b/s|bit)?)\b")
        .expect("Invalid speed regex pattern")
});

// Top-tier fiber is advertised inconsistently; a literal 10 Gbit/s signal
// always means 10000 Mbit/s, whatever else the page says.
static TOP_TIER_SPEED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b10\s*gbit/?s\b|\b10\s*gbps\b|\b10\s*000\s*mbit/?s\b|\b10000\s*mbit/?s\b")
        .expect("Invalid top tier speed regex pattern")
});

// --- tv patterns ---

static TV_CHANNELS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)280\s*cha[îi]nes|280\s*channels").expect("Invalid tv channels regex pattern")
});

static TV_GENERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\btv\b|replay|t[ée]l[ée]vision|television").expect("Invalid tv regex pattern")
});

// --- allowance patterns ---

static CALLS_UNLIMITED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)appels?[^.;]{0,40}illimit|unlimited\s+calls")
        .expect("Invalid calls regex pattern")
});

static SMS_UNLIMITED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsms\b[^.;]{0,40}illimit|unlimited\s+sms")
        .expect("Invalid sms regex pattern")
});

static ALLOWANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(h\b|heures?\b|min(?:utes)?\b)")
        .expect("Invalid allowance regex pattern")
});

static ROAMING_DATA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:go|gb)\b").expect("Invalid roaming data regex pattern")
});

static ROAMING_MINUTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*min").expect("Invalid roaming minutes regex pattern"));

// --- contract patterns ---

static CONTRACT_TERM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)engagement\s*(?:de\s*|:\s*)?(\d+)\s*mois|(\d+)\s*mois\s*d.engagement")
        .expect("Invalid contract term regex pattern")
});

static MONTHS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*mois").expect("Invalid months regex pattern"));

static PERMANENT_DISCOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)remise\s+permanente|rabais\s+permanent|permanent\s+discount")
        .expect("Invalid permanent discount regex pattern")
});

/// Ordered (pattern, canonical result) table for included-country phrases.
/// First match wins; variant phrasings are extra rows, not extra code paths.
static COUNTRY_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // Case-sensitive on purpose: the codes are always uppercase on source
        // pages, and lowercase prose runs like "de, it" must not match.
        (
            r"\b(?:DE|FR|IT|AT|LI)(?:\s*,\s*(?:DE|FR|IT|AT|LI))+\b",
            "Pays voisins (DE, FR, IT, AT, LI)",
        ),
        (
            r"(?i)europe\s*,\s*usa\s*,\s*canada\s*,\s*turquie",
            "Europe, USA, Canada, Turquie",
        ),
        (r"(?i)top\s*10\s*destinations", "Top 10 destinations"),
        (r"(?i)pays\s+voisins", "Pays voisins"),
    ]
    .into_iter()
    .map(|(pattern, result)| {
        (
            Regex::new(pattern).expect("Invalid country regex pattern"),
            result,
        )
    })
    .collect()
});

// Home/internet signals, checked in the URL and in page text. Anything not
// matching these is a mobile plan.
const HOME_URL_TOKENS: &[&str] = &["internet", "home", "fibre", "fiber", "cable", "box", "wlan"];
const HOME_TEXT_TOKENS: &[&str] = &[
    "fibre",
    "fiber",
    "câble",
    "internet à domicile",
    "internet à la maison",
    "home internet",
    "internet box",
];

/// Run every extractor over one page and collect the best-effort field bag
pub fn extract_fields(page: &RawPageContent) -> ExtractedFields {
    let cleaned = text::clean_text(&page.page_text);
    let spans = LabelSpans::segment(&cleaned);

    ExtractedFields {
        title: extract_title(page, &cleaned),
        current_price: extract_price(page, &cleaned),
        previous_price: extract_previous_price(page, &cleaned),
        discount_percent: extract_discount_percent(&cleaned),
        has_tv: extract_tv(&cleaned),
        speed_mbps: extract_speed(&cleaned, &spans),
        calls_allowance: extract_calls(&cleaned, &spans),
        sms_allowance: extract_sms(&cleaned, &spans),
        roaming_data: extract_roaming_data(&spans),
        roaming_minutes: extract_roaming_minutes(&spans),
        included_countries: extract_countries(&cleaned),
        contract_term: extract_contract_term(&cleaned, &spans),
        permanent_discount: PERMANENT_DISCOUNT_RE.is_match(&cleaned),
        home_offer_hint: url_has_home_signals(&page.url),
    }
}

/// True when the URL carries a home/internet offer signal
pub fn url_has_home_signals(url: &str) -> bool {
    let lower = url.to_lowercase();
    HOME_URL_TOKENS.iter().any(|token| lower.contains(token))
}

/// True when the page text carries a home/internet offer signal
pub fn text_has_home_signals(cleaned_text: &str) -> bool {
    let lower = cleaned_text.to_lowercase();
    HOME_TEXT_TOKENS.iter().any(|token| lower.contains(token))
}

fn extract_title(page: &RawPageContent, cleaned: &str) -> String {
    if let Some(title) = &page.hints.title {
        let title = text::clean_text(title);
        if !title.is_empty() {
            return title;
        }
    }
    // No title element: take the leading words of the page, stopping before
    // the first price token.
    let head = match PRICE_RE.find(cleaned) {
        Some(m) => cleaned[..m.start()].trim(),
        None => cleaned,
    };
    head.split_whitespace()
        .take(8)
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_price(page: &RawPageContent, cleaned: &str) -> Option<f64> {
    if let Some(hint) = &page.hints.price_text {
        if let Some(price) = text::parse_loose_number(hint) {
            return Some(price);
        }
    }
    PRICE_RE.captures(cleaned).and_then(|caps| {
        let raw = caps.get(1).or_else(|| caps.get(2))?;
        raw.as_str().replace(',', ".").parse::<f64>().ok()
    })
}

fn extract_previous_price(page: &RawPageContent, cleaned: &str) -> Option<f64> {
    if let Some(hint) = &page.hints.previous_price_text {
        if let Some(price) = text::parse_loose_number(hint) {
            return Some(price);
        }
    }
    PREVIOUS_PRICE_RE
        .captures(cleaned)
        .and_then(|caps| caps[1].replace(',', ".").parse::<f64>().ok())
}

fn extract_discount_percent(cleaned: &str) -> Option<u32> {
    for caps in DISCOUNT_PERCENT_RE.captures_iter(cleaned) {
        if let Some(token) = caps.get(1).or_else(|| caps.get(2)) {
            if let Ok(value) = token.as_str().parse::<u32>() {
                if value <= 100 {
                    return Some(value);
                }
            }
        }
    }
    None
}

fn extract_speed(cleaned: &str, spans: &LabelSpans) -> Option<u32> {
    if TOP_TIER_SPEED_RE.is_match(cleaned) {
        return Some(10000);
    }
    let scoped = spans
        .get(Label::Speed)
        .or_else(|| spans.get(Label::Data))
        .and_then(|span| first_speed(span));
    scoped.or_else(|| first_speed(cleaned))
}

fn first_speed(s: &str) -> Option<u32> {
    SPEED_RE
        .captures(s)
        .and_then(|caps| text::convert_speed_to_mbps(&caps[1], &caps[2]))
}

fn extract_tv(cleaned: &str) -> bool {
    TV_CHANNELS_RE.is_match(cleaned) || TV_GENERIC_RE.is_match(cleaned)
}

/// Unlimited-aware allowance capture over a labeled span: unlimited signal
/// wins, then a numeric capture, then empty.
fn allowance_from_span(span: &str, numeric: &Regex) -> String {
    if text::is_unlimited(span) {
        return UNLIMITED.to_string();
    }
    match numeric.captures(span) {
        Some(caps) => caps[0].trim().to_string(),
        None => String::new(),
    }
}

fn extract_calls(cleaned: &str, spans: &LabelSpans) -> String {
    if let Some(span) = spans.get(Label::Calls) {
        let value = allowance_from_span(span, &ALLOWANCE_RE);
        if !value.is_empty() {
            return value;
        }
    }
    if CALLS_UNLIMITED_RE.is_match(cleaned) {
        return UNLIMITED.to_string();
    }
    String::new()
}

fn extract_sms(cleaned: &str, spans: &LabelSpans) -> String {
    if let Some(span) = spans.get(Label::Sms) {
        let value = allowance_from_span(span, &ALLOWANCE_RE);
        if !value.is_empty() {
            return value;
        }
    }
    if SMS_UNLIMITED_RE.is_match(cleaned) {
        return UNLIMITED.to_string();
    }
    String::new()
}

fn extract_roaming_data(spans: &LabelSpans) -> String {
    let Some(span) = spans.get(Label::Roaming) else {
        return String::new();
    };
    if text::is_unlimited(span) {
        return UNLIMITED.to_string();
    }
    match ROAMING_DATA_RE.captures(span) {
        Some(caps) => caps[1].replace(',', "."),
        None => String::new(),
    }
}

fn extract_roaming_minutes(spans: &LabelSpans) -> String {
    let Some(span) = spans.get(Label::Roaming) else {
        return String::new();
    };
    if text::is_unlimited(span) {
        return UNLIMITED.to_string();
    }
    match ROAMING_MINUTES_RE.captures(span) {
        Some(caps) => caps[1].to_string(),
        None => String::new(),
    }
}

fn extract_countries(cleaned: &str) -> String {
    for (pattern, result) in COUNTRY_PATTERNS.iter() {
        if pattern.is_match(cleaned) {
            return result.to_string();
        }
    }
    String::new()
}

fn extract_contract_term(cleaned: &str, spans: &LabelSpans) -> String {
    if let Some(span) = spans.get(Label::Contract) {
        if let Some(caps) = MONTHS_RE.captures(span) {
            return format!("{} mois", &caps[1]);
        }
    }
    if let Some(caps) = CONTRACT_TERM_RE.captures(cleaned) {
        let months = caps.get(1).or_else(|| caps.get(2));
        if let Some(months) = months {
            return format!("{} mois", months.as_str());
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::StructuralHints;

    fn page(url: &str, body: &str) -> RawPageContent {
        RawPageContent::new(url, body)
    }

    #[test]
    fn test_price_prefixed_and_suffixed() {
        let fields = extract_fields(&page("https://x.ch/m", "Super offre CHF 29,95 par mois"));
        assert_eq!(fields.current_price, Some(29.95));

        let fields = extract_fields(&page("https://x.ch/m", "Super offre 39.90.- par mois"));
        assert_eq!(fields.current_price, Some(39.90));
    }

    #[test]
    fn test_price_hint_wins() {
        let mut p = page("https://x.ch/m", "texte sans prix CHF 99.00");
        p.hints = StructuralHints {
            price_text: Some("CHF 19.95".into()),
            ..Default::default()
        };
        let fields = extract_fields(&p);
        assert_eq!(fields.current_price, Some(19.95));
    }

    #[test]
    fn test_previous_price_requires_phrase() {
        let fields = extract_fields(&page(
            "https://x.ch/m",
            "CHF 25.00 au lieu de CHF 50.00 par mois",
        ));
        assert_eq!(fields.current_price, Some(25.0));
        assert_eq!(fields.previous_price, Some(50.0));

        let fields = extract_fields(&page("https://x.ch/m", "CHF 25.00 et CHF 50.00"));
        assert_eq!(fields.previous_price, None);
    }

    #[test]
    fn test_discount_requires_discount_context() {
        let fields = extract_fields(&page(
            "https://x.ch/m",
            "Couverture 99% de la Suisse. Promo CHF 25.00 au lieu de CHF 50.00",
        ));
        assert_eq!(fields.discount_percent, None);

        let fields = extract_fields(&page("https://x.ch/m", "Rabais de 30% pendant 12 mois"));
        assert_eq!(fields.discount_percent, Some(30));

        let fields = extract_fields(&page("https://x.ch/m", "-50% sur votre abonnement"));
        assert_eq!(fields.discount_percent, Some(50));
    }

    #[test]
    fn test_speed_gigabit_conversion() {
        let fields = extract_fields(&page("https://x.ch/internet", "Débit 2 Gbit/s inclus"));
        assert_eq!(fields.speed_mbps, Some(2000));
    }

    #[test]
    fn test_speed_top_tier_special_case() {
        let fields = extract_fields(&page(
            "https://x.ch/internet",
            "Jusqu'à 300 Mbit/s, boost 10 Gbit/s disponible",
        ));
        assert_eq!(fields.speed_mbps, Some(10000));
    }

    #[test]
    fn test_speed_ignores_months() {
        let fields = extract_fields(&page("https://x.ch/m", "Engagement 12 mois, sans débit"));
        assert_eq!(fields.speed_mbps, None);
    }

    #[test]
    fn test_calls_and_sms_unlimited() {
        let fields = extract_fields(&page(
            "https://x.ch/m",
            "Appels illimités en Suisse SMS illimités",
        ));
        assert_eq!(fields.calls_allowance, UNLIMITED);
        assert_eq!(fields.sms_allowance, UNLIMITED);
    }

    #[test]
    fn test_calls_numeric_allowance() {
        let fields = extract_fields(&page("https://x.ch/m", "Appels 60 min par mois SMS illimités"));
        assert_eq!(fields.calls_allowance, "60 min");
        assert_eq!(fields.sms_allowance, UNLIMITED);
    }

    #[test]
    fn test_roaming_scoped() {
        let fields = extract_fields(&page(
            "https://x.ch/m",
            "Appels illimités Itinérance 12 Go et 120 min en Europe",
        ));
        assert_eq!(fields.roaming_data, "12");
        assert_eq!(fields.roaming_minutes, "120");
    }

    #[test]
    fn test_roaming_unlimited() {
        let fields = extract_fields(&page("https://x.ch/m", "Itinérance illimitée en Europe"));
        assert_eq!(fields.roaming_data, UNLIMITED);
        assert_eq!(fields.roaming_minutes, UNLIMITED);
    }

    #[test]
    fn test_countries_first_match_wins() {
        let fields = extract_fields(&page(
            "https://x.ch/m",
            "Roaming DE, FR, IT, AT inclus et top 10 destinations",
        ));
        assert_eq!(fields.included_countries, "Pays voisins (DE, FR, IT, AT, LI)");
    }

    #[test]
    fn test_lowercase_prose_is_not_a_country_code_list() {
        let fields = extract_fields(&page("https://x.ch/m", "le prix de, it est correct"));
        assert_eq!(fields.included_countries, "");
    }

    #[test]
    fn test_countries_no_match_is_empty() {
        let fields = extract_fields(&page("https://x.ch/m", "Offre simple sans roaming"));
        assert_eq!(fields.included_countries, "");
    }

    #[test]
    fn test_tv_signals() {
        assert!(extract_fields(&page("https://x.ch/h", "Inclus: 280 chaînes TV")).has_tv);
        assert!(extract_fields(&page("https://x.ch/h", "avec replay 7 jours")).has_tv);
        assert!(!extract_fields(&page("https://x.ch/m", "offre mobile simple")).has_tv);
    }

    #[test]
    fn test_contract_term() {
        let fields = extract_fields(&page("https://x.ch/m", "Engagement de 24 mois"));
        assert_eq!(fields.contract_term, "24 mois");

        let fields = extract_fields(&page("https://x.ch/m", "sans engagement aucun"));
        assert_eq!(fields.contract_term, "");
    }

    #[test]
    fn test_home_url_hint() {
        let fields = extract_fields(&page("https://x.ch/fr/internet/fiber-box", "texte"));
        assert!(fields.home_offer_hint);
        let fields = extract_fields(&page("https://x.ch/fr/mobile/flat", "texte"));
        assert!(!fields.home_offer_hint);
    }

    #[test]
    fn test_empty_page_all_defaults() {
        let fields = extract_fields(&page("https://x.ch/m", ""));
        assert_eq!(fields.current_price, None);
        assert_eq!(fields.calls_allowance, "");
        assert_eq!(fields.included_countries, "");
        assert!(!fields.has_tv);
    }
}
