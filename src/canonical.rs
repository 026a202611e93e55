//! Row canonicalizer: turns the best-effort field bag into the fixed output
//! schema, normalizing unlimited variants, inferring the offer category from
//! content signals and filling documented defaults.

use crate::extract;
use crate::offer::{
    CanonicalOffer, ExtractedFields, OfferCategory, RawPageContent, PERMANENT_DISCOUNT_NOTE,
    TV_TIER, UNLIMITED,
};
use crate::text;

/// Default contract term when no explicit term was detected
const NO_COMMITMENT: &str = "Sans engagement";

/// Canonical marker for "no roaming partner countries". Distinct from the
/// empty string, which elsewhere means "unknown".
const NO_COUNTRIES: &str = "Aucun";

/// Build the canonical row for one offer.
///
/// Total: any field bag, including a fully empty one, yields a valid row.
/// The CO2 estimate and reference are filled in by later pipeline stages.
pub fn canonicalize(
    operator: &str,
    fields: &ExtractedFields,
    page: &RawPageContent,
) -> CanonicalOffer {
    let offer_category = infer_category(fields, page);

    let included_countries = if fields.included_countries.is_empty() {
        NO_COUNTRIES.to_string()
    } else {
        fields.included_countries.clone()
    };

    let contract_term = if fields.contract_term.is_empty() {
        NO_COMMITMENT.to_string()
    } else {
        fields.contract_term.clone()
    };

    let expiration_note = if fields.permanent_discount {
        PERMANENT_DISCOUNT_NOTE.to_string()
    } else {
        String::new()
    };

    CanonicalOffer {
        reference: String::new(),
        operator: operator.to_string(),
        offer_name: text::clean_text(&fields.title),
        price_chf: fields.current_price,
        previous_price_chf: fields.previous_price,
        discount_percent: resolve_discount(fields),
        tv_tier: if fields.has_tv { TV_TIER.to_string() } else { "Non".to_string() },
        speed_mbps: fields.speed_mbps,
        sms_allowance: normalize_quantity(&fields.sms_allowance),
        calls_allowance: normalize_quantity(&fields.calls_allowance),
        roaming_data_go: normalize_quantity(&fields.roaming_data),
        roaming_minutes: normalize_quantity(&fields.roaming_minutes),
        included_countries,
        offer_category,
        expiration_note,
        co2_estimate_kg_year: None,
        contract_term,
    }
}

/// Normalize an allowance value: unlimited variants collapse to the single
/// sentinel, "-" and empty collapse to empty (unknown, not zero).
fn normalize_quantity(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value == "-" {
        return String::new();
    }
    if text::is_unlimited(value) {
        return UNLIMITED.to_string();
    }
    value.to_string()
}

/// Category is recomputed from content signals every time. The crawler's URL
/// hint alone is not trusted: redirected or reused templates carry stale URLs.
fn infer_category(fields: &ExtractedFields, page: &RawPageContent) -> OfferCategory {
    let cleaned = text::clean_text(&page.page_text);
    let home = fields.home_offer_hint || extract::text_has_home_signals(&cleaned);
    if home {
        if fields.has_tv {
            OfferCategory::HomeWithTV
        } else {
            OfferCategory::HomeNoTV
        }
    } else {
        OfferCategory::Mobile
    }
}

/// Explicit percentage token wins; otherwise infer from the two prices.
fn resolve_discount(fields: &ExtractedFields) -> Option<u32> {
    if let Some(percent) = fields.discount_percent {
        return Some(percent);
    }
    match (fields.current_price, fields.previous_price) {
        (Some(current), Some(previous)) if previous > 0.0 => {
            let percent = ((1.0 - current / previous) * 100.0).round();
            if (0.0..=100.0).contains(&percent) {
                Some(percent as u32)
            } else {
                None
            }
        }
        _ => None,
    }
}
