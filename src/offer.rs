//! Data model for the extraction pipeline.
//!
//! `RawPageContent` is what the crawling collaborator hands us per page,
//! `ExtractedFields` is the intermediate best-effort bag produced by the
//! extractors, and `CanonicalOffer` is the durable fixed-schema row.

use serde::{Deserialize, Serialize};

/// The single normalized representation for any "no cap" quantity
pub const UNLIMITED: &str = "Illimité";

/// Marker written to the expiration note when a discount is permanent
pub const PERMANENT_DISCOUNT_NOTE: &str = "Remise permanente";

/// TV tier written when any TV signal is present on the page
pub const TV_TIER: &str = "280 Chaines";

/// Optional structural hints supplied by the crawler (title element text,
/// explicit price element text). Hints may be stale or missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuralHints {
    pub title: Option<String>,
    pub price_text: Option<String>,
    pub previous_price_text: Option<String>,
}

/// One rendered offer page, as delivered by the crawling collaborator.
/// Read-only input; lives only for the duration of one extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPageContent {
    pub url: String,
    pub page_text: String,
    #[serde(default, rename = "structuralHints")]
    pub hints: StructuralHints,
}

impl RawPageContent {
    pub fn new(url: &str, page_text: &str) -> Self {
        Self {
            url: url.to_string(),
            page_text: page_text.to_string(),
            hints: StructuralHints::default(),
        }
    }
}

/// Best-effort field bag produced by the extractors, one per page.
/// Every value may be absent/empty; the canonicalizer fills defaults.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    pub title: String,
    pub current_price: Option<f64>,
    pub previous_price: Option<f64>,
    pub discount_percent: Option<u32>,
    pub has_tv: bool,
    pub speed_mbps: Option<u32>,
    pub calls_allowance: String,
    pub sms_allowance: String,
    pub roaming_data: String,
    pub roaming_minutes: String,
    pub included_countries: String,
    pub contract_term: String,
    pub permanent_discount: bool,
    /// Home/internet signal seen in the URL. Advisory only: the canonicalizer
    /// re-checks page content before assigning a category.
    pub home_offer_hint: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferCategory {
    Mobile,
    HomeNoTV,
    HomeWithTV,
}

impl OfferCategory {
    /// Short code used inside references
    pub fn code(&self) -> &'static str {
        match self {
            OfferCategory::Mobile => "T1",
            OfferCategory::HomeNoTV => "T2",
            OfferCategory::HomeWithTV => "T3",
        }
    }

    /// Display name used in the tabular output
    pub fn label(&self) -> &'static str {
        match self {
            OfferCategory::Mobile => "Mobile",
            OfferCategory::HomeNoTV => "HomeNoTV",
            OfferCategory::HomeWithTV => "HomeWithTV",
        }
    }
}

/// The normalized, fixed-schema record produced for one offer.
///
/// Created by the canonicalizer, then mutated exactly twice (CO2 estimate,
/// reference assignment) before becoming immutable run output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalOffer {
    pub reference: String,
    pub operator: String,
    pub offer_name: String,
    pub price_chf: Option<f64>,
    pub previous_price_chf: Option<f64>,
    pub discount_percent: Option<u32>,
    /// "Non" or a channel tier such as "280 Chaines"
    pub tv_tier: String,
    pub speed_mbps: Option<u32>,
    pub sms_allowance: String,
    pub calls_allowance: String,
    /// "Illimité", a number string in Go, or empty when unknown
    pub roaming_data_go: String,
    pub roaming_minutes: String,
    pub included_countries: String,
    pub offer_category: OfferCategory,
    pub expiration_note: String,
    pub co2_estimate_kg_year: Option<f64>,
    pub contract_term: String,
}
