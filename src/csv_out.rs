//! Tabular output. Column order and the quoting rule are a compatibility
//! contract with downstream consumers; do not reorder or reformat.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::offer::CanonicalOffer;

pub const COLUMNS: [&str; 17] = [
    "Reference",
    "Operator",
    "OfferName",
    "PriceCHFPerMonth",
    "PreviousPriceCHF",
    "DiscountPercent",
    "TV",
    "SpeedMbps",
    "SMSAllowanceCH",
    "CallsAllowanceCH",
    "RoamingDataGo",
    "RoamingMinutes",
    "IncludedCountries",
    "OfferCategory",
    "ExpirationNote",
    "CO2EstimateKgYear",
    "ContractTerm",
];

/// Quote a field when it contains a comma, quote or newline; double internal
/// quotes. This exact behavior is relied upon by downstream consumers.
fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render a float without a trailing ".0" (prices and estimates are written
/// the way the source pages show them)
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn optional_number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

fn offer_row(offer: &CanonicalOffer) -> [String; 17] {
    [
        offer.reference.clone(),
        offer.operator.clone(),
        offer.offer_name.clone(),
        optional_number(offer.price_chf),
        optional_number(offer.previous_price_chf),
        offer.discount_percent.map(|d| d.to_string()).unwrap_or_default(),
        offer.tv_tier.clone(),
        offer.speed_mbps.map(|s| s.to_string()).unwrap_or_default(),
        offer.sms_allowance.clone(),
        offer.calls_allowance.clone(),
        offer.roaming_data_go.clone(),
        offer.roaming_minutes.clone(),
        offer.included_countries.clone(),
        offer.offer_category.label().to_string(),
        offer.expiration_note.clone(),
        optional_number(offer.co2_estimate_kg_year),
        offer.contract_term.clone(),
    ]
}

/// Serialize a run's offers as CSV text, header included
pub fn to_csv(offers: &[CanonicalOffer]) -> String {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(","));
    out.push('\n');
    for offer in offers {
        let row: Vec<String> = offer_row(offer).iter().map(|f| escape_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Write a run's offers to a CSV file
pub fn write_csv(path: &Path, offers: &[CanonicalOffer]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_csv(offers))?;
    Ok(())
}
