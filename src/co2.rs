//! CO2 estimator: a deterministic yearly-emissions score over a canonical
//! offer row. Pure function, no I/O, branches on the offer category.

use crate::offer::{CanonicalOffer, OfferCategory, UNLIMITED};
use crate::text;

const MOBILE_BASE_KG: f64 = 12.5;
const MOBILE_FAST_BASE_KG: f64 = 14.5;
const MOBILE_SPEED_THRESHOLD_MBPS: u32 = 300;
const UNLIMITED_ALLOWANCE_KG: f64 = 0.5;
const ROAMING_DATA_KG_PER_GO: f64 = 0.35;
const UNLIMITED_ROAMING_DATA_KG: f64 = 18.3;
const UNLIMITED_ROAMING_MINUTES_CREDIT_KG: f64 = 12.2;
const DARK_PLAN_CREDIT_KG: f64 = 0.5;

const HOME_CABLE_BASE_KG: f64 = 35.0;
const HOME_FIBER_BASE_KG: f64 = 30.0;
const HOME_5G_BASE_KG: f64 = 45.0;
const HOME_TV_SURCHARGE_KG: f64 = 50.0;

/// Estimate yearly CO2 in kg for one offer, rounded to one decimal and
/// clamped at zero. Returns None when no estimate is defined for the row.
pub fn estimate(offer: &CanonicalOffer) -> Option<f64> {
    let kg = match offer.offer_category {
        OfferCategory::Mobile => mobile_estimate(offer),
        OfferCategory::HomeNoTV | OfferCategory::HomeWithTV => home_estimate(offer),
    };
    Some(round_one_decimal(kg.max(0.0)))
}

fn mobile_estimate(offer: &CanonicalOffer) -> f64 {
    // Unknown speed falls into the <= 300 branch, same as 0 Mbps. Inherited
    // behavior that downstream comparisons rely on; keep as is.
    let speed = offer.speed_mbps.unwrap_or(0);
    let mut kg = if speed <= MOBILE_SPEED_THRESHOLD_MBPS {
        MOBILE_BASE_KG
    } else {
        MOBILE_FAST_BASE_KG
    };

    if offer.calls_allowance == UNLIMITED {
        kg += UNLIMITED_ALLOWANCE_KG;
    }
    if offer.sms_allowance == UNLIMITED {
        kg += UNLIMITED_ALLOWANCE_KG;
    }

    let roaming_go = text::parse_unlimited_aware(&offer.roaming_data_go);
    if roaming_go.is_finite() {
        kg += roaming_go * ROAMING_DATA_KG_PER_GO;
    } else {
        kg += UNLIMITED_ROAMING_DATA_KG;
    }

    if offer.roaming_minutes == UNLIMITED {
        kg -= UNLIMITED_ROAMING_MINUTES_CREDIT_KG;
    }

    let name = offer.offer_name.to_lowercase();
    if name.contains("noir") || name.contains("black") {
        kg -= DARK_PLAN_CREDIT_KG;
    }

    kg
}

fn home_estimate(offer: &CanonicalOffer) -> f64 {
    // Name tokens are matched verbatim: "fiber" only, not the French
    // "fibre". Offers named "Home Fibre" score the cable base.
    let name = offer.offer_name.to_lowercase();
    let mut kg = if name.contains("fiber") {
        HOME_FIBER_BASE_KG
    } else if name.contains("5g") {
        HOME_5G_BASE_KG
    } else {
        HOME_CABLE_BASE_KG
    };
    if offer.offer_category == OfferCategory::HomeWithTV {
        kg += HOME_TV_SURCHARGE_KG;
    }
    kg
}

fn round_one_decimal(kg: f64) -> f64 {
    (kg * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_row(category: OfferCategory, name: &str) -> CanonicalOffer {
        CanonicalOffer {
            reference: String::new(),
            operator: "Yallo".into(),
            offer_name: name.into(),
            price_chf: None,
            previous_price_chf: None,
            discount_percent: None,
            tv_tier: "Non".into(),
            speed_mbps: None,
            sms_allowance: String::new(),
            calls_allowance: String::new(),
            roaming_data_go: String::new(),
            roaming_minutes: String::new(),
            included_countries: "Aucun".into(),
            offer_category: category,
            expiration_note: String::new(),
            co2_estimate_kg_year: None,
            contract_term: "Sans engagement".into(),
        }
    }

    #[test]
    fn test_mobile_black_plan_worked_example() {
        let mut row = base_row(OfferCategory::Mobile, "Yallo Black");
        row.speed_mbps = Some(300);
        row.calls_allowance = UNLIMITED.into();
        row.sms_allowance = UNLIMITED.into();
        row.roaming_data_go = UNLIMITED.into();
        row.roaming_minutes = UNLIMITED.into();
        // 12.5 + 0.5 + 0.5 + 18.3 - 12.2 - 0.5
        assert_eq!(estimate(&row), Some(19.1));
    }

    #[test]
    fn test_home_fiber_with_tv_worked_example() {
        let row = base_row(OfferCategory::HomeWithTV, "Home Fiber XL");
        assert_eq!(estimate(&row), Some(80.0));
    }

    #[test]
    fn test_empty_speed_uses_low_branch() {
        let row = base_row(OfferCategory::Mobile, "Basic");
        assert_eq!(estimate(&row), Some(12.5));
    }

    #[test]
    fn test_fast_mobile_base() {
        let mut row = base_row(OfferCategory::Mobile, "Turbo");
        row.speed_mbps = Some(1000);
        assert_eq!(estimate(&row), Some(14.5));
    }

    #[test]
    fn test_finite_roaming_data() {
        let mut row = base_row(OfferCategory::Mobile, "Europe 20");
        row.roaming_data_go = "20".into();
        // 12.5 + 20 * 0.35
        assert_eq!(estimate(&row), Some(19.5));
    }

    #[test]
    fn test_home_5g() {
        let row = base_row(OfferCategory::HomeNoTV, "Home 5G Box");
        assert_eq!(estimate(&row), Some(45.0));
    }

    #[test]
    fn test_home_cable_default() {
        let row = base_row(OfferCategory::HomeNoTV, "Home Classic");
        assert_eq!(estimate(&row), Some(35.0));
    }

    #[test]
    fn test_home_fibre_french_name_scores_cable_base() {
        let row = base_row(OfferCategory::HomeNoTV, "Home Fibre");
        assert_eq!(estimate(&row), Some(35.0));
    }

    #[test]
    fn test_never_negative() {
        let mut row = base_row(OfferCategory::Mobile, "Black");
        row.roaming_minutes = UNLIMITED.into();
        // 12.5 - 12.2 - 0.5 would be -0.2; clamped
        assert_eq!(estimate(&row), Some(0.0));
    }

    #[test]
    fn test_deterministic() {
        let mut row = base_row(OfferCategory::Mobile, "Swiss Flat");
        row.roaming_data_go = "12".into();
        assert_eq!(estimate(&row), estimate(&row));
    }
}
