//! Optional upsert sink: pushes a run's offers to an external record store in
//! fixed-size batches, keyed on the stable reference. A failed batch aborts
//! the remaining batches; rows already written locally are unaffected.

use serde_json::json;

use crate::config::SinkConfig;
use crate::error::{PipeError, Result};
use crate::offer::CanonicalOffer;

pub struct RecordStore {
    endpoint: String,
    table: String,
    api_key: String,
    batch_size: usize,
}

impl RecordStore {
    pub fn new(config: &SinkConfig, api_key: &str) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            api_key: api_key.to_string(),
            batch_size: config.batch_size.max(1),
        }
    }

    /// Upsert all offers in batches. Returns the number of records sent;
    /// stops at the first failed batch and reports which one failed.
    pub fn upsert_all(&self, offers: &[CanonicalOffer]) -> Result<usize> {
        let mut sent = 0;
        for (index, batch) in offers.chunks(self.batch_size).enumerate() {
            self.upsert_batch(batch).map_err(|e| PipeError::Sink {
                batch: index,
                message: e.to_string(),
            })?;
            sent += batch.len();
        }
        Ok(sent)
    }

    fn upsert_batch(&self, batch: &[CanonicalOffer]) -> std::result::Result<(), ureq::Error> {
        let records: Vec<serde_json::Value> = batch.iter().map(record_fields).collect();
        let payload = json!({
            "performUpsert": { "fieldsToMergeOn": ["Reference"] },
            "records": records,
        });

        let url = format!("{}/{}", self.endpoint, self.table);
        ureq::post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send_json(&payload)?;
        Ok(())
    }
}

/// Map one canonical row to the store's field names
fn record_fields(offer: &CanonicalOffer) -> serde_json::Value {
    json!({
        "fields": {
            "Reference": offer.reference,
            "Operator": offer.operator,
            "OfferName": offer.offer_name,
            "PriceCHFPerMonth": offer.price_chf,
            "PreviousPriceCHF": offer.previous_price_chf,
            "DiscountPercent": offer.discount_percent,
            "TV": offer.tv_tier,
            "SpeedMbps": offer.speed_mbps,
            "SMSAllowanceCH": offer.sms_allowance,
            "CallsAllowanceCH": offer.calls_allowance,
            "RoamingDataGo": offer.roaming_data_go,
            "RoamingMinutes": offer.roaming_minutes,
            "IncludedCountries": offer.included_countries,
            "OfferCategory": offer.offer_category.label(),
            "ExpirationNote": offer.expiration_note,
            "CO2EstimateKgYear": offer.co2_estimate_kg_year,
            "ContractTerm": offer.contract_term,
        }
    })
}
