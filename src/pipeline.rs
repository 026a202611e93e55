//! Per-offer processing pipeline: extraction -> canonicalization -> CO2
//! estimate -> reference assignment.
//!
//! Total and deterministic: the same page payload always yields the same
//! canonical row, and no input can make processing fail. The only shared
//! state is the run-scoped reference set, which synchronizes itself.

use crate::canonical;
use crate::co2;
use crate::extract;
use crate::offer::{CanonicalOffer, RawPageContent};
use crate::reference::{self, ReferenceSet};

pub struct Pipeline {
    operator: String,
    references: ReferenceSet,
}

impl Pipeline {
    pub fn new(operator: &str) -> Self {
        Self {
            operator: operator.to_string(),
            references: ReferenceSet::new(),
        }
    }

    /// Process one rendered page into a finished canonical row
    pub fn process(&self, page: &RawPageContent) -> CanonicalOffer {
        let fields = extract::extract_fields(page);
        let mut offer = canonical::canonicalize(&self.operator, &fields, page);
        offer.co2_estimate_kg_year = co2::estimate(&offer);
        let base = reference::generate_reference(
            &self.operator,
            offer.offer_category,
            &offer.offer_name,
            &page.url,
        );
        offer.reference = self.references.assign(&base);
        offer
    }

    /// Reference collisions resolved by suffixing so far in this run
    pub fn collisions(&self) -> usize {
        self.references.collisions()
    }
}
