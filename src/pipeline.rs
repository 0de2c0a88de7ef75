use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::RunConfig;
use crate::crawler::OverviewCrawler;
use crate::error::Result;
use crate::normalize::contact;
use crate::normalize::phone::{normalize_phone, PhoneOutcome};
use crate::normalize::postal::split_postal;
use crate::storage::FeedSink;
use crate::types::ListingRecord;

/// Result of a complete crawl run.
#[derive(Debug, Serialize)]
pub struct CrawlSummary {
    pub country_code: String,
    pub pages: u32,
    pub total_listings: usize,
    pub with_phone: usize,
    pub with_postalcode: usize,
    pub output_file: Option<String>,
}

/// Stamp run-scoped provenance onto a record before normalization.
///
/// Every record of a run gets the same crawl date and country code,
/// independent of its content.
pub fn enrich(record: &mut ListingRecord, run: &RunConfig) {
    record.lastvisited = Some(run.run_date);
    record.country_code = Some(run.country_code.clone());
}

/// Derive street, postal code, city and phone from the raw contact lines.
///
/// The raw lines are read, never rewritten. Fields that cannot be derived
/// stay `None`; a degraded field never fails the record.
pub fn split_contact(record: &mut ListingRecord, run: &RunConfig) {
    let split = contact::split(&record.contact_raw);

    record.street = split.street;

    let (postalcode, location) =
        split_postal(split.city_raw.as_deref(), run.postal_pattern.as_ref());
    record.postalcode = postalcode;
    record.location = location;

    record.phone = match normalize_phone(split.phone_raw.as_deref(), run.phone_region) {
        PhoneOutcome::Valid(value) => Some(value),
        PhoneOutcome::Cleaned(value) => {
            debug!(studio_id = ?record.studio_id, phone = %value, "keeping unvalidated phone after cleanup");
            Some(value)
        }
        PhoneOutcome::Absent => None,
    };
}

/// Run every stage over one record.
pub fn process_record(record: &mut ListingRecord, run: &RunConfig) {
    enrich(record, run);
    split_contact(record, run);
}

pub struct Pipeline;

impl Pipeline {
    /// Run the complete crawl: fetch and parse all overview pages, normalize
    /// each record and hand it to the feed sink.
    #[instrument(skip(crawler, run, sink), fields(country = %run.country_code))]
    pub async fn run(
        crawler: &OverviewCrawler,
        run: &RunConfig,
        sink: &dyn FeedSink,
    ) -> Result<CrawlSummary> {
        info!("🚀 Starting overview crawl");

        let batch = crawler.crawl(run).await?;
        info!(
            "✅ Fetched {} listings from {} pages",
            batch.records.len(),
            batch.pages
        );

        let mut with_phone = 0;
        let mut with_postalcode = 0;
        let mut records = batch.records;

        for record in &mut records {
            process_record(record, run);
            if record.phone.is_some() {
                with_phone += 1;
            }
            if record.postalcode.is_some() {
                with_postalcode += 1;
            }
            sink.append(record).await?;
        }

        let output_file = sink.finish().await?;
        if let Some(file) = &output_file {
            info!("💾 Saved listings to {}", file);
        }

        Ok(CrawlSummary {
            country_code: run.country_code.clone(),
            pages: batch.pages,
            total_listings: records.len(),
            with_phone,
            with_postalcode,
            output_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_contact_block_splits_into_all_fields() {
        let run = RunConfig::resolve(Some("DE")).unwrap();
        let mut record = ListingRecord {
            contact_raw: vec![
                "Hauptstr. 5".to_string(),
                "12345 Berlin, Mitte".to_string(),
                "Telefon: 030/1234567".to_string(),
            ],
            ..Default::default()
        };

        process_record(&mut record, &run);

        assert_eq!(record.street.as_deref(), Some("Hauptstr. 5"));
        assert_eq!(record.postalcode.as_deref(), Some("12345"));
        assert_eq!(record.location.as_deref(), Some("Berlin"));
        assert!(record.phone.as_deref().is_some_and(|p| p.starts_with("+4930")));
        assert_eq!(record.country_code.as_deref(), Some("DE"));
        assert_eq!(record.lastvisited, Some(run.run_date));
        // raw lines stay untouched
        assert_eq!(record.contact_raw.len(), 3);
    }

    #[test]
    fn short_contact_block_degrades_field_by_field() {
        let run = RunConfig::resolve(Some("DE")).unwrap();
        let mut record = ListingRecord {
            contact_raw: vec!["Hauptstr. 5".to_string()],
            ..Default::default()
        };

        process_record(&mut record, &run);

        assert_eq!(record.street.as_deref(), Some("Hauptstr. 5"));
        assert_eq!(record.postalcode, None);
        assert_eq!(record.location, None);
        assert_eq!(record.phone, None);
    }

    #[test]
    fn empty_contact_block_still_gets_enriched() {
        let run = RunConfig::resolve(Some("CH")).unwrap();
        let mut record = ListingRecord::default();

        process_record(&mut record, &run);

        assert_eq!(record.country_code.as_deref(), Some("CH"));
        assert_eq!(record.lastvisited, Some(run.run_date));
        assert_eq!(record.street, None);
        assert_eq!(record.phone, None);
    }
}
