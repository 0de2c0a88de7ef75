use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::PORTAL;

/// One studio listing scraped from a search overview page.
///
/// Raw fields are filled by the crawler; the derived address/contact fields
/// are computed by the pipeline and stay `None` when they could not be
/// determined. `contact_raw` is captured once and never rewritten. Field
/// order here fixes the column order of the exported feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub studio_id: Option<String>,
    pub studio_name: Option<String>,
    /// Site-defined tier label, uppercased
    pub studio_category: Option<String>,
    pub detail_url: Option<String>,
    pub homepage: Option<String>,
    /// Contact block lines in document order, whitespace-normalized
    pub contact_raw: Vec<String>,
    pub country_code: Option<String>,
    pub street: Option<String>,
    pub postalcode: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    /// Crawl date, identical for every record of one run
    pub lastvisited: Option<NaiveDate>,
    pub portal: String,
}

impl Default for ListingRecord {
    fn default() -> Self {
        Self {
            studio_id: None,
            studio_name: None,
            studio_category: None,
            detail_url: None,
            homepage: None,
            contact_raw: Vec::new(),
            country_code: None,
            street: None,
            postalcode: None,
            location: None,
            phone: None,
            lastvisited: None,
            portal: PORTAL.to_string(),
        }
    }
}
