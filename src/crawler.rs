use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::{CrawlerConfig, RunConfig};
use crate::constants::{PORTAL_BASE, SEARCH_URL, TIER_BRONZE, TIER_GOLD, TIER_SILVER};
use crate::error::{Result, ScraperError};
use crate::normalize::text::normalize;
use crate::types::ListingRecord;

/// Studio entries are the divs whose id is all digits.
static STUDIO_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid pattern"));

/// Listings and pagination state parsed from one crawl.
#[derive(Debug)]
pub struct CrawlBatch {
    pub records: Vec<ListingRecord>,
    pub pages: u32,
}

/// Crawler for the portal's paginated search overview.
pub struct OverviewCrawler {
    client: reqwest::Client,
    delay: Duration,
    max_pages: Option<u32>,
}

impl OverviewCrawler {
    pub fn new(config: &CrawlerConfig, max_pages: Option<u32>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).map_err(|e| {
                ScraperError::Config(format!("Invalid accept_language setting: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            delay: Duration::from_millis(config.delay_ms),
            max_pages,
        })
    }

    /// Fetch overview pages for the run country, following pagination until
    /// the "next" link disappears or the page cap is hit.
    #[instrument(skip(self, run), fields(country = %run.country_code))]
    pub async fn crawl(&self, run: &RunConfig) -> Result<CrawlBatch> {
        let mut url = build_search_url(run.country_label)?;
        let mut records = Vec::new();
        let mut pages = 0u32;

        loop {
            pages += 1;
            info!(page = pages, %url, "fetching overview page");
            let body = self
                .client
                .get(url.clone())
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;

            let (page_records, next) = parse_overview(&body, &url);
            info!(page = pages, listings = page_records.len(), "parsed overview page");
            records.extend(page_records);

            match next {
                Some(next_url) if self.max_pages.map_or(true, |cap| pages < cap) => {
                    url = next_url;
                    tokio::time::sleep(self.delay).await;
                }
                Some(_) => {
                    info!(page = pages, "page cap reached, stopping pagination");
                    break;
                }
                None => break,
            }
        }

        Ok(CrawlBatch { records, pages })
    }
}

/// Build the GET search URL for a country label, with the remaining form
/// fields left empty as the search form submits them.
pub fn build_search_url(country_label: &str) -> Result<Url> {
    let params = [
        ("formLand", country_label),
        ("formOrt", ""),
        ("formPLZ", ""),
        ("formLeistungen", ""),
        ("formProdukte", ""),
        ("formUmkreis", ""),
        ("formStichwortsuche", ""),
        ("formStrasse", ""),
        ("formStudioName", ""),
        ("formPage", "1"),
    ];

    Url::parse_with_params(SEARCH_URL, &params)
        .map_err(|e| ScraperError::Url(format!("Failed to build search URL: {e}")))
}

/// Parse every studio entry out of one overview page and locate the link to
/// the next page, if any.
pub fn parse_overview(body: &str, page_url: &Url) -> (Vec<ListingRecord>, Option<Url>) {
    let document = Html::parse_document(body);
    let content_selector = Selector::parse("div.inner5-content-lft").unwrap();
    let entry_selector = Selector::parse("div[id]").unwrap();

    let mut records = Vec::new();
    if let Some(content) = document.select(&content_selector).next() {
        for entry in content.select(&entry_selector) {
            let id = entry.value().id().unwrap_or_default();
            if !STUDIO_ID.is_match(id) {
                continue;
            }
            records.push(parse_studio(&entry));
        }
    } else {
        warn!("no result container on overview page - the page structure may have changed");
    }

    (records, next_page_url(&document, page_url))
}

/// Extract one studio entry. The two richer tiers share a multi-region
/// layout; the compact tier keeps everything in the entry itself.
fn parse_studio(entry: &ElementRef) -> ListingRecord {
    let mut record = ListingRecord {
        studio_id: normalize(entry.value().id()),
        ..Default::default()
    };

    let tier = normalize(entry.value().attr("class"));
    record.studio_category = tier.as_deref().map(str::to_uppercase);

    match tier.as_deref() {
        Some(TIER_GOLD) | Some(TIER_SILVER) => {
            let top = select_region(entry, "div[class*='-top']");
            let left = select_region(entry, "div[class*='-center-lft']");
            let right = select_region(entry, "div[class*='-center-rght']");
            let bottom = select_region(entry, "div[class*='-bottom-rght']");

            record.studio_name = top.as_ref().and_then(|region| heading_text(region, "h4"));

            record.detail_url = absolutize(
                left.as_ref()
                    .and_then(|region| first_href(region, "a.suchergebnisLink"))
                    .or_else(|| bottom.as_ref().and_then(|region| first_href(region, "a.zum2"))),
            );

            if let Some(right) = right {
                record.contact_raw = paragraph_lines(&right);
                record.homepage = first_href(&right, "a[class*='navitop']");
            }
        }
        Some(TIER_BRONZE) => {
            record.studio_name = heading_text(entry, "h5");
            record.contact_raw = paragraph_lines(entry);
            record.detail_url = absolutize(first_href(entry, "a.zum3"));
        }
        _ => {
            debug!(studio_id = ?record.studio_id, tier = ?tier, "entry with unknown tier, keeping bare record");
        }
    }

    record
}

/// First sub-region of an entry matching a class fragment.
fn select_region<'a>(entry: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).unwrap();
    entry.select(&selector).next()
}

/// Normalized text of the first matching heading.
fn heading_text(region: &ElementRef, css: &str) -> Option<String> {
    let selector = Selector::parse(css).unwrap();
    let heading = region.select(&selector).next()?;
    normalize(Some(&heading.text().collect::<String>()))
}

/// Normalized href of the first matching anchor.
fn first_href(region: &ElementRef, css: &str) -> Option<String> {
    let selector = Selector::parse(css).unwrap();
    region
        .select(&selector)
        .next()
        .and_then(|anchor| normalize(anchor.value().attr("href")))
}

/// Contact lines: the direct text nodes of the entry's own paragraphs, one
/// line per text node so `<br>`-separated fragments stay separate items.
fn paragraph_lines(region: &ElementRef) -> Vec<String> {
    region
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "p")
        .flat_map(|paragraph| {
            paragraph
                .children()
                .filter_map(|node| node.value().as_text().map(|text| text.to_string()))
                .collect::<Vec<_>>()
        })
        .filter_map(|text| normalize(Some(&text)))
        .collect()
}

/// Resolve a scraped link against the portal base unless already absolute.
fn absolutize(value: Option<String>) -> Option<String> {
    let value = value?;
    if value.starts_with("https://") || value.starts_with("http://") {
        return Some(value);
    }
    match Url::parse(PORTAL_BASE).and_then(|base| base.join(&value)) {
        Ok(url) => Some(url.to_string()),
        Err(err) => {
            warn!(%err, link = %value, "keeping unresolvable link as scraped");
            Some(value)
        }
    }
}

/// Link target of the "next" button in the last pagination list.
fn next_page_url(document: &Html, page_url: &Url) -> Option<Url> {
    let paging_selector = Selector::parse("ul.paging").unwrap();
    let next_selector = Selector::parse("a.next").unwrap();

    let paging = document.select(&paging_selector).last()?;
    let href = paging.select(&next_selector).next()?.value().attr("href")?;

    match page_url.join(href) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!(%err, href, "ignoring unparsable pagination link");
            None
        }
    }
}
