use std::fs;

use kosmetik_scraper::config::RunConfig;
use kosmetik_scraper::crawler::{build_search_url, parse_overview};
use kosmetik_scraper::pipeline::process_record;
use kosmetik_scraper::storage::{FeedSink, JsonlFeed};
use kosmetik_scraper::types::ListingRecord;
use tempfile::tempdir;

const OVERVIEW_FIXTURE: &str = r#"
    <html><body>
    <div class="inner5-content-lft">
      <div id="4711" class="Gold">
        <div class="eintrag-top"><h4>Studio Eleganz</h4></div>
        <div class="eintrag-center-lft">
          <a class="suchergebnisLink" href="studio-eleganz.php">mehr</a>
        </div>
        <div class="eintrag-center-rght">
          <p>Hauptstr. 5<br>12345 Berlin, Mitte<br>Telefon: 030/1234567</p>
        </div>
      </div>
      <div id="815" class="Bronze">
        <h5>Kosmetik M&uuml;ller</h5>
        <p>Dorfweg 1</p>
        <a class="zum3" href="/kosmetik-mueller.php">zum Studio</a>
      </div>
    </div>
    </body></html>
"#;

#[test]
fn scraped_records_end_up_fully_normalized() {
    let run = RunConfig::resolve(Some("DE")).unwrap();
    let page_url = build_search_url(run.country_label).unwrap();

    let (mut records, next) = parse_overview(OVERVIEW_FIXTURE, &page_url);
    assert_eq!(records.len(), 2);
    assert!(next.is_none());

    for record in &mut records {
        process_record(record, &run);
    }

    let gold = &records[0];
    assert_eq!(gold.studio_name.as_deref(), Some("Studio Eleganz"));
    assert_eq!(gold.street.as_deref(), Some("Hauptstr. 5"));
    assert_eq!(gold.postalcode.as_deref(), Some("12345"));
    assert_eq!(gold.location.as_deref(), Some("Berlin"));
    assert!(gold.phone.as_deref().is_some_and(|p| p.starts_with("+4930")));
    assert_eq!(gold.country_code.as_deref(), Some("DE"));
    assert_eq!(gold.lastvisited, Some(run.run_date));
    assert_eq!(gold.portal, "kosmetikportal");

    // single contact line degrades to street-only, the record survives
    let bronze = &records[1];
    assert_eq!(bronze.street.as_deref(), Some("Dorfweg 1"));
    assert_eq!(bronze.postalcode, None);
    assert_eq!(bronze.location, None);
    assert_eq!(bronze.phone, None);
    assert_eq!(bronze.lastvisited, gold.lastvisited);
}

#[tokio::test]
async fn feed_writes_one_json_object_per_line() {
    let run = RunConfig::resolve(Some("DE")).unwrap();
    let temp_dir = tempdir().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap();

    let feed = JsonlFeed::create(output_dir, &run).unwrap();

    let mut with_contact = ListingRecord {
        studio_id: Some("4711".to_string()),
        studio_name: Some("Studio Müller".to_string()),
        contact_raw: vec![
            "Hauptstr. 5".to_string(),
            "12345 Berlin".to_string(),
            "Telefon: 030 1234567".to_string(),
        ],
        ..Default::default()
    };
    process_record(&mut with_contact, &run);
    feed.append(&with_contact).await.unwrap();

    let mut bare = ListingRecord {
        studio_id: Some("815".to_string()),
        ..Default::default()
    };
    process_record(&mut bare, &run);
    feed.append(&bare).await.unwrap();

    let path = feed.finish().await.unwrap().expect("feed reports its file");
    assert!(path.contains("kosmetikportal-overview-DE-"));
    assert!(path.ends_with(".jsonl"));

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["postalcode"], "12345");
    assert_eq!(first["location"], "Berlin");
    // umlauts are written as UTF-8, not escaped
    assert!(lines[0].contains("Studio Müller"));

    // absent fields serialize as null, never as empty strings
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert!(second["street"].is_null());
    assert!(second["phone"].is_null());
    assert_eq!(second["portal"], "kosmetikportal");
}
