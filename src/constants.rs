/// Portal identity and lookup-table constants shared across the crawler,
/// the normalization pipeline and the feed writer.

// Portal identity
pub const PORTAL: &str = "kosmetikportal";
pub const PORTAL_BASE: &str = "https://www.kosmetikportal.net/";
pub const SEARCH_URL: &str = "https://www.kosmetikportal.net/kosmetik-studio-suchen.php";

/// Country used when no override is supplied for a run.
pub const DEFAULT_COUNTRY: &str = "DE";

// Listing tiers as they appear in the entry's class attribute
pub const TIER_GOLD: &str = "Gold";
pub const TIER_SILVER: &str = "Silber";
pub const TIER_BRONZE: &str = "Bronze";

/// German labels the search form expects per country code.
// Add more countries once the portal covers them, and they become relevant
pub const COUNTRY_LABELS: &[(&str, &str)] = &[
    ("AT", "Österreich"),
    ("BE", "Belgien"),
    ("CH", "Schweiz"),
    ("DE", "Deutschland"),
    ("GR", "Griechenland"),
    ("IT", "Italien"),
];

/// Postal code digit counts for countries with a known fixed-length code.
pub const POSTAL_DIGITS: &[(&str, usize)] = &[
    ("DE", 5),
    ("AT", 4),
    ("BE", 4),
    ("CH", 4),
    ("FR", 5),
    ("GR", 5),
];

/// Look up the search-form label for a country code.
pub fn country_label(code: &str) -> Option<&'static str> {
    COUNTRY_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// Look up the postal code length for a country code.
pub fn postal_digits(code: &str) -> Option<usize> {
    POSTAL_DIGITS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, digits)| *digits)
}

/// Get all country codes the search form supports.
pub fn supported_countries() -> Vec<&'static str> {
    COUNTRY_LABELS.iter().map(|(code, _)| *code).collect()
}
