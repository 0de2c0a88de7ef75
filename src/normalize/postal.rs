use regex::Regex;

use crate::constants::postal_digits;

/// Compile the "postal code + city" pattern for a country, if its postal
/// code length is known.
pub fn postal_pattern(country_code: &str) -> Option<Regex> {
    let digits = postal_digits(country_code)?;
    Some(Regex::new(&format!(r"^(\d{{{digits}}})\s+(.+)$")).expect("postal pattern is valid"))
}

/// Separate a combined "postal code + city" value into its parts.
///
/// Text after the first comma is a trailing qualifier (region, district) and
/// is cut off before matching. Without a pattern for the run country, or
/// when the pattern does not match, the whole first segment is kept as the
/// location so the value is not lost.
pub fn split_postal(
    city_raw: Option<&str>,
    pattern: Option<&Regex>,
) -> (Option<String>, Option<String>) {
    let raw = match city_raw {
        Some(raw) => raw,
        None => return (None, None),
    };

    let segment = raw.split(',').next().unwrap_or(raw).trim();
    if segment.is_empty() {
        return (None, None);
    }

    if let Some(pattern) = pattern {
        if let Some(caps) = pattern.captures(segment) {
            let code = caps[1].to_string();
            let city = caps[2].trim().to_string();
            return (Some(code), Some(city));
        }
    }

    (None, Some(segment.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::POSTAL_DIGITS;

    #[test]
    fn absent_input_yields_nothing() {
        let pattern = postal_pattern("DE");
        assert_eq!(split_postal(None, pattern.as_ref()), (None, None));
    }

    #[test]
    fn splits_code_and_city_for_every_known_country() {
        for (code, digits) in POSTAL_DIGITS {
            let plz: String = "7".repeat(*digits);
            let raw = format!("{plz}  Musterstadt");
            let pattern = postal_pattern(code);
            let (postalcode, location) = split_postal(Some(&raw), pattern.as_ref());
            assert_eq!(postalcode.as_deref(), Some(plz.as_str()), "country {code}");
            assert_eq!(location.as_deref(), Some("Musterstadt"), "country {code}");
        }
    }

    #[test]
    fn trailing_comma_segment_is_discarded() {
        let pattern = postal_pattern("DE");
        let (postalcode, location) =
            split_postal(Some("12345 Berlin, some region"), pattern.as_ref());
        assert_eq!(postalcode.as_deref(), Some("12345"));
        assert_eq!(location.as_deref(), Some("Berlin"));
    }

    #[test]
    fn unknown_country_keeps_whole_segment_as_location() {
        assert_eq!(
            split_postal(Some("9999 Nowhere"), None),
            (None, Some("9999 Nowhere".to_string()))
        );
    }

    #[test]
    fn unmatched_segment_becomes_the_location() {
        let pattern = postal_pattern("DE");
        // Austrian-length code does not match the German pattern
        let (postalcode, location) = split_postal(Some("1010 Wien"), pattern.as_ref());
        assert_eq!(postalcode, None);
        assert_eq!(location.as_deref(), Some("1010 Wien"));
    }

    #[test]
    fn comma_only_qualifier_yields_nothing() {
        let pattern = postal_pattern("DE");
        assert_eq!(split_postal(Some(", Mitte"), pattern.as_ref()), (None, None));
    }
}
