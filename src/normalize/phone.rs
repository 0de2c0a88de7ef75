use phonenumber::{country, Mode};
use tracing::debug;

/// Outcome of phone normalization, keeping the two quality tiers explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum PhoneOutcome {
    /// Parsed and validated for the run country, formatted as E.164.
    Valid(String),
    /// Rejected by the parser but salvaged by character cleanup.
    Cleaned(String),
    /// Nothing usable remained.
    Absent,
}

impl PhoneOutcome {
    pub fn into_option(self) -> Option<String> {
        match self {
            PhoneOutcome::Valid(value) | PhoneOutcome::Cleaned(value) => Some(value),
            PhoneOutcome::Absent => None,
        }
    }
}

const PHONE_LABELS: [&str; 2] = ["Telefon:", "Tel:"];

/// Cut a leading "Telefon:"/"Tel:" label off a scraped phone line.
fn strip_label(value: &str) -> &str {
    for label in PHONE_LABELS {
        if let Some(prefix) = value.get(..label.len()) {
            if prefix.eq_ignore_ascii_case(label) {
                return value[label.len()..].trim_start();
            }
        }
    }
    value
}

/// Normalize a scraped phone candidate against the run country.
///
/// The phone library gets the first attempt; candidates it rejects go
/// through character cleanup instead of being discarded, since many scraped
/// numbers use local dialing conventions the library refuses. A cleaned
/// value trades rigor for coverage.
pub fn normalize_phone(raw: Option<&str>, region: country::Id) -> PhoneOutcome {
    let candidate = match raw.map(|value| strip_label(value.trim()).trim()) {
        Some(candidate) if !candidate.is_empty() => candidate,
        _ => return PhoneOutcome::Absent,
    };

    match phonenumber::parse(Some(region), candidate) {
        Ok(number) if phonenumber::is_valid(&number) => {
            PhoneOutcome::Valid(number.format().mode(Mode::E164).to_string())
        }
        Ok(_) => {
            debug!(candidate, "parsed phone did not validate, cleaning up");
            cleanup(candidate)
        }
        Err(err) => {
            debug!(candidate, %err, "phone parse failed, cleaning up");
            cleanup(candidate)
        }
    }
}

/// Best-effort fallback: drop separator characters and rewrite the
/// international dialing prefix.
fn cleanup(candidate: &str) -> PhoneOutcome {
    let stripped: String = candidate
        .chars()
        .filter(|c| !matches!(c, ' ' | '/' | '.' | '-'))
        .collect();

    let cleaned = match stripped.strip_prefix("00") {
        Some(rest) => format!("+{rest}"),
        None => stripped,
    };

    if cleaned.is_empty() {
        PhoneOutcome::Absent
    } else {
        PhoneOutcome::Cleaned(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DE: country::Id = country::DE;

    #[test]
    fn absent_and_label_only_input_yield_absent() {
        assert_eq!(normalize_phone(None, DE), PhoneOutcome::Absent);
        assert_eq!(normalize_phone(Some("   "), DE), PhoneOutcome::Absent);
        assert_eq!(normalize_phone(Some("Telefon:"), DE), PhoneOutcome::Absent);
    }

    #[test]
    fn labeled_berlin_number_validates_to_e164() {
        let outcome = normalize_phone(Some("Telefon: 030 1234567"), DE);
        match outcome {
            PhoneOutcome::Valid(value) => {
                assert!(value.starts_with("+49"));
                assert!(value[1..].chars().all(|c| c.is_ascii_digit()));
            }
            other => panic!("expected a validated number, got {other:?}"),
        }
    }

    #[test]
    fn tel_label_is_accepted_too() {
        let outcome = normalize_phone(Some("Tel: 030/1234567"), DE);
        assert!(matches!(outcome, PhoneOutcome::Valid(value) if value.starts_with("+4930")));
    }

    #[test]
    fn equivalent_forms_normalize_identically() {
        let idd = normalize_phone(Some("00491701234567"), DE);
        let e164 = normalize_phone(Some("+491701234567"), DE);
        assert_eq!(idd, e164);
        assert_eq!(idd, PhoneOutcome::Valid("+491701234567".to_string()));
    }

    #[test]
    fn garbage_survives_as_cleaned_text_at_most() {
        let outcome = normalize_phone(Some("not-a-number-at-all"), DE);
        assert!(!matches!(outcome, PhoneOutcome::Valid(_)));
        if let PhoneOutcome::Cleaned(value) = outcome {
            assert_eq!(value, "notanumberatall");
        }
    }

    #[test]
    fn cleanup_rewrites_international_prefix() {
        assert_eq!(
            cleanup("00 49 / 30.12-34"),
            PhoneOutcome::Cleaned("+49301234".to_string())
        );
    }
}
