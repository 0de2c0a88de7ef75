use tracing::debug;

/// Street, combined postal/city text and phone candidate partitioned out of
/// a raw contact block.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContactSplit {
    pub street: Option<String>,
    pub city_raw: Option<String>,
    pub phone_raw: Option<String>,
}

const PHONE_LABELS: [&str; 2] = ["Telefon:", "Tel:"];

/// Whether a contact line announces itself as the phone line.
fn has_phone_label(line: &str) -> bool {
    let line = line.trim_start();
    PHONE_LABELS.iter().any(|label| {
        line.get(..label.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(label))
    })
}

/// Partition the scraped contact lines into street, city and phone.
///
/// A line carrying a phone label is taken as the phone candidate wherever it
/// appears; the remaining lines map by position, street first and the
/// postal/city text second. Without a labeled line the mapping is purely
/// positional and the third line becomes the phone candidate. Lines beyond
/// the known layout are dropped.
pub fn split(lines: &[String]) -> ContactSplit {
    let labeled = lines.iter().position(|line| has_phone_label(line));

    let mut positional = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != labeled)
        .map(|(_, line)| line.as_str());

    let street = positional.next().map(str::to_owned);
    let city_raw = positional.next().map(str::to_owned);
    let phone_raw = match labeled {
        Some(i) => Some(lines[i].clone()),
        None => positional.next().map(str::to_owned),
    };

    let dropped = positional.count();
    if dropped > 0 {
        debug!(dropped, "ignoring contact lines beyond the known layout");
    }

    ContactSplit {
        street,
        city_raw,
        phone_raw,
    }
}
