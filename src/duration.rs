use std::sync::OnceLock;

use regex::Regex;

const UNITS: [(&str, &str); 4] = [
    ("D", " days, "),
    ("H", " hours, "),
    ("M", " minutes, "),
    ("S", " seconds"),
];

fn unit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+)([DHMS])").expect("valid duration regex"))
}

/// Turns an ISO 8601 style duration such as `PT59M10S` into
/// `59 minutes, 10 seconds`.
///
/// Only day, hour, minute and second components are recognized. Each unit
/// uses its first occurrence, units missing from the input are left out, and
/// the digits are copied verbatim.
pub fn format(code: &str) -> String {
    let mut found: [Option<&str>; 4] = [None; 4];

    for caps in unit_regex().captures_iter(code) {
        let (Some(digits), Some(unit)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if let Some(idx) = UNITS.iter().position(|(u, _)| unit.as_str() == *u) {
            found[idx].get_or_insert(digits.as_str());
        }
    }

    UNITS
        .iter()
        .zip(found)
        .filter_map(|((_, label), digits)| digits.map(|d| format!("{}{}", d, label)))
        .collect()
}
