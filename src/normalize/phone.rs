//! Phone number canonicalization
//!
//! Every formatting of a phone number collapses to a fixed 12-digit key:
//! 2-digit country code, 3-digit area/city code, 7-digit local number.
//! A parenthesized group, when present, pins the area code; otherwise the
//! segments are cut positionally from the right. Missing leading digits are
//! zero-padded. An 11-digit number with a leading `8` is the domestic
//! dialing form of country code `7` and is folded accordingly, so
//! `+7 (985) 777-72-37` and `89857777237` produce the same key.

/// Compute the fixed 12-digit canonical key for a phone number
pub fn canonical_key(raw: &str) -> String {
    if let Some((country, area, local)) = paren_segments(raw) {
        return assemble(&country, &area, &local);
    }
    positional_segments(&digits_of(raw))
}

fn digits_of(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Segment using a parenthesis-delimited area code, when the raw string
/// carries one
fn paren_segments(raw: &str) -> Option<(String, String, String)> {
    let open = raw.find('(')?;
    let close = raw[open..].find(')')? + open;

    let country = digits_of(&raw[..open]);
    let area = digits_of(&raw[open + 1..close]);
    let local = digits_of(&raw[close + 1..]);
    if area.is_empty() || local.is_empty() {
        return None;
    }
    Some((fold_trunk_prefix(&country), area, local))
}

/// Cut country/area/local positionally from the right
fn positional_segments(digits: &str) -> String {
    let mut digits = digits.to_string();
    // 11 digits with a leading trunk `8` is the domestic form of +7
    if digits.len() == 11 && digits.starts_with('8') {
        digits.replace_range(0..1, "7");
    }

    let local_start = digits.len().saturating_sub(7);
    let area_start = local_start.saturating_sub(3);
    let local = &digits[local_start..];
    let area = &digits[area_start..local_start];
    let country = &digits[..area_start];
    assemble(country, area, local)
}

fn fold_trunk_prefix(country: &str) -> String {
    if country == "8" {
        "7".to_string()
    } else {
        country.to_string()
    }
}

/// Zero-pad each segment on the left to its fixed width; overlong segments
/// keep their rightmost digits
fn assemble(country: &str, area: &str, local: &str) -> String {
    format!(
        "{}{}{}",
        pad_left(country, 2),
        pad_left(area, 3),
        pad_left(local, 7)
    )
}

fn pad_left(segment: &str, width: usize) -> String {
    if segment.len() >= width {
        segment[segment.len() - width..].to_string()
    } else {
        format!("{}{}", "0".repeat(width - segment.len()), segment)
    }
}
