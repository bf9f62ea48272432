use chrono::NaiveDate;

/// Accepted date shapes: ISO first, then the display strings the pickers show.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%B %d, %Y", "%d %B %Y", "%b %d, %Y", "%d %b %Y"];

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a plain four digit year.
pub fn parse_year(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    if trimmed.len() != 4 || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_normalize_to_iso() {
        let expected = NaiveDate::from_ymd_opt(2001, 3, 15).unwrap();
        assert_eq!(parse_date("2001-03-15"), Some(expected));
        assert_eq!(parse_date("March 15, 2001"), Some(expected));
        assert_eq!(parse_date("15 March 2001"), Some(expected));
        assert_eq!(parse_date("Mar 15, 2001"), Some(expected));
        assert_eq!(to_iso(expected), "2001-03-15");
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2023-02-30"), None);
    }

    #[test]
    fn year_requires_exactly_four_digits() {
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year(" 1999 "), Some(1999));
        assert_eq!(parse_year("999"), None);
        assert_eq!(parse_year("20201"), None);
        assert_eq!(parse_year("20a0"), None);
        assert_eq!(parse_year("+202"), None);
    }
}
