//! Text formatting helpers
//!
//! Display formatting for dates (Spanish locale), numbers, byte sizes and
//! assorted string transformations used across the portfolio pages.
//!
//! Dates are accepted as RFC 3339 timestamps, ISO dates (`2024-01-15`), ISO
//! date-times without offset, or year-months (`2024-01`). Values without an
//! offset are taken as UTC, and all formatting happens in UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Shown in place of a date that cannot be parsed
pub const INVALID_DATE: &str = "Fecha inválida";

/// Shown as the end of an open date range
pub const PRESENT: &str = "Presente";

const MONTHS_LONG: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const MONTHS_SHORT: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// Date display style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// `15 ene 2024`
    #[default]
    Short,
    /// `15 de enero de 2024`
    Long,
    /// `15/01/2024`
    Numeric,
}

/// Date formatting options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateFormatOptions {
    /// Display style
    pub format: DateFormat,
    /// Append `HH:MM`
    pub include_time: bool,
}

impl DateFormatOptions {
    /// Create the default options (short, no time)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display style
    pub fn format(mut self, format: DateFormat) -> Self {
        self.format = format;
        self
    }

    /// Set whether the time is appended
    pub fn include_time(mut self, include: bool) -> Self {
        self.include_time = include;
        self
    }
}

/// Parse a date string in any of the accepted forms
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, pattern) {
            return Some(naive.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", input), "%Y-%m-%d"))
        .ok()?;
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Format a timestamp in Spanish
pub fn format_datetime(date: &DateTime<Utc>, options: DateFormatOptions) -> String {
    let day = date.day();
    let month = date.month0() as usize;
    let year = date.year();

    let formatted = match options.format {
        DateFormat::Short => format!("{} {} {}", day, MONTHS_SHORT[month], year),
        DateFormat::Long => format!("{} de {} de {}", day, MONTHS_LONG[month], year),
        DateFormat::Numeric => format!("{:02}/{:02}/{}", day, month + 1, year),
    };

    if options.include_time {
        format!("{}, {:02}:{:02}", formatted, date.hour(), date.minute())
    } else {
        formatted
    }
}

/// Format a date string in Spanish, or [`INVALID_DATE`]
pub fn format_date(date: &str, options: DateFormatOptions) -> String {
    match parse_date(date) {
        Some(parsed) => format_datetime(&parsed, options),
        None => INVALID_DATE.to_string(),
    }
}

/// Format `start - end`, or `start - Presente` when there is no end
pub fn format_date_range(start: &str, end: Option<&str>, format: DateFormat) -> String {
    let options = DateFormatOptions::new().format(format);
    let start = format_date(start, options);

    match end.filter(|end| !end.is_empty()) {
        Some(end) => format!("{} - {}", start, format_date(end, options)),
        None => format!("{} - {}", start, PRESENT),
    }
}

/// Shorten `text` to `max_length` graphemes, ending with `suffix`
pub fn truncate_text(text: &str, max_length: usize, suffix: &str) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max_length {
        return text.to_string();
    }

    let keep = max_length.saturating_sub(suffix.graphemes(true).count());
    let mut truncated: String = graphemes[..keep].concat();
    truncated.push_str(suffix);
    truncated
}

/// Uppercase the first character and lowercase the rest
pub fn capitalize(text: &str) -> String {
    let mut graphemes = text.graphemes(true);
    match graphemes.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), graphemes.as_str().to_lowercase()),
        None => String::new(),
    }
}

/// Convert `camelCase`, spaces and underscores to `kebab-case`
pub fn kebab_case(text: &str) -> String {
    static CASE_BOUNDARY: OnceLock<Regex> = OnceLock::new();
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let boundary = CASE_BOUNDARY.get_or_init(|| Regex::new(r"([a-z])([A-Z])").unwrap());
    let separators = SEPARATORS.get_or_init(|| Regex::new(r"[\s_]+").unwrap());

    let split = boundary.replace_all(text, "$1-$2");
    separators.replace_all(&split, "-").to_lowercase()
}

/// Convert dashes, underscores and spaces to `camelCase`
pub fn camel_case(text: &str) -> String {
    static SEPARATED: OnceLock<Regex> = OnceLock::new();
    let re = SEPARATED.get_or_init(|| Regex::new(r"[-_\s]+(.)?").unwrap());

    let joined = re.replace_all(text, |caps: &regex::Captures| {
        caps.get(1).map(|m| m.as_str().to_uppercase()).unwrap_or_default()
    });

    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"1 proyecto"`, `"3 proyectos"`; `plural` overrides the `s` suffix
pub fn pluralize(count: i64, singular: &str, plural: Option<&str>) -> String {
    if count == 1 {
        return format!("{} {}", count, singular);
    }

    match plural {
        Some(plural) => format!("{} {}", count, plural),
        None => format!("{} {}s", count, singular),
    }
}

/// Abbreviate thousands and millions (`1.5K`, `2.0M`)
pub fn format_number(num: f64) -> String {
    if num >= 1_000_000.0 {
        format!("{:.1}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("{:.1}K", num / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Human-readable byte size with up to `decimals` decimals (`1.5 KB`)
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut scaled = bytes as f64;
    let mut exponent = 0;
    while scaled >= 1024.0 && exponent < UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }
    let value = format!("{:.*}", decimals, scaled);

    let value = if value.contains('.') {
        value.trim_end_matches('0').trim_end_matches('.')
    } else {
        value.as_str()
    };
    format!("{} {}", value, UNITS[exponent])
}

/// URL slug: lowercase ASCII letters, digits and single dashes
pub fn create_slug(text: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static DASHES: OnceLock<Regex> = OnceLock::new();
    let disallowed = DISALLOWED.get_or_init(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    let dashes = DASHES.get_or_init(|| Regex::new(r"-+").unwrap());

    // Decompose, then drop combining accents
    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();

    let kept = disallowed.replace_all(&stripped, "");
    let dashed = whitespace.replace_all(&kept, "-");
    dashes.replace_all(&dashed, "-").trim_matches('-').to_string()
}

/// Uppercase first letters of the first `max_initials` words
pub fn get_initials(name: &str, max_initials: usize) -> String {
    name.split(' ')
        .take(max_initials)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Format a 10-digit number as `(555) 123-4567`; other input is returned as is
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return phone.to_string();
    }

    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_styles() {
        let short = DateFormatOptions::new();
        let long = DateFormatOptions::new().format(DateFormat::Long);
        let numeric = DateFormatOptions::new().format(DateFormat::Numeric);

        assert_eq!(format_date("2024-01-15", short), "15 ene 2024");
        assert_eq!(format_date("2024-09-03", long), "3 de septiembre de 2024");
        assert_eq!(format_date("2024-01-05", numeric), "05/01/2024");
    }

    #[test]
    fn test_format_date_with_time() {
        let options = DateFormatOptions::new().include_time(true);
        assert_eq!(format_date("2024-03-10T09:05:00Z", options), "10 mar 2024, 09:05");
        assert_eq!(format_date("2024-03-10T23:30:00-02:00", options), "11 mar 2024, 01:30");
    }

    #[test]
    fn test_format_date_invalid() {
        assert_eq!(format_date("not a date", DateFormatOptions::new()), "Fecha inválida");
        assert_eq!(format_date("2024-13-01", DateFormatOptions::new()), INVALID_DATE);
    }

    #[test]
    fn test_parse_date_forms() {
        assert!(parse_date("2024-01-15T10:00:00.250").is_some());
        assert!(parse_date("2024-01-15T10:00").is_some());
        assert_eq!(
            format_date("2023-06", DateFormatOptions::new().format(DateFormat::Long)),
            "1 de junio de 2023"
        );
    }

    #[test]
    fn test_format_date_range() {
        assert_eq!(
            format_date_range("2022-02-01", None, DateFormat::Short),
            "1 feb 2022 - Presente"
        );
        assert_eq!(
            format_date_range("2022-02-01", Some(""), DateFormat::Short),
            "1 feb 2022 - Presente"
        );
        assert_eq!(
            format_date_range("2020-10-01", Some("2021-12-31"), DateFormat::Long),
            "1 de octubre de 2020 - 31 de diciembre de 2021"
        );
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10, "..."), "short");
        assert_eq!(truncate_text("Hello, world!", 8, "..."), "Hello...");
        assert_eq!(truncate_text("canción", 5, "…"), "canc…");
        assert_eq!(truncate_text("abcdef", 2, "..."), "...");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hELLO"), "Hello");
        assert_eq!(capitalize("ñandú"), "Ñandú");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(kebab_case("myVariableName"), "my-variable-name");
        assert_eq!(kebab_case("hello world_again"), "hello-world-again");
        assert_eq!(camel_case("my-variable name"), "myVariableName");
        assert_eq!(camel_case("Hello_world"), "helloWorld");
        assert_eq!(camel_case("trailing-"), "trailing");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "proyecto", None), "1 proyecto");
        assert_eq!(pluralize(0, "proyecto", None), "0 proyectos");
        assert_eq!(pluralize(3, "habilidad", Some("habilidades")), "3 habilidades");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1500.0), "1.5K");
        assert_eq!(format_number(2_000_000.0), "2.0M");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0, 2), "0 Bytes");
        assert_eq!(format_bytes(512, 2), "512 Bytes");
        assert_eq!(format_bytes(1024, 2), "1 KB");
        assert_eq!(format_bytes(1536, 2), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024, 2), "5 MB");
        assert_eq!(format_bytes(1_234_567, 1), "1.2 MB");
    }

    #[test]
    fn test_create_slug() {
        assert_eq!(create_slug("Diseño Web Único"), "diseno-web-unico");
        assert_eq!(create_slug("  Hello,   World!  "), "hello-world");
        assert_eq!(create_slug("a -- b"), "a-b");
    }

    #[test]
    fn test_get_initials() {
        assert_eq!(get_initials("william velásquez", 2), "WV");
        assert_eq!(get_initials("Ana María López", 3), "AML");
        assert_eq!(get_initials("Ana María López", 1), "A");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("555-123-4567"), "(555) 123-4567");
        assert_eq!(format_phone("+34 600 000 000"), "+34 600 000 000");
    }
}
