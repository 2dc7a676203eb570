//! Lenient date parsing for roster input.
//!
//! Input comes from spreadsheets of mixed origin, so several layouts are tried
//! in a fixed order. Failure is a normal outcome (`None`), never an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A supported date layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `DD/MM/YYYY`
    DayMonthYear,
    /// `MM/DD/YYYY`
    MonthDayYear,
    /// `YYYY-MM-DD`
    Iso,
}

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "%d/%m/%Y",
            DateFormat::MonthDayYear => "%m/%d/%Y",
            DateFormat::Iso => "%Y-%m-%d",
        }
    }
}

pub const DEFAULT_FORMATS: [DateFormat; 3] = [
    DateFormat::DayMonthYear,
    DateFormat::MonthDayYear,
    DateFormat::Iso,
];

/// Tries each format in order and keeps the first that parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParser {
    formats: Vec<DateFormat>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(DEFAULT_FORMATS.to_vec())
    }
}

impl DateParser {
    pub fn new(formats: Vec<DateFormat>) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &[DateFormat] {
        &self.formats
    }

    pub fn parse(&self, input: &str) -> Option<NaiveDate> {
        self.parse_with_format(input).map(|(date, _)| date)
    }

    /// Like [`Self::parse`], also reporting which format matched.
    pub fn parse_with_format(&self, input: &str) -> Option<(NaiveDate, DateFormat)> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        self.formats.iter().find_map(|format| {
            NaiveDate::parse_from_str(input, format.pattern())
                .ok()
                .map(|date| (date, *format))
        })
    }
}

/// Parse with [`DEFAULT_FORMATS`].
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    DateParser::default().parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_first_wins_when_unambiguous() {
        assert_eq!(
            DateParser::default().parse_with_format("31/12/2000"),
            Some((ymd(2000, 12, 31), DateFormat::DayMonthYear))
        );
    }

    #[test]
    fn ambiguous_dates_read_day_first() {
        assert_eq!(parse_date("03/04/1995"), Some(ymd(1995, 4, 3)));
    }

    #[test]
    fn month_first_fallback() {
        assert_eq!(
            DateParser::default().parse_with_format("12/31/2000"),
            Some((ymd(2000, 12, 31), DateFormat::MonthDayYear))
        );
    }

    #[test]
    fn iso_fallback() {
        assert_eq!(
            DateParser::default().parse_with_format(" 2000-12-31 "),
            Some((ymd(2000, 12, 31), DateFormat::Iso))
        );
    }

    #[test]
    fn impossible_dates_are_absent() {
        assert_eq!(parse_date("13/13/2000"), None);
        assert_eq!(parse_date("31/02/2001"), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn custom_order_is_respected() {
        let parser = DateParser::new(vec![DateFormat::MonthDayYear, DateFormat::DayMonthYear]);
        assert_eq!(parser.parse("03/04/1995"), Some(ymd(1995, 3, 4)));
        assert_eq!(parser.parse("1995-03-04"), None);
    }
}
