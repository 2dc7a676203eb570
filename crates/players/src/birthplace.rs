use serde::{Deserialize, Serialize};

use roster_core::ValueObject;

/// Separator between city and region in free-text birthplaces.
pub const REGION_SEPARATOR: &str = " - ";

/// Structured birthplace.
///
/// `full` keeps the text exactly as entered; `city` and `region` are derived
/// from it (or `full` is derived from them, see [`Birthplace::from_parts`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Birthplace {
    pub city: Option<String>,
    pub region: Option<String>,
    pub full: Option<String>,
}

impl ValueObject for Birthplace {}

impl Birthplace {
    /// Split free text on the first `" - "` into city and region.
    ///
    /// Blank input yields an empty birthplace.
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }

        let (city, region) = match text.split_once(REGION_SEPARATOR) {
            Some((city, region)) => (non_empty(city), non_empty(region)),
            None => (non_empty(text), None),
        };

        Self {
            city,
            region,
            full: Some(text.to_string()),
        }
    }

    /// Build from separately entered parts.
    pub fn from_parts(city: Option<&str>, region: Option<&str>) -> Self {
        let city = city.and_then(non_empty);
        let region = region.and_then(non_empty);

        let full = match (&city, &region) {
            (Some(c), Some(r)) => Some(format!("{c}{REGION_SEPARATOR}{r}")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        };

        Self { city, region, full }
    }

    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.region.is_none() && self.full.is_none()
    }

    pub fn display(&self) -> Option<String> {
        if let Some(full) = &self.full {
            return Some(full.clone());
        }
        match (&self.city, &self.region) {
            (Some(c), Some(r)) => Some(format!("{c}{REGION_SEPARATOR}{r}")),
            (Some(c), None) => Some(c.clone()),
            _ => None,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}
