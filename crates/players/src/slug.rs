//! Human-readable player identifiers.
//!
//! A slug is derived from the display name and made unique by probing
//! `base`, `base-1`, `base-2`, … against a caller-supplied check. The probe is
//! not atomic with the later insert; storage must hold a unique index on slugs
//! and callers regenerate on a late conflict.

use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_PROBE_LIMIT: usize = 1000;

/// Length of the random token used when a name has no usable characters.
pub const FALLBACK_TOKEN_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("no free slug for '{base}' after {attempts} attempts")]
    Exhausted { base: String, attempts: usize },

    #[error("slug lookup failed: {0}")]
    Lookup(String),
}

/// Normalize a display name into a slug base.
///
/// Lower-cases, keeps only `[a-z0-9]`, whitespace and `-`, turns each run of
/// whitespace into a single `-`, and trims hyphens from both ends. Returns
/// `None` when nothing is left.
pub fn slug_base(name: &str) -> Option<String> {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    let joined = kept.split_whitespace().collect::<Vec<_>>().join("-");
    let trimmed = joined.trim_matches('-');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn random_token() -> String {
    Uuid::new_v4().simple().to_string()[..FALLBACK_TOKEN_LEN].to_string()
}

/// Slug generator with a bounded uniqueness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlugGenerator {
    probe_limit: usize,
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_LIMIT)
    }
}

impl SlugGenerator {
    pub fn new(probe_limit: usize) -> Self {
        Self {
            probe_limit: probe_limit.max(1),
        }
    }

    /// Generate a slug for `name` that `is_taken` reports as free.
    ///
    /// `is_taken` may fail (e.g. a storage read); the failure is reported as
    /// [`SlugError::Lookup`].
    pub fn generate<F, E>(&self, name: &str, mut is_taken: F) -> Result<String, SlugError>
    where
        F: FnMut(&str) -> Result<bool, E>,
        E: core::fmt::Display,
    {
        let base = slug_base(name).unwrap_or_else(random_token);

        for attempt in 0..self.probe_limit {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}-{attempt}")
            };
            if !is_taken(&candidate).map_err(|e| SlugError::Lookup(e.to_string()))? {
                return Ok(candidate);
            }
        }

        Err(SlugError::Exhausted {
            base,
            attempts: self.probe_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::convert::Infallible;

    use super::*;
    use proptest::prelude::*;

    fn taken<'a>(existing: &'a HashSet<&'a str>) -> impl FnMut(&str) -> Result<bool, Infallible> + 'a {
        move |s: &str| Ok(existing.contains(s))
    }

    #[test]
    fn base_normalization() {
        assert_eq!(slug_base("John Smith").as_deref(), Some("john-smith"));
        assert_eq!(slug_base("  O'Neil   Jr. ").as_deref(), Some("oneil-jr"));
        assert_eq!(slug_base("-Ana- María-").as_deref(), Some("ana--mara"));
        assert_eq!(slug_base("Player #23").as_deref(), Some("player-23"));
        assert_eq!(slug_base("!!!"), None);
        assert_eq!(slug_base("   "), None);
    }

    #[test]
    fn appends_counter_on_collision() {
        let existing: HashSet<&str> = ["john-smith", "john-smith-1"].into_iter().collect();
        let slug = SlugGenerator::default().generate("John Smith", taken(&existing)).unwrap();
        assert_eq!(slug, "john-smith-2");
    }

    #[test]
    fn free_base_is_used_as_is() {
        let existing = HashSet::new();
        let slug = SlugGenerator::default().generate("Luis Arráez", taken(&existing)).unwrap();
        assert_eq!(slug, "luis-arrez");
    }

    #[test]
    fn nameless_input_gets_random_token() {
        let existing = HashSet::new();
        let slug = SlugGenerator::default().generate("???", taken(&existing)).unwrap();
        assert_eq!(slug.len(), FALLBACK_TOKEN_LEN);
        assert!(slug.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn probe_is_bounded() {
        let generator = SlugGenerator::new(3);
        let err = generator
            .generate("Anyone", |_| Ok::<_, Infallible>(true))
            .unwrap_err();
        assert_eq!(
            err,
            SlugError::Exhausted {
                base: "anyone".to_string(),
                attempts: 3
            }
        );
    }

    #[test]
    fn lookup_failures_propagate() {
        let err = SlugGenerator::default()
            .generate("Anyone", |_| Err::<bool, _>("store offline"))
            .unwrap_err();
        assert_eq!(err, SlugError::Lookup("store offline".to_string()));
    }

    proptest! {
        #[test]
        fn base_is_url_safe(name in "\\PC{0,40}") {
            if let Some(base) = slug_base(&name) {
                prop_assert!(base.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
                prop_assert!(!base.starts_with('-') && !base.ends_with('-'));
            }
        }

        #[test]
        fn generated_slug_is_free(name in "[A-Za-z ]{1,20}", n in 0usize..5) {
            let mut existing: HashSet<String> = HashSet::new();
            if let Some(base) = slug_base(&name) {
                existing.insert(base.clone());
                for i in 1..=n {
                    existing.insert(format!("{base}-{i}"));
                }
            }
            let slug = SlugGenerator::default()
                .generate(&name, |s| Ok::<_, Infallible>(existing.contains(s)))
                .unwrap();
            prop_assert!(!existing.contains(&slug));
        }
    }
}
