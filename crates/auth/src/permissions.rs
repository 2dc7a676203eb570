use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use roster_core::ValueObject;

/// A single capability flag.
///
/// The set is closed: every flag owns one distinct bit, assigned in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ViewBasicStats,
    ViewAdvancedStats,
    ExportData,
    ManageTeams,
    ManageUsers,
    ManageAnalysts,
    ManageManagers,
    Admin,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::ViewBasicStats,
        Permission::ViewAdvancedStats,
        Permission::ExportData,
        Permission::ManageTeams,
        Permission::ManageUsers,
        Permission::ManageAnalysts,
        Permission::ManageManagers,
        Permission::Admin,
    ];

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewBasicStats => "VIEW_BASIC_STATS",
            Permission::ViewAdvancedStats => "VIEW_ADVANCED_STATS",
            Permission::ExportData => "EXPORT_DATA",
            Permission::ManageTeams => "MANAGE_TEAMS",
            Permission::ManageUsers => "MANAGE_USERS",
            Permission::ManageAnalysts => "MANAGE_ANALYSTS",
            Permission::ManageManagers => "MANAGE_MANAGERS",
            Permission::Admin => "ADMIN",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionParseError {
    #[error("unknown permission '{0}'")]
    UnknownFlag(String),

    #[error("permission mask contains undefined bits {0:#x}")]
    StrayBits(u32),
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PermissionParseError::UnknownFlag(s.to_string()))
    }
}

/// A set of [`Permission`] flags stored as a bitmask.
///
/// The mask can only ever hold bits of defined flags; `from_bits` rejects
/// anything else. Serializes as the list of flag names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Permission>", from = "Vec<Permission>")]
pub struct PermissionSet(u32);

impl ValueObject for PermissionSet {}

impl PermissionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Permission::ALL.into_iter().collect()
    }

    /// Rebuild a set from a stored mask.
    pub fn from_bits(bits: u32) -> Result<Self, PermissionParseError> {
        let known = Self::all().0;
        if bits & !known != 0 {
            return Err(PermissionParseError::StrayBits(bits & !known));
        }
        Ok(Self(bits))
    }

    /// Raw mask, for storage adapters only.
    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn has(&self, flag: Permission) -> bool {
        self.0 & flag.bit() == flag.bit()
    }

    pub fn add(&mut self, flag: Permission) {
        if !self.has(flag) {
            self.0 |= flag.bit();
        }
    }

    pub fn remove(&mut self, flag: Permission) {
        if self.has(flag) {
            self.0 &= !flag.bit();
        }
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: PermissionSet) -> PermissionSet {
        Self(self.0 | other.0)
    }

    /// Flags in the set, lowest bit first.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        Permission::ALL.into_iter().filter(|p| self.has(*p))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        let mut set = PermissionSet::empty();
        for p in iter {
            set.add(p);
        }
        set
    }
}

impl From<Vec<Permission>> for PermissionSet {
    fn from(value: Vec<Permission>) -> Self {
        value.into_iter().collect()
    }
}

impl From<PermissionSet> for Vec<Permission> {
    fn from(value: PermissionSet) -> Self {
        value.iter().collect()
    }
}

impl core::fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.iter().map(|p| p.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_set() -> impl Strategy<Value = PermissionSet> {
        any::<u8>().prop_map(|bits| PermissionSet::from_bits(u32::from(bits)).unwrap())
    }

    fn any_flag() -> impl Strategy<Value = Permission> {
        (0usize..Permission::ALL.len()).prop_map(|i| Permission::ALL[i])
    }

    #[test]
    fn flags_occupy_distinct_bits() {
        let mut seen = 0u32;
        for p in Permission::ALL {
            assert_eq!(p.bit().count_ones(), 1);
            assert_eq!(seen & p.bit(), 0, "{p} overlaps another flag");
            seen |= p.bit();
        }
        assert_eq!(PermissionSet::all().bits(), seen);
    }

    #[test]
    fn names_parse_back() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
        assert!("SUPERUSER".parse::<Permission>().is_err());
    }

    #[test]
    fn stray_bits_are_rejected() {
        assert_eq!(
            PermissionSet::from_bits(0x100),
            Err(PermissionParseError::StrayBits(0x100))
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut set = PermissionSet::all();
        set.reset();
        assert!(set.is_empty());
    }

    #[test]
    fn serializes_as_flag_names() {
        let set: PermissionSet = [Permission::ExportData, Permission::ViewBasicStats]
            .into_iter()
            .collect();
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json, serde_json::json!(["VIEW_BASIC_STATS", "EXPORT_DATA"]));

        let back: PermissionSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    proptest! {
        #[test]
        fn add_is_idempotent(set in any_set(), flag in any_flag()) {
            let mut once = set;
            once.add(flag);
            let mut twice = once;
            twice.add(flag);
            prop_assert_eq!(once, twice);
            prop_assert!(once.has(flag));
        }

        #[test]
        fn remove_absent_is_noop(set in any_set(), flag in any_flag()) {
            let mut without = set;
            without.remove(flag);
            let mut again = without;
            again.remove(flag);
            prop_assert_eq!(without, again);
            prop_assert!(!without.has(flag));
        }

        #[test]
        fn add_only_touches_its_own_bit(set in any_set(), flag in any_flag()) {
            let mut next = set;
            next.add(flag);
            for other in Permission::ALL.into_iter().filter(|p| *p != flag) {
                prop_assert_eq!(set.has(other), next.has(other));
            }
        }
    }
}
