//! The fixed list of group names the service offers.

use super::MembershipError;
use crate::Result;

/// Group names used when none are configured.
pub const DEFAULT_GROUPS: [&str; 4] = ["Groupe A", "Groupe B", "Groupe C", "Groupe D"];

/// Enumerated group names, in display order.
///
/// Names are opaque and compared by equality. Blank entries and repeats are dropped on
/// construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupCatalog {
    names: Vec<String>,
}

impl GroupCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            let name = name.trim();
            if !name.is_empty() && !unique.iter().any(|n| n == name) {
                unique.push(name.to_string());
            }
        }
        Self { names: unique }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Validate a requested group name against the catalog.
    pub fn check(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(MembershipError::EmptyGroupName.into());
        }
        if !self.contains(name) {
            return Err(MembershipError::UnknownGroup {
                name: name.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for GroupCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_GROUPS)
    }
}
