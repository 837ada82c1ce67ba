//! The full record set, as read from and written to a store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{RecordError, UserRecord};
use crate::Result;

/// Every user record, in file order.
///
/// Snapshots are values: the membership engine consumes one and returns the next. Nothing here
/// touches persistence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: Vec<UserRecord>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in order.
    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by username.
    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.records.iter().find(|r| r.username == username)
    }

    /// Look up a record by username for mutation.
    pub fn get_mut(&mut self, username: &str) -> Option<&mut UserRecord> {
        self.records.iter_mut().find(|r| r.username == username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.get(username).is_some()
    }

    /// Append a new record.
    ///
    /// # Errors
    /// Returns [`RecordError::DuplicateUsername`] if the username is already present.
    pub fn insert(&mut self, record: UserRecord) -> Result<()> {
        if self.contains(&record.username) {
            return Err(RecordError::DuplicateUsername {
                username: record.username,
            }
            .into());
        }
        self.records.push(record);
        Ok(())
    }

    /// Records whose group is `group`.
    pub fn members_of<'a>(&'a self, group: &str) -> impl Iterator<Item = &'a UserRecord> {
        self.records.iter().filter(move |r| r.in_group(group))
    }

    pub fn member_count(&self, group: &str) -> usize {
        self.members_of(group).count()
    }

    /// The member flagged as leader of `group`, if any.
    pub fn leader_of(&self, group: &str) -> Option<&UserRecord> {
        self.members_of(group).find(|r| r.is_leader)
    }

    /// Names of the non-empty groups that currently have no leader.
    ///
    /// This state is valid only transiently; it shows up when loading record files written before
    /// leadership was tracked consistently.
    pub fn leaderless_groups(&self) -> Vec<String> {
        let mut led = HashSet::new();
        let mut seen = Vec::new();
        for record in &self.records {
            if let Some(group) = &record.group {
                if record.is_leader {
                    led.insert(group.as_str());
                }
                if !seen.contains(group) {
                    seen.push(group.clone());
                }
            }
        }
        seen.retain(|g| !led.contains(g.as_str()));
        seen
    }

    /// Check the record-set invariants.
    ///
    /// - usernames are unique
    /// - a leader always belongs to a group
    /// - no group has more than one leader
    pub fn validate(&self) -> Result<()> {
        match self.violations().into_iter().next() {
            Some(violation) => Err(violation.into()),
            None => Ok(()),
        }
    }

    /// Check that every invariant violation here was already present in `previous`.
    ///
    /// Record files written by older deployments can already contain violations. Those are
    /// carried along untouched so that writes elsewhere keep working; only a violation that is new,
    /// or that pulls in a user not involved before, is refused.
    pub fn validate_against(&self, previous: &Snapshot) -> Result<()> {
        let inherited = previous.violations();
        match self
            .violations()
            .into_iter()
            .find(|violation| !inherited.iter().any(|old| covers(old, violation)))
        {
            Some(violation) => Err(violation.into()),
            None => Ok(()),
        }
    }

    /// Every invariant violation. Per-record violations come first, then multi-leader groups.
    pub fn violations(&self) -> Vec<RecordError> {
        let mut violations = Vec::new();
        let mut usernames = HashSet::with_capacity(self.records.len());
        let mut leaders: Vec<(&str, Vec<String>)> = Vec::new();

        for record in &self.records {
            if !usernames.insert(record.username.as_str()) {
                violations.push(RecordError::DuplicateUsername {
                    username: record.username.clone(),
                });
            }
            if !record.is_leader {
                continue;
            }
            match &record.group {
                Some(group) => match leaders.iter_mut().find(|(g, _)| *g == group.as_str()) {
                    Some((_, names)) => names.push(record.username.clone()),
                    None => leaders.push((group.as_str(), vec![record.username.clone()])),
                },
                None => violations.push(RecordError::LeaderWithoutGroup {
                    username: record.username.clone(),
                }),
            }
        }

        violations.extend(
            leaders
                .into_iter()
                .filter(|(_, names)| names.len() > 1)
                .map(|(group, leaders)| RecordError::MultipleLeaders {
                    group: group.to_string(),
                    leaders,
                }),
        );
        violations
    }
}

/// Whether `old` already accounts for `new`.
fn covers(old: &RecordError, new: &RecordError) -> bool {
    match (old, new) {
        (
            RecordError::DuplicateUsername { username: a },
            RecordError::DuplicateUsername { username: b },
        )
        | (
            RecordError::LeaderWithoutGroup { username: a },
            RecordError::LeaderWithoutGroup { username: b },
        ) => a == b,
        (
            RecordError::MultipleLeaders {
                group: a,
                leaders: before,
            },
            RecordError::MultipleLeaders {
                group: b,
                leaders: after,
            },
        ) => a == b && after.iter().all(|name| before.contains(name)),
        _ => false,
    }
}

impl From<Vec<UserRecord>> for Snapshot {
    fn from(records: Vec<UserRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<UserRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = UserRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
