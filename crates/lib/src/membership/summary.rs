//! Read-only views over a snapshot
//!
//! Nothing here changes a record. A snapshot that breaks the leadership rules is reported as-is;
//! fixing it is the job of the mutating operations.

use serde::Serialize;

use super::GroupCatalog;
use crate::record::{Snapshot, Track};

/// Per-group line of the dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub name: String,
    pub member_count: usize,
    /// Whether the requesting user belongs to this group
    pub is_member: bool,
    /// Whether the requesting user leads this group
    pub is_current_leader: bool,
}

/// One member as shown on a group's member list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub username: String,
    pub is_leader: bool,
    pub spotify_username: Option<String>,
    pub current_track: Option<Track>,
    /// Name of the last-known active device
    pub active_device: Option<String>,
}

/// Summarize every catalog group from the point of view of `username`.
pub fn list_group_summary(
    snapshot: &Snapshot,
    catalog: &GroupCatalog,
    username: &str,
) -> Vec<GroupSummary> {
    let requester = snapshot.get(username);
    catalog
        .names()
        .iter()
        .map(|name| GroupSummary {
            name: name.clone(),
            member_count: snapshot.member_count(name),
            is_member: requester.is_some_and(|r| r.in_group(name)),
            is_current_leader: requester.is_some_and(|r| r.leads(name)),
        })
        .collect()
}

/// Members of `group`, sorted by username.
pub fn group_members(snapshot: &Snapshot, group: &str) -> Vec<MemberView> {
    let mut members: Vec<MemberView> = snapshot
        .members_of(group)
        .map(|record| MemberView {
            username: record.username.clone(),
            is_leader: record.is_leader,
            spotify_username: record.spotify_username.clone(),
            current_track: record.current_track.clone(),
            active_device: record.active_device.as_ref().map(|d| d.name.clone()),
        })
        .collect();
    members.sort_by(|a, b| a.username.cmp(&b.username));
    members
}
