//! Membership transitions
//!
//! Each operation takes the full snapshot by value and returns the next one. The acting user's
//! record and, when leadership has to move, one other member of the vacated group are the only
//! records that change.

use tracing::{debug, info};

use super::{LeaderSelector, MembershipError};
use crate::{Result, record::Snapshot};

/// Move `username` into `group`.
///
/// The first member of an empty group becomes its leader; joining a group that already has a
/// leader never makes the joiner leader. A group with members but no leader only exists in record
/// files from older deployments; the joiner takes the lead there so the group ends up with exactly
/// one. If the user led the group they are leaving, one of the remaining members of that group is
/// promoted through `selector`.
///
/// Joining the group the user already belongs to changes nothing.
///
/// # Errors
/// - [`MembershipError::EmptyGroupName`] if `group` is empty
/// - [`MembershipError::UserNotFound`] if `username` has no record
pub fn join_group(
    mut snapshot: Snapshot,
    username: &str,
    group: &str,
    selector: &dyn LeaderSelector,
) -> Result<Snapshot> {
    if group.is_empty() {
        return Err(MembershipError::EmptyGroupName.into());
    }

    let has_other_leader = snapshot
        .members_of(group)
        .any(|member| member.username != username && member.is_leader);

    let actor = snapshot
        .get_mut(username)
        .ok_or_else(|| MembershipError::UserNotFound {
            username: username.to_string(),
        })?;

    if actor.in_group(group) {
        debug!(username, group, "User already in group; nothing to do");
        return Ok(snapshot);
    }

    let previous_group = actor.group.replace(group.to_string());
    let was_leader = actor.is_leader;
    actor.is_leader = !has_other_leader;

    info!(
        username,
        group,
        leader = actor.is_leader,
        previous = previous_group.as_deref().unwrap_or("-"),
        "User joined group"
    );

    if let Some(previous) = previous_group
        && was_leader
    {
        promote_successor(&mut snapshot, &previous, username, selector);
    }

    Ok(snapshot)
}

/// Drop the Spotify link of `username`.
///
/// Clears the token, the Spotify username, the current track, the leader flag and the group
/// membership. The last-known device is kept. If the user led their group, a remaining member is
/// promoted through `selector`.
///
/// # Errors
/// - [`MembershipError::UserNotFound`] if `username` has no record
pub fn unlink_identity(
    mut snapshot: Snapshot,
    username: &str,
    selector: &dyn LeaderSelector,
) -> Result<Snapshot> {
    let actor = snapshot
        .get_mut(username)
        .ok_or_else(|| MembershipError::UserNotFound {
            username: username.to_string(),
        })?;

    let was_leader = actor.is_leader;
    let previous_group = actor.group.take();
    actor.spotify_token = None;
    actor.spotify_username = None;
    actor.current_track = None;
    actor.is_leader = false;

    info!(
        username,
        previous = previous_group.as_deref().unwrap_or("-"),
        "Spotify account unlinked"
    );

    if let Some(previous) = previous_group
        && was_leader
    {
        promote_successor(&mut snapshot, &previous, username, selector);
    }

    Ok(snapshot)
}

/// Promote one member of `group` other than `departing`, unless the group already has a leader
/// or is empty.
fn promote_successor(
    snapshot: &mut Snapshot,
    group: &str,
    departing: &str,
    selector: &dyn LeaderSelector,
) {
    let candidates: Vec<String> = snapshot
        .members_of(group)
        .filter(|member| member.username != departing)
        .map(|member| member.username.clone())
        .collect();

    if candidates.is_empty() {
        debug!(group, "Group left empty; no leader to promote");
        return;
    }
    if let Some(leader) = snapshot.leader_of(group) {
        debug!(group, leader = %leader.username, "Group already has a leader");
        return;
    }

    let chosen = candidates[selector.pick(candidates.len())].clone();
    if let Some(record) = snapshot.get_mut(&chosen) {
        record.is_leader = true;
    }
    info!(group, leader = %chosen, previous = departing, "Promoted new group leader");
}
