//! Group membership and leadership
//!
//! Users belong to at most one group at a time. Within a group exactly one member is leader as
//! soon as the group is non-empty. The functions here compute the next snapshot for each event and
//! never perform I/O; [`crate::Hub`] wraps them in a locked load/persist cycle.

pub mod catalog;
pub mod engine;
pub mod errors;
pub mod selector;
pub mod summary;

pub use catalog::{DEFAULT_GROUPS, GroupCatalog};
pub use engine::{join_group, unlink_identity};
pub use errors::MembershipError;
pub use selector::{LeaderSelector, RandomSelector, SeededSelector};
pub use summary::{GroupSummary, MemberView, group_members, list_group_summary};
