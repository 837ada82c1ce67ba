//! Request-level operations over a shared record store
//!
//! [`Hub`] is the one owner of the record store in a running service. Every mutating operation
//! holds its writer lock across the whole load → compute → persist cycle, so two requests can
//! never interleave and overwrite each other's changes. Reads go straight to the store.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    Error, Result,
    account::{self, AccountError},
    identity::{IdentityError, IdentityProvider},
    membership::{
        self, GroupCatalog, GroupSummary, LeaderSelector, MemberView, MembershipError,
        RandomSelector,
    },
    record::{Device, Snapshot, Track, UserRecord},
    session::SessionUser,
    store::RecordStore,
};

/// Default upper bound for each identity adapter call during sign-in.
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a successful sign-in.
#[derive(Clone, Debug, PartialEq)]
pub struct SignIn {
    /// Session projection of the user after identity sync
    pub session: SessionUser,
    /// Spotify rejected the stored token; the user should link their account again
    pub relink_required: bool,
}

/// Coordinates all reads and writes of the record set.
#[derive(Debug)]
pub struct Hub {
    store: Arc<dyn RecordStore>,
    writer: Mutex<()>,
    selector: Arc<dyn LeaderSelector>,
    catalog: GroupCatalog,
    identity_timeout: Duration,
}

/// What a sign-in learned from Spotify.
#[derive(Default)]
struct IdentityUpdate {
    display_name: Option<String>,
    device: Option<Device>,
    track: Option<Track>,
}

impl IdentityUpdate {
    fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.device.is_none() && self.track.is_none()
    }

    fn apply(self, record: &mut UserRecord) {
        if let Some(name) = self.display_name {
            record.spotify_username = Some(name);
        }
        if let Some(device) = self.device {
            record.active_device = Some(device);
        }
        if let Some(track) = self.track {
            record.current_track = Some(track);
        }
    }
}

impl Hub {
    /// Create a hub over `store` offering the groups in `catalog`.
    ///
    /// Leaders are re-elected with [`RandomSelector`] unless [`Hub::with_selector`] says otherwise.
    pub fn new(store: Arc<dyn RecordStore>, catalog: GroupCatalog) -> Self {
        Self {
            store,
            writer: Mutex::new(()),
            selector: Arc::new(RandomSelector),
            catalog,
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }

    /// Replace the leader selector.
    pub fn with_selector(mut self, selector: Arc<dyn LeaderSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Bound each identity adapter call made during sign-in.
    pub fn with_identity_timeout(mut self, timeout: Duration) -> Self {
        self.identity_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &GroupCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Latest persisted record set. Does not wait for in-flight mutations.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.store.load().await
    }

    /// Run one locked read-compute-write cycle.
    ///
    /// Nothing is written if `compute` fails, if the result equals what was read, or if the result
    /// breaks a record invariant that held in what was read.
    async fn mutate<F>(&self, operation: &'static str, compute: F) -> Result<Snapshot>
    where
        F: FnOnce(Snapshot) -> Result<Snapshot>,
    {
        let _guard = self.writer.lock().await;

        let current = self.store.load().await?;
        let next = compute(current.clone())?;
        if next == current {
            debug!(operation, "No change to persist");
            return Ok(next);
        }
        next.validate_against(&current)?;

        if let Err(e) = self.store.persist(&next).await {
            error!(operation, store = %self.store.describe(), "Failed to persist records: {e}");
            return Err(e);
        }
        Ok(next)
    }

    /// Create an account and return its session projection.
    ///
    /// # Errors
    /// - [`AccountError::MissingCredentials`] if either field is empty
    /// - [`AccountError::UsernameTaken`] if the username is in use
    pub async fn signup(&self, username: &str, password: &str) -> Result<SessionUser> {
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials.into());
        }
        let password_hash = account::hash_password(password)?;

        let snapshot = self
            .mutate("signup", |mut snapshot| {
                if snapshot.contains(username) {
                    return Err(AccountError::UsernameTaken {
                        username: username.to_string(),
                    }
                    .into());
                }
                snapshot.insert(UserRecord::new(username, password_hash))?;
                Ok(snapshot)
            })
            .await?;

        info!(username, "Created new user");
        project(&snapshot, username)
    }

    /// Check credentials against the latest persisted records.
    ///
    /// Unknown usernames and wrong passwords fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserRecord> {
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials.into());
        }
        let snapshot = self.store.load().await?;
        let record = snapshot
            .get(username)
            .ok_or(AccountError::InvalidCredentials)?;
        account::verify_password(password, &record.password_hash)?;
        Ok(record.clone())
    }

    /// Authenticate, then refresh the user's Spotify state.
    ///
    /// Identity calls run concurrently outside the writer lock, each bounded by the identity
    /// timeout. Any of them may fail without failing the sign-in: successful results are stored,
    /// failures keep the previously stored values. A rejected token sets
    /// [`SignIn::relink_required`] and leaves the token in place.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
        identity: &dyn IdentityProvider,
    ) -> Result<SignIn> {
        let record = self.authenticate(username, password).await?;
        self.sync_identity(record, identity).await
    }

    /// Refresh the Spotify state of an already authenticated user, as [`Hub::sign_in`] does.
    pub async fn refresh_identity(
        &self,
        username: &str,
        identity: &dyn IdentityProvider,
    ) -> Result<SignIn> {
        let snapshot = self.store.load().await?;
        let record = snapshot
            .get(username)
            .cloned()
            .ok_or_else(|| MembershipError::UserNotFound {
                username: username.to_string(),
            })?;
        self.sync_identity(record, identity).await
    }

    async fn sync_identity(
        &self,
        record: UserRecord,
        identity: &dyn IdentityProvider,
    ) -> Result<SignIn> {
        let username = record.username.as_str();
        let Some(token) = record.spotify_token.clone() else {
            debug!(username, "No linked Spotify account; skipping identity sync");
            return Ok(SignIn {
                session: SessionUser::from(&record),
                relink_required: false,
            });
        };

        let timeout = self.identity_timeout;
        let (name, device, track) = tokio::join!(
            bounded(timeout, "display name", identity.fetch_display_name(&token)),
            bounded(timeout, "active device", identity.fetch_active_device(&token)),
            bounded(timeout, "current track", identity.fetch_current_track(&token)),
        );

        let relink_required = [name.as_ref().err(), device.as_ref().err(), track.as_ref().err()]
            .into_iter()
            .flatten()
            .any(Error::is_unauthorized);
        for err in [name.as_ref().err(), device.as_ref().err(), track.as_ref().err()]
            .into_iter()
            .flatten()
        {
            match err {
                Error::Identity(IdentityError::NoActiveDevice) => {
                    debug!(username, "No active Spotify device")
                }
                _ => warn!(username, "Spotify sync step failed: {err}"),
            }
        }

        let update = IdentityUpdate {
            display_name: name.ok(),
            device: device.ok(),
            track: track.ok().flatten(),
        };
        if update.is_empty() {
            return Ok(SignIn {
                session: SessionUser::from(&record),
                relink_required,
            });
        }

        let snapshot = self
            .mutate("sync_identity", |mut snapshot| {
                match snapshot.get_mut(username) {
                    Some(current) if current.spotify_token.as_deref() == Some(token.as_str()) => {
                        update.apply(current)
                    }
                    // Unlinked or relinked while we were talking to Spotify.
                    Some(_) => debug!(username, "Token changed during sync; discarding results"),
                    None => {
                        return Err(MembershipError::UserNotFound {
                            username: username.to_string(),
                        }
                        .into());
                    }
                }
                Ok(snapshot)
            })
            .await?;

        Ok(SignIn {
            session: project(&snapshot, username)?,
            relink_required,
        })
    }

    /// Store a freshly obtained Spotify token for `username`.
    pub async fn link_identity(&self, username: &str, token: &str) -> Result<SessionUser> {
        let snapshot = self
            .mutate("link_identity", |mut snapshot| {
                let record =
                    snapshot
                        .get_mut(username)
                        .ok_or_else(|| MembershipError::UserNotFound {
                            username: username.to_string(),
                        })?;
                record.spotify_token = Some(token.to_string());
                Ok(snapshot)
            })
            .await?;
        info!(username, "Spotify account linked");
        project(&snapshot, username)
    }

    /// Drop the Spotify link, the group membership and any leadership of `username`.
    pub async fn unlink_identity(&self, username: &str) -> Result<SessionUser> {
        let selector = self.selector.as_ref();
        let snapshot = self
            .mutate("unlink_identity", |snapshot| {
                membership::unlink_identity(snapshot, username, selector)
            })
            .await?;
        project(&snapshot, username)
    }

    /// Move `username` into `group`, transferring leadership as needed.
    ///
    /// # Errors
    /// - [`MembershipError::EmptyGroupName`] / [`MembershipError::UnknownGroup`] for bad names
    /// - [`MembershipError::UserNotFound`] if the user has no record
    pub async fn join_group(&self, username: &str, group: &str) -> Result<SessionUser> {
        self.catalog.check(group)?;
        let selector = self.selector.as_ref();
        let snapshot = self
            .mutate("join_group", |snapshot| {
                membership::join_group(snapshot, username, group, selector)
            })
            .await?;
        project(&snapshot, username)
    }

    /// Per-group counts and leadership from the point of view of `username`.
    pub async fn group_summary(&self, username: &str) -> Result<Vec<GroupSummary>> {
        let snapshot = self.store.load().await?;
        Ok(membership::list_group_summary(
            &snapshot,
            &self.catalog,
            username,
        ))
    }

    /// Members of a catalog group, sorted by username.
    pub async fn group_members(&self, group: &str) -> Result<Vec<MemberView>> {
        self.catalog.check(group)?;
        let snapshot = self.store.load().await?;
        Ok(membership::group_members(&snapshot, group))
    }

    /// Current session projection of `username`.
    pub async fn session_for(&self, username: &str) -> Result<SessionUser> {
        let snapshot = self.store.load().await?;
        project(&snapshot, username)
    }
}

fn project(snapshot: &Snapshot, username: &str) -> Result<SessionUser> {
    snapshot
        .get(username)
        .map(SessionUser::from)
        .ok_or_else(|| {
            MembershipError::UserNotFound {
                username: username.to_string(),
            }
            .into()
        })
}

async fn bounded<T>(
    timeout: Duration,
    endpoint: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, call).await.unwrap_or_else(|_| {
        Err(IdentityError::Timeout {
            endpoint: endpoint.to_string(),
            timeout,
        }
        .into())
    })
}
