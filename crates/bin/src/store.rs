//! Record store and hub creation from command-line configuration.

use std::{path::Path, sync::Arc, time::Duration};

use yspotify::{
    GroupCatalog, Hub, SeededSelector,
    store::{InMemoryStore, JsonFileStore, RecordStore},
};

use crate::cli::{ServeArgs, StoreKind};

/// Create the record store selected by `kind`
pub async fn create_store(
    kind: StoreKind,
    users_file: &Path,
) -> Result<Arc<dyn RecordStore>, Box<dyn std::error::Error>> {
    match kind {
        StoreKind::Json => {
            tracing::info!("Using JSON record store at {}", users_file.display());
            if let Some(parent) = users_file.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            let store = JsonFileStore::new(users_file);

            // Fail at startup rather than on the first request.
            let snapshot = store.load().await?;
            tracing::info!("Loaded {} user records", snapshot.len());
            Ok(Arc::new(store))
        }
        StoreKind::Inmemory => {
            tracing::info!("Using in-memory record store; nothing survives a restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

/// Build the hub for the serve command
pub async fn create_hub(args: &ServeArgs) -> Result<Hub, Box<dyn std::error::Error>> {
    let store = create_store(args.store, &args.users_file).await?;
    let catalog = GroupCatalog::new(&args.groups.names);
    if catalog.names().is_empty() {
        return Err("at least one group name is required".into());
    }

    let snapshot = store.load().await?;
    for group in snapshot.leaderless_groups() {
        tracing::warn!(group, "Group has members but no leader");
    }
    for violation in snapshot.violations() {
        tracing::warn!("Record file breaks an invariant: {violation}");
    }

    let mut hub = Hub::new(store, catalog)
        .with_identity_timeout(Duration::from_secs(args.identity_timeout));
    if let Some(seed) = args.seed {
        tracing::info!(seed, "Using seeded leader selection");
        hub = hub.with_selector(Arc::new(SeededSelector::new(seed)));
    }
    Ok(hub)
}
