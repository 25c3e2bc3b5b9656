use std::collections::HashSet;
use std::sync::Arc;

use crate::db::store::{Store, StoreError, TourQuery};
use crate::models::destination::Destination;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub attached: usize,
    pub detached: usize,
    /// Listed ids with no matching tour for the tenant.
    pub missing: Vec<String>,
}

/// Point every listed tour at the destination and detach tours no longer listed.
pub async fn sync_tour_relationships(
    store: &dyn Store,
    tenant: &str,
    destination: &Destination,
) -> Result<SyncReport, StoreError> {
    let mut report = SyncReport::default();
    let reference = destination.reference();
    let listed: HashSet<&str> = destination.tour_ids.iter().map(String::as_str).collect();

    for tour_id in &destination.tour_ids {
        if store
            .set_tour_destination(tenant, tour_id, Some(&reference))
            .await?
        {
            report.attached += 1;
        } else {
            report.missing.push(tour_id.clone());
        }
    }

    let linked = store
        .list_tours(
            tenant,
            &TourQuery {
                destination_id: Some(destination.id.clone()),
                ..Default::default()
            },
        )
        .await?;
    for tour in linked.iter().filter(|t| !listed.contains(t.id.as_str())) {
        if store.set_tour_destination(tenant, &tour.id, None).await? {
            report.detached += 1;
        }
    }

    Ok(report)
}

/// Remove the destination reference from every tour that carries it.
pub async fn detach_all(
    store: &dyn Store,
    tenant: &str,
    destination_id: &str,
) -> Result<usize, StoreError> {
    let linked = store
        .list_tours(
            tenant,
            &TourQuery {
                destination_id: Some(destination_id.to_string()),
                ..Default::default()
            },
        )
        .await?;

    let mut detached = 0;
    for tour in &linked {
        if store.set_tour_destination(tenant, &tour.id, None).await? {
            detached += 1;
        }
    }
    Ok(detached)
}

/// Fire-and-forget sync after a destination save. Failures are only logged.
pub fn spawn_tour_sync(store: Arc<dyn Store>, tenant: String, destination: Destination) {
    tokio::spawn(async move {
        match sync_tour_relationships(store.as_ref(), &tenant, &destination).await {
            Ok(report) => {
                log::info!(
                    "Synced destination {}: {} attached, {} detached",
                    destination.slug,
                    report.attached,
                    report.detached
                );
                if !report.missing.is_empty() {
                    log::warn!(
                        "Destination {} lists unknown tours: {:?}",
                        destination.slug,
                        report.missing
                    );
                }
            }
            Err(e) => log::error!(
                "Failed to sync tours for destination {}: {}",
                destination.slug,
                e
            ),
        }
    });
}

/// Fire-and-forget detach after a destination delete.
pub fn spawn_detach(store: Arc<dyn Store>, tenant: String, destination_id: String) {
    tokio::spawn(async move {
        match detach_all(store.as_ref(), &tenant, &destination_id).await {
            Ok(count) => log::info!(
                "Detached {} tours from deleted destination {}",
                count,
                destination_id
            ),
            Err(e) => log::error!(
                "Failed to detach tours from destination {}: {}",
                destination_id,
                e
            ),
        }
    });
}
