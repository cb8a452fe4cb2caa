//! Bounded fan-out over principals and ordered merge of the results

use std::future::Future;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use keyturn_common::{InventoryItem, Principal};
use tracing::debug;

/// Run `fetch` once per principal, at most `concurrency` at a time.
///
/// Results land in one slot per principal, in input order, and are only
/// inspected after every fetch has finished. The first failing slot fails
/// the whole inventory. Surviving items come back sorted by principal name,
/// strictly descending.
pub async fn aggregate<F, Fut>(
    principals: Vec<Principal>,
    concurrency: usize,
    fetch: F,
) -> Result<Vec<InventoryItem>>
where
    F: Fn(Principal) -> Fut,
    Fut: Future<Output = Result<Option<InventoryItem>>>,
{
    let total = principals.len();
    let slots: Vec<(String, Result<Option<InventoryItem>>)> = stream::iter(principals)
        .map(|principal| {
            let name = principal.name.clone();
            let fut = fetch(principal);
            async move { (name, fut.await) }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut items = Vec::with_capacity(total);
    for (name, slot) in slots {
        match slot {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => return Err(e.context(format!("Inventory failed at principal {name}"))),
        }
    }

    items.sort_by(|a, b| b.principal_name().cmp(a.principal_name()));
    items.dedup_by(|a, b| a.principal_name() == b.principal_name());

    debug!(principals = total, items = items.len(), "Aggregated inventory");
    Ok(items)
}
