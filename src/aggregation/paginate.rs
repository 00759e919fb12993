//! Pagination executor
//!
//! Runs a pipeline twice: once with a trailing count stage for the total,
//! once with skip/limit for the page itself. The total never depends on the
//! requested page.

use crate::core::error::StoreError;
use crate::core::query::{Page, PageRequest, PaginationMeta};
use crate::storage::{DocumentStore, Pipeline};
use serde::de::DeserializeOwned;

const TOTAL_FIELD: &str = "total";

/// Number of rows a pipeline produces
pub async fn count_rows(
    store: &dyn DocumentStore,
    collection: &str,
    pipeline: &Pipeline,
) -> Result<u64, StoreError> {
    let rows = store
        .aggregate(collection, &pipeline.counted(TOTAL_FIELD))
        .await?;

    Ok(rows
        .first()
        .and_then(|row| row.get(TOTAL_FIELD))
        .and_then(|total| total.as_u64())
        .unwrap_or(0))
}

/// Execute one page of `pipeline` and decode the rows as `T`
pub async fn paginate<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    pipeline: &Pipeline,
    request: PageRequest,
) -> Result<Page<T>, StoreError> {
    let total = count_rows(store, collection, pipeline).await?;

    let rows = store
        .aggregate(collection, &pipeline.paged(request.skip(), request.limit))
        .await?;

    let docs = rows
        .into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| StoreError::serialization(collection, e))
        })
        .collect::<Result<Vec<T>, _>>()?;

    tracing::debug!(
        collection,
        page = request.page,
        limit = request.limit,
        total,
        returned = docs.len(),
        "paginated"
    );

    Ok(Page::new(docs, PaginationMeta::new(request, total)))
}
