// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Batch Hydrator: resolves many vote records in one logical call.

use std::collections::{BTreeMap, BTreeSet};

use newsvote_domain::{ArticleId, VoteRecord};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::store::{BatchRecords, VoteStore};

/// The outcome of a batch read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hydration {
    /// One record per requested id. Failed fetches hold the zero record.
    pub records: BTreeMap<ArticleId, VoteRecord>,
    /// Ids whose fetch failed and were given the zero record.
    pub failed: BTreeSet<ArticleId>,
}

/// Fetches the records for `ids` in one store call.
///
/// Duplicate ids collapse to a single key. A fetch that fails is replaced
/// by the zero record and the batch carries on.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if more than `max_batch_size` distinct
/// ids are requested. No fetch is issued in that case.
pub async fn hydrate<S: VoteStore>(
    store: &S,
    ids: &[ArticleId],
    max_batch_size: usize,
) -> Result<Hydration, ApiError> {
    let unique: BTreeSet<ArticleId> = ids.iter().cloned().collect();

    if unique.len() > max_batch_size {
        return Err(ApiError::InvalidInput {
            field: String::from("article_ids"),
            message: format!(
                "Batch of {} article ids exceeds the limit of {max_batch_size}",
                unique.len()
            ),
        });
    }

    Ok(fetch_all(store, unique).await)
}

/// Fetches every id without a size check.
///
/// A failed id, or a failed batch, leaves zero records in `records` and the
/// affected ids in `failed`.
pub(crate) async fn fetch_all<S: VoteStore>(store: &S, ids: BTreeSet<ArticleId>) -> Hydration {
    debug!(count = ids.len(), "Hydrating vote records");

    let mut hydration: Hydration = Hydration::default();
    if ids.is_empty() {
        return hydration;
    }

    let mut results: BatchRecords = match store.get_vote_records(&ids).await {
        Ok(results) => results,
        Err(err) => {
            warn!(count = ids.len(), error = %err, "Batch vote fetch failed; using zero records");
            hydration.records = ids.iter().map(|id| (id.clone(), VoteRecord::zero())).collect();
            hydration.failed = ids;
            return hydration;
        }
    };

    for id in ids {
        match results.remove(&id) {
            Some(Ok(record)) => {
                hydration.records.insert(id, record);
            }
            Some(Err(err)) => {
                warn!(article_id = %id, error = %err, "Vote fetch failed; using zero record");
                hydration.records.insert(id.clone(), VoteRecord::zero());
                hydration.failed.insert(id);
            }
            None => {
                warn!(article_id = %id, "Store omitted a requested id; using zero record");
                hydration.records.insert(id.clone(), VoteRecord::zero());
                hydration.failed.insert(id);
            }
        }
    }

    hydration
}
