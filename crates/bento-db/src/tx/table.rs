//! # Table Deletion Guard
//!
//! Deleting a dining table is blocked while future reservations exist
//! against it; otherwise tag links and the table row go together.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::table;
use bento_core::CoreError;

/// Result of [`Database::delete_table`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTableOutcome {
    pub table_id: String,

    /// Tag links removed alongside the table.
    pub tag_links_removed: u64,

    /// False when no table row existed; deleting a missing table is
    /// still success.
    pub table_removed: bool,
}

impl Database {
    /// Deletes a dining table and its tag links.
    ///
    /// ## Errors
    /// * `TableHasReservations` - one or more reservations at or after
    ///   now still reference the table; nothing is deleted
    pub async fn delete_table(&self, table_id: String) -> DbResult<DeleteTableOutcome> {
        self.within_tx(move |tx| {
            Box::pin(async move {
                let now = Utc::now();

                let pending = table::count_future_reservations(&mut *tx, &table_id, now).await?;
                if pending > 0 {
                    return Err(CoreError::TableHasReservations {
                        table_id,
                        count: pending,
                    }
                    .into());
                }

                let tag_links_removed = table::delete_tag_links(&mut *tx, &table_id).await?;
                let rows = table::delete(&mut *tx, &table_id).await?;

                info!(
                    table_id = %table_id,
                    tag_links_removed,
                    "Deleted dining table"
                );

                Ok(DeleteTableOutcome {
                    table_id,
                    tag_links_removed,
                    table_removed: rows > 0,
                })
            })
        })
        .await
    }
}
