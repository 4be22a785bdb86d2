//! Helpers shared by the repository implementations.

use crate::dao::{Document, DocumentPath, DocumentStore, Fields, WriteOp};
use crate::traits::ToggleOutcome;
use agora_core::{AgoraError, AgoraResult, CursorPage, CursorRequest};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes up to `page.fetch_limit()` documents into a page keyed by document id.
pub(crate) fn decode_page<T: DeserializeOwned>(
    docs: Vec<Document>,
    page: &CursorRequest,
) -> AgoraResult<CursorPage<T>> {
    let items = docs
        .into_iter()
        .map(|doc| Ok((doc.id().to_string(), doc.decode::<T>()?)))
        .collect::<AgoraResult<Vec<(String, T)>>>()?;
    Ok(CursorPage::from_fetched(items, page.limit(), |(id, _)| id.clone()).map(|(_, item)| item))
}

/// Decodes every present document, dropping missing ones.
pub(crate) fn decode_present<T: DeserializeOwned>(docs: Vec<Option<Document>>) -> AgoraResult<Vec<T>> {
    docs.into_iter().flatten().map(|doc| doc.decode()).collect()
}

/// Epoch milliseconds as a document value.
pub(crate) fn millis(at: DateTime<Utc>) -> Value {
    Value::from(at.timestamp_millis())
}

/// A marker toggle: the marker document and the parent counter it drives.
pub(crate) struct Toggle<'a> {
    pub parent: DocumentPath,
    pub counter: &'a str,
    pub marker: DocumentPath,
    pub marker_fields: Fields,
    pub not_found: fn() -> AgoraError,
}

impl Toggle<'_> {
    /// Flips the marker and moves the counter in one transaction.
    ///
    /// `extra` returns further writes for the new state (for example the
    /// saver's denormalized saved entry); it sees the parent document.
    pub(crate) async fn run<F>(self, store: &dyn DocumentStore, extra: F) -> AgoraResult<ToggleOutcome>
    where
        F: FnOnce(bool, &Document) -> AgoraResult<Vec<WriteOp>> + Send,
    {
        let mut tx = store.begin().await?;
        let parent = tx.get(&self.parent).await?.ok_or_else(self.not_found)?;
        let marker = tx.get(&self.marker).await?;
        let current = parent.get_i64(self.counter);

        let outcome = if marker.is_some() {
            tx.write(WriteOp::delete(self.marker));
            tx.write(WriteOp::increment(self.parent, self.counter, -1));
            ToggleOutcome {
                active: false,
                count: (current - 1).max(0),
            }
        } else {
            tx.write(WriteOp::Set {
                path: self.marker,
                fields: self.marker_fields,
            });
            tx.write(WriteOp::increment(self.parent, self.counter, 1));
            ToggleOutcome {
                active: true,
                count: current + 1,
            }
        };

        for op in extra(outcome.active, &parent)? {
            tx.write(op);
        }
        tx.commit().await?;
        Ok(outcome)
    }
}
