use std::sync::Arc;

use chrono::{Datelike, Local};
use tracing::{info, warn};

use super::store::DocumentStore;
use crate::core::{
    DEFAULT_SEQUENCE_WIDTH, DocketError, DocumentKind, DocumentNumber, TenantContext,
    trailing_sequence,
};

/// Derives the next document number from the latest stored one.
///
/// Numbers are per scope, kind and year: `ORD-2025-0010` follows
/// `ORD-2025-0009`, and the first order of 2026 is `ORD-2026-0001`.
/// Nothing is reserved; the store's unique constraint and the draft's retry
/// loop settle races between concurrent drafts.
#[derive(Clone)]
pub struct SequenceAllocator {
    store: Arc<dyn DocumentStore>,
    width: usize,
}

impl SequenceAllocator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            width: DEFAULT_SEQUENCE_WIDTH,
        }
    }

    /// Set zero-padding width (default: 4).
    pub fn with_padding(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// The number after the latest `{PREFIX}-{year}-…` document in the
    /// tenant's scope, or sequence 1 if there is none.
    pub async fn next_number(
        &self,
        kind: DocumentKind,
        tenant: &TenantContext,
        year: i32,
    ) -> Result<DocumentNumber, DocketError> {
        let prefix = DocumentNumber::scope_prefix(kind, year);
        let latest = self
            .store
            .latest_number(tenant, kind, &prefix)
            .await
            .map_err(|e| DocketError::Allocation(e.to_string()))?;

        let sequence = match latest.as_deref() {
            None => 1,
            Some(number) => match trailing_sequence(number) {
                Some(seq) => seq.saturating_add(1),
                None => {
                    warn!(
                        scope = %tenant.scope_key,
                        latest = number,
                        "latest number has no usable numeric suffix, restarting at 1"
                    );
                    1
                }
            },
        };

        let number = DocumentNumber::new(kind, year, sequence).with_padding(self.width);
        info!(scope = %tenant.scope_key, number = %number, "document number allocated");
        Ok(number)
    }

    /// [`next_number`](Self::next_number) for the current local year.
    pub async fn next_number_today(
        &self,
        kind: DocumentKind,
        tenant: &TenantContext,
    ) -> Result<DocumentNumber, DocketError> {
        self.next_number(kind, tenant, Local::now().year()).await
    }

    /// A fresh number strictly after `conflicting`, which the store just
    /// rejected as taken.
    pub async fn next_after(
        &self,
        kind: DocumentKind,
        tenant: &TenantContext,
        year: i32,
        conflicting: &str,
    ) -> Result<DocumentNumber, DocketError> {
        let candidate = self.next_number(kind, tenant, year).await?;
        let floor = trailing_sequence(conflicting)
            .map(|s| s.saturating_add(1))
            .unwrap_or(1);
        if candidate.sequence() >= floor {
            return Ok(candidate);
        }
        Ok(DocumentNumber::new(kind, year, floor).with_padding(self.width))
    }
}
