//! Contracts of the external collaborators: the document store and the
//! server-side function runner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    DocketError, DocumentHeader, DocumentKind, DocumentTotals, LineItem, TenantContext,
};

/// Errors reported by a [`DocumentStore`] or [`FunctionInvoker`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the conflicting number.
    #[error("unique constraint violated for {0}")]
    UniqueViolation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Network, permission or other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for DocketError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(number) => DocketError::UniquenessConflict(number),
            other => DocketError::Persistence(other.to_string()),
        }
    }
}

/// Everything a save writes: header, item rows and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub kind: DocumentKind,
    pub number: String,
    pub header: DocumentHeader,
    pub items: Vec<LineItem>,
    /// Informational; readers recompute totals from `items`.
    pub totals: DocumentTotals,
}

/// A persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub scope_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: DocumentRecord,
}

/// Persistence collaborator for documents.
///
/// Implementations must make each write atomic: a header and its item rows
/// are stored together or not at all, and `update` replaces the item rows in
/// the same transaction as the header. `(scope_key, number)` is unique.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Number of the most recently created document of `kind` in the tenant's
    /// scope whose number starts with `prefix`.
    async fn latest_number(
        &self,
        tenant: &TenantContext,
        kind: DocumentKind,
        prefix: &str,
    ) -> Result<Option<String>, StoreError>;

    async fn fetch(&self, tenant: &TenantContext, id: &str) -> Result<StoredDocument, StoreError>;

    /// Insert header and items. When `record.header.source` is set, the
    /// source document is marked converted in the same write.
    async fn insert(
        &self,
        tenant: &TenantContext,
        record: &DocumentRecord,
    ) -> Result<StoredDocument, StoreError>;

    /// Replace header and item rows of an existing document.
    async fn update(
        &self,
        tenant: &TenantContext,
        id: &str,
        record: &DocumentRecord,
    ) -> Result<StoredDocument, StoreError>;
}

/// Runs privileged server-side functions (vendor notification, email,
/// WhatsApp, ...).
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(
        &self,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, StoreError>;
}
