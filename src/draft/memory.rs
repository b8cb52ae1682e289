//! In-process store and function runner with failure injection.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::store::{DocumentRecord, DocumentStore, FunctionInvoker, StoreError, StoredDocument};
use crate::core::{DocumentKind, DocumentStatus, TenantContext};

/// Store operation to fail on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Read,
    Insert,
    Update,
}

#[derive(Debug, Default)]
struct Inner {
    /// Creation order.
    docs: Vec<StoredDocument>,
    failing: HashSet<StoreOp>,
}

/// A [`DocumentStore`] backed by a vector, enforcing the same uniqueness and
/// atomicity rules as the hosted database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail with a backend error until cleared.
    pub async fn fail(&self, op: StoreOp) {
        self.inner.lock().await.failing.insert(op);
    }

    pub async fn clear_failures(&self) {
        self.inner.lock().await.failing.clear();
    }

    /// Number of stored documents across all scopes.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.docs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Inner {
    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.failing.contains(&op) {
            return Err(StoreError::Backend(format!("{op:?} unavailable")));
        }
        Ok(())
    }

    fn number_taken(&self, scope: &str, number: &str, except_id: Option<&str>) -> bool {
        self.docs.iter().any(|d| {
            d.scope_key == scope && d.record.number == number && Some(d.id.as_str()) != except_id
        })
    }

    fn position(&self, scope: &str, id: &str) -> Result<usize, StoreError> {
        self.docs
            .iter()
            .position(|d| d.scope_key == scope && d.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("document {id}")))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn latest_number(
        &self,
        tenant: &TenantContext,
        kind: DocumentKind,
        prefix: &str,
    ) -> Result<Option<String>, StoreError> {
        let inner = self.inner.lock().await;
        inner.check(StoreOp::Read)?;
        Ok(inner
            .docs
            .iter()
            .rev()
            .find(|d| {
                d.scope_key == tenant.scope_key
                    && d.record.kind == kind
                    && d.record.number.starts_with(prefix)
            })
            .map(|d| d.record.number.clone()))
    }

    async fn fetch(&self, tenant: &TenantContext, id: &str) -> Result<StoredDocument, StoreError> {
        let inner = self.inner.lock().await;
        inner.check(StoreOp::Read)?;
        let pos = inner.position(&tenant.scope_key, id)?;
        Ok(inner.docs[pos].clone())
    }

    async fn insert(
        &self,
        tenant: &TenantContext,
        record: &DocumentRecord,
    ) -> Result<StoredDocument, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check(StoreOp::Insert)?;
        if inner.number_taken(&tenant.scope_key, &record.number, None) {
            return Err(StoreError::UniqueViolation(record.number.clone()));
        }
        let source_pos = match &record.header.source {
            Some(link) => Some(inner.position(&tenant.scope_key, &link.id)?),
            None => None,
        };

        let now = Utc::now();
        let stored = StoredDocument {
            id: Uuid::new_v4().to_string(),
            scope_key: tenant.scope_key.clone(),
            created_at: now,
            updated_at: now,
            record: record.clone(),
        };
        if let Some(pos) = source_pos {
            let source = &mut inner.docs[pos];
            source.record.header.status = DocumentStatus::Converted;
            source.updated_at = now;
        }
        debug!(id = %stored.id, number = %record.number, items = record.items.len(), "document inserted");
        inner.docs.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        tenant: &TenantContext,
        id: &str,
        record: &DocumentRecord,
    ) -> Result<StoredDocument, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check(StoreOp::Update)?;
        let pos = inner.position(&tenant.scope_key, id)?;
        if inner.number_taken(&tenant.scope_key, &record.number, Some(id)) {
            return Err(StoreError::UniqueViolation(record.number.clone()));
        }
        let doc = &mut inner.docs[pos];
        doc.record = record.clone();
        doc.updated_at = Utc::now();
        debug!(id, number = %record.number, items = record.items.len(), "document items replaced");
        Ok(doc.clone())
    }
}

/// A [`FunctionInvoker`] that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    failing: Mutex<bool>,
}

impl RecordingInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    /// Calls received so far, including failed ones.
    pub async fn calls(&self) -> Vec<(String, serde_json::Value)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl FunctionInvoker for RecordingInvoker {
    async fn invoke(
        &self,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, StoreError> {
        self.calls.lock().await.push((name.to_string(), payload));
        if *self.failing.lock().await {
            return Err(StoreError::Backend(format!("function {name} failed")));
        }
        Ok(serde_json::json!({ "ok": true }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DocumentHeader, DocumentTotals, LineItemBuilder, SourceLink};
    use rust_decimal_macros::dec;

    fn record(kind: DocumentKind, number: &str) -> DocumentRecord {
        DocumentRecord {
            kind,
            number: number.to_string(),
            header: DocumentHeader::default(),
            items: vec![LineItemBuilder::new("Cable", dec!(2), dec!(10)).build()],
            totals: DocumentTotals::default(),
        }
    }

    #[tokio::test]
    async fn numbers_are_unique_per_scope() {
        let store = MemoryStore::new();
        let north = TenantContext::new("north");
        let south = TenantContext::new("south");
        store.insert(&north, &record(DocumentKind::Order, "ORD-2025-0001")).await.unwrap();
        store.insert(&south, &record(DocumentKind::Order, "ORD-2025-0001")).await.unwrap();
        let err = store
            .insert(&north, &record(DocumentKind::Order, "ORD-2025-0001"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::UniqueViolation("ORD-2025-0001".into()));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn latest_number_is_scoped() {
        let store = MemoryStore::new();
        let north = TenantContext::new("north");
        store.insert(&north, &record(DocumentKind::Order, "ORD-2025-0001")).await.unwrap();
        store.insert(&north, &record(DocumentKind::Quotation, "QUO-2025-0005")).await.unwrap();
        store.insert(&north, &record(DocumentKind::Order, "ORD-2025-0002")).await.unwrap();

        let latest = store
            .latest_number(&north, DocumentKind::Order, "ORD-2025-")
            .await
            .unwrap();
        assert_eq!(latest.as_deref(), Some("ORD-2025-0002"));
        let none = store
            .latest_number(&TenantContext::new("south"), DocumentKind::Order, "ORD-2025-")
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn failed_update_changes_nothing() {
        let store = MemoryStore::new();
        let tenant = TenantContext::new("north");
        let saved = store.insert(&tenant, &record(DocumentKind::Order, "ORD-2025-0001")).await.unwrap();

        store.fail(StoreOp::Update).await;
        let mut changed = record(DocumentKind::Order, "ORD-2025-0001");
        changed.items.clear();
        assert!(store.update(&tenant, &saved.id, &changed).await.is_err());

        store.clear_failures().await;
        let fetched = store.fetch(&tenant, &saved.id).await.unwrap();
        assert_eq!(fetched.record.items.len(), 1);
    }

    #[tokio::test]
    async fn insert_marks_source_converted() {
        let store = MemoryStore::new();
        let tenant = TenantContext::new("north");
        let quote = store.insert(&tenant, &record(DocumentKind::Quotation, "QUO-2025-0001")).await.unwrap();

        let mut order = record(DocumentKind::Order, "ORD-2025-0001");
        order.header.source = Some(SourceLink {
            kind: DocumentKind::Quotation,
            id: quote.id.clone(),
            number: quote.record.number.clone(),
        });
        store.insert(&tenant, &order).await.unwrap();

        let quote = store.fetch(&tenant, &quote.id).await.unwrap();
        assert_eq!(quote.record.header.status, DocumentStatus::Converted);
    }

    #[tokio::test]
    async fn missing_source_fails_whole_insert() {
        let store = MemoryStore::new();
        let tenant = TenantContext::new("north");
        let mut order = record(DocumentKind::Order, "ORD-2025-0001");
        order.header.source = Some(SourceLink {
            kind: DocumentKind::Quotation,
            id: "nope".into(),
            number: "QUO-2025-0001".into(),
        });
        assert!(matches!(
            store.insert(&tenant, &order).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn invoker_records_calls() {
        let invoker = RecordingInvoker::new();
        invoker.invoke("send-email", serde_json::json!({"to": "a@b.in"})).await.unwrap();
        invoker.set_failing(true).await;
        assert!(invoker.invoke("send-email", serde_json::json!({})).await.is_err());
        assert_eq!(invoker.calls().await.len(), 2);
    }
}
