use std::sync::Arc;

use chrono::{Datelike, Local};
use tracing::{debug, info, warn};

use super::allocator::SequenceAllocator;
use super::store::{DocumentRecord, DocumentStore, FunctionInvoker, StoredDocument};
use crate::core::{
    DocketError, DocumentHeader, DocumentKind, DocumentNumber, DocumentStatus, DocumentTotals,
    DraftState, LineField, LineItem, LineItemBuilder, LineItemCollection, SourceLink,
    TenantContext, TotalsCalculator, ValidationError, validate_document,
};
use crate::settings::EngineConfig;

/// Collaborators and settings shared by the drafts of one session.
#[derive(Clone)]
pub struct DraftContext {
    pub tenant: TenantContext,
    pub config: Arc<EngineConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub invoker: Option<Arc<dyn FunctionInvoker>>,
}

impl DraftContext {
    pub fn new(tenant: TenantContext, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tenant,
            config: Arc::new(EngineConfig::default()),
            store,
            invoker: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn with_invoker(mut self, invoker: Arc<dyn FunctionInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    pub fn allocator(&self) -> SequenceAllocator {
        SequenceAllocator::new(self.store.clone()).with_padding(self.config.sequence_width)
    }

    fn calculator(&self) -> TotalsCalculator {
        TotalsCalculator::new(self.config.home_currency.clone())
    }
}

/// Result of a successful [`DocumentDraft::submit`].
#[derive(Debug)]
pub struct SubmitOutcome {
    pub id: String,
    pub number: String,
    pub totals: DocumentTotals,
    /// Non-blocking failures after the save (e.g. vendor notification).
    pub warnings: Vec<DocketError>,
}

/// One editable document: header, line items and derived totals.
///
/// ```text
///   new / convert_from ──► New ──edit──► Editing ◄──load
///                                           │  ▲
///                                     submit│  │validation or store error
///                                           ▼  │
///                                       Submitting ──ok──► Saved ──edit──► Editing
/// ```
///
/// Totals are recomputed after every mutation and are never set directly.
/// The number can be replaced by hand only until the first save.
pub struct DocumentDraft {
    ctx: DraftContext,
    calculator: TotalsCalculator,
    kind: DocumentKind,
    id: Option<String>,
    number: String,
    /// Year used when a conflicting number has to be re-allocated.
    number_year: i32,
    manual_number: bool,
    header: DocumentHeader,
    items: LineItemCollection,
    totals: DocumentTotals,
    state: DraftState,
    validation_errors: Vec<ValidationError>,
    last_error: Option<String>,
}

impl DocumentDraft {
    /// Start a new document with a freshly allocated number for `year` and
    /// one blank row.
    pub async fn new(ctx: DraftContext, kind: DocumentKind, year: i32) -> Result<Self, DocketError> {
        let number = ctx.allocator().next_number(kind, &ctx.tenant, year).await?;
        Ok(Self::with_number(ctx, kind, number, false))
    }

    /// [`new`](Self::new) for the current local year.
    pub async fn new_today(ctx: DraftContext, kind: DocumentKind) -> Result<Self, DocketError> {
        Self::new(ctx, kind, Local::now().year()).await
    }

    /// Start a new document with a hand-entered number, for when allocation
    /// is unavailable.
    pub fn new_with_number(
        ctx: DraftContext,
        kind: DocumentKind,
        raw_number: &str,
    ) -> Result<Self, DocketError> {
        let number = parse_number_for(kind, raw_number)?;
        Ok(Self::with_number(ctx, kind, number, true))
    }

    fn with_number(ctx: DraftContext, kind: DocumentKind, number: DocumentNumber, manual: bool) -> Self {
        let first = LineItemBuilder::blank(&ctx.config).build();
        let mut draft = Self {
            calculator: ctx.calculator(),
            kind,
            id: None,
            number: number.to_string(),
            number_year: number.year(),
            manual_number: manual,
            header: DocumentHeader::default(),
            items: LineItemCollection::new(first),
            totals: DocumentTotals::default(),
            state: DraftState::New,
            validation_errors: Vec::new(),
            last_error: None,
            ctx,
        };
        draft.recompute_totals();
        debug!(kind = %kind, number = %draft.number, "draft created");
        draft
    }

    /// Open a stored document for editing. Items keep their stored order and
    /// all amounts are recomputed; stored totals are ignored.
    pub async fn load(ctx: DraftContext, id: &str) -> Result<Self, DocketError> {
        let stored = ctx.store.fetch(&ctx.tenant, id).await?;
        let StoredDocument { id, record, .. } = stored;

        let items = match LineItemCollection::from_stored(record.items) {
            Some(items) => items,
            None => {
                warn!(id = %id, number = %record.number, "stored document has no items, adding a blank row");
                LineItemCollection::new(LineItemBuilder::blank(&ctx.config).build())
            }
        };
        let number_year = DocumentNumber::parse(&record.number)
            .map(|n| n.year())
            .unwrap_or_else(|_| Local::now().year());

        let mut draft = Self {
            calculator: ctx.calculator(),
            kind: record.kind,
            id: Some(id),
            number: record.number,
            number_year,
            manual_number: false,
            header: record.header,
            items,
            totals: DocumentTotals::default(),
            state: DraftState::Editing,
            validation_errors: Vec::new(),
            last_error: None,
            ctx,
        };
        draft.recompute_totals();
        if draft.totals != record.totals {
            debug!(number = %draft.number, "stored totals differ from recomputed totals");
        }
        Ok(draft)
    }

    /// Start a `target` document from a saved one (quotation → order,
    /// order → invoice, RFQ → purchase order). Rows and header fields are
    /// copied; saving it marks the source as converted.
    pub async fn convert_from(
        ctx: DraftContext,
        source: &StoredDocument,
        target: DocumentKind,
        year: i32,
    ) -> Result<Self, DocketError> {
        let from = source.record.kind;
        if !from.can_convert_to(target) || source.scope_key != ctx.tenant.scope_key {
            return Err(DocketError::InvalidConversion { from, to: target });
        }

        let mut draft = Self::new(ctx, target, year).await?;
        if let Some(items) = LineItemCollection::from_stored(source.record.items.clone()) {
            draft.items = items;
        }
        draft.header = DocumentHeader {
            status: DocumentStatus::Draft,
            source: Some(SourceLink {
                kind: from,
                id: source.id.clone(),
                number: source.record.number.clone(),
            }),
            ..source.record.header.clone()
        };
        draft.recompute_totals();
        info!(from = %source.record.number, to = %draft.number, "draft converted");
        Ok(draft)
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn tenant(&self) -> &TenantContext {
        &self.ctx.tenant
    }

    /// Store id, once saved or loaded.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn items(&self) -> &LineItemCollection {
        &self.items
    }

    pub fn totals(&self) -> &DocumentTotals {
        &self.totals
    }

    pub fn state(&self) -> DraftState {
        self.state
    }

    /// Field-level errors of the last rejected submit.
    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }

    /// Message of the last failed submit.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the allocated number by hand. Only allowed before the first save.
    pub fn set_number(&mut self, raw: &str) -> Result<(), DocketError> {
        self.ensure_editable("change the number")?;
        if self.id.is_some() {
            return Err(DocketError::InvalidNumber(format!(
                "{} is already saved; its number cannot change",
                self.number
            )));
        }
        let number = parse_number_for(self.kind, raw)?;
        self.number = number.to_string();
        self.number_year = number.year();
        self.manual_number = true;
        self.touch();
        Ok(())
    }

    /// Edit header fields; totals follow currency changes.
    pub fn edit_header(&mut self, edit: impl FnOnce(&mut DocumentHeader)) -> Result<(), DocketError> {
        self.ensure_editable("edit the header")?;
        edit(&mut self.header);
        self.recompute_totals();
        self.touch();
        Ok(())
    }

    /// Set one kind-specific header field (`customer_id`, `vendor_id`, ...).
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), DocketError> {
        self.edit_header(|h| h.set_field(name, value))
    }

    pub fn append_item(&mut self, template: LineItem) -> Result<&LineItem, DocketError> {
        self.ensure_editable("add an item")?;
        self.items.append(template);
        self.after_item_change();
        let last = self.items.len() - 1;
        self.item(last)
    }

    /// Append a row with the configured defaults.
    pub fn append_blank(&mut self) -> Result<&LineItem, DocketError> {
        let blank = LineItemBuilder::blank(&self.ctx.config).build();
        self.append_item(blank)
    }

    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, DocketError> {
        self.ensure_editable("remove an item")?;
        let removed = self.items.remove_at(index)?;
        self.after_item_change();
        Ok(removed)
    }

    pub fn update_item(&mut self, index: usize, field: LineField) -> Result<&LineItem, DocketError> {
        self.ensure_editable("edit an item")?;
        self.items.update_at(index, field)?;
        self.after_item_change();
        self.item(index)
    }

    /// Apply a raw form edit, e.g. `("unit_price", "1,250")`.
    pub fn update_item_field(
        &mut self,
        index: usize,
        name: &str,
        raw: &str,
    ) -> Result<&LineItem, DocketError> {
        let field = LineField::parse(name, raw).ok_or_else(|| {
            DocketError::Validation(vec![ValidationError::with_code(
                format!("items[{index}].{name}"),
                format!("unknown line item field '{name}'"),
                "unknown",
            )])
        })?;
        self.update_item(index, field)
    }

    /// Validate and persist. On any error the draft stays editable and the
    /// error is kept in [`validation_errors`](Self::validation_errors) /
    /// [`last_error`](Self::last_error).
    pub async fn submit(&mut self) -> Result<SubmitOutcome, DocketError> {
        self.ensure_editable("submit")?;

        let errors = validate_document(
            self.kind,
            &self.number,
            &self.header,
            &self.items,
            &self.ctx.config,
        );
        if !errors.is_empty() {
            warn!(number = %self.number, errors = errors.len(), "submit rejected by validation");
            self.state = DraftState::Editing;
            self.validation_errors = errors.clone();
            self.last_error = None;
            return Err(DocketError::Validation(errors));
        }

        self.validation_errors.clear();
        self.last_error = None;
        self.state = DraftState::Submitting;
        let was_new = self.id.is_none();

        let result = match self.id.clone() {
            Some(id) => self
                .ctx
                .store
                .update(&self.ctx.tenant, &id, &self.record())
                .await
                .map_err(DocketError::from),
            None => self.insert_with_retry().await,
        };

        let stored = match result {
            Ok(stored) => stored,
            Err(err) => {
                warn!(number = %self.number, error = %err, "submit failed");
                self.state = DraftState::Editing;
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        self.id = Some(stored.id.clone());
        self.state = DraftState::Saved;
        info!(id = %stored.id, number = %self.number, grand_total = %self.totals.grand_total, "document saved");

        let warnings = if was_new {
            self.notify(&stored).await
        } else {
            Vec::new()
        };

        Ok(SubmitOutcome {
            id: stored.id,
            number: self.number.clone(),
            totals: self.totals.clone(),
            warnings,
        })
    }

    /// Return to editing after a submit future was dropped mid-flight.
    pub fn abandon_submit(&mut self) {
        if self.state == DraftState::Submitting {
            self.state = DraftState::Editing;
        }
    }

    /// The tuple handed to the store.
    pub fn record(&self) -> DocumentRecord {
        DocumentRecord {
            kind: self.kind,
            number: self.number.clone(),
            header: self.header.clone(),
            items: self.items.as_slice().to_vec(),
            totals: self.totals.clone(),
        }
    }

    async fn insert_with_retry(&mut self) -> Result<StoredDocument, DocketError> {
        let max_attempts = self.ctx.config.max_allocation_attempts;
        let mut attempt = 1;
        loop {
            let err = match self.ctx.store.insert(&self.ctx.tenant, &self.record()).await {
                Ok(stored) => return Ok(stored),
                Err(err) => DocketError::from(err),
            };
            let DocketError::UniquenessConflict(taken) = &err else {
                return Err(err);
            };
            if self.manual_number || attempt >= max_attempts {
                return Err(err);
            }
            let next = self
                .ctx
                .allocator()
                .next_after(self.kind, &self.ctx.tenant, self.number_year, taken)
                .await?;
            warn!(taken = %taken, next = %next, attempt, "document number taken, retrying");
            self.number = next.to_string();
            attempt += 1;
        }
    }

    async fn notify(&self, stored: &StoredDocument) -> Vec<DocketError> {
        let Some(function) = self.kind.descriptor().notify_on_save else {
            return Vec::new();
        };
        let Some(invoker) = &self.ctx.invoker else {
            debug!(function, "no function invoker configured, skipping notification");
            return Vec::new();
        };

        let payload = serde_json::json!({
            "document_id": stored.id,
            "number": stored.record.number,
            "kind": stored.record.kind,
            "scope_key": stored.scope_key,
            "fields": stored.record.header.fields,
        });
        match invoker.invoke(function, payload).await {
            Ok(_) => {
                info!(function, number = %stored.record.number, "notification sent");
                Vec::new()
            }
            Err(err) => {
                warn!(function, error = %err, "notification failed, document stays saved");
                vec![DocketError::Notification(err.to_string())]
            }
        }
    }

    fn item(&self, index: usize) -> Result<&LineItem, DocketError> {
        self.items.get(index).ok_or(DocketError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    fn ensure_editable(&self, action: &'static str) -> Result<(), DocketError> {
        if self.state == DraftState::Submitting {
            return Err(DocketError::InvalidState {
                state: self.state,
                action,
            });
        }
        Ok(())
    }

    fn after_item_change(&mut self) {
        self.recompute_totals();
        self.touch();
    }

    fn touch(&mut self) {
        if matches!(self.state, DraftState::New | DraftState::Saved) {
            self.state = DraftState::Editing;
        }
    }

    fn recompute_totals(&mut self) {
        self.totals = self.calculator.compute(
            &self.items,
            self.header.currency_code.as_deref(),
            self.header.exchange_rate,
        );
    }
}

fn parse_number_for(kind: DocumentKind, raw: &str) -> Result<DocumentNumber, DocketError> {
    let number = DocumentNumber::parse(raw)?;
    if number.kind() != kind {
        return Err(DocketError::InvalidNumber(format!(
            "{raw} is not a {} number",
            kind.descriptor().label
        )));
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::memory::MemoryStore;
    use rust_decimal_macros::dec;

    fn ctx() -> DraftContext {
        DraftContext::new(TenantContext::new("branch-1"), Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn new_draft_has_one_blank_row() {
        let draft = DocumentDraft::new(ctx(), DocumentKind::Order, 2025).await.unwrap();
        assert_eq!(draft.number(), "ORD-2025-0001");
        assert_eq!(draft.state(), DraftState::New);
        assert_eq!(draft.items().len(), 1);
        assert_eq!(draft.totals().grand_total, dec!(0));
    }

    #[tokio::test]
    async fn edits_move_to_editing_and_recompute() {
        let mut draft = DocumentDraft::new(ctx(), DocumentKind::Order, 2025).await.unwrap();
        draft.update_item_field(0, "quantity", "4").unwrap();
        draft.update_item_field(0, "unit_price", "50").unwrap();
        assert_eq!(draft.state(), DraftState::Editing);
        assert_eq!(draft.totals().subtotal, dec!(200));
        assert_eq!(draft.totals().tax_total, dec!(36));
    }

    #[tokio::test]
    async fn currency_change_recomputes_conversion() {
        let mut draft = DocumentDraft::new(ctx(), DocumentKind::PurchaseOrder, 2025).await.unwrap();
        draft.update_item_field(0, "unit_price", "8000").unwrap();
        draft.update_item_field(0, "gst_rate", "0").unwrap();
        draft
            .edit_header(|h| {
                h.currency_code = Some("USD".into());
                h.exchange_rate = Some(dec!(80));
            })
            .unwrap();
        assert_eq!(draft.totals().grand_total_in_currency, Some(dec!(100.00)));
    }

    #[tokio::test]
    async fn manual_number_must_match_kind() {
        let mut draft = DocumentDraft::new(ctx(), DocumentKind::Quotation, 2025).await.unwrap();
        assert!(matches!(
            draft.set_number("ORD-2025-0004"),
            Err(DocketError::InvalidNumber(_))
        ));
        draft.set_number("QUO-2025-0040").unwrap();
        assert_eq!(draft.number(), "QUO-2025-0040");
    }

    #[tokio::test]
    async fn unknown_form_field_is_a_validation_error() {
        let mut draft = DocumentDraft::new(ctx(), DocumentKind::Order, 2025).await.unwrap();
        let err = draft.update_item_field(0, "discount", "5").unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "items[0].discount");
    }

    #[test]
    fn new_with_number_skips_allocation() {
        let draft = DocumentDraft::new_with_number(ctx(), DocumentKind::Invoice, "INV-2025-0100").unwrap();
        assert_eq!(draft.number(), "INV-2025-0100");
        assert!(DocumentDraft::new_with_number(ctx(), DocumentKind::Invoice, "INV-100").is_err());
    }
}
