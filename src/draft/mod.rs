//! Editable documents against an external store.
//!
//! [`DocumentDraft`] drives one document through New → Editing → Submitting
//! → Saved. Persistence and server-side functions are reached only through
//! the [`DocumentStore`] and [`FunctionInvoker`] traits; [`MemoryStore`] and
//! [`RecordingInvoker`] implement them in-process.

mod allocator;
mod document;
pub mod memory;
mod store;

pub use allocator::*;
pub use document::*;
pub use memory::{MemoryStore, RecordingInvoker, StoreOp};
pub use store::*;
