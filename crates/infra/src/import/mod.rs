//! Bulk roster import from CSV uploads.
//!
//! The pipeline runs in three typed phases:
//! [`ImportPipeline::open`] decodes the whole upload,
//! [`ImportPipeline::process`] turns rows into pending players or rejections,
//! and [`ImportPipeline::commit`] persists the pending players in one batch.
//! Row problems never stop the run; stream and persistence problems abort it
//! with nothing written.

pub mod pipeline;
pub mod report;

pub use pipeline::{ImportPipeline, OpenedImport, PendingRow, ProcessedImport};
pub use report::{ImportFailure, ImportReport, RejectionPreview, RejectionReason, RowRejection};
