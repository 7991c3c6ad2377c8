//! # Partitions
//!
//! A partition is one independently readable slice of a table scan. The backend
//! enumerates partitions in one of two shapes, depending on how it will deliver data:
//!
//! - **Batch** (`BatchPartitionContext`): one or more read streams whose rows arrive
//!   as columnar batches. Fewer, larger partitions.
//! - **Row** (`RowPartitionContext`): a single read stream delivered row by row.
//!   More numerous, smaller partitions.
//!
//! Both shapes are wrapped 1:1 into a `PartitionHandle`, so the engine-facing type is
//! the same whichever strategy the backend selected. Handles are immutable, own no
//! network resources, and serialize with serde (or protobuf via `scanx-wire`) so they
//! can be shipped to the execution unit that opens the reader.

use serde::{Deserialize, Serialize};

/// Backend descriptor for a columnar-batch partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchPartitionContext {
    /// Read streams served by this partition, in read order.
    pub streams: Vec<String>,
    /// Columns the streams were opened with.
    pub selected_fields: Vec<String>,
}

/// Backend descriptor for a row-delivery partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowPartitionContext {
    pub stream: String,
    pub selected_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PartitionContext {
    Batch(BatchPartitionContext),
    Row(RowPartitionContext),
}

/// How the backend enumerates partitions for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnumerationStrategy {
    Batch,
    Row,
}

impl EnumerationStrategy {
    pub fn from_batch_flag(batch_read_enabled: bool) -> Self {
        if batch_read_enabled {
            EnumerationStrategy::Batch
        } else {
            EnumerationStrategy::Row
        }
    }
}

/// Uniform, engine-facing unit of parallel work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionHandle {
    /// Position in the planned partition list.
    pub index: u32,
    pub context: PartitionContext,
}

impl PartitionHandle {
    pub fn new(index: u32, context: PartitionContext) -> Self {
        Self { index, context }
    }

    pub fn is_columnar(&self) -> bool {
        matches!(self.context, PartitionContext::Batch(_))
    }

    pub fn streams(&self) -> Vec<&str> {
        match &self.context {
            PartitionContext::Batch(b) => b.streams.iter().map(String::as_str).collect(),
            PartitionContext::Row(r) => vec![r.stream.as_str()],
        }
    }

    pub fn selected_fields(&self) -> &[String] {
        match &self.context {
            PartitionContext::Batch(b) => &b.selected_fields,
            PartitionContext::Row(r) => &r.selected_fields,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKind {
    Columnar,
    Row,
}

/// Stateless factory the engine uses to open a reader per partition handle.
///
/// Every plan returns the same constant instance; the actual reading is done by the
/// partition-reader layer, which dispatches on [`ReaderFactory::reader_kind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderFactory;

impl ReaderFactory {
    pub fn reader_kind(&self, handle: &PartitionHandle) -> ReaderKind {
        if handle.is_columnar() {
            ReaderKind::Columnar
        } else {
            ReaderKind::Row
        }
    }

    pub fn supports_columnar_reads(&self, handle: &PartitionHandle) -> bool {
        self.reader_kind(handle) == ReaderKind::Columnar
    }
}
