//! # scanx-core: Scan Planning Coordinator
//!
//! This crate plans a read of one columnar table on behalf of a distributed query
//! engine. It does not perform I/O itself: every capability question is forwarded to
//! a backend [`ReaderContext`](context::ReaderContext), and the answers are adapted into
//! the engine-facing shapes defined here.
//!
//! ## Module Overview
//!
//! - **`expr`**: Table identity, literal values, and the engine's predicate type
//!   together with its compilation into backend filter text.
//! - **`schema`**: Column schema types and the metadata policy used by plan identity.
//! - **`stats`**: Backend-native and engine-facing size/row-count estimates.
//! - **`partition`**: Partition descriptors, the uniform partition handle, and the
//!   constant reader factory.
//! - **`context`**: The `ReaderContext` capability trait and an in-memory backend for
//!   development and testing.
//! - **`plan`**: The `ScanPlan` coordinator (pushdown, pruning, statistics, partitions).
//! - **`identity`**: Equality and hashing of plans for engine-side deduplication.
//! - **`config`**: Tuning knobs for plan identity and the in-memory backend.
//! - **`error`**: The crate error type.

pub mod config;
pub mod context;
pub mod error;
pub mod expr;
pub mod identity;
pub mod partition;
pub mod plan;
pub mod schema;
pub mod stats;

pub use config::ScanConfig;
pub use context::{InMemoryReaderContext, ReaderContext};
pub use error::{Result, ScanError};
pub use expr::{Predicate, ScalarValue, TableId};
pub use identity::PlanIdentity;
pub use partition::{PartitionHandle, ReaderFactory};
pub use plan::{PushdownOutcome, ScanPlan};
pub use schema::{DataType, Field, MetadataPolicy, Schema};
pub use stats::{Statistics, TableStatistics};
