//! # Scan Plan Coordinator
//!
//! `ScanPlan` is the single object the engine talks to while planning one read of one
//! table. It plays both roles the engine distinguishes elsewhere: the builder that
//! negotiates pushdown, and the finished scan that reports statistics and partitions.
//!
//! ## Lifecycle
//!
//! ```text
//! ScanPlan::new(ctx)
//!   -> prune_columns / push_filters     (negotiation; any order, repeatable)
//!   -> estimate_statistics              (plan costing)
//!   -> plan_partitions                  (physical execution begins)
//!   -> engine opens one reader per PartitionHandle, in parallel
//! ```
//!
//! Statistics and partitions reflect the negotiated state at the time they are
//! requested. Negotiating again afterwards is allowed but makes anything computed
//! earlier stale; the engine is expected to ask again.
//!
//! ## Delegation
//!
//! All negotiated state lives in the `ReaderContext`. The plan forwards calls and
//! adapts results; the only thing it computes itself is the residual filter list
//! (candidates the backend did not accept), which the engine must re-apply.
//!
//! The plan is not internally concurrent and performs no I/O of its own.

use crate::config::ScanConfig;
use crate::context::ReaderContext;
use crate::error::{Result, ScanError};
use crate::expr::{Predicate, TableId};
use crate::partition::{EnumerationStrategy, PartitionContext, PartitionHandle, ReaderFactory};
use crate::schema::Schema;
use crate::stats::Statistics;
use std::fmt;
use tracing::{debug, trace};

/// Result of one pushdown negotiation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushdownOutcome {
    /// Predicates the backend will evaluate.
    pub accepted: Vec<Predicate>,
    /// Candidates the backend did not accept, in candidate order. The engine must
    /// evaluate these after the scan.
    pub residual: Vec<Predicate>,
}

pub struct ScanPlan {
    ctx: Box<dyn ReaderContext>,
    config: ScanConfig,
    /// Set once partitions have been handed out, to flag later re-negotiation.
    partitions_planned: bool,
}

impl ScanPlan {
    pub fn new(ctx: Box<dyn ReaderContext>) -> Self {
        Self::with_config(ctx, ScanConfig::default())
    }

    /// Only `config.metadata_policy` affects the plan. Backend settings must already have
    /// been applied to `ctx`.
    pub fn with_config(ctx: Box<dyn ReaderContext>, config: ScanConfig) -> Self {
        Self {
            ctx,
            config,
            partitions_planned: false,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn context(&self) -> &dyn ReaderContext {
        self.ctx.as_ref()
    }

    pub fn kind(&self) -> &str {
        self.ctx.kind()
    }

    pub fn table_id(&self) -> &TableId {
        self.ctx.table_id()
    }

    pub fn description(&self) -> String {
        format!("Reading table [{}]", self.ctx.full_table_name())
    }

    /// Offer `candidates` to the backend.
    ///
    /// An empty candidate list is a no-op and does not reach the backend. A backend
    /// failure is returned unchanged and nothing is recorded.
    pub fn push_filters(&mut self, candidates: &[Predicate]) -> Result<PushdownOutcome> {
        if candidates.is_empty() {
            return Ok(PushdownOutcome::default());
        }
        self.note_renegotiation("push_filters");

        let accepted = self.ctx.push_filters(candidates)?;
        let residual: Vec<Predicate> = candidates
            .iter()
            .filter(|c| !accepted.contains(c))
            .cloned()
            .collect();

        debug!(
            "{}: pushed {} filters, {} left for the engine",
            self.ctx.table_id(),
            accepted.len(),
            residual.len()
        );
        Ok(PushdownOutcome { accepted, residual })
    }

    pub fn pushed_filters(&self) -> Vec<Predicate> {
        self.ctx.pushed_filters()
    }

    /// Narrow the read schema to exactly `required`. Dropped columns cannot be
    /// recovered on this plan.
    pub fn prune_columns(&mut self, required: &Schema) -> Result<()> {
        self.note_renegotiation("prune_columns");
        self.ctx.prune_columns(required)?;
        trace!("{}: read schema {:?}", self.ctx.table_id(), required.names());
        Ok(())
    }

    pub fn read_schema(&self) -> Schema {
        self.ctx.read_schema()
    }

    /// Pushed and engine-retained filters merged into one text. Identity only.
    pub fn combined_filter_expression(&self) -> Option<String> {
        self.ctx.combined_filter()
    }

    pub fn estimate_statistics(&self) -> Statistics {
        let stats = Statistics::from(self.ctx.estimate_statistics());
        debug!(
            "{}: estimated rows={:?} bytes={:?}",
            self.ctx.table_id(),
            stats.row_count,
            stats.size_in_bytes
        );
        stats
    }

    /// Enumerate the partitions of the negotiated scan.
    ///
    /// The backend's batch-read flag selects which enumeration source is consulted;
    /// exactly one is. Each descriptor becomes one handle. An empty table yields an
    /// empty list; an enumeration failure is returned, never an empty list.
    pub fn plan_partitions(&mut self) -> Result<Vec<PartitionHandle>> {
        let strategy = EnumerationStrategy::from_batch_flag(self.ctx.batch_read_enabled());
        let contexts: Vec<PartitionContext> = match strategy {
            EnumerationStrategy::Batch => self
                .ctx
                .plan_batch_partitions()?
                .into_iter()
                .map(PartitionContext::Batch)
                .collect(),
            EnumerationStrategy::Row => self
                .ctx
                .plan_row_partitions()?
                .into_iter()
                .map(PartitionContext::Row)
                .collect(),
        };

        let table = self.ctx.full_table_name();
        let handles = contexts
            .into_iter()
            .enumerate()
            .map(|(i, context)| Ok(PartitionHandle::new(partition_index(i, &table)?, context)))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "{}: planned {} partitions ({:?} mode)",
            self.ctx.table_id(),
            handles.len(),
            strategy
        );
        self.partitions_planned = true;
        Ok(handles)
    }

    pub fn reader_factory(&self) -> ReaderFactory {
        ReaderFactory
    }

    fn note_renegotiation(&self, call: &str) {
        if self.partitions_planned {
            debug!(
                "{}: {} after partitions were planned; earlier partitions and statistics are stale",
                self.ctx.table_id(),
                call
            );
        }
    }
}

/// Handle indices are `u32` on the wire; more partitions than that cannot be addressed.
fn partition_index(position: usize, table: &str) -> Result<u32> {
    u32::try_from(position).map_err(|_| ScanError::Partitioning {
        table: table.to_string(),
        reason: format!("partition {} exceeds the addressable index range", position),
    })
}

impl fmt::Debug for ScanPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanPlan")
            .field("kind", &self.ctx.kind())
            .field("table", &self.ctx.full_table_name())
            .field("config", &self.config)
            .finish()
    }
}
