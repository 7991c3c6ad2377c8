//! Shared fixtures for the scan plan integration tests.

#![allow(dead_code)]

use scanx_core::context::ReaderContext;
use scanx_core::expr::combine_filters;
use scanx_core::partition::{BatchPartitionContext, RowPartitionContext};
use scanx_core::{DataType, Field, Predicate, Result, ScanError, Schema, TableId, TableStatistics};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn orders_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("amount", DataType::Numeric { precision: 18, scale: 2 }, true),
        Field::new("country", DataType::Utf8, true),
    ])
}

/// Counts calls into each partition enumeration source.
#[derive(Debug, Default)]
pub struct Calls {
    pub batch: AtomicUsize,
    pub row: AtomicUsize,
    pub push: AtomicUsize,
}

impl Calls {
    pub fn batch(&self) -> usize {
        self.batch.load(Ordering::SeqCst)
    }

    pub fn row(&self) -> usize {
        self.row.load(Ordering::SeqCst)
    }

    pub fn push(&self) -> usize {
        self.push.load(Ordering::SeqCst)
    }
}

/// Backend stub with scripted answers.
#[derive(Debug, Clone)]
pub struct StubContext {
    pub table_id: TableId,
    pub read_schema: Schema,
    /// Predicates the backend refuses to evaluate.
    pub unsupported: Vec<Predicate>,
    pub fail_push: bool,
    pub fail_partitions: bool,
    pub batch_mode: bool,
    pub batch_partitions: Vec<BatchPartitionContext>,
    pub row_partitions: Vec<RowPartitionContext>,
    pub statistics: TableStatistics,
    pub accepted: Vec<Predicate>,
    pub retained: Vec<Predicate>,
    pub calls: Arc<Calls>,
}

impl StubContext {
    pub fn new(table: &str) -> Self {
        Self {
            table_id: TableId::new("acme", "sales", table),
            read_schema: orders_schema(),
            unsupported: Vec::new(),
            fail_push: false,
            fail_partitions: false,
            batch_mode: false,
            batch_partitions: Vec::new(),
            row_partitions: Vec::new(),
            statistics: TableStatistics::unknown(),
            accepted: Vec::new(),
            retained: Vec::new(),
            calls: Arc::new(Calls::default()),
        }
    }

    /// `batches` batch partitions of two streams each and `rows` row partitions.
    pub fn with_partitions(mut self, batches: usize, rows: usize) -> Self {
        self.batch_partitions = (0..batches)
            .map(|i| BatchPartitionContext {
                streams: vec![format!("b{}-0", i), format!("b{}-1", i)],
                selected_fields: vec![],
            })
            .collect();
        self.row_partitions = (0..rows)
            .map(|i| RowPartitionContext {
                stream: format!("r{}", i),
                selected_fields: vec![],
            })
            .collect();
        self
    }
}

impl ReaderContext for StubContext {
    fn kind(&self) -> &str {
        "stub"
    }

    fn table_id(&self) -> &TableId {
        &self.table_id
    }

    fn full_table_name(&self) -> String {
        self.table_id.to_string()
    }

    fn push_filters(&mut self, candidates: &[Predicate]) -> Result<Vec<Predicate>> {
        self.calls.push.fetch_add(1, Ordering::SeqCst);
        if self.fail_push {
            return Err(ScanError::Backend("filter negotiation refused".into()));
        }
        let (accepted, retained): (Vec<_>, Vec<_>) = candidates
            .iter()
            .cloned()
            .partition(|p| !self.unsupported.contains(p));
        self.accepted = accepted;
        self.retained = retained;
        Ok(self.accepted.clone())
    }

    fn pushed_filters(&self) -> Vec<Predicate> {
        self.accepted.clone()
    }

    fn prune_columns(&mut self, required: &Schema) -> Result<()> {
        self.read_schema = required.clone();
        Ok(())
    }

    fn read_schema(&self) -> Schema {
        self.read_schema.clone()
    }

    fn combined_filter(&self) -> Option<String> {
        combine_filters(None, self.accepted.iter().chain(self.retained.iter()))
    }

    fn estimate_statistics(&self) -> TableStatistics {
        self.statistics
    }

    fn batch_read_enabled(&self) -> bool {
        self.batch_mode
    }

    fn plan_batch_partitions(&self) -> Result<Vec<BatchPartitionContext>> {
        self.calls.batch.fetch_add(1, Ordering::SeqCst);
        if self.fail_partitions {
            return Err(ScanError::Partitioning {
                table: self.full_table_name(),
                reason: "read session expired".into(),
            });
        }
        Ok(self.batch_partitions.clone())
    }

    fn plan_row_partitions(&self) -> Result<Vec<RowPartitionContext>> {
        self.calls.row.fetch_add(1, Ordering::SeqCst);
        if self.fail_partitions {
            return Err(ScanError::Partitioning {
                table: self.full_table_name(),
                reason: "read session expired".into(),
            });
        }
        Ok(self.row_partitions.clone())
    }
}
