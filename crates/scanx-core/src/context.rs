//! # Reader Context Interface
//!
//! The reader context is the backend-specific collaborator behind a scan plan. It
//! owns all negotiated state (accepted filters, narrowed read schema) and answers
//! every capability question the coordinator asks. The coordinator never keeps a copy
//! of that state, so its view cannot diverge from what the backend actually accepted.
//!
//! ## Trait Design
//!
//! `ReaderContext` sits behind a trait object (`Box<dyn ReaderContext>`) so different
//! backends can plug in. Negotiation methods take `&mut self` because they are state
//! transitions; everything else is a read. Real backends may issue metadata requests
//! from these methods; that I/O is theirs, not the coordinator's.
//!
//! `InMemoryReaderContext` is a simple implementation populated programmatically. It is
//! used for development and tests and models a table split into a fixed list of read
//! streams.

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::expr::{combine_filters, Predicate, TableId};
use crate::partition::{BatchPartitionContext, RowPartitionContext};
use crate::schema::Schema;
use crate::stats::TableStatistics;
use std::collections::BTreeSet;
use tracing::trace;

/// Backend capability object a `ScanPlan` delegates to.
pub trait ReaderContext: Send + Sync {
    /// Concrete backend kind. Plans over different kinds never compare equal.
    fn kind(&self) -> &str;

    fn table_id(&self) -> &TableId;

    /// Human-readable qualified table name, for diagnostics.
    fn full_table_name(&self) -> String;

    /// Offer `candidates` to the backend and return the subset it will evaluate.
    ///
    /// Fails as a whole when the backend rejects the call; accumulation across calls
    /// is backend-defined.
    fn push_filters(&mut self, candidates: &[Predicate]) -> Result<Vec<Predicate>>;

    fn pushed_filters(&self) -> Vec<Predicate>;

    /// Narrow the read schema to exactly `required`.
    fn prune_columns(&mut self, required: &Schema) -> Result<()>;

    fn read_schema(&self) -> Schema;

    /// Pushed filters merged with every filter the engine keeps for itself, as text.
    fn combined_filter(&self) -> Option<String>;

    /// Size estimate for the negotiated scan. Unknown values are `None`.
    fn estimate_statistics(&self) -> TableStatistics;

    fn batch_read_enabled(&self) -> bool;

    fn plan_batch_partitions(&self) -> Result<Vec<BatchPartitionContext>>;

    fn plan_row_partitions(&self) -> Result<Vec<RowPartitionContext>>;
}

/// In-memory reader context for testing and development.
#[derive(Debug, Clone)]
pub struct InMemoryReaderContext {
    table_id: TableId,
    table_schema: Schema,
    read_schema: Schema,
    streams: Vec<String>,
    statistics: TableStatistics,
    global_filter: Option<String>,
    /// Columns the backend cannot filter on; predicates touching them stay residual.
    rejected_columns: BTreeSet<String>,
    batch_read: bool,
    streams_per_batch: usize,
    accepted: Vec<Predicate>,
    residual: Vec<Predicate>,
}

impl InMemoryReaderContext {
    pub const KIND: &'static str = "in-memory";

    pub fn new(table_id: TableId, schema: Schema) -> Self {
        Self {
            table_id,
            read_schema: schema.clone(),
            table_schema: schema,
            streams: Vec::new(),
            statistics: TableStatistics::unknown(),
            global_filter: None,
            rejected_columns: BTreeSet::new(),
            batch_read: false,
            streams_per_batch: ScanConfig::default().streams_per_batch,
            accepted: Vec::new(),
            residual: Vec::new(),
        }
    }

    pub fn with_streams<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.streams = streams.into_iter().map(Into::into).collect();
        self
    }

    /// Name `count` streams after the table: `<table>/streams/<n>`.
    pub fn with_stream_count(self, count: usize) -> Self {
        let prefix = self.table_id.to_string();
        self.with_streams((0..count).map(|i| format!("{}/streams/{}", prefix, i)))
    }

    pub fn with_statistics(mut self, statistics: TableStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    /// Filter configured on the data source itself; always part of the combined filter.
    pub fn with_global_filter(mut self, filter: impl Into<String>) -> Self {
        self.global_filter = Some(filter.into());
        self
    }

    pub fn with_rejected_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rejected_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_batch_read(mut self, enabled: bool) -> Self {
        self.batch_read = enabled;
        self
    }

    pub fn with_config(mut self, config: &ScanConfig) -> Result<Self> {
        config.validate()?;
        self.streams_per_batch = config.streams_per_batch;
        Ok(self)
    }

    pub fn residual_filters(&self) -> &[Predicate] {
        &self.residual
    }

    fn validate(&self, predicate: &Predicate) -> Result<()> {
        match predicate
            .columns()
            .into_iter()
            .find(|c| self.table_schema.field(c).is_none())
        {
            Some(missing) => Err(ScanError::InvalidPredicate {
                predicate: predicate.to_sql(),
                reason: format!("unknown column `{}` in {}", missing, self.table_id),
            }),
            None => Ok(()),
        }
    }

    fn supports(&self, predicate: &Predicate) -> bool {
        predicate
            .columns()
            .iter()
            .all(|c| !self.rejected_columns.contains(*c))
    }

    fn selected_fields(&self) -> Vec<String> {
        self.read_schema.fields.iter().map(|f| f.name.clone()).collect()
    }
}

impl ReaderContext for InMemoryReaderContext {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn table_id(&self) -> &TableId {
        &self.table_id
    }

    fn full_table_name(&self) -> String {
        self.table_id.to_string()
    }

    fn push_filters(&mut self, candidates: &[Predicate]) -> Result<Vec<Predicate>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        for p in candidates {
            self.validate(p)?;
        }

        let (accepted, residual): (Vec<Predicate>, Vec<Predicate>) =
            candidates.iter().cloned().partition(|p| self.supports(p));
        trace!(
            "{}: accepted {} of {} filters",
            self.table_id,
            accepted.len(),
            candidates.len()
        );

        self.accepted = accepted;
        self.residual = residual;
        Ok(self.accepted.clone())
    }

    fn pushed_filters(&self) -> Vec<Predicate> {
        self.accepted.clone()
    }

    fn prune_columns(&mut self, required: &Schema) -> Result<()> {
        for field in &required.fields {
            let current = self
                .read_schema
                .field(&field.name)
                .ok_or_else(|| ScanError::UnknownColumn(field.name.clone()))?;
            if !current.data_type.same_logical_type(&field.data_type) {
                return Err(ScanError::ColumnTypeMismatch {
                    column: field.name.clone(),
                    actual: current.data_type.clone(),
                    requested: field.data_type.clone(),
                });
            }
        }
        self.read_schema = required.clone();
        Ok(())
    }

    fn read_schema(&self) -> Schema {
        self.read_schema.clone()
    }

    fn combined_filter(&self) -> Option<String> {
        combine_filters(
            self.global_filter.as_deref(),
            self.accepted.iter().chain(self.residual.iter()),
        )
    }

    fn estimate_statistics(&self) -> TableStatistics {
        self.statistics
    }

    fn batch_read_enabled(&self) -> bool {
        self.batch_read
    }

    fn plan_batch_partitions(&self) -> Result<Vec<BatchPartitionContext>> {
        if self.streams_per_batch == 0 {
            return Err(ScanError::Partitioning {
                table: self.full_table_name(),
                reason: "streams_per_batch must be at least 1".to_string(),
            });
        }
        let fields = self.selected_fields();
        Ok(self
            .streams
            .chunks(self.streams_per_batch)
            .map(|chunk| BatchPartitionContext {
                streams: chunk.to_vec(),
                selected_fields: fields.clone(),
            })
            .collect())
    }

    fn plan_row_partitions(&self) -> Result<Vec<RowPartitionContext>> {
        let fields = self.selected_fields();
        Ok(self
            .streams
            .iter()
            .map(|stream| RowPartitionContext {
                stream: stream.clone(),
                selected_fields: fields.clone(),
            })
            .collect())
    }
}
