//! # Plan Identity
//!
//! The engine may deduplicate or cache physical plans, so two `ScanPlan`s describing
//! the same logical scan must compare equal even when they wrap different reader
//! context instances. Identity is the tuple:
//!
//! - table id,
//! - read schema after pruning, normalized by the configured `MetadataPolicy`,
//! - combined filter text (pushed plus engine-retained filters).
//!
//! The backend kind is also part of the key: plans over different kinds of backend
//! are never interchangeable. Nothing else is included; in particular statistics and
//! partitions are derived from the tuple and would only make equal scans look distinct.

use crate::expr::TableId;
use crate::plan::ScanPlan;
use crate::schema::Schema;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanIdentity {
    pub kind: String,
    pub table_id: TableId,
    pub read_schema: Schema,
    pub filter: Option<String>,
}

impl ScanPlan {
    pub fn identity(&self) -> PlanIdentity {
        PlanIdentity {
            kind: self.kind().to_string(),
            table_id: self.table_id().clone(),
            read_schema: self.read_schema().normalized(&self.config().metadata_policy),
            filter: self.combined_filter_expression(),
        }
    }
}

impl PartialEq for ScanPlan {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.kind() != other.kind() {
            return false;
        }
        self.identity() == other.identity()
    }
}

impl Eq for ScanPlan {}

impl Hash for ScanPlan {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}
