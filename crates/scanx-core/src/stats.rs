//! # Scan Statistics
//!
//! Statistics are advisory: the engine's planner uses them to size joins and choose
//! broadcast vs. shuffle, but a wrong or missing estimate never affects correctness.
//!
//! ## Unknown vs. Zero
//!
//! Both estimates are optional. An absent value means "the backend does not know";
//! zero is a stronger claim (the scan is empty). Adapting backend statistics into the
//! engine shape therefore never coerces an unknown estimate to zero.

use serde::{Deserialize, Serialize};

/// Estimate as reported by the backend reader context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatistics {
    pub num_rows: Option<u64>,
    pub num_bytes: Option<u64>,
}

impl TableStatistics {
    pub fn new(num_rows: u64, num_bytes: u64) -> Self {
        Self {
            num_rows: Some(num_rows),
            num_bytes: Some(num_bytes),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Engine-facing statistics for one planned scan. Recomputed on every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub row_count: Option<u64>,
    pub size_in_bytes: Option<u64>,
}

impl Statistics {
    pub fn is_unknown(&self) -> bool {
        self.row_count.is_none() && self.size_in_bytes.is_none()
    }
}

impl From<TableStatistics> for Statistics {
    fn from(backend: TableStatistics) -> Self {
        Self {
            row_count: backend.num_rows,
            size_in_bytes: backend.num_bytes,
        }
    }
}
