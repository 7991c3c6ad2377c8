//! # Column Schema
//!
//! The schema types here are the engine's view of a table: an ordered list of named,
//! typed fields. Backends frequently attach bookkeeping to fields (field ids, source
//! column names, policy tags) through `Field::metadata`. That bookkeeping does not
//! change what a scan reads, so plan identity compares schemas after stripping it.
//!
//! ## Metadata Policy
//!
//! Which metadata keys count as bookkeeping is backend-dependent, so it is an explicit
//! parameter rather than a fixed rule:
//!
//! - `IgnoreKeys(keys)`: drop only the listed keys (default: `field_id`).
//! - `IgnoreAll`: drop every metadata entry.
//! - `KeepAll`: compare metadata verbatim.
//!
//! The policy is applied recursively to nested struct and list fields.

use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Metadata key backends use for internal field identifiers.
pub const FIELD_ID_KEY: &str = "field_id";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int64,
    Float64,
    Numeric { precision: u8, scale: i8 },
    Utf8,
    Binary,
    /// Calendar date.
    Date,
    /// Microsecond-precision UTC timestamp.
    Timestamp,
    Struct(Vec<Field>),
    List(Box<DataType>),
}

impl DataType {
    /// True when both types are the same once all field metadata is disregarded.
    pub fn same_logical_type(&self, other: &DataType) -> bool {
        let policy = MetadataPolicy::IgnoreAll;
        self.normalized(&policy) == other.normalized(&policy)
    }

    pub(crate) fn normalized(&self, policy: &MetadataPolicy) -> DataType {
        match self {
            DataType::Struct(fields) => {
                DataType::Struct(fields.iter().map(|f| f.normalized(policy)).collect())
            }
            DataType::List(inner) => DataType::List(Box::new(inner.normalized(policy))),
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    fn normalized(&self, policy: &MetadataPolicy) -> Field {
        let metadata = self
            .metadata
            .iter()
            .filter(|(k, _)| !policy.ignores(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Field {
            name: self.name.clone(),
            data_type: self.data_type.normalized(policy),
            nullable: self.nullable,
            metadata,
        }
    }
}

/// Ordered set of fields read by a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Sub-schema containing the named fields, in the order given.
    pub fn select(&self, names: &[&str]) -> Result<Schema> {
        let fields = names
            .iter()
            .map(|name| {
                self.field(name)
                    .cloned()
                    .ok_or_else(|| ScanError::UnknownColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema { fields })
    }

    /// Copy of this schema with metadata stripped according to `policy`.
    pub fn normalized(&self, policy: &MetadataPolicy) -> Schema {
        Schema {
            fields: self.fields.iter().map(|f| f.normalized(policy)).collect(),
        }
    }
}

/// Which field metadata to disregard when comparing schemas for plan identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataPolicy {
    IgnoreAll,
    IgnoreKeys(BTreeSet<String>),
    KeepAll,
}

impl MetadataPolicy {
    pub fn ignore_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MetadataPolicy::IgnoreKeys(keys.into_iter().map(Into::into).collect())
    }

    pub fn ignores(&self, key: &str) -> bool {
        match self {
            MetadataPolicy::IgnoreAll => true,
            MetadataPolicy::IgnoreKeys(keys) => keys.contains(key),
            MetadataPolicy::KeepAll => false,
        }
    }
}

impl Default for MetadataPolicy {
    fn default() -> Self {
        MetadataPolicy::ignore_keys([FIELD_ID_KEY])
    }
}
