//! # scanx-wire: Protobuf Interchange
//!
//! Partition handles are planned on the coordinator and opened on whichever execution
//! unit the engine schedules them to, so they must cross a process boundary. This
//! crate provides a compact protobuf encoding for them, plus an encoding of scan
//! statistics as a `prost_types::Any` so they can travel alongside a serialized plan.
//!
//! Messages are declared with `prost` derive macros directly on Rust structs, so no
//! `.proto` file or `protoc` build step is needed. Field tags are part of the wire
//! format and must remain stable.
//!
//! ## Module Overview
//!
//! - **`partition`**: `encode_partition` / `decode_partition`.
//! - **`statistics`**: `encode_statistics` / `decode_statistics`.

pub mod partition;
pub mod statistics;

pub use partition::{decode_partition, encode_partition};
pub use statistics::{decode_statistics, encode_statistics};

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The bytes are not a valid encoded message.
    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),
    /// A partition handle was encoded without its backend descriptor.
    #[error("Partition handle {0} has no partition context")]
    MissingContext(u32),
}
