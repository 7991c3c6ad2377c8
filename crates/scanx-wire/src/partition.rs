//! # Partition Handle Encoding
//!
//! A handle is encoded as its index plus a `oneof` carrying either the batch or the
//! row descriptor, so the decoded handle keeps the enumeration mode it was planned in.

use crate::WireError;
use prost::Message;
use scanx_core::partition::{BatchPartitionContext, PartitionContext, RowPartitionContext};
use scanx_core::PartitionHandle;

pub fn encode_partition(handle: &PartitionHandle) -> Vec<u8> {
    let context = match &handle.context {
        PartitionContext::Batch(b) => partition_handle_proto::Context::Batch(BatchPartitionProto {
            streams: b.streams.clone(),
            selected_fields: b.selected_fields.clone(),
        }),
        PartitionContext::Row(r) => partition_handle_proto::Context::Row(RowPartitionProto {
            stream: r.stream.clone(),
            selected_fields: r.selected_fields.clone(),
        }),
    };
    PartitionHandleProto {
        index: handle.index,
        context: Some(context),
    }
    .encode_to_vec()
}

pub fn decode_partition(bytes: &[u8]) -> Result<PartitionHandle, WireError> {
    let proto = PartitionHandleProto::decode(bytes)?;
    let context = match proto.context {
        Some(partition_handle_proto::Context::Batch(b)) => {
            PartitionContext::Batch(BatchPartitionContext {
                streams: b.streams,
                selected_fields: b.selected_fields,
            })
        }
        Some(partition_handle_proto::Context::Row(r)) => PartitionContext::Row(RowPartitionContext {
            stream: r.stream,
            selected_fields: r.selected_fields,
        }),
        None => return Err(WireError::MissingContext(proto.index)),
    };
    Ok(PartitionHandle::new(proto.index, context))
}

#[derive(Clone, PartialEq, Message)]
pub struct PartitionHandleProto {
    #[prost(uint32, tag = "1")]
    pub index: u32,
    #[prost(oneof = "partition_handle_proto::Context", tags = "2, 3")]
    pub context: Option<partition_handle_proto::Context>,
}

pub mod partition_handle_proto {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Context {
        #[prost(message, tag = "2")]
        Batch(super::BatchPartitionProto),
        #[prost(message, tag = "3")]
        Row(super::RowPartitionProto),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct BatchPartitionProto {
    #[prost(string, repeated, tag = "1")]
    pub streams: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub selected_fields: Vec<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RowPartitionProto {
    #[prost(string, tag = "1")]
    pub stream: String,
    #[prost(string, repeated, tag = "2")]
    pub selected_fields: Vec<String>,
}
