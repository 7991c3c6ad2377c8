//! # Statistics Encoding
//!
//! Statistics are packed into a protobuf `Any` with a custom type URL so the receiver
//! can tell them apart from other extensions carried with a plan. Both estimates are
//! proto3 `optional` fields: an unknown estimate is absent on the wire, and decoding
//! restores it as `None` rather than zero.

use prost::Message;
use prost_types::Any;
use scanx_core::Statistics;

const STATS_TYPE_URL: &str = "type.googleapis.com/scanx.ScanStatistics";

pub fn encode_statistics(stats: &Statistics) -> Any {
    let msg = ScanStatisticsProto {
        row_count: stats.row_count,
        size_in_bytes: stats.size_in_bytes,
    };
    Any {
        type_url: STATS_TYPE_URL.into(),
        value: msg.encode_to_vec(),
    }
}

/// `None` if `any` is not a statistics message or cannot be decoded.
pub fn decode_statistics(any: &Any) -> Option<Statistics> {
    if any.type_url != STATS_TYPE_URL {
        return None;
    }
    let msg = ScanStatisticsProto::decode(&any.value[..]).ok()?;
    Some(Statistics {
        row_count: msg.row_count,
        size_in_bytes: msg.size_in_bytes,
    })
}

#[derive(Clone, PartialEq, Message)]
pub struct ScanStatisticsProto {
    #[prost(uint64, optional, tag = "1")]
    pub row_count: Option<u64>,
    #[prost(uint64, optional, tag = "2")]
    pub size_in_bytes: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_survives_transport() {
        let stats = Statistics {
            row_count: None,
            size_in_bytes: Some(0),
        };
        let decoded = decode_statistics(&encode_statistics(&stats)).unwrap();
        assert_eq!(decoded.row_count, None);
        assert_eq!(decoded.size_in_bytes, Some(0));
    }

    #[test]
    fn test_foreign_type_url_is_ignored() {
        let mut any = encode_statistics(&Statistics::default());
        any.type_url = "type.googleapis.com/other.Message".into();
        assert_eq!(decode_statistics(&any), None);
    }
}
