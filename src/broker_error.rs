//! Broker response error codes.
//!
//! Kept as a plain exhaustive match rather than the `unsafe { mem::transmute }`
//! trick used elsewhere in this codebase for small dense enums: error codes
//! are sparse and the reserved/unknown-in-this-client-version case needs a
//! real fallback variant, which a transmute can't give you.

/// The subset of broker error codes a consumer/producer of the legacy
/// message format needs to recognize. `for_code` never panics: an
/// unrecognized code maps to `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrokerErrorKind {
    Unknown,
    None,
    OffsetOutOfRange,
    CorruptMessage,
    UnknownTopicOrPartition,
    InvalidMessageSize,
    LeaderNotAvailable,
    NotLeaderForPartition,
    RequestTimedOut,
    BrokerNotAvailable,
    MessageTooLarge,
    UnsupportedForMessageFormat,
}

impl BrokerErrorKind {
    pub fn code(self) -> i16 {
        match self {
            BrokerErrorKind::Unknown => -1,
            BrokerErrorKind::None => 0,
            BrokerErrorKind::OffsetOutOfRange => 1,
            BrokerErrorKind::CorruptMessage => 2,
            BrokerErrorKind::UnknownTopicOrPartition => 3,
            BrokerErrorKind::InvalidMessageSize => 4,
            BrokerErrorKind::LeaderNotAvailable => 5,
            BrokerErrorKind::NotLeaderForPartition => 6,
            BrokerErrorKind::RequestTimedOut => 7,
            BrokerErrorKind::BrokerNotAvailable => 8,
            BrokerErrorKind::MessageTooLarge => 10,
            BrokerErrorKind::UnsupportedForMessageFormat => 43,
        }
    }

    pub fn retriable(self) -> bool {
        matches!(
            self,
            BrokerErrorKind::LeaderNotAvailable
                | BrokerErrorKind::NotLeaderForPartition
                | BrokerErrorKind::RequestTimedOut
                | BrokerErrorKind::BrokerNotAvailable
        )
    }
}

/// Looks up the `BrokerErrorKind` for a wire error code, the way a client
/// maps a broker response's `error_code` field before surfacing it.
pub fn for_code(code: i16) -> BrokerErrorKind {
    match code {
        0 => BrokerErrorKind::None,
        1 => BrokerErrorKind::OffsetOutOfRange,
        2 => BrokerErrorKind::CorruptMessage,
        3 => BrokerErrorKind::UnknownTopicOrPartition,
        4 => BrokerErrorKind::InvalidMessageSize,
        5 => BrokerErrorKind::LeaderNotAvailable,
        6 => BrokerErrorKind::NotLeaderForPartition,
        7 => BrokerErrorKind::RequestTimedOut,
        8 => BrokerErrorKind::BrokerNotAvailable,
        10 => BrokerErrorKind::MessageTooLarge,
        43 => BrokerErrorKind::UnsupportedForMessageFormat,
        _ => BrokerErrorKind::Unknown,
    }
}
