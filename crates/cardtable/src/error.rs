//! Unified error type for Cardtable.

use cardtable_item::ItemError;
use cardtable_protocol::ProtocolError;
use cardtable_stream::StreamError;

/// Top-level error wrapping every crate-specific error.
///
/// The `#[from]` attributes let `?` convert sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum CardtableError {
    /// The token sequence doesn't fit the item tree.
    #[error(transparent)]
    Item(#[from] ItemError),

    /// The stream is malformed, too deep, or was cut short.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// An item isn't part of the protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Binding or connecting failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stream_error() {
        let err: CardtableError = StreamError::UnexpectedEof.into();
        assert!(matches!(err, CardtableError::Stream(_)));
        assert!(err.to_string().contains("middle of an item"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: CardtableError = ProtocolError::Unrecognized {
            item_type: "command".into(),
            sub_type: "teleport".into(),
        }
        .into();
        assert!(matches!(err, CardtableError::Protocol(_)));
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn test_from_item_error() {
        let err: CardtableError = ItemError::AlreadyClosed("command".into()).into();
        assert!(matches!(err, CardtableError::Item(_)));
    }

    #[test]
    fn test_from_io_error() {
        let err: CardtableError =
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken").into();
        assert!(matches!(err, CardtableError::Io(_)));
    }
}
