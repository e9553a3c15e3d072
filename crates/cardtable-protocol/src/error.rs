//! Error types for the message layer.

/// Errors raised while turning items into typed protocol messages.
///
/// Parsing itself never fails here: missing or malformed fields simply
/// keep their sentinel values. The only failure is an item that doesn't
/// correspond to any message type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// No message type matches this element and subtype. Also returned
    /// for placeholders of elements the registry didn't know.
    #[error("unrecognized item <{item_type} type=\"{sub_type}\">")]
    Unrecognized { item_type: String, sub_type: String },
}
