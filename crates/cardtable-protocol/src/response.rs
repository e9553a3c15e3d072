//! The server's answer to a command.
//!
//! ```text
//! <response cmd_id="7" code="ok"></response>
//! ```
//!
//! Both fields ride on the tag; a response has no children.

use std::fmt;

use cardtable_item::{Item, MapItem};

use crate::scope::CMD_ID_ATTRIBUTE;

const CODE_ATTRIBUTE: &str = "code";

/// Outcome of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseCode {
    Ok,
    /// The command was unknown, malformed, or not allowed right now.
    #[default]
    InvalidCommand,
    NameNotFound,
    LoginNeeded,
    /// The command names a game or channel the client isn't part of.
    ContextError,
    WrongPassword,
    SpectatorsNotAllowed,
}

impl ResponseCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::InvalidCommand => "invalid_command",
            Self::NameNotFound => "name_not_found",
            Self::LoginNeeded => "login_needed",
            Self::ContextError => "context_error",
            Self::WrongPassword => "wrong_password",
            Self::SpectatorsNotAllowed => "spectators_not_allowed",
        }
    }

    /// Parses a wire code. Anything unknown reads as
    /// [`InvalidCommand`](Self::InvalidCommand).
    pub fn from_wire(code: &str) -> Self {
        match code {
            "ok" => Self::Ok,
            "invalid_command" => Self::InvalidCommand,
            "name_not_found" => Self::NameNotFound,
            "login_needed" => Self::LoginNeeded,
            "context_error" => Self::ContextError,
            "wrong_password" => Self::WrongPassword,
            "spectators_not_allowed" => Self::SpectatorsNotAllowed,
            other => {
                tracing::debug!(code = other, "unknown response code");
                Self::InvalidCommand
            }
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply to the command with the same `cmd_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub cmd_id: i32,
    pub code: ResponseCode,
}

impl Response {
    pub const ITEM_TYPE: &'static str = "response";

    pub fn new(cmd_id: i32, code: ResponseCode) -> Self {
        Self { cmd_id, code }
    }

    pub fn ok(cmd_id: i32) -> Self {
        Self::new(cmd_id, ResponseCode::Ok)
    }

    pub fn blank_item() -> Item {
        MapItem::new(Self::ITEM_TYPE, "").into()
    }

    pub fn matches(map: &MapItem) -> bool {
        map.item_type() == Self::ITEM_TYPE && map.sub_type().is_empty()
    }

    pub fn to_map(&self) -> MapItem {
        let mut map = MapItem::new(Self::ITEM_TYPE, "");
        map.set_attribute(CMD_ID_ATTRIBUTE, self.cmd_id.to_string());
        map.set_attribute(CODE_ATTRIBUTE, self.code.as_str());
        map
    }

    pub fn to_item(&self) -> Item {
        self.to_map().into()
    }

    pub fn from_map(map: &MapItem) -> Self {
        Self {
            cmd_id: map
                .attribute(CMD_ID_ATTRIBUTE)
                .and_then(|id| id.trim().parse().ok())
                .unwrap_or(-1),
            code: map
                .attribute(CODE_ATTRIBUTE)
                .map(ResponseCode::from_wire)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for code in [
            ResponseCode::Ok,
            ResponseCode::InvalidCommand,
            ResponseCode::NameNotFound,
            ResponseCode::LoginNeeded,
            ResponseCode::ContextError,
            ResponseCode::WrongPassword,
            ResponseCode::SpectatorsNotAllowed,
        ] {
            assert_eq!(ResponseCode::from_wire(code.as_str()), code);
        }
    }

    #[test]
    fn test_unknown_code_is_invalid_command() {
        assert_eq!(ResponseCode::from_wire("banned"), ResponseCode::InvalidCommand);
    }

    #[test]
    fn test_response_map_round_trip() {
        let response = Response::new(7, ResponseCode::WrongPassword);
        let map = response.to_map();
        assert_eq!(map.attribute("code"), Some("wrong_password"));
        assert_eq!(Response::from_map(&map), response);
    }
}
