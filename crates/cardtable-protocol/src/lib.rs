//! Cardtable's protocol messages.
//!
//! Built on the item trees from `cardtable-item`, this crate declares
//! what actually travels between client and server:
//!
//! - **Scopes** ([`CommandScope`], [`GameEventScope`], …): routing
//!   fields carried on a message's tag.
//! - **Messages** ([`Message`], [`message!`]): typed structs that
//!   convert to and from composites.
//! - **Catalogue** ([`command`], [`event`], [`Response`]): the concrete
//!   messages, gathered in the [`Command`] and [`Event`] enums.
//! - **Dispatch** ([`ProtocolItem`], [`registry()`]): the registry that
//!   lets the decoder build blank messages, and typing of the result.
//!
//! # Example
//!
//! ```
//! use cardtable_protocol::{command, Command, GameCommandScope, Message, ProtocolItem};
//!
//! let roll = command::RollDie { scope: GameCommandScope::new(1, 4), sides: 20 };
//! let item = roll.to_item();
//!
//! let ProtocolItem::Command(typed) = ProtocolItem::from_item(&item)? else {
//!     unreachable!();
//! };
//! assert_eq!(typed, Command::RollDie(roll));
//! # Ok::<(), cardtable_protocol::ProtocolError>(())
//! ```

mod catalogue;
pub mod command;
mod error;
pub mod event;
mod info;
mod message;
mod response;
mod scope;

pub use catalogue::{ProtocolItem, register_protocol, registry};
pub use command::Command;
pub use error::ProtocolError;
pub use event::Event;
pub use info::{ChannelInfo, GameInfo};
pub use message::Message;
pub use response::{Response, ResponseCode};
pub use scope::{
    CHANNEL_ATTRIBUTE, CMD_ID_ATTRIBUTE, ChatCommandScope, ChatEventScope,
    CommandScope, EventScope, GAME_ID_ATTRIBUTE, GameCommandScope,
    GameEventScope, PLAYER_ID_ATTRIBUTE, Scope,
};

#[doc(hidden)]
pub mod __private {
    pub use cardtable_item::{Field, LeafData, MapItem};
}
