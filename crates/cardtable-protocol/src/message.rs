//! The [`Message`] trait and the [`message!`](crate::message) macro that
//! declares concrete messages.
//!
//! A message is a plain struct: a scope plus typed fields. On the wire
//! it is a [`MapItem`] whose named children come from the message's
//! static field table. The trait moves values between the two:
//!
//! ```text
//!  outbound: struct ──to_map()──→ MapItem ──write()──→ tokens
//!  inbound:  tokens ──feed()───→ MapItem ──from_map()──→ struct
//! ```
//!
//! `from_map` runs once, after the element closed, so the struct only
//! ever sees a finished tree.

use cardtable_item::{Field, Item, MapItem};

use crate::scope::Scope;

/// A concrete command or event.
pub trait Message: Sized + Default {
    /// Routing fields; also fixes the element name.
    type Scope: Scope;

    /// Value of the `type` attribute.
    const SUB_TYPE: &'static str;

    /// Named children, in wire order.
    const FIELDS: &'static [Field];

    fn scope(&self) -> &Self::Scope;

    /// Builds the message from a closed element. Fields missing from the
    /// element come back as their sentinels.
    fn extract(scope: Self::Scope, map: &MapItem) -> Self;

    /// Copies the typed fields into a blank element.
    fn fill(&self, map: &mut MapItem);

    /// A blank element ready to be parsed into.
    fn blank_map() -> MapItem {
        MapItem::from_fields(Self::Scope::ITEM_TYPE, Self::SUB_TYPE, Self::FIELDS)
    }

    /// Registry factory for this message.
    fn blank_item() -> Item {
        Self::blank_map().into()
    }

    fn to_map(&self) -> MapItem {
        let mut map = Self::blank_map();
        self.scope().write_attributes(&mut map);
        self.fill(&mut map);
        map
    }

    fn to_item(&self) -> Item {
        self.to_map().into()
    }

    fn from_map(map: &MapItem) -> Self {
        Self::extract(Self::Scope::from_attributes(map), map)
    }

    /// True when `map` is an element of this message type.
    fn matches(map: &MapItem) -> bool {
        map.item_type() == Self::Scope::ITEM_TYPE && map.sub_type() == Self::SUB_TYPE
    }
}

/// Declares a message struct whose fields are all leaves.
///
/// ```
/// use cardtable_protocol::{GameCommandScope, Message, message};
///
/// message! {
///     /// Flips a coin.
///     FlipCoin: GameCommandScope, "flip_coin" {
///         call: String = "call",
///     }
/// }
///
/// let flip = FlipCoin { call: "heads".into(), ..FlipCoin::default() };
/// assert_eq!(flip.scope.cmd_id, -1);
/// assert_eq!(FlipCoin::from_map(&flip.to_map()), flip);
/// ```
///
/// Every field type must implement `LeafData`. `Default` gives every
/// field its leaf sentinel (`-1` for integers, not `0`), so a message
/// built with `..Default::default()` omits whatever wasn't set.
#[macro_export]
macro_rules! message {
    (
        $(#[$meta:meta])*
        $name:ident: $scope:ty, $sub_type:literal {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty = $wire:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub scope: $scope,
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self {
                    scope: <$scope as ::core::default::Default>::default(),
                    $( $field: <$ty as $crate::__private::LeafData>::blank(), )*
                }
            }
        }

        impl $crate::Message for $name {
            type Scope = $scope;
            const SUB_TYPE: &'static str = $sub_type;
            const FIELDS: &'static [$crate::__private::Field] = &[
                $( $crate::__private::Field::leaf(
                    $wire,
                    <$ty as $crate::__private::LeafData>::KIND,
                ), )*
            ];

            fn scope(&self) -> &$scope {
                &self.scope
            }

            #[allow(unused_variables)]
            fn extract(scope: $scope, map: &$crate::__private::MapItem) -> Self {
                Self {
                    scope,
                    $( $field: map.leaf_data::<$ty>($wire), )*
                }
            }

            #[allow(unused_variables)]
            fn fill(&self, map: &mut $crate::__private::MapItem) {
                $( map.set_leaf($wire, ::core::clone::Clone::clone(&self.$field)); )*
            }
        }
    };
}

/// Declares an enum over message types, with registry registration and
/// typed dispatch.
macro_rules! message_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $( $variant($variant), )+
        }

        impl $name {
            /// Registers a blank factory for every variant.
            pub fn register(builder: &mut cardtable_item::RegistryBuilder) {
                $(
                    builder.register(
                        <<$variant as $crate::Message>::Scope as $crate::Scope>::ITEM_TYPE,
                        <$variant as $crate::Message>::SUB_TYPE,
                        <$variant as $crate::Message>::blank_item,
                    );
                )+
            }

            /// Types a closed element, or returns `None` when no variant
            /// has its element name and subtype.
            pub fn from_map(map: &cardtable_item::MapItem) -> Option<Self> {
                $(
                    if <$variant as $crate::Message>::matches(map) {
                        return Some(Self::$variant(
                            <$variant as $crate::Message>::from_map(map),
                        ));
                    }
                )+
                None
            }

            pub fn to_item(&self) -> cardtable_item::Item {
                match self {
                    $( Self::$variant(message) => $crate::Message::to_item(message), )+
                }
            }

            pub fn sub_type(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => <$variant as $crate::Message>::SUB_TYPE, )+
                }
            }

            /// The command id carried by the scope. `None` for events.
            pub fn cmd_id(&self) -> Option<i32> {
                match self {
                    $(
                        Self::$variant(message) => {
                            $crate::Scope::cmd_id($crate::Message::scope(message))
                        }
                    )+
                }
            }
        }

        $(
            impl From<$variant> for $name {
                fn from(message: $variant) -> Self {
                    Self::$variant(message)
                }
            }
        )+
    };
}

pub(crate) use message_enum;
