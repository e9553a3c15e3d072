//! Static field tables describing a composite's named children.

use crate::{Item, LeafItem, LeafKind, MapItem};

/// What a declared field holds.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A scalar leaf.
    Leaf(LeafKind),
    /// A nested composite, built blank by the given function.
    Map(fn() -> MapItem),
}

/// One named child of a composite: the element name plus its shape.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn leaf(name: &'static str, kind: LeafKind) -> Self {
        Self {
            name,
            kind: FieldKind::Leaf(kind),
        }
    }

    pub const fn map(name: &'static str, factory: fn() -> MapItem) -> Self {
        Self {
            name,
            kind: FieldKind::Map(factory),
        }
    }

    /// A blank child for this field.
    pub fn instantiate(&self) -> Item {
        match self.kind {
            FieldKind::Leaf(kind) => LeafItem::blank(self.name, kind).into(),
            FieldKind::Map(factory) => {
                let map = factory();
                debug_assert_eq!(map.item_type(), self.name, "nested field name mismatch");
                map.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Progress, Registry, Token};

    fn position() -> MapItem {
        MapItem::from_fields(
            "position",
            "",
            &[Field::leaf("x", LeafKind::Int), Field::leaf("y", LeafKind::Int)],
        )
    }

    const CARD: &[Field] = &[
        Field::leaf("name", LeafKind::String),
        Field::map("position", position),
    ];

    #[test]
    fn test_instantiate_builds_blank_children() {
        let card = MapItem::from_fields("card", "", CARD);
        let names: Vec<_> = card.named_children().iter().map(Item::item_type).collect();
        assert_eq!(names, vec!["name", "position"]);
        assert!(card.is_empty());
    }

    #[test]
    fn test_nested_map_field_parses() {
        let registry = Registry::default();
        let mut card = MapItem::from_fields("card", "", CARD);
        let tokens = [
            Token::start("card"),
            Token::start("position"),
            Token::start("y"),
            Token::characters("20"),
            Token::end("y"),
            Token::end("position"),
            Token::end("card"),
        ];
        let mut progress = Progress::Pending;
        for token in &tokens {
            progress = card.feed(token, &registry).unwrap();
        }
        assert_eq!(progress, Progress::Complete);

        let position = card.named("position").and_then(Item::as_map).unwrap();
        assert_eq!(position.leaf_data::<i32>("y"), 20);
        assert_eq!(position.leaf_data::<i32>("x"), -1);
        assert!(card.repeated().is_empty());
    }
}
