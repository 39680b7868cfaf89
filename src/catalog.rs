use serde::{Deserialize, Serialize};

// --- Category ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Animals,
    Colors,
    Shapes,
}

impl Category {
    pub fn to_key(self) -> &'static str {
        match self {
            Category::Animals => "animals",
            Category::Colors => "colors",
            Category::Shapes => "shapes",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "animals" => Some(Category::Animals),
            "colors" => Some(Category::Colors),
            "shapes" => Some(Category::Shapes),
            _ => None,
        }
    }

    /// Fixed order; the weighted category draw walks this slice.
    pub fn all() -> &'static [Category] {
        &[Category::Animals, Category::Colors, Category::Shapes]
    }
}

// --- Items ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemAttrs {
    Animal { sound: &'static str },
    Color { hex: &'static str, pattern: &'static str },
    Shape { sides: u32 },
}

/// One catalog entry. Created at compile time, never mutated.
/// Names are unique within a category; equality checks use them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Item {
    pub glyph: &'static str,
    pub name: &'static str,
    pub attrs: ItemAttrs,
}

const ANIMALS: &[Item] = &[
    Item { glyph: "🐶", name: "dog", attrs: ItemAttrs::Animal { sound: "woof" } },
    Item { glyph: "🐱", name: "cat", attrs: ItemAttrs::Animal { sound: "meow" } },
    Item { glyph: "🐰", name: "rabbit", attrs: ItemAttrs::Animal { sound: "hop" } },
    Item { glyph: "🐸", name: "frog", attrs: ItemAttrs::Animal { sound: "ribbit" } },
    Item { glyph: "🐷", name: "pig", attrs: ItemAttrs::Animal { sound: "oink" } },
    Item { glyph: "🐮", name: "cow", attrs: ItemAttrs::Animal { sound: "moo" } },
    Item { glyph: "🐯", name: "tiger", attrs: ItemAttrs::Animal { sound: "roar" } },
    Item { glyph: "🐻", name: "bear", attrs: ItemAttrs::Animal { sound: "growl" } },
    Item { glyph: "🦊", name: "fox", attrs: ItemAttrs::Animal { sound: "yip" } },
    Item { glyph: "🐨", name: "koala", attrs: ItemAttrs::Animal { sound: "chirp" } },
];

const COLORS: &[Item] = &[
    Item { glyph: "🔴", name: "red", attrs: ItemAttrs::Color { hex: "#FF6B6B", pattern: "●" } },
    Item { glyph: "🔵", name: "blue", attrs: ItemAttrs::Color { hex: "#4ECDC4", pattern: "▲" } },
    Item { glyph: "🟡", name: "yellow", attrs: ItemAttrs::Color { hex: "#FFD93D", pattern: "■" } },
    Item { glyph: "🟢", name: "green", attrs: ItemAttrs::Color { hex: "#6BCF7F", pattern: "◆" } },
    Item { glyph: "🟠", name: "orange", attrs: ItemAttrs::Color { hex: "#FFB347", pattern: "★" } },
    Item { glyph: "🟣", name: "purple", attrs: ItemAttrs::Color { hex: "#B19CD9", pattern: "♦" } },
    Item { glyph: "🟤", name: "brown", attrs: ItemAttrs::Color { hex: "#D2B48C", pattern: "▼" } },
    Item { glyph: "⚫", name: "black", attrs: ItemAttrs::Color { hex: "#4A5568", pattern: "●" } },
];

const SHAPES: &[Item] = &[
    Item { glyph: "⭐", name: "star", attrs: ItemAttrs::Shape { sides: 5 } },
    Item { glyph: "❤️", name: "heart", attrs: ItemAttrs::Shape { sides: 0 } },
    Item { glyph: "⚡", name: "lightning", attrs: ItemAttrs::Shape { sides: 0 } },
    Item { glyph: "🌙", name: "moon", attrs: ItemAttrs::Shape { sides: 0 } },
    Item { glyph: "☀️", name: "sun", attrs: ItemAttrs::Shape { sides: 0 } },
    Item { glyph: "🔸", name: "diamond", attrs: ItemAttrs::Shape { sides: 4 } },
    Item { glyph: "🔹", name: "diamond-blue", attrs: ItemAttrs::Shape { sides: 4 } },
    Item { glyph: "🔶", name: "diamond-orange", attrs: ItemAttrs::Shape { sides: 4 } },
];

pub fn items_of(category: Category) -> &'static [Item] {
    match category {
        Category::Animals => ANIMALS,
        Category::Colors => COLORS,
        Category::Shapes => SHAPES,
    }
}
