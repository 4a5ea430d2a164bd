//! Shape - closed classification of object layouts.

/// Size hints for layouts without a dedicated rule
///
/// The estimate is `basic_size + item_size * items`, plus the GC header when
/// `gc_tracked` is set. All sizes are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenericLayout {
    pub basic_size: u64,
    pub item_size: u64,
    pub items: u64,
    pub gc_tracked: bool,
}

impl GenericLayout {
    pub const fn fixed(basic_size: u64, gc_tracked: bool) -> Self {
        Self {
            basic_size,
            item_size: 0,
            items: 0,
            gc_tracked,
        }
    }
}

/// Layout family of one object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The absence sentinel
    None,
    /// Small integer
    Int,
    /// Byte text of `len` bytes
    Bytes { len: u64 },
    /// Wide text of `code_points` characters
    Text { code_points: u64 },
    /// Fixed-arity container
    Tuple { slots: u64 },
    /// Growable sequence; `capacity` is the allocated slot count
    List { capacity: u64 },
    /// Hash set; `table_slots` is 0 while the inline table is in use
    Set { table_slots: u64 },
    /// Hash mapping; `table_slots` is 0 while the inline table is in use
    Dict { table_slots: u64 },
    /// Type/class metadata
    Type,
    /// Instance with an attribute dict
    Instance,
    /// Instance with `slots` declared slots, inherited ones included
    Slotted { slots: u64 },
    /// Instance of the root class with no fields
    Bare,
    /// Executable code metadata
    Code(GenericLayout),
    /// Anything else the runtime can describe
    Other(GenericLayout),
}

impl Shape {
    /// Leaf shapes have no outgoing references and are written inline
    /// after the record that references them.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Shape::None
                | Shape::Int
                | Shape::Bytes { .. }
                | Shape::Text { .. }
                | Shape::Code(_)
                | Shape::Bare
        )
    }

    /// True if the object carries a GC bookkeeping header
    pub fn is_gc_tracked(&self) -> bool {
        match self {
            Shape::None | Shape::Int | Shape::Bytes { .. } | Shape::Text { .. } | Shape::Bare => {
                false
            }
            Shape::Tuple { .. }
            | Shape::List { .. }
            | Shape::Set { .. }
            | Shape::Dict { .. }
            | Shape::Type
            | Shape::Instance
            | Shape::Slotted { .. } => true,
            Shape::Code(layout) | Shape::Other(layout) => layout.gc_tracked,
        }
    }

    /// True for shapes whose record carries a `value`
    pub fn has_value(&self) -> bool {
        matches!(self, Shape::Int | Shape::Bytes { .. } | Shape::Text { .. })
    }
}
