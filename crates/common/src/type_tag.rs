//! Dynamic type tags for IPPcode23 values.

/// The dynamic type of a storable value.
///
/// Also the payload of `type` literals (the target type of `READ`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Signed integer.
    Int,
    /// Boolean.
    Bool,
    /// Character string.
    String,
    /// The single `nil` value.
    Nil,
}

/// All type tags, in definition order.
pub const ALL_TYPE_TAGS: [TypeTag; 4] = [TypeTag::Int, TypeTag::Bool, TypeTag::String, TypeTag::Nil];

impl TypeTag {
    /// Returns the source-level name of this type (`int`, `bool`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Bool => "bool",
            TypeTag::String => "string",
            TypeTag::Nil => "nil",
        }
    }

    /// Look up a type by its source-level name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<TypeTag> {
        ALL_TYPE_TAGS.iter().find(|tt| tt.name() == name).copied()
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
