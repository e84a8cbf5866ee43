/// The closed set of value types an attribute can expose.
///
/// Every attribute is tagged with one of these when it is constructed, so
/// reading a value back from a backend record never needs to inspect the
/// record to decide which accessor to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I32,
    I64,
    F32,
    F64,
    String,
    Decimal,
    Timestamp,
}

impl Type {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Type::I32 | Type::I64 | Type::F32 | Type::F64 | Type::Decimal
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, Type::String)
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Bool => "bool",
            Type::I32 => "i32",
            Type::I64 => "i64",
            Type::F32 => "f32",
            Type::F64 => "f64",
            Type::String => "String",
            Type::Decimal => "Decimal",
            Type::Timestamp => "Timestamp",
        }
    }
}

impl core::fmt::Display for Type {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
