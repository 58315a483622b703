use std::fmt::{self, Display};

/// Kind of a type, before any qualifiers or nested types are applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    None,
    AutoInfer,
    Alias,
    AnyArgument,
    FakeContext,
    FakeLineInfo,
    Void,
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int,
    Int2,
    Int3,
    Int4,
    UInt,
    UInt2,
    UInt3,
    UInt4,
    Int64,
    UInt64,
    Float,
    Float2,
    Float3,
    Float4,
    Double,
    Range,
    URange,
    String,
    Pointer,
    Enumeration,
    Enumeration8,
    Enumeration16,
    Structure,
    Handle,
    Array,
    Table,
    Iterator,
    Block,
    Function,
    Lambda,
    Tuple,
    Variant,
}

impl BaseType {
    /// Name of the type as written in source code.
    pub fn name(&self) -> &'static str {
        use BaseType::*;
        match self {
            None => "none",
            AutoInfer => "auto",
            Alias => "alias",
            AnyArgument => "any",
            FakeContext => "__context",
            FakeLineInfo => "__lineInfo",
            Void => "void",
            Bool => "bool",
            Int8 => "int8",
            UInt8 => "uint8",
            Int16 => "int16",
            UInt16 => "uint16",
            Int => "int",
            Int2 => "int2",
            Int3 => "int3",
            Int4 => "int4",
            UInt => "uint",
            UInt2 => "uint2",
            UInt3 => "uint3",
            UInt4 => "uint4",
            Int64 => "int64",
            UInt64 => "uint64",
            Float => "float",
            Float2 => "float2",
            Float3 => "float3",
            Float4 => "float4",
            Double => "double",
            Range => "range",
            URange => "urange",
            String => "string",
            Pointer => "pointer",
            Enumeration => "enum",
            Enumeration8 => "enum8",
            Enumeration16 => "enum16",
            Structure => "structure",
            Handle => "handle",
            Array => "array",
            Table => "table",
            Iterator => "iterator",
            Block => "block",
            Function => "function",
            Lambda => "lambda",
            Tuple => "tuple",
            Variant => "variant",
        }
    }

    pub fn is_integer(&self) -> bool {
        use BaseType::*;
        matches!(
            self,
            Int8 | UInt8 | Int16 | UInt16 | Int | UInt | Int64 | UInt64
        )
    }

    pub fn is_signed(&self) -> bool {
        use BaseType::*;
        matches!(self, Int8 | Int16 | Int | Int64 | Float | Double)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, BaseType::Float | BaseType::Double)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_enum(&self) -> bool {
        use BaseType::*;
        matches!(self, Enumeration | Enumeration8 | Enumeration16)
    }

    pub fn is_vector(&self) -> bool {
        self.vector_dim() > 1
    }

    /// Number of components in a vector type, `1` for scalars and `0` for everything else.
    pub fn vector_dim(&self) -> usize {
        use BaseType::*;
        match self {
            Int2 | UInt2 | Float2 | Range | URange => 2,
            Int3 | UInt3 | Float3 => 3,
            Int4 | UInt4 | Float4 => 4,
            Bool | Int8 | UInt8 | Int16 | UInt16 | Int | UInt | Int64 | UInt64 | Float | Double => 1,
            _ => 0,
        }
    }

    /// Component type of a vector.
    pub fn vector_base_type(&self) -> BaseType {
        use BaseType::*;
        match self {
            Int2 | Int3 | Int4 | Range => Int,
            UInt2 | UInt3 | UInt4 | URange => UInt,
            Float2 | Float3 | Float4 => Float,
            other => *other,
        }
    }

    /// Size of a value of this kind, when it does not depend on nested types.
    pub fn size_of(&self) -> Option<usize> {
        use BaseType::*;
        let size = match self {
            None | AutoInfer | Alias | AnyArgument | Void => 0,
            FakeContext | FakeLineInfo => 8,
            Bool | Int8 | UInt8 | Enumeration8 => 1,
            Int16 | UInt16 | Enumeration16 => 2,
            Int | UInt | Float | Enumeration | Function => 4,
            Int2 | UInt2 | Float2 | Range | URange => 8,
            Int3 | UInt3 | Float3 => 12,
            Int4 | UInt4 | Float4 => 16,
            Int64 | UInt64 | Double => 8,
            String | Pointer | Iterator | Lambda => 8,
            Array => 24,
            Table => 48,
            Block => 32,
            Structure | Handle | Tuple | Variant => return Option::None,
        };
        Some(size)
    }

    /// Alignment of a value of this kind, when it does not depend on nested types.
    pub fn align_of(&self) -> Option<usize> {
        use BaseType::*;
        let align = match self {
            None | AutoInfer | Alias | AnyArgument | Void => 1,
            Bool | Int8 | UInt8 | Enumeration8 => 1,
            Int16 | UInt16 | Enumeration16 => 2,
            Int | UInt | Float | Enumeration | Function => 4,
            Int3 | UInt3 | Float3 => 4,
            Int2 | UInt2 | Float2 | Range | URange => 8,
            Int4 | UInt4 | Float4 => 16,
            Int64 | UInt64 | Double => 8,
            FakeContext | FakeLineInfo => 8,
            String | Pointer | Iterator | Lambda | Array | Table | Block => 8,
            Structure | Handle | Tuple | Variant => return Option::None,
        };
        Some(align)
    }
}

impl Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
