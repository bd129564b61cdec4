//! Element types - the storage types of NWB datasets.

use bytemuck::{Pod, Zeroable};
use half::f16;
use std::fmt;

/// Element type of a dataset.
///
/// These are the numeric storage types a dataset can declare. Each type has
/// a fixed size and a little-endian binary representation in external files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ElementType {
    /// Boolean (stored as u8: 0 = false, non-zero = true)
    Bool = 0,
    /// Unsigned 8-bit integer
    Uint8 = 1,
    /// Signed 8-bit integer
    Int8 = 2,
    /// Unsigned 16-bit integer
    Uint16 = 3,
    /// Signed 16-bit integer
    Int16 = 4,
    /// Unsigned 32-bit integer
    Uint32 = 5,
    /// Signed 32-bit integer
    Int32 = 6,
    /// Unsigned 64-bit integer
    Uint64 = 7,
    /// Signed 64-bit integer
    Int64 = 8,
    /// 16-bit floating point (IEEE 754 half precision)
    Float16 = 9,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 10,
    /// 64-bit floating point (IEEE 754 double precision)
    #[default]
    Float64 = 11,
}

impl ElementType {
    /// All element types, in tag order.
    pub const ALL: [ElementType; 12] = [
        Self::Bool,
        Self::Uint8,
        Self::Int8,
        Self::Uint16,
        Self::Int16,
        Self::Uint32,
        Self::Int32,
        Self::Uint64,
        Self::Int64,
        Self::Float16,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Bool | Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 | Self::Float16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 => 8,
        }
    }

    /// Returns the dtype name of this type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parse an element type from its dtype name.
    ///
    /// Accepts the short numpy-style aliases (`f8`, `i4`, `u1`, ...) too.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "bool" | "b1" => Self::Bool,
            "uint8" | "u1" => Self::Uint8,
            "int8" | "i1" => Self::Int8,
            "uint16" | "u2" => Self::Uint16,
            "int16" | "i2" => Self::Int16,
            "uint32" | "u4" => Self::Uint32,
            "int32" | "i4" => Self::Int32,
            "uint64" | "u8" => Self::Uint64,
            "int64" | "i8" => Self::Int64,
            "float16" | "f2" => Self::Float16,
            "float32" | "f4" => Self::Float32,
            "float64" | "f8" | "double" => Self::Float64,
            _ => return None,
        };
        Some(ty)
    }

    /// Returns true if this is an integer type.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Uint8
                | Self::Int8
                | Self::Uint16
                | Self::Int16
                | Self::Uint32
                | Self::Int32
                | Self::Uint64
                | Self::Int64
        )
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float16 | Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// === Element trait for type-safe conversions ===

/// Trait for types that can be stored as dataset elements.
pub trait Element: Pod + Zeroable + Copy + Default + PartialEq + fmt::Debug {
    /// The corresponding ElementType enum value.
    const ELEMENT_TYPE: ElementType;

    /// Convert to f64 for plotting. Non-finite floats are kept as-is.
    fn to_f64(self) -> f64;

    /// Convert from a JSON number. Truncates for integer types.
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_numeric_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
        }
    };
}

impl_numeric_element!(u8, Uint8);
impl_numeric_element!(i8, Int8);
impl_numeric_element!(u16, Uint16);
impl_numeric_element!(i16, Int16);
impl_numeric_element!(u32, Uint32);
impl_numeric_element!(i32, Int32);
impl_numeric_element!(u64, Uint64);
impl_numeric_element!(i64, Int64);
impl_numeric_element!(f32, Float32);
impl_numeric_element!(f64, Float64);

impl Element for f16 {
    const ELEMENT_TYPE: ElementType = ElementType::Float16;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }
}

/// Boolean type with guaranteed 1-byte storage.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Bool(u8);

impl Bool {
    pub const TRUE: Self = Self(1);
    pub const FALSE: Self = Self(0);

    #[inline]
    pub const fn new(v: bool) -> Self {
        Self(v as u8)
    }

    #[inline]
    pub const fn get(self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for Bool {
    #[inline]
    fn from(v: bool) -> Self {
        Self::new(v)
    }
}

impl fmt::Debug for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl Element for Bool {
    const ELEMENT_TYPE: ElementType = ElementType::Bool;

    #[inline]
    fn to_f64(self) -> f64 {
        if self.get() { 1.0 } else { 0.0 }
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Self::new(v != 0.0)
    }
}
