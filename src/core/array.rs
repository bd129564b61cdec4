//! Dense in-memory arrays.
//!
//! [`ArrayBuffer`] holds a flat, typed, row-major element buffer and
//! [`DenseArray`] pairs it with its [`Shape`].

use half::f16;

use crate::util::{Bool, Element, ElementType, Error, Result, Shape};

/// Flat typed element buffer (row-major).
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayBuffer {
    Bool(Vec<Bool>),
    Uint8(Vec<u8>),
    Int8(Vec<i8>),
    Uint16(Vec<u16>),
    Int16(Vec<i16>),
    Uint32(Vec<u32>),
    Int32(Vec<i32>),
    Uint64(Vec<u64>),
    Int64(Vec<i64>),
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Run `$body` with `$v` bound to the typed vector inside an [`ArrayBuffer`].
macro_rules! with_buffer {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            ArrayBuffer::Bool($v) => $body,
            ArrayBuffer::Uint8($v) => $body,
            ArrayBuffer::Int8($v) => $body,
            ArrayBuffer::Uint16($v) => $body,
            ArrayBuffer::Int16($v) => $body,
            ArrayBuffer::Uint32($v) => $body,
            ArrayBuffer::Int32($v) => $body,
            ArrayBuffer::Uint64($v) => $body,
            ArrayBuffer::Int64($v) => $body,
            ArrayBuffer::Float16($v) => $body,
            ArrayBuffer::Float32($v) => $body,
            ArrayBuffer::Float64($v) => $body,
        }
    };
}

/// Build an [`ArrayBuffer`] of type `$ty`, evaluating `$make::<T>()` for the matching element type.
macro_rules! buffer_of_type {
    ($ty:expr, $make:ident ( $($arg:expr),* )) => {
        match $ty {
            ElementType::Bool => ArrayBuffer::Bool($make::<Bool>($($arg),*)),
            ElementType::Uint8 => ArrayBuffer::Uint8($make::<u8>($($arg),*)),
            ElementType::Int8 => ArrayBuffer::Int8($make::<i8>($($arg),*)),
            ElementType::Uint16 => ArrayBuffer::Uint16($make::<u16>($($arg),*)),
            ElementType::Int16 => ArrayBuffer::Int16($make::<i16>($($arg),*)),
            ElementType::Uint32 => ArrayBuffer::Uint32($make::<u32>($($arg),*)),
            ElementType::Int32 => ArrayBuffer::Int32($make::<i32>($($arg),*)),
            ElementType::Uint64 => ArrayBuffer::Uint64($make::<u64>($($arg),*)),
            ElementType::Int64 => ArrayBuffer::Int64($make::<i64>($($arg),*)),
            ElementType::Float16 => ArrayBuffer::Float16($make::<f16>($($arg),*)),
            ElementType::Float32 => ArrayBuffer::Float32($make::<f32>($($arg),*)),
            ElementType::Float64 => ArrayBuffer::Float64($make::<f64>($($arg),*)),
        }
    };
}

fn cast_bytes<T: Element>(bytes: &[u8]) -> Vec<T> {
    // pod_collect_to_vec copies, so unaligned input is fine
    bytemuck::pod_collect_to_vec(bytes)
}

fn convert_values<T: Element>(values: &[f64]) -> Vec<T> {
    values.iter().map(|&v| T::from_f64(v)).collect()
}

impl ArrayBuffer {
    /// Element type of this buffer.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Bool(_) => ElementType::Bool,
            Self::Uint8(_) => ElementType::Uint8,
            Self::Int8(_) => ElementType::Int8,
            Self::Uint16(_) => ElementType::Uint16,
            Self::Int16(_) => ElementType::Int16,
            Self::Uint32(_) => ElementType::Uint32,
            Self::Int32(_) => ElementType::Int32,
            Self::Uint64(_) => ElementType::Uint64,
            Self::Int64(_) => ElementType::Int64,
            Self::Float16(_) => ElementType::Float16,
            Self::Float32(_) => ElementType::Float32,
            Self::Float64(_) => ElementType::Float64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_buffer!(self, v => v.len())
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode little-endian raw bytes as elements of type `ty`.
    pub fn from_le_bytes(ty: ElementType, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % ty.num_bytes() != 0 {
            return Err(Error::invalid(format!(
                "{} bytes is not a whole number of {} elements",
                bytes.len(),
                ty
            )));
        }
        Ok(buffer_of_type!(ty, cast_bytes(bytes)))
    }

    /// Convert JSON-sourced numbers into a buffer of type `ty`.
    pub fn from_f64_values(ty: ElementType, values: &[f64]) -> Self {
        buffer_of_type!(ty, convert_values(values))
    }

    /// Borrow the elements as a typed slice, if `T` matches the element type.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        if T::ELEMENT_TYPE != self.element_type() {
            return None;
        }
        with_buffer!(self, v => bytemuck::try_cast_slice(v.as_slice()).ok())
    }

    /// Every `step`-th element converted to f64, starting at index 0.
    pub fn strided_f64(&self, step: usize) -> Vec<f64> {
        with_buffer!(self, v => v.iter().step_by(step.max(1)).map(|x| x.to_f64()).collect())
    }
}

/// A dense array: a shape plus a matching element buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseArray {
    shape: Shape,
    buffer: ArrayBuffer,
}

impl DenseArray {
    /// Create an array, checking the buffer length against the shape.
    pub fn new(shape: Shape, buffer: ArrayBuffer) -> Result<Self> {
        let len = shape.checked_len()?;
        if buffer.len() != len {
            return Err(Error::invalid(format!(
                "shape {} needs {} elements, buffer holds {}",
                shape,
                len,
                buffer.len()
            )));
        }
        Ok(Self { shape, buffer })
    }

    /// Shape of the array.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Element type of the array.
    pub fn element_type(&self) -> ElementType {
        self.buffer.element_type()
    }

    /// The underlying element buffer.
    pub fn buffer(&self) -> &ArrayBuffer {
        &self.buffer
    }

    /// Consume into the element buffer.
    pub fn into_buffer(self) -> ArrayBuffer {
        self.buffer
    }

    /// Borrow the elements as a typed slice.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        self.buffer.as_slice()
    }

    /// Take every `step`-th sample and split it into one f64 sequence per channel.
    ///
    /// Channels are the trailing dimensions flattened in row-major order, so a
    /// `(n,)` array gives one channel and `(n, c)` gives `c`. NaN becomes 0.0.
    pub fn decimated_channels(&self, step: usize) -> Vec<Vec<f64>> {
        let rows = self.shape.num_samples();
        // validated in `new`
        let width = self.shape.sample_len().unwrap_or(0);
        with_buffer!(&self.buffer, v => split_channels(v, rows, width, step.max(1)))
    }
}

fn split_channels<T: Element>(values: &[T], rows: usize, width: usize, step: usize) -> Vec<Vec<f64>> {
    (0..width)
        .map(|channel| {
            (0..rows)
                .step_by(step)
                .map(|row| {
                    let v = values[row * width + channel].to_f64();
                    if v.is_nan() { 0.0 } else { v }
                })
                .collect()
        })
        .collect()
}
