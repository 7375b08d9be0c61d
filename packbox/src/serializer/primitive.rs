// SPDX-License-Identifier: MIT
//! Fixed-width little-endian primitive codec
//!
//! Every primitive is written with its natural width and no prefix:
//!
//! | Type        | Width |
//! |-------------|-------|
//! | `i8`, `u8`  | 1     |
//! | `i16`,`u16` | 2     |
//! | `i32`,`u32` | 4     |
//! | `i64`,`u64` | 8     |
//! | `f32`       | 4     |
//! | `f64`       | 8     |

/// A numeric type with a fixed little-endian wire representation.
///
/// Sequences of these types take the bulk byte path in the serializer.
pub trait Primitive: Copy + Sized + 'static {
    /// Encoded width in bytes
    const WIDTH: usize;

    /// Name used in error messages
    const NAME: &'static str;

    /// Fixed-size little-endian byte array
    type Bytes: AsRef<[u8]>;

    fn le_bytes(self) -> Self::Bytes;

    /// Append the little-endian bytes of `self` to `out`
    fn extend_le(self, out: &mut Vec<u8>);

    /// Rebuild a value from exactly `WIDTH` little-endian bytes
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();
                const NAME: &'static str = $name;

                type Bytes = [u8; std::mem::size_of::<$ty>()];

                #[inline]
                fn le_bytes(self) -> Self::Bytes {
                    self.to_le_bytes()
                }

                #[inline]
                fn extend_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.le_bytes());
                }

                #[inline]
                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_primitive! {
    i8 => "i8",
    u8 => "u8",
    i16 => "i16",
    u16 => "u16",
    i32 => "i32",
    u32 => "u32",
    i64 => "i64",
    u64 => "u64",
    f32 => "f32",
    f64 => "f64",
}

/// Encode a whole slice as one contiguous little-endian block
pub fn encode_le_slice<T: Primitive>(items: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(items.len() * T::WIDTH);
    for &item in items {
        item.extend_le(&mut out);
    }
    out
}

/// Decode a contiguous little-endian block; trailing partial elements are ignored
pub fn decode_le_slice<T: Primitive>(bytes: &[u8]) -> Vec<T> {
    bytes.chunks_exact(T::WIDTH).map(T::from_le_slice).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(i8::WIDTH, 1);
        assert_eq!(u16::WIDTH, 2);
        assert_eq!(i32::WIDTH, 4);
        assert_eq!(f32::WIDTH, 4);
        assert_eq!(u64::WIDTH, 8);
        assert_eq!(f64::WIDTH, 8);
    }

    #[test]
    fn test_little_endian_layout() {
        let mut out = Vec::new();
        0x0102_0304i32.extend_le(&mut out);
        assert_eq!(out, vec![0x04, 0x03, 0x02, 0x01]);

        let mut out = Vec::new();
        (-2i16).extend_le(&mut out);
        assert_eq!(out, vec![0xFE, 0xFF]);

        let mut out = Vec::new();
        1.0f32.extend_le(&mut out);
        assert_eq!(out, vec![0x00, 0x00, 0x80, 0x3F]);
    }

    #[test]
    fn test_le_bytes_is_fixed_width() {
        let bytes = 0x0102_0304u32.le_bytes();
        assert_eq!(bytes, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!((-1i64).le_bytes().len(), i64::WIDTH);
        assert_eq!(2.5f64.le_bytes(), 2.5f64.to_le_bytes());
    }

    #[test]
    fn test_slice_roundtrip() {
        let values = [0x1000i64, 0x1033140, 0x10f0833983];
        let bytes = encode_le_slice(&values);
        assert_eq!(bytes.len(), 24);
        assert_eq!(decode_le_slice::<i64>(&bytes), values);
    }

    #[test]
    fn test_decode_ignores_partial_tail() {
        let values: Vec<u16> = decode_le_slice(&[1, 0, 2, 0, 3]);
        assert_eq!(values, vec![1, 2]);
    }
}
