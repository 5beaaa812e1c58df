/// A fixed-width value that can be copied to and from record storage.
///
/// All scalars are stored in host byte order; fixbuf does not perform
/// endianness conversion.
pub trait Scalar: Copy {
    /// Storage width in bytes.
    const SIZE: usize;

    /// Decode a value from exactly `SIZE` bytes.
    fn read_from(bytes: &[u8]) -> Self;

    /// Encode the value into exactly `SIZE` bytes.
    fn write_to(self, bytes: &mut [u8]);
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn read_from(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_ne_bytes(raw)
                }

                fn write_to(self, bytes: &mut [u8]) {
                    bytes[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

impl_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl Scalar for bool {
    const SIZE: usize = 1;

    fn read_from(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn write_to(self, bytes: &mut [u8]) {
        bytes[0] = self as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Scalar + PartialEq + std::fmt::Debug>(value: T) {
        let mut buf = vec![0u8; T::SIZE];
        value.write_to(&mut buf);
        assert_eq!(T::read_from(&buf), value);
    }

    #[test]
    fn scalar_round_trips() {
        round_trip(-3i8);
        round_trip(-300i16);
        round_trip(i32::MIN);
        round_trip(u64::MAX);
        round_trip(4.2f32);
        round_trip(-0.5f64);
        round_trip(true);
        round_trip(false);
    }

    #[test]
    fn bool_reads_any_nonzero() {
        assert!(bool::read_from(&[7]));
        assert!(!bool::read_from(&[0]));
    }
}
