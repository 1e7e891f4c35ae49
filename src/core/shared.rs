use std::{fmt, ops};

/// Configuration objects share this constructor so that every stage can be
/// driven with `Config::default()` without pulling in `Default` bounds.
pub trait ConfigType {
    fn default() -> Self;
}

/// Fixed-size vector of `N` components.
/// The pipeline treats it as an opaque numeric tuple: it is copied, compared and
/// serialized, never used for arithmetic.
#[derive(Clone, Copy, PartialEq)]
pub struct NdVector<const N: usize, T> {
    data: [T; N],
}

pub type Float2 = NdVector<2, f32>;
pub type Float3 = NdVector<3, f32>;

/// Vertex indices of one triangle.
pub type Face = [u32; 3];

impl<const N: usize, T: Copy> NdVector<N, T> {
    #[inline]
    pub fn get(&self, i: usize) -> T {
        self.data[i]
    }

    #[inline]
    pub fn as_array(&self) -> &[T; N] {
        &self.data
    }
}

impl<const N: usize> NdVector<N, f32> {
    pub const ZERO: Self = Self { data: [0.0; N] };

    /// Raw IEEE-754 bit patterns of the components.
    /// Two vectors are structurally identical exactly when their bit patterns are.
    #[inline]
    pub fn to_bits(&self) -> [u32; N] {
        self.data.map(f32::to_bits)
    }

    #[inline]
    pub fn from_bits(bits: [u32; N]) -> Self {
        Self { data: bits.map(f32::from_bits) }
    }
}

impl<const N: usize> Default for NdVector<N, f32> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const N: usize, T> From<[T; N]> for NdVector<N, T> {
    fn from(data: [T; N]) -> Self {
        Self { data }
    }
}

impl<const N: usize, T> ops::Index<usize> for NdVector<N, T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<const N: usize, T: fmt::Debug> fmt::Debug for NdVector<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.data.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_distinguish_signed_zero() {
        let a = Float3::from([0.0, 1.0, 2.0]);
        let b = Float3::from([-0.0, 1.0, 2.0]);
        assert_eq!(a, b);
        assert_ne!(a.to_bits(), b.to_bits());
        assert_eq!(Float3::from_bits(b.to_bits()).to_bits(), b.to_bits());
    }

    #[test]
    fn indexing() {
        let v = Float2::from([0.25, 0.75]);
        assert_eq!(v[0], 0.25);
        assert_eq!(v.get(1), 0.75);
        assert_eq!(Float2::default(), Float2::ZERO);
    }
}
