//! Fixed-length per-dimension tuples shared by keys, tangents and tolerances.
//!
//! The dimension count is chosen when a value is built (1 for float tracks,
//! 6 for combined position/rotation tracks) and never changes afterwards.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Channel counts up to this size stay inline (position + Euler rotation).
pub const INLINE_CHANNELS: usize = 6;

/// Per-dimension tangent smoothness flags for broken-tangent corners.
pub type Smoothness = SmallVec<[bool; INLINE_CHANNELS]>;

/// A per-dimension value tuple (value, tangent or tolerance).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channels(SmallVec<[f32; INLINE_CHANNELS]>);

impl Channels {
    /// All-zero tuple with `dim` channels.
    pub fn zeros(dim: usize) -> Self {
        Self::splat(dim, 0.0)
    }

    /// Tuple with every channel set to `value`.
    pub fn splat(dim: usize, value: f32) -> Self {
        Self(SmallVec::from_elem(value, dim))
    }

    pub fn from_slice(values: &[f32]) -> Self {
        Self(SmallVec::from_slice(values))
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().copied()
    }

    /// Copy of the `count` channels starting at `offset`.
    ///
    /// Channels past the end read as zero so a short tuple never panics.
    pub fn slice(&self, offset: usize, count: usize) -> Self {
        (offset..offset + count)
            .map(|d| self.0.get(d).copied().unwrap_or(0.0))
            .collect()
    }
}

impl Index<usize> for Channels {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Channels {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.0[index]
    }
}

impl FromIterator<f32> for Channels {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<f32>> for Channels {
    fn from(values: Vec<f32>) -> Self {
        Self(SmallVec::from_vec(values))
    }
}

impl<const N: usize> From<[f32; N]> for Channels {
    fn from(values: [f32; N]) -> Self {
        Self::from_slice(&values)
    }
}
