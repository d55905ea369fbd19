//! Time-based lookup into time-ordered key or control point lists.

/// Two key times closer than this are the same key (1 ms).
pub const KEY_TIME_EPSILON: f32 = 0.001;

/// Below this many items a linear scan beats binary search.
pub const LINEAR_SEARCH_LIMIT: usize = 8;

/// Anything positioned on the curve time axis.
pub trait Timed {
    fn time(&self) -> f32;
}

/// `a` and `b` differ by strictly less than `tolerance`.
#[inline]
pub fn is_equivalent(a: f32, b: f32, tolerance: f32) -> bool {
    let diff = a - b;
    diff > -tolerance && diff < tolerance
}

/// Index of the item at `time` (within [`KEY_TIME_EPSILON`]).
///
/// `items` must be sorted by ascending time once it reaches
/// [`LINEAR_SEARCH_LIMIT`] entries.
pub fn find_by_time<T: Timed>(items: &[T], time: f32) -> Option<usize> {
    if items.len() < LINEAR_SEARCH_LIMIT {
        return items
            .iter()
            .position(|item| is_equivalent(item.time(), time, KEY_TIME_EPSILON));
    }

    let mut lo = 0;
    let mut hi = items.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let mid_time = items[mid].time();
        if is_equivalent(mid_time, time, KEY_TIME_EPSILON) {
            return Some(mid);
        }
        if time < mid_time {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    None
}
