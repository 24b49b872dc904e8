/// First index in `[start, end)` whose value is not less than `value`.
///
/// Returns `end` when every value in the range is smaller. `xs` must be
/// ascending over the range; NaN compares as "not less" and so stops the
/// search early rather than looping.
#[inline]
pub fn lower_bound(xs: &[f32], start: usize, end: usize, value: f32) -> usize {
    let mut lo = start;
    let mut hi = end.min(xs.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if xs[mid] < value {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_bound_basic() {
        let xs = [0.0, 1.0, 1.0, 2.0, 5.0];

        assert_eq!(lower_bound(&xs, 0, 5, -1.0), 0);
        assert_eq!(lower_bound(&xs, 0, 5, 1.0), 1);
        assert_eq!(lower_bound(&xs, 0, 5, 1.5), 3);
        assert_eq!(lower_bound(&xs, 0, 5, 5.0), 4);
        assert_eq!(lower_bound(&xs, 0, 5, 9.0), 5);
    }

    #[test]
    fn test_lower_bound_respects_subrange() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];

        assert_eq!(lower_bound(&xs, 2, 4, 0.0), 2);
        assert_eq!(lower_bound(&xs, 2, 4, 10.0), 4);
        assert_eq!(lower_bound(&xs, 3, 3, 1.0), 3);
    }

    #[test]
    fn test_lower_bound_clamps_end() {
        let xs = [0.0, 1.0];
        assert_eq!(lower_bound(&xs, 0, 10, 5.0), 2);
    }
}
