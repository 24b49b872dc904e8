/// Workgroup counts for a 1-D workload laid out on a 2-D dispatch.
///
/// A single dimension is limited to `max_compute_workgroups_per_dimension`
/// (65 535 on most devices), so large series wrap onto extra rows. Kernels
/// recover the item index as `(group.y * x + group.x) * workgroup_size + local`
/// and skip indices past the item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchGrid {
    pub x: u32,
    pub y: u32,
}

impl DispatchGrid {
    pub fn for_items(items: u32, workgroup_size: u32, max_per_dimension: u32) -> Self {
        let groups = items.div_ceil(workgroup_size.max(1));
        if groups == 0 {
            return Self::default();
        }

        let max = max_per_dimension.max(1);
        if groups <= max {
            Self { x: groups, y: 1 }
        } else {
            Self {
                x: max,
                y: groups.div_ceil(max),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x == 0 || self.y == 0
    }

    /// Total invocations the grid launches.
    pub fn invocations(&self, workgroup_size: u32) -> u64 {
        self.x as u64 * self.y as u64 * workgroup_size as u64
    }

    /// Item index handled by `local` within workgroup `group`.
    #[inline]
    pub fn linear_index(&self, group: [u32; 2], local: u32, workgroup_size: u32) -> u64 {
        (group[1] as u64 * self.x as u64 + group[0] as u64) * workgroup_size as u64 + local as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_workload_is_one_row() {
        let grid = DispatchGrid::for_items(1000, 256, 65_535);
        assert_eq!(grid, DispatchGrid { x: 4, y: 1 });
        assert!(grid.invocations(256) >= 1000);
    }

    #[test]
    fn test_large_workload_wraps() {
        let items = 50_000_000;
        let grid = DispatchGrid::for_items(items, 256, 65_535);

        assert_eq!(grid.x, 65_535);
        assert_eq!(grid.y, 3);
        assert!(grid.invocations(256) >= items as u64);
        let last = grid.linear_index([grid.x - 1, grid.y - 1], 255, 256);
        assert_eq!(last + 1, grid.invocations(256));
    }

    #[test]
    fn test_empty_workload() {
        let grid = DispatchGrid::for_items(0, 256, 65_535);
        assert!(grid.is_empty());
        assert_eq!(grid.invocations(256), 0);
    }
}
