//! Near-square facet grid layout.

/// Smallest (rows, cols) with cols >= rows, cols - rows < 3 and capacity for
/// `facets` sub-charts. Searched in column order, so waste is minimal for
/// the facet counts that occur in practice (e.g. 11 -> 3x4).
pub fn grid_for(facets: usize) -> (usize, usize) {
    for cols in 1..100usize {
        for rows in 1..99usize {
            if cols >= rows && cols - rows < 3 && cols * rows >= facets {
                return (rows, cols);
            }
        }
    }
    // facets > 9702 never happens for a per-country facet grid.
    (99, 99)
}

#[cfg(test)]
mod tests {
    use super::grid_for;

    #[test]
    fn eleven_facets_use_three_by_four() {
        assert_eq!(grid_for(11), (3, 4));
    }

    #[test]
    fn small_counts() {
        assert_eq!(grid_for(1), (1, 1));
        assert_eq!(grid_for(2), (1, 2));
        assert_eq!(grid_for(3), (2, 2));
        assert_eq!(grid_for(4), (2, 2));
        assert_eq!(grid_for(5), (2, 3));
        assert_eq!(grid_for(12), (3, 4));
    }

    #[test]
    fn constraints_hold_over_a_range() {
        for facets in 1..200 {
            let (rows, cols) = grid_for(facets);
            assert!(cols >= rows, "facets={facets}");
            assert!(cols - rows < 3, "facets={facets}");
            assert!(rows * cols >= facets, "facets={facets}");
        }
    }
}
