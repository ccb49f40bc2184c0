//! Cell-level diff between two consecutive generations.
//!
//! Both functions are pure. Membership checks go through a [`BTreeSet`] so a
//! diff is `O(n log n)` in the size of the two living sets.

use std::collections::BTreeSet;

use biologist_types::{ChangedCell, Coordinate};

/// Classify every cell of the seed generation as [`Born`].
///
/// [`Born`]: biologist_types::ChangeKind::Born
pub fn seeded(current: &[Coordinate]) -> Vec<ChangedCell> {
    current.iter().copied().map(ChangedCell::born).collect()
}

/// Compute the symmetric difference between two living sets.
///
/// Cells alive in `current` but not in `previous` come first as `Born`, in
/// the iteration order of `current`. Cells alive in `previous` but not in
/// `current` follow as `Died`, in the iteration order of `previous`.
pub fn detect(previous: &[Coordinate], current: &[Coordinate]) -> Vec<ChangedCell> {
    let before: BTreeSet<&Coordinate> = previous.iter().collect();
    let after: BTreeSet<&Coordinate> = current.iter().collect();

    let born = current
        .iter()
        .filter(|cell| !before.contains(cell))
        .copied()
        .map(ChangedCell::born);
    let died = previous
        .iter()
        .filter(|cell| !after.contains(cell))
        .copied()
        .map(ChangedCell::died);

    born.chain(died).collect()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use biologist_types::ChangeKind;
    use proptest::prelude::*;

    use super::*;

    fn cells(points: &[(i64, i64)]) -> Vec<Coordinate> {
        points.iter().copied().map(Coordinate::from).collect()
    }

    #[test]
    fn blinker_flip() {
        let vertical = cells(&[(1, 0), (1, 1), (1, 2)]);
        let horizontal = cells(&[(0, 1), (1, 1), (2, 1)]);

        let changes = detect(&vertical, &horizontal);
        assert_eq!(
            changes,
            vec![
                ChangedCell::born(Coordinate::new(0, 1)),
                ChangedCell::born(Coordinate::new(2, 1)),
                ChangedCell::died(Coordinate::new(1, 0)),
                ChangedCell::died(Coordinate::new(1, 2)),
            ]
        );
    }

    #[test]
    fn identical_sets_have_no_changes() {
        let block = cells(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert!(detect(&block, &block).is_empty());
    }

    #[test]
    fn everything_dies() {
        let previous = cells(&[(4, 4), (2, 2)]);
        let changes = detect(&previous, &[]);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.kind == ChangeKind::Died));
        assert_eq!(changes[0].coordinate, Coordinate::new(4, 4));
    }

    #[test]
    fn seed_is_all_born() {
        let seed = cells(&[(1, 0), (1, 1), (1, 2)]);
        let changes = seeded(&seed);
        assert_eq!(changes.len(), 3);
        assert!(changes.iter().all(|c| c.kind == ChangeKind::Born));
        assert_eq!(
            changes.iter().map(|c| c.coordinate).collect::<Vec<_>>(),
            seed
        );
    }

    #[test]
    fn same_column_is_not_a_match() {
        let changes = detect(&cells(&[(1, 0)]), &cells(&[(1, 5)]));
        assert_eq!(
            changes,
            vec![
                ChangedCell::born(Coordinate::new(1, 5)),
                ChangedCell::died(Coordinate::new(1, 0)),
            ]
        );
    }

    fn coordinate_set() -> impl Strategy<Value = Vec<Coordinate>> {
        proptest::collection::btree_set((-8i64..8, -8i64..8), 0..40)
            .prop_map(|set| set.into_iter().map(Coordinate::from).collect())
    }

    proptest! {
        #[test]
        fn applying_changes_reconstructs_current(
            previous in coordinate_set(),
            current in coordinate_set(),
        ) {
            let changes = detect(&previous, &current);

            let mut rebuilt: BTreeSet<Coordinate> = previous.iter().copied().collect();
            for change in changes.iter().filter(|c| c.kind == ChangeKind::Born) {
                prop_assert!(rebuilt.insert(change.coordinate));
            }
            for change in changes.iter().filter(|c| c.kind == ChangeKind::Died) {
                prop_assert!(rebuilt.remove(&change.coordinate));
            }

            let expected: BTreeSet<Coordinate> = current.iter().copied().collect();
            prop_assert_eq!(rebuilt, expected);
        }

        #[test]
        fn born_precede_died(previous in coordinate_set(), current in coordinate_set()) {
            let changes = detect(&previous, &current);
            let first_died = changes.iter().position(|c| c.kind == ChangeKind::Died);
            if let Some(index) = first_died {
                prop_assert!(changes[index..].iter().all(|c| c.kind == ChangeKind::Died));
            }
        }
    }
}
