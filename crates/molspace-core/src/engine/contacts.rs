use crate::core::geometry::coords::CoordGroup;
use crate::core::geometry::matrix::PairMatrix;
use crate::core::space::Space;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Two groups whose closest points are within the search cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupContact {
    /// Index of the first group; always below `second`.
    pub first: usize,
    pub second: usize,
    /// Shortest distance between the two groups.
    pub min_distance: f64,
}

/// Finds every pair of `groups` whose minimum distance in `space` is at most
/// `cutoff`.
///
/// Pairs are screened with [`Space::beyond`] first; only the survivors go through
/// the exact group-pair kernel. Each worker owns one [`PairMatrix`] that is reused
/// across all the pairs it evaluates.
///
/// The result is sorted by `(first, second)`. A negative or NaN cutoff matches
/// nothing.
#[instrument(skip_all, name = "contact_search_task")]
pub fn find_contacts<S: Space + ?Sized>(
    space: &S,
    groups: &[CoordGroup],
    cutoff: f64,
) -> Vec<GroupContact> {
    info!(num_groups = groups.len(), cutoff, "Searching for group contacts.");

    if cutoff.is_nan() || cutoff < 0.0 {
        warn!(cutoff, "Contact cutoff is negative or NaN; no pair can match.");
        return Vec::new();
    }

    let pairs: Vec<(usize, usize)> = (0..groups.len()).tuple_combinations().collect();
    if pairs.is_empty() {
        return Vec::new();
    }
    debug!(num_pairs = pairs.len(), "Evaluating group pairs.");

    #[cfg(not(feature = "parallel"))]
    let mut contacts: Vec<GroupContact> = {
        let mut matrix = PairMatrix::new();
        pairs
            .iter()
            .filter_map(|&(i, j)| probe(space, groups, i, j, cutoff, &mut matrix))
            .collect()
    };

    #[cfg(feature = "parallel")]
    let mut contacts: Vec<GroupContact> = pairs
        .par_iter()
        .map_init(PairMatrix::new, |matrix, &(i, j)| {
            probe(space, groups, i, j, cutoff, matrix)
        })
        .flatten()
        .collect();

    contacts.sort_unstable_by_key(|contact| (contact.first, contact.second));

    info!(num_contacts = contacts.len(), "Contact search complete.");
    contacts
}

fn probe<S: Space + ?Sized>(
    space: &S,
    groups: &[CoordGroup],
    i: usize,
    j: usize,
    cutoff: f64,
    matrix: &mut PairMatrix,
) -> Option<GroupContact> {
    let (g0, g1) = (&groups[i], &groups[j]);
    if g0.is_empty() || g1.is_empty() || space.beyond(cutoff, g0, g1) {
        return None;
    }

    let min_dist2 = space.calc_group_dist2(g0, g1, matrix);
    (min_dist2 <= cutoff * cutoff).then(|| GroupContact {
        first: i,
        second: j,
        min_distance: min_dist2.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::space::Volume;
    use crate::core::space::periodic::PeriodicBox;
    use nalgebra::Point3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn point_group(x: f64, y: f64, z: f64) -> CoordGroup {
        CoordGroup::from_slice(&[Point3::new(x, y, z)])
    }

    #[test]
    fn finds_contacts_across_the_periodic_boundary() {
        let space = Volume::from(PeriodicBox::cubic(10.0).unwrap());
        let groups = vec![
            point_group(0.5, 5.0, 5.0),
            point_group(9.5, 5.0, 5.0),
            point_group(5.0, 5.0, 5.0),
        ];

        let contacts = find_contacts(&space, &groups, 1.5);

        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts[0].first, contacts[0].second), (0, 1));
        assert!(f64_approx_equal(contacts[0].min_distance, 1.0));
    }

    #[test]
    fn same_groups_are_apart_in_cartesian_space() {
        let groups = vec![point_group(0.5, 5.0, 5.0), point_group(9.5, 5.0, 5.0)];
        assert!(find_contacts(&Volume::default(), &groups, 1.5).is_empty());
    }

    #[test]
    fn degenerate_inputs_yield_no_contacts() {
        let space = Volume::default();
        assert!(find_contacts(&space, &[], 5.0).is_empty());
        assert!(find_contacts(&space, &[point_group(0.0, 0.0, 0.0)], 5.0).is_empty());

        let groups = vec![point_group(0.0, 0.0, 0.0), CoordGroup::new(), point_group(0.0, 0.0, 1.0)];
        assert!(find_contacts(&space, &groups, -1.0).is_empty());
        assert!(find_contacts(&space, &groups, f64::NAN).is_empty());

        let contacts = find_contacts(&space, &groups, 2.0);
        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts[0].first, contacts[0].second), (0, 2));
    }

    #[test]
    fn matches_brute_force_and_is_sorted() {
        let space = Volume::from(PeriodicBox::cubic(20.0).unwrap());
        let mut rng = StdRng::seed_from_u64(42);
        let groups: Vec<CoordGroup> = (0..40)
            .map(|_| {
                let origin = Point3::new(
                    rng.gen_range(0.0..20.0),
                    rng.gen_range(0.0..20.0),
                    rng.gen_range(0.0..20.0),
                );
                (0..4)
                    .map(|_| {
                        origin
                            + nalgebra::Vector3::new(
                                rng.gen_range(-1.0..1.0),
                                rng.gen_range(-1.0..1.0),
                                rng.gen_range(-1.0..1.0),
                            )
                    })
                    .collect()
            })
            .collect();
        let cutoff = 4.0;

        let contacts = find_contacts(&space, &groups, cutoff);

        let mut expected = Vec::new();
        for i in 0..groups.len() {
            for j in (i + 1)..groups.len() {
                let d = space.minimum_distance(&groups[i], &groups[j]);
                if d <= cutoff {
                    expected.push((i, j, d));
                }
            }
        }

        assert!(!expected.is_empty());
        assert_eq!(contacts.len(), expected.len());
        for (contact, &(i, j, d)) in contacts.iter().zip(&expected) {
            assert_eq!((contact.first, contact.second), (i, j));
            assert!(f64_approx_equal(contact.min_distance, d));
        }
    }
}
