use crate::md::system::SimulationBox;
use itertools::Itertools;
use nalgebra::Vector3;

/// Per-atom lists of the atoms closer than the cutoff
///
/// Every list is rebuilt from scratch by an all-pairs scan; nothing is
/// updated incrementally, so the lists go stale as soon as positions move.
#[derive(Debug, Clone, Default)]
pub struct NeighborList {
    cutoff: f64,
    lists: Vec<Vec<usize>>,
}

impl NeighborList {
    pub fn new(cutoff: f64) -> Self {
        Self {
            cutoff,
            lists: Vec::new(),
        }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Replace every list with the atoms strictly closer than the cutoff
    pub fn rebuild(&mut self, positions: &[Vector3<f64>], sim_box: &SimulationBox) {
        let cutoff = self.cutoff;
        self.lists = positions
            .iter()
            .enumerate()
            .map(|(i, ri)| {
                positions
                    .iter()
                    .enumerate()
                    .filter(|&(j, rj)| j != i && sim_box.distance(ri, rj) < cutoff)
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect();
    }

    /// Neighbors of atom `i` in increasing index order
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.lists[i]
    }

    pub fn count(&self, i: usize) -> usize {
        self.lists[i].len()
    }

    /// Number of atoms covered by the last rebuild
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.lists.iter().map(Vec::as_slice)
    }
}

/// Smallest pair distance, `None` with fewer than two atoms
pub fn nearest_neighbor_distance(
    positions: &[Vector3<f64>],
    sim_box: &SimulationBox,
) -> Option<f64> {
    positions
        .iter()
        .tuple_combinations()
        .map(|(a, b)| sim_box.distance(a, b))
        .min_by(|x, y| x.total_cmp(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_2x2(a: f64) -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(a, 0.0, 0.0),
            Vector3::new(0.0, a, 0.0),
            Vector3::new(a, a, 0.0),
        ]
    }

    #[test]
    fn test_periodic_square_has_two_neighbors_each() {
        let a = 1.1;
        let sim_box = SimulationBox::new(Vector3::new(2.0 * a, 2.0 * a, 10.0), [true, true, false]);
        let mut list = NeighborList::new(1.3);
        list.rebuild(&square_2x2(a), &sim_box);

        assert_eq!(list.len(), 4);
        for i in 0..4 {
            assert_eq!(list.count(i), 2);
        }
        assert_eq!(list.neighbors(0), &[1, 2]);
        assert_eq!(list.neighbors(3), &[1, 2]);
    }

    #[test]
    fn test_lists_are_symmetric() {
        let positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.2, 0.0),
            Vector3::new(2.1, 0.0, 0.3),
            Vector3::new(5.0, 5.0, 5.0),
        ];
        let mut list = NeighborList::new(1.5);
        list.rebuild(&positions, &SimulationBox::open());

        for (i, nbrs) in list.iter().enumerate() {
            for &j in nbrs {
                assert!(list.neighbors(j).contains(&i));
            }
        }
        // isolated atom keeps an empty list
        assert_eq!(list.count(3), 0);
    }

    #[test]
    fn test_rebuild_replaces_previous_lists() {
        let mut positions = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)];
        let mut list = NeighborList::new(1.5);
        list.rebuild(&positions, &SimulationBox::open());
        assert_eq!(list.count(0), 1);

        positions[1].x = 3.0;
        list.rebuild(&positions, &SimulationBox::open());
        assert_eq!(list.count(0), 0);
        assert_eq!(list.count(1), 0);
    }

    #[test]
    fn test_nearest_neighbor_distance() {
        let a = 1.1;
        let sim_box = SimulationBox::cubic(2.0 * a, true);
        let d = nearest_neighbor_distance(&square_2x2(a), &sim_box).unwrap();
        assert_relative_eq!(d, a, epsilon = 1e-12);

        assert!(nearest_neighbor_distance(&square_2x2(a)[..1], &sim_box).is_none());
    }
}
