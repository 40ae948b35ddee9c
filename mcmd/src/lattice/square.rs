use super::{Geometry, NeighborTable};
use rand::Rng;

/// LX × LY grid with periodic boundaries along both axes
///
/// Cells are stored row-major: cell `(i, j)` has index `i * ly + j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    pub lx: usize,
    pub ly: usize,
}

impl Square {
    pub fn new(lx: usize, ly: usize) -> Self {
        Self { lx, ly }
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.ly + j
    }
}

impl Geometry for Square {
    fn dimension(&self) -> usize {
        2
    }

    fn n_cells(&self) -> usize {
        self.lx * self.ly
    }

    fn coordinates(&self, cell: usize) -> Vec<usize> {
        vec![cell / self.ly, cell % self.ly]
    }

    fn cell_index(&self, coords: &[usize]) -> Option<usize> {
        match coords {
            &[i, j] if i < self.lx && j < self.ly => Some(self.index(i, j)),
            _ => None,
        }
    }

    fn build_neighbor_table(&self) -> NeighborTable {
        let (lx, ly) = (self.lx, self.ly);
        let mut cells = Vec::with_capacity(self.n_cells());
        for i in 0..lx {
            for j in 0..ly {
                // left, right, up, down
                cells.push(vec![
                    self.index((i + lx - 1) % lx, j),
                    self.index((i + 1) % lx, j),
                    self.index(i, (j + 1) % ly),
                    self.index(i, (j + ly - 1) % ly),
                ]);
            }
        }
        NeighborTable::from_lists(cells)
    }

    fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let i = rng.gen_range(0..self.lx);
        let j = rng.gen_range(0..self.ly);
        self.index(i, j)
    }
}
