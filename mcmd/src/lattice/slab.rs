use super::{Geometry, NeighborTable};
use rand::Rng;

/// LX × LY × LZ slab on top of a substrate
///
/// Periodic along x and y. The z axis is open: the layer at `z = 0` rests on
/// the substrate and the layer at `z = lz - 1` faces vacuum, so cells in
/// either boundary layer have five neighbors instead of six.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slab {
    pub lx: usize,
    pub ly: usize,
    pub lz: usize,
}

impl Slab {
    pub fn new(lx: usize, ly: usize, lz: usize) -> Self {
        Self { lx, ly, lz }
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.ly + j) * self.lz + k
    }

    /// Number of cells in one z layer
    pub fn layer_size(&self) -> usize {
        self.lx * self.ly
    }

    /// z coordinate of a cell
    #[inline]
    pub fn layer_of(&self, cell: usize) -> usize {
        cell % self.lz
    }
}

impl Geometry for Slab {
    fn dimension(&self) -> usize {
        3
    }

    fn n_cells(&self) -> usize {
        self.lx * self.ly * self.lz
    }

    fn coordinates(&self, cell: usize) -> Vec<usize> {
        let k = cell % self.lz;
        let ij = cell / self.lz;
        vec![ij / self.ly, ij % self.ly, k]
    }

    fn cell_index(&self, coords: &[usize]) -> Option<usize> {
        match coords {
            &[i, j, k] if i < self.lx && j < self.ly && k < self.lz => Some(self.index(i, j, k)),
            _ => None,
        }
    }

    fn build_neighbor_table(&self) -> NeighborTable {
        let (lx, ly, lz) = (self.lx, self.ly, self.lz);
        let mut cells = Vec::with_capacity(self.n_cells());
        for i in 0..lx {
            for j in 0..ly {
                for k in 0..lz {
                    let mut nbrs = vec![
                        self.index((i + lx - 1) % lx, j, k),
                        self.index((i + 1) % lx, j, k),
                        self.index(i, (j + 1) % ly, k),
                        self.index(i, (j + ly - 1) % ly, k),
                    ];
                    if k > 0 {
                        nbrs.push(self.index(i, j, k - 1));
                    }
                    if k + 1 < lz {
                        nbrs.push(self.index(i, j, k + 1));
                    }
                    cells.push(nbrs);
                }
            }
        }
        NeighborTable::from_lists(cells)
    }

    fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let i = rng.gen_range(0..self.lx);
        let j = rng.gen_range(0..self.ly);
        let k = rng.gen_range(0..self.lz);
        self.index(i, j, k)
    }

    fn on_substrate(&self, cell: usize) -> bool {
        self.layer_of(cell) == 0
    }
}
