use super::*;
use approx::*;

fn block_3x3_cells(square: &Square) -> Vec<usize> {
    let mut cells = Vec::new();
    for i in 1..=3 {
        for j in 1..=3 {
            cells.push(square.index(i, j));
        }
    }
    cells
}

#[test]
fn test_square_neighbor_table() {
    let square = Square::new(4, 3);
    let table = square.build_neighbor_table();
    assert_eq!(table.n_cells(), 12);
    for cell in 0..table.n_cells() {
        assert_eq!(table.neighbors(cell).len(), 4);
    }

    // Corner (0, 0) wraps to the opposite edges
    let mut corner: Vec<usize> = table.neighbors(square.index(0, 0)).to_vec();
    corner.sort();
    let mut expected = vec![
        square.index(3, 0),
        square.index(1, 0),
        square.index(0, 1),
        square.index(0, 2),
    ];
    expected.sort();
    assert_eq!(corner, expected);
}

#[test]
fn test_neighbor_table_is_idempotent() {
    let square = Square::new(5, 5);
    let mut gas = LatticeGas::new(square, LatticeParams::new(6, -1.0, 300.0), Some(3));
    let before = gas.neighbor_table().clone();
    gas.build_neighbor_table();
    assert_eq!(&before, gas.neighbor_table());
}

#[test]
fn test_slab_neighbor_table() {
    let slab = Slab::new(3, 3, 4);
    let table = slab.build_neighbor_table();
    assert_eq!(table.n_cells(), 36);

    assert_eq!(table.neighbors(slab.index(1, 1, 0)).len(), 5);
    assert_eq!(table.neighbors(slab.index(1, 1, 1)).len(), 6);
    assert_eq!(table.neighbors(slab.index(1, 1, 2)).len(), 6);
    assert_eq!(table.neighbors(slab.index(1, 1, 3)).len(), 5);

    // No neighbor below the substrate layer and no wrap along z
    let bottom = table.neighbors(slab.index(0, 0, 0));
    assert!(!bottom.contains(&slab.index(0, 0, 3)));
    assert!(bottom.contains(&slab.index(0, 0, 1)));
    assert!(bottom.contains(&slab.index(2, 0, 0)));
}

#[test]
fn test_geometry_coordinates() {
    let square = Square::new(5, 7);
    assert_eq!(square.coordinates(square.index(3, 6)), vec![3, 6]);
    assert_eq!(square.cell_index(&[3, 6]), Some(square.index(3, 6)));
    assert_eq!(square.cell_index(&[5, 0]), None);
    assert_eq!(square.cell_index(&[1, 1, 1]), None);

    let slab = Slab::new(4, 3, 2);
    assert_eq!(slab.coordinates(slab.index(2, 1, 1)), vec![2, 1, 1]);
    assert_eq!(slab.cell_index(&[2, 1, 1]), Some(slab.index(2, 1, 1)));
    assert!(slab.on_substrate(slab.index(3, 2, 0)));
    assert!(!slab.on_substrate(slab.index(3, 2, 1)));
}

#[test]
fn test_random_configuration_is_one_to_one() {
    let square = Square::new(10, 10);
    let gas = LatticeGas::new(square, LatticeParams::new(37, -1.0, 300.0), Some(42));

    assert_eq!(gas.n_atoms(), 37);
    assert_eq!(gas.occupied_count(), 37);

    let mut cells = gas.atom_cells().to_vec();
    cells.sort();
    cells.dedup();
    assert_eq!(cells.len(), 37);
    assert!(cells.iter().all(|&c| gas.is_occupied(c)));
}

#[test]
fn test_block_energy_on_5x5_torus() {
    let square = Square::new(5, 5);
    let j1 = -0.7;
    let gas = LatticeGas::from_cells(
        square,
        LatticeParams::new(9, j1, 300.0),
        &block_3x3_cells(&square),
        Some(1),
    )
    .unwrap();

    // center 4, four edges 3, four corners 2
    let counts: usize = gas.atom_cells().iter().map(|&c| gas.neighbor_count(c)).sum();
    assert_eq!(counts, 24);
    assert_relative_eq!(gas.energy(), 0.5 * j1 * counts as f64, epsilon = 1e-12);
    // twelve bonds in a 3x3 block
    assert_relative_eq!(gas.energy(), 12.0 * j1, epsilon = 1e-12);
    assert_relative_eq!(gas.mean_neighbor_count(), 24.0 / 9.0, epsilon = 1e-12);
}

#[test]
fn test_from_cells_rejects_bad_input() {
    let square = Square::new(3, 3);
    let params = LatticeParams::new(2, -1.0, 300.0);
    assert!(LatticeGas::from_cells(square, params, &[0, 0], None).is_err());
    assert!(LatticeGas::from_cells(square, params, &[0, 9], None).is_err());
    assert!(LatticeGas::from_cells(square, params, &[0], None).is_err());
    assert!(LatticeGas::from_cells(square, params, &[0, 4], None).is_ok());
}

#[test]
fn test_zero_temperature_is_greedy() {
    let square = Square::new(5, 5);
    let cells = block_3x3_cells(&square);
    let mut gas = LatticeGas::from_cells(
        square,
        LatticeParams::new(9, -1.0, 0.0),
        &cells,
        Some(7),
    )
    .unwrap();
    let e0 = gas.energy();

    // Every move out of a compact block breaks more bonds than it makes
    for _ in 0..2000 {
        gas.sweep();
    }

    assert_eq!(gas.atom_cells(), cells.as_slice());
    assert_relative_eq!(gas.energy(), e0, epsilon = 1e-12);
    assert_eq!(gas.stats.attempts, 2000);
    assert_eq!(gas.stats.accepted, 0);
}

#[test]
fn test_negative_temperature_rejects_uphill_moves() {
    let square = Square::new(5, 5);
    let cells = block_3x3_cells(&square);
    let mut gas = LatticeGas::from_cells(
        square,
        LatticeParams::new(9, -1.0, -50.0),
        &cells,
        Some(11),
    )
    .unwrap();

    for _ in 0..500 {
        gas.sweep();
    }
    assert_eq!(gas.atom_cells(), cells.as_slice());
}

#[test]
fn test_zero_temperature_never_raises_energy() {
    let square = Square::new(4, 4);
    let mut gas = LatticeGas::from_cells(
        square,
        LatticeParams::new(2, -1.0, 0.0),
        &[square.index(0, 0), square.index(2, 2)],
        Some(5),
    )
    .unwrap();

    for _ in 0..200 {
        let before = gas.energy();
        gas.sweep();
        assert!(gas.energy() <= before + 1e-12);
    }
    // the first move starts from zero bonds and cannot be uphill
    assert!(gas.stats.accepted > 0);
}

#[test]
fn test_sweeps_preserve_occupancy() {
    let square = Square::new(8, 8);
    let params = LatticeParams::new(20, -0.1, 600.0);
    let mut gas = LatticeGas::new(square, params, Some(2024));

    for _ in 0..5000 {
        gas.sweep();
        assert_eq!(gas.occupied_count(), 20);
    }
    assert_eq!(gas.n_atoms(), 20);
    assert!(gas.stats.accepted > 0);
    assert!(gas.stats.acceptance_rate() <= 1.0);

    let mut cells = gas.atom_cells().to_vec();
    cells.sort();
    cells.dedup();
    assert_eq!(cells.len(), 20);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let params = LatticeParams::new(15, -0.1, 400.0);
    let mut a = LatticeGas::new(Square::new(6, 6), params, Some(99));
    let mut b = LatticeGas::new(Square::new(6, 6), params, Some(99));
    for _ in 0..300 {
        a.sweep();
        b.sweep();
    }
    assert_eq!(a.atom_cells(), b.atom_cells());
}

#[test]
fn test_drawn_seed_replays_the_run() {
    let params = LatticeParams::new(15, -0.1, 400.0);
    let mut a = LatticeGas::new(Square::new(6, 6), params, None);
    let mut b = LatticeGas::new(Square::new(6, 6), params, Some(a.seed()));
    assert_eq!(b.seed(), a.seed());
    assert_eq!(a.atom_cells(), b.atom_cells());
    for _ in 0..100 {
        a.sweep();
        b.sweep();
    }
    assert_eq!(a.atom_cells(), b.atom_cells());
}

#[test]
fn test_thermalize_records_energy_before_each_sweep() {
    let params = LatticeParams::new(10, -0.1, 300.0);
    let mut gas = LatticeGas::new(Square::new(6, 6), params, Some(8));

    let mut trace = Vec::new();
    gas.thermalize_with(50, |e| trace.push(e));

    assert_eq!(trace.len(), 50);
    assert_eq!(gas.stats.attempts, 50);
    assert_eq!(gas.occupied_count(), 10);
    // Energies are multiples of J1 / 2
    for e in trace {
        let bonds = e / (0.5 * -0.1);
        assert_abs_diff_eq!(bonds, bonds.round(), epsilon = 1e-9);
    }
}

#[test]
fn test_slab_substrate_energy() {
    let slab = Slab::new(4, 4, 3);
    let params = LatticeParams::new(3, -1.0, 300.0).with_substrate_energy(-0.5);
    // two bonded atoms on the substrate, one isolated atom above
    let cells = [
        slab.index(0, 0, 0),
        slab.index(1, 0, 0),
        slab.index(2, 2, 2),
    ];
    let gas = LatticeGas::from_cells(slab, params, &cells, Some(1)).unwrap();

    assert_eq!(gas.count_first_layer(), 2);
    assert_relative_eq!(gas.energy(), -1.0 + 2.0 * -0.5, epsilon = 1e-12);
    assert_relative_eq!(gas.mean_neighbor_count(), 2.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn test_slab_vertical_bond_counts() {
    let slab = Slab::new(3, 3, 3);
    let params = LatticeParams::new(2, -1.0, 300.0);
    let cells = [slab.index(1, 1, 0), slab.index(1, 1, 1)];
    let gas = LatticeGas::from_cells(slab, params, &cells, None).unwrap();
    assert_eq!(gas.neighbor_count(cells[0]), 1);
    assert_eq!(gas.neighbor_count(cells[1]), 1);
    assert_relative_eq!(gas.energy(), -1.0, epsilon = 1e-12);
}

#[test]
fn test_first_layer_initialization() {
    let slab = Slab::new(4, 4, 4);
    let mut gas = LatticeGas::new(slab, LatticeParams::new(20, -0.1, 300.0), Some(31));

    gas.init_configuration_first_layer();
    assert_eq!(gas.n_atoms(), 20);
    assert_eq!(gas.occupied_count(), 20);
    assert_eq!(gas.count_first_layer(), 16);
    assert!(gas
        .atom_cells()
        .iter()
        .all(|&c| slab.layer_of(c) <= 1));

    let mut trace = Vec::new();
    gas.thermalize_first_layer_with(25, |e| trace.push(e));
    assert_eq!(trace.len(), 25);
    assert_eq!(gas.occupied_count(), 20);
}
