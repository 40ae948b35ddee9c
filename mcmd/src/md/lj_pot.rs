use crate::md::neighbor_list::NeighborList;
use crate::md::run_md::ForceProvider;
use crate::md::system::SimulationBox;
use nalgebra::Vector3;

/// Coefficients A..H of the degree-7 polynomial joining the Lennard-Jones
/// curve at `rp` to zero at `rc`
///
/// `coeffs[k]` multiplies `r^k`. The polynomial matches the Lennard-Jones
/// value and its first two derivatives at `rp`, and vanishes together with
/// its first two derivatives at `rc`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JunctionCoefficients {
    pub coeffs: [f64; 8],
}

impl JunctionCoefficients {
    /// Closed-form coefficients for the given Lennard-Jones parameters
    ///
    /// Requires `rp < rc`; the expressions divide by `(rc - rp)^7`.
    pub fn derive(epsilon: f64, sigma: f64, rc: f64, rp: f64) -> Self {
        let p = |x: f64, n: i32| x.powi(n);
        let s6 = p(sigma, 6);
        let w7 = p(rc - rp, 7);

        let a = 4.0 * epsilon * p(rc, 4) * s6 / (w7 * p(rp, 12))
            * (2.0
                * p(rp, 6)
                * (-42.0 * p(rc, 3) + 182.0 * p(rc, 2) * rp - 273.0 * rc * p(rp, 2)
                    + 143.0 * p(rp, 3))
                + (455.0 * p(rc, 3) - 1729.0 * p(rc, 2) * rp + 2223.0 * rc * p(rp, 2)
                    - 969.0 * p(rp, 3))
                    * s6);

        let b = 16.0 * epsilon * p(rc, 3) * s6 / (w7 * p(rp, 13))
            * (p(rp, 6)
                * (54.0 * p(rc, 4) - 154.0 * p(rc, 3) * rp + 351.0 * rc * p(rp, 3)
                    - 286.0 * p(rp, 4))
                + (-315.0 * p(rc, 4) + 749.0 * p(rc, 3) * rp + 171.0 * p(rc, 2) * p(rp, 2)
                    - 1539.0 * rc * p(rp, 3)
                    + 969.0 * p(rp, 4))
                    * s6);

        let c = 12.0 * epsilon * p(rc, 2) * s6 / (w7 * p(rp, 14))
            * (p(rp, 6)
                * (-63.0 * p(rc, 5) - 7.0 * p(rc, 4) * rp + 665.0 * p(rc, 3) * p(rp, 2)
                    - 975.0 * p(rc, 2) * p(rp, 3)
                    - 52.0 * rc * p(rp, 4)
                    + 572.0 * p(rp, 5))
                + 2.0
                    * (195.0 * p(rc, 5) + 91.0 * p(rc, 4) * rp - 1781.0 * p(rc, 3) * p(rp, 2)
                        + 1995.0 * p(rc, 2) * p(rp, 3)
                        + 399.0 * rc * p(rp, 4)
                        - 969.0 * p(rp, 5))
                    * s6);

        let d = 16.0 * epsilon * s6 / (w7 * p(rp, 15))
            * (rc
                * p(rp, 6)
                * (14.0 * p(rc, 6) + 126.0 * p(rc, 5) * rp - 420.0 * p(rc, 4) * p(rp, 2)
                    - 90.0 * p(rc, 3) * p(rp, 3)
                    + 1105.0 * p(rc, 2) * p(rp, 4)
                    - 624.0 * rc * p(rp, 5)
                    - 286.0 * p(rp, 6))
                + rc
                    * (-91.0 * p(rc, 6) - 819.0 * p(rc, 5) * rp + 2145.0 * p(rc, 4) * p(rp, 2)
                        + 1125.0 * p(rc, 3) * p(rp, 3)
                        - 5035.0 * p(rc, 2) * p(rp, 4)
                        + 1881.0 * rc * p(rp, 5)
                        + 969.0 * p(rp, 6))
                    * s6);

        let e = 4.0 * epsilon * s6 / (w7 * p(rp, 15))
            * (2.0
                * p(rp, 6)
                * (-112.0 * p(rc, 6) - 63.0 * p(rc, 5) * rp + 1305.0 * p(rc, 4) * p(rp, 2)
                    - 1625.0 * p(rc, 3) * p(rp, 3)
                    - 585.0 * p(rc, 2) * p(rp, 4)
                    + 1287.0 * rc * p(rp, 5)
                    + 143.0 * p(rp, 6))
                + (1456.0 * p(rc, 6) + 1404.0 * p(rc, 5) * rp - 14580.0 * p(rc, 4) * p(rp, 2)
                    + 13015.0 * p(rc, 3) * p(rp, 3)
                    + 7695.0 * p(rc, 2) * p(rp, 4)
                    - 8721.0 * rc * p(rp, 5)
                    - 969.0 * p(rp, 6))
                    * s6);

        let f = 48.0 * epsilon * s6 / (w7 * p(rp, 15))
            * (-p(rp, 6)
                * (-28.0 * p(rc, 5) + 63.0 * p(rc, 4) * rp + 65.0 * p(rc, 3) * p(rp, 2)
                    - 247.0 * p(rc, 2) * p(rp, 3)
                    + 117.0 * rc * p(rp, 4)
                    + 65.0 * p(rp, 5))
                + (-182.0 * p(rc, 5) + 312.0 * p(rc, 4) * rp + 475.0 * p(rc, 3) * p(rp, 2)
                    - 1140.0 * p(rc, 2) * p(rp, 3)
                    + 342.0 * rc * p(rp, 4)
                    + 228.0 * p(rp, 5))
                    * s6);

        let g = 4.0 * epsilon * s6 / (w7 * p(rp, 15))
            * (p(rp, 6)
                * (-224.0 * p(rc, 4) + 819.0 * p(rc, 3) * rp - 741.0 * p(rc, 2) * p(rp, 2)
                    - 429.0 * rc * p(rp, 3)
                    + 715.0 * p(rp, 4))
                + 2.0
                    * (728.0 * p(rc, 4) - 2223.0 * p(rc, 3) * rp + 1425.0 * p(rc, 2) * p(rp, 2)
                        + 1292.0 * rc * p(rp, 3)
                        - 1292.0 * p(rp, 4))
                    * s6);

        let h = 16.0 * epsilon * s6 / (w7 * p(rp, 15))
            * (p(rp, 6)
                * (14.0 * p(rc, 3) - 63.0 * p(rc, 2) * rp + 99.0 * rc * p(rp, 2)
                    - 55.0 * p(rp, 3))
                + (-91.0 * p(rc, 3) + 351.0 * p(rc, 2) * rp - 459.0 * rc * p(rp, 2)
                    + 204.0 * p(rp, 3))
                    * s6);

        Self {
            coeffs: [a, b, c, d, e, f, g, h],
        }
    }

    /// Polynomial value at `r`
    pub fn value(&self, r: f64) -> f64 {
        self.coeffs
            .iter()
            .enumerate()
            .map(|(k, c)| c * r.powi(k as i32))
            .sum()
    }

    /// First derivative of the polynomial at `r`
    pub fn derivative(&self, r: f64) -> f64 {
        self.coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| k as f64 * c * r.powi(k as i32 - 1))
            .sum()
    }

    /// `-(dP/dr) / r`, the factor turning a pair displacement into a force
    fn force_factor(&self, r: f64) -> f64 {
        let [_, b, c, d, e, f, g, h] = self.coeffs;
        -(b * r.powi(-1)
            + 2.0 * c
            + 3.0 * d * r
            + 4.0 * e * r.powi(2)
            + 5.0 * f * r.powi(3)
            + 6.0 * g * r.powi(4)
            + 7.0 * h * r.powi(5))
    }
}

/// Lennard-Jones potential smoothed to zero between `smoothing_start` and `cutoff`
///
/// Below `smoothing_start` (RP) the pair term is the plain 12-6 potential;
/// between RP and `cutoff` (RC) it is the junction polynomial. Pairs at or
/// beyond RC never enter a neighbor list and contribute nothing. With
/// `smoothing_start >= cutoff` the junction is never reached and the
/// potential is cut sharply at RC.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedLennardJones {
    pub epsilon: f64,
    pub sigma: f64,
    pub cutoff: f64,
    pub smoothing_start: f64,
    junction: JunctionCoefficients,
}

impl SmoothedLennardJones {
    pub fn new(epsilon: f64, sigma: f64, cutoff: f64, smoothing_start: f64) -> Self {
        let junction = if smoothing_start < cutoff {
            JunctionCoefficients::derive(epsilon, sigma, cutoff, smoothing_start)
        } else {
            JunctionCoefficients::default()
        };
        Self {
            epsilon,
            sigma,
            cutoff,
            smoothing_start,
            junction,
        }
    }

    /// Plain Lennard-Jones truncated at `cutoff`
    pub fn sharp_cutoff(epsilon: f64, sigma: f64, cutoff: f64) -> Self {
        Self::new(epsilon, sigma, cutoff, cutoff)
    }

    pub fn junction(&self) -> &JunctionCoefficients {
        &self.junction
    }

    /// Unsmoothed 12-6 potential
    pub fn lj_potential(&self, r: f64) -> f64 {
        let sr6 = (self.sigma / r).powi(6);
        4.0 * self.epsilon * (sr6 * sr6 - sr6)
    }

    /// Pair energy at separation `r < cutoff`
    pub fn pair_energy(&self, r: f64) -> f64 {
        debug_assert!(r < self.cutoff, "pair at r = {} beyond cutoff", r);
        if r < self.smoothing_start {
            self.lj_potential(r)
        } else {
            self.junction.value(r)
        }
    }

    /// Factor `f(r)` such that the force on atom i from atom k is `f(r) * (r_i - r_k)`
    pub fn pair_force_factor(&self, r: f64) -> f64 {
        debug_assert!(r < self.cutoff, "pair at r = {} beyond cutoff", r);
        if r < self.smoothing_start {
            let s6 = self.sigma.powi(6);
            24.0 * self.epsilon * s6 * r.powi(-8) * (2.0 * s6 * r.powi(-6) - 1.0)
        } else {
            self.junction.force_factor(r)
        }
    }

    /// Sample the pair potential on `[r_start, cutoff)` every `step`
    pub fn tabulate(&self, r_start: f64, step: f64) -> Vec<(f64, f64)> {
        (0..)
            .map(|i| r_start + i as f64 * step)
            .take_while(|&r| r < self.cutoff)
            .map(|r| (r, self.pair_energy(r)))
            .collect()
    }
}

impl ForceProvider for SmoothedLennardJones {
    fn cutoff(&self) -> f64 {
        self.cutoff
    }

    fn potential_energy(
        &self,
        positions: &[Vector3<f64>],
        neighbors: &NeighborList,
        sim_box: &SimulationBox,
    ) -> f64 {
        let double_sum: f64 = neighbors
            .iter()
            .enumerate()
            .map(|(i, nbrs)| {
                nbrs.iter()
                    .map(|&k| self.pair_energy(sim_box.distance(&positions[i], &positions[k])))
                    .sum::<f64>()
            })
            .sum();
        double_sum / 2.0
    }

    fn compute_forces(
        &self,
        positions: &[Vector3<f64>],
        neighbors: &NeighborList,
        sim_box: &SimulationBox,
    ) -> Vec<Vector3<f64>> {
        neighbors
            .iter()
            .enumerate()
            .map(|(i, nbrs)| {
                nbrs.iter().fold(Vector3::zeros(), |force, &k| {
                    let rik = sim_box.displacement(&positions[i], &positions[k]);
                    force + rik * self.pair_force_factor(rik.norm())
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn reduced() -> SmoothedLennardJones {
        SmoothedLennardJones::new(1.0, 1.0, 2.5, 2.0)
    }

    #[test]
    fn test_junction_matches_lj_at_rp() {
        let lj = reduced();
        let rp = lj.smoothing_start;
        let lj_value = lj.lj_potential(rp);
        let lj_slope = 4.0 * (-12.0 * rp.powi(-13) + 6.0 * rp.powi(-7));

        assert_abs_diff_eq!(lj.junction().value(rp), lj_value, epsilon = 1e-6);
        assert_abs_diff_eq!(lj.junction().derivative(rp), lj_slope, epsilon = 1e-6);

        // numerical slope of both branches, coarser because of cancellation
        // between the large polynomial coefficients
        let h = 1e-4;
        let poly_slope = (lj.junction().value(rp + h) - lj.junction().value(rp - h)) / (2.0 * h);
        let lj_num_slope = (lj.lj_potential(rp + h) - lj.lj_potential(rp - h)) / (2.0 * h);
        assert_abs_diff_eq!(poly_slope, lj_num_slope, epsilon = 1e-5);
    }

    #[test]
    fn test_junction_vanishes_at_rc() {
        let lj = reduced();
        assert_abs_diff_eq!(lj.junction().value(2.5), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(lj.junction().derivative(2.5), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_junction_for_metal_parameters() {
        // eV / angstrom scale parameters
        let lj = SmoothedLennardJones::new(0.345, 2.644, 5.5, 4.9);
        let rp = lj.smoothing_start;
        assert_abs_diff_eq!(lj.junction().value(rp), lj.lj_potential(rp), epsilon = 1e-6);
        assert_abs_diff_eq!(lj.junction().value(lj.cutoff), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pair_energy_branches() {
        let lj = reduced();
        assert_relative_eq!(lj.pair_energy(2.0f64.powf(1.0 / 6.0)), -1.0, epsilon = 1e-12);
        assert_relative_eq!(lj.pair_energy(1.0), 0.0, epsilon = 1e-12);
        // polynomial branch stays attractive and shrinks towards the cutoff
        let e1 = lj.pair_energy(2.1);
        let e2 = lj.pair_energy(2.4);
        assert!(e1 < e2 && e2 < 0.0);
    }

    #[test]
    fn test_force_factor_is_minus_slope_over_r() {
        let lj = reduced();
        for &r in &[0.95, 1.3, 1.9, 2.05, 2.3, 2.45] {
            let h = 1e-6;
            let slope = if r < lj.smoothing_start {
                (lj.lj_potential(r + h) - lj.lj_potential(r - h)) / (2.0 * h)
            } else {
                lj.junction().derivative(r)
            };
            let expected = -slope / r;
            assert_abs_diff_eq!(
                lj.pair_force_factor(r),
                expected,
                epsilon = 1e-5 * (1.0 + expected.abs())
            );
        }
    }

    #[test]
    fn test_sharp_cutoff_uses_lj_everywhere() {
        let lj = SmoothedLennardJones::sharp_cutoff(1.0, 1.0, 2.5);
        assert_eq!(lj.junction().coeffs, [0.0; 8]);
        assert_relative_eq!(lj.pair_energy(2.4), lj.lj_potential(2.4));
    }

    #[test]
    fn test_tabulate_stops_before_cutoff() {
        let lj = reduced();
        let table = lj.tabulate(2.0, 0.1);
        assert_eq!(table.len(), 5);
        assert!(table.iter().all(|&(r, _)| r < 2.5));
        assert_relative_eq!(table[0].1, lj.pair_energy(2.0));
    }

    #[test]
    fn test_pair_forces_are_equal_and_opposite() {
        let lj = reduced();
        let positions = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.7, -0.4)];
        let sim_box = SimulationBox::open();
        let mut nbrs = NeighborList::new(lj.cutoff);
        nbrs.rebuild(&positions, &sim_box);

        let forces = lj.compute_forces(&positions, &nbrs, &sim_box);
        assert_abs_diff_eq!((forces[0] + forces[1]).norm(), 0.0, epsilon = 1e-12);

        let r = (positions[1] - positions[0]).norm();
        assert_relative_eq!(
            lj.potential_energy(&positions, &nbrs, &sim_box),
            lj.pair_energy(r),
            epsilon = 1e-12
        );
    }
}
