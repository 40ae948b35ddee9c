use nalgebra::Vector3;

/// Simulation box with per-axis size and periodicity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    pub lengths: Vector3<f64>,
    pub periodic: [bool; 3],
}

impl SimulationBox {
    pub fn new(lengths: Vector3<f64>, periodic: [bool; 3]) -> Self {
        Self { lengths, periodic }
    }

    /// Cubic box of side `size`, periodic along every axis or none
    pub fn cubic(size: f64, periodic: bool) -> Self {
        Self::new(Vector3::repeat(size), [periodic; 3])
    }

    /// Box without periodic images; its lengths are never used
    pub fn open() -> Self {
        Self::new(Vector3::repeat(f64::INFINITY), [false; 3])
    }

    /// `a - b`, shifted to the nearest periodic image along periodic axes
    ///
    /// Components land in `[-L/2, L/2)`: a separation of exactly half the
    /// box maps to `-L/2` from either side, so such pairs are not
    /// antisymmetric.
    #[inline]
    pub fn displacement(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
        let mut d = a - b;
        for k in 0..3 {
            if self.periodic[k] {
                let l = self.lengths[k];
                d[k] -= l * (d[k] / l + 0.5).floor();
            }
        }
        d
    }

    #[inline]
    pub fn distance(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        self.displacement(a, b).norm()
    }
}
