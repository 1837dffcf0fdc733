//! Tight-binding part of the mean-field Hamiltonian.

use nalgebra::DMatrix;

use crate::lattice::Lattice;

/// Build the spin-independent hopping matrix for the periodic lattice.
///
/// Nearest neighbours couple with amplitude `-t`, and one diagonal direction
/// (`(x-1, y+1)` and `(x+1, y-1)`) with `-t_prime`. The matrix does not
/// change over the self-consistency cycle, so it is built once per trial.
/// Entries are accumulated, so neighbours that coincide on very small
/// lattices (s = 2) stack up as they should.
pub fn tight_binding_hamiltonian(lattice: &Lattice, t: f64, t_prime: f64) -> DMatrix<f64> {
    let n = lattice.n_sites();
    let mut h_tb = DMatrix::<f64>::zeros(n, n);

    for i in 0..n {
        let x = lattice.site_x(i) as i64;
        let y = lattice.site_y(i) as i64;

        // nearest-neighbour hopping
        h_tb[(i, lattice.site_index(x - 1, y))] -= t;
        h_tb[(i, lattice.site_index(x + 1, y))] -= t;
        h_tb[(i, lattice.site_index(x, y - 1))] -= t;
        h_tb[(i, lattice.site_index(x, y + 1))] -= t;

        // diagonal hopping, one direction only
        h_tb[(i, lattice.site_index(x - 1, y + 1))] -= t_prime;
        h_tb[(i, lattice.site_index(x + 1, y - 1))] -= t_prime;
    }

    h_tb
}

#[cfg(test)]
mod tests {
    use super::tight_binding_hamiltonian;
    use crate::lattice::Lattice;

    #[test]
    fn matrix_is_symmetric() {
        for s in 2..=6 {
            let lattice = Lattice::new(s);
            let h = tight_binding_hamiltonian(&lattice, 1.0, 0.3);
            for i in 0..lattice.n_sites() {
                for j in 0..lattice.n_sites() {
                    assert_eq!(h[(i, j)], h[(j, i)], "asymmetry at ({}, {})", i, j);
                }
            }
        }
    }

    #[test]
    fn nearest_neighbour_entries() {
        let lattice = Lattice::new(4);
        let h = tight_binding_hamiltonian(&lattice, 1.0, 0.0);

        // site 5 sits at (1, 1); its four neighbours carry -t
        let i = lattice.site_index(1, 1);
        assert_eq!(h[(i, lattice.site_index(0, 1))], -1.0);
        assert_eq!(h[(i, lattice.site_index(2, 1))], -1.0);
        assert_eq!(h[(i, lattice.site_index(1, 0))], -1.0);
        assert_eq!(h[(i, lattice.site_index(1, 2))], -1.0);
        assert_eq!(h[(i, i)], 0.0);

        // each row sums to -4t for pure nearest-neighbour hopping
        for i in 0..lattice.n_sites() {
            let row_sum: f64 = (0..lattice.n_sites()).map(|j| h[(i, j)]).sum();
            assert!((row_sum + 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn coinciding_neighbours_accumulate() {
        // on a 2x2 cell the left and right neighbour are the same site
        let lattice = Lattice::new(2);
        let h = tight_binding_hamiltonian(&lattice, 1.0, 0.0);
        let i = lattice.site_index(0, 0);
        assert_eq!(h[(i, lattice.site_index(1, 0))], -2.0);
        assert_eq!(h[(i, lattice.site_index(0, 1))], -2.0);
    }

    #[test]
    fn diagonal_hopping_is_anisotropic() {
        let lattice = Lattice::new(4);
        let h = tight_binding_hamiltonian(&lattice, 0.0, 0.7);
        let i = lattice.site_index(1, 1);
        assert_eq!(h[(i, lattice.site_index(0, 2))], -0.7);
        assert_eq!(h[(i, lattice.site_index(2, 0))], -0.7);
        // the other diagonal stays uncoupled
        assert_eq!(h[(i, lattice.site_index(2, 2))], 0.0);
        assert_eq!(h[(i, lattice.site_index(0, 0))], 0.0);
    }
}
