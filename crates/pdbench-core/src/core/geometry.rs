use nalgebra::Point3;

/// Backbone heavy atoms of one residue; any of them may be missing from the model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackboneAtoms {
    pub n: Option<Point3<f64>>,
    pub ca: Option<Point3<f64>>,
    pub c: Option<Point3<f64>>,
}

/// Dihedral angle p0-p1-p2-p3 in degrees, in (-180, 180].
pub fn dihedral_degrees(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
) -> f64 {
    let b0 = p0 - p1;
    let b1 = (p2 - p1).normalize();
    let b2 = p3 - p2;

    let v = b0 - b1 * b0.dot(&b1);
    let w = b2 - b1 * b2.dot(&b1);

    let x = v.dot(&w);
    let y = b1.cross(&v).dot(&w);
    y.atan2(x).to_degrees()
}

/// Phi/psi pairs for a run of consecutive residues.
///
/// The first residue has no phi and the last has no psi; residues with missing backbone
/// atoms get `None` for every angle that needs them.
pub fn phi_psi(residues: &[BackboneAtoms]) -> Vec<(Option<f64>, Option<f64>)> {
    (0..residues.len())
        .map(|i| {
            let current = &residues[i];
            let phi = i
                .checked_sub(1)
                .and_then(|prev| residues[prev].c)
                .zip(current.n)
                .zip(current.ca.zip(current.c))
                .map(|((c_prev, n), (ca, c))| dihedral_degrees(&c_prev, &n, &ca, &c));
            let psi = residues
                .get(i + 1)
                .and_then(|next| next.n)
                .zip(current.n)
                .zip(current.ca.zip(current.c))
                .map(|((n_next, n), (ca, c))| dihedral_degrees(&n, &ca, &c, &n_next));
            (phi, psi)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn dihedral_of_trans_arrangement_is_180() {
        let angle = dihedral_degrees(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(-1.0, 1.0, 0.0),
        );
        assert!((angle.abs() - 180.0).abs() < TOLERANCE);
    }

    #[test]
    fn dihedral_of_cis_arrangement_is_zero() {
        let angle = dihedral_degrees(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
        );
        assert!(angle.abs() < TOLERANCE);
    }

    #[test]
    fn dihedral_sign_follows_iupac_convention() {
        let angle = dihedral_degrees(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(0.0, 1.0, 1.0),
        );
        assert!((angle + 90.0).abs() < TOLERANCE);
    }

    #[test]
    fn phi_psi_leaves_terminal_angles_undefined() {
        let residue = BackboneAtoms {
            n: Some(Point3::new(0.0, 0.0, 0.0)),
            ca: Some(Point3::new(1.45, 0.0, 0.0)),
            c: Some(Point3::new(2.0, 1.4, 0.0)),
        };
        let next = BackboneAtoms {
            n: Some(Point3::new(3.3, 1.5, 0.2)),
            ca: Some(Point3::new(4.0, 2.7, 0.4)),
            c: Some(Point3::new(5.5, 2.6, 0.1)),
        };
        let angles = phi_psi(&[residue, next]);
        assert_eq!(angles.len(), 2);
        assert!(angles[0].0.is_none());
        assert!(angles[0].1.is_some());
        assert!(angles[1].0.is_some());
        assert!(angles[1].1.is_none());
    }

    #[test]
    fn phi_psi_skips_residues_with_missing_atoms() {
        let complete = BackboneAtoms {
            n: Some(Point3::new(0.0, 0.0, 0.0)),
            ca: Some(Point3::new(1.45, 0.0, 0.0)),
            c: Some(Point3::new(2.0, 1.4, 0.0)),
        };
        let missing_ca = BackboneAtoms {
            ca: None,
            ..complete
        };
        let angles = phi_psi(&[complete, missing_ca, complete]);
        assert!(angles[1].0.is_none());
        assert!(angles[1].1.is_none());
    }
}
