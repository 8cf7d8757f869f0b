//! Aromaticity regularization: rings carrying an exocyclic double bond are
//! returned to their Kekulé form.
//!
//! Full sanitization marks 2-pyridone and similar rings aromatic even though
//! one ring atom is double-bonded outside the ring. [`regularize_aromaticity`]
//! undoes that for every ring whose atoms are not shared with a regular
//! aromatic ring, restoring the bond types the molecule had on entry.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::{NITROGEN, OXYGEN};
use crate::mol::Mol;
use crate::rings::{ring_atoms, RingInfo, RingPerception, Sssr};
use crate::sanitize::{sanitize, SanitizeError};
use crate::substruct::{exocyclic_double_bond, AtomPattern, Pattern};
use crate::valence::{explicit_valence, update_property_cache};

/// Bond types keyed by `(begin, end)` atom pair, as captured on entry.
pub type BondTypeMap = HashMap<(NodeIndex, NodeIndex), BondOrder>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegularizeOptions {
    /// Assign formal charges to N and O atoms whose explicit valence only
    /// makes sense charged: N(4) → +1, O(3) → +1, O(1) → −1.
    pub correct_charges: bool,
}

impl Default for RegularizeOptions {
    fn default() -> Self {
        Self {
            correct_charges: true,
        }
    }
}

/// What a successful regularization did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegularizeReport {
    /// Rings as perceived after sanitization.
    pub rings: Vec<Vec<NodeIndex>>,
    /// One entry per ring: true when some ring atom matched the pattern.
    pub flagged: Vec<bool>,
    /// Atoms whose aromatic flag was cleared, ascending.
    pub repaired_atoms: Vec<NodeIndex>,
    /// Atoms given a formal charge, with the charge they received.
    pub charged_atoms: Vec<(NodeIndex, i8)>,
}

impl RegularizeReport {
    pub fn flagged_rings(&self) -> impl Iterator<Item = &Vec<NodeIndex>> + '_ {
        self.rings
            .iter()
            .zip(&self.flagged)
            .filter(|(_, &flag)| flag)
            .map(|(ring, _)| ring)
    }

    pub fn changed(&self) -> bool {
        !self.repaired_atoms.is_empty() || !self.charged_atoms.is_empty()
    }
}

/// Aromaticity regularizer with pluggable ring perception and pattern.
#[derive(Debug, Clone)]
pub struct Regularizer<R = Sssr, P = Pattern> {
    rings: R,
    pattern: P,
    options: RegularizeOptions,
}

impl Default for Regularizer {
    fn default() -> Self {
        Self::new(Sssr, exocyclic_double_bond(), RegularizeOptions::default())
    }
}

impl<R: RingPerception, P: AtomPattern> Regularizer<R, P> {
    pub fn new(rings: R, pattern: P, options: RegularizeOptions) -> Self {
        Self {
            rings,
            pattern,
            options,
        }
    }

    pub fn options(&self) -> &RegularizeOptions {
        &self.options
    }

    /// Regularize `mol` in place.
    ///
    /// The work is done on a copy that replaces `mol` only on success, so a
    /// failed call leaves the caller's molecule exactly as it was.
    #[instrument(skip_all, name = "regularize", fields(molecule = %mol.name()))]
    pub fn regularize(&self, mol: &mut Mol<Atom, Bond>) -> Result<RegularizeReport, SanitizeError> {
        let (result, report) = self.regularized(mol)?;
        *mol = result;
        Ok(report)
    }

    /// Regularized copy of `mol`; the input is not touched.
    pub fn regularized(
        &self,
        mol: &Mol<Atom, Bond>,
    ) -> Result<(Mol<Atom, Bond>, RegularizeReport), SanitizeError> {
        let mut work = mol.clone();
        let bond_types = snapshot_bond_types(&work);

        // Lenient mode never returns an error.
        let _ = update_property_cache(&mut work, false);
        let charged_atoms = if self.options.correct_charges {
            correct_charges(&mut work)
        } else {
            Vec::new()
        };

        sanitize(&mut work)?;

        let ring_info = self.rings.perceive(&work);
        let hits: HashSet<NodeIndex> = self
            .pattern
            .matching_atoms(&work, &ring_info)
            .into_iter()
            .collect();
        let flagged: Vec<bool> = ring_info
            .rings()
            .iter()
            .map(|ring| ring.iter().any(|atom| hits.contains(atom)))
            .collect();

        let repaired_atoms = atoms_to_repair(&ring_info, &flagged);
        for &idx in &repaired_atoms {
            trace!(atom = idx.index(), "restoring Kekulé bonds");
            restore_atom(&mut work, idx, &bond_types);
        }

        debug!(
            rings = ring_info.num_rings(),
            flagged = flagged.iter().filter(|&&f| f).count(),
            repaired = repaired_atoms.len(),
            charged = charged_atoms.len(),
            "aromaticity regularized"
        );

        let report = RegularizeReport {
            rings: ring_info.rings().to_vec(),
            flagged,
            repaired_atoms,
            charged_atoms,
        };
        Ok((work, report))
    }
}

/// Regularize with SSSR rings, the `[$([a]=[!R])]` pattern and default
/// options. See [`Regularizer::regularize`].
pub fn regularize_aromaticity(
    mol: &mut Mol<Atom, Bond>,
) -> Result<RegularizeReport, SanitizeError> {
    Regularizer::default().regularize(mol)
}

/// Non-mutating form of [`regularize_aromaticity`].
pub fn regularized(
    mol: &Mol<Atom, Bond>,
) -> Result<(Mol<Atom, Bond>, RegularizeReport), SanitizeError> {
    Regularizer::default().regularized(mol)
}

/// Clear the aromatic flag on every atom outside all SSSR rings.
///
/// Bonds are left alone. Returns the number of atoms changed.
pub fn fix_aromatic(mol: &mut Mol<Atom, Bond>) -> usize {
    let in_ring = ring_atoms(mol);
    let stray: Vec<NodeIndex> = mol
        .atoms()
        .filter(|idx| !in_ring.contains(idx) && mol.atom(*idx).is_aromatic)
        .collect();
    for &idx in &stray {
        mol.atom_mut(idx).is_aromatic = false;
    }
    stray.len()
}

pub fn snapshot_bond_types(mol: &Mol<Atom, Bond>) -> BondTypeMap {
    mol.bonds()
        .filter_map(|e| {
            let (a, b) = mol.bond_endpoints(e)?;
            Some(((a, b), mol.bond(e).order))
        })
        .collect()
}

fn lookup(bond_types: &BondTypeMap, a: NodeIndex, b: NodeIndex) -> Option<BondOrder> {
    bond_types
        .get(&(a, b))
        .or_else(|| bond_types.get(&(b, a)))
        .copied()
}

/// Charges implied by explicit valence: N(4) → +1, O(3) → +1, O(1) → −1.
///
/// A hydroxyl oxygen whose hydrogen is implicit also has explicit valence 1,
/// so inputs are expected to carry their hydrogens.
fn correct_charges(mol: &mut Mol<Atom, Bond>) -> Vec<(NodeIndex, i8)> {
    let mut changed = Vec::new();
    for idx in mol.atoms().collect::<Vec<_>>() {
        let valence = explicit_valence(mol, idx);
        let charge = match (mol.atom(idx).atomic_num, valence) {
            (NITROGEN, 4) => 1,
            (OXYGEN, 3) => 1,
            (OXYGEN, 1) => -1,
            _ => continue,
        };
        let atom = mol.atom_mut(idx);
        if atom.formal_charge != charge {
            atom.formal_charge = charge;
            changed.push((idx, charge));
        }
    }
    changed
}

/// Atoms of flagged rings that belong to no unflagged ring.
fn atoms_to_repair(ring_info: &RingInfo, flagged: &[bool]) -> Vec<NodeIndex> {
    let mut repair = BTreeSet::new();
    let mut keep = HashSet::new();
    for (ring, &flag) in ring_info.rings().iter().zip(flagged) {
        if flag {
            repair.extend(ring.iter().copied());
        } else {
            keep.extend(ring.iter().copied());
        }
    }
    repair.into_iter().filter(|idx| !keep.contains(idx)).collect()
}

fn restore_atom(mol: &mut Mol<Atom, Bond>, idx: NodeIndex, bond_types: &BondTypeMap) {
    mol.atom_mut(idx).is_aromatic = false;
    for e in mol.bonds_of(idx).collect::<Vec<_>>() {
        let original = mol
            .bond_endpoints(e)
            .and_then(|(a, b)| lookup(bond_types, a, b));
        let bond = mol.bond_mut(e);
        bond.is_aromatic = false;
        if let Some(order) = original {
            bond.order = order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn with_hydroxyl_h(mut mol: Mol<Atom, Bond>, oxygen: usize) -> Mol<Atom, Bond> {
        mol.atom_mut(n(oxygen)).hydrogen_count = 1;
        mol
    }

    #[test]
    fn benzene_is_unchanged() {
        let mut mol = benzene_kekule();
        sanitize(&mut mol).unwrap();
        let before = mol.clone();
        let report = regularize_aromaticity(&mut mol).unwrap();
        assert_eq!(mol, before);
        assert_eq!(report.flagged, vec![false]);
        assert!(!report.changed());
    }

    #[test]
    fn phenol_keeps_aromatic_ring() {
        let mut mol = with_hydroxyl_h(phenol_kekule(), 6);
        let report = regularize_aromaticity(&mut mol).unwrap();
        assert!(report.repaired_atoms.is_empty());
        assert!(report.charged_atoms.is_empty());
        assert!((0..6).all(|i| mol.atom(n(i)).is_aromatic));
        assert_eq!(count_orders(&mol, BondOrder::Aromatic), 6);
    }

    #[test]
    fn pyridone_ring_restored() {
        let original = pyridone_kekule();
        let mut mol = original.clone();
        let report = regularize_aromaticity(&mut mol).unwrap();

        assert_eq!(report.flagged, vec![true]);
        assert_eq!(report.repaired_atoms, (0..6).map(n).collect::<Vec<_>>());
        assert_eq!(report.flagged_rings().count(), 1);
        for idx in mol.atoms() {
            assert!(!mol.atom(idx).is_aromatic);
        }
        for e in mol.bonds() {
            assert!(!mol.bond(e).is_aromatic);
            assert_eq!(mol.bond(e).order, original.bond(e).order);
        }
    }

    #[test]
    fn fused_ring_atoms_stay_aromatic() {
        let original = quinolinone_kekule();
        let mut mol = original.clone();
        let report = regularize_aromaticity(&mut mol).unwrap();

        assert_eq!(report.rings.len(), 2);
        assert_eq!(report.flagged.iter().filter(|&&f| f).count(), 1);
        // N1, C2, C3, C4 repaired; C4a and C8a shared with the benzo ring.
        assert_eq!(report.repaired_atoms, vec![n(0), n(1), n(2), n(3)]);
        assert!(mol.atom(n(4)).is_aromatic);
        assert!(mol.atom(n(9)).is_aromatic);
        for i in 5..9 {
            assert!(mol.atom(n(i)).is_aromatic);
        }

        let c3c4 = mol.bond_between(n(2), n(3)).unwrap();
        assert_eq!(mol.bond(c3c4).order, BondOrder::Double);
        assert!(!mol.bond(c3c4).is_aromatic);
        // Bond C4–C4a touches a repaired atom and so is restored too.
        let c4c4a = mol.bond_between(n(3), n(4)).unwrap();
        assert_eq!(mol.bond(c4c4a).order, BondOrder::Single);
        // Benzo ring bonds away from repaired atoms stay aromatic.
        let c6c7 = mol.bond_between(n(6), n(7)).unwrap();
        assert_eq!(mol.bond(c6c7).order, BondOrder::Aromatic);
        assert!(mol.bond(c6c7).is_aromatic);
    }

    #[test]
    fn nitro_group_charged() {
        let mut mol = neutral_nitrobenzene();
        let report = regularize_aromaticity(&mut mol).unwrap();
        assert_eq!(mol.atom(n(6)).formal_charge, 1);
        assert_eq!(mol.atom(n(8)).formal_charge, -1);
        assert_eq!(mol.atom(n(7)).formal_charge, 0);
        assert_eq!(report.charged_atoms, vec![(n(6), 1), (n(8), -1)]);
        // N=O is exocyclic to nothing aromatic; the ring stays aromatic.
        assert!((0..6).all(|i| mol.atom(n(i)).is_aromatic));
    }

    #[test]
    fn ammonium_charged() {
        let mut mol = mol_from(&[6, 7], &[(0, 1, BondOrder::Single)]);
        mol.atom_mut(n(1)).hydrogen_count = 3;
        regularize_aromaticity(&mut mol).unwrap();
        assert_eq!(mol.atom(n(1)).formal_charge, 1);
    }

    #[test]
    fn oxonium_charged() {
        let mut mol = mol_from(
            &[8, 6, 6, 6],
            &[
                (0, 1, BondOrder::Single),
                (0, 2, BondOrder::Single),
                (0, 3, BondOrder::Single),
            ],
        );
        let report = regularize_aromaticity(&mut mol).unwrap();
        assert_eq!(mol.atom(n(0)).formal_charge, 1);
        assert_eq!(report.charged_atoms, vec![(n(0), 1)]);
        assert!(mol.atoms().skip(1).all(|idx| mol.atom(idx).formal_charge == 0));
    }

    #[test]
    fn alkoxide_charged() {
        let mut mol = mol_from(&[6, 8], &[(0, 1, BondOrder::Single)]);
        regularize_aromaticity(&mut mol).unwrap();
        assert_eq!(mol.atom(n(1)).formal_charge, -1);
    }

    #[test]
    fn charge_correction_can_be_disabled() {
        let regularizer = Regularizer::new(
            Sssr,
            exocyclic_double_bond(),
            RegularizeOptions {
                correct_charges: false,
            },
        );
        let mut mol = neutral_nitrobenzene();
        let before = mol.clone();
        let err = regularizer.regularize(&mut mol).unwrap_err();
        assert!(matches!(err, SanitizeError::Valence(_)));
        assert_eq!(mol, before);
    }

    #[test]
    fn failure_leaves_molecule_untouched() {
        let mut mol = mol_from(&[6], &[]);
        mol.atom_mut(n(0)).hydrogen_count = 5;
        let before = mol.clone();
        assert!(regularize_aromaticity(&mut mol).is_err());
        assert_eq!(mol, before);
    }

    #[test]
    fn regularized_does_not_mutate_input() {
        let mol = pyridone_kekule();
        let (out, report) = regularized(&mol).unwrap();
        assert_eq!(mol, pyridone_kekule());
        assert!(report.changed());
        assert_eq!(out.atom_count(), mol.atom_count());
    }

    #[test]
    fn custom_pattern_flags_nothing() {
        struct Never;
        impl AtomPattern for Never {
            fn matching_atoms(&self, _: &Mol<Atom, Bond>, _: &RingInfo) -> Vec<NodeIndex> {
                Vec::new()
            }
        }
        let regularizer = Regularizer::new(Sssr, Never, RegularizeOptions::default());
        let mut mol = pyridone_kekule();
        let report = regularizer.regularize(&mut mol).unwrap();
        assert!(report.repaired_atoms.is_empty());
        assert!((0..6).all(|i| mol.atom(n(i)).is_aromatic));
    }

    #[test]
    fn fix_aromatic_clears_non_ring_atoms() {
        let mut mol = phenol_kekule();
        for idx in mol.atoms().collect::<Vec<_>>() {
            mol.atom_mut(idx).is_aromatic = true;
        }
        assert_eq!(fix_aromatic(&mut mol), 1);
        assert!(!mol.atom(n(6)).is_aromatic);
        assert!((0..6).all(|i| mol.atom(n(i)).is_aromatic));
        assert_eq!(fix_aromatic(&mut mol), 0);
    }

    #[test]
    fn bond_type_lookup_either_orientation() {
        let mol = pyridone_kekule();
        let map = snapshot_bond_types(&mol);
        assert_eq!(map.len(), 7);
        assert_eq!(lookup(&map, n(1), n(6)), Some(BondOrder::Double));
        assert_eq!(lookup(&map, n(6), n(1)), Some(BondOrder::Double));
        assert_eq!(lookup(&map, n(0), n(3)), None);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: RegularizeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, RegularizeOptions::default());
        let opts: RegularizeOptions = serde_json::from_str(r#"{"correct_charges":false}"#).unwrap();
        assert!(!opts.correct_charges);
    }
}
