use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::{ring_contains_bond, RingInfo};
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

const SP2_CAPABLE: [u8; 9] = [
    5,  // B
    6,  // C
    7,  // N
    8,  // O
    15, // P
    16, // S
    33, // As
    34, // Se
    52, // Te
];

/// Exocyclic double-bond partners that pull the π electron out of the ring.
const ELECTRONEGATIVE: [u8; 3] = [7, 8, 16];

/// Rings of `ring_info` that satisfy Hückel's rule on a Kekulé structure.
///
/// Each ring is judged on its own; fused systems are aromatic when each
/// member ring is. Bonds typed [`BondOrder::Aromatic`] are not expected here
/// and do not count as double bonds.
pub fn find_aromatic_rings<'r, A, B>(
    mol: &Mol<A, B>,
    ring_info: &'r RingInfo,
) -> Vec<&'r Vec<NodeIndex>>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    ring_info
        .rings()
        .iter()
        .filter(|ring| is_aromatic_ring(mol, ring, ring_info))
        .collect()
}

pub fn find_aromatic_atoms<A, B>(mol: &Mol<A, B>) -> Vec<bool>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let ring_info = RingInfo::sssr(mol);
    let mut aromatic = vec![false; mol.atom_count()];
    for ring in find_aromatic_rings(mol, &ring_info) {
        for &atom in ring {
            aromatic[atom.index()] = true;
        }
    }
    aromatic
}

/// Perceive aromaticity from scratch.
///
/// All existing flags are cleared first. Atoms of aromatic rings are
/// flagged, and every bond joining two consecutive atoms of an aromatic ring
/// becomes `BondOrder::Aromatic` with its flag set. Returns the number of
/// aromatic atoms.
///
/// Aromatic heteroatoms and charged carbons keep their hydrogens: implicit
/// hydrogens are moved into `hydrogen_count` and `no_implicit` is set, since
/// counting aromatic bonds as 1.5 would otherwise leave no room for them.
pub fn set_aromaticity(mol: &mut Mol<Atom, Bond>, ring_info: &RingInfo) -> usize {
    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for &idx in &atoms {
        mol.atom_mut(idx).is_aromatic = false;
    }
    for e in mol.bonds().collect::<Vec<_>>() {
        mol.bond_mut(e).is_aromatic = false;
    }

    let aromatic_rings: Vec<Vec<NodeIndex>> = find_aromatic_rings(mol, ring_info)
        .into_iter()
        .cloned()
        .collect();

    for ring in &aromatic_rings {
        for &idx in ring {
            let atom = mol.atom_mut(idx);
            atom.is_aromatic = true;
            if (atom.atomic_num != 6 || atom.formal_charge != 0) && atom.implicit_hydrogens > 0 {
                atom.hydrogen_count += atom.implicit_hydrogens;
                atom.implicit_hydrogens = 0;
                atom.no_implicit = true;
            }
        }
    }
    for e in mol.bonds().collect::<Vec<_>>() {
        let Some((a, b)) = mol.bond_endpoints(e) else {
            continue;
        };
        if aromatic_rings.iter().any(|ring| ring_contains_bond(ring, a, b)) {
            let bond = mol.bond_mut(e);
            bond.order = BondOrder::Aromatic;
            bond.is_aromatic = true;
        }
    }

    atoms.iter().filter(|&&idx| mol.atom(idx).is_aromatic).count()
}

fn is_aromatic_ring<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex], ring_info: &RingInfo) -> bool
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    if ring.len() < 3 {
        return false;
    }
    if ring
        .iter()
        .any(|&idx| !SP2_CAPABLE.contains(&mol.atom(idx).atomic_num()))
    {
        return false;
    }

    let len = ring.len();
    let has_ring_triple = (0..len).any(|i| {
        mol.bond_between(ring[i], ring[(i + 1) % len])
            .is_some_and(|e| mol.bond(e).bond_order() == BondOrder::Triple)
    });
    if has_ring_triple {
        return false;
    }

    let mut pi_total: u8 = 0;
    for &idx in ring {
        match pi_electrons(mol, idx, ring_info) {
            Some(e) => pi_total = pi_total.saturating_add(e),
            None => return false,
        }
    }
    is_huckel(pi_total)
}

/// Where an atom's double bond (if any) points.
enum DoubleBond {
    None,
    /// To an atom that is itself in a ring.
    Endocyclic,
    /// To a ring-free atom of the given element.
    Exocyclic(u8),
}

fn double_bond<A, B>(mol: &Mol<A, B>, idx: NodeIndex, ring_info: &RingInfo) -> DoubleBond
where
    A: HasAtomicNum,
    B: HasBondOrder,
{
    let mut exocyclic = None;
    for e in mol.bonds_of(idx) {
        if mol.bond(e).bond_order() != BondOrder::Double {
            continue;
        }
        let Some(other) = mol.other_atom(e, idx) else {
            continue;
        };
        if ring_info.is_ring_atom(other) {
            return DoubleBond::Endocyclic;
        }
        exocyclic = Some(mol.atom(other).atomic_num());
    }
    match exocyclic {
        Some(z) => DoubleBond::Exocyclic(z),
        None => DoubleBond::None,
    }
}

/// π electrons an atom donates to a ring, `None` if it cannot take part.
fn pi_electrons<A, B>(mol: &Mol<A, B>, idx: NodeIndex, ring_info: &RingInfo) -> Option<u8>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let degree = mol.degree(idx) + atom.hydrogen_count() as usize;
    let double = double_bond(mol, idx, ring_info);

    match (atom.atomic_num(), atom.formal_charge(), double) {
        (_, _, DoubleBond::Endocyclic) => Some(1),

        (6, 0, DoubleBond::Exocyclic(z)) if ELECTRONEGATIVE.contains(&z) => Some(0),
        (6, -1, DoubleBond::None) => Some(2),
        (6, 1, DoubleBond::None) => Some(0),

        (7 | 15 | 33, 0, DoubleBond::None) if degree <= 3 => Some(2),
        (7 | 15 | 33, -1, DoubleBond::None) => Some(2),

        (8 | 16 | 34 | 52, 0, DoubleBond::None) if degree == 2 => Some(2),

        (5, 0, DoubleBond::None) => Some(0),

        _ => None,
    }
}

fn is_huckel(pi_electrons: u8) -> bool {
    pi_electrons >= 2 && (pi_electrons - 2) % 4 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::valence::update_property_cache;

    fn perceive(mut mol: Mol<Atom, Bond>) -> Mol<Atom, Bond> {
        update_property_cache(&mut mol, true).unwrap();
        let rings = RingInfo::sssr(&mol);
        set_aromaticity(&mut mol, &rings);
        mol
    }

    fn all_aromatic(mol: &Mol<Atom, Bond>, atoms: std::ops::Range<usize>) -> bool {
        atoms.into_iter().all(|i| mol.atom(n(i)).is_aromatic)
    }

    #[test]
    fn benzene_all_aromatic() {
        let mol = perceive(benzene_kekule());
        assert!(all_aromatic(&mol, 0..6));
        assert_eq!(count_orders(&mol, BondOrder::Aromatic), 6);
        assert!(mol.bonds().all(|e| mol.bond(e).is_aromatic));
    }

    #[test]
    fn cyclohexane_none_aromatic() {
        let bonds: Vec<_> = (0..6).map(|i| (i, (i + 1) % 6, BondOrder::Single)).collect();
        let mol = perceive(mol_from(&[6; 6], &bonds));
        assert!(mol.atoms().all(|i| !mol.atom(i).is_aromatic));
    }

    #[test]
    fn pyridine_all_aromatic() {
        let mol = perceive(pyridine_kekule());
        assert!(all_aromatic(&mol, 0..6));
    }

    #[test]
    fn pyrrole_all_aromatic() {
        let mol = perceive(pyrrole_kekule());
        assert!(all_aromatic(&mol, 0..5));
        let nh = mol.atom(n(0));
        assert_eq!((nh.hydrogen_count, nh.implicit_hydrogens), (1, 0));
        assert!(nh.no_implicit);
        assert_eq!(mol.atom(n(1)).implicit_hydrogens, 1);
    }

    #[test]
    fn furan_all_aromatic() {
        let mut mol = pyrrole_kekule();
        mol.atom_mut(n(0)).atomic_num = 8;
        let mol = perceive(mol);
        assert!(all_aromatic(&mol, 0..5));
    }

    #[test]
    fn naphthalene_all_aromatic() {
        let mol = perceive(naphthalene_kekule());
        assert!(all_aromatic(&mol, 0..10));
        assert_eq!(count_orders(&mol, BondOrder::Aromatic), 11);
    }

    #[test]
    fn phenol_ring_aromatic_oxygen_not() {
        let mol = perceive(phenol_kekule());
        assert!(all_aromatic(&mol, 0..6));
        assert!(!mol.atom(n(6)).is_aromatic);
        let co = mol.bond_between(n(0), n(6)).unwrap();
        assert_eq!(mol.bond(co).order, BondOrder::Single);
        assert!(!mol.bond(co).is_aromatic);
    }

    #[test]
    fn pyridone_aromatic_with_exocyclic_carbonyl() {
        let mol = perceive(pyridone_kekule());
        assert!(all_aromatic(&mol, 0..6));
        assert!(!mol.atom(n(6)).is_aromatic);
        let co = mol.bond_between(n(1), n(6)).unwrap();
        assert_eq!(mol.bond(co).order, BondOrder::Double);
    }

    #[test]
    fn exocyclic_methylene_not_aromatic() {
        let mut mol = pyridone_kekule();
        mol.atom_mut(n(6)).atomic_num = 6;
        let mol = perceive(mol);
        assert!(mol.atoms().all(|i| !mol.atom(i).is_aromatic));
    }

    #[test]
    fn cyclopentadiene_not_aromatic() {
        let mol = perceive(mol_from(
            &[6; 5],
            &[
                (0, 1, BondOrder::Double),
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Single),
                (3, 4, BondOrder::Double),
                (4, 0, BondOrder::Single),
            ],
        ));
        assert!(mol.atoms().all(|i| !mol.atom(i).is_aromatic));
    }

    #[test]
    fn cyclopentadienyl_anion_aromatic() {
        let mut mol = mol_from(
            &[6; 5],
            &[
                (0, 1, BondOrder::Double),
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Single),
                (3, 4, BondOrder::Double),
                (4, 0, BondOrder::Single),
            ],
        );
        mol.atom_mut(n(2)).formal_charge = -1;
        update_property_cache(&mut mol, true).unwrap();
        assert!(find_aromatic_atoms(&mol).iter().all(|&a| a));
        let mol = perceive(mol);
        assert!(all_aromatic(&mol, 0..5));
        assert_eq!(mol.atom(n(2)).total_hydrogens(), 1);
    }

    #[test]
    fn cyclooctatetraene_not_aromatic() {
        let bonds: Vec<_> = (0..8)
            .map(|i| {
                let order = if i % 2 == 0 { BondOrder::Double } else { BondOrder::Single };
                (i, (i + 1) % 8, order)
            })
            .collect();
        let mol = perceive(mol_from(&[6; 8], &bonds));
        assert!(mol.atoms().all(|i| !mol.atom(i).is_aromatic));
    }

    #[test]
    fn stale_flags_cleared() {
        let bonds: Vec<_> = (0..6).map(|i| (i, (i + 1) % 6, BondOrder::Single)).collect();
        let mut mol = mol_from(&[6; 6], &bonds);
        mol.atom_mut(n(0)).is_aromatic = true;
        let mol = perceive(mol);
        assert!(!mol.atom(n(0)).is_aromatic);
    }

    #[test]
    fn huckel_rule() {
        assert!(!is_huckel(0));
        assert!(!is_huckel(1));
        assert!(is_huckel(2));
        assert!(!is_huckel(4));
        assert!(is_huckel(6));
        assert!(!is_huckel(8));
        assert!(is_huckel(10));
        assert!(is_huckel(14));
    }
}
