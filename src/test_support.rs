//! Small hand-built molecules shared by the unit tests.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;

use BondOrder::{Double as D, Single as S};

pub fn n(i: usize) -> NodeIndex {
    NodeIndex::new(i)
}

pub fn mol_from(elements: &[u8], bonds: &[(usize, usize, BondOrder)]) -> Mol<Atom, Bond> {
    let mut mol = Mol::new();
    for (i, &z) in elements.iter().enumerate() {
        mol.add_atom(Atom {
            atomic_num: z,
            position: [i as f64 * 1.4, 0.0, 0.0],
            ..Atom::default()
        });
    }
    for &(a, b, order) in bonds {
        mol.add_bond(n(a), n(b), Bond::new(order));
    }
    mol
}

/// Benzene with alternating single/double bonds, hydrogens implicit.
pub fn benzene_kekule() -> Mol<Atom, Bond> {
    mol_from(
        &[6; 6],
        &[(0, 1, D), (1, 2, S), (2, 3, D), (3, 4, S), (4, 5, D), (5, 0, S)],
    )
}

/// Phenol: ring atoms 0..6, hydroxyl oxygen 6 on atom 0.
pub fn phenol_kekule() -> Mol<Atom, Bond> {
    mol_from(
        &[6, 6, 6, 6, 6, 6, 8],
        &[
            (0, 1, D),
            (1, 2, S),
            (2, 3, D),
            (3, 4, S),
            (4, 5, D),
            (5, 0, S),
            (0, 6, S),
        ],
    )
}

/// Naphthalene; atoms 4 and 9 are the ring fusion.
pub fn naphthalene_kekule() -> Mol<Atom, Bond> {
    mol_from(
        &[6; 10],
        &[
            (0, 1, D),
            (1, 2, S),
            (2, 3, D),
            (3, 4, S),
            (4, 9, D),
            (9, 0, S),
            (4, 5, S),
            (5, 6, D),
            (6, 7, S),
            (7, 8, D),
            (8, 9, S),
        ],
    )
}

/// Pyridine, nitrogen at index 0.
pub fn pyridine_kekule() -> Mol<Atom, Bond> {
    mol_from(
        &[7, 6, 6, 6, 6, 6],
        &[(0, 1, D), (1, 2, S), (2, 3, D), (3, 4, S), (4, 5, D), (5, 0, S)],
    )
}

/// Pyrrole, NH at index 0.
pub fn pyrrole_kekule() -> Mol<Atom, Bond> {
    mol_from(
        &[7, 6, 6, 6, 6],
        &[(0, 1, S), (1, 2, D), (2, 3, S), (3, 4, D), (4, 0, S)],
    )
}

/// Pyridin-2(1H)-one: ring N1 (0), C2 (1) … C6 (5); carbonyl oxygen 6 on C2.
pub fn pyridone_kekule() -> Mol<Atom, Bond> {
    mol_from(
        &[7, 6, 6, 6, 6, 6, 8],
        &[
            (0, 1, S),
            (1, 2, S),
            (2, 3, D),
            (3, 4, S),
            (4, 5, D),
            (5, 0, S),
            (1, 6, D),
        ],
    )
}

/// Quinolin-2(1H)-one.
///
/// Pyridone ring: N1 (0), C2 (1), C3 (2), C4 (3), C4a (4), C8a (9).
/// Benzo ring: C4a (4), C5 (5), C6 (6), C7 (7), C8 (8), C8a (9).
/// Carbonyl oxygen 10 on C2.
pub fn quinolinone_kekule() -> Mol<Atom, Bond> {
    mol_from(
        &[7, 6, 6, 6, 6, 6, 6, 6, 6, 6, 8],
        &[
            (0, 1, S),
            (1, 2, S),
            (2, 3, D),
            (3, 4, S),
            (4, 5, D),
            (5, 6, S),
            (6, 7, D),
            (7, 8, S),
            (8, 9, D),
            (9, 4, S),
            (9, 0, S),
            (1, 10, D),
        ],
    )
}

/// Nitrobenzene drawn without charges: N (6) bonded to ring atom 0, O (7)
/// double, O (8) single. Neutral N has valence 4 and O8 valence 1.
pub fn neutral_nitrobenzene() -> Mol<Atom, Bond> {
    mol_from(
        &[6, 6, 6, 6, 6, 6, 7, 8, 8],
        &[
            (0, 1, D),
            (1, 2, S),
            (2, 3, D),
            (3, 4, S),
            (4, 5, D),
            (5, 0, S),
            (0, 6, S),
            (6, 7, D),
            (6, 8, S),
        ],
    )
}

/// Count bonds with the given order.
pub fn count_orders(mol: &Mol<Atom, Bond>, order: BondOrder) -> usize {
    mol.bonds().filter(|&e| mol.bond(e).order == order).count()
}
