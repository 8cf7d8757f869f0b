use molprep::{Atom, Bond, BondOrder, Molecule};
use petgraph::graph::NodeIndex;

use BondOrder::{Double as D, Single as S};

/// `count` 2-pyridone rings joined C4–C6 by single bonds.
pub fn pyridone_chain(count: usize) -> Molecule {
    let mut mol = Molecule::new();
    let mut previous: Option<NodeIndex> = None;
    for k in 0..count {
        let base = mol.atom_count();
        for (i, z) in [7u8, 6, 6, 6, 6, 6, 8].into_iter().enumerate() {
            mol.add_atom(Atom {
                atomic_num: z,
                position: [k as f64 * 5.0 + i as f64, (i % 2) as f64, 0.0],
                ..Atom::default()
            });
        }
        let n = |i: usize| NodeIndex::new(base + i);
        for (a, b, order) in [
            (0, 1, S),
            (1, 2, S),
            (2, 3, D),
            (3, 4, S),
            (4, 5, D),
            (5, 0, S),
            (1, 6, D),
        ] {
            mol.add_bond(n(a), n(b), Bond::new(order));
        }
        if let Some(prev) = previous {
            mol.add_bond(prev, n(5), Bond::new(S));
        }
        previous = Some(n(3));
    }
    mol.set_name(format!("pyridone x{count}"));
    mol
}

#[allow(dead_code)]
pub fn naphthalene() -> Molecule {
    let mut mol = Molecule::new();
    for i in 0..10 {
        mol.add_atom(Atom {
            atomic_num: 6,
            position: [i as f64, 0.0, 0.0],
            ..Atom::default()
        });
    }
    let n = NodeIndex::new;
    for (a, b, order) in [
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
    ] {
        mol.add_bond(n(a), n(b), Bond::new(order));
    }
    mol.set_name("naphthalene");
    mol
}
