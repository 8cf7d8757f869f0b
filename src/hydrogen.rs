use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;

fn is_removable_h(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> Option<NodeIndex> {
    let atom = mol.atom(idx);
    if atom.atomic_num != 1 || atom.isotope != 0 || atom.formal_charge != 0 {
        return None;
    }
    let mut neighbors = mol.neighbors(idx);
    let parent = neighbors.next()?;
    if neighbors.next().is_some() || mol.atom(parent).atomic_num == 1 {
        return None;
    }
    Some(parent)
}

/// Fold explicit hydrogen atoms into their parent's `hydrogen_count`.
///
/// Only neutral, unlabelled hydrogens with exactly one heavy-atom neighbour
/// are removed; deuterium, H+ and H2 stay as atoms. Remaining atoms keep
/// their relative order, and the name and properties are carried over.
pub fn remove_hs(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let node_count = mol.atom_count();
    let mut removable = vec![false; node_count];
    let mut extra_h: Vec<u8> = vec![0; node_count];

    for idx in mol.atoms() {
        if let Some(parent) = is_removable_h(mol, idx) {
            removable[idx.index()] = true;
            extra_h[parent.index()] = extra_h[parent.index()].saturating_add(1);
        }
    }

    let mut result = Mol::new();
    result.set_name(mol.name());
    result.set_properties(mol.properties().clone());
    let mut index_map: Vec<Option<NodeIndex>> = vec![None; node_count];

    for idx in mol.atoms() {
        if removable[idx.index()] {
            continue;
        }
        let atom = mol.atom(idx);
        let new_idx = result.add_atom(Atom {
            hydrogen_count: atom.hydrogen_count.saturating_add(extra_h[idx.index()]),
            ..*atom
        });
        index_map[idx.index()] = Some(new_idx);
    }

    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if let (Some(new_a), Some(new_b)) = (index_map[a.index()], index_map[b.index()]) {
            result.add_bond(new_a, new_b, *mol.bond(edge));
        }
    }

    result
}
