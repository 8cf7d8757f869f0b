use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element;
use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValenceError {
    pub atom_idx: NodeIndex,
    pub atomic_num: u8,
    pub formal_charge: i8,
    pub actual_valence: u8,
    pub allowed_valences: Vec<u8>,
}

impl std::fmt::Display for ValenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = element::symbol(self.atomic_num).unwrap_or("?");
        let charge = match self.formal_charge {
            0 => String::new(),
            c if c > 0 => format!("{c:+}"),
            c => format!("{c}"),
        };
        write!(
            f,
            "atom {} ({}{}): explicit valence {} exceeds allowed {:?}",
            self.atom_idx.index(),
            sym,
            charge,
            self.actual_valence,
            self.allowed_valences,
        )
    }
}

impl std::error::Error for ValenceError {}

/// Sum of bond orders to graph neighbours plus stated hydrogens.
///
/// Aromatic bonds count 1.5 and the sum is rounded down, so a ring-fusion
/// carbon with three aromatic bonds has explicit valence 4. When that
/// overshoots every allowed valence (an aromatic carbon that also carries an
/// exocyclic double bond) but counting aromatic bonds as single fits, the
/// largest allowed valence is used. Implicit hydrogens are not included.
pub fn explicit_valence(mol: &Mol<Atom, Bond>, atom: NodeIndex) -> u8 {
    let mut half: u16 = 0;
    let mut low: u16 = 0;
    for e in mol.bonds_of(atom) {
        let order = mol.bond(e).order;
        half += order.half_valence() as u16;
        low += match order {
            BondOrder::Aromatic => 2,
            other => other.half_valence() as u16,
        };
    }
    let a = mol.atom(atom);
    let stated = a.hydrogen_count as u16;
    let valence = half / 2 + stated;
    let max_allowed = element::allowed_valences(a.atomic_num, a.formal_charge)
        .last()
        .map(|&v| v as u16);
    let clamped = match max_allowed {
        Some(max) if half != low && valence > max && low / 2 + stated <= max => max,
        _ => valence,
    };
    clamped.min(u8::MAX as u16) as u8
}

pub fn total_valence(mol: &Mol<Atom, Bond>, atom: NodeIndex) -> u8 {
    explicit_valence(mol, atom) + mol.atom(atom).implicit_hydrogens
}

/// Recompute implicit hydrogens for every atom.
///
/// In strict mode an atom whose explicit valence exceeds every allowed
/// valence for its element and charge is reported; the lenient mode only
/// refreshes the cache and never fails.
pub fn update_property_cache(
    mol: &mut Mol<Atom, Bond>,
    strict: bool,
) -> Result<(), Vec<ValenceError>> {
    let mut errors = Vec::new();
    let indices: Vec<NodeIndex> = mol.atoms().collect();
    for idx in indices {
        let explicit = explicit_valence(mol, idx);
        let atom = mol.atom(idx);
        let (implicit, error) = implicit_hydrogens_for(idx, atom, explicit);
        mol.atom_mut(idx).implicit_hydrogens = implicit;
        if let Some(err) = error {
            errors.push(err);
        }
    }

    if strict && !errors.is_empty() {
        Err(errors)
    } else {
        Ok(())
    }
}

pub fn check_valence(mol: &Mol<Atom, Bond>) -> Result<(), Vec<ValenceError>> {
    let errors: Vec<ValenceError> = mol
        .atoms()
        .filter_map(|idx| {
            let explicit = explicit_valence(mol, idx);
            implicit_hydrogens_for(idx, mol.atom(idx), explicit).1
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn implicit_hydrogens_for(
    idx: NodeIndex,
    atom: &Atom,
    explicit: u8,
) -> (u8, Option<ValenceError>) {
    let allowed = element::allowed_valences(atom.atomic_num, atom.formal_charge);
    if allowed.is_empty() {
        return (0, None);
    }
    match allowed.iter().copied().find(|&v| v >= explicit) {
        Some(target) if !atom.no_implicit => (target - explicit, None),
        Some(_) => (0, None),
        None => (
            0,
            Some(ValenceError {
                atom_idx: idx,
                atomic_num: atom.atomic_num,
                formal_charge: atom.formal_charge,
                actual_valence: explicit,
                allowed_valences: allowed.to_vec(),
            }),
        ),
    }
}
