use std::collections::BTreeSet;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;

/// `(query atom, target atom)` pairs, in query search order.
pub type AtomMapping = Vec<(NodeIndex, NodeIndex)>;

/// Constraints on a single target atom. `None` fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtomQuery {
    pub atomic_num: Option<u8>,
    pub formal_charge: Option<i8>,
    pub aromatic: Option<bool>,
    pub in_ring: Option<bool>,
}

impl AtomQuery {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn aromatic(mut self, aromatic: bool) -> Self {
        self.aromatic = Some(aromatic);
        self
    }

    pub fn in_ring(mut self, in_ring: bool) -> Self {
        self.in_ring = Some(in_ring);
        self
    }

    pub fn matches(&self, atom: &Atom, in_ring: bool) -> bool {
        self.atomic_num.is_none_or(|z| atom.atomic_num == z)
            && self.formal_charge.is_none_or(|c| atom.formal_charge == c)
            && self.aromatic.is_none_or(|a| atom.is_aromatic == a)
            && self.in_ring.is_none_or(|r| in_ring == r)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BondQuery {
    #[default]
    Any,
    /// Exact bond type.
    Order(BondOrder),
    /// Any bond carrying the aromatic flag.
    Aromatic,
}

impl BondQuery {
    pub fn matches(&self, bond: &Bond) -> bool {
        match self {
            BondQuery::Any => true,
            BondQuery::Order(order) => bond.order == *order,
            BondQuery::Aromatic => bond.is_aromatic,
        }
    }
}

/// A connected query graph whose first atom is the anchor.
///
/// The anchor plays the role of a recursive SMARTS environment: a target
/// atom matches the pattern when some embedding maps the anchor onto it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pattern {
    query: Mol<AtomQuery, BondQuery>,
}

impl Pattern {
    pub fn new(anchor: AtomQuery) -> Self {
        let mut query = Mol::new();
        query.add_atom(anchor);
        Self { query }
    }

    pub fn anchor(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    pub fn add_atom(&mut self, atom: AtomQuery) -> NodeIndex {
        self.query.add_atom(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: BondQuery) {
        self.query.add_bond(a, b, bond);
    }

    pub fn query(&self) -> &Mol<AtomQuery, BondQuery> {
        &self.query
    }

    /// Every embedding of the pattern in `target`.
    pub fn matches(&self, target: &Mol<Atom, Bond>, rings: &RingInfo) -> Vec<AtomMapping> {
        get_substruct_matches_with(
            target,
            &self.query,
            |t, q: &AtomQuery| q.matches(target.atom(t), rings.is_ring_atom(t)),
            |t: &Bond, q: &BondQuery| q.matches(t),
        )
    }
}

/// Selects atoms of a molecule by their local environment.
pub trait AtomPattern {
    /// Matching atoms, ascending and without duplicates.
    fn matching_atoms(&self, mol: &Mol<Atom, Bond>, rings: &RingInfo) -> Vec<NodeIndex>;
}

impl AtomPattern for Pattern {
    fn matching_atoms(&self, mol: &Mol<Atom, Bond>, rings: &RingInfo) -> Vec<NodeIndex> {
        let anchor = self.anchor();
        let hits: BTreeSet<NodeIndex> = self
            .matches(mol, rings)
            .into_iter()
            .flat_map(|mapping| {
                mapping
                    .into_iter()
                    .filter(move |&(q, _)| q == anchor)
                    .map(|(_, t)| t)
            })
            .collect();
        hits.into_iter().collect()
    }
}

/// An aromatic atom double-bonded to an atom outside every ring,
/// `[$([a]=[!R])]` in SMARTS.
pub fn exocyclic_double_bond() -> Pattern {
    let mut pattern = Pattern::new(AtomQuery::any().aromatic(true));
    let partner = pattern.add_atom(AtomQuery::any().in_ring(false));
    pattern.add_bond(
        pattern.anchor(),
        partner,
        BondQuery::Order(BondOrder::Double),
    );
    pattern
}

/// First embedding of `query` in `target`.
///
/// `atom_match` receives the target atom's index rather than the atom, so
/// callers can consult per-atom context such as ring membership.
pub fn get_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> Option<AtomMapping> {
    Vf2::new(target, query, atom_match, bond_match).find_first()
}

pub fn get_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(NodeIndex, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> Vec<AtomMapping> {
    Vf2::new(target, query, atom_match, bond_match).find_all()
}

struct Vf2<'a, A1, B1, A2, B2, FA, FB> {
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    atom_match: FA,
    bond_match: FB,
    query_order: Vec<NodeIndex>,
    query_map: Vec<Option<NodeIndex>>,
    target_used: Vec<bool>,
}

impl<'a, A1, B1, A2, B2, FA, FB> Vf2<'a, A1, B1, A2, B2, FA, FB>
where
    FA: Fn(NodeIndex, &A2) -> bool,
    FB: Fn(&B1, &B2) -> bool,
{
    fn new(
        target: &'a Mol<A1, B1>,
        query: &'a Mol<A2, B2>,
        atom_match: FA,
        bond_match: FB,
    ) -> Self {
        Self {
            target,
            query,
            atom_match,
            bond_match,
            query_order: search_order(query),
            query_map: vec![None; query.atom_count()],
            target_used: vec![false; target.atom_count()],
        }
    }

    fn find_first(&mut self) -> Option<AtomMapping> {
        let mut results = Vec::new();
        self.recurse(0, &mut results, true);
        results.into_iter().next()
    }

    fn find_all(&mut self) -> Vec<AtomMapping> {
        let mut results = Vec::new();
        self.recurse(0, &mut results, false);
        results
    }

    fn recurse(&mut self, depth: usize, results: &mut Vec<AtomMapping>, first_only: bool) {
        if depth == self.query_order.len() {
            let mapping = self
                .query_order
                .iter()
                .filter_map(|&qn| self.query_map[qn.index()].map(|tn| (qn, tn)))
                .collect();
            results.push(mapping);
            return;
        }

        if first_only && !results.is_empty() {
            return;
        }

        let query_node = self.query_order[depth];

        for t_idx in 0..self.target_used.len() {
            if self.target_used[t_idx] {
                continue;
            }

            let target_node = NodeIndex::new(t_idx);

            if !self.is_feasible(query_node, target_node) {
                continue;
            }

            self.query_map[query_node.index()] = Some(target_node);
            self.target_used[t_idx] = true;

            self.recurse(depth + 1, results, first_only);

            if first_only && !results.is_empty() {
                return;
            }

            self.query_map[query_node.index()] = None;
            self.target_used[t_idx] = false;
        }
    }

    fn is_feasible(&self, query_node: NodeIndex, target_node: NodeIndex) -> bool {
        if !(self.atom_match)(target_node, self.query.atom(query_node)) {
            return false;
        }

        for q_neighbor in self.query.neighbors(query_node) {
            let Some(t_mapped) = self.query_map[q_neighbor.index()] else {
                continue;
            };
            let Some(q_bond) = self.query.bond_between(query_node, q_neighbor) else {
                return false;
            };
            match self.target.bond_between(target_node, t_mapped) {
                Some(t_bond) => {
                    if !(self.bond_match)(self.target.bond(t_bond), self.query.bond(q_bond)) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        true
    }
}

/// Query atoms ordered so each one after the first is bonded to an earlier
/// one where possible, highest degree first within a component.
fn search_order<A, B>(query: &Mol<A, B>) -> Vec<NodeIndex> {
    let mut by_degree: Vec<NodeIndex> = query.atoms().collect();
    by_degree.sort_by_key(|&a| std::cmp::Reverse(query.degree(a)));

    let mut placed = vec![false; query.atom_count()];
    let mut order = Vec::with_capacity(query.atom_count());
    for &root in &by_degree {
        if placed[root.index()] {
            continue;
        }
        placed[root.index()] = true;
        order.push(root);
        let mut cursor = order.len() - 1;
        while cursor < order.len() {
            let current = order[cursor];
            for nb in query.neighbors(current) {
                if !placed[nb.index()] {
                    placed[nb.index()] = true;
                    order.push(nb);
                }
            }
            cursor += 1;
        }
    }
    order
}
