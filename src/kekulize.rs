//! Kekulization assigns alternating single and double bonds to aromatic ring
//! systems.
//!
//! Every bond typed [`BondOrder::Aromatic`] gets a concrete single or double
//! order, chosen so that each aromatic atom still short of its valence
//! receives exactly one double bond. The assignment is a maximum matching
//! over the aromatic bonds, grown with augmenting paths through contracted
//! odd cycles.
//!
//! Atom and bond aromatic flags are left alone; callers that re-perceive
//! aromaticity clear them themselves.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element;
use crate::mol::Mol;

/// Error returned when no valid Kekulé structure exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KekulizeError {
    /// The given atoms could not be assigned a double bond.
    #[error("cannot kekulize aromatic system: unmatched atoms [{}]", format_atoms(.0))]
    Unkekulizable(Vec<NodeIndex>),
}

fn format_atoms(atoms: &[NodeIndex]) -> String {
    atoms
        .iter()
        .map(|idx| idx.index().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Replace every aromatic bond type with a Kekulé order, in place.
///
/// Implicit hydrogens must be current (see
/// [`update_property_cache`](crate::valence::update_property_cache)); they
/// decide which atoms still need a double bond. On error the molecule is
/// unchanged.
pub fn kekulize(mol: &mut Mol<Atom, Bond>) -> Result<(), KekulizeError> {
    let n = mol.atom_count();
    let mut aromatic_adj: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![vec![]; n];
    for e in mol.bonds() {
        if mol.bond(e).order != BondOrder::Aromatic {
            continue;
        }
        if let Some((a, b)) = mol.bond_endpoints(e) {
            aromatic_adj[a.index()].push((b, e));
            aromatic_adj[b.index()].push((a, e));
        }
    }
    if aromatic_adj.iter().all(Vec::is_empty) {
        return Ok(());
    }

    let needs_double: Vec<bool> = mol
        .atoms()
        .map(|idx| !aromatic_adj[idx.index()].is_empty() && needs_double_bond(mol, idx))
        .collect();

    let mut matching = Matching::new(&aromatic_adj, &needs_double);
    let mut unmatched = Vec::new();
    for component in components(&aromatic_adj) {
        let candidates: Vec<usize> = component
            .into_iter()
            .map(NodeIndex::index)
            .filter(|&v| needs_double[v])
            .collect();
        for &root in &candidates {
            if matching.mate[root].is_none() {
                matching.augment(root);
            }
        }
        unmatched.extend(
            candidates
                .into_iter()
                .filter(|&v| matching.mate[v].is_none())
                .map(NodeIndex::new),
        );
    }
    if !unmatched.is_empty() {
        return Err(KekulizeError::Unkekulizable(unmatched));
    }

    let doubles: HashSet<EdgeIndex> = matching.matched_edges().collect();
    let aromatic_edges: Vec<EdgeIndex> = mol
        .bonds()
        .filter(|&e| mol.bond(e).order == BondOrder::Aromatic)
        .collect();
    for e in aromatic_edges {
        mol.bond_mut(e).order = if doubles.contains(&e) {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
    }
    Ok(())
}

/// An aromatic atom needs a double bond when its bonds (aromatic counted as
/// single) plus hydrogens leave exactly one unit to its target valence, or
/// when it is a bare charged atom two short (pyridinium-like N+).
fn needs_double_bond(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    let bond_sum: u8 = mol
        .bonds_of(idx)
        .map(|e| match mol.bond(e).order {
            BondOrder::Aromatic => 1,
            other => other.half_valence() / 2,
        })
        .sum();
    let used = bond_sum + atom.total_hydrogens();
    let Some(target) = element::allowed_valences(atom.atomic_num, atom.formal_charge)
        .iter()
        .copied()
        .find(|&v| v >= used)
    else {
        return false;
    };
    let gap = target - used;
    gap == 1 || (gap == 2 && atom.total_hydrogens() == 0 && atom.formal_charge != 0)
}

fn components(adj: &[Vec<(NodeIndex, EdgeIndex)>]) -> Vec<Vec<NodeIndex>> {
    let mut seen = vec![false; adj.len()];
    let mut out = Vec::new();
    for start in 0..adj.len() {
        if adj[start].is_empty() || seen[start] {
            continue;
        }
        let mut comp = Vec::new();
        let mut stack = vec![NodeIndex::new(start)];
        seen[start] = true;
        while let Some(v) = stack.pop() {
            comp.push(v);
            for &(w, _) in &adj[v.index()] {
                if !seen[w.index()] {
                    seen[w.index()] = true;
                    stack.push(w);
                }
            }
        }
        comp.sort();
        out.push(comp);
    }
    out
}

/// Maximum matching over the atoms that need a double bond (Edmonds'
/// blossom algorithm; aromatic systems with odd rings are not bipartite).
struct Matching<'a> {
    adj: &'a [Vec<(NodeIndex, EdgeIndex)>],
    needs_double: &'a [bool],
    mate: Vec<Option<usize>>,
    parent: Vec<Option<usize>>,
    base: Vec<usize>,
    in_tree: Vec<bool>,
    queue: VecDeque<usize>,
}

impl<'a> Matching<'a> {
    fn new(adj: &'a [Vec<(NodeIndex, EdgeIndex)>], needs_double: &'a [bool]) -> Self {
        let n = adj.len();
        Self {
            adj,
            needs_double,
            mate: vec![None; n],
            parent: vec![None; n],
            base: (0..n).collect(),
            in_tree: vec![false; n],
            queue: VecDeque::new(),
        }
    }

    /// Grow an alternating tree from the free vertex `root` and flip the
    /// first augmenting path found. Returns whether `root` got matched.
    fn augment(&mut self, root: usize) -> bool {
        let Some(mut v) = self.find_path(root) else {
            return false;
        };
        while let Some(pv) = self.parent[v] {
            let next = self.mate[pv];
            self.mate[v] = Some(pv);
            self.mate[pv] = Some(v);
            match next {
                Some(w) => v = w,
                None => break,
            }
        }
        true
    }

    fn find_path(&mut self, root: usize) -> Option<usize> {
        let n = self.mate.len();
        self.in_tree.fill(false);
        self.parent.fill(None);
        for (i, b) in self.base.iter_mut().enumerate() {
            *b = i;
        }
        self.in_tree[root] = true;
        self.queue.clear();
        self.queue.push_back(root);

        let adj = self.adj;
        let needs_double = self.needs_double;
        while let Some(v) = self.queue.pop_front() {
            for w in adj[v].iter().map(|(w, _)| w.index()) {
                if !needs_double[w] || self.base[v] == self.base[w] || self.mate[v] == Some(w) {
                    continue;
                }
                let w_is_outer = self.mate[w].and_then(|m| self.parent[m]).is_some();
                if w == root || w_is_outer {
                    let lca = self.common_base(v, w);
                    let mut in_blossom = vec![false; n];
                    self.mark_path(v, lca, w, &mut in_blossom);
                    self.mark_path(w, lca, v, &mut in_blossom);
                    for i in 0..n {
                        if in_blossom[self.base[i]] {
                            self.base[i] = lca;
                            if !self.in_tree[i] {
                                self.in_tree[i] = true;
                                self.queue.push_back(i);
                            }
                        }
                    }
                } else if self.parent[w].is_none() {
                    self.parent[w] = Some(v);
                    match self.mate[w] {
                        None => return Some(w),
                        Some(m) => {
                            self.in_tree[m] = true;
                            self.queue.push_back(m);
                        }
                    }
                }
            }
        }
        None
    }

    /// Step from an outer vertex towards the root: to its mate, then to
    /// the mate's tree parent.
    fn up(&self, v: usize) -> Option<usize> {
        self.mate[v].and_then(|m| self.parent[m])
    }

    fn common_base(&self, a: usize, b: usize) -> usize {
        let mut on_path = vec![false; self.mate.len()];
        let mut a = a;
        loop {
            a = self.base[a];
            on_path[a] = true;
            match self.up(a) {
                Some(next) => a = next,
                None => break,
            }
        }
        let mut b = b;
        loop {
            b = self.base[b];
            if on_path[b] {
                return b;
            }
            match self.up(b) {
                Some(next) => b = next,
                None => return b,
            }
        }
    }

    fn mark_path(
        &mut self,
        mut v: usize,
        lca: usize,
        mut child: usize,
        in_blossom: &mut [bool],
    ) {
        while self.base[v] != lca {
            let Some(m) = self.mate[v] else {
                break;
            };
            in_blossom[self.base[v]] = true;
            in_blossom[self.base[m]] = true;
            self.parent[v] = Some(child);
            child = m;
            match self.parent[m] {
                Some(p) => v = p,
                None => break,
            }
        }
    }

    fn matched_edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.mate.iter().enumerate().filter_map(|(v, mate)| {
            let w = (*mate)?;
            if v > w {
                return None;
            }
            self.adj[v]
                .iter()
                .find(|(other, _)| other.index() == w)
                .map(|&(_, e)| e)
        })
    }
}
