//! Ring perception.
//!
//! Rings are found as a smallest set of smallest rings (SSSR): Horton
//! candidate cycles, shortest first, are accepted while they stay linearly
//! independent over GF(2) in edge space, until the cyclomatic number
//! `E - V + C` is reached.

use std::collections::{HashSet, VecDeque};

use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;

use crate::mol::Mol;

/// A set of rings. Each ring lists its atoms in ring order, starting from
/// the lowest index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let num_expected = Self::expected_ring_count(mol);
        if num_expected == 0 {
            return Self::default();
        }

        let mut basis = CycleBasis::default();
        let mut rings = Vec::with_capacity(num_expected);
        for ring in horton_candidates(mol) {
            if rings.len() >= num_expected {
                break;
            }
            let edges = EdgeSet::from_ring(&ring, mol);
            if !edges.is_empty() && basis.insert(edges) {
                rings.push(normalize_ring(&ring));
            }
        }

        rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        Self { rings }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains(&atom))
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring_contains_bond(ring, a, b))
    }

    /// Every atom that belongs to at least one ring.
    pub fn ring_atoms(&self) -> HashSet<NodeIndex> {
        self.rings.iter().flatten().copied().collect()
    }

    pub fn atom_rings(&self, atom: NodeIndex) -> Vec<&Vec<NodeIndex>> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .collect()
    }

    pub fn expected_ring_count<A, B>(mol: &Mol<A, B>) -> usize {
        let v = mol.atom_count();
        let e = mol.bond_count();
        let c = connected_components(mol.graph());
        (e + c).saturating_sub(v)
    }
}

/// True when `a` and `b` are adjacent in `ring`.
pub fn ring_contains_bond(ring: &[NodeIndex], a: NodeIndex, b: NodeIndex) -> bool {
    let len = ring.len();
    (0..len).any(|i| {
        let j = (i + 1) % len;
        (ring[i] == a && ring[j] == b) || (ring[i] == b && ring[j] == a)
    })
}

/// Source of ring membership for algorithms that only need "which rings
/// exist". Implemented by [`Sssr`]; alternative perceptions can be plugged
/// into [`Regularizer`](crate::regularize::Regularizer).
pub trait RingPerception {
    fn perceive<A, B>(&self, mol: &Mol<A, B>) -> RingInfo;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sssr;

impl RingPerception for Sssr {
    fn perceive<A, B>(&self, mol: &Mol<A, B>) -> RingInfo {
        RingInfo::sssr(mol)
    }
}

/// Atoms in any SSSR ring.
pub fn ring_atoms<A, B>(mol: &Mol<A, B>) -> HashSet<NodeIndex> {
    RingInfo::sssr(mol).ring_atoms()
}

/// Bonds of a cycle as a bit vector indexed by edge index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EdgeSet(Vec<u64>);

impl EdgeSet {
    fn from_ring<A, B>(ring: &[NodeIndex], mol: &Mol<A, B>) -> Self {
        let mut words = vec![0u64; mol.bond_count().div_ceil(64)];
        let len = ring.len();
        for i in 0..len {
            if let Some(edge) = mol.bond_between(ring[i], ring[(i + 1) % len]) {
                let idx = edge.index();
                words[idx / 64] |= 1u64 << (idx % 64);
            }
        }
        Self(words)
    }

    fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    fn contains(&self, bit: usize) -> bool {
        self.0[bit / 64] & (1u64 << (bit % 64)) != 0
    }

    fn lowest_bit(&self) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, &w)| w != 0)
            .map(|(i, &w)| i * 64 + w.trailing_zeros() as usize)
    }

    fn xor_with(&mut self, other: &EdgeSet) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a ^= *b;
        }
    }
}

/// Row-reduced cycle basis over GF(2).
#[derive(Debug, Default)]
struct CycleBasis {
    rows: Vec<(usize, EdgeSet)>,
}

impl CycleBasis {
    /// Reduce `candidate` against the basis; keep it if anything is left.
    fn insert(&mut self, mut candidate: EdgeSet) -> bool {
        for (pivot, row) in &self.rows {
            if candidate.contains(*pivot) {
                candidate.xor_with(row);
            }
        }
        match candidate.lowest_bit() {
            Some(pivot) => {
                self.rows.push((pivot, candidate));
                true
            }
            None => false,
        }
    }
}

/// Candidate cycles of Horton's algorithm: for every vertex `w` and edge
/// `(u, v)`, the cycle `w ~> u - v ~> w` built from shortest paths, kept
/// when the two paths only share `w`. Sorted by size.
fn horton_candidates<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let trees: Vec<ShortestPathTree> = (0..n)
        .map(|src| ShortestPathTree::build(mol, NodeIndex::new(src)))
        .collect();

    let mut candidates = Vec::new();
    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(edge) else {
            continue;
        };
        for tree in &trees {
            let (Some(du), Some(dv)) = (tree.dist[u.index()], tree.dist[v.index()]) else {
                continue;
            };
            if du + dv + 1 < 3 {
                continue;
            }
            let (Some(path_u), Some(path_v)) = (tree.path_to(u), tree.path_to(v)) else {
                continue;
            };
            if path_u[1..].iter().any(|node| path_v[1..].contains(node)) {
                continue;
            }
            let mut ring = path_u;
            ring.extend(path_v[1..].iter().rev());
            candidates.push(ring);
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

struct ShortestPathTree {
    root: NodeIndex,
    dist: Vec<Option<usize>>,
    pred: Vec<Option<NodeIndex>>,
}

impl ShortestPathTree {
    fn build<A, B>(mol: &Mol<A, B>, root: NodeIndex) -> Self {
        let n = mol.atom_count();
        let mut dist = vec![None; n];
        let mut pred = vec![None; n];
        dist[root.index()] = Some(0);
        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            let d = dist[cur.index()].unwrap_or(0);
            for nb in mol.neighbors(cur) {
                if dist[nb.index()].is_none() {
                    dist[nb.index()] = Some(d + 1);
                    pred[nb.index()] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
        Self { root, dist, pred }
    }

    /// Path from the root to `dst`, both ends included.
    fn path_to(&self, dst: NodeIndex) -> Option<Vec<NodeIndex>> {
        let mut path = vec![dst];
        let mut cur = dst;
        while cur != self.root {
            cur = self.pred[cur.index()]?;
            path.push(cur);
        }
        path.reverse();
        Some(path)
    }
}

/// Rotate so the lowest index comes first, then pick the direction whose
/// second atom is lower.
fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let Some(min_pos) = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, idx)| idx)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };

    let len = ring.len();
    let mut normalized: Vec<NodeIndex> = (0..len).map(|i| ring[(min_pos + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::{Bond, BondOrder};
    use crate::test_support::{mol_from, n};

    fn cycle(size: usize) -> Mol<Atom, Bond> {
        let bonds: Vec<_> = (0..size)
            .map(|i| (i, (i + 1) % size, BondOrder::Single))
            .collect();
        mol_from(&vec![6; size], &bonds)
    }

    #[test]
    fn cyclohexane() {
        let ri = RingInfo::sssr(&cycle(6));
        assert_eq!(ri.num_rings(), 1);
        assert_eq!(ri.rings()[0].len(), 6);
    }

    #[test]
    fn cyclopropane() {
        let ri = RingInfo::sssr(&cycle(3));
        assert_eq!(ri.num_rings(), 1);
        assert_eq!(ri.rings()[0].len(), 3);
    }

    #[test]
    fn acyclic() {
        let mol = mol_from(
            &[6, 6, 6, 6],
            &[(0, 1, BondOrder::Single), (1, 2, BondOrder::Single), (2, 3, BondOrder::Single)],
        );
        let ri = RingInfo::sssr(&mol);
        assert!(ri.is_empty());
        assert!(ring_atoms(&mol).is_empty());
    }

    #[test]
    fn naphthalene_skeleton() {
        let mol = crate::test_support::naphthalene_kekule();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 2);
        for ring in ri.rings() {
            assert_eq!(ring.len(), 6);
        }
        let shared: Vec<NodeIndex> = mol
            .atoms()
            .filter(|&a| ri.atom_rings(a).len() == 2)
            .collect();
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn spiro_octane() {
        // cyclopentane and cyclobutane sharing atom 0
        let mut bonds: Vec<_> = (0..5).map(|i| (i, (i + 1) % 5, BondOrder::Single)).collect();
        bonds.extend([
            (0, 5, BondOrder::Single),
            (5, 6, BondOrder::Single),
            (6, 7, BondOrder::Single),
            (7, 0, BondOrder::Single),
        ]);
        let mol = mol_from(&[6; 8], &bonds);
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 2);
        assert_eq!(ri.atom_rings(n(0)).len(), 2);
    }

    #[test]
    fn norbornane() {
        let mol = mol_from(
            &[6; 7],
            &[
                (0, 1, BondOrder::Single),
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Single),
                (3, 4, BondOrder::Single),
                (4, 0, BondOrder::Single),
                (4, 5, BondOrder::Single),
                (5, 6, BondOrder::Single),
                (6, 2, BondOrder::Single),
            ],
        );
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 2);
        let mut sizes: Vec<usize> = ri.rings().iter().map(Vec::len).collect();
        sizes.sort();
        assert_eq!(sizes, vec![5, 5]);
    }

    #[test]
    fn cubane_cyclomatic_number() {
        let cube = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        let bonds: Vec<_> = cube.iter().map(|&(a, b)| (a, b, BondOrder::Single)).collect();
        let mol = mol_from(&[6; 8], &bonds);
        assert_eq!(RingInfo::expected_ring_count(&mol), 5);
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 5);
        assert!(ri.rings().iter().all(|r| r.len() == 4));
    }

    #[test]
    fn phenol_oxygen_not_in_ring() {
        let mol = crate::test_support::phenol_kekule();
        let ri = RingInfo::sssr(&mol);
        assert!(!ri.is_ring_atom(n(6)));
        for i in 0..6 {
            assert!(ri.is_ring_atom(n(i)), "atom {i} should be in ring");
            assert!(ri.is_ring_bond(n(i), n((i + 1) % 6)));
        }
        assert!(!ri.is_ring_bond(n(0), n(6)));
    }

    #[test]
    fn rings_are_normalized() {
        let ri = RingInfo::sssr(&cycle(5));
        assert_eq!(ri.rings()[0], vec![n(0), n(1), n(2), n(3), n(4)]);
    }

    #[test]
    fn two_components() {
        let mut bonds: Vec<_> = (0..3).map(|i| (i, (i + 1) % 3, BondOrder::Single)).collect();
        bonds.extend([
            (3, 4, BondOrder::Single),
            (4, 5, BondOrder::Single),
            (5, 3, BondOrder::Single),
        ]);
        let mol = mol_from(&[6; 6], &bonds);
        assert_eq!(RingInfo::expected_ring_count(&mol), 2);
        assert_eq!(Sssr.perceive(&mol).num_rings(), 2);
    }
}
