use std::collections::BTreeMap;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::traits::HasPosition3D;

/// A molecular graph: atoms are nodes, bonds are undirected edges.
///
/// Besides the graph a molecule carries a `name` (the title line of an SDF
/// record) and free-form string `properties` (SDF data items).
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    name: String,
    properties: BTreeMap<String, String>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            name: String::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    /// Endpoints in insertion order: `(begin, end)` as the bond was added.
    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// The atom at the other end of `bond` from `atom`.
    pub fn other_atom(&self, bond: EdgeIndex, atom: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.bond_endpoints(bond)?;
        if a == atom {
            Some(b)
        } else if b == atom {
            Some(a)
        } else {
            None
        }
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub(crate) fn set_properties(&mut self, properties: BTreeMap<String, String>) {
        self.properties = properties;
    }
}

impl<A: HasPosition3D, B> Mol<A, B> {
    /// Atom coordinates in node-index order.
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.atoms().map(|idx| self.atom(idx).position_3d()).collect()
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            name: self.name.clone(),
            properties: self.properties.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        if self.atoms().any(|idx| self.atom(idx) != other.atom(idx)) {
            return false;
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx)
                || self.bond_endpoints(idx) != other.bond_endpoints(idx)
            {
                return false;
            }
        }
        self.name == other.name && self.properties == other.properties
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("name", &self.name)
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("properties", &self.properties)
            .finish()
    }
}
