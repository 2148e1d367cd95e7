//! Defines an `InteractionGraph`: the undirected graph induced by a bag of `Factor`s.
//!
//! Two `Variable`s are adjacent iff some `Factor` contains both of them in its scope. Built from
//! the CPDs of a `DirectedModel` this is the moral graph of the network. The graph is a plain
//! mutable adjacency structure; elimination orderings rewrite it destructively, so every ordering
//! works on its own copy.

use crate::factor::Factor;
use crate::model::directed::DirectedModel;
use crate::util::{ReasonerError, Result};
use crate::variable::Variable;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use std::collections::VecDeque;

/// An undirected graph over `Variable`s, stored as adjacency sets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionGraph {

    /// The neighbors of every node. Adjacency is kept symmetric and free of self-loops.
    adjacency: IndexMap<Variable, IndexSet<Variable>>

}

impl InteractionGraph {

    /// Construct an empty `InteractionGraph`
    pub fn new() -> Self {
        InteractionGraph { adjacency: IndexMap::new() }
    }

    /// Construct the interaction graph of a bag of `Factor`s: every scope becomes a clique.
    pub fn from_factors<'a, I>(factors: I) -> Self
        where I: IntoIterator<Item = &'a Factor>
    {
        let mut graph = InteractionGraph::new();
        for f in factors {
            for v in f.scope() {
                graph.add_variable(v);
            }
            for (u, v) in f.scope().iter().tuple_combinations() {
                graph.add_edge(u, v);
            }
        }
        graph
    }

    /// Construct the moral graph of a `DirectedModel`: every variable is connected to its parents
    /// and co-parents are married.
    pub fn for_model(model: &DirectedModel) -> Self {
        InteractionGraph::from_factors(model.cpds().map(|(_, cpd)| cpd))
    }

    /// Construct the skeleton of a `DirectedModel`: the DAG with edge directions dropped and
    /// without moral edges.
    pub fn skeleton(model: &DirectedModel) -> Self {
        let mut graph = InteractionGraph::new();
        for v in model.variables() {
            graph.add_variable(&v);
        }
        for (parent, child) in model.edges() {
            graph.add_edge(&parent, &child);
        }
        graph
    }

    /// Add an isolated node. Existing nodes are left untouched.
    pub fn add_variable(&mut self, v: &Variable) {
        self.adjacency.entry(v.clone()).or_default();
    }

    /// Connect `u` and `v`, adding either node if needed. Self-loops are ignored.
    pub fn add_edge(&mut self, u: &Variable, v: &Variable) {
        if u == v {
            self.add_variable(u);
            return;
        }
        self.adjacency.entry(u.clone()).or_default().insert(v.clone());
        self.adjacency.entry(v.clone()).or_default().insert(u.clone());
    }

    /// Check if `u` and `v` are adjacent
    pub fn has_edge(&self, u: &Variable, v: &Variable) -> bool {
        self.adjacency.get(u).map_or(false, |n| n.contains(v))
    }

    /// Check if `v` is a node of the graph
    pub fn contains(&self, v: &Variable) -> bool {
        self.adjacency.contains_key(v)
    }

    /// The nodes of the graph, in insertion order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.adjacency.keys()
    }

    /// The number of nodes
    pub fn num_variables(&self) -> usize {
        self.adjacency.len()
    }

    /// The number of (undirected) edges
    pub fn num_edges(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum::<usize>() / 2
    }

    /// The neighbors of `v`
    ///
    /// # Errors
    /// * `ReasonerError::UnknownVariable` if `v` is not a node
    pub fn neighbors(&self, v: &Variable) -> Result<&IndexSet<Variable>> {
        self.adjacency.get(v).ok_or_else(|| ReasonerError::UnknownVariable(v.name().to_string()))
    }

    /// The number of neighbors of `v`
    pub fn degree(&self, v: &Variable) -> Result<usize> {
        self.neighbors(v).map(|n| n.len())
    }

    /// The fill-in cost of `v`: the number of edges that eliminating `v` would add between its
    /// neighbors.
    pub fn fill_in(&self, v: &Variable) -> Result<usize> {
        let neighbors = self.neighbors(v)?;
        Ok(neighbors.iter()
                    .tuple_combinations()
                    .filter(|&(a, b)| ! self.has_edge(a, b))
                    .count())
    }

    /// Remove `v` and all of its incident edges.
    ///
    /// # Returns
    /// the former neighbors of `v`
    pub fn remove_variable(&mut self, v: &Variable) -> Result<IndexSet<Variable>> {
        let neighbors = self.adjacency
                            .shift_remove(v)
                            .ok_or_else(|| ReasonerError::UnknownVariable(v.name().to_string()))?;

        for n in neighbors.iter() {
            if let Some(adj) = self.adjacency.get_mut(n) {
                adj.shift_remove(v);
            }
        }

        Ok(neighbors)
    }

    /// Eliminate `v`: connect all pairs of its neighbors, then remove it from the graph.
    ///
    /// # Returns
    /// the number of fill edges that were added
    pub fn eliminate(&mut self, v: &Variable) -> Result<usize> {
        let neighbors = self.remove_variable(v)?;

        let mut added = 0;
        for (a, b) in neighbors.iter().tuple_combinations() {
            if ! self.has_edge(a, b) {
                self.add_edge(a, b);
                added += 1;
            }
        }

        Ok(added)
    }

    /// Check if any node of `from` is joined by a path to any node of `to`. Nodes that are not
    /// part of the graph are isolated.
    pub fn connected(&self, from: &[Variable], to: &[Variable]) -> bool {
        let mut visited: IndexSet<&Variable> = IndexSet::new();
        let mut queue: VecDeque<&Variable> = from.iter().filter(|v| self.contains(v)).collect();

        // a node shared by both sets is trivially connected to itself
        if from.iter().any(|v| to.contains(v)) {
            return true;
        }

        while let Some(v) = queue.pop_front() {
            if ! visited.insert(v) {
                continue;
            }
            if to.contains(v) {
                return true;
            }
            if let Some(neighbors) = self.adjacency.get(v) {
                queue.extend(neighbors.iter().filter(|n| ! visited.contains(n)));
            }
        }

        false
    }
}
