//! Defines a `DirectedModel`, which is a Bayesian network that represents the factorization of
//! a probability distribution P

use crate::factor::Factor;
use crate::init::Initialization;
use crate::util::{ReasonerError, Result};
use crate::variable::{Assignment, Variable};

use indexmap::{IndexMap, IndexSet};


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// The network is represented as a Directed Acyclic Graph (DAG). A traditional graph data
/// structure is not used for the simple representation of a `DirectedModel`; instead, the
/// Conditional Probability Distribution (CPD) of each `Variable` implicitly defines the edges of
/// the graph. The `Variable`s are held in their topological order to faciliate efficient
/// computations over the graph.
///
/// Because the edges live in the CPDs, the invariant that every CPD has scope ```X U Pa(X)``` holds
/// by construction: removing an edge means reducing the child's CPD.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectedModel {

    /// The `Variable`s comprising the scope of the `DirectedModel` and their associated CPDs. Note
    /// that the `Factor` associated with a `Variable` ```X``` has scope ```X U Pa(X)```, where
    /// ```Pa(X)``` are the parent's of ```X```. Therefore, in the DAG represented by this map,
    /// there are edges ```P -> X forall P in X.scope() where P != X```
    graph: IndexMap<Variable, Factor>

}

impl DirectedModel {

    /// Get the `Factor` for the given variable in this model.
    pub fn cpd(&self, v: &Variable) -> Option<&Factor> {
        self.graph.get(v)
    }

    /// Get all CPDs of the model, in topological order
    pub fn cpds(&self) -> impl Iterator<Item = (&Variable, &Factor)> {
        self.graph.iter()
    }

    /// Get the `Variable`s of the `DirectedModel` in topological order
    pub fn variables(&self) -> Vec<Variable> {
        self.graph.keys().cloned().collect()
    }

    /// Get the number of `Variable`s in the `DirectedModel`
    pub fn num_variables(&self) -> usize {
        self.graph.len()
    }

    /// Check if `v` is part of the `DirectedModel`
    pub fn contains(&self, v: &Variable) -> bool {
        self.graph.contains_key(v)
    }

    /// Lookup a `Variable` in the `DirectedModel` based on the name
    pub fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.graph.keys().find(|v| v.name() == name)
    }

    /// Get the parents of `v`
    ///
    /// # Errors
    /// * `ReasonerError::UnknownVariable` if `v` is not in the model
    pub fn parents(&self, v: &Variable) -> Result<Vec<Variable>> {
        let cpd = self.checked_cpd(v)?;
        Ok(cpd.scope().iter().filter(|&p| p != v).cloned().collect())
    }

    /// Get the children of `v`, in topological order
    ///
    /// # Errors
    /// * `ReasonerError::UnknownVariable` if `v` is not in the model
    pub fn children(&self, v: &Variable) -> Result<Vec<Variable>> {
        self.checked_cpd(v)?;
        Ok(self.graph
               .iter()
               .filter(|&(c, cpd)| c != v && cpd.contains(v))
               .map(|(c, _)| c.clone())
               .collect())
    }

    /// Check if `v` has no children
    ///
    /// # Errors
    /// * `ReasonerError::UnknownVariable` if `v` is not in the model
    pub fn is_leaf(&self, v: &Variable) -> Result<bool> {
        self.checked_cpd(v)?;
        Ok(! self.graph.iter().any(|(c, cpd)| c != v && cpd.contains(v)))
    }

    /// Get every edge ```(parent, child)``` of the DAG
    pub fn edges(&self) -> Vec<(Variable, Variable)> {
        self.graph
            .iter()
            .flat_map(|(child, cpd)| {
                cpd.scope()
                   .iter()
                   .filter(move |&p| p != child)
                   .map(move |p| (p.clone(), child.clone()))
            })
            .collect()
    }

    /// Get the (strict) ancestors of a set of `Variable`s: every variable with a directed path
    /// into the set. A member of `vars` is included only if it is an ancestor of another member.
    ///
    /// # Errors
    /// * `ReasonerError::UnknownVariable` if a variable is not in the model
    pub fn ancestors(&self, vars: &[Variable]) -> Result<IndexSet<Variable>> {
        let mut found = IndexSet::new();
        let mut stack = Vec::new();

        for v in vars {
            stack.extend(self.parents(v)?);
        }

        while let Some(p) = stack.pop() {
            if found.insert(p.clone()) {
                stack.extend(self.parents(&p)?);
            }
        }

        Ok(found)
    }

    /// Determine the probability of a full `Assignment` to the `Variable`s in the `DirectedModel`.
    ///
    /// Specifically, this computes ```P(zeta)```, where ```zeta``` is a full assignment, by the
    /// chain rule.
    ///
    /// # Errors
    /// * `ReasonerError::IncompleteAssignment` if a variable is unassigned
    pub fn probability(&self, assignment: &Assignment) -> Result<f64> {
        // for every variable in the graph
        self.graph.values()
                  // get the probability of the assignment
                  .map(|cpt| cpt.value(assignment))
                  // and multiply those probability by the chain rule
                  // but if there are any errors, just return the error
                  .fold(Ok(1.0), |acc, val| acc.and_then(|p| val.map(|v| p * v)))
    }

    /// Delete the edge ```u -> v```.
    ///
    /// A CPD over ```v``` conditioned on ```u``` cannot simply forget ```u```; the edge is removed
    /// by reducing the CPD of ```v``` at ```u = value```.
    ///
    /// # Errors
    /// * `ReasonerError::UnknownVariable` if either variable is not in the model
    /// * `ReasonerError::MalformedFactor` if there is no edge ```u -> v```
    /// * `ReasonerError::InvalidEvidence` if `value` is outside the domain of `u`
    pub fn delete_edge(&mut self, u: &Variable, v: &Variable, value: usize) -> Result<()> {
        self.checked_cpd(u)?;
        let cpd = self.checked_cpd(v)?;

        if u == v || ! cpd.contains(u) {
            return Err(ReasonerError::MalformedFactor(format!("there is no edge {} -> {}", u, v)));
        }

        let mut at = Assignment::new();
        at.set(u, value);
        let reduced = cpd.reduce(&at)?;

        self.graph.insert(v.clone(), reduced);
        Ok(())
    }

    /// Delete the `Variable` ```v``` and its CPD from the model.
    ///
    /// Only leaves may be deleted, so no other CPD ever refers to a deleted variable.
    ///
    /// # Errors
    /// * `ReasonerError::UnknownVariable` if `v` is not in the model
    /// * `ReasonerError::HasChildren` if `v` is not a leaf
    pub fn delete_variable(&mut self, v: &Variable) -> Result<Factor> {
        if ! self.is_leaf(v)? {
            return Err(ReasonerError::HasChildren(v.name().to_string()));
        }

        self.graph
            .shift_remove(v)
            .ok_or_else(|| ReasonerError::UnknownVariable(v.name().to_string()))
    }

    /// Replace the CPD of `v`.
    ///
    /// The new CPD defines the parents of `v`; the topological order of the model is recomputed
    /// when they change.
    ///
    /// # Errors
    /// * `ReasonerError::UnknownVariable` if `v` or one of the new parents is not in the model
    /// * `ReasonerError::InvalidScope` if `v` is not in the scope of the new CPD
    /// * `ReasonerError::CyclicStructure` if the new parents would close a directed cycle
    pub fn update_cpd(&mut self, v: &Variable, cpd: Factor) -> Result<()> {
        self.checked_cpd(v)?;

        if ! cpd.contains(v) {
            return Err(ReasonerError::InvalidScope);
        }

        if let Some(unknown) = cpd.scope().iter().find(|p| ! self.contains(p)) {
            return Err(ReasonerError::UnknownVariable(unknown.name().to_string()));
        }

        let mut graph = self.graph.clone();
        graph.insert(v.clone(), cpd);

        let order = topological_sort(&graph).ok_or_else(|| {
            ReasonerError::CyclicStructure(format!("the new parents of {} form a directed cycle", v))
        })?;

        graph.sort_by(|a, _, b, _| order.get_index_of(a).cmp(&order.get_index_of(b)));
        self.graph = graph;
        Ok(())
    }

    /// Internal function that looks up a CPD or reports the unknown variable
    fn checked_cpd(&self, v: &Variable) -> Result<&Factor> {
        self.graph.get(v).ok_or_else(|| ReasonerError::UnknownVariable(v.name().to_string()))
    }
}


/// Order the variables so that every parent precedes its children, preferring the current order.
///
/// # Returns
/// the order, or `None` if the graph contains a cycle
fn topological_sort(graph: &IndexMap<Variable, Factor>) -> Option<IndexSet<Variable>> {
    let mut placed: IndexSet<Variable> = IndexSet::with_capacity(graph.len());

    while placed.len() < graph.len() {
        let (next, _) = graph.iter().find(|&(v, cpd)| {
            ! placed.contains(v) && cpd.scope().iter().all(|p| p == v || placed.contains(p))
        })?;
        placed.insert(next.clone());
    }

    Some(placed)
}


/// An implementation of the [builder pattern] for creating a `DirectedModel`.
///
/// Models must be assembled in topological order: every parent has to be added before its
/// children. This also guarantees that a built model is acyclic.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
#[derive(Default)]
pub struct DirectedModelBuilder {

    /// The `Variable`s and their associated CPDs
    factors: IndexMap<Variable, Factor>,

    /// The error state of the builder
    err: Option<ReasonerError>

}


impl DirectedModelBuilder {

    /// Construct a new `DirectedModelBuilder` representing an empty `DirectedModel`
    pub fn new() -> Self {
        DirectedModelBuilder {
            factors: IndexMap::new(),
            err: None
        }
    }


    /// Add a `Variable` to the `DirectedModel`.
    ///
    /// # Args
    /// * `var`: the variable to add to the model
    /// * `parents`: the parent variables. The parents must already be in the model.
    /// * `init`: the initialization mechanism for the CPD of `var` in the model.
    pub fn with_variable(mut self, var: &Variable, parents: &[Variable], init: Initialization) -> Self {
        ///////////////////////////////////////////////////////////////////////
        // 1) if we are in an error state, do nothing
        if self.err.is_some() {
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Check for error conditions
        if parents.iter().any(|v| ! self.factors.contains_key(v)) {
            self.err = Some(ReasonerError::MissingParent);
            return self;
        }

        if self.factors.keys().any(|v| v.name() == var.name()) {
            self.err = Some(ReasonerError::DuplicateVariable);
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Build the factor based on the initialization
        match init.build_cpd(var, parents) {
            Ok(factor) => {
                ///////////////////////////////////////////////////////////////
                // 4) Add to current model
                self.factors.insert(var.clone(), factor);
            },
            Err(e) => {
                self.err = Some(e);
            }
        }

        self
    }


    /// Complete building the model.
    ///
    /// # Returns
    /// the `DirectedModel`, or an error if one was generated during the building process
    ///
    /// # Postcondition
    /// This call consumes the `DirectedModelBuilder`
    pub fn build(self) -> Result<DirectedModel> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(DirectedModel { graph: self.factors })
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;

    /// Koller & Friedman Section 3.1.2: Intelligence -> SAT
    fn intelligence() -> (Variable, Variable, DirectedModel) {
        let intelligence = Variable::binary("I");
        let sat = Variable::binary("S");

        let sfactor = Factor::cpd(
            sat.clone(),
            vec![ intelligence.clone() ],
            array![[0.95, 0.05], [0.2, 0.8]].into_dyn()
        ).unwrap();

        let model = DirectedModelBuilder::new()
            .with_variable(&intelligence, &[], Initialization::Multinomial(&[0.7, 0.3]))
            .with_variable(&sat, &[ intelligence.clone() ], Initialization::Table(sfactor))
            .build()
            .unwrap();

        (intelligence, sat, model)
    }

    /// The chain a -> b -> c, plus a -> c
    fn triangle() -> (Variable, Variable, Variable, DirectedModel) {
        let a = Variable::binary("a");
        let b = Variable::binary("b");
        let c = Variable::binary("c");

        let model = DirectedModelBuilder::new()
            .with_variable(&a, &[], Initialization::Uniform)
            .with_variable(&b, &[ a.clone() ], Initialization::Uniform)
            .with_variable(&c, &[ a.clone(), b.clone() ], Initialization::Uniform)
            .build()
            .unwrap();

        (a, b, c, model)
    }

    #[test]
    fn build_empty() {
        let model = DirectedModelBuilder::new().build();
        assert!(model.is_ok());

        let model = model.unwrap();
        assert_eq!(model.num_variables(), 0);
        assert!(model.variables().is_empty());
    }

    #[test]
    /// Tests building a model with a single binary variable
    fn build_simple() {
        let v = Variable::binary("foo");
        let model = DirectedModelBuilder::new()
            .with_variable(&v, &[], Initialization::Uniform)
            .build()
            .unwrap();

        let vars = model.variables();
        assert_eq!(vec![v.clone()], vars);
        assert_eq!(Some(&v), model.lookup_variable("foo"));
        assert_eq!(None, model.lookup_variable("bar"));

        let f = model.cpd(&v).unwrap();
        assert!(f.is_cpd());
        assert_eq!(&[v.clone()], f.scope());
        for val in 0..2 {
            let mut a = Assignment::new();
            a.set(&v, val);
            assert_eq!(0.5, f.value(&a).unwrap());
        }
    }

    #[test]
    fn build_errors() {
        let a = Variable::binary("a");
        let b = Variable::binary("b");

        // parent added after the child
        let model = DirectedModelBuilder::new()
            .with_variable(&b, &[ a.clone() ], Initialization::Uniform)
            .with_variable(&a, &[], Initialization::Uniform)
            .build();
        assert_eq!(Err(ReasonerError::MissingParent), model);

        // same name twice
        let model = DirectedModelBuilder::new()
            .with_variable(&a, &[], Initialization::Uniform)
            .with_variable(&Variable::discrete("a", 3), &[], Initialization::Uniform)
            .build();
        assert_eq!(Err(ReasonerError::DuplicateVariable), model);

        // the first error sticks
        let model = DirectedModelBuilder::new()
            .with_variable(&a, &[], Initialization::Binomial(2.0))
            .with_variable(&b, &[ Variable::binary("z") ], Initialization::Uniform)
            .build();
        assert_eq!(Err(ReasonerError::InvalidInitialization), model);
    }

    #[test]
    fn probability() {
        let (intelligence, sat, model) = intelligence();

        let expected = [[0.7 * 0.95, 0.7 * 0.05], [0.3 * 0.2, 0.3 * 0.8]];
        for (i, s) in itertools::iproduct!(0..2, 0..2) {
            let mut a = Assignment::new();
            a.set(&intelligence, i);
            a.set(&sat, s);
            assert_eq!(expected[i][s], model.probability(&a).unwrap());
        }

        // test partial assignment
        let mut a = Assignment::new();
        a.set(&intelligence, 1);
        assert_eq!(Err(ReasonerError::IncompleteAssignment), model.probability(&a));
    }

    #[test]
    fn structure() {
        let (a, b, c, model) = triangle();

        assert_eq!(vec![a.clone(), b.clone(), c.clone()], model.variables());
        assert_eq!(Vec::<Variable>::new(), model.parents(&a).unwrap());
        assert_eq!(vec![a.clone(), b.clone()], model.parents(&c).unwrap());
        assert_eq!(vec![b.clone(), c.clone()], model.children(&a).unwrap());
        assert_eq!(vec![c.clone()], model.children(&b).unwrap());
        assert!(model.is_leaf(&c).unwrap());
        assert!(! model.is_leaf(&a).unwrap());

        let edges = model.edges();
        assert_eq!(3, edges.len());
        assert!(edges.contains(&(a.clone(), c.clone())));
        assert!(edges.contains(&(b.clone(), c.clone())));

        let ancestors = model.ancestors(&[c.clone()]).unwrap();
        assert_eq!(2, ancestors.len());
        assert!(ancestors.contains(&a) && ancestors.contains(&b));
        assert!(model.ancestors(&[a.clone()]).unwrap().is_empty());

        let unknown = Variable::binary("zzz");
        assert_eq!(Err(ReasonerError::UnknownVariable(String::from("zzz"))), model.parents(&unknown));
        assert!(model.children(&unknown).is_err());
        assert!(model.ancestors(&[unknown]).is_err());
    }

    #[test]
    fn delete_edge() {
        let (intelligence, sat, mut model) = intelligence();

        model.delete_edge(&intelligence, &sat, 0).unwrap();
        assert!(model.is_leaf(&intelligence).unwrap());

        // the CPD of SAT is now P(S | I = 0)
        let cpd = model.cpd(&sat).unwrap();
        assert!(cpd.is_cpd());
        assert_eq!(&[sat.clone()], cpd.scope());
        let mut a = Assignment::new();
        a.set(&sat, 1);
        assert_eq!(0.05, cpd.value(&a).unwrap());

        // the edge is gone now
        match model.delete_edge(&intelligence, &sat, 0) {
            Err(ReasonerError::MalformedFactor(_)) => (),
            other => panic!("wrong result {:?}", other)
        };
    }

    #[test]
    fn delete_edge_out_of_domain() {
        let (intelligence, sat, mut model) = intelligence();
        match model.delete_edge(&intelligence, &sat, 2) {
            Err(ReasonerError::InvalidEvidence(_)) => (),
            other => panic!("wrong result {:?}", other)
        };
    }

    #[test]
    fn delete_variable() {
        let (a, b, c, mut model) = triangle();

        assert_eq!(Err(ReasonerError::HasChildren(String::from("a"))), model.delete_variable(&a));

        let cpd = model.delete_variable(&c).unwrap();
        assert_eq!(3, cpd.scope().len());
        assert!(! model.contains(&c));
        assert!(model.is_leaf(&b).unwrap());

        model.delete_variable(&b).unwrap();
        model.delete_variable(&a).unwrap();
        assert_eq!(0, model.num_variables());

        assert!(model.delete_variable(&a).is_err());
    }

    #[test]
    fn update_cpd_reorders() {
        let a = Variable::binary("a");
        let b = Variable::binary("b");

        let mut model = DirectedModelBuilder::new()
            .with_variable(&a, &[], Initialization::Uniform)
            .with_variable(&b, &[], Initialization::Uniform)
            .build()
            .unwrap();

        // make b a parent of a
        let cpd = Factor::cpd(a.clone(), vec![ b.clone() ], array![[0.1, 0.9], [0.6, 0.4]].into_dyn()).unwrap();
        model.update_cpd(&a, cpd).unwrap();

        assert_eq!(vec![b.clone(), a.clone()], model.variables());
        assert_eq!(vec![a.clone()], model.children(&b).unwrap());
    }

    #[test]
    fn update_cpd_errors() {
        let (a, b, c, mut model) = triangle();

        // a cycle a -> c -> a
        let cyclic = Factor::cpd(a.clone(), vec![ c.clone() ], array![[0.5, 0.5], [0.5, 0.5]].into_dyn()).unwrap();
        match model.update_cpd(&a, cyclic) {
            Err(ReasonerError::CyclicStructure(_)) => (),
            other => panic!("wrong result {:?}", other)
        };

        // the failed update left the model untouched
        assert_eq!(vec![a.clone(), b.clone(), c.clone()], model.variables());
        assert!(model.parents(&a).unwrap().is_empty());

        // a cpd that is not about b
        let wrong = model.cpd(&a).unwrap().clone();
        assert_eq!(Err(ReasonerError::InvalidScope), model.update_cpd(&b, wrong));

        // an unknown parent
        let z = Variable::binary("z");
        let unknown = Factor::cpd(b.clone(), vec![ z ], array![[0.5, 0.5], [0.5, 0.5]].into_dyn()).unwrap();
        assert_eq!(Err(ReasonerError::UnknownVariable(String::from("z"))), model.update_cpd(&b, unknown));
    }
}
