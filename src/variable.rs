//! Definition of the variable module
//!
//! A `Variable` represents a discrete random variable in a Bayesian network. An `Assignment` is a
//! (partial or complete) instantiation of a set of `Variable`s; evidence is an `Assignment`.

use indexmap::IndexMap;
use itertools::Itertools;

use std::fmt;
use std::iter;
use std::sync::Arc;

/// A discrete random variable.
///
/// # Representation
/// A `Variable` is identified by its name and its cardinality. The values of the `Variable` are
/// the indices ```0..cardinality```. Binary variables use ```0 = false``` and ```1 = true```.
///
/// The name is interned behind an `Arc`, so cloning a `Variable` is cheap and `Variable`s may be
/// shared between threads. `Variable`s order lexicographically by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    name: Arc<str>,
    cardinality: usize
}

impl Variable {

    /// Construct a new binary `Variable`
    pub fn binary(name: &str) -> Self {
        Variable::discrete(name, 2)
    }

    /// Construct a new discrete `Variable` taking values in ```0..cardinality```
    ///
    /// # Panics
    /// if `cardinality` is zero. A variable needs at least one value.
    pub fn discrete(name: &str, cardinality: usize) -> Self {
        assert!(cardinality > 0, "Variable {} must have at least one value", name);
        Variable { name: Arc::from(name), cardinality }
    }

    /// Get the name of the `Variable`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of values the `Variable` can take
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Check that `value` lies in the domain of the `Variable`
    pub fn admits(&self, value: usize) -> bool {
        value < self.cardinality
    }

}

impl fmt::Display for Variable {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }

}


/// An instantiation of some set of `Variable`s. `Assignment`s remember the order in which values
/// were set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    values: IndexMap<Variable, usize>
}

impl Assignment {

    /// Construct an empty `Assignment`
    pub fn new() -> Self {
        Assignment { values: IndexMap::new() }
    }

    /// Assign `value` to `var`, replacing any previous value
    pub fn set(&mut self, var: &Variable, value: usize) {
        self.values.insert(var.clone(), value);
    }

    /// Get the value assigned to `var`, if any
    pub fn get(&self, var: &Variable) -> Option<&usize> {
        self.values.get(var)
    }

    /// Check if `var` is assigned
    pub fn contains(&self, var: &Variable) -> bool {
        self.values.contains_key(var)
    }

    /// The assigned `Variable`s, in assignment order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.values.keys()
    }

    /// Iterate over ```(variable, value)``` pairs in assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &usize)> {
        self.values.iter()
    }

    /// The number of assigned `Variable`s
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is assigned
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Restrict the `Assignment` to the given `Variable`s
    pub fn restrict(&self, scope: &[Variable]) -> Assignment {
        self.values.iter()
                   .filter(|(v, _)| scope.contains(v))
                   .map(|(v, &val)| (v.clone(), val))
                   .collect()
    }

}

impl FromIterator<(Variable, usize)> for Assignment {

    fn from_iter<I: IntoIterator<Item = (Variable, usize)>>(iter: I) -> Self {
        Assignment { values: iter.into_iter().collect() }
    }

}

impl fmt::Display for Assignment {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let body = self.values.iter().map(|(v, val)| format!("{} = {}", v, val)).join(", ");
        write!(f, "{{{}}}", body)
    }

}


/// Enumerate every complete `Assignment` to `scope`.
///
/// The last `Variable` of the scope varies fastest. An empty scope has exactly one (empty)
/// assignment.
pub fn all_assignments(scope: &[Variable]) -> Box<dyn Iterator<Item = Assignment>> {
    if scope.is_empty() {
        return Box::new(iter::once(Assignment::new()));
    }

    let scope = scope.to_vec();
    let ranges: Vec<_> = scope.iter().map(|v| 0..v.cardinality()).collect();

    Box::new(
        ranges.into_iter()
              .multi_cartesian_product()
              .map(move |vals| scope.iter().cloned().zip(vals).collect())
    )
}

// Unit Tests for the Variable and Assignment structs.
#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn binary() {
        let var = Variable::binary("Foo");
        assert_eq!(var.name(), "Foo");
        assert_eq!(var.cardinality(), 2);
        assert!(var.admits(1));
        assert!(! var.admits(2));
    }

    #[test]
    fn discrete() {
        let var = Variable::discrete("Grade", 3);
        assert_eq!(var.cardinality(), 3);
        assert_eq!("Grade", format!("{}", var));
        assert_ne!(var, Variable::discrete("Grade", 2));
    }

    #[test]
    #[should_panic]
    fn discrete_empty_domain() {
        Variable::discrete("Foo", 0);
    }

    #[test]
    fn ordering_is_by_name() {
        let mut vars = vec![ Variable::binary("c"), Variable::binary("a"), Variable::binary("b") ];
        vars.sort();
        let names: Vec<&str> = vars.iter().map(|v| v.name()).collect();
        assert_eq!(vec!["a", "b", "c"], names);
    }

    #[test]
    fn assignment() {
        let a = Variable::binary("A");
        let b = Variable::discrete("B", 4);

        let mut assn = Assignment::new();
        assert!(assn.is_empty());
        assn.set(&a, 1);
        assn.set(&b, 3);
        assert_eq!(Some(&1), assn.get(&a));
        assert_eq!(Some(&3), assn.get(&b));
        assert_eq!(2, assn.len());

        // setting a variable twice overwrites
        assn.set(&a, 0);
        assert_eq!(Some(&0), assn.get(&a));
        assert_eq!(2, assn.len());

        let restricted = assn.restrict(&[b.clone()]);
        assert!(! restricted.contains(&a));
        assert_eq!(Some(&3), restricted.get(&b));

        assert_eq!("{A = 0, B = 3}", assn.to_string());
    }

    #[test]
    fn enumerate_assignments() {
        let a = Variable::binary("A");
        let b = Variable::discrete("B", 3);

        let all: Vec<Assignment> = all_assignments(&[a.clone(), b.clone()]).collect();
        assert_eq!(6, all.len());
        assert_eq!(Some(&0), all[0].get(&a));
        assert_eq!(Some(&0), all[0].get(&b));
        assert_eq!(Some(&1), all[1].get(&b));
        assert_eq!(Some(&1), all[5].get(&a));
        assert_eq!(Some(&2), all[5].get(&b));

        let empty: Vec<Assignment> = all_assignments(&[]).collect();
        assert_eq!(1, empty.len());
        assert!(empty[0].is_empty());
    }

}
