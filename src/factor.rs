//! Definition of the factor module
//!
//! A `Factor` represents a relationship between some set of `Variable`s: a function from every
//! complete assignment of its scope to a non-negative real. All inference in this crate is
//! expressed as arithmetic over `Factor`s.

use crate::util::{ReasonerError, Result};
use crate::variable::{all_assignments, Assignment, Variable};

use itertools::Itertools;
use ndarray::prelude as nd;

use std::fmt;

/// Alias f64 ndarray::Array as Table
pub type Table = nd::ArrayD<f64>;

/// Tolerance used when checking that the rows of a CPD are normalized
const CPD_TOLERANCE: f64 = 1e-3;


/// A table factor, as described in Koller & Friedman.
///
/// # Representation
/// The table has one axis per scope variable, in scope order, and each axis is as long as the
/// cardinality of its variable. Every assignment of the scope is therefore present exactly once.
/// A `Factor` with an empty scope holds a single number; `Factor::identity()` is the scalar 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    /// The scope of the `Factor`
    scope: Vec<Variable>,

    /// The values of the `Factor` table.
    table: Table,

    /// `true`, if the `Factor` is a conditional probability distribution of its last scope
    /// variable given the others (i.e. every row along the last axis is normalized)
    cpd: bool
}


impl Factor {

    /// Get the identity factor - the scalar 1
    pub fn identity() -> Self {
        Factor::scalar(1.0)
    }


    /// A `Factor` over the empty scope with the given value
    pub fn scalar(value: f64) -> Self {
        Factor {
            scope: Vec::new(),
            table: Table::from_elem(nd::IxDyn(&[]), value),
            cpd: false
        }
    }


    /// Create a new `Factor`
    ///
    /// # Errors
    /// * `ReasonerError::DuplicateVariable` if a variable (name) appears in the scope twice
    /// * `ReasonerError::MalformedFactor` if the table does not have one axis per scope variable of
    ///   the variable's cardinality
    /// * `ReasonerError::NegativeProbability` if any value is negative or NaN
    pub fn new(scope: Vec<Variable>, table: Table) -> Result<Self> {
        if scope.iter().map(|v| v.name()).unique().count() != scope.len() {
            return Err(ReasonerError::DuplicateVariable);
        }

        if scope.len() != table.ndim() {
            return Err(ReasonerError::MalformedFactor(format!(
                "a scope of {} variables needs a table with as many dimensions, not {}",
                scope.len(),
                table.ndim()
            )));
        }

        for (v, &len) in scope.iter().zip(table.shape().iter()) {
            if v.cardinality() != len {
                return Err(ReasonerError::MalformedFactor(format!(
                    "variable {} has {} values but its axis has length {}",
                    v,
                    v.cardinality(),
                    len
                )));
            }
        }

        // factors may not have negative values
        if table.iter().any(|&v| !(v >= 0.0)) {
            return Err(ReasonerError::NegativeProbability);
        }

        Ok(Factor { scope, table, cpd: false })
    }


    /// Create a new conditional probability distribution ```P(var | parents)```.
    ///
    /// The table is laid out with one axis per parent, in order, followed by the axis of `var`.
    ///
    /// # Errors
    /// Everything `Factor::new` reports, and `ReasonerError::NotACPD` if some row over `var` does
    /// not sum to one.
    pub fn cpd(var: Variable, parents: Vec<Variable>, table: Table) -> Result<Self> {
        let mut scope = parents;
        scope.push(var);

        let mut factor = Factor::new(scope, table)?;

        let last = nd::Axis(factor.scope.len() - 1);
        if factor.table.sum_axis(last).iter().any(|&s| (s - 1.0).abs() > CPD_TOLERANCE) {
            return Err(ReasonerError::NotACPD);
        }

        factor.cpd = true;
        Ok(factor)
    }


    /// Check if the `Factor` is a Conditional Probability Distribution.
    ///
    /// # Note
    /// A conditional probability distribution is a specialization of a `Factor`. All CPDs are
    /// `Factor`s, but not all `Factor`s are CPDs. Products and marginals are never CPDs.
    pub fn is_cpd(&self) -> bool {
        self.cpd
    }


    /// Check if the `Factor` has an empty scope
    pub fn is_scalar(&self) -> bool {
        self.scope.is_empty()
    }


    /// The value of a scalar `Factor`
    pub fn scalar_value(&self) -> Option<f64> {
        if self.is_scalar() {
            self.table.iter().next().cloned()
        } else {
            None
        }
    }


    /// Retrieve the scope of the `Factor`.
    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }


    /// Retrieve the table of the `Factor`
    pub fn table(&self) -> &Table {
        &self.table
    }


    /// Check if `var` is in the scope of the `Factor`
    pub fn contains(&self, var: &Variable) -> bool {
        self.scope.contains(var)
    }


    /// The number of entries in the table
    pub fn len(&self) -> usize {
        self.table.len()
    }


    /// Total mass of the `Factor`, the sum over every assignment of its scope
    pub fn sum(&self) -> f64 {
        self.table.sum()
    }


    /// Retrieve the value for a complete assignment over the scope of this `Factor`
    ///
    /// # Args
    /// * `assignment`: a full assignment to the scope of a `Factor`. The assignment's scope may be
    ///   a superset of the `Factor`s scope.
    ///
    /// # Errors
    /// * `ReasonerError::IncompleteAssignment`, if assignment is not a complete assignment to the
    ///   scope of the `Factor`
    /// * `ReasonerError::InvalidEvidence`, if a value lies outside its variable's domain
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        let idx = index_of(&self.scope, assignment)?;
        Ok(self.table[nd::IxDyn(&idx)])
    }


    /// Product of this `Factor` and another `Factor`.
    ///
    /// Defined in Koller & Friedman Section 4.2.1. The scope of the result is the scope of `self`
    /// followed by the variables of `other` not already present. Disjoint scopes yield the outer
    /// product. The product is commutative and associative up to the order of the scope.
    ///
    /// # Errors
    /// * `ReasonerError::MalformedFactor`, if the scopes disagree on the cardinality of a
    ///   variable with the same name
    pub fn product(&self, other: &Self) -> Result<Self> {
        // We are computing a new factor Psi(X, Y, Z) = phi1(X, Y) * phi2(Y, Z).
        // See Koller & Friedman Definition 4.2
        let mut scope = self.scope.clone();
        let mut rhs_axes = Vec::with_capacity(other.scope.len());

        for v in other.scope.iter() {
            if let Some(clash) = self.scope.iter().find(|s| s.name() == v.name() && *s != v) {
                return Err(ReasonerError::MalformedFactor(format!(
                    "variable {} appears with cardinalities {} and {}",
                    v,
                    clash.cardinality(),
                    v.cardinality()
                )));
            }

            match scope.iter().position(|s| s == v) {
                Some(i) => rhs_axes.push(i),
                None => {
                    scope.push(v.clone());
                    rhs_axes.push(scope.len() - 1);
                }
            }
        }

        let lhs_axes: Vec<usize> = (0..self.scope.len()).collect();
        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality()).collect();

        let mut lhs_idx = vec![0; lhs_axes.len()];
        let mut rhs_idx = vec![0; rhs_axes.len()];
        let table = Table::from_shape_fn(nd::IxDyn(&shape), |idx: nd::IxDyn| {
            project(&idx, &lhs_axes, &mut lhs_idx);
            project(&idx, &rhs_axes, &mut rhs_idx);
            self.table[nd::IxDyn(&lhs_idx)] * other.table[nd::IxDyn(&rhs_idx)]
        });

        Ok(Factor { scope, table, cpd: false })
    }


    /// `Factor` division. Calculates Psi(X, Y) = Phi1(X, Y) / Phi2(Y) where Phi1 = self and Phi2 =
    /// other.
    ///
    /// Defined in Koller & Friedman Section 10.3.1
    ///
    /// # Notes
    /// In the context of this operation, 0/0 is defined as 0. However, X/0, where X != 0, is still
    /// undefined.
    ///
    /// # Errors
    /// * `ReasonerError::InvalidScope` if other.scope() is not a subset of self.scope()
    /// * `ReasonerError::DivideByZero` if a divide by zero error is found
    pub fn divide(&self, other: &Self) -> Result<Self> {
        let axes = other.scope
                        .iter()
                        .map(|v| self.scope.iter().position(|s| s == v))
                        .collect::<Option<Vec<usize>>>()
                        .ok_or(ReasonerError::InvalidScope)?;

        let mut rhs_idx = vec![0; axes.len()];
        let mut table = self.table.clone();

        for (idx, val) in table.indexed_iter_mut() {
            project(&idx, &axes, &mut rhs_idx);
            let denominator = other.table[nd::IxDyn(&rhs_idx)];

            if denominator == 0. {
                if *val != 0. {
                    return Err(ReasonerError::DivideByZero);
                }
            } else {
                *val /= denominator;
            }
        }

        Ok(Factor { scope: self.scope.clone(), table, cpd: false })
    }


    /// Reduce the `Factor` to the given partial assignment.
    ///
    /// Defined in Koller & Friedman 4.2.3. Every assigned scope variable is fixed to its value and
    /// removed from the scope; assigned variables outside of the scope are ignored. Reducing a CPD
    /// at (some of) its parents yields a CPD over the remaining parents.
    ///
    /// # Errors
    /// * `ReasonerError::InvalidEvidence` if an assigned value lies outside its variable's domain
    pub fn reduce(&self, assignment: &Assignment) -> Result<Self> {
        let mut table = self.table.clone();
        let mut scope = Vec::with_capacity(self.scope.len());
        let mut reduced_own = false;

        // walk the axes backwards so that removing an axis never shifts one we still have to visit
        for (i, v) in self.scope.iter().enumerate().rev() {
            match assignment.get(v) {
                Some(&val) => {
                    if ! v.admits(val) {
                        return Err(out_of_domain(v, val));
                    }
                    table = table.index_axis_move(nd::Axis(i), val);
                    reduced_own |= i + 1 == self.scope.len();
                },
                None => scope.push(v.clone())
            }
        }
        scope.reverse();

        Ok(Factor { scope, table, cpd: self.cpd && ! reduced_own })
    }


    /// Marginalize (sum out) the given `Variable` from the `Factor`
    ///
    /// Defined in Koller & Friedman 9.3.1
    ///
    /// # Errors
    /// * `ReasonerError::MalformedFactor` if `var` is not in the scope
    pub fn marginalize(&self, var: &Variable) -> Result<Self> {
        let axis = self.axis_of(var)?;
        let table = self.table.sum_axis(nd::Axis(axis));
        let scope = self.scope.iter().filter(|&v| v != var).cloned().collect();

        Ok(Factor { scope, table, cpd: false })
    }


    /// Max out the given `Variable` from the `Factor`.
    ///
    /// Defined in Koller & Friedman 13.2.1. Alongside the maxed-out `Factor`, the `Witness`
    /// records which value of `var` attained the maximum for every assignment of the remaining
    /// scope. Ties go to the lowest value.
    ///
    /// # Errors
    /// * `ReasonerError::MalformedFactor` if `var` is not in the scope
    pub fn max_out(&self, var: &Variable) -> Result<(Self, Witness)> {
        let axis = nd::Axis(self.axis_of(var)?);
        let scope: Vec<Variable> = self.scope.iter().filter(|&v| v != var).cloned().collect();

        let table = self.table.map_axis(axis, |lane| {
            lane.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
        });
        let choices = self.table.map_axis(axis, |lane| argmax(lane.iter()));

        let witness = Witness { variable: var.clone(), scope: scope.clone(), choices };
        Ok((Factor { scope, table, cpd: false }, witness))
    }


    /// Normalize the `Factor` so that its values sum to one
    ///
    /// # Errors
    /// * `ReasonerError::DivideByZero` if the `Factor` has no mass
    pub fn normalize(&self) -> Result<Self> {
        let z = self.sum();
        if z == 0. {
            return Err(ReasonerError::DivideByZero);
        }

        Ok(Factor { scope: self.scope.clone(), table: &self.table / z, cpd: false })
    }


    /// The same function, with the scope rearranged into `order`
    ///
    /// # Errors
    /// * `ReasonerError::InvalidScope` if `order` is not a permutation of the scope
    pub fn permute(&self, order: &[Variable]) -> Result<Self> {
        if order.len() != self.scope.len() {
            return Err(ReasonerError::InvalidScope);
        }

        let axes = order.iter()
                        .map(|v| self.scope.iter().position(|s| s == v))
                        .collect::<Option<Vec<usize>>>()
                        .ok_or(ReasonerError::InvalidScope)?;

        if axes.iter().unique().count() != axes.len() {
            return Err(ReasonerError::InvalidScope);
        }

        let table = self.table
                        .clone()
                        .permuted_axes(nd::IxDyn(&axes))
                        .as_standard_layout()
                        .into_owned();

        Ok(Factor {
            scope: order.to_vec(),
            table,
            cpd: self.cpd && order.last() == self.scope.last()
        })
    }


    /// Compare two `Factor`s as functions: same scope (in any order) and values within `tolerance`
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        match other.permute(&self.scope) {
            Ok(other) => self.table
                             .iter()
                             .zip(other.table.iter())
                             .all(|(a, b)| (a - b).abs() <= tolerance),
            Err(_) => false
        }
    }


    /// Position of `var` in the scope
    fn axis_of(&self, var: &Variable) -> Result<usize> {
        self.scope.iter().position(|v| v == var).ok_or_else(|| {
            ReasonerError::MalformedFactor(format!("variable {} is not in the scope of the factor", var))
        })
    }

}


impl fmt::Display for Factor {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for assignment in all_assignments(&self.scope) {
            let value = self.value(&assignment).map_err(|_| fmt::Error)?;
            writeln!(f, "{} -> {:.6}", assignment, value)?;
        }
        Ok(())
    }

}


/// The record kept by `Factor::max_out`: for every assignment of the remaining scope, the value of
/// the maxed-out variable that attained the maximum.
#[derive(Clone, Debug, PartialEq)]
pub struct Witness {
    /// The variable that was maxed out
    variable: Variable,

    /// The scope of the maxed-out factor
    scope: Vec<Variable>,

    /// The maximizing values, one axis per scope variable
    choices: nd::ArrayD<usize>
}

impl Witness {

    /// The variable that was maxed out
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// The scope over which the choices are recorded
    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }

    /// The maximizing value of `self.variable()` given an assignment to the scope
    ///
    /// # Errors
    /// * `ReasonerError::IncompleteAssignment` if the assignment does not cover the scope
    pub fn choice(&self, assignment: &Assignment) -> Result<usize> {
        let idx = index_of(&self.scope, assignment)?;
        Ok(self.choices[nd::IxDyn(&idx)])
    }

}


/// Look up the table index of `assignment` over `scope`
fn index_of(scope: &[Variable], assignment: &Assignment) -> Result<Vec<usize>> {
    let idx = scope.iter()
                   .map(|v| assignment.get(v).cloned())
                   .collect::<Option<Vec<usize>>>()
                   .ok_or(ReasonerError::IncompleteAssignment)?;

    if let Some((v, &val)) = scope.iter().zip(idx.iter()).find(|&(v, val)| ! v.admits(*val)) {
        return Err(out_of_domain(v, val));
    }

    Ok(idx)
}

/// Copy the entries of `idx` at `axes` into `out`
fn project(idx: &nd::IxDyn, axes: &[usize], out: &mut [usize]) {
    for (o, &a) in out.iter_mut().zip(axes.iter()) {
        *o = idx[a];
    }
}

/// Index of the first maximal value
fn argmax<'a>(values: impl Iterator<Item = &'a f64>) -> usize {
    values.enumerate()
          .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
          .0
}

fn out_of_domain(var: &Variable, value: usize) -> ReasonerError {
    ReasonerError::InvalidEvidence(format!(
        "value {} is outside the domain of {} (cardinality {})",
        value,
        var,
        var.cardinality()
    ))
}
