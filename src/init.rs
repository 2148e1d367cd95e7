//! Module containing initialization routines for the CPDs of a network.

use crate::factor::{Factor, Table};
use crate::util::{ReasonerError, Result};
use crate::variable::Variable;

use ndarray::prelude as nd;
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;

/// Defines possible ways to initialize a `Variable`s CPD.
pub enum Initialization<'a> {
    /// A uniform distribution over all possibilities
    Uniform,

    /// Randomly initialize the weights of the CPD. Every entry is strictly positive.
    Random,

    /// Initialize the CPD as a Binomial distribution where the first value has probability
    /// ```p```. Note that this `Initialization` is valid only for a binary `Variable` with no
    /// parents.
    Binomial(f64),

    /// Initialize the CPD as a Multinomial distribution with parameters ```p_0, p_1...```.
    /// Note that this `Initialization` is valid only to a `Variable` with no parents.
    Multinomial(&'a [f64]),

    /// User defined CPD
    Table(Factor)
}


impl<'a> Initialization<'a> {

    /// Construct a CPD ```P(var | parents)```, initialized based on ```self```
    ///
    /// # Args
    /// * `var`: the variable the CPD is defined over
    /// * `parents`: the conditioning variables. Generated tables have one axis per parent, in
    ///   this order, followed by the axis of `var`.
    ///
    /// # Errors
    /// * `ReasonerError::InvalidInitialization` if the initialization does not fit the variable
    /// * `ReasonerError::NotACPD` if a user defined table is not normalized
    /// * `ReasonerError::InvalidScope` if a user defined table has the wrong scope
    pub fn build_cpd(self, var: &Variable, parents: &[Variable]) -> Result<Factor> {
        ///////////////////////////////////////////////////////////////////////////////
        // Trivial cases

        // if this is a user defined factor, it just needs to be verified and returned
        if let Initialization::Table(f) = self {
            if ! f.is_cpd() {
                return Err(ReasonerError::NotACPD);
            }

            let s = f.scope();
            if s.last() == Some(var) && s.len() == parents.len() + 1 && parents.iter().all(|p| s.contains(p)) {
                return Ok(f);
            } else {
                return Err(ReasonerError::InvalidScope);
            }
        }

        ///////////////////////////////////////////////////////////////////////////////
        // Check for errors
        match self {
            // Binomial and multinomial distributions are only defined for roots
            Initialization::Binomial(_) | Initialization::Multinomial(_) if ! parents.is_empty() => {
                return Err(ReasonerError::InvalidInitialization);
            },

            // A binomial distribution on a non-binary variable
            Initialization::Binomial(p) if var.cardinality() != 2 || ! (0.0..=1.0).contains(&p) => {
                return Err(ReasonerError::InvalidInitialization);
            },

            // A multinomial distribution with an incorrect number of parameters
            Initialization::Multinomial(ps) if ps.len() != var.cardinality() => {
                return Err(ReasonerError::InvalidInitialization);
            },

            _ => ()
        }

        ///////////////////////////////////////////////////////////////////////////////
        // now, build CPD
        let mut shape: Vec<usize> = parents.iter().map(|v| v.cardinality()).collect();
        shape.push(var.cardinality());

        let tbl: Table = match self {
            Initialization::Uniform => {
                // normalizing constant is just the number of values
                let val = 1. / (var.cardinality() as f64);
                Table::from_elem(shape, val)
            },
            Initialization::Random => {
                let ax = nd::Axis(shape.len() - 1);
                let tbl = Table::random(shape, Uniform::new(1.0, 100.0));
                let z = tbl.sum_axis(ax).insert_axis(ax);
                tbl / z
            },
            Initialization::Binomial(p) => {
                nd::Array::from(vec![p, 1.0 - p]).into_dyn()
            },
            Initialization::Multinomial(ps) => {
                nd::Array::from(ps.to_vec()).into_dyn()
            },
            Initialization::Table(_) => unreachable!("user defined tables are returned above")
        };

        Factor::cpd(var.clone(), parents.to_vec(), tbl)
    }

}
