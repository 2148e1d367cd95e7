//! Defines the interface to inference engines, along with the building blocks of exact inference:
//! pruning, elimination ordering and d-separation.

use crate::factor::Factor;
use crate::util::Result;
use crate::variable::{Assignment, Variable};

use std::fmt;

pub mod dsep;
pub mod order;
pub mod prune;
mod variable_elimination;

pub use self::dsep::{d_separated, independent};
pub use self::order::{find_order, Heuristic};
pub use self::prune::prune;
pub use self::variable_elimination::VariableEliminationEngine;


/// A `ConditionalInferenceEngine` is capable of answering Conditional Probability Queries of the form:
///     ```P(Y | E = e)```
pub trait ConditionalInferenceEngine {

    /// Infer the joint distribution ```P(query | evidence)```, with scope `query`
    fn infer(&self, query: &[Variable], evidence: &Assignment) -> Result<Factor>;

}


/// A `MapInferenceEngine` is capable of answering Maximum a posteriori queries:
///     ```MAP(Y | E = e) = argmax_y P(Y = y | E = e)```
pub trait MapInferenceEngine {

    /// Infer the most probable assignment `Y = y` given the evidence
    fn infer_map(&self, query: &[Variable], evidence: &Assignment) -> Result<Explanation>;

}


/// The answer to a MAP or MPE query
#[derive(Clone, Debug, PartialEq)]
pub struct Explanation {

    /// The most probable instantiation of the query variables
    pub assignment: Assignment,

    /// Its posterior probability given the evidence
    pub probability: f64

}

impl fmt::Display for Explanation {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} with probability {:.6}", self.assignment, self.probability)
    }

}
