//! Defines the `Error` type for the bnreasoner library

use thiserror::Error;

use std::result;

pub type Result<T> = result::Result<T, ReasonerError>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ReasonerError {

    /// A query, evidence set or structural operation referenced a variable that is not part of
    /// the network. The value is the name of the missing variable.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// The evidence is unusable: a value outside of a variable's domain, a variable that is both
    /// observed and queried, or an evidence set with zero prior probability.
    #[error("invalid evidence: {0}")]
    InvalidEvidence(String),

    /// A structural change would have introduced a directed cycle into the network
    #[error("cyclic structure: {0}")]
    CyclicStructure(String),

    /// There was nothing to retain or to eliminate - neither a query nor any evidence
    #[error("nothing to eliminate: the query and the evidence are both empty")]
    EmptyEliminationOrder,

    /// A `Factor` operation was applied to a scope that does not support it, e.g. summing out a
    /// variable that is not in the scope
    #[error("malformed factor: {0}")]
    MalformedFactor(String),

    /// Attempted to delete a variable that still has children
    #[error("variable {0} still has children and cannot be deleted")]
    HasChildren(String),

    /// Represents an incomplete assignment where a complete assignment was required.
    #[error("missing assignments to the required variables")]
    IncompleteAssignment,

    /// Represents an error where a certain constraint on a scope was not satisfied
    #[error("provided scope did not satisfy constraints")]
    InvalidScope,

    /// Exactly what it sounds like
    #[error("encountered division by zero")]
    DivideByZero,

    /// Represents an error where there was a parent variable expected, but not found
    #[error("missing a parent from the model")]
    MissingParent,

    /// Represents a variable that was present multiple times in a situation where it should only
    /// have been present once
    #[error("a variable was encountered twice")]
    DuplicateVariable,

    /// Represents the situation when we expected a CPD but did not receive one
    #[error("requires a conditional probability distribution")]
    NotACPD,

    /// Represents an attempt to initialize a variable with an incompatible Initialization
    #[error("an invalid initialization was provided")]
    InvalidInitialization,

    /// A table contained a negative (or NaN) probability
    #[error("encountered a negative probability")]
    NegativeProbability,

    /// An elimination ordering heuristic name could not be parsed
    #[error("unknown ordering heuristic: {0}")]
    UnknownHeuristic(String),

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let e = ReasonerError::UnknownVariable(String::from("Rain"));
        assert_eq!("unknown variable: Rain", e.to_string());

        let e = ReasonerError::HasChildren(String::from("Winter"));
        assert_eq!("variable Winter still has children and cannot be deleted", e.to_string());
    }
}
