//! Defines the graphical structures of a Bayesian network: the `DirectedModel` holding the DAG
//! and its CPDs, and the undirected `InteractionGraph` derived from it for ordering decisions and
//! reachability queries.

pub mod directed;
pub mod undirected;

pub use self::directed::{DirectedModel, DirectedModelBuilder};
pub use self::undirected::InteractionGraph;
