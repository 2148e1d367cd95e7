//! Exact inference over discrete Bayesian networks.
//!
//! A network is a `DirectedModel`: a DAG of discrete `Variable`s, each carrying a conditional
//! probability distribution `Factor`. The `VariableEliminationEngine` answers queries against it:
//!
//! * posterior marginals ```P(Y | E = e)``` by variable elimination
//! * MAP and MPE instantiations
//! * d-separation and conditional independence
//!
//! Each query prunes a private copy of the network, orders the remaining eliminations with a
//! min-degree or min-fill `Heuristic`, and runs the elimination loop over the reduced CPDs.

pub mod factor;
pub mod inference;
pub mod init;
pub mod model;
pub mod util;
pub mod variable;

pub use factor::Factor;
pub use inference::{ConditionalInferenceEngine, Explanation, Heuristic, MapInferenceEngine, VariableEliminationEngine};
pub use init::Initialization;
pub use model::{DirectedModel, DirectedModelBuilder, InteractionGraph};
pub use util::{ReasonerError, Result};
pub use variable::{Assignment, Variable};
