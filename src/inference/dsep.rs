//! d-separation of variable sets in a `DirectedModel`.
//!
//! ```X``` and ```Y``` are d-separated by ```Z``` iff, after pruning the network for the query
//! ```X U Y``` with ```Z``` observed, no path joins ```X``` and ```Y``` in the skeleton of the
//! pruned network. Only the structure matters, so the observed values are arbitrary.

use crate::model::directed::DirectedModel;
use crate::model::undirected::InteractionGraph;
use crate::util::Result;
use crate::variable::{Assignment, Variable};

use super::prune::prune;

use log::debug;

/// Check if `x` and `y` are d-separated by `z` in `model`.
///
/// A variable shared by `x` and `y` is never separated from itself.
///
/// # Errors
/// * `ReasonerError::UnknownVariable` if any of the sets mention a variable not in `model`
pub fn d_separated(model: &DirectedModel, x: &[Variable], y: &[Variable], z: &[Variable]) -> Result<bool> {
    let query: Vec<Variable> = x.iter().chain(y.iter()).cloned().collect();
    let evidence: Assignment = z.iter().map(|v| (v.clone(), 0)).collect();

    let pruned = prune(model, &query, &evidence)?;
    let skeleton = InteractionGraph::skeleton(&pruned);
    let separated = ! skeleton.connected(x, y);

    debug!(
        "d-separation over {} variables and {} edges: separated = {}",
        skeleton.num_variables(), skeleton.num_edges(), separated
    );

    Ok(separated)
}

/// Check if `x` is independent of `y` given `z`. This is exactly `d_separated`.
pub fn independent(model: &DirectedModel, x: &[Variable], y: &[Variable], z: &[Variable]) -> Result<bool> {
    d_separated(model, x, y, z)
}
