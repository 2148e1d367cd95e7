//! Defines a `VariableEliminationEngine` that uses exact inference by variable elimination to
//! answer conditional probability, MAP and MPE queries over a `DirectedModel`.
//!
//! Implementation of Koller & Friedman Algorithm 9.1 - Sum-Product-VE, preceded by query-specific
//! pruning and followed by Algorithm 13.1 - Max-Product traceback for MAP queries.

use crate::factor::Factor;
use crate::model::directed::DirectedModel;
use crate::model::undirected::InteractionGraph;
use crate::util::{ReasonerError, Result};
use crate::variable::{Assignment, Variable};

use super::order::{self, Heuristic};
use super::prune::{self as pruner, check_query};
use super::{dsep, ConditionalInferenceEngine, Explanation, MapInferenceEngine};

use indexmap::IndexSet;
use log::{debug, trace};

/// An exact inference engine over a borrowed `DirectedModel`.
///
/// The engine never modifies the network: every query prunes its own copy. The elimination
/// ordering heuristic is fixed when the engine is built, so one engine can be shared between
/// threads.
#[derive(Clone, Copy, Debug)]
pub struct VariableEliminationEngine<'a> {

    /// the network queries are answered against
    model: &'a DirectedModel,

    /// the strategy used to order eliminations
    heuristic: Heuristic

}


impl<'a> VariableEliminationEngine<'a> {

    /// Construct an engine using the default (min-degree) heuristic
    pub fn new(model: &'a DirectedModel) -> Self {
        VariableEliminationEngine::with_heuristic(model, Heuristic::default())
    }

    /// Construct an engine using the given ordering heuristic
    pub fn with_heuristic(model: &'a DirectedModel, heuristic: Heuristic) -> Self {
        VariableEliminationEngine { model, heuristic }
    }

    /// The network this engine answers queries about
    pub fn model(&self) -> &'a DirectedModel {
        self.model
    }

    /// The ordering heuristic of this engine
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Prune a copy of the network for the given query and evidence
    ///
    /// See `inference::prune`.
    pub fn prune(&self, query: &[Variable], evidence: &Assignment) -> Result<DirectedModel> {
        pruner::prune(self.model, query, evidence)
    }

    /// Order `variables` for elimination from the moral graph of the full network
    ///
    /// See `inference::find_order`.
    pub fn find_order(&self, variables: &[Variable]) -> Result<Vec<Variable>> {
        order::find_order(InteractionGraph::for_model(self.model), variables, self.heuristic)
    }

    /// Check if `x` and `y` are d-separated by `z`
    pub fn d_separated(&self, x: &[Variable], y: &[Variable], z: &[Variable]) -> Result<bool> {
        dsep::d_separated(self.model, x, y, z)
    }

    /// Check if `x` is independent of `y` given `z`
    pub fn independent(&self, x: &[Variable], y: &[Variable], z: &[Variable]) -> Result<bool> {
        dsep::independent(self.model, x, y, z)
    }


    /// Compute the joint ```P(query, evidence)``` by variable elimination.
    ///
    /// # Args
    /// * `query`: the variables to keep. Duplicates are ignored.
    /// * `evidence`: the observed values
    ///
    /// # Returns
    /// a `Factor` with scope exactly `query` (in query order). The observed variables are reduced
    /// out, so the factor sums to ```P(evidence)```.
    ///
    /// # Errors
    /// * `ReasonerError::UnknownVariable` if a variable is not part of the network
    /// * `ReasonerError::InvalidEvidence` if an observed value is out of domain, or a variable is
    ///   both queried and observed
    /// * `ReasonerError::EmptyEliminationOrder` if there is neither a query nor evidence
    pub fn variable_elimination(&self, query: &[Variable], evidence: &Assignment) -> Result<Factor> {
        let query = distinct(query);

        ///////////////////////////////////////////////////////////////////////
        // 1) Validate the query
        check_query(self.model, &query, evidence)?;

        if let Some(v) = query.iter().find(|v| evidence.contains(v)) {
            return Err(ReasonerError::InvalidEvidence(format!("{} is both queried and observed", v)));
        }

        if query.is_empty() && evidence.is_empty() {
            return Err(ReasonerError::EmptyEliminationOrder);
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Prune, and determine which variables take part
        let pruned = pruner::prune(self.model, &query, evidence)?;

        let mut targets = query.clone();
        targets.extend(evidence.variables().cloned());

        let mut relevant: IndexSet<Variable> = pruned.ancestors(&targets)?;
        relevant.extend(targets.iter().cloned());

        let eliminate: Vec<Variable> = relevant.iter()
                                               .filter(|v| ! query.contains(v) && ! evidence.contains(v))
                                               .cloned()
                                               .collect();

        ///////////////////////////////////////////////////////////////////////
        // 3) Build the factor pool from the reduced CPDs and order the eliminations
        let mut pool = Vec::with_capacity(relevant.len());
        for v in relevant.iter() {
            let cpd = pruned.cpd(v).ok_or_else(|| ReasonerError::UnknownVariable(v.name().to_string()))?;
            pool.push(cpd.reduce(evidence)?);
        }

        let order = order::find_order(InteractionGraph::from_factors(&pool), &eliminate, self.heuristic)?;

        debug!(
            "variable elimination: {} factors, eliminating {:?} ({})",
            pool.len(),
            order.iter().map(|v| v.name()).collect::<Vec<_>>(),
            self.heuristic
        );

        ///////////////////////////////////////////////////////////////////////
        // 4) Sum out every variable in order
        for x in order.iter() {
            let (phi, rest): (Vec<Factor>, Vec<Factor>) = pool.into_iter().partition(|f| f.contains(x));

            // product step - multiply all factors mentioning x
            let psi = phi.iter().try_fold(Factor::identity(), |acc, f| acc.product(f))?;

            trace!("eliminate {}: multiplied {} factors into a table of {}", x, phi.len(), psi.len());

            // sum step - marginalize psi over x
            let tau = psi.marginalize(x)?;

            pool = rest;
            pool.push(tau);
        }

        ///////////////////////////////////////////////////////////////////////
        // 5) Multiply together the remaining factors
        let joint = pool.iter().try_fold(Factor::identity(), |acc, f| acc.product(f))?;
        let joint = joint.permute(&query)?;

        debug!("variable elimination: result over {} entries, mass {}", joint.len(), joint.sum());

        Ok(joint)
    }


    /// Compute the posterior ```P(query | evidence)```.
    ///
    /// The joint is divided by ```P(evidence)```, its total mass. Without evidence, this is
    /// exactly `variable_elimination`.
    ///
    /// # Errors
    /// As `variable_elimination`, and
    /// * `ReasonerError::InvalidEvidence` if the evidence has probability zero
    pub fn marginal_distributions(&self, query: &[Variable], evidence: &Assignment) -> Result<Factor> {
        let joint = self.variable_elimination(query, evidence)?;

        if evidence.is_empty() {
            return Ok(joint);
        }

        let p_evidence = joint.sum();
        if p_evidence <= 0. {
            return Err(ReasonerError::InvalidEvidence(format!("P({}) = 0", evidence)));
        }

        debug!("P({}) = {}", evidence, p_evidence);

        joint.divide(&Factor::scalar(p_evidence))
    }


    /// Find the maximum a posteriori instantiation of `query` given `evidence`.
    ///
    /// # Returns
    /// the most probable joint assignment to `query` and its posterior probability. Ties go to
    /// the lowest values.
    ///
    /// # Errors
    /// As `marginal_distributions`, and
    /// * `ReasonerError::EmptyEliminationOrder` if `query` is empty
    pub fn map(&self, query: &[Variable], evidence: &Assignment) -> Result<Explanation> {
        if query.is_empty() {
            return Err(ReasonerError::EmptyEliminationOrder);
        }

        let posterior = self.marginal_distributions(query, evidence)?;

        ///////////////////////////////////////////////////////////////////////
        // 1) Max out the query variables one at a time, keeping the witnesses
        let mut phi = posterior.clone();
        let mut witnesses = Vec::with_capacity(posterior.scope().len());
        for v in posterior.scope() {
            let (next, witness) = phi.max_out(v)?;
            witnesses.push(witness);
            phi = next;
        }

        let probability = phi.scalar_value().ok_or_else(|| {
            ReasonerError::MalformedFactor(String::from("maxing out every query variable left a non-scalar factor"))
        })?;

        ///////////////////////////////////////////////////////////////////////
        // 2) Trace back: the last variable maxed out depends on nothing
        let mut traced = Assignment::new();
        for witness in witnesses.iter().rev() {
            let value = witness.choice(&traced)?;
            traced.set(witness.variable(), value);
        }

        let assignment = posterior.scope()
                                  .iter()
                                  .filter_map(|v| traced.get(v).map(|&val| (v.clone(), val)))
                                  .collect();

        Ok(Explanation { assignment, probability })
    }


    /// Find the most probable explanation of `evidence`: the MAP instantiation of every variable
    /// that is not observed.
    ///
    /// # Errors
    /// As `map`. Observing every variable leaves nothing to explain
    /// (`ReasonerError::EmptyEliminationOrder`).
    pub fn mpe(&self, evidence: &Assignment) -> Result<Explanation> {
        check_query(self.model, &[], evidence)?;

        let query: Vec<Variable> = self.model
                                       .variables()
                                       .into_iter()
                                       .filter(|v| ! evidence.contains(v))
                                       .collect();

        self.map(&query, evidence)
    }
}


impl<'a> ConditionalInferenceEngine for VariableEliminationEngine<'a> {

    fn infer(&self, query: &[Variable], evidence: &Assignment) -> Result<Factor> {
        self.marginal_distributions(query, evidence)
    }

}


impl<'a> MapInferenceEngine for VariableEliminationEngine<'a> {

    fn infer_map(&self, query: &[Variable], evidence: &Assignment) -> Result<Explanation> {
        self.map(query, evidence)
    }

}


/// Drop repeated variables, keeping the first occurrence
fn distinct(vars: &[Variable]) -> Vec<Variable> {
    vars.iter().cloned().collect::<IndexSet<_>>().into_iter().collect()
}
