//! Query-specific pruning of a `DirectedModel`.
//!
//! Pruning removes structure that cannot influence a query: the outgoing edges of observed
//! variables (their values are known, so their children's CPDs are reduced instead) and every
//! barren leaf that is neither queried nor observed.

use crate::model::directed::DirectedModel;
use crate::util::{ReasonerError, Result};
use crate::variable::{Assignment, Variable};

use log::debug;

/// Produce a pruned copy of `model` for the query `query` given `evidence`.
///
/// # Args
/// * `model`: the network. It is cloned and never modified.
/// * `query`: the variables that must survive pruning
/// * `evidence`: the observed values
///
/// # Returns
/// the pruned network, holding every variable of `query` and `evidence`
///
/// # Errors
/// * `ReasonerError::UnknownVariable` if the query or evidence mention a variable not in `model`
/// * `ReasonerError::InvalidEvidence` if an observed value is outside its variable's domain
pub fn prune(model: &DirectedModel, query: &[Variable], evidence: &Assignment) -> Result<DirectedModel> {
    check_query(model, query, evidence)?;

    let mut pruned = model.clone();

    ///////////////////////////////////////////////////////////////////////////
    // 1) Edge pruning - observed variables lose their outgoing edges
    let mut edges = 0;
    for (e, &value) in evidence.iter() {
        for child in pruned.children(e)? {
            pruned.delete_edge(e, &child, value)?;
            edges += 1;
        }
    }

    ///////////////////////////////////////////////////////////////////////////
    // 2) Leaf pruning - repeat until a scan removes nothing
    let mut removed = 0;
    loop {
        let mut changed = false;

        // reverse topological order, so a deleted child exposes its parents within one scan
        for v in pruned.variables().into_iter().rev() {
            if query.contains(&v) || evidence.contains(&v) {
                continue;
            }
            if pruned.is_leaf(&v)? {
                pruned.delete_variable(&v)?;
                removed += 1;
                changed = true;
            }
        }

        if ! changed {
            break;
        }
    }

    debug!(
        "pruned {} edges and {} variables; {} of {} variables remain",
        edges, removed, pruned.num_variables(), model.num_variables()
    );

    Ok(pruned)
}


/// Check that a query and its evidence only mention variables of `model`, with observed values in
/// their domains.
pub(crate) fn check_query(model: &DirectedModel, query: &[Variable], evidence: &Assignment) -> Result<()> {
    if let Some(v) = query.iter().find(|v| ! model.contains(v)) {
        return Err(ReasonerError::UnknownVariable(v.name().to_string()));
    }

    for (v, &value) in evidence.iter() {
        if ! model.contains(v) {
            return Err(ReasonerError::UnknownVariable(v.name().to_string()));
        }
        if ! v.admits(value) {
            return Err(ReasonerError::InvalidEvidence(
                format!("{} = {} is outside the domain of {}", v, value, v)
            ));
        }
    }

    Ok(())
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::factor::Factor;
    use crate::init::Initialization;
    use crate::model::directed::DirectedModelBuilder;
    use ndarray::array;

    /// A -> B -> C -> D, B -> E
    fn chain() -> (Vec<Variable>, DirectedModel) {
        let vars: Vec<Variable> = ["A", "B", "C", "D", "E"].iter().map(|n| Variable::binary(n)).collect();

        let cpd_b = Factor::cpd(vars[1].clone(), vec![ vars[0].clone() ], array![[0.9, 0.1], [0.3, 0.7]].into_dyn()).unwrap();

        let model = DirectedModelBuilder::new()
            .with_variable(&vars[0], &[], Initialization::Binomial(0.4))
            .with_variable(&vars[1], &[ vars[0].clone() ], Initialization::Table(cpd_b))
            .with_variable(&vars[2], &[ vars[1].clone() ], Initialization::Random)
            .with_variable(&vars[3], &[ vars[2].clone() ], Initialization::Random)
            .with_variable(&vars[4], &[ vars[1].clone() ], Initialization::Random)
            .build()
            .unwrap();

        (vars, model)
    }

    #[test]
    fn leaf_pruning_reaches_fixpoint() {
        let (vars, model) = chain();

        // querying A alone removes everything below it
        let pruned = prune(&model, &[ vars[0].clone() ], &Assignment::new()).unwrap();
        assert_eq!(vec![ vars[0].clone() ], pruned.variables());

        // the original is untouched
        assert_eq!(5, model.num_variables());
    }

    #[test]
    fn edge_pruning() {
        let (vars, model) = chain();
        let (a, b, c) = (&vars[0], &vars[1], &vars[2]);

        let mut evidence = Assignment::new();
        evidence.set(a, 1);

        let pruned = prune(&model, &[ c.clone() ], &evidence).unwrap();
        assert_eq!(vec![ a.clone(), b.clone(), c.clone() ], pruned.variables());
        assert!(pruned.is_leaf(a).unwrap());

        // the CPD of B is now P(B | A = 1)
        let cpd_b = pruned.cpd(b).unwrap();
        assert_eq!(&[ b.clone() ], cpd_b.scope());
        let mut assn = Assignment::new();
        assn.set(b, 1);
        assert_eq!(0.7, cpd_b.value(&assn).unwrap());
    }

    #[test]
    fn observed_children_keep_their_own_variable() {
        let (vars, model) = chain();
        let (a, b) = (&vars[0], &vars[1]);

        let mut evidence = Assignment::new();
        evidence.set(a, 0);
        evidence.set(b, 1);

        let pruned = prune(&model, &[], &evidence).unwrap();
        assert_eq!(vec![ a.clone(), b.clone() ], pruned.variables());
        assert_eq!(&[ b.clone() ], pruned.cpd(b).unwrap().scope());
        assert!(pruned.cpd(b).unwrap().is_cpd());
    }

    #[test]
    fn idempotent() {
        let (vars, model) = chain();

        let mut evidence = Assignment::new();
        evidence.set(&vars[1], 0);
        let query = [ vars[3].clone() ];

        let once = prune(&model, &query, &evidence).unwrap();
        let twice = prune(&once, &query, &evidence).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn invalid_queries() {
        let (vars, model) = chain();
        let z = Variable::binary("Z");

        assert_eq!(
            Err(ReasonerError::UnknownVariable(String::from("Z"))),
            prune(&model, &[ z.clone() ], &Assignment::new())
        );

        let mut evidence = Assignment::new();
        evidence.set(&z, 0);
        assert_eq!(
            Err(ReasonerError::UnknownVariable(String::from("Z"))),
            prune(&model, &[], &evidence)
        );

        let mut evidence = Assignment::new();
        evidence.set(&vars[0], 2);
        match prune(&model, &[], &evidence) {
            Err(ReasonerError::InvalidEvidence(_)) => (),
            other => panic!("wrong result {:?}", other)
        };
    }
}
