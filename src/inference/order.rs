//! Elimination ordering by greedy graph heuristics.
//!
//! An ordering repeatedly picks the cheapest remaining candidate on an `InteractionGraph`,
//! connects its neighbors and removes it, exactly as variable elimination would.

use crate::model::undirected::InteractionGraph;
use crate::util::{ReasonerError, Result};
use crate::variable::Variable;

use indexmap::IndexSet;
use log::trace;

use std::fmt;
use std::str::FromStr;

/// The cost function used to choose the next variable to eliminate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Heuristic {

    /// Eliminate the variable with the fewest neighbors
    #[default]
    MinDegree,

    /// Eliminate the variable whose elimination adds the fewest edges
    MinFill

}

impl Heuristic {

    /// The cost of eliminating `v` next from `graph`
    pub fn cost(&self, graph: &InteractionGraph, v: &Variable) -> Result<usize> {
        match *self {
            Heuristic::MinDegree => graph.degree(v),
            Heuristic::MinFill => graph.fill_in(v)
        }
    }

}

impl FromStr for Heuristic {
    type Err = ReasonerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min-degree" | "min_degree" | "min" | "degree" => Ok(Heuristic::MinDegree),
            "min-fill" | "min_fill" | "fill" => Ok(Heuristic::MinFill),
            _ => Err(ReasonerError::UnknownHeuristic(s.to_string()))
        }
    }
}

impl fmt::Display for Heuristic {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Heuristic::MinDegree => write!(f, "min-degree"),
            Heuristic::MinFill => write!(f, "min-fill")
        }
    }

}


/// Compute an elimination order for `variables`.
///
/// # Args
/// * `graph`: the interaction graph the variables live in. The ordering rewrites it, so it is
///   taken by value.
/// * `variables`: the variables to order. Duplicates are ignored.
/// * `heuristic`: the cost function. Ties go to the smallest `Variable`.
///
/// # Returns
/// a permutation of the distinct `variables`
///
/// # Errors
/// * `ReasonerError::UnknownVariable` if a variable is not a node of `graph`
pub fn find_order(mut graph: InteractionGraph, variables: &[Variable], heuristic: Heuristic) -> Result<Vec<Variable>> {
    let mut candidates: IndexSet<Variable> = IndexSet::with_capacity(variables.len());
    for v in variables {
        if ! graph.contains(v) {
            return Err(ReasonerError::UnknownVariable(v.name().to_string()));
        }
        candidates.insert(v.clone());
    }

    let mut order = Vec::with_capacity(candidates.len());

    while ! candidates.is_empty() {
        let mut best: Option<(usize, Variable)> = None;

        for v in candidates.iter() {
            let cost = heuristic.cost(&graph, v)?;
            let better = match best {
                None => true,
                Some((c, ref b)) => (cost, v) < (c, b)
            };
            if better {
                best = Some((cost, v.clone()));
            }
        }

        let (cost, next) = match best {
            Some(b) => b,
            None => break
        };

        trace!("{}: eliminate {} at cost {}", heuristic, next, cost);

        graph.eliminate(&next)?;
        candidates.shift_remove(&next);
        order.push(next);
    }

    Ok(order)
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::init::Initialization;
    use crate::model::directed::DirectedModelBuilder;

    fn vars(names: &[&str]) -> Vec<Variable> {
        names.iter().map(|n| Variable::binary(n)).collect()
    }

    /// P has two unconnected neighbors (degree 2, fill 1); S sits in a 4-clique (degree 3, fill 0)
    fn degree_versus_fill() -> (Variable, Variable, InteractionGraph) {
        let v = vars(&["P", "Q", "R", "S", "T", "U", "V"]);
        let mut graph = InteractionGraph::new();

        graph.add_edge(&v[0], &v[1]);
        graph.add_edge(&v[0], &v[2]);
        for (i, j) in [(3, 4), (3, 5), (3, 6), (4, 5), (4, 6), (5, 6)].iter() {
            graph.add_edge(&v[*i], &v[*j]);
        }

        (v[0].clone(), v[3].clone(), graph)
    }

    #[test]
    fn chain_min_degree() {
        let v = vars(&["A", "B", "C", "D"]);
        let mut graph = InteractionGraph::new();
        graph.add_edge(&v[0], &v[1]);
        graph.add_edge(&v[1], &v[2]);
        graph.add_edge(&v[2], &v[3]);

        // A and D tie on degree 1; the name breaks the tie
        let order = find_order(graph, &v, Heuristic::MinDegree).unwrap();
        assert_eq!(v, order);
    }

    #[test]
    fn heuristics_differ() {
        let (p, s, graph) = degree_versus_fill();

        let order = find_order(graph.clone(), &[ s.clone(), p.clone() ], Heuristic::MinDegree).unwrap();
        assert_eq!(vec![ p.clone(), s.clone() ], order);

        let order = find_order(graph, &[ p.clone(), s.clone() ], Heuristic::MinFill).unwrap();
        assert_eq!(vec![ s, p ], order);
    }

    #[test]
    /// Koller & Friedman Example 9.3: the extended student network
    fn student_order_is_permutation() {
        let v = vars(&["C", "D", "I", "G", "S", "L", "J", "H"]);
        let (c, d, i, g, s, l, j, h) = (&v[0], &v[1], &v[2], &v[3], &v[4], &v[5], &v[6], &v[7]);

        let model = DirectedModelBuilder::new()
            .with_variable(c, &[], Initialization::Uniform)
            .with_variable(d, &[ c.clone() ], Initialization::Uniform)
            .with_variable(i, &[], Initialization::Uniform)
            .with_variable(g, &[ d.clone(), i.clone() ], Initialization::Uniform)
            .with_variable(s, &[ i.clone() ], Initialization::Uniform)
            .with_variable(l, &[ g.clone() ], Initialization::Uniform)
            .with_variable(j, &[ l.clone(), s.clone() ], Initialization::Uniform)
            .with_variable(h, &[ g.clone(), j.clone() ], Initialization::Uniform)
            .build()
            .unwrap();

        for heuristic in [Heuristic::MinDegree, Heuristic::MinFill].iter() {
            let graph = InteractionGraph::for_model(&model);
            let order = find_order(graph, &v, *heuristic).unwrap();

            assert_eq!(v.len(), order.len());
            assert!(v.iter().all(|x| order.contains(x)));

            // C is the only node of degree 1, and it is simplicial
            assert_eq!(c, &order[0]);
        }
    }

    #[test]
    fn duplicates_and_unknowns() {
        let v = vars(&["A", "B"]);
        let mut graph = InteractionGraph::new();
        graph.add_edge(&v[0], &v[1]);

        let order = find_order(graph.clone(), &[ v[1].clone(), v[1].clone() ], Heuristic::MinFill).unwrap();
        assert_eq!(vec![ v[1].clone() ], order);

        assert!(find_order(graph.clone(), &[], Heuristic::MinDegree).unwrap().is_empty());

        assert_eq!(
            Err(ReasonerError::UnknownVariable(String::from("Z"))),
            find_order(graph, &[ Variable::binary("Z") ], Heuristic::MinDegree)
        );
    }

    #[test]
    fn parse() {
        assert_eq!(Ok(Heuristic::MinDegree), "min-degree".parse());
        assert_eq!(Ok(Heuristic::MinDegree), "MIN".parse());
        assert_eq!(Ok(Heuristic::MinFill), " fill ".parse());
        assert_eq!(Ok(Heuristic::MinFill), Heuristic::MinFill.to_string().parse());
        assert_eq!(Heuristic::MinDegree, Heuristic::default());
        assert_eq!(
            Err(ReasonerError::UnknownHeuristic(String::from("max-card"))),
            "max-card".parse::<Heuristic>()
        );
    }
}
