//! Provides an example of how to use bnreasoner to perform exact inference on a Bayesian Network.
//!
//! Usage: `cargo run --example inference [min-degree|min-fill]`, with `RUST_LOG=debug` to follow
//! the pruning and elimination steps.

use bnreasoner as bn;
use bn::{ConditionalInferenceEngine, MapInferenceEngine};
use ndarray::array;

use std::env;

fn main() -> bn::Result<()> {
    env_logger::init();

    let heuristic: bn::Heuristic = match env::args().nth(1) {
        Some(name) => name.parse()?,
        None => bn::Heuristic::default()
    };

    let difficulty = bn::Variable::binary("D");
    let intelligence = bn::Variable::binary("I");
    let grade = bn::Variable::discrete("G", 3);
    let sat = bn::Variable::binary("S");
    let letter = bn::Variable::binary("L");

    let scope = StudentVariables(difficulty.clone(), intelligence.clone(), grade.clone(), sat.clone(), letter.clone());

    /////////////////////////////////////////////////////
    // Step 1: Build Model
    let model = build_model(scope)?;

    /////////////////////////////////////////////////////
    // Step 2: Compile some evidence
    let mut evidence = bn::Assignment::new();
    evidence.set(&difficulty, 0);
    evidence.set(&letter, 1);
    evidence.set(&sat, 0);

    /////////////////////////////////////////////////////
    // Step 3: Build an inference engine
    let engine = bn::VariableEliminationEngine::with_heuristic(&model, heuristic);
    println!("Using the {} heuristic", heuristic);

    /////////////////////////////////////////////////////
    // Step 4: Run a Conditional Query
    let query = vec![ intelligence.clone() ];
    let p = engine.infer(&query, &evidence)?;

    for assignment in bn::variable::all_assignments(&query) {
        println!("P(I = {} | {}) = {:.4}", assignment.get(&intelligence).unwrap_or(&0), evidence, p.value(&assignment)?);
    }

    /////////////////////////////////////////////////////
    // Step 5: MAP and MPE
    let best_grade = engine.infer_map(&[ grade.clone() ], &evidence)?;
    println!("MAP(G | {}) = {}", evidence, best_grade);

    let explanation = engine.mpe(&evidence)?;
    println!("MPE({}) = {}", evidence, explanation);

    /////////////////////////////////////////////////////
    // Step 6: Independence
    let separated = engine.d_separated(&[ difficulty.clone() ], &[ sat.clone() ], &[])?;
    println!("D _|_ S: {}", separated);

    let separated = engine.d_separated(&[ difficulty ], &[ sat ], &[ letter ])?;
    println!("D _|_ S | L: {}", separated);

    Ok(())
}

struct StudentVariables(bn::Variable, bn::Variable, bn::Variable, bn::Variable, bn::Variable);

fn build_model(vars: StudentVariables) -> bn::Result<bn::DirectedModel> {
    let StudentVariables(d, i, g, s, l) = vars;

    ///////////////////////////////////////////////////
    // Step 1: Build CPTs for variables with parents
    let cpt_g = bn::Factor::cpd(
        g.clone(),
        vec![ i.clone(), d.clone() ],
        array![
            [[0.3, 0.4, 0.3], [0.05, 0.25, 0.7]],
            [[0.9, 0.08, 0.02], [0.5, 0.3, 0.2]]
        ].into_dyn()
    )?;

    let cpt_s = bn::Factor::cpd(
        s.clone(),
        vec![ i.clone() ],
        array![
            [0.95, 0.05],
            [0.2, 0.8]
        ].into_dyn()
    )?;

    let cpt_l = bn::Factor::cpd(
        l.clone(),
        vec![ g.clone() ],
        array![
            [0.1, 0.9],
            [0.4, 0.6],
            [0.99, 0.01]
        ].into_dyn()
    )?;

    ///////////////////////////////////////////////////
    // Step 2: Build the Model
    bn::DirectedModelBuilder::new()
        .with_variable(&d, &[], bn::Initialization::Binomial(0.6))
        .with_variable(&i, &[], bn::Initialization::Binomial(0.7))
        .with_variable(&g, &[ i.clone(), d.clone() ], bn::Initialization::Table(cpt_g))
        .with_variable(&s, &[ i.clone() ], bn::Initialization::Table(cpt_s))
        .with_variable(&l, &[ g.clone() ], bn::Initialization::Table(cpt_l))
        .build()
}
