//! The engine operation surface: configuration, stats, strategies,
//! conflict resolution, tracing, and error kinds.

use syllog::{
    Engine, ProofJson, ProveOptions, SearchStrategy, Substitution, SyllogError, TraceEvent,
};

fn ancestor_engine() -> Engine {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = Engine::new();
    engine.assert_str("[:parent :alice :bob]").unwrap();
    engine.assert_str("[:parent :bob :carol]").unwrap();
    engine
        .add_rule_str("{when [[:parent ?x ?y]], then [[:ancestor ?x ?y]], name base}")
        .unwrap();
    engine
        .add_rule_str(
            "{when [[:ancestor ?x ?y] [:parent ?y ?z]], then [[:ancestor ?x ?z]], name step}",
        )
        .unwrap();
    engine
}

#[test]
fn test_configure_rejects_bad_keys_and_values() {
    let mut engine = Engine::new();
    assert!(matches!(
        engine.configure("no-such-option", "1"),
        Err(SyllogError::Validation(_))
    ));
    assert!(matches!(
        engine.configure("max-depth", "plenty"),
        Err(SyllogError::Validation(_))
    ));
    assert!(engine.configure("strategy", "iterative-deepening").is_ok());
    assert_eq!(
        engine.config().strategy,
        SearchStrategy::IterativeDeepening
    );
}

#[test]
fn test_assert_and_retract_are_idempotent() {
    let mut engine = Engine::new();
    assert!(engine.assert_str("[:p :a]").unwrap());
    assert!(!engine.assert_str("[:p :a]").unwrap());
    assert_eq!(engine.fact_count(), 1);

    assert!(engine.retract_str("[:p :a]").unwrap());
    assert!(!engine.retract_str("[:p :a]").unwrap());
    assert_eq!(engine.fact_count(), 0);
}

#[test]
fn test_malformed_inputs_are_validation_errors() {
    let mut engine = Engine::new();
    assert!(matches!(
        engine.assert_str("42"),
        Err(SyllogError::Validation(_))
    ));
    assert!(matches!(
        engine.assert_str("[]"),
        Err(SyllogError::Validation(_))
    ));
    assert!(matches!(
        engine.assert_str("[:p ?x]"),
        Err(SyllogError::Validation(_))
    ));
    // unsafe rule: consequent variable not bound by any antecedent
    assert!(matches!(
        engine.add_rule_str("{when [[:p ?x]], then [[:q ?z]]}"),
        Err(SyllogError::Validation(_))
    ));
    // missing then
    assert!(matches!(
        engine.add_rule_str("{when [[:p ?x]]}"),
        Err(SyllogError::Validation(_))
    ));
    // syntax errors are a distinct kind
    assert!(matches!(
        engine.assert_str("[:p"),
        Err(SyllogError::Parse(_))
    ));
}

#[test]
fn test_step_limit_is_an_error() {
    let mut engine = ancestor_engine();
    engine.configure("max-steps", "1").unwrap();
    let err = engine.run_forward().unwrap_err();
    assert!(matches!(err, SyllogError::StepLimitExceeded { steps: 1 }));

    // raising the limit recovers
    engine.configure("max-steps", "1000").unwrap();
    assert!(engine.run_forward().is_ok());
}

#[test]
fn test_stats_counters() {
    let mut engine = ancestor_engine();
    let before = engine.stats();
    assert_eq!(before.fact_count, 2);
    assert_eq!(before.rule_count, 2);
    assert_eq!(before.forward_steps, 0);
    assert_eq!(before.proofs_produced, 0);
    assert!(!before.depth_limit_hit);

    engine.run_forward().unwrap();
    let after_forward = engine.stats();
    assert_eq!(after_forward.fact_count, 5);
    assert!(after_forward.forward_steps > 0);

    let proofs = engine.prove_str("[:ancestor :alice ?who]").unwrap();
    let after_prove = engine.stats();
    assert_eq!(after_prove.proofs_produced, proofs.len() as u64);
}

#[test]
fn test_depth_limit_is_silent_but_advisory() {
    let mut engine = Engine::new();
    engine.assert_str("[:parent :alice :bob]").unwrap();
    engine
        .add_rule_str("{when [[:parent ?x ?y]], then [[:ancestor ?x ?y]]}")
        .unwrap();
    engine.configure("max-depth", "0").unwrap();

    // the rule branch needs depth 1, so only pruning happens, no error
    let proofs = engine.prove_str("[:ancestor :alice :bob]").unwrap();
    assert!(proofs.is_empty());
    assert!(engine.stats().depth_limit_hit);
}

#[test]
fn test_prove_one_and_explain() {
    let mut engine = ancestor_engine();

    let goal = engine.parse_term("[:ancestor :alice :carol]").unwrap();
    let proof = engine.prove_one(&goal).unwrap().unwrap();
    assert_eq!(proof.goal(), &goal);

    let explanation = engine.explain(&goal).unwrap().unwrap();
    // alice-to-carol needs the step rule over the base rule
    assert!(explanation.node_count >= 3);
    assert!(explanation.tree_depth >= 2);
    assert!(explanation.rules_used.contains(&"step".to_string()));
    assert!(explanation.rules_used.contains(&"base".to_string()));

    let missing = engine.parse_term("[:ancestor :carol :alice]").unwrap();
    assert!(engine.explain(&missing).unwrap().is_none());
}

#[test]
fn test_strategies_agree_on_answers() {
    let mut engine = ancestor_engine();
    let goal = engine.parse_term("[:ancestor :alice ?who]").unwrap();

    let mut answer_sets = Vec::new();
    for strategy in [
        SearchStrategy::DepthFirst,
        SearchStrategy::BreadthFirst,
        SearchStrategy::IterativeDeepening,
    ] {
        let opts = ProveOptions {
            strategy: Some(strategy),
            ..ProveOptions::default()
        };
        let answers = engine.ask_with(&goal, &opts).unwrap();
        let mut unique: Vec<Vec<_>> = answers.iter().map(Substitution::canonical).collect();
        unique.sort();
        unique.dedup();
        answer_sets.push(unique);
    }
    assert_eq!(answer_sets[0], answer_sets[1]);
    assert_eq!(answer_sets[0], answer_sets[2]);
    // both reachable descendants answer the query
    assert_eq!(answer_sets[0].len(), 2);
}

#[test]
fn test_ask_limit() {
    let mut engine = Engine::new();
    engine.assert_str("[:person :alice]").unwrap();
    engine.assert_str("[:person :bob]").unwrap();
    engine.assert_str("[:person :carol]").unwrap();

    let goal = engine.parse_term("[:person ?who]").unwrap();
    let answers = engine.ask_with(&goal, &ProveOptions::limited(2)).unwrap();
    assert_eq!(answers.len(), 2);
}

#[test]
fn test_priority_orders_firing() {
    let mut engine = Engine::new();
    engine.configure("trace", "true").unwrap();
    engine.assert_str("[:input :x]").unwrap();
    engine
        .add_rule_str("{when [[:input ?v]], then [[:low ?v]], name low, priority 1}")
        .unwrap();
    engine
        .add_rule_str("{when [[:input ?v]], then [[:high ?v]], name high, priority 9}")
        .unwrap();

    engine.run_forward().unwrap();
    let fired: Vec<String> = engine
        .take_trace()
        .into_iter()
        .filter_map(|event| match event {
            TraceEvent::ActivationFired { rule_name, .. } => rule_name,
            _ => None,
        })
        .collect();
    assert_eq!(fired, vec!["high".to_string(), "low".to_string()]);
}

#[test]
fn test_random_conflict_resolution_is_reproducible() {
    let run = |seed: &str| -> Vec<String> {
        let mut engine = Engine::new();
        engine.configure("trace", "true").unwrap();
        engine.configure("conflict-resolution", "random").unwrap();
        engine.configure("random-seed", seed).unwrap();
        engine.assert_str("[:input :x]").unwrap();
        for name in ["a", "b", "c", "d"] {
            engine
                .add_rule_str(&format!(
                    "{{when [[:input ?v]], then [[:{name} ?v]], name {name}}}"
                ))
                .unwrap();
        }
        engine.run_forward().unwrap();
        engine
            .take_trace()
            .into_iter()
            .filter_map(|event| match event {
                TraceEvent::ActivationFired { rule_name, .. } => rule_name,
                _ => None,
            })
            .collect()
    };

    assert_eq!(run("7"), run("7"));
}

#[test]
fn test_trace_buffer_gated_by_config() {
    let mut engine = ancestor_engine();
    engine.run_forward().unwrap();
    assert!(engine.trace_events().is_empty());

    let mut traced = ancestor_engine();
    traced.configure("trace", "true").unwrap();
    traced.run_forward().unwrap();
    let events = traced.take_trace();
    assert!(events
        .iter()
        .any(|event| matches!(event, TraceEvent::FixedPoint { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, TraceEvent::FactAsserted { .. })));
    // draining empties the buffer
    assert!(traced.trace_events().is_empty());
}

#[test]
fn test_proof_json_export() {
    let mut engine = ancestor_engine();
    let goal = engine.parse_term("[:ancestor :alice :carol]").unwrap();
    let proof = engine.prove_one(&goal).unwrap().unwrap();

    let json = ProofJson::from_proof(&proof, engine.interner());
    let text = serde_json::to_string_pretty(&json).unwrap();
    assert!(text.contains("\"kind\""));
    assert!(text.contains("ancestor"));

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["kind"], "rule");
}

#[test]
fn test_clear_keeps_rules_and_config() {
    let mut engine = ancestor_engine();
    engine.configure("max-depth", "3").unwrap();
    engine.run_forward().unwrap();
    engine.clear();

    assert_eq!(engine.fact_count(), 0);
    assert_eq!(engine.rules().len(), 2);
    assert_eq!(engine.config().max_depth, 3);
}
