// tripoli-check: Load a model and print a summary of it.
//
// Reads the grammar, the PDT and its state annotations, builds the rule
// indices the composition filter uses, and reports their sizes. Exits with
// code 1 if anything fails to load or validate, or if a PDT arc names a
// rule the grammar does not have, or a parenthesis and its partner map to
// different grammar symbols.
//
// Usage:
//   tripoli-check [-m MODEL_DIR] [--precompute]
//
// Options:
//   -m, --model PATH   Model directory containing pdt.txt and friends
//   --precompute       Also fill the reachability memo for every symbol pair
//   -h, --help         Print help

use std::time::Instant;

use tripoli_core::RuleKind;
use tripoli_fst::Automaton;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (model_path, args) = tripoli_cli::parse_model_path(&args);
    let (precompute, args) = tripoli_cli::take_flag(&args, "--precompute");

    if tripoli_cli::wants_help(&args) {
        println!("tripoli-check: Load and validate a Tripoli model.");
        println!();
        println!("Usage: tripoli-check [-m MODEL_DIR] [--precompute]");
        println!();
        println!("The model directory holds symbols.txt, rules.txt, labels.txt,");
        println!("pdt.txt, states.txt and optionally parens.txt.");
        println!();
        println!("Options:");
        println!("  -m, --model PATH   Model directory (default: $TRIPOLI_MODEL_PATH or .)");
        println!("  --precompute       Precompute grammar reachability");
        println!("  -h, --help         Print this help");
        return;
    }
    if let Some(extra) = args.first() {
        tripoli_cli::fatal(&format!("unexpected argument '{extra}'"));
    }

    tripoli_cli::init_logging();
    let model = tripoli_cli::load_model(model_path.as_deref())
        .unwrap_or_else(|e| tripoli_cli::fatal(&e));
    let info = &model.info;
    let grammar = info.grammar();
    let pdt = info.pdt();

    println!("model:          {}", model.dir.display());
    println!(
        "symbols:        {} terminals, {} pre-terminals, {} non-terminals",
        grammar.max_term(),
        grammar.max_preterm() - grammar.max_term(),
        grammar.max_nonterm() - grammar.max_preterm()
    );
    println!("rules:          {}", grammar.num_rules());
    println!("labels:         {}", grammar.labels_to_symbols().len());
    println!("PDT:            {} states, {} arcs", pdt.num_states(), pdt.num_arcs());
    println!("context states: {}", info.num_context_states());
    println!("parentheses:    {} pairs", model.parens.len());

    let unknown: Vec<_> = pdt
        .states()
        .flat_map(|s| pdt.arcs(s).iter().map(move |a| (s, a)))
        .filter(|(_, a)| match a.kind() {
            RuleKind::Rule(r) => grammar.rule(r).is_none(),
            _ => false,
        })
        .collect();

    if precompute {
        let started = Instant::now();
        grammar.precompute_reachability();
        println!("reachability:   precomputed in {:.1?}", started.elapsed());
    }

    for (state, arc) in unknown.iter().take(10) {
        eprintln!(
            "state {state}: arc to {} uses unknown rule {}",
            arc.nextstate, arc.rule
        );
    }
    let mismatched = tripoli_cli::mismatched_parens(&model);
    for (label, partner) in &mismatched {
        eprintln!("parenthesis {label} and its partner {partner} name different symbols");
    }
    if !unknown.is_empty() {
        tripoli_cli::fatal(&format!("{} arcs use rules missing from the grammar", unknown.len()));
    }
    if !mismatched.is_empty() {
        tripoli_cli::fatal(&format!("{} parenthesis labels are inconsistent", mismatched.len()));
    }
    println!("ok");
}
