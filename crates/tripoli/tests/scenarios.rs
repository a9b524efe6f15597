//! Behavioral scenarios for the readers, the grammar and the filter.
//!
//! Run: cargo test -p tripoli --test scenarios

use std::sync::Arc;

use tripoli::grammar::RuleDefect;
use tripoli::pdt_info::RuleSet;
use tripoli::readers::read_states;
use tripoli::{FilterState, Grammar, GrammarError, PdtInfo, TripoliFilter};
use tripoli_core::{StateInfo, StateTag};
use tripoli_fst::compose::{ComposeFilter, FilterOutcome};
use tripoli_fst::text::compile_pdt;
use tripoli_fst::{Arc as LatticeArc, RuleArc, VectorFst};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Filter = TripoliFilter<VectorFst<RuleArc>>;

fn filter_for(grammar: Grammar, pdt: &str, infos: Vec<StateInfo>) -> Filter {
    let pdt = compile_pdt(pdt.as_bytes()).expect("PDT text");
    let info = PdtInfo::new(Arc::new(grammar), pdt, infos).expect("PDT info");
    TripoliFilter::new(Arc::new(info))
}

fn word(label: i32) -> LatticeArc {
    LatticeArc::new(label, label, 0.0, 1)
}

fn rule_arc(ilabel: i32, rule: i32) -> RuleArc {
    RuleArc::new(ilabel, ilabel, 0.0, 1, rule)
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

#[test]
fn trigram_state_line() {
    let states = read_states("1 0 100 200".as_bytes()).unwrap();
    assert_eq!(states, vec![StateInfo::trigram(100, 200)]);
    assert_eq!(states[0].tag, StateTag::Trigram);
    assert_eq!(states[0].fst, Some(100));
    assert_eq!(states[0].snd, Some(200));
}

#[test]
fn bigram_state_line() {
    let states = read_states("1 1 100".as_bytes()).unwrap();
    assert_eq!(states[0].tag, StateTag::Bigram);
    assert_eq!(states[0].fst, None);
    assert_eq!(states[0].snd, Some(100));
}

// ---------------------------------------------------------------------------
// Grammar validation
// ---------------------------------------------------------------------------

#[test]
fn unary_production_must_match_its_preterminal() {
    let ok = Grammar::new(3, 6, 10, vec![vec![4, 1]], vec![-1, 1, 2, 3]);
    assert!(ok.is_ok());

    let err = Grammar::new(3, 6, 10, vec![vec![4, 2]], vec![-1, 1, 2, 3]).unwrap_err();
    assert_eq!(
        err,
        GrammarError::InvalidRule {
            index: 0,
            defect: RuleDefect::MismatchedPreterminal {
                preterm: 4,
                term: 2
            },
        }
    );
}

// ---------------------------------------------------------------------------
// Filter decisions
// ---------------------------------------------------------------------------

#[test]
fn disallowed_rule_is_rejected_even_when_reachable() {
    // r0: 7 -> 4 reaches terminal 1
    let rules = vec![vec![7, 4], vec![4, 1]];
    let grammar = Grammar::new(3, 6, 10, rules, vec![-1, 1, 2, 3]).unwrap();
    let infos = vec![StateInfo::unigram(), StateInfo::dummy()];
    let mut filter = filter_for(grammar, "0 1 1 1 0\n1\n", infos);

    filter.set_state(0, 0, &FilterState::start());
    assert!(!filter.filter_arc(&word(1), &rule_arc(1, 0)).is_rejected());

    let banned = FilterState::start().add_state(5, &RuleSet::from([0]));
    filter.set_state(0, 0, &banned);
    assert_eq!(filter.filter_arc(&word(1), &rule_arc(1, 0)), FilterOutcome::Rejected);
}

#[test]
fn unreachable_rule_is_accepted_after_adding_a_chain() {
    const PDT: &str = "0 1 1 1 0\n1\n";
    let infos = vec![StateInfo::unigram(), StateInfo::dummy()];
    // r0: 7 -> 8, and 8 has no rules yet
    let rules = vec![vec![7, 8], vec![4, 1]];

    let grammar = Arc::new(Grammar::new(3, 6, 10, rules.clone(), vec![-1, 1, 2, 3]).unwrap());
    {
        let pdt = compile_pdt(PDT.as_bytes()).unwrap();
        let info = PdtInfo::new(Arc::clone(&grammar), pdt, infos.clone()).unwrap();
        let mut filter = TripoliFilter::new(Arc::new(info));
        filter.set_state(0, 0, &FilterState::start());
        assert!(filter.filter_arc(&word(1), &rule_arc(1, 0)).is_rejected());
    }

    let mut grammar = Arc::into_inner(grammar).expect("no other owners");
    let mut extended = rules;
    extended.push(vec![8, 4]);
    grammar.set_rules(extended).unwrap();

    let mut filter = filter_for(grammar, PDT, infos);
    filter.set_state(0, 0, &FilterState::start());
    assert!(!filter.filter_arc(&word(1), &rule_arc(1, 0)).is_rejected());
}

#[test]
fn lexical_backoff_from_trigram_disallows_its_rules() {
    let rules = vec![
        vec![7, 4, 8],
        vec![8, 5],
        vec![9, 10],
        vec![4, 1],
        vec![10, 9],
        vec![7, 8],
        vec![8, 6],
        vec![7, 4],
    ];
    let grammar = Grammar::new(3, 6, 10, rules, vec![-1, 1, 2, 3]).unwrap();
    let pdt = "\
0 2 1 1 5
0 2 1 1 7
0 1 0 0 -3
1 2 1 1 3
2
";
    let infos = vec![StateInfo::trigram(1, 2), StateInfo::unigram(), StateInfo::dummy()];
    let mut filter = filter_for(grammar, pdt, infos);

    let before = FilterState::start();
    filter.set_state(0, 0, &before);
    let backoff = RuleArc::new(0, 0, 0.0, 1, -3);
    let after = filter
        .filter_arc(&LatticeArc::epsilon_loop(0), &backoff)
        .into_active()
        .expect("backoff is never rejected");

    assert_eq!(after.disallowed(), &RuleSet::from([5, 7]));
    assert_eq!(after.states().len(), before.states().len() + 1);
    assert_eq!(after.states(), &[0]);
    assert!(after.labels().is_empty());
}
