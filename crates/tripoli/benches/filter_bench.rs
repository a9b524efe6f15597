// Criterion benchmarks for grammar reachability and the composition filter.
//
// The grammar is synthetic: a chain of non-terminals, each rewriting to the
// next, whose tail fans out to every pre-terminal. Queries from the head of
// the chain walk its whole length on a cold memo.
//
// Run:
//   cargo bench -p tripoli

use std::sync::Arc;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tripoli::{FilterState, Grammar, PdtInfo, TripoliFilter};
use tripoli_core::{StateInfo, Symbol};
use tripoli_fst::compose::{ComposeFilter, ComposeOptions, compose};
use tripoli_fst::parens::Parens;
use tripoli_fst::{Arc as LatticeArc, RuleArc, VectorFst};

const MAX_TERM: Symbol = 50;
const CHAIN: Symbol = 300;

// ---------------------------------------------------------------------------
// Synthetic model
// ---------------------------------------------------------------------------

fn chain_grammar() -> Grammar {
    let max_preterm = 2 * MAX_TERM;
    let max_nonterm = max_preterm + CHAIN;
    let mut rules = Vec::new();
    for nt in max_preterm + 1..max_nonterm {
        rules.push(vec![nt, nt + 1]);
    }
    for pt in MAX_TERM + 1..=max_preterm {
        rules.push(vec![max_nonterm, pt]);
        rules.push(vec![pt, pt - MAX_TERM]);
    }
    let labels = (0..=MAX_TERM).map(|l| if l == 0 { -1 } else { l }).collect();
    Grammar::new(MAX_TERM, max_preterm, max_nonterm, rules, labels).expect("chain grammar")
}

// One unigram state with an arc per terminal, each applying rule 0 (the head
// of the chain), plus a dummy end state.
fn unigram_pdt() -> VectorFst<RuleArc> {
    let mut pdt = VectorFst::new();
    let start = pdt.add_state();
    let end = pdt.add_state();
    for term in 1..=MAX_TERM {
        pdt.add_arc(start, RuleArc::new(term, term, 1.0, end, 0))
            .expect("state exists");
    }
    pdt.add_arc(end, RuleArc::new(0, 0, 0.0, start, -1))
        .expect("state exists");
    pdt.set_start(start).expect("state exists");
    pdt.set_final(end, 0.0).expect("state exists");
    pdt
}

fn sentence_lattice(words: usize) -> VectorFst<LatticeArc> {
    let mut lattice = VectorFst::new();
    let mut prev = lattice.add_state();
    lattice.set_start(prev).expect("state exists");
    for i in 0..words {
        let next = lattice.add_state();
        for alt in 0..3 {
            let term = ((i * 7 + alt * 13) as Symbol % MAX_TERM) + 1;
            lattice
                .add_arc(prev, LatticeArc::new(term, term, 0.5, next))
                .expect("state exists");
        }
        prev = next;
    }
    lattice.set_final(prev, 0.0).expect("state exists");
    lattice
}

fn chain_filter() -> TripoliFilter<VectorFst<RuleArc>> {
    let info = PdtInfo::new(
        Arc::new(chain_grammar()),
        unigram_pdt(),
        vec![StateInfo::unigram(), StateInfo::dummy()],
    )
    .expect("PDT info");
    TripoliFilter::new(Arc::new(info))
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Reachability from the head of the chain for every terminal, memo cold.
fn bench_reach_cold(c: &mut Criterion) {
    let head = 2 * MAX_TERM + 1;
    c.bench_function("reach_cold_all_terms", |b| {
        b.iter_batched(
            chain_grammar,
            |g| {
                for term in 1..=MAX_TERM {
                    std::hint::black_box(g.symbol_can_reach(head, term).ok());
                }
            },
            BatchSize::SmallInput,
        );
    });
}

/// The same queries once the memo is filled.
fn bench_reach_warm(c: &mut Criterion) {
    let g = chain_grammar();
    g.precompute_reachability();
    let head = 2 * MAX_TERM + 1;
    c.bench_function("reach_warm_all_terms", |b| {
        b.iter(|| {
            for term in 1..=MAX_TERM {
                std::hint::black_box(g.symbol_can_reach(head, term).ok());
            }
        });
    });
}

fn bench_precompute(c: &mut Criterion) {
    c.bench_function("precompute_reachability", |b| {
        b.iter_batched(
            chain_grammar,
            |g| g.precompute_reachability(),
            BatchSize::SmallInput,
        );
    });
}

/// filter_arc on every (word, rule) pair of the unigram state.
fn bench_filter_arc(c: &mut Criterion) {
    let mut filter = chain_filter();
    filter.info().grammar().precompute_reachability();
    filter.set_state(0, 0, &FilterState::start());
    let arcs: Vec<RuleArc> = (1..=MAX_TERM)
        .map(|t| RuleArc::new(t, t, 1.0, 1, 0))
        .collect();
    let words: Vec<LatticeArc> = (1..=MAX_TERM)
        .map(|t| LatticeArc::new(t, t, 0.0, 1))
        .collect();

    c.bench_function("filter_arc_50x50", |b| {
        b.iter(|| {
            for w in &words {
                for a in &arcs {
                    std::hint::black_box(filter.filter_arc(w, a));
                }
            }
        });
    });
}

/// Full composition of a 20-word, 3-way ambiguous lattice.
fn bench_compose(c: &mut Criterion) {
    let filter = chain_filter();
    filter.info().grammar().precompute_reachability();
    let lattice = sentence_lattice(20);
    let parens = Parens::new();
    let options = ComposeOptions::default();

    c.bench_function("compose_20_words", |b| {
        b.iter(|| {
            let mut f = filter.clone();
            std::hint::black_box(
                compose(&lattice, filter.info().pdt(), &parens, &mut f, &options).ok(),
            );
        });
    });
}

criterion_group!(
    benches,
    bench_reach_cold,
    bench_reach_warm,
    bench_precompute,
    bench_filter_arc,
    bench_compose,
);
criterion_main!(benches);
