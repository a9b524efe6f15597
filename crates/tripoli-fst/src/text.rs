// Text-format compilers for lattices and PDTs.
//
// One entry per line, fields separated by whitespace:
//   lattice arc:  src dst ilabel olabel [weight]
//   PDT arc:      src dst ilabel olabel rule [weight]
//   final state:  state [weight]
// The source state of the first entry is the start state. Blank lines and
// lines starting with `#` are skipped. Missing weights are 0.

use std::io::{BufRead, Write};
use std::str::FromStr;

use tripoli_core::{Label, RuleId, RuleKind, StateId};

use crate::{Arc, Automaton, FstError, RuleArc, VectorFst, Weight};

/// How far past the states seen so far a state id may jump.
const MAX_STATE_GAP: usize = 1 << 20;

/// Compile a lattice from text.
pub fn compile_lattice<R: BufRead>(reader: R) -> Result<VectorFst<Arc>, FstError> {
    compile_with(reader, false, |ilabel, olabel, weight, nextstate, _| {
        Arc::new(ilabel, olabel, weight, nextstate)
    })
}

/// Compile a PDT (arcs carry a rule-id column) from text.
pub fn compile_pdt<R: BufRead>(reader: R) -> Result<VectorFst<RuleArc>, FstError> {
    compile_with(reader, true, RuleArc::new)
}

/// Write a PDT in the format read by [`compile_pdt`].
///
/// The start state's arcs are written first so that the output compiles back
/// to an automaton with the same start state.
pub fn write_pdt<W: Write + ?Sized>(fst: &VectorFst<RuleArc>, out: &mut W) -> std::io::Result<()> {
    let Some(start) = fst.start() else {
        return Ok(());
    };
    let order = std::iter::once(start).chain(fst.states().filter(|&s| s != start));
    for state in order {
        for arc in fst.arcs(state) {
            writeln!(
                out,
                "{state}\t{}\t{}\t{}\t{}\t{}",
                arc.nextstate, arc.ilabel, arc.olabel, arc.rule, arc.weight
            )?;
        }
        if let Some(w) = fst.final_weight(state) {
            writeln!(out, "{state}\t{w}")?;
        }
    }
    Ok(())
}

fn compile_with<R, A, F>(reader: R, with_rule: bool, make_arc: F) -> Result<VectorFst<A>, FstError>
where
    R: BufRead,
    F: Fn(Label, Label, Weight, StateId, RuleId) -> A,
{
    let arc_fields = if with_rule { 5 } else { 4 };
    let mut fst = VectorFst::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let nline = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || fields[0].starts_with('#') {
            continue;
        }

        let src: StateId = parse_state(fields[0], nline, fst.num_states())?;
        fst.ensure_state(src);
        if fst.start().is_none() {
            fst.set_start(src)?;
        }

        match fields.len() {
            1 | 2 => {
                let weight = match fields.get(1) {
                    Some(w) => parse_field(w, nline, "weight")?,
                    None => 0.0,
                };
                fst.set_final(src, weight)?;
            }
            n if n == arc_fields || n == arc_fields + 1 => {
                let dst = parse_state(fields[1], nline, fst.num_states())?;
                let ilabel = parse_label(fields[2], nline)?;
                let olabel = parse_label(fields[3], nline)?;
                let rule: RuleId = if with_rule {
                    let rule = parse_field(fields[4], nline, "rule-id")?;
                    if let RuleKind::Invalid(r) = RuleKind::from_raw(rule) {
                        return Err(FstError::parse(nline, format!("invalid rule-id {r}")));
                    }
                    rule
                } else {
                    tripoli_core::rule_kind::DUMMY_ARC
                };
                let weight = match fields.get(arc_fields) {
                    Some(w) => parse_field(w, nline, "weight")?,
                    None => 0.0,
                };
                fst.ensure_state(dst);
                fst.add_arc(src, make_arc(ilabel, olabel, weight, dst, rule))?;
            }
            n => {
                return Err(FstError::parse(
                    nline,
                    format!("expected 1, 2, {} or {} fields, got {n}", arc_fields, arc_fields + 1),
                ));
            }
        }
    }

    Ok(fst)
}

fn parse_field<T: FromStr>(field: &str, line: usize, what: &str) -> Result<T, FstError> {
    field
        .parse()
        .map_err(|_| FstError::parse(line, format!("invalid {what} '{field}'")))
}

fn parse_state(field: &str, line: usize, num_states: usize) -> Result<StateId, FstError> {
    let state: StateId = parse_field(field, line, "state")?;
    if state < 0 {
        return Err(FstError::parse(line, format!("negative state {state}")));
    }
    if state as usize > num_states + MAX_STATE_GAP {
        return Err(FstError::parse(
            line,
            format!("state {state} is too far past the {num_states} states seen so far"),
        ));
    }
    Ok(state)
}

fn parse_label(field: &str, line: usize) -> Result<Label, FstError> {
    let label: Label = parse_field(field, line, "label")?;
    if label < 0 {
        return Err(FstError::parse(line, format!("negative label {label}")));
    }
    Ok(label)
}
