// Grammar file readers: rules, numbered symbols and arc labels.

use std::io::BufRead;

use tripoli_core::{NO_SYMBOL, Symbol};

use super::ReadError;
use crate::grammar::{Grammar, Rule};

/// Largest run of missing numbers allowed between two entries.
const MAX_NUMBER_GAP: usize = 1 << 16;

/// Read rows of whitespace-separated integers, one row per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_int_vectors<R: BufRead>(reader: R) -> Result<Vec<Vec<i32>>, ReadError> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let nline = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || fields[0].starts_with('#') {
            continue;
        }
        let row = fields
            .iter()
            .map(|f| {
                f.parse()
                    .map_err(|_| ReadError::parse(nline, format!("invalid integer '{f}'")))
            })
            .collect::<Result<Vec<i32>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read `<n> <string>` lines into a vector indexed by `n`.
///
/// Numbers must be strictly increasing; skipped numbers get empty strings,
/// up to a run of [`MAX_NUMBER_GAP`]. Blank lines are skipped.
pub fn read_numbered_strings<R: BufRead>(reader: R) -> Result<Vec<String>, ReadError> {
    let mut strings = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let nline = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (num, text) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));
        let n: usize = num
            .parse()
            .map_err(|_| ReadError::parse(nline, format!("invalid number '{num}'")))?;
        if n < strings.len() {
            return Err(ReadError::parse(
                nline,
                format!("number {n} is not greater than {}", strings.len() - 1),
            ));
        }
        if n - strings.len() > MAX_NUMBER_GAP {
            return Err(ReadError::parse(
                nline,
                format!("number {n} skips more than {MAX_NUMBER_GAP} entries"),
            ));
        }
        strings.resize(n, String::new());
        strings.push(text.trim().to_string());
    }
    Ok(strings)
}

/// Derive `(max_term, max_preterm, max_nonterm)` from a numbered symbol list.
///
/// Index 0 is epsilon. Terminals come first, then one pre-terminal per
/// terminal, named like the terminal with a leading `_` and in the same
/// order, then the non-terminals.
pub fn read_symbol_bounds(symbols: &[String]) -> Result<(Symbol, Symbol, Symbol), ReadError> {
    let mut max_term: Option<usize> = None;
    let mut max_preterm: Option<usize> = None;

    for (i, sym) in symbols.iter().enumerate().skip(1) {
        match (sym.strip_prefix('_'), max_term, max_preterm) {
            (Some(_), _, Some(_)) => {
                return Err(ReadError::SymbolFile(format!(
                    "pre-terminal '{sym}' at {i} follows the non-terminals"
                )));
            }
            (Some(name), _, None) => {
                let mt = *max_term.get_or_insert(i - 1);
                let term = symbols.get(i - mt).filter(|_| i - mt >= 1);
                if term.map(String::as_str) != Some(name) {
                    return Err(ReadError::SymbolFile(format!(
                        "pre-terminal '{sym}' at {i} does not match terminal {}",
                        i - mt
                    )));
                }
            }
            (None, Some(_), None) => max_preterm = Some(i - 1),
            (None, _, _) => {}
        }
    }

    match (max_term, max_preterm) {
        (Some(mt), Some(mp)) if mp != 2 * mt => Err(ReadError::SymbolFile(format!(
            "{} pre-terminals for {mt} terminals",
            mp - mt
        ))),
        (Some(mt), Some(mp)) => Ok((mt as Symbol, mp as Symbol, (symbols.len() - 1) as Symbol)),
        (None, _) => Err(ReadError::SymbolFile("no pre-terminals found".to_string())),
        (Some(_), None) => Err(ReadError::SymbolFile("no non-terminals found".to_string())),
    }
}

/// Build the label-to-symbol table from a numbered label list.
///
/// Label 0 maps to [`NO_SYMBOL`]. Plain labels are terminals and map to
/// themselves. Labels starting with `+` or `-` are parenthesis labels; they
/// must come after the terminals and end in `P<symbol>`, naming the symbol
/// they push or pop.
pub fn read_label_map(labels: &[String], max_term: Symbol) -> Result<Vec<Symbol>, ReadError> {
    let mut table = vec![NO_SYMBOL];
    for (i, label) in labels.iter().enumerate().skip(1) {
        let is_paren = label.starts_with('+') || label.starts_with('-');
        let is_term_index = i as Symbol <= max_term;
        if !is_paren {
            if !is_term_index {
                return Err(ReadError::LabelFile {
                    label: i,
                    message: format!("plain label '{label}' beyond the terminals"),
                });
            }
            table.push(i as Symbol);
            continue;
        }
        if is_term_index {
            return Err(ReadError::LabelFile {
                label: i,
                message: format!("parenthesis label '{label}' among the terminals"),
            });
        }
        let symbol = label
            .rfind('P')
            .and_then(|p| label[p + 1..].parse::<Symbol>().ok())
            .ok_or_else(|| ReadError::LabelFile {
                label: i,
                message: format!("parenthesis label '{label}' names no symbol"),
            })?;
        table.push(symbol);
    }
    Ok(table)
}

/// Read a grammar from its symbol, rule and label files.
pub fn read_grammar<S, R, L>(symbols: S, rules: R, labels: L) -> Result<Grammar, ReadError>
where
    S: BufRead,
    R: BufRead,
    L: BufRead,
{
    let rules: Vec<Rule> = read_int_vectors(rules)?;
    let symbols = read_numbered_strings(symbols)?;
    let (max_term, max_preterm, max_nonterm) = read_symbol_bounds(&symbols)?;
    let labels = read_numbered_strings(labels)?;
    let labels_to_symbols = read_label_map(&labels, max_term)?;
    Ok(Grammar::new(
        max_term,
        max_preterm,
        max_nonterm,
        rules,
        labels_to_symbols,
    )?)
}
