// tripoli-cli: shared utilities for CLI tools.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use tripoli::PdtInfo;
use tripoli::readers::{read_grammar, read_states};
use tripoli_core::Label;
use tripoli_fst::parens::{Parens, read_parens};
use tripoli_fst::text::compile_pdt;
use tripoli_fst::{Automaton, RuleArc, VectorFst};

/// Numbered grammar symbols.
const SYMBOLS_FILE: &str = "symbols.txt";

/// Grammar rules, one per line.
const RULES_FILE: &str = "rules.txt";

/// Numbered PDT arc labels.
const LABELS_FILE: &str = "labels.txt";

/// The PDT in text format.
const PDT_FILE: &str = "pdt.txt";

/// One state annotation per PDT state.
const STATES_FILE: &str = "states.txt";

/// Parenthesis label pairs. Optional.
const PARENS_FILE: &str = "parens.txt";

/// A loaded model: the indexed PDT with its grammar, and its parentheses.
pub struct Model {
    pub dir: PathBuf,
    pub info: Arc<PdtInfo<VectorFst<RuleArc>>>,
    pub parens: Parens,
}

/// Search for a model directory and load it.
///
/// Search order:
/// 1. `model_path` argument (if provided)
/// 2. `TRIPOLI_MODEL_PATH` environment variable
/// 3. Current working directory
///
/// The first directory containing the PDT file is used.
pub fn load_model(model_path: Option<&str>) -> Result<Model, String> {
    let search_paths = build_search_paths(model_path);

    for dir in &search_paths {
        if dir.join(PDT_FILE).is_file() {
            return load_model_from(dir);
        }
    }

    Err(format!(
        "could not find {} in any of the search paths:\n{}",
        PDT_FILE,
        search_paths
            .iter()
            .map(|p| format!("  - {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n")
    ))
}

fn load_model_from(dir: &Path) -> Result<Model, String> {
    let grammar = read_grammar(
        open(&dir.join(SYMBOLS_FILE))?,
        open(&dir.join(RULES_FILE))?,
        open(&dir.join(LABELS_FILE))?,
    )
    .map_err(|e| format!("failed to read grammar in {}: {e}", dir.display()))?;

    let pdt_path = dir.join(PDT_FILE);
    let pdt = compile_pdt(open(&pdt_path)?)
        .map_err(|e| format!("failed to compile {}: {e}", pdt_path.display()))?;

    let states_path = dir.join(STATES_FILE);
    let states = read_states(open(&states_path)?)
        .map_err(|e| format!("failed to read {}: {e}", states_path.display()))?;

    let parens_path = dir.join(PARENS_FILE);
    let parens = if parens_path.is_file() {
        read_parens(open(&parens_path)?)
            .map_err(|e| format!("failed to read {}: {e}", parens_path.display()))?
    } else {
        Parens::new()
    };

    let info = PdtInfo::new(Arc::new(grammar), pdt, states)
        .map_err(|e| format!("invalid model in {}: {e}", dir.display()))?;
    info!(dir = %dir.display(), "model loaded");

    Ok(Model {
        dir: dir.to_path_buf(),
        info: Arc::new(info),
        parens,
    })
}

/// Parenthesis labels on PDT arcs whose partner pushes or pops a different
/// grammar symbol, as `(label, partner)` pairs.
pub fn mismatched_parens(model: &Model) -> Vec<(Label, Label)> {
    let grammar = model.info.grammar();
    let pdt = model.info.pdt();
    let used: BTreeSet<Label> = pdt
        .states()
        .flat_map(|s| pdt.arcs(s).iter().map(|a| a.ilabel))
        .filter(|&l| model.parens.is_paren(l))
        .collect();
    used.into_iter()
        .filter_map(|l| model.parens.matching(l).map(|m| (l, m)))
        .filter(|&(l, m)| match (grammar.label_to_symbol(l), grammar.label_to_symbol(m)) {
            (Ok(a), Ok(b)) => a != b,
            _ => true,
        })
        .collect()
}

/// Open a file for buffered reading.
pub fn open(path: &Path) -> Result<BufReader<File>, String> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| format!("failed to open {}: {e}", path.display()))
}

/// Build the list of directories to search for model files.
fn build_search_paths(model_path: Option<&str>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = model_path {
        paths.push(PathBuf::from(p));
    }

    if let Ok(env_path) = std::env::var("TRIPOLI_MODEL_PATH") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }

    paths
}

/// Parse a `--model=PATH` or `-m PATH` argument from command line args.
///
/// Returns `(model_path, remaining_args)`.
pub fn parse_model_path(args: &[String]) -> (Option<String>, Vec<String>) {
    parse_option(args, "--model", "-m")
}

/// Parse a `--max-states=N` or `--max-states N` argument.
///
/// Returns `(max_states, remaining_args)`.
pub fn parse_max_states(args: &[String]) -> (Option<usize>, Vec<String>) {
    let (value, remaining) = parse_option(args, "--max-states", "--max-states");
    let max_states = value.map(|v| {
        v.parse()
            .unwrap_or_else(|_| fatal(&format!("--max-states expects a number, got '{v}'")))
    });
    (max_states, remaining)
}

fn parse_option(args: &[String], long: &str, short: &str) -> (Option<String>, Vec<String>) {
    let mut value = None;
    let mut remaining = Vec::new();
    let mut skip_next = false;
    let prefix = format!("{long}=");

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(val) = arg.strip_prefix(&prefix) {
            value = Some(val.to_string());
        } else if arg == long || arg == short {
            if i + 1 < args.len() {
                value = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                fatal(&format!("{arg} requires a value"));
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (value, remaining)
}

/// Remove a boolean flag from the args.
///
/// Returns `(present, remaining_args)`.
pub fn take_flag(args: &[String], flag: &str) -> (bool, Vec<String>) {
    let present = args.iter().any(|a| a == flag);
    let remaining = args.iter().filter(|a| *a != flag).cloned().collect();
    (present, remaining)
}

/// Install a stderr log subscriber filtered by `RUST_LOG` (default: warnings).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn model_path_forms() {
        let (path, rest) = parse_model_path(&args(&["-m", "dir", "a.lat"]));
        assert_eq!(path.as_deref(), Some("dir"));
        assert_eq!(rest, args(&["a.lat"]));

        let (path, rest) = parse_model_path(&args(&["--model=dir2"]));
        assert_eq!(path.as_deref(), Some("dir2"));
        assert!(rest.is_empty());
    }

    #[test]
    fn max_states() {
        let (max, rest) = parse_max_states(&args(&["--max-states", "10", "x"]));
        assert_eq!(max, Some(10));
        assert_eq!(rest, args(&["x"]));
        let (max, _) = parse_max_states(&args(&["x"]));
        assert_eq!(max, None);
    }

    #[test]
    fn flags() {
        let (on, rest) = take_flag(&args(&["--precompute", "a"]), "--precompute");
        assert!(on);
        assert_eq!(rest, args(&["a"]));
        assert!(wants_help(&args(&["a", "-h"])));
        assert!(!wants_help(&args(&["a"])));
    }

    #[test]
    fn explicit_model_path_searched_first() {
        let paths = build_search_paths(Some("/models/toy"));
        assert_eq!(paths[0], PathBuf::from("/models/toy"));
    }

    #[test]
    fn loads_toy_model() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/model");
        let model = load_model(dir.to_str()).unwrap();
        assert_eq!(model.dir, dir);
        assert_eq!(model.parens.len(), 1);
        assert_eq!(model.info.grammar().max_term(), 3);
    }

    fn paren_model(pairs: &[(Label, Label)]) -> Model {
        use tripoli::Grammar;
        use tripoli_core::StateInfo;

        // labels 4 and 5 push and pop symbol 7
        let grammar = Grammar::new(3, 6, 9, vec![], vec![-1, 1, 2, 3, 7, 7]).unwrap();
        let pdt = compile_pdt("0 1 4 4 -1\n1 2 5 5 -1\n2 0 3 3 -1\n2\n".as_bytes()).unwrap();
        let infos = vec![StateInfo::dummy(); 3];
        let info = PdtInfo::new(Arc::new(grammar), pdt, infos).unwrap();
        Model {
            dir: PathBuf::new(),
            info: Arc::new(info),
            parens: Parens::from_pairs(pairs.iter().copied()).unwrap(),
        }
    }

    #[test]
    fn matched_parens_agree_on_symbol() {
        assert!(mismatched_parens(&paren_model(&[(4, 5)])).is_empty());
    }

    #[test]
    fn mismatched_parens_are_reported() {
        let found = mismatched_parens(&paren_model(&[(4, 3)]));
        assert_eq!(found, vec![(3, 4), (4, 3)]);
    }

    #[test]
    fn toy_model_parens_are_consistent() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/model");
        let model = load_model(dir.to_str()).unwrap();
        assert!(mismatched_parens(&model).is_empty());
    }

    #[test]
    fn missing_model_file_is_named() {
        let err = load_model_from(Path::new("/nonexistent/tripoli")).err().unwrap();
        assert!(err.contains("symbols.txt"));
    }
}
