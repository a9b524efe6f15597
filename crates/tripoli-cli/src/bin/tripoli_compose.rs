// tripoli-compose: Compose lattices with a model's PDT.
//
// Each lattice is composed with the PDT under the grammar-constrained
// filter, and the result is printed in PDT text format. With several
// lattice files, each result is preceded by a `# PATH` comment line.
//
// Usage:
//   tripoli-compose [-m MODEL_DIR] [--precompute] [--max-states N] [LATTICE...]
//
// Options:
//   -m, --model PATH   Model directory containing pdt.txt and friends
//   --precompute       Fill the reachability memo before composing
//   --max-states N     Give up on a lattice after N product states
//   -h, --help         Print help

use std::io::{self, BufRead, Write};

use tracing::warn;
use tripoli::TripoliFilter;
use tripoli_fst::compose::{ComposeOptions, compose};
use tripoli_fst::text::{compile_lattice, write_pdt};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (model_path, args) = tripoli_cli::parse_model_path(&args);
    let (max_states, args) = tripoli_cli::parse_max_states(&args);
    let (precompute, args) = tripoli_cli::take_flag(&args, "--precompute");

    if tripoli_cli::wants_help(&args) {
        println!("tripoli-compose: Grammar-constrained composition of lattices.");
        println!();
        println!("Usage: tripoli-compose [-m MODEL_DIR] [--precompute] [--max-states N] [LATTICE...]");
        println!();
        println!("If LATTICE arguments are given, composes each file.");
        println!("Otherwise reads one lattice from stdin.");
        println!();
        println!("Options:");
        println!("  -m, --model PATH   Model directory (default: $TRIPOLI_MODEL_PATH or .)");
        println!("  --precompute       Precompute grammar reachability");
        println!("  --max-states N     Product state limit per lattice");
        println!("  -h, --help         Print this help");
        return;
    }

    tripoli_cli::init_logging();
    let model = tripoli_cli::load_model(model_path.as_deref())
        .unwrap_or_else(|e| tripoli_cli::fatal(&e));
    if precompute {
        model.info.grammar().precompute_reachability();
    }

    let mut options = ComposeOptions::default();
    if let Some(max) = max_states {
        options.max_states = max;
    }
    let filter = TripoliFilter::new(model.info.clone());

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    let run = |name: &str, input: Box<dyn BufRead>, out: &mut dyn Write| -> bool {
        let lattice = match compile_lattice(input) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error: {name}: {e}");
                return false;
            }
        };
        match compose(&lattice, model.info.pdt(), &model.parens, &mut filter.clone(), &options) {
            Ok(result) => {
                if let Err(e) = write_pdt(&result, out) {
                    tripoli_cli::fatal(&format!("failed to write output: {e}"));
                }
                true
            }
            Err(e) => {
                warn!(lattice = name, error = %e, "composition failed");
                eprintln!("error: {name}: {e}");
                false
            }
        }
    };

    let mut failures = 0usize;
    if args.is_empty() {
        let stdin = io::stdin();
        if !run("<stdin>", Box::new(stdin.lock()), &mut out) {
            failures += 1;
        }
    } else {
        for path in &args {
            let _ = writeln!(out, "# {path}");
            let ok = match tripoli_cli::open(std::path::Path::new(path)) {
                Ok(reader) => run(path, Box::new(reader), &mut out),
                Err(e) => {
                    eprintln!("error: {e}");
                    false
                }
            };
            if !ok {
                failures += 1;
            }
        }
    }

    let _ = out.flush();
    if failures > 0 {
        std::process::exit(1);
    }
}
