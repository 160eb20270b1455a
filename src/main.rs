// Copyright (c) 2022 Bastiaan Marinus van de Weerd

use std::{fmt::Debug, path::PathBuf, str::FromStr};
use anyhow::{anyhow, Context as _, Result};
use clap::{ArgAction, Parser};
use itertools::Itertools as _;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use intcode::{port::{feed, Print, Prompt}, IntNum, Input, Program, Vm};


#[derive(Parser)]
#[command(version, about = "Runs an IntCode program", long_about = None)]
struct Args {
	/// File holding the comma-separated program
	program: PathBuf,
	/// Value to feed the program; repeat for more. Without any, values are
	/// prompted for on stdin.
	#[arg(short, long = "input", value_name = "N", allow_hyphen_values = true)]
	inputs: Vec<String>,
	/// Overwrites cell 1 before running
	#[arg(long, value_name = "N", allow_hyphen_values = true)]
	noun: Option<String>,
	/// Overwrites cell 2 before running
	#[arg(long, value_name = "N", allow_hyphen_values = true)]
	verb: Option<String>,
	/// Faults instead of growing memory past this many cells
	#[arg(long, value_name = "CELLS")]
	memory_limit: Option<usize>,
	/// Prints the final memory after the program halts
	#[arg(long)]
	dump_memory: bool,
	/// Uses arbitrary-precision cells
	#[arg(long)]
	big: bool,
	/// Logs more; repeat for even more. `RUST_LOG` takes precedence.
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,
}

fn main() -> Result<()> {
	let args = Args::parse();

	let level = match args.verbose { 0 => "warn", 1 => "info", 2 => "debug", _ => "trace" };
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_thread_names(true)
		.init();

	if args.big {
		#[cfg(feature = "bigint")]
		return run::<num_bigint::BigInt>(&args);
		#[cfg(not(feature = "bigint"))]
		return Err(anyhow!("built without the `bigint` feature"));
	}
	run::<i64>(&args)
}

fn parse<Num>(s: &str) -> Result<Num> where Num: IntNum, <Num as FromStr>::Err: Debug {
	s.trim().parse().map_err(|e| anyhow!("invalid value {s:?}: {e:?}"))
}

fn run<Num>(args: &Args) -> Result<()> where Num: IntNum, <Num as FromStr>::Err: Debug {
	let program = Program::<Num>::load(&args.program)
		.with_context(|| format!("could not load {}", args.program.display()))?;
	debug!(path = %args.program.display(), len = program.len(), "loaded");

	let noun = args.noun.as_deref().map(parse).transpose().context("bad noun")?;
	let verb = args.verb.as_deref().map(parse).transpose().context("bad verb")?;

	if args.inputs.is_empty() {
		execute(args, program, Prompt::stdio(), noun, verb)
	} else {
		let inputs = args.inputs.iter()
			.map(|s| parse(s))
			.collect::<Result<Vec<Num>>>()
			.context("bad input")?;
		execute(args, program, feed(inputs), noun, verb)
	}
}

fn execute<Num: IntNum, I: Input<Num>>(
	args: &Args,
	program: Program<Num>,
	input: I,
	noun: Option<Num>,
	verb: Option<Num>,
) -> Result<()> {
	let mut vm = Vm::new(program, input, Print::stdout())
		.named(args.program.display().to_string());
	if let Some(cells) = args.memory_limit { vm = vm.with_memory_limit(cells) }

	let memory = vm.run_restored(noun, verb).context("program failed")?;
	if args.dump_memory {
		println!("{}", memory.as_slice().iter().join(","));
		for (address, num) in memory.sparse() {
			println!("{address}: {num}");
		}
	}
	Ok(())
}
