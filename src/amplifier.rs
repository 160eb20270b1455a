// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Several copies of one program wired output-to-input, each started with
//! its own phase setting.

use std::{io, thread};
use itertools::Itertools as _;
use thiserror::Error;
use tracing::debug;
use crate::{
	channel::channel,
	error::{Error, PortError},
	num::IntNum,
	program::Program,
	vm::{self, Vm},
};


/// Room for the seeds (at least two) plus a few signals in flight.
pub const RING_CAPACITY: usize = 8;

#[derive(Debug, Error)]
pub enum AmplifierError {
	#[error("amplifier {stage}: {source}")]
	Vm { stage: usize, #[source] source: Error },
	#[error("no output signal")]
	NoOutput,
	#[error("amplifier {stage} panicked")]
	Panicked { stage: usize },
	#[error("could not seed amplifier {stage}")]
	Seed { stage: usize, #[source] source: PortError },
	#[error("could not spawn amplifier thread")]
	Spawn(#[from] io::Error),
}


/// Runs the stages one after another, each reading its phase and then the
/// previous stage's first output (0 for the first stage).
pub fn chain<Num: IntNum>(program: &Program<Num>, phases: &[Num]) -> Result<Num, AmplifierError> {
	if phases.is_empty() { return Err(AmplifierError::NoOutput) }
	phases.iter().enumerate().try_fold(Num::default(), |signal, (stage, phase)| {
		vm::execute(program, [phase.clone(), signal])
			.map_err(|source| AmplifierError::Vm { stage, source })?
			.into_iter()
			.next()
			.ok_or(AmplifierError::NoOutput)
	})
}

/// Runs every stage on its own thread, the last one feeding back into the
/// first, until all of them halt. The result is the last signal the final
/// stage sent around.
pub fn feedback_loop<Num: IntNum>(program: &Program<Num>, phases: &[Num]) -> Result<Num, AmplifierError> {
	if phases.is_empty() { return Err(AmplifierError::NoOutput) }

	let (mut senders, receivers): (Vec<_>, Vec<_>) = phases.iter()
		.map(|_| channel(RING_CAPACITY))
		.unzip();
	for (stage, (sender, phase)) in senders.iter().zip(phases).enumerate() {
		sender.send(phase.clone()).map_err(|source| AmplifierError::Seed { stage, source })?;
	}
	senders[0].send(Num::default()).map_err(|source| AmplifierError::Seed { stage: 0, source })?;

	// Stage `i` reads channel `i` and writes channel `i + 1`.
	senders.rotate_left(1);
	let vms = receivers.into_iter().zip(senders)
		.enumerate()
		.map(|(stage, (rx, tx))| Vm::new(program.clone(), rx, tx).named(format!("amplifier-{stage}")))
		.collect::<Vec<_>>();

	let outcomes = thread::scope(|scope| -> Result<Vec<_>, AmplifierError> {
		let runners = vms.into_iter()
			.enumerate()
			.map(|(stage, mut vm)| thread::Builder::new()
				.name(vm.name().to_owned())
				.spawn_scoped(scope, move || -> Result<Option<Num>, Error> {
					// A stage that is done drops its endpoints, so neighbors
					// still talking to it see a closed channel instead of
					// blocking forever. The first stage keeps draining its
					// input until the last stage is done, so the last stage
					// never blocks on it either.
					vm.run()?;
					if stage != 0 { return Ok(None) }
					let (rx, tx) = vm.into_ports();
					drop(tx);
					Ok(rx.last())
				}))
			.collect::<Result<Vec<_>, _>>()?;
		debug!(stages = runners.len(), "feedback loop running");
		Ok(runners.into_iter().map(|runner| runner.join()).collect())
	})?;

	let mut signal = None;
	for (stage, outcome) in outcomes.into_iter().enumerate() {
		match outcome {
			Err(_) => return Err(AmplifierError::Panicked { stage }),
			Ok(Err(source)) => return Err(AmplifierError::Vm { stage, source }),
			Ok(Ok(last)) => if stage == 0 { signal = last },
		}
	}
	signal.ok_or(AmplifierError::NoOutput)
}

/// Tries every ordering of `phases` and returns the one producing the
/// highest signal, along with that signal.
pub fn max_signal<Num: IntNum>(
	program: &Program<Num>,
	phases: &[Num],
	feedback: bool,
) -> Result<(Vec<Num>, Num), AmplifierError> {
	let mut best: Option<(Vec<Num>, Num)> = None;
	for order in phases.iter().cloned().permutations(phases.len()) {
		let signal = if feedback { feedback_loop(program, &order)? } else { chain(program, &order)? };
		if best.as_ref().map_or(true, |(_, highest)| signal > *highest) {
			best = Some((order, signal));
		}
	}
	best.ok_or(AmplifierError::NoOutput)
}


#[cfg(test)]
mod tests {
	use super::*;

	const CHAINED: [&str; 3] = [
		"3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0",
		"3,23,3,24,1002,24,10,24,1002,23,-1,23,101,5,23,23,1,24,23,23,4,23,99,0,0",
		"3,31,3,32,1002,32,10,32,1001,31,-2,31,1007,31,0,33,1002,33,7,33,1,33,31,31,1,32,31,31,4,31,99,0,0,0",
	];

	const LOOPED: [&str; 2] = [
		"3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5",
		"3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,1005,55,26,1001,54,-5,54,1105,1,12,1,53,54,53,1008,54,0,55,1001,55,1,55,2,53,55,53,4,53,1001,56,-1,56,1005,56,6,99,0,0,0,0,10",
	];

	fn program(s: &str) -> Program {
		s.parse().unwrap()
	}

	#[test]
	fn chained() {
		assert_eq!(chain(&program(CHAINED[0]), &[4, 3, 2, 1, 0]).unwrap(), 43210);
		assert_eq!(chain(&program(CHAINED[1]), &[0, 1, 2, 3, 4]).unwrap(), 54321);
		assert_eq!(chain(&program(CHAINED[2]), &[1, 0, 4, 3, 2]).unwrap(), 65210);
	}

	#[test]
	fn best_chained() {
		let phases = [0, 1, 2, 3, 4];
		assert_eq!(max_signal(&program(CHAINED[0]), &phases, false).unwrap(), (vec![4, 3, 2, 1, 0], 43210));
		assert_eq!(max_signal(&program(CHAINED[1]), &phases, false).unwrap(), (vec![0, 1, 2, 3, 4], 54321));
		assert_eq!(max_signal(&program(CHAINED[2]), &phases, false).unwrap(), (vec![1, 0, 4, 3, 2], 65210));
	}

	#[test]
	fn looped() {
		assert_eq!(feedback_loop(&program(LOOPED[0]), &[9, 8, 7, 6, 5]).unwrap(), 139629729);
		assert_eq!(feedback_loop(&program(LOOPED[1]), &[9, 7, 8, 5, 6]).unwrap(), 18216);
	}

	#[test]
	fn looped_past_first_halt() {
		// Phase 0 halts right after its seed; phase 5 then sends more signals
		// than the ring buffers.
		let program: Program = [3, 100, 1005, 100, 8, 3, 101, 99].into_iter()
			.chain([104, 1].repeat(RING_CAPACITY * 2 + 4))
			.chain([104, 2, 99])
			.collect();
		assert_eq!(feedback_loop(&program, &[0, 5]).unwrap(), 2);
	}

	#[test]
	fn failures() {
		assert!(matches!(chain(&program(CHAINED[0]), &[]), Err(AmplifierError::NoOutput)));
		assert!(matches!(feedback_loop(&program(CHAINED[0]), &[]), Err(AmplifierError::NoOutput)));
		assert!(matches!(chain(&program("3,0,99"), &[1, 2]), Err(AmplifierError::NoOutput)));
		assert!(matches!(
			chain(&program("3,0,3,0,42"), &[1, 2]),
			Err(AmplifierError::Vm { stage: 0, source: Error::Decode { ip: 4, .. } }),
		));

		// Every stage faults right after reading its phase; none may hang.
		assert!(matches!(
			feedback_loop(&program("3,0,42"), &[5, 6, 7]),
			Err(AmplifierError::Vm { stage: 0, source: Error::Decode { ip: 2, .. } }),
		));
	}
}
