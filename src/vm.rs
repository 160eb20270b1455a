// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! The interpreter.
//!
//! A [`Vm`] owns a [`Program`] snapshot and its two endpoints. Every
//! [`run`](Vm::run) starts from a fresh [`Context`] (a private copy of the
//! program, IP 0, relative base 0) and steps it until the program halts or
//! faults. Endpoints are kept across runs.

use std::sync::{Arc, atomic::{AtomicBool, AtomicU8, Ordering}};
use tracing::{debug, trace, warn};
use crate::{
	error::{DecodeError, Error, MemoryError},
	memory::Memory,
	num::IntNum,
	op::{ArgPos, Instruction, Op, ParMode},
	port::{Input, Output},
	program::Program,
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspension { Input, Output }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
	Ready,
	Running,
	/// Blocked on an endpoint.
	Suspended(Suspension),
	Halted,
	Faulted,
	/// Ended by [`Handle::stop`].
	Stopped,
}

impl VmState {
	fn to_u8(self) -> u8 {
		use VmState::*;
		match self {
			Ready => 0,
			Running => 1,
			Suspended(Suspension::Input) => 2,
			Suspended(Suspension::Output) => 3,
			Halted => 4,
			Faulted => 5,
			Stopped => 6,
		}
	}

	fn from_u8(state: u8) -> Self {
		use VmState::*;
		match state {
			1 => Running,
			2 => Suspended(Suspension::Input),
			3 => Suspended(Suspension::Output),
			4 => Halted,
			5 => Faulted,
			6 => Stopped,
			_ => Ready,
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, VmState::Halted | VmState::Faulted | VmState::Stopped)
	}
}


#[derive(Debug, Default)]
struct Shared {
	stop: AtomicBool,
	state: AtomicU8,
}

/// Observes a VM's state and requests it to stop, from any thread.
#[derive(Debug, Clone, Default)]
pub struct Handle(Arc<Shared>);

impl Handle {
	pub fn new() -> Self {
		Self::default()
	}

	/// The VM finishes the instruction in flight, if any, and then ends its
	/// run with [`Error::Stopped`]. The request stays in effect for later
	/// runs until [`reset_stop`](Self::reset_stop).
	pub fn stop(&self) {
		self.0.stop.store(true, Ordering::SeqCst);
	}

	pub fn reset_stop(&self) {
		self.0.stop.store(false, Ordering::SeqCst);
	}

	pub fn is_stop_requested(&self) -> bool {
		self.0.stop.load(Ordering::SeqCst)
	}

	pub fn state(&self) -> VmState {
		VmState::from_u8(self.0.state.load(Ordering::SeqCst))
	}

	fn set_state(&self, state: VmState) {
		self.0.state.store(state.to_u8(), Ordering::SeqCst);
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow { Continue, Halt }

/// Everything one run mutates.
#[derive(Debug, Clone, PartialEq)]
pub struct Context<Num = i64> {
	pub memory: Memory<Num>,
	pub ip: usize,
	pub rel_base: i64,
	pub steps: u64,
}

impl<Num: IntNum> Context<Num> {
	pub fn new(memory: Memory<Num>) -> Self {
		Self { memory, ip: 0, rel_base: 0, steps: 0 }
	}

	fn decode(&self) -> Result<Instruction, Error> {
		let ip = self.ip;
		let word = self.memory.get(ip).map_err(|source| Error::Memory { ip, source })?;
		let word = word.try_as_i64().ok_or(Error::Decode { ip, source: DecodeError::OutOfRange })?;
		Instruction::decode(word).map_err(|source| Error::Decode { ip, source })
	}

	fn read_param(&self, pos: ArgPos, mode: ParMode) -> Result<Num, MemoryError> {
		let raw = self.memory.get(self.ip + pos.offset())?;
		match mode {
			ParMode::Pos => self.memory.get(Memory::address(&raw, 0)?),
			ParMode::Imm => Ok(raw),
			ParMode::Rel => self.memory.get(Memory::address(&raw, self.rel_base)?),
		}
	}

	fn write_address(&self, pos: ArgPos, mode: ParMode) -> Result<usize, Error> {
		let ip = self.ip;
		let mem_fault = |source| Error::Memory { ip, source };
		let raw = self.memory.get(ip + pos.offset()).map_err(mem_fault)?;
		let address = match mode {
			ParMode::Pos => Memory::address(&raw, 0),
			ParMode::Rel => Memory::address(&raw, self.rel_base),
			ParMode::Imm => return Err(Error::Decode { ip, source: DecodeError::WriteToImmediate { param: pos } }),
		}.map_err(mem_fault)?;
		self.memory.check(address).map_err(mem_fault)?;
		Ok(address)
	}

	/// Decodes, resolves, executes and advances one instruction. Every
	/// fallible part happens before the first write, so a failing
	/// instruction leaves the context as it was.
	pub fn step<I, O>(&mut self, input: &mut I, output: &mut O, handle: &Handle) -> Result<Flow, Error>
	where I: Input<Num> + ?Sized, O: Output<Num> + ?Sized {
		use {ArgPos::*, Op::*};

		let ip = self.ip;
		let Instruction { op, modes } = self.decode()?;
		trace!(ip, rel_base = self.rel_base, op = op.name(), ?modes);

		macro_rules! read { ( $pos:expr ) => {
			self.read_param($pos, modes[$pos]).map_err(|source| Error::Memory { ip, source })?
		} }
		macro_rules! dest { ( $pos:expr ) => { self.write_address($pos, modes[$pos])? } }
		macro_rules! write_memory { ( $dest:expr, $val:expr ) => {
			self.memory.set($dest, $val).map_err(|source| Error::Memory { ip, source })?
		} }

		let next_ip = ip + 1 + op.width();
		match op {
			Add | Mul | Lt | Eq => {
				let arg0 = read!(First);
				let arg1 = read!(Second);
				let dest = dest!(Third);
				let num = match op {
					Add => arg0.checked_add(&arg1).ok_or(Error::Overflow { ip })?,
					Mul => arg0.checked_mul(&arg1).ok_or(Error::Overflow { ip })?,
					Lt => Num::from_bool(arg0 < arg1),
					Eq => Num::from_bool(arg0 == arg1),
					_ => unreachable!(),
				};
				write_memory!(dest, num);
				self.ip = next_ip;
			}
			In => {
				let dest = dest!(First);
				let value = match input.try_read() {
					Ok(Some(value)) => Ok(value),
					Ok(None) => {
						handle.set_state(VmState::Suspended(Suspension::Input));
						let value = input.read();
						handle.set_state(VmState::Running);
						value
					}
					Err(err) => Err(err),
				}.map_err(|source| Error::Input { ip, source })?;
				write_memory!(dest, value);
				self.ip = next_ip;
			}
			Out => {
				let value = read!(First);
				let written = match output.try_write(value) {
					Ok(None) => Ok(()),
					Ok(Some(value)) => {
						handle.set_state(VmState::Suspended(Suspension::Output));
						let written = output.write(value);
						handle.set_state(VmState::Running);
						written
					}
					Err(err) => Err(err),
				};
				written.map_err(|source| Error::Output { ip, source })?;
				self.ip = next_ip;
			}
			JumpIf(flag) => {
				let cond = read!(First);
				let target = read!(Second);
				if !cond.is_zero() == flag {
					self.ip = Memory::address(&target, 0).map_err(|source| Error::Memory { ip, source })?;
				} else {
					self.ip = next_ip;
				}
			}
			RelAdj => {
				let delta = read!(First).try_as_i64().ok_or(Error::Overflow { ip })?;
				self.rel_base = self.rel_base.checked_add(delta).ok_or(Error::Overflow { ip })?;
				self.ip = next_ip;
			}
			Halt => return Ok(Flow::Halt),
		}

		self.steps += 1;
		Ok(Flow::Continue)
	}
}


pub struct Vm<I, O, Num = i64> {
	program: Program<Num>,
	input: I,
	output: O,
	name: String,
	memory_limit: Option<usize>,
	memory: Option<Memory<Num>>,
	handle: Handle,
}

impl<I, O, Num> Vm<I, O, Num> where Num: IntNum, I: Input<Num>, O: Output<Num> {
	pub fn new(program: Program<Num>, input: I, output: O) -> Self {
		Self {
			program,
			input,
			output,
			name: "intcode".to_owned(),
			memory_limit: None,
			memory: None,
			handle: Handle::new(),
		}
	}

	/// Used to tell VMs apart in logs.
	pub fn named(self, name: impl Into<String>) -> Self {
		Self { name: name.into(), ..self }
	}

	/// Turns any access at or beyond `cells` into a memory fault instead of
	/// growing memory.
	pub fn with_memory_limit(self, cells: usize) -> Self {
		Self { memory_limit: Some(cells), ..self }
	}

	pub fn run(&mut self) -> Result<&Memory<Num>, Error> {
		self.run_restored(None, None)
	}

	/// Runs with cells 1 and 2 of the fresh memory overwritten first.
	pub fn run_restored(&mut self, noun: Option<Num>, verb: Option<Num>) -> Result<&Memory<Num>, Error> {
		let span = tracing::debug_span!("vm", name = %self.name);
		let _enter = span.enter();

		let mut context = Context::new(self.program.memory(self.memory_limit));
		let mut result = context.memory.restore(noun, verb)
			.map_err(|source| Error::Memory { ip: 0, source });

		if result.is_ok() {
			debug!(len = self.program.len(), "running");
			self.handle.set_state(VmState::Running);
			result = loop {
				if self.handle.is_stop_requested() { break Err(Error::Stopped { ip: context.ip }) }
				match context.step(&mut self.input, &mut self.output, &self.handle) {
					Ok(Flow::Continue) => (),
					Ok(Flow::Halt) => break Ok(()),
					Err(err) => break Err(err),
				}
			};
		}

		let state = match &result {
			Ok(()) => {
				debug!(ip = context.ip, steps = context.steps, "halted");
				VmState::Halted
			}
			Err(err @ Error::Stopped { .. }) => {
				warn!(steps = context.steps, "{err}");
				VmState::Stopped
			}
			Err(err) => {
				warn!(steps = context.steps, "{err}");
				VmState::Faulted
			}
		};
		self.handle.set_state(state);

		let memory = &*self.memory.insert(context.memory);
		result.map(|()| memory)
	}
}

impl<I, O, Num> Vm<I, O, Num> {
	/// Memory as the last run left it, including a faulted or stopped one.
	pub fn memory(&self) -> Option<&Memory<Num>> {
		self.memory.as_ref()
	}

	pub fn state(&self) -> VmState {
		self.handle.state()
	}

	pub fn handle(&self) -> Handle {
		self.handle.clone()
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn program(&self) -> &Program<Num> {
		&self.program
	}

	pub fn input_mut(&mut self) -> &mut I {
		&mut self.input
	}

	pub fn output_mut(&mut self) -> &mut O {
		&mut self.output
	}

	pub fn into_ports(self) -> (I, O) {
		(self.input, self.output)
	}
}


/// Runs `program` once on in-memory ports and collects its outputs.
pub fn execute<Num: IntNum>(
	program: &Program<Num>,
	inputs: impl IntoIterator<Item = Num>,
) -> Result<Vec<Num>, Error> {
	let mut vm = Vm::new(program.clone(), crate::port::feed(inputs), Vec::new());
	vm.run()?;
	Ok(vm.into_ports().1)
}
