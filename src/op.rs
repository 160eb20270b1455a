// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Instruction decoding.
//!
//! An instruction word `ABCDE` splits into the opcode `DE` and one mode
//! digit per parameter, read right-to-left: `C` for the first, `B` for the
//! second and `A` for the third. Missing digits mean position mode, so
//! `1002` is a multiplication whose second parameter is immediate.

use std::fmt;
use crate::error::DecodeError;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParMode { Pos, Imm, Rel }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgPos { First, Second, Third }

/// Whether an operation reads a parameter's value or writes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role { Read, Write }

impl<T> std::ops::Index<ArgPos> for [T] {
	type Output = T;
	fn index(&self, index: ArgPos) -> &Self::Output {
		match index {
			ArgPos::First => &self[0],
			ArgPos::Second => &self[1],
			ArgPos::Third => &self[2],
		}
	}
}

const ARG_POSS: [ArgPos; 3] = [ArgPos::First, ArgPos::Second, ArgPos::Third];
const PAR_MODE_COEFFS: [i64; 3] = [100, 1000, 10000];

impl ArgPos {
	pub fn offset(&self) -> usize {
		match self { ArgPos::First => 1, ArgPos::Second => 2, ArgPos::Third => 3 }
	}
}

impl fmt::Display for ArgPos {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self { ArgPos::First => "first", ArgPos::Second => "second", ArgPos::Third => "third" })
	}
}

impl ParMode {
	pub fn num(&self) -> i64 {
		use ParMode::*;
		match self { Pos => 0, Imm => 1, Rel => 2 }
	}
}

impl TryFrom<i64> for ParMode {
	type Error = i64;
	fn try_from(value: i64) -> Result<Self, Self::Error> {
		use ParMode::*;
		match value {
			0 => Ok(Pos),
			1 => Ok(Imm),
			2 => Ok(Rel),
			m => Err(m),
		}
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
	Add,
	Mul,
	In,
	Out,
	/// Jumps when the first parameter is non-zero (`true`) or zero (`false`).
	JumpIf(bool),
	Lt,
	Eq,
	RelAdj,
	Halt,
}

impl Op {
	pub fn code(&self) -> i64 {
		use Op::*;
		match self {
			Add => 1,
			Mul => 2,
			In => 3,
			Out => 4,
			JumpIf(true) => 5,
			JumpIf(false) => 6,
			Lt => 7,
			Eq => 8,
			RelAdj => 9,
			Halt => 99,
		}
	}

	pub fn roles(&self) -> &'static [Role] {
		use {Op::*, Role::*};
		match self {
			Add | Mul | Lt | Eq => &[Read, Read, Write],
			In => &[Write],
			Out | RelAdj => &[Read],
			JumpIf(_) => &[Read, Read],
			Halt => &[],
		}
	}

	/// Number of parameter slots following the opcode.
	pub fn width(&self) -> usize {
		self.roles().len()
	}

	pub fn name(&self) -> &'static str {
		use Op::*;
		match self {
			Add => "add",
			Mul => "mul",
			In => "in",
			Out => "out",
			JumpIf(true) => "jnz",
			JumpIf(false) => "jz",
			Lt => "lt",
			Eq => "eq",
			RelAdj => "rel",
			Halt => "halt",
		}
	}
}

impl TryFrom<i64> for Op {
	type Error = i64;
	fn try_from(code: i64) -> Result<Self, Self::Error> {
		use Op::*;
		match code {
			1 => Ok(Add),
			2 => Ok(Mul),
			3 => Ok(In),
			4 => Ok(Out),
			5 => Ok(JumpIf(true)),
			6 => Ok(JumpIf(false)),
			7 => Ok(Lt),
			8 => Ok(Eq),
			9 => Ok(RelAdj),
			99 => Ok(Halt),
			err => Err(err),
		}
	}
}


/// A decoded instruction word. Modes past the operation's width are `Pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
	pub op: Op,
	pub modes: [ParMode; 3],
}

impl Instruction {
	pub fn new(op: Op, modes: [ParMode; 3]) -> Self {
		Self { op, modes }
	}

	pub fn decode(word: i64) -> Result<Self, DecodeError> {
		if word < 0 { return Err(DecodeError::UnknownOpcode(word % 100)) }
		let op = Op::try_from(word % 100).map_err(DecodeError::UnknownOpcode)?;

		let mut modes = [ParMode::Pos; 3];
		for (i, role) in op.roles().iter().enumerate() {
			let param = ARG_POSS[i];
			let mode = ParMode::try_from((word / PAR_MODE_COEFFS[param]) % 10)
				.map_err(|mode| DecodeError::UnknownMode { param, mode })?;
			if let (Role::Write, ParMode::Imm) = (role, mode) {
				return Err(DecodeError::WriteToImmediate { param })
			}
			modes[i] = mode;
		}

		Ok(Self { op, modes })
	}

	pub fn encode(&self) -> i64 {
		self.modes.iter()
			.zip(PAR_MODE_COEFFS)
			.fold(self.op.code(), |word, (mode, coeff)| word + coeff * mode.num())
	}

	/// The declared parameters in order, with their role and mode.
	pub fn params(&self) -> impl Iterator<Item = (ArgPos, Role, ParMode)> + '_ {
		self.op.roles().iter()
			.zip(ARG_POSS)
			.map(|(&role, pos)| (pos, role, self.modes[pos]))
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decode() {
		use {Op::*, ParMode::*};
		assert_eq!(Instruction::decode(1002), Ok(Instruction::new(Mul, [Pos, Imm, Pos])));
		assert_eq!(Instruction::decode(1101), Ok(Instruction::new(Add, [Imm, Imm, Pos])));
		assert_eq!(Instruction::decode(204), Ok(Instruction::new(Out, [Rel, Pos, Pos])));
		assert_eq!(Instruction::decode(21107), Ok(Instruction::new(Lt, [Imm, Imm, Rel])));
		assert_eq!(Instruction::decode(99), Ok(Instruction::new(Halt, [Pos; 3])));
		assert_eq!(Instruction::decode(1005).map(|i| i.op), Ok(JumpIf(true)));
		assert_eq!(Instruction::decode(1106).map(|i| i.op), Ok(JumpIf(false)));

		// Digits past the declared parameters are ignored.
		assert_eq!(Instruction::decode(11104), Ok(Instruction::new(Out, [Imm, Pos, Pos])));
	}

	#[test]
	fn decode_errors() {
		assert_eq!(Instruction::decode(0), Err(DecodeError::UnknownOpcode(0)));
		assert_eq!(Instruction::decode(42), Err(DecodeError::UnknownOpcode(42)));
		assert_eq!(Instruction::decode(-1), Err(DecodeError::UnknownOpcode(-1)));
		assert_eq!(Instruction::decode(301),
			Err(DecodeError::UnknownMode { param: ArgPos::First, mode: 3 }));
		assert_eq!(Instruction::decode(10001),
			Err(DecodeError::WriteToImmediate { param: ArgPos::Third }));
		assert_eq!(Instruction::decode(103),
			Err(DecodeError::WriteToImmediate { param: ArgPos::First }));
	}

	#[test]
	fn encode() {
		for word in [1, 1002, 1101, 204, 21107, 2105, 109, 99] {
			assert_eq!(Instruction::decode(word).unwrap().encode(), word);
		}
	}

	#[test]
	fn widths() {
		use Op::*;
		let widths = [Add, Mul, In, Out, JumpIf(true), JumpIf(false), Lt, Eq, RelAdj, Halt]
			.map(|op| op.width());
		assert_eq!(widths, [3, 3, 1, 1, 2, 2, 3, 3, 1, 0]);

		let params = Instruction::decode(21101).unwrap().params().collect::<Vec<_>>();
		assert_eq!(params, [
			(ArgPos::First, Role::Read, ParMode::Imm),
			(ArgPos::Second, Role::Read, ParMode::Imm),
			(ArgPos::Third, Role::Write, ParMode::Rel),
		]);
	}
}
