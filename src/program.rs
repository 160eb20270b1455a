// Copyright (c) 2022 Bastiaan Marinus van de Weerd

use std::{fmt::Debug, path::Path, str::FromStr, sync::Arc};
use crate::{memory::Memory, num::IntNum};


/// The initial contents of memory. Cloning shares the same cells, and every
/// run works on its own copy, so one program can back any number of VMs.
#[derive(Debug, Clone, PartialEq)]
pub struct Program<Num = i64>(Arc<[Num]>);

impl<Num: IntNum> Program<Num> {
	pub fn new(ints: impl Into<Arc<[Num]>>) -> Self {
		Self(ints.into())
	}

	pub fn as_slice(&self) -> &[Num] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// A fresh, private copy to execute.
	pub fn memory(&self, limit: Option<usize>) -> Memory<Num> {
		Memory::new(self.0.to_vec(), limit)
	}
}

impl<Num> Program<Num> where Num: IntNum, <Num as FromStr>::Err: Debug {
	pub fn load(path: impl AsRef<Path>) -> Result<Self, parsing::LoadProgramError> {
		let text = std::fs::read_to_string(path)?;
		Ok(text.parse()?)
	}
}

impl<Num: IntNum> From<Vec<Num>> for Program<Num> {
	fn from(ints: Vec<Num>) -> Self {
		Self::new(ints)
	}
}

impl<Num: IntNum, const N: usize> From<[Num; N]> for Program<Num> {
	fn from(ints: [Num; N]) -> Self {
		Self::new(Vec::from(ints))
	}
}

impl<Num: IntNum> FromIterator<Num> for Program<Num> {
	fn from_iter<I: IntoIterator<Item = Num>>(iter: I) -> Self {
		Self::new(iter.into_iter().collect::<Vec<_>>())
	}
}

impl<Num> FromStr for Program<Num> where Num: IntNum, <Num as FromStr>::Err: Debug {
	type Err = parsing::ProgramError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parsing::from_str(s)
	}
}


pub mod parsing {
	use super::Program;
	use crate::num::IntNum;
	use std::{fmt::Debug, io, mem, str::FromStr};
	use thiserror::Error;

	#[derive(Debug, Error)]
	pub enum ProgramError {
		#[error("empty program")]
		Empty,
		#[error("invalid int {str:?} at line {line}, column {column}: {reason}")]
		Int { line: usize, column: usize, str: String, reason: String },
	}

	#[derive(Debug, Error)]
	pub enum LoadProgramError {
		#[error(transparent)]
		Io(#[from] io::Error),
		#[error(transparent)]
		Parse(#[from] ProgramError),
	}

	/// Comma-separated ints, possibly spread over several lines, each of
	/// which may end in a comma.
	pub fn from_str<Num>(s: &str) -> Result<Program<Num>, ProgramError>
	where Num: IntNum, <Num as FromStr>::Err: Debug {
		let ints = s.lines()
			.enumerate()
			.flat_map(|(l, line)| {
				let line = line.trim_end();
				line.strip_suffix(',').unwrap_or(line)
					.split(',')
					.scan(0, |c, int| Some((mem::replace(c, *c + int.len() + 1), int)))
					.map(move |(c, int)| (l, c, int))
			})
			.filter(|(_, _, int)| !int.trim().is_empty())
			.map(|(l, c, int)| int.trim().parse()
				.map_err(|e| ProgramError::Int {
					line: l + 1,
					column: c + 1,
					str: int.to_owned(),
					reason: format!("{e:?}"),
				}))
			.collect::<Result<Vec<Num>, _>>()?;
		if ints.is_empty() { return Err(ProgramError::Empty) }
		Ok(Program::new(ints))
	}
}
