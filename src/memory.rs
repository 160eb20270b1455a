// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! One flat, growable address space. Code and data share it, so programs
//! are free to rewrite their own instructions.
//!
//! Cells are kept contiguously from address 0 as long as writes land close
//! to the end; anything written further out goes to a sparse map instead, so
//! a far-away address costs one entry rather than every cell before it.

use std::collections::BTreeMap;
use crate::{error::MemoryError, num::IntNum};


/// How far past the contiguous cells a write may land and still extend them.
const MAX_DENSE_GAP: usize = 1 << 12;

#[derive(Debug, Clone, PartialEq)]
pub struct Memory<Num = i64> {
	cells: Vec<Num>,
	/// Every key is at least `cells.len()`.
	sparse: BTreeMap<usize, Num>,
	limit: Option<usize>,
}

impl<Num: IntNum> Memory<Num> {
	pub fn new(cells: Vec<Num>, limit: Option<usize>) -> Self {
		Self { cells, sparse: BTreeMap::new(), limit }
	}

	/// Fails if `address` lies beyond the limit.
	pub fn check(&self, address: usize) -> Result<(), MemoryError> {
		match self.limit {
			Some(limit) if address >= limit => Err(MemoryError::OutOfBounds { address, limit }),
			_ => Ok(()),
		}
	}

	/// Cells never written read as zero without being allocated.
	pub fn get(&self, address: usize) -> Result<Num, MemoryError> {
		self.check(address)?;
		Ok(match self.cells.get(address) {
			Some(num) => num.clone(),
			None => self.sparse.get(&address).cloned().unwrap_or_default(),
		})
	}

	pub fn set(&mut self, address: usize, value: Num) -> Result<(), MemoryError> {
		self.check(address)?;
		let len = self.cells.len();
		if address < len {
			self.cells[address] = value;
		} else if address - len <= MAX_DENSE_GAP {
			self.cells.resize(address + 1, Num::default());
			// Move over sparse cells the contiguous ones now cover.
			let mut covered = self.sparse.split_off(&len);
			self.sparse = covered.split_off(&(address + 1));
			for (address, num) in covered { self.cells[address] = num }
			self.cells[address] = value;
		} else {
			self.sparse.insert(address, value);
		}
		Ok(())
	}

	/// Turns a raw operand, offset by `base`, into an address.
	pub fn address(raw: &Num, base: i64) -> Result<usize, MemoryError> {
		let raw = raw.try_as_i64().ok_or(MemoryError::AddressOverflow)?;
		let address = raw.checked_add(base).ok_or(MemoryError::AddressOverflow)?;
		usize::try_from(address).map_err(|_| MemoryError::NegativeAddress(address))
	}

	/// Overwrites cells 1 and 2, the "noun" and "verb" of a program.
	pub fn restore(&mut self, noun: Option<Num>, verb: Option<Num>) -> Result<(), MemoryError> {
		if let Some(noun) = noun { self.set(1, noun)? }
		if let Some(verb) = verb { self.set(2, verb)? }
		Ok(())
	}

	pub fn limit(&self) -> Option<usize> {
		self.limit
	}
}

impl<Num> Memory<Num> {
	/// One past the highest address ever stored.
	pub fn len(&self) -> usize {
		self.sparse.keys().next_back().map_or(self.cells.len(), |&address| address + 1)
	}

	pub fn is_empty(&self) -> bool {
		self.cells.is_empty() && self.sparse.is_empty()
	}

	/// The contiguous cells from address 0. See [`sparse`](Self::sparse)
	/// for the rest.
	pub fn as_slice(&self) -> &[Num] {
		&self.cells
	}

	/// Cells stored past [`as_slice`](Self::as_slice), by ascending address.
	pub fn sparse(&self) -> impl Iterator<Item = (usize, &Num)> + '_ {
		self.sparse.iter().map(|(&address, num)| (address, num))
	}
}
