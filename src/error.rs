// Copyright (c) 2022 Bastiaan Marinus van de Weerd

use std::{io, time::Duration};
use thiserror::Error;
use crate::op::ArgPos;


/// Why an instruction word could not be decoded.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
	#[error("unknown opcode {0}")]
	UnknownOpcode(i64),
	#[error("instruction word out of range")]
	OutOfRange,
	#[error("unknown mode {mode} for the {param} parameter")]
	UnknownMode { param: ArgPos, mode: i64 },
	#[error("immediate mode for the {param} parameter, which is a write target")]
	WriteToImmediate { param: ArgPos },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
	#[error("negative address {0}")]
	NegativeAddress(i64),
	#[error("address out of range")]
	AddressOverflow,
	#[error("address {address} is beyond the limit of {limit} cells")]
	OutOfBounds { address: usize, limit: usize },
}

/// Failures of an input or output endpoint. These point at the wiring
/// around a program rather than at the program itself.
#[derive(Debug, Error)]
pub enum PortError {
	#[error("input exhausted")]
	Exhausted,
	#[error("channel closed")]
	Closed,
	#[error("timed out after {0:?}")]
	TimedOut(Duration),
	#[error("invalid input {0:?}")]
	Parse(String),
	#[error(transparent)]
	Io(#[from] io::Error),
}

/// A fatal fault of a run. Each variant carries the address of the
/// instruction that was not applied.
#[derive(Debug, Error)]
pub enum Error {
	#[error("invalid instruction at {ip}: {source}")]
	Decode { ip: usize, #[source] source: DecodeError },
	#[error("memory fault at {ip}: {source}")]
	Memory { ip: usize, #[source] source: MemoryError },
	#[error("arithmetic overflow at {ip}")]
	Overflow { ip: usize },
	#[error("input failed at {ip}: {source}")]
	Input { ip: usize, #[source] source: PortError },
	#[error("output failed at {ip}: {source}")]
	Output { ip: usize, #[source] source: PortError },
	#[error("stopped before {ip}")]
	Stopped { ip: usize },
}

impl Error {
	pub fn ip(&self) -> usize {
		use Error::*;
		match self {
			Decode { ip, .. } | Memory { ip, .. } | Overflow { ip }
				| Input { ip, .. } | Output { ip, .. } | Stopped { ip } => *ip,
		}
	}

	/// Whether the fault came from an endpoint rather than from the program.
	pub fn is_port(&self) -> bool {
		matches!(self, Error::Input { .. } | Error::Output { .. })
	}
}
