// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Endpoints feeding the input operation and draining the output operation.
//!
//! Besides the impls here, the blocking channel endpoints live in
//! [`crate::channel`].

use std::{collections::VecDeque, fmt::{Debug, Display}, io::{self, BufRead, Write}, str::FromStr};
use crate::{error::PortError, num::IntNum};


pub trait Input<Num> {
	/// Yields exactly one value, blocking if the endpoint blocks.
	fn read(&mut self) -> Result<Num, PortError>;

	/// Like [`read`](Self::read), but `Ok(None)` where it would block.
	/// Endpoints that never block need not override this.
	fn try_read(&mut self) -> Result<Option<Num>, PortError> {
		self.read().map(Some)
	}
}

pub trait Output<Num> {
	fn write(&mut self, value: Num) -> Result<(), PortError>;

	/// Like [`write`](Self::write), but hands `value` back where it would
	/// block.
	fn try_write(&mut self, value: Num) -> Result<Option<Num>, PortError> {
		self.write(value).map(|()| None)
	}
}

impl<Num, T: Input<Num> + ?Sized> Input<Num> for &mut T {
	fn read(&mut self) -> Result<Num, PortError> {
		(**self).read()
	}

	fn try_read(&mut self) -> Result<Option<Num>, PortError> {
		(**self).try_read()
	}
}

impl<Num, T: Output<Num> + ?Sized> Output<Num> for &mut T {
	fn write(&mut self, value: Num) -> Result<(), PortError> {
		(**self).write(value)
	}

	fn try_write(&mut self, value: Num) -> Result<Option<Num>, PortError> {
		(**self).try_write(value)
	}
}

impl<Num, T: Input<Num> + ?Sized> Input<Num> for Box<T> {
	fn read(&mut self) -> Result<Num, PortError> {
		(**self).read()
	}

	fn try_read(&mut self) -> Result<Option<Num>, PortError> {
		(**self).try_read()
	}
}

impl<Num, T: Output<Num> + ?Sized> Output<Num> for Box<T> {
	fn write(&mut self, value: Num) -> Result<(), PortError> {
		(**self).write(value)
	}

	fn try_write(&mut self, value: Num) -> Result<Option<Num>, PortError> {
		(**self).try_write(value)
	}
}


impl<Num> Input<Num> for VecDeque<Num> {
	fn read(&mut self) -> Result<Num, PortError> {
		self.pop_front().ok_or(PortError::Exhausted)
	}
}

impl<Num> Output<Num> for Vec<Num> {
	fn write(&mut self, value: Num) -> Result<(), PortError> {
		self.push(value);
		Ok(())
	}
}

impl<Num> Output<Num> for VecDeque<Num> {
	fn write(&mut self, value: Num) -> Result<(), PortError> {
		self.push_back(value);
		Ok(())
	}
}

/// Reads from any iterator, e.g. `Feed([phase, 0].into_iter())`.
#[derive(Debug, Clone)]
pub struct Feed<It>(pub It);

impl<Num, It: Iterator<Item = Num>> Input<Num> for Feed<It> {
	fn read(&mut self) -> Result<Num, PortError> {
		self.0.next().ok_or(PortError::Exhausted)
	}
}

pub fn feed<Num, It: IntoIterator<Item = Num>>(values: It) -> Feed<It::IntoIter> {
	Feed(values.into_iter())
}

/// Input from a closure; `None` means no more input.
pub struct InputFn<F>(pub F);

impl<Num, F: FnMut() -> Option<Num>> Input<Num> for InputFn<F> {
	fn read(&mut self) -> Result<Num, PortError> {
		(self.0)().ok_or(PortError::Exhausted)
	}
}

pub struct OutputFn<F>(pub F);

impl<Num, F: FnMut(Num)> Output<Num> for OutputFn<F> {
	fn write(&mut self, value: Num) -> Result<(), PortError> {
		(self.0)(value);
		Ok(())
	}
}

/// Throws every value away.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl<Num> Output<Num> for Discard {
	fn write(&mut self, _: Num) -> Result<(), PortError> {
		Ok(())
	}
}


/// Asks for one value per line, like an interactive terminal.
pub struct Prompt<R, W> {
	reader: R,
	writer: W,
	line: String,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
	pub fn new(reader: R, writer: W) -> Self {
		Self { reader, writer, line: String::new() }
	}
}

impl Prompt<io::StdinLock<'static>, io::Stderr> {
	pub fn stdio() -> Self {
		Self::new(io::stdin().lock(), io::stderr())
	}
}

impl<Num, R, W> Input<Num> for Prompt<R, W>
where Num: IntNum, <Num as FromStr>::Err: Debug, R: BufRead, W: Write {
	fn read(&mut self) -> Result<Num, PortError> {
		write!(self.writer, "Input: ")?;
		self.writer.flush()?;
		self.line.clear();
		if self.reader.read_line(&mut self.line)? == 0 { return Err(PortError::Exhausted) }
		let line = self.line.trim();
		line.parse().map_err(|_| PortError::Parse(line.to_owned()))
	}

	/// Always waits for the terminal.
	fn try_read(&mut self) -> Result<Option<Num>, PortError> {
		Ok(None)
	}
}

/// Writes one value per line.
pub struct Print<W>(pub W);

impl Print<io::Stdout> {
	pub fn stdout() -> Self {
		Self(io::stdout())
	}
}

impl<Num: Display, W: Write> Output<Num> for Print<W> {
	fn write(&mut self, value: Num) -> Result<(), PortError> {
		writeln!(self.0, "{value}")?;
		Ok(())
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn in_memory() {
		let mut input = VecDeque::from([1i64, 2]);
		assert_eq!(input.read().unwrap(), 1);
		assert_eq!((&mut input).read().unwrap(), 2);
		assert!(matches!(input.read(), Err(PortError::Exhausted)));
		assert!(matches!(input.try_read(), Err(PortError::Exhausted)));

		let mut input = feed([7i64]);
		assert_eq!(input.read().unwrap(), 7);
		assert!(matches!(input.read(), Err(PortError::Exhausted)));

		let mut output = Vec::new();
		Output::write(&mut output, 3i64).unwrap();
		Output::write(&mut &mut output, 4).unwrap();
		assert_eq!(Output::try_write(&mut output, 5).unwrap(), None);
		assert_eq!(output, [3, 4, 5]);
	}

	#[test]
	fn closures() {
		let mut next = 0i64;
		let mut input = InputFn(|| { next += 1; (next <= 2).then_some(next) });
		assert_eq!(input.read().unwrap(), 1);
		assert_eq!(input.read().unwrap(), 2);
		assert!(matches!(input.read(), Err(PortError::Exhausted)));

		let mut sum = 0i64;
		let mut output = OutputFn(|v: i64| sum += v);
		output.write(20).unwrap();
		output.write(22).unwrap();
		drop(output);
		assert_eq!(sum, 42);
	}

	#[test]
	fn prompt_and_print() {
		let mut prompts = Vec::new();
		let mut prompt = Prompt::new(&b"5\n -3 \nnope\n"[..], &mut prompts);
		assert_eq!(Input::<i64>::read(&mut prompt).unwrap(), 5);
		assert_eq!(Input::<i64>::read(&mut prompt).unwrap(), -3);
		assert!(matches!(Input::<i64>::read(&mut prompt), Err(PortError::Parse(s)) if s == "nope"));
		assert!(matches!(Input::<i64>::read(&mut prompt), Err(PortError::Exhausted)));
		assert_eq!(Input::<i64>::try_read(&mut prompt).unwrap(), None);
		drop(prompt);
		assert_eq!(prompts, b"Input: Input: Input: Input: ");

		let mut print = Print(Vec::new());
		print.write(3500i64).unwrap();
		print.write(-1i64).unwrap();
		assert_eq!(print.0, b"3500\n-1\n");
	}
}
