// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! Bounded, blocking FIFO channels connecting VMs to each other or to
//! external producers and consumers.
//!
//! Reading from a channel whose senders are all gone fails with
//! [`PortError::Closed`] once the buffer is empty, and either endpoint may
//! be given a timeout after which it fails with [`PortError::TimedOut`]
//! instead of waiting forever.

use std::time::Duration;
use crossbeam::channel::{self as cb, RecvTimeoutError, SendTimeoutError, TryRecvError, TrySendError};
use crate::{error::PortError, port::{Input, Output}};


pub fn channel<Num>(capacity: usize) -> (Sender<Num>, Receiver<Num>) {
	let (tx, rx) = cb::bounded(capacity);
	(Sender { tx, timeout: None }, Receiver { rx, timeout: None })
}


#[derive(Debug)]
pub struct Sender<Num> {
	tx: cb::Sender<Num>,
	timeout: Option<Duration>,
}

impl<Num> Clone for Sender<Num> {
	fn clone(&self) -> Self {
		Self { tx: self.tx.clone(), timeout: self.timeout }
	}
}

impl<Num> Sender<Num> {
	pub fn with_timeout(self, timeout: Duration) -> Self {
		Self { timeout: Some(timeout), ..self }
	}

	/// Blocks while the channel is full.
	pub fn send(&self, value: Num) -> Result<(), PortError> {
		match self.timeout {
			None => self.tx.send(value).map_err(|_| PortError::Closed),
			Some(timeout) => self.tx.send_timeout(value, timeout).map_err(|e| match e {
				SendTimeoutError::Timeout(_) => PortError::TimedOut(timeout),
				SendTimeoutError::Disconnected(_) => PortError::Closed,
			}),
		}
	}

	/// Hands `value` back if the channel is full.
	pub fn try_send(&self, value: Num) -> Result<Option<Num>, PortError> {
		match self.tx.try_send(value) {
			Ok(()) => Ok(None),
			Err(TrySendError::Full(value)) => Ok(Some(value)),
			Err(TrySendError::Disconnected(_)) => Err(PortError::Closed),
		}
	}
}

impl<Num> Output<Num> for Sender<Num> {
	fn write(&mut self, value: Num) -> Result<(), PortError> {
		self.send(value)
	}

	fn try_write(&mut self, value: Num) -> Result<Option<Num>, PortError> {
		self.try_send(value)
	}
}


#[derive(Debug)]
pub struct Receiver<Num> {
	rx: cb::Receiver<Num>,
	timeout: Option<Duration>,
}

impl<Num> Receiver<Num> {
	pub fn with_timeout(self, timeout: Duration) -> Self {
		Self { timeout: Some(timeout), ..self }
	}

	/// Blocks while the channel is empty and some sender is still alive.
	pub fn recv(&self) -> Result<Num, PortError> {
		match self.timeout {
			None => self.rx.recv().map_err(|_| PortError::Closed),
			Some(timeout) => self.rx.recv_timeout(timeout).map_err(|e| match e {
				RecvTimeoutError::Timeout => PortError::TimedOut(timeout),
				RecvTimeoutError::Disconnected => PortError::Closed,
			}),
		}
	}

	pub fn try_recv(&self) -> Option<Num> {
		self.rx.try_recv().ok()
	}

	/// Everything currently buffered, without blocking.
	pub fn drain(&self) -> Vec<Num> {
		self.rx.try_iter().collect()
	}

	/// Waits for every sender to go away and returns the last value sent,
	/// if any. Ignores the timeout.
	pub fn last(&self) -> Option<Num> {
		self.rx.iter().last()
	}
}

impl<Num> Input<Num> for Receiver<Num> {
	fn read(&mut self) -> Result<Num, PortError> {
		self.recv()
	}

	fn try_read(&mut self) -> Result<Option<Num>, PortError> {
		match self.rx.try_recv() {
			Ok(value) => Ok(Some(value)),
			Err(TryRecvError::Empty) => Ok(None),
			Err(TryRecvError::Disconnected) => Err(PortError::Closed),
		}
	}
}
