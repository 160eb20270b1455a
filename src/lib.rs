// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! An IntCode virtual machine.
//!
//! ```
//! use intcode::{Program, execute};
//!
//! let program: Program = "3,0,4,0,99".parse().unwrap();
//! assert_eq!(execute(&program, [42]).unwrap(), [42]);
//! ```
//!
//! VMs talk to the outside world through [`Input`] and [`Output`] endpoints;
//! wire several together with [`channel`]s and run each on its own thread.

pub mod amplifier;
pub mod channel;
pub mod error;
pub mod memory;
pub mod num;
pub mod op;
pub mod port;
pub mod program;
pub mod vm;

pub use channel::channel;
pub use error::{DecodeError, Error, MemoryError, PortError};
pub use memory::Memory;
pub use num::IntNum;
pub use port::{Input, Output};
pub use program::Program;
pub use vm::{execute, Handle, Vm, VmState};
