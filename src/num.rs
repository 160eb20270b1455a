// Copyright (c) 2022 Bastiaan Marinus van de Weerd

//! The numeric type held by memory cells, operands, ports and channels.

use std::{fmt::{Debug, Display}, str::FromStr};


/// A cell value. `Default` must be zero.
pub trait IntNum: Clone + Debug + Display + Default + PartialEq + PartialOrd + FromStr + Send + Sync + 'static {
	fn from_i64(_: i64) -> Self;
	fn from_bool(b: bool) -> Self { Self::from_i64(i64::from(b)) }

	/// `None` when the value does not fit; instruction words, addresses,
	/// jump targets and base adjustments all go through this.
	fn try_as_i64(&self) -> Option<i64>;

	fn checked_add(&self, rhs: &Self) -> Option<Self>;
	fn checked_mul(&self, rhs: &Self) -> Option<Self>;

	fn is_zero(&self) -> bool { *self == Self::default() }
}

impl IntNum for i64 {
	fn from_i64(i: i64) -> Self { i }

	fn try_as_i64(&self) -> Option<i64> { Some(*self) }

	fn checked_add(&self, rhs: &Self) -> Option<Self> { i64::checked_add(*self, *rhs) }
	fn checked_mul(&self, rhs: &Self) -> Option<Self> { i64::checked_mul(*self, *rhs) }

	fn is_zero(&self) -> bool { *self == 0 }
}

#[cfg(feature = "bigint")]
impl IntNum for num_bigint::BigInt {
	fn from_i64(i: i64) -> Self { Self::from(i) }

	fn try_as_i64(&self) -> Option<i64> { i64::try_from(self).ok() }

	fn checked_add(&self, rhs: &Self) -> Option<Self> { Some(self + rhs) }
	fn checked_mul(&self, rhs: &Self) -> Option<Self> { Some(self * rhs) }
}
