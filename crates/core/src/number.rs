//! Numeric payload of [`Value::Number`](crate::Value::Number).
//!
//! jq stores every number as an IEEE-754 double. Values built from native
//! integers keep their exact `i64` here so that a native integer survives a
//! round trip through the value model even beyond 2^53.
//!
//! ## Integral rule
//!
//! A number is *integral* when it was built from an integer, or when it is a
//! finite float with no fractional part. Integral numbers convert back to a
//! native integer; everything else converts back to a native float.

use std::cmp::Ordering;
use std::fmt;

/// A JSON number: exact integer or double.
#[derive(Clone, Copy)]
pub struct Number(N);

#[derive(Clone, Copy)]
enum N {
    Int(i64),
    Float(f64),
}

/// `i64::MIN` as f64 is exact; `i64::MAX as f64` rounds up to 2^63, so the
/// upper bound is exclusive.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

impl Number {
    /// Create a number from an exact integer.
    pub fn from_i64(i: i64) -> Self {
        Number(N::Int(i))
    }

    /// Create a number from an unsigned integer.
    ///
    /// Values above `i64::MAX` fall back to a double, which is the same
    /// precision jq itself offers.
    pub fn from_u64(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Number(N::Int(i)),
            Err(_) => Number(N::Float(u as f64)),
        }
    }

    /// Create a number from a double.
    pub fn from_f64(f: f64) -> Self {
        Number(N::Float(f))
    }

    /// Whether the numeric payload is a whole number.
    pub fn is_integral(&self) -> bool {
        match self.0 {
            N::Int(_) => true,
            N::Float(f) => f.is_finite() && f.fract() == 0.0,
        }
    }

    /// The value as an `i64`, if it is integral and in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self.0 {
            N::Int(i) => Some(i),
            N::Float(f) if self.is_integral() && (I64_LOWER..I64_UPPER).contains(&f) => {
                Some(f as i64)
            }
            N::Float(_) => None,
        }
    }

    /// The value as a double. Exact integers beyond 2^53 lose precision.
    pub fn as_f64(&self) -> f64 {
        match self.0 {
            N::Int(i) => i as f64,
            N::Float(f) => f,
        }
    }

    /// `-0.0`, which is integral but keeps its sign when dumped.
    pub fn is_negative_zero(&self) -> bool {
        matches!(self.0, N::Float(f) if f == 0.0 && f.is_sign_negative())
    }

    /// Whether the number was stored as an exact integer.
    pub fn is_exact_int(&self) -> bool {
        matches!(self.0, N::Int(_))
    }

    /// Checked addition, staying exact while both sides are exact integers.
    pub fn add(self, other: Number) -> Number {
        match (self.0, other.0) {
            (N::Int(a), N::Int(b)) => match a.checked_add(b) {
                Some(sum) => Number::from_i64(sum),
                None => Number::from_f64(a as f64 + b as f64),
            },
            _ => Number::from_f64(self.as_f64() + other.as_f64()),
        }
    }

    /// Checked subtraction, staying exact while both sides are exact integers.
    pub fn sub(self, other: Number) -> Number {
        match (self.0, other.0) {
            (N::Int(a), N::Int(b)) => match a.checked_sub(b) {
                Some(diff) => Number::from_i64(diff),
                None => Number::from_f64(a as f64 - b as f64),
            },
            _ => Number::from_f64(self.as_f64() - other.as_f64()),
        }
    }

    /// Checked multiplication, staying exact while both sides are exact integers.
    pub fn mul(self, other: Number) -> Number {
        match (self.0, other.0) {
            (N::Int(a), N::Int(b)) => match a.checked_mul(b) {
                Some(product) => Number::from_i64(product),
                None => Number::from_f64(a as f64 * b as f64),
            },
            _ => Number::from_f64(self.as_f64() * other.as_f64()),
        }
    }

    /// Division always goes through doubles, like jq.
    pub fn div(self, other: Number) -> Number {
        Number::from_f64(self.as_f64() / other.as_f64())
    }
}

// Numeric equality: Int(1) == Float(1.0), NaN != NaN
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (N::Int(a), N::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.0, other.0) {
            (N::Int(a), N::Int(b)) => Some(a.cmp(&b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            N::Int(i) => write!(f, "{}", i),
            N::Float(x) => write!(f, "{:?}", x),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0, self.as_i64()) {
            (N::Int(i), _) => write!(f, "{}", i),
            _ if self.is_negative_zero() => f.write_str("-0.0"),
            (N::Float(_), Some(i)) => write!(f, "{}", i),
            (N::Float(x), None) if x.is_nan() => f.write_str("null"),
            (N::Float(x), None) if x.is_infinite() => {
                let clamped = if x > 0.0 { f64::MAX } else { f64::MIN };
                write!(f, "{:e}", clamped)
            }
            (N::Float(x), None) => write!(f, "{}", x),
        }
    }
}

macro_rules! number_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Number {
            fn from(i: $t) -> Self {
                Number::from_i64(i as i64)
            }
        })*
    };
}

macro_rules! number_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Number {
            fn from(u: $t) -> Self {
                Number::from_u64(u as u64)
            }
        })*
    };
}

number_from_signed!(i8, i16, i32, i64, isize);
number_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Number {
    fn from(f: f32) -> Self {
        Number::from_f64(f as f64)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::from_f64(f)
    }
}
