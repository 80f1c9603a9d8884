//! Range boundaries of sorted set queries
//!
//! An [Interval] holds the two wire-ready boundary tokens of a range argument.
//!
//! Score ranges use the bare number for inclusive bounds, `(` + number for exclusive bounds
//! and `-inf`/`+inf` for missing sides. Lexicographic ranges use `[` + value for inclusive bounds,
//! `(` + value for exclusive bounds and `-`/`+` for missing sides.
//! ```
//! use resp_pipeline::commands::interval::{BoundType, Interval};
//!
//! let interval = Interval::bounded(1.5, 3.0, BoundType::LeftOpen).unwrap();
//! assert_eq!(&b"(1.5"[..], &interval.min()[..]);
//! assert_eq!(&b"3"[..], &interval.max()[..]);
//!
//! let interval = Interval::left_bounded("apple", BoundType::RightOpen).unwrap();
//! assert_eq!(&b"[apple"[..], &interval.min()[..]);
//! assert_eq!(&b"+"[..], &interval.max()[..]);
//!
//! // Right side is missing, so it can not be closed
//! assert!(Interval::left_bounded(10_i64, BoundType::Closed).is_err());
//! ```
use alloc::format;
use alloc::string::String;
use bytes::{BufMut, Bytes, BytesMut};
use core::marker::PhantomData;

/// Inclusiveness of the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundType {
    /// Both sides inclusive
    Closed,
    /// Both sides exclusive
    Open,
    /// Lower side exclusive, upper side inclusive
    LeftOpen,
    /// Lower side inclusive, upper side exclusive
    RightOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    /// Bound type does not apply to the interval shape
    #[error("{bound:?} bound is not applicable to {shape} interval")]
    InvalidBound { shape: &'static str, bound: BoundType },
}

/// Value type usable as interval boundary
pub trait IntervalBound {
    /// Token of a missing lower side
    const MIN: &'static str;
    /// Token of a missing upper side
    const MAX: &'static str;

    fn inclusive(&self) -> Bytes;

    fn exclusive(&self) -> Bytes;
}

/// Boundary of score ranges (ZCOUNT, ZRANGEBYSCORE)
pub trait ScoreBound: IntervalBound {}

/// Boundary of lexicographic ranges (ZLEXCOUNT, ZRANGEBYLEX)
pub trait LexBound: IntervalBound {}

/// Range argument of sorted set commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<T: IntervalBound> {
    min: Bytes,
    max: Bytes,
    bound: PhantomData<T>,
}

impl<T: IntervalBound> Interval<T> {
    /// Range without lower or upper limit
    pub fn unbounded() -> Self {
        Self::from_tokens(Bytes::from_static(T::MIN.as_bytes()), Bytes::from_static(T::MAX.as_bytes()))
    }

    /// Range with lower and upper limit. All bound types are applicable.
    pub fn bounded(min: T, max: T, bound: BoundType) -> Result<Self, IntervalError> {
        let (min, max) = match bound {
            BoundType::Closed => (min.inclusive(), max.inclusive()),
            BoundType::Open => (min.exclusive(), max.exclusive()),
            BoundType::LeftOpen => (min.exclusive(), max.inclusive()),
            BoundType::RightOpen => (min.inclusive(), max.exclusive()),
        };

        Ok(Self::from_tokens(min, max))
    }

    /// Range with lower limit only
    ///
    /// [Open](BoundType::Open) excludes the limit, [RightOpen](BoundType::RightOpen) includes it.
    pub fn left_bounded(min: T, bound: BoundType) -> Result<Self, IntervalError> {
        let min = match bound {
            BoundType::Open => min.exclusive(),
            BoundType::RightOpen => min.inclusive(),
            BoundType::Closed | BoundType::LeftOpen => {
                return Err(IntervalError::InvalidBound {
                    shape: "left-bounded",
                    bound,
                })
            }
        };

        Ok(Self::from_tokens(min, Bytes::from_static(T::MAX.as_bytes())))
    }

    /// Range with upper limit only
    ///
    /// [Open](BoundType::Open) excludes the limit, [LeftOpen](BoundType::LeftOpen) includes it.
    pub fn right_bounded(max: T, bound: BoundType) -> Result<Self, IntervalError> {
        let max = match bound {
            BoundType::Open => max.exclusive(),
            BoundType::LeftOpen => max.inclusive(),
            BoundType::Closed | BoundType::RightOpen => {
                return Err(IntervalError::InvalidBound {
                    shape: "right-bounded",
                    bound,
                })
            }
        };

        Ok(Self::from_tokens(Bytes::from_static(T::MIN.as_bytes()), max))
    }

    /// Token of the lower side
    pub fn min(&self) -> &Bytes {
        &self.min
    }

    /// Token of the upper side
    pub fn max(&self) -> &Bytes {
        &self.max
    }

    fn from_tokens(min: Bytes, max: Bytes) -> Self {
        Self {
            min,
            max,
            bound: PhantomData,
        }
    }
}

fn prefixed(prefix: u8, value: &[u8]) -> Bytes {
    let mut token = BytesMut::with_capacity(value.len() + 1);
    token.put_u8(prefix);
    token.put_slice(value);
    token.freeze()
}

impl IntervalBound for f64 {
    const MIN: &'static str = "-inf";
    const MAX: &'static str = "+inf";

    fn inclusive(&self) -> Bytes {
        Bytes::from(format!("{}", self))
    }

    fn exclusive(&self) -> Bytes {
        Bytes::from(format!("({}", self))
    }
}

impl IntervalBound for i64 {
    const MIN: &'static str = "-inf";
    const MAX: &'static str = "+inf";

    fn inclusive(&self) -> Bytes {
        Bytes::from(format!("{}", self))
    }

    fn exclusive(&self) -> Bytes {
        Bytes::from(format!("({}", self))
    }
}

impl ScoreBound for f64 {}
impl ScoreBound for i64 {}

impl IntervalBound for Bytes {
    const MIN: &'static str = "-";
    const MAX: &'static str = "+";

    fn inclusive(&self) -> Bytes {
        prefixed(b'[', self)
    }

    fn exclusive(&self) -> Bytes {
        prefixed(b'(', self)
    }
}

impl IntervalBound for &str {
    const MIN: &'static str = "-";
    const MAX: &'static str = "+";

    fn inclusive(&self) -> Bytes {
        prefixed(b'[', self.as_bytes())
    }

    fn exclusive(&self) -> Bytes {
        prefixed(b'(', self.as_bytes())
    }
}

impl IntervalBound for String {
    const MIN: &'static str = "-";
    const MAX: &'static str = "+";

    fn inclusive(&self) -> Bytes {
        prefixed(b'[', self.as_bytes())
    }

    fn exclusive(&self) -> Bytes {
        prefixed(b'(', self.as_bytes())
    }
}

impl LexBound for Bytes {}
impl LexBound for &str {}
impl LexBound for String {}
