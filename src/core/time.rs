//! Fixed-point time representation for the timeline engine.
//! Time is counted in units of 10^-8 (eight fractional digits), so repeated
//! snapping and panning over long timelines never accumulates float drift.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Rem, Sub, SubAssign};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Time constants for conversions
pub mod constants {
    /// Number of fractional decimal digits kept by [`super::TimeValue`]
    pub const PRECISION: usize = 8;
    pub const UNITS_PER_SECOND: i64 = 100_000_000;
    pub const UNITS_PER_MILLI: i64 = 100_000;

    pub const SECONDS_PER_MINUTE: i64 = 60;
    pub const SECONDS_PER_HOUR: i64 = 3_600;
    pub const SECONDS_PER_DAY: i64 = 86_400;
}

use constants::{PRECISION, UNITS_PER_MILLI, UNITS_PER_SECOND};

/// Error returned when text cannot be read as a [`TimeValue`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTimeError {
    #[error("empty time value")]
    Empty,
    #[error("invalid time value: {0:?}")]
    Invalid(String),
    #[error("time value out of range: {0:?}")]
    Overflow(String),
}

/// An exact decimal number of seconds (or abstract timeline units).
///
/// Stored as a count of 10^-8 units. Ordering, equality and hashing are
/// exact, which is what the range invariants rely on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeValue(i64);

impl TimeValue {
    pub const ZERO: TimeValue = TimeValue(0);
    pub const ONE: TimeValue = TimeValue(UNITS_PER_SECOND);
    pub const MIN: TimeValue = TimeValue(i64::MIN);
    pub const MAX: TimeValue = TimeValue(i64::MAX);

    /// Build a value from raw 10^-8 units
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Raw 10^-8 units
    #[inline]
    pub const fn units(self) -> i64 {
        self.0
    }

    /// Whole seconds
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(UNITS_PER_SECOND))
    }

    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(UNITS_PER_MILLI))
    }

    /// Convert seconds (f64), rounded to the nearest unit
    #[inline]
    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds * UNITS_PER_SECOND as f64).round() as i64)
    }

    #[inline]
    pub fn to_seconds(self) -> f64 {
        self.0 as f64 / UNITS_PER_SECOND as f64
    }

    /// Time of a frame index at a given integer frame rate
    pub fn from_frames(frames: i64, fps: u32) -> Self {
        Self::ONE.mul_ratio(frames, i64::from(fps.max(1)))
    }

    /// Frame index containing this time (floored, also for negative values)
    pub fn to_frame_index(self, fps: u32) -> i64 {
        let scaled = i128::from(self.0) * i128::from(fps);
        scaled.div_euclid(i128::from(UNITS_PER_SECOND)) as i64
    }

    /// Index of the nearest frame; an exact half frame rounds away from zero
    pub fn nearest_frame(self, fps: u32) -> i64 {
        let scaled = i128::from(self.0) * i128::from(fps);
        saturate(div_round_half_away(scaled, i128::from(UNITS_PER_SECOND)))
    }

    #[inline]
    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `self * num / den`, computed exactly and rounded half away from zero.
    /// Saturates at the representable bounds; a zero `den` saturates toward
    /// the sign of `self * num`, and zero stays zero.
    pub fn mul_ratio(self, num: i64, den: i64) -> Self {
        if den == 0 {
            return match (i128::from(self.0) * i128::from(num)).signum() {
                1 => Self::MAX,
                -1 => Self::MIN,
                _ => Self::ZERO,
            };
        }
        let quotient = div_round_half_away(i128::from(self.0) * i128::from(num), i128::from(den));
        Self(saturate(quotient))
    }

    /// Non-negative remainder of `self / step`
    #[inline]
    pub fn rem_euclid(self, step: TimeValue) -> Self {
        Self(self.0.rem_euclid(step.0))
    }

    /// Largest multiple of `step` that is `<= self`
    #[inline]
    pub fn floor_to(self, step: TimeValue) -> Self {
        self - self.rem_euclid(step)
    }

    /// Smallest multiple of `step` that is `>= self`
    pub fn ceil_to(self, step: TimeValue) -> Self {
        let rem = self.rem_euclid(step);
        if rem.is_zero() {
            self
        } else {
            self - rem + step
        }
    }

    /// Whether `self` lies exactly on a multiple of `step`
    #[inline]
    pub fn is_multiple_of(self, step: TimeValue) -> bool {
        step.0 != 0 && self.0 % step.0 == 0
    }
}

fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) == (denominator < 0) {
            quotient + 1
        } else {
            quotient - 1
        }
    } else {
        quotient
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

impl Add for TimeValue {
    type Output = TimeValue;

    #[inline]
    fn add(self, rhs: TimeValue) -> TimeValue {
        TimeValue(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TimeValue {
    type Output = TimeValue;

    #[inline]
    fn sub(self, rhs: TimeValue) -> TimeValue {
        TimeValue(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for TimeValue {
    fn add_assign(&mut self, rhs: TimeValue) {
        *self = *self + rhs;
    }
}

impl SubAssign for TimeValue {
    fn sub_assign(&mut self, rhs: TimeValue) {
        *self = *self - rhs;
    }
}

impl Neg for TimeValue {
    type Output = TimeValue;

    #[inline]
    fn neg(self) -> TimeValue {
        TimeValue(self.0.saturating_neg())
    }
}

impl Rem for TimeValue {
    type Output = TimeValue;

    /// Exact remainder with the sign of `self`, like integer `%`
    #[inline]
    fn rem(self, rhs: TimeValue) -> TimeValue {
        TimeValue(self.0 % rhs.0)
    }
}

impl Mul<i64> for TimeValue {
    type Output = TimeValue;

    #[inline]
    fn mul(self, rhs: i64) -> TimeValue {
        TimeValue(self.0.saturating_mul(rhs))
    }
}

impl Div<i64> for TimeValue {
    type Output = TimeValue;

    /// Division rounded half away from zero. Dividing by zero saturates like
    /// [`TimeValue::mul_ratio`] instead of panicking.
    #[inline]
    fn div(self, rhs: i64) -> TimeValue {
        self.mul_ratio(1, rhs)
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let per_second = UNITS_PER_SECOND as u64;
        let whole = magnitude / per_second;
        let fraction = magnitude % per_second;
        let sign = if self.0 < 0 { "-" } else { "" };

        if fraction == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let digits = format!("{:0width$}", fraction, width = PRECISION);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for TimeValue {
    type Err = ParseTimeError;

    /// Parse exact decimal text such as `"7.3"`, `"-12"` or `".25"`.
    /// Digits past the eighth fractional place round half away from zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ParseTimeError::Empty);
        }

        let (negative, body) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));

        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(ParseTimeError::Invalid(text.to_string()));
        }

        let overflow = || ParseTimeError::Overflow(text.to_string());

        // |MIN| does not fit in i64
        let mut units: i128 = 0;
        for digit in whole.bytes() {
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add(i128::from(digit - b'0')))
                .filter(|u| *u <= i128::from(i64::MAX) + 1)
                .ok_or_else(overflow)?;
        }
        units *= i128::from(UNITS_PER_SECOND);

        let fraction = fraction.as_bytes();
        let mut place = i128::from(UNITS_PER_SECOND / 10);
        for digit in fraction.iter().take(PRECISION) {
            units += i128::from(digit - b'0') * place;
            place /= 10;
        }
        if fraction.get(PRECISION).is_some_and(|&digit| digit >= b'5') {
            units += 1;
        }

        let signed = if negative { -units } else { units };
        i64::try_from(signed).map(TimeValue).map_err(|_| overflow())
    }
}

impl Serialize for TimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct TimeValueVisitor;

impl<'de> Visitor<'de> for TimeValueVisitor {
    type Value = TimeValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal time value as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<TimeValue, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<TimeValue, E> {
        v.checked_mul(UNITS_PER_SECOND)
            .map(TimeValue)
            .ok_or_else(|| E::custom(ParseTimeError::Overflow(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<TimeValue, E> {
        let signed =
            i64::try_from(v).map_err(|_| E::custom(ParseTimeError::Overflow(v.to_string())))?;
        self.visit_i64(signed)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<TimeValue, E> {
        // Go through the shortest decimal rendering so 7.3 stays exactly 7.3
        v.to_string().parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for TimeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimeValueVisitor)
    }
}

/// Format time as HH:MM:SS.mmm (milliseconds truncated)
pub fn format_clock(value: TimeValue) -> String {
    let sign = if value.is_negative() { "-" } else { "" };
    let magnitude = value.abs().units();
    let total_millis = magnitude / UNITS_PER_MILLI;
    let millis = total_millis % 1000;
    let total_seconds = total_millis / 1000;
    let hours = total_seconds / constants::SECONDS_PER_HOUR;
    let minutes = (total_seconds % constants::SECONDS_PER_HOUR) / constants::SECONDS_PER_MINUTE;
    let seconds = total_seconds % constants::SECONDS_PER_MINUTE;

    format!("{}{:02}:{:02}:{:02}.{:03}", sign, hours, minutes, seconds, millis)
}

/// Format time as HH:MM:SS:FF timecode at an integer frame rate
pub fn format_timecode(value: TimeValue, fps: u32) -> String {
    let fps = i64::from(fps.max(1));
    let sign = if value.is_negative() { "-" } else { "" };
    let total_frames = value.abs().to_frame_index(fps as u32);
    let frames = total_frames % fps;
    let total_seconds = total_frames / fps;
    let hours = total_seconds / constants::SECONDS_PER_HOUR;
    let minutes = (total_seconds % constants::SECONDS_PER_HOUR) / constants::SECONDS_PER_MINUTE;
    let seconds = total_seconds % constants::SECONDS_PER_MINUTE;

    format!("{}{:02}:{:02}:{:02}:{:02}", sign, hours, minutes, seconds, frames)
}
