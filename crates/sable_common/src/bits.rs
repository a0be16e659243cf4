//! Arbitrary-width two-state bit vectors.
//!
//! [`Bits`] is the numeric value type shared by the interval domain and the
//! Verilog emitter. Values are unsigned; arithmetic wraps at the vector width.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Number of bits stored per storage word.
const BITS_PER_WORD: u32 = 64;

/// Largest power of ten that fits in a `u64`, used as the radix for decimal
/// conversion of wide values.
const DECIMAL_CHUNK: u64 = 10_000_000_000_000_000_000;

/// Digits per [`DECIMAL_CHUNK`].
const DECIMAL_CHUNK_DIGITS: usize = 19;

/// Preferred radix and prefix style when rendering a [`Bits`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatPreference {
    /// Whatever the consumer considers natural (decimal for emission).
    Default,
    /// Unsigned decimal.
    Decimal,
    /// Binary with a `0b` prefix.
    Binary,
    /// Hexadecimal with a `0x` prefix.
    Hex,
    /// Binary digits only.
    PlainBinary,
    /// Hexadecimal digits only.
    PlainHex,
}

/// An unsigned bit vector of fixed width.
///
/// Storage is little-endian `u64` words; bits at or above `width` are always
/// zero so derived equality and hashing compare values. A zero-width vector
/// is valid and holds the single value `0`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bits {
    width: u32,
    words: Vec<u64>,
}

impl Bits {
    /// Creates a zero value of the given width.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            words: vec![0; word_count(width)],
        }
    }

    /// Creates a value of the given width from a `u64`.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not fit in `width` bits.
    pub fn from_u64(value: u64, width: u32) -> Self {
        assert!(
            width >= 64 || value >> width == 0,
            "value {value} does not fit in {width} bits"
        );
        let mut bits = Self::new(width);
        if let Some(word) = bits.words.first_mut() {
            *word = value;
        }
        bits
    }

    /// Creates a value with every bit set.
    pub fn all_ones(width: u32) -> Self {
        let mut bits = Self {
            width,
            words: vec![u64::MAX; word_count(width)],
        };
        bits.clear_unused();
        bits
    }

    /// Creates the value `2^exponent` at the given width.
    ///
    /// # Panics
    ///
    /// Panics if `exponent >= width`.
    pub fn power_of_two(exponent: u32, width: u32) -> Self {
        assert!(
            exponent < width,
            "2^{exponent} is not representable in {width} bits"
        );
        let mut bits = Self::new(width);
        bits.set(exponent, true);
        bits
    }

    /// Returns the number of bits in this value.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the bit at `index` (bit 0 is the least significant).
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> bool {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = self.words[(index / BITS_PER_WORD) as usize];
        (word >> (index % BITS_PER_WORD)) & 1 != 0
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: bool) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = &mut self.words[(index / BITS_PER_WORD) as usize];
        let mask = 1u64 << (index % BITS_PER_WORD);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Returns the value as a `u64`, or `None` if it needs more than 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.words.iter().skip(1).any(|&w| w != 0) {
            return None;
        }
        Some(self.words.first().copied().unwrap_or(0))
    }

    /// Returns true if the value is representable as a `u64`.
    pub fn fits_in_u64(&self) -> bool {
        self.to_u64().is_some()
    }

    /// Returns true if every bit is zero (always true for zero width).
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns true if every bit is one (always true for zero width).
    pub fn is_all_ones(&self) -> bool {
        *self == Self::all_ones(self.width)
    }

    /// Compares two values as unsigned integers. Widths may differ.
    pub fn ucmp(&self, other: &Self) -> Ordering {
        let len = self.words.len().max(other.words.len());
        for i in (0..len).rev() {
            let a = self.words.get(i).copied().unwrap_or(0);
            let b = other.words.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Unsigned `self < other`.
    pub fn ult(&self, other: &Self) -> bool {
        self.ucmp(other) == Ordering::Less
    }

    /// Unsigned `self > other`.
    pub fn ugt(&self, other: &Self) -> bool {
        self.ucmp(other) == Ordering::Greater
    }

    /// Unsigned `self <= other`.
    pub fn ule(&self, other: &Self) -> bool {
        self.ucmp(other) != Ordering::Greater
    }

    /// Unsigned `self >= other`.
    pub fn uge(&self, other: &Self) -> bool {
        self.ucmp(other) != Ordering::Less
    }

    /// Returns the unsigned minimum of two values.
    pub fn umin<'a>(&'a self, other: &'a Self) -> &'a Self {
        if self.ule(other) {
            self
        } else {
            other
        }
    }

    /// Returns the unsigned maximum of two values.
    pub fn umax<'a>(&'a self, other: &'a Self) -> &'a Self {
        if self.uge(other) {
            self
        } else {
            other
        }
    }

    /// Wrapping addition.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn add(&self, other: &Self) -> Self {
        assert_eq!(self.width, other.width, "Bits width mismatch in add");
        let mut result = Self::new(self.width);
        let mut carry = false;
        for (i, out) in result.words.iter_mut().enumerate() {
            let (sum, c1) = self.words[i].overflowing_add(other.words[i]);
            let (sum, c2) = sum.overflowing_add(carry as u64);
            *out = sum;
            carry = c1 || c2;
        }
        result.clear_unused();
        result
    }

    /// Wrapping subtraction.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn sub(&self, other: &Self) -> Self {
        assert_eq!(self.width, other.width, "Bits width mismatch in sub");
        let mut result = Self::new(self.width);
        let mut borrow = false;
        for (i, out) in result.words.iter_mut().enumerate() {
            let (diff, b1) = self.words[i].overflowing_sub(other.words[i]);
            let (diff, b2) = diff.overflowing_sub(borrow as u64);
            *out = diff;
            borrow = b1 || b2;
        }
        result.clear_unused();
        result
    }

    /// Wrapping `self + 1`. The zero-width value is its own successor.
    pub fn increment(&self) -> Self {
        let mut result = self.clone();
        for word in result.words.iter_mut() {
            let (sum, carry) = word.overflowing_add(1);
            *word = sum;
            if !carry {
                break;
            }
        }
        result.clear_unused();
        result
    }

    /// Renders the value with the given preference, including any prefix.
    pub fn to_string_in(&self, pref: FormatPreference) -> String {
        match pref {
            FormatPreference::Default | FormatPreference::Decimal => self.to_decimal(),
            FormatPreference::Binary => format!("0b{}", self.to_raw_digits(pref, false)),
            FormatPreference::Hex => format!("0x{}", self.to_raw_digits(pref, false)),
            FormatPreference::PlainBinary | FormatPreference::PlainHex => {
                self.to_raw_digits(pref, false)
            }
        }
    }

    /// Renders the digits of the value without any prefix.
    ///
    /// Binary and hex digits are grouped by `_` every four digits counting
    /// from the least significant end. With `leading_zeros` the digit count
    /// covers the full width.
    pub fn to_raw_digits(&self, pref: FormatPreference, leading_zeros: bool) -> String {
        let bits_per_digit = match pref {
            FormatPreference::Default | FormatPreference::Decimal => return self.to_decimal(),
            FormatPreference::Binary | FormatPreference::PlainBinary => 1,
            FormatPreference::Hex | FormatPreference::PlainHex => 4,
        };
        let total_digits = (self.width.div_ceil(bits_per_digit) as usize).max(1);
        let mut digits: Vec<char> = (0..total_digits)
            .map(|d| {
                let mut nibble = 0u32;
                for b in 0..bits_per_digit {
                    let index = d as u32 * bits_per_digit + b;
                    if index < self.width && self.get(index) {
                        nibble |= 1 << b;
                    }
                }
                std::char::from_digit(nibble, 16).unwrap_or('?')
            })
            .collect();
        if !leading_zeros {
            while digits.len() > 1 && digits.last() == Some(&'0') {
                digits.pop();
            }
        }
        let mut out = String::with_capacity(digits.len() + digits.len() / 4);
        for (i, c) in digits.iter().enumerate().rev() {
            out.push(*c);
            if i != 0 && i % 4 == 0 {
                out.push('_');
            }
        }
        out
    }

    fn to_decimal(&self) -> String {
        let mut words = self.words.clone();
        let mut chunks = Vec::new();
        loop {
            let mut remainder: u128 = 0;
            for word in words.iter_mut().rev() {
                let cur = (remainder << 64) | *word as u128;
                *word = (cur / DECIMAL_CHUNK as u128) as u64;
                remainder = cur % DECIMAL_CHUNK as u128;
            }
            chunks.push(remainder as u64);
            if words.iter().all(|&w| w == 0) {
                break;
            }
        }
        let mut out = String::new();
        for (i, chunk) in chunks.iter().rev().enumerate() {
            if i == 0 {
                out.push_str(&chunk.to_string());
            } else {
                out.push_str(&format!("{chunk:0width$}", width = DECIMAL_CHUNK_DIGITS));
            }
        }
        out
    }

    /// Zeroes storage bits above the width.
    fn clear_unused(&mut self) {
        let used = self.width % BITS_PER_WORD;
        if used != 0 {
            if let Some(top) = self.words.last_mut() {
                *top &= (1u64 << used) - 1;
            }
        }
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bits[{}]:{}", self.width, self.to_decimal())
    }
}

/// Returns the number of u64 words needed to store `width` bits.
fn word_count(width: u32) -> usize {
    width.div_ceil(BITS_PER_WORD) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_is_zero_and_all_ones() {
        let b = Bits::new(0);
        assert_eq!(b.width(), 0);
        assert!(b.is_zero());
        assert!(b.is_all_ones());
        assert_eq!(b.to_u64(), Some(0));
        assert_eq!(b.to_string(), "0");
    }

    #[test]
    fn from_u64_and_back() {
        let b = Bits::from_u64(53, 6);
        assert_eq!(b.to_u64(), Some(53));
        assert!(b.get(0));
        assert!(!b.get(1));
        assert!(b.get(5));
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn from_u64_too_wide() {
        let _ = Bits::from_u64(64, 6);
    }

    #[test]
    fn all_ones_masks_top_word() {
        let b = Bits::all_ones(70);
        assert!(b.is_all_ones());
        assert_eq!(b.to_u64(), None);
        assert_eq!(Bits::all_ones(6).to_u64(), Some(63));
    }

    #[test]
    fn add_wraps() {
        let a = Bits::all_ones(6);
        let one = Bits::from_u64(1, 6);
        assert!(a.add(&one).is_zero());
        assert_eq!(a.increment(), Bits::new(6));
    }

    #[test]
    fn add_carries_across_words() {
        let a = Bits::from_u64(u64::MAX, 100);
        let one = Bits::from_u64(1, 100);
        let sum = a.add(&one);
        assert_eq!(sum, Bits::power_of_two(64, 100));
    }

    #[test]
    fn sub_wraps() {
        let zero = Bits::new(8);
        let one = Bits::from_u64(1, 8);
        assert_eq!(zero.sub(&one), Bits::all_ones(8));
        let big = Bits::power_of_two(64, 160);
        assert_eq!(
            big.sub(&Bits::from_u64(1, 160)),
            Bits::from_u64(u64::MAX, 160)
        );
    }

    #[test]
    fn unsigned_compare_mixed_widths() {
        let a = Bits::from_u64(5, 8);
        let b = Bits::from_u64(7, 100);
        assert!(a.ult(&b));
        assert!(b.ugt(&a));
        assert_eq!(a.ucmp(&Bits::from_u64(5, 3)), Ordering::Equal);
        assert_eq!(a.umin(&b), &a);
        assert_eq!(a.umax(&b), &b);
    }

    #[test]
    fn decimal_of_wide_value() {
        let b = Bits::power_of_two(64, 65);
        assert_eq!(b.to_string(), "18446744073709551616");
        let c = Bits::power_of_two(127, 128);
        assert_eq!(
            c.to_string_in(FormatPreference::Decimal),
            "170141183460469231731687303715884105728"
        );
    }

    #[test]
    fn hex_and_binary_digits() {
        let b = Bits::from_u64(0xab, 12);
        assert_eq!(b.to_raw_digits(FormatPreference::Hex, true), "0ab");
        assert_eq!(b.to_raw_digits(FormatPreference::Hex, false), "ab");
        assert_eq!(b.to_string_in(FormatPreference::Hex), "0xab");
        assert_eq!(
            b.to_raw_digits(FormatPreference::Binary, true),
            "0000_1010_1011"
        );
        assert_eq!(b.to_string_in(FormatPreference::PlainBinary), "1010_1011");
    }

    #[test]
    fn hex_grouping_on_wide_values() {
        let b = Bits::from_u64(0xdead_beef, 32);
        assert_eq!(b.to_raw_digits(FormatPreference::PlainHex, true), "dead_beef");
        assert_eq!(Bits::new(0).to_raw_digits(FormatPreference::Hex, true), "0");
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Bits::from_u64(4, 6)), "bits[6]:4");
    }

    #[test]
    fn serde_roundtrip() {
        let b = Bits::power_of_two(70, 80);
        let json = serde_json::to_string(&b).unwrap();
        let back: Bits = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }
}
