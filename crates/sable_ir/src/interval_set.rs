//! Sets of points represented as a list of intervals.

use crate::interval::{Cardinality, Interval};
use sable_common::Bits;
use std::fmt;

/// A set of bit-vector values of a single width.
///
/// Intervals may be added in any order and may overlap. [`normalize`]
/// rewrites the list into sorted, disjoint, non-abutting proper intervals;
/// queries that depend on that shape require a normalized set.
///
/// [`normalize`]: IntervalSet::normalize
#[derive(Clone)]
pub struct IntervalSet {
    bit_count: Option<u32>,
    intervals: Vec<Interval>,
    is_normalized: bool,
}

impl Default for IntervalSet {
    fn default() -> Self {
        Self::new()
    }
}

impl IntervalSet {
    /// Creates a set with no bit count. Call [`set_bit_count`] or
    /// [`set_intervals`] before adding intervals.
    ///
    /// [`set_bit_count`]: IntervalSet::set_bit_count
    /// [`set_intervals`]: IntervalSet::set_intervals
    pub fn new() -> Self {
        Self {
            bit_count: None,
            intervals: Vec::new(),
            is_normalized: true,
        }
    }

    /// Creates an empty set of the given width.
    pub fn with_bit_count(bit_count: u32) -> Self {
        Self {
            bit_count: Some(bit_count),
            ..Self::new()
        }
    }

    /// The set containing every value of the given width.
    pub fn maximal(bit_count: u32) -> Self {
        let mut set = Self::with_bit_count(bit_count);
        set.add_interval(Interval::maximal(bit_count));
        set.normalize();
        set
    }

    /// The set containing only `value`.
    pub fn precise(value: Bits) -> Self {
        let mut set = Self::with_bit_count(value.width());
        set.add_interval(Interval::precise(value));
        set.normalize();
        set
    }

    /// Width of every member, if known.
    pub fn bit_count(&self) -> Option<u32> {
        self.bit_count
    }

    /// Sets the width of the set.
    ///
    /// # Panics
    ///
    /// Panics if intervals of a different width are already present.
    pub fn set_bit_count(&mut self, bit_count: u32) {
        assert!(
            self.intervals.iter().all(|i| i.bit_count() == bit_count),
            "cannot change the bit count of a non-empty interval set"
        );
        self.bit_count = Some(bit_count);
    }

    /// Returns true if [`normalize`](IntervalSet::normalize) has run since
    /// the last mutation.
    pub fn is_normalized(&self) -> bool {
        self.is_normalized
    }

    /// Adds an interval without normalizing.
    ///
    /// # Panics
    ///
    /// Panics if the bit count is unset or differs from the interval width.
    pub fn add_interval(&mut self, interval: Interval) {
        let bit_count = self
            .bit_count
            .unwrap_or_else(|| panic!("interval set bit count was never set"));
        assert_eq!(
            interval.bit_count(),
            bit_count,
            "interval width does not match interval set bit count"
        );
        self.intervals.push(interval);
        self.is_normalized = false;
    }

    /// Replaces the contents. The bit count is taken from the first
    /// interval, or cleared when the list is empty.
    ///
    /// # Panics
    ///
    /// Panics if the intervals have mixed widths.
    pub fn set_intervals(&mut self, intervals: Vec<Interval>) {
        self.bit_count = intervals.first().map(Interval::bit_count);
        if let Some(width) = self.bit_count {
            assert!(
                intervals.iter().all(|i| i.bit_count() == width),
                "all intervals in a set must have the same width"
            );
        }
        self.intervals = intervals;
        self.is_normalized = false;
    }

    /// Rewrites the intervals into ascending, pairwise disjoint and
    /// non-abutting proper intervals covering the same points.
    pub fn normalize(&mut self) {
        if self.is_normalized {
            return;
        }
        let before = self.intervals.len();
        let mut pieces: Vec<Interval> = self
            .intervals
            .iter()
            .flat_map(Interval::to_proper)
            .collect();
        pieces.sort_by(|a, b| a.lower_bound().ucmp(b.lower_bound()));

        let mut merged: Vec<Interval> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match merged.last_mut() {
                Some(last)
                    if Interval::overlaps(last, &piece) || Interval::abuts(last, &piece) =>
                {
                    *last = Interval::convex_hull(last, &piece);
                }
                _ => merged.push(piece),
            }
        }
        log::debug!(
            "normalized interval set: {before} intervals -> {} intervals",
            merged.len()
        );
        self.intervals = merged;
        self.is_normalized = true;
    }

    /// The normalized intervals.
    ///
    /// # Panics
    ///
    /// Panics if the set is not normalized.
    pub fn intervals(&self) -> &[Interval] {
        self.assert_normalized();
        &self.intervals
    }

    /// Number of stored intervals (normalized or not).
    pub fn number_of_intervals(&self) -> usize {
        self.intervals.len()
    }

    /// Interval at `index`, in storage order.
    pub fn interval(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    /// Calls `f` on every member in ascending order. `f` returns `true` to
    /// stop early, in which case this returns `true`.
    ///
    /// # Panics
    ///
    /// Panics if the set is not normalized.
    pub fn for_each_element(&self, mut f: impl FnMut(&Bits) -> bool) -> bool {
        self.assert_normalized();
        self.intervals
            .iter()
            .any(|interval| interval.for_each_element(&mut f))
    }

    /// Number of members.
    ///
    /// # Panics
    ///
    /// Panics if the set is not normalized.
    pub fn size(&self) -> Cardinality {
        self.assert_normalized();
        self.intervals
            .iter()
            .fold(Cardinality::Exact(0), |acc, i| acc.checked_add(i.size()))
    }

    /// Smallest interval covering every member, or `None` for the empty set.
    ///
    /// # Panics
    ///
    /// Panics if the set is not normalized.
    pub fn convex_hull(&self) -> Option<Interval> {
        self.assert_normalized();
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some(Interval::new(
            first.lower_bound().clone(),
            last.upper_bound().clone(),
        ))
    }

    /// Returns true if `point` is a member.
    pub fn covers(&self, point: &Bits) -> bool {
        self.intervals.iter().any(|i| i.covers(point))
    }

    /// Returns true if zero is a member.
    pub fn covers_zero(&self) -> bool {
        self.bit_count
            .is_some_and(|width| self.covers(&Bits::new(width)))
    }

    /// Returns true if one is a member.
    pub fn covers_one(&self) -> bool {
        self.bit_count
            .is_some_and(|width| width > 0 && self.covers(&Bits::from_u64(1, width)))
    }

    /// Returns true if the all-ones value is a member.
    pub fn covers_max(&self) -> bool {
        self.bit_count
            .is_some_and(|width| self.covers(&Bits::all_ones(width)))
    }

    /// Returns true if the set has exactly one member.
    ///
    /// # Panics
    ///
    /// Panics if the set is not normalized.
    pub fn is_precise(&self) -> bool {
        self.assert_normalized();
        self.intervals.len() == 1 && self.intervals[0].is_precise()
    }

    /// Returns the single member of a precise set.
    pub fn precise_value(&self) -> Option<&Bits> {
        if self.is_precise() {
            Some(self.intervals[0].lower_bound())
        } else {
            None
        }
    }

    /// Returns true if every value of the width is a member.
    ///
    /// # Panics
    ///
    /// Panics if the set is not normalized.
    pub fn is_maximal(&self) -> bool {
        self.assert_normalized();
        self.intervals.len() == 1 && self.intervals[0].is_maximal()
    }

    /// Returns true if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Union of two sets of the same width. The result is normalized.
    ///
    /// # Panics
    ///
    /// Panics if the bit counts differ.
    pub fn combine(lhs: &IntervalSet, rhs: &IntervalSet) -> IntervalSet {
        assert_eq!(
            lhs.bit_count, rhs.bit_count,
            "cannot combine interval sets of different widths"
        );
        let mut result = IntervalSet {
            bit_count: lhs.bit_count,
            intervals: Vec::with_capacity(lhs.intervals.len() + rhs.intervals.len()),
            is_normalized: false,
        };
        result.intervals.extend(lhs.intervals.iter().cloned());
        result.intervals.extend(rhs.intervals.iter().cloned());
        result.normalize();
        result
    }

    fn assert_normalized(&self) {
        assert!(self.is_normalized, "interval set must be normalized");
    }
}

impl PartialEq for IntervalSet {
    fn eq(&self, other: &Self) -> bool {
        if self.bit_count != other.bit_count {
            return false;
        }
        let mut lhs = self.clone();
        let mut rhs = other.clone();
        lhs.normalize();
        rhs.normalize();
        lhs.intervals == rhs.intervals
    }
}

impl Eq for IntervalSet {}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, interval) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{interval}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bit_count {
            Some(width) => write!(f, "IntervalSet(bits[{width}]: {self})"),
            None => write!(f, "IntervalSet(unsized: {self})"),
        }
    }
}
