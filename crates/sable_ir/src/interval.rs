//! Closed intervals over fixed-width bit vectors.
//!
//! An [`Interval`] `[lo, hi]` covers every value from `lo` up to `hi`. When
//! `lo > hi` (unsigned) the interval is *improper* and wraps through zero,
//! covering `[lo, max] ∪ [0, hi]`. All predicates here are defined over the
//! set of covered points, not over the raw bounds.

use sable_common::Bits;
use std::fmt;

/// Number of points covered by an interval or interval set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// The exact point count.
    Exact(i64),
    /// The count does not fit in an `i64`.
    Unrepresentable,
}

impl Cardinality {
    /// Returns the exact count, if representable.
    pub fn exact(self) -> Option<i64> {
        match self {
            Cardinality::Exact(n) => Some(n),
            Cardinality::Unrepresentable => None,
        }
    }

    /// Sums two cardinalities, becoming unrepresentable on overflow.
    pub fn checked_add(self, other: Cardinality) -> Cardinality {
        match (self, other) {
            (Cardinality::Exact(a), Cardinality::Exact(b)) => {
                a.checked_add(b).map_or(Cardinality::Unrepresentable, Cardinality::Exact)
            }
            _ => Cardinality::Unrepresentable,
        }
    }
}

/// A closed, possibly wrapping, range of bit-vector values.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    lo: Bits,
    hi: Bits,
}

impl Interval {
    /// Creates `[lo, hi]`.
    ///
    /// # Panics
    ///
    /// Panics if the bounds have different widths.
    pub fn new(lo: Bits, hi: Bits) -> Self {
        assert_eq!(
            lo.width(),
            hi.width(),
            "interval bounds must have the same width"
        );
        Self { lo, hi }
    }

    /// The interval covering every value of the given width.
    pub fn maximal(width: u32) -> Self {
        Self::new(Bits::new(width), Bits::all_ones(width))
    }

    /// The interval covering exactly `value`.
    pub fn precise(value: Bits) -> Self {
        Self::new(value.clone(), value)
    }

    /// Lower bound.
    pub fn lower_bound(&self) -> &Bits {
        &self.lo
    }

    /// Upper bound.
    pub fn upper_bound(&self) -> &Bits {
        &self.hi
    }

    /// Width of both bounds.
    pub fn bit_count(&self) -> u32 {
        self.lo.width()
    }

    /// Returns true if the interval wraps through zero.
    pub fn is_improper(&self) -> bool {
        self.lo.ugt(&self.hi)
    }

    /// Returns true if the interval covers exactly one point.
    pub fn is_precise(&self) -> bool {
        self.lo == self.hi
    }

    /// Returns true if the interval covers every point of its width.
    pub fn is_maximal(&self) -> bool {
        self.hi.increment() == self.lo
    }

    /// Returns true if `point` lies in the interval.
    ///
    /// # Panics
    ///
    /// Panics if the point width differs from the interval width.
    pub fn covers(&self, point: &Bits) -> bool {
        assert_eq!(point.width(), self.bit_count(), "point width mismatch");
        if self.is_improper() {
            point.uge(&self.lo) || point.ule(&self.hi)
        } else {
            point.uge(&self.lo) && point.ule(&self.hi)
        }
    }

    /// Number of covered points.
    pub fn size(&self) -> Cardinality {
        let span = self.hi.sub(&self.lo);
        match span.to_u64() {
            Some(n) if n < i64::MAX as u64 => Cardinality::Exact(n as i64 + 1),
            _ => Cardinality::Unrepresentable,
        }
    }

    /// Splits the interval into at most two proper intervals covering the
    /// same points, in ascending order.
    pub fn to_proper(&self) -> Vec<Interval> {
        if self.is_improper() {
            let width = self.bit_count();
            vec![
                Interval::new(Bits::new(width), self.hi.clone()),
                Interval::new(self.lo.clone(), Bits::all_ones(width)),
            ]
        } else {
            vec![self.clone()]
        }
    }

    /// Returns true if the two intervals share a point.
    pub fn overlaps(lhs: &Interval, rhs: &Interval) -> bool {
        assert_eq!(lhs.bit_count(), rhs.bit_count(), "interval width mismatch");
        for a in lhs.to_proper() {
            for b in rhs.to_proper() {
                if a.lo.ule(&b.hi) && b.lo.ule(&a.hi) {
                    return true;
                }
            }
        }
        false
    }

    /// Returns true if the two intervals share no point.
    pub fn disjoint(lhs: &Interval, rhs: &Interval) -> bool {
        !Interval::overlaps(lhs, rhs)
    }

    /// Returns true if the intervals are disjoint and some point of one is
    /// immediately followed (without wrapping past the maximum) by a point
    /// of the other.
    ///
    /// A maximal interval abuts nothing since every point is already inside
    /// it, and the zero-width interval does not abut itself.
    pub fn abuts(lhs: &Interval, rhs: &Interval) -> bool {
        assert_eq!(lhs.bit_count(), rhs.bit_count(), "interval width mismatch");
        if lhs.bit_count() == 0 || Interval::overlaps(lhs, rhs) {
            return false;
        }
        let max = Bits::all_ones(lhs.bit_count());
        let adjacent = |a: &Interval, b: &Interval| a.hi != max && a.hi.increment() == b.lo;
        for a in lhs.to_proper() {
            for b in rhs.to_proper() {
                if adjacent(&a, &b) || adjacent(&b, &a) {
                    return true;
                }
            }
        }
        false
    }

    /// The smallest proper interval containing every point of both.
    pub fn convex_hull(lhs: &Interval, rhs: &Interval) -> Interval {
        assert_eq!(lhs.bit_count(), rhs.bit_count(), "interval width mismatch");
        if lhs.is_improper() || rhs.is_improper() {
            // An improper interval covers both zero and the maximum.
            return Interval::maximal(lhs.bit_count());
        }
        Interval::new(
            lhs.lo.umin(&rhs.lo).clone(),
            lhs.hi.umax(&rhs.hi).clone(),
        )
    }

    /// Calls `f` on each covered point, starting at the lower bound and
    /// wrapping past the maximum for improper intervals. `f` returns `true`
    /// to stop early, in which case this returns `true`.
    pub fn for_each_element(&self, mut f: impl FnMut(&Bits) -> bool) -> bool {
        let mut value = self.lo.clone();
        loop {
            if f(&value) {
                return true;
            }
            if value == self.hi {
                return false;
            }
            value = value.increment();
        }
    }

    /// Every covered point, in iteration order.
    pub fn elements(&self) -> Vec<Bits> {
        let mut out = Vec::new();
        self.for_each_element(|bits| {
            out.push(bits.clone());
            false
        });
        out
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interval(bits[{}]: {self})", self.bit_count())
    }
}
