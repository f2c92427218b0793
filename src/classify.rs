//! Sample classification.
//!
//! A [`ClassTable`] is an ordered list of disjoint [`ValueRange`]s. Each range
//! is one class, named by its position in the table ([`ClassId`]). `NaN`
//! samples always belong to the reserved [`Class::NoData`], which can never
//! collide with a caller range.

use std::fmt::{Display, Formatter};

use crate::errors::{Result, VectorizeError};

/// Index of a range in a [`ClassTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub usize);

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "class #{}", self.0)
    }
}

/// The class a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Class {
    Range(ClassId),
    NoData,
}

impl Class {
    pub fn id(self) -> Option<ClassId> {
        match self {
            Class::Range(id) => Some(id),
            Class::NoData => None,
        }
    }

    pub fn is_no_data(self) -> bool {
        self == Class::NoData
    }
}

/// A numeric interval with independently open or closed bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    min: f64,
    max: f64,
    min_included: bool,
    max_included: bool,
}

impl ValueRange {
    /// Half-open range `[min, max)`.
    pub fn new(min: f64, max: f64) -> Self {
        Self::with_bounds(min, true, max, false)
    }

    /// Closed range `[min, max]`.
    pub fn inclusive(min: f64, max: f64) -> Self {
        Self::with_bounds(min, true, max, true)
    }

    /// Range holding exactly `value`.
    pub fn exact(value: f64) -> Self {
        Self::inclusive(value, value)
    }

    /// Range `[min, +inf]`.
    pub fn at_least(min: f64) -> Self {
        Self::inclusive(min, f64::INFINITY)
    }

    /// Range `[-inf, max)`.
    pub fn below(max: f64) -> Self {
        Self::with_bounds(f64::NEG_INFINITY, true, max, false)
    }

    pub fn with_bounds(min: f64, min_included: bool, max: f64, max_included: bool) -> Self {
        ValueRange {
            min,
            max,
            min_included,
            max_included,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        let above = if self.min_included {
            value >= self.min
        } else {
            value > self.min
        };
        let below = if self.max_included {
            value <= self.max
        } else {
            value < self.max
        };
        above && below
    }

    /// Returns `true` if no value can fall in this range.
    pub fn is_empty(&self) -> bool {
        if self.min.is_nan() || self.max.is_nan() {
            return true;
        }
        if self.min == self.max {
            return !(self.min_included && self.max_included);
        }
        self.min > self.max
    }

    /// Returns `true` if some value falls in both ranges. Empty ranges overlap nothing.
    pub fn overlaps(&self, other: &ValueRange) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (low, high) = if (self.min, !self.min_included) <= (other.min, !other.min_included) {
            (self, other)
        } else {
            (other, self)
        };
        if high.min < low.max {
            return true;
        }
        high.min == low.max && high.min_included && low.max_included
    }
}

impl Display for ValueRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let open = if self.min_included { '[' } else { '(' };
        let close = if self.max_included { ']' } else { ')' };
        write!(f, "{open}{}, {}{close}", self.min, self.max)
    }
}

/// The caller's set of classes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassTable {
    ranges: Vec<ValueRange>,
}

impl ClassTable {
    pub fn new(ranges: Vec<ValueRange>) -> Self {
        ClassTable { ranges }
    }

    /// Build contiguous classes from increasing break values.
    ///
    /// `N` breaks yield `N - 1` classes `[b0, b1)`, `[b1, b2)`, ..., with the
    /// last class closed on both ends so that the final break is covered.
    ///
    /// ```rust
    /// use polygonize::{Class, ClassId, ClassTable};
    ///
    /// let table = ClassTable::from_breaks(&[0.0, 10.0, 20.0]).unwrap();
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.classify(10.0).unwrap(), Class::Range(ClassId(1)));
    /// assert_eq!(table.classify(20.0).unwrap(), Class::Range(ClassId(1)));
    /// assert!(table.classify(20.5).is_err());
    /// ```
    pub fn from_breaks(breaks: &[f64]) -> Result<Self> {
        if breaks.len() < 2 {
            return Err(VectorizeError::BadArgument(
                "at least two breaks are required".to_string(),
            ));
        }
        if breaks.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(VectorizeError::BadArgument(
                "breaks must be strictly increasing".to_string(),
            ));
        }
        let last = breaks.len() - 2;
        let ranges = breaks
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                if i == last {
                    ValueRange::inclusive(w[0], w[1])
                } else {
                    ValueRange::new(w[0], w[1])
                }
            })
            .collect();
        Ok(ClassTable { ranges })
    }

    /// Append a range, returning its class id.
    pub fn push(&mut self, range: ValueRange) -> ClassId {
        self.ranges.push(range);
        ClassId(self.ranges.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn range(&self, id: ClassId) -> Option<&ValueRange> {
        self.ranges.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.ranges.len()).map(ClassId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ValueRange)> {
        self.ranges
            .iter()
            .enumerate()
            .map(|(i, range)| (ClassId(i), range))
    }

    /// Classify one sample.
    ///
    /// `NaN` is [`Class::NoData`]; this check precedes any range comparison.
    /// Any other value must fall in one of the ranges, otherwise
    /// [`VectorizeError::ValueOutOfRange`] is returned.
    pub fn classify(&self, sample: f64) -> Result<Class> {
        if sample.is_nan() {
            return Ok(Class::NoData);
        }
        self.ranges
            .iter()
            .position(|range| range.contains(sample))
            .map(|i| Class::Range(ClassId(i)))
            .ok_or(VectorizeError::ValueOutOfRange { value: sample })
    }

    /// Check that every range is non-empty and that no two ranges overlap.
    pub fn validate(&self) -> Result<()> {
        for (id, range) in self.iter() {
            if range.is_empty() {
                return Err(VectorizeError::BadArgument(format!(
                    "{id} has an empty range {range}"
                )));
            }
        }
        for (i, a) in self.iter() {
            for (j, b) in self.iter().skip(i.0 + 1) {
                if a.overlaps(b) {
                    return Err(VectorizeError::BadArgument(format!(
                        "{i} {a} overlaps {j} {b}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<ValueRange> for ClassTable {
    fn from_iter<I: IntoIterator<Item = ValueRange>>(iter: I) -> Self {
        ClassTable::new(iter.into_iter().collect())
    }
}
