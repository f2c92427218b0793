use crate::classify::Class;

/// A maximal horizontal group of same-class pixels: columns `start..=end` of `row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run {
    pub class: Class,
    pub row: usize,
    pub start: usize,
    pub end: usize,
}

impl Run {
    /// One past the last column, i.e. the x of the run's right edge.
    pub fn right(&self) -> usize {
        self.end + 1
    }
}

/// Splits one classified row into runs, left to right.
pub(crate) struct Runs<'a> {
    row: usize,
    classes: &'a [Class],
    column: usize,
}

impl<'a> Runs<'a> {
    pub fn new(row: usize, classes: &'a [Class]) -> Self {
        Runs {
            row,
            classes,
            column: 0,
        }
    }
}

impl Iterator for Runs<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let start = self.column;
        let class = *self.classes.get(start)?;
        let len = self.classes[start..]
            .iter()
            .take_while(|&&c| c == class)
            .count();
        self.column = start + len;
        Some(Run {
            class,
            row: self.row,
            start,
            end: start + len - 1,
        })
    }
}

impl std::iter::FusedIterator for Runs<'_> {}
