use crate::vectorize::boundary::{ArmId, BoundaryId, Boundaries};
use crate::vectorize::runs::Run;

/// One row's view of the open boundaries.
///
/// `owners[x]` is the boundary occupying column `x`. On the row's bottom line,
/// `tails[x]` is the arm starting at corner `x` (a left edge) and `heads[x]`
/// the arm ending there (a right edge), so both have `width + 1` slots.
#[derive(Debug)]
pub(crate) struct FrontierRow {
    pub owners: Vec<Option<BoundaryId>>,
    pub tails: Vec<Option<ArmId>>,
    pub heads: Vec<Option<ArmId>>,
}

impl FrontierRow {
    fn new(width: usize) -> Self {
        FrontierRow {
            owners: vec![None; width],
            tails: vec![None; width + 1],
            heads: vec![None; width + 1],
        }
    }

    fn clear(&mut self) {
        self.owners.fill(None);
        self.tails.fill(None);
        self.heads.fill(None);
    }

    /// Record `boundary` as the owner of the run's columns.
    pub fn claim(&mut self, run: &Run, boundary: BoundaryId) {
        self.owners[run.start..=run.end].fill(Some(boundary));
    }

    /// Resolve every handle to its current survivor.
    fn normalize(&mut self, boundaries: &mut Boundaries) {
        for owner in self.owners.iter_mut().flatten() {
            *owner = boundaries.resolve(*owner);
        }
        for arm in self.tails.iter_mut().chain(self.heads.iter_mut()).flatten() {
            *arm = boundaries.resolve_arm(*arm);
        }
    }
}

/// Maximal group of previous-row columns owned by the same boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Extent {
    pub boundary: BoundaryId,
    pub start: usize,
    pub end: usize,
}

/// The previous and current rows of boundary ownership.
#[derive(Debug)]
pub(crate) struct Frontier {
    pub previous: FrontierRow,
    pub current: FrontierRow,
    extents: Vec<Extent>,
    cursor: usize,
}

impl Frontier {
    pub fn new(width: usize) -> Self {
        Frontier {
            previous: FrontierRow::new(width),
            current: FrontierRow::new(width),
            extents: Vec::new(),
            cursor: 0,
        }
    }

    /// Finish the current row: resolve its handles, release merged handles,
    /// then make it the previous row and start an empty current row.
    pub fn advance(&mut self, boundaries: &mut Boundaries) {
        self.current.normalize(boundaries);
        boundaries.collect_garbage();
        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.clear();
        self.extents = extents(&self.previous.owners);
        self.cursor = 0;
    }

    /// Forget the previous row entirely.
    pub fn clear_previous(&mut self) {
        self.previous.clear();
        self.extents.clear();
        self.cursor = 0;
    }

    /// All extents of the previous row, left to right.
    #[cfg(test)]
    pub fn extents(&self) -> &[Extent] {
        &self.extents
    }

    /// Previous-row extents overlapping `run`, in column order.
    ///
    /// Runs must be presented left to right; an extent reaching past the run's
    /// right edge is reported again for the next run.
    pub fn overlapping(&mut self, run: &Run) -> &[Extent] {
        while self.cursor < self.extents.len() && self.extents[self.cursor].end < run.start {
            self.cursor += 1;
        }
        let first = self.cursor;
        let mut last = first;
        while last < self.extents.len() && self.extents[last].start <= run.end {
            last += 1;
        }
        if last > first && self.extents[last - 1].end <= run.end {
            self.cursor = last;
        } else if last > first {
            self.cursor = last - 1;
        }
        &self.extents[first..last]
    }
}

/// Group cells by boundary identity.
fn extents(owners: &[Option<BoundaryId>]) -> Vec<Extent> {
    let mut out: Vec<Extent> = Vec::new();
    for (x, owner) in owners.iter().enumerate() {
        let Some(boundary) = *owner else {
            continue;
        };
        match out.last_mut() {
            Some(last) if last.boundary == boundary && last.end + 1 == x => last.end = x,
            _ => out.push(Extent {
                boundary,
                start: x,
                end: x,
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Class, ClassId};

    const A: Class = Class::Range(ClassId(0));
    const B: Class = Class::Range(ClassId(1));

    fn run(class: Class, start: usize, end: usize) -> Run {
        Run {
            class,
            row: 1,
            start,
            end,
        }
    }

    #[test]
    fn test_extents_group_by_identity() {
        let mut boundaries = Boundaries::new();
        let (a, _) = boundaries.start(A, 0, 0, 1);
        let (b, _) = boundaries.start(B, 0, 2, 2);
        let owners = vec![Some(a), Some(a), Some(b), Some(a), None];
        let got = extents(&owners);
        assert_eq!(
            got,
            vec![
                Extent { boundary: a, start: 0, end: 1 },
                Extent { boundary: b, start: 2, end: 2 },
                Extent { boundary: a, start: 3, end: 3 },
            ]
        );
    }

    #[test]
    fn test_overlapping_shares_straddling_extent() {
        let mut boundaries = Boundaries::new();
        let mut frontier = Frontier::new(6);
        let r0 = run(A, 0, 3);
        let r1 = run(B, 4, 5);
        let (a, arm_a) = boundaries.start(A, 0, 0, 3);
        let (b, arm_b) = boundaries.start(B, 0, 4, 5);
        frontier.current.claim(&r0, a);
        frontier.current.claim(&r1, b);
        frontier.current.tails[0] = Some(arm_a);
        frontier.current.heads[4] = Some(arm_a);
        frontier.current.tails[4] = Some(arm_b);
        frontier.current.heads[6] = Some(arm_b);
        frontier.advance(&mut boundaries);
        assert_eq!(frontier.extents().len(), 2);
        assert_eq!(frontier.previous.tails[4], Some(arm_b));
        assert_eq!(frontier.previous.heads[4], Some(arm_a));
        assert!(frontier.current.owners.iter().all(Option::is_none));

        let spans = |f: &mut Frontier, r: Run| -> Vec<(usize, usize)> {
            f.overlapping(&r).iter().map(|e| (e.start, e.end)).collect()
        };
        assert_eq!(spans(&mut frontier, run(B, 0, 1)), vec![(0, 3)]);
        assert_eq!(spans(&mut frontier, run(A, 2, 4)), vec![(0, 3), (4, 5)]);
        assert_eq!(spans(&mut frontier, run(B, 5, 5)), vec![(4, 5)]);
    }

    #[test]
    fn test_clear_previous() {
        let mut boundaries = Boundaries::new();
        let mut frontier = Frontier::new(2);
        let r = run(A, 0, 1);
        let (a, _) = boundaries.start(A, 0, 0, 1);
        frontier.current.claim(&r, a);
        frontier.advance(&mut boundaries);
        frontier.clear_previous();
        assert!(frontier.extents().is_empty());
        assert!(frontier.previous.owners.iter().all(Option::is_none));
    }
}
