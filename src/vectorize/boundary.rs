//! Boundary chains: region outlines under construction.
//!
//! A *boundary* is one connected region of one class whose outline is still
//! being traced. Its outline is kept as a set of open *arms*: polylines of
//! grid corners that leave the frontier line upwards at their start (the
//! left edge of a previous-row extent) and come back down to it at their end
//! (the right edge of an extent). Arms are walked with the region on their
//! right-hand side, which makes outer rings clockwise on screen.
//!
//! Linking the end of one arm to the start of another splices them into one
//! arm; linking an arm to itself closes a ring. A boundary is retired once
//! its last arm has closed.
//!
//! Boundaries and arms are addressed by handles into arenas. Merging two
//! boundaries (or splicing two arms) redirects the absorbed handle to the
//! survivor, so frontier cells never have to be rewritten mid-row.

use std::collections::VecDeque;

use crate::classify::Class;

/// A pixel-corner position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Corner {
    pub x: usize,
    pub y: usize,
}

impl Corner {
    pub const fn new(x: usize, y: usize) -> Self {
        Corner { x, y }
    }
}

fn collinear(a: Corner, b: Corner, c: Corner) -> bool {
    (a.x == b.x && b.x == c.x) || (a.y == b.y && b.y == c.y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BoundaryId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ArmId(usize);

#[derive(Debug)]
enum Entry<T> {
    Live(T),
    Merged(usize),
    Vacant,
}

/// Slot storage with union-find style redirects.
///
/// Entries that were merged away or removed stay unavailable until
/// [`Arena::collect_garbage`], so stale handles held by the frontier keep
/// resolving correctly for the rest of the row.
#[derive(Debug)]
struct Arena<T> {
    entries: Vec<Entry<T>>,
    free: Vec<usize>,
    garbage: Vec<usize>,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Arena {
            entries: Vec::new(),
            free: Vec::new(),
            garbage: Vec::new(),
        }
    }

    fn insert(&mut self, value: T) -> usize {
        match self.free.pop() {
            Some(i) => {
                self.entries[i] = Entry::Live(value);
                i
            }
            None => {
                self.entries.push(Entry::Live(value));
                self.entries.len() - 1
            }
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while let Entry::Merged(next) = self.entries[root] {
            root = next;
        }
        let mut cur = i;
        while let Entry::Merged(next) = self.entries[cur] {
            self.entries[cur] = Entry::Merged(root);
            cur = next;
        }
        root
    }

    fn get(&self, i: usize) -> Option<&T> {
        match &self.entries[i] {
            Entry::Live(value) => Some(value),
            _ => None,
        }
    }

    fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        match &mut self.entries[i] {
            Entry::Live(value) => Some(value),
            _ => None,
        }
    }

    fn take(&mut self, i: usize, replacement: Entry<T>) -> Option<T> {
        match std::mem::replace(&mut self.entries[i], replacement) {
            Entry::Live(value) => {
                self.garbage.push(i);
                Some(value)
            }
            other => {
                self.entries[i] = other;
                None
            }
        }
    }

    /// Move the value out of `from` and point `from` at `to`.
    fn redirect(&mut self, from: usize, to: usize) -> Option<T> {
        self.take(from, Entry::Merged(to))
    }

    fn remove(&mut self, i: usize) -> Option<T> {
        self.take(i, Entry::Vacant)
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().filter_map(|e| match e {
            Entry::Live(value) => Some(value),
            _ => None,
        })
    }

    fn collect_garbage(&mut self) {
        for i in self.garbage.drain(..) {
            self.entries[i] = Entry::Vacant;
            self.free.push(i);
        }
    }

    fn live(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Live(_)))
            .count()
    }
}

#[derive(Debug)]
struct Boundary {
    class: Class,
    open_arms: usize,
}

/// An open polyline of corners; only corner vertices are kept.
#[derive(Debug)]
struct Arm {
    boundary: usize,
    corners: VecDeque<Corner>,
}

impl Arm {
    fn push_back(&mut self, c: Corner) {
        let n = self.corners.len();
        if n > 0 && self.corners[n - 1] == c {
            return;
        }
        if n >= 2 && collinear(self.corners[n - 2], self.corners[n - 1], c) {
            self.corners.pop_back();
        }
        self.corners.push_back(c);
    }

    fn push_front(&mut self, c: Corner) {
        let n = self.corners.len();
        if n > 0 && self.corners[0] == c {
            return;
        }
        if n >= 2 && collinear(c, self.corners[0], self.corners[1]) {
            self.corners.pop_front();
        }
        self.corners.push_front(c);
    }
}

/// A ring that has just closed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClosedRing {
    pub class: Class,
    /// Corners in walking order, starting at the top-left corner and repeating it at the end.
    pub corners: Vec<Corner>,
}

impl ClosedRing {
    /// Twice the shoelace area in grid units; positive for outer rings.
    pub fn doubled_area(&self) -> i64 {
        self.corners
            .windows(2)
            .map(|w| {
                let (a, b) = (w[0], w[1]);
                a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
            })
            .sum()
    }
}

/// Outcome of a link.
#[derive(Debug)]
pub(crate) enum Link {
    Open,
    Closed(ClosedRing),
}

/// Why a boundary operation could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    /// The handle no longer refers to a live boundary or arm.
    Stale,
    /// A ring closed with too few corners to enclose any area.
    Degenerate,
    /// Two boundaries of different classes were about to be joined.
    Mismatch,
}

type Op<T> = std::result::Result<T, Fault>;

/// Owner of every boundary and arm of one vectorization run.
#[derive(Debug)]
pub(crate) struct Boundaries {
    chains: Arena<Boundary>,
    arms: Arena<Arm>,
}

impl Boundaries {
    pub fn new() -> Self {
        Boundaries {
            chains: Arena::new(),
            arms: Arena::new(),
        }
    }

    /// Open a new boundary for a run with nothing of its class above it.
    ///
    /// The single arm climbs the run's left wall, crosses its top edge at `y`
    /// and descends its right wall, spanning columns `start..=end`.
    pub fn start(&mut self, class: Class, y: usize, start: usize, end: usize) -> (BoundaryId, ArmId) {
        let boundary = self.chains.insert(Boundary {
            class,
            open_arms: 1,
        });
        let corners = VecDeque::from([
            Corner::new(start, y + 1),
            Corner::new(start, y),
            Corner::new(end + 1, y),
            Corner::new(end + 1, y + 1),
        ]);
        let arm = self.arms.insert(Arm { boundary, corners });
        (BoundaryId(boundary), ArmId(arm))
    }

    /// Open an arm that descends from `top` by one row, and whose upper end is
    /// still waiting to be reached along the frontier line.
    pub fn dangle(&mut self, boundary: BoundaryId, top: Corner) -> Op<ArmId> {
        self.open_arm(boundary, [top, Corner::new(top.x, top.y + 1)])
    }

    /// Open an arm that climbs to `top` from one row below, and whose lower
    /// end continues along the frontier line.
    pub fn rise(&mut self, boundary: BoundaryId, top: Corner) -> Op<ArmId> {
        self.open_arm(boundary, [Corner::new(top.x, top.y + 1), top])
    }

    fn open_arm(&mut self, boundary: BoundaryId, corners: [Corner; 2]) -> Op<ArmId> {
        let boundary = self.chains.find(boundary.0);
        self.chains.get_mut(boundary).ok_or(Fault::Stale)?.open_arms += 1;
        let corners = VecDeque::from(corners);
        Ok(ArmId(self.arms.insert(Arm { boundary, corners })))
    }

    pub fn resolve(&mut self, boundary: BoundaryId) -> BoundaryId {
        BoundaryId(self.chains.find(boundary.0))
    }

    pub fn resolve_arm(&mut self, arm: ArmId) -> ArmId {
        ArmId(self.arms.find(arm.0))
    }

    pub fn class(&mut self, boundary: BoundaryId) -> Op<Class> {
        let i = self.chains.find(boundary.0);
        self.chains.get(i).map(|b| b.class).ok_or(Fault::Stale)
    }

    /// Number of arms of `boundary` that are still open; zero for retired boundaries.
    #[cfg(test)]
    pub fn open_arms(&mut self, boundary: BoundaryId) -> usize {
        let i = self.chains.find(boundary.0);
        self.chains.get(i).map_or(0, |b| b.open_arms)
    }

    /// Splice `absorbed` into `survivor`; both must belong to the same class.
    ///
    /// Returns the surviving handle. Every handle to `absorbed` resolves to it afterwards.
    pub fn merge(&mut self, survivor: BoundaryId, absorbed: BoundaryId) -> Op<BoundaryId> {
        let survivor = self.chains.find(survivor.0);
        let absorbed = self.chains.find(absorbed.0);
        if survivor == absorbed {
            return Ok(BoundaryId(survivor));
        }
        let kept_class = self.chains.get(survivor).ok_or(Fault::Stale)?.class;
        let gone_class = self.chains.get(absorbed).ok_or(Fault::Stale)?.class;
        if kept_class != gone_class {
            return Err(Fault::Mismatch);
        }
        let gone = self.chains.redirect(absorbed, survivor).ok_or(Fault::Stale)?;
        self.chains.get_mut(survivor).ok_or(Fault::Stale)?.open_arms += gone.open_arms;
        Ok(BoundaryId(survivor))
    }

    /// Move an arm's start to `corner`, drawing an edge from `corner` to the old start.
    pub fn extend_start(&mut self, arm: ArmId, corner: Corner) -> Op<()> {
        let i = self.arms.find(arm.0);
        self.arms.get_mut(i).ok_or(Fault::Stale)?.push_front(corner);
        Ok(())
    }

    /// Move an arm's end to `corner`, drawing an edge from the old end to `corner`.
    pub fn extend_end(&mut self, arm: ArmId, corner: Corner) -> Op<()> {
        let i = self.arms.find(arm.0);
        self.arms.get_mut(i).ok_or(Fault::Stale)?.push_back(corner);
        Ok(())
    }

    /// Connect the end of `head` to the start of `tail` with a straight edge.
    ///
    /// Distinct arms are spliced into one (their boundaries merged if they
    /// were not already). Linking an arm to itself closes its ring, which is
    /// returned; the boundary is retired when that was its last open arm.
    pub fn link(&mut self, head: ArmId, tail: ArmId) -> Op<Link> {
        let head = self.arms.find(head.0);
        let tail = self.arms.find(tail.0);

        if head == tail {
            let arm = self.arms.remove(head).ok_or(Fault::Stale)?;
            let boundary = self.chains.find(arm.boundary);
            let chain = self.chains.get_mut(boundary).ok_or(Fault::Stale)?;
            chain.open_arms -= 1;
            let class = chain.class;
            if chain.open_arms == 0 {
                self.chains.remove(boundary);
            }
            let corners = close_ring(arm.corners).ok_or(Fault::Degenerate)?;
            return Ok(Link::Closed(ClosedRing { class, corners }));
        }

        let head_boundary = self.arms.get(head).ok_or(Fault::Stale)?.boundary;
        let tail_boundary = self.arms.get(tail).ok_or(Fault::Stale)?.boundary;
        let boundary = self
            .merge(BoundaryId(head_boundary), BoundaryId(tail_boundary))?
            .0;

        // Splice the shorter arm into the longer one.
        let head_len = self.arms.get(head).map_or(0, |a| a.corners.len());
        let tail_len = self.arms.get(tail).map_or(0, |a| a.corners.len());
        if head_len >= tail_len {
            let moved = self.arms.redirect(tail, head).ok_or(Fault::Stale)?;
            let kept = self.arms.get_mut(head).ok_or(Fault::Stale)?;
            for c in moved.corners {
                kept.push_back(c);
            }
            kept.boundary = boundary;
        } else {
            let moved = self.arms.redirect(head, tail).ok_or(Fault::Stale)?;
            let kept = self.arms.get_mut(tail).ok_or(Fault::Stale)?;
            for c in moved.corners.into_iter().rev() {
                kept.push_front(c);
            }
            kept.boundary = boundary;
        }

        self.chains.get_mut(boundary).ok_or(Fault::Stale)?.open_arms -= 1;
        Ok(Link::Open)
    }

    /// Release the handles merged away or retired since the last call.
    ///
    /// Only safe once nothing outside the arenas holds unresolved handles any
    /// more. Open arms are re-pointed at their surviving boundary first, as
    /// released slots are reused by later boundaries of any class.
    pub fn collect_garbage(&mut self) {
        let Boundaries { chains, arms } = &mut *self;
        for arm in arms.values_mut() {
            arm.boundary = chains.find(arm.boundary);
        }
        chains.collect_garbage();
        arms.collect_garbage();
    }

    /// Number of boundaries that are neither merged away nor retired.
    pub fn live_boundaries(&self) -> usize {
        self.chains.live()
    }

    #[cfg(test)]
    fn corners(&mut self, arm: ArmId) -> Vec<Corner> {
        let i = self.arms.find(arm.0);
        self.arms
            .get(i)
            .map(|a| a.corners.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// Turn a self-linked arm into a closed ring starting at its top-left corner.
///
/// Returns `None` if fewer than four corners remain, which no rectilinear
/// ring can have.
fn close_ring(mut corners: VecDeque<Corner>) -> Option<Vec<Corner>> {
    if corners.len() >= 2 && corners.front() == corners.back() {
        corners.pop_back();
    }
    // The closing edge may continue the first or last edge of the arm.
    while corners.len() >= 3 && collinear(corners[corners.len() - 1], corners[0], corners[1]) {
        corners.pop_front();
    }
    while corners.len() >= 3
        && collinear(corners[corners.len() - 2], corners[corners.len() - 1], corners[0])
    {
        corners.pop_back();
    }
    if corners.len() < 4 {
        return None;
    }

    let first = corners
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| (c.y, c.x))
        .map(|(i, _)| i)?;
    corners.rotate_left(first);
    let mut ring: Vec<Corner> = corners.into();
    ring.push(ring[0]);
    Some(ring)
}
