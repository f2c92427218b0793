//! Reconciliation of each row's runs against the frontier.
//!
//! Rows are stitched along the horizontal grid line between the previous row
//! and the current one, visiting the line's vertices left to right. Around a
//! vertex the four cells (`NW`, `NE`, `SE`, `SW`) fall into *sectors*: maximal
//! groups of cyclically adjacent cells of one class. Diagonal cells of the
//! same class are separate sectors, which gives 4-connectivity.
//!
//! Each sector's outline passes through the vertex once, entering along one
//! half-edge and leaving along another:
//!
//! * previous-row walls (`Up`) end or start arms already on the frontier,
//! * current-row walls (`Down`) become the new frontier's arm ends,
//! * horizontal half-edges (`Left`, `Right`) are carried from one vertex to
//!   the next as the pending *upper* strand (bottom of the previous row,
//!   walked right to left) and *lower* strand (top of the current row, walked
//!   left to right).
//!
//! A sector made only of upper cells closes or continues the outline of a
//! previous-row region that this run does not continue; a sector joining
//! upper and lower cells of one class splices the run onto that region.
//! Runs with no same-class cell above them start a fresh boundary whose top
//! edge is drawn at once, so their own sectors need no further work.

use log::trace;

use crate::classify::Class;
use crate::errors::{Result, VectorizeError};
use crate::vectorize::boundary::{ArmId, Boundaries, BoundaryId, ClosedRing, Corner, Fault, Link};
use crate::vectorize::frontier::Frontier;
use crate::vectorize::runs::{Run, Runs};

const NW: usize = 0;
const NE: usize = 1;
const SE: usize = 2;
const SW: usize = 3;

/// Half-edges incident to a frontier vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Up,
    Right,
    Down,
    Left,
}

/// The half-edge following each quadrant, clockwise.
const EDGE_AFTER: [Edge; 4] = [Edge::Up, Edge::Right, Edge::Down, Edge::Left];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sector {
    first: usize,
    last: usize,
}

impl Sector {
    /// The half-edge along which the outline arrives.
    fn inbound(&self) -> Edge {
        EDGE_AFTER[self.last]
    }

    /// The half-edge along which the outline leaves.
    fn outbound(&self) -> Edge {
        EDGE_AFTER[(self.first + 3) % 4]
    }

    fn is_lower(&self) -> bool {
        self.first >= SE && self.last >= SE
    }

    fn contains(&self, quadrant: usize) -> bool {
        let span = (self.last + 4 - self.first) % 4;
        (quadrant + 4 - self.first) % 4 <= span
    }
}

/// Split the cells around a vertex into sectors. A uniform neighborhood has none.
fn sectors(quadrants: &[Option<Class>; 4]) -> [Option<Sector>; 4] {
    let mut out = [None; 4];
    if quadrants.iter().all(|q| *q == quadrants[0]) {
        return out;
    }
    for first in 0..4 {
        let Some(class) = quadrants[first] else {
            continue;
        };
        if quadrants[(first + 3) % 4] == Some(class) {
            continue;
        }
        let mut last = first;
        while quadrants[(last + 1) % 4] == Some(class) {
            last = (last + 1) % 4;
        }
        out[first] = Some(Sector { first, last });
    }
    out
}

fn cell(row: &[Class], column: Option<usize>) -> Option<Class> {
    column.and_then(|c| row.get(c)).copied()
}

fn fault(f: Fault, row: usize, column: usize) -> VectorizeError {
    match f {
        Fault::Stale => VectorizeError::BrokenFrontier {
            row,
            column,
            msg: "stale boundary handle",
        },
        Fault::Degenerate => VectorizeError::EmptyBoundary { row, column },
        Fault::Mismatch => VectorizeError::BrokenFrontier {
            row,
            column,
            msg: "boundaries of different classes joined",
        },
    }
}

fn broken(row: usize, column: usize, msg: &'static str) -> VectorizeError {
    VectorizeError::BrokenFrontier { row, column, msg }
}

/// What the current row looks like under one vertex.
#[derive(Debug, Clone, Copy)]
struct Lower {
    /// The run left of the vertex started a fresh boundary.
    sw_fresh: bool,
    /// The run right of the vertex started a fresh boundary.
    se_fresh: bool,
    /// Boundary of the run right of the vertex.
    se_boundary: Option<BoundaryId>,
}

impl Lower {
    const NONE: Lower = Lower {
        sw_fresh: false,
        se_fresh: false,
        se_boundary: None,
    };
}

/// Streaming boundary tracer over classified rows.
#[derive(Debug)]
pub(crate) struct Tracer {
    width: usize,
    row: usize,
    above: Vec<Class>,
    boundaries: Boundaries,
    frontier: Frontier,
    upper: Option<ArmId>,
    lower: Option<ArmId>,
    closed: Vec<ClosedRing>,
    finished: bool,
}

impl Tracer {
    pub fn new(width: usize) -> Self {
        Tracer {
            width,
            row: 0,
            above: Vec::with_capacity(width),
            boundaries: Boundaries::new(),
            frontier: Frontier::new(width),
            upper: None,
            lower: None,
            closed: Vec::new(),
            finished: false,
        }
    }

    /// Number of rows pushed so far.
    pub fn rows(&self) -> usize {
        self.row
    }

    /// Rings closed since the last call, in closing order.
    pub fn drain_closed(&mut self) -> std::vec::Drain<'_, ClosedRing> {
        self.closed.drain(..)
    }

    /// Reconcile one classified row against everything above it.
    pub fn push_row(&mut self, classes: &[Class]) -> Result<()> {
        if self.finished {
            return Err(VectorizeError::BadArgument(
                "cannot push rows after the bottom edge was closed".to_string(),
            ));
        }
        if classes.len() != self.width {
            return Err(VectorizeError::BadArgument(format!(
                "row {} has {} samples, expected {}",
                self.row,
                classes.len(),
                self.width
            )));
        }

        let mut left_fresh = false;
        for run in Runs::new(self.row, classes) {
            left_fresh = self.reconcile(&run, classes, left_fresh)?;
        }
        let lower = Lower {
            sw_fresh: left_fresh,
            ..Lower::NONE
        };
        self.junction(self.width, self.quadrants(self.width, Some(classes)), lower)?;

        self.frontier.advance(&mut self.boundaries);
        self.above.clear();
        self.above.extend_from_slice(classes);
        self.row += 1;
        Ok(())
    }

    /// Close every boundary still open along the bottom edge of the image.
    ///
    /// Calling this more than once has no further effect.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        for x in 0..=self.width {
            self.junction(x, self.quadrants(x, None), Lower::NONE)?;
        }
        if self.boundaries.live_boundaries() != 0 {
            return Err(broken(self.row, self.width, "boundary left open at the bottom edge"));
        }
        self.frontier.clear_previous();
        self.above.clear();
        self.finished = true;
        trace!("Closed bottom edge after {} rows", self.row);
        Ok(())
    }

    /// Reconcile one run and report whether it opened a fresh boundary.
    fn reconcile(&mut self, run: &Run, classes: &[Class], left_fresh: bool) -> Result<bool> {
        let mut friendly = None;
        for extent in self.frontier.overlapping(run) {
            let class = self
                .boundaries
                .class(extent.boundary)
                .map_err(|f| fault(f, run.row, extent.start))?;
            if class == run.class {
                friendly = Some(extent.boundary);
                break;
            }
        }

        let fresh = friendly.is_none();
        let boundary = match friendly {
            Some(boundary) => self.boundaries.resolve(boundary),
            None => {
                let (boundary, arm) = self
                    .boundaries
                    .start(run.class, run.row, run.start, run.end);
                self.frontier.current.tails[run.start] = Some(arm);
                self.frontier.current.heads[run.right()] = Some(arm);
                boundary
            }
        };
        trace!(
            "Row {}: run {}..={} of {:?} {}",
            run.row,
            run.start,
            run.end,
            run.class,
            if fresh { "starts a boundary" } else { "continues a boundary" }
        );

        for x in run.start..=run.end {
            let lower = Lower {
                sw_fresh: if x == run.start { left_fresh } else { fresh },
                se_fresh: fresh,
                se_boundary: Some(boundary),
            };
            self.junction(x, self.quadrants(x, Some(classes)), lower)?;
        }
        self.frontier.current.claim(run, boundary);
        Ok(fresh)
    }

    fn quadrants(&self, x: usize, below: Option<&[Class]>) -> [Option<Class>; 4] {
        let left = x.checked_sub(1);
        let mut q = [None; 4];
        q[NW] = cell(&self.above, left);
        q[NE] = cell(&self.above, Some(x));
        if let Some(below) = below {
            q[SE] = cell(below, Some(x));
            q[SW] = cell(below, left);
        }
        q
    }

    /// Stitch every sector around vertex `x` of the current frontier line.
    fn junction(&mut self, x: usize, quadrants: [Option<Class>; 4], lower: Lower) -> Result<()> {
        let y = self.row;
        let here = Corner::new(x, y);
        let below = Corner::new(x, y + 1);

        let mut upper_in = self.upper.take();
        let mut lower_in = self.lower.take();
        if let Some(arm) = upper_in {
            self.boundaries
                .extend_start(arm, here)
                .map_err(|f| fault(f, y, x))?;
        }
        if let Some(arm) = lower_in {
            self.boundaries
                .extend_end(arm, here)
                .map_err(|f| fault(f, y, x))?;
        }

        for sector in sectors(&quadrants).into_iter().flatten() {
            if sector.is_lower() {
                let fresh = if sector.contains(SE) {
                    lower.se_fresh
                } else {
                    lower.sw_fresh
                };
                if fresh {
                    continue;
                }
            }

            match (sector.inbound(), sector.outbound()) {
                (Edge::Down, Edge::Right) => {
                    let boundary = lower
                        .se_boundary
                        .ok_or_else(|| broken(y, x, "run has no boundary"))?;
                    let arm = self
                        .boundaries
                        .rise(boundary, here)
                        .map_err(|f| fault(f, y, x))?;
                    self.frontier.current.tails[x] = Some(arm);
                    self.lower = Some(arm);
                }
                (Edge::Right, Edge::Down) => {
                    let boundary = x
                        .checked_sub(1)
                        .and_then(|left| self.frontier.previous.owners[left])
                        .ok_or_else(|| broken(y, x, "cell above has no owner"))?;
                    let arm = self
                        .boundaries
                        .dangle(boundary, here)
                        .map_err(|f| fault(f, y, x))?;
                    self.frontier.current.heads[x] = Some(arm);
                    self.upper = Some(arm);
                }
                (Edge::Down, outbound) => {
                    let arm = self.outbound_arm(outbound, x, &mut upper_in)?;
                    self.boundaries
                        .extend_start(arm, below)
                        .map_err(|f| fault(f, y, x))?;
                    self.frontier.current.tails[x] = Some(arm);
                }
                (Edge::Right, outbound) => {
                    self.upper = Some(self.outbound_arm(outbound, x, &mut upper_in)?);
                }
                (inbound, Edge::Down) => {
                    let arm = self.inbound_arm(inbound, x, &mut lower_in)?;
                    self.boundaries
                        .extend_end(arm, below)
                        .map_err(|f| fault(f, y, x))?;
                    self.frontier.current.heads[x] = Some(arm);
                }
                (inbound, Edge::Right) => {
                    self.lower = Some(self.inbound_arm(inbound, x, &mut lower_in)?);
                }
                (inbound, outbound) => {
                    let head = self.inbound_arm(inbound, x, &mut lower_in)?;
                    let tail = self.outbound_arm(outbound, x, &mut upper_in)?;
                    match self.boundaries.link(head, tail).map_err(|f| fault(f, y, x))? {
                        Link::Closed(ring) => {
                            trace!(
                                "Row {y}: closed {:?} ring of {} vertices at x = {x}",
                                ring.class,
                                ring.corners.len()
                            );
                            self.closed.push(ring);
                        }
                        Link::Open => {}
                    }
                }
            }
        }

        if upper_in.is_some() || lower_in.is_some() {
            return Err(broken(y, x, "horizontal edge was not continued"));
        }
        let (sw, se) = (quadrants[SW], quadrants[SE]);
        if sw != se {
            if sw.is_some() && self.frontier.current.heads[x].is_none() {
                return Err(VectorizeError::EmptyBoundary { row: y, column: x });
            }
            if se.is_some() && self.frontier.current.tails[x].is_none() {
                return Err(VectorizeError::EmptyBoundary { row: y, column: x });
            }
        }
        Ok(())
    }

    /// The arm whose end arrives at vertex `x` along `edge`.
    fn inbound_arm(&mut self, edge: Edge, x: usize, lower_in: &mut Option<ArmId>) -> Result<ArmId> {
        let arm = match edge {
            Edge::Up => self.frontier.previous.heads[x].take(),
            Edge::Left => lower_in.take(),
            Edge::Right | Edge::Down => None,
        };
        arm.ok_or_else(|| broken(self.row, x, "no arm arrives at vertex"))
    }

    /// The arm whose start leaves vertex `x` along `edge`.
    fn outbound_arm(&mut self, edge: Edge, x: usize, upper_in: &mut Option<ArmId>) -> Result<ArmId> {
        let arm = match edge {
            Edge::Up => self.frontier.previous.tails[x].take(),
            Edge::Left => upper_in.take(),
            Edge::Right | Edge::Down => None,
        };
        arm.ok_or_else(|| broken(self.row, x, "no arm leaves vertex"))
    }
}
