//! Restartable cursors over circular and quadrilateral regions of the grid.

use skirmish_core::Pos;

use crate::grid::Grid;

/// Coordinate space an area is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Fine unit cells. Positions must also be covered by a surface cell.
    #[default]
    Fine,
    /// Coarse surface cells.
    Surface,
}

impl Resolution {
    fn contains(self, grid: &Grid, pos: Pos) -> bool {
        match self {
            Self::Fine => grid.is_inside_both(pos),
            Self::Surface => grid.is_inside_surface(pos),
        }
    }

    /// Last addressable position. Empty grids yield negative coordinates.
    fn max_pos(self, grid: &Grid) -> Pos {
        match self {
            Self::Fine => Pos::new(grid.width() - 1, grid.height() - 1),
            Self::Surface => Pos::new(grid.surface_width() - 1, grid.surface_height() - 1),
        }
    }

    /// Intersects the rectangle `min..=max` with the grid.
    fn clip(self, grid: &Grid, min: Pos, max: Pos) -> (Pos, Pos) {
        let limit = self.max_pos(grid);
        (
            Pos::new(min.x().max(0), min.y().max(0)),
            Pos::new(max.x().min(limit.x()), max.y().min(limit.y())),
        )
    }
}

/// Raster scan state shared by both cursors.
#[derive(Clone, Copy, Debug)]
struct Raster {
    min: Pos,
    max: Pos,
    step: i32,
    next: Option<Pos>,
}

impl Raster {
    fn new(min: Pos, max: Pos, step: i32) -> Self {
        let mut raster = Self {
            min,
            max,
            step,
            next: None,
        };
        raster.rewind();
        raster
    }

    fn rewind(&mut self) {
        let non_empty = self.min.x() <= self.max.x() && self.min.y() <= self.max.y();
        self.next = non_empty.then_some(self.min);
    }

    fn advance(&mut self) -> Option<Pos> {
        let pos = self.next?;
        let step = |value: i32, max: i32| value.checked_add(self.step).filter(|&next| next <= max);
        let following = match step(pos.x(), self.max.x()) {
            Some(x) => Some(Pos::new(x, pos.y())),
            None => step(pos.y(), self.max.y()).map(|y| Pos::new(self.min.x(), y)),
        };
        self.next = following;
        Some(pos)
    }
}

/// Positions within `radius` of a centre, row by row from the top.
///
/// A position belongs to the area when its squared distance to the centre
/// does not exceed `radius²`; positions outside the grid at the chosen
/// [`Resolution`] are skipped. The scan is clipped to the grid, so its cost
/// never exceeds the grid size.
#[derive(Clone, Debug)]
pub struct CircularArea<'a> {
    grid: &'a Grid,
    center: Pos,
    radius: i32,
    resolution: Resolution,
    raster: Raster,
    current: Option<Pos>,
}

impl<'a> CircularArea<'a> {
    /// Creates a cursor positioned before the first element. A negative
    /// radius yields nothing.
    #[must_use]
    pub fn new(grid: &'a Grid, center: Pos, radius: i32, resolution: Resolution) -> Self {
        let (min, max) = resolution.clip(
            grid,
            Pos::new(center.x().saturating_sub(radius), center.y().saturating_sub(radius)),
            Pos::new(center.x().saturating_add(radius), center.y().saturating_add(radius)),
        );
        Self {
            grid,
            center,
            radius,
            resolution,
            raster: Raster::new(min, max, 1),
            current: None,
        }
    }

    /// Position returned by the last call to `next`, or `None` before the
    /// first call and after exhaustion.
    #[must_use]
    pub fn current(&self) -> Option<Pos> {
        self.current
    }

    /// Rewinds the cursor to before the first element.
    pub fn restart(&mut self) {
        self.raster.rewind();
        self.current = None;
    }
}

impl Iterator for CircularArea<'_> {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        let limit = i64::from(self.radius) * i64::from(self.radius);
        self.current = loop {
            let Some(pos) = self.raster.advance() else {
                break None;
            };
            if self.center.dist_squared(pos) <= limit && self.resolution.contains(self.grid, pos) {
                break Some(pos);
            }
        };
        self.current
    }
}

/// Convex quadrilateral given by its corners in perimeter order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quad {
    corners: [Pos; 4],
}

impl Quad {
    /// Creates a quadrilateral. Corners may wind either way.
    #[must_use]
    pub const fn new(corners: [Pos; 4]) -> Self {
        Self { corners }
    }

    /// Corners in perimeter order.
    #[must_use]
    pub const fn corners(&self) -> [Pos; 4] {
        self.corners
    }

    fn bounds(&self) -> (Pos, Pos) {
        let xs = self.corners.map(|corner| corner.x());
        let ys = self.corners.map(|corner| corner.y());
        let min = |values: [i32; 4]| values.into_iter().min().unwrap_or(0);
        let max = |values: [i32; 4]| values.into_iter().max().unwrap_or(0);
        (Pos::new(min(xs), min(ys)), Pos::new(max(xs), max(ys)))
    }

    /// Whether `pos` lies inside the quadrilateral or on one of its edges.
    #[must_use]
    pub fn contains(&self, pos: Pos) -> bool {
        let mut positive = false;
        let mut negative = false;
        for (i, &start) in self.corners.iter().enumerate() {
            let end = self.corners[(i + 1) % self.corners.len()];
            let edge = end - start;
            let offset = pos - start;
            let cross = i64::from(edge.x()) * i64::from(offset.y())
                - i64::from(edge.y()) * i64::from(offset.x());
            positive |= cross > 0;
            negative |= cross < 0;
        }
        !(positive && negative)
    }
}

/// Fine positions inside a [`Quad`], scanned over the part of its bounding
/// rectangle that overlaps the grid, on a lattice of multiples of `step`.
#[derive(Clone, Debug)]
pub struct QuadArea<'a> {
    grid: &'a Grid,
    quad: Quad,
    raster: Raster,
    current: Option<Pos>,
}

impl<'a> QuadArea<'a> {
    /// Creates a cursor positioned before the first element. A `step` of
    /// zero or below is treated as one.
    #[must_use]
    pub fn new(grid: &'a Grid, quad: Quad, step: i32) -> Self {
        let step = step.max(1);
        let (min, max) = quad.bounds();
        let (min, max) = Resolution::Fine.clip(grid, min, max);
        let align = |value: i32| {
            let aligned = value.div_euclid(step) * step;
            if aligned < value {
                aligned.saturating_add(step)
            } else {
                aligned
            }
        };
        Self {
            grid,
            quad,
            raster: Raster::new(Pos::new(align(min.x()), align(min.y())), max, step),
            current: None,
        }
    }

    /// Position returned by the last call to `next`, or `None` before the
    /// first call and after exhaustion.
    #[must_use]
    pub fn current(&self) -> Option<Pos> {
        self.current
    }

    /// Rewinds the cursor to before the first element.
    pub fn restart(&mut self) {
        self.raster.rewind();
        self.current = None;
    }
}

impl Iterator for QuadArea<'_> {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        self.current = loop {
            let Some(pos) = self.raster.advance() else {
                break None;
            };
            if self.quad.contains(pos) && self.grid.is_inside(pos) {
                break Some(pos);
            }
        };
        self.current
    }
}
