//! Fixed enemy path and its continuous parametrisation.

use siegeline_core::{constants::EXIT_TARGETING_MARGIN, fix_number, CellCoord, Point};

/// Ordered cells enemies walk from the entry to the exit.
///
/// Progress `l` maps to a position by interpolating between the centre of
/// cell `floor(l)` and the next cell. The last cell maps to its raw
/// `(column, row)` corner rather than its centre.
#[derive(Clone, Debug)]
pub(crate) struct EnemyPath {
    cells: Vec<CellCoord>,
    centers: Vec<Point>,
    entry: CellCoord,
    start: Point,
}

impl EnemyPath {
    /// Builds the path; `None` when no cells are given.
    pub(crate) fn new(cells: Vec<CellCoord>) -> Option<Self> {
        let entry = *cells.first()?;
        let centers = cells.iter().map(CellCoord::center).collect();
        let mut path = Self {
            cells,
            centers,
            entry,
            start: Point::default(),
        };
        path.start = path.position(0.0)?;
        Some(path)
    }

    pub(crate) fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    pub(crate) fn centers(&self) -> &[Point] {
        &self.centers
    }

    pub(crate) fn entry(&self) -> CellCoord {
        self.entry
    }

    /// Position of a freshly spawned enemy.
    pub(crate) fn start(&self) -> Point {
        self.start
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Progress at which an enemy leaves the board.
    pub(crate) fn exit_progress(&self) -> f64 {
        (self.cells.len() - 1) as f64
    }

    /// Progress beyond which turrets stop targeting.
    pub(crate) fn targeting_limit(&self) -> f64 {
        self.cells.len() as f64 - EXIT_TARGETING_MARGIN
    }

    /// Where an enemy stands when it leaves the board.
    pub(crate) fn exit_point(&self) -> Point {
        let last = self.cells[self.cells.len() - 1];
        Point::new(f64::from(last.column()), f64::from(last.row()))
    }

    /// Position at progress `l`, or `None` beyond the last cell.
    pub(crate) fn position(&self, l: f64) -> Option<Point> {
        if l < 0.0 {
            return None;
        }

        let index = l.floor() as usize;
        let cell = *self.cells.get(index)?;
        let Some(next) = self.cells.get(index + 1) else {
            return Some(Point::new(f64::from(cell.column()), f64::from(cell.row())));
        };

        let along = fix_number(l - index as f64);
        let dx = fix_number(f64::from(next.column() - cell.column()));
        let dy = fix_number(f64::from(next.row() - cell.row()));
        let center = cell.center();

        Some(Point::new(
            fix_number(center.x + dx * along),
            fix_number(center.y + dy * along),
        ))
    }
}
