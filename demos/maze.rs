//! Prim's-algorithm maze generator, demonstrating [`ordcoll::Set`] (keyed by
//! cell, tracking a random carve cost assigned the first time a cell is seen)
//! and [`ordcoll::pairing_heap::Heap`] (a max-heap of frontier cells, ordered
//! by that same cost) together. This mirrors the library's own C sample: a
//! maze is exactly the kind of program that needs both an ordered set and a
//! priority queue, and neither data structure does anything interesting on
//! its own.
//!
//! Unlike the source sample, this binary has no animation or ANSI cursor
//! control; it builds the maze fully, then prints the finished grid once.
//! Pass `--rows=N` / `--cols=N` on the command line to size it (both must be
//! at least 7; even values are bumped up by one, since this carving scheme
//! needs odd dimensions).

use ordcoll::{Heap, Max, Set};
use rand::Rng;

const DEFAULT_ROWS: i32 = 21;
const DEFAULT_COLS: i32 = 51;
const ROW_COL_MIN: i32 = 7;

const WALLS: [char; 16] = [
    '■', '╵', '╶', '└', '╷', '│', '┌', '├', '╴', '┘', '─', '┴', '┐', '┤', '┬', '┼',
];

const PATH_BIT: u16 = 0b0010_0000_0000_0000;
const WALL_MASK: u16 = 0b1111;
const NORTH_WALL: u16 = 0b0001;
const EAST_WALL: u16 = 0b0010;
const SOUTH_WALL: u16 = 0b0100;
const WEST_WALL: u16 = 0b1000;
const BUILDER_BIT: u16 = 0b0001_0000_0000_0000;

const BUILD_DIRS: [(i32, i32); 4] = [(-2, 0), (0, 2), (2, 0), (0, -2)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Point {
    r: i32,
    c: i32,
}

/// Ordered only by position, so a [`Set`] of these acts as a cost memo keyed
/// by cell: the first random cost assigned to a point is the one every later
/// lookup sees.
#[derive(Debug, Clone, Copy)]
struct PointCost {
    p: Point,
    cost: i32,
}

impl PartialEq for PointCost {
    fn eq(&self, other: &Self) -> bool {
        (self.p.r, self.p.c) == (other.p.r, other.p.c)
    }
}
impl Eq for PointCost {}
impl PartialOrd for PointCost {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for PointCost {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.p.r, self.p.c).cmp(&(other.p.r, other.p.c))
    }
}

/// Ordered only by priority, so a max-[`Heap`] of these always surfaces the
/// costliest frontier cell next, matching the priority-queue comparator the
/// source sample uses.
#[derive(Debug, Clone, Copy)]
struct PriorityCell {
    cell: Point,
    priority: i32,
}

impl PartialEq for PriorityCell {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for PriorityCell {}
impl PartialOrd for PriorityCell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for PriorityCell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority.cmp(&other.priority)
    }
}

struct Maze {
    rows: i32,
    cols: i32,
    cells: Vec<u16>,
}

impl Maze {
    fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols, cells: vec![0; (rows * cols) as usize] }
    }

    fn at(&self, p: Point) -> u16 {
        self.cells[(p.r * self.cols + p.c) as usize]
    }

    fn at_mut(&mut self, p: Point) -> &mut u16 {
        &mut self.cells[(p.r * self.cols + p.c) as usize]
    }

    fn fill_with_walls(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                self.build_wall(Point { r: row, c: col });
            }
        }
    }

    fn build_wall(&mut self, p: Point) {
        let mut wall = 0u16;
        if p.r - 1 >= 0 {
            wall |= NORTH_WALL;
        }
        if p.r + 1 < self.rows {
            wall |= SOUTH_WALL;
        }
        if p.c - 1 >= 0 {
            wall |= WEST_WALL;
        }
        if p.c + 1 < self.cols {
            wall |= EAST_WALL;
        }
        let square = self.at_mut(p);
        *square |= wall;
        *square &= !PATH_BIT;
    }

    fn can_build_new_square(&self, next: Point) -> bool {
        next.r > 0
            && next.r < self.rows - 1
            && next.c > 0
            && next.c < self.cols - 1
            && self.at(next) & BUILDER_BIT == 0
    }

    fn carve_path_walls(&mut self, p: Point) {
        *self.at_mut(p) |= PATH_BIT;
        if p.r - 1 >= 0 && self.at(Point { r: p.r - 1, c: p.c }) & PATH_BIT == 0 {
            *self.at_mut(Point { r: p.r - 1, c: p.c }) &= !SOUTH_WALL;
        }
        if p.r + 1 < self.rows && self.at(Point { r: p.r + 1, c: p.c }) & PATH_BIT == 0 {
            *self.at_mut(Point { r: p.r + 1, c: p.c }) &= !NORTH_WALL;
        }
        if p.c - 1 >= 0 && self.at(Point { r: p.r, c: p.c - 1 }) & PATH_BIT == 0 {
            *self.at_mut(Point { r: p.r, c: p.c - 1 }) &= !EAST_WALL;
        }
        if p.c + 1 < self.cols && self.at(Point { r: p.r, c: p.c + 1 }) & PATH_BIT == 0 {
            *self.at_mut(Point { r: p.r, c: p.c + 1 }) &= !WEST_WALL;
        }
        *self.at_mut(p) |= BUILDER_BIT;
    }

    fn join_squares(&mut self, cur: Point, next: Point) {
        let mut wall = cur;
        if next.r < cur.r {
            wall.r -= 1;
        } else if next.r > cur.r {
            wall.r += 1;
        } else if next.c < cur.c {
            wall.c -= 1;
        } else if next.c > cur.c {
            wall.c += 1;
        }
        self.carve_path_walls(cur);
        self.carve_path_walls(wall);
        self.carve_path_walls(next);
    }

    fn print(&self) {
        for row in 0..self.rows {
            let mut line = String::with_capacity(self.cols as usize);
            for col in 0..self.cols {
                let square = self.at(Point { r: row, c: col });
                line.push(if square & PATH_BIT != 0 { ' ' } else { WALLS[(square & WALL_MASK) as usize] });
            }
            println!("{line}");
        }
    }
}

fn pick_rand_point(maze: &Maze, rng: &mut impl Rng) -> Point {
    Point {
        r: 2 * rng.random_range(1..=(maze.rows - 2) / 2) + 1,
        c: 2 * rng.random_range(1..=(maze.cols - 2) / 2) + 1,
    }
}

fn build_maze(rows: i32, cols: i32) -> Maze {
    let mut rng = rand::rng();
    let mut maze = Maze::new(rows, cols);
    maze.fill_with_walls();

    let mut cell_costs: Set<PointCost> = Set::new();
    let mut cells: Heap<PriorityCell, _, Max> = Heap::new();

    let start_point = pick_rand_point(&maze, &mut rng);
    let start_cost = rng.random_range(0..100);
    cell_costs.insert(PointCost { p: start_point, cost: start_cost });
    cells.push(PriorityCell { cell: start_point, priority: start_cost });

    while let Some(cur) = cells.front().copied() {
        *maze.at_mut(cur.cell) |= BUILDER_BIT;

        let mut min_weight = i32::MAX;
        let mut min_neighbor = None;
        for (dr, dc) in BUILD_DIRS {
            let next = Point { r: cur.cell.r + dr, c: cur.cell.c + dc };
            if !maze.can_build_new_square(next) {
                continue;
            }
            let cost = match cell_costs.get(&PointCost { p: next, cost: 0 }) {
                Some(found) => found.cost,
                None => {
                    let cost = rng.random_range(0..100);
                    cell_costs.insert(PointCost { p: next, cost });
                    cost
                }
            };
            if cost < min_weight {
                min_weight = cost;
                min_neighbor = Some(next);
            }
        }

        match min_neighbor {
            Some(next) => {
                maze.join_squares(cur.cell, next);
                cells.push(PriorityCell { cell: next, priority: min_weight });
            }
            None => {
                cells.pop();
            }
        }
    }
    maze
}

fn parse_dimension(arg: &str, prefix: &str) -> Option<i32> {
    let value = arg.strip_prefix(prefix)?;
    value.parse::<i32>().ok()
}

fn main() {
    let mut rows = DEFAULT_ROWS;
    let mut cols = DEFAULT_COLS;
    for arg in std::env::args().skip(1) {
        if let Some(r) = parse_dimension(&arg, "--rows=") {
            rows = r;
        } else if let Some(c) = parse_dimension(&arg, "--cols=") {
            cols = c;
        } else {
            eprintln!("usage: maze [--rows=N] [--cols=N] (N >= {ROW_COL_MIN})");
            std::process::exit(1);
        }
    }
    if rows < ROW_COL_MIN || cols < ROW_COL_MIN {
        eprintln!("rows and cols must each be at least {ROW_COL_MIN}");
        std::process::exit(1);
    }
    // This carving scheme requires odd rows and cols.
    rows += (rows % 2 == 0) as i32;
    cols += (cols % 2 == 0) as i32;

    build_maze(rows, cols).print();
}
