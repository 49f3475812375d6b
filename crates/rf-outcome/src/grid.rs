//! Symbol grids
//!
//! Grids are column-major: `cells[x][y]`, with `x` the reel index and `y` the
//! row. A [`Scene`] carries symbol codes; an [`OtherScene`] carries per-cell
//! auxiliary values (multipliers, counters) aligned with a scene.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbol code
pub type SymbolCode = i32;

/// Rectangular column-major grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    /// Reel set this grid was drawn from (empty for hand-built grids)
    #[serde(default)]
    pub reel_set: String,
    cells: Vec<Vec<T>>,
}

/// Symbol grid
pub type Scene = Grid<SymbolCode>;

/// Auxiliary value grid aligned with a [`Scene`]
pub type OtherScene = Grid<i32>;

impl<T: Clone + Default> Grid<T> {
    /// Create a grid filled with the default value
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            reel_set: String::new(),
            cells: vec![vec![T::default(); height]; width],
        }
    }

    /// Create a grid filled with `value`
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            reel_set: String::new(),
            cells: vec![vec![value; height]; width],
        }
    }
}

impl<T> Grid<T> {
    /// Build from columns; every column must have the same height
    pub fn from_columns(columns: Vec<Vec<T>>) -> Option<Self> {
        let height = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != height) {
            return None;
        }
        Some(Self {
            reel_set: String::new(),
            cells: columns,
        })
    }

    /// Build from rows as they are displayed (top row first)
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self>
    where
        T: Clone,
    {
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        let columns = (0..width)
            .map(|x| rows.iter().map(|row| row[x].clone()).collect())
            .collect();
        Self::from_columns(columns)
    }

    /// Tag with the reel set it came from
    pub fn with_reel_set(mut self, name: impl Into<String>) -> Self {
        self.reel_set = name.into();
        self
    }

    pub fn width(&self) -> usize {
        self.cells.len()
    }

    pub fn height(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Cell at `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.cells.get(x).and_then(|col| col.get(y))
    }

    /// Replace a cell; out-of-range writes are ignored and return `false`
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        match self.cells.get_mut(x).and_then(|col| col.get_mut(y)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn column(&self, x: usize) -> &[T] {
        self.cells.get(x).map_or(&[], Vec::as_slice)
    }

    pub fn columns(&self) -> &[Vec<T>] {
        &self.cells
    }

    /// Iterate `(x, y, value)` column by column
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(x, col)| col.iter().enumerate().map(move |(y, v)| (x, y, v)))
    }

    /// Same dimensions as `other`
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width() == other.width() && self.height() == other.height()
    }
}

impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                if x > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>3}", self.cells[x][y])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_transposes() {
        let scene = Scene::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(scene.width(), 3);
        assert_eq!(scene.height(), 2);
        assert_eq!(scene.get(0, 1), Some(&4));
        assert_eq!(scene.column(2), &[3, 6]);
    }

    #[test]
    fn test_ragged_input_rejected() {
        assert!(Scene::from_columns(vec![vec![1, 2], vec![3]]).is_none());
        assert!(Scene::from_rows(vec![vec![1, 2], vec![3]]).is_none());
    }

    #[test]
    fn test_set_out_of_range() {
        let mut scene = Scene::new(2, 2);
        assert!(scene.set(1, 1, 9));
        assert!(!scene.set(2, 0, 9));
        assert_eq!(scene.get(1, 1), Some(&9));
    }

    #[test]
    fn test_display_renders_rows() {
        let scene = Scene::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(scene.to_string(), "  1   2\n  3   4\n");
    }
}
