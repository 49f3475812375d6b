//! Paytables, symbol tables and line definitions

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::grid::SymbolCode;

/// Symbol name ↔ code mapping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SymbolTable {
    names: Vec<String>,
    codes: HashMap<String, SymbolCode>,
}

impl From<Vec<String>> for SymbolTable {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<SymbolTable> for Vec<String> {
    fn from(table: SymbolTable) -> Self {
        table.names
    }
}

impl SymbolTable {
    /// Codes are assigned in order, starting at 0
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let codes = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i as SymbolCode))
            .collect();
        Self { names, codes }
    }

    pub fn code(&self, name: &str) -> Option<SymbolCode> {
        self.codes.get(name).copied()
    }

    pub fn name(&self, code: SymbolCode) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Pay values per symbol, indexed by `count - 1`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paytable {
    rows: BTreeMap<SymbolCode, Vec<i64>>,
}

impl Paytable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row for a symbol
    pub fn set_row(&mut self, symbol: SymbolCode, pays: Vec<i64>) {
        self.rows.insert(symbol, pays);
    }

    /// Builder form of [`set_row`](Self::set_row)
    pub fn with_row(mut self, symbol: SymbolCode, pays: Vec<i64>) -> Self {
        self.set_row(symbol, pays);
        self
    }

    pub fn row(&self, symbol: SymbolCode) -> Option<&[i64]> {
        self.rows.get(&symbol).map(Vec::as_slice)
    }

    pub fn has_symbol(&self, symbol: SymbolCode) -> bool {
        self.rows.contains_key(&symbol)
    }

    /// Symbols with a row, in code order
    pub fn symbols(&self) -> impl Iterator<Item = SymbolCode> + '_ {
        self.rows.keys().copied()
    }

    /// Pay for `count` matching symbols
    ///
    /// Counts beyond the row length use the last entry; a missing row or a
    /// zero count pays nothing.
    pub fn pay(&self, symbol: SymbolCode, count: usize) -> i64 {
        if count == 0 {
            return 0;
        }
        match self.rows.get(&symbol) {
            Some(row) if !row.is_empty() => row[(count - 1).min(row.len() - 1)],
            _ => 0,
        }
    }
}

/// Payline definitions: one row index per reel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineSet {
    lines: Vec<Vec<usize>>,
}

impl LineSet {
    pub fn new(lines: Vec<Vec<usize>>) -> Self {
        Self { lines }
    }

    /// `rows` straight lines across `reels` reels
    pub fn straight(reels: usize, rows: usize) -> Self {
        Self::new((0..rows).map(|row| vec![row; reels]).collect())
    }

    /// Common 20-line layout for a 5×3 grid
    pub fn standard_20() -> Self {
        Self::new(vec![
            vec![1, 1, 1, 1, 1],
            vec![0, 0, 0, 0, 0],
            vec![2, 2, 2, 2, 2],
            vec![0, 1, 2, 1, 0],
            vec![2, 1, 0, 1, 2],
            vec![0, 0, 1, 2, 2],
            vec![2, 2, 1, 0, 0],
            vec![1, 0, 0, 0, 1],
            vec![1, 2, 2, 2, 1],
            vec![0, 1, 0, 1, 0],
            vec![2, 1, 2, 1, 2],
            vec![0, 1, 1, 1, 0],
            vec![2, 1, 1, 1, 2],
            vec![1, 1, 0, 1, 1],
            vec![1, 1, 2, 1, 1],
            vec![0, 2, 0, 2, 0],
            vec![2, 0, 2, 0, 2],
            vec![1, 0, 1, 0, 1],
            vec![1, 2, 1, 2, 1],
            vec![0, 0, 2, 0, 0],
        ])
    }

    pub fn lines(&self) -> &[Vec<usize>] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
