/*
 * Copyright (c) 2021, 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! Stepping-stone cycle search.
//!
//! Given a non-basic entering cell, the cycle search finds the unique
//! alternating cycle of basic cells closing a loop with the entering
//! cell. The cycle starts with the entering cell, continues along its
//! row, then along a column and so on until it reaches the column of
//! the entering cell again. Cells at odd positions gain flow, cells at
//! even positions lose flow.
//!
//! The search is a backtracking depth first search. The partial chain
//! is stored in an arena of stones linked by indices.

use super::modi::FlowCell;
use num_traits::Float;

/// Whether a stone gains or loses flow when the cycle is applied.
///
/// A stone on the add-side continues the cycle horizontally (along its
/// row), a stone on the subtract-side vertically (along its column).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Add,
    Subtract,
}

#[derive(Clone, Debug)]
pub struct Stone<F> {
    pub row: usize,
    pub col: usize,
    pub side: Side,
    /// Minimal flow of all subtract-side stones from the head up to this stone.
    min_flow: F,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A closed cycle, starting with the entering cell.
pub struct Cycle<F> {
    stones: Vec<Stone<F>>,
}

impl<F: Float> Cycle<F> {
    /// The amount of flow that can be moved along the cycle.
    pub fn delta(&self) -> F {
        self.stones.last().map(|s| s.min_flow).unwrap_or_else(F::zero)
    }

    pub fn len(&self) -> usize {
        self.stones.len()
    }

    /// Iterate over the stones from the entering cell to the closing one.
    pub fn iter(&self) -> CycleIter<'_, F> {
        CycleIter {
            stones: &self.stones,
            cur: if self.stones.is_empty() { None } else { Some(0) },
        }
    }
}

pub struct CycleIter<'a, F> {
    stones: &'a [Stone<F>],
    cur: Option<usize>,
}

impl<'a, F> Iterator for CycleIter<'a, F> {
    type Item = &'a Stone<F>;

    fn next(&mut self) -> Option<Self::Item> {
        let stone = &self.stones[self.cur?];
        self.cur = stone.next;
        Some(stone)
    }
}

/// Find the cycle through the non-basic cell `(row, col)`.
///
/// Returns `None` if the cell is independent of the basic cells, i.e.
/// adding it to the basis would not close a cycle.
pub fn find_cycle<F: Float>(flow: &[Vec<FlowCell<F>>], row: usize, col: usize, infinity: F) -> Option<Cycle<F>> {
    let nrows = flow.len();
    let ncols = flow.first().map(|r| r.len()).unwrap_or(0);

    // rows left horizontally and columns left vertically by the current chain
    let mut row_busy = vec![false; nrows];
    let mut col_busy = vec![false; ncols];

    let mut stones = vec![Stone {
        row,
        col,
        side: Side::Add,
        min_flow: infinity,
        prev: None,
        next: None,
    }];
    let mut cur = 0;
    // first candidate column (add-side) or row (subtract-side) to scan
    let mut resume = 0;

    loop {
        let (i, j, side) = (stones[cur].row, stones[cur].col, stones[cur].side);
        let found = match side {
            Side::Add => (resume..ncols)
                .find(|&k| k != j && flow[i][k].basic && !col_busy[k])
                .map(|k| {
                    row_busy[i] = true;
                    (i, k)
                }),
            Side::Subtract => (resume..nrows)
                .find(|&k| k != i && flow[k][j].basic && !row_busy[k])
                .map(|k| {
                    col_busy[j] = true;
                    (k, j)
                }),
        };

        if let Some((nrow, ncol)) = found {
            let (nside, min_flow) = match side {
                Side::Add => (Side::Subtract, stones[cur].min_flow.min(flow[nrow][ncol].value)),
                Side::Subtract => (Side::Add, stones[cur].min_flow),
            };
            stones.push(Stone {
                row: nrow,
                col: ncol,
                side: nside,
                min_flow,
                prev: Some(cur),
                next: None,
            });
            let next = stones.len() - 1;
            stones[cur].next = Some(next);
            cur = next;
            resume = 0;

            if ncol == col {
                return Some(Cycle { stones });
            }
        } else {
            // dead end, go back to the previous stone and continue its scan
            // behind the dead stone
            let dead = stones.pop()?;
            cur = dead.prev?;
            let prev = &mut stones[cur];
            prev.next = None;
            resume = match prev.side {
                Side::Add => {
                    row_busy[prev.row] = false;
                    dead.col + 1
                }
                Side::Subtract => {
                    col_busy[prev.col] = false;
                    dead.row + 1
                }
            };
        }
    }
}
