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

//! Transportation problem algorithms.
//!
//! A transportation problem consists of $m$ producers with supplies
//! $s_i > 0$, $n$ consumers with demands $d_j > 0$ and unit costs
//! $c_{ij}$. The task is to find a flow $x \ge 0$ with
//!
//! \\[ \min \sum_{i,j} c_{ij} x_{ij} \quad \text{s.t.} \quad
//!     \sum_j x_{ij} = s_i, \; \sum_i x_{ij} = d_j. \\]
//!
//! Unbalanced problems are made balanced by a synthetic producer or
//! consumer with zero costs, which is removed from the reported flows.

mod balance;
mod cycle;
pub mod modi;

pub use balance::Balance;
pub use modi::{transport, Problem};

use std::error;
use std::fmt;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolutionState {
    /// Unknown state, the problem has not been solved, yet
    Unknown,
    /// The problem has been solved to optimality
    Optimal,
    /// The iteration limit has been reached before optimality could be
    /// verified. The current flow is feasible but possibly not optimal.
    IterationLimit,
}

/// Parameters of the solver.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Options {
    /// Maximal number of pivots. `0` means no limit. Defaults to `100`.
    pub max_iter: usize,
    /// Values with absolute value at most `epsilon` are considered zero.
    ///
    /// Must be in `[0, 1e-3]`. Defaults to `1e-6`.
    pub epsilon: f64,
    /// A value larger than any flow. Must be at least `1e10`. Defaults
    /// to `1e20`.
    pub infinity: f64,
}

impl Options {
    pub const MAX_EPSILON: f64 = 1e-3;
    pub const MIN_INFINITY: f64 = 1e10;
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_iter: 100,
            epsilon: 1e-6,
            infinity: 1e20,
        }
    }
}

/// Error when creating or solving a transportation problem.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    NoProducers,
    NoConsumers,
    ProducerCountMismatch {
        producers: usize,
        rows: usize,
    },
    ConsumerCountMismatch {
        row: usize,
        consumers: usize,
        columns: usize,
    },
    SupplyTooSmall {
        index: usize,
        value: f64,
        epsilon: f64,
    },
    DemandTooSmall {
        index: usize,
        value: f64,
        epsilon: f64,
    },
    EpsilonOutOfRange(f64),
    InfinityTooSmall(f64),
    /// Not all potentials could be computed, the basis is not a spanning tree.
    InconsistentPotentials {
        rows: usize,
        resolved_rows: usize,
        columns: usize,
        resolved_columns: usize,
    },
    /// Not enough independent cells to complete a degenerate basis.
    Degenerate {
        missing: usize,
    },
    /// No cycle could be closed through the entering cell.
    NoCycle {
        row: usize,
        col: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        use self::Error::*;
        match self {
            NoProducers => write!(fmt, "not enough producers, need at least 1"),
            NoConsumers => write!(fmt, "not enough consumers, need at least 1"),
            ProducerCountMismatch { producers, rows } => write!(
                fmt,
                "number of producers ({}) does not match number of cost rows ({})",
                producers, rows
            ),
            ConsumerCountMismatch { row, consumers, columns } => write!(
                fmt,
                "number of consumers ({}) does not match length of cost row {} ({})",
                consumers, row, columns
            ),
            SupplyTooSmall { index, value, epsilon } => {
                write!(fmt, "supply[{}]={} is too small (<{})", index, value, epsilon)
            }
            DemandTooSmall { index, value, epsilon } => {
                write!(fmt, "demand[{}]={} is too small (<{})", index, value, epsilon)
            }
            EpsilonOutOfRange(eps) => write!(
                fmt,
                "epsilon {} out of range [0, {}]",
                eps,
                Options::MAX_EPSILON
            ),
            InfinityTooSmall(inf) => write!(fmt, "infinity {} is too small (<{})", inf, Options::MIN_INFINITY),
            InconsistentPotentials {
                rows,
                resolved_rows,
                columns,
                resolved_columns,
            } => write!(
                fmt,
                "inconsistent potentials, u: {}/{}, v: {}/{}",
                resolved_rows, rows, resolved_columns, columns
            ),
            Degenerate { missing } => write!(fmt, "failed to find {} independent cells", missing),
            NoCycle { row, col } => write!(fmt, "cannot find a cycle starting from ({},{})", row, col),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
