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

//! The MODI (modified distribution) method.
//!
//! The initial basis is computed with the minimum cost method. In each
//! iteration the dual potentials $u_i$, $v_j$ are computed from the
//! basic cells ($u_i + v_j = c_{ij}$), the non-basic cell with the
//! largest reduced cost $u_i + v_j - c_{ij} > 0$ enters the basis and
//! the flow is moved along its stepping-stone cycle.

use super::balance::{balance, Balance};
use super::cycle::{find_cycle, Side};
use super::{Error, Options, Result, SolutionState};

use log::{debug, trace};
use num_traits::{Float, NumAssign};

/// A cell of the flow matrix.
///
/// Basic cells with value zero are distinct from non-basic cells, they
/// are needed to keep the basis a spanning tree.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FlowCell<F> {
    pub basic: bool,
    pub value: F,
}

/// Scan state of a node during the computation of the potentials.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Scan {
    Unvisited,
    Candidate,
    Scanned,
}

/// A transportation problem solved by the MODI method.
pub struct Problem<F> {
    opts: Options,
    epsilon: F,
    infinity: F,

    supply: Vec<F>,
    demand: Vec<F>,
    costs: Vec<Vec<F>>,
    balance: Balance,
    quantity: F,

    u: Vec<F>,
    v: Vec<F>,
    row_scan: Vec<Scan>,
    col_scan: Vec<Scan>,

    flow: Vec<Vec<FlowCell<F>>>,
    entering: Option<(usize, usize)>,

    niter: usize,
    solution_state: SolutionState,
}

impl<F> Problem<F>
where
    F: Float + NumAssign,
{
    /// Create a new problem with default options.
    ///
    /// `costs` must have one row per producer, each row containing one
    /// entry per consumer.
    pub fn new<C>(supply: &[F], demand: &[F], costs: &[C]) -> Result<Self>
    where
        C: AsRef<[F]>,
    {
        Problem::with_options(supply, demand, costs, Options::default())
    }

    pub fn with_options<C>(supply: &[F], demand: &[F], costs: &[C], opts: Options) -> Result<Self>
    where
        C: AsRef<[F]>,
    {
        let b = balance(supply, demand, costs, &opts)?;
        let m = b.supply.len();
        let n = b.demand.len();
        Ok(Problem {
            opts,
            epsilon: b.epsilon,
            infinity: b.infinity,

            supply: b.supply,
            demand: b.demand,
            costs: b.costs,
            balance: b.balance,
            quantity: b.quantity,

            u: vec![F::zero(); m],
            v: vec![F::zero(); n],
            row_scan: vec![Scan::Unvisited; m],
            col_scan: vec![Scan::Unvisited; n],

            flow: vec![
                vec![
                    FlowCell {
                        basic: false,
                        value: F::zero()
                    };
                    n
                ];
                m
            ],
            entering: None,

            niter: 0,
            solution_state: SolutionState::Unknown,
        })
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Whether a synthetic producer or consumer has been added.
    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// The number of producers (without the synthetic one).
    pub fn num_producers(&self) -> usize {
        match self.balance {
            Balance::ExcessDemand => self.costs.len() - 1,
            _ => self.costs.len(),
        }
    }

    /// The number of consumers (without the synthetic one).
    pub fn num_consumers(&self) -> usize {
        match self.balance {
            Balance::ExcessSupply => self.demand.len() - 1,
            _ => self.demand.len(),
        }
    }

    pub fn num_iterations(&self) -> usize {
        self.niter
    }

    /// Return the solution state of the latest computation.
    pub fn solution_state(&self) -> SolutionState {
        self.solution_state
    }

    /// The current number of basic cells, including the synthetic ones.
    pub fn num_basic_cells(&self) -> usize {
        self.flow.iter().flatten().filter(|c| c.basic).count()
    }

    /// Solve the transportation problem.
    ///
    /// Returns `SolutionState::Optimal` if the flow has been verified to
    /// be optimal and `SolutionState::IterationLimit` if the iteration
    /// limit has been reached first. In the latter case the flow is
    /// feasible but possibly not optimal.
    ///
    /// A problem can be solved only once, further calls return the
    /// state of the first one.
    pub fn solve(&mut self) -> Result<SolutionState> {
        if self.solution_state != SolutionState::Unknown {
            return Ok(self.solution_state);
        }

        let m = self.supply.len();
        let n = self.demand.len();
        debug!("solving transportation problem with {} producers and {} consumers", m, n);

        let nbasic = self.initial_solution();
        let missing = (m + n - 1).saturating_sub(nbasic);
        if missing > 0 {
            debug!("initial solution is degenerate, {} basic cells missing", missing);
            self.fix_degeneracy(missing)?;
        }

        loop {
            self.compute_potentials()?;
            self.entering = self.find_entering_cell();
            let (row, col) = match self.entering {
                Some(cell) => cell,
                None => {
                    self.solution_state = SolutionState::Optimal;
                    break;
                }
            };

            self.pivot(row, col)?;
            self.niter += 1;

            if self.opts.max_iter > 0 && self.niter >= self.opts.max_iter {
                self.solution_state = SolutionState::IterationLimit;
                break;
            }
        }

        debug!(
            "finished after {} iterations: {:?}, cost {}",
            self.niter,
            self.solution_state,
            self.cost().to_f64().unwrap_or(f64::NAN)
        );

        Ok(self.solution_state)
    }

    /// Compute the initial basis with the minimum cost method.
    ///
    /// Returns the number of basic cells.
    fn initial_solution(&mut self) -> usize {
        let mut quantity = self.quantity;
        let mut nbasic = 0;

        loop {
            let mut best: Option<(usize, usize)> = None;
            for i in 0..self.supply.len() {
                if self.supply[i] <= F::zero() {
                    continue;
                }
                for j in 0..self.demand.len() {
                    if self.demand[j] <= F::zero() {
                        continue;
                    }
                    let better = match best {
                        None => true,
                        Some((bi, bj)) => {
                            let c = self.costs[i][j];
                            let bc = self.costs[bi][bj];
                            // among cells of equal cost prefer those transporting more
                            c < bc
                                || (c == bc
                                    && self.supply[i].min(self.demand[j]) > self.supply[bi].min(self.demand[bj]))
                        }
                    };
                    if better {
                        best = Some((i, j));
                    }
                }
            }

            let (i, j) = match best {
                Some(cell) => cell,
                None => break,
            };

            let s = self.supply[i];
            let d = self.demand[j];
            let diff = s - d;
            let q = if diff > self.epsilon {
                self.supply[i] = diff;
                self.demand[j] = F::zero();
                d
            } else if diff < -self.epsilon {
                self.supply[i] = F::zero();
                self.demand[j] = -diff;
                s
            } else {
                self.supply[i] = F::zero();
                self.demand[j] = F::zero();
                s
            };

            self.flow[i][j] = FlowCell { basic: true, value: q };
            nbasic += 1;

            quantity -= q;
            if quantity <= self.epsilon {
                break;
            }
        }

        nbasic
    }

    /// Add `missing` independent cells with zero flow to the basis.
    fn fix_degeneracy(&mut self, missing: usize) -> Result<()> {
        let mut left = missing;
        'rows: for i in 0..self.flow.len() {
            for j in 0..self.flow[i].len() {
                if left == 0 {
                    break 'rows;
                }
                if self.flow[i][j].basic {
                    continue;
                }
                // The cell is independent iff it does not close a cycle.
                if find_cycle(&self.flow, i, j, self.infinity).is_none() {
                    self.flow[i][j] = FlowCell {
                        basic: true,
                        value: F::zero(),
                    };
                    left -= 1;
                    trace!("added ({},{}) as zero basic cell", i, j);
                }
            }
        }

        if left > 0 {
            Err(Error::Degenerate { missing: left })
        } else {
            Ok(())
        }
    }

    /// Compute the potentials `u` and `v` of the current basis.
    fn compute_potentials(&mut self) -> Result<()> {
        let m = self.supply.len();
        let n = self.demand.len();

        for s in &mut self.row_scan {
            *s = Scan::Unvisited;
        }
        for s in &mut self.col_scan {
            *s = Scan::Unvisited;
        }

        self.u[0] = F::zero();
        self.row_scan[0] = Scan::Candidate;

        loop {
            let mut progress = false;

            for i in 0..m {
                if self.row_scan[i] != Scan::Candidate {
                    continue;
                }
                for j in 0..n {
                    if self.flow[i][j].basic && self.col_scan[j] == Scan::Unvisited {
                        self.v[j] = self.costs[i][j] - self.u[i];
                        self.col_scan[j] = Scan::Candidate;
                        progress = true;
                    }
                }
                self.row_scan[i] = Scan::Scanned;
            }

            for j in 0..n {
                if self.col_scan[j] != Scan::Candidate {
                    continue;
                }
                for i in 0..m {
                    if self.flow[i][j].basic && self.row_scan[i] == Scan::Unvisited {
                        self.u[i] = self.costs[i][j] - self.v[j];
                        self.row_scan[i] = Scan::Candidate;
                        progress = true;
                    }
                }
                self.col_scan[j] = Scan::Scanned;
            }

            if !progress {
                break;
            }
        }

        let resolved_rows = self.row_scan.iter().filter(|&&s| s != Scan::Unvisited).count();
        let resolved_columns = self.col_scan.iter().filter(|&&s| s != Scan::Unvisited).count();
        if resolved_rows != m || resolved_columns != n {
            return Err(Error::InconsistentPotentials {
                rows: m,
                resolved_rows,
                columns: n,
                resolved_columns,
            });
        }

        Ok(())
    }

    /// Return the non-basic cell with the largest positive reduced cost.
    ///
    /// Returns `None` if the current solution is optimal.
    fn find_entering_cell(&self) -> Option<(usize, usize)> {
        let mut best = None;
        let mut max_penalty = self.epsilon;
        for (i, row) in self.flow.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                if cell.basic {
                    continue;
                }
                let p = self.u[i] + self.v[j] - self.costs[i][j];
                if p > max_penalty {
                    max_penalty = p;
                    best = Some((i, j));
                }
            }
        }
        best
    }

    /// Move flow along the cycle of the entering cell `(row, col)`.
    fn pivot(&mut self, row: usize, col: usize) -> Result<()> {
        let cycle = find_cycle(&self.flow, row, col, self.infinity).ok_or(Error::NoCycle { row, col })?;
        let delta = cycle.delta();
        trace!(
            "iteration {}: entering ({},{}), cycle length {}, delta {}",
            self.niter,
            row,
            col,
            cycle.len(),
            delta.to_f64().unwrap_or(f64::NAN)
        );

        let mut removed = false;
        for stone in cycle.iter() {
            let cell = &mut self.flow[stone.row][stone.col];
            match stone.side {
                Side::Add => {
                    cell.basic = true;
                    cell.value += delta;
                }
                Side::Subtract => {
                    cell.value -= delta;
                    // Only the first cell reaching zero leaves the basis,
                    // all others stay as degenerate basic cells.
                    if !removed && cell.value <= self.epsilon {
                        cell.basic = false;
                        cell.value = F::zero();
                        removed = true;
                    }
                }
            }
        }

        Ok(())
    }

    /// The flow value of the cell `(i, j)`.
    pub fn flow(&self, i: usize, j: usize) -> F {
        let cell = &self.flow[i][j];
        if cell.basic {
            cell.value
        } else {
            F::zero()
        }
    }

    /// Return the cost of the current flow.
    pub fn cost(&self) -> F {
        let mut cost = F::zero();
        for (i, row) in self.flow.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                if cell.basic && cell.value != F::zero() {
                    cost += cell.value * self.costs[i][j];
                }
            }
        }
        cost
    }

    /// Return the flow matrix without the synthetic producer or consumer.
    pub fn flows(&self) -> Vec<Vec<F>> {
        self.solution().1
    }

    /// Return the cost and the flow matrix without the synthetic
    /// producer or consumer.
    pub fn solution(&self) -> (F, Vec<Vec<F>>) {
        let mut cost = F::zero();
        let mut flows = vec![vec![F::zero(); self.num_consumers()]; self.num_producers()];
        for (i, row) in flows.iter_mut().enumerate() {
            for (j, f) in row.iter_mut().enumerate() {
                let cell = &self.flow[i][j];
                if cell.basic && cell.value != F::zero() {
                    *f = cell.value;
                    cost += cell.value * self.costs[i][j];
                }
            }
        }
        (cost, flows)
    }
}

/// Solve a transportation problem with the MODI method.
///
/// The function returns the objective value and the flow matrix. The
/// flow is returned even if the iteration limit has been reached.
pub fn transport<F, C>(supply: &[F], demand: &[F], costs: &[C]) -> Result<(F, Vec<Vec<F>>)>
where
    F: Float + NumAssign,
    C: AsRef<[F]>,
{
    let mut problem = Problem::new(supply, demand, costs)?;
    problem.solve()?;
    Ok(problem.solution())
}
