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

//! Validation and balancing of the raw input.

use super::{Error, Options, Result};
use num_traits::Float;

/// Which side, if any, has been extended by a synthetic entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Balance {
    /// Total supply equals total demand, nothing has been added.
    Equal,
    /// Total supply exceeds total demand, a synthetic consumer has been
    /// appended as last column.
    ExcessSupply,
    /// Total demand exceeds total supply, a synthetic producer has been
    /// appended as last row.
    ExcessDemand,
}

/// A validated, balanced problem.
pub(super) struct Balanced<F> {
    pub supply: Vec<F>,
    pub demand: Vec<F>,
    pub costs: Vec<Vec<F>>,
    pub balance: Balance,
    /// The total amount to be transported, including the synthetic entry.
    pub quantity: F,
    pub epsilon: F,
    pub infinity: F,
}

fn to_f64<F: Float>(x: F) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// Validate the options and the input data and make the problem balanced.
pub(super) fn balance<F, C>(supply: &[F], demand: &[F], costs: &[C], opts: &Options) -> Result<Balanced<F>>
where
    F: Float,
    C: AsRef<[F]>,
{
    if !(opts.epsilon >= 0.0 && opts.epsilon <= Options::MAX_EPSILON) {
        return Err(Error::EpsilonOutOfRange(opts.epsilon));
    }
    if !(opts.infinity >= Options::MIN_INFINITY) {
        return Err(Error::InfinityTooSmall(opts.infinity));
    }
    let epsilon = F::from(opts.epsilon).ok_or(Error::EpsilonOutOfRange(opts.epsilon))?;
    let infinity = F::from(opts.infinity).ok_or(Error::InfinityTooSmall(opts.infinity))?;

    if supply.is_empty() {
        return Err(Error::NoProducers);
    }
    if demand.is_empty() {
        return Err(Error::NoConsumers);
    }
    if supply.len() != costs.len() {
        return Err(Error::ProducerCountMismatch {
            producers: supply.len(),
            rows: costs.len(),
        });
    }
    if let Some((row, c)) = costs.iter().enumerate().find(|(_, c)| c.as_ref().len() != demand.len()) {
        return Err(Error::ConsumerCountMismatch {
            row,
            consumers: demand.len(),
            columns: c.as_ref().len(),
        });
    }

    // NaN fails the comparison, too
    if let Some((index, &s)) = supply.iter().enumerate().find(|(_, &s)| !(s >= epsilon)) {
        return Err(Error::SupplyTooSmall {
            index,
            value: to_f64(s),
            epsilon: opts.epsilon,
        });
    }
    if let Some((index, &d)) = demand.iter().enumerate().find(|(_, &d)| !(d >= epsilon)) {
        return Err(Error::DemandTooSmall {
            index,
            value: to_f64(d),
            epsilon: opts.epsilon,
        });
    }

    let ssum = supply.iter().fold(F::zero(), |acc, &s| acc + s);
    let dsum = demand.iter().fold(F::zero(), |acc, &d| acc + d);

    let mut supply = supply.to_vec();
    let mut demand = demand.to_vec();
    let mut costs: Vec<Vec<F>> = costs.iter().map(|c| c.as_ref().to_vec()).collect();

    let balance = if (ssum - dsum).abs() <= epsilon {
        Balance::Equal
    } else if ssum > dsum {
        demand.push(ssum - dsum);
        for row in &mut costs {
            row.push(F::zero());
        }
        Balance::ExcessSupply
    } else {
        supply.push(dsum - ssum);
        costs.push(vec![F::zero(); demand.len()]);
        Balance::ExcessDemand
    };

    Ok(Balanced {
        supply,
        demand,
        costs,
        balance,
        quantity: ssum.max(dsum),
        epsilon,
        infinity,
    })
}
