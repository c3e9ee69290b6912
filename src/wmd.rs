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

//! Word mover's distance.
//!
//! The word mover's distance between two documents is the minimal cost
//! of transporting the normalized bag of words of the first document to
//! the one of the second, where moving one unit of weight from word $x$
//! to word $y$ costs the Euclidean distance of their vectors.

use crate::embedding::Lookup;
use crate::transport::{self, Problem};

use log::debug;
use std::collections::HashMap;

/// A normalized bag of known words.
#[derive(Clone, Debug)]
pub struct Bag<'a> {
    words: Vec<String>,
    weights: Vec<f64>,
    vectors: Vec<&'a [f64]>,
}

impl<'a> Bag<'a> {
    /// Create the bag of words of a token sequence.
    ///
    /// Tokens are lower-cased, tokens without a vector are ignored. The
    /// weight of a word is its number of occurrences divided by the
    /// number of known tokens.
    pub fn new<L, I, S>(tokens: I, lookup: &'a L) -> Self
    where
        L: Lookup + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ids = HashMap::new();
        let mut bag = Bag {
            words: vec![],
            weights: vec![],
            vectors: vec![],
        };
        let mut total = 0usize;
        for token in tokens {
            let word = token.as_ref().to_lowercase();
            if let Some(&id) = ids.get(&word) {
                bag.weights[id] += 1.0;
                total += 1;
            } else if let Some(v) = lookup.vector(&word) {
                ids.insert(word.clone(), bag.words.len());
                bag.words.push(word);
                bag.weights.push(1.0);
                bag.vectors.push(v);
                total += 1;
            }
        }
        for w in &mut bag.weights {
            *w /= total as f64;
        }
        bag
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Euclidean distances between the words of `self` and `other`.
    pub fn distances(&self, other: &Bag) -> Vec<Vec<f64>> {
        self.vectors
            .iter()
            .map(|x| other.vectors.iter().map(|y| euclidean(x, y)).collect())
            .collect()
    }
}

fn euclidean(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt()
}

/// Return the word mover's distance between two token sequences.
///
/// If one of the sequences contains no known word the distance is
/// infinite.
pub fn wmd<L, I, J, S, T>(d1: I, d2: J, lookup: &L) -> transport::Result<f64>
where
    L: Lookup + ?Sized,
    I: IntoIterator<Item = S>,
    J: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    let b1 = Bag::new(d1, lookup);
    let b2 = Bag::new(d2, lookup);
    if b1.is_empty() || b2.is_empty() {
        return Ok(f64::INFINITY);
    }

    let mut problem = Problem::new(b1.weights(), b2.weights(), &b1.distances(&b2))?;
    let state = problem.solve()?;
    debug!(
        "wmd between {} and {} words: {:?} after {} iterations",
        b1.len(),
        b2.len(),
        state,
        problem.num_iterations()
    );
    Ok(problem.cost())
}

/// Return the word mover's similarity `1 / (1 + wmd)`.
///
/// The similarity is in `[0, 1]`, it is `0` if one of the sequences
/// contains no known word.
pub fn wms<L, I, J, S, T>(d1: I, d2: J, lookup: &L) -> transport::Result<f64>
where
    L: Lookup + ?Sized,
    I: IntoIterator<Item = S>,
    J: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    wmd(d1, d2, lookup).map(|d| 1.0 / (1.0 + d))
}
