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

use rs_transport::{wmd, Embeddings};
use std::error::Error;

use log::LevelFilter;
use rustop::opts;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use time::OffsetDateTime;

fn main() -> Result<(), Box<dyn Error>> {
    let (args, _) = opts! {
        synopsis "Compute the word mover's distance between two sentences.";
        param model:String, desc:"Word vectors in binary word2vec format (possibly compressed)";
        param first:String, desc:"First sentence";
        param second:String, desc:"Second sentence";
        opt verbose:bool, desc:"Print debug messages";
    }
    .parse_or_exit();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let tstart = OffsetDateTime::now_utc();
    let emb = Embeddings::read(zopen::read(&args.model)?)?;
    let tend = OffsetDateTime::now_utc();
    println!("Model               : {}", args.model);
    println!("Read Time (seconds) : {}", (tend - tstart).as_seconds_f64());
    println!("Number of words     : {}", emb.len());
    println!("Dimension           : {}", emb.dim());

    let d1: Vec<_> = args.first.split_whitespace().collect();
    let d2: Vec<_> = args.second.split_whitespace().collect();

    let tstart = OffsetDateTime::now_utc();
    let dist = wmd(&d1, &d2, &emb)?;
    let tend = OffsetDateTime::now_utc();

    println!();
    println!("Distance            : {:.6}", dist);
    println!("Similarity          : {:.6}", 1.0 / (1.0 + dist));
    println!("Time (seconds)      : {:.6}", (tend - tstart).as_seconds_f64());

    Ok(())
}
