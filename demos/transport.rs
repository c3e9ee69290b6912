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

use rs_transport::transport::{Options, Problem};
use serde_derive::Deserialize;
use std::error::Error;
use std::result::Result;

use log::LevelFilter;
use rustop::opts;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use time::OffsetDateTime;

/// A transportation instance as JSON object.
///
/// ```json
/// { "supply": [10, 20], "demand": [15, 15], "costs": [[1, 2], [3, 4]] }
/// ```
#[derive(Deserialize)]
struct Instance {
    supply: Vec<f64>,
    demand: Vec<f64>,
    costs: Vec<Vec<f64>>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let (args, _) = opts! {
        synopsis "Solve a transportation problem with the MODI method.";
        param file:String, desc:"Instance file name (JSON, possibly compressed)";
        opt max_iter:usize=100, desc:"Maximal number of iterations (0 = unlimited)";
        opt epsilon:f64=1e-6, desc:"Tolerance for comparisons";
        opt flows:bool, desc:"Print the flow matrix";
        opt verbose:bool, desc:"Print debug messages";
    }
    .parse_or_exit();

    let level = if args.verbose { LevelFilter::Trace } else { LevelFilter::Warn };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let tstart = OffsetDateTime::now_utc();
    let instance: Instance = serde_json::from_reader(zopen::read(&args.file)?)?;
    let tend = OffsetDateTime::now_utc();

    println!("Instance            : {}", args.file);
    println!("Read Time (seconds) : {}", (tend - tstart).as_seconds_f64());
    println!("Number of producers : {}", instance.supply.len());
    println!("Number of consumers : {}", instance.demand.len());

    let opts = Options {
        max_iter: args.max_iter,
        epsilon: args.epsilon,
        ..Options::default()
    };
    let mut problem = Problem::with_options(&instance.supply, &instance.demand, &instance.costs, opts)?;
    println!("Balance             : {:?}", problem.balance());

    let tstart = OffsetDateTime::now_utc();
    let state = problem.solve()?;
    let tend = OffsetDateTime::now_utc();

    let (value, flows) = problem.solution();
    println!();
    println!("Solution state      : {:?}", state);
    println!("Value               : {:.6}", value);
    println!("Time (seconds)      : {:.6}", (tend - tstart).as_seconds_f64());
    println!("Iterations          : {}", problem.num_iterations());

    if args.flows {
        println!();
        for row in &flows {
            let row: Vec<_> = row.iter().map(|x| format!("{:10.4}", x)).collect();
            println!("{}", row.join(" "));
        }
    }

    Ok(())
}
