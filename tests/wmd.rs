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

use std::collections::HashMap;
use std::error::Error;

use rs_transport::{wmd, wms, Embeddings, Lookup};

const EPS: f64 = 1e-9;

fn vectors() -> Embeddings {
    let mut emb = Embeddings::new(2);
    for &(word, x, y) in &[
        ("test", 0.18, 0.24),
        ("word", 0.09, 0.43),
        ("world", -0.18, 0.23),
        ("text", 0.04, 0.11),
        ("a", -0.03, 0.02),
        ("the", -0.07, 0.05),
    ] {
        emb.insert(word, &[x, y]);
    }
    emb
}

fn tokens(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

#[test]
fn test_distances() -> Result<(), Box<dyn Error>> {
    let emb = vectors();
    for &(d1, d2, expected) in &[
        ("A test word", "The text world", 0.19235189469121894),
        ("a a test", "the text", 0.10768616766679495),
        ("test", "world", 0.3601388621073821),
        ("word world", "world word", 0.0),
    ] {
        let d = wmd(tokens(d1), tokens(d2), &emb)?;
        assert!((d - expected).abs() < EPS, "wmd({:?}, {:?}) = {} != {}", d1, d2, d, expected);
    }
    Ok(())
}

#[test]
fn test_symmetry() -> Result<(), Box<dyn Error>> {
    let emb = vectors();
    let d1 = tokens("A test word test");
    let d2 = tokens("the text world a");
    let x = wmd(&d1, &d2, &emb)?;
    let y = wmd(&d2, &d1, &emb)?;
    assert!((x - y).abs() < EPS);
    assert_eq!(wmd(&d1, &d1, &emb)?, 0.0);
    Ok(())
}

#[test]
fn test_unknown_words() -> Result<(), Box<dyn Error>> {
    let emb = vectors();
    assert_eq!(wmd(tokens("foo bar"), tokens("test"), &emb)?, f64::INFINITY);
    assert_eq!(wmd(tokens("test"), Vec::<&str>::new(), &emb)?, f64::INFINITY);
    assert_eq!(wms(tokens("foo"), tokens("bar"), &emb)?, 0.0);

    // unknown tokens do not contribute
    let x = wmd(tokens("test foo word"), tokens("world"), &emb)?;
    let y = wmd(tokens("test word"), tokens("world bar"), &emb)?;
    assert!((x - y).abs() < EPS);
    Ok(())
}

#[test]
fn test_similarity() -> Result<(), Box<dyn Error>> {
    let emb = vectors();
    assert_eq!(wms(tokens("word world"), tokens("world word"), &emb)?, 1.0);

    let s = wms(tokens("test"), tokens("world"), &emb)?;
    assert!(s > 0.0 && s < 1.0);
    assert!((s - 1.0 / (1.0 + 0.3601388621073821)).abs() < EPS);
    Ok(())
}

#[test]
fn test_hashmap_lookup() -> Result<(), Box<dyn Error>> {
    let table: HashMap<String, Vec<f64>> = vectors()
        .iter()
        .map(|(w, v)| (w.to_string(), v.to_vec()))
        .collect();
    assert_eq!(table.dim(), 2);
    let d = wmd(tokens("A test word"), tokens("The text world"), &table)?;
    assert!((d - 0.19235189469121894).abs() < EPS);
    Ok(())
}

#[test]
fn test_model_file() -> Result<(), Box<dyn Error>> {
    let emb = vectors();
    let path = std::env::temp_dir().join(format!("rs-transport-wmd-{}.bin", std::process::id()));
    emb.to_file(&path)?;
    let back = Embeddings::from_file(&path);
    std::fs::remove_file(&path)?;
    let back = back?;

    assert_eq!(back.len(), emb.len());
    assert_eq!(back.dim(), 2);

    // vectors are stored in single precision
    let d = wmd(tokens("A test word"), tokens("The text world"), &back)?;
    assert!((d - 0.19235189469121894).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_gzip_model_file() -> Result<(), Box<dyn Error>> {
    let emb = vectors();
    let path = std::env::temp_dir().join(format!("rs-transport-wmd-{}.bin.gz", std::process::id()));
    emb.to_gzip_file(&path)?;
    let back = Embeddings::from_gzip_file(&path);
    let plain = Embeddings::from_file(&path);
    std::fs::remove_file(&path)?;
    let back = back?;

    // the compressed file is not a plain model
    assert!(plain.is_err());

    assert_eq!(back.len(), emb.len());
    for (word, vector) in emb.iter() {
        let v = back.get(word).ok_or("missing word")?;
        for (x, y) in vector.iter().zip(v) {
            assert_eq!(*x as f32, *y as f32);
        }
    }
    Ok(())
}
