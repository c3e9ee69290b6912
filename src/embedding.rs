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

//! Word vector tables in the binary word2vec format.
//!
//! A file starts with an ASCII header line `<count> <dim>`. Each of the
//! `count` entries consists of the word, a single space and `dim`
//! little-endian `f32` values, optionally followed by a newline.
//!
//! Vectors are stored as `f64` in memory and as `f32` on disk. Models
//! are often distributed gzip compressed, see
//! [`Embeddings::from_gzip_file`].

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, warn};

use std::collections::HashMap;
use std::error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Words of this length (in bytes) or longer are skipped when reading.
pub const MAX_WORD_LEN: usize = 100;

/// Largest vector dimension accepted in a file header.
pub const MAX_DIM: usize = 1 << 16;

/// Error when reading a word vector table.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Format { msg: String },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::Format { msg } => write!(fmt, "Format error: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Access to the vector of a token.
///
/// All vectors returned by one lookup have length `dim()`.
pub trait Lookup {
    fn dim(&self) -> usize;

    fn vector(&self, token: &str) -> Option<&[f64]>;
}

/// A table of word vectors.
#[derive(Clone, Debug, Default)]
pub struct Embeddings {
    dim: usize,
    index: HashMap<String, usize>,
    words: Vec<String>,
    data: Vec<f64>,
}

impl Embeddings {
    /// Create an empty table for vectors of length `dim`.
    pub fn new(dim: usize) -> Self {
        Embeddings {
            dim,
            ..Default::default()
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Insert or replace the vector of a word.
    ///
    /// The word is stored in lower case. Returns the id of the word.
    ///
    /// # Panics
    ///
    /// Panics if `vector.len() != self.dim()` or if the word cannot be
    /// stored in word2vec format, i.e. if it is empty, contains a space
    /// or starts with a line break.
    pub fn insert(&mut self, word: &str, vector: &[f64]) -> usize {
        assert_eq!(vector.len(), self.dim, "vector length must equal dimension");
        assert!(is_valid_word(word), "invalid word {:?}", word);
        let word = word.to_lowercase();
        if let Some(&id) = self.index.get(&word) {
            self.data[id * self.dim..(id + 1) * self.dim].copy_from_slice(vector);
            id
        } else {
            let id = self.words.len();
            self.index.insert(word.clone(), id);
            self.words.push(word);
            self.data.extend_from_slice(vector);
            id
        }
    }

    pub fn id(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn word(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    /// Return the vector of a word.
    pub fn get(&self, word: &str) -> Option<&[f64]> {
        self.id(word).and_then(|id| self.get_by_id(id))
    }

    /// Return the vector of a word id.
    pub fn get_by_id(&self, id: usize) -> Option<&[f64]> {
        if id < self.words.len() {
            Some(&self.data[id * self.dim..(id + 1) * self.dim])
        } else {
            None
        }
    }

    /// Iterate over all words and their vectors in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.words
            .iter()
            .enumerate()
            .map(move |(id, w)| (w.as_str(), &self.data[id * self.dim..(id + 1) * self.dim]))
    }

    /// Read a table in binary word2vec format.
    pub fn read<R: Read>(reader: R) -> Result<Embeddings> {
        let mut reader = BufReader::new(reader);

        let mut header = String::new();
        reader.read_line(&mut header)?;
        let mut toks = header.split_whitespace();
        let mut header_value = |what: &str| -> Result<usize> {
            let tok = toks.next().ok_or_else(|| Error::Format {
                msg: format!("missing {} in header", what),
            })?;
            tok.parse().map_err(|e| Error::Format {
                msg: format!("invalid {} '{}' in header: {}", what, tok, e),
            })
        };
        let count = header_value("word count")?;
        let dim = header_value("dimension")?;
        if dim > MAX_DIM {
            return Err(Error::Format {
                msg: format!("dimension {} too large (>{})", dim, MAX_DIM),
            });
        }

        let mut emb = Embeddings::new(dim);
        let mut word = Vec::new();
        let mut vector = vec![0f32; dim];
        let mut skipped = 0;
        for _ in 0..count {
            word.clear();
            read_word(&mut reader, &mut word)?;
            reader.read_f32_into::<LittleEndian>(&mut vector)?;

            if word.len() >= MAX_WORD_LEN {
                skipped += 1;
                continue;
            }
            let w = String::from_utf8_lossy(&word);
            let v: Vec<f64> = vector.iter().map(|&x| f64::from(x)).collect();
            emb.insert(&w, &v);
        }

        if skipped > 0 {
            warn!("skipped {} words longer than {} bytes", skipped, MAX_WORD_LEN);
        }
        debug!("read {} word vectors of dimension {}", emb.len(), dim);

        Ok(emb)
    }

    /// Read a table in binary word2vec format from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Embeddings> {
        Embeddings::read(File::open(path)?)
    }

    /// Read a gzip compressed table in binary word2vec format.
    pub fn from_gzip_file<P: AsRef<Path>>(path: P) -> Result<Embeddings> {
        Embeddings::read(GzDecoder::new(BufReader::new(File::open(path)?)))
    }

    /// Write the table in binary word2vec format.
    pub fn write<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut writer = BufWriter::new(writer);
        writeln!(writer, "{} {}", self.len(), self.dim)?;
        for (word, vector) in self.iter() {
            writer.write_all(word.as_bytes())?;
            writer.write_all(b" ")?;
            for &x in vector {
                writer.write_f32::<LittleEndian>(x as f32)?;
            }
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }

    /// Write the table in binary word2vec format to a file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        self.write(File::create(path)?)
    }

    /// Write the table gzip compressed in binary word2vec format.
    pub fn to_gzip_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut encoder = GzEncoder::new(BufWriter::new(File::create(path)?), Compression::default());
        self.write(&mut encoder)?;
        encoder.finish()?.flush()
    }
}

impl Lookup for Embeddings {
    fn dim(&self) -> usize {
        self.dim
    }

    fn vector(&self, token: &str) -> Option<&[f64]> {
        self.get(token)
    }
}

impl Lookup for HashMap<String, Vec<f64>> {
    fn dim(&self) -> usize {
        self.values().next().map(Vec::len).unwrap_or(0)
    }

    fn vector(&self, token: &str) -> Option<&[f64]> {
        self.get(token).map(Vec::as_slice)
    }
}

// Words that `read_word` would split or strip differently.
fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && !word.contains(' ') && !word.starts_with(&['\n', '\r'][..])
}

// Read the next word up to (and excluding) the separating space.
//
// Leading newlines (written after each vector by most tools) are skipped.
fn read_word<R: BufRead>(reader: &mut R, word: &mut Vec<u8>) -> Result<()> {
    loop {
        let b = reader.read_u8()?;
        match b {
            b' ' if word.is_empty() => {
                return Err(Error::Format {
                    msg: "empty word".to_string(),
                })
            }
            b' ' => return Ok(()),
            b'\n' | b'\r' if word.is_empty() => continue,
            _ => word.push(b),
        }
    }
}
