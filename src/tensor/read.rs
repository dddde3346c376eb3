//! CSV loading of tensors.

use std::fmt;
use std::path::Path;

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::Domain;
use crate::math::Scalar;

use super::{Tensor1, Tensor2};

/// Failures while loading a tensor from a CSV file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed CSV or a record that does not deserialize.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    /// The file held no data records.
    #[error("CSV file contains no data records")]
    Empty,
}

impl<K, F> Tensor1<K, F>
where
    K: Ord + Clone + fmt::Debug + DeserializeOwned,
    F: Scalar + DeserializeOwned,
{
    /// Read `(key, value)` records from a headerless CSV file.
    ///
    /// The domain is the set of keys present in the file, every key is
    /// active, and the default is zero.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let mut rdr = ReaderBuilder::new().has_headers(false).from_path(path)?;

        let mut entries: Vec<(K, F)> = Vec::new();
        for record in rdr.deserialize() {
            entries.push(record?);
        }
        if entries.is_empty() {
            return Err(ReadError::Empty);
        }

        let domain: Domain<K> = entries.iter().map(|(key, _)| key.clone()).collect();
        let mut tensor = Self::zeros(domain);
        for (key, value) in entries {
            tensor.store_unchecked(key, value);
        }
        Ok(tensor)
    }
}

impl<R, C, F> Tensor2<R, C, F>
where
    R: Ord + Clone + fmt::Debug + DeserializeOwned,
    C: Ord + Clone + fmt::Debug + DeserializeOwned,
    F: Scalar + DeserializeOwned,
{
    /// Read `(row, col, value)` triplets from a headerless CSV file.
    ///
    /// The row and column domains are the sets of labels present in the
    /// file; the default is zero.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let mut rdr = ReaderBuilder::new().has_headers(false).from_path(path)?;

        let mut triplets: Vec<(R, C, F)> = Vec::new();
        for record in rdr.deserialize() {
            triplets.push(record?);
        }
        if triplets.is_empty() {
            return Err(ReadError::Empty);
        }

        let rows: Domain<R> = triplets.iter().map(|(row, _, _)| row.clone()).collect();
        let cols: Domain<C> = triplets.iter().map(|(_, col, _)| col.clone()).collect();
        let mut tensor = Self::zeros(rows, cols);
        for (row, col, value) in triplets {
            // Labels were collected from the triplets themselves.
            tensor.store_unchecked((row, col), value);
        }
        Ok(tensor)
    }
}
