use std::{collections::HashSet, fs, path::Path};

use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

/// Catalog of titles plus the precomputed N×N similarity matrix
///
/// Built once at startup and read-only afterwards. Scores are stored
/// row-major in a single buffer.
#[derive(Debug)]
pub struct SimilarityIndex {
    catalog: Vec<MovieRecord>,
    scores: Vec<f64>,
}

impl SimilarityIndex {
    /// Validates and assembles the index
    ///
    /// Fails with `Integrity` when a record's index is not its position, when
    /// the matrix is not N×N for a catalog of N titles, or when a score is not
    /// finite.
    pub fn new(catalog: Vec<MovieRecord>, matrix: Vec<Vec<f64>>) -> AppResult<Self> {
        let n = catalog.len();

        if let Some((position, record)) = catalog
            .iter()
            .enumerate()
            .find(|(position, record)| record.index != *position)
        {
            return Err(AppError::Integrity(format!(
                "catalog entry {:?} at position {} has index {}",
                record.title, position, record.index
            )));
        }

        if matrix.len() != n {
            return Err(AppError::Integrity(format!(
                "similarity matrix has {} rows but catalog has {} titles",
                matrix.len(),
                n
            )));
        }

        let mut scores = Vec::with_capacity(n * n);
        for (i, row) in matrix.into_iter().enumerate() {
            if row.len() != n {
                return Err(AppError::Integrity(format!(
                    "similarity row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            if let Some(j) = row.iter().position(|score| !score.is_finite()) {
                return Err(AppError::Integrity(format!(
                    "similarity score at ({}, {}) is not finite",
                    i, j
                )));
            }
            scores.extend(row);
        }

        let mut seen = HashSet::with_capacity(n);
        for record in &catalog {
            if !seen.insert(record.title.as_str()) {
                tracing::warn!(
                    title = %record.title,
                    index = record.index,
                    "Duplicate catalog title, lookups resolve to its first occurrence"
                );
            }
        }

        Ok(Self { catalog, scores })
    }

    /// Loads the catalog and matrix artifacts from JSON files
    pub fn load(catalog_path: impl AsRef<Path>, matrix_path: impl AsRef<Path>) -> AppResult<Self> {
        let catalog: Vec<MovieRecord> = read_artifact(catalog_path.as_ref())?;
        let matrix: Vec<Vec<f64>> = read_artifact(matrix_path.as_ref())?;

        let index = Self::new(catalog, matrix)?;

        tracing::info!(titles = index.len(), "Similarity index loaded");

        Ok(index)
    }

    /// Position of the first catalog entry titled exactly `title`
    pub fn resolve_index(&self, title: &str) -> AppResult<usize> {
        self.catalog
            .iter()
            .position(|record| record.title == title)
            .ok_or_else(|| AppError::NotFound(format!("Title not in catalog: {}", title)))
    }

    /// Every candidate paired with its similarity to `index`, in catalog order
    pub fn row(&self, index: usize) -> AppResult<Vec<(usize, f64)>> {
        let n = self.len();
        if index >= n {
            return Err(AppError::NotFound(format!(
                "Catalog index {} out of range (size {})",
                index, n
            )));
        }

        Ok(self.scores[index * n..(index + 1) * n]
            .iter()
            .copied()
            .enumerate()
            .collect())
    }

    pub fn title(&self, index: usize) -> Option<&str> {
        self.catalog.get(index).map(|record| record.title.as_str())
    }

    pub fn catalog(&self) -> &[MovieRecord] {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::Integrity(format!("failed to parse {}: {}", path.display(), e))
    })
}
