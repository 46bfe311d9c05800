//! In-memory vector index with exact nearest-neighbour search.
//!
//! The index maps string identifiers to vectors and answers top-N queries by
//! scoring the query against every stored vector. Selection keeps a bounded
//! heap of the `top_n` best candidates, so a query costs `O(N log top_n)`.
//!
//! Access goes through a reader-biased lock: inserts take the write half,
//! searches hold the read half for the whole scoring pass and therefore see
//! one consistent snapshot.
//!
//! An approximate index (HNSW, IVF) could replace the linear scan behind
//! [`VectorIndex::search`] without changing its ordering contract.

use crate::vector::metric::DistanceMetric;
use crate::vector::types::{SearchHit, Vector, VectorError};
use parking_lot::RwLock;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

/// Thread-safe identifier → vector mapping.
#[derive(Debug, Default)]
pub struct VectorIndex {
    vectors: RwLock<HashMap<String, Vector>>,
    metric: DistanceMetric,
}

impl VectorIndex {
    /// Creates an empty index ranking with `metric`.
    #[must_use]
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            vectors: RwLock::new(HashMap::new()),
            metric,
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Inserts `vector` under `id`, replacing any previous vector.
    ///
    /// No dimension check happens here; mismatches surface at query time.
    pub fn add_vector(&self, id: impl Into<String>, vector: Vector) {
        self.vectors.write().insert(id.into(), vector);
    }

    /// Inserts a batch under a single write lock.
    pub fn add_vectors<I>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, Vector)>,
    {
        let mut guard = self.vectors.write();
        let mut inserted = 0;
        for (id, vector) in entries {
            guard.insert(id, vector);
            inserted += 1;
        }
        inserted
    }

    pub fn remove_vector(&self, id: &str) -> Option<Vector> {
        self.vectors.write().remove(id)
    }

    pub fn get_vector(&self, id: &str) -> Option<Vector> {
        self.vectors.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.vectors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.read().is_empty()
    }

    /// Searches with the index's configured metric.
    pub fn search(&self, query: &[f64], top_n: usize) -> Result<SearchResults, VectorError> {
        self.search_with_metric(query, top_n, self.metric)
    }

    /// Returns the `min(top_n, len)` stored vectors closest to `query`.
    ///
    /// Results are ordered closest first; equal scores are ordered by
    /// identifier ascending.
    ///
    /// # Errors
    /// - `EmptyStore` if the index holds no vectors
    /// - any metric error (dimension mismatch, zero magnitude, empty vector,
    ///   non-finite score) raised by a single stored vector fails the whole
    ///   query; when several vectors fail, the one with the lowest identifier
    ///   is reported
    pub fn search_with_metric(
        &self,
        query: &[f64],
        top_n: usize,
        metric: DistanceMetric,
    ) -> Result<SearchResults, VectorError> {
        let guard = self.vectors.read();
        if guard.is_empty() {
            return Err(VectorError::EmptyStore);
        }

        // Worst retained candidate sits on top of the min-heap
        let mut heap: BinaryHeap<Reverse<Candidate<'_>>> =
            BinaryHeap::with_capacity(top_n.min(guard.len()) + 1);

        let mut failure: Option<(&String, VectorError)> = None;

        for (id, vector) in guard.iter() {
            let score = match metric.evaluate(query, vector) {
                Ok(score) => score,
                Err(err) => {
                    if failure.as_ref().is_none_or(|(first, _)| id < *first) {
                        failure = Some((id, err));
                    }
                    continue;
                }
            };
            if failure.is_some() || top_n == 0 {
                continue;
            }
            heap.push(Reverse(Candidate { id, score, metric }));
            if heap.len() > top_n {
                heap.pop();
            }
        }

        if let Some((_, err)) = failure {
            return Err(err);
        }

        // Ascending order of Reverse<_> is best-first
        let hits = heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(c)| SearchHit {
                id: c.id.clone(),
                score: c.score,
            })
            .collect();

        Ok(SearchResults::new(hits))
    }
}

/// Scored entry ordered so that `Greater` means "better match".
struct Candidate<'a> {
    id: &'a String,
    score: f64,
    metric: DistanceMetric,
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.metric
            .rank(self.score, other.score)
            // Lower identifier wins a tie
            .then_with(|| other.id.cmp(self.id))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

/// Ranked, finite sequence of hits produced by one search.
///
/// Consuming it does not re-run the query; a new search is needed for a
/// fresh sequence.
#[derive(Debug)]
pub struct SearchResults {
    hits: std::vec::IntoIter<SearchHit>,
}

impl SearchResults {
    fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits: hits.into_iter(),
        }
    }

    /// Identifiers only, in ranked order.
    pub fn ids(self) -> impl Iterator<Item = String> {
        self.map(|hit| hit.id)
    }
}

impl Iterator for SearchResults {
    type Item = SearchHit;

    fn next(&mut self) -> Option<Self::Item> {
        self.hits.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}

impl ExactSizeIterator for SearchResults {}
