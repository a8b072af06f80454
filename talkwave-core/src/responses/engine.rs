//! Uniform random reply selection

use rand::seq::IteratorRandom;
use rand::Rng;

use super::{ResponseCatalog, ResponseError};

/// Picks one catalog entry uniformly at random over the key space
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEngine;

impl ResponseEngine {
    /// Pick a reply using the thread-local generator
    pub fn generate(catalog: &ResponseCatalog) -> Result<String, ResponseError> {
        Self::generate_with(catalog, &mut rand::thread_rng())
    }

    /// Pick a reply using the given generator
    pub fn generate_with<R: Rng + ?Sized>(
        catalog: &ResponseCatalog,
        rng: &mut R,
    ) -> Result<String, ResponseError> {
        let key = catalog
            .keys()
            .choose(rng)
            .ok_or(ResponseError::EmptyCatalog)?;
        catalog
            .get(key)
            .map(str::to_string)
            .ok_or(ResponseError::EmptyCatalog)
    }
}
