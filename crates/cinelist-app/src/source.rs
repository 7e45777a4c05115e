// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::ids::MovieId;
use crate::model::{MovieDetail, TitleSummary};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Connection failure or a non-2xx response.
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("movie {0} not found")]
    NotFound(MovieId),
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
}

/// Read-only access to the remote catalog.
pub trait CatalogSource: Send + Sync {
    fn list_titles(&self) -> Result<Vec<TitleSummary>, CatalogError>;
    fn get_detail(&self, id: &MovieId) -> Result<MovieDetail, CatalogError>;
}

impl<S: CatalogSource + ?Sized> CatalogSource for Box<S> {
    fn list_titles(&self) -> Result<Vec<TitleSummary>, CatalogError> {
        (**self).list_titles()
    }

    fn get_detail(&self, id: &MovieId) -> Result<MovieDetail, CatalogError> {
        (**self).get_detail(id)
    }
}
