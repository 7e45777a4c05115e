// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::MovieId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleSummary {
    pub id: MovieId,
    pub title: String,
}

impl TitleSummary {
    pub fn new(id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Loosely typed detail value. The service is not consistent about whether
/// `stars`, `genres` or `year` arrive as strings, numbers or arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Falsy values render as the field placeholder: `false`, zero, blank
    /// text, and lists holding nothing but blanks.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Bool(value) => !value,
            Self::Number(number) => number.as_f64() == Some(0.0),
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.iter().all(Self::is_blank),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text.trim()),
            Self::List(items) => {
                let parts = items
                    .iter()
                    .filter(|item| !item.is_blank())
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<FieldValue>,
    #[serde(default)]
    pub director: Option<FieldValue>,
    #[serde(default)]
    pub stars: Option<FieldValue>,
    #[serde(default)]
    pub genres: Option<FieldValue>,
    #[serde(default)]
    pub rated: Option<FieldValue>,
    #[serde(default)]
    pub year: Option<FieldValue>,
    #[serde(default)]
    pub rating: Option<FieldValue>,
    #[serde(default)]
    pub img: Option<FieldValue>,
}

impl MovieDetail {
    pub fn new(id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            director: None,
            stars: None,
            genres: None,
            rated: None,
            year: None,
            rating: None,
            img: None,
        }
    }

    pub fn field(&self, field: DetailField) -> Option<&FieldValue> {
        match field {
            DetailField::Description => self.description.as_ref(),
            DetailField::Director => self.director.as_ref(),
            DetailField::Stars => self.stars.as_ref(),
            DetailField::Genres => self.genres.as_ref(),
            DetailField::Rated => self.rated.as_ref(),
            DetailField::Year => self.year.as_ref(),
            DetailField::Rating => self.rating.as_ref(),
            DetailField::Image => self.img.as_ref(),
        }
    }

    /// Rendered value for one field, never blank.
    pub fn display_value(&self, field: DetailField) -> String {
        match self.field(field) {
            Some(value) if !value.is_blank() => value.to_string(),
            _ => field.placeholder().to_owned(),
        }
    }

    pub fn rows(&self) -> Vec<(DetailField, String)> {
        DetailField::ALL
            .iter()
            .map(|field| (*field, self.display_value(*field)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    Description,
    Director,
    Stars,
    Genres,
    Rated,
    Year,
    Rating,
    Image,
}

impl DetailField {
    pub const ALL: [Self; 8] = [
        Self::Description,
        Self::Director,
        Self::Stars,
        Self::Genres,
        Self::Rated,
        Self::Year,
        Self::Rating,
        Self::Image,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Director => "Director",
            Self::Stars => "Stars",
            Self::Genres => "Genres",
            Self::Rated => "Rated",
            Self::Year => "Year",
            Self::Rating => "Rating",
            Self::Image => "Image",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Description => "No found description",
            Self::Director => "No found director",
            Self::Stars => "No found stars",
            Self::Genres => "No found genres",
            Self::Rated => "This movie is not rated",
            Self::Year => "No found year",
            Self::Rating => "No rating found",
            Self::Image => "No found image",
        }
    }
}
