// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use cinelist_app::{CatalogError, CatalogSource, FieldValue, MovieDetail, MovieId, TitleSummary};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

const DEMO_MOVIES: [(&str, &str, i64, &str, &str); 14] = [
    ("Up", "Pete Docter", 2009, "PG", "Animation, Adventure"),
    ("Upstream Color", "Shane Carruth", 2013, "", "Drama, Sci-Fi"),
    ("Down by Law", "Jim Jarmusch", 1986, "R", "Comedy, Crime"),
    ("Heat", "Michael Mann", 1995, "R", "Crime, Thriller"),
    ("Alien", "Ridley Scott", 1979, "R", "Horror, Sci-Fi"),
    ("Arrival", "Denis Villeneuve", 2016, "PG-13", "Drama, Sci-Fi"),
    ("Paddington 2", "Paul King", 2017, "PG", "Comedy, Family"),
    ("Spirited Away", "Hayao Miyazaki", 2001, "PG", "Animation, Fantasy"),
    ("The Third Man", "Carol Reed", 1949, "", "Film-Noir, Thriller"),
    ("Amélie", "Jean-Pierre Jeunet", 2001, "R", "Comedy, Romance"),
    ("Mad Max: Fury Road", "George Miller", 2015, "R", "Action, Adventure"),
    ("In the Mood for Love", "Wong Kar-wai", 2000, "PG", "Drama, Romance"),
    ("Stalker", "", 1979, "", "Drama, Sci-Fi"),
    ("Moon", "Duncan Jones", 2009, "R", ""),
];

const DEMO_STARS: [&str; 7] = [
    "Ed Asner",
    "Al Pacino",
    "Sigourney Weaver",
    "Amy Adams",
    "Ben Whishaw",
    "Audrey Tautou",
    "Charlize Theron",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    ListTitles,
    GetDetail(MovieId),
}

/// Releases one gated request. Dropping the gate also releases it.
#[derive(Debug)]
pub struct Gate {
    tx: Sender<()>,
}

impl Gate {
    pub fn release(self) {
        let _ = self.tx.send(());
    }
}

/// In-memory `CatalogSource`. Requests for gated titles or ids block until the
/// matching `Gate` is released, which lets tests choose resolution order.
#[derive(Debug)]
pub struct FakeCatalog {
    titles: Result<Vec<TitleSummary>, CatalogError>,
    details: HashMap<MovieId, Result<MovieDetail, CatalogError>>,
    titles_gate: Mutex<Option<Receiver<()>>>,
    detail_gates: Mutex<HashMap<MovieId, Receiver<()>>>,
    calls: Mutex<Vec<FakeCall>>,
}

impl Default for FakeCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FakeCatalog {
    pub fn new(titles: Vec<TitleSummary>) -> Self {
        Self {
            titles: Ok(titles),
            details: HashMap::new(),
            titles_gate: Mutex::new(None),
            detail_gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Titles plus a bare detail record (no optional fields) for each.
    pub fn with_bare_details(titles: Vec<TitleSummary>) -> Self {
        let mut catalog = Self::new(titles.clone());
        for title in titles {
            let detail = MovieDetail::new(title.id.clone(), title.title);
            catalog.details.insert(title.id, Ok(detail));
        }
        catalog
    }

    pub fn with_detail(mut self, detail: MovieDetail) -> Self {
        self.details.insert(detail.id.clone(), Ok(detail));
        self
    }

    pub fn with_detail_error(mut self, id: impl Into<MovieId>, error: CatalogError) -> Self {
        self.details.insert(id.into(), Err(error));
        self
    }

    pub fn with_titles_error(mut self, error: CatalogError) -> Self {
        self.titles = Err(error);
        self
    }

    pub fn gate_titles(&self) -> Gate {
        let (tx, rx) = mpsc::channel();
        *lock(&self.titles_gate) = Some(rx);
        Gate { tx }
    }

    pub fn gate_detail(&self, id: impl Into<MovieId>) -> Gate {
        let (tx, rx) = mpsc::channel();
        lock(&self.detail_gates).insert(id.into(), rx);
        Gate { tx }
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: FakeCall) {
        lock(&self.calls).push(call);
    }
}

impl CatalogSource for FakeCatalog {
    fn list_titles(&self) -> Result<Vec<TitleSummary>, CatalogError> {
        self.record(FakeCall::ListTitles);
        let gate = lock(&self.titles_gate).take();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        self.titles.clone()
    }

    fn get_detail(&self, id: &MovieId) -> Result<MovieDetail, CatalogError> {
        self.record(FakeCall::GetDetail(id.clone()));
        let gate = lock(&self.detail_gates).remove(id);
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        self.details
            .get(id)
            .cloned()
            .unwrap_or_else(|| Err(CatalogError::NotFound(id.clone())))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Catalog used by `cinelist --demo`. A few records deliberately leave fields
/// out so the placeholders are visible.
pub fn demo_catalog() -> FakeCatalog {
    let mut titles = Vec::with_capacity(DEMO_MOVIES.len());
    let mut catalog = FakeCatalog::default();

    for (index, (title, director, year, rated, genres)) in DEMO_MOVIES.iter().enumerate() {
        let id = MovieId::from(index as i64 + 1);
        titles.push(TitleSummary::new(id.clone(), *title));

        let mut detail = MovieDetail::new(id, *title);
        detail.director = text_value(director);
        detail.rated = text_value(rated);
        detail.genres = text_value(genres);
        detail.year = Some(FieldValue::Number((*year).into()));
        if index % 3 != 2 {
            detail.description = Some(FieldValue::Text(format!(
                "{title} ({year}), directed by {}.",
                if director.is_empty() {
                    "an unknown director"
                } else {
                    *director
                }
            )));
        }
        if index % 4 != 3 {
            let star = DEMO_STARS[index % DEMO_STARS.len()];
            detail.stars = Some(FieldValue::List(vec![FieldValue::Text(star.to_owned())]));
            detail.rating = serde_number(6.0 + (index % 7) as f64 * 0.5);
        }
        if index % 2 == 0 {
            detail.img = Some(FieldValue::Text(format!(
                "https://img.example.test/posters/{}.jpg",
                index + 1
            )));
        }
        catalog = catalog.with_detail(detail);
    }

    catalog.titles = Ok(titles);
    catalog
}

fn text_value(value: &str) -> Option<FieldValue> {
    if value.is_empty() {
        None
    } else {
        Some(FieldValue::Text(value.to_owned()))
    }
}

fn serde_number(value: f64) -> Option<FieldValue> {
    serde_json::Number::from_f64(value).map(FieldValue::Number)
}
