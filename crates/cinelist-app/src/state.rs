// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, warn};

use crate::filter::filter_titles;
use crate::ids::MovieId;
use crate::model::{MovieDetail, TitleSummary};
use crate::source::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitlesState {
    Loading,
    Loaded,
    Failed(CatalogError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Pending,
    Loaded(MovieDetail),
    Failed(CatalogError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub id: MovieId,
    /// Copied from the list at selection time so the header can render
    /// before the detail arrives.
    pub title: String,
    pub token: u64,
    pub detail: DetailState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    full: Vec<TitleSummary>,
    displayed: Vec<TitleSummary>,
    query: String,
    titles: TitlesState,
    titles_requested: bool,
    selection: Option<Selection>,
    last_token: u64,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            full: Vec::new(),
            displayed: Vec::new(),
            query: String::new(),
            titles: TitlesState::Loading,
            titles_requested: false,
            selection: None,
            last_token: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCommand {
    Initialize,
    Retry,
    TitlesLoaded(Result<Vec<TitleSummary>, CatalogError>),
    SetQuery(String),
    SelectItem(MovieId),
    DetailLoaded {
        token: u64,
        result: Result<MovieDetail, CatalogError>,
    },
    GoBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    TitlesRequested,
    TitlesLoaded { total: usize },
    TitlesFailed(CatalogError),
    QueryChanged(String),
    QueryRejected,
    DisplayedChanged(usize),
    InputLockChanged(bool),
    SelectionRejected(MovieId),
    DetailRequested { token: u64, id: MovieId },
    DetailReady { token: u64, id: MovieId },
    DetailFailed {
        token: u64,
        id: MovieId,
        error: CatalogError,
    },
    StaleDetailDiscarded { token: u64 },
    SelectionCleared,
}

/// What the presentation layer should show for the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CatalogView<'a> {
    Loading,
    LoadFailed(&'a CatalogError),
    NoMatches,
    Browsing(&'a [TitleSummary]),
    Detail(&'a Selection),
}

impl CatalogState {
    pub fn dispatch(&mut self, command: CatalogCommand) -> Vec<CatalogEvent> {
        match command {
            CatalogCommand::Initialize => {
                if self.titles_requested {
                    debug!("catalog already initialized");
                    return Vec::new();
                }
                self.request_titles()
            }
            CatalogCommand::Retry => {
                if !matches!(self.titles, TitlesState::Failed(_)) {
                    return Vec::new();
                }
                self.request_titles()
            }
            CatalogCommand::TitlesLoaded(result) => self.apply_titles(result),
            CatalogCommand::SetQuery(query) => self.set_query(query),
            CatalogCommand::SelectItem(id) => self.select_item(id),
            CatalogCommand::DetailLoaded { token, result } => self.apply_detail(token, result),
            CatalogCommand::GoBack => self.go_back(),
        }
    }

    pub fn initialize(&mut self) -> Vec<CatalogEvent> {
        self.dispatch(CatalogCommand::Initialize)
    }

    pub fn full(&self) -> &[TitleSummary] {
        &self.full
    }

    pub fn displayed(&self) -> &[TitleSummary] {
        &self.displayed
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn titles(&self) -> &TitlesState {
        &self.titles
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_detail(&self) -> Option<&MovieDetail> {
        match self.selection.as_ref().map(|selection| &selection.detail) {
            Some(DetailState::Loaded(detail)) => Some(detail),
            _ => None,
        }
    }

    pub fn locked_title(&self) -> Option<&str> {
        self.selection
            .as_ref()
            .map(|selection| selection.title.as_str())
    }

    pub fn is_loading(&self) -> bool {
        self.titles == TitlesState::Loading
    }

    pub fn input_locked(&self) -> bool {
        self.selection.is_some()
    }

    pub fn view(&self) -> CatalogView<'_> {
        if let Some(selection) = &self.selection {
            return CatalogView::Detail(selection);
        }
        match &self.titles {
            TitlesState::Loading => CatalogView::Loading,
            TitlesState::Failed(error) => CatalogView::LoadFailed(error),
            TitlesState::Loaded if self.displayed.is_empty() => CatalogView::NoMatches,
            TitlesState::Loaded => CatalogView::Browsing(&self.displayed),
        }
    }

    fn request_titles(&mut self) -> Vec<CatalogEvent> {
        self.titles_requested = true;
        self.titles = TitlesState::Loading;
        vec![CatalogEvent::TitlesRequested]
    }

    fn apply_titles(
        &mut self,
        result: Result<Vec<TitleSummary>, CatalogError>,
    ) -> Vec<CatalogEvent> {
        if self.titles != TitlesState::Loading {
            debug!("ignoring title list that arrived outside a load");
            return Vec::new();
        }

        match result {
            Ok(titles) => {
                self.full = titles;
                self.titles = TitlesState::Loaded;
                self.refilter();
                vec![
                    CatalogEvent::TitlesLoaded {
                        total: self.full.len(),
                    },
                    CatalogEvent::DisplayedChanged(self.displayed.len()),
                ]
            }
            Err(error) => {
                warn!(%error, "loading movie titles failed");
                self.titles = TitlesState::Failed(error.clone());
                vec![CatalogEvent::TitlesFailed(error)]
            }
        }
    }

    fn set_query(&mut self, query: String) -> Vec<CatalogEvent> {
        if self.input_locked() {
            return vec![CatalogEvent::QueryRejected];
        }

        self.query = query;
        self.refilter();
        vec![
            CatalogEvent::QueryChanged(self.query.clone()),
            CatalogEvent::DisplayedChanged(self.displayed.len()),
        ]
    }

    fn select_item(&mut self, id: MovieId) -> Vec<CatalogEvent> {
        let Some(item) = self.full.iter().find(|item| item.id == id) else {
            warn!(%id, "selected movie is not in the catalog");
            return vec![CatalogEvent::SelectionRejected(id)];
        };

        let title = item.title.clone();
        let was_locked = self.input_locked();
        let token = self.next_token();
        self.selection = Some(Selection {
            id: id.clone(),
            title,
            token,
            detail: DetailState::Pending,
        });

        let mut events = vec![CatalogEvent::DetailRequested { token, id }];
        if !was_locked {
            events.push(CatalogEvent::InputLockChanged(true));
        }
        events
    }

    fn apply_detail(
        &mut self,
        token: u64,
        result: Result<MovieDetail, CatalogError>,
    ) -> Vec<CatalogEvent> {
        let Some(selection) = self.selection.as_mut().filter(|current| current.token == token)
        else {
            debug!(token, "discarding stale movie detail");
            return vec![CatalogEvent::StaleDetailDiscarded { token }];
        };

        let id = selection.id.clone();
        match result {
            Ok(detail) => {
                selection.detail = DetailState::Loaded(detail);
                vec![CatalogEvent::DetailReady { token, id }]
            }
            Err(error) => {
                warn!(%id, %error, "loading movie detail failed");
                selection.detail = DetailState::Failed(error.clone());
                vec![CatalogEvent::DetailFailed { token, id, error }]
            }
        }
    }

    fn go_back(&mut self) -> Vec<CatalogEvent> {
        if self.selection.take().is_none() {
            return Vec::new();
        }

        self.refilter();
        vec![
            CatalogEvent::SelectionCleared,
            CatalogEvent::InputLockChanged(false),
            CatalogEvent::DisplayedChanged(self.displayed.len()),
        ]
    }

    fn next_token(&mut self) -> u64 {
        self.last_token = self.last_token.saturating_add(1);
        self.last_token
    }

    fn refilter(&mut self) {
        self.displayed = filter_titles(&self.full, &self.query);
    }
}
