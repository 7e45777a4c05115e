// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use cinelist_app::{
    CatalogCommand, CatalogError, CatalogEvent, CatalogSource, CatalogState, MovieDetail, MovieId,
    TitleSummary,
};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug)]
enum Completion {
    Titles(Result<Vec<TitleSummary>, CatalogError>),
    Detail {
        token: u64,
        result: Result<MovieDetail, CatalogError>,
    },
}

impl Completion {
    fn into_command(self) -> CatalogCommand {
        match self {
            Self::Titles(result) => CatalogCommand::TitlesLoaded(result),
            Self::Detail { token, result } => CatalogCommand::DetailLoaded { token, result },
        }
    }
}

/// Drives a `CatalogState` against a `CatalogSource`. Fetches run on worker
/// threads; their results come back through a channel and are only applied
/// on the thread that owns the session, via `pump` or `wait`.
pub struct Session<S> {
    source: Arc<S>,
    state: CatalogState,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    subscribers: Vec<Sender<CatalogEvent>>,
    in_flight: usize,
}

impl<S: CatalogSource + 'static> Session<S> {
    pub fn new(source: S) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    pub fn with_shared_source(source: Arc<S>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            state: CatalogState::default(),
            tx,
            rx,
            subscribers: Vec::new(),
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Every event emitted from now on is delivered to the returned receiver.
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<CatalogEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn initialize(&mut self) -> Vec<CatalogEvent> {
        self.dispatch(CatalogCommand::Initialize)
    }

    pub fn retry(&mut self) -> Vec<CatalogEvent> {
        self.dispatch(CatalogCommand::Retry)
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> Vec<CatalogEvent> {
        self.dispatch(CatalogCommand::SetQuery(query.into()))
    }

    pub fn select_item(&mut self, id: MovieId) -> Vec<CatalogEvent> {
        self.dispatch(CatalogCommand::SelectItem(id))
    }

    pub fn go_back(&mut self) -> Vec<CatalogEvent> {
        self.dispatch(CatalogCommand::GoBack)
    }

    /// Applies every completion that has already arrived.
    pub fn pump(&mut self) -> Vec<CatalogEvent> {
        let mut events = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            events.extend(self.complete(completion));
        }
        events
    }

    /// Blocks until one completion arrives (or `timeout` passes), then
    /// applies it along with anything else already queued.
    pub fn wait(&mut self, timeout: Duration) -> Vec<CatalogEvent> {
        if self.in_flight == 0 {
            return self.pump();
        }

        let mut events = match self.rx.recv_timeout(timeout) {
            Ok(completion) => self.complete(completion),
            Err(RecvTimeoutError::Timeout) => {
                debug!(?timeout, in_flight = self.in_flight, "no catalog response yet");
                Vec::new()
            }
            Err(RecvTimeoutError::Disconnected) => Vec::new(),
        };
        events.extend(self.pump());
        events
    }

    fn complete(&mut self, completion: Completion) -> Vec<CatalogEvent> {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.dispatch(completion.into_command())
    }

    fn dispatch(&mut self, command: CatalogCommand) -> Vec<CatalogEvent> {
        let events = self.state.dispatch(command);
        for event in &events {
            match event {
                CatalogEvent::TitlesRequested => self.spawn_titles(),
                CatalogEvent::DetailRequested { token, id } => {
                    self.spawn_detail(*token, id.clone());
                }
                _ => {}
            }
        }
        self.publish(&events);
        events
    }

    fn spawn_titles(&mut self) {
        let source = Arc::clone(&self.source);
        self.spawn_worker(
            "cinelist-titles",
            move || Completion::Titles(source.list_titles()),
            |error| Completion::Titles(Err(error)),
        );
    }

    fn spawn_detail(&mut self, token: u64, id: MovieId) {
        debug!(token, %id, "fetching movie detail");
        let source = Arc::clone(&self.source);
        self.spawn_worker(
            "cinelist-detail",
            move || Completion::Detail {
                token,
                result: source.get_detail(&id),
            },
            move |error| Completion::Detail {
                token,
                result: Err(error),
            },
        );
    }

    fn spawn_worker<W, F>(&mut self, name: &str, work: W, on_spawn_error: F)
    where
        W: FnOnce() -> Completion + Send + 'static,
        F: FnOnce(CatalogError) -> Completion,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                let _ = tx.send(work());
            });
        if let Err(error) = spawned {
            warn!(%error, worker = name, "could not start catalog worker");
            let failure = CatalogError::Transport(format!("start {name} worker: {error}"));
            let _ = self.tx.send(on_spawn_error(failure));
        }
    }

    fn publish(&mut self, events: &[CatalogEvent]) {
        if events.is_empty() {
            return;
        }
        self.subscribers.retain(|subscriber| {
            events
                .iter()
                .all(|event| subscriber.send(event.clone()).is_ok())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use cinelist_app::{
        CatalogError, CatalogEvent, CatalogView, DetailState, MovieDetail, MovieId, TitleSummary,
        TitlesState,
    };
    use cinelist_testkit::{FakeCall, FakeCatalog};
    use std::sync::Arc;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn catalog() -> Vec<TitleSummary> {
        vec![
            TitleSummary::new(1, "Up"),
            TitleSummary::new(2, "Upstream"),
            TitleSummary::new(3, "Down"),
        ]
    }

    fn loaded_session() -> Session<FakeCatalog> {
        let mut session = Session::new(FakeCatalog::with_bare_details(catalog()));
        session.initialize();
        session.wait(WAIT);
        session
    }

    #[test]
    fn initialize_fetches_and_seeds_titles() {
        let session = loaded_session();
        assert_eq!(session.state().displayed(), catalog().as_slice());
        assert_eq!(session.state().titles(), &TitlesState::Loaded);
        assert_eq!(session.in_flight(), 0);
        assert_eq!(session.source().calls(), vec![FakeCall::ListTitles]);
    }

    #[test]
    fn subscribers_see_every_event_in_order() {
        let mut session = Session::new(FakeCatalog::with_bare_details(catalog()));
        let events = session.subscribe();

        session.initialize();
        session.wait(WAIT);
        session.set_query("up");

        let seen = events.try_iter().collect::<Vec<_>>();
        assert_eq!(
            seen,
            vec![
                CatalogEvent::TitlesRequested,
                CatalogEvent::TitlesLoaded { total: 3 },
                CatalogEvent::DisplayedChanged(3),
                CatalogEvent::QueryChanged("up".to_owned()),
                CatalogEvent::DisplayedChanged(2),
            ]
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut session = loaded_session();
        let kept = session.subscribe();
        drop(session.subscribe());

        session.set_query("down");
        session.set_query("");
        assert_eq!(session.subscribers.len(), 1);
        assert_eq!(kept.try_iter().count(), 4);
    }

    #[test]
    fn filtering_never_touches_the_source() {
        let mut session = loaded_session();
        session.set_query("u");
        session.set_query("up");
        session.set_query("");
        assert_eq!(session.source().calls(), vec![FakeCall::ListTitles]);
        assert_eq!(session.in_flight(), 0);
    }

    #[test]
    fn loading_stays_visible_until_titles_arrive() {
        let source = Arc::new(FakeCatalog::with_bare_details(catalog()));
        let gate = source.gate_titles();
        let mut session = Session::with_shared_source(Arc::clone(&source));

        session.initialize();
        assert!(session.pump().is_empty());
        assert_eq!(session.state().view(), CatalogView::Loading);

        gate.release();
        session.wait(WAIT);
        assert_eq!(session.state().view(), CatalogView::Browsing(&catalog()));
    }

    #[test]
    fn empty_catalog_is_distinguishable_from_loading() {
        let mut session = Session::new(FakeCatalog::new(Vec::new()));
        session.initialize();
        session.wait(WAIT);

        assert!(!session.state().is_loading());
        assert!(session.state().displayed().is_empty());
        assert_eq!(session.state().view(), CatalogView::NoMatches);
    }

    #[test]
    fn failed_titles_can_be_retried() {
        let error = CatalogError::Transport("connection refused".to_owned());
        let mut session =
            Session::new(FakeCatalog::new(catalog()).with_titles_error(error.clone()));
        session.initialize();
        session.wait(WAIT);
        assert_eq!(session.state().titles(), &TitlesState::Failed(error.clone()));

        assert_eq!(session.retry(), vec![CatalogEvent::TitlesRequested]);
        session.wait(WAIT);
        assert_eq!(session.state().titles(), &TitlesState::Failed(error));
        assert_eq!(
            session.source().calls(),
            vec![FakeCall::ListTitles, FakeCall::ListTitles]
        );
    }

    #[test]
    fn select_fetches_detail_and_go_back_restores_filter() {
        let mut session = loaded_session();
        session.set_query("UP");
        let before = session.state().displayed().to_vec();

        session.select_item(MovieId::from(2));
        assert!(session.state().input_locked());
        assert_eq!(session.state().locked_title(), Some("Upstream"));
        session.wait(WAIT);
        assert_eq!(
            session.state().selected_detail(),
            Some(&MovieDetail::new(2, "Upstream"))
        );

        session.go_back();
        assert!(!session.state().input_locked());
        assert_eq!(session.state().query(), "UP");
        assert_eq!(session.state().displayed(), before.as_slice());
    }

    #[test]
    fn rapid_selection_keeps_latest_when_it_resolves_first() {
        let source = Arc::new(FakeCatalog::with_bare_details(catalog()));
        let first_gate = source.gate_detail(1);
        let second_gate = source.gate_detail(2);
        let mut session = Session::with_shared_source(Arc::clone(&source));
        session.initialize();
        session.wait(WAIT);

        session.select_item(MovieId::from(1));
        session.select_item(MovieId::from(2));

        second_gate.release();
        let resolved = session.wait(WAIT);
        assert!(matches!(
            resolved.as_slice(),
            [CatalogEvent::DetailReady { id, .. }] if *id == MovieId::from(2)
        ));

        first_gate.release();
        let late = session.wait(WAIT);
        assert!(matches!(
            late.as_slice(),
            [CatalogEvent::StaleDetailDiscarded { .. }]
        ));

        let detail = session.state().selected_detail().expect("detail shown");
        assert_eq!(detail.id, MovieId::from(2));
        assert_eq!(session.state().locked_title(), Some("Upstream"));
        assert_eq!(session.in_flight(), 0);
    }

    #[test]
    fn rapid_selection_keeps_latest_when_it_resolves_last() {
        let source = Arc::new(FakeCatalog::with_bare_details(catalog()));
        let first_gate = source.gate_detail(1);
        let second_gate = source.gate_detail(2);
        let mut session = Session::with_shared_source(Arc::clone(&source));
        session.initialize();
        session.wait(WAIT);

        session.select_item(MovieId::from(1));
        session.select_item(MovieId::from(2));

        first_gate.release();
        session.wait(WAIT);
        assert_eq!(session.state().selected_detail(), None);

        second_gate.release();
        session.wait(WAIT);
        let detail = session.state().selected_detail().expect("detail shown");
        assert_eq!(detail.id, MovieId::from(2));
    }

    #[test]
    fn detail_failure_is_recorded_on_the_selection() {
        let source = FakeCatalog::new(catalog()).with_detail_error(
            3,
            CatalogError::Transport("server returned 500".to_owned()),
        );
        let mut session = Session::new(source);
        session.initialize();
        session.wait(WAIT);

        session.select_item(MovieId::from(3));
        session.wait(WAIT);

        let selection = session.state().selection().expect("selection kept");
        assert_eq!(
            selection.detail,
            DetailState::Failed(CatalogError::Transport("server returned 500".to_owned()))
        );
        session.go_back();
        assert!(!session.state().input_locked());
    }

    #[test]
    fn wait_without_requests_returns_immediately() {
        let mut session = loaded_session();
        assert!(session.wait(Duration::from_secs(60)).is_empty());
    }
}
