//! Interactive session driving both panes.
//!
//! One loop owns the views. Stdin commands, backend completions and view
//! notifications all arrive through `tokio::select!` and are handled in turn.

use super::{Command, Context};
use crate::backend::{Backend, BackendEvent};
use crate::error::Result;
use crate::render;
use search_core::{
    Activation, DebouncedDispatcher, DispatchOutcome, FacetsView, PageApplied, Pane,
    ResultsView, SearchRequest, ViewEvent,
};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const HELP: &str = "\
commands:
  search <query>     list the facets a query hits
  facet <n>          show the results of facet n
  more               load the next page of results
  open <n>           show result n with its matched lines
  next | prev        move the selection
  filter +EXT|-EXT   show only / stop showing an extension
  find <pattern>     find files by name (`Name in facet` narrows)
  find-all <pattern> same, any extension
  cancel             stop a running find
  history            recent searches, newest first
  rerun <n>          repeat search n from history
  clear-history
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Search(String),
    Facet(usize),
    More,
    Open(usize),
    Next,
    Prev,
    Filter { add: bool, extension: String },
    Find { pattern: String, everywhere: bool },
    Cancel,
    History,
    Rerun(usize),
    ClearHistory,
    Help,
    Quit,
}

fn index_arg(command: &str, rest: &str) -> std::result::Result<usize, String> {
    rest.parse()
        .map_err(|_| format!("usage: {command} <number>"))
}

fn text_arg(command: &str, rest: &str) -> std::result::Result<String, String> {
    if rest.is_empty() {
        return Err(format!("usage: {command} <text>"));
    }
    Ok(rest.to_string())
}

/// Parse one input line. Blank lines yield `Ok(None)`.
fn parse_line(line: &str) -> std::result::Result<Option<Action>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let action = match command {
        "search" | "s" => Action::Search(text_arg(command, rest)?),
        "facet" | "f" => Action::Facet(index_arg(command, rest)?),
        "more" | "m" => Action::More,
        "open" | "o" => Action::Open(index_arg(command, rest)?),
        "next" | "n" => Action::Next,
        "prev" | "p" => Action::Prev,
        "filter" => {
            let (add, extension) = match rest.split_at_checked(1) {
                Some(("+", ext)) => (true, ext),
                Some(("-", ext)) => (false, ext),
                _ => return Err("usage: filter +EXT|-EXT".to_string()),
            };
            Action::Filter {
                add,
                extension: text_arg(command, extension.trim())?,
            }
        }
        "find" => Action::Find {
            pattern: text_arg(command, rest)?,
            everywhere: false,
        },
        "find-all" => Action::Find {
            pattern: text_arg(command, rest)?,
            everywhere: true,
        },
        "cancel" => Action::Cancel,
        "history" => Action::History,
        "rerun" => Action::Rerun(index_arg(command, rest)?),
        "clear-history" => Action::ClearHistory,
        "help" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        other => return Err(format!("unknown command {other:?}, try `help`")),
    };
    Ok(Some(action))
}

struct Session {
    context: Context,
    backend: Backend,
    dispatcher: Arc<DebouncedDispatcher>,
    facets: FacetsView,
    results: ResultsView,
    /// Facets answers for anything else were overtaken by a newer search
    pending_facets: Option<SearchRequest>,
    find_cancel: Option<CancellationToken>,
}

impl Session {
    fn new(
        context: Context,
    ) -> (Self, UnboundedReceiver<BackendEvent>, UnboundedReceiver<ViewEvent>) {
        let (tx_backend, rx_backend) = mpsc::unbounded_channel();
        let (tx_view, rx_view) = mpsc::unbounded_channel();

        let backend = Backend::new(
            context.searcher.clone(),
            context.executor.handle().clone(),
            tx_backend,
        );
        let dispatcher = Arc::new(DebouncedDispatcher::new(
            context.searcher.clone(),
            context.executor.clone(),
            &context.config.search,
        ));
        let page_size = context.config.search.page_size();

        let session = Self {
            context,
            backend,
            dispatcher,
            facets: FacetsView::new(tx_view.clone()),
            results: ResultsView::new(page_size, tx_view),
            pending_facets: None,
            find_cancel: None,
        };
        (session, rx_backend, rx_view)
    }

    fn handle(&mut self, action: Action) -> ControlFlow<()> {
        match action {
            Action::Search(query) => {
                let mut request = self.context.new_request();
                request.set_query(query.as_str());
                self.start_search(request);
            }
            Action::Facet(index) => match self.facets.facet(index).cloned() {
                Some(facet) => {
                    if let Some(ticket) = self.results.select_facet(facet, self.context.new_request()) {
                        self.backend.request_page(ticket);
                    }
                }
                None => println!("no facet [{index}]"),
            },
            Action::More => match self.results.load_more() {
                Some(ticket) => self.backend.request_page(ticket),
                None => println!("nothing more to load"),
            },
            Action::Open(index) => {
                let node = self.results.visible_results().get(index).map(|(node, _)| *node);
                match node {
                    Some(node) => self.activate(node),
                    None => println!("no result [{index}]"),
                }
            }
            Action::Next => {
                if let Some(node) = self.results.select_next() {
                    self.activate(node);
                }
            }
            Action::Prev => {
                if let Some(node) = self.results.select_prev() {
                    self.activate(node);
                }
            }
            Action::Filter { add, extension } => {
                let changed = if add {
                    self.results.add_filter(&extension)
                } else {
                    self.results.remove_filter(&extension)
                };
                if !changed {
                    println!("filters unchanged");
                }
            }
            Action::Find {
                pattern,
                everywhere,
            } => self.start_find(pattern, everywhere),
            Action::Cancel => match self.find_cancel.take() {
                Some(token) => token.cancel(),
                None => println!("no find running"),
            },
            Action::History => {
                for (index, request) in self.context.history.most_recent_first().iter().enumerate() {
                    println!("  [{index}] {}", request.description());
                }
            }
            Action::Rerun(index) => match self.context.history.most_recent_first().into_iter().nth(index) {
                Some(request) => self.start_search(request),
                None => println!("no history entry [{index}]"),
            },
            Action::ClearHistory => self.context.history.clear(),
            Action::Help => println!("{HELP}"),
            Action::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn start_search(&mut self, request: SearchRequest) {
        println!("{}", render::title(request.query().unwrap_or_default()));
        self.results.clear();
        self.facets.mark_loading();
        self.pending_facets = Some(request.clone());
        self.backend.request_facets(request);
    }

    fn activate(&mut self, node: search_core::NodeId) {
        match self.results.activate(node) {
            Activation::LoadMore(ticket) => self.backend.request_page(ticket),
            Activation::Open(node) => {
                let result = self.results.result(node).cloned();
                let facet = self.results.facet().cloned();
                if let (Some(result), Some(facet)) = (result, facet) {
                    self.backend
                        .request_backfill(self.results.generation(), node, result, facet);
                }
            }
            Activation::Nothing => {}
        }
    }

    fn start_find(&mut self, pattern: String, everywhere: bool) {
        if let Some(previous) = self.find_cancel.take() {
            previous.cancel();
        }
        let cancel = CancellationToken::new();
        self.find_cancel = Some(cancel.clone());

        let dispatcher = self.dispatcher.clone();
        self.context.executor.spawn(async move {
            let outcome = dispatcher
                .filter_elements(&pattern, everywhere, &cancel, |result| {
                    println!("  {}", result.file_path());
                    true
                })
                .await;
            match outcome {
                DispatchOutcome::Delivered { count } => println!("find {pattern:?}: {count} file(s)"),
                DispatchOutcome::Cancelled => debug!(pattern = %pattern, "find cancelled"),
                DispatchOutcome::Failed(e) => eprintln!("find {pattern:?} failed: {e}"),
            }
        });
    }

    fn on_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Facets { request, outcome } => {
                if self.pending_facets.as_ref() != Some(&request) {
                    debug!(request = %request, "dropping overtaken facets");
                    return;
                }
                self.pending_facets = None;
                let succeeded = outcome.is_ok();
                self.facets.update(outcome, request.query().unwrap_or_default());
                if succeeded {
                    info!(request = %request, "search recorded");
                    self.context.history.add(request);
                }
            }
            BackendEvent::Page { ticket, outcome } => {
                if let PageApplied::Stale = self.results.apply_page(&ticket, outcome) {
                    debug!(generation = ticket.generation, "dropping stale page");
                }
            }
            BackendEvent::Backfilled {
                generation,
                node,
                result,
            } => {
                if generation != self.results.generation() {
                    debug!(generation, "dropping stale backfill");
                    return;
                }
                print!("{}", render::result_detail(&result));
                self.results.store_result(node, result);
            }
        }
    }

    fn on_view_event(&self, event: ViewEvent) {
        match event {
            ViewEvent::StructureChanged(Pane::Facets) => print!("{}", render::facets(&self.facets)),
            ViewEvent::StructureChanged(Pane::Results) => {
                print!("{}", render::results(&self.results))
            }
            ViewEvent::FetchFailed { pane, error } => {
                warn!(%pane, error = %error, "fetch failed");
                eprintln!("{pane}: {error}");
            }
        }
    }
}

pub struct ShellCommand {
    context: Context,
}

impl ShellCommand {
    pub fn new(context: Context) -> Self {
        Self { context }
    }
}

#[async_trait::async_trait]
impl Command for ShellCommand {
    async fn execute(&self) -> Result<()> {
        let (mut session, mut rx_backend, mut rx_view) = Session::new(self.context.clone());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{HELP}");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    match parse_line(&line) {
                        Ok(Some(action)) => {
                            if session.handle(action).is_break() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(message) => println!("{message}"),
                    }
                }
                Some(event) = rx_backend.recv() => session.on_backend_event(event),
                Some(event) = rx_view.recv() => session.on_view_event(event),
            }
        }

        if let Some(token) = session.find_cancel.take() {
            token.cancel();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rstest::rstest;
    use search_core::{DummySearcher, SearchExecutor, SearchHistory};
    use tokio::runtime::Handle;

    #[rstest]
    #[case("search HashMap put", Action::Search("HashMap put".into()))]
    #[case("f 2", Action::Facet(2))]
    #[case("filter +java", Action::Filter { add: true, extension: "java".into() })]
    #[case("filter -xml", Action::Filter { add: false, extension: "xml".into() })]
    #[case("find-all Pool in commons", Action::Find { pattern: "Pool in commons".into(), everywhere: true })]
    #[case("  quit  ", Action::Quit)]
    fn test_parse_line(#[case] line: &str, #[case] expected: Action) {
        assert_eq!(parse_line(line), Ok(Some(expected)));
    }

    #[rstest]
    #[case("facet x")]
    #[case("open")]
    #[case("search")]
    #[case("filter java")]
    #[case("frobnicate")]
    fn test_parse_line_rejects(#[case] line: &str) {
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    fn context() -> Context {
        Context {
            config: Config::default(),
            searcher: Arc::new(DummySearcher),
            executor: SearchExecutor::new(Handle::current()),
            history: Arc::new(SearchHistory::new()),
        }
    }

    #[tokio::test]
    async fn test_search_facet_and_open() {
        let (mut session, mut rx_backend, _rx_view) = Session::new(context());

        assert!(session.handle(Action::Search("pool".into())).is_continue());
        let event = rx_backend.recv().await.unwrap();
        session.on_backend_event(event);
        assert_eq!(session.facets.facets().count(), 1);
        assert_eq!(session.context.history.len(), 1);

        assert!(session.handle(Action::Facet(0)).is_continue());
        let event = rx_backend.recv().await.unwrap();
        session.on_backend_event(event);
        assert_eq!(session.results.visible_results().len(), 1);

        assert!(session.handle(Action::Open(0)).is_continue());
        let event = rx_backend.recv().await.unwrap();
        session.on_backend_event(event);
        let (node, _) = session.results.visible_results()[0];
        assert_eq!(session.results.selected(), Some(node));
        let opened = session.results.result(node).unwrap();
        assert_eq!(opened.highlights(), Some(&[][..]));
        assert_eq!(
            opened.content(),
            Some("dummy content")
        );
    }

    #[tokio::test]
    async fn test_overtaken_facets_are_dropped() {
        let (mut session, mut rx_backend, _rx_view) = Session::new(context());

        assert!(session.handle(Action::Search("first".into())).is_continue());
        assert!(session.handle(Action::Search("second".into())).is_continue());
        for _ in 0..2 {
            let event = rx_backend.recv().await.unwrap();
            session.on_backend_event(event);
        }

        let recorded = session.context.history.most_recent_first();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].query(), Some("second"));
    }

    #[tokio::test]
    async fn test_quit_breaks() {
        let (mut session, _rx_backend, _rx_view) = Session::new(context());
        assert!(session.handle(Action::Quit).is_break());
    }
}
