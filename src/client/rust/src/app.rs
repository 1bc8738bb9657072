/* src/client/rust/src/app.rs */

use std::sync::Arc;
use std::time::Duration;

use tandem_core::tandem_engine::{HeadTags, Node, diff_markup, extract_root_markup, parse_markup};
use tandem_core::{FetcherDef, PageData, Params, Result, Site, TandemError, ViewStatus};

use crate::bootstrap::EmbeddedPayload;

#[derive(Debug, Clone)]
pub struct ClientOptions {
  /// Upper bound for a client-side fetch. Expiry puts the view in `Error`.
  pub fetch_timeout: Duration,
}

impl Default for ClientOptions {
  fn default() -> Self {
    Self { fetch_timeout: Duration::from_secs(10) }
  }
}

/// A fetch the application decided it needs. The caller drives it with
/// [`run`](Self::run) on whatever executor it has and hands the outcome
/// back to [`ClientApp::settle`].
#[derive(Debug)]
pub struct PendingFetch {
  ticket: u64,
  fetcher: Arc<FetcherDef>,
  params: Params,
  timeout: Duration,
}

impl PendingFetch {
  pub fn ticket(&self) -> u64 {
    self.ticket
  }

  pub fn fetcher_name(&self) -> &str {
    &self.fetcher.name
  }

  pub fn params(&self) -> &Params {
    &self.params
  }

  pub async fn run(self) -> FetchOutcome {
    let result = self.fetcher.fetch(self.params.clone(), Some(self.timeout)).await;
    FetchOutcome { ticket: self.ticket, params: self.params, result }
  }
}

#[derive(Debug)]
pub struct FetchOutcome {
  pub ticket: u64,
  pub params: Params,
  pub result: Result<PageData>,
}

/// What [`ClientApp::settle`] did with an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
  Applied,
  Failed(TandemError),
  /// The outcome belonged to a navigation that has since been superseded.
  Discarded,
}

/// Client-side application state: the current location, the local data bag
/// and the status of the routed view.
///
/// The embedded payload seeds the bag once, at hydration. After that only
/// the local bag is consulted, and the fetcher a route declares runs when
/// the bag does not hold its record for the new parameters.
#[derive(Debug)]
pub struct ClientApp {
  site: Arc<Site>,
  location: String,
  data: PageData,
  status: ViewStatus,
  ticket: u64,
  in_flight: Option<u64>,
  options: ClientOptions,
}

impl ClientApp {
  pub fn hydrate(
    site: Arc<Site>,
    payload: &mut EmbeddedPayload,
    location: impl Into<String>,
    options: ClientOptions,
  ) -> Result<(Self, Option<PendingFetch>)> {
    let data = payload.take()?;
    let mut app = Self {
      site,
      location: location.into(),
      data,
      status: ViewStatus::Loading,
      ticket: 0,
      in_flight: None,
      options,
    };
    let pending = app.resolve()?;
    tracing::debug!(
      location = %app.location,
      reused = pending.is_none(),
      "hydrated from embedded payload"
    );
    Ok((app, pending))
  }

  /// Move to `location`. Returns the fetch to run when the local bag cannot
  /// satisfy the new route, in which case the view shows its loading state.
  pub fn navigate(&mut self, location: impl Into<String>) -> Result<Option<PendingFetch>> {
    self.location = location.into();
    self.resolve()
  }

  /// Navigate, then run and settle the fetch if one was needed.
  pub async fn visit(&mut self, location: impl Into<String>) -> Result<Option<Settled>> {
    match self.navigate(location)? {
      Some(pending) => Ok(Some(self.settle(pending.run().await))),
      None => Ok(None),
    }
  }

  fn resolve(&mut self) -> Result<Option<PendingFetch>> {
    // Any earlier fetch is superseded, even when the new location is unknown.
    self.ticket += 1;
    self.in_flight = None;
    let site = Arc::clone(&self.site);
    let matched = match site.match_path(&self.location) {
      Ok(matched) => matched,
      Err(err) => {
        self.status = ViewStatus::Error(err.to_string());
        return Err(err);
      }
    };
    self.status = site.status_for(&matched, &self.data);
    if self.status.is_terminal() {
      return Ok(None);
    }
    let Some(fetcher) = site.fetcher_for(matched.route) else {
      self.status = ViewStatus::Ready;
      return Ok(None);
    };
    self.in_flight = Some(self.ticket);
    tracing::debug!(
      location = %self.location,
      fetcher = %fetcher.name,
      ticket = self.ticket,
      "fetching route data"
    );
    Ok(Some(PendingFetch {
      ticket: self.ticket,
      fetcher: Arc::clone(fetcher),
      params: matched.params,
      timeout: self.options.fetch_timeout,
    }))
  }

  /// Apply a fetch outcome. Outcomes from superseded navigations are
  /// dropped without touching the bag or the status.
  pub fn settle(&mut self, outcome: FetchOutcome) -> Settled {
    if self.in_flight != Some(outcome.ticket) {
      tracing::warn!(
        ticket = outcome.ticket,
        current = self.ticket,
        "discarding stale fetch result"
      );
      return Settled::Discarded;
    }
    self.in_flight = None;

    match outcome.result {
      Ok(fetched) => {
        self.data.merge(fetched);
        let site = Arc::clone(&self.site);
        match site.match_path(&self.location) {
          Ok(matched) if site.status_for(&matched, &self.data) == ViewStatus::Ready => {
            self.status = ViewStatus::Ready;
            Settled::Applied
          }
          Ok(matched) => {
            let name = site.fetcher_for(matched.route).map(|f| f.name.clone()).unwrap_or_default();
            let err = TandemError::fetch(name, "returned a record for different parameters");
            self.fail(err)
          }
          Err(err) => self.fail(err),
        }
      }
      Err(err) => self.fail(err),
    }
  }

  fn fail(&mut self, err: TandemError) -> Settled {
    tracing::warn!(location = %self.location, error = %err, "client fetch failed");
    self.status = ViewStatus::Error(err.to_string());
    Settled::Failed(err)
  }

  /// Render the current location against the local bag. A view that fails
  /// is replaced by the failure fallback inside the shell.
  pub fn render(&self) -> Result<(Node, HeadTags)> {
    let matched = self.site.match_path(&self.location)?;
    match self.site.render(&self.location, &matched, &self.data, &self.status) {
      Ok(rendered) => Ok(rendered),
      Err(err @ TandemError::Render { .. }) => {
        tracing::warn!(location = %self.location, error = %err, "view failed, using fallback");
        let fallback = ViewStatus::Error(err.to_string());
        self.site.render(&self.location, &matched, &self.data, &fallback)
      }
      Err(err) => Err(err),
    }
  }

  pub fn render_markup(&self) -> Result<String> {
    Ok(self.render()?.0.to_html())
  }

  /// Compare the server's root markup with this app's first render.
  pub fn verify_hydration(&self, server_markup: &str) -> Result<()> {
    let (node, _) = self.render()?;
    let report = diff_markup(&parse_markup(server_markup), &[node]);
    match report.diffs.first() {
      None => Ok(()),
      Some(first) => Err(TandemError::HydrationMismatch {
        location: self.location.clone(),
        total: report.total_count,
        first: first.to_string(),
      }),
    }
  }

  pub fn location(&self) -> &str {
    &self.location
  }

  pub fn status(&self) -> &ViewStatus {
    &self.status
  }

  pub fn data(&self) -> &PageData {
    &self.data
  }

  /// Whether a fetch is outstanding for the current location.
  pub fn is_fetching(&self) -> bool {
    self.in_flight.is_some()
  }
}

/// Hydrate from a full server document and check the first render against
/// the server markup. A mismatch is logged, not fatal.
pub fn hydrate_document(
  site: Arc<Site>,
  document: &str,
  location: impl Into<String>,
  options: ClientOptions,
) -> Result<(ClientApp, Option<PendingFetch>)> {
  let mut payload = EmbeddedPayload::from_document(document)?;
  let (app, pending) = ClientApp::hydrate(site, &mut payload, location, options)?;
  if let Some(markup) = extract_root_markup(document)
    && let Err(err) = app.verify_hydration(markup)
  {
    tracing::warn!(error = %err, "server markup differs from first client render");
  }
  Ok((app, pending))
}
