//! Session: one caller's view of the shared ledger.
//!
//! A session acquires an identity, makes sure the ledger exists, forwards
//! claims as appends and keeps a local copy of the records for searching.
//! The local copy belongs to this session alone; every refresh replaces it
//! wholesale.

use std::future::Future;

use pindown_core::{filter, Identity, Record, ValidationError};
use pindown_store::{Backend, InitOutcome, LedgerError, LedgerStore};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::identity::{IdentityError, IdentityProvider};

/// A claim as typed in by the caller, before it becomes a [`Record`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordInput {
    pub document_link: String,
    pub receiver: String,
}

impl RecordInput {
    pub fn new(document_link: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            document_link: document_link.into(),
            receiver: receiver.into(),
        }
    }

    /// Both fields must be non-empty. The link is checked first.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.document_link.is_empty() {
            return Err(ValidationError::EmptyDocumentLink);
        }
        if self.receiver.is_empty() {
            return Err(ValidationError::MissingReceiver);
        }
        Ok(())
    }
}

/// The session's cached copy of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalView {
    /// Never loaded, or cleared after a failed read.
    Unloaded,
    /// The ledger does not exist yet. Distinct from an empty ledger.
    Uninitialized,
    /// Records as of the last refresh.
    Loaded(Vec<Record>),
}

impl LocalView {
    /// Records, if loaded.
    pub fn records(&self) -> Option<&[Record]> {
        match self {
            LocalView::Loaded(records) => Some(records),
            _ => None,
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self, LocalView::Uninitialized)
    }
}

/// A session over the ledger at one address.
pub struct Session<B: Backend, P: IdentityProvider> {
    ledger: LedgerStore<B>,
    provider: P,
    config: SessionConfig,
    identity: Option<Identity>,
    view: LocalView,
    /// Set by appends that skipped the refresh.
    stale: bool,
    search_results: Vec<Record>,
    pending: RecordInput,
}

impl<B: Backend, P: IdentityProvider> Session<B, P> {
    /// Create a session. Nothing is read until `start`, `connect` or `refresh`.
    pub fn new(ledger: LedgerStore<B>, provider: P, config: SessionConfig) -> Self {
        Self {
            ledger,
            provider,
            config,
            identity: None,
            view: LocalView::Unloaded,
            stale: false,
            search_results: Vec::new(),
            pending: RecordInput::default(),
        }
    }

    /// The connected identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The local view as of the last refresh.
    pub fn view(&self) -> &LocalView {
        &self.view
    }

    /// True after an append that skipped its refresh.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Results of the last search.
    pub fn search_results(&self) -> &[Record] {
        &self.search_results
    }

    /// The ledger handle.
    pub fn ledger(&self) -> &LedgerStore<B> {
        &self.ledger
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identity
    // ─────────────────────────────────────────────────────────────────────────

    /// Cold start: reconnect silently and, if that works, load the ledger.
    pub async fn start(&mut self) -> Result<Option<Identity>> {
        let Some(identity) = self.provider.try_silent_connect().await else {
            tracing::debug!("no trusted identity on cold start");
            return Ok(None);
        };

        tracing::info!(identity = %identity, "reconnected");
        self.identity = Some(identity.clone());
        self.refresh().await?;
        Ok(Some(identity))
    }

    /// Connect with consent, then load the ledger.
    pub async fn connect(&mut self) -> Result<Identity> {
        let identity = self.provider.connect().await.map_err(|e| {
            tracing::warn!(error = %e, "identity unavailable");
            e
        })?;

        tracing::info!(identity = %identity, "connected");
        self.identity = Some(identity.clone());
        self.refresh().await?;
        Ok(identity)
    }

    fn require_identity(&self) -> Result<Identity> {
        self.identity
            .clone()
            .ok_or(SessionError::NoIdentity(IdentityError::NotConnected))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ledger
    // ─────────────────────────────────────────────────────────────────────────

    /// One-time initialization, then refresh.
    ///
    /// Losing an initialization race is reported as
    /// `InitOutcome::AlreadyInitialized`, not as an error.
    pub async fn initialize(&mut self) -> Result<InitOutcome> {
        self.require_identity()?;

        let Some(outcome) = self.timed(self.ledger.ensure_initialized()).await else {
            // The ledger may exist now; look before reporting.
            tracing::warn!(address = %self.ledger.address(), "initialize timed out, reconciling");
            if let Err(e) = self.refresh().await {
                tracing::warn!(error = %e, "reconciliation read failed");
            }
            return Err(SessionError::Timeout("initialize"));
        };
        let outcome = outcome?;

        self.refresh().await?;
        Ok(outcome)
    }

    /// Re-read the ledger and replace the local view.
    ///
    /// A missing ledger is not an error: the view becomes `Uninitialized`.
    /// Any other failure clears the view and is returned as is.
    pub async fn refresh(&mut self) -> Result<&LocalView> {
        self.search_results.clear();

        let result = match self.timed(self.ledger.read_all()).await {
            Some(result) => result,
            None => {
                tracing::warn!(address = %self.ledger.address(), "refresh timed out");
                self.view = LocalView::Unloaded;
                return Err(SessionError::Timeout("refresh"));
            }
        };

        match result {
            Ok(records) => {
                self.view = LocalView::Loaded(records);
                self.stale = false;
            }
            Err(LedgerError::NotInitialized) => {
                self.view = LocalView::Uninitialized;
                self.stale = false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "refresh failed, clearing view");
                self.view = LocalView::Unloaded;
                return Err(e.into());
            }
        }

        Ok(&self.view)
    }

    /// Submit a claim issued by the connected identity.
    ///
    /// Empty fields are rejected before the ledger is touched. Otherwise the
    /// record is appended and, unless disabled in the config, the view is
    /// refreshed. Returns the record's position in the ledger.
    ///
    /// If the append lands but the refresh after it fails, the error is
    /// `AppendedRefreshFailed` carrying the position, and the view is stale.
    pub async fn submit(&mut self, input: RecordInput) -> Result<u64> {
        let refresh = self.config.refresh_after_submit;
        self.submit_inner(input, refresh).await
    }

    /// Submit without the follow-up refresh, for bulk appends.
    ///
    /// The view is marked stale until the next `refresh`.
    pub async fn submit_without_refresh(&mut self, input: RecordInput) -> Result<u64> {
        self.submit_inner(input, false).await
    }

    /// Pending input, as typed so far.
    pub fn pending(&self) -> &RecordInput {
        &self.pending
    }

    pub fn set_document_link(&mut self, link: impl Into<String>) {
        self.pending.document_link = link.into();
    }

    pub fn set_receiver(&mut self, receiver: impl Into<String>) {
        self.pending.receiver = receiver.into();
    }

    /// Submit the pending input.
    ///
    /// On a validation failure the pending fields are kept for correction.
    /// Once validation passes they are consumed, whether or not the append
    /// then succeeds.
    pub async fn submit_pending(&mut self) -> Result<u64> {
        self.pending.validate()?;
        let input = std::mem::take(&mut self.pending);
        self.submit(input).await
    }

    async fn submit_inner(&mut self, input: RecordInput, refresh: bool) -> Result<u64> {
        input.validate()?;
        let issuer = self.require_identity()?;
        let record = Record::new(issuer, input.receiver, input.document_link)?;

        let appended = match self.timed(self.ledger.append(&record)).await {
            Some(result) => result,
            None => return Err(self.reconcile_unknown_append(&record).await),
        };

        let position = match appended {
            Ok(position) => position,
            Err(LedgerError::NotInitialized) => {
                self.view = LocalView::Uninitialized;
                self.search_results.clear();
                return Err(LedgerError::NotInitialized.into());
            }
            Err(e) => {
                tracing::warn!(error = %e, "append failed");
                return Err(e.into());
            }
        };

        if !refresh {
            self.stale = true;
            return Ok(position);
        }

        if let Err(e) = self.refresh().await.map(|_| ()) {
            tracing::warn!(position, error = %e, "record appended but refresh failed");
            self.stale = true;
            return Err(SessionError::AppendedRefreshFailed {
                position,
                source: Box::new(e),
            });
        }
        Ok(position)
    }

    /// After an append timed out: re-read instead of retrying, and report
    /// whether the record already shows up.
    async fn reconcile_unknown_append(&mut self, record: &Record) -> SessionError {
        tracing::warn!(
            record = %record.compute_id(),
            "append timed out, reconciling instead of retrying"
        );

        let possible_duplicate = match self.refresh().await {
            Ok(view) => view
                .records()
                .is_some_and(|records| records.iter().any(|r| r == record)),
            Err(e) => {
                tracing::warn!(error = %e, "reconciliation read failed");
                false
            }
        };

        if possible_duplicate {
            tracing::warn!(
                record = %record.compute_id(),
                "timed-out append already visible; retrying would duplicate it"
            );
        }
        SessionError::OutcomeUnknown { possible_duplicate }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    /// Search the local view by document-link substring.
    ///
    /// An empty needle, or a view that is not loaded, yields no results.
    pub fn search(&mut self, needle: &str) -> &[Record] {
        self.search_results = match self.view.records() {
            Some(records) if !needle.is_empty() => filter(records, needle),
            _ => Vec::new(),
        };
        &self.search_results
    }

    /// Run `fut` under the configured timeout. `None` means it elapsed.
    async fn timed<F: Future>(&self, fut: F) -> Option<F::Output> {
        match self.config.operation_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
            None => Some(fut.await),
        }
    }
}
