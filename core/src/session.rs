//! The dashboard session. Owns all mutable state and runs the pipeline.
//!
//! PIPELINE (each stage is a pure function, run to completion):
//!   1. csv_parser::parse        raw text      -> rows
//!   2. extractor::extract       rows          -> sales records
//!   3. matcher::match_records   records       -> matched / skipped
//!   4. aggregation::aggregate   matched       -> averages + ranking
//!   5. report                   result        -> cards / rows / CSV
//!
//! RULES:
//!   - A failed operation leaves every piece of prior state untouched.
//!   - Storage write failures are reported but never abort the operation.
//!   - Any roster change re-runs matching against the loaded sales data.
//!   - Only the most recently issued upload may apply its content.

use crate::{
    aggregation::{aggregate, AggregateResult, FilterSelection},
    command::DashboardCommand,
    config::DashboardConfig,
    csv_parser,
    error::{DashResult, DashboardError},
    event::DashboardEvent,
    extractor::{extract, SalesRecord},
    matcher::{match_records, MatchOutcome, MatchedAgentRecord},
    report::{breakdown_rows, export_results_csv, summary_cards},
    roster::{parse_roster_import, Agent, Roster},
    snapshot::DashboardSnapshot,
    store::{RosterOrigin, RosterStore},
    types::{normalize_id, AgentId},
    upload::{read_upload, UploadGate, UploadTicket},
};
use chrono::{DateTime, Local};
use std::path::Path;

pub struct Dashboard {
    config:        DashboardConfig,
    store:         RosterStore,
    roster:        Roster,
    roster_origin: RosterOrigin,
    sales:         Vec<SalesRecord>,
    outcome:       MatchOutcome,
    last_result:   Option<AggregateResult>,
    uploads:       UploadGate,
    events:        Vec<DashboardEvent>,
}

impl Dashboard {
    /// Load the roster and start an empty session. Never fails: storage
    /// problems surface as an error event and the default roster is used.
    pub fn open(config: DashboardConfig, store: RosterStore) -> Self {
        let load = store.load_roster(&config.storage_key);
        let mut events = Vec::new();
        if let Some(issue) = &load.issue {
            events.push(DashboardEvent::error(issue));
        }
        events.push(DashboardEvent::roster_loaded(load.roster.len(), load.origin));
        log::info!("Roster ready: {} agents ({:?})", load.roster.len(), load.origin);

        Self {
            config,
            store,
            roster: load.roster,
            roster_origin: load.origin,
            sales: Vec::new(),
            outcome: MatchOutcome::default(),
            last_result: None,
            uploads: UploadGate::new(),
            events,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn sales(&self) -> &[SalesRecord] {
        &self.sales
    }

    pub fn matched(&self) -> &[MatchedAgentRecord] {
        &self.outcome.matched
    }

    pub fn skipped(&self) -> &[AgentId] {
        &self.outcome.skipped
    }

    pub fn last_result(&self) -> Option<&AggregateResult> {
        self.last_result.as_ref()
    }

    /// Drain pending notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<DashboardEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Roster ────────────────────────────────────────────────────

    /// Install a new roster: persist it, then re-match loaded sales.
    fn commit_roster(&mut self, roster: Roster) {
        self.roster = roster;
        if let Err(e) = self.store.save_roster(&self.config.storage_key, &self.roster) {
            log::warn!("Error saving roster: {e}");
            self.events.push(DashboardEvent::error(&e));
        }
        if !self.sales.is_empty() {
            self.outcome = match_records(&self.sales, &self.roster);
        }
    }

    pub fn add_agent(&mut self, initials: &str, branch: &str, position: &str) -> DashResult<()> {
        let agent = Agent::parse(initials, branch, position)?;
        let id = agent.id.clone();
        let roster = self.roster.add(agent)?;
        self.commit_roster(roster);
        log::info!("Added agent {id}");
        self.events.push(DashboardEvent::AgentAdded { id });
        Ok(())
    }

    /// Returns false (and changes nothing) if the id is not on the roster.
    pub fn remove_agent(&mut self, initials: &str) -> bool {
        if !self.roster.contains(initials) {
            return false;
        }
        let roster = self.roster.remove(initials);
        let id = normalize_id(initials);
        self.commit_roster(roster);
        log::info!("Removed agent {id}");
        self.events.push(DashboardEvent::AgentRemoved { id });
        true
    }

    /// Merge a roster import file. Returns the number of agents added.
    pub fn import_roster(&mut self, text: &str) -> DashResult<usize> {
        let candidates = parse_roster_import(text)?;
        let (roster, added) = self.roster.import_merge(&candidates);
        log::info!("Imported {added} of {} candidate agents", candidates.len());
        if added > 0 {
            self.commit_roster(roster);
        }
        self.events.push(DashboardEvent::RosterImported { added });
        Ok(added)
    }

    pub fn export_roster(&mut self) -> DashResult<String> {
        let json = self.roster.to_export_json()?;
        self.events.push(DashboardEvent::RosterExported { count: self.roster.len() });
        Ok(json)
    }

    // ── Sales data ────────────────────────────────────────────────

    pub fn begin_upload(&mut self, file_name: &str) -> DashResult<UploadTicket> {
        self.uploads.issue(file_name)
    }

    /// Apply the content of a finished read.
    ///
    /// Returns Ok(false) when the ticket has been superseded; the content
    /// is discarded without touching state. Read errors only count when
    /// the ticket is still current.
    pub fn complete_upload(
        &mut self,
        ticket: &UploadTicket,
        content: DashResult<String>,
    ) -> DashResult<bool> {
        if !self.uploads.is_current(ticket) {
            log::warn!(
                "Discarding stale upload {} (generation {}, latest {})",
                ticket.file_name,
                ticket.generation(),
                self.uploads.latest_generation()
            );
            self.events.push(DashboardEvent::StaleUploadDiscarded {
                file_name:  ticket.file_name.clone(),
                generation: ticket.generation(),
            });
            return Ok(false);
        }
        self.ingest_csv(&ticket.file_name, &content?)?;
        Ok(true)
    }

    /// Read and ingest a CSV file from disk.
    ///
    /// This holds `&mut self` across the read, so uploads through here run
    /// one after another and never go stale. Callers that overlap reads
    /// must drive `begin_upload` and `complete_upload` themselves; only that
    /// pair is guarded by the upload generation.
    pub async fn upload_file(&mut self, path: impl AsRef<Path>) -> DashResult<bool> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ticket = self.begin_upload(&file_name)?;
        let content = read_upload(path).await;
        self.complete_upload(&ticket, content)
    }

    /// Run parse → extract → match over `text` and replace the sales data.
    /// On error nothing changes.
    pub fn ingest_csv(&mut self, file_name: &str, text: &str) -> DashResult<()> {
        let rows = csv_parser::parse(text)?;
        let sales = extract(&rows, &self.config.columns)?;
        let outcome = match_records(&sales, &self.roster);

        self.events.push(DashboardEvent::SalesLoaded {
            file_name: file_name.to_string(),
            records:   sales.len(),
            matched:   outcome.matched.len(),
            skipped:   outcome.skipped.len(),
        });
        log::info!(
            "Loaded {file_name}: {} records, {} matched, {} skipped",
            sales.len(),
            outcome.matched.len(),
            outcome.skipped.len()
        );
        self.sales = sales;
        self.outcome = outcome;
        Ok(())
    }

    // ── Results ───────────────────────────────────────────────────

    /// On error the previous result is kept.
    pub fn calculate(&mut self, filter: &FilterSelection) -> DashResult<&AggregateResult> {
        let result = aggregate(&self.outcome.matched, filter)?;
        self.events.push(DashboardEvent::AveragesCalculated {
            agents:          result.agent_count,
            overall_average: result.overall_average,
        });
        Ok(&*self.last_result.insert(result))
    }

    pub fn export_results(&mut self, generated_at: DateTime<Local>) -> DashResult<String> {
        let result = self.last_result.as_ref().ok_or(DashboardError::NoResults)?;
        let csv = export_results_csv(result, generated_at)?;
        let agents = result.breakdown.len();
        self.events.push(DashboardEvent::ResultsExported { agents });
        Ok(csv)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let (cards, breakdown) = match &self.last_result {
            Some(r) => (summary_cards(r), breakdown_rows(r)),
            None => (Vec::new(), Vec::new()),
        };
        DashboardSnapshot {
            roster:        self.roster.agents().to_vec(),
            roster_origin: self.roster_origin,
            sales_loaded:  self.sales.len(),
            matched_count: self.outcome.matched.len(),
            skipped:       self.outcome.skipped.clone(),
            can_calculate: !self.outcome.matched.is_empty(),
            result:        self.last_result.clone(),
            cards,
            breakdown,
        }
    }

    // ── Commands ──────────────────────────────────────────────────

    /// Run one command to completion.
    pub async fn execute(&mut self, command: DashboardCommand) -> DashResult<()> {
        match command {
            DashboardCommand::AddAgent { initials, branch, position } => {
                self.add_agent(&initials, &branch, &position)
            }
            DashboardCommand::RemoveAgent { initials } => {
                self.remove_agent(&initials);
                Ok(())
            }
            DashboardCommand::ImportRoster { path } => {
                let text = tokio::fs::read_to_string(&path).await?;
                self.import_roster(&text).map(|_| ())
            }
            DashboardCommand::ExportRoster { path } => {
                let json = self.export_roster()?;
                tokio::fs::write(&path, json).await?;
                Ok(())
            }
            DashboardCommand::LoadCsv { path } => self.upload_file(&path).await.map(|_| ()),
            DashboardCommand::Calculate { branches, positions } => {
                let filter =
                    FilterSelection::from_codes(branches.as_deref(), positions.as_deref())?;
                self.calculate(&filter).map(|_| ())
            }
            DashboardCommand::ExportResults { path } => {
                let csv = self.export_results(Local::now())?;
                tokio::fs::write(&path, csv).await?;
                Ok(())
            }
        }
    }

    /// Like `execute`, but a failure is recorded as an error event instead
    /// of being returned. Returns whether the command succeeded.
    pub async fn dispatch(&mut self, command: DashboardCommand) -> bool {
        match self.execute(command).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Command failed: {e}");
                self.events.push(DashboardEvent::error(&e));
                false
            }
        }
    }
}
