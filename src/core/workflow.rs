use crate::core::diff_table::DiffTable;
use crate::core::intake::{FileIntake, FileSlot};
use crate::core::summary::SummaryView;
use crate::core::{ReconTransport, Storage};
use crate::domain::model::{LedgerFile, ReconCategory, RequestMode, ResultSet, SavedReport};
use crate::utils::error::{ReconError, Result};
use chrono::{NaiveDate, Utc};

/// Name under which a downloaded report is saved.
pub fn report_filename(date: NaiveDate) -> String {
    format!("Reconciliation_Report_{}.xlsx", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A new result set replaced the previous one.
    Previewed,
    Downloaded(SavedReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    ReadyToSubmit,
    Submitting(RequestMode),
    Succeeded(Completion),
    Failed(String),
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Idle | WorkflowState::Succeeded(_) | WorkflowState::Failed(_)
        )
    }
}

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Drives one operator session: selections in, one request at a time out.
///
/// `submit` takes `&mut self`, so a second request cannot start while one is
/// awaited. The category is cleared after every attempt that reached the
/// transport, successful or not, so each request needs a fresh choice.
pub struct ReconWorkflow<T: ReconTransport, S: Storage> {
    transport: T,
    storage: S,
    intake: FileIntake,
    state: WorkflowState,
    result: Option<ResultSet>,
    today: Clock,
}

impl<T: ReconTransport, S: Storage> ReconWorkflow<T, S> {
    pub fn new(transport: T, storage: S) -> Self {
        Self {
            transport,
            storage,
            intake: FileIntake::new(),
            state: WorkflowState::Idle,
            result: None,
            today: Box::new(|| Utc::now().date_naive()),
        }
    }

    /// Overrides the date stamped into report filenames.
    pub fn with_clock<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Box::new(today);
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.state == WorkflowState::ReadyToSubmit
    }

    pub fn summary(&self) -> Option<SummaryView> {
        self.result
            .as_ref()
            .map(|result| SummaryView::from_counts(&result.summary))
    }

    /// Recomputed from the current result set on every call.
    pub fn diff_table(&self) -> Option<DiffTable> {
        self.result
            .as_ref()
            .and_then(|result| DiffTable::render(&result.rows))
    }

    pub fn select_file(&mut self, slot: FileSlot, file: LedgerFile) {
        tracing::debug!("Selected {:?} ledger: {}", slot, file.name);
        self.intake.select_file(slot, file);
        self.settle();
    }

    pub fn clear_file(&mut self, slot: FileSlot) {
        self.intake.clear_file(slot);
        self.settle();
    }

    pub fn select_category(&mut self, category: ReconCategory) {
        tracing::debug!("Selected category: {}", category.label());
        self.intake.select_category(category);
        self.settle();
    }

    pub fn clear_category(&mut self) {
        self.intake.clear_category();
        self.settle();
    }

    pub async fn submit(&mut self, mode: RequestMode) -> Result<Completion> {
        self.begin(mode)?;

        let outcome = match mode {
            RequestMode::Preview => self.run_preview().await,
            RequestMode::Download => self.run_download().await,
        };
        self.intake.clear_category();

        match outcome {
            Ok(completion) => {
                tracing::info!("Reconciliation {} succeeded", mode);
                self.state = WorkflowState::Succeeded(completion.clone());
                Ok(completion)
            }
            Err(e) => {
                tracing::warn!("Reconciliation {} failed: {}", mode, e);
                self.state = WorkflowState::Failed(e.user_friendly_message());
                Err(e)
            }
        }
    }

    /// Any selection change lands in `Idle` or `ReadyToSubmit`, which also
    /// drops a previous failure message.
    fn settle(&mut self) {
        self.state = if self.intake.is_ready() {
            WorkflowState::ReadyToSubmit
        } else {
            WorkflowState::Idle
        };
    }

    fn begin(&mut self, mode: RequestMode) -> Result<()> {
        if let WorkflowState::Submitting(current) = self.state {
            tracing::warn!("Refusing {} while a {} request is in flight", mode, current);
            return Err(ReconError::RequestInFlight);
        }

        if let Err(e) = self.intake.request() {
            tracing::warn!("Submission refused: {}", e);
            self.state = WorkflowState::Failed(e.user_friendly_message());
            return Err(e);
        }

        self.state = WorkflowState::Submitting(mode);
        Ok(())
    }

    async fn run_preview(&mut self) -> Result<Completion> {
        let request = self.intake.request()?;
        tracing::info!(
            "Requesting {} preview for {} / {}",
            request.category,
            request.primary.name,
            request.secondary.name
        );

        let response = self.transport.preview(&request).await?;
        let result = ResultSet::from(response);
        tracing::debug!(
            "Preview returned {} mismatch rows, {} total transactions",
            result.rows.len(),
            result.summary.total()
        );

        self.result = Some(result);
        Ok(Completion::Previewed)
    }

    async fn run_download(&mut self) -> Result<Completion> {
        let request = self.intake.request()?;
        tracing::info!("Requesting {} report download", request.category);

        let bytes = self.transport.download(&request).await?;
        let filename = report_filename((self.today)());

        tracing::debug!("Saving {} ({} bytes)", filename, bytes.len());
        self.storage
            .write_file(&filename, &bytes)
            .await
            .map_err(|e| ReconError::DownloadError {
                reason: format!("Failed to save {}: {}", filename, e),
            })?;

        Ok(Completion::Downloaded(SavedReport {
            filename,
            size_bytes: bytes.len(),
        }))
    }
}
