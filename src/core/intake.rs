use crate::domain::model::{LedgerFile, ReconCategory, ReconRequest};
use crate::utils::error::{ReconError, Result};

pub const MISSING_FILES_MESSAGE: &str = "Please select both files before proceeding.";
pub const MISSING_CATEGORY_MESSAGE: &str = "Please select a reconciliation category.";

/// Which upload slot a ledger goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSlot {
    /// Partner / switch export, sent as `eth_file`.
    Primary,
    /// Bank's internal export, sent as `zzb_file`.
    Secondary,
}

/// The operator's current selections: two ledger slots and a category.
#[derive(Debug, Clone, Default)]
pub struct FileIntake {
    primary: Option<LedgerFile>,
    secondary: Option<LedgerFile>,
    category: Option<ReconCategory>,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_file(&mut self, slot: FileSlot, file: LedgerFile) {
        *self.slot_mut(slot) = Some(file);
    }

    pub fn clear_file(&mut self, slot: FileSlot) {
        *self.slot_mut(slot) = None;
    }

    pub fn file(&self, slot: FileSlot) -> Option<&LedgerFile> {
        match slot {
            FileSlot::Primary => self.primary.as_ref(),
            FileSlot::Secondary => self.secondary.as_ref(),
        }
    }

    pub fn select_category(&mut self, category: ReconCategory) {
        self.category = Some(category);
    }

    pub fn clear_category(&mut self) {
        self.category = None;
    }

    pub fn category(&self) -> Option<ReconCategory> {
        self.category
    }

    pub fn is_ready(&self) -> bool {
        self.request().is_ok()
    }

    /// Builds the submission, or explains what is still missing.
    /// Files are checked before the category.
    pub fn request(&self) -> Result<ReconRequest<'_>> {
        let (Some(primary), Some(secondary)) = (self.primary.as_ref(), self.secondary.as_ref())
        else {
            return Err(ReconError::validation(MISSING_FILES_MESSAGE));
        };
        let category = self
            .category
            .ok_or_else(|| ReconError::validation(MISSING_CATEGORY_MESSAGE))?;

        Ok(ReconRequest {
            primary,
            secondary,
            category,
        })
    }

    fn slot_mut(&mut self, slot: FileSlot) -> &mut Option<LedgerFile> {
        match slot {
            FileSlot::Primary => &mut self.primary,
            FileSlot::Secondary => &mut self.secondary,
        }
    }
}
