//! i-GDA Calculator Core
//!
//! Platform-agnostic logic for the i-GDA food-miles index: the session
//! record, the seven wizard stages and the scoring tables. This crate has
//! no I/O of its own; front ends supply storage through [`SessionStorage`].

pub mod classify;
pub mod constants;
pub mod food;
pub mod geography;
pub mod index;
pub mod numbers;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod tables;

use thiserror::Error;

// Re-export commonly used types
pub use classify::{classify, classify_foods};
pub use constants::{LOOKUP_SYSTEM_PROMPT, LOOKUP_TIMEOUT_SECS, MAX_FOODS, MIN_FOODS};
pub use food::{AcquisitionMode, Food, set_roster};
pub use geography::{
    Dimensions, GeographyError, ReplyParseError, display_pd, lookup_prompt,
    parse_dimensions_reply,
};
pub use index::{
    Category, FoodSummary, IndexReport, LevelDistance, finalize, igda_index, km_by_level,
};
pub use scoring::{FoodValue, accumulated_value, score_foods};
pub use session::{Session, Stage, StageError};
pub use snapshot::SnapshotError;
pub use tables::{Bracket, DistanceTable, DistanceTables, Level};

/// Trait for abstracting snapshot persistence.
/// Front ends decide where the record lives.
pub trait SessionStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the last saved record, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a saved record exists but cannot be read.
    fn load_session(&self) -> Result<Option<Session>, Self::Error>;

    /// Overwrite the saved record with `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save_session(&self, session: &Session) -> Result<(), Self::Error>;
}

/// Failure of a single calculator step.
#[derive(Debug, Error)]
pub enum CalculatorError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error("failed to save session: {0}")]
    Storage(#[source] E),
}

/// Owns the session context and persists it after every stage.
pub struct Calculator<S>
where
    S: SessionStorage,
{
    storage: S,
    session: Session,
}

impl<S> Calculator<S>
where
    S: SessionStorage,
{
    /// Load the saved record, or start empty when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved record cannot be read.
    pub fn open(storage: S) -> Result<Self, S::Error> {
        let session = storage.load_session()?.unwrap_or_default();
        log::debug!("session opened at stage '{}'", session.progress());
        Ok(Self { storage, session })
    }

    /// Borrow the current record.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Borrow the storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Run one stage and persist the whole record.
    ///
    /// The stage works on a copy; the in-memory and saved records only
    /// change once the stage succeeded and the save went through.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError::Stage`] if the stage refuses to run and
    /// [`CalculatorError::Storage`] if the record cannot be saved.
    pub fn apply<R>(
        &mut self,
        stage: impl FnOnce(&mut Session) -> Result<R, StageError>,
    ) -> Result<R, CalculatorError<S::Error>> {
        let mut draft = self.session.clone();
        let output = stage(&mut draft)?;
        self.storage
            .save_session(&draft)
            .map_err(CalculatorError::Storage)?;
        self.session = draft;
        log::debug!("session saved at stage '{}'", self.session.progress());
        Ok(output)
    }

    /// Consume the calculator, returning the record.
    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }
}
