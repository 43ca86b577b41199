use thiserror::Error;

/// Main error type for the Sheet Manager engine.
/// Aggregates errors from the grid collaborator and from every internal module.
#[derive(Error, Debug)]
pub enum SheetManagerError {
    #[error("{0}")]
    WithContextError(String),

    // Grid collaborator failures
    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    // Spreadsheet module errors
    #[error("{0}")]
    TableError(#[from] crate::spreadsheet::table::TableError),

    // Database module errors
    #[error("{0}")]
    RangeError(#[from] crate::database::range::RangeError),

    #[error("{0}")]
    RangeServiceError(#[from] crate::database::range_service::RangeServiceError),

    #[error("{0}")]
    MapBuilderError(#[from] crate::database::map_builder::MapBuilderError),

    #[error("{0}")]
    SchemaError(#[from] crate::database::schema::SchemaError),

    #[error("{0}")]
    DataSourceError(#[from] crate::database::source::DataSourceError),

    // Repository module errors
    #[error("{0}")]
    CriteriaError(#[from] crate::repository::criteria::CriteriaError),
}

impl SheetManagerError {
    /// Hands the error to a host-provided presenter (a dialog, a toast, a log sink).
    ///
    /// Presentation is a best-effort side channel: a failing presenter is logged
    /// and otherwise ignored, and the error itself is left untouched for the caller.
    pub fn notify(&self, presenter: Option<&dyn ErrorPresenter>) {
        tracing::error!(error = %self, "Sheet manager operation failed");
        if let Some(presenter) = presenter {
            if let Err(failure) = presenter.present(self) {
                tracing::warn!(%failure, "Error presenter failed");
            }
        }
    }
}

/// Host-side presentation of engine errors.
///
/// Constructing a [`SheetManagerError`] never presents it; callers decide at the
/// boundary whether to invoke [`SheetManagerError::notify`].
pub trait ErrorPresenter {
    fn present(&self, error: &SheetManagerError) -> anyhow::Result<()>;
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SheetManagerError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SheetManagerError::WithContextError(format!("{}: {}", message, e)))
    }
}
