//! Status envelope published by every store: data + error + lifecycle tag.
//!
//! Invariant: `error.is_some()` exactly when `status == Status::Error`. Fields are private so
//! the invariant can only be changed through the transitions below.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No fetch attempted yet.
    Never,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataStatus<T> {
    data: T,
    error: Option<DomainError>,
    status: Status,
}

impl<T> DataStatus<T> {
    pub fn never(data: T) -> Self {
        Self {
            data,
            error: None,
            status: Status::Never,
        }
    }

    pub fn loading(data: T) -> Self {
        Self {
            data,
            error: None,
            status: Status::Loading,
        }
    }

    pub fn success(data: T) -> Self {
        Self {
            data,
            error: None,
            status: Status::Success,
        }
    }

    pub fn failure(data: T, error: DomainError) -> Self {
        Self {
            data,
            error: Some(error),
            status: Status::Error,
        }
    }

    /// Terminal envelope for an API result. `fallback` is the data carried on error.
    pub fn from_result(result: Result<T, DomainError>, fallback: T) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(fallback, e),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn error(&self) -> Option<&DomainError> {
        self.error.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> DataStatus<U> {
        DataStatus {
            data: f(&self.data),
            error: self.error.clone(),
            status: self.status,
        }
    }

    pub(crate) fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub(crate) fn mark_loading(&mut self) {
        self.status = Status::Loading;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self) {
        self.status = Status::Success;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, error: DomainError) {
        self.status = Status::Error;
        self.error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_iff_error_status() {
        let mut ds = DataStatus::never(Vec::<u8>::new());
        assert_eq!(ds.status(), Status::Never);
        assert!(ds.error().is_none());

        ds.fail(DomainError::Status { code: 500 });
        assert_eq!(ds.status(), Status::Error);
        assert_eq!(ds.error(), Some(&DomainError::Status { code: 500 }));

        ds.mark_loading();
        assert!(ds.is_loading());
        assert!(ds.error().is_none());

        ds.succeed();
        assert!(ds.is_success());
        assert!(ds.error().is_none());
    }

    #[test]
    fn test_from_result_uses_fallback_on_error() {
        let ds: DataStatus<Vec<u8>> =
            DataStatus::from_result(Err(DomainError::Transport("refused".into())), vec![]);
        assert_eq!(ds.status(), Status::Error);
        assert!(ds.data().is_empty());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&Status::Loading).unwrap();
        assert_eq!(json, "\"loading\"");
    }
}
