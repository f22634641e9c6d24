use crate::adapters::outbound::filesystem::{FileSystemWriter, StdoutPresenter};
use crate::ports::outbound::OutputPresenter;
use std::path::PathBuf;

/// Where a JSON document ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterType {
    Stdout,
    File(PathBuf),
}

impl PresenterType {
    /// `None` and `-` both mean stdout
    pub fn from_output(output: Option<PathBuf>) -> Self {
        match output {
            Some(path) if path.as_os_str() != "-" => PresenterType::File(path),
            _ => PresenterType::Stdout,
        }
    }
}

/// Factory for creating output presenters
///
/// Picks the filesystem adapter matching the requested destination.
pub struct PresenterFactory;

impl PresenterFactory {
    pub fn create(presenter_type: PresenterType) -> Box<dyn OutputPresenter> {
        match presenter_type {
            PresenterType::Stdout => Box::new(StdoutPresenter::new()),
            PresenterType::File(path) => Box::new(FileSystemWriter::new(path)),
        }
    }
}
