use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("hierarchy request: {0}")]
    HierarchyRequest(String),
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}
