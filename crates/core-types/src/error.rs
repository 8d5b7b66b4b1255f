use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown user role: '{0}'")]
    UnknownRole(String),
}
