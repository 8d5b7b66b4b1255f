use thiserror::Error;

#[derive(Error, Debug)]
pub enum KpiError {
    #[error("Calculation error: arithmetic overflow in metric '{0}'")]
    Overflow(String),
}
