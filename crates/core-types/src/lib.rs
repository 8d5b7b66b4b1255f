pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ContractStatus, KycStatus, UserRole};
pub use error::CoreError;
pub use structs::{Contract, KycRecord, Product, User};
