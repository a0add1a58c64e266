pub mod models;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod ktp_validator;

pub use ktp_validator::KtpValidator;
