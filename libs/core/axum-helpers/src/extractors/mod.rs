//! Extractors that reject with [`AppError`](crate::errors::AppError) bodies.

pub mod json_object;
pub mod uuid_path;

pub use json_object::JsonObject;
pub use uuid_path::UuidPath;
