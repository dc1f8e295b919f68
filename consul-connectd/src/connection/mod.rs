pub mod directory;
pub mod fingerprint;
pub mod mapper;

pub use directory::{ConnectionDirectory, DirectoryError, DirectoryState};
