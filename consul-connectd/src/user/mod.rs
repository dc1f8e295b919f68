pub mod context;

pub use context::{ObjectPermissions, SessionUser, UserContext};
