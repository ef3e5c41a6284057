//! History sources.
//!
//! Sources are responsible for listing references and checking out
//! revisions of the standard library (remote clones, existing local
//! clones, in-memory fixtures).

pub mod backend;
pub mod fixture;
pub mod local;
pub mod remote;

pub use backend::{ref_name_for_version, Checkout, RepoBackend, RepoRef};
pub use fixture::{FixtureBackend, FixtureHistory};
pub use local::LocalBackend;
pub use remote::RemoteBackend;
