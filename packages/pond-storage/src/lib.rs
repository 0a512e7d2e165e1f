pub mod db;
pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;
pub mod tenant;
pub mod vector;

mod error;

pub use error::Error;
pub use pool::{NamespaceScope, ScopedConnection, ScopedTransaction};
pub use tenant::{Namespace, TenantRegistry};

pub type Result<T, E = Error> = std::result::Result<T, E>;
