//! vaultdiag-adapter-postgres - PostgreSQL 适配器

mod connection;
mod probe;

pub use connection::*;
pub use probe::*;
