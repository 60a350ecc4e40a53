//! vaultdiag-ports - 端口定义（Hexagonal Architecture）

mod connectivity;
mod secret_store;

pub use connectivity::*;
pub use secret_store::*;
