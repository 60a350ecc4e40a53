//! vaultdiag-bootstrap - 服务启动骨架

mod runtime;

pub use runtime::*;
