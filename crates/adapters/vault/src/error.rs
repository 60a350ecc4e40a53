//! Error types for Vault adapter

use vaultdiag_errors::AppError;

/// Convert vaultrs error to AppError
pub fn map_vault_error(err: impl std::fmt::Display, context: &str) -> AppError {
    let err_str = err.to_string();
    let lower = err_str.to_lowercase();

    if lower.contains("404") || lower.contains("not found") {
        AppError::not_found(format!("{}: {}", context, err_str))
    } else if lower.contains("403") || lower.contains("permission denied") {
        AppError::forbidden(format!("{}: {}", context, err_str))
    } else {
        // 401, transport failures and timeouts all mean the store is not usable
        AppError::connection(format!("{}: {}", context, err_str))
    }
}
