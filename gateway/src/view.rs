//! 诊断页面渲染

use tera::{Context, Tera};
use tracing::debug;
use vaultdiag_errors::{AppError, AppResult};

use crate::diagnostics::DiagnosticResult;

const DIAGNOSTICS_TEMPLATE: &str = "diagnostics.html";

/// 页面模板
pub struct DiagnosticsView {
    tera: Tera,
}

impl DiagnosticsView {
    /// 使用编译期内嵌的模板创建
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(
            DIAGNOSTICS_TEMPLATE,
            include_str!("../templates/diagnostics.html"),
        )
        .map_err(|e| AppError::internal(format!("Failed to add template {}: {}", DIAGNOSTICS_TEMPLATE, e)))?;

        debug!("Diagnostics template loaded");
        Ok(Self { tera })
    }

    /// 渲染诊断结果（`.html` 模板自动转义）
    pub fn render(&self, result: &DiagnosticResult) -> AppResult<String> {
        let mut context = Context::new();
        context.insert("result", result);

        self.tera.render(DIAGNOSTICS_TEMPLATE, &context).map_err(|e| {
            AppError::internal(format!(
                "Failed to render template {}: {}",
                DIAGNOSTICS_TEMPLATE, e
            ))
        })
    }
}
