//! `sift rules`: list the built-in rules.

use std::process::ExitCode;

use sift_engine::linter::RuleRegistry;

use super::lint::load_lint_config;
use crate::output::{resolve_color_choice, StyledOutput};

pub fn execute(color: Option<&str>) -> anyhow::Result<ExitCode> {
    let config = load_lint_config()?.unwrap_or_default();
    let registry = RuleRegistry::new();
    let mut out = StyledOutput::new(resolve_color_choice(color));

    for rule in registry.rules() {
        let meta = rule.meta();
        let disabled = config.is_disabled(meta.name) || config.is_disabled(meta.code);

        out.bold(&format!("{:<6}", meta.code));
        out.plain(&format!(" {:<18}", meta.name));
        let severity = format!("{:<8}", meta.default_severity.to_string());
        match meta.default_severity {
            sift_engine::Severity::Error => out.error(&severity),
            sift_engine::Severity::Warning => out.warning(&severity),
            sift_engine::Severity::Info => out.info(&severity),
        }
        out.plain(&format!(" {:<14}", meta.category.to_string()));
        if meta.fixable {
            out.success("fixable ");
        } else {
            out.plain("        ");
        }
        if disabled {
            out.plain("(off) ");
        }
        out.plain(meta.description);
        out.newline();
    }
    out.flush();
    Ok(ExitCode::SUCCESS)
}
