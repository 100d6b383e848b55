//! Formats `ErrorInfo` into the fixed retry-context template fed back into the next prompt (§4.8).
//!
//! Grounded on `config/prompts.py::ERROR_CONTEXT_TEMPLATE`.

use crate::model::{ErrorInfo, ErrorKind};

fn error_kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Syntax => "SYNTAX",
        ErrorKind::Build => "BUILD",
        ErrorKind::Runtime => "RUNTIME",
        ErrorKind::Logic => "LOGIC",
        ErrorKind::MissingCredentials => "MISSING_CREDENTIALS",
    }
}

pub fn format(error_info: &ErrorInfo, iteration: u32, max_iterations: u32) -> String {
    let error_type = error_kind_label(error_info.error_kind);
    let issues = error_info.specific_issues.iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n");
    let fixes = error_info.suggested_fixes.iter().map(|f| format!("- {f}")).collect::<Vec<_>>().join("\n");

    format!(
        "\n**Previous Attempt Failed:**\n\n\
         **Error Type:** {error_type}\n\
         **Root Cause:** {root_cause}\n\n\
         **Specific Issues:**\n{issues}\n\n\
         **Required Fixes:**\n{fixes}\n\n\
         **Iteration:** {iteration}/{max_iterations}\n",
        root_cause = error_info.root_cause,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorKind;

    #[test]
    fn renders_the_fixed_template_shape() {
        let info = ErrorInfo {
            error_kind: ErrorKind::Build,
            root_cause: "Missing Python package: requests".to_string(),
            specific_issues: vec!["Missing package: requests".to_string()],
            suggested_fixes: vec!["Add missing packages to requirements.txt".to_string()],
            missing_credentials: vec![],
            raw_error: "ModuleNotFoundError: No module named 'requests'".to_string(),
        };

        let context = format(&info, 2, 5);
        assert!(context.contains("**Error Type:** BUILD"));
        assert!(context.contains("**Root Cause:** Missing Python package: requests"));
        assert!(context.contains("- Missing package: requests"));
        assert!(context.contains("**Iteration:** 2/5"));
    }
}
