//! Template directory checks.

use std::path::Path;

use super::types::CheckResult;
use crate::template::TemplateStore;

pub fn check_templates(dir: &Path) -> Vec<CheckResult> {
    let mut results = Vec::new();

    if !dir.is_dir() {
        results.push(CheckResult::fail(
            "Templates directory",
            &format!("{} does not exist", dir.display()),
        ));
        return results;
    }
    results.push(CheckResult::pass_with(
        "Templates directory",
        &dir.display().to_string(),
    ));

    let templates = match TemplateStore::new(dir).list() {
        Ok(templates) => templates,
        Err(e) => {
            results.push(CheckResult::fail("Templates", &e.to_string()));
            return results;
        }
    };
    results.push(CheckResult::pass_with(
        "Templates",
        &format!("{} found", templates.len()),
    ));

    for template in &templates {
        let meta_path = template.metadata_path();
        if !meta_path.is_file() {
            continue;
        }
        let parsed = std::fs::read_to_string(&meta_path)
            .map_err(anyhow::Error::from)
            .and_then(|c| crate::template::TemplateMetadata::parse(&c));
        if let Err(e) = parsed {
            results.push(CheckResult::warn(
                &format!("{} metadata", template.name()),
                &format!("unreadable, defaults will be used: {}", e),
            ));
        }
    }

    results
}
