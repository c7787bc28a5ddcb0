//! Object keys under which uploads are stored.

use uuid::Uuid;

/// Reduce an uploaded file name to a safe final path segment.
///
/// Directory components are dropped, anything outside `[A-Za-z0-9._-]`
/// becomes `_`, and a name left empty falls back to `file`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() { "file".to_string() } else { trimmed.to_string() }
}

/// Key of a rule attachment: `automation/{owner}/{rule}/{unique}_{name}`.
///
/// `owner` is the rule owner's segment, such as `courses/{id}`.
pub fn rule_attachment(owner: &str, rule_id: Uuid, file_name: &str) -> String {
    format!(
        "automation/{owner}/{rule_id}/{}_{}",
        Uuid::new_v4().simple(),
        sanitize_file_name(file_name)
    )
}

/// Key of a library document: `documents/{organization}/{unique}_{name}`.
pub fn document(organization_id: Uuid, file_name: &str) -> String {
    format!(
        "documents/{organization_id}/{}_{}",
        Uuid::new_v4().simple(),
        sanitize_file_name(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories_and_symbols() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\tmp\\Plan de cours.pdf"), "Plan_de_cours.pdf");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn test_rule_attachment_key() {
        let rule = Uuid::new_v4();
        let key = rule_attachment("courses/abc", rule, "convocation.pdf");
        assert!(key.starts_with(&format!("automation/courses/abc/{rule}/")));
        assert!(key.ends_with("_convocation.pdf"));
    }
}
