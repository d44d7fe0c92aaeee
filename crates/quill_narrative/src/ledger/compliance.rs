//! Post-hoc check of generated prose against a variety requirement.

use quill_core::VarietyRequirement;

/// Confirm `text` honours `requirement`.
///
/// Matching is case-insensitive substring search. Returns whether the text
/// complies and a description of every violation.
///
/// # Examples
///
/// ```
/// use quill_core::VarietyRequirement;
/// use quill_narrative::check_compliance;
///
/// let requirement = VarietyRequirement {
///     required_characters: vec!["Ilse".into()],
///     forbidden_phrases: vec!["a chill ran down".into()],
///     ..Default::default()
/// };
/// let (ok, issues) = check_compliance("A chill ran down her spine.", &requirement);
/// assert!(!ok);
/// assert_eq!(issues.len(), 2);
/// ```
pub fn check_compliance(text: &str, requirement: &VarietyRequirement) -> (bool, Vec<String>) {
    let haystack = text.to_lowercase();
    let contains = |needle: &str| !needle.is_empty() && haystack.contains(&needle.to_lowercase());

    let mut issues = Vec::new();
    for name in &requirement.required_characters {
        if !contains(name) {
            issues.push(format!("Required character '{}' does not appear", name));
        }
    }
    for name in &requirement.forbidden_characters {
        if contains(name) {
            issues.push(format!("Character '{}' should sit this scene out", name));
        }
    }
    for phrase in &requirement.forbidden_phrases {
        if contains(phrase) {
            issues.push(format!("Reused phrase '{}'", phrase));
        }
    }
    (issues.is_empty(), issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_requirement_always_complies() {
        let (ok, issues) = check_compliance("anything", &VarietyRequirement::default());
        assert!(ok);
        assert!(issues.is_empty());
    }

    #[test]
    fn forbidden_character_is_case_insensitive() {
        let requirement = VarietyRequirement {
            forbidden_characters: vec!["Tobin".into()],
            ..Default::default()
        };
        let (ok, issues) = check_compliance("TOBIN laughed.", &requirement);
        assert!(!ok);
        assert_eq!(issues.len(), 1);
    }
}
