/// Skill terms looked for in every resume, in reporting order. Terms are
/// lower-case and unique.
pub const SKILL_VOCABULARY: &[&str] = &[
    "react",
    "node.js",
    "mongodb",
    "rest api",
    "aws",
    "azure",
    "git",
    "ci/cd",
    "agile",
    "javascript",
    "typescript",
    "html",
    "css",
];

pub fn match_skills(text: &str) -> Vec<String> {
    match_against(text, SKILL_VOCABULARY)
}

/// Case-insensitive substring scan. A term also matches inside a longer
/// word, so "css" is found in "cssx".
pub fn match_against(text: &str, vocabulary: &[&str]) -> Vec<String> {
    let haystack = text.to_lowercase();
    vocabulary
        .iter()
        .filter(|term| haystack.contains(*term))
        .map(|term| term.to_string())
        .collect()
}
