//! Static catalog of validation error codes.
//!
//! Codes are emitted by the validators that run on each edit/validate round.
//! The catalog only supplies short human labels for hint text; codes missing
//! from it are still tracked and advised on, labelled with the code itself.

/// Known codes and their short labels, sorted by code.
static CATALOG: &[(&str, &str)] = &[
    ("DOC001", "markdown lint violation"),
    ("DOC002", "broken relative link"),
    ("FMT001", "file not formatted"),
    ("FMT002", "trailing whitespace"),
    ("GIT002", "commit on protected branch"),
    ("GIT004", "commit message not conventional"),
    ("GIT005", "commit title too long"),
    ("GIT006", "commit body line too long"),
    ("GIT010", "unstaged changes after hook"),
    ("GIT013", "files modified by formatter after staging"),
    ("GIT016", "untracked files present"),
    ("LINT001", "linter reported errors"),
    ("PY001", "ruff lint violation"),
    ("PY002", "ruff format drift"),
    ("PY003", "unused import"),
    ("SHELL001", "shellcheck warning"),
    ("SHELL002", "shfmt format drift"),
    ("TEST001", "test failure"),
    ("TYPE001", "type check failure"),
    ("YAML001", "yaml lint violation"),
];

/// Look up the label for a code, if the catalog knows it.
pub fn describe(code: &str) -> Option<&'static str> {
    CATALOG
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .ok()
        .map(|idx| CATALOG[idx].1)
}

/// Label for display: the catalog label, or the code itself when unknown.
pub fn label(code: &str) -> &str {
    describe(code).unwrap_or(code)
}
