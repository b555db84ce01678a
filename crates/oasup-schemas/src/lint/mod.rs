//! Style rules evaluated alongside the semantic walk
//!
//! Each rule has a stable name that can be passed to `--lintSkip`. The
//! [`Linter`] is driven by the walker as it visits document nodes, so
//! findings are recorded in document order next to any other warnings.

mod rules;

use oasup_core::{RunConfig, Warning};

/// A named lint rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub name: &'static str,
    pub description: &'static str,
}

/// Every rule the linter knows, in evaluation order
pub const RULES: &[Rule] = &[
    Rule {
        name: "openapi-tags",
        description: "openapi object should have non-empty tags array",
    },
    Rule {
        name: "openapi-tags-alphabetical",
        description: "openapi object should have alphabetical tags",
    },
    Rule {
        name: "info-contact",
        description: "info object should contain contact object",
    },
    Rule {
        name: "info-description",
        description: "info object should contain description field",
    },
    Rule {
        name: "license-url",
        description: "license object should include url",
    },
    Rule {
        name: "server-trailing-slash",
        description: "server url should not have a trailing slash",
    },
    Rule {
        name: "tag-description",
        description: "tag object should have a description",
    },
    Rule {
        name: "path-keys-no-trailing-slash",
        description: "paths should not end with a slash",
    },
    Rule {
        name: "operation-tags",
        description: "operation should have non-empty tags array",
    },
    Rule {
        name: "operation-operationId",
        description: "operation should have an operationId",
    },
    Rule {
        name: "operation-summary-or-description",
        description: "operation should have summary or description",
    },
    Rule {
        name: "parameter-description",
        description: "parameter objects should have a description",
    },
    Rule {
        name: "reference-no-other-properties",
        description: "reference objects should only have a $ref property",
    },
    Rule {
        name: "no-script-tags-in-markdown",
        description: "markdown descriptions should not contain script tags",
    },
];

/// Look up a rule by name
pub fn rule(name: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.name == name)
}

/// Collects lint findings for one validation pass
#[derive(Debug)]
pub struct Linter<'a> {
    config: &'a RunConfig,
    findings: Vec<Warning>,
}

impl<'a> Linter<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            findings: Vec::new(),
        }
    }

    /// Whether any rule can fire during this pass
    pub fn is_enabled(&self) -> bool {
        self.config.lint
    }

    /// Record a finding unless the rule is disabled or skipped
    pub(crate) fn report(&mut self, name: &'static str, pointer: &str) {
        if !self.config.lint_rule_enabled(name) {
            return;
        }
        let description = rule(name).map(|r| r.description).unwrap_or(name);
        self.findings.push(Warning::lint(name, description, pointer));
    }

    /// Take the findings recorded since the last drain
    pub fn drain(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.findings)
    }
}
