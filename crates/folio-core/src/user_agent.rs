//! Heuristic User-Agent classification.
//!
//! Each category is an ordered rule list. The first rule with a token
//! contained in the raw User-Agent wins, so rule order is the tie-break order:
//! a string carrying both `Chrome` and `Safari` tokens is Chrome.

use serde::{Deserialize, Serialize};

pub const OTHER: &str = "Other";
pub const DESKTOP: &str = "Desktop";

/// A label and the substrings that select it.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub label: &'static str,
    pub tokens: &'static [&'static str],
}

impl Rule {
    fn matches(&self, user_agent: &str) -> bool {
        self.tokens.iter().any(|t| user_agent.contains(t))
    }
}

#[rustfmt::skip]
pub const BROWSER_RULES: &[Rule] = &[
    Rule { label: "Chrome", tokens: &["Chrome"] },
    Rule { label: "Firefox", tokens: &["Firefox"] },
    Rule { label: "Safari", tokens: &["Safari"] },
    Rule { label: "Edge", tokens: &["Edge"] },
];

#[rustfmt::skip]
pub const OS_RULES: &[Rule] = &[
    Rule { label: "Windows", tokens: &["Windows"] },
    Rule { label: "macOS", tokens: &["Mac"] },
    Rule { label: "Linux", tokens: &["Linux"] },
    Rule { label: "Android", tokens: &["Android"] },
    Rule { label: "iOS", tokens: &["iPhone", "iPad", "iOS"] },
];

#[rustfmt::skip]
pub const DEVICE_RULES: &[Rule] = &[
    Rule { label: "Mobile", tokens: &["Mobile"] },
    Rule { label: "Tablet", tokens: &["Tablet"] },
];

/// Browser, OS and device labels for one User-Agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UaClass {
    pub browser: String,
    pub os: String,
    pub device: String,
}

/// First matching label in `rules`, or `fallback`.
pub fn first_match(rules: &[Rule], user_agent: &str, fallback: &'static str) -> &'static str {
    rules
        .iter()
        .find(|rule| rule.matches(user_agent))
        .map_or(fallback, |rule| rule.label)
}

pub fn classify_user_agent(user_agent: &str) -> UaClass {
    UaClass {
        browser: first_match(BROWSER_RULES, user_agent, OTHER).to_string(),
        os: first_match(OS_RULES, user_agent, OTHER).to_string(),
        device: first_match(DEVICE_RULES, user_agent, DESKTOP).to_string(),
    }
}
