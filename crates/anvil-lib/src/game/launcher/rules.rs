/// Platform rule evaluation for libraries
use crate::game::launcher::types::{OsType, Platform};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Rule for conditional libraries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

impl Rule {
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            os: None,
        }
    }

    pub fn disallow_os(os: OsType) -> Self {
        Self {
            action: RuleAction::Disallow,
            os: Some(OsRule {
                name: Some(os.as_str().to_string()),
                version: None,
                arch: None,
            }),
        }
    }

    pub fn allow_os(os: OsType) -> Self {
        Self {
            action: RuleAction::Allow,
            os: Some(OsRule {
                name: Some(os.as_str().to_string()),
                version: None,
                arch: None,
            }),
        }
    }

    fn matches(&self, platform: &Platform) -> bool {
        let Some(ref os_rule) = self.os else {
            return true;
        };

        if let Some(ref name) = os_rule.name {
            if name != platform.os.as_str() {
                return false;
            }
        }

        if let Some(ref arch) = os_rule.arch {
            if arch != platform.arch.as_str() {
                return false;
            }
        }

        // Version constraints are regexes over the host OS version; they can
        // only hold when evaluating for the host itself.
        if let Some(ref version_expr) = os_rule.version {
            if platform.os != OsType::current() {
                return false;
            }
            let Ok(re) = Regex::new(version_expr) else {
                log::warn!("Ignoring rule with invalid OS version pattern: {}", version_expr);
                return false;
            };
            let host_version = sysinfo::System::os_version().unwrap_or_default();
            if !re.is_match(&host_version) {
                return false;
            }
        }

        true
    }
}

/// Evaluate library rules for a platform.
/// No rules means allowed; otherwise the last matching rule decides.
pub fn rules_allow(rules: &[Rule], platform: &Platform) -> bool {
    if rules.is_empty() {
        return true;
    }

    let mut allowed = false;
    for rule in rules {
        if rule.matches(platform) {
            allowed = rule.action == RuleAction::Allow;
        }
    }

    allowed
}
