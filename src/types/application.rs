// ABOUTME: Application labels for multi-application deployments.
// ABOUTME: Parses the comma-separated application list into distinct targets.

use nonempty::NonEmpty;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::output::constant_case;

/// Separator used by the `applications` input.
pub const APPLICATION_DELIMITER: char = ',';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplicationLabelError {
    #[error("application label cannot be empty")]
    Empty,

    #[error("invalid character in application label: {0:?}")]
    InvalidChar(char),
}

/// A trimmed, non-empty application name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationLabel(String);

impl ApplicationLabel {
    pub fn new(value: &str) -> Result<Self, ApplicationLabelError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ApplicationLabelError::Empty);
        }

        if let Some(c) = trimmed.chars().find(|c| c.is_control()) {
            return Err(ApplicationLabelError::InvalidChar(c));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One application to wait for.
///
/// `label` names the application in outputs; `environment_label` is the
/// (possibly prefixed) name the platform uses in the environment key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationTarget {
    pub label: ApplicationLabel,
    pub environment_label: String,
}

impl ApplicationTarget {
    pub fn new(label: ApplicationLabel, prefix: Option<&str>) -> Self {
        let environment_label = format!("{}{}", prefix.unwrap_or_default(), label);
        Self {
            label,
            environment_label,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplicationsError {
    #[error("application {0:?} is listed more than once")]
    Duplicate(String),

    #[error("applications {first:?} and {second:?} would both export {key}_URL")]
    KeyCollision {
        first: String,
        second: String,
        key: String,
    },

    #[error("invalid application label: {0}")]
    InvalidLabel(#[from] ApplicationLabelError),
}

/// The set of pipelines to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applications {
    /// Legacy single-application mode: one unlabeled pipeline.
    Single,
    /// One pipeline per listed application.
    Multiple(NonEmpty<ApplicationTarget>),
}

impl Applications {
    /// Build the application set from raw input entries.
    ///
    /// Each entry may itself hold a comma-separated list. Entries are trimmed
    /// and empty ones skipped; no entries at all selects [`Applications::Single`].
    /// Labels must stay distinct after conversion to output keys.
    pub fn from_entries<I, S>(entries: I, prefix: Option<&str>) -> Result<Self, ApplicationsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashMap<String, ApplicationLabel> = HashMap::new();
        let mut targets = Vec::new();

        for entry in entries {
            for raw in entry.as_ref().split(APPLICATION_DELIMITER) {
                if raw.trim().is_empty() {
                    continue;
                }

                let label = ApplicationLabel::new(raw)?;
                let key = constant_case(label.as_str());
                if let Some(first) = seen.get(&key) {
                    return Err(if *first == label {
                        ApplicationsError::Duplicate(label.to_string())
                    } else {
                        ApplicationsError::KeyCollision {
                            first: first.to_string(),
                            second: label.to_string(),
                            key,
                        }
                    });
                }
                seen.insert(key, label.clone());
                targets.push(ApplicationTarget::new(label, prefix));
            }
        }

        Ok(match NonEmpty::from_vec(targets) {
            Some(targets) => Applications::Multiple(targets),
            None => Applications::Single,
        })
    }

    /// Number of pipelines this set will launch.
    pub fn pipeline_count(&self) -> usize {
        match self {
            Applications::Single => 1,
            Applications::Multiple(targets) => targets.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_trimmed() {
        let label = ApplicationLabel::new("  web  ").unwrap();
        assert_eq!(label.as_str(), "web");
    }

    #[test]
    fn blank_label_is_rejected() {
        assert_eq!(ApplicationLabel::new("   "), Err(ApplicationLabelError::Empty));
    }

    #[test]
    fn comma_separated_entries_are_split_and_trimmed() {
        let apps = Applications::from_entries(["app1, app2 ,app3"], None).unwrap();
        let Applications::Multiple(targets) = apps else {
            panic!("expected multiple applications");
        };
        let labels: Vec<_> = targets.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["app1", "app2", "app3"]);
    }

    #[test]
    fn prefix_only_applies_to_environment_label() {
        let apps = Applications::from_entries(["docs"], Some("site-")).unwrap();
        let Applications::Multiple(targets) = apps else {
            panic!("expected multiple applications");
        };
        assert_eq!(targets.head.label.as_str(), "docs");
        assert_eq!(targets.head.environment_label, "site-docs");
    }

    #[test]
    fn no_entries_selects_single_mode() {
        let empty: [&str; 0] = [];
        assert_eq!(
            Applications::from_entries(empty, None).unwrap(),
            Applications::Single
        );
        assert_eq!(
            Applications::from_entries([" , "], None).unwrap(),
            Applications::Single
        );
        assert_eq!(Applications::Single.pipeline_count(), 1);
    }

    #[test]
    fn duplicates_are_rejected() {
        assert_eq!(
            Applications::from_entries(["app1", "app1"], None),
            Err(ApplicationsError::Duplicate("app1".to_string()))
        );
    }

    #[test]
    fn labels_sharing_an_output_key_are_rejected() {
        let err = Applications::from_entries(["my-app", "myApp"], None).unwrap_err();
        assert_eq!(
            err,
            ApplicationsError::KeyCollision {
                first: "my-app".to_string(),
                second: "myApp".to_string(),
                key: "MY_APP".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "applications \"my-app\" and \"myApp\" would both export MY_APP_URL"
        );

        assert!(matches!(
            Applications::from_entries(["my app, my-app"], None),
            Err(ApplicationsError::KeyCollision { .. })
        ));
    }

    #[test]
    fn prefix_does_not_hide_key_collisions() {
        assert!(matches!(
            Applications::from_entries(["web,WEB"], Some("acme-")),
            Err(ApplicationsError::KeyCollision { .. })
        ));
    }
}
