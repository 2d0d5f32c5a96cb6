//! Label selector utilities
//!
//! Selectors are passed to the API server as strings. This module parses the
//! same grammar so that selectors can be built from label maps and evaluated
//! locally (the in-memory mock filters with it).
//!
//! Supported requirements, joined by commas:
//! `key=value`, `key==value`, `key!=value`, `key in (a,b)`,
//! `key notin (a,b)`, `key`, `!key`.

use crate::error::ClusterError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single selector requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// `key=value`
    Equals(String, String),
    /// `key!=value`, also satisfied when the label is absent
    NotEquals(String, String),
    /// `key in (a,b)`
    In(String, Vec<String>),
    /// `key notin (a,b)`, also satisfied when the label is absent
    NotIn(String, Vec<String>),
    /// `key`
    Exists(String),
    /// `!key`
    DoesNotExist(String),
}

impl Requirement {
    /// Evaluates the requirement against a label map
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Requirement::Equals(k, v) => labels.get(k) == Some(v),
            Requirement::NotEquals(k, v) => labels.get(k) != Some(v),
            Requirement::In(k, values) => labels.get(k).is_some_and(|l| values.contains(l)),
            Requirement::NotIn(k, values) => !labels.get(k).is_some_and(|l| values.contains(l)),
            Requirement::Exists(k) => labels.contains_key(k),
            Requirement::DoesNotExist(k) => !labels.contains_key(k),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Equals(k, v) => write!(f, "{k}={v}"),
            Requirement::NotEquals(k, v) => write!(f, "{k}!={v}"),
            Requirement::In(k, values) => write!(f, "{k} in ({})", values.join(",")),
            Requirement::NotIn(k, values) => write!(f, "{k} notin ({})", values.join(",")),
            Requirement::Exists(k) => write!(f, "{k}"),
            Requirement::DoesNotExist(k) => write!(f, "!{k}"),
        }
    }
}

/// A parsed label selector; every requirement must match.
///
/// The empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    /// Equality selector over every entry of `labels`
    pub fn from_labels(labels: &BTreeMap<String, String>) -> Self {
        Self {
            requirements: labels
                .iter()
                .map(|(k, v)| Requirement::Equals(k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Requirements in the order they were written
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Whether the selector has no requirements
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Whether all requirements hold for `labels`
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.requirements.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(","))
    }
}

impl FromStr for LabelSelector {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let requirements = split_top_level(s)
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(parse_requirement)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { requirements })
    }
}

/// Splits on commas that are not inside a `( ... )` value set
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_requirement(raw: &str) -> Result<Requirement, ClusterError> {
    if let Some(open) = raw.find('(') {
        let close = raw
            .rfind(')')
            .filter(|close| *close > open)
            .ok_or_else(|| invalid(raw, "unterminated value set"))?;
        let mut head = raw[..open].split_whitespace();
        let key = validate_key(head.next().unwrap_or_default(), raw)?;
        let op = head.next().ok_or_else(|| invalid(raw, "missing operator"))?;
        let values: Vec<String> = raw[open + 1..close]
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        return match op {
            "in" => Ok(Requirement::In(key, values)),
            "notin" => Ok(Requirement::NotIn(key, values)),
            other => Err(invalid(raw, &format!("unknown operator {other}"))),
        };
    }

    if let Some(key) = raw.strip_prefix('!') {
        return Ok(Requirement::DoesNotExist(validate_key(key.trim(), raw)?));
    }
    if let Some((key, value)) = raw.split_once("!=") {
        return Ok(Requirement::NotEquals(validate_key(key.trim(), raw)?, value.trim().to_string()));
    }
    if let Some((key, value)) = raw.split_once("==").or_else(|| raw.split_once('=')) {
        return Ok(Requirement::Equals(validate_key(key.trim(), raw)?, value.trim().to_string()));
    }
    Ok(Requirement::Exists(validate_key(raw, raw)?))
}

fn validate_key(key: &str, raw: &str) -> Result<String, ClusterError> {
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(invalid(raw, "invalid label key"));
    }
    Ok(key.to_string())
}

fn invalid(raw: &str, reason: &str) -> ClusterError {
    ClusterError::InvalidRequest(format!("label selector {raw:?}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_equality_selector() {
        let selector: LabelSelector = "app.kubernetes.io/part-of=app".parse().unwrap();
        assert_eq!(
            selector.requirements(),
            &[Requirement::Equals(
                "app.kubernetes.io/part-of".to_string(),
                "app".to_string()
            )]
        );
        assert!(selector.matches(&labels(&[("app.kubernetes.io/part-of", "app")])));
        assert!(!selector.matches(&labels(&[("app.kubernetes.io/part-of", "app2")])));
        assert!(!selector.matches(&labels(&[])));
    }

    #[test]
    fn test_parse_mixed_requirements() {
        let selector: LabelSelector = "app=app, tier notin (cache,queue),!deprecated,env in (dev, prod)"
            .parse()
            .unwrap();
        assert_eq!(selector.requirements().len(), 4);

        assert!(selector.matches(&labels(&[("app", "app"), ("env", "dev")])));
        assert!(!selector.matches(&labels(&[("app", "app"), ("env", "dev"), ("tier", "cache")])));
        assert!(!selector.matches(&labels(&[("app", "app"), ("env", "dev"), ("deprecated", "true")])));
        assert!(!selector.matches(&labels(&[("app", "app"), ("env", "staging")])));
    }

    #[test]
    fn test_not_equals_matches_missing_label() {
        let selector: LabelSelector = "app!=app".parse().unwrap();
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("app", "other")])));
        assert!(!selector.matches(&labels(&[("app", "app")])));
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector: LabelSelector = "".parse().unwrap();
        assert!(selector.is_empty());
        assert!(selector.matches(&labels(&[("anything", "goes")])));
    }

    #[test]
    fn test_from_labels_round_trips_through_display() {
        let selector = LabelSelector::from_labels(&labels(&[("app", "app"), ("component", "nodejs")]));
        assert_eq!(selector.to_string(), "app=app,component=nodejs");
        assert_eq!(selector.to_string().parse::<LabelSelector>().unwrap(), selector);
    }

    #[test]
    fn test_invalid_selectors_are_rejected() {
        assert!(matches!(
            "app in (a,b".parse::<LabelSelector>(),
            Err(ClusterError::InvalidRequest(_))
        ));
        assert!(matches!(
            "app within (a)".parse::<LabelSelector>(),
            Err(ClusterError::InvalidRequest(_))
        ));
        assert!(matches!(
            "=value".parse::<LabelSelector>(),
            Err(ClusterError::InvalidRequest(_))
        ));
    }
}
