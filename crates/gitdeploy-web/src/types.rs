//! Request types: Bitbucket push payload and query strings.

use serde::Deserialize;

/// Change type Bitbucket reports for branch pushes.
pub const BRANCH_CHANGE: &str = "branch";

/// Bitbucket `repo:push` webhook body.
///
/// Only the fields the branch gate needs are modelled; everything else in
/// the payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    /// Repository the push went to.
    #[serde(default)]
    pub repository: Option<PushRepository>,

    /// Pushed changes.
    #[serde(default)]
    pub push: Option<Push>,
}

/// Repository section of a push payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushRepository {
    /// `owner/slug`, used as the registry id.
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Push section of a push payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Push {
    /// One entry per updated ref.
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// A single ref update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    /// State of the ref after the push; absent when the ref was deleted.
    #[serde(default)]
    pub new: Option<RefState>,
}

/// Ref type and name after a push.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefState {
    /// `branch`, `tag`, ...
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Ref name.
    #[serde(default)]
    pub name: String,
}

impl PushPayload {
    /// Registry id of the pushed repository.
    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.repository.as_ref()?.full_name.as_deref()
    }

    /// Whether this push should trigger a deployment of `branch`.
    ///
    /// A payload without changes always passes. Otherwise at least one
    /// change must update the branch itself.
    #[must_use]
    pub fn targets_branch(&self, branch: &str) -> bool {
        let changes = self.push.as_ref().map_or(&[][..], |p| p.changes.as_slice());
        changes.is_empty()
            || changes.iter().any(|change| {
                change
                    .new
                    .as_ref()
                    .is_some_and(|new| new.kind == BRANCH_CHANGE && new.name == branch)
            })
    }
}

/// Query string for the webhook endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

/// Query string for the manual update endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualUpdateQuery {
    pub key: Option<String>,
    pub id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(json: &str) -> PushPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_full_name() {
        let p = payload(r#"{ "repository": { "full_name": "team/site", "name": "site" } }"#);
        assert_eq!(p.full_name(), Some("team/site"));
        assert_eq!(payload("{}").full_name(), None);
    }

    #[test]
    fn test_gate_matches_branch() {
        let p = payload(
            r#"{ "push": { "changes": [
                { "new": { "type": "branch", "name": "dev" } },
                { "new": { "type": "branch", "name": "main" } }
            ] } }"#,
        );
        assert!(p.targets_branch("main"));
        assert!(p.targets_branch("dev"));
        assert!(!p.targets_branch("production"));
    }

    #[test]
    fn test_gate_ignores_tags_with_branch_name() {
        let p = payload(r#"{ "push": { "changes": [ { "new": { "type": "tag", "name": "main" } } ] } }"#);
        assert!(!p.targets_branch("main"));
    }

    #[test]
    fn test_gate_ignores_deleted_refs() {
        let p = payload(r#"{ "push": { "changes": [ { "new": null, "old": { "type": "branch", "name": "main" } } ] } }"#);
        assert!(!p.targets_branch("main"));
    }

    #[test]
    fn test_no_changes_pass_the_gate() {
        assert!(payload("{}").targets_branch("main"));
        assert!(payload(r#"{ "push": { "changes": [] } }"#).targets_branch("main"));
    }
}
