//! Request processing for the webhook and manual update endpoints.
//!
//! Both functions are synchronous: they run the deployment to completion
//! and are meant to be called from a blocking task.

use gitdeploy_core::{Deploy, Outcome};

use crate::types::PushPayload;

/// Handle a Bitbucket push notification.
///
/// Checks, in order: the access key, that the body is a JSON object, that
/// the repository is registered, and that the push touches its branch.
pub fn process_webhook<D: Deploy + ?Sized>(
    deployer: &D,
    key: Option<&str>,
    body: &[u8],
) -> Outcome {
    if let Err(e) = deployer.authorize(key) {
        tracing::info!(error = %e, "webhook rejected");
        return Outcome::invalid_key();
    }

    let Some(payload) = parse_payload(body) else {
        tracing::info!("webhook body has no repository information");
        return Outcome::no_repository();
    };

    let id = payload.full_name().unwrap_or_default();
    let Some(repository) = deployer.registry().get(id) else {
        tracing::info!(id, "webhook for unknown repository");
        return Outcome::repository_not_found();
    };

    if !payload.targets_branch(repository.branch_name()) {
        tracing::info!(
            id,
            branch = repository.branch_name(),
            "push does not touch the tracked branch"
        );
        return Outcome::invalid_request();
    }

    tracing::info!(repository = %repository, "webhook initiated an update");
    finish(deployer.deploy(repository), repository.id())
}

/// Handle a manual update request for one repository id.
pub fn process_manual_update<D: Deploy + ?Sized>(
    deployer: &D,
    key: Option<&str>,
    id: Option<&str>,
) -> Outcome {
    if let Err(e) = deployer.authorize(key) {
        tracing::info!(error = %e, "manual update rejected");
        return Outcome::invalid_key();
    }

    let Some(id) = id else {
        tracing::info!("manual update without a repository id");
        return Outcome::no_repository();
    };

    let id = id.trim();
    let Some(repository) = deployer.registry().get(id) else {
        tracing::info!(id, "manual update for unknown repository");
        return Outcome::repository_not_found();
    };

    tracing::info!(repository = %repository, "manual update started");
    finish(deployer.deploy(repository), repository.id())
}

/// Parse a webhook body, accepting only JSON objects.
fn parse_payload(body: &[u8]) -> Option<PushPayload> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    if !value.is_object() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::debug!(error = %e, "unexpected webhook payload shape");
            None
        }
    }
}

fn finish(result: gitdeploy_core::Result<()>, id: &str) -> Outcome {
    match result {
        Ok(()) => {
            tracing::info!(id, "repository updated");
            Outcome::finished()
        }
        Err(e) => {
            tracing::error!(id, "{}", e.report());
            Outcome::exception(&e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_mocks::MockDeployer;
    use tracing_test::traced_test;

    const PUSH_MAIN: &str = r#"{
        "repository": { "full_name": "team/site" },
        "push": { "changes": [ { "new": { "type": "branch", "name": "main" } } ] }
    }"#;

    #[test]
    fn test_webhook_deploys_tracked_branch() {
        let deployer = MockDeployer::new();
        let outcome = process_webhook(&deployer, Some("s3cret"), PUSH_MAIN.as_bytes());

        assert_eq!(outcome, Outcome::finished());
        assert_eq!(outcome.code, 0);
        assert_eq!(deployer.deployed(), ["team/site"]);
    }

    #[test]
    fn test_webhook_wrong_key_skips_everything() {
        let deployer = MockDeployer::new();
        let outcome = process_webhook(&deployer, Some("nope"), PUSH_MAIN.as_bytes());

        assert_eq!(outcome.message, "Invalid key");
        assert_eq!(outcome.code, 1);
        assert!(deployer.deployed().is_empty());
    }

    #[test]
    fn test_webhook_missing_key() {
        let deployer = MockDeployer::new();
        assert_eq!(
            process_webhook(&deployer, None, PUSH_MAIN.as_bytes()),
            Outcome::invalid_key()
        );
    }

    #[test]
    fn test_webhook_body_must_be_an_object() {
        let deployer = MockDeployer::new();
        for body in ["", "not json", "[1, 2]", "\"team/site\""] {
            assert_eq!(
                process_webhook(&deployer, Some("s3cret"), body.as_bytes()),
                Outcome::no_repository(),
                "body: {body}"
            );
        }
    }

    #[test]
    fn test_webhook_unknown_repository() {
        let deployer = MockDeployer::new();
        let body = r#"{ "repository": { "full_name": "team/other" } }"#;
        assert_eq!(
            process_webhook(&deployer, Some("s3cret"), body.as_bytes()),
            Outcome::repository_not_found()
        );
        assert_eq!(
            process_webhook(&deployer, Some("s3cret"), b"{}"),
            Outcome::repository_not_found()
        );
    }

    #[test]
    fn test_webhook_other_branch_is_invalid_request() {
        let deployer = MockDeployer::new();
        let body = r#"{
            "repository": { "full_name": "team/site" },
            "push": { "changes": [ { "new": { "type": "branch", "name": "dev" } } ] }
        }"#;

        let outcome = process_webhook(&deployer, Some("s3cret"), body.as_bytes());

        assert_eq!(outcome.message, "Invalid request!");
        assert_eq!(outcome.code, 1);
        assert!(deployer.deployed().is_empty());
    }

    #[test]
    fn test_webhook_without_changes_deploys() {
        let deployer = MockDeployer::new();
        let body = r#"{ "repository": { "full_name": "team/site" } }"#;
        assert!(process_webhook(&deployer, Some("s3cret"), body.as_bytes()).is_success());
    }

    #[test]
    fn test_webhook_deploy_failure() {
        let deployer = MockDeployer::failing();
        let outcome = process_webhook(&deployer, Some("s3cret"), PUSH_MAIN.as_bytes());

        assert_eq!(outcome.message, "Exception! error when pulling: git pull");
        assert_eq!(outcome.code, 1);
    }

    #[test]
    #[traced_test]
    fn test_deploy_failure_is_logged_once_with_output() {
        let deployer = MockDeployer::failing();
        process_manual_update(&deployer, Some("s3cret"), Some("team/site"));

        logs_assert(|lines: &[&str]| {
            let hits = lines
                .iter()
                .filter(|line| line.contains("error when pulling: git pull"))
                .count();
            if hits != 1 {
                return Err(format!("expected one failure log line, found {hits}"));
            }
            Ok(())
        });
        assert!(logs_contain("The command returned 1."));
    }

    #[test]
    fn test_manual_update_trims_id() {
        let deployer = MockDeployer::new();
        let outcome = process_manual_update(&deployer, Some("s3cret"), Some("  team/site\n"));

        assert_eq!(outcome, Outcome::finished());
        assert_eq!(deployer.deployed(), ["team/site"]);
    }

    #[test]
    fn test_manual_update_rejections() {
        let deployer = MockDeployer::new();
        assert_eq!(
            process_manual_update(&deployer, Some("bad"), Some("team/site")),
            Outcome::invalid_key()
        );
        assert_eq!(
            process_manual_update(&deployer, Some("s3cret"), None),
            Outcome::no_repository()
        );
        assert_eq!(
            process_manual_update(&deployer, Some("s3cret"), Some("team/none")),
            Outcome::repository_not_found()
        );
        assert!(deployer.deployed().is_empty());
    }

    #[test]
    fn test_manual_update_failure() {
        let deployer = MockDeployer::failing();
        let outcome = process_manual_update(&deployer, Some("s3cret"), Some("team/site"));
        assert!(!outcome.is_success());
        assert!(outcome.message.starts_with("Exception! "));
    }
}
