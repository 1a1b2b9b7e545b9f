//! Release creation through the `appcenter` command line tool
//!
//! The tool does the upload and attaches the first group. The release it
//! produced is then looked up as the app's latest release, and any further
//! groups are attached over the API.

use tracing::{debug, info};

use crate::app::App;
use crate::error::{AppCenterError, Result};
use crate::runner::{CommandRunner, APPCENTER_PROGRAM};
use crate::types::{Release, ReleaseOptions};

/// Arguments for `appcenter distribute release`
pub fn release_args(app_slug: &str, opts: &ReleaseOptions, first_group: &str, token: &str) -> Vec<String> {
    let mut args = vec![
        "distribute".to_string(),
        "release".to_string(),
        "--app".to_string(),
        app_slug.to_string(),
        "-f".to_string(),
        opts.file_path.display().to_string(),
        "-g".to_string(),
        first_group.to_string(),
    ];

    if let Some(build_number) = &opts.build_number {
        args.push("--build-number".to_string());
        args.push(build_number.clone());
    }
    if let Some(build_version) = &opts.build_version {
        args.push("--build-version".to_string());
        args.push(build_version.clone());
    }

    args.push("--token".to_string());
    args.push(token.to_string());
    args
}

impl App {
    /// Create a release with the `appcenter` tool instead of the upload API
    ///
    /// Requires at least one group name. The first group goes to the tool,
    /// the rest are attached afterwards.
    pub async fn create_release_with_cli(
        &self,
        runner: &dyn CommandRunner,
        opts: &ReleaseOptions,
    ) -> Result<Release> {
        let mut groups = opts.group_names.iter().filter(|g| !g.is_empty());
        let first_group = groups.next().ok_or_else(|| {
            AppCenterError::ConfigurationError(
                "at least one distribution group is required to release with the appcenter tool"
                    .to_string(),
            )
        })?;

        if !runner.is_available(APPCENTER_PROGRAM) {
            return Err(AppCenterError::ConfigurationError(format!(
                "`{}` was not found; install it or use the api upload mode",
                APPCENTER_PROGRAM
            )));
        }

        info!(app = %self.slug(), group = %first_group, "releasing with appcenter tool");
        let args = release_args(&self.slug(), opts, first_group, self.client().token());
        let output = runner.run(APPCENTER_PROGRAM, &args).await?;
        debug!(%output, "appcenter tool finished");

        let release = self.latest_release().await?;

        for name in groups {
            let group = self.group(name).await?;
            self.add_release_to_group(&group, release.id, opts).await?;
        }

        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use async_trait::async_trait;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        fail_with: Option<String>,
        missing: bool,
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        fn is_available(&self, _program: &str) -> bool {
            !self.missing
        }

        async fn run(&self, program: &str, args: &[String]) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            match &self.fail_with {
                Some(output) => Err(AppCenterError::CommandFailed {
                    command: program.to_string(),
                    output: output.clone(),
                }),
                None => Ok("Release 9 was successfully released".to_string()),
            }
        }
    }

    fn opts(groups: &[&str]) -> ReleaseOptions {
        ReleaseOptions {
            file_path: PathBuf::from("build/app.apk"),
            build_number: Some("17".to_string()),
            build_version: None,
            group_names: groups.iter().map(|g| g.to_string()).collect(),
            mandatory: true,
            notify_testers: false,
        }
    }

    #[test]
    fn test_release_args_layout() {
        let args = release_args("acme/app", &opts(&["beta"]), "beta", "secret");
        assert_eq!(
            args,
            vec![
                "distribute",
                "release",
                "--app",
                "acme/app",
                "-f",
                "build/app.apk",
                "-g",
                "beta",
                "--build-number",
                "17",
                "--token",
                "secret",
            ]
        );
    }

    #[tokio::test]
    async fn test_requires_a_group() {
        let app = Client::new("t").unwrap().app("acme", "app");
        let runner = FakeRunner::default();

        let err = app
            .create_release_with_cli(&runner, &opts(&["", ""]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppCenterError::ConfigurationError(_)));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_runs_tool_then_attaches_remaining_groups() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/v0.1/apps/acme/app/releases")
            .with_status(200)
            .with_body(json!([{"id": 9, "version": "17", "short_version": "1.0"}]).to_string())
            .create_async()
            .await;
        let _release = server
            .mock("GET", "/v0.1/apps/acme/app/releases/9")
            .with_status(200)
            .with_body(json!({"id": 9, "app_os": "Android", "version": "17"}).to_string())
            .create_async()
            .await;
        let _group = server
            .mock("GET", "/v0.1/apps/acme/app/distribution_groups/qa")
            .with_status(200)
            .with_body(json!({"id": "g-qa", "name": "qa"}).to_string())
            .create_async()
            .await;
        let attach = server
            .mock("POST", "/v0.1/apps/acme/app/releases/9/groups")
            .match_body(Matcher::Json(json!({
                "id": "g-qa",
                "mandatory_update": true,
                "notify_testers": false
            })))
            .with_status(201)
            .expect(1)
            .create_async()
            .await;

        let app = Client::builder("secret")
            .base_url(server.url())
            .build()
            .unwrap()
            .app("acme", "app");
        let runner = FakeRunner::default();

        let release = app
            .create_release_with_cli(&runner, &opts(&["beta", "", "qa"]))
            .await
            .unwrap();

        assert_eq!(release.id, 9);
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "appcenter");
        assert!(calls[0].1.windows(2).any(|w| w[0] == "-g" && w[1] == "beta"));
        assert_eq!(calls[0].1.last().map(String::as_str), Some("secret"));
        attach.assert_async().await;
    }

    #[tokio::test]
    async fn test_tool_failure_stops_before_api_calls() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/v0.1/apps/acme/app/releases")
            .expect(0)
            .create_async()
            .await;

        let app = Client::builder("secret")
            .base_url(server.url())
            .build()
            .unwrap()
            .app("acme", "app");
        let runner = FakeRunner {
            fail_with: Some("Error: unauthorized".to_string()),
            ..Default::default()
        };

        let err = app
            .create_release_with_cli(&runner, &opts(&["beta"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Error: unauthorized"));
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_tool_is_a_configuration_error() {
        let app = Client::new("t").unwrap().app("acme", "app");
        let runner = FakeRunner {
            missing: true,
            ..Default::default()
        };

        let err = app
            .create_release_with_cli(&runner, &opts(&["beta"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppCenterError::ConfigurationError(_)));
        assert!(err.to_string().contains("appcenter"));
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    async fn attach_never_called(server: &mut Server) -> mockito::Mock {
        server
            .mock("POST", Matcher::Regex(r"^/v0\.1/apps/acme/app/releases/\d+/groups$".to_string()))
            .expect(0)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_release_list_failure_after_tool_success() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/v0.1/apps/acme/app/releases")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;
        let attach = attach_never_called(&mut server).await;

        let app = Client::builder("secret")
            .base_url(server.url())
            .build()
            .unwrap()
            .app("acme", "app");
        let runner = FakeRunner::default();

        let err = app
            .create_release_with_cli(&runner, &opts(&["beta", "qa"]))
            .await
            .unwrap_err();

        match err {
            AppCenterError::UnexpectedStatus { status, url, .. } => {
                assert_eq!(status, 503);
                assert!(url.ends_with("/v0.1/apps/acme/app/releases"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(runner.calls.lock().unwrap().len(), 1);
        attach.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_release_list_after_tool_success() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/v0.1/apps/acme/app/releases")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let attach = attach_never_called(&mut server).await;

        let app = Client::builder("secret")
            .base_url(server.url())
            .build()
            .unwrap()
            .app("acme", "app");

        let err = app
            .create_release_with_cli(&FakeRunner::default(), &opts(&["beta", "qa"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppCenterError::ReleaseNotFound(_)), "{}", err);
        attach.assert_async().await;
    }
}
