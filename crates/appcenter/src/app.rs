//! App-scoped resource accessors
//!
//! Every call here is a single request with one accepted status code; any
//! other status becomes [`AppCenterError::UnexpectedStatus`].

use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::client::{Client, NO_BODY};
use crate::error::{AppCenterError, Result};
use crate::types::{Group, Release, ReleaseOptions, ReleaseSummary, Store};

/// An app identified by owner and name
#[derive(Debug, Clone)]
pub struct App {
    client: Client,
    owner: String,
    name: String,
}

#[derive(Serialize)]
struct GroupAssignment<'a> {
    id: &'a str,
    mandatory_update: bool,
    notify_testers: bool,
}

#[derive(Serialize)]
struct StoreAssignment<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct TesterAssignment<'a> {
    email: &'a str,
    mandatory_update: bool,
    notify_testers: bool,
}

#[derive(Serialize)]
struct ReleaseNotesUpdate<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    release_notes: &'a str,
}

impl App {
    pub fn new(client: Client, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client,
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `owner/name`, the form the `appcenter` tool expects
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        self.client.api_url(&self.owner, &self.name, segments)
    }

    /// Look up a distribution group by name
    pub async fn group(&self, name: &str) -> Result<Group> {
        let url = self.url(&["distribution_groups", name])?;
        debug!(app = %self.slug(), group = name, "fetching distribution group");
        self.client
            .fetch_json(Method::GET, url, NO_BODY, StatusCode::OK)
            .await
    }

    /// Look up a distribution store by name
    pub async fn store(&self, name: &str) -> Result<Store> {
        let url = self.url(&["distribution_stores", name])?;
        debug!(app = %self.slug(), store = name, "fetching distribution store");
        self.client
            .fetch_json(Method::GET, url, NO_BODY, StatusCode::OK)
            .await
    }

    /// Fetch a release by its numeric ID
    pub async fn release(&self, release_id: u64) -> Result<Release> {
        let url = self.url(&["releases", &release_id.to_string()])?;
        debug!(app = %self.slug(), release_id, "fetching release");
        self.client
            .fetch_json(Method::GET, url, NO_BODY, StatusCode::OK)
            .await
    }

    /// List releases, newest first
    pub async fn releases(&self) -> Result<Vec<ReleaseSummary>> {
        let url = self.url(&["releases"])?;
        self.client
            .fetch_json(Method::GET, url, NO_BODY, StatusCode::OK)
            .await
    }

    /// Fetch the full details of the most recent release
    pub async fn latest_release(&self) -> Result<Release> {
        let releases = self.releases().await?;
        let latest = releases.first().ok_or_else(|| {
            AppCenterError::ReleaseNotFound(format!("no releases for {}", self.slug()))
        })?;
        debug!(app = %self.slug(), release_id = latest.id, "latest release");
        self.release(latest.id).await
    }

    /// Distribute a release to a group
    pub async fn add_release_to_group(
        &self,
        group: &Group,
        release_id: u64,
        opts: &ReleaseOptions,
    ) -> Result<()> {
        let url = self.url(&["releases", &release_id.to_string(), "groups"])?;
        let body = GroupAssignment {
            id: &group.id,
            mandatory_update: opts.mandatory,
            notify_testers: opts.notify_testers,
        };

        self.client
            .send_expect(Method::POST, url, Some(&body), StatusCode::CREATED)
            .await?;

        info!(release_id, group = %group.name, "added release to group");
        Ok(())
    }

    /// Submit a release to a store
    pub async fn add_release_to_store(&self, store: &Store, release_id: u64) -> Result<()> {
        let url = self.url(&["releases", &release_id.to_string(), "stores"])?;
        let body = StoreAssignment { id: &store.id };

        self.client
            .send_expect(Method::POST, url, Some(&body), StatusCode::CREATED)
            .await?;

        info!(release_id, store = %store.name, "added release to store");
        Ok(())
    }

    /// Share a release with a single tester
    pub async fn add_tester_to_release(
        &self,
        email: &str,
        release_id: u64,
        opts: &ReleaseOptions,
    ) -> Result<()> {
        let url = self.url(&["releases", &release_id.to_string(), "testers"])?;
        let body = TesterAssignment {
            email,
            mandatory_update: opts.mandatory,
            notify_testers: opts.notify_testers,
        };

        self.client
            .send_expect(Method::POST, url, Some(&body), StatusCode::CREATED)
            .await?;

        info!(release_id, tester = email, "added tester to release");
        Ok(())
    }

    /// Replace a release's notes
    pub async fn set_release_notes(&self, notes: &str, release_id: u64) -> Result<()> {
        let url = self.url(&["releases", &release_id.to_string()])?;
        let body = ReleaseNotesUpdate {
            release_notes: notes,
        };

        self.client
            .send_expect(Method::PUT, url, Some(&body), StatusCode::OK)
            .await?;

        info!(release_id, "updated release notes");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn app_for(server: &Server) -> App {
        Client::builder("token")
            .base_url(server.url())
            .build()
            .unwrap()
            .app("owner", "app")
    }

    fn opts() -> ReleaseOptions {
        ReleaseOptions {
            mandatory: true,
            notify_testers: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_slug() {
        let app = Client::new("t").unwrap().app("acme", "android-beta");
        assert_eq!(app.slug(), "acme/android-beta");
    }

    #[tokio::test]
    async fn test_group_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.1/apps/owner/app/distribution_groups/qa-team")
            .with_status(200)
            .with_body(
                json!({
                    "id": "1b5b2c1e",
                    "name": "qa-team",
                    "display_name": "QA",
                    "origin": "appcenter",
                    "is_public": false
                })
                .to_string(),
            )
            .create_async()
            .await;

        let group = app_for(&server).group("qa-team").await.unwrap();
        assert_eq!(group.id, "1b5b2c1e");
        assert_eq!(group.display_name.as_deref(), Some("QA"));
    }

    #[tokio::test]
    async fn test_group_missing() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.1/apps/owner/app/distribution_groups/ghost")
            .with_status(404)
            .with_body(r#"{"code":"NotFound"}"#)
            .create_async()
            .await;

        let err = app_for(&server).group("ghost").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("/distribution_groups/ghost"));
    }

    #[tokio::test]
    async fn test_store_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.1/apps/owner/app/distribution_stores/Production")
            .with_status(200)
            .with_body(
                json!({"id": "s-9", "name": "Production", "type": "googleplay", "track": "production"})
                    .to_string(),
            )
            .create_async()
            .await;

        let store = app_for(&server).store("Production").await.unwrap();
        assert_eq!(store.id, "s-9");
        assert_eq!(store.track.as_deref(), Some("production"));
    }

    #[tokio::test]
    async fn test_store_unexpected_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.1/apps/owner/app/distribution_stores/Production")
            .with_status(403)
            .create_async()
            .await;

        let err = app_for(&server).store("Production").await.unwrap_err();
        assert!(matches!(err, AppCenterError::UnexpectedStatus { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_release_by_id() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.1/apps/owner/app/releases/12")
            .with_status(200)
            .with_body(
                json!({
                    "id": 12,
                    "app_name": "app",
                    "app_os": "Android",
                    "version": "120",
                    "short_version": "1.2.0",
                    "install_url": "https://install.appcenter.ms/x"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let release = app_for(&server).release(12).await.unwrap();
        assert_eq!(release.id, 12);
        assert!(release.is_android());
        assert_eq!(release.install_url.as_deref(), Some("https://install.appcenter.ms/x"));
    }

    #[tokio::test]
    async fn test_latest_release_uses_first_listed() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/v0.1/apps/owner/app/releases")
            .with_status(200)
            .with_body(json!([{"id": 31, "version": "31"}, {"id": 30, "version": "30"}]).to_string())
            .create_async()
            .await;
        let show = server
            .mock("GET", "/v0.1/apps/owner/app/releases/31")
            .with_status(200)
            .with_body(json!({"id": 31, "version": "31", "short_version": "3.1"}).to_string())
            .create_async()
            .await;

        let release = app_for(&server).latest_release().await.unwrap();
        assert_eq!(release.id, 31);
        list.assert_async().await;
        show.assert_async().await;
    }

    #[tokio::test]
    async fn test_latest_release_empty_list() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/v0.1/apps/owner/app/releases")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let err = app_for(&server).latest_release().await.unwrap_err();
        assert!(matches!(err, AppCenterError::ReleaseNotFound(_)));
    }

    #[tokio::test]
    async fn test_add_release_to_group() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v0.1/apps/owner/app/releases/5/groups")
            .match_body(Matcher::Json(json!({
                "id": "g-1",
                "mandatory_update": true,
                "notify_testers": false
            })))
            .with_status(201)
            .create_async()
            .await;

        let group = Group {
            id: "g-1".to_string(),
            name: "Beta".to_string(),
            ..Default::default()
        };
        app_for(&server)
            .add_release_to_group(&group, 5, &opts())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_release_to_group_rejects_200() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v0.1/apps/owner/app/releases/5/groups")
            .with_status(200)
            .create_async()
            .await;

        let group = Group::default();
        let err = app_for(&server)
            .add_release_to_group(&group, 5, &opts())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("200"));
    }

    #[tokio::test]
    async fn test_add_release_to_store() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v0.1/apps/owner/app/releases/5/stores")
            .match_body(Matcher::Json(json!({"id": "s-1"})))
            .with_status(201)
            .create_async()
            .await;

        let store = Store {
            id: "s-1".to_string(),
            ..Default::default()
        };
        app_for(&server).add_release_to_store(&store, 5).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_tester_created() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v0.1/apps/owner/app/releases/42/testers")
            .match_header("x-api-token", "token")
            .match_body(Matcher::Json(json!({
                "email": "tester@example.com",
                "mandatory_update": true,
                "notify_testers": false
            })))
            .with_status(201)
            .create_async()
            .await;

        app_for(&server)
            .add_tester_to_release("tester@example.com", 42, &opts())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_tester_server_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v0.1/apps/owner/app/releases/42/testers")
            .with_status(500)
            .create_async()
            .await;

        let err = app_for(&server)
            .add_tester_to_release("tester@example.com", 42, &opts())
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("500"), "{}", msg);
        assert!(msg.contains("42"), "{}", msg);
        assert!(msg.contains("/releases/42/testers"), "{}", msg);
    }

    #[tokio::test]
    async fn test_set_release_notes() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/v0.1/apps/owner/app/releases/8")
            .match_body(Matcher::Json(json!({"release_notes": "Fixed login crash"})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        app_for(&server)
            .set_release_notes("Fixed login crash", 8)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_release_notes_omits_empty() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/v0.1/apps/owner/app/releases/8")
            .match_body(Matcher::Json(json!({})))
            .with_status(200)
            .create_async()
            .await;

        app_for(&server).set_release_notes("", 8).await.unwrap();
        mock.assert_async().await;
    }
}
