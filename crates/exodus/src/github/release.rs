//! Release creation, asset upload, and collaborator grants.

use crate::migrate::{FileAsset, ReleaseDraft};
use crate::transport::Method;

use super::client::{GitHubClient, JSON_ACCEPT};
use super::error::GitHubError;
use super::types::CreatedRelease;

impl GitHubClient {
    /// Create a release from a draft and return the handle needed to
    /// upload its assets.
    pub async fn create_release(&self, draft: &ReleaseDraft) -> Result<CreatedRelease, GitHubError> {
        let body = serde_json::to_vec(draft)?;
        let request = self
            .authed(Method::Post, self.repo_url("/releases"), JSON_ACCEPT)
            .header("Content-Type", "application/json")
            .body(body);

        let response = self.send_checked(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Upload one asset to a created release.
    ///
    /// The content type is a best-effort guess from the file extension;
    /// the stored name is the asset's original file name.
    pub async fn upload_asset(
        &self,
        release: &CreatedRelease,
        asset: &FileAsset,
    ) -> Result<(), GitHubError> {
        let name: String = url::form_urlencoded::byte_serialize(asset.name.as_bytes()).collect();
        let url = format!("{}?name={}", release.upload_endpoint(), name);

        let request = self
            .authed(Method::Post, url, JSON_ACCEPT)
            .header("Content-Type", format!("application/{}", asset.extension))
            .body(asset.data.clone());

        self.send_checked(request).await?;
        Ok(())
    }

    /// Grant one source developer access to the repository.
    pub async fn add_collaborator(&self, username: &str) -> Result<(), GitHubError> {
        let request = self.authed(
            Method::Put,
            self.repo_url(&format!("/collaborators/{username}")),
            JSON_ACCEPT,
        );
        self.send_checked(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::transport::canned::CannedTransport;

    use super::*;

    fn client(transport: &CannedTransport) -> GitHubClient {
        GitHubClient::with_transport(
            "https://api.github.com",
            "octo",
            "migrated",
            "t0ken",
            Arc::new(transport.clone()),
        )
    }

    fn draft(tag: &str) -> ReleaseDraft {
        ReleaseDraft {
            tag_name: tag.to_string(),
            target_commitish: "master".to_string(),
            name: format!("release {tag}"),
            body: "notes".to_string(),
            prerelease: false,
            draft: false,
        }
    }

    #[tokio::test]
    async fn create_release_posts_the_draft_and_parses_the_handle() {
        let transport = CannedTransport::new();
        transport.reply_json(
            Method::Post,
            "https://api.github.com/repos/octo/migrated/releases",
            201,
            json!({
                "id": 77,
                "upload_url": "https://uploads.example.com/repos/octo/migrated/releases/77/assets{?name,label}",
            }),
        );

        let created = client(&transport).create_release(&draft("1.0")).await.unwrap();
        assert_eq!(created.id, 77);
        assert_eq!(
            created.upload_endpoint(),
            "https://uploads.example.com/repos/octo/migrated/releases/77/assets"
        );

        let seen = transport.seen();
        let body: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
        assert_eq!(body["tag_name"], "1.0");
        assert_eq!(body["target_commitish"], "master");
    }

    #[tokio::test]
    async fn upload_asset_sets_name_and_extension_content_type() {
        let transport = CannedTransport::new();
        transport.reply_json(
            Method::Post,
            "https://uploads.example.com/assets?name=D2Coding.zip",
            201,
            json!({"id": 1}),
        );

        let release = CreatedRelease {
            id: 77,
            upload_url: "https://uploads.example.com/assets{?name,label}".to_string(),
        };
        let asset = FileAsset {
            id: "99".to_string(),
            name: "D2Coding.zip".to_string(),
            extension: "zip".to_string(),
            data: vec![1, 2, 3],
        };

        client(&transport).upload_asset(&release, &asset).await.unwrap();

        let seen = transport.seen();
        assert_eq!(seen[0].header_value("content-type"), Some("application/zip"));
        assert_eq!(seen[0].body, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn upload_asset_percent_encodes_the_file_name() {
        let transport = CannedTransport::new();
        transport.reply_json(
            Method::Post,
            "https://uploads.example.com/assets?name=my+font.zip",
            201,
            json!({"id": 1}),
        );

        let release = CreatedRelease {
            id: 77,
            upload_url: "https://uploads.example.com/assets".to_string(),
        };
        let asset = FileAsset {
            id: "99".to_string(),
            name: "my font.zip".to_string(),
            extension: "zip".to_string(),
            data: Vec::new(),
        };

        client(&transport).upload_asset(&release, &asset).await.unwrap();
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn add_collaborator_puts_the_username() {
        let transport = CannedTransport::new();
        transport.reply(
            Method::Put,
            "https://api.github.com/repos/octo/migrated/collaborators/alice",
            204,
            b"",
        );

        client(&transport).add_collaborator("alice").await.unwrap();
        assert_eq!(transport.seen().len(), 1);
    }

    #[tokio::test]
    async fn failed_release_creation_surfaces_the_api_error() {
        let transport = CannedTransport::new();
        transport.reply(
            Method::Post,
            "https://api.github.com/repos/octo/migrated/releases",
            422,
            br#"{"message":"Validation Failed: already_exists"}"#,
        );

        let err = client(&transport)
            .create_release(&draft("1.0"))
            .await
            .expect_err("422 must propagate");
        match err {
            GitHubError::Api { status, message } => {
                assert_eq!(status, 422);
                assert!(message.contains("already_exists"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
