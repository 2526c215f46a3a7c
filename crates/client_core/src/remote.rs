use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    domain::UserId,
    protocol::{UserFields, UserRecord},
};
use tracing::debug;
use url::Url;

/// The remote users resource. The controller only ever talks to it through
/// this trait.
#[async_trait]
pub trait UsersRemote: Send + Sync {
    async fn list(&self) -> Result<Vec<UserRecord>>;
    async fn update(&self, id: UserId, fields: &UserFields) -> Result<()>;
    async fn create(&self, fields: &UserFields) -> Result<UserRecord>;
    async fn delete(&self, id: UserId) -> Result<()>;
}

/// `UsersRemote` over a REST endpoint rooted at `<base_url>/users`.
pub struct HttpUsersRemote {
    http: Client,
    base_url: Url,
}

impl HttpUsersRemote {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid users service url '{base_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to build url for '{path}'"))
    }
}

#[async_trait]
impl UsersRemote for HttpUsersRemote {
    async fn list(&self) -> Result<Vec<UserRecord>> {
        let users = self
            .http
            .get(self.endpoint("users")?)
            .send()
            .await
            .context("failed to reach users service")?
            .error_for_status()
            .context("users listing rejected")?
            .json()
            .await
            .context("malformed users listing")?;
        Ok(users)
    }

    async fn update(&self, id: UserId, fields: &UserFields) -> Result<()> {
        let res = self
            .http
            .patch(self.endpoint(&format!("users/{id}"))?)
            .json(fields)
            .send()
            .await
            .with_context(|| format!("failed to reach users service updating user {id}"))?
            .error_for_status()
            .with_context(|| format!("update of user {id} rejected"))?;
        match res.json::<Value>().await {
            Ok(body) => debug!(user_id = id.0, %body, "update acknowledged"),
            Err(err) => debug!(user_id = id.0, error = %err, "update acknowledged without json body"),
        }
        Ok(())
    }

    async fn create(&self, fields: &UserFields) -> Result<UserRecord> {
        let created = self
            .http
            .post(self.endpoint("users")?)
            .json(fields)
            .send()
            .await
            .context("failed to reach users service creating user")?
            .error_for_status()
            .context("user creation rejected")?
            .json()
            .await
            .context("malformed created user")?;
        Ok(created)
    }

    async fn delete(&self, id: UserId) -> Result<()> {
        self.http
            .delete(self.endpoint(&format!("users/{id}"))?)
            .send()
            .await
            .with_context(|| format!("failed to reach users service deleting user {id}"))?
            .error_for_status()
            .with_context(|| format!("delete of user {id} rejected"))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
