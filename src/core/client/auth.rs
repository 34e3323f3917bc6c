//! Cookie & crumb acquisition for Yahoo endpoints.

use crate::core::error::ProviderError;
use reqwest::header::SET_COOKIE;

impl super::YahooProvider {
    pub(crate) async fn ensure_credentials(&self) -> Result<(), ProviderError> {
        if self.state.read().await.crumb.is_some() {
            return Ok(());
        }

        // Only one task bootstraps; the rest wait here and then see the crumb.
        let _guard = self.credential_fetch_lock.lock().await;
        if self.state.read().await.crumb.is_some() {
            return Ok(());
        }

        self.get_cookie().await?;
        self.get_crumb_internal().await
    }

    pub(crate) async fn clear_crumb(&self) {
        self.state.write().await.crumb = None;
    }

    pub(crate) async fn crumb(&self) -> Option<String> {
        self.state.read().await.crumb.clone()
    }

    async fn get_cookie(&self) -> Result<(), ProviderError> {
        self.throttle(&self.cookie_url).await;
        let resp = self.http.get(self.cookie_url.clone()).send().await?;

        let cookie = resp
            .headers()
            .get(SET_COOKIE)
            .ok_or_else(|| ProviderError::Auth("no cookie received from consent endpoint".into()))?
            .to_str()
            .map_err(|_| ProviderError::Auth("invalid cookie header format".into()))?
            .to_string();

        self.state.write().await.cookie = Some(cookie);
        Ok(())
    }

    async fn get_crumb_internal(&self) -> Result<(), ProviderError> {
        if self.state.read().await.cookie.is_none() {
            return Err(ProviderError::Auth("cookie is missing, cannot get crumb".into()));
        }

        // The cookie jar already holds the consent cookie from `get_cookie`.
        self.throttle(&self.crumb_url).await;
        let resp = self.http.get(self.crumb_url.clone()).send().await?;
        let crumb = resp.text().await?;

        if crumb.is_empty() || crumb.contains('{') || crumb.contains('<') {
            return Err(ProviderError::Auth(format!("received invalid crumb: {crumb}")));
        }

        tracing::debug!("obtained crumb");
        self.state.write().await.crumb = Some(crumb);
        Ok(())
    }
}
