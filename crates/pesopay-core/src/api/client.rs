//! API client for communicating with the PesoPay backend REST API.
//!
//! Every request helper applies the two session interceptors: outgoing
//! requests pick up the bearer token from the [`SessionWatch`] when one
//! currently resolves, and any 401 response clears the session before the
//! error reaches the caller.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::SessionWatch;
use crate::models::{LinkedAccount, LinkedCard, NewAccount, NewCard, UserProfile};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow mobile networks while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A successful authentication response: the issued token plus the profile
/// the backend returned alongside it.
#[derive(Debug, Clone)]
pub struct AuthSuccess {
    pub token: String,
    pub user: UserProfile,
}

/// Parsed signup response. The backend either issues a token immediately
/// (legacy path) or opens a pending verification session identified by
/// `user_id`.
#[derive(Debug, Clone)]
pub struct SignupReply {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub user_id: Option<String>,
    pub email: Option<String>,
}

/// API client for the PesoPay backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionWatch,
}

impl ApiClient {
    /// Create a new API client against `base_url`, reading tokens through
    /// `session`.
    pub fn new(base_url: impl Into<String>, session: SessionWatch) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer header for the current session, when a token resolves.
    ///
    /// Absent, expired, or unreadable sessions send the request
    /// unauthenticated; the backend's rejection then flows back through the
    /// normal response path.
    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.current_token() {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(e) => warn!(error = %e, "Skipping malformed bearer token"),
            }
        }
        headers
    }

    /// Check if the response is successful, turning failures into ApiError.
    /// A 401 invalidates the session before the error propagates.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
        }
        Err(ApiError::from_status(status, &body))
    }

    /// Coarse 401 policy: drop the whole session, no refresh, no retry.
    ///
    /// A concurrent login may land between the 401 and the clear; the race
    /// is resolved conservatively by clearing whatever reappeared.
    fn handle_unauthorized(&self) {
        debug!("Unauthorized response, invalidating session");
        self.session.invalidate();
        if self.session.current_token().is_some() {
            warn!("Token present after invalidation, clearing again");
            self.session.invalidate();
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.headers(self.auth_headers()).send().await?;
        self.check_response(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        Self::parse(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.client.post(self.url(path)).json(body))
            .await?;
        Self::parse(response).await
    }

    async fn post_no_content<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(self.client.post(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.client.patch(self.url(path)).json(body))
            .await?;
        Self::parse(response).await
    }

    async fn patch_no_content<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(self.client.patch(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    async fn delete_no_content(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(path))).await?;
        Ok(())
    }

    // ===== Auth Endpoints =====

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, ApiError> {
        let body = json!({ "email": email, "password": password });
        let envelope: AuthEnvelope = self.post("/auth/login", &body).await?;
        Ok(AuthSuccess {
            token: envelope.token,
            user: envelope.data.user,
        })
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupReply, ApiError> {
        let body = json!({ "name": name, "email": email, "password": password });
        let envelope: SignupEnvelope = self.post("/auth/signup", &body).await?;
        let data = envelope.data.unwrap_or_default();
        Ok(SignupReply {
            token: envelope.token,
            user: data.user,
            user_id: data.user_id,
            email: data.email,
        })
    }

    pub async fn verify_otp(&self, user_id: &str, otp: &str) -> Result<AuthSuccess, ApiError> {
        let body = json!({ "userId": user_id, "otp": otp });
        let envelope: AuthEnvelope = self.post("/auth/verify-otp", &body).await?;
        Ok(AuthSuccess {
            token: envelope.token,
            user: envelope.data.user,
        })
    }

    pub async fn resend_otp(&self, user_id: &str) -> Result<(), ApiError> {
        let body = json!({ "userId": user_id });
        self.post_no_content("/auth/resend-otp", &body).await
    }

    /// Exchange a Google-issued ID token for a PesoPay session.
    /// Obtaining the provider token is the shell's job.
    pub async fn google_login(&self, provider_token: &str) -> Result<AuthSuccess, ApiError> {
        let body = json!({ "token": provider_token });
        let envelope: AuthEnvelope = self.post("/auth/google", &body).await?;
        Ok(AuthSuccess {
            token: envelope.token,
            user: envelope.data.user,
        })
    }

    // ===== User Endpoints =====

    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        let envelope: ProfileEnvelope = self.get("/users/profile").await?;
        Ok(envelope.data.user)
    }

    pub async fn update_profile(&self, name: &str) -> Result<UserProfile, ApiError> {
        let body = json!({ "name": name });
        let envelope: ProfileEnvelope = self.patch("/users/profile", &body).await?;
        Ok(envelope.data.user)
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let body = json!({
            "currentPassword": current_password,
            "newPassword": new_password,
        });
        self.patch_no_content("/users/change-password", &body).await
    }

    // ===== Wallet Endpoints =====

    pub async fn fetch_cards(&self) -> Result<Vec<LinkedCard>, ApiError> {
        let envelope: CardsEnvelope = self.get("/pesopay/cards").await?;
        Ok(envelope.data.cards)
    }

    pub async fn add_card(&self, card: &NewCard) -> Result<LinkedCard, ApiError> {
        let envelope: CardEnvelope = self.post("/pesopay/cards", card).await?;
        Ok(envelope.data.card)
    }

    pub async fn set_default_card(&self, card_id: &str) -> Result<(), ApiError> {
        self.patch_no_content(&format!("/pesopay/cards/{}/default", card_id), &json!({}))
            .await
    }

    pub async fn delete_card(&self, card_id: &str) -> Result<(), ApiError> {
        self.delete_no_content(&format!("/pesopay/cards/{}", card_id))
            .await
    }

    pub async fn fetch_accounts(&self) -> Result<Vec<LinkedAccount>, ApiError> {
        let envelope: AccountsEnvelope = self.get("/pesopay/accounts").await?;
        Ok(envelope.data.accounts)
    }

    pub async fn add_account(&self, account: &NewAccount) -> Result<LinkedAccount, ApiError> {
        let envelope: AccountEnvelope = self.post("/pesopay/accounts", account).await?;
        Ok(envelope.data.account)
    }

    pub async fn set_default_account(&self, account_id: &str) -> Result<(), ApiError> {
        self.patch_no_content(
            &format!("/pesopay/accounts/{}/default", account_id),
            &json!({}),
        )
        .await
    }

    pub async fn delete_account(&self, account_id: &str) -> Result<(), ApiError> {
        self.delete_no_content(&format!("/pesopay/accounts/{}", account_id))
            .await
    }
}

// Internal API response types for parsing

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    token: String,
    data: AuthData,
}

#[derive(Debug, Deserialize)]
struct AuthData {
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct SignupEnvelope {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    data: Option<SignupData>,
}

#[derive(Debug, Default, Deserialize)]
struct SignupData {
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    data: ProfileData,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct CardsEnvelope {
    data: CardsData,
}

#[derive(Debug, Deserialize)]
struct CardsData {
    cards: Vec<LinkedCard>,
}

#[derive(Debug, Deserialize)]
struct CardEnvelope {
    data: CardData,
}

#[derive(Debug, Deserialize)]
struct CardData {
    card: LinkedCard,
}

#[derive(Debug, Deserialize)]
struct AccountsEnvelope {
    data: AccountsData,
}

#[derive(Debug, Deserialize)]
struct AccountsData {
    accounts: Vec<LinkedAccount>,
}

#[derive(Debug, Deserialize)]
struct AccountEnvelope {
    data: AccountData,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    account: LinkedAccount,
}
