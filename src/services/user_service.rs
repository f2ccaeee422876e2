use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::{AuthFailure, InfraContext, ServiceError, ServiceResult};
use crate::auth::{self, Claims, TokenError, TokenIssuer, TokenKind, TokenPair};
use crate::context::Ctx;
use crate::database::{StoreError, UserStore};
use crate::domain::user::normalize_email;
use crate::domain::{SignInInput, SignUpInput, User};

/// Successful sign-up or sign-in
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenIssuer>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenIssuer>) -> Self {
        Self { users, tokens }
    }

    pub async fn sign_up(&self, ctx: &Ctx, input: SignUpInput) -> ServiceResult<AuthSession> {
        input.validate()?;
        let email = normalize_email(&input.email);
        let username = input.username.trim().to_string();

        let taken = ctx
            .run(self.users.exists_by_email_or_username(&email, &username))
            .await?
            .infra("check existing user")?;
        if taken {
            warn!(%email, %username, "sign-up refused: identity already registered");
            return Err(AuthFailure::DuplicateIdentity.into());
        }

        let password = input.password;
        let hash = ctx
            .run(tokio::task::spawn_blocking(move || auth::hash_password(&password)))
            .await?
            .infra("hash password")?
            .infra("hash password")?;

        let user = User::new(&email, &username, hash);
        match ctx.run(self.users.create(&user)).await? {
            Ok(()) => {}
            // lost a race with a concurrent sign-up
            Err(StoreError::Conflict(_)) => return Err(AuthFailure::DuplicateIdentity.into()),
            Err(e) => return Err(ServiceError::infrastructure("create user", e)),
        }

        info!(user_id = %user.id, "user registered");
        self.session(user)
    }

    pub async fn sign_in(&self, ctx: &Ctx, input: SignInInput) -> ServiceResult<AuthSession> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let user = ctx
            .run(self.users.find_by_email(&email))
            .await?
            .infra("load user")?
            .ok_or(AuthFailure::InvalidCredentials)?;

        let password = input.password;
        let stored = user.password_hash.clone();
        let verified = ctx
            .run(tokio::task::spawn_blocking(move || {
                auth::verify_password(&password, &stored)
            }))
            .await?
            .infra("verify password")?
            .infra("verify password")?;
        if !verified {
            warn!(user_id = %user.id, "sign-in refused: bad password");
            return Err(AuthFailure::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "user signed in");
        self.session(user)
    }

    /// Exchange a refresh token for a new pair; the user must still exist.
    pub async fn refresh(&self, ctx: &Ctx, refresh_token: &str) -> ServiceResult<TokenPair> {
        let claims = self
            .tokens
            .validate_kind(refresh_token, TokenKind::Refresh)
            .map_err(token_failure)?;

        let user = ctx
            .run(self.users.find_by_id(claims.user_id))
            .await?
            .infra("load user")?
            .ok_or(AuthFailure::InvalidToken)?;

        self.tokens
            .issue_pair(user.id, &user.email, &user.username)
            .infra("issue tokens")
    }

    /// Resolve a bearer token to its access claims
    pub fn authenticate(&self, access_token: &str) -> ServiceResult<Claims> {
        self.tokens
            .validate_kind(access_token, TokenKind::Access)
            .map_err(token_failure)
    }

    fn session(&self, user: User) -> ServiceResult<AuthSession> {
        let tokens = self
            .tokens
            .issue_pair(user.id, &user.email, &user.username)
            .infra("issue tokens")?;
        Ok(AuthSession { user, tokens })
    }
}

fn token_failure(err: TokenError) -> ServiceError {
    tracing::debug!(error = %err, "token rejected");
    AuthFailure::InvalidToken.into()
}
