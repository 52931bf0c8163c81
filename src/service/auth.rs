use crate::database::user::{UserRepository, dummy_verify, verify_against_hash};
use crate::error::app_error::AppError;
use crate::models::user::{Identity, RegisterRequest, Role, User};
use crate::service::github::GitHubProfile;
use tracing::info;

/// The three named authentication strategies. Each resolves to an
/// `Identity` on success; failures surface as typed errors the handlers map
/// onto the failure endpoints' responses.
pub struct AuthService<'a, R> {
    repo: &'a R,
}

impl<'a, R: UserRepository> AuthService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        AuthService { repo }
    }

    /// Local registration. Field presence is validated at the route
    /// boundary; here the email must be unused. New accounts always start
    /// with role USER.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AppError> {
        if self.repo.get_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::DuplicateEmail(request.email.clone()));
        }

        let user = self.repo.create_user(&request.name, &request.email, &request.password, Role::User).await?;
        info!(email = %user.email, "user registered");
        Ok(user)
    }

    /// Local login. Unknown accounts and OAuth-only accounts burn a dummy
    /// verification so their timing matches a real mismatch.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let Some(user) = self.repo.get_user_by_email(email).await? else {
            dummy_verify(password);
            return Err(AppError::InvalidCredentials);
        };

        let Some(stored_hash) = user.password_hash.as_deref() else {
            dummy_verify(password);
            return Err(AppError::InvalidCredentials);
        };

        verify_against_hash(stored_hash, password)?;
        Ok(Identity::from(&user))
    }

    /// OAuth login. Looks up or implicitly creates the account by the
    /// provider-supplied email. The stored role is returned as-is: the
    /// provider never grants privileges.
    pub async fn oauth(&self, profile: &GitHubProfile) -> Result<Identity, AppError> {
        let email = profile
            .email
            .as_deref()
            .ok_or_else(|| AppError::OAuth("GitHub profile has no verified email".to_string()))?;

        let user = self.repo.upsert_oauth_user(&profile.login, email, &profile.id.to_string()).await?;
        info!(email = %user.email, "oauth login resolved");
        Ok(Identity::from(&user))
    }
}
