//! Authentication schemes for the three credential shapes
//!
//! Each [`ApiFamily`] maps to one [`AuthScheme`]. Resolving a scheme against
//! [`Credentials`] yields an [`Auth`] value that carries exactly the secrets it
//! needs, so the dispatcher never branches on credential fields itself.

use mixpanel_domain::{ApiFamily, Credentials};
use reqwest::RequestBuilder;

use super::errors::ApiError;

/// Which credentials a request is signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Project token travels inside each record; no header.
    TokenEmbedded,
    /// HTTP Basic with the project secret as username and an empty password.
    ProjectSecret,
    /// HTTP Basic with the service-account username and secret.
    ServiceAccount,
}

impl AuthScheme {
    /// Default scheme for an API family.
    pub const fn for_family(family: ApiFamily) -> Self {
        match family {
            ApiFamily::Ingestion => Self::TokenEmbedded,
            ApiFamily::Query | ApiFamily::Export => Self::ProjectSecret,
            ApiFamily::ServiceAccount => Self::ServiceAccount,
        }
    }
}

/// Resolved authentication for one request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    TokenEmbedded,
    BasicSecret { secret: String },
    BasicServiceAccount { username: String, secret: String },
}

impl Auth {
    /// Pick the credentials `scheme` needs.
    ///
    /// Fails with [`ApiError::Config`] before any network call when a service
    /// account is required but not configured.
    pub fn resolve(scheme: AuthScheme, credentials: &Credentials) -> Result<Self, ApiError> {
        match scheme {
            AuthScheme::TokenEmbedded => Ok(Self::TokenEmbedded),
            AuthScheme::ProjectSecret => {
                Ok(Self::BasicSecret { secret: credentials.project_secret.clone() })
            }
            AuthScheme::ServiceAccount => {
                let account = credentials.require_service_account()?;
                Ok(Self::BasicServiceAccount {
                    username: account.username.clone(),
                    secret: account.secret.clone(),
                })
            }
        }
    }

    /// Attach the authorization header, if any.
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::TokenEmbedded => builder,
            Self::BasicSecret { secret } => builder.basic_auth(secret, None::<&str>),
            Self::BasicServiceAccount { username, secret } => {
                builder.basic_auth(username, Some(secret))
            }
        }
    }

    pub fn scheme(&self) -> AuthScheme {
        match self {
            Self::TokenEmbedded => AuthScheme::TokenEmbedded,
            Self::BasicSecret { .. } => AuthScheme::ProjectSecret,
            Self::BasicServiceAccount { .. } => AuthScheme::ServiceAccount,
        }
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenEmbedded => f.write_str("TokenEmbedded"),
            Self::BasicSecret { .. } => f.debug_struct("BasicSecret").field("secret", &"***").finish(),
            Self::BasicServiceAccount { username, .. } => f
                .debug_struct("BasicServiceAccount")
                .field("username", username)
                .field("secret", &"***")
                .finish(),
        }
    }
}
