use colored::Colorize;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Template Method pattern: one login skeleton, many identity providers
//
// `authenticate` is the template: validate -> exchange -> build profile ->
// issue token -> open session -> notify. Providers fill in the first
// three; the rest is shared.
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
enum FlowError {
    #[error("{provider}: missing {field}")]
    MissingField {
        provider: &'static str,
        field: &'static str,
    },

    #[error("{provider}: redirect uri does not match the registered one")]
    RedirectMismatch { provider: &'static str },

    #[error("{provider} rejected the grant: {detail}")]
    InvalidGrant {
        provider: &'static str,
        detail: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct ProviderIdentity {
    external_id: String,
    email: String,
    display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Profile {
    provider: &'static str,
    external_id: String,
    email: String,
    display_name: String,
}

#[derive(Debug, Clone)]
struct AuthSession {
    profile: Profile,
    token: String,
    session: Uuid,
}

trait AuthFlow {
    type Credentials;

    fn provider(&self) -> &'static str;
    fn validate(&self, credentials: &Self::Credentials) -> Result<(), FlowError>;
    fn exchange(&self, credentials: &Self::Credentials) -> Result<ProviderIdentity, FlowError>;

    /// The template method. The per-provider hooks are everything above;
    /// token, session and notifications are shared below.
    fn authenticate(&self, credentials: Self::Credentials) -> Result<AuthSession, FlowError> {
        println!("authenticating via {}", self.provider());

        self.validate(&credentials)?;
        println!("  credentials look sane");

        let identity = self.exchange(&credentials)?;
        println!("  provider vouched for {}", identity.external_id);

        let profile = self.build_profile(identity);
        let token = self.issue_token(&profile);
        let session = self.open_session(&profile, &token);
        self.notify(&profile);

        println!("{} signed in {}", "ok".green(), profile.email);
        Ok(AuthSession {
            profile,
            token,
            session,
        })
    }

    // Shared steps. Providers may override, none of the demo ones need to.

    fn build_profile(&self, identity: ProviderIdentity) -> Profile {
        Profile {
            provider: self.provider(),
            external_id: identity.external_id,
            email: identity.email.to_lowercase(),
            display_name: identity.display_name,
        }
    }

    fn issue_token(&self, profile: &Profile) -> String {
        let token = format!("{}-{}", self.provider(), Uuid::new_v4());
        println!("  token issued for {}", profile.email);
        token
    }

    fn open_session(&self, profile: &Profile, _token: &str) -> Uuid {
        let session = Uuid::new_v4();
        println!("  session {session} opened for {}", profile.external_id);
        session
    }

    fn notify(&self, profile: &Profile) {
        println!("  welcome email -> {}", profile.email);
        println!("  admin feed -> new {} sign-in", self.provider());
    }
}

// =============================================================================
// Provider: authorization-code flow with a registered redirect
// =============================================================================

struct AuthCode {
    code: String,
    redirect_uri: String,
}

struct GoogleFlow {
    redirect_uri: String,
}

impl AuthFlow for GoogleFlow {
    type Credentials = AuthCode;

    fn provider(&self) -> &'static str {
        "google"
    }

    fn validate(&self, credentials: &AuthCode) -> Result<(), FlowError> {
        if credentials.code.is_empty() {
            return Err(FlowError::MissingField {
                provider: self.provider(),
                field: "code",
            });
        }
        if credentials.redirect_uri != self.redirect_uri {
            return Err(FlowError::RedirectMismatch {
                provider: self.provider(),
            });
        }
        Ok(())
    }

    fn exchange(&self, credentials: &AuthCode) -> Result<ProviderIdentity, FlowError> {
        // a real flow would call the token endpoint; the demo accepts
        // codes carrying the provider prefix
        let user = credentials.code.strip_prefix("google-").ok_or_else(|| {
            FlowError::InvalidGrant {
                provider: self.provider(),
                detail: "authorization code was not issued by google".to_string(),
            }
        })?;
        Ok(ProviderIdentity {
            external_id: format!("g-{user}"),
            email: format!("{user}@Gmail.example"),
            display_name: user.to_string(),
        })
    }
}

// =============================================================================
// Provider: long-lived access token
// =============================================================================

struct AccessToken {
    token: String,
}

struct FacebookFlow;

const FB_TOKEN_MIN_LEN: usize = 10;

impl AuthFlow for FacebookFlow {
    type Credentials = AccessToken;

    fn provider(&self) -> &'static str {
        "facebook"
    }

    fn validate(&self, credentials: &AccessToken) -> Result<(), FlowError> {
        if credentials.token.len() < FB_TOKEN_MIN_LEN {
            return Err(FlowError::MissingField {
                provider: self.provider(),
                field: "access token",
            });
        }
        Ok(())
    }

    fn exchange(&self, credentials: &AccessToken) -> Result<ProviderIdentity, FlowError> {
        let user = credentials.token.strip_prefix("fb-").ok_or_else(|| {
            FlowError::InvalidGrant {
                provider: self.provider(),
                detail: "token failed introspection".to_string(),
            }
        })?;
        Ok(ProviderIdentity {
            external_id: format!("fb:{user}"),
            email: format!("{user}@facebook.example"),
            display_name: user.to_string(),
        })
    }
}

// =============================================================================
// Provider: authorization code without redirect pinning
// =============================================================================

struct GithubFlow;

impl AuthFlow for GithubFlow {
    type Credentials = AuthCode;

    fn provider(&self) -> &'static str {
        "github"
    }

    fn validate(&self, credentials: &AuthCode) -> Result<(), FlowError> {
        if credentials.code.is_empty() {
            return Err(FlowError::MissingField {
                provider: self.provider(),
                field: "code",
            });
        }
        Ok(())
    }

    fn exchange(&self, credentials: &AuthCode) -> Result<ProviderIdentity, FlowError> {
        let user = credentials.code.strip_prefix("gh-").ok_or_else(|| {
            FlowError::InvalidGrant {
                provider: self.provider(),
                detail: "bad verification code".to_string(),
            }
        })?;
        Ok(ProviderIdentity {
            external_id: format!("github/{user}"),
            email: format!("{user}@users.github.example"),
            display_name: user.to_string(),
        })
    }
}

// =============================================================================
// Demo (cargo run)
// =============================================================================

const REDIRECT: &str = "https://app.example/callback";

fn main() {
    println!("== Three providers, one skeleton ==");
    let google = GoogleFlow {
        redirect_uri: REDIRECT.to_string(),
    };
    google
        .authenticate(AuthCode {
            code: "google-joana".to_string(),
            redirect_uri: REDIRECT.to_string(),
        })
        .unwrap();

    println!();
    FacebookFlow
        .authenticate(AccessToken {
            token: "fb-marcos-reis".to_string(),
        })
        .unwrap();

    println!();
    GithubFlow
        .authenticate(AuthCode {
            code: "gh-pedro".to_string(),
            redirect_uri: String::new(),
        })
        .unwrap();

    println!("\n== Each hook can refuse ==");
    let failures: [FlowError; 3] = [
        google
            .authenticate(AuthCode {
                code: "google-joana".to_string(),
                redirect_uri: "https://evil.example/cb".to_string(),
            })
            .unwrap_err(),
        google
            .authenticate(AuthCode {
                code: "forged-code".to_string(),
                redirect_uri: REDIRECT.to_string(),
            })
            .unwrap_err(),
        FacebookFlow
            .authenticate(AccessToken {
                token: "short".to_string(),
            })
            .unwrap_err(),
    ];
    for err in failures {
        println!("{} {err}", "refused:".red());
    }
}

// =============================================================================
// Tests (cargo test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn google() -> GoogleFlow {
        GoogleFlow {
            redirect_uri: REDIRECT.to_string(),
        }
    }

    #[test]
    fn google_happy_path() {
        let session = google()
            .authenticate(AuthCode {
                code: "google-ana".to_string(),
                redirect_uri: REDIRECT.to_string(),
            })
            .unwrap();
        assert_eq!(session.profile.provider, "google");
        assert_eq!(session.profile.external_id, "g-ana");
        assert!(session.token.starts_with("google-"));
    }

    #[test]
    fn profile_email_is_normalized_by_the_shared_step() {
        let session = google()
            .authenticate(AuthCode {
                code: "google-Ana".to_string(),
                redirect_uri: REDIRECT.to_string(),
            })
            .unwrap();
        assert_eq!(session.profile.email, "ana@gmail.example");
    }

    #[test]
    fn google_pins_the_redirect() {
        let err = google()
            .authenticate(AuthCode {
                code: "google-ana".to_string(),
                redirect_uri: "https://elsewhere".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, FlowError::RedirectMismatch { provider: "google" });
    }

    #[test]
    fn empty_code_is_caught_by_validation() {
        let err = google()
            .authenticate(AuthCode {
                code: String::new(),
                redirect_uri: REDIRECT.to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, FlowError::MissingField { field: "code", .. }));
    }

    #[test]
    fn foreign_code_fails_the_exchange() {
        let err = google()
            .authenticate(AuthCode {
                code: "gh-ana".to_string(),
                redirect_uri: REDIRECT.to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidGrant { provider: "google", .. }));
    }

    #[test]
    fn facebook_token_length_gate() {
        let err = FacebookFlow
            .authenticate(AccessToken {
                token: "fb-x".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, FlowError::MissingField { .. }));
    }

    #[test]
    fn github_flow_ignores_redirect() {
        let session = GithubFlow
            .authenticate(AuthCode {
                code: "gh-octo".to_string(),
                redirect_uri: String::new(),
            })
            .unwrap();
        assert_eq!(session.profile.external_id, "github/octo");
    }

    #[test]
    fn tokens_and_sessions_are_unique_per_login() {
        let first = FacebookFlow
            .authenticate(AccessToken {
                token: "fb-same-user".to_string(),
            })
            .unwrap();
        let second = FacebookFlow
            .authenticate(AccessToken {
                token: "fb-same-user".to_string(),
            })
            .unwrap();
        assert_eq!(first.profile, second.profile);
        assert_ne!(first.token, second.token);
        assert_ne!(first.session, second.session);
    }
}
