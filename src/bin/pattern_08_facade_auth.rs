use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Facade pattern: one front door over six security subsystems
//
// Callers see `AuthFacade::login / validate_token / logout /
// check_permission`; the user store, credential checks, password
// verification, token lifecycle, audit log and permission table stay
// behind it.
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
enum AuthError {
    #[error("invalid credentials: {problems}")]
    InvalidCredentials { problems: String },

    #[error("no account for '{email}'")]
    UnknownUser { email: String },

    #[error("account '{email}' is deactivated")]
    InactiveAccount { email: String },

    #[error("wrong password")]
    WrongPassword,

    #[error("token not recognized")]
    UnknownToken,

    #[error("token expired")]
    ExpiredToken,

    #[error("no account with id '{user_id}'")]
    UnknownUserId { user_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Role {
    Admin,
    Moderator,
    User,
    Guest,
}

#[derive(Debug, Clone, PartialEq)]
struct Account {
    id: String,
    email: String,
    password_hash: String,
    role: Role,
    active: bool,
    last_login: Option<SystemTime>,
}

#[derive(Debug, Clone)]
struct Credentials {
    email: String,
    password: String,
    remember_me: bool,
}

// =============================================================================
// Subsystem: user store (seeded, in-memory)
// =============================================================================

struct UserStore {
    accounts: HashMap<String, Account>,
    sessions: HashMap<Uuid, String>,
}

impl UserStore {
    fn seeded() -> Self {
        let mut accounts = HashMap::new();
        for (id, email, password, role, active) in [
            ("u-1", "admin@example.com", "correct-horse", Role::Admin, true),
            ("u-2", "user@example.com", "battery-staple", Role::User, true),
            ("u-3", "ghost@example.com", "long-forgotten", Role::User, false),
        ] {
            accounts.insert(
                id.to_string(),
                Account {
                    id: id.to_string(),
                    email: email.to_string(),
                    password_hash: PasswordManager::hash(password),
                    role,
                    active,
                    last_login: None,
                },
            );
        }
        Self {
            accounts,
            sessions: HashMap::new(),
        }
    }

    fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.email == email)
    }

    fn find_by_id(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    fn touch_last_login(&mut self, id: &str, at: SystemTime) {
        if let Some(account) = self.accounts.get_mut(id) {
            account.last_login = Some(at);
        }
    }

    fn open_session(&mut self, user_id: &str) -> Uuid {
        let session = Uuid::new_v4();
        self.sessions.insert(session, user_id.to_string());
        session
    }

    fn close_sessions_for(&mut self, user_id: &str) {
        self.sessions.retain(|_, uid| uid != user_id);
    }
}

// =============================================================================
// Subsystem: credential validation
// =============================================================================

const PASSWORD_MIN_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex");
}

struct CredentialValidator;

impl CredentialValidator {
    fn email_ok(email: &str) -> bool {
        EMAIL_RE.is_match(email)
    }

    fn password_ok(password: &str) -> bool {
        password.len() >= PASSWORD_MIN_LEN
    }

    fn validate(credentials: &Credentials) -> Result<(), AuthError> {
        let mut problems = Vec::new();
        if !Self::email_ok(&credentials.email) {
            problems.push("email is malformed");
        }
        if !Self::password_ok(&credentials.password) {
            problems.push("password shorter than 8 characters");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials {
                problems: problems.join(", "),
            })
        }
    }
}

// =============================================================================
// Subsystem: password hashing (simulated, deterministic)
// =============================================================================

struct PasswordManager;

impl PasswordManager {
    fn hash(password: &str) -> String {
        // stand-in for a real KDF; the demo never stores plaintext
        format!("hashed::{}", password.chars().rev().collect::<String>())
    }

    fn verify(password: &str, hash: &str) -> bool {
        Self::hash(password) == hash
    }
}

// =============================================================================
// Subsystem: token lifecycle
// =============================================================================

struct IssuedToken {
    user_id: String,
    expires_at: SystemTime,
}

#[derive(Default)]
struct TokenManager {
    tokens: HashMap<String, IssuedToken>,
}

impl TokenManager {
    fn issue(&mut self, user_id: &str, ttl: Duration, now: SystemTime) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(
            token.clone(),
            IssuedToken {
                user_id: user_id.to_string(),
                expires_at: now + ttl,
            },
        );
        token
    }

    fn validate(&mut self, token: &str, now: SystemTime) -> Result<String, AuthError> {
        let issued = self.tokens.get(token).ok_or(AuthError::UnknownToken)?;
        if issued.expires_at < now {
            self.tokens.remove(token);
            return Err(AuthError::ExpiredToken);
        }
        Ok(issued.user_id.clone())
    }

    fn revoke(&mut self, token: &str) {
        self.tokens.remove(token);
    }

    fn revoke_all(&mut self, user_id: &str) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, issued| issued.user_id != user_id);
        before - self.tokens.len()
    }
}

// =============================================================================
// Subsystem: security audit log
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
struct AuditEntry {
    at: SystemTime,
    user_id: Option<String>,
    action: &'static str,
    outcome: Outcome,
}

#[derive(Default)]
struct SecurityLog {
    entries: Vec<AuditEntry>,
}

impl SecurityLog {
    fn record(&mut self, user_id: Option<&str>, action: &'static str, outcome: Outcome) {
        println!(
            "  [audit] {action} {} ({})",
            match outcome {
                Outcome::Success => "ok",
                Outcome::Failure => "failed",
            },
            user_id.unwrap_or("-")
        );
        self.entries.push(AuditEntry {
            at: SystemTime::now(),
            user_id: user_id.map(str::to_string),
            action,
            outcome,
        });
    }

    fn entries_for(&self, user_id: &str) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id))
            .collect()
    }
}

// =============================================================================
// Subsystem: permission table
// =============================================================================

struct PermissionTable {
    by_role: HashMap<Role, Vec<&'static str>>,
}

impl PermissionTable {
    fn new() -> Self {
        let mut by_role = HashMap::new();
        by_role.insert(Role::Admin, vec!["read", "write", "delete", "admin"]);
        by_role.insert(Role::Moderator, vec!["read", "write", "moderate"]);
        by_role.insert(Role::User, vec!["read", "write"]);
        by_role.insert(Role::Guest, vec!["read"]);
        Self { by_role }
    }

    fn allows(&self, role: Role, permission: &str) -> bool {
        self.by_role
            .get(&role)
            .map(|perms| perms.contains(&permission))
            .unwrap_or(false)
    }

    fn permissions_for(&self, role: Role) -> Vec<&'static str> {
        self.by_role.get(&role).cloned().unwrap_or_default()
    }
}

// =============================================================================
// The facade
// =============================================================================

const TTL_DEFAULT: Duration = Duration::from_secs(24 * 60 * 60);
const TTL_REMEMBERED: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug)]
struct LoginSession {
    user_id: String,
    email: String,
    role: Role,
    token: String,
    session: Uuid,
}

struct AuthFacade {
    store: UserStore,
    tokens: TokenManager,
    log: SecurityLog,
    permissions: PermissionTable,
}

impl AuthFacade {
    fn new() -> Self {
        Self {
            store: UserStore::seeded(),
            tokens: TokenManager::default(),
            log: SecurityLog::default(),
            permissions: PermissionTable::new(),
        }
    }

    fn login(&mut self, credentials: &Credentials) -> Result<LoginSession, AuthError> {
        println!("login attempt for {}", credentials.email);

        if let Err(err) = CredentialValidator::validate(credentials) {
            self.log.record(None, "login", Outcome::Failure);
            return Err(err);
        }

        let account = match self.store.find_by_email(&credentials.email) {
            Some(account) => account.clone(),
            None => {
                self.log.record(None, "login", Outcome::Failure);
                return Err(AuthError::UnknownUser {
                    email: credentials.email.clone(),
                });
            }
        };

        if !account.active {
            self.log.record(Some(&account.id), "login", Outcome::Failure);
            return Err(AuthError::InactiveAccount {
                email: account.email,
            });
        }

        if !PasswordManager::verify(&credentials.password, &account.password_hash) {
            self.log.record(Some(&account.id), "login", Outcome::Failure);
            return Err(AuthError::WrongPassword);
        }

        let now = SystemTime::now();
        self.store.touch_last_login(&account.id, now);

        let ttl = if credentials.remember_me {
            TTL_REMEMBERED
        } else {
            TTL_DEFAULT
        };
        let token = self.tokens.issue(&account.id, ttl, now);
        let session = self.store.open_session(&account.id);
        self.log.record(Some(&account.id), "login", Outcome::Success);

        Ok(LoginSession {
            user_id: account.id,
            email: account.email,
            role: account.role,
            token,
            session,
        })
    }

    fn validate_token(&mut self, token: &str) -> Result<Account, AuthError> {
        let user_id = self.tokens.validate(token, SystemTime::now())?;
        let account = self
            .store
            .find_by_id(&user_id)
            .ok_or(AuthError::UnknownUserId {
                user_id: user_id.clone(),
            })?;
        if !account.active {
            return Err(AuthError::InactiveAccount {
                email: account.email.clone(),
            });
        }
        Ok(account.clone())
    }

    fn logout(&mut self, token: &str) {
        if let Ok(user_id) = self.tokens.validate(token, SystemTime::now()) {
            self.store.close_sessions_for(&user_id);
            self.log.record(Some(&user_id), "logout", Outcome::Success);
        }
        self.tokens.revoke(token);
    }

    fn check_permission(&self, user_id: &str, permission: &str) -> bool {
        self.store
            .find_by_id(user_id)
            .map(|account| self.permissions.allows(account.role, permission))
            .unwrap_or(false)
    }

    fn permissions(&self, user_id: &str) -> Vec<&'static str> {
        self.store
            .find_by_id(user_id)
            .map(|account| self.permissions.permissions_for(account.role))
            .unwrap_or_default()
    }
}

// =============================================================================
// Demo (cargo run)
// =============================================================================

fn main() {
    let mut auth = AuthFacade::new();

    println!("== Login, token check, permissions, logout ==");
    let session = auth
        .login(&Credentials {
            email: "admin@example.com".to_string(),
            password: "correct-horse".to_string(),
            remember_me: true,
        })
        .unwrap();
    println!("{} logged in as {} ({:?})", "ok".green(), session.email, session.role);
    println!("session {} / token {}", session.session, session.token);

    let account = auth.validate_token(&session.token).unwrap();
    println!("token belongs to {}", account.email);

    for permission in ["admin", "write", "moderate"] {
        println!(
            "can {permission}: {}",
            auth.check_permission(&session.user_id, permission)
        );
    }
    println!("all permissions: {:?}", auth.permissions(&session.user_id));

    auth.logout(&session.token);
    match auth.validate_token(&session.token) {
        Err(err) => println!("{} after logout: {err}", "refused".red()),
        Ok(_) => unreachable!(),
    }

    println!("\n== Failure paths ==");
    let attempts = [
        ("not-an-email", "long-enough-pass"),
        ("nobody@example.com", "long-enough-pass"),
        ("ghost@example.com", "long-forgotten"),
        ("admin@example.com", "wrong-password"),
    ];
    for (email, password) in attempts {
        let result = auth.login(&Credentials {
            email: email.to_string(),
            password: password.to_string(),
            remember_me: false,
        });
        match result {
            Err(err) => println!("{} {err}", "refused:".red()),
            Ok(_) => unreachable!(),
        }
    }

    println!("\naudit entries for u-1: {}", auth.log.entries_for("u-1").len());
}

// =============================================================================
// Tests (cargo test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
            remember_me: false,
        }
    }

    #[test]
    fn email_regex() {
        assert!(CredentialValidator::email_ok("a@b.co"));
        assert!(!CredentialValidator::email_ok("a@b"));
        assert!(!CredentialValidator::email_ok("a b@c.co"));
        assert!(!CredentialValidator::email_ok("plain"));
    }

    #[test]
    fn password_minimum_length() {
        assert!(!CredentialValidator::password_ok("short"));
        assert!(CredentialValidator::password_ok("12345678"));
    }

    #[test]
    fn validation_collects_every_problem() {
        let err = CredentialValidator::validate(&creds("bad", "tiny")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("email is malformed"));
        assert!(message.contains("password shorter"));
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = PasswordManager::hash("battery-staple");
        assert!(PasswordManager::verify("battery-staple", &hash));
        assert!(!PasswordManager::verify("battery-stapl", &hash));
        assert!(!hash.contains("battery-staple"));
    }

    #[test]
    fn successful_login_issues_token_and_session() {
        let mut auth = AuthFacade::new();
        let session = auth.login(&creds("admin@example.com", "correct-horse")).unwrap();
        assert_eq!(session.role, Role::Admin);
        let account = auth.validate_token(&session.token).unwrap();
        assert_eq!(account.id, session.user_id);
        assert!(account.last_login.is_some());
    }

    #[test]
    fn wrong_password_is_refused_and_audited() {
        let mut auth = AuthFacade::new();
        let err = auth.login(&creds("admin@example.com", "wrong-password")).unwrap_err();
        assert_eq!(err, AuthError::WrongPassword);
        let entries = auth.log.entries_for("u-1");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, Outcome::Failure);
        assert_eq!(entries[0].action, "login");
        assert!(entries[0].at <= SystemTime::now());
    }

    #[test]
    fn unknown_and_inactive_accounts() {
        let mut auth = AuthFacade::new();
        assert!(matches!(
            auth.login(&creds("nobody@example.com", "long-enough")),
            Err(AuthError::UnknownUser { .. })
        ));
        assert!(matches!(
            auth.login(&creds("ghost@example.com", "long-forgotten")),
            Err(AuthError::InactiveAccount { .. })
        ));
    }

    #[test]
    fn remember_me_extends_the_ttl() {
        let now = SystemTime::now();
        let mut tokens = TokenManager::default();
        let short = tokens.issue("u-1", TTL_DEFAULT, now);
        let long = tokens.issue("u-1", TTL_REMEMBERED, now);

        let between = now + TTL_DEFAULT + Duration::from_secs(1);
        assert_eq!(tokens.validate(&short, between), Err(AuthError::ExpiredToken));
        assert_eq!(tokens.validate(&long, between), Ok("u-1".to_string()));
    }

    #[test]
    fn expired_tokens_are_dropped_on_validation() {
        let now = SystemTime::now();
        let mut tokens = TokenManager::default();
        let token = tokens.issue("u-1", Duration::from_secs(10), now);
        let later = now + Duration::from_secs(11);
        assert_eq!(tokens.validate(&token, later), Err(AuthError::ExpiredToken));
        // second look: the token is gone entirely
        assert_eq!(tokens.validate(&token, now), Err(AuthError::UnknownToken));
    }

    #[test]
    fn revoke_all_clears_only_that_user() {
        let now = SystemTime::now();
        let mut tokens = TokenManager::default();
        tokens.issue("u-1", TTL_DEFAULT, now);
        tokens.issue("u-1", TTL_DEFAULT, now);
        let other = tokens.issue("u-2", TTL_DEFAULT, now);
        assert_eq!(tokens.revoke_all("u-1"), 2);
        assert!(tokens.validate(&other, now).is_ok());
    }

    #[test]
    fn logout_revokes_the_token() {
        let mut auth = AuthFacade::new();
        let session = auth.login(&creds("user@example.com", "battery-staple")).unwrap();
        auth.logout(&session.token);
        assert_eq!(
            auth.validate_token(&session.token),
            Err(AuthError::UnknownToken)
        );
    }

    #[test]
    fn permission_table_per_role() {
        let table = PermissionTable::new();
        assert!(table.allows(Role::Admin, "delete"));
        assert!(!table.allows(Role::User, "delete"));
        assert!(table.allows(Role::Guest, "read"));
        assert_eq!(table.permissions_for(Role::Moderator), vec!["read", "write", "moderate"]);
    }

    #[test]
    fn facade_permission_checks_resolve_the_role() {
        let mut auth = AuthFacade::new();
        let session = auth.login(&creds("user@example.com", "battery-staple")).unwrap();
        assert!(auth.check_permission(&session.user_id, "write"));
        assert!(!auth.check_permission(&session.user_id, "admin"));
        assert!(!auth.check_permission("u-404", "read"));
        assert!(auth.permissions("u-404").is_empty());
    }
}
