//! Role-tagged credential environments for ciao-cli invocations.
//!
//! A `Credentials` value is an immutable snapshot of the environment built
//! once per harness run. The user role is the base environment unchanged;
//! the admin role is the same environment with the user identity fields
//! overwritten from the admin identity fields.

use std::collections::BTreeMap;

pub const ENV_IDENTITY: &str = "CIAO_IDENTITY";
pub const ENV_CONTROLLER: &str = "CIAO_CONTROLLER";
pub const ENV_USERNAME: &str = "CIAO_USERNAME";
pub const ENV_PASSWORD: &str = "CIAO_PASSWORD";
pub const ENV_ADMIN_USERNAME: &str = "CIAO_ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD: &str = "CIAO_ADMIN_PASSWORD";

/// Every variable that must be present before the suite may start.
pub const REQUIRED_VARS: [&str; 6] = [
    ENV_IDENTITY,
    ENV_CONTROLLER,
    ENV_USERNAME,
    ENV_PASSWORD,
    ENV_ADMIN_USERNAME,
    ENV_ADMIN_PASSWORD,
];

// Key substrings whose values are masked when credentials are displayed.
const REDACT_PATTERNS: [&str; 3] = ["PASSWORD", "SECRET", "TOKEN"];

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("required environment variable {var} is not set")]
    MissingVar { var: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    role: Role,
    vars: BTreeMap<String, String>,
}

impl Credentials {
    /// User-role credentials: the base environment, unchanged.
    pub fn user(base: &BTreeMap<String, String>) -> Self {
        Self {
            role: Role::User,
            vars: base.clone(),
        }
    }

    /// Admin-role credentials: the base environment with username and
    /// password overwritten from the admin fields. Fails when either admin
    /// field is absent.
    pub fn admin(base: &BTreeMap<String, String>) -> Result<Self, CredentialsError> {
        let admin_username = base
            .get(ENV_ADMIN_USERNAME)
            .ok_or_else(|| CredentialsError::MissingVar {
                var: ENV_ADMIN_USERNAME.to_string(),
            })?
            .clone();
        let admin_password = base
            .get(ENV_ADMIN_PASSWORD)
            .ok_or_else(|| CredentialsError::MissingVar {
                var: ENV_ADMIN_PASSWORD.to_string(),
            })?
            .clone();

        let mut vars = base.clone();
        vars.insert(ENV_USERNAME.to_string(), admin_username);
        vars.insert(ENV_PASSWORD.to_string(), admin_password);

        Ok(Self {
            role: Role::Admin,
            vars,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Copy of the environment with secret-looking values masked, for
    /// logging. The environment handed to the child process is never
    /// redacted.
    pub fn redacted(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .map(|(key, value)| {
                if should_redact(key) {
                    (key.clone(), "***".to_string())
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect()
    }
}

/// Startup check that every required variable is present. The error names
/// the first missing variable.
pub fn require_env(base: &BTreeMap<String, String>) -> Result<(), CredentialsError> {
    for var in REQUIRED_VARS {
        if !base.contains_key(var) {
            return Err(CredentialsError::MissingVar {
                var: var.to_string(),
            });
        }
    }
    Ok(())
}

fn should_redact(key: &str) -> bool {
    let key_upper = key.to_ascii_uppercase();
    REDACT_PATTERNS
        .iter()
        .any(|pattern| key_upper.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_base() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("CIAO_IDENTITY".to_string(), "https://id:35357".to_string()),
            ("CIAO_CONTROLLER".to_string(), "https://ctl:8889".to_string()),
            ("CIAO_USERNAME".to_string(), "u".to_string()),
            ("CIAO_PASSWORD".to_string(), "pw".to_string()),
            ("CIAO_ADMIN_USERNAME".to_string(), "au".to_string()),
            ("CIAO_ADMIN_PASSWORD".to_string(), "apw".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ])
    }

    #[test]
    fn user_credentials_copy_base_unchanged() {
        let base = mk_base();
        let creds = Credentials::user(&base);

        assert_eq!(creds.role(), Role::User);
        assert_eq!(creds.vars(), &base);
    }

    #[test]
    fn admin_credentials_override_only_identity_fields() {
        let base = mk_base();
        let creds = Credentials::admin(&base).expect("admin credentials");

        assert_eq!(creds.role(), Role::Admin);
        assert_eq!(creds.get(ENV_USERNAME), Some("au"));
        assert_eq!(creds.get(ENV_PASSWORD), Some("apw"));
        assert_eq!(creds.get(ENV_ADMIN_USERNAME), Some("au"));
        assert_eq!(creds.get(ENV_IDENTITY), Some("https://id:35357"));
        assert_eq!(creds.get("PATH"), Some("/usr/bin"));
        assert_eq!(creds.vars().len(), base.len());
    }

    #[test]
    fn admin_credentials_fail_without_admin_username() {
        let mut base = mk_base();
        base.remove(ENV_ADMIN_USERNAME);

        let err = Credentials::admin(&base).expect_err("missing admin username");
        assert!(err.to_string().contains(ENV_ADMIN_USERNAME));
    }

    #[test]
    fn admin_credentials_fail_without_admin_password() {
        let mut base = mk_base();
        base.remove(ENV_ADMIN_PASSWORD);

        let err = Credentials::admin(&base).expect_err("missing admin password");
        assert!(err.to_string().contains(ENV_ADMIN_PASSWORD));
    }

    #[test]
    fn require_env_accepts_complete_environment() {
        assert!(require_env(&mk_base()).is_ok());
    }

    #[test]
    fn require_env_names_the_missing_variable() {
        let mut base = mk_base();
        base.remove(ENV_CONTROLLER);

        let err = require_env(&base).expect_err("missing controller");
        assert!(err.to_string().contains(ENV_CONTROLLER));
    }

    #[test]
    fn redacted_masks_password_values() {
        let creds = Credentials::user(&mk_base());
        let shown = creds.redacted();

        assert_eq!(shown.get(ENV_PASSWORD), Some(&"***".to_string()));
        assert_eq!(shown.get(ENV_ADMIN_PASSWORD), Some(&"***".to_string()));
        assert_eq!(shown.get(ENV_USERNAME), Some(&"u".to_string()));
    }

    #[test]
    fn redaction_never_touches_the_real_environment() {
        let creds = Credentials::user(&mk_base());
        let _ = creds.redacted();

        assert_eq!(creds.get(ENV_PASSWORD), Some("pw"));
    }

    #[test]
    fn role_as_str_matches_tag() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Admin.as_str(), "admin");
    }
}
