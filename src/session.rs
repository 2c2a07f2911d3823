//! Session state: the role a user works under.
//!
//! The role is resolved once from a shared-secret comparison when the session
//! starts and is then passed explicitly to every gated call.

use crate::gate::Role;
use std::fmt;
use tracing::{info, warn};

/// Notice shown when an admin login attempt fails.
pub const ADMIN_LOGIN_FAILED: &str = "incorrect admin password; continuing with read-only access";

/// The expected admin shared secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSecret(String);

impl AdminSecret {
    /// Wraps the expected secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Compares a supplied secret byte-for-byte.
    pub fn matches(&self, supplied: &str) -> bool {
        self.0.as_bytes() == supplied.as_bytes()
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSecret(<redacted>)")
    }
}

/// The role a user asks for at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleChoice {
    /// Read-only analyst access.
    #[default]
    Analyst,
    /// Full access, requires the admin password.
    Admin,
}

impl RoleChoice {
    /// Returns the other choice.
    pub fn toggle(self) -> Self {
        match self {
            Self::Analyst => Self::Admin,
            Self::Admin => Self::Analyst,
        }
    }

    /// Label used on the login screen.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analyst => "Analyst (read-only)",
            Self::Admin => "Administrator",
        }
    }
}

/// A user session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    role: Role,
}

/// Result of starting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    /// The started session.
    pub session: Session,
    /// A message for the user when the requested role was not granted.
    pub warning: Option<&'static str>,
}

impl Session {
    /// Creates a session with a fixed role.
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    /// Starts a session, granting the admin role only on a matching secret.
    ///
    /// With no expected secret configured the admin role is never granted.
    pub fn start(
        requested: RoleChoice,
        supplied: Option<&str>,
        expected: Option<&AdminSecret>,
    ) -> SessionStart {
        match requested {
            RoleChoice::Analyst => SessionStart {
                session: Self::new(Role::Restricted),
                warning: None,
            },
            RoleChoice::Admin => {
                let granted = match (expected, supplied) {
                    (Some(expected), Some(supplied)) => expected.matches(supplied),
                    _ => false,
                };

                if granted {
                    info!("Admin session started");
                    SessionStart {
                        session: Self::new(Role::Privileged),
                        warning: None,
                    }
                } else {
                    if expected.is_none() {
                        warn!("Admin login requested but no admin password is configured");
                    } else {
                        warn!("Admin login failed");
                    }
                    SessionStart {
                        session: Self::new(Role::Restricted),
                        warning: Some(ADMIN_LOGIN_FAILED),
                    }
                }
            }
        }
    }

    /// Returns the session role.
    pub fn role(&self) -> Role {
        self.role
    }
}
