//! # Launch Routing
//!
//! Decides the first screen on app start and keeps the stored app version
//! keys up to date.

use crate::traits::KeychainVault;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Last version recorded for an existing user upgrading from a build that
/// did not track versions
pub const FIRST_TRACKED_VERSION: &str = "0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    OptinMetrics,
    HomeNav,
    /// Wallet view with the onboarding wizard at step 1
    WalletView,
    Login,
}

/// Version keys to persist after start-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionUpdate {
    pub current_app_version: String,
    pub last_app_version: Option<String>,
}

pub fn reconcile_versions(
    existing_user: bool,
    current: &str,
    saved_current: Option<&str>,
    saved_last: Option<&str>,
) -> VersionUpdate {
    let mut last = saved_last.map(str::to_string);
    if saved_current != Some(current) {
        if let Some(previous) = saved_current {
            last = Some(previous.to_string());
        }
    }
    if last.is_none() {
        last = Some(if existing_user {
            FIRST_TRACKED_VERSION.to_string()
        } else {
            current.to_string()
        });
    }

    VersionUpdate {
        current_app_version: current.to_string(),
        last_app_version: last,
    }
}

/// Flags read from local storage once the vault is unlocked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnboardingFlags {
    pub metrics_opt_in_answered: bool,
    pub onboarding_wizard_seen: bool,
}

pub fn route_after_unlock(flags: OnboardingFlags) -> Route {
    if !flags.metrics_opt_in_answered {
        Route::OptinMetrics
    } else if flags.onboarding_wizard_seen {
        Route::HomeNav
    } else {
        Route::WalletView
    }
}

/// Unlocks the vault with stored credentials when present and picks the
/// first screen. Keychain failures always land on the login screen.
pub fn unlock_and_route<V: KeychainVault>(
    vault: &mut V,
    password_set: bool,
    flags: OnboardingFlags,
) -> Route {
    match try_unlock(vault, password_set, flags) {
        Ok(route) => {
            info!("Launch route: {:?}", route);
            route
        }
        Err(e) => {
            error!("Keychain couldn't be accessed: {}", e);
            Route::Login
        }
    }
}

fn try_unlock<V: KeychainVault>(
    vault: &mut V,
    password_set: bool,
    flags: OnboardingFlags,
) -> Result<Route, V::Error> {
    if let Some(password) = vault.stored_password()? {
        vault.submit_password(&password)?;
        return Ok(route_after_unlock(flags));
    }
    if password_set {
        return Ok(Route::Login);
    }
    vault.submit_password("")?;
    vault.reset_stored_password()?;
    Ok(Route::HomeNav)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeVault {
        stored: Option<String>,
        reject: bool,
        submitted: Vec<String>,
        resets: usize,
    }

    impl KeychainVault for FakeVault {
        type Error = String;

        fn stored_password(&mut self) -> Result<Option<String>, String> {
            Ok(self.stored.clone())
        }

        fn submit_password(&mut self, password: &str) -> Result<(), String> {
            self.submitted.push(password.to_string());
            if self.reject {
                return Err("wrong password".to_string());
            }
            Ok(())
        }

        fn reset_stored_password(&mut self) -> Result<(), String> {
            self.resets += 1;
            Ok(())
        }
    }

    #[test]
    fn test_version_change_moves_saved_to_last() {
        let update = reconcile_versions(true, "2.0.0", Some("1.9.0"), Some("1.8.0"));
        assert_eq!(update.current_app_version, "2.0.0");
        assert_eq!(update.last_app_version.as_deref(), Some("1.9.0"));
    }

    #[test]
    fn test_first_launch_versions() {
        let new_user = reconcile_versions(false, "2.0.0", None, None);
        assert_eq!(new_user.last_app_version.as_deref(), Some("2.0.0"));

        let upgraded = reconcile_versions(true, "2.0.0", None, None);
        assert_eq!(upgraded.last_app_version.as_deref(), Some(FIRST_TRACKED_VERSION));
    }

    #[test]
    fn test_unchanged_version_keeps_last() {
        let update = reconcile_versions(true, "2.0.0", Some("2.0.0"), Some("1.0.0"));
        assert_eq!(update.last_app_version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_route_with_credentials() {
        let mut vault = FakeVault {
            stored: Some("hunter2".to_string()),
            ..Default::default()
        };
        let flags = OnboardingFlags {
            metrics_opt_in_answered: true,
            onboarding_wizard_seen: false,
        };
        assert_eq!(unlock_and_route(&mut vault, true, flags), Route::WalletView);
        assert_eq!(vault.submitted, vec!["hunter2"]);

        assert_eq!(
            unlock_and_route(&mut vault, true, OnboardingFlags::default()),
            Route::OptinMetrics
        );
    }

    #[test]
    fn test_route_without_credentials() {
        let mut vault = FakeVault::default();
        assert_eq!(
            unlock_and_route(&mut vault, true, OnboardingFlags::default()),
            Route::Login
        );
        assert!(vault.submitted.is_empty());

        assert_eq!(
            unlock_and_route(&mut vault, false, OnboardingFlags::default()),
            Route::HomeNav
        );
        assert_eq!(vault.submitted, vec![""]);
        assert_eq!(vault.resets, 1);
    }

    #[test]
    fn test_keychain_failure_routes_to_login() {
        let mut vault = FakeVault {
            stored: Some("stale".to_string()),
            reject: true,
            ..Default::default()
        };
        let flags = OnboardingFlags {
            metrics_opt_in_answered: true,
            onboarding_wizard_seen: true,
        };
        assert_eq!(unlock_and_route(&mut vault, true, flags), Route::Login);
    }
}
