use super::domain::NotificationSettings;
use super::validation::is_valid_email;

/// Administrator-editable notification settings.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> NotificationSettings;
    fn save(&self, settings: NotificationSettings) -> Result<(), SettingsError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("admin email '{0}' is not a valid email address")]
    InvalidAdminEmail(String),
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// Normalize settings before they are persisted.
pub fn sanitize(settings: NotificationSettings) -> Result<NotificationSettings, SettingsError> {
    let admin_email = settings
        .admin_email
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty());

    if let Some(email) = &admin_email {
        if !is_valid_email(email) {
            return Err(SettingsError::InvalidAdminEmail(email.clone()));
        }
    }

    Ok(NotificationSettings {
        admin_email,
        admin_notifications_enabled: settings.admin_notifications_enabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_trims_and_drops_blank_address() {
        let cleaned = sanitize(NotificationSettings {
            admin_email: Some("   ".to_string()),
            admin_notifications_enabled: true,
        })
        .expect("blank address is allowed");
        assert_eq!(cleaned.admin_email, None);

        let cleaned = sanitize(NotificationSettings {
            admin_email: Some(" ops@example.org ".to_string()),
            admin_notifications_enabled: false,
        })
        .expect("valid address");
        assert_eq!(cleaned.admin_email.as_deref(), Some("ops@example.org"));
        assert!(!cleaned.admin_notifications_enabled);
    }

    #[test]
    fn sanitize_rejects_malformed_address() {
        let err = sanitize(NotificationSettings {
            admin_email: Some("ops-at-example".to_string()),
            admin_notifications_enabled: true,
        })
        .expect_err("malformed address");
        assert_eq!(
            err,
            SettingsError::InvalidAdminEmail("ops-at-example".to_string())
        );
    }
}
