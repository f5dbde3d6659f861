//! Leave-request demo plugin
//!
//! Serves a canned employee profile and formats leave-request
//! confirmations. No real HR system is behind this.

use serde::Serialize;
use uuid::Uuid;

/// The current user, as the demo HR directory knows them
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub manager_email: String,
    pub manager_full_name: String,
}

/// Demo leave desk
pub struct LeaveDesk {
    profile: EmployeeProfile,
}

impl LeaveDesk {
    pub fn new() -> Self {
        Self {
            profile: EmployeeProfile {
                id: Uuid::new_v4().to_string(),
                full_name: "John Doe".to_string(),
                email: "john.doe@mail.com".to_string(),
                manager_email: "jane.doe@mail.com".to_string(),
                manager_full_name: "Jane Doe".to_string(),
            },
        }
    }

    /// Current user info as a JSON string
    pub fn current_user(&self) -> String {
        serde_json::to_string_pretty(&self.profile)
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// File a leave request; returns the confirmation text
    pub fn request_leave(
        &self,
        user_id: &str,
        full_name: &str,
        email: &str,
        manager_email: &str,
        start_date: &str,
        end_date: &str,
    ) -> String {
        format!(
            "Leave request for {}:{}:{} from {} to {} has been sent to {}",
            user_id, full_name, email, start_date, end_date, manager_email
        )
    }
}

impl Default for LeaveDesk {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_is_json() {
        let desk = LeaveDesk::new();
        let info = desk.current_user();
        assert!(info.contains("john.doe@mail.com"));
        assert!(serde_json::from_str::<serde_json::Value>(&info).is_ok());
    }

    #[test]
    fn test_request_leave_confirmation() {
        let desk = LeaveDesk::new();
        let confirmation = desk.request_leave(
            "42",
            "John Doe",
            "john.doe@mail.com",
            "jane.doe@mail.com",
            "2026-09-01",
            "2026-09-05",
        );
        assert!(confirmation.contains("42:John Doe:john.doe@mail.com"));
        assert!(confirmation.contains("from 2026-09-01 to 2026-09-05"));
        assert!(confirmation.contains("jane.doe@mail.com"));
    }
}
