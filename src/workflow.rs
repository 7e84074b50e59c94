use std::fmt;
use std::str::FromStr;

use crate::error::{DcasError, Result};

/// Working-paper (KKP) document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KkpStatus {
    Draft,
    InProgress,
    Finish,
    Approved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Junior,
    Senior,
    Manager,
    Partner,
}

impl KkpStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::InProgress => "In Progress",
            Self::Finish => "Finish",
            Self::Approved => "Approved",
        }
    }
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Junior => "Junior Auditor",
            Self::Senior => "Senior Auditor",
            Self::Manager => "Manager",
            Self::Partner => "Partner",
        }
    }

    pub fn can_approve(&self) -> bool {
        matches!(self, Self::Manager | Self::Partner)
    }
}

impl fmt::Display for KkpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

impl FromStr for KkpStatus {
    type Err = DcasError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "draft" => Ok(Self::Draft),
            "inprogress" => Ok(Self::InProgress),
            "finish" | "finished" => Ok(Self::Finish),
            "approved" => Ok(Self::Approved),
            _ => Err(DcasError::Workflow(format!("Unknown KKP status: {s}"))),
        }
    }
}

impl FromStr for UserRole {
    type Err = DcasError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "junior" | "juniorauditor" => Ok(Self::Junior),
            "senior" | "seniorauditor" => Ok(Self::Senior),
            "manager" => Ok(Self::Manager),
            "partner" => Ok(Self::Partner),
            _ => Err(DcasError::Workflow(format!("Unknown role: {s}"))),
        }
    }
}

/// Role-gated status change. Approval needs a Manager or Partner; an approved
/// paper cannot be moved back to In Progress or Finish.
pub fn transition(current: KkpStatus, target: KkpStatus, role: UserRole) -> Result<KkpStatus> {
    match target {
        KkpStatus::Approved if !role.can_approve() => Err(DcasError::Workflow(format!(
            "{role} cannot approve a working paper"
        ))),
        KkpStatus::InProgress | KkpStatus::Finish if current == KkpStatus::Approved => {
            Err(DcasError::Workflow(format!(
                "Working paper is already approved; cannot move to {target}"
            )))
        }
        _ => {
            tracing::info!(from = %current, to = %target, role = %role, "KKP status changed");
            Ok(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_manager_or_partner_approves() {
        assert!(transition(KkpStatus::Finish, KkpStatus::Approved, UserRole::Junior).is_err());
        assert!(transition(KkpStatus::Finish, KkpStatus::Approved, UserRole::Senior).is_err());
        assert_eq!(
            transition(KkpStatus::Finish, KkpStatus::Approved, UserRole::Manager).unwrap(),
            KkpStatus::Approved
        );
        assert_eq!(
            transition(KkpStatus::InProgress, KkpStatus::Approved, UserRole::Partner).unwrap(),
            KkpStatus::Approved
        );
    }

    #[test]
    fn test_approved_is_locked() {
        for role in [UserRole::Junior, UserRole::Partner] {
            assert!(transition(KkpStatus::Approved, KkpStatus::InProgress, role).is_err());
            assert!(transition(KkpStatus::Approved, KkpStatus::Finish, role).is_err());
        }
    }

    #[test]
    fn test_working_transitions_open_to_all_roles() {
        assert_eq!(
            transition(KkpStatus::InProgress, KkpStatus::Finish, UserRole::Junior).unwrap(),
            KkpStatus::Finish
        );
        assert_eq!(
            transition(KkpStatus::Finish, KkpStatus::InProgress, UserRole::Senior).unwrap(),
            KkpStatus::InProgress
        );
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("In Progress".parse::<KkpStatus>().unwrap(), KkpStatus::InProgress);
        assert_eq!("in-progress".parse::<KkpStatus>().unwrap(), KkpStatus::InProgress);
        assert_eq!("Senior Auditor".parse::<UserRole>().unwrap(), UserRole::Senior);
        assert!("intern".parse::<UserRole>().is_err());
    }
}
