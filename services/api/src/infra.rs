pub(crate) use epr::evaluation::InMemoryEvaluationRepository;
use epr::identity::{DirectoryError, Role, UserDirectory, UserId, UserRecord};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Fixed user list standing in for the HR directory.
#[derive(Clone)]
pub(crate) struct InMemoryUserDirectory {
    users: Arc<Vec<UserRecord>>,
}

impl InMemoryUserDirectory {
    pub(crate) fn seeded() -> Self {
        Self {
            users: Arc::new(seeded_users()),
        }
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.users.iter().find(|user| user.id == id).cloned())
    }

    fn direct_reports(&self, manager: &UserRecord) -> Result<Vec<UserRecord>, DirectoryError> {
        Ok(self
            .users
            .iter()
            .filter(|user| user.reports_to(manager))
            .cloned()
            .collect())
    }
}

pub(crate) const DEMO_ADMIN: UserId = UserId(1);
pub(crate) const DEMO_MANAGER: UserId = UserId(2);
pub(crate) const DEMO_EMPLOYEE: UserId = UserId(3);

fn seeded_user(
    id: u32,
    code: &str,
    fullname: &str,
    department: &str,
    role: Role,
    manager_code: Option<&str>,
) -> UserRecord {
    UserRecord {
        id: UserId(id),
        code: code.to_string(),
        fullname: fullname.to_string(),
        department: department.to_string(),
        role,
        manager_code: manager_code.map(str::to_string),
    }
}

pub(crate) fn seeded_users() -> Vec<UserRecord> {
    vec![
        seeded_user(1, "ADMIN001", "System Administrator", "IT", Role::Admin, None),
        seeded_user(2, "MGR001", "Sales Manager", "Sales", Role::Manager, None),
        seeded_user(3, "EMP001", "Sales Associate", "Sales", Role::Employee, Some("MGR001")),
        seeded_user(4, "MGR002", "Office Manager", "Office", Role::Manager, None),
        seeded_user(5, "EMP002", "Office Clerk", "Office", Role::Employee, Some("MGR002")),
    ]
}
