use uuid::Uuid;

/// Current-account accessor.
///
/// All store paths are parameterized by the account id; its absence is a
/// first-class `SyncError::NoUser`, never a panic. The application layer
/// plugs in its real session management here.
pub trait AuthProvider: Send + Sync {
    fn current_account(&self) -> Option<Uuid>;
}

/// Fixed-account provider for tests and single-user tools.
pub struct StaticAuth {
    account_id: Option<Uuid>,
}

impl StaticAuth {
    pub fn logged_in(account_id: Uuid) -> Self {
        Self {
            account_id: Some(account_id),
        }
    }

    pub fn logged_out() -> Self {
        Self { account_id: None }
    }
}

impl AuthProvider for StaticAuth {
    fn current_account(&self) -> Option<Uuid> {
        self.account_id
    }
}
