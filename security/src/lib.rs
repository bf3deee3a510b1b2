// security/src/lib.rs
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use lib::storage_engine::{Collection, LoadOutcome, RecordStore};
use models::errors::ClinicError;
use models::{Identifier, Login, Role, User};

pub mod roles;

pub use roles::{Permission, RoleConfig, RolesConfig};

/// Result of checking a login attempt against the stored users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub success: bool,
    pub role: Option<Role>,
}

impl AuthOutcome {
    fn failed() -> Self {
        AuthOutcome { success: false, role: None }
    }
}

/// Custom authentication errors.
#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    /// Email or password left blank.
    IncompleteCredentials,
    NotLoggedIn,
    PermissionDenied { role: Role, permission: Permission },
    CorruptSession(String),
    StorageError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid email or password. Please try again."),
            AuthError::IncompleteCredentials => write!(f, "Email and password are both required"),
            AuthError::NotLoggedIn => write!(f, "Not logged in"),
            AuthError::PermissionDenied { role, permission } => {
                write!(f, "Role {} lacks permission '{}'", role, permission)
            }
            AuthError::CorruptSession(msg) => write!(f, "Stored session is unreadable: {}", msg),
            AuthError::StorageError(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<ClinicError> for AuthError {
    fn from(err: ClinicError) -> Self {
        AuthError::StorageError(err.to_string())
    }
}

/// Looks for a user whose email and password both match exactly.
pub fn find_user<'a>(email: &str, password: &str, users: &'a [User]) -> Option<&'a User> {
    users.iter().find(|u| u.matches_credentials(email, password))
}

pub fn authenticate(email: &str, password: &str, users: &[User]) -> AuthOutcome {
    match find_user(email, password, users) {
        Some(user) => AuthOutcome { success: true, role: Some(user.role) },
        None => AuthOutcome::failed(),
    }
}

/// Where a freshly signed-in user is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    AdminDashboard,
    PatientDashboard,
}

/// The signed-in user. Passed explicitly to whatever needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Session { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    /// The patient record a patient account owns. `None` for admins.
    pub fn patient_id(&self) -> Option<&Identifier> {
        self.user.patient_id.as_ref()
    }

    pub fn landing(&self) -> Landing {
        match self.user.role {
            Role::Admin => Landing::AdminDashboard,
            Role::Patient => Landing::PatientDashboard,
        }
    }

    pub fn can(&self, permission: Permission, roles: &RolesConfig) -> bool {
        roles.has_permission(self.role(), permission)
    }

    pub fn authorize(&self, permission: Permission, roles: &RolesConfig) -> Result<(), AuthError> {
        if self.can(permission, roles) {
            Ok(())
        } else {
            warn!("Denied '{}' to {} ({})", permission, self.user.email, self.role());
            Err(AuthError::PermissionDenied { role: self.role(), permission })
        }
    }
}

/// Logs users in and out against the record store.
///
/// There is a single active session; its user is persisted under the
/// `user` key so it survives a restart.
#[derive(Clone)]
pub struct AuthService {
    store: RecordStore,
}

impl AuthService {
    pub fn new(store: RecordStore) -> Self {
        AuthService { store }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.login_with(&Login::new(email, password)).await
    }

    pub async fn login_with(&self, login: &Login) -> Result<Session, AuthError> {
        if !login.is_complete() {
            return Err(AuthError::IncompleteCredentials);
        }
        let users: Vec<User> = self.store.load_records(Collection::Users).await?;
        let Some(user) = find_user(&login.email, &login.password, &users) else {
            warn!("Failed login for {}", login.email);
            return Err(AuthError::InvalidCredentials);
        };

        self.store.save_value(Collection::ActiveUser, user).await?;
        info!("{} logged in as {}", user.email, user.role);
        Ok(Session::new(user.clone()))
    }

    /// Re-reads the persisted user, if any.
    pub async fn restore_session(&self) -> Result<Option<Session>, AuthError> {
        match self.store.load_value::<User>(Collection::ActiveUser).await? {
            LoadOutcome::Empty => Ok(None),
            LoadOutcome::Parsed(user) => Ok(Some(Session::new(user))),
            LoadOutcome::Corrupt(reason) => Err(AuthError::CorruptSession(reason)),
        }
    }

    /// Like `restore_session`, but having no session is an error.
    pub async fn require_session(&self) -> Result<Session, AuthError> {
        self.restore_session().await?.ok_or(AuthError::NotLoggedIn)
    }

    pub async fn end_session(&self, session: Session) -> Result<(), AuthError> {
        self.store.remove(Collection::ActiveUser).await?;
        info!("{} logged out", session.user.email);
        Ok(())
    }

    /// Clears the persisted user whether or not it can still be read.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(Collection::ActiveUser).await?;
        info!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::storage_engine::{initialize, InMemoryStorage, SeedData, SledStorage, StorageEngine};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    /// The previous handle's flusher may still hold the sled lock for a moment.
    async fn reopen(path: &Path) -> RecordStore {
        for _ in 0..50 {
            if let Ok(storage) = SledStorage::open(path) {
                return RecordStore::new(Arc::new(storage));
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        RecordStore::new(Arc::new(SledStorage::open(path).unwrap()))
    }

    async fn seeded_service() -> AuthService {
        let store = RecordStore::new(Arc::new(InMemoryStorage::new()));
        initialize(&store, &SeedData::standard().unwrap()).await.unwrap();
        AuthService::new(store)
    }

    #[tokio::test]
    async fn seeded_admin_can_authenticate() {
        let store = RecordStore::new(Arc::new(InMemoryStorage::new()));
        initialize(&store, &SeedData::standard().unwrap()).await.unwrap();
        let users: Vec<User> = store.load_records(Collection::Users).await.unwrap();

        let outcome = authenticate("admin@entnt.in", "admin123", &users);
        assert_eq!(outcome, AuthOutcome { success: true, role: Some(Role::Admin) });
    }

    #[tokio::test]
    async fn wrong_password_fails() {
        let service = seeded_service().await;
        let err = service.login("admin@entnt.in", "admin124").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid email or password. Please try again.");
        assert!(service.restore_session().await.unwrap().is_none());
    }

    #[test]
    fn comparison_is_exact() {
        let users = SeedData::standard().unwrap().users;
        assert!(!authenticate("Admin@entnt.in", "admin123", &users).success);
        assert!(!authenticate("admin@entnt.in ", "admin123", &users).success);
        assert!(authenticate("john@entnt.in", "patient123", &users).success);
    }

    #[tokio::test]
    async fn blank_fields_are_refused_before_lookup() {
        let service = seeded_service().await;
        assert!(matches!(
            service.login("", "admin123").await,
            Err(AuthError::IncompleteCredentials)
        ));
    }

    #[tokio::test]
    async fn patient_session_lands_on_patient_dashboard() {
        let service = seeded_service().await;
        let session = service.login("john@entnt.in", "patient123").await.unwrap();
        assert_eq!(session.landing(), Landing::PatientDashboard);
        assert_eq!(session.patient_id().unwrap(), "p1");

        let roles = RolesConfig::default();
        assert!(session.authorize(Permission::ViewOwnRecords, &roles).is_ok());
        assert!(matches!(
            session.authorize(Permission::ManagePatients, &roles),
            Err(AuthError::PermissionDenied { role: Role::Patient, .. })
        ));
    }

    #[tokio::test]
    async fn session_survives_reopen_and_logout_clears_it() {
        let dir = tempdir().unwrap();
        {
            let store = RecordStore::new(Arc::new(SledStorage::open(dir.path()).unwrap()));
            initialize(&store, &SeedData::standard().unwrap()).await.unwrap();
            let session = AuthService::new(store.clone()).login("admin@entnt.in", "admin123").await.unwrap();
            assert_eq!(session.landing(), Landing::AdminDashboard);
            store.engine().flush().await.unwrap();
        }

        let service = AuthService::new(reopen(dir.path()).await);
        let restored = service.require_session().await.unwrap();
        assert_eq!(restored.role(), Role::Admin);
        assert_eq!(restored.email(), "admin@entnt.in");

        service.end_session(restored).await.unwrap();
        assert!(matches!(service.require_session().await, Err(AuthError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn corrupt_session_is_reported_and_logout_recovers() {
        let engine = Arc::new(InMemoryStorage::new());
        engine.insert("user", "{not json").await.unwrap();
        let service = AuthService::new(RecordStore::new(engine));

        assert!(matches!(service.restore_session().await, Err(AuthError::CorruptSession(_))));
        service.logout().await.unwrap();
        assert!(service.restore_session().await.unwrap().is_none());
    }
}
