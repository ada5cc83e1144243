// src/auth/services.rs

use std::sync::Arc;

use chrono::Utc;
use crud_lab_api::{
    ChangePasswordRequest, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest,
    RoleAssignmentRequest, UserResponse, UserWithRole,
};
use diesel::{Connection, SqliteConnection};

use crate::auth::password::PasswordManager;
use crate::auth::permissions::{ADMINS_GROUP, CUSTOMERS_GROUP, group_for_role, role_label};
use crate::auth::session::{RequestContext, open_session};
use crate::auth::validation::SubApp;
use crate::config::Config;
use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::session::Session;
use crate::db::models::user::{NewUser, User};
use crate::db::repositories::session_repository::SessionRepository;
use crate::db::repositories::user_repository::UserRepository;
use crate::error::AppError;
use crate::services::audit::{Actor, AuditEvent, AuditService};
use crate::services::table3::is_valid_email;

const USERNAME_MAX_LEN: usize = 150;
pub const MISSING_CREDENTIALS: &str = "Please provide both username and password.";

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(pool: DbPool, config: Arc<Config>) -> Self {
        Self { pool, config }
    }

    pub fn session_ttl_hours(&self) -> i64 {
        self.config.session_ttl_hours
    }

    pub fn secure_cookies(&self) -> bool {
        self.config.secure_cookies()
    }

    /// Inscription: le nouveau compte rejoint le groupe Customers
    pub fn register(&self, app: SubApp, req: RegisterRequest) -> Result<UserResponse, AppError> {
        let username = req.username.trim();
        let email = req.email.trim();
        if username.is_empty() || email.is_empty() {
            return Err(AppError::validation("Username and email are required."));
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(AppError::validation(format!(
                "Username must be at most {USERNAME_MAX_LEN} characters."
            )));
        }
        if !is_valid_email(email) {
            return Err(AppError::validation("Enter a valid email address."));
        }
        app.validate_new_password(&req.password1, &req.password2)?;

        let mut conn = get_connection(&self.pool)?;
        if UserRepository::username_exists(&mut conn, username)? {
            return Err(AppError::validation("Username already exists."));
        }
        if UserRepository::email_exists(&mut conn, email)? {
            return Err(AppError::validation("Email is already in use."));
        }

        let password_hash = PasswordManager::hash(&req.password1)?;
        let user = conn.transaction::<User, AppError, _>(|conn| {
            let user = UserRepository::create(
                conn,
                &NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash,
                    date_joined: Utc::now().naive_utc(),
                },
            )
            .map_err(|e| match e {
                RepositoryError::UniqueViolation(_) => {
                    AppError::validation("Username already exists.")
                }
                other => other.into(),
            })?;
            Self::join_group(conn, user.id, CUSTOMERS_GROUP)?;
            Ok(user)
        })?;

        tracing::info!(username = %user.username, app = app.name(), "User registered");
        Ok(user.into())
    }

    /// Connexion d'un utilisateur.
    /// Remplace la session courante en conservant son mode sombre.
    pub fn login(
        &self,
        app: SubApp,
        req: LoginRequest,
        ctx: &RequestContext,
    ) -> Result<(LoginResponse, Session), AppError> {
        let username = req.username.trim();
        if username.is_empty() || req.password.is_empty() {
            return Err(AppError::validation(MISSING_CREDENTIALS));
        }

        let mut conn = get_connection(&self.pool)?;
        let user = UserRepository::find_by_username(&mut conn, username)?
            .filter(|user| user.is_active)
            .filter(|user| PasswordManager::matches(&req.password, &user.password_hash));

        let Some(user) = user else {
            AuditService::record(
                &mut conn,
                AuditEvent::LoginFailed,
                Actor {
                    user_id: None,
                    username,
                    ip_address: &ctx.ip_address,
                },
                "Failed login attempt.",
            )?;
            return Err(AppError::InvalidCredentials);
        };

        let session = conn.transaction::<Session, AppError, _>(|conn| {
            if let Some(old) = ctx.session_id() {
                SessionRepository::delete(conn, old)?;
            }
            let session = open_session(
                conn,
                Some(user.id),
                Some(app.name()),
                ctx.dark_mode(),
                self.config.session_ttl_hours,
            )?;
            UserRepository::update_last_login(conn, user.id, session.created_at)?;
            AuditService::record(
                conn,
                AuditEvent::Login,
                Self::actor(&user, ctx),
                &format!("Logged in via {}.", app.name()),
            )?;
            Ok(session)
        })?;

        let response = LoginResponse {
            message: "Login successful.".to_string(),
            username: user.username,
            current_app: app.name().to_string(),
            home_url: app.home_url(),
            logout_url: app.logout_url(),
        };
        Ok((response, session))
    }

    /// Déconnexion, sans erreur si aucune session n'est ouverte
    pub fn logout(&self, ctx: &RequestContext) -> Result<(), AppError> {
        let Some(session_id) = ctx.session_id() else {
            return Ok(());
        };

        let mut conn = get_connection(&self.pool)?;
        let removed = SessionRepository::delete(&mut conn, session_id)?;
        if let (Some(user), 1..) = (&ctx.user, removed) {
            AuditService::record(
                &mut conn,
                AuditEvent::Logout,
                Self::actor(user, ctx),
                "User logged out.",
            )?;
        }
        Ok(())
    }

    /// Profil de l'utilisateur connecté, avec la sous-application de sa session
    pub fn profile(&self, ctx: &RequestContext) -> Result<ProfileResponse, AppError> {
        let user = ctx.require_login()?;
        let current_app = ctx
            .session
            .as_ref()
            .and_then(|s| s.current_app.as_deref())
            .and_then(SubApp::from_name);

        let mut conn = get_connection(&self.pool)?;
        let groups: Vec<String> = UserRepository::groups_of(&mut conn, user.id)?
            .into_iter()
            .map(|group| group.name)
            .collect();

        let mut permissions: Vec<String> = UserRepository::permissions_of(&mut conn, user.id)?
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        permissions.sort();
        permissions.dedup();

        Ok(ProfileResponse {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: role_label(&groups).to_string(),
            permissions,
            is_admin: groups.iter().any(|g| g == ADMINS_GROUP),
            groups,
            current_app: current_app.map(|app| app.name().to_string()),
            home_url: current_app.map(SubApp::home_url),
        })
    }

    /// Change le mot de passe de l'utilisateur connecté
    pub fn change_password(
        &self,
        app: SubApp,
        ctx: &RequestContext,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let user = ctx.require_login()?;

        if !PasswordManager::matches(&req.old_password, &user.password_hash) {
            return Err(AppError::validation(
                "Your old password was entered incorrectly.",
            ));
        }
        app.validate_new_password(&req.new_password1, &req.new_password2)?;

        let new_hash = PasswordManager::hash(&req.new_password1)?;
        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<(), AppError, _>(|conn| {
            UserRepository::update_password(conn, user.id, &new_hash)?;
            AuditService::record(
                conn,
                AuditEvent::PasswordChange,
                Self::actor(user, ctx),
                "Password was changed.",
            )?;
            Ok(())
        })
    }

    pub fn list_users_with_roles(&self) -> Result<Vec<UserWithRole>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let users = UserRepository::list_all(&mut conn)?;

        users
            .into_iter()
            .map(|user| Self::with_role(&mut conn, user))
            .collect()
    }

    /// `admin`, `customer`, sinon aucun groupe: les anciens groupes sont retirés d'abord
    pub fn assign_role(&self, req: RoleAssignmentRequest) -> Result<UserWithRole, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let user = UserRepository::find_by_id(&mut conn, req.user_id)?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        conn.transaction::<(), AppError, _>(|conn| {
            UserRepository::clear_groups(conn, user.id)?;
            if let Some(group) = group_for_role(&req.role) {
                Self::join_group(conn, user.id, group)?;
            }
            Ok(())
        })?;

        tracing::info!(username = %user.username, role = %req.role, "Role assigned");
        Self::with_role(&mut conn, user)
    }

    /// Bascule le mode sombre; ouvre une session anonyme au besoin.
    /// Renvoie la session et `true` si elle vient d'être créée.
    pub fn toggle_dark_mode(&self, ctx: &RequestContext) -> Result<(Session, bool), AppError> {
        let mut conn = get_connection(&self.pool)?;
        match &ctx.session {
            Some(session) => {
                let dark_mode = !session.dark_mode;
                SessionRepository::set_dark_mode(&mut conn, &session.id, dark_mode)?;
                Ok((
                    Session {
                        dark_mode,
                        ..session.clone()
                    },
                    false,
                ))
            }
            None => {
                let session =
                    open_session(&mut conn, None, None, true, self.config.session_ttl_hours)?;
                Ok((session, true))
            }
        }
    }

    fn join_group(conn: &mut SqliteConnection, user_id: i32, name: &str) -> Result<(), AppError> {
        let group = UserRepository::find_group_by_name(conn, name)?
            .ok_or_else(|| AppError::internal(format!("Group {name} is missing")))?;
        UserRepository::add_to_group(conn, user_id, group.id)?;
        Ok(())
    }

    fn with_role(conn: &mut SqliteConnection, user: User) -> Result<UserWithRole, AppError> {
        let groups: Vec<String> = UserRepository::groups_of(conn, user.id)?
            .into_iter()
            .map(|group| group.name)
            .collect();
        Ok(UserWithRole {
            role: role_label(&groups).to_string(),
            user: user.into(),
        })
    }

    fn actor<'a>(user: &'a User, ctx: &'a RequestContext) -> Actor<'a> {
        Actor {
            user_id: Some(user.id),
            username: &user.username,
            ip_address: &ctx.ip_address,
        }
    }
}
