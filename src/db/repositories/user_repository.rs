use crate::db::error::RepositoryError;
use crate::db::models::user::{Group, NewUser, NewUserGroup, User};
use crate::db::schema::{auth_groups, auth_permissions, group_permissions, user_groups, users};
use chrono::NaiveDateTime;
use diesel::prelude::*;

pub struct UserRepository;

impl UserRepository {
    pub fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    /// Trouver un utilisateur par ID
    pub fn find_by_id(
        conn: &mut SqliteConnection,
        id: i32,
    ) -> Result<Option<User>, RepositoryError> {
        users::table
            .find(id)
            .select(User::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn username_exists(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<bool, RepositoryError> {
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(username)),
        ))
        .get_result(conn)
        .map_err(Into::into)
    }

    pub fn email_exists(conn: &mut SqliteConnection, email: &str) -> Result<bool, RepositoryError> {
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email)),
        ))
        .get_result(conn)
        .map_err(Into::into)
    }

    /// Créer un nouvel utilisateur
    pub fn create(conn: &mut SqliteConnection, new_user: &NewUser) -> Result<User, RepositoryError> {
        diesel::insert_into(users::table)
            .values(new_user)
            .returning(User::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    /// Mettre à jour le dernier login
    pub fn update_last_login(
        conn: &mut SqliteConnection,
        id: i32,
        at: NaiveDateTime,
    ) -> Result<(), RepositoryError> {
        diesel::update(users::table.find(id))
            .set(users::last_login.eq(Some(at)))
            .execute(conn)?;
        Ok(())
    }

    // Mettre à jour le mot de passe
    pub fn update_password(
        conn: &mut SqliteConnection,
        id: i32,
        new_password_hash: &str,
    ) -> Result<(), RepositoryError> {
        diesel::update(users::table.find(id))
            .set(users::password_hash.eq(new_password_hash))
            .execute(conn)?;
        Ok(())
    }

    pub fn list_all(conn: &mut SqliteConnection) -> Result<Vec<User>, RepositoryError> {
        users::table
            .order(users::id.asc())
            .select(User::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    // === Groupes et permissions ===

    pub fn groups_of(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Vec<Group>, RepositoryError> {
        user_groups::table
            .inner_join(auth_groups::table)
            .filter(user_groups::user_id.eq(user_id))
            .order(auth_groups::name.asc())
            .select(Group::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    /// (codename, libellé) des permissions accordées via les groupes, sans doublons
    pub fn permissions_of(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Vec<(String, String)>, RepositoryError> {
        user_groups::table
            .inner_join(
                group_permissions::table
                    .on(group_permissions::group_id.eq(user_groups::group_id)),
            )
            .inner_join(
                auth_permissions::table
                    .on(auth_permissions::id.eq(group_permissions::permission_id)),
            )
            .filter(user_groups::user_id.eq(user_id))
            .select((auth_permissions::codename, auth_permissions::name))
            .distinct()
            .order(auth_permissions::id.asc())
            .load(conn)
            .map_err(Into::into)
    }

    pub fn find_group_by_name(
        conn: &mut SqliteConnection,
        name: &str,
    ) -> Result<Option<Group>, RepositoryError> {
        auth_groups::table
            .filter(auth_groups::name.eq(name))
            .select(Group::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn add_to_group(
        conn: &mut SqliteConnection,
        user_id: i32,
        group_id: i32,
    ) -> Result<(), RepositoryError> {
        diesel::insert_into(user_groups::table)
            .values(NewUserGroup { user_id, group_id })
            .execute(conn)?;
        Ok(())
    }

    pub fn clear_groups(conn: &mut SqliteConnection, user_id: i32) -> Result<(), RepositoryError> {
        diesel::delete(user_groups::table.filter(user_groups::user_id.eq(user_id)))
            .execute(conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{get_connection, test_pool};

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "test_hash".to_string(),
            date_joined: chrono::Utc::now().naive_utc(),
        }
    }

    // ============================================
    // Test 1: Créer un utilisateur
    // ============================================
    #[test]
    fn test_create_user_success() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        let created = UserRepository::create(&mut conn, &new_user("alice")).unwrap();
        assert_eq!(created.username, "alice");
        assert!(created.is_active);
        assert!(created.last_login.is_none());

        assert!(UserRepository::username_exists(&mut conn, "alice").unwrap());
        assert!(UserRepository::email_exists(&mut conn, "alice@example.com").unwrap());
        assert!(!UserRepository::username_exists(&mut conn, "bob").unwrap());
    }

    // ============================================
    // Test 2: Username unique
    // ============================================
    #[test]
    fn test_duplicate_username_fails() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        UserRepository::create(&mut conn, &new_user("dup")).unwrap();
        let result = UserRepository::create(&mut conn, &new_user("dup"));
        assert!(matches!(result, Err(RepositoryError::UniqueViolation(_))));
    }

    // ============================================
    // Test 3: Permissions héritées du groupe
    // ============================================
    #[test]
    fn test_permissions_follow_groups() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        let user = UserRepository::create(&mut conn, &new_user("carol")).unwrap();
        assert!(UserRepository::permissions_of(&mut conn, user.id).unwrap().is_empty());

        let customers = UserRepository::find_group_by_name(&mut conn, "Customers")
            .unwrap()
            .expect("seeded group");
        UserRepository::add_to_group(&mut conn, user.id, customers.id).unwrap();

        let perms = UserRepository::permissions_of(&mut conn, user.id).unwrap();
        assert_eq!(
            perms,
            vec![("view_data".to_string(), "Can view all data".to_string())]
        );

        let admins = UserRepository::find_group_by_name(&mut conn, "Admins")
            .unwrap()
            .expect("seeded group");
        UserRepository::add_to_group(&mut conn, user.id, admins.id).unwrap();
        let perms = UserRepository::permissions_of(&mut conn, user.id).unwrap();
        assert_eq!(perms.len(), 5, "view_data must not be duplicated");

        let groups = UserRepository::groups_of(&mut conn, user.id).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Admins", "Customers"]);

        UserRepository::clear_groups(&mut conn, user.id).unwrap();
        assert!(UserRepository::groups_of(&mut conn, user.id).unwrap().is_empty());
    }

    #[test]
    fn test_update_last_login_and_password() {
        let (pool, _dir) = test_pool();
        let mut conn = get_connection(&pool).unwrap();

        let user = UserRepository::create(&mut conn, &new_user("dave")).unwrap();
        let now = chrono::Utc::now().naive_utc();
        UserRepository::update_last_login(&mut conn, user.id, now).unwrap();
        UserRepository::update_password(&mut conn, user.id, "other_hash").unwrap();

        let reloaded = UserRepository::find_by_id(&mut conn, user.id)
            .unwrap()
            .expect("user exists");
        assert_eq!(reloaded.last_login, Some(now));
        assert_eq!(reloaded.password_hash, "other_hash");
    }
}
