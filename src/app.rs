// src/app.rs

use axum::{
    Extension, Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{MethodRouter, get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::validation::SubApp;
use crate::error::{AppError, method_not_allowed};
use crate::handlers::{admin, auth, crud, dashboard, health, preferences, table1};
use crate::services::crud::JsonWriteService;
use crate::services::table1::Table1Service;
use crate::services::table2::Table2Service;
use crate::services::table3::Table3Service;
use crate::state::AppState;

/// GET/POST/PUT/DELETE sur une même URL, 405 JSON pour le reste
fn table_routes<S>() -> MethodRouter<AppState>
where
    S: JsonWriteService + FromRef<AppState>,
{
    get(crud::list::<S>)
        .post(crud::create::<S>)
        .put(crud::update::<S>)
        .delete(crud::delete::<S>)
        .fallback(method_not_allowed)
}

/// Table1 accepte aussi le multipart: création et mise à jour lui sont propres
fn table1_routes() -> MethodRouter<AppState> {
    get(crud::list::<Table1Service>)
        .post(table1::create)
        .put(table1::update)
        .delete(crud::delete::<Table1Service>)
        .fallback(method_not_allowed)
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/table1", table1_routes())
        .route("/table1/search", get(table1::search).fallback(method_not_allowed))
        .route("/table2", table_routes::<Table2Service>())
        .route("/table3", table_routes::<Table3Service>())
}

/// Routes d'authentification d'une sous-application
pub fn auth_routes(app: SubApp) -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
        .route("/password", post(auth::change_password))
        // Fournit la sous-application aux handlers
        .layer(Extension(app))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::assign_role))
        .route("/logs", get(admin::recent_logs))
}

async fn not_found() -> AppError {
    AppError::not_found("Not found")
}

/// Construit l'application complète
pub fn build_router(state: AppState) -> Router {
    let media_path = match state.config.media_url.trim_end_matches('/') {
        "" => "/media".to_string(),
        path => path.to_string(),
    };
    let media = ServeDir::new(state.storage.root());

    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/preferences/dark-mode", get(preferences::dark_mode))
        .route(
            "/preferences/dark-mode/toggle",
            post(preferences::toggle_dark_mode),
        )
        .nest("/api", api_routes())
        .nest("/admin", admin_routes());

    for app in SubApp::ALL {
        router = router.nest(&app.prefix(), auth_routes(app));
    }

    router
        .nest_service(&media_path, media)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        // Middleware global de tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::AuthService;
    use crate::auth::session::RequestContext;
    use crate::services::crud::JsonWriteService;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use crud_lab_api::{LoginRequest, RegisterRequest, RoleAssignmentRequest, Table2Input};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt; // for oneshot

    struct TestApp {
        state: AppState,
        _db: tempfile::TempDir,
        _media: tempfile::TempDir,
    }

    struct TestResponse {
        status: StatusCode,
        set_cookie: Option<String>,
        body: Value,
    }

    impl TestApp {
        fn new() -> Self {
            let (state, db, media) = crate::state::test_state();
            Self {
                state,
                _db: db,
                _media: media,
            }
        }

        /// Crée un compte, lui donne un rôle et renvoie l'en-tête Cookie de sa session
        fn session_for(&self, username: &str, role: &str) -> String {
            let auth = AuthService::from_ref(&self.state);
            let password = "Test-pass123";
            let user = auth
                .register(
                    SubApp::Json,
                    RegisterRequest {
                        username: username.to_string(),
                        email: format!("{username}@example.com"),
                        password1: password.to_string(),
                        password2: password.to_string(),
                    },
                )
                .expect("register");
            auth.assign_role(RoleAssignmentRequest {
                user_id: user.id,
                role: role.to_string(),
            })
            .expect("assign role");

            let anonymous = RequestContext {
                session: None,
                user: None,
                permissions: Vec::new(),
                ip_address: "127.0.0.1".to_string(),
            };
            let (_, session) = auth
                .login(
                    SubApp::Json,
                    LoginRequest {
                        username: username.to_string(),
                        password: password.to_string(),
                    },
                    &anonymous,
                )
                .expect("login");
            format!("sessionid={}", session.id)
        }

        async fn send(&self, request: Request<Body>) -> TestResponse {
            let response = build_router(self.state.clone())
                .oneshot(request)
                .await
                .unwrap();

            let status = response.status();
            let set_cookie = response
                .headers()
                .get(header::SET_COOKIE)
                .map(|v| v.to_str().unwrap().to_string());
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::String(
                    String::from_utf8_lossy(&bytes).into_owned(),
                ))
            };
            TestResponse {
                status,
                set_cookie,
                body,
            }
        }

        async fn json(&self, method: &str, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::from(body.to_string())).unwrap())
                .await
        }

        async fn form(&self, uri: &str, cookie: Option<&str>, body: &str) -> TestResponse {
            let mut builder = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::from(body.to_string())).unwrap())
                .await
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
            let mut builder = Request::builder().uri(uri);
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }
    }

    // ==========================================
    // Test 1: santé et routage
    // ==========================================
    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new();
        let resp = app.get("/health", None).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["status"], "ok");
    }

    #[tokio::test]
    async fn unsupported_method_is_405_json() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");
        let resp = app.json("PATCH", "/api/table2", Some(&cookie), json!({})).await;
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.body, json!({"error": "Method not allowed"}));
    }

    // ==========================================
    // Test 2: permissions
    // ==========================================
    #[tokio::test]
    async fn anonymous_list_is_unauthorized() {
        let app = TestApp::new();
        let resp = app.get("/api/table2", None).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert!(resp.body["error"].is_string());
    }

    #[tokio::test]
    async fn customer_can_read_but_not_write() {
        let app = TestApp::new();
        let cookie = app.session_for("cust", "customer");

        let resp = app.get("/api/table3", Some(&cookie)).await;
        assert_eq!(resp.status, StatusCode::OK);

        let resp = app
            .json("POST", "/api/table2", Some(&cookie), json!({"positive_small_int": 1}))
            .await;
        assert_eq!(resp.status, StatusCode::FORBIDDEN);

        let resp = app.get("/admin/users", Some(&cookie)).await;
        assert_eq!(resp.status, StatusCode::FORBIDDEN);
    }

    // ==========================================
    // Test 3: CRUD
    // ==========================================
    #[tokio::test]
    async fn create_table1_with_plain_fields() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");

        let resp = app
            .json(
                "POST",
                "/api/table1",
                Some(&cookie),
                json!({"char_field": "abc", "integer_field": 5}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
        let data = &resp.body["data"];
        assert!(data["id"].as_i64().is_some());
        assert_eq!(data["char_field"], "abc");
        assert_eq!(data["integer_field"], 5);
        assert!(data["foreign_key"].is_null());
        assert_eq!(data["many_to_many"], json!([]));
    }

    #[tokio::test]
    async fn pagination_over_seven_rows() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");
        let service = Table2Service::from_ref(&app.state);
        for _ in 0..7 {
            service.create(Table2Input::default()).unwrap();
        }

        let resp = app.get("/api/table2?page=1&page_size=3", Some(&cookie)).await;
        assert_eq!(resp.status, StatusCode::OK);
        let pagination = &resp.body["pagination"];
        assert_eq!(pagination["enabled"], true);
        assert_eq!(pagination["total_pages"], 3);
        assert_eq!(pagination["has_next"], true);
        assert_eq!(pagination["has_previous"], false);
        assert_eq!(resp.body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn table1_list_includes_form_options() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");
        let resp = app.get("/api/table1", Some(&cookie)).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.body["table2_options"].is_array());
        assert!(resp.body["table3_options"].is_array());
    }

    #[tokio::test]
    async fn update_and_delete_need_an_id() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");

        let resp = app
            .json("PUT", "/api/table3", Some(&cookie), json!({"email_field": "a@b.io"}))
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body["error"], "ID is required for PUT requests");

        let resp = app.json("DELETE", "/api/table2", Some(&cookie), json!({})).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body["error"], "ID is required for DELETE requests");

        let resp = app
            .json("DELETE", "/api/table2", Some(&cookie), json!({"id": 42}))
            .await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_returns_no_content() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");
        let created = app
            .json(
                "POST",
                "/api/table3",
                Some(&cookie),
                json!({"duration_field": "00:01:00", "email_field": "x@example.com"}),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED);

        let resp = app
            .json(
                "DELETE",
                "/api/table3",
                Some(&cookie),
                json!({"id": created.body["data"]["id"]}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");
        let request = Request::builder()
            .method("POST")
            .uri("/api/table2")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, &cookie)
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.send(request).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body["error"], "Invalid JSON data");
    }

    // ==========================================
    // Test 4: fichiers
    // ==========================================
    #[tokio::test]
    async fn malformed_base64_persists_nothing() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");

        let resp = app
            .json(
                "POST",
                "/api/table1",
                Some(&cookie),
                json!({
                    "char_field": "bad",
                    "image_field": {"name": "x.png", "content": "image/png;base64,%%%"}
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body["error"], "Invalid base64 data for image_field");

        let list = app.get("/api/table1", Some(&cookie)).await;
        assert_eq!(list.body["pagination"]["total_items"], 0);
    }

    #[tokio::test]
    async fn multipart_upload_is_served_from_media() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");

        let body = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"data\"\r\n\r\n",
            "{\"char_field\":\"upload\"}\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"file_field\"; filename=\"notes.txt\"\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "hello media\r\n",
            "--XBOUNDARY--\r\n",
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/table1")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .header(header::COOKIE, &cookie)
            .body(Body::from(body))
            .unwrap();
        let resp = app.send(request).await;
        assert_eq!(resp.status, StatusCode::CREATED);

        let url = resp.body["data"]["file_field"].as_str().unwrap().to_string();
        assert!(url.starts_with("/media/files/"));
        assert!(url.ends_with("_notes.txt"));

        let served = app.get(&url, None).await;
        assert_eq!(served.status, StatusCode::OK);
        assert_eq!(served.body, Value::String("hello media".to_string()));
    }

    // ==========================================
    // Test 5: authentification
    // ==========================================
    #[tokio::test]
    async fn register_login_profile_flow() {
        let app = TestApp::new();

        let resp = app
            .form(
                "/rest/register",
                None,
                "username=zoe&email=zoe%40example.com&password1=short1&password2=short1",
            )
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.body["error"],
            "Password must be between 8 and 14 characters."
        );

        let resp = app
            .form(
                "/rest/register",
                None,
                "username=zoe&email=zoe%40example.com&password1=LongEnough1%21&password2=LongEnough1%21",
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
        assert_eq!(resp.body["user"]["username"], "zoe");

        let resp = app
            .form("/rest/login", None, "username=zoe&password=LongEnough1%21")
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["current_app"], "rest");
        assert_eq!(resp.body["logout_url"], "/rest/logout");
        let set_cookie = resp.set_cookie.expect("session cookie");
        assert!(set_cookie.contains("HttpOnly"));
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let resp = app.get("/rest/profile", Some(&cookie)).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["role"], "Customer");
        assert_eq!(resp.body["current_app"], "rest");
        assert_eq!(resp.body["home_url"], "/rest/profile");

        let resp = app.form("/rest/logout", Some(&cookie), "").await;
        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.set_cookie.unwrap().contains("Max-Age=0"));

        let resp = app.get("/rest/profile", Some(&cookie)).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn failed_login_is_visible_in_logs() {
        let app = TestApp::new();
        let cookie = app.session_for("admin", "admin");

        let request = Request::builder()
            .method("POST")
            .uri("/json_app/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
            .body(Body::from("username=admin&password=wrong"))
            .unwrap();
        let resp = app.send(request).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp.body["error"], "Invalid username or password.");

        let logs = app.get("/admin/logs", Some(&cookie)).await;
        assert_eq!(logs.status, StatusCode::OK);
        let latest = &logs.body[0];
        assert_eq!(latest["event_type"], "login_failed");
        assert_eq!(latest["ip_address"], "198.51.100.4");
    }

    #[tokio::test]
    async fn dark_mode_toggle_opens_anonymous_session() {
        let app = TestApp::new();

        let resp = app.form("/preferences/dark-mode/toggle", None, "").await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({"dark_mode": true, "status": "success"}));
        let cookie = resp
            .set_cookie
            .expect("anonymous session cookie")
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let resp = app.get("/preferences/dark-mode", Some(&cookie)).await;
        assert_eq!(resp.body, json!({"dark_mode": true}));

        let resp = app.form("/preferences/dark-mode/toggle", Some(&cookie), "").await;
        assert_eq!(resp.body["dark_mode"], false);
        assert!(resp.set_cookie.is_none());
    }

    #[tokio::test]
    async fn admin_assigns_roles() {
        let app = TestApp::new();
        let admin = app.session_for("admin", "admin");
        app.session_for("cust", "customer");

        let users = app.get("/admin/users", Some(&admin)).await;
        assert_eq!(users.status, StatusCode::OK);
        let cust_id = users.body.as_array().unwrap()
            .iter()
            .find(|u| u["user"]["username"] == "cust")
            .map(|u| u["user"]["id"].clone())
            .unwrap();

        let resp = app
            .json("POST", "/admin/users", Some(&admin), json!({"user_id": cust_id, "role": "admin"}))
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["role"], "Administrator");
    }

    #[tokio::test]
    async fn dashboard_counts_tables() {
        let app = TestApp::new();
        let cookie = app.session_for("viewer", "customer");
        let resp = app.get("/dashboard", Some(&cookie)).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(
            resp.body,
            json!({"table1_count": 0, "table2_count": 0, "table3_count": 0})
        );
    }
}
