use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::auth;
use super::health;
use super::middleware::{
    logging_middleware, metrics_middleware, security_headers_middleware, MAX_BODY_SIZE,
};
use super::state::AppState;
use super::users;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router. The metrics endpoint is mounted at the given path
/// when a recorder was installed.
pub fn create_router(state: AppState, metrics: Option<(PrometheusMetrics, &str)>) -> Router {
    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Login is public, the rest needs a bearer token
        .nest("/auth", auth::create_auth_router())
        // User management (admin)
        .nest("/user", users::create_user_router())
        .with_state(state);

    if let Some((m, path)) = metrics {
        router = router.merge(create_metrics_router(m, path));
    }

    router
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{Identity, Role, RoleSet, TokenIssuer, User, UserId, UserRepository};
    use crate::infrastructure::auth::{AuthService, CredentialValidator, JwtService, SigningKey};
    use crate::infrastructure::user::{
        InMemoryUserRepository, MockPasswordHasher, PasswordHasher, UserService,
    };

    const SECRET: &str = "router-test-secret-that-is-long-enough";
    const ADMIN_ID: &str = "USR-AD0001";
    const STUDENT_ID: &str = "USR-5A0001";

    struct TestApp {
        router: Router,
        jwt: Arc<JwtService>,
    }

    fn hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|password| Ok(format!("hashed:{}", password)));
        hasher
            .expect_verify()
            .returning(|password, hash| hash == format!("hashed:{}", password));
        hasher
    }

    fn seed_user(id: &str, email: &str, role: Role, nim: Option<&str>) -> User {
        User::new(
            UserId::new(id).unwrap(),
            email,
            "Seeded User",
            "hashed:password123",
            role,
            None,
            nim.map(String::from),
        )
        .unwrap()
    }

    fn test_app() -> TestApp {
        let mut suspended = seed_user("USR-5A0002", "gone@ui.ac.id", Role::Mahasiswa, None);
        suspended.suspend();

        let repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::with_users(vec![
            seed_user(ADMIN_ID, "admin@hiringgo.local", Role::Admin, None),
            seed_user(STUDENT_ID, "mhs@ui.ac.id", Role::Mahasiswa, Some("2206000001")),
            suspended,
        ]));
        let hasher: Arc<dyn PasswordHasher> = Arc::new(hasher());

        let key = Arc::new(SigningKey::from_secret(SECRET).unwrap());
        let jwt = Arc::new(JwtService::new(key, Duration::minutes(60)));

        let auth_service = AuthService::new(
            CredentialValidator::new(repository.clone(), hasher.clone()),
            jwt.clone(),
            jwt.clone(),
        );
        let user_service = UserService::new(repository, hasher);

        let state = AppState::new(Arc::new(auth_service), Arc::new(user_service));

        TestApp {
            router: create_router(state, None),
            jwt,
        }
    }

    impl TestApp {
        fn token_for(&self, user_id: &str, role: Role) -> String {
            let identity = Identity::new(user_id, "someone@ui.ac.id", RoleSet::single(role));
            self.jwt.issue(&identity).unwrap().token
        }

        async fn send(&self, request: Request<Body>) -> Response {
            self.router.clone().oneshot(request).await.unwrap()
        }
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn error_code(body: &Value) -> Option<&str> {
        body["error"]["code"].as_str()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = test_app();

        let response = app.send(get_request("/health", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");

        let response = app.send(get_request("/ready", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["checks"][0]["name"], "user_store");

        let response = app.send(get_request("/live", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id_and_security_headers() {
        let app = test_app();

        let response = app.send(get_request("/health", None)).await;

        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[tokio::test]
    async fn test_login_then_me() {
        let app = test_app();

        let response = app
            .send(json_request(
                "POST",
                "/auth/login",
                None,
                json!({"email": "MHS@ui.ac.id", "password": "password123"}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["user"]["id"], STUDENT_ID);
        assert!(body["user"].get("password_hash").is_none());

        let token = body["token"].as_str().unwrap().to_string();
        let response = app.send(get_request("/auth/me", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let me = body_json(response).await;
        assert_eq!(me["user_id"], STUDENT_ID);
        assert_eq!(me["email"], "mhs@ui.ac.id");
        assert_eq!(me["roles"], json!(["mahasiswa"]));
    }

    #[tokio::test]
    async fn test_login_failures_look_the_same() {
        let app = test_app();

        for (email, password) in [
            ("mhs@ui.ac.id", "wrong-password"),
            ("nobody@ui.ac.id", "password123"),
            ("gone@ui.ac.id", "password123"),
        ] {
            let response = app
                .send(json_request(
                    "POST",
                    "/auth/login",
                    None,
                    json!({"email": email, "password": password}),
                ))
                .await;

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", email);
            let body = body_json(response).await;
            assert_eq!(error_code(&body), Some("invalid_credentials"));
            assert_eq!(body["error"]["message"], "Invalid email or password");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let app = test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.send(request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body_json(response).await), Some("json_parse_error"));
    }

    #[tokio::test]
    async fn test_me_without_token() {
        let app = test_app();

        let response = app.send(get_request("/auth/me", None)).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
        assert_eq!(error_code(&body_json(response).await), Some("missing_token"));
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let app = test_app();

        let response = app.send(get_request("/auth/me", Some("not-a-token"))).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
        assert_eq!(error_code(&body_json(response).await), Some("invalid_token"));
    }

    #[tokio::test]
    async fn test_expired_token_gets_challenge() {
        let app = test_app();
        let identity = Identity::new(ADMIN_ID, "admin@hiringgo.local", RoleSet::single(Role::Admin));
        let expired = app
            .jwt
            .issue_at(&identity, Utc::now() - Duration::hours(2))
            .unwrap()
            .token;

        let response = app.send(get_request("/user/list", Some(&expired))).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            r#"Bearer error="invalid_token", error_description="token expired""#
        );
        assert_eq!(error_code(&body_json(response).await), Some("token_expired"));
    }

    #[tokio::test]
    async fn test_logout_acknowledged() {
        let app = test_app();
        let token = app.token_for(STUDENT_ID, Role::Mahasiswa);

        let response = app
            .send(json_request("POST", "/auth/logout", Some(&token), json!({})))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Logged out successfully");
    }

    #[tokio::test]
    async fn test_admin_routes_reject_other_roles() {
        let app = test_app();

        for role in [Role::Mahasiswa, Role::Dosen] {
            let token = app.token_for(STUDENT_ID, role);
            let response = app.send(get_request("/user/list", Some(&token))).await;

            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert_eq!(error_code(&body_json(response).await), Some("access_denied"));
        }

        let response = app.send(get_request("/user/list", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let app = test_app();
        let admin = app.token_for(ADMIN_ID, Role::Admin);

        let response = app
            .send(json_request(
                "POST",
                "/user/create",
                Some(&admin),
                json!({
                    "email": "dosen@ui.ac.id",
                    "name": "Dosen Satu",
                    "password": "password123",
                    "role": "dosen",
                    "nip": "198001012005011001"
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        assert_eq!(created["user"]["role"], "dosen");
        assert_eq!(created["user"]["nip"], "198001012005011001");
        let id = created["user"]["id"].as_str().unwrap().to_string();

        let response = app.send(get_request("/user/list", Some(&admin))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["total"], 4);

        let response = app
            .send(json_request(
                "PATCH",
                &format!("/user/update-role/{}", id),
                Some(&admin),
                json!({"role": "mahasiswa"}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .send(get_request(&format!("/user/{}", id), Some(&admin)))
            .await;
        let fetched = body_json(response).await;
        assert_eq!(fetched["user"]["role"], "mahasiswa");
        assert!(fetched["user"].get("nip").is_none());

        let delete = Request::builder()
            .method("DELETE")
            .uri(format!("/user/delete/{}", id))
            .header(header::AUTHORIZATION, format!("Bearer {}", admin))
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.send(delete).await.status(), StatusCode::OK);

        let response = app
            .send(get_request(&format!("/user/{}", id), Some(&admin)))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_suspended_user_cannot_log_in_until_activated() {
        let app = test_app();
        let admin = app.token_for(ADMIN_ID, Role::Admin);
        let login = || {
            json_request(
                "POST",
                "/auth/login",
                None,
                json!({"email": "mhs@ui.ac.id", "password": "password123"}),
            )
        };

        let response = app
            .send(json_request(
                "PATCH",
                &format!("/user/suspend/{}", STUDENT_ID),
                Some(&admin),
                json!({}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            format!("User {} suspended", STUDENT_ID)
        );

        let response = app
            .send(get_request(&format!("/user/{}", STUDENT_ID), Some(&admin)))
            .await;
        assert_eq!(body_json(response).await["user"]["status"], "suspended");

        let response = app.send(login()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            error_code(&body_json(response).await),
            Some("invalid_credentials")
        );

        let response = app
            .send(json_request(
                "PATCH",
                &format!("/user/activate/{}", STUDENT_ID),
                Some(&admin),
                json!({}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.send(login()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_routes_guarded_and_not_found() {
        let app = test_app();
        let admin = app.token_for(ADMIN_ID, Role::Admin);
        let student = app.token_for(STUDENT_ID, Role::Mahasiswa);

        for action in ["suspend", "activate"] {
            let response = app
                .send(json_request(
                    "PATCH",
                    &format!("/user/{}/{}", action, ADMIN_ID),
                    Some(&student),
                    json!({}),
                ))
                .await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);

            let response = app
                .send(json_request(
                    "PATCH",
                    &format!("/user/{}/USR-FFFFFF", action),
                    Some(&admin),
                    json!({}),
                ))
                .await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_update_role_error_names_role_param() {
        let app = test_app();
        let admin = app.token_for(ADMIN_ID, Role::Admin);

        let response = app
            .send(json_request(
                "PATCH",
                &format!("/user/update-role/{}", STUDENT_ID),
                Some(&admin),
                json!({"role": "janitor"}),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["param"], "role");
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let app = test_app();
        let admin = app.token_for(ADMIN_ID, Role::Admin);

        let response = app
            .send(json_request(
                "POST",
                "/user/create",
                Some(&admin),
                json!({
                    "email": "dosen2@ui.ac.id",
                    "name": "Tanpa NIP",
                    "password": "password123",
                    "role": "dosen"
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .send(json_request(
                "POST",
                "/user/create",
                Some(&admin),
                json!({
                    "email": "mhs@ui.ac.id",
                    "name": "Duplikat",
                    "password": "password123",
                    "role": "mahasiswa"
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Email already registered");
        assert_eq!(error_code(&body), Some("conflict"));

        let response = app
            .send(json_request(
                "POST",
                "/user/create",
                Some(&admin),
                json!({
                    "email": "new@ui.ac.id",
                    "name": "Peran Aneh",
                    "password": "password123",
                    "role": "superuser"
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_unknown_user() {
        let app = test_app();
        let admin = app.token_for(ADMIN_ID, Role::Admin);

        let delete = Request::builder()
            .method("DELETE")
            .uri("/user/delete/USR-FFFFFF")
            .header(header::AUTHORIZATION, format!("Bearer {}", admin))
            .body(Body::empty())
            .unwrap();
        let response = app.send(delete).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
