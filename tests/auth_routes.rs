use account_api::auth::responses::RegisterRequest;
use account_api::auth::routes as auth_routes;
use account_api::test_support::{TestDatabase, TestFixtures, TestRocketBuilder, build_auth_state};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::routes;
use serde_json::{Value, json};

async fn auth_client(state: account_api::auth::AuthState) -> Client {
    TestRocketBuilder::new()
        .manage_auth_state(state)
        .mount_api_routes(routes![
            auth_routes::register,
            auth_routes::login,
            auth_routes::logout
        ])
        .async_client()
        .await
}

#[tokio::test]
async fn register_then_login_round_trip() {
    let test_db = TestDatabase::new()
        .await
        .expect("failed to provision test database (docker required)");
    let pool = test_db.pool_clone();
    let state = build_auth_state(pool.clone(), 900);
    let client = auth_client(state.clone()).await;
    {

    let response = client
        .post("/api/v1/auth/register")
        .header(ContentType::JSON)
        .body(
            json!({
                "username": "alice",
                "email": "alice@x.com",
                "password": "secret1",
                "display_name": "Alice"
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let payload: Value = response.into_json().await.expect("valid JSON payload");
    let token = payload["token"].as_str().expect("token present");
    let user = &payload["user"];
    assert_eq!(user["username"], "alice");
    assert_eq!(user["role"], "user");
    assert_eq!(user["is_active"], true);
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
    let registered_id = user["id"].as_i64().expect("numeric id") as i32;

    // The returned token verifies and decodes to the stored principal.
    let claims = state.jwt.decode_token(token).expect("token verifies");
    assert_eq!(claims.user_id().expect("numeric sub"), registered_id);
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.role, "user");

    // Wrong password and unknown identifier produce the identical error.
    let response = client
        .post("/api/v1/auth/login")
        .header(ContentType::JSON)
        .body(json!({"identifier": "alice", "password": "wrong"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    let wrong_password: Value = response.into_json().await.expect("valid JSON payload");

    let response = client
        .post("/api/v1/auth/login")
        .header(ContentType::JSON)
        .body(json!({"identifier": "nobody", "password": "secret1"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    let unknown_identifier: Value = response.into_json().await.expect("valid JSON payload");

    assert_eq!(wrong_password["message"], unknown_identifier["message"]);
    assert_eq!(wrong_password["message"], "invalid credentials");

    // Correct login by username.
    let response = client
        .post("/api/v1/auth/login")
        .header(ContentType::JSON)
        .body(json!({"identifier": "alice", "password": "secret1"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let payload: Value = response.into_json().await.expect("valid JSON payload");
    let claims = state
        .jwt
        .decode_token(payload["token"].as_str().expect("token present"))
        .expect("token verifies");
    assert_eq!(claims.user_id().expect("numeric sub"), registered_id);

    // The identifier also matches the email, case-insensitively.
    let response = client
        .post("/api/v1/auth/login")
        .header(ContentType::JSON)
        .body(json!({"identifier": "ALICE@X.COM", "password": "secret1"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // Logout is a stateless acknowledgment.
    let response = client.post("/api/v1/auth/logout").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    }
    drop(client);
    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn duplicate_registrations_conflict() {
    let test_db = TestDatabase::new()
        .await
        .expect("failed to provision test database (docker required)");
    let pool = test_db.pool_clone();
    let state = build_auth_state(pool.clone(), 900);
    let client = auth_client(state.clone()).await;
    {

    let response = client
        .post("/api/v1/auth/register")
        .header(ContentType::JSON)
        .body(
            json!({
                "username": "bob",
                "email": "bob@x.com",
                "password": "secret1",
                "display_name": "Bob"
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    // Same username, different email.
    let response = client
        .post("/api/v1/auth/register")
        .header(ContentType::JSON)
        .body(
            json!({
                "username": "Bob",
                "email": "other@x.com",
                "password": "secret1",
                "display_name": "Impostor"
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);

    // Different username, same email.
    let response = client
        .post("/api/v1/auth/register")
        .header(ContentType::JSON)
        .body(
            json!({
                "username": "robert",
                "email": "bob@x.com",
                "password": "secret1",
                "display_name": "Impostor"
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);

    // The losers left no partial rows behind.
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .expect("count query");
    assert_eq!(rows, 1);

    // Two registrations racing on the same username are settled by the
    // storage constraint: exactly one wins.
    let request = || RegisterRequest {
        username: "carol".into(),
        email: "carol@x.com".into(),
        password: "secret1".into(),
        display_name: "Carol".into(),
        age: None,
        bio: None,
    };
    let (first, second) = tokio::join!(
        state.accounts.register(request()),
        state.accounts.register(request())
    );
    assert!(first.is_ok() != second.is_ok(), "exactly one racer wins");

    let carols: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = 'carol'")
            .fetch_one(&pool)
            .await
            .expect("count query");
    assert_eq!(carols, 1);

    }
    drop(client);
    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn invalid_registrations_are_rejected() {
    let test_db = TestDatabase::new()
        .await
        .expect("failed to provision test database (docker required)");
    let pool = test_db.pool_clone();
    let client = auth_client(build_auth_state(pool.clone(), 900)).await;
    {

    let cases = [
        json!({"username": "ab", "email": "ok@x.com", "password": "secret1", "display_name": "A"}),
        json!({"username": "a".repeat(51), "email": "ok@x.com", "password": "secret1", "display_name": "A"}),
        json!({"username": "dave", "email": "not-an-email", "password": "secret1", "display_name": "Dave"}),
        json!({"username": "dave", "email": "dave@x.com", "password": "short", "display_name": "Dave"}),
        json!({"username": "dave", "email": "dave@x.com", "password": "secret1", "display_name": "  "}),
    ];

    for body in cases {
        let response = client
            .post("/api/v1/auth/register")
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest, "case: {body}");
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .expect("count query");
    assert_eq!(rows, 0);

    }
    drop(client);
    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn deactivated_account_cannot_login() {
    let test_db = TestDatabase::new()
        .await
        .expect("failed to provision test database (docker required)");
    let pool = test_db.pool_clone();
    let state = build_auth_state(pool.clone(), 900);

    let hash = state
        .passwords
        .hash_password("secret1")
        .expect("hash password");
    TestFixtures::new(&pool)
        .insert_user("mallory", "mallory@x.com", "Mallory", "user", &hash, false)
        .await
        .expect("insert deactivated user");

    let client = auth_client(state).await;
    {
    let response = client
        .post("/api/v1/auth/login")
        .header(ContentType::JSON)
        .body(json!({"identifier": "mallory", "password": "secret1"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let payload: Value = response.into_json().await.expect("valid JSON payload");
    assert_eq!(payload["message"], "account is deactivated");

    }
    drop(client);
    test_db.close().await.expect("failed to drop test database");
}
