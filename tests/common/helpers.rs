use fake::{
    faker::internet::en::{Password, SafeEmail},
    Fake,
};
use otpreset::{
    app::{
        password::{compute_password_hash, verify_password_hash},
        store::{
            memory::{MemoryOtpStore, MemoryUserStore},
            NewOtp, User, UserStore,
        },
        Application,
    },
    config::AppConfig,
    telemetry::{build_telemetry, register_telemetry},
};
use secrecy::SecretString;
use std::sync::{Arc, LazyLock};
use time::OffsetDateTime;
use uuid::Uuid;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

static TELEMETRY: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let telemetry = build_telemetry(subscriber_name, default_filter_level, std::io::stdout);
        register_telemetry(telemetry);
    } else {
        let null_telemetry = build_telemetry(subscriber_name, default_filter_level, std::io::sink);
        register_telemetry(null_telemetry);
    };
});

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub users: Arc<MemoryUserStore>,
    pub otps: Arc<MemoryOtpStore>,
    pub email_server: MockServer,
    pub test_user: TestUser,
}

impl TestApp {
    pub async fn post_otp<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(&format!("{}/auth/otp", &self.address))
            .json(body)
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn post_reset_password<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(&format!("{}/auth/reset-password", &self.address))
            .json(body)
            .send()
            .await
            .expect("failed to execute request")
    }

    /// Accept every email sent to the provider.
    pub async fn mock_email_ok(&self) {
        Mock::given(method("POST"))
            .and(path("/smtp/email"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.email_server)
            .await;
    }

    /// Store a valid OTP for the test user, bypassing the endpoint.
    pub async fn store_otp(&self, code: &str, created_at: OffsetDateTime, is_expired: bool) {
        use otpreset::app::store::OtpStore;

        self.otps
            .create(NewOtp {
                email: self.test_user.email.clone(),
                code: code.to_string(),
                created_at,
                is_expired,
            })
            .await
            .expect("failed to store otp");
    }

    pub async fn password_matches(&self, candidate: &str) -> bool {
        let user = self
            .users
            .find_by_email(&self.test_user.email)
            .await
            .unwrap()
            .expect("test user is missing");

        verify_password_hash(
            SecretString::from(user.password_hash),
            SecretString::from(candidate.to_string()),
        )
        .await
        .unwrap()
    }
}

pub struct TestUser {
    pub user_id: Uuid,
    pub email: String,
    pub password: String,
}

impl TestUser {
    pub fn generate() -> Self {
        TestUser {
            user_id: Uuid::new_v4(),
            email: SafeEmail().fake(),
            password: Password(8..16).fake(),
        }
    }

    async fn store(&self, users: &MemoryUserStore) {
        let password_hash = compute_password_hash(SecretString::from(self.password.clone()))
            .await
            .expect("failed to hash test password");

        users
            .insert(User {
                user_id: self.user_id,
                email: self.email.clone(),
                password_hash,
            })
            .expect("failed to store test user");
    }
}

fn test_config(email_server: &MockServer) -> AppConfig {
    AppConfig {
        // Use a random OS port
        app_application_port: 0,
        app_application_host: "127.0.0.1".to_string(),
        db_host: "localhost".to_string(),
        db_port: 5432,
        db_username: "postgres".to_string(),
        db_password: SecretString::from("password".to_string()),
        db_name: Uuid::new_v4().to_string(),
        db_require_ssl: false,
        brevo_api_key: SecretString::from("test-api-key".to_string()),
        brevo_base_url: email_server.uri(),
        mail_id: "no-reply@example.com".to_string(),
        mail_sender_name: "OTP Service".to_string(),
        otp_validity_minutes: 5,
    }
}

pub async fn spawn_app() -> TestApp {
    LazyLock::force(&TELEMETRY);

    let email_server = MockServer::start().await;

    let users = Arc::new(MemoryUserStore::default());
    let otps = Arc::new(MemoryOtpStore::default());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let app =
        Application::build_with_stores(test_config(&email_server), users.clone(), otps.clone())
            .await
            .unwrap();

    let test_app = TestApp {
        address: format!("http://127.0.0.1:{}", &app.port),
        api_client,
        users,
        otps,
        email_server,
        test_user: TestUser::generate(),
    };

    _ = tokio::spawn(app.run_until_stopped());

    test_app.test_user.store(&test_app.users).await;

    test_app
}
