//! End-to-end tests for the dashboard client: a real server on an ephemeral
//! port, driven through `ApiClient`, `SessionHolder` and the wizard.

use std::sync::{Arc, Mutex};

use farmhub::{
    app::build_app,
    client::{
        ApiClient, AuthApi, ClientError, Field, FileTokenStore, MemoryTokenStore, Navigator,
        RegistrationWizard, SessionHolder, TokenStore, View, WizardError,
    },
    state::AppState,
};

#[derive(Default)]
struct Recorder(Mutex<Vec<View>>);

impl Navigator for Recorder {
    fn navigate(&self, view: View) {
        self.0.lock().unwrap().push(view);
    }
}

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(AppState::fake());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn fill(w: &mut RegistrationWizard) {
    for (field, value) in [
        (Field::FullName, "A"),
        (Field::Email, "a@x.com"),
        (Field::Password, "p"),
        (Field::Phone, "1"),
        (Field::Language, "en"),
        (Field::FarmName, "F"),
        (Field::FarmLocation, "L"),
        (Field::FarmSize, "5"),
        (Field::PrimaryCrops, "Wheat"),
        (Field::SprayerType, "Manual"),
        (Field::IotDevices, "1"),
        (Field::Machinery, "Tractor"),
        (Field::Pesticides, "X"),
        (Field::FertilizerPreference, "Organic"),
        (Field::MonthlyExpenditure, "100"),
    ] {
        w.set(field, value);
    }
}

#[tokio::test]
async fn wizard_registers_then_session_survives_restart() {
    let base = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let api: Arc<dyn AuthApi> = Arc::new(ApiClient::new(&base).unwrap());

    let session = SessionHolder::new(
        api.clone(),
        Arc::new(FileTokenStore::new(dir.path())),
        Arc::new(Recorder::default()),
    );
    let mut rx = session.subscribe();

    let mut wizard = RegistrationWizard::new();
    fill(&mut wizard);
    let user = wizard.submit(&session).await.unwrap();
    assert_eq!(user.email, "a@x.com");
    assert_eq!(user.profile.monthly_expenditure, Some(100.0));

    rx.changed().await.unwrap();
    let published = rx.borrow().clone().unwrap();
    assert_eq!(published.user.id, user.id);

    // a new holder over the same directory picks the session back up
    let restarted = SessionHolder::new(
        api,
        Arc::new(FileTokenStore::new(dir.path())),
        Arc::new(Recorder::default()),
    );
    let restored = restarted.start().await.unwrap();
    assert_eq!(restored.id, user.id);

    let listing = restarted.list_users().await.unwrap();
    assert_eq!(listing.count, 1);
}

#[tokio::test]
async fn resubmitting_same_email_shows_server_message() {
    let base = spawn_server().await;
    let api: Arc<dyn AuthApi> = Arc::new(ApiClient::new(&base).unwrap());
    let session = SessionHolder::new(
        api,
        Arc::new(MemoryTokenStore::new()),
        Arc::new(Recorder::default()),
    );

    let mut first = RegistrationWizard::new();
    fill(&mut first);
    first.submit(&session).await.unwrap();

    let mut second = RegistrationWizard::new();
    fill(&mut second);
    let err = second.submit(&session).await.unwrap_err();
    assert!(matches!(err, WizardError::Submit(ClientError::Server { status: 400, .. })));
    assert_eq!(err.to_string(), "User with this email already exists");
}

#[tokio::test]
async fn wrong_password_keeps_user_signed_out() {
    let base = spawn_server().await;
    let api = ApiClient::new(&base).unwrap();
    let mut wizard = RegistrationWizard::new();
    fill(&mut wizard);
    api.register(&wizard.to_request().unwrap()).await.unwrap();

    let store = Arc::new(MemoryTokenStore::new());
    let session = SessionHolder::new(Arc::new(api), store.clone(), Arc::new(Recorder::default()));
    let err = session.login("a@x.com", "wrong").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(store.load().is_none());

    session.login("a@x.com", "p").await.unwrap();
    assert!(store.load().is_some());
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let api = ApiClient::new(format!("http://127.0.0.1:{port}/api")).unwrap();
    let session = SessionHolder::new(
        Arc::new(api),
        Arc::new(MemoryTokenStore::new()),
        Arc::new(Recorder::default()),
    );

    let err = session.login("a@x.com", "p").await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(
        err.user_message(),
        "Unable to connect to server. Please check your internet connection."
    );
}

#[tokio::test]
async fn guard_sends_anonymous_users_to_login() {
    let nav = Arc::new(Recorder::default());
    let api = ApiClient::new("http://127.0.0.1:1/api").unwrap();
    let session = SessionHolder::new(Arc::new(api), Arc::new(MemoryTokenStore::new()), nav.clone());

    assert!(!session.can_activate(View::Dashboard));
    assert!(session.can_activate(View::Register));
    assert_eq!(*nav.0.lock().unwrap(), vec![View::Login]);
}
