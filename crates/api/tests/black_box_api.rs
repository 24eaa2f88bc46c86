use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use billfold_api::app::{app_with_services, services::AppServices};
use billfold_api::config::AppConfig;
use billfold_mailer::{MailError, Mailer, OutboundEmail};

/// Captures outbound email so tests can follow magic links.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    fn all(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    fn last(&self) -> OutboundEmail {
        self.all().last().cloned().expect("no email was sent")
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

struct TestServer {
    base_url: String,
    mailer: Arc<RecordingMailer>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, with in-memory stores and a recording mailer,
        // bound to an ephemeral port.
        let mailer = Arc::new(RecordingMailer::default());
        let services =
            AppServices::in_memory(AppConfig::for_tests("test-secret")).with_mailer(mailer.clone());
        let app = app_with_services(Arc::new(services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, mailer, handle }
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("failed to build client")
    }

    /// Run the full signin → magic link → verify flow; the returned client
    /// carries the session cookie.
    async fn signed_in_client(&self, email: &str) -> reqwest::Client {
        let client = self.client();

        let res = client
            .post(format!("{}/auth/signin", self.base_url))
            .json(&json!({ "email": email }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let token = extract_token(&self.mailer.last().text);
        let res = client
            .post(format!("{}/auth/verify", self.base_url))
            .json(&json!({ "token": token }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn extract_token(text: &str) -> String {
    let start = text.find("token=").expect("no token in email") + "token=".len();
    text[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}

fn sample_invoice() -> serde_json::Value {
    json!({
        "sender": { "name": "Acme GmbH", "city": "Berlin" },
        "receiver": { "name": "Globex Ltd", "email": "ap@globex.test" },
        "details": {
            "invoiceNumber": "INV-100",
            "currency": "EUR",
            "status": "draft",
            "items": [
                { "name": "Consulting", "quantity": 2, "unitPrice": 100, "tax": { "amount": 10, "amountType": "percentage" } }
            ]
        }
    })
}

#[tokio::test]
async fn health_is_open() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_endpoints_require_a_session() {
    let srv = TestServer::spawn().await;
    let client = srv.client();

    for path in ["/auth/me", "/invoices"] {
        let res = client.get(format!("{}{path}", srv.base_url)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn signin_rejects_malformed_email() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client()
        .post(format!("{}/auth/signin", srv.base_url))
        .json(&json!({ "email": "not-an-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn magic_link_flow_establishes_a_session() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("User@Example.com").await;

    let res = client.get(format!("{}/auth/me", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], "user@example.com");
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn magic_link_is_single_use() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("a@b.co").await;

    // The token was consumed during signed_in_client; replaying it fails.
    let token = extract_token(&srv.mailer.last().text);
    let res = client
        .post(format!("{}/auth/verify", srv.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn localized_signin_email() {
    let srv = TestServer::spawn().await;
    let client = srv.client();

    let res = client
        .post(format!("{}/auth/signin", srv.base_url))
        .header("x-locale", "de")
        .json(&json!({ "email": "de@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let email = srv.mailer.last();
    assert!(email.subject.contains("Anmeldelink"));
    assert!(email.text.contains("/de/verify?token="));
}

#[tokio::test]
async fn invoice_crud_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("crud@example.com").await;

    // Create: totals are computed server-side.
    let res = client
        .post(format!("{}/invoices", srv.base_url))
        .json(&sample_invoice())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["details"]["subTotal"], 200.0);
    assert_eq!(created["details"]["totalAmount"], 220.0);

    // Read.
    let res = client.get(format!("{}/invoices/{id}", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Update: status flips, totals recompute.
    let mut update = sample_invoice();
    update["details"]["status"] = json!("paid");
    update["details"]["items"][0]["quantity"] = json!(3);
    let res = client
        .put(format!("{}/invoices/{id}", srv.base_url))
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["details"]["status"], "paid");
    assert_eq!(updated["details"]["subTotal"], 300.0);

    // Delete.
    let res = client.delete(format!("{}/invoices/{id}", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client.get(format!("{}/invoices/{id}", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_documents_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("bad@example.com").await;

    // Items must be an array of objects.
    let res = client
        .post(format!("{}/invoices", srv.base_url))
        .json(&json!({ "details": { "items": [42] } }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invoices_are_owner_scoped() {
    let srv = TestServer::spawn().await;
    let alice = srv.signed_in_client("alice@example.com").await;
    let bob = srv.signed_in_client("bob@example.com").await;

    let res = alice
        .post(format!("{}/invoices", srv.base_url))
        .json(&sample_invoice())
        .send()
        .await
        .unwrap();
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap();

    let res = bob.get(format!("{}/invoices/{id}", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = bob.delete(format!("{}/invoices/{id}", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = bob.get(format!("{}/invoices", srv.base_url)).send().await.unwrap();
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn listing_paginates_and_filters() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("list@example.com").await;

    for i in 0..12 {
        let mut doc = sample_invoice();
        doc["details"]["invoiceNumber"] = json!(format!("INV-{i}"));
        doc["details"]["status"] = json!(if i % 2 == 0 { "draft" } else { "paid" });
        let res = client
            .post(format!("{}/invoices", srv.base_url))
            .json(&doc)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let page: serde_json::Value = client
        .get(format!("{}/invoices", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 12);
    assert_eq!(page["items"].as_array().unwrap().len(), 9);
    assert_eq!(page["totalPages"], 2);

    let filtered: serde_json::Value = client
        .get(format!("{}/invoices?status=paid&limit=20", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(filtered["total"], 6);

    let searched: serde_json::Value = client
        .get(format!("{}/invoices?search=INV-11", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(searched["total"], 1);
}

#[tokio::test]
async fn duplicating_suffixes_the_invoice_number() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("dup@example.com").await;

    let created: serde_json::Value = client
        .post(format!("{}/invoices", srv.base_url))
        .json(&sample_invoice())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/invoices/{id}/duplicate", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let copy: serde_json::Value = res.json().await.unwrap();
    assert_eq!(copy["details"]["invoiceNumber"], "INV-100-COPY");
    assert_ne!(copy["id"], created["id"]);
}

#[tokio::test]
async fn generate_returns_a_printable_html_document() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("gen@example.com").await;

    let res = client
        .post(format!("{}/invoice/generate", srv.base_url))
        .json(&sample_invoice())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = res.text().await.unwrap();
    assert!(html.contains("INV-100"));
    assert!(html.contains("Consulting"));
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("tpl@example.com").await;

    let mut doc = sample_invoice();
    doc["details"]["pdfTemplate"] = json!(9);
    let res = client
        .post(format!("{}/invoice/generate", srv.base_url))
        .json(&doc)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_format_switch() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("export@example.com").await;

    let res = client
        .post(format!("{}/invoice/export?format=json", srv.base_url))
        .json(&sample_invoice())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    // Normalized on the way out.
    assert_eq!(body["details"]["totalAmount"], 220.0);

    let res = client
        .post(format!("{}/invoice/export?format=csv", srv.base_url))
        .json(&sample_invoice())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let csv = res.text().await.unwrap();
    assert!(csv.lines().next().unwrap().contains("details.invoiceNumber"));

    let res = client
        .post(format!("{}/invoice/export?format=xlsx", srv.base_url))
        .json(&sample_invoice())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_IMPLEMENTED);

    let res = client
        .post(format!("{}/invoice/export?format=docx", srv.base_url))
        .json(&sample_invoice())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn send_emails_an_uploaded_document() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("send@example.com").await;

    let form = reqwest::multipart::Form::new()
        .text("email", "recipient@example.com")
        .text("invoiceNumber", "INV-100")
        .part(
            "invoicePdf",
            reqwest::multipart::Part::bytes(b"%PDF-1.4 fake".to_vec())
                .file_name("invoice-INV-100.pdf")
                .mime_str("application/pdf")
                .unwrap(),
        );

    let res = client
        .post(format!("{}/invoice/send", srv.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let email = srv.mailer.last();
    assert_eq!(email.to, "recipient@example.com");
    assert_eq!(email.subject, "Invoice INV-100");
    assert_eq!(email.attachments.len(), 1);
    assert_eq!(email.attachments[0].filename, "invoice-INV-100.pdf");
}

#[tokio::test]
async fn send_requires_a_valid_recipient() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("send2@example.com").await;

    let form = reqwest::multipart::Form::new().text("email", "nope");
    let res = client
        .post(format!("{}/invoice/send", srv.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn email_renders_and_sends_a_stored_invoice() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("mailer@example.com").await;

    let created: serde_json::Value = client
        .post(format!("{}/invoices", srv.base_url))
        .json(&sample_invoice())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/invoice/email", srv.base_url))
        .json(&json!({
            "invoiceId": id,
            "recipient": "ap@globex.test",
            "subject": "Your March invoice",
            "message": "Please find it attached."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let email = srv.mailer.last();
    assert_eq!(email.to, "ap@globex.test");
    assert_eq!(email.subject, "Your March invoice");
    assert_eq!(email.attachments[0].filename, "invoice-INV-100.html");
    let html = String::from_utf8(email.attachments[0].content.clone()).unwrap();
    assert!(html.contains("INV-100"));
}

#[tokio::test]
async fn parsing_is_unavailable_without_configuration() {
    let srv = TestServer::spawn().await;
    let client = srv.client();

    let res = client
        .post(format!("{}/invoice/parse/text", srv.base_url))
        .json(&json!({ "text": "Invoice from Acme for 2 widgets at $10" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Missing text is rejected before the configuration check.
    let res = client
        .post(format!("{}/invoice/parse/text", srv.base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn places_lookup_is_unavailable_without_configuration() {
    let srv = TestServer::spawn().await;
    let client = srv.client();

    let res = client
        .get(format!("{}/places/autocomplete?input=123+Main", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let res = client
        .get(format!("{}/places/autocomplete", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signout_clears_the_session_cookie() {
    let srv = TestServer::spawn().await;
    let client = srv.signed_in_client("out@example.com").await;

    let res = client.post(format!("{}/auth/signout", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(format!("{}/auth/me", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
