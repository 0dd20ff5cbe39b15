//! Shared fakes for invoicing-service integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use invoicing_service::actions::InvoiceActions;
use invoicing_service::models::{
    FormData, Invoice, InvoiceChanges, InvoiceId, InvoiceStatus, NewInvoice, NewUser, User,
};
use invoicing_service::services::{
    AuthenticatedUser, CredentialVerifier, InvoiceStore, MemoryPageCache, PageCache,
    SignInOutcome, UserDirectory,
};
use service_core::error::AppError;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

pub const TEST_CUSTOMER_ID: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";
pub const TEST_EMAIL: &str = "user@nextmail.com";
pub const TEST_PASSWORD: &str = "123456";

/// Everything the fakes saw, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Insert(NewInvoice),
    Update(InvoiceId, InvoiceChanges),
    Delete(InvoiceId),
    List,
    Revalidate(String),
    SignIn(String),
}

pub type Timeline = Arc<Mutex<Vec<Event>>>;

fn record(timeline: &Timeline, event: Event) {
    timeline.lock().unwrap().push(event);
}

/// Pauses `list_invoices` between reading its rows and returning them.
#[derive(Default)]
pub struct ListGate {
    pub snapshot_taken: Notify,
    pub release: Notify,
}

/// In-memory `InvoiceStore` that can be told to fail.
pub struct RecordingStore {
    timeline: Timeline,
    fail: bool,
    rows_affected: u64,
    invoices: Mutex<Vec<Invoice>>,
    list_gate: Option<Arc<ListGate>>,
}

impl RecordingStore {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            fail: false,
            rows_affected: 1,
            invoices: Mutex::new(Vec::new()),
            list_gate: None,
        }
    }

    pub fn gated(timeline: Timeline, gate: Arc<ListGate>) -> Self {
        Self {
            list_gate: Some(gate),
            ..Self::new(timeline)
        }
    }

    pub fn failing(timeline: Timeline) -> Self {
        Self {
            fail: true,
            ..Self::new(timeline)
        }
    }

    pub fn matching_no_rows(timeline: Timeline) -> Self {
        Self {
            rows_affected: 0,
            ..Self::new(timeline)
        }
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail {
            Err(AppError::DatabaseError(anyhow::anyhow!(
                "connection refused"
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InvoiceStore for RecordingStore {
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), AppError> {
        record(&self.timeline, Event::Insert(invoice.clone()));
        self.check()?;
        self.invoices.lock().unwrap().push(Invoice {
            id: Uuid::new_v4(),
            customer_id: Uuid::parse_str(&invoice.customer_id).unwrap_or_default(),
            amount: invoice.amount_in_cents,
            status: invoice.status.as_str().to_string(),
            date: invoice.date,
        });
        Ok(())
    }

    async fn update_invoice(
        &self,
        id: &InvoiceId,
        changes: &InvoiceChanges,
    ) -> Result<u64, AppError> {
        record(&self.timeline, Event::Update(id.clone(), changes.clone()));
        self.check()?;
        Ok(self.rows_affected)
    }

    async fn delete_invoice(&self, id: &InvoiceId) -> Result<u64, AppError> {
        record(&self.timeline, Event::Delete(id.clone()));
        self.check()?;
        Ok(self.rows_affected)
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, AppError> {
        record(&self.timeline, Event::List);
        self.check()?;
        let snapshot = self.invoices.lock().unwrap().clone();
        if let Some(gate) = &self.list_gate {
            gate.snapshot_taken.notify_one();
            gate.release.notified().await;
        }
        Ok(snapshot)
    }
}

/// `MemoryPageCache` that also logs invalidations.
pub struct RecordingCache {
    timeline: Timeline,
    inner: MemoryPageCache,
}

impl RecordingCache {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            inner: MemoryPageCache::new(),
        }
    }
}

impl PageCache for RecordingCache {
    fn get(&self, path: &str) -> Option<String> {
        self.inner.get(path)
    }

    fn generation(&self) -> u64 {
        self.inner.generation()
    }

    fn store(&self, path: &str, generation: u64, body: String) -> bool {
        self.inner.store(path, generation, body)
    }

    fn revalidate_path(&self, path: &str) {
        record(&self.timeline, Event::Revalidate(path.to_string()));
        self.inner.revalidate_path(path);
    }
}

/// What the stub verifier answers with.
#[derive(Debug, Clone)]
pub enum StubAnswer {
    Outcome(SignInOutcome),
    Unclassified(&'static str),
}

pub struct StubVerifier {
    timeline: Timeline,
    answer: StubAnswer,
}

impl StubVerifier {
    pub fn new(timeline: Timeline, answer: StubAnswer) -> Self {
        Self { timeline, answer }
    }
}

#[async_trait]
impl CredentialVerifier for StubVerifier {
    async fn sign_in(
        &self,
        strategy: &str,
        _form: &FormData,
    ) -> Result<SignInOutcome, anyhow::Error> {
        record(&self.timeline, Event::SignIn(strategy.to_string()));
        match &self.answer {
            StubAnswer::Outcome(outcome) => Ok(outcome.clone()),
            StubAnswer::Unclassified(message) => Err(anyhow::anyhow!(*message)),
        }
    }
}

/// `UserDirectory` over an in-memory list, optionally failing every call.
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
    fail: bool,
}

impl InMemoryUsers {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail {
            Err(AppError::DatabaseError(anyhow::anyhow!("pool timed out")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUsers {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<bool, AppError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        users.push(User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            password: user.password_hash.clone(),
        });
        Ok(true)
    }
}

pub fn signed_in_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::parse_str("410544b2-4001-4271-9855-fec4b6a6442a").unwrap(),
        email: TEST_EMAIL.to_string(),
        name: "User".to_string(),
    }
}

/// Actions wired to fakes that share one timeline.
pub struct TestActions {
    pub actions: InvoiceActions,
    pub timeline: Timeline,
}

impl TestActions {
    pub fn new() -> Self {
        Self::build(RecordingStore::new, StubAnswer::Outcome(SignInOutcome::SignedIn(signed_in_user())))
    }

    pub fn with_failing_store() -> Self {
        Self::build(
            RecordingStore::failing,
            StubAnswer::Outcome(SignInOutcome::SignedIn(signed_in_user())),
        )
    }

    pub fn with_store(make_store: fn(Timeline) -> RecordingStore) -> Self {
        Self::build(make_store, StubAnswer::Outcome(SignInOutcome::SignedIn(signed_in_user())))
    }

    /// Listing reads block on the returned gate.
    pub fn with_gated_listing() -> (Self, Arc<ListGate>) {
        let gate = Arc::new(ListGate::default());
        let store_gate = gate.clone();
        let test = Self::build(
            move |timeline| RecordingStore::gated(timeline, store_gate),
            StubAnswer::Outcome(SignInOutcome::SignedIn(signed_in_user())),
        );
        (test, gate)
    }

    pub fn with_verifier(answer: StubAnswer) -> Self {
        Self::build(RecordingStore::new, answer)
    }

    fn build(make_store: impl FnOnce(Timeline) -> RecordingStore, answer: StubAnswer) -> Self {
        let timeline: Timeline = Arc::new(Mutex::new(Vec::new()));
        let actions = InvoiceActions::new(
            Arc::new(make_store(timeline.clone())),
            Arc::new(RecordingCache::new(timeline.clone())),
            Arc::new(StubVerifier::new(timeline.clone(), answer)),
        );
        Self { actions, timeline }
    }

    pub fn events(&self) -> Vec<Event> {
        self.timeline.lock().unwrap().clone()
    }
}

pub fn invoice_form(customer_id: &str, amount: &str, status: &str) -> FormData {
    FormData::new()
        .with("customerId", customer_id)
        .with("amount", amount)
        .with("status", status)
}

pub fn pending(customer_id: &str, amount_in_cents: i64) -> InvoiceChanges {
    InvoiceChanges {
        customer_id: customer_id.to_string(),
        amount_in_cents,
        status: InvoiceStatus::Pending,
    }
}
