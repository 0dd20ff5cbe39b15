//! Dashboard actions: the four mutations behind the invoice forms.
//!
//! Each action is stateless. Validation and persistence failures are folded
//! into a returned `FormState`; only unclassified sign-in errors escape as
//! `Err`.

use crate::models::{FormData, FormState, InvoiceId, NewInvoice};
use crate::schema::{CreateInvoice, InvoiceSchema, UpdateInvoice, ValidationResult};
use crate::services::metrics::{record_action, LOGIN_ATTEMPTS_TOTAL};
use crate::services::{
    AuthErrorKind, AuthenticatedUser, CredentialVerifier, InvoiceStore, PageCache, SignInOutcome,
    CREDENTIALS_STRATEGY,
};
use chrono::Utc;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Listing route: invalidated after every write, redirect target after create/update.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

pub const CREATE_INVALID_MESSAGE: &str = "Missing Fields. Failed to Create Invoice.";
pub const CREATE_DATABASE_MESSAGE: &str = "Database Error: Failed to Create Invoice.";
pub const UPDATE_INVALID_MESSAGE: &str = "Missing Fields. Failed to Update Invoice.";
pub const UPDATE_DATABASE_MESSAGE: &str = "Database Error: Failed to Update Invoice.";
pub const DELETE_DATABASE_MESSAGE: &str = "Database Error: Failed to Delete Invoice.";

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials.";
pub const SIGN_IN_FAILED_MESSAGE: &str = "Something went wrong.";

/// Result of a create or update submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The write happened; navigation to the target is final.
    Redirect(&'static str),
    /// Re-render the form with this state.
    Render(FormState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed(FormState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn(AuthenticatedUser),
    /// Classified failure, carrying the message to show on the login form.
    Rejected(&'static str),
}

/// The invoice mutation service.
#[derive(Clone)]
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    cache: Arc<dyn PageCache>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl InvoiceActions {
    pub fn new(
        store: Arc<dyn InvoiceStore>,
        cache: Arc<dyn PageCache>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            store,
            cache,
            verifier,
        }
    }

    pub fn store(&self) -> &Arc<dyn InvoiceStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn PageCache> {
        &self.cache
    }

    #[instrument(skip_all)]
    pub async fn create_invoice(&self, prior_state: &FormState, form: &FormData) -> FormOutcome {
        if prior_state.has_field_errors() {
            debug!("Create invoice resubmitted after failed validation");
        }

        let changes = match CreateInvoice::safe_parse(form) {
            ValidationResult::Success(changes) => changes,
            ValidationResult::Failure {
                field_errors,
                summary,
            } => {
                debug!(summary = %summary, "Create invoice rejected");
                record_action("create", "invalid");
                return FormOutcome::Render(FormState::invalid(
                    field_errors,
                    CREATE_INVALID_MESSAGE,
                ));
            }
        };

        let invoice = NewInvoice::dated(changes, Utc::now().date_naive());

        if let Err(e) = self.store.insert_invoice(&invoice).await {
            error!(error = %e, "Failed to create invoice");
            record_action("create", "database_error");
            return FormOutcome::Render(FormState::message(CREATE_DATABASE_MESSAGE));
        }

        self.cache.revalidate_path(INVOICES_PATH);
        record_action("create", "success");

        FormOutcome::Redirect(INVOICES_PATH)
    }

    #[instrument(skip(self, prior_state, form), fields(invoice_id = %id))]
    pub async fn update_invoice(
        &self,
        id: &InvoiceId,
        prior_state: &FormState,
        form: &FormData,
    ) -> FormOutcome {
        if prior_state.has_field_errors() {
            debug!("Update invoice resubmitted after failed validation");
        }

        let changes = match UpdateInvoice::safe_parse(form) {
            ValidationResult::Success(changes) => changes,
            ValidationResult::Failure {
                field_errors,
                summary,
            } => {
                debug!(summary = %summary, "Update invoice rejected");
                record_action("update", "invalid");
                return FormOutcome::Render(FormState::invalid(
                    field_errors,
                    UPDATE_INVALID_MESSAGE,
                ));
            }
        };

        match self.store.update_invoice(id, &changes).await {
            Ok(0) => info!("Update matched no invoice"),
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Failed to update invoice");
                record_action("update", "database_error");
                return FormOutcome::Render(FormState::message(UPDATE_DATABASE_MESSAGE));
            }
        }

        self.cache.revalidate_path(INVOICES_PATH);
        record_action("update", "success");

        FormOutcome::Redirect(INVOICES_PATH)
    }

    /// Delete leaves navigation to the caller.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub async fn delete_invoice(&self, id: &InvoiceId) -> DeleteOutcome {
        if let Err(e) = self.store.delete_invoice(id).await {
            error!(error = %e, "Failed to delete invoice");
            record_action("delete", "database_error");
            return DeleteOutcome::Failed(FormState::message(DELETE_DATABASE_MESSAGE));
        }

        self.cache.revalidate_path(INVOICES_PATH);
        record_action("delete", "success");

        DeleteOutcome::Deleted
    }

    /// Sign in with the credentials strategy.
    ///
    /// `prior_message` is whatever the previous attempt returned.
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        prior_message: Option<&str>,
        form: &FormData,
    ) -> Result<LoginOutcome, AppError> {
        if let Some(message) = prior_message {
            debug!(prior = %message, "Login retried");
        }

        let outcome = self
            .verifier
            .sign_in(CREDENTIALS_STRATEGY, form)
            .await
            .map_err(|e| {
                LOGIN_ATTEMPTS_TOTAL.with_label_values(&["error"]).inc();
                AppError::InternalError(e)
            })?;

        let outcome = match outcome {
            SignInOutcome::SignedIn(user) => {
                LOGIN_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
                info!(user_id = %user.user_id, "User signed in");
                LoginOutcome::SignedIn(user)
            }
            SignInOutcome::Failed(AuthErrorKind::CredentialsSignin) => {
                LOGIN_ATTEMPTS_TOTAL.with_label_values(&["invalid"]).inc();
                LoginOutcome::Rejected(INVALID_CREDENTIALS_MESSAGE)
            }
            SignInOutcome::Failed(kind) => {
                LOGIN_ATTEMPTS_TOTAL.with_label_values(&["failed"]).inc();
                info!(kind = %kind, "Sign-in failed");
                LoginOutcome::Rejected(SIGN_IN_FAILED_MESSAGE)
            }
        };

        Ok(outcome)
    }
}
