//! Create/edit form session.

use chrono::{DateTime, Utc};

use flogin_core::{ProductId, SessionId};
use flogin_products::{Product, ProductDraft, ProductInput, Violations};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing an existing product; carries the target identity.
    Edit(ProductId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// Local validation failed; nothing was sent.
    Invalid(Violations),
    /// The server rejected or failed the request.
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Failed(SubmitFailure),
}

/// A validated submission, detached from the session so the lock can be
/// released while the remote call is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Submission {
    pub session: SessionId,
    pub mode: FormMode,
    pub input: ProductInput,
}

/// Transient editing session for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSession {
    id: SessionId,
    mode: FormMode,
    fields: ProductDraft,
    submission: SubmissionStatus,
    opened_at: DateTime<Utc>,
}

impl FormSession {
    /// Empty form for a new product.
    pub fn create() -> Self {
        Self::open(FormMode::Create, ProductDraft::default())
    }

    /// Form pre-populated from an existing product.
    pub fn edit(product: &Product) -> Self {
        Self::open(FormMode::Edit(product.id), ProductDraft::from(product))
    }

    fn open(mode: FormMode, fields: ProductDraft) -> Self {
        Self {
            id: SessionId::new(),
            mode,
            fields,
            submission: SubmissionStatus::Idle,
            opened_at: Utc::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Present iff the form is in edit mode.
    pub fn target_id(&self) -> Option<ProductId> {
        match self.mode {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        }
    }

    pub fn fields(&self) -> &ProductDraft {
        &self.fields
    }

    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn is_submitting(&self) -> bool {
        self.submission == SubmissionStatus::Submitting
    }

    /// Violations from the last local validation, if that is why the form failed.
    pub fn violations(&self) -> Option<&Violations> {
        match &self.submission {
            SubmissionStatus::Failed(SubmitFailure::Invalid(v)) => Some(v),
            _ => None,
        }
    }

    /// Server message from the last failed submit.
    pub fn remote_error(&self) -> Option<&str> {
        match &self.submission {
            SubmissionStatus::Failed(SubmitFailure::Remote(msg)) => Some(msg),
            _ => None,
        }
    }

    /// Record the submitted fields and validate them.
    ///
    /// On success the form is marked submitting and the submission to send is
    /// returned; otherwise the form is marked failed with the violated fields.
    pub(crate) fn stage(&mut self, fields: ProductDraft) -> Result<Submission, Violations> {
        self.fields = fields;
        match self.fields.validate() {
            Ok(input) => {
                self.submission = SubmissionStatus::Submitting;
                Ok(Submission {
                    session: self.id,
                    mode: self.mode,
                    input,
                })
            }
            Err(violations) => {
                self.submission =
                    SubmissionStatus::Failed(SubmitFailure::Invalid(violations.clone()));
                Err(violations)
            }
        }
    }

    pub(crate) fn fail_remote(&mut self, message: String) {
        self.submission = SubmissionStatus::Failed(SubmitFailure::Remote(message));
    }
}
