//! Controller behind the blood request form.
//!
//! The form starts in [`FormPhase::Loading`]. [`RequestFormController::reveal`]
//! waits out the configured delay while the area dataset is fetched, then the
//! form becomes [`FormPhase::Ready`]. Submission is only possible when ready:
//!
//! ```text
//! Loading ──reveal()──> Ready ──submit()──> Invalid   (no request sent)
//!                                       ──> Created   (notice + navigate home)
//!                                       ──> Failed    (notice, values kept)
//! ```
//!
//! Every await races the controller's lifetime token; once the view is torn
//! down, late results are dropped and the call returns
//! [`BloodRequestError::Cancelled`].

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use crate::api::BloodRequestApi;
use crate::domain::LocationSelector;
use crate::error::{BloodRequestError, Result};
use crate::http::HttpClient;
use crate::session::Identity;
use crate::ui::{Navigator, Notice, Notifier, Route};

pub mod schema;

pub use schema::{Check, Field, FieldErrors, FormValues, Rule, ValidationSchema};

/// Cache key of the area dataset, used in logs.
pub const AREAS_QUERY_KEY: &str = "areas";

/// Whether the form is visible yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Loading,
    Ready,
}

/// Result of a submit attempt that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// The API accepted the request and the user was sent home.
    Created,
    /// The call failed or the API reported `success: false`; values are kept.
    Failed,
}

pub struct RequestFormController<H: HttpClient> {
    api: BloodRequestApi<H>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    schema: ValidationSchema,
    identity: Option<Identity>,
    values: FormValues,
    errors: FieldErrors,
    /// Set by the first submit attempt; afterwards fields re-validate on change
    submitted: bool,
    phase: FormPhase,
    areas: OnceCell<LocationSelector>,
    lifetime: CancellationToken,
}

impl<H: HttpClient> RequestFormController<H> {
    pub fn new(
        api: BloodRequestApi<H>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            notifier,
            navigator,
            schema: ValidationSchema::blood_request(),
            identity: None,
            values: FormValues::new(),
            errors: FieldErrors::default(),
            submitted: false,
            phase: FormPhase::Loading,
            areas: OnceCell::new(),
            lifetime: CancellationToken::new(),
        }
    }

    /// Attach the requester identity to submitted records.
    pub fn with_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_schema(mut self, schema: ValidationSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    /// Token cancelled when the view is torn down. Hosts may cancel it directly.
    pub fn lifetime(&self) -> CancellationToken {
        self.lifetime.clone()
    }

    pub fn teardown(&self) {
        self.lifetime.cancel();
    }

    /// Wait out the reveal delay while fetching the area dataset, then show the form.
    #[tracing::instrument(skip(self))]
    pub async fn reveal(&mut self) -> Result<()> {
        let delay = tokio::time::sleep(Duration::from_millis(self.api.config().reveal_delay_ms));

        tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => return Err(BloodRequestError::Cancelled),
            _ = async { tokio::join!(delay, self.location_selector()) } => {}
        }

        self.phase = FormPhase::Ready;
        tracing::debug!("Request form ready");
        Ok(())
    }

    /// The area dataset, fetched on first use and cached for this controller's lifetime.
    ///
    /// A failed fetch yields an empty selector and is retried on the next call.
    pub async fn location_selector(&self) -> LocationSelector {
        let result = self
            .areas
            .get_or_try_init(|| async {
                self.api.fetch_areas().await.map(LocationSelector::new)
            })
            .await;

        match result {
            Ok(selector) => selector.clone(),
            Err(e) => {
                tracing::warn!(key = AREAS_QUERY_KEY, error = %e, "Failed to fetch area dataset");
                LocationSelector::default()
            }
        }
    }

    fn cached_selector(&self) -> Option<&LocationSelector> {
        self.areas.get()
    }

    /// Division options. Empty until the dataset has loaded.
    pub fn division_options(&self) -> Vec<&str> {
        self.cached_selector()
            .map(|s| s.divisions())
            .unwrap_or_default()
    }

    /// District options for the currently selected division.
    pub fn district_options(&self) -> Vec<&str> {
        self.cached_selector()
            .map(|s| s.districts_for(self.values.get(Field::UserDivision)))
            .unwrap_or_default()
    }

    /// City / upazila options for the currently selected division and district.
    pub fn city_options(&self) -> &[String] {
        self.cached_selector()
            .map(|s| {
                s.cities_for(
                    self.values.get(Field::UserDivision),
                    self.values.get(Field::UserDistrict),
                )
            })
            .unwrap_or(&[])
    }

    /// Store a field value. Changing a location level clears the levels below it.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let changed = self.values.get(field) != value;
        self.values.set(field, value);

        let dependents: &[Field] = if changed { field.dependents() } else { &[] };
        for dependent in dependents {
            self.values.clear(*dependent);
        }

        if self.submitted {
            for f in std::iter::once(&field).chain(dependents) {
                let message = self.schema.validate_field(*f, &self.values);
                self.errors.set(*f, message.map(str::to_string));
            }
        }
    }

    /// Validate and submit the form.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        if self.phase == FormPhase::Loading {
            return Err(BloodRequestError::FormNotReady);
        }
        self.submitted = true;

        let request = match self.schema.compose(&self.values, self.identity.as_ref()) {
            Ok(request) => request,
            Err(BloodRequestError::Validation(errors)) => {
                tracing::debug!(invalid_fields = errors.len(), "Form validation failed");
                counter!("blood_request_submissions_total", "outcome" => "invalid").increment(1);
                self.errors = errors.clone();
                return Ok(SubmitOutcome::Invalid(errors));
            }
            Err(e) => return Err(e),
        };
        self.errors.clear();

        if let Some(selector) = self.cached_selector()
            && !selector.is_empty()
            && !selector.is_consistent(
                &request.user_division,
                &request.user_district,
                &request.user_city,
            )
        {
            tracing::warn!(
                division = %request.user_division,
                district = %request.user_district,
                city = %request.user_city,
                "Submitting a location outside the area dataset"
            );
        }

        let result = tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => return Err(BloodRequestError::Cancelled),
            result = self.api.create_request(&request) => result,
        };

        match result {
            Ok(true) => {
                tracing::info!(blood_group = %request.blood_group, "Blood request submitted");
                counter!("blood_request_submissions_total", "outcome" => "created").increment(1);
                self.notifier.notify(Notice::success(
                    "Submitted",
                    "Blood request submitted successfully",
                ));
                self.navigator.navigate(Route::Home);
                Ok(SubmitOutcome::Created)
            }
            Ok(false) => {
                tracing::warn!("API rejected blood request");
                counter!("blood_request_submissions_total", "outcome" => "rejected").increment(1);
                self.notifier
                    .notify(Notice::error("Oops...", "Something went wrong!"));
                Ok(SubmitOutcome::Failed)
            }
            Err(e) => {
                tracing::error!(error = %e, transport = e.is_transport(), "Failed to submit blood request");
                counter!("blood_request_submissions_total", "outcome" => "error").increment(1);
                self.notifier
                    .notify(Notice::error("Oops...", "Something went wrong!"));
                Ok(SubmitOutcome::Failed)
            }
        }
    }
}

impl<H: HttpClient> Drop for RequestFormController<H> {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}
