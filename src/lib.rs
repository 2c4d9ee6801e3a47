//! Client-side controllers for a blood donation request service.
//!
//! This crate drives two screens against an external HTTP API: a form that
//! validates and submits a blood request (with cascading division → district →
//! city selection), and a dashboard that lists, views and deletes the signed-in
//! user's own requests. Rendering, dialogs and routing belong to the host UI and
//! are reached through the [`ui::Notifier`] and [`ui::Navigator`] traits.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod form;
pub mod http;
pub mod session;
pub mod ui;

// Re-export commonly used types
pub use api::BloodRequestApi;
pub use config::ClientConfig;
pub use dashboard::{ListState, RemoveOutcome, RequestListController};
pub use domain::{AreaRecord, BloodGroup, BloodRequest, LocationSelector, RequestId, StoredBloodRequest};
pub use error::{BloodRequestError, Result};
pub use form::{Field, FieldErrors, FormPhase, RequestFormController, SubmitOutcome, ValidationSchema};
pub use http::{ApiRequest, HttpClient, HttpResponse, MockHttpClient, ReqwestHttpClient};
pub use session::{Identity, Session, SessionState};
pub use ui::{Navigator, Notice, NoticeLevel, Notifier, RecordingNavigator, RecordingNotifier, Route};
