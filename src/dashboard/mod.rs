//! Controller behind the "manage your blood requests" screen.
//!
//! Lists the signed-in user's requests and deletes them one at a time after
//! confirmation. Ordering of a delete is always
//! confirm → `DELETE` call → local removal; a failure at any step leaves the
//! list untouched.
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api::BloodRequestApi;
use crate::domain::{RequestId, StoredBloodRequest};
use crate::error::{BloodRequestError, Result};
use crate::http::HttpClient;
use crate::session::{Identity, SessionState};
use crate::ui::{Navigator, Notice, Notifier, Route};

pub mod types;

pub use types::{ListState, RemoveOutcome, delete_confirmation};

pub struct RequestListController<H: HttpClient> {
    api: BloodRequestApi<H>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    state: ListState,
    requests: Vec<StoredBloodRequest>,
    lifetime: CancellationToken,
}

impl<H: HttpClient> RequestListController<H> {
    pub fn new(
        api: BloodRequestApi<H>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            notifier,
            navigator,
            state: ListState::Loading,
            requests: Vec::new(),
            lifetime: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn requests(&self) -> &[StoredBloodRequest] {
        &self.requests
    }

    pub fn lifetime(&self) -> CancellationToken {
        self.lifetime.clone()
    }

    pub fn teardown(&self) {
        self.lifetime.cancel();
    }

    /// Fetch the requests belonging to `identity`.
    ///
    /// Without an identity nothing is fetched and the list stays empty. A failed
    /// fetch is logged and leaves the list empty; either way the screen leaves
    /// `Loading`.
    #[tracing::instrument(skip(self))]
    pub async fn load(&mut self, identity: Option<&Identity>) -> Result<()> {
        let Some(identity) = identity else {
            tracing::debug!("No signed-in user, skipping fetch");
            self.requests.clear();
            return Ok(());
        };

        let result = tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => return Err(BloodRequestError::Cancelled),
            result = self.api.list_requests(identity) => result,
        };

        self.requests = match result {
            Ok(requests) => requests,
            Err(e) => {
                tracing::error!(error = %e, transport = e.is_transport(), "Fetch error");
                Vec::new()
            }
        };
        self.state = ListState::Loaded {
            loaded_at: Utc::now(),
        };
        Ok(())
    }

    /// Keep the list in step with the session until the view is torn down or the
    /// session goes away.
    ///
    /// Each newly resolved identity triggers a fetch; signing out empties the
    /// list and returns the screen to `Loading`.
    pub async fn follow_session(&mut self, mut session: watch::Receiver<SessionState>) -> Result<()> {
        let mut loaded_for: Option<Identity> = None;

        loop {
            let state = session.borrow_and_update().clone();
            match state.identity() {
                Some(identity) if loaded_for.as_ref() != Some(identity) => {
                    match self.load(Some(identity)).await {
                        Err(BloodRequestError::Cancelled) => return Ok(()),
                        other => other?,
                    }
                    loaded_for = Some(identity.clone());
                }
                Some(_) => {}
                None => {
                    if loaded_for.take().is_some() {
                        tracing::info!("Session cleared, dropping loaded requests");
                        self.requests.clear();
                        self.state = ListState::Loading;
                    }
                }
            }

            tokio::select! {
                biased;
                _ = self.lifetime.cancelled() => return Ok(()),
                changed = session.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Ask for confirmation, then delete `id` on the server and locally.
    #[tracing::instrument(skip(self, id), fields(request_id = %id))]
    pub async fn remove(&mut self, id: &RequestId) -> Result<RemoveOutcome> {
        let dialog = delete_confirmation();
        let confirmed = tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => return Err(BloodRequestError::Cancelled),
            confirmed = self.notifier.confirm(&dialog) => confirmed,
        };

        if !confirmed {
            tracing::debug!("Delete cancelled by user");
            return Ok(RemoveOutcome::Declined);
        }

        let result = tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => return Err(BloodRequestError::Cancelled),
            result = self.api.delete_request(id) => result,
        };

        match result {
            Ok(true) => {
                self.requests.retain(|r| &r.id != id);
                tracing::info!(remaining = self.requests.len(), "Blood request deleted");
                counter!("blood_request_deletions_total", "outcome" => "deleted").increment(1);
                self.notifier.notify(Notice::success(
                    "Deleted!",
                    "Your request has been deleted.",
                ));
                Ok(RemoveOutcome::Deleted)
            }
            Ok(false) => {
                tracing::warn!("API refused to delete blood request");
                counter!("blood_request_deletions_total", "outcome" => "rejected").increment(1);
                self.notifier
                    .notify(Notice::error("Failed!", "Could not delete the request."));
                Ok(RemoveOutcome::Rejected)
            }
            Err(e) => {
                tracing::error!(error = %e, "Delete error");
                counter!("blood_request_deletions_total", "outcome" => "error").increment(1);
                self.notifier
                    .notify(Notice::error("Error!", "Something went wrong."));
                Ok(RemoveOutcome::Failed)
            }
        }
    }

    /// Open the details page of `id`.
    pub fn view(&self, id: &RequestId) {
        self.navigator.navigate(Route::RequestDetails(id.clone()));
    }
}

impl<H: HttpClient> Drop for RequestListController<H> {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::{HttpResponse, MockHttpClient};
    use crate::ui::{RecordingNavigator, RecordingNotifier};

    fn controller(
        mock: &MockHttpClient,
        notifier: &RecordingNotifier,
        navigator: &RecordingNavigator,
    ) -> RequestListController<MockHttpClient> {
        RequestListController::new(
            BloodRequestApi::new(Arc::new(mock.clone()), ClientConfig::default()),
            Arc::new(notifier.clone()),
            Arc::new(navigator.clone()),
        )
    }

    fn listing() -> String {
        serde_json::json!({
            "requests": [
                {
                    "_id": "r1", "patientName": "Rahim", "bloodGroup": "A+", "amount": 1,
                    "hospitalName": "DMCH", "date": "2026-10-25", "userDivision": "Dhaka",
                    "userDistrict": "Gazipur", "userCity": "Tongi", "phoneNo": "01712345678"
                },
                {
                    "_id": "r2", "patientName": "Karim", "bloodGroup": "O-", "amount": "2",
                    "hospitalName": "Square", "date": "2026-10-26", "userDivision": "Dhaka",
                    "userDistrict": "Narayanganj", "userCity": "Rupganj", "phoneNo": "01812345678"
                }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_load_without_identity_does_not_fetch() {
        let mock = MockHttpClient::new();
        let (notifier, navigator) = (RecordingNotifier::new(), RecordingNavigator::new());
        let mut list = controller(&mock, &notifier, &navigator);

        list.load(None).await.unwrap();

        assert_eq!(mock.call_count(), 0);
        assert!(list.requests().is_empty());
        assert!(list.state().is_loading());
    }

    #[tokio::test]
    async fn test_load_populates_and_settles() {
        let mock = MockHttpClient::new();
        mock.add_response("GET /api/blood-request", Ok(HttpResponse::ok(listing())));
        let (notifier, navigator) = (RecordingNotifier::new(), RecordingNavigator::new());
        let mut list = controller(&mock, &notifier, &navigator);

        list.load(Some(&Identity::new("donor@example.com")))
            .await
            .unwrap();

        assert!(!list.state().is_loading());
        let ids: Vec<_> = list.requests().iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(list.requests()[1].amount, 2);
    }

    #[tokio::test]
    async fn test_load_failure_settles_with_empty_list() {
        let mock = MockHttpClient::new();
        mock.add_response(
            "GET /api/blood-request",
            Ok(HttpResponse {
                status: 503,
                body: "unavailable".to_string(),
            }),
        );
        let (notifier, navigator) = (RecordingNotifier::new(), RecordingNavigator::new());
        let mut list = controller(&mock, &notifier, &navigator);

        list.load(Some(&Identity::new("donor@example.com")))
            .await
            .unwrap();

        assert!(!list.state().is_loading());
        assert!(list.requests().is_empty());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_view_navigates_to_details() {
        let mock = MockHttpClient::new();
        let (notifier, navigator) = (RecordingNotifier::new(), RecordingNavigator::new());
        let list = controller(&mock, &notifier, &navigator);

        list.view(&RequestId::from("r9"));
        assert_eq!(
            navigator.routes(),
            vec![Route::RequestDetails(RequestId::from("r9"))]
        );
    }

    #[tokio::test]
    async fn test_remove_after_teardown_is_cancelled() {
        let mock = MockHttpClient::new();
        let (notifier, navigator) = (RecordingNotifier::new(), RecordingNavigator::new());
        notifier.answer_next(true);
        let mut list = controller(&mock, &notifier, &navigator);
        list.teardown();

        let err = list.remove(&RequestId::from("r1")).await.unwrap_err();
        assert!(matches!(err, BloodRequestError::Cancelled));
        assert!(notifier.dialogs().is_empty());
        assert_eq!(mock.call_count(), 0);
    }
}
