//! Deep-link delegation.
//!
//! Asks the provider app to show a profile page using the session's access
//! token. Unlike authorization, a missing credential or an undeliverable
//! request is reported to the completion straight away.

use std::sync::Arc;

use lisdk_vault::Session;
use url::Url;

use crate::app::ProviderApp;
use crate::channel::{
    Dispatch, OutboundRequest, ProviderChannel, ReplyDisposition, ReplyOutcome, ReplyPayload,
    RequestAction, RequestBody, RequestId, TargetApp, payload_str,
};
use crate::completion::{Completion, PendingSlot};
use crate::error::{DispatchError, Result};
use crate::error_code::{ErrorKind, TypedError};
use crate::protocol;

const NO_TOKEN_MESSAGE: &str = "there is no access token";
const APP_NOT_FOUND_MESSAGE: &str = "LinkedIn app needs to be either installed or updated";

// ---------------------------------------------------------------------------
// ProfileTarget
// ---------------------------------------------------------------------------

/// Whose profile to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileTarget {
    /// The member the access token belongs to.
    CurrentMember,
    /// Another member, by id.
    Member(String),
}

impl ProfileTarget {
    /// `"you"` names the current member; any other id is taken verbatim.
    pub fn from_member_id(id: &str) -> Self {
        if id == protocol::CURRENT_MEMBER_AUTHORITY {
            Self::CurrentMember
        } else {
            Self::Member(id.to_string())
        }
    }
}

/// Build the deep-link URI for `target`.
///
/// `linkedin://you?accessToken=..&src=..` for the current member,
/// `linkedin://profile/<id>?accessToken=..&src=..` otherwise.
///
/// Query values are percent-encoded with spaces as `%20`, never `+`; the
/// provider app does not decode `+` back into a space.
pub fn profile_uri(target: &ProfileTarget, access_token: &str, source_tag: &str) -> Result<Url> {
    let mut uri = match target {
        ProfileTarget::CurrentMember => Url::parse(&format!(
            "{}://{}",
            protocol::DEEPLINK_SCHEME,
            protocol::CURRENT_MEMBER_AUTHORITY
        ))?,
        ProfileTarget::Member(id) => {
            let mut uri = Url::parse(&format!(
                "{}://{}",
                protocol::DEEPLINK_SCHEME,
                protocol::PROFILE_AUTHORITY
            ))?;
            uri.path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                .push(id);
            uri
        }
    };

    uri.query_pairs_mut()
        .append_pair(protocol::ACCESS_TOKEN_PARAM, access_token)
        .append_pair(protocol::SOURCE_PARAM, source_tag);

    // Form encoding writes a literal `+` as `%2B`, so every remaining `+`
    // is an encoded space.
    let query = uri.query().map(|q| q.replace('+', "%20"));
    uri.set_query(query.as_deref());
    Ok(uri)
}

// ---------------------------------------------------------------------------
// DeepLinkCoordinator
// ---------------------------------------------------------------------------

/// Runs deep-link requests against the provider app.
pub struct DeepLinkCoordinator {
    session: Arc<Session>,
    app: ProviderApp,
    channel: Arc<dyn ProviderChannel>,
    source_tag: String,
    show_store_dialog: bool,
    pending: PendingSlot,
}

impl DeepLinkCoordinator {
    pub fn new(
        session: Arc<Session>,
        app: ProviderApp,
        channel: Arc<dyn ProviderChannel>,
        source_tag: impl Into<String>,
    ) -> Self {
        Self {
            session,
            app,
            channel,
            source_tag: source_tag.into(),
            show_store_dialog: true,
            pending: PendingSlot::new(),
        }
    }

    /// Whether the store redirect asks for confirmation. Defaults to `true`.
    pub fn with_store_dialog(mut self, show_store_dialog: bool) -> Self {
        self.show_store_dialog = show_store_dialog;
        self
    }

    /// Open the signed-in member's own profile.
    pub fn open_current_profile(&self, completion: Completion) -> Dispatch {
        self.open_profile(&ProfileTarget::CurrentMember, completion)
    }

    /// Ask the provider app to open `target`'s profile.
    ///
    /// Without a valid session the completion fails with
    /// `NotAuthenticated` before this returns. When the provider app is
    /// missing or outdated the user is sent to the store and the
    /// completion never fires.
    pub fn open_profile(&self, target: &ProfileTarget, completion: Completion) -> Dispatch {
        let credential = match self.session.credential().filter(|c| !c.is_expired()) {
            Some(c) => c,
            None => {
                tracing::info!("deep link refused: no valid session");
                completion.fail(TypedError::new(ErrorKind::NotAuthenticated, NO_TOKEN_MESSAGE));
                return Dispatch::Rejected;
            }
        };

        if !self.app.ensure_current(self.show_store_dialog) {
            return Dispatch::Redirected;
        }

        let uri = match profile_uri(target, credential.value(), &self.source_tag) {
            Ok(uri) => uri,
            Err(e) => {
                completion.fail(TypedError::new(ErrorKind::InvalidRequest, e.to_string()));
                return Dispatch::Rejected;
            }
        };

        let id = RequestId::new();
        let request = OutboundRequest {
            id,
            target: TargetApp {
                package: self.app.package().to_string(),
                component: None,
            },
            action: RequestAction::View,
            categories: Vec::new(),
            body: RequestBody::DeepLink { uri },
        };

        if let Some(stale) = self.pending.arm(id, completion) {
            tracing::debug!(request_id = %id, "superseding pending deep link");
            stale.fail(TypedError::superseded());
        }

        match self.channel.send(&request) {
            Ok(()) => {
                tracing::debug!(request_id = %id, ?target, "deep link sent");
                Dispatch::Sent(id)
            }
            Err(e) => {
                tracing::warn!(request_id = %id, error = %e, "deep link not delivered");
                // The reply may already have resolved the slot; only report
                // if the completion is still ours.
                if let Some(completion) = self.pending.take(&id) {
                    completion.fail(dispatch_failure(&e));
                }
                Dispatch::Rejected
            }
        }
    }

    /// Resolve the pending deep link with the provider app's reply.
    pub fn handle_reply(
        &self,
        request_id: &RequestId,
        outcome: ReplyOutcome,
        payload: &ReplyPayload,
    ) -> ReplyDisposition {
        let Some(completion) = self.pending.take(request_id) else {
            tracing::debug!(request_id = %request_id, "ignoring unmatched deep-link reply");
            return ReplyDisposition::Ignored;
        };

        let error_code = payload_str(payload, protocol::ERROR_CODE_KEY);
        let message = payload_str(payload, protocol::ERROR_MESSAGE_KEY);

        match outcome {
            ReplyOutcome::Ok => completion.succeed(),
            ReplyOutcome::Cancelled if error_code.is_empty() => {
                completion.fail(TypedError::new(ErrorKind::UserCancelled, ""));
            }
            ReplyOutcome::Cancelled | ReplyOutcome::Other => {
                let error = TypedError::from_identifier(&error_code, message);
                tracing::info!(request_id = %request_id, kind = %error.kind(), "deep link failed");
                completion.fail(error);
            }
        }

        ReplyDisposition::Resolved
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending.pending_id()
    }

    pub fn is_pending(&self) -> bool {
        self.pending_request().is_some()
    }
}

fn dispatch_failure(error: &DispatchError) -> TypedError {
    match error {
        DispatchError::TargetNotResolvable { .. } => {
            TypedError::new(ErrorKind::ProviderAppNotFound, APP_NOT_FOUND_MESSAGE)
        }
        DispatchError::Transport { reason } => {
            TypedError::new(ErrorKind::UnknownError, reason.clone())
        }
    }
}

impl std::fmt::Debug for DeepLinkCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLinkCoordinator")
            .field("app", &self.app)
            .field("source_tag", &self.source_tag)
            .field("show_store_dialog", &self.show_store_dialog)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{Duration, Utc};
    use lisdk_vault::{Credential, MemoryStore};
    use serde_json::json;

    use super::*;
    use crate::app::{AppInspector, StoreRedirect};

    struct Installed(Option<u64>);

    impl AppInspector for Installed {
        fn installed_version_code(&self, _package: &str) -> Option<u64> {
            self.0
        }
    }

    #[derive(Default)]
    struct RecordingRedirect(Mutex<Vec<bool>>);

    impl StoreRedirect for RecordingRedirect {
        fn redirect(&self, _package: &str, show_dialog: bool) {
            self.0.lock().unwrap().push(show_dialog);
        }
    }

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<OutboundRequest>>,
        fail_with: Option<DispatchError>,
    }

    impl ProviderChannel for RecordingChannel {
        fn send(&self, request: &OutboundRequest) -> std::result::Result<(), DispatchError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.sent.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Outcomes {
        successes: AtomicUsize,
        errors: Mutex<Vec<TypedError>>,
    }

    fn completion(outcomes: &Arc<Outcomes>) -> Completion {
        let on_success = Arc::clone(outcomes);
        let on_error = Arc::clone(outcomes);
        Completion::new(
            move || {
                on_success.successes.fetch_add(1, Ordering::SeqCst);
            },
            move |err| on_error.errors.lock().unwrap().push(err),
        )
    }

    struct Fixture {
        coordinator: DeepLinkCoordinator,
        session: Arc<Session>,
        channel: Arc<RecordingChannel>,
        redirect: Arc<RecordingRedirect>,
    }

    fn fixture_with(version: Option<u64>, channel: RecordingChannel) -> Fixture {
        let session = Arc::new(Session::new(MemoryStore::new()));
        let channel = Arc::new(channel);
        let redirect = Arc::new(RecordingRedirect::default());
        let app = ProviderApp::new(
            protocol::PROVIDER_PACKAGE,
            10,
            Arc::new(Installed(version)),
            redirect.clone(),
        );
        let coordinator =
            DeepLinkCoordinator::new(Arc::clone(&session), app, channel.clone(), "sdk");
        Fixture {
            coordinator,
            session,
            channel,
            redirect,
        }
    }

    fn signed_in(f: &Fixture) {
        f.session
            .init(Credential::expiring_at("T", Utc::now() + Duration::hours(1)))
            .unwrap();
    }

    fn fixture() -> Fixture {
        let f = fixture_with(Some(10), RecordingChannel::default());
        signed_in(&f);
        f
    }

    fn query(uri: &Url) -> Vec<(String, String)> {
        uri.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn member_id_parsing() {
        assert_eq!(ProfileTarget::from_member_id("you"), ProfileTarget::CurrentMember);
        assert_eq!(
            ProfileTarget::from_member_id(" you "),
            ProfileTarget::Member(" you ".to_string())
        );
        assert_eq!(
            ProfileTarget::from_member_id("  "),
            ProfileTarget::Member("  ".to_string())
        );
        assert_eq!(
            ProfileTarget::from_member_id("abc123"),
            ProfileTarget::Member("abc123".to_string())
        );
    }

    #[test]
    fn current_member_uri() {
        let uri = profile_uri(&ProfileTarget::CurrentMember, "T", "sdk").unwrap();
        assert_eq!(uri.scheme(), "linkedin");
        assert_eq!(uri.host_str(), Some("you"));
        assert_eq!(
            query(&uri),
            vec![
                ("accessToken".to_string(), "T".to_string()),
                ("src".to_string(), "sdk".to_string()),
            ]
        );
    }

    #[test]
    fn member_uri_has_id_segment() {
        let uri = profile_uri(&ProfileTarget::Member("abc123".into()), "T", "sdk").unwrap();
        assert_eq!(uri.host_str(), Some("profile"));
        assert_eq!(uri.path(), "/abc123");
        assert_eq!(query(&uri)[0], ("accessToken".to_string(), "T".to_string()));
    }

    #[test]
    fn token_is_query_encoded() {
        let uri = profile_uri(&ProfileTarget::CurrentMember, "a b&c=d", "sdk").unwrap();
        assert_eq!(query(&uri)[0].1, "a b&c=d");
        assert!(!uri.as_str().contains("a b&c=d"));
    }

    #[test]
    fn spaces_encode_as_percent_twenty() {
        let uri = profile_uri(&ProfileTarget::CurrentMember, "a b+c", "sdk").unwrap();
        assert_eq!(uri.query(), Some("accessToken=a%20b%2Bc&src=sdk"));
        assert_eq!(query(&uri)[0].1, "a b+c");
    }

    #[test]
    fn no_session_fails_synchronously() {
        let f = fixture_with(Some(10), RecordingChannel::default());
        let outcomes = Arc::new(Outcomes::default());

        let dispatch = f.coordinator.open_current_profile(completion(&outcomes));

        assert_eq!(dispatch, Dispatch::Rejected);
        let errors = outcomes.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::NotAuthenticated);
        assert_eq!(errors[0].message(), "there is no access token");
        assert!(f.channel.sent.lock().unwrap().is_empty());
        assert!(!f.coordinator.is_pending());
    }

    #[test]
    fn expired_session_fails_synchronously() {
        let f = fixture_with(Some(10), RecordingChannel::default());
        f.session
            .init(Credential::expiring_at("T", Utc::now() - Duration::hours(1)))
            .unwrap();
        let outcomes = Arc::new(Outcomes::default());

        let dispatch = f.coordinator.open_current_profile(completion(&outcomes));

        assert_eq!(dispatch, Dispatch::Rejected);
        assert_eq!(
            outcomes.errors.lock().unwrap()[0].kind(),
            ErrorKind::NotAuthenticated
        );
    }

    #[test]
    fn sends_view_request_with_uri() {
        let f = fixture();
        let outcomes = Arc::new(Outcomes::default());

        let id = f
            .coordinator
            .open_profile(&ProfileTarget::Member("m1".into()), completion(&outcomes))
            .request_id()
            .unwrap();

        let sent = f.channel.sent.lock().unwrap();
        assert_eq!(sent[0].id, id);
        assert_eq!(sent[0].action, RequestAction::View);
        assert_eq!(sent[0].target.package, "com.linkedin.android");
        match &sent[0].body {
            RequestBody::DeepLink { uri } => {
                assert_eq!(uri.host_str(), Some("profile"));
                assert_eq!(uri.path(), "/m1");
            }
            other => panic!("unexpected body: {other:?}"),
        }
        assert_eq!(f.coordinator.pending_request(), Some(id));
    }

    #[test]
    fn outdated_app_redirects_with_dialog() {
        let f = fixture_with(Some(1), RecordingChannel::default());
        signed_in(&f);
        let outcomes = Arc::new(Outcomes::default());

        let dispatch = f.coordinator.open_current_profile(completion(&outcomes));

        assert_eq!(dispatch, Dispatch::Redirected);
        assert_eq!(*f.redirect.0.lock().unwrap(), vec![true]);
        assert!(outcomes.errors.lock().unwrap().is_empty());
        assert!(f.channel.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn store_dialog_flag_reaches_redirect() {
        let Fixture {
            coordinator,
            session,
            redirect,
            ..
        } = fixture_with(None, RecordingChannel::default());
        session.init(Credential::never_expiring("T")).unwrap();
        let coordinator = coordinator.with_store_dialog(false);
        let outcomes = Arc::new(Outcomes::default());

        let dispatch = coordinator.open_current_profile(completion(&outcomes));

        assert_eq!(dispatch, Dispatch::Redirected);
        assert_eq!(*redirect.0.lock().unwrap(), vec![false]);
    }

    #[test]
    fn credential_expiring_now_is_not_sent() {
        let f = fixture_with(Some(10), RecordingChannel::default());
        f.session
            .init(Credential::new("T", Utc::now().timestamp_millis()))
            .unwrap();
        let outcomes = Arc::new(Outcomes::default());

        let dispatch = f.coordinator.open_current_profile(completion(&outcomes));

        assert_eq!(dispatch, Dispatch::Rejected);
        assert!(f.channel.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn unresolvable_target_reports_app_not_found() {
        let channel = RecordingChannel {
            fail_with: Some(DispatchError::TargetNotResolvable {
                target: "linkedin://you".to_string(),
            }),
            ..RecordingChannel::default()
        };
        let f = fixture_with(Some(10), channel);
        signed_in(&f);
        let outcomes = Arc::new(Outcomes::default());

        let dispatch = f.coordinator.open_current_profile(completion(&outcomes));

        assert_eq!(dispatch, Dispatch::Rejected);
        assert!(!f.coordinator.is_pending());
        let errors = outcomes.errors.lock().unwrap();
        assert_eq!(errors[0].kind(), ErrorKind::ProviderAppNotFound);
        assert_eq!(
            errors[0].message(),
            "LinkedIn app needs to be either installed or updated"
        );
    }

    #[test]
    fn transport_fault_reports_unknown_error() {
        let channel = RecordingChannel {
            fail_with: Some(DispatchError::Transport {
                reason: "binder died".to_string(),
            }),
            ..RecordingChannel::default()
        };
        let f = fixture_with(Some(10), channel);
        signed_in(&f);
        let outcomes = Arc::new(Outcomes::default());

        f.coordinator.open_current_profile(completion(&outcomes));

        let errors = outcomes.errors.lock().unwrap();
        assert_eq!(errors[0].kind(), ErrorKind::UnknownError);
        assert_eq!(errors[0].message(), "binder died");
    }

    #[test]
    fn ok_reply_succeeds_without_touching_session() {
        let f = fixture();
        let before = f.session.credential();
        let outcomes = Arc::new(Outcomes::default());
        let id = f
            .coordinator
            .open_current_profile(completion(&outcomes))
            .request_id()
            .unwrap();

        let disposition = f
            .coordinator
            .handle_reply(&id, ReplyOutcome::Ok, &ReplyPayload::new());

        assert_eq!(disposition, ReplyDisposition::Resolved);
        assert_eq!(outcomes.successes.load(Ordering::SeqCst), 1);
        assert_eq!(f.session.credential(), before);
    }

    #[test]
    fn plain_cancel_is_user_cancelled() {
        let f = fixture();
        let outcomes = Arc::new(Outcomes::default());
        let id = f
            .coordinator
            .open_current_profile(completion(&outcomes))
            .request_id()
            .unwrap();

        f.coordinator
            .handle_reply(&id, ReplyOutcome::Cancelled, &ReplyPayload::new());

        let errors = outcomes.errors.lock().unwrap();
        assert_eq!(errors[0].kind(), ErrorKind::UserCancelled);
        assert_eq!(errors[0].message(), "");
    }

    #[test]
    fn cancel_with_error_code_is_classified() {
        let f = fixture();
        let outcomes = Arc::new(Outcomes::default());
        let id = f
            .coordinator
            .open_current_profile(completion(&outcomes))
            .request_id()
            .unwrap();

        let payload = match json!({ "errorCode": "INVALID_REQUEST", "errorMessage": "bad id" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        f.coordinator
            .handle_reply(&id, ReplyOutcome::Cancelled, &payload);

        let errors = outcomes.errors.lock().unwrap();
        assert_eq!(errors[0].kind(), ErrorKind::InvalidRequest);
        assert_eq!(errors[0].message(), "bad id");
    }

    #[test]
    fn other_reply_with_unknown_code() {
        let f = fixture();
        let outcomes = Arc::new(Outcomes::default());
        let id = f
            .coordinator
            .open_current_profile(completion(&outcomes))
            .request_id()
            .unwrap();

        let payload = match json!({ "errorCode": "garbage" }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        f.coordinator.handle_reply(&id, ReplyOutcome::Other, &payload);

        assert_eq!(
            outcomes.errors.lock().unwrap()[0].kind(),
            ErrorKind::UnknownError
        );
    }

    #[test]
    fn second_request_supersedes_first() {
        let f = fixture();
        let first = Arc::new(Outcomes::default());
        let second = Arc::new(Outcomes::default());

        let first_id = f
            .coordinator
            .open_current_profile(completion(&first))
            .request_id()
            .unwrap();
        f.coordinator.open_current_profile(completion(&second));

        assert_eq!(first.errors.lock().unwrap()[0].kind(), ErrorKind::Superseded);
        assert_eq!(
            f.coordinator
                .handle_reply(&first_id, ReplyOutcome::Ok, &ReplyPayload::new()),
            ReplyDisposition::Ignored
        );
        assert!(f.coordinator.is_pending());
    }
}
