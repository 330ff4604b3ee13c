//! Delegated authorization.
//!
//! The [`AuthorizationCoordinator`] asks the provider app to log the member
//! in and consent to a [`Scope`], then turns the provider app's reply into a
//! [`Credential`] stored in the [`Session`].
//!
//! # Flow
//!
//! 1. Check the provider app is installed and current; otherwise redirect
//!    to the store and stop (no callback).
//! 2. Arm the pending slot with a fresh request id. A completion still
//!    waiting from an earlier call receives `Superseded`.
//! 3. Send the request. If the channel cannot deliver it, disarm the slot
//!    and stop (no callback).
//! 4. Later, [`handle_reply`](AuthorizationCoordinator::handle_reply)
//!    resolves the completion exactly once.

use std::sync::Arc;

use lisdk_vault::{Credential, NEVER_EXPIRES, Session};

use crate::app::ProviderApp;
use crate::channel::{
    Dispatch, OutboundRequest, ProviderChannel, ReplyDisposition, ReplyOutcome, ReplyPayload,
    RequestAction, RequestBody, RequestId, TargetApp, payload_i64, payload_str,
};
use crate::completion::{Completion, PendingSlot};
use crate::error_code::{ErrorKind, TypedError};
use crate::protocol;
use crate::scope::Scope;

/// Message reported when the member backs out of the consent screen.
const USER_CANCELLED_MESSAGE: &str = "user canceled";

// ---------------------------------------------------------------------------
// AuthorizationCoordinator
// ---------------------------------------------------------------------------

/// Runs the delegated-authorization round trip.
pub struct AuthorizationCoordinator {
    session: Arc<Session>,
    app: ProviderApp,
    channel: Arc<dyn ProviderChannel>,
    target: TargetApp,
    show_store_dialog: bool,
    pending: PendingSlot,
}

impl AuthorizationCoordinator {
    /// Create a coordinator addressing `target` through `channel`.
    pub fn new(
        session: Arc<Session>,
        app: ProviderApp,
        channel: Arc<dyn ProviderChannel>,
        target: TargetApp,
    ) -> Self {
        Self {
            session,
            app,
            channel,
            target,
            show_store_dialog: true,
            pending: PendingSlot::new(),
        }
    }

    /// Set the store-dialog flag [`authorize`](Self::authorize) passes on.
    /// Defaults to `true`.
    pub fn with_store_dialog(mut self, show_store_dialog: bool) -> Self {
        self.show_store_dialog = show_store_dialog;
        self
    }

    /// [`begin_authorization`](Self::begin_authorization) with the
    /// coordinator's default store-dialog flag.
    pub fn authorize(&self, scope: &Scope, completion: Completion) -> Dispatch {
        self.begin_authorization(scope, self.show_store_dialog, completion)
    }

    /// Ask the provider app to authorize `scope`.
    ///
    /// `show_store_dialog` is passed to the store redirect when the provider
    /// app is missing or outdated. `completion` fires once, from
    /// [`handle_reply`](Self::handle_reply), unless the result is
    /// [`Dispatch::Redirected`] or [`Dispatch::NotDelivered`], in which case
    /// it never fires.
    pub fn begin_authorization(
        &self,
        scope: &Scope,
        show_store_dialog: bool,
        completion: Completion,
    ) -> Dispatch {
        tracing::info!(scope = %scope, "starting delegated authorization");

        // Step 1: The provider app must be able to serve the request.
        if !self.app.ensure_current(show_store_dialog) {
            return Dispatch::Redirected;
        }

        // Step 2: Build the request and take over the pending slot.
        let id = RequestId::new();
        let request = OutboundRequest {
            id,
            target: self.target.clone(),
            action: RequestAction::Authorize,
            categories: vec![protocol::AUTHORIZE_CATEGORY.to_string()],
            body: RequestBody::Authorization {
                scope: scope.to_wire(),
            },
        };

        if let Some(stale) = self.pending.arm(id, completion) {
            tracing::debug!(request_id = %id, "superseding pending authorization");
            stale.fail(TypedError::superseded());
        }

        // Step 3: Hand it over.
        match self.channel.send(&request) {
            Ok(()) => {
                tracing::debug!(request_id = %id, "authorization request sent");
                Dispatch::Sent(id)
            }
            Err(e) => {
                tracing::debug!(request_id = %id, error = %e, "authorization request not delivered");
                drop(self.pending.take(&id));
                Dispatch::NotDelivered
            }
        }
    }

    /// Resolve the pending authorization with the provider app's reply.
    ///
    /// Replies for any id other than the pending one are ignored.
    pub fn handle_reply(
        &self,
        request_id: &RequestId,
        outcome: ReplyOutcome,
        payload: &ReplyPayload,
    ) -> ReplyDisposition {
        let Some(completion) = self.pending.take(request_id) else {
            tracing::debug!(request_id = %request_id, "ignoring unmatched authorization reply");
            return ReplyDisposition::Ignored;
        };

        match outcome {
            ReplyOutcome::Ok => self.complete_success(completion, payload),
            ReplyOutcome::Cancelled => {
                tracing::info!(request_id = %request_id, "authorization cancelled by user");
                completion.fail(TypedError::new(
                    ErrorKind::UserCancelled,
                    USER_CANCELLED_MESSAGE,
                ));
            }
            ReplyOutcome::Other => {
                let error_info = payload_str(payload, protocol::ERROR_INFO_KEY);
                let description = payload_str(payload, protocol::ERROR_DESCRIPTION_KEY);
                let error = TypedError::from_identifier(&error_info, description);
                tracing::info!(
                    request_id = %request_id,
                    kind = %error.kind(),
                    "authorization failed"
                );
                completion.fail(error);
            }
        }

        ReplyDisposition::Resolved
    }

    /// The request id awaiting a reply, if any.
    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending.pending_id()
    }

    pub fn is_pending(&self) -> bool {
        self.pending_request().is_some()
    }

    fn complete_success(&self, completion: Completion, payload: &ReplyPayload) {
        let token = payload_str(payload, protocol::TOKEN_KEY);
        if token.is_empty() {
            tracing::warn!("authorization reply carried no access token");
            completion.fail(TypedError::new(
                ErrorKind::UnknownError,
                "authorization reply carried no access token",
            ));
            return;
        }

        let expires_on = payload_i64(payload, protocol::EXPIRES_ON_KEY).unwrap_or(NEVER_EXPIRES);
        let credential = Credential::new(token, expires_on);

        match self.session.set(Some(credential)) {
            Ok(()) => {
                tracing::info!(expires_on, "authorization succeeded");
                completion.succeed();
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not persist authorized credential");
                completion.fail(TypedError::new(
                    ErrorKind::UnknownError,
                    format!("failed to persist credential: {e}"),
                ));
            }
        }
    }
}

impl std::fmt::Debug for AuthorizationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCoordinator")
            .field("target", &self.target)
            .field("show_store_dialog", &self.show_store_dialog)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
