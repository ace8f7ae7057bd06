//! # Session Editor
//!
//! Drives one [`EditSession`] through its network calls.
//!
//! ## Editor Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SessionEditor                                    │
//! │                                                                         │
//! │   open()                                                               │
//! │     └─► fetch_service ──► service_loaded ──► begin_editing             │
//! │                     └──► service_missing (terminal)                    │
//! │                                                                         │
//! │   apply(|s| s.set_width("12"))  ── synchronous, re-emits the view      │
//! │                                                                         │
//! │   submit()                                                             │
//! │     ├─► begin_submit (validation; failure stays in Editing)            │
//! │     ├─► read + upload local images   ── on failure: UploadFailurePolicy│
//! │     ├─► build_payload                                                   │
//! │     └─► update_cart_item ──► submit_succeeded / submit_failed          │
//! │                                                                         │
//! │   close()  ── cancels the token; in-flight calls end as SessionClosed  │
//! │                                                                         │
//! │  EVENTS (to the front end):                                            │
//! │  ──────────────────────────                                            │
//! │  emit_view   - SessionView after every change                          │
//! │  emit_notice - { message, retryable }                                  │
//! │  emit_saved  - cart item id, so cart and line-item lists refresh       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use seeb_core::{
    CartItemId, CartLineItem, CoreResult, EditSession, LineItemContext, ServiceId, SessionView,
};

use crate::api::{BookingApi, ImageUpload};
use crate::config::{ClientConfig, UploadFailurePolicy};
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives session events (implemented by the front-end bridge).
pub trait SessionEventEmitter: Send + Sync {
    /// Emits the render state after a change.
    fn emit_view(&self, view: &SessionView);

    /// Emits a transient user-facing message.
    fn emit_notice(&self, message: &str, retryable: bool);

    /// Emits after the line item was saved.
    fn emit_saved(&self, cart_item_id: CartItemId);
}

/// No-op event emitter for headless use.
pub struct NoOpEmitter;

impl SessionEventEmitter for NoOpEmitter {
    fn emit_view(&self, _view: &SessionView) {}
    fn emit_notice(&self, _message: &str, _retryable: bool) {}
    fn emit_saved(&self, _cart_item_id: CartItemId) {}
}

// =============================================================================
// Session Editor
// =============================================================================

/// Owns an edit session and every request made on its behalf.
pub struct SessionEditor {
    api: Arc<dyn BookingApi>,
    config: Arc<ClientConfig>,
    emitter: Arc<dyn SessionEventEmitter>,
    session: EditSession,
    cancel: CancellationToken,
}

impl SessionEditor {
    /// Editor for a line item without a saved configuration.
    pub fn new(
        api: Arc<dyn BookingApi>,
        config: Arc<ClientConfig>,
        service_id: ServiceId,
        context: LineItemContext,
    ) -> Self {
        Self::from_session(api, config, EditSession::new(service_id, context))
    }

    /// Editor for an existing cart line item.
    pub fn for_item(api: Arc<dyn BookingApi>, config: Arc<ClientConfig>, item: CartLineItem) -> Self {
        Self::from_session(api, config, EditSession::for_item(item))
    }

    fn from_session(api: Arc<dyn BookingApi>, config: Arc<ClientConfig>, session: EditSession) -> Self {
        SessionEditor {
            api,
            config,
            emitter: Arc::new(NoOpEmitter),
            session,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn SessionEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Token cancelled when the session closes. Clone it to close from
    /// another task.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Closes the session. In-flight calls resolve to `SessionClosed`.
    pub fn close(&self) {
        debug!(service_id = %self.session.service_id(), "Closing edit session");
        self.cancel.cancel();
    }

    fn ensure_open(&self) -> ClientResult<()> {
        if self.is_closed() {
            Err(ClientError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// Races a call against session close.
    async fn guarded<T>(&self, call: impl Future<Output = ClientResult<T>>) -> ClientResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ClientError::SessionClosed),
            result = call => result,
        }
    }

    fn emit_view(&self) {
        self.emitter.emit_view(&self.session.view());
    }

    fn notify(&self, err: &ClientError) {
        self.emitter.emit_notice(&err.user_message(), err.is_retryable());
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Fetches the service and moves the session to Editing.
    pub async fn open(&mut self) -> ClientResult<()> {
        self.ensure_open()?;
        let service_id = self.session.service_id();
        info!(service_id = %service_id, "Opening edit session");

        let fetched = self.guarded(self.api.fetch_service(service_id)).await;
        let service = match fetched {
            Ok(service) => service,
            Err(ClientError::SessionClosed) => return Err(ClientError::SessionClosed),
            Err(err) => {
                error!(service_id = %service_id, error = %err, "Failed to load service");
                self.session.service_missing(err.user_message())?;
                self.notify(&err);
                self.emit_view();
                return Err(err);
            }
        };

        self.session.service_loaded(service)?;
        self.session.begin_editing()?;
        debug!(
            service_id = %service_id,
            addons = self.session.selection().len(),
            "Edit session ready"
        );
        self.emit_view();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    /// Applies a synchronous edit and re-emits the view.
    ///
    /// ```rust,ignore
    /// editor.apply(|s| s.set_width("12"))?;
    /// editor.apply(|s| s.toggle_addon(AddonId::new(5)))?;
    /// ```
    pub fn apply<T>(&mut self, edit: impl FnOnce(&mut EditSession) -> CoreResult<T>) -> ClientResult<T> {
        self.ensure_open()?;
        let result = edit(&mut self.session)?;
        self.emit_view();
        Ok(result)
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Validates, uploads images and saves the line item. The editor closes
    /// once the save succeeds.
    ///
    /// On any failure other than a closed session, the session is back in
    /// Editing and can be submitted again.
    pub async fn submit(&mut self) -> ClientResult<CartItemId> {
        self.ensure_open()?;

        if let Err(err) = self.session.begin_submit() {
            let err = ClientError::from(err);
            debug!(error = %err, "Submission blocked by validation");
            self.notify(&err);
            self.emit_view();
            return Err(err);
        }
        self.emit_view();

        let uploaded = match self.upload_pending().await {
            Ok(uploaded) => uploaded,
            Err(ClientError::SessionClosed) => return Err(ClientError::SessionClosed),
            Err(err) => match self.config.upload_failure() {
                UploadFailurePolicy::SubmitOriginal => {
                    warn!(error = %err, "Image upload failed, submitting original references");
                    Vec::new()
                }
                UploadFailurePolicy::Abort => return Err(self.fail_submit(err)),
            },
        };

        let images = self.session.resolve_images(&uploaded);
        let payload = match self.session.build_payload(&images) {
            Ok(payload) => payload,
            Err(err) => return Err(self.fail_submit(err.into())),
        };

        let cart_item_id = self.session.context().cart_item_id;
        let saved = self
            .guarded(self.api.update_cart_item(cart_item_id, &payload))
            .await;

        match saved {
            Ok(()) => {
                self.session.submit_succeeded()?;
                info!(cart_item_id = %cart_item_id, "Line item saved");
                self.emitter.emit_saved(cart_item_id);
                self.emit_view();
                self.close();
                Ok(cart_item_id)
            }
            Err(ClientError::SessionClosed) => Err(ClientError::SessionClosed),
            Err(err) => Err(self.fail_submit(err)),
        }
    }

    /// Reads and uploads the images that are still local.
    async fn upload_pending(&self) -> ClientResult<Vec<String>> {
        let pending = self.session.pending_uploads();
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        self.guarded(async {
            let mut uploads = Vec::with_capacity(pending.len());
            for uri in &pending {
                uploads.push(ImageUpload::read(uri).await?);
            }
            self.api.upload_images(uploads).await
        })
        .await
    }

    /// Returns the session to Editing with the error as its notice.
    fn fail_submit(&mut self, err: ClientError) -> ClientError {
        warn!(error = %err, retryable = err.is_retryable(), "Submission failed");
        if let Err(state_err) = self.session.submit_failed(err.user_message()) {
            error!(error = %state_err, "Session not in a submittable state");
        }
        self.notify(&err);
        self.emit_view();
        err
    }
}

impl Drop for SessionEditor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use seeb_core::{
        Addon, AddonId, CartId, CartUpdatePayload, PriceType, RateType, Service, SessionState,
        UserId,
    };
    use std::sync::Mutex;
    use std::time::Duration;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct FakeApi {
        service: Option<Service>,
        fail_upload: bool,
        reject_update: bool,
        hang_update: bool,
        uploads: Mutex<Vec<usize>>,
        updates: Mutex<Vec<CartUpdatePayload>>,
    }

    #[async_trait]
    impl BookingApi for FakeApi {
        async fn fetch_service(&self, id: ServiceId) -> ClientResult<Service> {
            self.service.clone().ok_or(ClientError::ServiceNotFound(id))
        }

        async fn upload_images(&self, images: Vec<ImageUpload>) -> ClientResult<Vec<String>> {
            self.uploads.lock().unwrap().push(images.len());
            if self.fail_upload {
                return Err(ClientError::UploadFailed("HTTP 500".into()));
            }
            Ok(images
                .iter()
                .map(|i| format!("https://cdn.seeb.in/{}", i.file_name))
                .collect())
        }

        async fn update_cart_item(
            &self,
            _id: CartItemId,
            payload: &CartUpdatePayload,
        ) -> ClientResult<()> {
            if self.hang_update {
                std::future::pending::<()>().await;
            }
            if self.reject_update {
                return Err(ClientError::UpdateRejected {
                    status: 500,
                    message: "server error".into(),
                });
            }
            self.updates.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingEmitter {
        notices: Mutex<Vec<String>>,
        saved: Mutex<Vec<CartItemId>>,
        views: Mutex<usize>,
    }

    impl SessionEventEmitter for RecordingEmitter {
        fn emit_view(&self, _view: &SessionView) {
            *self.views.lock().unwrap() += 1;
        }
        fn emit_notice(&self, message: &str, _retryable: bool) {
            self.notices.lock().unwrap().push(message.to_string());
        }
        fn emit_saved(&self, cart_item_id: CartItemId) {
            self.saved.lock().unwrap().push(cart_item_id);
        }
    }

    fn service() -> Service {
        Service {
            id: ServiceId::new(12),
            name: "Wall Painting".into(),
            rate_type: RateType::SquareFeet,
            rate: Decimal::from(50),
            addons: vec![Addon {
                id: AddonId::new(5),
                name: "Primer".into(),
                group_name: None,
                price_type: PriceType::Percentage,
                price: Decimal::from(10),
                qty: Decimal::from(20),
                is_required: true,
                description: None,
            }],
        }
    }

    fn context() -> LineItemContext {
        LineItemContext {
            cart_item_id: CartItemId::new(44),
            cart_id: CartId::new(3),
            user_id: UserId::new(9),
            service_type_id: None,
            room_id: None,
        }
    }

    fn editor(api: FakeApi, policy: UploadFailurePolicy) -> (SessionEditor, Arc<FakeApi>, Arc<RecordingEmitter>) {
        let api = Arc::new(api);
        let emitter = Arc::new(RecordingEmitter::default());
        let mut config = ClientConfig::default();
        config.session.upload_failure = policy;

        let editor = SessionEditor::new(api.clone(), Arc::new(config), ServiceId::new(12), context())
            .with_emitter(emitter.clone());
        (editor, api, emitter)
    }

    fn local_image(dir: &tempfile::TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, [0u8; 4]).unwrap();
        path.to_string_lossy().into_owned()
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_open_edit_submit() {
        let fake = FakeApi {
            service: Some(service()),
            ..Default::default()
        };
        let (mut editor, api, emitter) = editor(fake, UploadFailurePolicy::SubmitOriginal);

        editor.open().await.unwrap();
        assert_eq!(editor.session().state(), SessionState::Editing);

        editor.apply(|s| s.set_width("12")).unwrap();
        editor.apply(|s| s.set_height("8")).unwrap();
        assert_eq!(editor.session().quote().unwrap().grand_total_display(), "5000.00");

        let id = editor.submit().await.unwrap();
        assert_eq!(id, CartItemId::new(44));
        assert_eq!(editor.session().state(), SessionState::Success);

        let updates = api.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].value, "12X8");
        assert_eq!(updates[0].amount.to_string(), "4800.00");
        assert!(api.uploads.lock().unwrap().is_empty());
        assert_eq!(*emitter.saved.lock().unwrap(), vec![CartItemId::new(44)]);
        assert!(*emitter.views.lock().unwrap() >= 4);
        assert!(editor.is_closed());
    }

    #[tokio::test]
    async fn test_missing_service_is_terminal() {
        let (mut editor, _api, emitter) = editor(FakeApi::default(), UploadFailurePolicy::SubmitOriginal);

        let err = editor.open().await.unwrap_err();
        assert!(matches!(err, ClientError::ServiceNotFound(_)));
        assert_eq!(editor.session().state(), SessionState::Failed);
        assert_eq!(
            *emitter.notices.lock().unwrap(),
            vec!["This service is no longer available".to_string()]
        );
        assert!(editor.apply(|s| s.set_width("1")).is_err());
    }

    #[tokio::test]
    async fn test_validation_blocks_submission() {
        let fake = FakeApi {
            service: Some(service()),
            ..Default::default()
        };
        let (mut editor, api, emitter) = editor(fake, UploadFailurePolicy::SubmitOriginal);
        editor.open().await.unwrap();
        editor.apply(|s| s.set_width("12")).unwrap();

        let err = editor.submit().await.unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(editor.session().state(), SessionState::Editing);
        assert!(api.updates.lock().unwrap().is_empty());
        assert_eq!(
            *emitter.notices.lock().unwrap(),
            vec!["Please enter both width and height".to_string()]
        );
    }

    #[tokio::test]
    async fn test_upload_failure_submits_original_uris() {
        let dir = tempfile::tempdir().unwrap();
        let local = local_image(&dir, "wall.jpg");
        let fake = FakeApi {
            service: Some(service()),
            fail_upload: true,
            ..Default::default()
        };
        let (mut editor, api, _emitter) = editor(fake, UploadFailurePolicy::SubmitOriginal);
        editor.open().await.unwrap();
        editor.apply(|s| s.set_width("10")).unwrap();
        editor.apply(|s| s.set_height("10")).unwrap();
        let images = vec!["https://cdn.seeb.in/old.jpg".to_string(), local.clone()];
        editor.apply(|s| s.add_images(images)).unwrap();

        editor.submit().await.unwrap();

        assert_eq!(*api.uploads.lock().unwrap(), vec![1]);
        let updates = api.updates.lock().unwrap();
        let sent = updates[0].reference_images().unwrap();
        assert_eq!(sent, vec!["https://cdn.seeb.in/old.jpg".to_string(), local]);
    }

    #[tokio::test]
    async fn test_upload_failure_can_abort() {
        let dir = tempfile::tempdir().unwrap();
        let local = local_image(&dir, "wall.jpg");
        let fake = FakeApi {
            service: Some(service()),
            fail_upload: true,
            ..Default::default()
        };
        let (mut editor, api, emitter) = editor(fake, UploadFailurePolicy::Abort);
        editor.open().await.unwrap();
        editor.apply(|s| s.set_width("10")).unwrap();
        editor.apply(|s| s.set_height("10")).unwrap();
        editor.apply(|s| s.add_images([local])).unwrap();

        let err = editor.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::UploadFailed(_)));
        assert_eq!(editor.session().state(), SessionState::Editing);
        assert!(api.updates.lock().unwrap().is_empty());
        assert_eq!(
            *emitter.notices.lock().unwrap(),
            vec!["Could not upload reference images".to_string()]
        );
    }

    #[tokio::test]
    async fn test_uploaded_uris_replace_local_ones() {
        let dir = tempfile::tempdir().unwrap();
        let local = local_image(&dir, "ceiling.png");
        let fake = FakeApi {
            service: Some(service()),
            ..Default::default()
        };
        let (mut editor, api, _emitter) = editor(fake, UploadFailurePolicy::SubmitOriginal);
        editor.open().await.unwrap();
        editor.apply(|s| s.set_width("10")).unwrap();
        editor.apply(|s| s.set_height("10")).unwrap();
        editor.apply(|s| s.add_images([local])).unwrap();

        editor.submit().await.unwrap();
        let updates = api.updates.lock().unwrap();
        assert_eq!(
            updates[0].reference_images().unwrap(),
            vec!["https://cdn.seeb.in/ceiling.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_rejected_update_allows_retry() {
        let fake = FakeApi {
            service: Some(service()),
            reject_update: true,
            ..Default::default()
        };
        let (mut editor, _api, emitter) = editor(fake, UploadFailurePolicy::SubmitOriginal);
        editor.open().await.unwrap();
        editor.apply(|s| s.set_width("10")).unwrap();
        editor.apply(|s| s.set_height("10")).unwrap();

        let err = editor.submit().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(editor.session().state(), SessionState::Editing);
        assert_eq!(
            editor.session().notice(),
            Some("Could not update cart. Please try again")
        );

        assert!(editor.submit().await.is_err());
        assert_eq!(emitter.notices.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_close_cancels_in_flight_update() {
        let fake = FakeApi {
            service: Some(service()),
            hang_update: true,
            ..Default::default()
        };
        let (mut editor, _api, emitter) = editor(fake, UploadFailurePolicy::SubmitOriginal);
        editor.open().await.unwrap();
        editor.apply(|s| s.set_width("10")).unwrap();
        editor.apply(|s| s.set_height("10")).unwrap();

        let token = editor.cancel_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = editor.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::SessionClosed));
        assert!(editor.is_closed());
        assert_eq!(editor.session().state(), SessionState::Submitting);
        assert!(emitter.saved.lock().unwrap().is_empty());
        assert!(matches!(editor.submit().await, Err(ClientError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_edit_errors_surface_as_core_errors() {
        let fake = FakeApi {
            service: Some(service()),
            ..Default::default()
        };
        let (mut editor, _api, _emitter) = editor(fake, UploadFailurePolicy::SubmitOriginal);
        editor.open().await.unwrap();

        let err = editor.apply(|s| s.increment_addon(AddonId::new(5))).unwrap_err();
        assert!(matches!(err, ClientError::Core(_)));

        editor.close();
        assert!(matches!(
            editor.apply(|s| s.set_width("3")),
            Err(ClientError::SessionClosed)
        ));
    }
}
