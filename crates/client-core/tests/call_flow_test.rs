//! End-to-end call flows driven through the simulated SDK
//!
//! The backend is scripted in-process; the SDK is the in-memory
//! `SimulatedSdk`, so every event below is produced by an SDK primitive or
//! by the simulated remote party.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use webphone_client_core::phone::{CALLER_ID_HEADER, DIRECTION_HEADER};
use webphone_client_core::{
    CallBackend, CallControl, CallDirection, CallPanel, CallStateController, CallStatus, ClientError, ClientResult,
    ConnectionState, ControllerBuilder, DialButton, OtherCallsAction, PrepareCallResponse, SimulatedConnector,
    SimulatedSdk, TokenResponse,
};

/// Backend returning fixed answers and recording dialed numbers
#[derive(Clone, Default)]
struct ScriptedBackend {
    token: Option<String>,
    call_id: Option<String>,
    dialed: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    fn new(call_id: Option<&str>) -> Self {
        Self {
            token: Some("jwt-token".to_string()),
            call_id: call_id.map(str::to_string),
            dialed: Arc::default(),
        }
    }

    fn dialed(&self) -> Vec<String> {
        self.dialed.lock().clone()
    }
}

#[async_trait]
impl CallBackend for ScriptedBackend {
    async fn fetch_token(&self) -> ClientResult<TokenResponse> {
        Ok(TokenResponse { token: self.token.clone() })
    }

    async fn prepare_call(&self, phone_number: &str) -> ClientResult<PrepareCallResponse> {
        self.dialed.lock().push(phone_number.to_string());
        Ok(PrepareCallResponse {
            call_id: self.call_id.clone(),
        })
    }
}

struct Phone {
    controller: CallStateController,
    connector: SimulatedConnector,
    backend: ScriptedBackend,
}

impl Phone {
    fn new(backend: ScriptedBackend) -> Self {
        let connector = SimulatedConnector::new();
        let controller = ControllerBuilder::new()
            .backend(backend.clone())
            .connector(connector.clone())
            .build()
            .unwrap();
        controller.initialize().unwrap();

        Self {
            controller,
            connector,
            backend,
        }
    }

    fn sdk(&self) -> Arc<SimulatedSdk> {
        self.connector.sdk().expect("sdk created by initialize")
    }

    async fn until(&self, predicate: impl FnMut(&ConnectionState) -> bool) -> ConnectionState {
        self.controller
            .wait_for_timeout(Duration::from_secs(30), predicate)
            .await
            .expect("state never reached")
    }

    async fn logged_in(backend: ScriptedBackend) -> Self {
        let phone = Self::new(backend);
        phone.controller.login().await.unwrap();
        phone.until(|s| s.is_client_ready).await;
        phone
    }
}

fn status_is(status: CallStatus) -> impl FnMut(&ConnectionState) -> bool {
    move |state| state.call_status == status
}

#[tokio::test(start_paused = true)]
async fn test_outbound_call_lifecycle() {
    let phone = Phone::new(ScriptedBackend::new(Some("abc")));

    phone.controller.login().await.unwrap();
    let state = phone.until(|s| s.is_connected).await;
    assert!(!state.is_client_ready);
    let state = phone.until(|s| s.is_client_ready).await;
    assert!(DialButton::from_state(&state, "555123").enabled);

    phone.controller.make_call("555123").await.unwrap();
    let state = phone.controller.state();
    assert!(state.is_in_call);
    assert_eq!(state.call_status, CallStatus::Connecting);
    let call = state.current_call.clone().unwrap();
    assert_eq!(call.call_id.as_deref(), Some("abc"));
    assert_eq!(call.phone_number.as_deref(), Some("+555123"));
    assert_eq!(call.direction, CallDirection::Outbound);

    let placed = phone.sdk().placed_calls();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].destination, "abc");
    assert_eq!(placed[0].headers.get(CALLER_ID_HEADER).map(String::as_str), Some("abc"));
    assert_eq!(placed[0].headers.get(DIRECTION_HEADER).map(String::as_str), Some("outbound"));

    phone.sdk().remote_ringing();
    phone.until(status_is(CallStatus::Ringing)).await;

    phone.sdk().remote_answer();
    let state = phone.until(status_is(CallStatus::Connected)).await;
    assert!(CallPanel::from_state(&state).unwrap().label == "In call");

    phone.sdk().remote_hangup();
    let state = phone.until(status_is(CallStatus::Ended)).await;
    assert!(!state.is_in_call);
    assert!(state.current_call.is_none());
    assert_eq!(state.error, None);

    let ended_at = tokio::time::Instant::now();
    phone.until(status_is(CallStatus::Idle)).await;
    assert!(ended_at.elapsed() >= Duration::from_millis(3_000));
}

#[tokio::test(start_paused = true)]
async fn test_client_ready_waits_for_delay() {
    let phone = Phone::new(ScriptedBackend::new(Some("abc")));

    phone.controller.login().await.unwrap();
    phone.until(|s| s.is_connected).await;
    let connected_at = tokio::time::Instant::now();

    tokio::time::sleep(Duration::from_millis(1_999)).await;
    assert!(!phone.controller.state().is_client_ready);

    phone.until(|s| s.is_client_ready).await;
    assert!(connected_at.elapsed() >= Duration::from_millis(2_000));
}

#[tokio::test(start_paused = true)]
async fn test_number_normalization_before_prepare() {
    let backend = ScriptedBackend::new(Some("abc"));
    let phone = Phone::logged_in(backend.clone()).await;

    phone.controller.make_call("13322309337").await.unwrap();
    phone.controller.hangup_call();
    phone.controller.make_call("+1555000").await.unwrap();

    assert_eq!(phone.backend.dialed(), vec!["+13322309337".to_string(), "+1555000".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_call_id_leaves_connecting() {
    let phone = Phone::logged_in(ScriptedBackend::new(None)).await;

    let err = phone.controller.make_call("555123").await.unwrap_err();
    assert_eq!(err, ClientError::MissingCallId);

    let state = phone.controller.state();
    assert_eq!(state.call_status, CallStatus::Connecting);
    assert!(state.is_in_call);
    assert!(phone.sdk().placed_calls().is_empty());

    let panel = CallPanel::from_state(&state).unwrap();
    assert_eq!(panel.controls, vec![CallControl::Cancel]);

    phone.controller.hangup_call();
    let state = phone.controller.state();
    assert_eq!(state.call_status, CallStatus::Idle);
    assert!(state.error.is_none());
    assert!(DialButton::from_state(&state, "555123").enabled);
}

#[tokio::test(start_paused = true)]
async fn test_refused_call_reports_placement_failure() {
    let phone = Phone::logged_in(ScriptedBackend::new(Some("abc"))).await;
    phone.sdk().refuse_calls(true);

    let err = phone.controller.make_call("555123").await.unwrap_err();
    assert_eq!(err, ClientError::CallPlacementFailed);
}

#[tokio::test(start_paused = true)]
async fn test_hangup_suppresses_cancel_failure() {
    let phone = Phone::logged_in(ScriptedBackend::new(Some("abc"))).await;

    phone.controller.make_call("555123").await.unwrap();
    phone.sdk().remote_ringing();
    phone.until(status_is(CallStatus::Ringing)).await;

    // the simulated SDK reports the unanswered hangup as a "Canceled" failure
    phone.controller.hangup_call();
    assert_eq!(phone.controller.state().call_status, CallStatus::Idle);

    phone.sdk().ring_in("777");
    let state = phone.until(status_is(CallStatus::Ringing)).await;
    assert_eq!(state.error, None);
    assert_eq!(state.current_call.unwrap().direction, CallDirection::Inbound);
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_failure_is_reported() {
    let phone = Phone::logged_in(ScriptedBackend::new(Some("abc"))).await;

    phone.controller.make_call("555123").await.unwrap();
    phone.sdk().fail_call("Busy Here");

    let state = phone.until(|s| s.error.is_some()).await;
    assert_eq!(state.error.as_deref(), Some("call failed: Busy Here"));
    assert_eq!(state.call_status, CallStatus::Idle);
    assert!(state.current_call.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stale_hangup_does_not_hide_next_failure() {
    let phone = Phone::logged_in(ScriptedBackend::new(Some("abc"))).await;

    // hangup with nothing to cancel leaves no failure to absorb
    phone.controller.hangup_call();

    phone.controller.make_call("555123").await.unwrap();
    phone.sdk().fail_call("Not Found");

    let state = phone.until(|s| s.error.is_some()).await;
    assert_eq!(state.error.as_deref(), Some("call failed: Not Found"));
}

#[tokio::test(start_paused = true)]
async fn test_incoming_call_answer_and_hangup() {
    let phone = Phone::logged_in(ScriptedBackend::new(Some("abc"))).await;

    let call_uuid = phone.sdk().ring_in("123");
    let state = phone.until(status_is(CallStatus::Ringing)).await;
    let call = state.current_call.clone().unwrap();
    assert_eq!(call.call_uuid.as_deref(), Some(call_uuid.as_str()));
    assert_eq!(call.phone_number.as_deref(), Some("123"));
    assert_eq!(call.direction, CallDirection::Inbound);
    assert_eq!(CallPanel::from_state(&state).unwrap().label, "Incoming call...");

    phone.controller.answer_call(state.incoming_call_uuid());
    phone.until(status_is(CallStatus::Connected)).await;
    assert_eq!(phone.sdk().answered_calls(), vec![(call_uuid, OtherCallsAction::Ignore)]);

    phone.controller.toggle_mute();
    assert!(phone.sdk().is_muted());
    phone.controller.toggle_mute();
    assert!(!phone.sdk().is_muted());

    phone.controller.hangup_call();
    let state = phone.until(status_is(CallStatus::Ended)).await;
    assert_eq!(state.error, None);
}

#[tokio::test(start_paused = true)]
async fn test_reject_incoming_call_is_silent() {
    let phone = Phone::logged_in(ScriptedBackend::new(Some("abc"))).await;

    let call_uuid = phone.sdk().ring_in("123");
    phone.until(status_is(CallStatus::Ringing)).await;

    phone.controller.reject_call(Some(&call_uuid));
    assert_eq!(phone.controller.state().call_status, CallStatus::Idle);

    // a second inbound call proves the rejection failure was processed quietly
    phone.sdk().ring_in("456");
    let state = phone.until(status_is(CallStatus::Ringing)).await;
    assert_eq!(state.error, None);
}

#[tokio::test(start_paused = true)]
async fn test_second_call_is_refused() {
    let phone = Phone::logged_in(ScriptedBackend::new(Some("abc"))).await;

    phone.controller.make_call("555123").await.unwrap();
    assert_eq!(phone.controller.make_call("555999").await, Err(ClientError::AlreadyInCall));
    assert_eq!(phone.backend.dialed().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_logout_resets_everything() {
    let phone = Phone::logged_in(ScriptedBackend::new(Some("abc"))).await;
    phone.controller.make_call("555123").await.unwrap();
    phone.sdk().remote_answer();
    phone.until(status_is(CallStatus::Connected)).await;

    phone.controller.logout();
    let state = phone.until(|s| !s.is_connected).await;
    assert_eq!(state, ConnectionState::initial());
    assert!(!phone.sdk().is_logged_in());
}

#[tokio::test(start_paused = true)]
async fn test_empty_token_reports_login_failure() {
    let backend = ScriptedBackend {
        token: Some(String::new()),
        ..ScriptedBackend::new(None)
    };
    let phone = Phone::new(backend);

    assert_eq!(phone.controller.login().await, Err(ClientError::MissingToken));
    assert!(!phone.controller.state().is_connected);
}

#[tokio::test(start_paused = true)]
async fn test_failing_connector_disables_actions() {
    let controller = ControllerBuilder::new()
        .backend(ScriptedBackend::new(Some("abc")))
        .connector(SimulatedConnector::failing("no media devices"))
        .build()
        .unwrap();

    assert!(matches!(
        controller.initialize(),
        Err(ClientError::InitializationFailed { .. })
    ));
    assert_eq!(controller.state().error.as_deref(), Some("initialization failed"));
    assert_eq!(controller.login().await, Err(ClientError::ClientNotInitialized));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_controller_logs_out() {
    let phone = Phone::logged_in(ScriptedBackend::new(Some("abc"))).await;
    let sdk = phone.sdk();
    assert!(sdk.is_logged_in());

    drop(phone);
    assert!(!sdk.is_logged_in());
}
