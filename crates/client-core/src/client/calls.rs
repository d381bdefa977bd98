//! Call operations for the controller
//!
//! Outbound dialing, hangup, mute toggling, and answering or rejecting
//! incoming calls.
//!
//! Only [`make_call`](CallStateController::make_call) returns an error to the
//! caller. The other operations are no-ops without an SDK handle, and their
//! SDK failures end up in the `error` field of the state (hangup, answer,
//! reject) or only in the log (mute).

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::controller::CallStateController;
use crate::client::reducer::Input;
use crate::error::{ClientError, ClientResult};
use crate::phone::{normalize_phone_number, outbound_headers};
use crate::sdk::{OtherCallsAction, TelephonySdk};

impl CallStateController {
    /// Dial `phone_number`.
    ///
    /// The number is normalized to `+<digits>` and sent to the
    /// call-preparation endpoint. The SDK then places the call using the
    /// returned call id as destination, with the call id and direction in
    /// custom headers. Ringing and connected follow from SDK events.
    ///
    /// # Errors
    ///
    /// * `ClientError::ClientNotInitialized` - no SDK handle
    /// * `ClientError::AlreadyInCall` - a dial is in flight or a call is active
    /// * `ClientError::RequestFailed` - the preparation endpoint refused
    /// * `ClientError::MissingCallId` - the endpoint returned no call id
    /// * `ClientError::CallPlacementFailed` - the SDK refused the call
    ///
    /// On any of the last three the phase stays `Connecting`.
    pub async fn make_call(&self, phone_number: &str) -> ClientResult<()> {
        let sdk = self.inner.client()?;
        let to_number = normalize_phone_number(phone_number);

        self.inner.apply_checked(
            Input::DialStarted {
                phone_number: to_number.clone(),
            },
            |machine| {
                if machine.call_in_progress() {
                    Err(ClientError::AlreadyInCall)
                } else {
                    Ok(())
                }
            },
        )?;

        if let Err(e) = sdk.unlock_audio().await {
            debug!("Audio unlock failed, continuing: {}", e);
        }

        match self.place_call(&sdk, &to_number).await {
            Ok(call_id) => {
                info!("Outbound call {} placed to {}", call_id, to_number);
                self.inner.apply(Input::CallPlaced {
                    call_id,
                    phone_number: to_number,
                });
                Ok(())
            }
            Err(e) => {
                warn!("Failed to place call to {}: {}", to_number, e);
                self.inner.apply(Input::DialFailed);
                Err(e)
            }
        }
    }

    async fn place_call(&self, sdk: &Arc<dyn TelephonySdk>, to_number: &str) -> ClientResult<String> {
        let call_id = self
            .inner
            .backend
            .prepare_call(to_number)
            .await?
            .into_call_id()?;

        if sdk.call(&call_id, &outbound_headers(&call_id))? {
            Ok(call_id)
        } else {
            Err(ClientError::CallPlacementFailed)
        }
    }

    /// Hang up the current call.
    ///
    /// The state drops to `Idle` right away without waiting for the SDK to
    /// confirm. A call failure the SDK reports as a consequence is not shown.
    pub fn hangup_call(&self) {
        let Some(sdk) = self.inner.sdk() else {
            return;
        };

        self.inner.apply(Input::HangupIssued);
        match sdk.hangup() {
            Ok(()) => self.inner.apply(Input::HangupSucceeded),
            Err(e) => {
                warn!("Hangup failed: {}", e);
                self.inner.apply(Input::HangupFailed);
            }
        }
    }

    /// Flip the microphone mute.
    ///
    /// The SDK has no mute query; a mute that does not take effect means the
    /// microphone was already muted, so it is unmuted instead.
    pub fn toggle_mute(&self) {
        let Some(sdk) = self.inner.sdk() else {
            return;
        };

        match sdk.mute() {
            Ok(true) => debug!("Microphone muted"),
            Ok(false) => match sdk.unmute() {
                Ok(()) => debug!("Microphone unmuted"),
                Err(e) => warn!("Unmute failed: {}", e),
            },
            Err(e) => warn!("Mute toggle failed: {}", e),
        }
    }

    /// Answer the incoming call identified by `call_uuid`.
    ///
    /// Other incoming calls are left ringing. Connected follows from the
    /// call-answered event.
    pub fn answer_call(&self, call_uuid: Option<&str>) {
        let (Some(sdk), Some(call_uuid)) = (self.inner.sdk(), non_empty(call_uuid)) else {
            return;
        };

        if let Err(e) = sdk.answer(call_uuid, OtherCallsAction::Ignore) {
            warn!("Answer of {} failed: {}", call_uuid, e);
            self.inner.apply(Input::AnswerFailed);
        }
    }

    /// Reject the incoming call identified by `call_uuid`.
    ///
    /// Like hangup, the state drops to `Idle` right away and the failure the
    /// SDK reports for the rejected call is not shown.
    pub fn reject_call(&self, call_uuid: Option<&str>) {
        let (Some(sdk), Some(call_uuid)) = (self.inner.sdk(), non_empty(call_uuid)) else {
            return;
        };

        self.inner.apply(Input::RejectIssued);
        match sdk.reject(call_uuid) {
            Ok(()) => self.inner.apply(Input::RejectSucceeded),
            Err(e) => {
                warn!("Reject of {} failed: {}", call_uuid, e);
                self.inner.apply(Input::RejectFailed);
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
