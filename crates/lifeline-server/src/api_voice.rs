//! Webhook handlers for the three stages of an inbound call.
//!
//! The provider drives the call: it posts to [`HANDLE_CALL_PATH`] when the
//! call connects, to [`TRANSCRIPT_COMPLETE_PATH`] once the caller has spoken,
//! and to [`HANDLE_REROUTE_PATH`] after a keypress. No state is kept between
//! stages; each handler answers from its own webhook body.
//!
//! Every handler answers with a TwiML document, whatever the body contains.
//! Unreadable bodies are treated as empty and lookup failures are spoken as
//! an apology, so the provider never sees an HTTP error from these routes.

use crate::AppState;
use axum::{
    extract::{rejection::FormRejection, Extension, Form},
    http::header,
    response::{IntoResponse, Response},
};
use lifeline_lookup::ResourceResult;
use lifeline_twiml::{Gather, GatherInput, Method, SpeechTimeout, VoiceResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::Instrument;

pub const HANDLE_CALL_PATH: &str = "/handle-call";
pub const TRANSCRIPT_COMPLETE_PATH: &str = "/transcript-complete";
pub const HANDLE_REROUTE_PATH: &str = "/handle-reroute";

/// Seconds of silence before a gather gives up.
const GATHER_TIMEOUT_SECS: u32 = 10;

pub const GREETING: &str = "Thank you for calling.";
pub const LOCATION_PROMPT: &str = "Please state your location and needed services";
pub const ACKNOWLEDGEMENT: &str = "We have received your request. Please stay on the line while we find the nearest available resource";
pub const LOOKUP_FAILED: &str =
    "Sorry, we could not find a matching resource for your request right now.";
pub const REROUTE_PROMPT: &str =
    "If you would like the call to be routed to their service desk, please press 1";
pub const REROUTE_NOTICE: &str = "We are rerouting you to their service desk. Have a nice day.";

/// A TwiML document sent with the provider's expected content type.
pub struct Twiml(pub VoiceResponse);

impl IntoResponse for Twiml {
    fn into_response(self) -> Response {
        (
            [(header::CONTENT_TYPE, lifeline_twiml::CONTENT_TYPE)],
            self.0.to_xml(),
        )
            .into_response()
    }
}

/// Fields of the call-start webhook.
#[derive(Debug, Default, Deserialize)]
pub struct CallWebhook {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
}

/// Fields of the speech gather callback.
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptWebhook {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "SpeechResult")]
    pub speech_result: Option<String>,
}

/// Fields of the keypress gather callback.
#[derive(Debug, Default, Deserialize)]
pub struct RerouteWebhook {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "Digits")]
    pub digits: Option<String>,
}

fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>, endpoint: &str) -> T {
    match form {
        Ok(Form(body)) => body,
        Err(rejection) => {
            tracing::warn!(
                endpoint,
                error = %rejection,
                "unreadable webhook body, continuing with empty fields"
            );
            T::default()
        }
    }
}

fn call_sid(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<unknown>")
}

/// Stage 1: greet the caller and listen for their request.
pub fn greeting() -> VoiceResponse {
    VoiceResponse::new().say(GREETING).gather(
        Gather::new()
            .action(TRANSCRIPT_COMPLETE_PATH)
            .method(Method::Post)
            .timeout(GATHER_TIMEOUT_SECS)
            .speech_timeout(SpeechTimeout::Auto)
            .input(GatherInput::Speech)
            .say(LOCATION_PROMPT),
    )
}

/// Stage 2: announce the lookup outcome and offer a transfer.
///
/// `None` means the lookup failed; the caller hears [`LOOKUP_FAILED`] and is
/// still offered the transfer, since the destination does not depend on the
/// lookup.
pub fn resource_announcement(resource: Option<&ResourceResult>) -> VoiceResponse {
    let announcement = match resource {
        Some(resource) => format!(
            "We found a {} at {}",
            resource.type_of_resource, resource.address
        ),
        None => LOOKUP_FAILED.to_string(),
    };

    VoiceResponse::new()
        .say(ACKNOWLEDGEMENT)
        .pause(1)
        .say(announcement)
        .gather(
            Gather::new()
                .num_digits(1)
                .action(HANDLE_REROUTE_PATH)
                .method(Method::Post)
                .timeout(GATHER_TIMEOUT_SECS)
                .input(GatherInput::Dtmf)
                .say(REROUTE_PROMPT),
        )
}

/// Stage 3: transfer the call to `number`.
pub fn reroute(number: &str) -> VoiceResponse {
    VoiceResponse::new().say(REROUTE_NOTICE).dial(number)
}

/// Handler for `POST /handle-call`.
pub async fn handle_call_handler(form: Result<Form<CallWebhook>, FormRejection>) -> Twiml {
    let webhook = form_or_default(form, HANDLE_CALL_PATH);
    tracing::info!(call_sid = call_sid(&webhook.call_sid), "incoming call");
    Twiml(greeting())
}

/// Handler for `POST /transcript-complete`.
///
/// A missing `SpeechResult` (the caller said nothing) is forwarded to the
/// lookup service as an empty transcript. The lookup runs inside a span
/// carrying the call SID, so the client's own records name the call.
pub async fn transcript_complete_handler(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<TranscriptWebhook>, FormRejection>,
) -> Twiml {
    let webhook = form_or_default(form, TRANSCRIPT_COMPLETE_PATH);
    let call_sid = call_sid(&webhook.call_sid);
    let transcript = webhook.speech_result.as_deref().unwrap_or_default();

    tracing::info!(
        call_sid,
        transcript_len = transcript.len(),
        "transcript received, looking up resource"
    );

    let resource = match state
        .lookup
        .lookup(transcript)
        .instrument(tracing::info_span!("resource_lookup", call_sid))
        .await
    {
        Ok(resource) => {
            tracing::info!(
                call_sid,
                type_of_resource = %resource.type_of_resource,
                "resource found"
            );
            Some(resource)
        }
        // The client has already logged the failure.
        Err(_) => {
            tracing::info!(call_sid, "no resource to announce, apologising");
            None
        }
    };

    Twiml(resource_announcement(resource.as_ref()))
}

/// Handler for `POST /handle-reroute`.
///
/// Every keypress, or none, leads to the same transfer.
// TODO: only transfer on "1" once product confirms what other digits should do.
pub async fn handle_reroute_handler(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<RerouteWebhook>, FormRejection>,
) -> Twiml {
    let webhook = form_or_default(form, HANDLE_REROUTE_PATH);
    tracing::info!(
        call_sid = call_sid(&webhook.call_sid),
        digits = webhook.digits.as_deref().unwrap_or(""),
        "rerouting call"
    );
    Twiml(reroute(&state.reroute_number))
}
