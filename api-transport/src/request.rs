// api-transport/src/request.rs
use http::header::{HeaderValue, CONTENT_TYPE};

use crate::auth::inject_auth;
use crate::body::encode_body;
use crate::descriptor::{BodyEncoding, EndpointDescriptor};
use crate::error::TransportError;
use crate::http::{PreparedRequest, RequestBody};
use crate::params::resolve_url;
use crate::types::{AuthSession, CallRequest, Payload};

/// Build the wire request for one call.
///
/// Works on copies: the descriptor stays untouched and the call can be
/// prepared again on replay.
pub fn prepare_request(
    descriptor: &EndpointDescriptor,
    call: &CallRequest,
    session: Option<&AuthSession>,
) -> Result<PreparedRequest, TransportError> {
    let url = resolve_url(&descriptor.url_template, call.params.as_ref());
    let mut headers = descriptor.headers.clone();

    let mut payload = match (&descriptor.body_defaults, &call.payload) {
        (None, None) => None,
        (None, Some(payload)) => Some(payload.clone()),
        (Some(defaults), payload) => {
            let mut merged = Payload::from(defaults.clone());
            if let Some(payload) = payload {
                merged.merge(payload.clone());
            }
            Some(merged)
        }
    };

    if descriptor.is_private {
        inject_auth(session, &mut headers, payload.as_mut())?;
    }

    let body = encode_body(descriptor.body_encoding, &descriptor.method, payload.as_ref())?;

    match descriptor.body_encoding {
        // the HTTP client writes its own boundary
        BodyEncoding::Multipart => {
            headers.remove(CONTENT_TYPE);
        }
        BodyEncoding::Json => {
            if matches!(body, RequestBody::Text(_)) && !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
        }
        BodyEncoding::FormUrlEncoded => {}
    }

    Ok(PreparedRequest {
        method: descriptor.method.clone(),
        url,
        headers,
        body,
    })
}
