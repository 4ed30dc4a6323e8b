// api-transport/src/body.rs
use http::Method;
use serde_json::{Map, Value};

use crate::descriptor::BodyEncoding;
use crate::error::TransportError;
use crate::http::{FormField, FormValue, RequestBody};
use crate::params::encode_component;
use crate::types::{Payload, PayloadValue};

/// Serialize a payload for the wire.
///
/// The descriptor's declared encoding decides the format. Bodies are never
/// sent with GET or HEAD.
pub fn encode_body(
    encoding: BodyEncoding,
    method: &Method,
    payload: Option<&Payload>,
) -> Result<RequestBody, TransportError> {
    if *method == Method::GET || *method == Method::HEAD {
        return Ok(RequestBody::Empty);
    }
    let Some(payload) = payload else {
        return Ok(RequestBody::Empty);
    };

    match encoding {
        BodyEncoding::FormUrlEncoded => form_urlencoded(payload).map(RequestBody::Text),
        BodyEncoding::Multipart => Ok(RequestBody::Multipart(multipart(payload))),
        BodyEncoding::Json => json(payload).map(RequestBody::Text),
    }
}

fn form_urlencoded(payload: &Payload) -> Result<String, TransportError> {
    let mut pairs = Vec::with_capacity(payload.len());
    for (key, value) in payload.iter() {
        let PayloadValue::Json(value) = value else {
            return Err(TransportError::Encode(format!(
                "file field {} needs a multipart endpoint",
                key
            )));
        };
        pairs.push(format!("{}={}", urlencoding::encode(key), encode_component(value)));
    }
    Ok(pairs.join("&"))
}

fn multipart(payload: &Payload) -> Vec<FormField> {
    payload
        .iter()
        .map(|(key, value)| FormField {
            name: key.to_string(),
            value: match value {
                PayloadValue::File(file) => FormValue::File(file.clone()),
                PayloadValue::Json(Value::String(text)) => FormValue::Text(text.clone()),
                PayloadValue::Json(other) => FormValue::Text(other.to_string()),
            },
        })
        .collect()
}

fn json(payload: &Payload) -> Result<String, TransportError> {
    let mut map = Map::with_capacity(payload.len());
    for (key, value) in payload.iter() {
        let PayloadValue::Json(value) = value else {
            return Err(TransportError::Encode(format!(
                "file field {} needs a multipart endpoint",
                key
            )));
        };
        map.insert(key.to_string(), value.clone());
    }
    serde_json::to_string(&Value::Object(map)).map_err(|e| TransportError::Encode(e.to_string()))
}
