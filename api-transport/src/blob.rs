// api-transport/src/blob.rs
use base64::prelude::*;

/// Bytes encoded per frame; a multiple of 3 so frames concatenate without padding
pub const FRAME_SIZE: usize = 0x6000;

/// Encode bytes as base64
pub fn encode_base64(data: &[u8]) -> String {
    BASE64_STANDARD.encode(data)
}

/// Encode bytes as base64, one fixed-size frame at a time
pub fn encode_base64_framed(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for frame in data.chunks(FRAME_SIZE) {
        BASE64_STANDARD.encode_string(frame, &mut out);
    }
    out
}

/// `data:` URL carrying the bytes
pub fn data_url(content_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, encode_base64_framed(data))
}
