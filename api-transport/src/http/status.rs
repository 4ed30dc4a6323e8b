// api-transport/src/http/status.rs

pub const OK: u16 = 200;
pub const ACCEPTED: u16 = 202;
pub const UNAUTHORIZED: u16 = 401;
pub const NOT_FOUND: u16 = 404;

/// Where a settled response goes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRoute {
    Success,
    Unauthorized,
    NotFound,
    Failure,
}

impl StatusRoute {
    pub fn from_status(status: u16) -> Self {
        match status {
            OK | ACCEPTED => StatusRoute::Success,
            UNAUTHORIZED => StatusRoute::Unauthorized,
            NOT_FOUND => StatusRoute::NotFound,
            _ => StatusRoute::Failure,
        }
    }
}
