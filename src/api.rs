use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 100;
// TODO: limits below 1 fall back to 10, not DEFAULT_LIMIT; confirm which one clients expect.
pub const FALLBACK_LIMIT: i64 = 10;

/// Raw query string for cursor listings. Values stay strings so unparsable
/// input degrades to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub last_id: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub last_id: i64,
    pub limit: i64,
}

impl ListParams {
    pub fn into_cursor(self) -> Cursor {
        let last_id = self
            .last_id
            .and_then(|s| s.parse::<u64>().ok())
            .map(|id| i64::try_from(id).unwrap_or(i64::MAX))
            .unwrap_or(0);

        let limit = match self.limit {
            Some(s) => s.parse::<i64>().unwrap_or(0),
            None => DEFAULT_LIMIT,
        };

        Cursor {
            last_id,
            limit: if limit < 1 { FALLBACK_LIMIT } else { limit },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub last_id: i64,
    pub next_id: i64,
    pub limit: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: ListMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: &str) -> Self {
        ErrorResponse {
            error: msg.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(last_id: Option<&str>, limit: Option<&str>) -> ListParams {
        ListParams {
            last_id: last_id.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn defaults_when_absent() {
        assert_eq!(
            params(None, None).into_cursor(),
            Cursor {
                last_id: 0,
                limit: DEFAULT_LIMIT
            }
        );
    }

    #[test]
    fn small_or_garbage_limit_falls_back_to_ten() {
        assert_eq!(params(None, Some("0")).into_cursor().limit, 10);
        assert_eq!(params(None, Some("-5")).into_cursor().limit, 10);
        assert_eq!(params(None, Some("lots")).into_cursor().limit, 10);
        assert_eq!(params(None, Some("")).into_cursor().limit, 10);
        assert_eq!(params(None, Some("25")).into_cursor().limit, 25);
    }

    #[test]
    fn bad_last_id_restarts_from_zero() {
        assert_eq!(params(Some("42"), None).into_cursor().last_id, 42);
        assert_eq!(params(Some("-1"), None).into_cursor().last_id, 0);
        assert_eq!(params(Some("abc"), None).into_cursor().last_id, 0);
    }
}
