//! Response envelopes shared by the list endpoints.

use serde::Serialize;

use crate::query::PaginationParams;

/// `{ "data": T }` for lists that are returned whole.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": [...], "limit", "offset", "has_more" }` for offset-paged lists.
///
/// `has_more` is a page-full heuristic: it is `true` whenever the page came
/// back at `limit` items.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl<T: Serialize> PageResponse<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams) -> Self {
        let limit = params.limit();
        Self {
            has_more: data.len() as i64 >= limit,
            data,
            limit,
            offset: params.offset(),
        }
    }
}
