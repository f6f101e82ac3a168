/// Page request and page response models for comment listing
use crate::config::PaginationConfig;
use crate::constants::MAX_CURSOR_LIMIT;
use crate::error::VowsError;
use crate::models::comment::Comment;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Listing order over the comment sort key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Whether the store should scan the sort key ascending
    pub fn scan_forward(self) -> bool {
        matches!(self, Self::Asc)
    }
}

impl FromStr for SortOrder {
    type Err = VowsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(VowsError::Validation(format!(
                "order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }
}

/// How the caller addresses a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Legacy page-index addressing. Each call re-walks the partition from
    /// the start, so cost grows with `page_index` and indices shift under
    /// concurrent inserts.
    Indexed {
        page_index: u32,
        page_size: u32,
        order: SortOrder,
    },
    /// Cursor addressing: one bounded query per page.
    Cursor {
        cursor: Option<String>,
        limit: u32,
        order: SortOrder,
    },
}

impl PageRequest {
    pub fn order(&self) -> SortOrder {
        match self {
            Self::Indexed { order, .. } | Self::Cursor { order, .. } => *order,
        }
    }

    /// Items per page, used for `totalPagesCount`
    pub fn page_size(&self) -> u32 {
        match self {
            Self::Indexed { page_size, .. } => *page_size,
            Self::Cursor { limit, .. } => *limit,
        }
    }
}

/// Raw query string of `GET /photos/{photoId}/comments`
///
/// Fields stay strings so malformed numbers become `validation_failed`
/// instead of a framework rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsQuery {
    pub page_index: Option<String>,
    pub page_size: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<String>,
    pub order: Option<String>,
}

impl ListCommentsQuery {
    /// Resolves the query into a page request. `pageIndex` selects the
    /// legacy mode; anything else is cursor addressing.
    pub fn into_page_request(self, config: &PaginationConfig) -> Result<PageRequest, VowsError> {
        let order = match non_empty(self.order.as_deref()) {
            Some(order) => order.parse()?,
            None => config.default_order,
        };

        let cursor = non_empty(self.cursor.as_deref()).map(str::to_string);

        match non_empty(self.page_index.as_deref()) {
            Some(page_index) => {
                if cursor.is_some() {
                    return Err(VowsError::Validation(
                        "pageIndex and cursor cannot be combined".to_string(),
                    ));
                }

                let page_index = parse_number("pageIndex", page_index)?;
                if page_index < 1 {
                    return Err(VowsError::Validation(
                        "pageIndex must be at least 1".to_string(),
                    ));
                }

                let page_size = match non_empty(self.page_size.as_deref()) {
                    Some(size) => parse_number("pageSize", size)?,
                    None => config.default_page_size as i64,
                };

                Ok(PageRequest::Indexed {
                    page_index: page_index.min(u32::MAX as i64) as u32,
                    page_size: clamp(page_size, config.max_page_size),
                    order,
                })
            }
            None => {
                let limit = match non_empty(self.limit.as_deref()) {
                    Some(limit) => parse_number("limit", limit)?,
                    None => config.default_page_size as i64,
                };

                Ok(PageRequest::Cursor {
                    cursor,
                    limit: clamp(limit, MAX_CURSOR_LIMIT),
                    order,
                })
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(field: &str, value: &str) -> Result<i64, VowsError> {
    value
        .parse::<i64>()
        .map_err(|_| VowsError::Validation(format!("{} must be an integer, got '{}'", field, value)))
}

fn clamp(value: i64, max: u32) -> u32 {
    value.clamp(1, max.max(1) as i64) as u32
}

/// One page of comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub elements: Vec<Comment>,
    pub has_next: bool,
    pub total_elements: u64,
    pub total_pages_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
}

/// `ceil(total / page_size)`; zero when either is zero
pub fn total_pages(total_elements: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        0
    } else {
        total_elements.div_ceil(page_size as u64)
    }
}
