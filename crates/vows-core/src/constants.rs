/// Application constants
///
/// Defaults and limits shared by the API and worker functions. Values that
/// operators may override live in `SiteConfig`; these are the fallbacks.
// ============================================================================
// Pagination
// ============================================================================
/// Default page size / limit when the request does not specify one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default upper bound for page-index addressing
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Hard upper bound for cursor addressing
pub const MAX_CURSOR_LIMIT: u32 = 1000;

// ============================================================================
// Store layout
// ============================================================================

/// Partition key attribute shared by comments and subscriptions
pub const ATTR_PHOTO_ID: &str = "photoId";

/// Comment sort key attribute (`createdAt#commentId`)
pub const ATTR_SORT_KEY: &str = "sortKey";

pub const ATTR_COMMENT_ID: &str = "commentId";
pub const ATTR_CREATED_AT: &str = "createdAt";
pub const ATTR_AUTHOR_NAME: &str = "authorName";
pub const ATTR_CONTENT: &str = "content";

/// Subscription sort key attribute
pub const ATTR_EMAIL: &str = "email";

/// Separator between timestamp and comment id in the sort key
pub const SORT_KEY_SEPARATOR: char = '#';

/// Default name of the comment-by-id secondary index
pub const DEFAULT_COMMENTS_BY_ID_INDEX: &str = "commentId-index";

// ============================================================================
// Validation limits
// ============================================================================

/// Maximum author name length (characters)
pub const MAX_AUTHOR_NAME_LENGTH: usize = 50;

/// Maximum comment length (characters)
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Maximum contact message length (characters)
pub const MAX_CONTACT_MESSAGE_LENGTH: usize = 5000;

/// Maximum contact name length (characters)
pub const MAX_CONTACT_NAME_LENGTH: usize = 100;

/// Maximum email address length (RFC 5321)
pub const MAX_EMAIL_ADDRESS_LENGTH: usize = 320;

// ============================================================================
// CAPTCHA
// ============================================================================

/// Google reCAPTCHA verification endpoint
pub const DEFAULT_RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Client-side timeout for the verification call
pub const DEFAULT_RECAPTCHA_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// Mail
// ============================================================================

pub const DEFAULT_SMTP_PORT: u16 = 587;

// ============================================================================
// HTTP headers
// ============================================================================

/// Caller-supplied correlation id, echoed back
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// API Gateway request id, echoed back
pub const HEADER_GATEWAY_REQUEST_ID: &str = "x-amzn-requestid";
