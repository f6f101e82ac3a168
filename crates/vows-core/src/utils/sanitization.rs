/// Text sanitization for user-submitted content

/// Removes every HTML tag from user text, keeping the text content
///
/// Comments and contact messages are plain text; markup is dropped rather
/// than escaped so it never reaches a page or an email body.
///
/// # Examples
/// ```
/// use vows_core::utils::sanitization::strip_html;
///
/// assert_eq!(strip_html("<b>Congrats</b>!"), "Congrats!");
/// assert_eq!(strip_html("plain"), "plain");
/// ```
pub fn strip_html(input: &str) -> String {
    let cleaned = ammonia::Builder::empty()
        .clean_content_tags(["script", "style"].into_iter().collect())
        .clean(input)
        .to_string();
    // ammonia escapes the characters it leaves behind; the text is re-escaped
    // wherever it is rendered
    cleaned
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Trims and strips markup in one step
pub fn clean_user_text(input: &str) -> String {
    strip_html(input).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<script>alert(1)</script>Hi"), "Hi");
        assert_eq!(strip_html("<p>Best <em>wishes</em></p>"), "Best wishes");
        assert_eq!(strip_html("Tom & Jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_clean_user_text() {
        assert_eq!(clean_user_text("  <b>Lovely</b> day  "), "Lovely day");
        assert_eq!(clean_user_text("   "), "");
    }
}
