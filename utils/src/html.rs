//! HTML helpers for messages sent with HTML parse mode.

/// Escape `&`, `<`, `>` and `"` for safe embedding in HTML text.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A mention link to a user by id, labelled with the escaped name.
pub fn user_link(user_id: i64, name: &str) -> String {
    format!(r#"<a href="tg://user?id={user_id}">{}</a>"#, escape_html(name))
}
