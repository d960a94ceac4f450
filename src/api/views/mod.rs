//! Server-rendered HTML pages.
//!
//! Pages are assembled with plain string building. Every value that comes
//! from the store or the request goes through [`esc`] or [`attr`].

use std::fmt::Write;

pub mod anime;
pub mod auth;
pub mod reviews;

pub(crate) fn esc(value: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_text(value)
}

pub(crate) fn attr(value: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Wraps `body` in the shared page chrome. The navigation bar is shown only
/// to signed-in users.
pub(crate) fn layout(title: &str, username: Option<&str>, body: &str) -> String {
    let mut page = String::with_capacity(body.len() + 1024);
    let _ = write!(
        page,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · anishelf</title>
<link rel="stylesheet" href="/public/styles.css">
</head>
<body>
"#,
        title = esc(title)
    );

    if let Some(username) = username {
        let _ = write!(
            page,
            r#"<nav>
<a href="/protected">Home</a>
<a href="/animes">Animes</a>
<a href="/reviews">Reviews</a>
<span class="user">{username}</span>
<form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form>
</nav>
"#,
            username = esc(username)
        );
    }

    let _ = write!(page, "<main>\n{body}\n</main>\n</body>\n</html>\n");
    page
}

/// A POST form that tunnels `DELETE` through the `_method` field.
pub(crate) fn delete_button(action: &str, label: &str) -> String {
    format!(
        r#"<form method="post" action="{action}" class="inline"><input type="hidden" name="_method" value="DELETE"><button type="submit">{label}</button></form>"#,
        action = attr(action),
        label = esc(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_escapes_title_and_user() {
        let page = layout("<script>", Some("a&b"), "<p>ok</p>");
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("a&amp;b"));
        assert!(page.contains("<p>ok</p>"));
    }

    #[test]
    fn test_layout_hides_nav_for_anonymous() {
        assert!(!layout("Login", None, "").contains("<nav>"));
    }

    #[test]
    fn test_delete_button_tunnels_method() {
        let html = delete_button("/animes/3", "Delete");
        assert!(html.contains(r#"action="/animes/3""#));
        assert!(html.contains(r#"name="_method" value="DELETE""#));
    }
}
