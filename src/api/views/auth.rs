use super::{attr, esc, layout};
use crate::models::Anime;

#[must_use]
pub fn login() -> String {
    let body = r#"<h1>anishelf</h1>
<section>
<h2>Log in</h2>
<form method="post" action="/login">
<label>Username <input name="username" autocomplete="username" required></label>
<label>Password <input type="password" name="password" autocomplete="current-password" required></label>
<button type="submit">Log in</button>
</form>
</section>
<section>
<h2>Register</h2>
<form method="post" action="/register">
<label>Username <input name="username" autocomplete="username" required></label>
<label>Password <input type="password" name="password" autocomplete="new-password" required></label>
<button type="submit">Create account</button>
</form>
</section>"#;
    layout("Log in", None, body)
}

/// Landing page with the most recently added anime, if any.
#[must_use]
pub fn home(username: &str, latest: Option<&Anime>) -> String {
    let latest = latest.map_or_else(
        || "<p>No anime has been added yet.</p>".to_string(),
        |anime| {
            let image = if anime.image_url.is_empty() {
                String::new()
            } else {
                format!(
                    r#"<img src="{}" alt="{}" class="cover">"#,
                    attr(&anime.image_url),
                    attr(&anime.title)
                )
            };
            format!(
                r#"<article>{image}<h3><a href="/animes/{id}">{title}</a></h3><p>{studio}</p></article>"#,
                id = anime.id,
                title = esc(&anime.title),
                studio = esc(&anime.studio),
            )
        },
    );

    let body = format!(
        r#"<h1>Welcome, {username}</h1>
<h2>Latest addition</h2>
{latest}
<p><a href="/animes/new">Add an anime</a> · <a href="/reviews/new">Write a review</a></p>"#,
        username = esc(username),
    );
    layout("Home", Some(username), &body)
}
