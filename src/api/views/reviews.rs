use std::fmt::Write;

use super::{attr, delete_button, esc, layout};
use crate::models::{Anime, Review};

fn anime_title(animes: &[Anime], id: u32) -> Option<&str> {
    animes
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.title.as_str())
}

fn anime_options(animes: &[Anime], selected: Option<&str>) -> String {
    let mut options = String::new();
    for anime in animes {
        let id = anime.id.to_string();
        let _ = write!(
            options,
            r#"<option value="{id}"{selected}>{title}</option>"#,
            selected = if selected == Some(id.as_str()) {
                " selected"
            } else {
                ""
            },
            title = esc(&anime.title),
        );
    }
    options
}

#[must_use]
pub fn list(
    username: &str,
    reviews: &[Review],
    animes: &[Anime],
    query: &str,
    anime_id: Option<&str>,
) -> String {
    let mut rows = String::new();
    for review in reviews {
        // Reviews whose anime was deleted are listed without a link.
        let anime = anime_title(animes, review.anime_id).map_or_else(
            || "<em>removed</em>".to_string(),
            |title| format!(r#"<a href="/animes/{}">{}</a>"#, review.anime_id, esc(title)),
        );
        let _ = write!(
            rows,
            r#"<tr><td><a href="/reviews/{id}">{title}</a></td><td>{anime}</td><td>{author}</td><td>{rating}/10</td><td>{date}</td></tr>"#,
            id = review.id,
            title = esc(&review.title),
            author = esc(&review.author),
            rating = review.rating,
            date = review.created_at.format("%Y-%m-%d"),
        );
    }

    let table = if reviews.is_empty() {
        "<p>No reviews found.</p>".to_string()
    } else {
        format!(
            "<table>\n<thead><tr><th>Title</th><th>Anime</th><th>Author</th><th>Rating</th><th>Date</th></tr></thead>\n<tbody>{rows}</tbody>\n</table>"
        )
    };

    let body = format!(
        r#"<h1>Reviews</h1>
<form method="get" action="/reviews" class="search">
<select name="animeId"><option value="">All animes</option>{options}</select>
<input type="search" name="q" value="{query}" placeholder="Title or author">
<button type="submit">Filter</button>
</form>
<p><a href="/reviews/new{new_query}">Write a review</a></p>
{table}"#,
        options = anime_options(animes, anime_id),
        query = attr(query),
        new_query = anime_id
            .map(|id| {
                let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
                format!("?animeId={encoded}")
            })
            .unwrap_or_default(),
    );
    layout("Reviews", Some(username), &body)
}

#[must_use]
pub fn detail(username: &str, review: &Review, anime: Option<&Anime>) -> String {
    let anime = anime.map_or_else(
        || "<p>The reviewed anime is no longer in the catalog.</p>".to_string(),
        |anime| {
            format!(
                r#"<p>Review of <a href="/animes/{}">{}</a></p>"#,
                anime.id,
                esc(&anime.title)
            )
        },
    );

    let body = format!(
        r#"<article>
<h1>{title}</h1>
{anime}
<p class="meta">{rating}/10 · by {author} · {date}</p>
<div class="content">{content}</div>
</article>
<p><a href="/reviews/{id}/edit">Edit</a> {delete} <a href="/reviews">Back</a></p>"#,
        id = review.id,
        title = esc(&review.title),
        rating = review.rating,
        author = esc(&review.author),
        date = review.created_at.format("%Y-%m-%d %H:%M"),
        content = esc(&review.content),
        delete = delete_button(&format!("/reviews/{}", review.id), "Delete"),
    );
    layout(&review.title, Some(username), &body)
}

#[must_use]
pub fn new_form(username: &str, animes: &[Anime], preselect: Option<&str>) -> String {
    let body = format!(
        "<h1>New review</h1>\n{}",
        form("/reviews", None, animes, preselect, None)
    );
    layout("New review", Some(username), &body)
}

#[must_use]
pub fn edit_form(username: &str, review: &Review, animes: &[Anime]) -> String {
    let selected = review.anime_id.to_string();
    let body = format!(
        "<h1>Edit review</h1>\n{}",
        form(
            &format!("/reviews/{}", review.id),
            Some("PUT"),
            animes,
            Some(&selected),
            Some(review),
        )
    );
    layout("Edit review", Some(username), &body)
}

fn form(
    action: &str,
    method: Option<&str>,
    animes: &[Anime],
    selected: Option<&str>,
    review: Option<&Review>,
) -> String {
    let method = method.map_or_else(String::new, |m| {
        format!(r#"<input type="hidden" name="_method" value="{}">"#, attr(m))
    });

    format!(
        r#"<form method="post" action="{action}">
{method}
<label>Anime <select name="animeId" required><option value="">Choose…</option>{options}</select></label>
<label>Title <input name="title" minlength="2" value="{title}" required></label>
<label>Author <input name="author" value="{author}" placeholder="Anonymous"></label>
<label>Rating <input type="number" name="rating" min="0" max="10" value="{rating}"></label>
<label>Review <textarea name="content">{content}</textarea></label>
<button type="submit">Save</button>
</form>"#,
        action = attr(action),
        options = anime_options(animes, selected),
        title = attr(review.map_or("", |r| r.title.as_str())),
        author = attr(review.map_or("", |r| r.author.as_str())),
        rating = review.map_or(5, |r| r.rating),
        content = esc(review.map_or("", |r| r.content.as_str())),
    )
}
