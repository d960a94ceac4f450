use std::fmt::Write;

use super::{attr, delete_button, esc, layout};
use crate::models::{Anime, Review};

#[must_use]
pub fn list(username: &str, animes: &[Anime], query: &str) -> String {
    let mut rows = String::new();
    for anime in animes {
        let _ = write!(
            rows,
            r#"<tr><td><a href="/animes/{id}">{title}</a></td><td>{studio}</td><td>{episodes}</td><td>{status}</td><td>{year}</td><td>{genres}</td></tr>"#,
            id = anime.id,
            title = esc(&anime.title),
            studio = esc(&anime.studio),
            episodes = anime.episodes,
            status = esc(&anime.status),
            year = anime.year.map(|y| y.to_string()).unwrap_or_default(),
            genres = esc(&anime.genres.join(", ")),
        );
    }

    let table = if animes.is_empty() {
        "<p>No animes found.</p>".to_string()
    } else {
        format!(
            "<table>\n<thead><tr><th>Title</th><th>Studio</th><th>Episodes</th><th>Status</th><th>Year</th><th>Genres</th></tr></thead>\n<tbody>{rows}</tbody>\n</table>"
        )
    };

    let body = format!(
        r#"<h1>Animes</h1>
<form method="get" action="/animes" class="search">
<input type="search" name="q" value="{query}" placeholder="Title, studio, status or genre">
<button type="submit">Search</button>
</form>
<p><a href="/animes/new">Add anime</a></p>
{table}"#,
        query = attr(query),
    );
    layout("Animes", Some(username), &body)
}

#[must_use]
pub fn detail(username: &str, anime: &Anime, reviews: &[Review]) -> String {
    let mut review_items = String::new();
    for review in reviews {
        let _ = write!(
            review_items,
            r#"<li><a href="/reviews/{id}">{title}</a> · {rating}/10 · {author}</li>"#,
            id = review.id,
            title = esc(&review.title),
            rating = review.rating,
            author = esc(&review.author),
        );
    }
    let review_list = if reviews.is_empty() {
        "<p>No reviews yet.</p>".to_string()
    } else {
        format!("<ul>{review_items}</ul>")
    };

    let image = if anime.image_url.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="{}" class="cover">"#,
            attr(&anime.image_url),
            attr(&anime.title)
        )
    };

    let body = format!(
        r#"<article>
{image}
<h1>{title}</h1>
<dl>
<dt>Studio</dt><dd>{studio}</dd>
<dt>Episodes</dt><dd>{episodes}</dd>
<dt>Status</dt><dd>{status}</dd>
<dt>Year</dt><dd>{year}</dd>
<dt>Genres</dt><dd>{genres}</dd>
</dl>
<p class="synopsis">{synopsis}</p>
</article>
<p><a href="/animes/{id}/edit">Edit</a> {delete} <a href="/animes">Back</a></p>
<h2>Reviews</h2>
{review_list}
<p><a href="/reviews/new?animeId={id}">Write a review</a></p>"#,
        id = anime.id,
        title = esc(&anime.title),
        studio = esc(&anime.studio),
        episodes = anime.episodes,
        status = esc(&anime.status),
        year = anime.year.map_or_else(|| "—".to_string(), |y| y.to_string()),
        genres = esc(&anime.genres.join(", ")),
        synopsis = esc(&anime.synopsis),
        delete = delete_button(&format!("/animes/{}", anime.id), "Delete"),
    );
    layout(&anime.title, Some(username), &body)
}

#[must_use]
pub fn new_form(username: &str) -> String {
    let body = format!(
        "<h1>New anime</h1>\n{}",
        form("/animes", None, &Anime::default())
    );
    layout("New anime", Some(username), &body)
}

#[must_use]
pub fn edit_form(username: &str, anime: &Anime) -> String {
    let body = format!(
        "<h1>Edit {}</h1>\n{}",
        esc(&anime.title),
        form(&format!("/animes/{}", anime.id), Some("PUT"), anime)
    );
    layout("Edit anime", Some(username), &body)
}

fn form(action: &str, method: Option<&str>, anime: &Anime) -> String {
    let method = method.map_or_else(String::new, |m| {
        format!(r#"<input type="hidden" name="_method" value="{}">"#, attr(m))
    });
    let episodes = if anime.id == 0 {
        String::new()
    } else {
        anime.episodes.to_string()
    };

    format!(
        r#"<form method="post" action="{action}">
{method}
<label>Title <input name="title" value="{title}"></label>
<label>Studio <input name="studio" value="{studio}"></label>
<label>Episodes <input type="number" min="0" name="episodes" value="{episodes}"></label>
<label>Status <input name="status" value="{status}"></label>
<label>Year <input type="number" name="year" value="{year}"></label>
<label>Genres <input name="genres" value="{genres}" placeholder="Action, Drama"></label>
<label>Image URL <input name="imageUrl" value="{image_url}"></label>
<label>Synopsis <textarea name="synopsis">{synopsis}</textarea></label>
<button type="submit">Save</button>
</form>"#,
        action = attr(action),
        title = attr(&anime.title),
        studio = attr(&anime.studio),
        status = attr(&anime.status),
        year = anime.year.map(|y| y.to_string()).unwrap_or_default(),
        genres = attr(&anime.genres.join(", ")),
        image_url = attr(&anime.image_url),
        synopsis = esc(&anime.synopsis),
    )
}
