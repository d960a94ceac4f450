pub mod anime;
pub mod fields;
mod lenient;
pub mod review;
pub mod user;

pub use anime::{Anime, AnimeInput};
pub use fields::Fields;
pub use review::{Rejection, Review, ReviewInput};
pub use user::{Identity, User};
