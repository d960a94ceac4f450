pub const SESSION_COOKIE: &str = "access_token";

pub mod reviews {

    pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

    pub const MIN_TITLE_LEN: usize = 2;

    pub const MIN_RATING: u8 = 0;

    pub const MAX_RATING: u8 = 10;
}

pub mod limits {

    pub const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;
}
