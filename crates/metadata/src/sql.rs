//! SQL fragments shared by the SQLite and PostgreSQL stores.

pub(crate) const USER_COLUMNS: &str = "seq, user_id, username, email, created_at, updated_at";

pub(crate) const VIDEO_COLUMNS: &str = "seq, video_id, owner_id, title, description, video_file, \
     video_key, thumbnail, thumbnail_key, duration, views, is_published, created_at, updated_at";

/// `VIDEO_COLUMNS` qualified with the `v` alias, for joins.
pub(crate) const VIDEO_COLUMNS_V: &str = "v.seq, v.video_id, v.owner_id, v.title, v.description, \
     v.video_file, v.video_key, v.thumbnail, v.thumbnail_key, v.duration, v.views, \
     v.is_published, v.created_at, v.updated_at";

pub(crate) const COMMENT_COLUMNS: &str =
    "seq, comment_id, video_id, owner_id, content, created_at, updated_at";

pub(crate) const COMMENT_COLUMNS_C: &str =
    "c.seq, c.comment_id, c.video_id, c.owner_id, c.content, c.created_at, c.updated_at";

pub(crate) const LIKE_COLUMNS: &str =
    "seq, like_id, user_id, target_kind, target_id, video_owner_id, created_at";

pub(crate) const SUBSCRIPTION_COLUMNS: &str =
    "seq, subscription_id, subscriber_id, channel_id, created_at, updated_at";

pub(crate) const TWEET_COLUMNS: &str = "seq, tweet_id, owner_id, content, created_at, updated_at";

/// Lowercased title, the sort key for `sortBy=title`. Folding happens here
/// because SQLite's `LOWER` only folds ASCII.
pub(crate) fn title_key(title: &str) -> String {
    title.to_lowercase()
}

/// Lowercased title and description, the haystack for term search. The
/// separator is whitespace, so no single term can match across the two.
pub(crate) fn search_text(title: &str, description: &str) -> String {
    format!("{title}\n{description}").to_lowercase()
}

/// Build a `LIKE` pattern matching `term` anywhere, with `\` as the escape
/// character for literal `%`, `_` and `\`.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Clamp an unsigned count into a SQL integer.
pub(crate) fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Read back a SQL count. Negative values cannot come out of `COUNT(*)`.
pub(crate) fn to_u64(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}
