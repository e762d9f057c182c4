//! Database row types. These map directly to SQLite rows.
//! Distinct from agora-types API models to keep the DB layer independent.
//! Timestamps stay in SQLite's `YYYY-MM-DD HH:MM:SS` text form.

pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<String>,
    pub about: Option<String>,
    pub image_url: Option<String>,
    pub confirmed: bool,
    pub forgot_password_locked: bool,
    pub online: bool,
    pub created_at: String,
    pub last_active: String,
}

/// Public user columns joined onto channels, posts, comments and messages.
#[derive(Clone)]
pub struct ShortUserRow {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub online: bool,
    pub image_url: Option<String>,
    pub last_active: String,
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub date_of_birth: Option<String>,
}

/// Profile fields a user may change. `None` keeps the stored value.
#[derive(Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub about: Option<String>,
    pub image_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.date_of_birth.is_none()
            && self.about.is_none()
            && self.image_url.is_none()
    }
}

pub struct ChannelRow {
    pub id: String,
    pub name: String,
    pub tag: String,
    pub is_private: bool,
    pub owner: ShortUserRow,
    pub created_at: String,
}

pub struct NewChannel<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub tag: &'a str,
    pub is_private: bool,
    pub owner_id: i64,
}

pub struct MessageRow {
    pub id: i64,
    pub channel_id: String,
    pub sender: ShortUserRow,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Outcome of an all-or-nothing batch delete.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchDelete {
    Deleted(usize),
    /// Ids in the batch that belong to another sender; nothing was deleted.
    NotOwned(Vec<i64>),
    NoneFound,
}

pub struct PostRow {
    pub id: i64,
    pub owner: ShortUserRow,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

pub struct PostSummaryRow {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
}

pub struct NewPost<'a> {
    pub owner_id: i64,
    pub title: &'a str,
    pub body: &'a str,
    pub image_url: Option<&'a str>,
}

#[derive(Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
}

/// Feed filter for post listings.
#[derive(Default, Clone, Copy)]
pub struct PostFilter {
    pub owner_id: Option<i64>,
    /// Restrict to posts whose owner this user follows.
    pub followed_by: Option<i64>,
}

pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub sender: ShortUserRow,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

pub struct LikeRow {
    pub post_id: i64,
    pub user_id: i64,
    pub created_at: String,
}

pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

/// Purpose a one-time key was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    ConfirmEmail,
    ForgotPassword,
}

impl KeyPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfirmEmail => "confirm_email",
            Self::ForgotPassword => "forgot_password",
        }
    }
}
