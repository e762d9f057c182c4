//! Row-to-wire conversions. Timestamps arrive as SQLite `YYYY-MM-DD HH:MM:SS`
//! text and are exposed as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use agora_db::models::{
    CategoryRow, ChannelRow, CommentRow, LikeRow, MessageRow, PostRow, PostSummaryRow,
    ShortUserRow, UserRow,
};
use agora_types::models::{
    Category, Channel, Comment, Like, Message, Post, PostSummary, ShortUser, User,
};

const SQLITE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";
const SQLITE_DATE: &str = "%Y-%m-%d";

pub fn timestamp(raw: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP)
        .map(|t| t.and_utc())
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::<Utc>::default()
        })
}

fn date(raw: Option<String>) -> Option<NaiveDate> {
    let raw = raw?;
    match NaiveDate::parse_from_str(&raw, SQLITE_DATE) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Corrupt date '{}': {}", raw, e);
            None
        }
    }
}

pub fn date_column(date: NaiveDate) -> String {
    date.format(SQLITE_DATE).to_string()
}

pub fn short_user(row: ShortUserRow) -> ShortUser {
    ShortUser {
        id: row.id,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        online: row.online,
        image_url: row.image_url,
        last_active: timestamp(&row.last_active),
    }
}

/// Drops the password hash.
pub fn user(row: UserRow, categories: Vec<CategoryRow>) -> User {
    User {
        id: row.id,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        date_of_birth: date(row.date_of_birth),
        about: row.about,
        image_url: row.image_url,
        confirmed: row.confirmed,
        online: row.online,
        created_at: timestamp(&row.created_at),
        last_active: timestamp(&row.last_active),
        categories: categories.into_iter().map(category).collect(),
    }
}

pub fn channel(row: ChannelRow, categories: Vec<CategoryRow>) -> Channel {
    Channel {
        id: channel_id(&row.id),
        name: row.name,
        tag: row.tag,
        is_private: row.is_private,
        owner: short_user(row.owner),
        created_at: timestamp(&row.created_at),
        categories: categories.into_iter().map(category).collect(),
    }
}

pub fn message(row: MessageRow) -> Message {
    Message {
        id: row.id,
        channel_id: channel_id(&row.channel_id),
        sender: short_user(row.sender),
        content: row.content,
        image_url: row.image_url,
        created_at: timestamp(&row.created_at),
        updated_at: row.updated_at.as_deref().map(timestamp),
    }
}

pub fn post(
    row: PostRow,
    comments: Vec<CommentRow>,
    likes: Vec<LikeRow>,
    categories: Vec<CategoryRow>,
) -> Post {
    Post {
        id: row.id,
        title: row.title,
        body: row.body,
        image_url: row.image_url,
        owner: short_user(row.owner),
        created_at: timestamp(&row.created_at),
        updated_at: row.updated_at.as_deref().map(timestamp),
        comments: comments.into_iter().map(comment).collect(),
        likes: likes.into_iter().map(like).collect(),
        categories: categories.into_iter().map(category).collect(),
    }
}

pub fn post_summary(row: PostSummaryRow) -> PostSummary {
    PostSummary {
        id: row.id,
        title: row.title,
        body: row.body,
        image_url: row.image_url,
        owner_id: row.owner_id,
        created_at: timestamp(&row.created_at),
        updated_at: row.updated_at.as_deref().map(timestamp),
        like_count: row.like_count,
        comment_count: row.comment_count,
    }
}

pub fn comment(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        post_id: row.post_id,
        sender: short_user(row.sender),
        content: row.content,
        created_at: timestamp(&row.created_at),
        updated_at: row.updated_at.as_deref().map(timestamp),
    }
}

pub fn like(row: LikeRow) -> Like {
    Like {
        post_id: row.post_id,
        user_id: row.user_id,
        created_at: timestamp(&row.created_at),
    }
}

pub fn category(row: CategoryRow) -> Category {
    Category {
        id: row.id,
        name: row.name,
    }
}

fn channel_id(raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt channel id '{}': {}", raw, e);
        Uuid::nil()
    })
}
