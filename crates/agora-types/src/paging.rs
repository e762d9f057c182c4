use serde::Deserialize;

/// Resolved offset/limit pair handed to the database layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl Page {
    /// A missing or zero limit falls back to `default`; anything above `max` is clamped.
    pub fn resolve(offset: Option<u32>, limit: Option<u32>, default: u32, max: u32) -> Self {
        let limit = match limit {
            Some(0) | None => default,
            Some(n) => n.min(max),
        };
        Self {
            offset: offset.unwrap_or(0),
            limit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn page(&self, default: u32, max: u32) -> Page {
        Page::resolve(self.offset, self.limit, default, max)
    }
}

/// `GET /followers/{id}` and `GET /following/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct FollowQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    /// Only return users whose online flag equals this value.
    pub online: Option<bool>,
}

impl FollowQuery {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 200;

    pub fn page(&self) -> Page {
        Page::resolve(self.offset, self.limit, Self::DEFAULT_LIMIT, Self::MAX_LIMIT)
    }
}

/// `GET /post/all`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub user_id: Option<i64>,
    #[serde(default)]
    pub only_following: bool,
}

impl PostQuery {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 50;

    pub fn page(&self) -> Page {
        Page::resolve(self.offset, self.limit, Self::DEFAULT_LIMIT, Self::MAX_LIMIT)
    }
}
