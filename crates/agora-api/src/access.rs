//! Ownership and membership predicates.
//!
//! Every check takes the loaded resource and the actor as arguments and
//! answers with a value; a denial is an `ApiError`, never a panic. Only the
//! membership lookup touches the database.

use agora_types::models::{Channel, Comment, Message, Post};

use crate::error::{ApiError, ApiResult};
use crate::middleware::Actor;
use crate::state::{AppState, with_db};

/// A resource with a single user holding mutation rights over it.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl Owned for Post {
    fn owner_id(&self) -> i64 {
        self.owner.id
    }
}

impl Owned for Channel {
    fn owner_id(&self) -> i64 {
        self.owner.id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> i64 {
        self.sender.id
    }
}

impl Owned for Message {
    fn owner_id(&self) -> i64 {
        self.sender.id
    }
}

pub fn is_owner(resource: &impl Owned, actor: &Actor) -> bool {
    resource.owner_id() == actor.id()
}

pub fn require_owner(resource: &impl Owned, actor: &Actor) -> ApiResult<()> {
    if is_owner(resource, actor) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Permission denied"))
    }
}

/// How a user relates to a channel. The owner is never stored as a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    Owner,
    Member,
    Outsider,
}

impl ChannelRole {
    pub fn can_participate(self) -> bool {
        !matches!(self, Self::Outsider)
    }
}

pub fn channel_role(channel: &Channel, actor_id: i64, is_member: bool) -> ChannelRole {
    if channel.owner.id == actor_id {
        ChannelRole::Owner
    } else if is_member {
        ChannelRole::Member
    } else {
        ChannelRole::Outsider
    }
}

/// Owner or member. The owner is answered without a query.
pub async fn require_channel_member(
    state: &AppState,
    channel: &Channel,
    actor: &Actor,
) -> ApiResult<ChannelRole> {
    let role = if channel.owner.id == actor.id() {
        ChannelRole::Owner
    } else {
        let channel_id = channel.id.to_string();
        let actor_id = actor.id();
        let is_member =
            with_db(state, move |db| db.is_channel_member(&channel_id, actor_id)).await?;
        channel_role(channel, actor_id, is_member)
    };

    if role.can_participate() {
        Ok(role)
    } else {
        Err(ApiError::forbidden("Access denied"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::models::{ShortUser, User};
    use axum::http::StatusCode;
    use chrono::Utc;
    use uuid::Uuid;

    fn short(id: i64) -> ShortUser {
        ShortUser {
            id,
            email: format!("u{id}@test.com"),
            first_name: "First".into(),
            last_name: "Last".into(),
            online: false,
            image_url: None,
            last_active: Utc::now(),
        }
    }

    fn actor(id: i64) -> Actor {
        let s = short(id);
        Actor {
            user: User {
                id,
                email: s.email,
                first_name: s.first_name,
                last_name: s.last_name,
                date_of_birth: None,
                about: None,
                image_url: None,
                confirmed: true,
                online: true,
                created_at: Utc::now(),
                last_active: Utc::now(),
                categories: vec![],
            },
        }
    }

    fn channel(owner: i64) -> Channel {
        Channel {
            id: Uuid::new_v4(),
            name: "general".into(),
            tag: "general".into(),
            is_private: true,
            owner: short(owner),
            created_at: Utc::now(),
            categories: vec![],
        }
    }

    fn message(sender: i64) -> Message {
        Message {
            id: 1,
            channel_id: Uuid::new_v4(),
            sender: short(sender),
            content: "hi".into(),
            image_url: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn owner_check_compares_ids() {
        assert!(is_owner(&message(1), &actor(1)));
        assert!(!is_owner(&message(1), &actor(2)));
        assert!(is_owner(&channel(5), &actor(5)));
    }

    #[test]
    fn require_owner_denies_with_403() {
        assert!(require_owner(&message(1), &actor(1)).is_ok());
        let err = require_owner(&message(1), &actor(2)).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Permission denied");
    }

    #[test]
    fn owner_role_ignores_membership_row() {
        let c = channel(1);
        assert_eq!(channel_role(&c, 1, false), ChannelRole::Owner);
        assert_eq!(channel_role(&c, 1, true), ChannelRole::Owner);
        assert_eq!(channel_role(&c, 2, true), ChannelRole::Member);
        assert_eq!(channel_role(&c, 3, false), ChannelRole::Outsider);
        assert!(!ChannelRole::Outsider.can_participate());
    }
}
