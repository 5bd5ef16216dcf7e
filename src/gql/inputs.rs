use juniper::GraphQLInputObject;
use uuid::Uuid;

use crate::models::{MemberTypeId, PostUpdate, ProfileUpdate, UserUpdate};

#[derive(GraphQLInputObject)]
pub struct CreateUserInput {
    pub name: String,
    pub balance: f64,
}

#[derive(GraphQLInputObject)]
pub struct ChangeUserInput {
    pub name: Option<String>,
    pub balance: Option<f64>,
}

#[derive(GraphQLInputObject)]
pub struct CreateProfileInput {
    pub is_male: bool,
    pub year_of_birth: i32,
    pub user_id: Uuid,
    pub member_type_id: MemberTypeId,
}

#[derive(GraphQLInputObject)]
pub struct ChangeProfileInput {
    pub is_male: Option<bool>,
    pub year_of_birth: Option<i32>,
    pub member_type_id: Option<MemberTypeId>,
}

#[derive(GraphQLInputObject)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

#[derive(GraphQLInputObject)]
pub struct ChangePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ChangeUserInput {
    pub fn as_update(&self) -> UserUpdate<'_> {
        UserUpdate {
            name: self.name.as_deref(),
            balance: self.balance,
        }
    }
}

impl ChangeProfileInput {
    pub fn as_update(&self) -> ProfileUpdate<'_> {
        ProfileUpdate {
            is_male: self.is_male,
            year_of_birth: self.year_of_birth,
            member_type_id: self.member_type_id.map(MemberTypeId::as_str),
        }
    }
}

impl ChangePostInput {
    pub fn as_update(&self) -> PostUpdate<'_> {
        PostUpdate {
            title: self.title.as_deref(),
            content: self.content.as_deref(),
        }
    }
}
