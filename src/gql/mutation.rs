use juniper::{graphql_object, FieldResult};
use uuid::Uuid;

use super::inputs::{
    ChangePostInput, ChangeProfileInput, ChangeUserInput, CreatePostInput, CreateProfileInput,
    CreateUserInput,
};
use super::Context;
use crate::db;
use crate::graph::UserNode;
use crate::models;

#[allow(clippy::module_name_repetitions)]
pub struct RootMutation;

#[graphql_object(context = Context)]
impl RootMutation {
    fn create_user(context: &Context, dto: CreateUserInput) -> FieldResult<UserNode> {
        let conn = context.pool.get()?;
        let user = db::users::create(&conn, &dto.name, dto.balance)?;
        Ok(UserNode::leaf(user))
    }

    fn change_user(
        context: &Context,
        id: Uuid,
        dto: ChangeUserInput,
    ) -> FieldResult<Option<UserNode>> {
        let conn = context.pool.get()?;
        Ok(db::users::update(&conn, &id, &dto.as_update())?.map(UserNode::leaf))
    }

    fn delete_user(context: &Context, id: Uuid) -> FieldResult<bool> {
        let conn = context.pool.get()?;
        Ok(db::users::delete(&conn, &id)?)
    }

    fn create_profile(context: &Context, dto: CreateProfileInput) -> FieldResult<models::Profile> {
        let conn = context.pool.get()?;
        Ok(db::profiles::create(
            &conn,
            dto.is_male,
            dto.year_of_birth,
            &dto.user_id,
            dto.member_type_id,
        )?)
    }

    fn change_profile(
        context: &Context,
        id: Uuid,
        dto: ChangeProfileInput,
    ) -> FieldResult<Option<models::Profile>> {
        let conn = context.pool.get()?;
        Ok(db::profiles::update(&conn, &id, &dto.as_update())?)
    }

    fn delete_profile(context: &Context, id: Uuid) -> FieldResult<bool> {
        let conn = context.pool.get()?;
        Ok(db::profiles::delete(&conn, &id)?)
    }

    fn create_post(context: &Context, dto: CreatePostInput) -> FieldResult<models::Post> {
        let conn = context.pool.get()?;
        Ok(db::posts::create(&conn, &dto.title, &dto.content, &dto.author_id)?)
    }

    fn change_post(
        context: &Context,
        id: Uuid,
        dto: ChangePostInput,
    ) -> FieldResult<Option<models::Post>> {
        let conn = context.pool.get()?;
        Ok(db::posts::update(&conn, &id, &dto.as_update())?)
    }

    fn delete_post(context: &Context, id: Uuid) -> FieldResult<bool> {
        let conn = context.pool.get()?;
        Ok(db::posts::delete(&conn, &id)?)
    }

    /// Makes `userId` follow `authorId` and returns the follower.
    fn subscribe_to(
        context: &Context,
        user_id: Uuid,
        author_id: Uuid,
    ) -> FieldResult<Option<UserNode>> {
        let conn = context.pool.get()?;
        if db::users::find(&conn, &author_id)?.is_none() {
            return Ok(None);
        }
        match db::users::find(&conn, &user_id)? {
            Some(user) => {
                db::subscriptions::subscribe(&conn, &user_id, &author_id)?;
                Ok(Some(UserNode::leaf(user)))
            }
            None => Ok(None),
        }
    }

    fn unsubscribe_from(context: &Context, user_id: Uuid, author_id: Uuid) -> FieldResult<bool> {
        let conn = context.pool.get()?;
        Ok(db::subscriptions::unsubscribe(&conn, &user_id, &author_id)?)
    }
}
