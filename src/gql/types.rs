use juniper::{graphql_object, FieldResult};
use uuid::Uuid;

use super::Context;
use crate::db;
use crate::graph::UserNode;
use crate::loader::LoadError;
use crate::models::{self, MemberTypeId};

#[graphql_object(
    name = "User",
    description = "A member of the network, with whatever relations were resolved for it",
    context = Context,
)]
impl UserNode {
    fn id(&self) -> FieldResult<Uuid> {
        Ok(self.user.key()?)
    }
    fn name(&self) -> &str {
        &self.user.name
    }
    fn balance(&self) -> f64 {
        self.user.balance
    }
    fn posts(&self, context: &Context) -> FieldResult<Vec<models::Post>> {
        match &self.posts {
            Some(loaded) => Ok(loaded.clone()?),
            None => {
                let conn = context.pool.get()?;
                Ok(db::posts::find_by_author(&conn, &self.user.id)?)
            }
        }
    }
    fn profile(&self, context: &Context) -> FieldResult<Option<models::Profile>> {
        match &self.profile {
            Some(loaded) => Ok(loaded.clone()?),
            None => {
                let conn = context.pool.get()?;
                Ok(db::profiles::find_by_user(&conn, &self.user.id)?)
            }
        }
    }
    /// Authors this user follows. Only set within the depth of a `user(id)` lookup.
    fn user_subscribed_to(&self) -> FieldResult<Option<Vec<UserNode>>> {
        subscription_list(&self.user_subscribed_to)
    }
    /// Users following this one. Only set within the depth of a `user(id)` lookup.
    fn subscribed_to_user(&self) -> FieldResult<Option<Vec<UserNode>>> {
        subscription_list(&self.subscribed_to_user)
    }
}

fn subscription_list(
    list: &Option<Result<Vec<UserNode>, LoadError>>,
) -> FieldResult<Option<Vec<UserNode>>> {
    match list {
        None => Ok(None),
        Some(Ok(nodes)) => Ok(Some(nodes.clone())),
        Some(Err(error)) => Err(error.into()),
    }
}

#[graphql_object(description = "A post written by a user", context = Context)]
impl models::Post {
    fn id(&self) -> FieldResult<Uuid> {
        Ok(self.key()?)
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn content(&self) -> &str {
        &self.content
    }
    fn author_id(&self) -> &str {
        &self.author_id
    }
}

#[graphql_object(description = "Personal details attached to a user", context = Context)]
impl models::Profile {
    fn id(&self) -> FieldResult<Uuid> {
        Ok(self.key()?)
    }
    fn is_male(&self) -> bool {
        self.is_male
    }
    fn year_of_birth(&self) -> i32 {
        self.year_of_birth
    }
    fn user_id(&self) -> &str {
        &self.user_id
    }
    fn member_type_id(&self) -> FieldResult<MemberTypeId> {
        Ok(self.member_type_id.parse()?)
    }
    fn member_type(&self, context: &Context) -> FieldResult<Option<models::MemberType>> {
        let member_type = self.member_type_id.parse()?;
        let conn = context.pool.get()?;
        Ok(db::member_types::find(&conn, member_type)?)
    }
}

#[graphql_object(description = "A membership tier", context = Context)]
impl models::MemberType {
    fn id(&self) -> FieldResult<MemberTypeId> {
        Ok(self.id.parse()?)
    }
    fn discount(&self) -> f64 {
        self.discount
    }
    fn posts_limit_per_month(&self) -> i32 {
        self.posts_limit_per_month
    }
    fn profiles(&self, context: &Context) -> FieldResult<Vec<models::Profile>> {
        let conn = context.pool.get()?;
        Ok(db::profiles::find_by_member_type(&conn, &self.id)?)
    }
}
