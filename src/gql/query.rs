use juniper::{graphql_object, FieldResult};
use uuid::Uuid;

use super::Context;
use crate::db;
use crate::graph::{GraphResolver, UserNode};
use crate::models::{self, MemberTypeId};

#[allow(clippy::module_name_repetitions)]
pub struct RootQuery;

#[graphql_object(context = Context)]
impl RootQuery {
    fn users(context: &Context) -> FieldResult<Vec<UserNode>> {
        let conn = context.pool.get()?;
        Ok(db::users::all(&conn)?
            .into_iter()
            .map(UserNode::leaf)
            .collect())
    }

    /// Looks up one user together with its subscription graph.
    async fn user(context: &Context, id: Uuid) -> FieldResult<Option<UserNode>> {
        let resolver = GraphResolver::new(context.store.clone(), context.graph);
        let resolution = resolver.resolve(id).await?;
        Ok(resolution.outcome.into_node())
    }

    fn member_types(context: &Context) -> FieldResult<Vec<models::MemberType>> {
        let conn = context.pool.get()?;
        Ok(db::member_types::all(&conn)?)
    }

    fn member_type(context: &Context, id: MemberTypeId) -> FieldResult<Option<models::MemberType>> {
        let conn = context.pool.get()?;
        Ok(db::member_types::find(&conn, id)?)
    }

    fn posts(context: &Context) -> FieldResult<Vec<models::Post>> {
        let conn = context.pool.get()?;
        Ok(db::posts::all(&conn)?)
    }

    fn post(context: &Context, id: Uuid) -> FieldResult<Option<models::Post>> {
        let conn = context.pool.get()?;
        Ok(db::posts::find(&conn, &id)?)
    }

    fn profiles(context: &Context) -> FieldResult<Vec<models::Profile>> {
        let conn = context.pool.get()?;
        Ok(db::profiles::all(&conn)?)
    }

    fn profile(context: &Context, id: Uuid) -> FieldResult<Option<models::Profile>> {
        let conn = context.pool.get()?;
        Ok(db::profiles::find(&conn, &id)?)
    }
}
