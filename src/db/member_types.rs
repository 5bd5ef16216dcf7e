use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::models::{MemberType, MemberTypeId};

pub fn all(conn: &SqliteConnection) -> Result<Vec<MemberType>, diesel::result::Error> {
    use crate::schema::member_types::dsl::{id, member_types};
    member_types.order(id.asc()).load::<MemberType>(conn)
}

pub fn find(
    conn: &SqliteConnection,
    member_type: MemberTypeId,
) -> Result<Option<MemberType>, diesel::result::Error> {
    use crate::schema::member_types::dsl::{id, member_types};
    member_types
        .filter(id.eq(member_type.as_str()))
        .first::<MemberType>(conn)
        .optional()
}
