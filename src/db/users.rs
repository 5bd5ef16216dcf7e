use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use crate::models::{User, UserNew, UserUpdate};

pub fn all(conn: &SqliteConnection) -> Result<Vec<User>, diesel::result::Error> {
    use crate::schema::users::dsl::{id, users};
    users.order(id.asc()).load::<User>(conn)
}

pub fn find(conn: &SqliteConnection, user_id: &Uuid) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::{id, users};
    users
        .filter(id.eq(user_id.to_string()))
        .first::<User>(conn)
        .optional()
}

pub fn create(conn: &SqliteConnection, name: &str, balance: f64) -> Result<User, diesel::result::Error> {
    use crate::schema::users::dsl::users;
    let new_id = Uuid::new_v4().to_string();
    log::trace!("User new {}", &new_id);
    diesel::insert_into(users)
        .values(UserNew {
            id: &new_id,
            name,
            balance,
        })
        .execute(conn)?;
    Ok(User {
        id: new_id,
        name: String::from(name),
        balance,
    })
}

/// Applies `changes` and returns the updated row, or `None` if no such user exists.
pub fn update(
    conn: &SqliteConnection,
    user_id: &Uuid,
    changes: &UserUpdate,
) -> Result<Option<User>, diesel::result::Error> {
    use crate::schema::users::dsl::{id, users};
    let key = user_id.to_string();
    if changes.name.is_some() || changes.balance.is_some() {
        let updated = diesel::update(users.filter(id.eq(&key)))
            .set(changes)
            .execute(conn)?;
        if updated == 0 {
            return Ok(None);
        }
    }
    users.filter(id.eq(&key)).first::<User>(conn).optional()
}

/// Returns false if no such user exists.
pub fn delete(conn: &SqliteConnection, user_id: &Uuid) -> Result<bool, diesel::result::Error> {
    use crate::schema::users::dsl::{id, users};
    let deleted = diesel::delete(users.filter(id.eq(user_id.to_string()))).execute(conn)?;
    log::trace!("User delete {} ({})", user_id, deleted);
    Ok(deleted > 0)
}
