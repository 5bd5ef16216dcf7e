use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use crate::models::SubscriptionNew;

/// Records that `subscriber` follows `author`. Subscribing twice is not an error.
pub fn subscribe(
    conn: &SqliteConnection,
    subscriber: &Uuid,
    author: &Uuid,
) -> Result<(), diesel::result::Error> {
    use crate::schema::subscribers_on_authors::dsl::subscribers_on_authors;
    let subscriber_id = subscriber.to_string();
    let author_id = author.to_string();
    log::trace!("Subscribe {} -> {}", &subscriber_id, &author_id);
    diesel::insert_or_ignore_into(subscribers_on_authors)
        .values(SubscriptionNew {
            subscriber_id: &subscriber_id,
            author_id: &author_id,
        })
        .execute(conn)?;
    Ok(())
}

/// Returns false if there was no such subscription.
pub fn unsubscribe(
    conn: &SqliteConnection,
    subscriber: &Uuid,
    author: &Uuid,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::subscribers_on_authors::dsl::{
        author_id, subscriber_id, subscribers_on_authors,
    };
    let deleted = diesel::delete(
        subscribers_on_authors
            .filter(subscriber_id.eq(subscriber.to_string()))
            .filter(author_id.eq(author.to_string())),
    )
    .execute(conn)?;
    log::trace!("Unsubscribe {} -> {} ({})", subscriber, author, deleted);
    Ok(deleted > 0)
}
