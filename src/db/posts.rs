use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use crate::models::{Post, PostNew, PostUpdate};

pub fn all(conn: &SqliteConnection) -> Result<Vec<Post>, diesel::result::Error> {
    use crate::schema::posts::dsl::{id, posts};
    posts.order(id.asc()).load::<Post>(conn)
}

pub fn find(conn: &SqliteConnection, post_id: &Uuid) -> Result<Option<Post>, diesel::result::Error> {
    use crate::schema::posts::dsl::{id, posts};
    posts
        .filter(id.eq(post_id.to_string()))
        .first::<Post>(conn)
        .optional()
}

pub fn find_by_author(
    conn: &SqliteConnection,
    user_id: &str,
) -> Result<Vec<Post>, diesel::result::Error> {
    use crate::schema::posts::dsl::{author_id, id, posts};
    posts
        .filter(author_id.eq(user_id))
        .order(id.asc())
        .load::<Post>(conn)
}

pub fn create(
    conn: &SqliteConnection,
    title: &str,
    content: &str,
    author: &Uuid,
) -> Result<Post, diesel::result::Error> {
    use crate::schema::posts::dsl::posts;
    let new_id = Uuid::new_v4().to_string();
    let author_id = author.to_string();
    log::trace!("Post new {} by {}", &new_id, &author_id);
    diesel::insert_into(posts)
        .values(PostNew {
            id: &new_id,
            title,
            content,
            author_id: &author_id,
        })
        .execute(conn)?;
    Ok(Post {
        id: new_id,
        title: String::from(title),
        content: String::from(content),
        author_id,
    })
}

pub fn update(
    conn: &SqliteConnection,
    post_id: &Uuid,
    changes: &PostUpdate,
) -> Result<Option<Post>, diesel::result::Error> {
    use crate::schema::posts::dsl::{id, posts};
    let key = post_id.to_string();
    if changes.title.is_some() || changes.content.is_some() {
        let updated = diesel::update(posts.filter(id.eq(&key)))
            .set(changes)
            .execute(conn)?;
        if updated == 0 {
            return Ok(None);
        }
    }
    posts.filter(id.eq(&key)).first::<Post>(conn).optional()
}

pub fn delete(conn: &SqliteConnection, post_id: &Uuid) -> Result<bool, diesel::result::Error> {
    use crate::schema::posts::dsl::{id, posts};
    let deleted = diesel::delete(posts.filter(id.eq(post_id.to_string()))).execute(conn)?;
    Ok(deleted > 0)
}
