use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use crate::models::{MemberTypeId, Profile, ProfileNew, ProfileUpdate};

pub fn all(conn: &SqliteConnection) -> Result<Vec<Profile>, diesel::result::Error> {
    use crate::schema::profiles::dsl::{id, profiles};
    profiles.order(id.asc()).load::<Profile>(conn)
}

pub fn find(
    conn: &SqliteConnection,
    profile_id: &Uuid,
) -> Result<Option<Profile>, diesel::result::Error> {
    use crate::schema::profiles::dsl::{id, profiles};
    profiles
        .filter(id.eq(profile_id.to_string()))
        .first::<Profile>(conn)
        .optional()
}

pub fn find_by_user(
    conn: &SqliteConnection,
    owner_id: &str,
) -> Result<Option<Profile>, diesel::result::Error> {
    use crate::schema::profiles::dsl::{profiles, user_id};
    profiles
        .filter(user_id.eq(owner_id))
        .first::<Profile>(conn)
        .optional()
}

pub fn find_by_member_type(
    conn: &SqliteConnection,
    member_type: &str,
) -> Result<Vec<Profile>, diesel::result::Error> {
    use crate::schema::profiles::dsl::{id, member_type_id, profiles};
    profiles
        .filter(member_type_id.eq(member_type))
        .order(id.asc())
        .load::<Profile>(conn)
}

pub fn create(
    conn: &SqliteConnection,
    is_male: bool,
    year_of_birth: i32,
    owner: &Uuid,
    member_type: MemberTypeId,
) -> Result<Profile, diesel::result::Error> {
    use crate::schema::profiles::dsl::profiles;
    let new_id = Uuid::new_v4().to_string();
    let owner_id = owner.to_string();
    log::trace!("Profile new {} for {}", &new_id, &owner_id);
    diesel::insert_into(profiles)
        .values(ProfileNew {
            id: &new_id,
            is_male,
            year_of_birth,
            user_id: &owner_id,
            member_type_id: member_type.as_str(),
        })
        .execute(conn)?;
    Ok(Profile {
        id: new_id,
        is_male,
        year_of_birth,
        user_id: owner_id,
        member_type_id: String::from(member_type.as_str()),
    })
}

pub fn update(
    conn: &SqliteConnection,
    profile_id: &Uuid,
    changes: &ProfileUpdate,
) -> Result<Option<Profile>, diesel::result::Error> {
    use crate::schema::profiles::dsl::{id, profiles};
    let key = profile_id.to_string();
    if changes.is_male.is_some()
        || changes.year_of_birth.is_some()
        || changes.member_type_id.is_some()
    {
        let updated = diesel::update(profiles.filter(id.eq(&key)))
            .set(changes)
            .execute(conn)?;
        if updated == 0 {
            return Ok(None);
        }
    }
    profiles.filter(id.eq(&key)).first::<Profile>(conn).optional()
}

pub fn delete(conn: &SqliteConnection, profile_id: &Uuid) -> Result<bool, diesel::result::Error> {
    use crate::schema::profiles::dsl::{id, profiles};
    let deleted = diesel::delete(profiles.filter(id.eq(profile_id.to_string()))).execute(conn)?;
    Ok(deleted > 0)
}
