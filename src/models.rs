use std::fmt;
use std::str::FromStr;

use juniper::GraphQLEnum;
use uuid::Uuid;

use super::schema::{member_types, posts, profiles, subscribers_on_authors, users};

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[table_name = "users"]
pub struct User {
    pub id: String,
    pub name: String,
    pub balance: f64,
}

#[derive(Insertable)]
#[table_name = "users"]
pub struct UserNew<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub balance: f64,
}

#[derive(AsChangeset, Default)]
#[table_name = "users"]
pub struct UserUpdate<'a> {
    pub name: Option<&'a str>,
    pub balance: Option<f64>,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[table_name = "profiles"]
pub struct Profile {
    pub id: String,
    pub is_male: bool,
    pub year_of_birth: i32,
    pub user_id: String,
    pub member_type_id: String,
}

#[derive(Insertable)]
#[table_name = "profiles"]
pub struct ProfileNew<'a> {
    pub id: &'a str,
    pub is_male: bool,
    pub year_of_birth: i32,
    pub user_id: &'a str,
    pub member_type_id: &'a str,
}

#[derive(AsChangeset, Default)]
#[table_name = "profiles"]
pub struct ProfileUpdate<'a> {
    pub is_male: Option<bool>,
    pub year_of_birth: Option<i32>,
    pub member_type_id: Option<&'a str>,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[table_name = "posts"]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
}

#[derive(Insertable)]
#[table_name = "posts"]
pub struct PostNew<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub author_id: &'a str,
}

#[derive(AsChangeset, Default)]
#[table_name = "posts"]
pub struct PostUpdate<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
}

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq)]
#[table_name = "member_types"]
pub struct MemberType {
    pub id: String,
    pub discount: f64,
    pub posts_limit_per_month: i32,
}

#[derive(Insertable)]
#[table_name = "subscribers_on_authors"]
pub struct SubscriptionNew<'a> {
    pub subscriber_id: &'a str,
    pub author_id: &'a str,
}

/// Closed set of membership tiers; the text form is the `member_types` primary key.
#[derive(GraphQLEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberTypeId {
    #[graphql(name = "basic")]
    Basic,
    #[graphql(name = "business")]
    Business,
}

impl MemberTypeId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Business => "business",
        }
    }
}

impl fmt::Display for MemberTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown member type: {0}")]
pub struct UnknownMemberType(pub String);

impl FromStr for MemberTypeId {
    type Err = UnknownMemberType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "business" => Ok(Self::Business),
            other => Err(UnknownMemberType(String::from(other))),
        }
    }
}

/// Parses the UUID text a row carries as its key.
///
/// # Errors
///
/// Will return Err if the stored id is not a valid UUID
pub fn parse_key(id: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(id)
}

impl User {
    /// # Errors
    ///
    /// Will return Err if the stored id is not a valid UUID
    pub fn key(&self) -> Result<Uuid, uuid::Error> {
        parse_key(&self.id)
    }
}

impl Profile {
    /// # Errors
    ///
    /// Will return Err if the stored id is not a valid UUID
    pub fn key(&self) -> Result<Uuid, uuid::Error> {
        parse_key(&self.id)
    }
}

impl Post {
    /// # Errors
    ///
    /// Will return Err if the stored id is not a valid UUID
    pub fn key(&self) -> Result<Uuid, uuid::Error> {
        parse_key(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_type_id_text_form() {
        assert_eq!(MemberTypeId::Basic.as_str(), "basic");
        assert_eq!("business".parse::<MemberTypeId>().unwrap(), MemberTypeId::Business);
        assert!("platinum".parse::<MemberTypeId>().is_err());
    }
}
