table! {
    member_types (id) {
        id -> Text,
        discount -> Double,
        posts_limit_per_month -> Integer,
    }
}

table! {
    posts (id) {
        id -> Text,
        title -> Text,
        content -> Text,
        author_id -> Text,
    }
}

table! {
    profiles (id) {
        id -> Text,
        is_male -> Bool,
        year_of_birth -> Integer,
        user_id -> Text,
        member_type_id -> Text,
    }
}

table! {
    subscribers_on_authors (subscriber_id, author_id) {
        subscriber_id -> Text,
        author_id -> Text,
    }
}

table! {
    users (id) {
        id -> Text,
        name -> Text,
        balance -> Double,
    }
}

joinable!(posts -> users (author_id));
joinable!(profiles -> member_types (member_type_id));
joinable!(profiles -> users (user_id));

allow_tables_to_appear_in_same_query!(
    member_types,
    posts,
    profiles,
    subscribers_on_authors,
    users,
);
