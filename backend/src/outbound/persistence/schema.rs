//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the state reached after every entry of the migration
//! catalogue has been applied. Column names follow the database, not the
//! domain: `users.user_id` is the login id and `mbr_id` the numeric key.

diesel::table! {
    /// Append-only log of applied migrations.
    migrations_history (name) {
        name -> Varchar,
        timestamp -> Int8,
    }
}

diesel::table! {
    /// Registered members.
    users (mbr_id) {
        mbr_id -> Int4,
        /// Login id, unique.
        user_id -> Varchar,
        /// Argon2 PHC string.
        password -> Varchar,
        name -> Varchar,
        email -> Varchar,
        phone -> Varchar,
        /// `USER`, `ADMIN` or `RELATIONSHIP_MANAGER`.
        role -> Varchar,
        image -> Nullable<Varchar>,
        reputation -> Int4,
        point -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    questions (id) {
        id -> Int4,
        title -> Varchar,
        description -> Text,
        votes -> Int4,
        /// Cached answer count.
        answers -> Int4,
        views -> Int4,
        tags -> Array<Text>,
        mbr_id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    answers (id) {
        id -> Int4,
        content -> Text,
        votes -> Int4,
        accepted -> Bool,
        question_id -> Int4,
        mbr_id -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    coupons (id) {
        id -> Int4,
        coupon_code -> Varchar,
        points -> Int4,
        is_used -> Bool,
        used_by_mbr_id -> Nullable<Int4>,
        used_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(questions -> users (mbr_id));
diesel::joinable!(answers -> questions (question_id));
diesel::joinable!(answers -> users (mbr_id));

diesel::allow_tables_to_appear_in_same_query!(answers, coupons, migrations_history, questions, users);
