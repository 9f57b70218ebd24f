//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Enumerations
//! (`membership_tier`, `target_muscle_*`) are stored as their PascalCase
//! names in `text` columns.

diesel::table! {
    /// Registered users. `username` and `lower(email)` are unique.
    users (id) {
        id -> Int4,
        username -> Text,
        email -> Text,
        /// PHC-encoded Argon2id hash.
        password_hash -> Text,
        membership_tier -> Text,
    }
}

diesel::table! {
    /// Exercise catalogue. Up to three target muscles, filled from slot 1.
    exercises (id) {
        id -> Int4,
        name -> Text,
        image_url -> Nullable<Text>,
        target_muscle_1 -> Nullable<Text>,
        target_muscle_2 -> Nullable<Text>,
        target_muscle_3 -> Nullable<Text>,
    }
}

diesel::table! {
    workout_plans (id) {
        id -> Int4,
        user_id -> Int4,
        name -> Text,
        membership_tier -> Text,
    }
}

diesel::table! {
    workout_sessions (id) {
        id -> Int4,
        session_date -> Date,
        plan_id -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Logged sets. Weight in kilograms, rest time in seconds.
    exercise_sets (id) {
        id -> Int4,
        session_id -> Int4,
        exercise_id -> Int4,
        weight -> Int4,
        reps -> Int4,
        rest_time -> Int4,
    }
}

diesel::table! {
    /// Body measurements. Weight in kilograms, height in centimetres.
    body_tracks (id) {
        id -> Int4,
        user_id -> Int4,
        track_date -> Date,
        weight -> Float8,
        height -> Float8,
    }
}

diesel::joinable!(workout_plans -> users (user_id));
diesel::joinable!(body_tracks -> users (user_id));
diesel::joinable!(workout_sessions -> workout_plans (plan_id));
diesel::joinable!(exercise_sets -> workout_sessions (session_id));
diesel::joinable!(exercise_sets -> exercises (exercise_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    exercises,
    workout_plans,
    workout_sessions,
    exercise_sets,
    body_tracks,
);
