//! Esquema Diesel del registro de la ingesta (sólo las columnas consultadas).

diesel::table! {
    raw (id) {
        id -> Integer,
        visit -> BigInt,
        raft -> Text,
    }
}

diesel::table! {
    raw_visit (visit) {
        visit -> BigInt,
        filter -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(raw, raw_visit);
