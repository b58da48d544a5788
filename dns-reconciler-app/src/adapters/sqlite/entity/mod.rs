//! `SeaORM` entities backing `SqliteStore`.

pub mod dns_record;
pub mod domain;
