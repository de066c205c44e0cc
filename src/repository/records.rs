//! Diesel ORM records for database tables.
//!
//! These records provide compile-time type checking for database operations;
//! conversion into the domain models happens in the repositories.

use diesel::prelude::*;

use crate::schema;

/// Discovered job row.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::discovered_jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DiscoveredJobRecord {
    pub id: i32,
    pub owner_id: i32,
    pub job_id: i64,
    pub url: String,
    pub location: String,
    pub keyword: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub analyzed: bool,
    pub date_discovered: String,
}

/// New discovered job stub for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::discovered_jobs)]
pub struct NewDiscoveredJob<'a> {
    pub owner_id: i32,
    pub job_id: i64,
    pub url: &'a str,
    pub location: &'a str,
    pub keyword: &'a str,
    pub date_discovered: &'a str,
}

/// Approved job row.
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone)]
#[diesel(table_name = schema::approved_jobs)]
#[diesel(belongs_to(DiscoveredJobRecord, foreign_key = discovered_job_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ApprovedJobRecord {
    pub id: i32,
    pub owner_id: i32,
    pub discovered_job_id: i32,
    pub reason: String,
    pub date_approved: String,
    pub date_applied: Option<String>,
    pub is_archived: bool,
}

/// New approval for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::approved_jobs)]
pub struct NewApprovedJob<'a> {
    pub owner_id: i32,
    pub discovered_job_id: i32,
    pub reason: &'a str,
    pub date_approved: &'a str,
}
