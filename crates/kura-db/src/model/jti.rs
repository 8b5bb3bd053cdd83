use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// A DPoP proof identifier seen for a request URI.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = schema::dpop_jti)]
#[diesel(check_for_backend(Pg))]
pub struct JtiRecord {
    pub id: uuid::Uuid,
    pub jti: String,
    pub uri: String,
    pub request_time: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::dpop_jti)]
pub struct NewJtiRecord<'a> {
    pub id: uuid::Uuid,
    pub jti: &'a str,
    pub uri: &'a str,
    pub request_time: chrono::DateTime<chrono::Utc>,
}
