// Application workflow: applications, their status machine, interviews and
// the appointment kept in step with the latest interview.

pub mod applications;
pub mod appointments;
pub mod interviews;
pub mod status;

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::auth::permissions::ListScope;
use crate::filters::is_truthy;

/// `?mine=` / `?my=` switch shared by the workflow listings.
#[derive(Debug, Default, Deserialize)]
pub struct MineQuery {
    pub mine: Option<String>,
    pub my: Option<String>,
}

impl MineQuery {
    pub fn requested(&self) -> bool {
        is_truthy(self.mine.as_deref()) || is_truthy(self.my.as_deref())
    }
}

/// Restricts a query that joins `applications a` and `jobs j` to `scope`.
/// The query must already contain a `WHERE` clause.
pub(crate) fn push_scope(qb: &mut QueryBuilder<'static, Postgres>, scope: ListScope) {
    match scope {
        ListScope::All => {}
        ListScope::Employer(id) => {
            qb.push(" AND j.employer_id = ").push_bind(id);
        }
        ListScope::Seeker(id) => {
            qb.push(" AND a.seeker_id = ").push_bind(id);
        }
        ListScope::Nothing => {
            qb.push(" AND FALSE");
        }
    }
}
