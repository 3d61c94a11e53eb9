// Job postings: public listing of active jobs, owner-only mutation.

pub mod handlers;
pub mod queries;
