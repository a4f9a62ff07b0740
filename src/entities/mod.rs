pub mod prelude;

pub mod films;
pub mod films_audit;
pub mod serieses;
pub mod serieses_audit;
pub mod users;
