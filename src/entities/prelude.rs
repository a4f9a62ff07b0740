pub use super::films::Entity as Films;
pub use super::films_audit::Entity as FilmsAudit;
pub use super::serieses::Entity as Serieses;
pub use super::serieses_audit::Entity as SeriesesAudit;
pub use super::users::Entity as Users;
