pub mod dashboard;
pub mod user;
pub mod verification_code;

pub use dashboard::Dashboard;
pub use user::{Colaborador, User};
pub use verification_code::{CodeKind, VerificationCode};
