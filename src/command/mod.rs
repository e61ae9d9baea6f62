mod check;
mod login;
mod logout;
mod status;

pub use check::run_check;
pub use login::run_login;
pub use logout::run_logout;
pub use status::run_status;
