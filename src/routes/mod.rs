pub mod assignments;

pub mod auth;

pub mod courses;

pub mod files;

pub mod quizzes;

pub mod system;

pub mod users;

pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use courses::{configure_course_routes, configure_enrollment_routes, configure_offering_routes};
pub use files::configure_file_routes;
pub use quizzes::configure_quiz_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;
