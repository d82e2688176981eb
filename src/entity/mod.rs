//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod assignment_grades;
pub mod assignment_submissions;
pub mod assignments;
pub mod course_offerings;
pub mod courses;
pub mod enrollments;
pub mod files;
pub mod question_options;
pub mod questions;
pub mod quiz_answers;
pub mod quiz_attempts;
pub mod quiz_file_submissions;
pub mod quiz_grades;
pub mod quizzes;
pub mod users;
