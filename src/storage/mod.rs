use std::sync::Arc;

use crate::models::{
    assignments::{
        entities::{Assignment, AssignmentGrade, AssignmentSubmission},
        requests::{
            AssignmentChanges, AssignmentListQuery, NewAssignment, NewAssignmentGrade,
            NewSubmission,
        },
        responses::{AssignmentListResponse, PendingSubmission, SubmissionWithGrade},
    },
    courses::{
        entities::{Course, CourseOffering, Enrollment},
        requests::{
            CourseChanges, CourseListQuery, NewCourse, NewOffering, OfferingChanges,
            OfferingListQuery,
        },
        responses::{CourseListResponse, EnrolledStudent, MyEnrollment, OfferingListResponse},
    },
    files::{
        entities::UploadedFile,
        requests::{FileListQuery, NewFile},
        responses::{FileListResponse, FileStatsResponse},
    },
    quizzes::{
        entities::{
            Question, QuestionOption, Quiz, QuizAnswer, QuizAttempt, QuizFileSubmission,
            QuizGrade,
        },
        requests::{
            GradedAnswer, NewQuestion, NewQuiz, NewQuizFileSubmission, NewQuizGrade,
            QuizChanges, QuizGradeTarget, QuizListQuery,
        },
        responses::QuizListResponse,
    },
    users::{
        entities::User,
        requests::{NewUser, UserChanges, UserListQuery},
        responses::{UserListResponse, UserStatsResponse},
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 邮箱需为小写
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>>;
    // 软删除：状态改为 inactive
    async fn deactivate_user(&self, id: i64) -> Result<bool>;
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    async fn count_users(&self) -> Result<u64>;
    async fn user_stats(&self) -> Result<UserStatsResponse>;
    async fn student_code_exists(&self, code: &str) -> Result<bool>;

    /// 文件
    async fn create_file(&self, file: NewFile) -> Result<UploadedFile>;
    // 只返回有效（未删除）的文件
    async fn get_file_by_id(&self, id: i64) -> Result<Option<UploadedFile>>;
    async fn list_user_files(&self, query: FileListQuery) -> Result<FileListResponse>;
    async fn deactivate_file(&self, id: i64) -> Result<bool>;
    // 停用已过期文件，返回受影响数量
    async fn deactivate_expired_files(&self, now: i64) -> Result<u64>;
    async fn file_stats(&self) -> Result<FileStatsResponse>;

    /// 课程目录
    async fn create_course(&self, course: NewCourse) -> Result<Course>;
    async fn get_course(&self, code: &str) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    async fn update_course(&self, code: &str, changes: CourseChanges) -> Result<Option<Course>>;
    async fn delete_course(&self, code: &str) -> Result<bool>;
    async fn count_offerings_for_course(&self, code: &str) -> Result<u64>;

    /// 开课
    async fn create_offering(&self, offering: NewOffering) -> Result<CourseOffering>;
    async fn get_offering_by_id(&self, id: i64) -> Result<Option<CourseOffering>>;
    async fn list_offerings_with_pagination(
        &self,
        query: OfferingListQuery,
    ) -> Result<OfferingListResponse>;
    async fn update_offering(
        &self,
        id: i64,
        changes: OfferingChanges,
    ) -> Result<Option<CourseOffering>>;
    async fn delete_offering(&self, id: i64) -> Result<bool>;
    async fn count_enrollments_for_offering(&self, offering_id: i64) -> Result<u64>;

    /// 选课
    async fn create_enrollment(&self, student_id: i64, offering_id: i64) -> Result<Enrollment>;
    async fn get_enrollment(&self, student_id: i64, offering_id: i64)
    -> Result<Option<Enrollment>>;
    async fn delete_enrollment(&self, enrollment_id: i64) -> Result<bool>;
    async fn set_final_grade(
        &self,
        enrollment_id: i64,
        final_grade: f64,
    ) -> Result<Option<Enrollment>>;
    async fn list_offering_students(&self, offering_id: i64) -> Result<Vec<EnrolledStudent>>;
    async fn list_student_enrollments(&self, student_id: i64) -> Result<Vec<MyEnrollment>>;

    /// 作业
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse>;
    async fn update_assignment(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>>;
    async fn deactivate_assignment(&self, id: i64) -> Result<bool>;

    /// 作业提交与评分
    async fn create_submission(&self, submission: NewSubmission) -> Result<AssignmentSubmission>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<AssignmentSubmission>>;
    async fn get_student_submission(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<AssignmentSubmission>>;
    async fn list_submissions_for_assignment(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithGrade>>;
    // creator 为 None 时返回全部待批改提交
    async fn list_pending_submissions(
        &self,
        creator: Option<i64>,
    ) -> Result<Vec<PendingSubmission>>;
    // 写入成绩并把提交状态改为 graded
    async fn grade_submission(&self, grade: NewAssignmentGrade) -> Result<AssignmentGrade>;
    async fn get_grade_for_submission(&self, submission_id: i64)
    -> Result<Option<AssignmentGrade>>;

    /// 测验
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz>;
    async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>>;
    async fn list_quizzes_with_pagination(&self, query: QuizListQuery)
    -> Result<QuizListResponse>;
    async fn update_quiz(&self, id: i64, changes: QuizChanges) -> Result<Option<Quiz>>;
    async fn deactivate_quiz(&self, id: i64) -> Result<bool>;

    /// 题目
    // 题号自动取当前题目数 + 1
    async fn add_question(&self, question: NewQuestion)
    -> Result<(Question, Vec<QuestionOption>)>;
    async fn list_questions(&self, quiz_id: i64) -> Result<Vec<(Question, Vec<QuestionOption>)>>;
    // (题目数, 总分)
    async fn quiz_question_summary(&self, quiz_id: i64) -> Result<(i64, f64)>;

    /// 作答
    // 作答序号取该学生已有最大序号 + 1
    async fn create_attempt(&self, quiz_id: i64, student_id: i64) -> Result<QuizAttempt>;
    async fn get_attempt_by_id(&self, id: i64) -> Result<Option<QuizAttempt>>;
    async fn list_student_attempts(
        &self,
        student_id: i64,
        quiz_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>>;
    // 同一事务内写入答案并完成作答；作答已完成时返回 Conflict
    async fn submit_attempt(
        &self,
        attempt_id: i64,
        answers: Vec<GradedAnswer>,
        score: f64,
    ) -> Result<QuizAttempt>;
    async fn list_attempt_answers(&self, attempt_id: i64) -> Result<Vec<QuizAnswer>>;

    /// 文件型测验提交与评分
    async fn create_quiz_file_submission(
        &self,
        submission: NewQuizFileSubmission,
    ) -> Result<QuizFileSubmission>;
    async fn get_quiz_file_submission_by_id(&self, id: i64)
    -> Result<Option<QuizFileSubmission>>;
    async fn get_student_quiz_file_submission(
        &self,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Option<QuizFileSubmission>>;
    async fn create_quiz_grade(&self, grade: NewQuizGrade) -> Result<QuizGrade>;
    async fn get_quiz_grade_for_target(&self, target: QuizGradeTarget)
    -> Result<Option<QuizGrade>>;
    async fn get_student_quiz_grade(&self, quiz_id: i64, student_id: i64)
    -> Result<Option<QuizGrade>>;

    /// 数据库连通性检查
    async fn ping(&self) -> Result<()>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
