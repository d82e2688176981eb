//! 测验、题目、作答与评分存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, db_error};
use crate::entity::question_options::{
    ActiveModel as OptionActiveModel, Column as OptionColumn, Entity as QuestionOptions,
};
use crate::entity::questions::{
    ActiveModel as QuestionActiveModel, Column as QuestionColumn, Entity as Questions,
};
use crate::entity::quiz_answers::{
    ActiveModel as AnswerActiveModel, Column as AnswerColumn, Entity as QuizAnswers,
};
use crate::entity::quiz_attempts::{
    ActiveModel as AttemptActiveModel, Column as AttemptColumn, Entity as QuizAttempts,
};
use crate::entity::quiz_file_submissions::{
    ActiveModel as FileSubmissionActiveModel, Column as FileSubmissionColumn,
    Entity as QuizFileSubmissions,
};
use crate::entity::quiz_grades::{
    ActiveModel as GradeActiveModel, Column as GradeColumn, Entity as QuizGrades,
};
use crate::entity::quizzes::{ActiveModel, Column, Entity as Quizzes};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginationInfo,
    quizzes::{
        entities::{
            Question, QuestionOption, Quiz, QuizAnswer, QuizAttempt, QuizFileSubmission, QuizGrade,
        },
        requests::{
            GradedAnswer, NewQuestion, NewQuiz, NewQuizFileSubmission, NewQuizGrade, QuizChanges,
            QuizGradeTarget, QuizListQuery,
        },
        responses::QuizListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn create_quiz_impl(&self, quiz: NewQuiz) -> Result<Quiz> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            offering_id: Set(quiz.offering_id),
            created_by: Set(quiz.created_by),
            title: Set(quiz.title),
            description: Set(quiz.description),
            instructions_file_id: Set(quiz.instructions_file_id),
            quiz_type: Set(quiz.quiz_type.to_string()),
            start_time: Set(quiz.start_time.map(|t| t.timestamp())),
            deadline: Set(quiz.deadline.timestamp()),
            time_limit_minutes: Set(quiz.time_limit_minutes),
            max_attempts: Set(quiz.max_attempts),
            is_published: Set(false),
            show_results_after: Set(quiz.show_results_after),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to create quiz"))?;

        Ok(result.into_quiz())
    }

    pub async fn get_quiz_by_id_impl(&self, id: i64) -> Result<Option<Quiz>> {
        let result = Quizzes::find_by_id(id)
            .filter(Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query quiz"))?;

        Ok(result.map(|m| m.into_quiz()))
    }

    pub async fn list_quizzes_with_pagination_impl(
        &self,
        query: QuizListQuery,
    ) -> Result<QuizListResponse> {
        let mut select = Quizzes::find().filter(Column::IsActive.eq(true));

        if let Some(offering_id) = query.offering_id {
            select = select.filter(Column::OfferingId.eq(offering_id));
        }
        if query.published_only {
            select = select.filter(Column::IsPublished.eq(true));
        }

        let paginator = select
            .order_by_asc(Column::Deadline)
            .order_by_asc(Column::Id)
            .paginate(&self.db, query.size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_error("Failed to count quizzes"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_error("Failed to count quiz pages"))?;
        let quizzes = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_error("Failed to list quizzes"))?;

        Ok(QuizListResponse {
            items: quizzes.into_iter().map(|m| m.into_quiz()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    pub async fn update_quiz_impl(&self, id: i64, changes: QuizChanges) -> Result<Option<Quiz>> {
        if self.get_quiz_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = changes.title {
            model.title = Set(title);
        }
        if let Some(description) = changes.description {
            model.description = Set(Some(description));
        }
        if let Some(file_id) = changes.instructions_file_id {
            model.instructions_file_id = Set(Some(file_id));
        }
        if let Some(quiz_type) = changes.quiz_type {
            model.quiz_type = Set(quiz_type.to_string());
        }
        if let Some(start_time) = changes.start_time {
            model.start_time = Set(Some(start_time.timestamp()));
        }
        if let Some(deadline) = changes.deadline {
            model.deadline = Set(deadline.timestamp());
        }
        if let Some(limit) = changes.time_limit_minutes {
            model.time_limit_minutes = Set(Some(limit));
        }
        if let Some(max_attempts) = changes.max_attempts {
            model.max_attempts = Set(max_attempts);
        }
        if let Some(show) = changes.show_results_after {
            model.show_results_after = Set(show);
        }
        if let Some(published) = changes.is_published {
            model.is_published = Set(published);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update quiz"))?;

        Ok(Some(updated.into_quiz()))
    }

    pub async fn deactivate_quiz_impl(&self, id: i64) -> Result<bool> {
        let result = Quizzes::update_many()
            .col_expr(Column::IsActive, sea_orm::sea_query::Expr::value(false))
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .filter(Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .map_err(db_error("Failed to delete quiz"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn add_question_impl(
        &self,
        question: NewQuestion,
    ) -> Result<(Question, Vec<QuestionOption>)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let existing = Questions::find()
            .filter(QuestionColumn::QuizId.eq(question.quiz_id))
            .count(&txn)
            .await
            .map_err(db_error("Failed to count questions"))?;

        let inserted = QuestionActiveModel {
            quiz_id: Set(question.quiz_id),
            question_text: Set(question.question_text),
            question_type: Set(question.question_type.to_string()),
            marks: Set(question.marks),
            order_number: Set(existing as i32 + 1),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_error("Failed to create question"))?;

        let mut options = Vec::with_capacity(question.options.len());
        for option in question.options {
            let saved = OptionActiveModel {
                question_id: Set(inserted.id),
                label: Set(option.label),
                option_text: Set(option.option_text),
                is_correct: Set(option.is_correct),
                order_number: Set(option.order_number),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(db_error("Failed to create question option"))?;
            options.push(saved.into_option());
        }

        txn.commit()
            .await
            .map_err(db_error("Failed to commit question"))?;

        Ok((inserted.into_question(), options))
    }

    pub async fn list_questions_impl(
        &self,
        quiz_id: i64,
    ) -> Result<Vec<(Question, Vec<QuestionOption>)>> {
        let questions = Questions::find()
            .filter(QuestionColumn::QuizId.eq(quiz_id))
            .order_by_asc(QuestionColumn::OrderNumber)
            .all(&self.db)
            .await
            .map_err(db_error("Failed to list questions"))?;

        if questions.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let options = QuestionOptions::find()
            .filter(OptionColumn::QuestionId.is_in(ids))
            .order_by_asc(OptionColumn::OrderNumber)
            .all(&self.db)
            .await
            .map_err(db_error("Failed to list question options"))?;

        let mut grouped: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
        for option in options {
            grouped
                .entry(option.question_id)
                .or_default()
                .push(option.into_option());
        }

        Ok(questions
            .into_iter()
            .map(|q| {
                let opts = grouped.remove(&q.id).unwrap_or_default();
                (q.into_question(), opts)
            })
            .collect())
    }

    pub async fn quiz_question_summary_impl(&self, quiz_id: i64) -> Result<(i64, f64)> {
        let marks: Vec<f64> = Questions::find()
            .select_only()
            .column(QuestionColumn::Marks)
            .filter(QuestionColumn::QuizId.eq(quiz_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_error("Failed to summarize questions"))?;

        Ok((marks.len() as i64, marks.iter().sum()))
    }

    pub async fn create_attempt_impl(&self, quiz_id: i64, student_id: i64) -> Result<QuizAttempt> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let numbers: Vec<i32> = QuizAttempts::find()
            .select_only()
            .column(AttemptColumn::AttemptNumber)
            .filter(AttemptColumn::QuizId.eq(quiz_id))
            .filter(AttemptColumn::StudentId.eq(student_id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_error("Failed to query attempts"))?;
        let next = numbers.into_iter().max().unwrap_or(0) + 1;

        // (quiz_id, student_id, attempt_number) 唯一，并发开始会触发 Conflict
        let inserted = AttemptActiveModel {
            quiz_id: Set(quiz_id),
            student_id: Set(student_id),
            attempt_number: Set(next),
            started_at: Set(chrono::Utc::now().timestamp()),
            submitted_at: Set(None),
            score: Set(None),
            is_completed: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_error("Failed to create attempt"))?;

        txn.commit()
            .await
            .map_err(db_error("Failed to commit attempt"))?;

        Ok(inserted.into_attempt())
    }

    pub async fn get_attempt_by_id_impl(&self, id: i64) -> Result<Option<QuizAttempt>> {
        let result = QuizAttempts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query attempt"))?;

        Ok(result.map(|m| m.into_attempt()))
    }

    pub async fn list_student_attempts_impl(
        &self,
        student_id: i64,
        quiz_id: Option<i64>,
    ) -> Result<Vec<QuizAttempt>> {
        let mut select = QuizAttempts::find().filter(AttemptColumn::StudentId.eq(student_id));
        if let Some(quiz_id) = quiz_id {
            select = select.filter(AttemptColumn::QuizId.eq(quiz_id));
        }

        let attempts = select
            .order_by_desc(AttemptColumn::StartedAt)
            .order_by_desc(AttemptColumn::Id)
            .all(&self.db)
            .await
            .map_err(db_error("Failed to list attempts"))?;

        Ok(attempts.into_iter().map(|m| m.into_attempt()).collect())
    }

    pub async fn submit_attempt_impl(
        &self,
        attempt_id: i64,
        answers: Vec<GradedAnswer>,
        score: f64,
    ) -> Result<QuizAttempt> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let now = chrono::Utc::now().timestamp();

        // 条件更新保证同一作答只能完成一次
        let result = QuizAttempts::update_many()
            .col_expr(
                AttemptColumn::IsCompleted,
                sea_orm::sea_query::Expr::value(true),
            )
            .col_expr(
                AttemptColumn::SubmittedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .col_expr(AttemptColumn::Score, sea_orm::sea_query::Expr::value(score))
            .filter(AttemptColumn::Id.eq(attempt_id))
            .filter(AttemptColumn::IsCompleted.eq(false))
            .exec(&txn)
            .await
            .map_err(db_error("Failed to complete attempt"))?;

        if result.rows_affected == 0 {
            return Err(LmsError::conflict(format!(
                "Attempt {attempt_id} has already been submitted"
            )));
        }

        if !answers.is_empty() {
            let models = answers.into_iter().map(|answer| AnswerActiveModel {
                attempt_id: Set(attempt_id),
                question_id: Set(answer.question_id),
                selected_option_id: Set(answer.selected_option_id),
                answer_text: Set(answer.answer_text),
                awarded_marks: Set(answer.awarded_marks),
                is_correct: Set(answer.is_correct),
                answered_at: Set(now),
                ..Default::default()
            });
            QuizAnswers::insert_many(models)
                .exec(&txn)
                .await
                .map_err(db_error("Failed to save answers"))?;
        }

        let attempt = QuizAttempts::find_by_id(attempt_id)
            .one(&txn)
            .await
            .map_err(db_error("Failed to query attempt"))?
            .ok_or_else(|| LmsError::not_found(format!("Attempt {attempt_id} not found")))?;

        txn.commit()
            .await
            .map_err(db_error("Failed to commit attempt"))?;

        Ok(attempt.into_attempt())
    }

    pub async fn list_attempt_answers_impl(&self, attempt_id: i64) -> Result<Vec<QuizAnswer>> {
        let answers = QuizAnswers::find()
            .filter(AnswerColumn::AttemptId.eq(attempt_id))
            .order_by_asc(AnswerColumn::Id)
            .all(&self.db)
            .await
            .map_err(db_error("Failed to list answers"))?;

        Ok(answers.into_iter().map(|m| m.into_answer()).collect())
    }

    pub async fn create_quiz_file_submission_impl(
        &self,
        submission: NewQuizFileSubmission,
    ) -> Result<QuizFileSubmission> {
        let model = FileSubmissionActiveModel {
            quiz_id: Set(submission.quiz_id),
            student_id: Set(submission.student_id),
            file_id: Set(submission.file_id),
            submitted_at: Set(chrono::Utc::now().timestamp()),
            is_late: Set(submission.is_late),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to create quiz file submission"))?;

        Ok(result.into_file_submission())
    }

    pub async fn get_quiz_file_submission_by_id_impl(
        &self,
        id: i64,
    ) -> Result<Option<QuizFileSubmission>> {
        let result = QuizFileSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query quiz file submission"))?;

        Ok(result.map(|m| m.into_file_submission()))
    }

    pub async fn get_student_quiz_file_submission_impl(
        &self,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Option<QuizFileSubmission>> {
        let result = QuizFileSubmissions::find()
            .filter(FileSubmissionColumn::QuizId.eq(quiz_id))
            .filter(FileSubmissionColumn::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query quiz file submission"))?;

        Ok(result.map(|m| m.into_file_submission()))
    }

    pub async fn create_quiz_grade_impl(&self, grade: NewQuizGrade) -> Result<QuizGrade> {
        let (attempt_id, file_submission_id) = match grade.target {
            QuizGradeTarget::Attempt(id) => (Some(id), None),
            QuizGradeTarget::FileSubmission(id) => (None, Some(id)),
        };

        let model = GradeActiveModel {
            quiz_id: Set(grade.quiz_id),
            attempt_id: Set(attempt_id),
            file_submission_id: Set(file_submission_id),
            graded_by: Set(grade.graded_by),
            final_score: Set(grade.final_score),
            feedback_text: Set(grade.feedback_text),
            feedback_file_id: Set(grade.feedback_file_id),
            graded_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to save quiz grade"))?;

        Ok(result.into_quiz_grade())
    }

    pub async fn get_quiz_grade_for_target_impl(
        &self,
        target: QuizGradeTarget,
    ) -> Result<Option<QuizGrade>> {
        let select = match target {
            QuizGradeTarget::Attempt(id) => {
                QuizGrades::find().filter(GradeColumn::AttemptId.eq(id))
            }
            QuizGradeTarget::FileSubmission(id) => {
                QuizGrades::find().filter(GradeColumn::FileSubmissionId.eq(id))
            }
        };

        let result = select
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query quiz grade"))?;

        Ok(result.map(|m| m.into_quiz_grade()))
    }

    /// 学生在该测验下最近一次人工评分（作答或文件提交）
    pub async fn get_student_quiz_grade_impl(
        &self,
        quiz_id: i64,
        student_id: i64,
    ) -> Result<Option<QuizGrade>> {
        let attempt_ids: Vec<i64> = QuizAttempts::find()
            .select_only()
            .column(AttemptColumn::Id)
            .filter(AttemptColumn::QuizId.eq(quiz_id))
            .filter(AttemptColumn::StudentId.eq(student_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_error("Failed to query attempts"))?;

        let submission_ids: Vec<i64> = QuizFileSubmissions::find()
            .select_only()
            .column(FileSubmissionColumn::Id)
            .filter(FileSubmissionColumn::QuizId.eq(quiz_id))
            .filter(FileSubmissionColumn::StudentId.eq(student_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_error("Failed to query quiz file submissions"))?;

        if attempt_ids.is_empty() && submission_ids.is_empty() {
            return Ok(None);
        }

        let result = QuizGrades::find()
            .filter(GradeColumn::QuizId.eq(quiz_id))
            .filter(
                Condition::any()
                    .add(GradeColumn::AttemptId.is_in(attempt_ids))
                    .add(GradeColumn::FileSubmissionId.is_in(submission_ids)),
            )
            .order_by_desc(GradeColumn::GradedAt)
            .order_by_desc(GradeColumn::Id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query quiz grade"))?;

        Ok(result.map(|m| m.into_quiz_grade()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quizzes::entities::QuizType;

    async fn storage_with_quiz() -> (SeaOrmStorage, i64, i64) {
        let storage = SeaOrmStorage::in_memory().await.expect("in-memory db");
        let (professor, student, offering) = storage.seed_offering().await.expect("seed");
        let quiz = storage
            .create_quiz_impl(NewQuiz {
                offering_id: offering.id,
                created_by: professor.id,
                title: "Week 3 quiz".into(),
                description: None,
                instructions_file_id: None,
                quiz_type: QuizType::Digital,
                start_time: None,
                deadline: chrono::Utc::now() + chrono::Duration::days(1),
                time_limit_minutes: Some(30),
                max_attempts: 3,
                show_results_after: true,
            })
            .await
            .expect("quiz");
        (storage, quiz.id, student.id)
    }

    #[tokio::test]
    async fn test_attempts_numbered_per_student() {
        let (storage, quiz_id, student_id) = storage_with_quiz().await;

        let mut numbers = Vec::new();
        for _ in 0..3 {
            let attempt = storage
                .create_attempt_impl(quiz_id, student_id)
                .await
                .expect("attempt");
            assert!(!attempt.is_completed);
            numbers.push(attempt.attempt_number);
        }
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_second_submit_is_conflict() {
        let (storage, quiz_id, student_id) = storage_with_quiz().await;
        let attempt = storage
            .create_attempt_impl(quiz_id, student_id)
            .await
            .expect("attempt");

        let done = storage
            .submit_attempt_impl(attempt.id, Vec::new(), 0.0)
            .await
            .expect("first submit");
        assert!(done.is_completed);
        assert_eq!(done.score, Some(0.0));

        let again = storage.submit_attempt_impl(attempt.id, Vec::new(), 5.0).await;
        assert!(matches!(again, Err(LmsError::Conflict(_))));

        // 失败的第二次提交不会改动已有成绩
        let stored = storage
            .get_attempt_by_id_impl(attempt.id)
            .await
            .expect("lookup")
            .expect("attempt exists");
        assert_eq!(stored.score, Some(0.0));
    }
}
