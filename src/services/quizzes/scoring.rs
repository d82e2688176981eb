//! 在线作答自动评分

use std::collections::{HashMap, HashSet};

use crate::models::quizzes::{
    entities::{Question, QuestionOption, QuizAttempt},
    requests::{AnswerInput, GradedAnswer},
};

/// 按题目评分
///
/// 选择题与判断题按所选选项是否正确给满分或 0 分；简答题保留作答内容，
/// 分数留待人工评分。返回已评分答案与总得分。
pub fn grade_answers(
    questions: &[(Question, Vec<QuestionOption>)],
    answers: &[AnswerInput],
) -> Result<(Vec<GradedAnswer>, f64), String> {
    let by_id: HashMap<i64, &(Question, Vec<QuestionOption>)> =
        questions.iter().map(|entry| (entry.0.id, entry)).collect();

    let mut seen = HashSet::with_capacity(answers.len());
    let mut graded = Vec::with_capacity(answers.len());
    let mut score = 0.0;

    for answer in answers {
        let Some((question, options)) = by_id.get(&answer.question_id).copied() else {
            return Err(format!(
                "Question {} does not belong to this quiz",
                answer.question_id
            ));
        };
        if !seen.insert(question.id) {
            return Err(format!("Question {} answered more than once", question.id));
        }

        if !question.question_type.is_auto_graded() {
            graded.push(GradedAnswer {
                question_id: question.id,
                selected_option_id: None,
                answer_text: answer.answer_text.clone(),
                awarded_marks: None,
                is_correct: None,
            });
            continue;
        }

        let selected = match answer.selected_option_id {
            Some(option_id) => match options.iter().find(|o| o.id == option_id) {
                Some(option) => Some(option),
                None => {
                    return Err(format!(
                        "Option {option_id} does not belong to question {}",
                        question.id
                    ));
                }
            },
            None => None,
        };

        let is_correct = selected.is_some_and(|o| o.is_correct);
        let awarded = if is_correct { question.marks } else { 0.0 };
        score += awarded;

        graded.push(GradedAnswer {
            question_id: question.id,
            selected_option_id: selected.map(|o| o.id),
            answer_text: None,
            awarded_marks: Some(awarded),
            is_correct: Some(is_correct),
        });
    }

    Ok((graded, score))
}

/// 已完成作答中的最高分
pub fn best_score(attempts: &[QuizAttempt]) -> Option<f64> {
    attempts
        .iter()
        .filter(|a| a.is_completed)
        .filter_map(|a| a.score)
        .fold(None, |best, s| match best {
            Some(b) if b >= s => Some(b),
            _ => Some(s),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quizzes::entities::QuestionType;
    use chrono::Utc;

    fn question(id: i64, question_type: QuestionType, marks: f64) -> Question {
        Question {
            id,
            quiz_id: 1,
            question_text: format!("Question {id}"),
            question_type,
            marks,
            order_number: id as i32,
        }
    }

    fn opt(id: i64, question_id: i64, label: &str, is_correct: bool) -> QuestionOption {
        QuestionOption {
            id,
            question_id,
            label: label.into(),
            option_text: label.into(),
            is_correct,
            order_number: 1,
        }
    }

    fn sample() -> Vec<(Question, Vec<QuestionOption>)> {
        vec![
            (
                question(1, QuestionType::Mcq, 2.0),
                vec![opt(10, 1, "A", false), opt(11, 1, "B", true)],
            ),
            (
                question(2, QuestionType::TrueFalse, 1.0),
                vec![opt(20, 2, "True", true), opt(21, 2, "False", false)],
            ),
            (question(3, QuestionType::Paragraph, 5.0), vec![]),
        ]
    }

    fn answer(question_id: i64, option: Option<i64>, text: Option<&str>) -> AnswerInput {
        AnswerInput {
            question_id,
            selected_option_id: option,
            answer_text: text.map(String::from),
        }
    }

    #[test]
    fn test_correct_answers_earn_full_marks() {
        let answers = [
            answer(1, Some(11), None),
            answer(2, Some(20), None),
            answer(3, None, Some("Because")),
        ];
        let (graded, score) = grade_answers(&sample(), &answers).expect("valid answers");
        assert_eq!(score, 3.0);
        assert_eq!(graded.len(), 3);
        assert_eq!(graded[0].awarded_marks, Some(2.0));
        assert_eq!(graded[0].is_correct, Some(true));
        // 简答题待人工评分
        assert_eq!(graded[2].awarded_marks, None);
        assert_eq!(graded[2].is_correct, None);
        assert_eq!(graded[2].answer_text.as_deref(), Some("Because"));
    }

    #[test]
    fn test_wrong_and_missing_answers_earn_zero() {
        let answers = [answer(1, Some(10), None), answer(2, None, None)];
        let (graded, score) = grade_answers(&sample(), &answers).expect("valid answers");
        assert_eq!(score, 0.0);
        assert_eq!(graded[0].is_correct, Some(false));
        assert_eq!(graded[1].awarded_marks, Some(0.0));
        assert_eq!(graded[1].selected_option_id, None);
    }

    #[test]
    fn test_rejects_foreign_question_and_option() {
        assert!(grade_answers(&sample(), &[answer(99, Some(10), None)]).is_err());
        // 选项属于其他题目
        assert!(grade_answers(&sample(), &[answer(1, Some(20), None)]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_answers() {
        let answers = [answer(1, Some(11), None), answer(1, Some(10), None)];
        assert!(grade_answers(&sample(), &answers).is_err());
    }

    #[test]
    fn test_best_score_ignores_incomplete() {
        let now = Utc::now();
        let attempt = |n: i32, score: Option<f64>, done: bool| QuizAttempt {
            id: n as i64,
            quiz_id: 1,
            student_id: 5,
            attempt_number: n,
            started_at: now,
            submitted_at: done.then_some(now),
            score,
            is_completed: done,
        };
        assert_eq!(best_score(&[]), None);
        let attempts = [
            attempt(1, Some(3.0), true),
            attempt(2, Some(7.5), true),
            attempt(3, None, false),
        ];
        assert_eq!(best_score(&attempts), Some(7.5));
    }
}
