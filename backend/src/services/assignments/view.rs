use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use common::model::assignment::{AnswerFeedback, Assignment, Question, QuestionType};

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::session;
use crate::views::{self, escape_html};

#[derive(Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    edit: Option<String>,
}

/// The assignment detail page. Before submission it renders an answer form
/// per question; after submission it shows the stored grading results.
/// `?edit=1` re-opens the form on a completed assignment for another try.
pub async fn process(
    cfg: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = db::open(&cfg)?;
    let user = match session::page_user(&req, &conn)? {
        Some(u) => u,
        None => return Ok(views::redirect("/login")),
    };

    let assignment = match db::get_assignment(&conn, path.into_inner())? {
        Some(a) => a,
        None => return Ok(views::redirect_with_flash("/assignments", "Assignment not found")),
    };
    if assignment.user_id != user.id {
        return Ok(views::redirect_with_flash("/assignments", "Unauthorized access"));
    }

    let questions = db::questions_for_assignment(&conn, assignment.id)?;
    let edit_mode = query.edit.as_deref() == Some("1");
    let show_results = assignment.completed && !edit_mode;

    let body = if show_results {
        results_html(&assignment, &questions)
    } else {
        form_html(&questions)
    };

    let flash = views::take_flash(&req);
    let html = views::render_page(
        "view_assignment.html",
        &[
            ("flash", views::flash_banner(flash)),
            ("assignment_id", assignment.id.to_string()),
            ("title", escape_html(&assignment.title)),
            ("description", escape_html(&assignment.description)),
            ("due_date", assignment.due_date.format("%Y-%m-%d").to_string()),
            ("body", body),
        ],
    )?;
    Ok(views::page(html))
}

fn form_html(questions: &[Question]) -> String {
    let items: String = questions.iter().map(question_form).collect();
    format!(
        r#"<form id="assignment-form">{}<button type="submit">Submit answers</button></form>
<div id="result"></div>"#,
        items
    )
}

/// One fieldset per question; the page script reads the `data-` attributes
/// to collect answers in the right shape.
fn question_form(q: &Question) -> String {
    let key = format!("q{}", q.id);
    let control = match q.question_type {
        QuestionType::MultipleChoice => {
            let options: String = q
                .options
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|opt| {
                    format!(
                        r#"<label><input type="radio" name="{}" value="{}"> {}</label>"#,
                        key,
                        escape_html(opt),
                        escape_html(opt)
                    )
                })
                .collect();
            format!(r#"<div class="options" data-kind="choice">{}</div>"#, options)
        }
        QuestionType::FillBlank => format!(
            r#"<input type="text" name="{}" data-kind="text" autocomplete="off">"#,
            key
        ),
        QuestionType::Ordering | QuestionType::DragDrop => {
            let items: String = q
                .options
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|opt| {
                    format!(
                        r#"<li data-value="{}">{} <button type="button" class="up">&uarr;</button><button type="button" class="down">&darr;</button></li>"#,
                        escape_html(opt),
                        escape_html(opt)
                    )
                })
                .collect();
            format!(
                r#"<ol class="sequence" data-name="{}" data-kind="sequence">{}</ol>"#,
                key, items
            )
        }
        QuestionType::ShortAnswer => format!(
            r#"<textarea name="{}" rows="3" data-kind="text"></textarea>"#,
            key
        ),
        QuestionType::LongAnswer => format!(
            r#"<textarea name="{}" rows="8" data-kind="text"></textarea>"#,
            key
        ),
    };
    format!(
        r#"<fieldset class="question" data-key="{}"><legend>{} <span class="points">({} pts)</span></legend><p>{}</p>{}</fieldset>"#,
        key,
        topic_heading(q),
        q.points,
        escape_html(&q.question_text),
        control
    )
}

fn topic_heading(q: &Question) -> String {
    if q.topic.is_empty() {
        format!("Question {}", q.ord + 1)
    } else {
        format!("{} - {}", escape_html(&q.topic), escape_html(&q.subtopic))
    }
}

/// Completed view: per-question verdicts from the stored feedback, plus the
/// explanation for each question.
fn results_html(assignment: &Assignment, questions: &[Question]) -> String {
    let feedback: Vec<AnswerFeedback> = assignment
        .ai_feedback
        .as_deref()
        .and_then(|text| serde_json::from_str(text).ok())
        .unwrap_or_default();

    let items: String = questions
        .iter()
        .map(|q| {
            let key = format!("q{}", q.id);
            let verdict = feedback.iter().find(|f| f.question_id == key);
            let (class, label, comment) = match verdict {
                Some(f) if f.is_correct => ("correct", "Correct", f.feedback.clone()),
                Some(f) => ("incorrect", "Incorrect", f.feedback.clone()),
                None => ("unanswered", "Not answered", String::new()),
            };
            let comment_html = if comment.is_empty() {
                String::new()
            } else {
                format!(r#"<p class="feedback">{}</p>"#, escape_html(&comment))
            };
            format!(
                r#"<section class="question {}"><h3>{} <span class="verdict">{}</span></h3><p>{}</p>{}<p class="explanation">{}</p></section>"#,
                class,
                topic_heading(q),
                label,
                escape_html(&q.question_text),
                comment_html,
                escape_html(&q.explanation)
            )
        })
        .collect();

    format!(
        r#"<p class="score">Score: {} / {}</p>{}<p><a href="?edit=1">Try again</a></p>"#,
        assignment.earned_points, assignment.total_points, items
    )
}
