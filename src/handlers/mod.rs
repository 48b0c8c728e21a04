pub mod builder;
pub mod dashboard;
pub mod editor;
pub mod exercises;
pub mod health;
pub mod routines;
pub mod storage;
pub mod students;

use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use crate::error::Result;

/// Hidden form field carried through a confirmation page.
pub struct HiddenField {
    pub name: &'static str,
    pub value: String,
}

/// Interactive confirmation shown before every destructive POST.
#[derive(Template)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub title: &'static str,
    pub message: String,
    pub action: String,
    pub cancel_url: String,
    pub hidden: Vec<HiddenField>,
}

impl ConfirmTemplate {
    pub fn into_page(self) -> Result<Response> {
        Ok(Html(self.render()?).into_response())
    }
}
