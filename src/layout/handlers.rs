use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use utoipa::ToSchema;

use super::form::{AttestationForm, Party};
use super::paginate::paginate_form;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LayoutRequest {
    /// Letter body, AI-drafted or typed by hand.
    #[serde(default)]
    #[schema(example = "查台端向本人承租房屋。\n惟台端迄今積欠租金。")]
    pub content: String,
    #[serde(default)]
    pub sender: Party,
    #[serde(default)]
    pub receiver: Party,
}

#[utoipa::path(
    post,
    path = "/api/layout",
    tag = "Layout",
    request_body = LayoutRequest,
    responses(
        (
            status = 200,
            description = "Letter laid out on the attestation form grid",
            body = AttestationForm
        ),
        (status = 400, description = "Malformed JSON body", body = crate::ErrorResponse)
    )
)]
pub async fn layout_letter(body: web::Json<LayoutRequest>) -> impl Responder {
    let LayoutRequest {
        content,
        sender,
        receiver,
    } = body.into_inner();

    let document = paginate_form(&content);
    log::info!(
        "Laid out {} characters onto {} page(s)",
        content.chars().count(),
        document.page_count()
    );

    HttpResponse::Ok().json(AttestationForm::build(&document, sender, receiver))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/layout").route(web::post().to(layout_letter)));
}
