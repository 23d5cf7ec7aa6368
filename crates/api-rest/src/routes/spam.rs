//! Spam detection demo endpoints.
//!
//! The detector and generator live behind their own mutexes in
//! [`AppState`](super::AppState); every handler locks, works, and releases
//! before returning.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use api_shared::{EvaluateRes, MessageRes, NewInputReq, PredictReq, PredictRes, TrainRes};

use super::AppState;

const TRAINING_EMAILS: u32 = 50;
const EVALUATION_EMAILS: u32 = 30;

#[utoipa::path(
    post,
    path = "/spam/train",
    responses(
        (status = 200, description = "Model trained on a generated batch", body = TrainRes)
    )
)]
/// Train the detector on a freshly generated batch of labelled emails.
///
/// One email is generated per simulated day, so the batch straddles the
/// vocabulary shift and the model sees both word distributions.
#[axum::debug_handler]
pub(crate) async fn train(State(state): State<AppState>) -> Json<TrainRes> {
    let mut generator = state.generator.lock();
    let mut detector = state.detector.lock();

    let mut emails = Vec::with_capacity(TRAINING_EMAILS as usize);
    let mut labels = Vec::with_capacity(TRAINING_EMAILS as usize);
    for day in 1..=TRAINING_EMAILS {
        let (text, is_spam) = generator.generate(day);
        emails.push(text);
        labels.push(is_spam);
    }
    detector.initial_training(emails, labels);

    Json(TrainRes {
        message: "Training complete".into(),
        total_emails: detector.total_emails(),
    })
}

#[utoipa::path(
    post,
    path = "/spam/predict",
    request_body = PredictReq,
    responses(
        (status = 200, description = "Prediction with confidence", body = PredictRes)
    )
)]
/// Classify a piece of text as spam or not spam.
#[axum::debug_handler]
pub(crate) async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictReq>,
) -> Json<PredictRes> {
    let detector = state.detector.lock();
    let (is_spam, confidence) = detector.predict(&req.text);

    Json(PredictRes {
        prediction: if is_spam { "spam" } else { "not spam" }.into(),
        confidence,
    })
}

#[utoipa::path(
    post,
    path = "/spam/new-input",
    request_body = NewInputReq,
    responses(
        (status = 200, description = "Email recorded and model retrained", body = MessageRes)
    )
)]
/// Feed one labelled email into the model and retrain on the full history.
#[axum::debug_handler]
pub(crate) async fn new_input(
    State(state): State<AppState>,
    Json(req): Json<NewInputReq>,
) -> Json<MessageRes> {
    let mut detector = state.detector.lock();
    detector.learn(&req.text, req.label != 0);

    Json(MessageRes {
        message: "New input recorded and model retrained".into(),
    })
}

#[utoipa::path(
    get,
    path = "/spam/evaluate",
    responses(
        (status = 200, description = "Accuracy over a fresh generated batch", body = EvaluateRes),
        (status = 400, description = "Model has not been trained yet")
    )
)]
/// Evaluate the model against a freshly generated labelled batch.
#[axum::debug_handler]
pub(crate) async fn evaluate(
    State(state): State<AppState>,
) -> Result<Json<EvaluateRes>, (StatusCode, String)> {
    let mut generator = state.generator.lock();
    let detector = state.detector.lock();

    if !detector.is_trained() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Model has not been trained yet".into(),
        ));
    }

    let mut emails = Vec::with_capacity(EVALUATION_EMAILS as usize);
    let mut labels = Vec::with_capacity(EVALUATION_EMAILS as usize);
    for day in 1..=EVALUATION_EMAILS {
        let (text, is_spam) = generator.generate(day);
        emails.push(text);
        labels.push(is_spam);
    }
    let accuracy = detector.evaluate(&emails, &labels);

    Ok(Json(EvaluateRes { accuracy }))
}
