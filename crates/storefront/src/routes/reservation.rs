//! Table reservation form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::view::Layout;
use crate::filters;
use crate::services::reservation::{
    GUEST_RANGE, ReservationError, ReservationForm, make_reservation, time_slots,
};
use crate::state::AppState;

/// Query parameters for success display.
#[derive(Debug, Deserialize)]
pub struct ReservationQuery {
    pub booked: Option<String>,
}

/// One `<option>` of a selector.
#[derive(Clone, Debug)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

/// Reservation page template.
#[derive(Template, WebTemplate)]
#[template(path = "reservation.html")]
pub struct ReservationTemplate {
    pub layout: Layout,
    pub form: ReservationForm,
    pub time_slots: Vec<SelectOption>,
    pub guest_options: Vec<SelectOption>,
    pub error: Option<String>,
    pub success: bool,
}

impl ReservationTemplate {
    fn new(layout: Layout, form: ReservationForm, error: Option<String>, success: bool) -> Self {
        let time_slots = time_slots()
            .into_iter()
            .map(|slot| SelectOption {
                selected: slot == form.time.trim(),
                value: slot,
            })
            .collect();
        let guest_options = GUEST_RANGE
            .map(|n| SelectOption {
                value: n.to_string(),
                selected: n == form.guests,
            })
            .collect();
        Self {
            layout,
            form,
            time_slots,
            guest_options,
            error,
            success,
        }
    }
}

/// Display the reservation form.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReservationQuery>,
) -> impl IntoResponse {
    let store = state.open_store(session).await;
    ReservationTemplate::new(
        Layout::from_store(&store),
        ReservationForm::default(),
        None,
        query.booked.is_some(),
    )
}

/// Submit a reservation.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ReservationForm>,
) -> Response {
    let store = state.open_store(session).await;

    match make_reservation(state.backend(), store.token(), &form).await {
        Ok(()) => Redirect::to("/reservation?booked=1").into_response(),
        Err(err) => {
            let status = match err {
                ReservationError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ReservationError::Backend(_) => StatusCode::BAD_GATEWAY,
            };
            let message = err.user_message();
            (
                status,
                ReservationTemplate::new(Layout::from_store(&store), form, Some(message), false),
            )
                .into_response()
        }
    }
}
