//! Shared core of a ride-hailing mobile client.
//!
//! The core is a Crux app: all state lives in [`Model`], every change goes
//! through [`App::update`], and side effects (HTTP, storage, timers, render)
//! are requested from the shell through capabilities. Three screens share the
//! model: estimate (quote a ride between two addresses), confirm (commit to
//! one driver option) and history (merged local + server ride list).

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod domain;
pub mod drivers;
pub mod history;
pub mod lifecycle;
pub mod repository;
pub mod ride_store;
pub mod validators;

use serde::{Deserialize, Serialize};

use capabilities::{HttpResult, KvKey, KvOutput, KvResult};
use domain::{ConfirmRideRequest, DriverRef, EstimateRequest, RideEstimate, RideOption};
use history::HistoryItem;
use lifecycle::{ErrorSlot, RequestLifecycle, ERROR_DISPLAY_WINDOW, REQUEST_COOLDOWN};
use ride_store::{NewRide, RideStore, StoredRide};
use validators::ValidationError;

pub use capabilities::{Capabilities, Effect};

pub const DEFAULT_API_BASE_URL: &str = "https://api.example.com";

/// Key-value slot holding the serialized ride store.
pub const STORE_KEY: &str = "ride_store_v1";

// ─── Error taxonomy ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A required form field was blank.
    Validation,
    /// The selected driver will not accept a ride of the quoted distance.
    DriverCapability,
    /// Transport failure, malformed response, or a mapped non-2xx.
    Network,
    /// The on-device ride store could not be read or written.
    LocalStore,
    /// The remote query succeeded but matched zero rides.
    EmptyResult,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::DriverCapability => "DRIVER_CAPABILITY",
            Self::Network => "NETWORK_ERROR",
            Self::LocalStore => "STORAGE_ERROR",
            Self::EmptyResult => "NO_RIDES_FOUND",
        }
    }
}

/// Form field an error is anchored to, when there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputField {
    CustomerId,
    Origin,
    Destination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub field: Option<InputField>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    #[must_use]
    pub fn local_store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LocalStore, message)
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Validation | ErrorKind::DriverCapability => self.message.clone(),
            ErrorKind::Network => {
                "Unable to reach the ride service. Please try again.".into()
            }
            ErrorKind::LocalStore => {
                "Unable to read or save rides on this device.".into()
            }
            ErrorKind::EmptyResult => "No rides found.".into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        let (kind, field) = match &e {
            ValidationError::InvalidCustomerId => {
                (ErrorKind::Validation, Some(InputField::CustomerId))
            }
            ValidationError::InvalidOrigin => (ErrorKind::Validation, Some(InputField::Origin)),
            ValidationError::InvalidDestination => {
                (ErrorKind::Validation, Some(InputField::Destination))
            }
            ValidationError::InvalidDistance { .. } => (ErrorKind::DriverCapability, None),
        };
        Self {
            kind,
            message: e.to_string(),
            field,
        }
    }
}

// ─── Tri-state outcome ───────────────────────────────────────────────────────

/// Outcome of a fallible operation. `Idle` is the only valid value before the
/// first request; exactly one variant is ever active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataState<T, E> {
    Idle,
    Success(T),
    Error(E),
}

impl<T, E> Default for DataState<T, E> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T, E> DataState<T, E> {
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

// ─── Formatting helpers ──────────────────────────────────────────────────────

#[must_use]
pub fn format_distance_km(km: f64) -> String {
    if !km.is_finite() || km < 0.0 {
        return "Unknown".to_string();
    }
    if km < 10.0 {
        format!("{km:.1} km")
    } else {
        format!("{km:.0} km")
    }
}

#[must_use]
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() || value < 0.0 {
        return "-".to_string();
    }
    format!("$ {value:.2}")
}

// ─── Model ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct EstimateScreen {
    pub lifecycle: RequestLifecycle,
    pub inputs: Option<EstimateRequest>,
    pub outcome: DataState<RideEstimate, AppError>,
    pub error: ErrorSlot,
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmScreen {
    pub lifecycle: RequestLifecycle,
    pub selected_option: Option<RideOption>,
    pub in_flight: Option<ConfirmRideRequest>,
    pub outcome: DataState<bool, AppError>,
    pub error: ErrorSlot,
}

/// History screen state. The two sources keep independent snapshots and
/// independent error slots; `items` is always recomputed from the snapshots,
/// never patched incrementally.
#[derive(Debug, Clone, Default)]
pub struct HistoryScreen {
    pub lifecycle: RequestLifecycle,
    pub customer_id: Option<String>,
    pub driver_filter: Option<DriverRef>,
    pub local_snapshot: Vec<StoredRide>,
    pub remote_snapshot: Vec<domain::RemoteRide>,
    pub items: Vec<HistoryItem>,
    pub local_error: ErrorSlot,
    pub remote_error: ErrorSlot,
}

#[derive(Debug, Clone)]
pub struct Model {
    pub api_base_url: String,
    pub ride_store: RideStore,
    pub estimate: EstimateScreen,
    pub confirm: ConfirmScreen,
    pub history: HistoryScreen,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ride_store: RideStore::new(),
            estimate: EstimateScreen::default(),
            confirm: ConfirmScreen::default(),
            history: HistoryScreen::default(),
        }
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenId {
    Estimate,
    Confirm,
    History,
}

impl ScreenId {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Estimate => "estimate",
            Self::Confirm => "confirm",
            Self::History => "history",
        }
    }
}

/// Where an error is displayed. History splits into its two source slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSurface {
    Estimate,
    Confirm,
    HistoryRemote,
    HistoryLocal,
}

impl ErrorSurface {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Estimate => "estimate",
            Self::Confirm => "confirm",
            Self::HistoryRemote => "history_remote",
            Self::HistoryLocal => "history_local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Shell boot-up: optional platform config, then restore the ride store.
    Started {
        api_base_url: Option<String>,
    },

    EstimateRequested {
        customer_id: String,
        origin: String,
        destination: String,
    },
    EstimateResponse {
        generation: u64,
        result: Box<HttpResult>,
    },

    OptionSelected {
        option_id: String,
    },
    ConfirmRequested,
    ConfirmResponse {
        generation: u64,
        result: Box<HttpResult>,
    },

    HistoryRequested {
        customer_id: String,
        driver: Option<DriverRef>,
    },
    HistoryResponse {
        generation: u64,
        result: Box<HttpResult>,
    },

    RequestCancelled {
        screen: ScreenId,
    },
    CooldownFinished {
        screen: ScreenId,
        generation: u64,
    },

    StoreRestored {
        result: Box<KvResult>,
    },
    StorePersisted {
        result: Box<KvResult>,
    },

    ErrorDismissed {
        surface: ErrorSurface,
    },
    ErrorDisplayFinished {
        surface: ErrorSurface,
        epoch: u64,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::EstimateRequested { .. } => "estimate_requested",
            Self::EstimateResponse { .. } => "estimate_response",
            Self::OptionSelected { .. } => "option_selected",
            Self::ConfirmRequested => "confirm_requested",
            Self::ConfirmResponse { .. } => "confirm_response",
            Self::HistoryRequested { .. } => "history_requested",
            Self::HistoryResponse { .. } => "history_response",
            Self::RequestCancelled { .. } => "request_cancelled",
            Self::CooldownFinished { .. } => "cooldown_finished",
            Self::StoreRestored { .. } => "store_restored",
            Self::StorePersisted { .. } => "store_persisted",
            Self::ErrorDismissed { .. } => "error_dismissed",
            Self::ErrorDisplayFinished { .. } => "error_display_finished",
        }
    }
}

// ─── View model ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub code: String,
    pub field: Option<InputField>,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            code: e.code().to_string(),
            field: e.field,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OptionView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub vehicle: String,
    pub rating: f64,
    pub comment: String,
    pub value_text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EstimateSummary {
    pub distance: f64,
    pub distance_text: String,
    pub duration: String,
    pub options: Vec<OptionView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EstimateView {
    pub can_request: bool,
    pub requesting: bool,
    pub cooling_down: bool,
    pub estimate: Option<EstimateSummary>,
    pub error: Option<UserFacingError>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConfirmView {
    pub can_confirm: bool,
    pub requesting: bool,
    pub cooling_down: bool,
    pub selected_option_id: Option<String>,
    pub confirmed: bool,
    pub error: Option<UserFacingError>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryItemView {
    pub id: String,
    pub is_local: bool,
    pub date: String,
    pub time: String,
    pub origin: String,
    pub destination: String,
    pub distance_text: String,
    pub duration: String,
    pub driver_name: String,
    pub value_text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryView {
    pub can_request: bool,
    pub requesting: bool,
    pub cooling_down: bool,
    pub items: Vec<HistoryItemView>,
    pub no_rides: bool,
    pub local_error: Option<UserFacingError>,
    pub remote_error: Option<UserFacingError>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub estimate: EstimateView,
    pub confirm: ConfirmView,
    pub history: HistoryView,
}

// ─── App ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct App;

impl App {
    fn lifecycle_mut(model: &mut Model, screen: ScreenId) -> &mut RequestLifecycle {
        match screen {
            ScreenId::Estimate => &mut model.estimate.lifecycle,
            ScreenId::Confirm => &mut model.confirm.lifecycle,
            ScreenId::History => &mut model.history.lifecycle,
        }
    }

    fn error_slot_mut(model: &mut Model, surface: ErrorSurface) -> &mut ErrorSlot {
        match surface {
            ErrorSurface::Estimate => &mut model.estimate.error,
            ErrorSurface::Confirm => &mut model.confirm.error,
            ErrorSurface::HistoryRemote => &mut model.history.remote_error,
            ErrorSurface::HistoryLocal => &mut model.history.local_error,
        }
    }

    /// Surfaces an error and schedules its auto-clear window.
    fn show_error(
        slot: &mut ErrorSlot,
        error: AppError,
        surface: ErrorSurface,
        caps: &Capabilities,
    ) {
        tracing::debug!(code = error.code(), surface = surface.name(), "surfacing error");
        let epoch = slot.set(error);
        caps.delay.start(ERROR_DISPLAY_WINDOW, move |_| Event::ErrorDisplayFinished {
            surface,
            epoch,
        });
    }

    fn start_cooldown(screen: ScreenId, generation: u64, caps: &Capabilities) {
        caps.delay.start(REQUEST_COOLDOWN, move |_| Event::CooldownFinished {
            screen,
            generation,
        });
    }

    fn persist_store(model: &Model, caps: &Capabilities) {
        let bytes = match model.ride_store.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode ride store");
                return;
            }
        };
        let Ok(key) = KvKey::new(STORE_KEY) else {
            tracing::error!("store key rejected by key-value capability");
            return;
        };
        caps.kv.set(key, bytes, |result| Event::StorePersisted {
            result: Box::new(result),
        });
    }

    /// Re-queries the local snapshot for the history screen's current scope
    /// and rebuilds the merged list. The remote snapshot is taken as-is.
    fn rebuild_history(model: &mut Model) {
        let Some(customer_id) = model.history.customer_id.clone() else {
            return;
        };
        let driver_id = model
            .history
            .driver_filter
            .as_ref()
            .map(|d| d.id.clone());

        model.history.local_snapshot = model
            .ride_store
            .query(&customer_id, driver_id.as_deref());
        model.history.items = history::merge_history(
            &model.history.local_snapshot,
            &model.history.remote_snapshot,
        );
    }

    fn record_confirmed_ride(request: ConfirmRideRequest, model: &mut Model, caps: &Capabilities) {
        let record = model.ride_store.insert(NewRide {
            customer_id: request.customer_id,
            date: None,
            origin: request.origin,
            destination: request.destination,
            distance: request.distance,
            duration: request.duration,
            driver_id: request.driver.id,
            driver_name: request.driver.name,
            value: request.value,
        });
        tracing::info!(ride_id = record.id, "confirmed ride stored locally");

        Self::persist_store(model, caps);
        Self::rebuild_history(model);
    }

    fn estimate_view(model: &Model) -> EstimateView {
        let selected_id = model
            .confirm
            .selected_option
            .as_ref()
            .map(|o| o.id.as_str());

        let estimate = model.estimate.outcome.success().map(|e| EstimateSummary {
            distance: e.distance,
            distance_text: format_distance_km(e.distance),
            duration: e.duration.clone(),
            options: e
                .options
                .iter()
                .map(|o| OptionView {
                    id: o.id.clone(),
                    name: o.name.clone(),
                    description: o.description.clone(),
                    vehicle: o.vehicle.clone(),
                    rating: o.review.rating,
                    comment: o.review.comment.clone(),
                    value_text: format_currency(o.value),
                    selected: selected_id == Some(o.id.as_str()),
                })
                .collect(),
        });

        EstimateView {
            can_request: model.estimate.lifecycle.can_submit(),
            requesting: model.estimate.lifecycle.is_requesting(),
            cooling_down: model.estimate.lifecycle.is_cooling_down(),
            estimate,
            error: model.estimate.error.active().map(UserFacingError::from),
        }
    }

    fn confirm_view(model: &Model) -> ConfirmView {
        ConfirmView {
            can_confirm: model.confirm.lifecycle.can_submit()
                && model.confirm.selected_option.is_some()
                && model.estimate.outcome.is_success(),
            requesting: model.confirm.lifecycle.is_requesting(),
            cooling_down: model.confirm.lifecycle.is_cooling_down(),
            selected_option_id: model
                .confirm
                .selected_option
                .as_ref()
                .map(|o| o.id.clone()),
            confirmed: matches!(model.confirm.outcome, DataState::Success(true)),
            error: model.confirm.error.active().map(UserFacingError::from),
        }
    }

    fn history_view(model: &Model) -> HistoryView {
        let items = model
            .history
            .items
            .iter()
            .map(|item| HistoryItemView {
                id: item.display_id(),
                is_local: item.is_local(),
                date: item.date_part().unwrap_or_default().to_string(),
                time: item.time_part().unwrap_or_default().to_string(),
                origin: item.origin().to_string(),
                destination: item.destination().to_string(),
                distance_text: format_distance_km(item.distance()),
                duration: item.duration().to_string(),
                driver_name: item.driver_name().to_string(),
                value_text: format_currency(item.value()),
            })
            .collect::<Vec<_>>();

        HistoryView {
            can_request: model.history.lifecycle.can_submit(),
            requesting: model.history.lifecycle.is_requesting(),
            cooling_down: model.history.lifecycle.is_cooling_down(),
            no_rides: items.is_empty(),
            items,
            local_error: model.history.local_error.active().map(UserFacingError::from),
            remote_error: model
                .history
                .remote_error
                .active()
                .map(UserFacingError::from),
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        tracing::debug!(event = event.name(), "handling event");

        match event {
            Event::Started { api_base_url } => {
                if let Some(url) = api_base_url {
                    model.api_base_url = url;
                }
                match KvKey::new(STORE_KEY) {
                    Ok(key) => caps.kv.get(key, |result| Event::StoreRestored {
                        result: Box::new(result),
                    }),
                    Err(e) => tracing::error!(error = %e, "store key rejected"),
                }
                caps.render.render();
            }

            Event::EstimateRequested {
                customer_id,
                origin,
                destination,
            } => {
                if !model.estimate.lifecycle.can_submit() {
                    tracing::debug!("estimate request ignored while busy");
                    return;
                }

                if let Err(e) = validators::validate_estimate_inputs(
                    &customer_id,
                    &origin,
                    &destination,
                ) {
                    Self::show_error(
                        &mut model.estimate.error,
                        e.into(),
                        ErrorSurface::Estimate,
                        caps,
                    );
                    caps.render.render();
                    return;
                }

                let request = EstimateRequest {
                    customer_id,
                    origin,
                    destination,
                };
                let http_request =
                    match repository::estimate_request(&model.api_base_url, &request) {
                        Ok(r) => r,
                        Err(e) => {
                            Self::show_error(
                                &mut model.estimate.error,
                                AppError::network(e.to_string()),
                                ErrorSurface::Estimate,
                                caps,
                            );
                            caps.render.render();
                            return;
                        }
                    };

                // a new quote flow starts: any previous estimate and
                // selection are gone
                model.estimate.inputs = Some(request);
                model.estimate.outcome = DataState::Idle;
                model.confirm.selected_option = None;
                model.confirm.outcome = DataState::Idle;

                let generation = model.estimate.lifecycle.begin();
                caps.http.send(http_request, move |result| Event::EstimateResponse {
                    generation,
                    result: Box::new(result),
                });
                caps.render.render();
            }

            Event::EstimateResponse { generation, result } => {
                if !model.estimate.lifecycle.accepts(generation) {
                    tracing::warn!(generation, "ignoring stale estimate response");
                    return;
                }

                match repository::parse_estimate(&result) {
                    Ok(estimate) => {
                        tracing::info!(
                            distance = estimate.distance,
                            options = estimate.options.len(),
                            "estimate received"
                        );
                        model.estimate.outcome = DataState::Success(estimate);
                    }
                    Err(error) => {
                        model.estimate.outcome = DataState::Error(error.clone());
                        Self::show_error(
                            &mut model.estimate.error,
                            error,
                            ErrorSurface::Estimate,
                            caps,
                        );
                    }
                }

                let generation = model.estimate.lifecycle.finish();
                Self::start_cooldown(ScreenId::Estimate, generation, caps);
                caps.render.render();
            }

            Event::OptionSelected { option_id } => {
                let Some(estimate) = model.estimate.outcome.success() else {
                    tracing::debug!("option selected without an estimate");
                    return;
                };
                match estimate.options.iter().find(|o| o.id == option_id) {
                    Some(option) => {
                        model.confirm.selected_option = Some(option.clone());
                        caps.render.render();
                    }
                    None => tracing::warn!(%option_id, "unknown ride option selected"),
                }
            }

            Event::ConfirmRequested => {
                if !model.confirm.lifecycle.can_submit() {
                    tracing::debug!("confirm request ignored while busy");
                    return;
                }

                let Some(inputs) = model.estimate.inputs.clone() else {
                    Self::show_error(
                        &mut model.confirm.error,
                        AppError::new(ErrorKind::Validation, "request an estimate first"),
                        ErrorSurface::Confirm,
                        caps,
                    );
                    caps.render.render();
                    return;
                };
                let Some(estimate) = model.estimate.outcome.success().cloned() else {
                    Self::show_error(
                        &mut model.confirm.error,
                        AppError::new(ErrorKind::Validation, "request an estimate first"),
                        ErrorSurface::Confirm,
                        caps,
                    );
                    caps.render.render();
                    return;
                };
                let Some(option) = model.confirm.selected_option.clone() else {
                    Self::show_error(
                        &mut model.confirm.error,
                        AppError::new(ErrorKind::Validation, "select a ride option first"),
                        ErrorSurface::Confirm,
                        caps,
                    );
                    caps.render.render();
                    return;
                };

                if let Err(e) = validators::validate_driver_distance(&option, estimate.distance) {
                    Self::show_error(
                        &mut model.confirm.error,
                        e.into(),
                        ErrorSurface::Confirm,
                        caps,
                    );
                    caps.render.render();
                    return;
                }

                let request = ConfirmRideRequest {
                    customer_id: inputs.customer_id,
                    origin: inputs.origin,
                    destination: inputs.destination,
                    distance: estimate.distance,
                    duration: estimate.duration,
                    driver: DriverRef {
                        id: option.id,
                        name: option.name,
                    },
                    value: option.value,
                };
                let http_request = match repository::confirm_request(&model.api_base_url, &request)
                {
                    Ok(r) => r,
                    Err(e) => {
                        Self::show_error(
                            &mut model.confirm.error,
                            AppError::network(e.to_string()),
                            ErrorSurface::Confirm,
                            caps,
                        );
                        caps.render.render();
                        return;
                    }
                };

                tracing::info!(
                    customer_id = %request.customer_id,
                    driver = %request.driver.name,
                    "confirming ride"
                );
                model.confirm.in_flight = Some(request);

                let generation = model.confirm.lifecycle.begin();
                caps.http.send(http_request, move |result| Event::ConfirmResponse {
                    generation,
                    result: Box::new(result),
                });
                caps.render.render();
            }

            Event::ConfirmResponse { generation, result } => {
                if !model.confirm.lifecycle.accepts(generation) {
                    tracing::warn!(generation, "ignoring stale confirmation response");
                    return;
                }

                let pending = model.confirm.in_flight.take();
                match repository::parse_confirmation(&result) {
                    Ok(true) => {
                        model.confirm.outcome = DataState::Success(true);
                        if let Some(request) = pending {
                            Self::record_confirmed_ride(request, model, caps);
                        } else {
                            tracing::warn!("confirmation arrived without a pending request");
                        }
                        // the quote flow is over; estimate and selection are
                        // transient
                        model.estimate.outcome = DataState::Idle;
                        model.confirm.selected_option = None;
                    }
                    Ok(false) => {
                        let error = AppError::network("the ride could not be confirmed");
                        model.confirm.outcome = DataState::Error(error.clone());
                        Self::show_error(
                            &mut model.confirm.error,
                            error,
                            ErrorSurface::Confirm,
                            caps,
                        );
                    }
                    Err(error) => {
                        model.confirm.outcome = DataState::Error(error.clone());
                        Self::show_error(
                            &mut model.confirm.error,
                            error,
                            ErrorSurface::Confirm,
                            caps,
                        );
                    }
                }

                let generation = model.confirm.lifecycle.finish();
                Self::start_cooldown(ScreenId::Confirm, generation, caps);
                caps.render.render();
            }

            Event::HistoryRequested {
                customer_id,
                driver,
            } => {
                if !model.history.lifecycle.can_submit() {
                    tracing::debug!("history request ignored while busy");
                    return;
                }

                if let Err(e) = validators::validate_history_inputs(&customer_id) {
                    Self::show_error(
                        &mut model.history.remote_error,
                        e.into(),
                        ErrorSurface::HistoryRemote,
                        caps,
                    );
                    caps.render.render();
                    return;
                }

                // a new scope invalidates the other scope's remote rides;
                // the fresh fetch repopulates them
                if model.history.customer_id.as_deref() != Some(customer_id.as_str())
                    || model.history.driver_filter != driver
                {
                    model.history.remote_snapshot.clear();
                }
                model.history.customer_id = Some(customer_id.clone());
                model.history.driver_filter = driver.clone();
                // local source answers immediately from the store snapshot
                Self::rebuild_history(model);

                let http_request = match repository::history_request(
                    &model.api_base_url,
                    &customer_id,
                    driver.as_ref().map(|d| d.id.as_str()),
                ) {
                    Ok(r) => r,
                    Err(e) => {
                        Self::show_error(
                            &mut model.history.remote_error,
                            AppError::network(e.to_string()),
                            ErrorSurface::HistoryRemote,
                            caps,
                        );
                        caps.render.render();
                        return;
                    }
                };

                let generation = model.history.lifecycle.begin();
                caps.http.send(http_request, move |result| Event::HistoryResponse {
                    generation,
                    result: Box::new(result),
                });
                caps.render.render();
            }

            Event::HistoryResponse { generation, result } => {
                if !model.history.lifecycle.accepts(generation) {
                    tracing::warn!(generation, "ignoring stale history response");
                    return;
                }

                match repository::parse_history(&result) {
                    Ok(response) => {
                        let rides = match &model.history.driver_filter {
                            Some(driver) => {
                                history::filter_by_driver_name(response.rides, &driver.name)
                            }
                            None => response.rides,
                        };

                        if rides.is_empty() {
                            // an empty answer is reported, not silently
                            // published; the last good snapshot stays visible
                            Self::show_error(
                                &mut model.history.remote_error,
                                AppError::new(ErrorKind::EmptyResult, "no rides found"),
                                ErrorSurface::HistoryRemote,
                                caps,
                            );
                        } else {
                            tracing::info!(rides = rides.len(), "remote history received");
                            model.history.remote_snapshot = rides;
                            model.history.remote_error.clear();
                            Self::rebuild_history(model);
                        }
                    }
                    Err(error) => {
                        // remote failure leaves the local-only list visible
                        Self::show_error(
                            &mut model.history.remote_error,
                            error,
                            ErrorSurface::HistoryRemote,
                            caps,
                        );
                    }
                }

                let generation = model.history.lifecycle.finish();
                Self::start_cooldown(ScreenId::History, generation, caps);
                caps.render.render();
            }

            Event::RequestCancelled { screen } => {
                let lifecycle = Self::lifecycle_mut(model, screen);
                if !lifecycle.is_requesting() {
                    tracing::debug!(screen = screen.name(), "nothing to cancel");
                    return;
                }
                let generation = lifecycle.cancel();
                if screen == ScreenId::Confirm {
                    // the abandoned confirmation must never be recorded
                    model.confirm.in_flight = None;
                }
                tracing::info!(screen = screen.name(), "request cancelled");
                Self::start_cooldown(screen, generation, caps);
                caps.render.render();
            }

            Event::CooldownFinished { screen, generation } => {
                if Self::lifecycle_mut(model, screen).cooldown_finished(generation) {
                    caps.render.render();
                }
            }

            Event::StoreRestored { result } => {
                match *result {
                    Ok(KvOutput::Get { value: Some(bytes) }) => {
                        match RideStore::from_bytes(&bytes) {
                            Ok(store) => {
                                tracing::info!(records = store.len(), "ride store restored");
                                model.ride_store = store;
                                Self::rebuild_history(model);
                            }
                            Err(e) => Self::show_error(
                                &mut model.history.local_error,
                                AppError::local_store(e.to_string()),
                                ErrorSurface::HistoryLocal,
                                caps,
                            ),
                        }
                    }
                    Ok(KvOutput::Get { value: None }) => {
                        tracing::debug!("no persisted ride store");
                    }
                    Ok(KvOutput::Set) => {
                        tracing::warn!("unexpected storage output while restoring");
                    }
                    Err(e) => Self::show_error(
                        &mut model.history.local_error,
                        AppError::local_store(e.to_string()),
                        ErrorSurface::HistoryLocal,
                        caps,
                    ),
                }
                caps.render.render();
            }

            Event::StorePersisted { result } => match *result {
                Ok(_) => tracing::debug!("ride store persisted"),
                Err(e) => {
                    tracing::warn!(error = %e, "ride store persistence failed");
                    Self::show_error(
                        &mut model.history.local_error,
                        AppError::local_store(e.to_string()),
                        ErrorSurface::HistoryLocal,
                        caps,
                    );
                    caps.render.render();
                }
            },

            Event::ErrorDismissed { surface } => {
                Self::error_slot_mut(model, surface).clear();
                caps.render.render();
            }

            Event::ErrorDisplayFinished { surface, epoch } => {
                if Self::error_slot_mut(model, surface).expire(epoch) {
                    caps.render.render();
                }
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel {
            estimate: Self::estimate_view(model),
            confirm: Self::confirm_view(model),
            history: Self::history_view(model),
        }
    }
}
