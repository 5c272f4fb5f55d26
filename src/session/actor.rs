// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `UserSession` actor: the single task that serializes every mutation
//! to one user's live state. Transport tasks never touch session state
//! directly — they marshal inbound frames onto this actor's inbox and drain
//! whatever the actor decides to send back out.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::SessionCoreConfig;
use crate::error::SessionError;
use crate::external::Collaborators;
use crate::media::{PhotoRequestTable, Requester, UploadMatch};
use crate::protocol::{
    DisplayLayout, GlassesInbound, GlassesOutbound, PackageName, Priority, StreamKind, TpaInbound,
    TpaOutbound, UserId, View,
};
use crate::registry::SessionRegistry;
use crate::session::audio::AudioBuffer;
use crate::session::dashboard::{DashboardManager, DashboardMode};
use crate::session::display::{DisplayManager, DisplayRequest, ScheduledTick};
use crate::session::subscription::SubscriptionManager;

/// What the session actor hands to the glasses transport task to write out.
#[derive(Debug, Clone)]
pub enum GlassesWireOut {
    Text(GlassesOutbound),
    Binary(Bytes),
    Close(String),
}

pub type GlassesSink = mpsc::Sender<GlassesWireOut>;
pub type TpaSink = mpsc::Sender<TpaOutbound>;

/// A handle to a running session actor. Cheap to clone; every clone shares
/// the same inbox.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) tx: mpsc::Sender<Inbound>,
    pub(crate) session_id: String,
    pub(crate) user_id: UserId,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn send(&self, msg: Inbound) {
        if self.tx.send(msg).await.is_err() {
            warn!(session_id = %self.session_id, "session actor inbox closed, message dropped");
        }
    }

    pub async fn get_status(&self) -> Option<SessionStatus> {
        let (reply, rx) = oneshot::channel();
        self.send(Inbound::GetStatus { reply }).await;
        rx.await.ok()
    }

    pub async fn upload_photo(
        &self,
        request_id: String,
        user_id: UserId,
        bytes: Vec<u8>,
        content_type: String,
    ) -> Result<String, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Inbound::UploadPhoto { request_id, user_id, bytes, content_type, reply }).await;
        rx.await.unwrap_or(Err(SessionError::InternalFault))
    }
}

/// The session actor's inbox message kinds: transport frames, registry
/// attach/detach events, and the timers the display/dashboard/photo state
/// machines post back to themselves.
pub enum Inbound {
    GlassesConnected { sink: GlassesSink },
    GlassesText(GlassesInbound),
    GlassesBinary(Bytes),
    GlassesDisconnected,
    TpaConnected { package: PackageName, sink: TpaSink },
    TpaText { package: PackageName, msg: TpaInbound },
    TpaDisconnected { package: PackageName },
    HardwareButtonPress { button_id: String, press_type: String, reply: oneshot::Sender<ButtonOutcome> },
    ThrottleTick { package: PackageName },
    BootEnd { package: PackageName },
    DisplayExpiry,
    DashboardTick,
    PhotoExpireSweep,
    GraceExpired,
    UploadPhoto {
        request_id: String,
        user_id: UserId,
        bytes: Vec<u8>,
        content_type: String,
        reply: oneshot::Sender<Result<String, SessionError>>,
    },
    GetStatus { reply: oneshot::Sender<SessionStatus> },
    Shutdown { reason: String },
}

/// Outcome of the hardware-button dispatch, reported back to the HTTP
/// handler that owns the device's request.
#[derive(Debug, Clone)]
pub enum ButtonOutcome {
    RoutedToApps,
    DefaultPhoto { request_id: String },
    NoAction,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub user_id: UserId,
    pub glasses_connected: bool,
    pub tpas: Vec<PackageName>,
    pub dashboard_mode: DashboardMode,
}

pub struct UserSessionActor {
    session_id: String,
    user_id: UserId,
    config: Arc<SessionCoreConfig>,
    collaborators: Arc<Collaborators>,
    registry: SessionRegistry,
    self_tx: mpsc::Sender<Inbound>,
    dashboard_package: PackageName,

    glasses: Option<GlassesSink>,
    grace_deadline: Option<Instant>,
    /// Outbound-to-glasses messages accumulated while `glasses` is `None`
    /// during the grace window (§4.2 `detachGlasses`). Bounded, drop-oldest.
    grace_buffer: VecDeque<GlassesOutbound>,
    tpas: HashMap<PackageName, TpaSink>,

    subscriptions: SubscriptionManager,
    display: DisplayManager,
    dashboard: DashboardManager,
    audio: AudioBuffer,
    photos: PhotoRequestTable,

    last_activity: Instant,
}

impl UserSessionActor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: String,
        user_id: UserId,
        config: Arc<SessionCoreConfig>,
        collaborators: Arc<Collaborators>,
        registry: SessionRegistry,
        dashboard_package: PackageName,
        handle: SessionHandle,
    ) -> Self {
        Self {
            display: DisplayManager::new(config.t_throttle(), config.t_boot(), config.boot_queue_cap_per_app),
            audio: AudioBuffer::new(config.audio_slide()),
            dashboard: DashboardManager::new(dashboard_package.clone()),
            session_id,
            user_id,
            config,
            collaborators,
            registry,
            self_tx: handle.tx,
            dashboard_package,
            glasses: None,
            grace_deadline: None,
            grace_buffer: VecDeque::new(),
            tpas: HashMap::new(),
            subscriptions: SubscriptionManager::new(),
            photos: PhotoRequestTable::new(),
            last_activity: Instant::now(),
        }
    }

    pub async fn run(mut self, mut rx: mpsc::Receiver<Inbound>) {
        self.schedule_at(Instant::now() + self.config.t_tick(), Inbound::DashboardTick);
        self.schedule_at(Instant::now() + self.config.t_photo_expire(), Inbound::PhotoExpireSweep);

        while let Some(msg) = rx.recv().await {
            self.last_activity = Instant::now();
            let is_shutdown = matches!(msg, Inbound::Shutdown { .. });
            self.handle(msg).await;
            if is_shutdown {
                break;
            }
        }

        self.registry.remove(&self.session_id, &self.user_id).await;
        info!(session_id = %self.session_id, "session actor exiting");
    }

    fn schedule_at(&self, at: Instant, msg: Inbound) {
        let delay = at.saturating_duration_since(Instant::now());
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(msg).await;
        });
    }

    fn apply_schedule(&self, tick: Option<ScheduledTick>) {
        match tick {
            Some(ScheduledTick::ThrottleRelease { package, at }) => {
                self.schedule_at(at, Inbound::ThrottleTick { package })
            }
            Some(ScheduledTick::BootEnd { package, at }) => self.schedule_at(at, Inbound::BootEnd { package }),
            Some(ScheduledTick::DisplayExpiry { at }) => self.schedule_at(at, Inbound::DisplayExpiry),
            None => {}
        }
    }

    async fn send_to_glasses(&mut self, msg: GlassesOutbound) {
        let Some(sink) = &self.glasses else {
            // In the grace window: buffer for replay on reconnect, bounded
            // drop-oldest so a long outage cannot grow this without limit.
            if self.grace_buffer.len() >= self.config.grace_buffer_cap {
                self.grace_buffer.pop_front();
            }
            self.grace_buffer.push_back(msg);
            return;
        };
        if sink.send(GlassesWireOut::Text(msg)).await.is_err() {
            warn!(session_id = %self.session_id, "glasses link closed while sending");
        }
    }

    async fn send_to_tpa(&self, package: &str, msg: TpaOutbound) {
        if let Some(sink) = self.tpas.get(package) {
            if sink.send(msg).await.is_err() {
                warn!(session_id = %self.session_id, package, "tpa link closed while sending");
            }
        }
    }

    async fn emit_display(&mut self, outcome_emit: Option<DisplayRequest>) {
        if let Some(req) = outcome_emit {
            self.send_to_glasses(GlassesOutbound::DisplayEvent {
                package_name: req.package,
                view: req.view,
                layout: req.layout,
                duration_ms: req.duration.map(|d| d.as_millis() as u64),
            })
            .await;
        }
    }

    async fn apply_reactor_effects(&mut self, effects: crate::session::subscription::ReactorEffects) {
        if let Some(enabled) = effects.mic_enabled {
            self.send_to_glasses(GlassesOutbound::MicrophoneStateChange { is_microphone_enabled: enabled })
                .await;
        }
        if let Some(active) = effects.transcription_active {
            self.collaborators.transcription.set_active(&self.session_id, active).await;
        }
        if let Some(langs) = effects.transcription_langs {
            self.collaborators.transcription.set_languages(&self.session_id, langs).await;
        }
    }

    async fn handle(&mut self, msg: Inbound) {
        match msg {
            Inbound::GlassesConnected { sink } => self.on_glasses_connected(sink).await,
            Inbound::GlassesText(msg) => self.on_glasses_text(msg).await,
            Inbound::GlassesBinary(bytes) => self.on_glasses_binary(bytes).await,
            Inbound::GlassesDisconnected => self.on_glasses_disconnected().await,
            Inbound::TpaConnected { package, sink } => self.on_tpa_connected(package, sink).await,
            Inbound::TpaText { package, msg } => self.on_tpa_text(package, msg).await,
            Inbound::TpaDisconnected { package } => self.on_tpa_disconnected(package).await,
            Inbound::HardwareButtonPress { button_id, press_type, reply } => {
                let outcome = self.dispatch_button(&button_id, &press_type, Requester::System).await;
                let _ = reply.send(outcome);
            }
            Inbound::ThrottleTick { package } => self.on_throttle_tick(package).await,
            Inbound::BootEnd { package } => self.on_boot_end(package).await,
            Inbound::DisplayExpiry => self.display.expire_current(Instant::now()),
            Inbound::DashboardTick => self.on_dashboard_tick().await,
            Inbound::PhotoExpireSweep => self.on_photo_expire_sweep(),
            Inbound::GraceExpired => self.on_grace_expired().await,
            Inbound::UploadPhoto { request_id, user_id, bytes, content_type, reply } => {
                let result = self.on_upload_photo(request_id, user_id, bytes, content_type).await;
                let _ = reply.send(result);
            }
            Inbound::GetStatus { reply } => {
                let _ = reply.send(self.status());
            }
            Inbound::Shutdown { reason } => self.on_shutdown(reason).await,
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.session_id.clone(),
            user_id: self.user_id.clone(),
            glasses_connected: self.glasses.is_some(),
            tpas: self.tpas.keys().cloned().collect(),
            dashboard_mode: self.dashboard.mode(),
        }
    }

    async fn on_glasses_connected(&mut self, sink: GlassesSink) {
        let reconnected = self.grace_deadline.take().is_some();
        self.glasses = Some(sink);

        for msg in std::mem::take(&mut self.grace_buffer) {
            self.send_to_glasses(msg).await;
        }

        self.send_to_glasses(GlassesOutbound::ConnectionAck {
            installed_apps: self.tpas.keys().cloned().collect(),
            active_app_package_names: self.tpas.keys().cloned().collect(),
        })
        .await;

        if reconnected {
            info!(session_id = %self.session_id, "glasses reconnected within grace window");
            let now = Instant::now();
            for req in self.display.retry_on_reconnect(now) {
                self.send_to_glasses(GlassesOutbound::DisplayEvent {
                    package_name: req.package,
                    view: req.view,
                    layout: req.layout,
                    duration_ms: req.duration.map(|d| d.as_millis() as u64),
                })
                .await;
            }

            let catch_up = self.audio.catch_up();
            let families: Vec<PackageName> = self.subscriptions.get("audio_chunk");
            for frame in catch_up {
                let payload = serde_json::json!({
                    "sequence": frame.sequence,
                    "encoding": frame.encoding,
                    "data": base64::engine::general_purpose::STANDARD.encode(&frame.payload),
                });
                for package in &families {
                    self.send_to_tpa(
                        package,
                        TpaOutbound::DataStream { stream_kind: "audio_chunk".to_owned(), payload: payload.clone() },
                    )
                    .await;
                }
            }
        }
    }

    async fn on_glasses_disconnected(&mut self) {
        self.glasses = None;
        let grace = self.config.t_glasses_grace();
        if grace.is_zero() {
            self.on_grace_expired().await;
            return;
        }
        let deadline = Instant::now() + grace;
        self.grace_deadline = Some(deadline);
        self.schedule_at(deadline, Inbound::GraceExpired);
    }

    async fn on_grace_expired(&mut self) {
        if self.glasses.is_some() {
            return;
        }
        let Some(deadline) = self.grace_deadline else { return };
        if Instant::now() < deadline {
            return;
        }
        info!(session_id = %self.session_id, "glasses grace window expired, destroying session");
        self.on_shutdown("glasses_grace_expired".to_owned()).await;
    }

    async fn on_shutdown(&mut self, reason: String) {
        for package in self.tpas.keys().cloned().collect::<Vec<_>>() {
            self.send_to_tpa(&package, TpaOutbound::SessionClosing { reason: reason.clone() }).await;
        }
        if let Some(sink) = self.glasses.take() {
            let _ = sink.send(GlassesWireOut::Close(reason)).await;
        }
        self.tpas.clear();
    }

    async fn on_glasses_text(&mut self, msg: GlassesInbound) {
        match msg {
            GlassesInbound::ConnectionInit { .. } => {}
            GlassesInbound::Vad { status } => {
                debug!(session_id = %self.session_id, status, "voice activity update");
            }
            GlassesInbound::ButtonPress { button_id, press_type } => {
                let _ = self.dispatch_button(&button_id, &press_type, Requester::System).await;
            }
            GlassesInbound::HeadPosition { position } => {
                self.fan_out_data_stream("head_position", serde_json::json!({ "position": position })).await;
            }
            GlassesInbound::GlassesBatteryUpdate { level, charging, time_remaining } => {
                self.fan_out_data_stream(
                    "glasses_battery",
                    serde_json::json!({ "level": level, "charging": charging, "timeRemaining": time_remaining }),
                )
                .await;
            }
            GlassesInbound::LocationUpdate { lat, lng } => {
                self.fan_out_data_stream("location", serde_json::json!({ "lat": lat, "lng": lng })).await;
            }
            GlassesInbound::CalendarEvent { title, event_id, dt_start, dt_end, time_zone } => {
                self.fan_out_data_stream(
                    "calendar_event",
                    serde_json::json!({
                        "title": title, "eventId": event_id, "dtStart": dt_start,
                        "dtEnd": dt_end, "timeZone": time_zone,
                    }),
                )
                .await;
            }
            GlassesInbound::CoreStatus { status } => {
                debug!(session_id = %self.session_id, status, "core status update");
            }
            GlassesInbound::StartApp { package_name } => self.on_start_app(package_name).await,
            GlassesInbound::StopApp { package_name } => self.on_stop_app(package_name).await,
        }
    }

    async fn fan_out_data_stream(&self, family: &str, payload: serde_json::Value) {
        for package in self.subscriptions.get(family) {
            self.send_to_tpa(&package, TpaOutbound::DataStream { stream_kind: family.to_owned(), payload: payload.clone() })
                .await;
        }
    }

    async fn on_glasses_binary(&mut self, bytes: Bytes) {
        let frame = self.audio.push(bytes, None);
        let payload = serde_json::json!({
            "sequence": frame.sequence,
            "encoding": frame.encoding,
            "data": base64::engine::general_purpose::STANDARD.encode(&frame.payload),
        });
        self.fan_out_data_stream("audio_chunk", payload).await;
    }

    async fn on_start_app(&mut self, package: PackageName) {
        let tick = self.display.start_boot(package.clone(), Instant::now());
        self.apply_schedule(Some(tick));

        let card = DisplayRequest {
            package: self.dashboard_package.clone(),
            view: View::Dashboard,
            layout: DisplayLayout::text_wall(format!("Starting {package}")),
            duration: None,
            priority: Priority::Normal,
            server_timestamp: Instant::now(),
        };
        let outcome = self.display.handle_request(card, Instant::now());
        self.apply_schedule(outcome.schedule);
        self.emit_display(outcome.emit).await;

        self.send_to_glasses(GlassesOutbound::AppStateChange { package_name: package, state: "starting".to_owned() })
            .await;
    }

    async fn on_stop_app(&mut self, package: PackageName) {
        self.send_to_glasses(GlassesOutbound::AppStateChange { package_name: package, state: "stopped".to_owned() })
            .await;
    }

    async fn on_tpa_connected(&mut self, package: PackageName, sink: TpaSink) {
        self.tpas.insert(package, sink.clone());
        let _ = sink.send(TpaOutbound::ConnectionAck { session_id: self.session_id.clone() }).await;
    }

    async fn on_tpa_disconnected(&mut self, package: PackageName) {
        self.tpas.remove(&package);
        let (_, effects) = self.subscriptions.clear(&package);
        self.apply_reactor_effects(effects).await;
        self.dashboard.on_package_disconnected(&package);
    }

    async fn on_tpa_text(&mut self, package: PackageName, msg: TpaInbound) {
        if !self.tpas.contains_key(&package) {
            warn!(session_id = %self.session_id, package, "message from unregistered tpa link, ignoring");
            return;
        }

        match msg {
            TpaInbound::TpaConnectionInit { .. } => {}
            TpaInbound::SubscriptionUpdate { subscriptions } => {
                let (_, effects) = self.subscriptions.set(package, subscriptions);
                self.apply_reactor_effects(effects).await;
            }
            TpaInbound::DisplayRequest { view, layout, duration_ms, priority } => {
                self.on_display_request(package, view, layout, duration_ms, priority).await;
            }
            TpaInbound::DashboardContentUpdate { content, modes, timestamp } => {
                self.dashboard.push_content(package, content, modes, timestamp);
                self.recompose_dashboard().await;
            }
            TpaInbound::DashboardModeChange { mode } => {
                self.on_dashboard_mode_change(package, mode).await;
            }
            TpaInbound::DashboardSystemUpdate { section, content } => {
                self.on_dashboard_system_update(package, section, content).await;
            }
            TpaInbound::PhotoRequest { save_to_gallery } => {
                let request_id = self.photos.allocate(self.user_id.clone(), Requester::Tpa(package), save_to_gallery);
                self.send_to_glasses(GlassesOutbound::TakePhoto { request_id }).await;
            }
            TpaInbound::Heartbeat => {}
        }
    }

    async fn on_display_request(
        &mut self,
        package: PackageName,
        view: View,
        layout: DisplayLayout,
        duration_ms: Option<u64>,
        priority: Priority,
    ) {
        if view == View::Dashboard && package != self.dashboard_package {
            self.send_to_tpa(
                &package,
                TpaOutbound::DisplayRequestStatus {
                    status: crate::protocol::DisplayStatus::Rejected,
                    reason: Some("only the system dashboard package may write the dashboard view".to_owned()),
                },
            )
            .await;
            return;
        }

        let req = DisplayRequest {
            package: package.clone(),
            view,
            layout,
            duration: duration_ms.map(Duration::from_millis),
            priority,
            server_timestamp: Instant::now(),
        };
        let outcome = self.display.handle_request(req, Instant::now());
        self.apply_schedule(outcome.schedule);
        self.send_to_tpa(
            &package,
            TpaOutbound::DisplayRequestStatus { status: outcome.status, reason: outcome.reason.clone() },
        )
        .await;
        self.emit_display(outcome.emit).await;
    }

    async fn on_dashboard_mode_change(&mut self, package: PackageName, mode: String) {
        let Some(mode) = DashboardMode::parse(&mode) else {
            warn!(session_id = %self.session_id, package, mode, "unrecognized dashboard mode");
            return;
        };
        match self.dashboard.set_mode(&package, mode) {
            Ok(broadcast) => self.broadcast_dashboard_state(broadcast).await,
            Err(()) => {
                warn!(session_id = %self.session_id, package, "non-system package attempted dashboard mode change");
            }
        }
        self.recompose_dashboard().await;
    }

    async fn on_dashboard_system_update(&mut self, package: PackageName, section: String, content: String) {
        if self.dashboard.set_system_section(&package, &section, content).is_err() {
            warn!(session_id = %self.session_id, package, "non-system package attempted to write a system section");
            return;
        }
        self.recompose_dashboard().await;
    }

    async fn broadcast_dashboard_state(&self, broadcast: crate::session::dashboard::DashboardBroadcast) {
        if let Some(mode) = broadcast.mode_changed {
            for package in self.tpas.keys().cloned().collect::<Vec<_>>() {
                self.send_to_tpa(&package, TpaOutbound::DashboardModeChanged { mode: mode_to_wire(mode) }).await;
            }
        }
        if let Some(enabled) = broadcast.always_on_changed {
            for package in self.tpas.keys().cloned().collect::<Vec<_>>() {
                self.send_to_tpa(&package, TpaOutbound::DashboardAlwaysOnChanged { enabled }).await;
            }
        }
    }

    async fn recompose_dashboard(&mut self) {
        let Some(layout) = self.dashboard.compose() else { return };
        let req = DisplayRequest {
            package: self.dashboard_package.clone(),
            view: View::Dashboard,
            layout,
            duration: None,
            priority: Priority::Normal,
            server_timestamp: Instant::now(),
        };
        let outcome = self.display.handle_request(req, Instant::now());
        self.apply_schedule(outcome.schedule);
        self.emit_display(outcome.emit).await;
    }

    async fn on_dashboard_tick(&mut self) {
        self.recompose_dashboard().await;
        self.schedule_at(Instant::now() + self.config.t_tick(), Inbound::DashboardTick);
    }

    fn on_photo_expire_sweep(&mut self) {
        self.photos.expire_stale(self.config.t_photo_expire(), Instant::now());
        self.schedule_at(Instant::now() + self.config.t_photo_expire(), Inbound::PhotoExpireSweep);
    }

    async fn on_throttle_tick(&mut self, package: PackageName) {
        if let Some(outcome) = self.display.throttle_tick(&package, Instant::now()) {
            self.apply_schedule(outcome.schedule);
            self.send_to_tpa(
                &package,
                TpaOutbound::DisplayRequestStatus { status: outcome.status, reason: outcome.reason.clone() },
            )
            .await;
            self.emit_display(outcome.emit).await;
        }
    }

    async fn on_boot_end(&mut self, package: PackageName) {
        let outcomes = self.display.end_boot(&package, Instant::now());
        for outcome in outcomes {
            self.apply_schedule(outcome.schedule);
            self.send_to_tpa(
                &package,
                TpaOutbound::DisplayRequestStatus { status: outcome.status, reason: outcome.reason.clone() },
            )
            .await;
            self.emit_display(outcome.emit).await;
        }
        self.send_to_glasses(GlassesOutbound::AppStateChange { package_name: package, state: "running".to_owned() })
            .await;

        // Packages that were only parked behind this boot (no timer of their
        // own) must be drained too, or their requests would wait forever.
        for other in self.display.booting_packages() {
            let outcomes = self.display.end_boot(&other, Instant::now());
            for outcome in outcomes {
                self.apply_schedule(outcome.schedule);
                self.send_to_tpa(
                    &other,
                    TpaOutbound::DisplayRequestStatus { status: outcome.status, reason: outcome.reason.clone() },
                )
                .await;
                self.emit_display(outcome.emit).await;
            }
        }
    }

    /// Shared button dispatch for both the WS inbound and the HTTP endpoint:
    /// route to subscribed TPAs, or fall back to the default photo action.
    async fn dispatch_button(&mut self, button_id: &str, press_type: &str, requester: Requester) -> ButtonOutcome {
        let matches_id = |k: &StreamKind| matches!(k, StreamKind::ButtonPress { button_id: id } if id == button_id);
        let subscribers = self.subscriptions.get_filtered("button_press", matches_id);

        if !subscribers.is_empty() {
            let payload = serde_json::json!({ "pressType": press_type });
            for package in subscribers {
                self.send_to_tpa(
                    &package,
                    TpaOutbound::DataStream { stream_kind: format!("button_press({button_id})"), payload: payload.clone() },
                )
                .await;
            }
            return ButtonOutcome::RoutedToApps;
        }

        if button_id == "photo" && press_type == "short" {
            let request_id = self.photos.allocate(self.user_id.clone(), requester, true);
            return ButtonOutcome::DefaultPhoto { request_id };
        }

        ButtonOutcome::NoAction
    }

    async fn on_upload_photo(
        &mut self,
        request_id: String,
        user_id: UserId,
        bytes: Vec<u8>,
        content_type: String,
    ) -> Result<String, SessionError> {
        let now = Instant::now();
        let matched: UploadMatch = self.photos.complete(&request_id, &user_id, self.config.t_photo_expire(), now)?;

        let url = self
            .collaborators
            .object_store
            .put(bytes, &content_type)
            .await
            .map_err(|_| SessionError::InternalFault)?;

        if matched.save_to_gallery {
            self.collaborators.gallery_store.record(&user_id, &request_id, &url).await;
        }

        if let Requester::Tpa(package) = &matched.requester {
            self.send_to_tpa(package, TpaOutbound::PhotoTaken { request_id: request_id.clone(), url: url.clone() }).await;
        }

        Ok(url)
    }
}

fn mode_to_wire(mode: DashboardMode) -> String {
    match mode {
        DashboardMode::Main => "MAIN".to_owned(),
        DashboardMode::Expanded => "EXPANDED".to_owned(),
        DashboardMode::AlwaysOn => "ALWAYS_ON".to_owned(),
        DashboardMode::None => "NONE".to_owned(),
    }
}

