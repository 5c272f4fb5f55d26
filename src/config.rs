// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Runtime configuration for the cloud session core: bind address, timing
/// tunables for the display/boot/throttle state machines, and buffer sizes.
#[derive(Debug, Clone, clap::Args)]
pub struct SessionCoreConfig {
    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "SESSION_CORE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080, env = "SESSION_CORE_PORT")]
    pub port: u16,

    /// Bearer token required on the HTTP surface. If unset, auth is disabled
    /// (tests / local dev only — glasses and TPA links always require their
    /// own token/API key regardless of this setting).
    #[arg(long, env = "SESSION_CORE_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Minimum interval between MAIN display emissions per TPA (`T_throttle`).
    #[arg(long, default_value_t = 300, env = "SESSION_CORE_T_THROTTLE_MS")]
    pub t_throttle_ms: u64,

    /// Dashboard recomposition period (`T_tick`).
    #[arg(long, default_value_t = 500, env = "SESSION_CORE_T_TICK_MS")]
    pub t_tick_ms: u64,

    /// Per-TPA boot window (`T_boot`).
    #[arg(long, default_value_t = 1500, env = "SESSION_CORE_T_BOOT_MS")]
    pub t_boot_ms: u64,

    /// PhotoRequest TTL (`T_photo_expire`).
    #[arg(long, default_value_t = 120, env = "SESSION_CORE_T_PHOTO_EXPIRE_SECS")]
    pub t_photo_expire_secs: u64,

    /// Grace window retaining a session after glasses disconnect (`T_glasses_grace`).
    #[arg(long, default_value_t = 60, env = "SESSION_CORE_T_GLASSES_GRACE_SECS")]
    pub t_glasses_grace_secs: u64,

    /// Live audio queue capacity, in milliseconds of audio.
    #[arg(long, default_value_t = 1000, env = "SESSION_CORE_AUDIO_LIVE_CAP_MS")]
    pub audio_live_cap_ms: u64,

    /// Sliding reconnect-catchup buffer size, in milliseconds of audio.
    #[arg(long, default_value_t = 3000, env = "SESSION_CORE_AUDIO_SLIDE_MS")]
    pub audio_slide_ms: u64,

    /// Per-app bounded boot queue capacity (`N`).
    #[arg(long, default_value_t = 4, env = "SESSION_CORE_BOOT_QUEUE_CAP")]
    pub boot_queue_cap_per_app: usize,

    /// Idle timeout before a transport link with no frames is closed.
    #[arg(long, default_value_t = 45, env = "SESSION_CORE_IDLE_TIMEOUT_SECS")]
    pub idle_timeout_secs: u64,

    /// Outbound queue high-water mark before audio-class frames are dropped.
    #[arg(long, default_value_t = 256, env = "SESSION_CORE_WS_HIGH_WATER")]
    pub ws_send_high_water: usize,

    /// Bounded buffer size for outbound-to-glasses messages during the grace window.
    #[arg(long, default_value_t = 128, env = "SESSION_CORE_GRACE_BUFFER_CAP")]
    pub grace_buffer_cap: usize,
}

impl SessionCoreConfig {
    pub fn t_throttle(&self) -> Duration {
        Duration::from_millis(self.t_throttle_ms)
    }

    pub fn t_tick(&self) -> Duration {
        Duration::from_millis(self.t_tick_ms)
    }

    pub fn t_boot(&self) -> Duration {
        Duration::from_millis(self.t_boot_ms)
    }

    pub fn t_photo_expire(&self) -> Duration {
        Duration::from_secs(self.t_photo_expire_secs)
    }

    pub fn t_glasses_grace(&self) -> Duration {
        Duration::from_secs(self.t_glasses_grace_secs)
    }

    pub fn audio_live_cap(&self) -> Duration {
        Duration::from_millis(self.audio_live_cap_ms)
    }

    pub fn audio_slide(&self) -> Duration {
        Duration::from_millis(self.audio_slide_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for SessionCoreConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            auth_token: None,
            t_throttle_ms: 300,
            t_tick_ms: 500,
            t_boot_ms: 1500,
            t_photo_expire_secs: 120,
            t_glasses_grace_secs: 60,
            audio_live_cap_ms: 1000,
            audio_slide_ms: 3000,
            boot_queue_cap_per_app: 4,
            idle_timeout_secs: 45,
            ws_send_high_water: 256,
            grace_buffer_cap: 128,
        }
    }
}
