//! Capture session state machine.
//!
//! One session at a time: validate, claim the slot, get camera permission,
//! activate the device, then run `photo_count` rounds of countdown → flash →
//! acquire → pause. A finished session becomes a [`CaptureRecord`] in the
//! archive; any failure or cancellation discards the frames.
//!
//! The slot and the device are released by a drop guard, so a session future
//! that is dropped mid-countdown (app torn down, timeout) cleans up the same
//! way a failed one does.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use super::archive::CaptureArchive;
use super::clock::{Clock, SessionTiming, TokioClock};
use super::events::BoothEvent;
use super::layout::LayoutTemplate;
use super::record::{generate_record_id, normalize_user_name, CaptureRecord, Frame};
use crate::capture::FrameSource;
use crate::error::{BoothError, Result};
use crate::runtime::{emit_booth_event, BoothRuntime, PermissionKind};

pub const MIN_COUNTDOWN_SECONDS: u8 = 1;
pub const MAX_COUNTDOWN_SECONDS: u8 = 9;

/// Attempts at a fresh 5-char id before falling back to a longer one.
const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    CountingDown,
    ShutterFiring,
    Complete,
}

/// Read-only view of the controller for UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub layout: Option<&'static str>,
    pub user_name: Option<String>,
    pub frames_captured: usize,
    pub photo_count: usize,
    pub countdown_remaining: Option<u8>,
}

impl SessionSnapshot {
    fn idle() -> Self {
        Self {
            status: SessionStatus::Idle,
            layout: None,
            user_name: None,
            frames_captured: 0,
            photo_count: 0,
            countdown_remaining: None,
        }
    }
}

/// Validated arguments of a capture request.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub layout: &'static LayoutTemplate,
    pub user_name: String,
    pub countdown_seconds: u8,
}

impl SessionRequest {
    /// Check every precondition. Nothing is touched if this fails.
    pub fn validate(layout_id: &str, user_name: &str, countdown_seconds: u8) -> Result<Self> {
        let user_name = normalize_user_name(user_name)?;
        let layout = LayoutTemplate::resolve(layout_id)?;

        if !(MIN_COUNTDOWN_SECONDS..=MAX_COUNTDOWN_SECONDS).contains(&countdown_seconds) {
            return Err(BoothError::Validation(format!(
                "timer must be between {} and {} seconds, got {}",
                MIN_COUNTDOWN_SECONDS, MAX_COUNTDOWN_SECONDS, countdown_seconds
            )));
        }

        Ok(Self {
            layout,
            user_name,
            countdown_seconds,
        })
    }
}

/// The live session. Exists only while the controller's slot is claimed.
struct CaptureSession {
    layout: &'static LayoutTemplate,
    user_name: String,
    frames: Vec<Frame>,
    countdown_remaining: Option<u8>,
    status: SessionStatus,
}

/// Owns the capture state machine and hands finished records to the archive.
pub struct SessionController {
    runtime: Arc<dyn BoothRuntime>,
    camera: Arc<dyn FrameSource>,
    clock: Arc<dyn Clock>,
    archive: Arc<CaptureArchive>,
    timing: SessionTiming,
    session: Mutex<Option<CaptureSession>>,
}

impl SessionController {
    pub fn new(
        runtime: Arc<dyn BoothRuntime>,
        camera: Arc<dyn FrameSource>,
        archive: Arc<CaptureArchive>,
    ) -> Self {
        Self {
            runtime,
            camera,
            clock: Arc::new(TokioClock),
            archive,
            timing: SessionTiming::default(),
            session: Mutex::new(None),
        }
    }

    /// Replace the clock (tests use a recording clock).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timing(mut self, timing: SessionTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn archive(&self) -> &Arc<CaptureArchive> {
        &self.archive
    }

    pub fn camera_name(&self) -> &str {
        self.camera.name()
    }

    pub fn status(&self) -> SessionStatus {
        self.session
            .lock()
            .as_ref()
            .map(|s| s.status)
            .unwrap_or(SessionStatus::Idle)
    }

    pub fn is_active(&self) -> bool {
        self.session.lock().is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match self.session.lock().as_ref() {
            Some(s) => SessionSnapshot {
                status: s.status,
                layout: Some(s.layout.id),
                user_name: Some(s.user_name.clone()),
                frames_captured: s.frames.len(),
                photo_count: s.layout.photo_count,
                countdown_remaining: s.countdown_remaining,
            },
            None => SessionSnapshot::idle(),
        }
    }

    /// Run one complete capture session.
    ///
    /// Returns the archived record, or:
    /// - `Validation` if the name is blank, the layout unknown or the timer out of range
    /// - `SessionActive` if another session holds the camera
    /// - `Device` if permission is denied or the camera fails; nothing is archived
    pub async fn start_session(
        &self,
        layout_id: &str,
        user_name: &str,
        countdown_seconds: u8,
    ) -> Result<Arc<CaptureRecord>> {
        let request = SessionRequest::validate(layout_id, user_name, countdown_seconds)?;
        let mut guard = self.claim(&request)?;

        tracing::info!(
            "Starting capture session: layout={}, user={}, countdown={}s",
            request.layout.id,
            request.user_name,
            request.countdown_seconds
        );

        match self.run(&mut guard, &request).await {
            Ok(record) => {
                emit_booth_event(
                    self.runtime.as_ref(),
                    BoothEvent::SessionCompleted {
                        record_id: record.id().to_string(),
                        user_name: record.user_name().to_string(),
                        layout: record.layout_id().to_string(),
                    },
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!("Capture session aborted: {}", e);
                emit_booth_event(
                    self.runtime.as_ref(),
                    BoothEvent::SessionFailed {
                        message: e.to_string(),
                        error_type: e.error_type().to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    fn claim(&self, request: &SessionRequest) -> Result<ActiveSession<'_>> {
        let mut slot = self.session.lock();
        if slot.is_some() {
            return Err(BoothError::SessionActive);
        }
        *slot = Some(CaptureSession {
            layout: request.layout,
            user_name: request.user_name.clone(),
            frames: Vec::with_capacity(request.layout.photo_count),
            countdown_remaining: None,
            status: SessionStatus::Idle,
        });
        Ok(ActiveSession {
            controller: self,
            device_claimed: false,
        })
    }

    async fn run(
        &self,
        guard: &mut ActiveSession<'_>,
        request: &SessionRequest,
    ) -> Result<Arc<CaptureRecord>> {
        let permission = self
            .runtime
            .request_permission(PermissionKind::Camera)
            .await
            .map_err(|e| BoothError::Device(format!("camera permission unavailable: {}", e)))?;
        if !permission.is_granted() {
            return Err(BoothError::Device("camera permission denied".to_string()));
        }

        guard.device_claimed = true;
        self.camera.activate().await?;

        let layout = request.layout;
        emit_booth_event(
            self.runtime.as_ref(),
            BoothEvent::SessionStarted {
                layout: layout.id.to_string(),
                photo_count: layout.photo_count,
                user_name: request.user_name.clone(),
                countdown_seconds: request.countdown_seconds,
            },
        );
        self.clock.sleep(self.timing.warmup).await;

        for shot in 0..layout.photo_count {
            self.update(|s| s.status = SessionStatus::CountingDown);

            for remaining in (1..=request.countdown_seconds).rev() {
                self.update(|s| s.countdown_remaining = Some(remaining));
                tracing::debug!("Shot {}: {}", shot + 1, remaining);
                emit_booth_event(
                    self.runtime.as_ref(),
                    BoothEvent::CountdownTick {
                        shot,
                        remaining: Some(remaining),
                    },
                );
                self.clock.sleep(self.timing.tick_interval).await;
            }

            self.update(|s| {
                s.countdown_remaining = None;
                s.status = SessionStatus::ShutterFiring;
            });
            emit_booth_event(
                self.runtime.as_ref(),
                BoothEvent::CountdownTick {
                    shot,
                    remaining: None,
                },
            );
            emit_booth_event(self.runtime.as_ref(), BoothEvent::ShutterFlash { shot });

            let frame = self.camera.acquire_frame(shot).await?;

            let mut captured = 0;
            self.update(|s| {
                s.frames.push(frame);
                captured = s.frames.len();
            });
            tracing::debug!("Captured frame {}/{}", captured, layout.photo_count);
            emit_booth_event(
                self.runtime.as_ref(),
                BoothEvent::FrameCaptured {
                    captured,
                    total: layout.photo_count,
                },
            );

            self.clock.sleep(self.timing.post_shot_interval).await;
        }

        let frames = {
            let mut slot = self.session.lock();
            let session = slot
                .as_mut()
                .ok_or_else(|| BoothError::Internal("session slot vanished".to_string()))?;
            session.status = SessionStatus::Complete;
            std::mem::take(&mut session.frames)
        };

        let record = Arc::new(CaptureRecord::finalize(
            self.unique_record_id(),
            frames,
            layout,
            &request.user_name,
        )?);
        self.archive.add(record.clone());

        tracing::info!(
            "Capture session complete: {} ({} frames)",
            record.id(),
            record.images().len()
        );
        Ok(record)
    }

    fn update(&self, f: impl FnOnce(&mut CaptureSession)) {
        if let Some(session) = self.session.lock().as_mut() {
            f(session);
        }
    }

    /// Short id that is not yet in the archive.
    fn unique_record_id(&self) -> String {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_record_id();
            if !self.archive.contains(&id) {
                return id;
            }
        }
        tracing::warn!("Record id space crowded, using extended id");
        loop {
            let id = format!("{}{}", generate_record_id(), generate_record_id());
            if !self.archive.contains(&id) {
                return id;
            }
        }
    }
}

/// Holds the session slot. Dropping it releases the camera and returns the
/// controller to `Idle`.
struct ActiveSession<'a> {
    controller: &'a SessionController,
    device_claimed: bool,
}

impl Drop for ActiveSession<'_> {
    fn drop(&mut self) {
        if self.device_claimed {
            self.controller.camera.release();
        }
        if let Some(session) = self.controller.session.lock().take() {
            if session.status != SessionStatus::Complete {
                tracing::info!(
                    "Discarding session with {} of {} frame(s)",
                    session.frames.len(),
                    session.layout.photo_count
                );
            }
        }
    }
}
