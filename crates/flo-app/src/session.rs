//! Shared plumbing for import and export sessions.

use std::time::Instant;

use flo_core::CancelToken;
use flo_model::Component;

use crate::config::CodecConfig;
use crate::error::{AppError, AppResult};
use crate::progress::{ProgressEvent, Stage};

/// What every session call needs besides its source and sink.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub config: CodecConfig,
    pub cancel: Option<CancelToken>,
}

impl SessionOptions {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

pub type ProgressCallback<'a> = Option<&'a mut dyn FnMut(ProgressEvent)>;

pub(crate) struct Tracker<'a> {
    progress: ProgressCallback<'a>,
    cancel: Option<CancelToken>,
    started: Instant,
}

impl<'a> Tracker<'a> {
    pub fn new(options: &SessionOptions, progress: ProgressCallback<'a>) -> Self {
        Self {
            progress,
            cancel: options.cancel.clone(),
            started: Instant::now(),
        }
    }

    pub fn emit(&mut self, component: Option<Component>, stage: Stage) {
        if let Some(cb) = self.progress.as_deref_mut() {
            cb(ProgressEvent::stage(
                component,
                stage,
                self.started.elapsed().as_secs_f64(),
            ));
        }
    }

    pub fn check_cancel(&self) -> AppResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(AppError::Cancelled),
            _ => Ok(()),
        }
    }
}
