use crate::backend::{GenerateResponse, QrBackend};
use crate::form::{QrForm, Submission, SubmitStatus};
use crate::theme::DEFAULT_THEME;
use crate::view::{self, View};
use crate::{Error, FormConfig, Result};
use log::{debug, warn};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Generate(String, oneshot::Sender<Result<GenerateResponse>>),
    LoadImage(String, oneshot::Sender<Result<Vec<u8>>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly session backed by a dedicated worker thread.
///
/// The worker thread owns the backend and executes requests sent from async
/// tasks, so a blocking backend never runs inside the async runtime.
#[derive(Clone)]
pub struct Session {
    cmd_tx: Sender<Command>,
    config: FormConfig,
}

/// A mounted form. Clones share the same state.
#[derive(Clone)]
pub struct FormHandle {
    state: Arc<Mutex<Option<QrForm>>>,
    cmd_tx: Sender<Command>,
    enable_images: bool,
}

impl Session {
    /// Create a session talking HTTP to `config.base_url`
    #[cfg(feature = "http")]
    pub async fn connect(config: Option<FormConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();
        let backend_config = config.clone();
        Self::with_backend(move || crate::http::HttpBackend::new(backend_config), config).await
    }

    /// Create a session whose backend is built by `factory` on the worker
    /// thread.
    pub async fn with_backend<B, F>(factory: F, config: FormConfig) -> Result<Self>
    where
        B: QrBackend + 'static,
        F: FnOnce() -> Result<B> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        thread::spawn(move || {
            let backend = match factory() {
                Ok(b) => b,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };
            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Generate(url, resp) => {
                        let _ = resp.send(backend.generate(&url));
                    }
                    Command::LoadImage(src, resp) => {
                        let _ = resp.send(backend.load_image(&src));
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(Ok(()));
                        break;
                    }
                }
            }
        });

        init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx, config })
    }

    /// Mount a fresh form on this session
    pub fn mount(&self) -> FormHandle {
        FormHandle {
            state: Arc::new(Mutex::new(Some(QrForm::new(
                self.config.reset_image_error_on_submit,
            )))),
            cmd_tx: self.cmd_tx.clone(),
            enable_images: self.config.enable_images,
        }
    }

    /// Shutdown the background worker
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}

impl FormHandle {
    fn lock(&self) -> MutexGuard<'_, Option<QrForm>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the input value. Ignored once unmounted.
    pub fn set_url(&self, value: impl Into<String>) {
        if let Some(form) = self.lock().as_mut() {
            form.set_url(value);
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().as_ref().is_some_and(QrForm::is_loading)
    }

    /// Copy of the current form state
    pub fn snapshot(&self) -> Option<QrForm> {
        self.lock().clone()
    }

    pub fn view(&self) -> Option<View> {
        self.lock()
            .as_ref()
            .map(|form| view::render(form, &DEFAULT_THEME))
    }

    /// Drop the form state. In-flight responses will not be applied.
    pub fn unmount(&self) {
        self.lock().take();
    }

    /// Submit the current input and wait for the backend.
    ///
    /// The form stays usable while the request is in flight; a second submit
    /// in that window returns [`SubmitStatus::Busy`] without a request.
    /// Dropping the returned future before it resolves settles the
    /// submission as failed, so the form never stays loading.
    pub async fn submit(&self) -> Result<SubmitStatus> {
        let mut in_flight = {
            let mut guard = self.lock();
            let Some(form) = guard.as_mut() else {
                return Ok(SubmitStatus::Unmounted);
            };
            match form.begin_submit() {
                Some(s) => InFlight {
                    handle: self,
                    submission: Some(s),
                },
                None => return Ok(SubmitStatus::Busy),
            }
        };

        let url = in_flight.url().to_string();
        let (tx, rx) = oneshot::channel();
        let result = match self.cmd_tx.send(Command::Generate(url, tx)) {
            Ok(()) => rx
                .await
                .unwrap_or_else(|e| Err(Error::Other(format!("Generate canceled: {}", e)))),
            Err(_) => Err(Error::Other("session worker is closed".into())),
        };

        let src = {
            let mut guard = self.lock();
            let submission = in_flight.take();
            let Some(form) = guard.as_mut() else {
                return Ok(SubmitStatus::Unmounted);
            };
            if let Some(submission) = submission {
                form.finish_submit(submission, result);
            }
            view::render(form, &DEFAULT_THEME).image().map(str::to_string)
        };

        if let Some(src) = src.filter(|_| self.enable_images) {
            self.load_image(src).await;
        }
        Ok(SubmitStatus::Completed)
    }

    /// Load `src` on the worker; a failure only flags the image on screen
    async fn load_image(&self, src: String) {
        let (tx, rx) = oneshot::channel();
        let result = match self.cmd_tx.send(Command::LoadImage(src.clone(), tx)) {
            Ok(()) => rx
                .await
                .unwrap_or_else(|e| Err(Error::Other(format!("LoadImage canceled: {}", e)))),
            Err(_) => Err(Error::Other("session worker is closed".into())),
        };

        if let Err(e) = result {
            warn!("QR code image {} failed to load: {}", src, e);
            let mut guard = self.lock();
            // Only flag the image that is still on screen
            if let Some(form) = guard.as_mut() {
                if form.qr_code_url() == Some(src.as_str()) && !form.is_loading() {
                    form.on_image_load_error();
                }
            }
        }
    }
}

/// A submission whose response has not been applied yet.
///
/// Dropped while still holding the submission (the `submit` future was
/// cancelled), it settles the form with a failure.
struct InFlight<'a> {
    handle: &'a FormHandle,
    submission: Option<Submission>,
}

impl InFlight<'_> {
    fn url(&self) -> &str {
        self.submission.as_ref().map_or("", Submission::url)
    }

    fn take(&mut self) -> Option<Submission> {
        self.submission.take()
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let Some(submission) = self.submission.take() else {
            return;
        };
        debug!("submission of {:?} cancelled before completion", submission.url());
        if let Some(form) = self.handle.lock().as_mut() {
            form.finish_submit(
                submission,
                Err(Error::Other("submission cancelled".into())),
            );
        }
    }
}
