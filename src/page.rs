//! A headless page hosting the form.
//!
//! The page plays the browser's part: it delivers keystrokes, runs the
//! submission against its backend, loads the image the view ends up showing
//! and reports a load failure back to the form.

use crate::backend::QrBackend;
use crate::form::{QrForm, SubmitStatus};
use crate::theme::{Theme, DEFAULT_THEME};
use crate::view::{self, View};
use crate::FormConfig;
use log::warn;
use std::sync::Arc;

type OnRenderHandler = Arc<dyn Fn(&View) + Send + Sync>;

/// Form plus backend plus rendering surface
pub struct Page<B> {
    backend: B,
    form: QrForm,
    config: FormConfig,
    theme: &'static Theme,
    image: Option<Vec<u8>>,
    on_render: Option<OnRenderHandler>,
}

impl<B: QrBackend> Page<B> {
    pub fn new(backend: B, config: FormConfig) -> Self {
        Self {
            backend,
            form: QrForm::new(config.reset_image_error_on_submit),
            config,
            theme: &DEFAULT_THEME,
            image: None,
            on_render: None,
        }
    }

    /// Use a different style table
    pub fn with_theme(mut self, theme: &'static Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn form(&self) -> &QrForm {
        &self.form
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Type `text` into the input, one keystroke per character
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            let mut value = self.form.url().to_string();
            value.push(c);
            self.form.set_url(value);
        }
        self.emit_render();
    }

    /// Replace the whole input value at once (paste, autofill)
    pub fn set_input(&mut self, value: &str) {
        self.form.set_url(value);
        self.emit_render();
    }

    /// Submit the form, then load the image if the result shows one
    pub fn submit(&mut self) -> SubmitStatus {
        let Some(submission) = self.form.begin_submit() else {
            return SubmitStatus::Busy;
        };
        self.emit_render();

        let result = self.backend.generate(submission.url());
        self.form.finish_submit(submission, result);
        self.emit_render();

        self.image = None;
        if self.config.enable_images {
            self.load_image();
        }
        SubmitStatus::Completed
    }

    fn load_image(&mut self) {
        let view = self.view();
        let Some(src) = view.image() else {
            return;
        };
        match self.backend.load_image(src) {
            Ok(bytes) => self.image = Some(bytes),
            Err(e) => {
                warn!("QR code image {} failed to load: {}", src, e);
                self.form.on_image_load_error();
                self.emit_render();
            }
        }
    }

    /// Bytes of the displayed image, once loaded
    pub fn image_bytes(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    pub fn view(&self) -> View {
        view::render(&self.form, self.theme)
    }

    pub fn render_html(&self) -> String {
        self.view().to_html()
    }

    pub fn render_text(&self) -> String {
        self.view().to_text()
    }

    /// Register a callback invoked with the view after every state change
    pub fn on_render<F>(&mut self, cb: F)
    where
        F: Fn(&View) + Send + Sync + 'static,
    {
        self.on_render = Some(Arc::new(cb));
    }

    fn emit_render(&self) {
        if let Some(cb) = &self.on_render {
            cb(&self.view());
        }
    }
}
