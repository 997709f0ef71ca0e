//! Rendering policy for the form.
//!
//! [`render`] is a pure function of the form state. It decides which regions
//! are visible; [`View::to_html`] and [`View::to_text`] only lay them out.

use crate::form::QrForm;
use crate::theme::Theme;

pub const TITLE: &str = "QR Code Generator";
pub const PLACEHOLDER: &str = "Enter URL like https://example.com";
pub const SUBMIT_LABEL: &str = "Generate QR Code";
pub const BUSY_LABEL: &str = "Generating...";
pub const IMAGE_ALT: &str = "QR Code";
pub const IMAGE_LOAD_FAILURE: &str = "Failed to load QR code image.";

/// A visible region of the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading { text: &'static str },
    Input { value: String, placeholder: &'static str },
    Button { label: &'static str, disabled: bool },
    Message { text: String },
    Error { text: String },
    Image { src: String, alt: &'static str, width: u32, height: u32 },
    ImageError { text: &'static str },
}

/// The rendered surface, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub nodes: Vec<Node>,
    theme: &'static Theme,
}

/// Decide what the form shows.
///
/// Priority: a message suppresses the image, an error comes next, then the
/// image. The image-load failure paragraph is independent of all three.
pub fn render(form: &QrForm, theme: &'static Theme) -> View {
    let loading = form.is_loading();
    let mut nodes = vec![
        Node::Heading { text: TITLE },
        Node::Input {
            value: form.url().to_string(),
            placeholder: PLACEHOLDER,
        },
        Node::Button {
            label: if loading { BUSY_LABEL } else { SUBMIT_LABEL },
            disabled: loading,
        },
    ];

    let message = form.message().filter(|m| !m.is_empty());
    let error = form.error().filter(|e| !e.is_empty());
    let image = form.qr_code_url().filter(|src| !src.is_empty());

    if let Some(text) = message {
        nodes.push(Node::Message {
            text: text.to_string(),
        });
    } else if let Some(text) = error {
        nodes.push(Node::Error {
            text: text.to_string(),
        });
    } else if let Some(src) = image {
        nodes.push(Node::Image {
            src: src.to_string(),
            alt: IMAGE_ALT,
            width: theme.image_box.width,
            height: theme.image_box.height,
        });
    }

    if form.image_load_failed() {
        nodes.push(Node::ImageError {
            text: IMAGE_LOAD_FAILURE,
        });
    }

    View { nodes, theme }
}

impl View {
    /// Source of the displayed image, if one is displayed
    pub fn image(&self) -> Option<&str> {
        self.nodes.iter().find_map(|n| match n {
            Node::Image { src, .. } => Some(src.as_str()),
            _ => None,
        })
    }

    pub fn message(&self) -> Option<&str> {
        self.nodes.iter().find_map(|n| match n {
            Node::Message { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn error(&self) -> Option<&str> {
        self.nodes.iter().find_map(|n| match n {
            Node::Error { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn input_value(&self) -> Option<&str> {
        self.nodes.iter().find_map(|n| match n {
            Node::Input { value, .. } => Some(value.as_str()),
            _ => None,
        })
    }

    /// Label and disabled state of the submit control
    pub fn button(&self) -> Option<(&'static str, bool)> {
        self.nodes.iter().find_map(|n| match n {
            Node::Button { label, disabled } => Some((*label, *disabled)),
            _ => None,
        })
    }

    pub fn has_image_error(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, Node::ImageError { .. }))
    }

    /// Lay the view out as a standalone HTML document with inline styles
    pub fn to_html(&self) -> String {
        let t = self.theme;
        let mut body = String::new();
        let mut form_inner = String::new();

        for node in &self.nodes {
            match node {
                Node::Heading { text } => body.push_str(&format!(
                    "<h1 style=\"{}\">{}</h1>\n",
                    t.title.to_css(),
                    escape_html(text)
                )),
                Node::Input { value, placeholder } => form_inner.push_str(&format!(
                    "<input type=\"text\" name=\"url\" value=\"{}\" placeholder=\"{}\" style=\"{}\">\n",
                    escape_html(value),
                    escape_html(placeholder),
                    t.input.to_css()
                )),
                Node::Button { label, disabled } => {
                    form_inner.push_str(&format!(
                        "<button type=\"submit\" style=\"{}\"{}>{}</button>\n",
                        t.button.to_css(),
                        if *disabled { " disabled" } else { "" },
                        escape_html(label)
                    ));
                    body.push_str(&format!(
                        "<form method=\"post\" style=\"{}\">\n{}</form>\n",
                        t.form.to_css(),
                        form_inner
                    ));
                }
                Node::Message { text } => body.push_str(&format!(
                    "<p class=\"message\" style=\"{}\">{}</p>\n",
                    t.message.to_css(),
                    escape_html(text)
                )),
                Node::Error { text } => body.push_str(&format!(
                    "<p class=\"error\" style=\"{}\">{}</p>\n",
                    t.error.to_css(),
                    escape_html(text)
                )),
                Node::Image {
                    src,
                    alt,
                    width,
                    height,
                } => body.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\" style=\"{}\">\n",
                    escape_html(src),
                    escape_html(alt),
                    width,
                    height,
                    t.image.to_css()
                )),
                Node::ImageError { text } => body.push_str(&format!(
                    "<p class=\"image-error\" style=\"{}\">{}</p>\n",
                    t.image_error.to_css(),
                    escape_html(text)
                )),
            }
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<div style=\"{}\">\n{}</div>\n</body>\n</html>\n",
            TITLE,
            t.container.to_css(),
            body
        )
    }

    /// A plain-text snapshot, one region per line
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            let line = match node {
                Node::Heading { text } => text.to_string(),
                Node::Input { value, placeholder } => {
                    if value.is_empty() {
                        format!("[ {} ]", placeholder)
                    } else {
                        format!("[ {} ]", value)
                    }
                }
                Node::Button { label, disabled } => {
                    if *disabled {
                        format!("<{}> (disabled)", label)
                    } else {
                        format!("<{}>", label)
                    }
                }
                Node::Message { text } => format!("message: {}", text),
                Node::Error { text } => format!("error: {}", text),
                Node::Image {
                    src, width, height, ..
                } => format!("image: {} ({}x{})", src, width, height),
                Node::ImageError { text } => format!("image error: {}", text),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
