//! Static style table for the rendered form.
//!
//! Styles are read-only process-wide data. The renderer borrows a [`Theme`]
//! and never mutates it.

/// A list of CSS declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style(pub &'static [(&'static str, &'static str)]);

impl Style {
    /// Render as an inline `style` attribute value
    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(prop, value)| format!("{}: {};", prop, value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn get(&self, prop: &str) -> Option<&'static str> {
        self.0.iter().find(|(p, _)| *p == prop).map(|(_, v)| *v)
    }
}

/// Fixed display box for the QR image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBox {
    pub width: u32,
    pub height: u32,
}

/// Styles for each region of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub container: Style,
    pub title: Style,
    pub form: Style,
    pub input: Style,
    pub button: Style,
    pub message: Style,
    pub error: Style,
    pub image: Style,
    pub image_error: Style,
    pub image_box: ImageBox,
}

pub static DEFAULT_THEME: Theme = Theme {
    container: Style(&[
        ("min-height", "100vh"),
        ("display", "flex"),
        ("flex-direction", "column"),
        ("align-items", "center"),
        ("justify-content", "center"),
        ("background-color", "#121212"),
        ("color", "white"),
    ]),
    title: Style(&[
        ("margin", "0"),
        ("line-height", "1.15"),
        ("font-size", "4rem"),
        ("text-align", "center"),
    ]),
    form: Style(&[
        ("display", "flex"),
        ("flex-direction", "column"),
        ("align-items", "center"),
    ]),
    input: Style(&[
        ("padding", "10px"),
        ("border-radius", "5px"),
        ("border", "none"),
        ("margin-top", "20px"),
        ("width", "300px"),
        ("color", "#121212"),
    ]),
    button: Style(&[
        ("padding", "10px 20px"),
        ("margin-top", "20px"),
        ("border", "none"),
        ("border-radius", "5px"),
        ("background-color", "#0070f3"),
        ("color", "white"),
        ("cursor", "pointer"),
    ]),
    message: Style(&[("color", "#2ecc71"), ("margin-top", "20px")]),
    error: Style(&[("color", "red"), ("margin-top", "20px")]),
    image: Style(&[("margin-top", "20px"), ("object-fit", "contain")]),
    image_error: Style(&[("color", "orange"), ("margin-top", "10px")]),
    image_box: ImageBox {
        width: 256,
        height: 256,
    },
};
