//! Checks on the HTML surface, parsed back with scraper

mod common;

use qrform::backend::GenerateResponse;
use qrform::theme::{ImageBox, Style, Theme, DEFAULT_THEME};
use qrform::{FormConfig, MemoryBackend, Page};
use scraper::{Html, Selector};

fn compact_theme() -> &'static Theme {
    Box::leak(Box::new(Theme {
        error: Style(&[("color", "crimson"), ("margin-top", "8px")]),
        image_box: ImageBox {
            width: 128,
            height: 128,
        },
        ..DEFAULT_THEME
    }))
}

fn select_all(html: &str, css: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(css).unwrap();
    doc.select(&sel).map(|e| e.html()).collect()
}

fn attr(html: &str, css: &str, name: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(css).unwrap();
    doc.select(&sel)
        .next()
        .and_then(|e| e.value().attr(name).map(str::to_string))
}

fn text(html: &str, css: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(css).unwrap();
    doc.select(&sel).next().map(|e| e.text().collect::<String>())
}

fn page() -> Page<MemoryBackend> {
    let backend = MemoryBackend::new()
        .with_reply("https://ok.io", GenerateResponse::new("https://cdn.io/qr/ok.png"))
        .with_reply(
            "https://dup.io",
            GenerateResponse::new("https://cdn.io/qr/ok.png").with_message("QR code already exists"),
        )
        .with_reply("https://broken.io", GenerateResponse::new("https://cdn.io/qr/gone.png"))
        .with_status("https://down.io", 500)
        .with_image("https://cdn.io/qr/ok.png", common::png());
    Page::new(backend, FormConfig::default())
}

#[test]
fn idle_page_has_title_input_and_enabled_button() {
    let html = page().render_html();
    assert_eq!(text(&html, "h1").as_deref(), Some("QR Code Generator"));
    assert_eq!(
        attr(&html, "input", "placeholder").as_deref(),
        Some("Enter URL like https://example.com")
    );
    assert_eq!(text(&html, "button").as_deref(), Some("Generate QR Code"));
    assert!(select_all(&html, "button[disabled]").is_empty());
    assert!(select_all(&html, "img").is_empty());
    assert!(select_all(&html, "p").is_empty());
}

#[test]
fn input_value_follows_typing() {
    let mut page = page();
    page.type_text("https://exa");
    assert_eq!(attr(&page.render_html(), "input", "value").as_deref(), Some("https://exa"));
    page.type_text("mple.com/?a=1&b=\"2\"");
    assert_eq!(
        attr(&page.render_html(), "input", "value").as_deref(),
        Some("https://example.com/?a=1&b=\"2\"")
    );
}

#[test]
fn success_renders_sized_image() {
    let mut page = page();
    page.type_text("https://ok.io");
    let _ = page.submit();

    let html = page.render_html();
    assert_eq!(attr(&html, "img", "src").as_deref(), Some("https://cdn.io/qr/ok.png"));
    assert_eq!(attr(&html, "img", "alt").as_deref(), Some("QR Code"));
    assert_eq!(attr(&html, "img", "width").as_deref(), Some("256"));
    assert_eq!(attr(&html, "img", "height").as_deref(), Some("256"));
    assert!(select_all(&html, "p.error").is_empty());
}

#[test]
fn message_paragraph_replaces_image() {
    let mut page = page();
    page.type_text("https://dup.io");
    let _ = page.submit();

    let html = page.render_html();
    assert_eq!(text(&html, "p.message").as_deref(), Some("QR code already exists"));
    assert!(select_all(&html, "img").is_empty());
    assert!(attr(&html, "p.message", "style")
        .unwrap()
        .contains("margin-top: 20px"));
}

#[test]
fn failure_paragraph_is_styled_as_error() {
    let mut page = page();
    page.type_text("https://down.io");
    let _ = page.submit();

    let html = page.render_html();
    assert_eq!(
        text(&html, "p.error").as_deref(),
        Some("Failed to generate QR Code. Please try again.")
    );
    assert!(attr(&html, "p.error", "style").unwrap().contains("color: red"));
}

#[test]
fn broken_image_keeps_img_and_adds_notice() {
    let mut page = page();
    page.type_text("https://broken.io");
    let _ = page.submit();

    let html = page.render_html();
    assert_eq!(select_all(&html, "img").len(), 1);
    assert_eq!(
        text(&html, "p.image-error").as_deref(),
        Some("Failed to load QR code image.")
    );
}

#[test]
fn custom_theme_changes_styles_and_image_box() {
    let mut page = page().with_theme(compact_theme());
    page.type_text("https://ok.io");
    let _ = page.submit();

    let html = page.render_html();
    assert_eq!(attr(&html, "img", "width").as_deref(), Some("128"));
    assert_eq!(attr(&html, "img", "height").as_deref(), Some("128"));
    assert!(page.image_bytes().is_some());

    page.set_input("https://down.io");
    let _ = page.submit();
    let style = attr(&page.render_html(), "p.error", "style").unwrap();
    assert!(style.contains("color: crimson"));
    assert!(!style.contains("color: red"));
}
