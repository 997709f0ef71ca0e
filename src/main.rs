use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use qrform::{FormConfig, SubmitStatus};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Html,
}

/// Submit URLs to a QR code generation service and render the result
#[derive(Debug, Parser)]
#[command(name = "qrform", version, about)]
struct Args {
    /// URLs to submit, in order. Read one per line from stdin when omitted.
    urls: Vec<String>,

    /// Origin of the generation backend
    #[arg(long, env = "QRFORM_BASE_URL", default_value = qrform::DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 30000)]
    timeout_ms: u64,

    /// Extra request header, as NAME:VALUE (repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE")]
    headers: Vec<String>,

    /// Do not load the returned image
    #[arg(long)]
    no_images: bool,

    /// Keep an image-load failure visible across submissions
    #[arg(long)]
    keep_image_error: bool,

    /// Output format of the rendered form
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write the final render to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Save the last loaded QR image to a file
    #[arg(long)]
    save_image: Option<PathBuf>,

    /// Print every intermediate render (loading, result, image failure)
    #[arg(long)]
    trace: bool,
}

fn parse_headers(raw: &[String]) -> anyhow::Result<HashMap<String, String>> {
    let mut headers = HashMap::new();
    for h in raw {
        let Some((name, value)) = h.split_once(':') else {
            bail!("header {:?} is not in NAME:VALUE form", h);
        };
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }
    Ok(headers)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = FormConfig {
        base_url: args.base_url.clone(),
        timeout_ms: args.timeout_ms,
        headers: parse_headers(&args.headers)?,
        enable_images: !args.no_images,
        reset_image_error_on_submit: !args.keep_image_error,
        ..Default::default()
    };

    let mut page = qrform::new_page(config).context("failed to set up the form client")?;
    if args.trace {
        page.on_render(|view| {
            eprintln!("{}", view.to_text());
        });
    }

    let urls: Vec<String> = if args.urls.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("failed to read URLs from stdin")?
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    } else {
        args.urls.clone()
    };

    for url in &urls {
        page.set_input("");
        page.type_text(url);
        if page.submit() == SubmitStatus::Busy {
            log::warn!("submission for {} skipped: request already in flight", url);
        }
    }

    let rendered = match args.format {
        Format::Text => page.render_text(),
        Format::Html => page.render_html(),
    };
    match &args.output {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut out = io::stdout().lock();
            out.write_all(rendered.as_bytes())?;
            out.flush()?;
        }
    }

    if let Some(path) = &args.save_image {
        match page.image_bytes() {
            Some(bytes) => std::fs::write(path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => log::warn!("no image loaded; {} not written", path.display()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_parse_name_value_pairs() {
        let headers = parse_headers(&["X-Api-Key: secret".into(), "Accept:application/json".into()])
            .unwrap();
        assert_eq!(headers.get("X-Api-Key").map(String::as_str), Some("secret"));
        assert_eq!(headers.get("Accept").map(String::as_str), Some("application/json"));
        assert!(parse_headers(&["no-colon".into()]).is_err());
    }

    #[test]
    fn args_default_to_localhost_backend() {
        let args = Args::parse_from(["qrform", "https://example.com"]);
        assert_eq!(args.urls, vec!["https://example.com".to_string()]);
        assert!(matches!(args.format, Format::Text));
        assert!(!args.no_images);
    }
}
