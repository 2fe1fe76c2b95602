use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;

use crate::dashboard::{Card, Side};

// ---------------------------------------------------------------------------
// Logo
// ---------------------------------------------------------------------------

/// Header image, kept as raw bytes so it can be inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl Logo {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading logo {}", path.display()))?;
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("svg") => "image/svg+xml",
            _ => "image/webp",
        };
        Ok(Logo { bytes, mime })
    }

    /// `data:` URI with the image base64-encoded.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::prelude::BASE64_STANDARD.encode(&self.bytes)
        )
    }

    /// URI under which egui caches the decoded image.
    pub fn egui_uri(&self) -> &'static str {
        match self.mime {
            "image/png" => "bytes://logo.png",
            "image/jpeg" => "bytes://logo.jpg",
            "image/svg+xml" => "bytes://logo.svg",
            _ => "bytes://logo.webp",
        }
    }
}

// ---------------------------------------------------------------------------
// Markup
// ---------------------------------------------------------------------------

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const CARD_STYLE: &str = "border:1px solid #ddd; border-radius:10px; padding:10px; margin:10px 0; \
    height:150px; display:flex; flex-direction:column; justify-content:space-between;";
const MAPS_STYLE: &str =
    "display: inline-block; padding: 5px 10px; color: #007bff; text-decoration: none;";
const SITE_STYLE: &str =
    "display: inline-block; padding: 5px 10px; color: #28a745; text-decoration: none;";

/// Markup of a single business card.
pub fn card_html(card: &Card) -> String {
    let email = match (card.mailto(), &card.email) {
        (Some(href), Some(addr)) => {
            format!(r#"<a href="{}">{}</a>"#, escape(&href), escape(addr))
        }
        _ => card.email_label().to_string(),
    };
    let maps = match &card.maps_url {
        Some(url) => format!(
            r#"<a href="{}" target="_blank" style="{MAPS_STYLE}">Ver en Maps</a>"#,
            escape(url)
        ),
        None => r#"<span style="visibility:hidden;">Ver en Maps</span>"#.to_string(),
    };
    let site = match &card.website {
        Some(url) => format!(
            r#"<a href="{}" target="_blank" style="{SITE_STYLE}">Ver sitio web</a>"#,
            escape(url)
        ),
        None => r#"<span style="visibility:hidden;">Ver sitio web</span>"#.to_string(),
    };

    format!(
        r#"<div style="{CARD_STYLE}">
    <div>
        <strong>{name}</strong><br>
        <em>Correo:</em> {email}<br>
    </div>
    <div style="margin-top:auto;">
        {maps}
        {site}
    </div>
</div>
"#,
        name = escape(&card.name),
    )
}

/// Standalone page: centred logo, title, and the cards in two columns.
pub fn page_html(title: &str, logo: Option<&Logo>, cards: &[Card]) -> String {
    let title = escape(title);
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body style=\"max-width:960px; margin:0 auto; \
         font-family:sans-serif;\">\n"
    );
    if let Some(logo) = logo {
        html.push_str(&format!(
            "<div style=\"display: flex; justify-content: center; align-items: center;\"><img src=\"{}\"></div>\n",
            logo.data_uri()
        ));
    }
    html.push_str(&format!("<h1>{title}</h1>\n<h2>Empresas</h2>\n"));
    html.push_str("<div style=\"display:flex; gap:20px;\">\n");
    for side in [Side::Left, Side::Right] {
        html.push_str("<div style=\"flex:1;\">\n");
        for card in cards.iter().filter(|c| c.side == side) {
            html.push_str(&card_html(card));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}
