//! Social share pages and preview images for stories and AMAs.
use derive_more::Display;

pub const PREVIEW_WIDTH: u32 = 1200;
pub const PREVIEW_HEIGHT: u32 = 630;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ShareTarget {
    #[display("story #{_0}")]
    Story(u64),
    #[display("AMA #{_0}")]
    Ama(u64),
}

impl ShareTarget {
    /// Route of the target inside the app.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::Story(id) => format!("/story/{id}"),
            Self::Ama(id) => format!("/ama/{id}"),
        }
    }

    fn headline(self) -> &'static str {
        match self {
            Self::Story(_) => "An anonymous story on BaseStory",
            Self::Ama(_) => "Ask me anything, anonymously",
        }
    }

    fn tagline(self) -> &'static str {
        match self {
            Self::Story(_) => "Read it and leave a tip in USDC.",
            Self::Ama(_) => "Send a question. Tips go straight to the creator.",
        }
    }
}

#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
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

/// Static preview card used as the `og:image`.
#[must_use]
pub fn preview_svg(target: ShareTarget) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<rect width="{w}" height="{h}" fill="#0052ff"/>
<text x="80" y="260" font-family="sans-serif" font-size="72" font-weight="bold" fill="#ffffff">{headline}</text>
<text x="80" y="360" font-family="sans-serif" font-size="40" fill="#dbe6ff">{tagline}</text>
<text x="80" y="540" font-family="sans-serif" font-size="36" fill="#ffffff">{label}</text>
</svg>"##,
        w = PREVIEW_WIDTH,
        h = PREVIEW_HEIGHT,
        headline = escape_html(target.headline()),
        tagline = escape_html(target.tagline()),
        label = escape_html(&target.to_string()),
    )
}

/// HTML page carrying social preview metadata that redirects browsers to the app.
#[must_use]
pub fn share_page_html(target: ShareTarget, app_url: &str, image_url: &str) -> String {
    let app_url = app_url.trim_end_matches('/');
    let destination = escape_html(&format!("{app_url}{}", target.path()));
    let title = escape_html(target.headline());
    let description = escape_html(target.tagline());
    let image = escape_html(image_url);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<meta name="description" content="{description}">
<meta property="og:type" content="website">
<meta property="og:title" content="{title}">
<meta property="og:description" content="{description}">
<meta property="og:image" content="{image}">
<meta property="og:image:width" content="{PREVIEW_WIDTH}">
<meta property="og:image:height" content="{PREVIEW_HEIGHT}">
<meta property="og:url" content="{destination}">
<meta name="twitter:card" content="summary_large_image">
<meta name="twitter:title" content="{title}">
<meta name="twitter:description" content="{description}">
<meta name="twitter:image" content="{image}">
<meta http-equiv="refresh" content="0; url={destination}">
</head>
<body>
<p>Redirecting to <a href="{destination}">{destination}</a></p>
</body>
</html>
"#
    )
}
