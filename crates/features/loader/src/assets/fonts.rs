use crate::document::Document;
use stager_domain::manifest::{FontSpec, LoaderConfig};
use std::fmt::Write;
use tracing::info;

/// One `@font-face` rule per font, in configuration order.
#[must_use]
pub fn font_face_css(config: &LoaderConfig) -> String {
    config.fonts.iter().fold(String::new(), |mut css, font| {
        push_font_face(&mut css, config, font);
        css
    })
}

fn push_font_face(css: &mut String, config: &LoaderConfig, font: &FontSpec) {
    let _ = write!(
        css,
        "@font-face {{\n    font-family: '{name}';\n    src: url('{url}') format('truetype');\n    \
         font-weight: {weight};\n    font-style: {style};\n    font-display: swap;\n}}\n",
        name = font.name,
        url = config.asset_url(&font.src),
        weight = font.weight(),
        style = font.style(),
    );
}

/// Injects the font rules as one style block. Nothing is awaited; returns the font count.
pub fn load_fonts(document: &dyn Document, config: &LoaderConfig) -> usize {
    if config.fonts.is_empty() {
        return 0;
    }

    document.inject_style_block(&font_face_css(config));
    info!(fonts = config.fonts.len(), "Fonts declared");
    config.fonts.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_face_rules() {
        let mut config = LoaderConfig::new("https://cdn.test");
        config.fonts = vec![
            FontSpec { name: "Inter".into(), src: "/inter.ttf".into(), weight: None, style: None },
            FontSpec {
                name: "Inter".into(),
                src: "/inter-bold.ttf".into(),
                weight: Some("700".into()),
                style: Some("italic".into()),
            },
        ];

        let css = font_face_css(&config);

        assert_eq!(css.matches("@font-face").count(), 2);
        assert!(css.contains("src: url('https://cdn.test/inter.ttf') format('truetype');"));
        assert!(css.contains("font-weight: normal;"));
        assert!(css.contains("font-weight: 700;"));
        assert!(css.contains("font-style: italic;"));
        assert_eq!(css.matches("font-display: swap;").count(), 2);
    }

    #[test]
    fn test_no_fonts_no_rules() {
        assert!(font_face_css(&LoaderConfig::new("https://cdn.test")).is_empty());
    }
}
