//! Deterministic HTML renderer.
//!
//! No remote calls: formatted notes plus a style options bag map to a
//! complete HTML document through fixed CSS templates keyed by the option
//! enums. Identical input produces byte-identical output.
//!
//! Two heuristics are documented contracts, not bugs, because no better
//! signal exists in the data model:
//! - heading level is inferred from content length when the model supplied
//!   none (short headings render shallower/larger)
//! - bullet decoration is chosen by substring match on the content

use noteflow_core::defaults::{HEADING_H2_MAX_CHARS, HEADING_H3_MAX_CHARS};
use noteflow_core::{
    DesignedLayout, Diagram, FormattedNotes, FormattedSection, NoteGenOptions, SectionType,
};

/// Font stacks keyed by the `fontStyle` option.
fn font_stack(font_style: &str) -> (&'static str, &'static str) {
    match font_style {
        "handwritten" => (
            "'Segoe Print', 'Bradley Hand', cursive",
            "'Segoe Print', 'Comic Sans MS', cursive",
        ),
        "elegant" => ("Georgia, 'Times New Roman', serif", "Georgia, serif"),
        "technical" => (
            "'Courier New', Courier, monospace",
            "'Courier New', monospace",
        ),
        // "clean" and anything unrecognized
        _ => (
            "'Helvetica Neue', Helvetica, Arial, sans-serif",
            "'Helvetica Neue', Arial, sans-serif",
        ),
    }
}

/// (page background, card background, heading color, body color, accent)
/// keyed by the `colorScheme` option.
fn palette(color_scheme: &str) -> (&'static str, &'static str, &'static str, &'static str, &'static str) {
    match color_scheme {
        "vibrant" => ("#fff8f0", "#ffffff", "#d62828", "#1d3557", "#f77f00"),
        "dark" => ("#1a1a2e", "#16213e", "#e94560", "#eaeaea", "#0f3460"),
        "monochrome" => ("#fafafa", "#ffffff", "#111111", "#333333", "#666666"),
        // "pastel" and anything unrecognized
        _ => ("#fdf6ec", "#ffffff", "#2d6a4f", "#343a40", "#95d5b2"),
    }
}

/// Vertical rhythm in em units keyed by the `visualDensity` option.
fn section_spacing(visual_density: &str) -> &'static str {
    match visual_density {
        "compact" => "0.35em",
        "spacious" => "1.2em",
        _ => "0.7em",
    }
}

/// Heading level from explicit level if present, else content length.
fn heading_level(section: &FormattedSection) -> u8 {
    if let Some(level) = section.level {
        return level.clamp(2, 4);
    }
    let len = section.content.chars().count();
    if len <= HEADING_H2_MAX_CHARS {
        2
    } else if len <= HEADING_H3_MAX_CHARS {
        3
    } else {
        4
    }
}

/// Bullet marker from content substrings.
fn bullet_marker(content: &str) -> &'static str {
    if content.contains("then") || content.contains('→') {
        "→"
    } else if content.contains("complete") || content.contains('✓') {
        "✓"
    } else {
        "•"
    }
}

/// Escape text for HTML element content and attribute values.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Escape content and wrap each highlight term occurrence in `<mark>`.
fn highlighted_content(section: &FormattedSection) -> String {
    let mut html = escape_html(&section.content);
    if let Some(terms) = &section.highlight_terms {
        for term in terms {
            let escaped = escape_html(term);
            if escaped.is_empty() {
                continue;
            }
            html = html.replace(&escaped, &format!("<mark>{}</mark>", escaped));
        }
    }
    html
}

/// Build a single `style` attribute from the optional section color and
/// the density-derived spacing.
fn style_attr(color: Option<&str>, spacing: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(color) = color {
        parts.push(format!("color:{}", escape_html(color)));
    }
    if let Some(spacing) = spacing {
        parts.push(format!("margin-bottom:{}", spacing));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", parts.join(";"))
    }
}

fn render_section(section: &FormattedSection, spacing: &str) -> String {
    let emoji = section
        .emoji
        .as_deref()
        .map(|e| format!("{} ", escape_html(e)))
        .unwrap_or_default();
    let color = section.color.as_deref();
    let content = highlighted_content(section);

    match section.section_type {
        SectionType::Heading => {
            let level = heading_level(section);
            format!(
                "<h{level}{attr}>{emoji}{content}</h{level}>\n",
                level = level,
                attr = style_attr(color, None),
            )
        }
        SectionType::Bullet => format!(
            "<div class=\"bullet\"{attr}><span class=\"marker\">{marker}</span> \
             {emoji}{content}</div>\n",
            attr = style_attr(color, Some(spacing)),
            marker = bullet_marker(&section.content),
        ),
        SectionType::Definition => format!(
            "<div class=\"definition\"{attr}>{emoji}{content}</div>\n",
            attr = style_attr(color, Some(spacing)),
        ),
        SectionType::Example => format!(
            "<blockquote class=\"example\"{attr}>{emoji}{content}</blockquote>\n",
            attr = style_attr(color, Some(spacing)),
        ),
        SectionType::Formula => format!(
            "<pre class=\"formula\"{attr}><code>{content}</code></pre>\n",
            attr = style_attr(color, Some(spacing)),
        ),
        SectionType::Callout => format!(
            "<div class=\"callout\"{attr}>{emoji}{content}</div>\n",
            attr = style_attr(color, Some(spacing)),
        ),
    }
}

/// Render one positioned layout block as an absolutely placed element.
/// Block types outside the known set are silently dropped.
fn render_layout_block(block: &noteflow_core::LayoutBlock) -> Option<String> {
    let tag = match block.block_type.as_str() {
        "title" => "h1",
        "heading" => "h2",
        "paragraph" | "bullet" | "callout" => "div",
        _ => return None,
    };
    Some(format!(
        "<{tag} class=\"block block-{kind}\" style=\"position:absolute;left:{x}pt;top:{y}pt;\
         width:{w}pt;min-height:{h}pt;font-family:{font};font-size:{size}pt;color:{color};\
         background:{bg}\">{content}</{tag}>\n",
        kind = escape_html(&block.block_type),
        x = block.position.x,
        y = block.position.y,
        w = block.position.width,
        h = block.position.height,
        font = escape_html(&block.style.font_family),
        size = block.style.font_size,
        color = escape_html(&block.style.color),
        bg = escape_html(&block.style.background),
        content = escape_html(&block.content),
    ))
}

fn render_diagrams(diagrams: &[Diagram]) -> String {
    if diagrams.is_empty() {
        return String::new();
    }
    let mut html = String::from("<section class=\"diagrams\">\n<h2>Diagrams</h2>\n");
    for diagram in diagrams {
        html.push_str(&format!(
            "<figure class=\"diagram diagram-{}\">\n<figcaption>{}</figcaption>\n\
             <pre class=\"mermaid\">{}</pre>\n</figure>\n",
            escape_html(&diagram.diagram_type),
            escape_html(&diagram.title),
            escape_html(&diagram.mermaid),
        ));
    }
    html.push_str("</section>\n");
    html
}

/// Render a complete HTML document.
///
/// `layout` is the Layout Designer's output; when present, its page fonts
/// and palette override the option-derived ones and its positioned blocks
/// render on a second page.
pub fn render_html(
    formatted: &FormattedNotes,
    layout: Option<&DesignedLayout>,
    diagrams: &[Diagram],
    options: &NoteGenOptions,
) -> String {
    let (heading_font, body_font) = match layout {
        Some(l) => (l.page.heading_font.as_str(), l.page.body_font.as_str()),
        None => {
            let (h, b) = font_stack(&options.font_style);
            (h, b)
        }
    };
    let (page_bg, card_bg, heading_color, body_color, accent) = palette(&options.color_scheme);
    let spacing = section_spacing(&options.visual_density);

    let mut body = String::new();
    body.push_str(&format!(
        "<header>\n<h1>{} {}</h1>\n<p class=\"theme\">{}</p>\n</header>\n",
        escape_html(&formatted.emoji),
        escape_html(&formatted.title),
        escape_html(&formatted.color_theme),
    ));

    body.push_str("<main>\n");
    for section in &formatted.sections {
        body.push_str(&render_section(section, spacing));
    }
    body.push_str("</main>\n");

    body.push_str(&render_diagrams(diagrams));

    if let Some(layout) = layout {
        let blocks: String = layout
            .blocks
            .iter()
            .filter_map(render_layout_block)
            .collect();
        if !blocks.is_empty() {
            body.push_str(&format!(
                "<section class=\"designed-page\" style=\"position:relative;\
                 width:595pt;height:842pt;background:{}\">\n{}</section>\n",
                escape_html(layout.page.palette.first().map(String::as_str).unwrap_or(card_bg)),
                blocks,
            ));
        }
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n\
         body {{ background: {page_bg}; color: {body_color}; font-family: {body_font}; \
         margin: 0; padding: 2em; }}\n\
         header, main, .diagrams {{ background: {card_bg}; border-radius: 8px; \
         padding: 1.5em; margin-bottom: 1em; }}\n\
         h1, h2, h3, h4 {{ color: {heading_color}; font-family: {heading_font}; }}\n\
         mark {{ background: {accent}; padding: 0 0.15em; }}\n\
         .bullet .marker {{ color: {heading_color}; font-weight: bold; }}\n\
         .definition {{ border-left: 3px solid {accent}; padding-left: 0.75em; }}\n\
         .example {{ font-style: italic; border-left: 3px solid {heading_color}; \
         margin-left: 0; padding-left: 0.75em; }}\n\
         .formula {{ background: {page_bg}; padding: 0.5em; overflow-x: auto; }}\n\
         .callout {{ background: {page_bg}; border: 1px solid {accent}; \
         border-radius: 6px; padding: 0.75em; }}\n\
         .diagram pre {{ background: {page_bg}; padding: 0.5em; overflow-x: auto; }}\n\
         </style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape_html(&formatted.title),
    )
}
