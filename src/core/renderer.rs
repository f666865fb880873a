use crate::config::toml_config::RenderSettings;
use crate::domain::model::DegradeReason;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::fmt::Write;

const PAGE_STYLE: &str = r#"
        :root { --primary-color: #2563eb; --bg-color: #f8fafc; --card-bg: #ffffff; }
        body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif; background-color: var(--bg-color); color: #1e293b; margin: 0; padding: 20px; line-height: 1.6; }
        .container { max-width: 800px; margin: 0 auto; background: var(--card-bg); padding: 30px; border-radius: 12px; box-shadow: 0 4px 6px -1px rgba(0, 0, 0, 0.1); }
        h1 { text-align: center; color: #0f172a; margin-bottom: 5px; font-size: 24px; }
        .subtitle { text-align: center; color: #64748b; font-size: 14px; margin-bottom: 30px; }
        .subtitle a { margin-left: 8px; }
        audio { display: block; width: 100%; margin-bottom: 20px; }
        h2 { color: var(--primary-color); border-bottom: 2px solid #e2e8f0; padding-bottom: 8px; margin-top: 30px; font-size: 18px; }
        ul { padding-left: 20px; }
        li { margin-bottom: 12px; }
        a { color: var(--primary-color); text-decoration: none; word-break: break-all; }
        a:hover { text-decoration: underline; }
        @media (max-width: 600px) {
            body { padding: 10px; }
            .container { padding: 20px; }
        }
"#;

/// 模型輸出不受信任：原始 HTML 標記一律轉為文字，`javascript:` 連結移除
const MARKDOWN_GUARD: &str = r#"
        const escapeHtml = (s) => String(s)
            .replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;')
            .replace(/"/g, '&quot;').replace(/'/g, '&#39;');
        marked.use({ renderer: { html: (token) => escapeHtml(token.text ?? token) } });
"#;

pub struct PageRenderer {
    settings: RenderSettings,
    offset: FixedOffset,
}

impl PageRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        let offset = FixedOffset::east_opt(settings.utc_offset_hours * 3600).unwrap_or_else(|| {
            tracing::warn!(
                "UTC offset {}h out of range, rendering in UTC",
                settings.utc_offset_hours
            );
            Utc.fix()
        });
        Self { settings, offset }
    }

    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    pub fn placeholder_text(&self, reason: &DegradeReason) -> &str {
        match reason {
            DegradeReason::NoFeedContent => &self.settings.placeholder_text,
            DegradeReason::MissingCredential | DegradeReason::SummarizerFailed(_) => {
                &self.settings.summary_failed_text
            }
        }
    }

    /// 產生完整 HTML；Markdown 以跳脫後的字串常值嵌入，由瀏覽器端渲染
    pub fn render(
        &self,
        markdown: &str,
        now: &DateTime<FixedOffset>,
        archive_href: Option<&str>,
    ) -> String {
        let body = if markdown.trim().is_empty() {
            self.settings.placeholder_text.as_str()
        } else {
            markdown
        };

        let date = now.format(&self.settings.date_format).to_string();
        let time = now.format(&self.settings.time_format).to_string();

        let mut head_extra = String::new();
        if let Some(stylesheet) = &self.settings.stylesheet_url {
            let _ = write!(
                head_extra,
                "\n    <link rel=\"stylesheet\" href=\"{}\">",
                escape_html(stylesheet)
            );
        }

        let mut subtitle = format!(
            "{} | {} UTC{}",
            escape_html(&date),
            escape_html(&time),
            now.offset()
        );
        if let Some(href) = archive_href {
            let _ = write!(subtitle, " <a href=\"{}\">📚</a>", escape_html(href));
        }

        let audio = match &self.settings.audio_url {
            Some(url) => format!(
                "\n        <audio controls preload=\"none\" src=\"{}\"></audio>",
                escape_html(url)
            ),
            None => String::new(),
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {date}</title>
    <script src="{script}"></script>{head_extra}
    <style>{style}    </style>
</head>
<body>
    <div class="container">
        <h1>{heading}</h1>
        <div class="subtitle">{subtitle}</div>{audio}
        <div id="content"></div>
    </div>
    <script>{guard}
        const markdown = {literal};
        const content = document.getElementById('content');
        content.innerHTML = marked.parse(markdown);
        content.querySelectorAll('a[href]').forEach((a) => {{
            if (/^\s*javascript:/i.test(a.getAttribute('href'))) a.removeAttribute('href');
        }});
    </script>
</body>
</html>
"#,
            lang = escape_html(&self.settings.lang),
            title = escape_html(&self.settings.page_title),
            date = escape_html(&date),
            script = escape_html(&self.settings.markdown_script_url),
            head_extra = head_extra,
            style = PAGE_STYLE,
            guard = MARKDOWN_GUARD,
            heading = escape_html(&self.settings.heading),
            subtitle = subtitle,
            audio = audio,
            literal = escape_script_literal(body),
        )
    }

    /// 歸檔索引頁，日期需已由新到舊排序
    pub fn render_archive_index(&self, dates: &[String], current_href: &str) -> String {
        let mut items = String::new();
        for date in dates {
            let _ = writeln!(
                items,
                "            <li><a href=\"{0}.html\">{0}</a></li>",
                escape_html(date)
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Archive</title>
    <style>{style}    </style>
</head>
<body>
    <div class="container">
        <h1>{heading}</h1>
        <div class="subtitle"><a href="{current}">⬅</a></div>
        <ul>
{items}        </ul>
    </div>
</body>
</html>
"#,
            lang = escape_html(&self.settings.lang),
            title = escape_html(&self.settings.page_title),
            style = PAGE_STYLE,
            heading = escape_html(&self.settings.heading),
            current = escape_html(current_href),
            items = items,
        )
    }
}

/// 將任意文字編碼為 JavaScript 雙引號字串常值 (同時也是合法 JSON)。
/// `<`、`>`、`&`、反引號與 U+2028/U+2029 一律以 \u 跳脫，
/// 因此常值內不會出現 `</script>`、`<!--` 或原始反引號。
pub fn escape_script_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' | '>' | '&' | '`' | '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// 取出頁面中嵌入的 Markdown 字串常值 (測試與除錯用)
pub fn extract_embedded_literal(html: &str) -> Option<&str> {
    let start = html.find("const markdown = ")? + "const markdown = ".len();
    let rest = &html[start..];
    let end = rest.find(";\n")?;
    Some(&rest[..end])
}
