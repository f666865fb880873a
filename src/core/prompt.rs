use chrono::{DateTime, FixedOffset};

pub const CONTENT_PLACEHOLDER: &str = "{content}";
pub const DATE_PLACEHOLDER: &str = "{date}";

pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"你是一位资深的“全媒体主编”。今天是 {date}。请阅读以下抓取到的全球资讯，为我生成一份结构清晰的《每日深度早报》。

【输入数据】
{content}

【输出要求】
1. 必须严格按照以下 5 个版块分类输出（Markdown格式）：
   ## 💰 全球财经 (重点关注市场动向)
   ## 🛡️ 军事与地缘 (重点关注冲突与政策)
   ## 🤖 技术前沿 (重点关注AI、芯片、硬科技)
   ## 🌏 社会焦点 (重点关注民生与热点)
   ## 🎬 娱乐与生活 (轻松话题)

2. **筛选规则**：
   - 每个版块挑选 3-5 条最有价值的新闻。
   - 如果某个版块的新闻很少，可以只列 1-2 条，宁缺毋滥。
   - 如果某条新闻同时涉及科技和财经（如英伟达股价），请归类到【技术前沿】。
   - 不同信源报道的同一事件只保留一条。

3. **格式规则**：
   - 每条新闻用中文一句话概括核心事实（不要废话）。
   - 必须在每条新闻后附上原文链接。
   - 格式示例：
     * **标题/核心事件** - [原文](链接)

4. **语言风格**：
   - 专业、客观、干练。
   - 将英文新闻自动翻译为中文表述。
"#;

/// 將日期與彙整內容填入模板；先替換日期，避免內容中的 `{date}` 被誤換
pub fn render_prompt(template: &str, content: &str, now: &DateTime<FixedOffset>) -> String {
    let date = now.format("%Y-%m-%d %H:%M").to_string();
    let with_date = template.replace(DATE_PLACEHOLDER, &date);

    if with_date.contains(CONTENT_PLACEHOLDER) {
        with_date.replace(CONTENT_PLACEHOLDER, content)
    } else {
        tracing::warn!("Prompt template has no {{content}} placeholder; appending report");
        format!("{}\n\n{}", with_date, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, 7, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_default_template_includes_report_and_date() {
        let prompt = render_prompt(DEFAULT_PROMPT_TEMPLATE, "【信源：A】\n- t (l)", &sample_time());

        assert!(prompt.contains("【信源：A】\n- t (l)"));
        assert!(prompt.contains("2026-10-19 07:30"));
        assert!(!prompt.contains(CONTENT_PLACEHOLDER));
        assert!(prompt.contains("## 🤖 技术前沿"));
    }

    #[test]
    fn test_content_is_not_substituted_twice() {
        let prompt = render_prompt("{date}: {content}", "literal {date}", &sample_time());
        assert_eq!(prompt, "2026-10-19 07:30: literal {date}");
    }

    #[test]
    fn test_template_without_placeholder_appends_report() {
        let prompt = render_prompt("Summarize the news.", "body", &sample_time());
        assert_eq!(prompt, "Summarize the news.\n\nbody");
    }
}
