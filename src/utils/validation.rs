use crate::utils::error::{DigestError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DigestError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 輸出檔名只允許單一路徑片段
pub fn validate_file_name(field_name: &str, name: &str) -> Result<()> {
    validate_path(field_name, name)?;

    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Must be a plain file name without directory separators".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// chrono 在格式字串無效時會於輸出時 panic，必須事先檢查
/// NaN 與 PartialOrd 比較永遠為 false，需在範圍檢查前另外排除
pub fn validate_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_strftime(field_name: &str, format: &str) -> Result<()> {
    use chrono::format::{Item, StrftimeItems};

    validate_non_empty_string(field_name, format)?;
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(DigestError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format.to_string(),
            reason: "Invalid strftime format".to_string(),
        });
    }
    Ok(())
}

pub fn validate_unique<'a, I>(field_name: &str, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(DigestError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Duplicate value".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sources.url", "https://example.com/feed.xml").is_ok());
        assert!(validate_url("sources.url", "http://example.com/rss").is_ok());
        assert!(validate_url("sources.url", "").is_err());
        assert!(validate_url("sources.url", "not a url").is_err());
        assert!(validate_url("sources.url", "ftp://example.com/feed").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("publish.current_file", "index.html").is_ok());
        assert!(validate_file_name("publish.current_file", "").is_err());
        assert!(validate_file_name("publish.current_file", "../index.html").is_err());
        assert!(validate_file_name("publish.current_file", "..").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("summarize.temperature", 0.7, 0.0, 2.0).is_ok());
        assert!(validate_range("summarize.temperature", 2.5, 0.0, 2.0).is_err());
        assert!(validate_range("render.utc_offset_hours", -13, -12, 14).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("summarize.temperature", 0.7).is_ok());
        assert!(validate_finite("summarize.temperature", f64::NAN).is_err());
        assert!(validate_finite("summarize.temperature", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_strftime() {
        assert!(validate_strftime("render.date_format", "%Y年%m月%d日").is_ok());
        assert!(validate_strftime("render.date_format", "%Q").is_err());
        assert!(validate_strftime("render.date_format", "").is_err());
    }

    #[test]
    fn test_validate_unique() {
        assert!(validate_unique("sources.label", ["a", "b"]).is_ok());
        let err = validate_unique("sources.label", ["a", "b", "a"]).unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("collect.max_entries_per_source", 4, 1).is_ok());
        assert!(validate_positive_number("collect.max_entries_per_source", 0, 1).is_err());
    }
}
