//! Annotation-line parsing (spec §4.E rule 3, §9 Design Notes).
//!
//! Each `--` comment line above a block marker is parsed once into a small
//! tagged variant instead of re-scanning its text downstream, per the
//! Design Notes' guidance for "deep doc/annotation parsing driven by
//! string prefixes".

#[derive(Debug, Clone, PartialEq)]
pub struct ParamTypeOverride {
    pub name: String,
    pub type_text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheAnnotation {
    pub ttl_seconds: Option<u64>,
    pub key: Option<String>,
    pub invalidate: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommentLine {
    Doc(String),
    ParamOverride(ParamTypeOverride),
    Cache(CacheAnnotation),
}

const DEFAULT_CACHE_TTL_SECONDS: u64 = 5 * 60;

/// Classifies the trimmed content of a single `--` comment line (quote
/// marker and leading `--` already stripped).
pub fn classify_comment(content: &str) -> CommentLine {
    let trimmed = content.trim();
    let lower = trimmed.to_ascii_lowercase();

    if let Some(rest) = strip_prefix_ci(trimmed, &lower, "@param") {
        if let Some((name, type_text)) = rest.trim().split_once(':') {
            return CommentLine::ParamOverride(ParamTypeOverride {
                name: name.trim().to_string(),
                type_text: type_text.trim().to_string(),
            });
        }
        return CommentLine::Doc(trimmed.to_string());
    }

    if let Some(rest) = strip_prefix_ci(trimmed, &lower, "@cache") {
        return CommentLine::Cache(parse_cache_annotation(rest.trim()));
    }

    CommentLine::Doc(trimmed.to_string())
}

fn strip_prefix_ci<'a>(original: &'a str, lower: &str, prefix: &str) -> Option<&'a str> {
    lower.starts_with(prefix).then(|| &original[prefix.len()..])
}

fn parse_cache_annotation(rest: &str) -> CacheAnnotation {
    let mut ttl_seconds = Some(DEFAULT_CACHE_TTL_SECONDS);
    let mut key = None;
    let mut invalidate = None;

    for pair in rest.split_whitespace() {
        let Some((k, v)) = pair.split_once('=') else {
            continue;
        };
        match k.trim().to_ascii_lowercase().as_str() {
            "ttl" => ttl_seconds = parse_ttl(v.trim()),
            "key" => key = Some(v.trim().to_string()),
            "invalidate" => invalidate = Some(v.trim().to_string()),
            _ => {}
        }
    }

    CacheAnnotation {
        ttl_seconds,
        key,
        invalidate,
    }
}

fn parse_ttl(v: &str) -> Option<u64> {
    let parsed = if let Some(num) = v.strip_suffix('s') {
        num.parse::<u64>().ok()
    } else if let Some(num) = v.strip_suffix('m') {
        num.parse::<u64>().ok().map(|n| n * 60)
    } else if let Some(num) = v.strip_suffix('h') {
        num.parse::<u64>().ok().map(|n| n * 3600)
    } else {
        v.parse::<u64>().ok()
    };
    parsed.or(Some(DEFAULT_CACHE_TTL_SECONDS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_comment_is_doc() {
        assert_eq!(
            classify_comment("Returns the active user"),
            CommentLine::Doc("Returns the active user".to_string())
        );
    }

    #[test]
    fn param_override_parses_name_and_type() {
        let result = classify_comment("@param id: Integer");
        assert_eq!(
            result,
            CommentLine::ParamOverride(ParamTypeOverride {
                name: "id".to_string(),
                type_text: "Integer".to_string(),
            })
        );
    }

    #[test]
    fn bare_cache_annotation_defaults_to_five_minutes() {
        let result = classify_comment("@cache");
        assert_eq!(
            result,
            CommentLine::Cache(CacheAnnotation {
                ttl_seconds: Some(300),
                key: None,
                invalidate: None,
            })
        );
    }

    #[test]
    fn cache_annotation_parses_key_value_pairs() {
        let result = classify_comment("@cache ttl=10m key=user:{id}");
        match result {
            CommentLine::Cache(ann) => {
                assert_eq!(ann.ttl_seconds, Some(600));
                assert_eq!(ann.key.as_deref(), Some("user:{id}"));
            }
            other => panic!("expected cache annotation, got {other:?}"),
        }
    }

    #[test]
    fn cache_annotation_is_case_insensitive() {
        assert!(matches!(classify_comment("@CACHE ttl=5s"), CommentLine::Cache(_)));
    }
}
