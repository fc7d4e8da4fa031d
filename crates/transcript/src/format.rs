use crate::api::Snippet;

/// `M:SS` below one hour, `H:MM:SS` from there on. Fractions are dropped.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// One output line per snippet, optionally prefixed with `[M:SS]`
pub fn render_lines(snippets: &[Snippet], timestamps: bool) -> Vec<String> {
    snippets
        .iter()
        .map(|s| {
            if timestamps {
                format!("[{}] {}", format_timestamp(s.start), s.text)
            } else {
                s.text.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(5.9), "0:05");
        assert_eq!(format_timestamp(65.2), "1:05");
        assert_eq!(format_timestamp(3599.99), "59:59");
        assert_eq!(format_timestamp(3600.0), "1:00:00");
        assert_eq!(format_timestamp(3725.5), "1:02:05");
    }

    #[test]
    fn test_render_lines() {
        let snippets = vec![
            Snippet {
                text: "hello".to_string(),
                start: 1.5,
                duration: 2.0,
            },
            Snippet {
                text: "world".to_string(),
                start: 62.0,
                duration: 1.0,
            },
        ];
        assert_eq!(render_lines(&snippets, true), vec!["[0:01] hello", "[1:02] world"]);
        assert_eq!(render_lines(&snippets, false), vec!["hello", "world"]);
    }
}
