//! Alert message template rendering.

/// Values substituted into a rule's message template.
#[derive(Debug, Clone)]
pub struct TemplateValues<'a> {
    /// `{username}`.
    pub username: &'a str,
    /// `{threshold}` — the rule's configured percentage.
    pub threshold: i16,
    /// `{percent}` — the actual consumption percentage.
    pub percent: u64,
    /// `{used}` — bytes consumed in the window.
    pub used: i64,
    /// `{limit}` — the window's byte limit.
    pub limit: i64,
    /// `{remaining}` — bytes left before the limit (zero when over).
    pub remaining: i64,
}

/// Substitute the supported placeholders. Unknown placeholders are left
/// as-is so typos surface in delivered messages rather than vanishing.
pub fn render(template: &str, values: &TemplateValues<'_>) -> String {
    template
        .replace("{username}", values.username)
        .replace("{threshold}", &values.threshold.to_string())
        .replace("{percent}", &values.percent.to_string())
        .replace("{used}", &values.used.to_string())
        .replace("{limit}", &values.limit.to_string())
        .replace("{remaining}", &values.remaining.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_all_placeholders() {
        let values = TemplateValues {
            username: "alice",
            threshold: 80,
            percent: 91,
            used: 910,
            limit: 1000,
            remaining: 90,
        };
        let msg = render(
            "{username} passed {threshold}% ({percent}%): {used}/{limit}, {remaining} left",
            &values,
        );
        assert_eq!(msg, "alice passed 80% (91%): 910/1000, 90 left");
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let values = TemplateValues {
            username: "bob",
            threshold: 50,
            percent: 50,
            used: 1,
            limit: 2,
            remaining: 1,
        };
        assert_eq!(render("{usrname} oops", &values), "{usrname} oops");
    }
}
