use super::*;

/// First activity, in list order, whose name contains `query` ignoring case.
///
/// An empty query matches nothing.
pub fn resolve<'a>(query: &str, activities: &'a [Activity]) -> Option<&'a Activity> {
    if query.is_empty() {
        return None;
    }
    let needle = query.to_lowercase();
    activities
        .iter()
        .find(|activity| activity.name.to_lowercase().contains(&needle))
}

impl App {
    /// The activity Enter would log right now, for highlighting.
    pub fn predicted_match(&self) -> Option<&Activity> {
        if self.command_input.value.trim().is_empty() {
            return None;
        }
        resolve(&self.command_input.value, &self.snapshot.activities)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn first_substring_match_in_list_order_wins() {
        let activities = vec![
            activity("1", "Read"),
            activity("2", "Reflect"),
            activity("3", "Run"),
        ];
        assert_eq!(resolve("re", &activities).map(|a| a.id.as_str()), Some("1"));
        assert_eq!(resolve("ef", &activities).map(|a| a.id.as_str()), Some("2"));
        assert_eq!(resolve("n", &activities).map(|a| a.id.as_str()), Some("3"));
    }

    #[test]
    fn matching_ignores_case_on_both_sides() {
        let activities = vec![activity("1", "Morning Run")];
        assert!(resolve("RUN", &activities).is_some());
        assert!(resolve("morning r", &activities).is_some());
    }

    #[test]
    fn nothing_matches_empty_query_or_empty_list() {
        let activities = vec![activity("1", "Read")];
        assert!(resolve("", &activities).is_none());
        assert!(resolve("read", &[]).is_none());
        assert!(resolve("write", &activities).is_none());
    }

    #[test]
    fn query_is_not_trimmed() {
        let activities = vec![activity("1", "Read")];
        assert!(resolve(" read", &activities).is_none());
    }

    #[test]
    fn resolve_is_stable_across_calls() {
        let activities = vec![activity("1", "Stretch"), activity("2", "Stretch more")];
        let first = resolve("stretch", &activities).map(|a| a.id.clone());
        for _ in 0..3 {
            assert_eq!(resolve("stretch", &activities).map(|a| a.id.clone()), first);
        }
    }

    #[test]
    fn predicted_match_follows_command_input() {
        let mut app = habits_app();
        assert!(app.predicted_match().is_none());
        app.command_input = TextInput::from_str("ru");
        assert_eq!(app.predicted_match().map(|a| a.name.as_str()), Some("Run"));
        app.command_input = TextInput::from_str("   ");
        assert!(app.predicted_match().is_none());
    }
}
