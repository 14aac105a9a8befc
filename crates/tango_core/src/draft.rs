use crate::model::Suggestion;
use time::Date;

/// The pending new-task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
    selected_date: Option<Date>,
    last_suggestion: Option<Suggestion>,
}

/// Draft fields captured at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedDraft {
    pub text: String,
    pub deadline: Option<Date>,
}

impl Draft {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }

    pub fn selected_date(&self) -> Option<Date> {
        self.selected_date
    }

    pub fn select_date(&mut self, date: Option<Date>) {
        self.selected_date = date;
    }

    pub fn last_suggestion(&self) -> Option<&Suggestion> {
        self.last_suggestion.as_ref()
    }

    pub(crate) fn set_last_suggestion(&mut self, suggestion: Suggestion) {
        self.last_suggestion = Some(suggestion);
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Captures text and date, resetting every field including the suggestion.
    pub(crate) fn take(&mut self) -> SubmittedDraft {
        let Draft {
            text,
            selected_date,
            ..
        } = std::mem::take(self);
        SubmittedDraft {
            text,
            deadline: selected_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Draft;
    use crate::model::Suggestion;
    use time::macros::date;

    #[test]
    fn whitespace_only_text_is_blank() {
        let mut draft = Draft::default();
        assert!(draft.is_blank());
        draft.set_text(" \t ");
        assert!(draft.is_blank());
        draft.set_text(" x ");
        assert!(!draft.is_blank());
    }

    #[test]
    fn take_resets_all_fields_together() {
        let mut draft = Draft::default();
        draft.set_text("Write report");
        draft.select_date(Some(date!(2024 - 06 - 01)));
        draft.set_last_suggestion(Suggestion::new("2024-06-03", "short task"));

        let submitted = draft.take();

        assert_eq!(submitted.text, "Write report");
        assert_eq!(submitted.deadline, Some(date!(2024 - 06 - 01)));
        assert_eq!(draft, Draft::default());
    }

    #[test]
    fn take_keeps_text_exactly_as_typed() {
        let mut draft = Draft::default();
        draft.set_text("  padded  ");
        assert_eq!(draft.take().text, "  padded  ");
    }
}
