use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    translate, Dictionary, SuggestionWordView, SuggestionsView, Widget, WidgetContext, WidgetView,
};
use crate::actions::{self, ActionFuture};

/// Lists the suggested words of the last result; clicking one searches for it.
pub struct SuggestionsFilter {
    target: String,
    top_label: Option<String>,
    mounted: AtomicBool,
}

impl SuggestionsFilter {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            top_label: None,
            mounted: AtomicBool::new(false),
        }
    }

    pub fn with_top_label(mut self, label: impl Into<String>) -> Self {
        self.top_label = Some(label.into());
        self
    }

    pub fn handle_word_click(&self, ctx: &WidgetContext, word: &str) -> ActionFuture {
        actions::on_word_click_action(
            &ctx.environment,
            &ctx.store.current_query(),
            &ctx.repository,
            word,
        )
    }
}

fn matched_prefix_len(typed: &str, word: &str) -> usize {
    typed
        .chars()
        .zip(word.chars())
        .take_while(|(left, right)| left.to_lowercase().eq(right.to_lowercase()))
        .count()
}

impl Widget for SuggestionsFilter {
    fn target(&self) -> &str {
        &self.target
    }

    fn render(&self, ctx: &WidgetContext, dictionary: &Dictionary) -> anyhow::Result<WidgetView> {
        if !self.mounted.swap(true, Ordering::SeqCst) {
            actions::enable_suggestions(&ctx.environment, &ctx.store.current_query());
        }

        let typed = ctx.store.current_query().text.clone();
        let words = ctx
            .store
            .current_result()
            .map(|result| {
                result
                    .suggestions
                    .iter()
                    .map(|word| SuggestionWordView {
                        matched_prefix_len: matched_prefix_len(&typed, word),
                        word: word.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(WidgetView::Suggestions(SuggestionsView {
            top: self
                .top_label
                .as_deref()
                .map(|label| translate(dictionary, label)),
            words,
        }))
    }
}
