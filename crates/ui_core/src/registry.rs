//! Ordered widget collection owned by one search UI.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::{Mutex, RwLock};
use search_model::QueryValue;
use tracing::{debug, warn};

use crate::{
    config::UiConfig,
    error::UiError,
    url_state::{UrlCodec, UrlObject, UrlStateError},
    widgets::{Dictionary, Renderer, Widget, WidgetContext},
};

pub struct WidgetRegistry {
    widgets: RwLock<Vec<Arc<dyn Widget>>>,
    config: UiConfig,
    pass: Mutex<()>,
    pending: AtomicBool,
}

impl WidgetRegistry {
    pub fn new(config: UiConfig) -> Self {
        Self {
            widgets: RwLock::new(Vec::new()),
            config,
            pass: Mutex::new(()),
            pending: AtomicBool::new(false),
        }
    }

    /// Appends `widget`. Targets must be non-blank and unique.
    pub fn add(&self, widget: Arc<dyn Widget>) -> Result<(), UiError> {
        let target = widget.target().trim().to_string();
        if target.is_empty() {
            return Err(UiError::InvalidWidget {
                target,
                reason: "target must not be empty".into(),
            });
        }

        {
            let mut widgets = self.widgets.write();
            if widgets.iter().any(|existing| existing.target().trim() == target) {
                return Err(UiError::InvalidWidget {
                    target,
                    reason: "target is already registered".into(),
                });
            }
            widgets.push(Arc::clone(&widget));
        }

        widget.with_config(&self.config);
        debug!(%target, "widget registered");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.widgets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.read().is_empty()
    }

    pub fn targets(&self) -> Vec<String> {
        self.widgets
            .read()
            .iter()
            .map(|widget| widget.target().to_string())
            .collect()
    }

    pub fn push_config(&self) {
        for widget in self.snapshot() {
            widget.with_config(&self.config);
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn Widget>> {
        self.widgets.read().clone()
    }

    /// Renders every widget in registration order.
    ///
    /// A call arriving while a pass is running only marks the registry dirty;
    /// the running pass then repeats. Returns the number of passes performed
    /// by this call, zero when it was folded into a running one.
    pub fn render(
        &self,
        ctx: &WidgetContext,
        dictionary: &Dictionary,
        renderer: &dyn Renderer,
    ) -> usize {
        self.pending.store(true, Ordering::SeqCst);
        let mut passes = 0;
        loop {
            let Some(pass) = self.pass.try_lock() else {
                return passes;
            };
            while self.pending.swap(false, Ordering::SeqCst) {
                passes += 1;
                for widget in self.snapshot() {
                    match widget.render(ctx, dictionary) {
                        Ok(view) => renderer.paint(widget.target(), &view),
                        Err(err) => warn!(
                            widget = %widget.target(),
                            error = %err,
                            "widget failed to render"
                        ),
                    }
                }
            }
            drop(pass);
            // A request may have landed between the last swap and the unlock.
            if !self.pending.load(Ordering::SeqCst) {
                return passes;
            }
        }
    }
}

impl UrlCodec for WidgetRegistry {
    fn to_url_object(
        &self,
        query: &QueryValue,
        object: &mut UrlObject,
    ) -> Result<(), UrlStateError> {
        for widget in self.snapshot() {
            widget.to_url_object(query, &mut object.scope(widget.target()))?;
        }
        Ok(())
    }

    fn from_url_object(&self, object: &UrlObject, query: &mut QueryValue) {
        for widget in self.snapshot() {
            widget.from_url_object(object, query);
        }
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
