//! Coordination core of a search page: actions publish query changes on a
//! per-environment dispatcher, the store applies them in generation order and
//! widgets repaint from the store and keep the address bar in sync.

pub mod actions;
pub mod config;
pub mod dispatcher;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod store;
pub mod ui;
pub mod url_state;
pub mod widgets;

#[cfg(test)]
mod test_support;

pub use actions::{
    ActionFuture, FetchOutcome, FilterChange, Payload, QueryConfiguration, QueryTransform,
    SuggestionsSetting,
};
pub use config::{HistoryMode, UiConfig, UiOptions};
pub use dispatcher::{DispatchReport, Dispatcher, ListenerId};
pub use environment::{Environment, EnvironmentId, Generation};
pub use error::UiError;
pub use registry::WidgetRegistry;
pub use store::{FetchFailure, Store, StorePhase, StoreSnapshot};
pub use ui::{InitOptions, SearchUi};
pub use url_state::{AddressBar, MemoryAddressBar, UrlCodec, UrlObject, UrlScope, UrlStateError};
pub use widgets::{Dictionary, Renderer, Widget, WidgetContext, WidgetView};
