use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use uuid::Uuid;

use crate::{actions::Payload, dispatcher::Dispatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentId(Uuid);

impl EnvironmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EnvironmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "env_{}", self.0.simple())
    }
}

/// Request generation stamped on every action payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: AtomicU64,
}

impl GenerationCounter {
    pub fn next(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest(&self) -> Generation {
        Generation(self.latest.load(Ordering::SeqCst))
    }
}

/// One isolated dispatcher/store graph. Shared through `Arc` and handed to
/// every action explicitly.
pub struct Environment {
    id: EnvironmentId,
    dispatcher: Dispatcher<Payload>,
    generations: GenerationCounter,
}

impl Environment {
    pub fn new() -> Self {
        let id = EnvironmentId::new();
        Self {
            id,
            dispatcher: Dispatcher::new(id.to_string()),
            generations: GenerationCounter::default(),
        }
    }

    pub fn id(&self) -> EnvironmentId {
        self.id
    }

    pub fn dispatcher(&self) -> &Dispatcher<Payload> {
        &self.dispatcher
    }

    pub fn next_generation(&self) -> Generation {
        self.generations.next()
    }

    pub fn latest_generation(&self) -> Generation {
        self.generations.latest()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
