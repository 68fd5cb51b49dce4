/// Notification registry
///
/// The core announces what it did through named notifications (`order`,
/// `search`, `draw`, ...). Chrome widgets and tests subscribe with `on` and
/// are called synchronously, in registration order, with read access to the
/// settings that produced the notification.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::GridError;
use crate::settings::{DisplayLength, Settings};
use crate::sort::ActiveSort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Init,
    Order,
    Search,
    Draw,
    Length,
    Page,
    /// A page change was requested but the start did not move.
    PageNoChange,
    ColumnSizing,
    Error,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Init => "init",
            Event::Order => "order",
            Event::Search => "search",
            Event::Draw => "draw",
            Event::Length => "length",
            Event::Page => "page",
            Event::PageNoChange => "page-nc",
            Event::ColumnSizing => "column-sizing",
            Event::Error => "error",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Event {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(Event::Init),
            "order" => Ok(Event::Order),
            "search" => Ok(Event::Search),
            "draw" => Ok(Event::Draw),
            "length" => Ok(Event::Length),
            "page" => Ok(Event::Page),
            "page-nc" => Ok(Event::PageNoChange),
            "column-sizing" => Ok(Event::ColumnSizing),
            "error" => Ok(Event::Error),
            _ => Err(format!("Unknown event: '{}'", s)),
        }
    }
}

/// Event-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    None,
    Order(Option<ActiveSort>),
    Search(String),
    Length(DisplayLength),
    Page { start: usize },
    Error(GridError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub event: Event,
    pub bubbles: bool,
    pub detail: Detail,
}

pub type Listener = Rc<dyn Fn(&Settings, &Notification)>;

/// Handle returned by [`EventRegistry::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventRegistry {
    listeners: HashMap<Event, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, event: Event, listener: F) -> ListenerId
    where
        F: Fn(&Settings, &Notification) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event)
            .or_default()
            .push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Listeners for an event, cloned so they can be called while the
    /// registry's owner is borrowed.
    pub fn listeners(&self, event: Event) -> Vec<Listener> {
        self.listeners
            .get(&event)
            .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, event: Event) -> usize {
        self.listeners.get(&event).map(Vec::len).unwrap_or(0)
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(event, list)| (event.name(), list.len()))
            .collect();
        f.debug_struct("EventRegistry").field("listeners", &counts).finish()
    }
}
