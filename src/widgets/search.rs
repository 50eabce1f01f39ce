use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use bevy_ecs::{prelude::*, system::CommandQueue};
use crossterm::event::KeyEvent;
use futures::future::BoxFuture;
use ratatui::widgets::TableState;
use tokio::sync::{mpsc, watch};
use tui_input::backend::crossterm::EventHandler;

use crate::helper::cycle;

/// Remote-backed autocomplete: keystrokes feed a debounced background
/// task, results land in a shared options list, recent picks are kept as
/// history shown for an empty query.
#[derive(Resource, Component)]
pub struct Search<T> {
    pub(crate) input: tui_input::Input,
    pub(crate) table: TableState,
    visible: bool,
    options: Arc<Mutex<Vec<T>>>,
    history: Vec<T>,
    tx: watch::Sender<String>,
}

impl<T> std::fmt::Debug for Search<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Search")
            .field("visible", &self.visible)
            .field("input", &self.input.value())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T> Search<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    pub fn new(
        update: mpsc::UnboundedSender<CommandQueue>,
        task: impl Fn(String) -> BoxFuture<'static, Vec<T>> + Send + Sync + 'static,
    ) -> Self {
        let (tx, mut rx) = watch::channel(String::new());
        let options = Arc::new(Mutex::new(vec![]));
        tokio::spawn({
            let options = options.clone();
            async move {
                loop {
                    _ = rx.changed().await;
                    // debounce input
                    loop {
                        match tokio::time::timeout(Duration::from_millis(10), rx.changed()).await {
                            Ok(Ok(_)) => {}
                            Ok(Err(_)) => return,
                            Err(_) => break,
                        }
                    }
                    let input = rx.borrow_and_update().to_string();
                    if input.is_empty() {
                        options
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner)
                            .clear();
                    } else {
                        let result = (task)(input).await;
                        *options
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner) = result;
                    }
                    let _ = update.send(CommandQueue::default());
                }
            }
        });
        Self {
            input: tui_input::Input::default(),
            table: TableState::default(),
            visible: false,
            options,
            history: vec![],
            tx,
        }
    }

    /// Pre-fill the empty-query suggestion list (popular symbols).
    pub fn seed_history(mut self, items: Vec<T>) -> Self {
        self.history = items;
        self
    }

    pub fn visible(&mut self) {
        self.visible = true;
    }

    pub fn query(&self) -> &str {
        self.input.value()
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> (bool, Option<T>) {
        match event {
            key!(Esc) => {
                self.visible = false;
                return (true, None);
            }
            key!(Enter) => {
                if let Some(idx) = self.table.selected() {
                    self.table.select(None);
                    let Some(selected) = self.option(idx) else {
                        return (true, None);
                    };
                    if self.history.len() >= 20 {
                        self.history.pop();
                    }
                    self.history.retain(|v| v != &selected);
                    self.history.insert(0, selected.clone());

                    self.input.reset();
                    self.options
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .clear();
                    self.visible = false;
                    return (true, Some(selected));
                }
            }
            key!(Up) => {
                let idx = cycle::prev_opt(self.table.selected(), self.options_length());
                self.table.select(idx);
            }
            key!(Down) => {
                let idx = cycle::next_opt(self.table.selected(), self.options_length());
                self.table.select(idx);
            }
            _ => {
                let evt = crossterm::event::Event::Key(event);
                if self.input.handle_event(&evt).is_some() {
                    let _ = self.tx.send(self.input.to_string());
                }
            }
        }
        (false, None)
    }

    pub fn options(&self) -> Vec<T> {
        let opts = self
            .options
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !opts.is_empty() {
            return opts.clone();
        }
        if self.input.value().is_empty() {
            self.history.clone()
        } else {
            vec![]
        }
    }

    fn options_length(&self) -> usize {
        let opts = self
            .options
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !opts.is_empty() {
            return opts.len();
        }
        if self.input.value().is_empty() {
            self.history.len()
        } else {
            0
        }
    }

    fn option(&self, index: usize) -> Option<T> {
        let options = self
            .options
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        options
            .get(index)
            .cloned()
            .or_else(|| self.history.get(index).cloned())
    }
}
