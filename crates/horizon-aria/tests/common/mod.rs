//! A fake document for driving a listbox from integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use horizon_aria::{
    Element, ElementRef, FocusInEvent, FocusOutEvent, IdGenerator, KeyDownEvent,
    Listbox, ListboxOption, ListboxOptions, OptionKey,
};
use parking_lot::Mutex;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_aria=trace,horizon_aria_core=debug")
        .with_test_writer()
        .try_init();
}

/// Tracks which node holds focus. Node 0 is the listbox, option `i` is node `i + 1`.
#[derive(Default)]
pub struct Document {
    focused: Mutex<Option<usize>>,
}

impl Document {
    pub fn focused(&self) -> Option<usize> {
        *self.focused.lock()
    }

    pub fn blur(&self) {
        *self.focused.lock() = None;
    }
}

struct Node {
    doc: Arc<Document>,
    index: usize,
}

impl Element for Node {
    fn focus(&self) {
        *self.doc.focused.lock() = Some(self.index);
    }

    fn contains_focus(&self) -> bool {
        match self.doc.focused() {
            Some(focused) => self.index == 0 || focused == self.index,
            None => false,
        }
    }
}

fn node(doc: &Arc<Document>, index: usize) -> ElementRef {
    Arc::new(Node {
        doc: doc.clone(),
        index,
    })
}

pub struct Harness {
    pub doc: Arc<Document>,
    pub listbox: Listbox,
    pub options: Vec<Arc<ListboxOption>>,
}

impl Harness {
    pub fn new(count: usize, options: ListboxOptions) -> Self {
        let doc = Arc::new(Document::default());
        let ids = IdGenerator::new("option");
        let listbox = Listbox::with_options(node(&doc, 0), options);
        let options: Vec<_> = (0..count)
            .map(|i| ListboxOption::new(node(&doc, i + 1), &ids))
            .collect();
        listbox.set_items(options.clone()).unwrap();
        Self {
            doc,
            listbox,
            options,
        }
    }

    pub fn roving(count: usize) -> Self {
        Self::new(
            count,
            ListboxOptions {
                use_active_descendant: false,
                ..Default::default()
            },
        )
    }

    pub fn key(&self, index: usize) -> OptionKey {
        self.options[index].key()
    }

    pub fn index_of(&self, key: Option<OptionKey>) -> Option<usize> {
        let key = key?;
        self.options.iter().position(|option| option.key() == key)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.index_of(self.listbox.active().get())
    }

    pub fn set_active(&self, index: usize) {
        self.listbox.active().set(Some(self.key(index)));
    }

    pub fn press(&self, key: &str) -> bool {
        let mut event = KeyDownEvent::from_dom_key(key);
        self.listbox.keydown(&mut event);
        event.is_default_prevented()
    }

    pub fn focus_in(&self) {
        self.listbox.focusin(&mut FocusInEvent::new());
    }

    pub fn focus_out(&self) {
        self.doc.blur();
        self.listbox.focusout(&mut FocusOutEvent::new());
    }

    /// Option index holding DOM focus.
    pub fn focused_option(&self) -> Option<usize> {
        self.doc.focused().and_then(|node| node.checked_sub(1))
    }

    pub fn remove_option(&mut self, index: usize) -> Arc<ListboxOption> {
        let removed = self.options.remove(index);
        self.listbox.set_items(self.options.clone()).unwrap();
        removed
    }

    pub fn tabindexes(&self) -> Vec<Option<i32>> {
        self.options.iter().map(|option| option.tabindex()).collect()
    }

    pub fn tab_stops(&self) -> usize {
        self.tabindexes().iter().filter(|t| **t == Some(0)).count()
    }
}
