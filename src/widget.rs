//! Chat widget state: open/closed window, the message thread, and one
//! product carousel per message that came back with products.

use std::collections::HashMap;

use crate::input::TextInput;
use crate::model::{ChatReply, ChatRequest, Message, MessageId, Product, Sender};

pub const GREETING: &str = "Hi! How can I help you shop today?";
pub const FAILURE_REPLY: &str = "Sorry, something went wrong.";

#[derive(Debug, Clone)]
pub struct WidgetState {
    pub is_open: bool,
    pub messages: Vec<Message>,
    pub input: TextInput,
    pub loading: bool,
    /// Message id -> offset of the product currently shown
    carousel: HashMap<MessageId, usize>,
    /// Message whose carousel the paging keys act on
    selected_carousel: Option<MessageId>,
    next_id: MessageId,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetState {
    pub fn new() -> Self {
        let mut state = Self {
            is_open: false,
            messages: Vec::new(),
            input: TextInput::default(),
            loading: false,
            carousel: HashMap::new(),
            selected_carousel: None,
            next_id: 1,
        };
        state.push_message(Sender::Assistant, GREETING.to_string(), Vec::new());
        state
    }

    pub fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Move the input into the thread as a user message and return the request
    /// to send. Blank input is ignored.
    pub fn begin_send(&mut self) -> Option<ChatRequest> {
        if self.input.is_blank() {
            return None;
        }

        let text = self.input.take();
        self.push_message(Sender::User, text.clone(), Vec::new());
        self.loading = true;
        Some(ChatRequest::new(text))
    }

    pub fn receive_reply(&mut self, reply: ChatReply) {
        let id = self.push_message(Sender::Assistant, reply.response, reply.products);
        if self.carousel.contains_key(&id) {
            self.selected_carousel = Some(id);
        }
        self.loading = false;
    }

    pub fn receive_failure(&mut self) {
        self.push_message(Sender::Assistant, FAILURE_REPLY.to_string(), Vec::new());
        self.loading = false;
    }

    fn push_message(&mut self, sender: Sender, text: String, products: Vec<Product>) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;

        if !products.is_empty() {
            self.carousel.insert(id, 0);
        }
        self.messages.push(Message {
            id,
            text,
            sender,
            products,
        });
        id
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    fn product_count(&self, id: MessageId) -> usize {
        self.message(id).map(|m| m.products.len()).unwrap_or(0)
    }

    pub fn carousel_next(&mut self, id: MessageId) {
        let len = self.product_count(id);
        if len == 0 {
            return;
        }
        if let Some(index) = self.carousel.get_mut(&id) {
            *index = (*index + 1) % len;
        }
    }

    pub fn carousel_prev(&mut self, id: MessageId) {
        let len = self.product_count(id);
        if len == 0 {
            return;
        }
        if let Some(index) = self.carousel.get_mut(&id) {
            *index = (*index + len - 1) % len;
        }
    }

    pub fn carousel_index(&self, id: MessageId) -> Option<usize> {
        self.carousel.get(&id).copied()
    }

    pub fn current_product(&self, id: MessageId) -> Option<&Product> {
        let index = self.carousel_index(id)?;
        self.message(id)?.products.get(index)
    }

    pub fn selected_carousel(&self) -> Option<MessageId> {
        self.selected_carousel
    }

    /// Ids of messages that carry products, oldest first
    fn carousel_ids(&self) -> Vec<MessageId> {
        self.messages
            .iter()
            .filter(|m| m.has_products())
            .map(|m| m.id)
            .collect()
    }

    pub fn select_next_carousel(&mut self) {
        let ids = self.carousel_ids();
        self.selected_carousel = match self.selected_carousel {
            Some(current) => ids
                .iter()
                .position(|&id| id == current)
                .map(|i| ids[(i + 1).min(ids.len() - 1)])
                .or_else(|| ids.last().copied()),
            None => ids.last().copied(),
        };
    }

    pub fn select_prev_carousel(&mut self) {
        let ids = self.carousel_ids();
        self.selected_carousel = match self.selected_carousel {
            Some(current) => ids
                .iter()
                .position(|&id| id == current)
                .map(|i| ids[i.saturating_sub(1)])
                .or_else(|| ids.last().copied()),
            None => ids.last().copied(),
        };
    }

    pub fn page_selected_next(&mut self) {
        if let Some(id) = self.selected_carousel {
            self.carousel_next(id);
        }
    }

    pub fn page_selected_prev(&mut self) {
        if let Some(id) = self.selected_carousel {
            self.carousel_prev(id);
        }
    }
}
